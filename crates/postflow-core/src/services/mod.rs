//! Orchestration services - the post lifecycle, one component per concern.

mod entitlement;
mod images;
mod join;
mod orchestrator;
mod publish;
mod regeneration;
mod retry;
mod schedule;

#[cfg(test)]
pub(crate) mod fakes;

pub use entitlement::{EntitlementGate, EntitlementPolicy, VerdictCache};
pub use images::ImageVariantStore;
pub use join::{Settled, settle_all};
pub use orchestrator::{EditingSession, Ports, PostOrchestrator};
pub use publish::{MultiPlatformPublisher, PublishRun};
pub use regeneration::{
    FieldStatus, PlatformReport, RegenerationCoordinator, RegenerationOutcome, RegenerationReport,
    RegenerationRequest,
};
pub use retry::{Backoff, RetryBudget, RetryError, RetryPolicy};
pub use schedule::{DEFAULT_TIMEZONE, PlatformScope, ScheduleMerger, ScheduleOutcome, ScheduleRequest};
