//! Domain entities - the core business objects.

mod entitlement;
mod outcome;
mod platform;
mod post;
mod selection;

pub use entitlement::{EntitlementVerdict, FREE_PLAN_NAME, SubscriptionStatus, VerdictReason};
pub use outcome::{ImageOutcome, PublishOutcome, PublishSummary};
pub use platform::Platform;
pub use post::{
    MAX_IMAGE_VARIANTS, PlatformContent, Post, PostContent, PostId, PostSchedule, ScheduleEntry,
    ScheduleStatus, VariantRejection,
};
pub use selection::{PartialSelection, RegenerationSelection, SelectionField, SelectionFlags};
