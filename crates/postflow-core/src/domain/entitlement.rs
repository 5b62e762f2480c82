use serde::{Deserialize, Serialize};

/// Name the account service uses for the unpaid plan.
pub const FREE_PLAN_NAME: &str = "Free";

/// Subscription state as reported by the account service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    /// `None` when the account has no plan record at all.
    pub plan_name: Option<String>,
    pub is_active: bool,
}

impl SubscriptionStatus {
    pub fn is_paid(&self) -> bool {
        self.plan_name
            .as_deref()
            .is_some_and(|name| name != FREE_PLAN_NAME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictReason {
    Ok,
    Suspended,
    /// Reserved for the free-tier feature gate, which lives outside the
    /// orchestrator.
    FreeTierBlocked,
    /// The account service could not be reached and the gate fails closed.
    Unverified,
}

/// Whether the acting account may perform a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementVerdict {
    pub allowed: bool,
    pub reason: VerdictReason,
}

impl EntitlementVerdict {
    pub const fn ok() -> Self {
        Self {
            allowed: true,
            reason: VerdictReason::Ok,
        }
    }

    pub const fn suspended() -> Self {
        Self {
            allowed: false,
            reason: VerdictReason::Suspended,
        }
    }

    pub const fn unverified() -> Self {
        Self {
            allowed: false,
            reason: VerdictReason::Unverified,
        }
    }

    /// A paid plan whose subscription is inactive is suspended; everything
    /// else is allowed.
    pub fn from_subscription(status: &SubscriptionStatus) -> Self {
        if status.is_paid() && !status.is_active {
            Self::suspended()
        } else {
            Self::ok()
        }
    }
}
