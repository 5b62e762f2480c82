use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Platform;

/// Aggregated result of publishing one post to several platforms.
///
/// Every attempted platform lands in exactly one of the two sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub succeeded: BTreeSet<Platform>,
    /// Failed platforms with the error message of their attempt.
    pub failed: BTreeMap<Platform, String>,
}

impl PublishOutcome {
    pub fn record_success(&mut self, platform: Platform) {
        self.failed.remove(&platform);
        self.succeeded.insert(platform);
    }

    pub fn record_failure(&mut self, platform: Platform, message: impl Into<String>) {
        self.succeeded.remove(&platform);
        self.failed.insert(platform, message.into());
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn summary(&self) -> PublishSummary {
        let failed: Vec<Platform> = self.failed.keys().copied().collect();
        match (self.succeeded.len(), failed.is_empty()) {
            (0, _) => PublishSummary::NoneSucceeded { failed },
            (count, true) => PublishSummary::AllSucceeded { count },
            (_, false) => PublishSummary::Partial {
                succeeded: self.succeeded.iter().copied().collect(),
                failed,
            },
        }
    }
}

/// User-facing classification of a [`PublishOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublishSummary {
    AllSucceeded {
        count: usize,
    },
    Partial {
        succeeded: Vec<Platform>,
        failed: Vec<Platform>,
    },
    NoneSucceeded {
        failed: Vec<Platform>,
    },
}

fn join_platforms(platforms: &[Platform]) -> String {
    platforms
        .iter()
        .map(Platform::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for PublishSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishSummary::AllSucceeded { count: 1 } => write!(f, "Posted successfully"),
            PublishSummary::AllSucceeded { count } => {
                write!(f, "Posted successfully to all {count} platforms")
            }
            PublishSummary::Partial { succeeded, failed } => write!(
                f,
                "Posted to {} platform(s): {}. Failed on: {}",
                succeeded.len(),
                join_platforms(succeeded),
                join_platforms(failed)
            ),
            PublishSummary::NoneSucceeded { .. } => {
                write!(f, "Failed to post to any platform")
            }
        }
    }
}

/// What happened to the image part of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageOutcome {
    NotRequested,
    /// A new rendition was appended and selected.
    Appended { url: String },
    /// The post already holds the maximum number of renditions. This is a
    /// policy boundary, not an error.
    CapReached,
    /// The post already has an image; nothing was generated.
    AlreadyPresent,
    /// Generation failed; the image is unchanged.
    Failed { message: String },
    /// The retry budget is spent; the image stays absent.
    GaveUp { attempts: u32 },
}

impl ImageOutcome {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            ImageOutcome::CapReached => Some("Enough images generated for this post"),
            _ => None,
        }
    }
}
