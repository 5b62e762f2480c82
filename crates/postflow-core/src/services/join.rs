//! Settle-all join: run independent calls together, keep every result.

use std::collections::BTreeMap;
use std::future::Future;

use futures::future::join_all;

use crate::error::ServiceError;

/// Results of a settled batch, split by outcome. One task's failure never
/// discards another task's success.
#[derive(Debug)]
pub struct Settled<K, T> {
    pub ok: BTreeMap<K, T>,
    pub failed: BTreeMap<K, ServiceError>,
}

impl<K: Ord, T> Settled<K, T> {
    pub fn new() -> Self {
        Self {
            ok: BTreeMap::new(),
            failed: BTreeMap::new(),
        }
    }

    /// Whether any task hit the suspended-plan signal.
    pub fn suspended(&self) -> bool {
        self.failed.values().any(ServiceError::is_suspended)
    }

    pub fn is_empty(&self) -> bool {
        self.ok.is_empty() && self.failed.is_empty()
    }
}

impl<K: Ord, T> Default for Settled<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Await every keyed task and collect the outcomes. Nothing is merged until
/// all tasks have finished.
pub async fn settle_all<K, T, I, F>(tasks: I) -> Settled<K, T>
where
    K: Ord,
    I: IntoIterator<Item = (K, F)>,
    F: Future<Output = Result<T, ServiceError>>,
{
    let (keys, futures): (Vec<K>, Vec<F>) = tasks.into_iter().unzip();
    let results = join_all(futures).await;

    let mut settled = Settled::new();
    for (key, result) in keys.into_iter().zip(results) {
        match result {
            Ok(value) => {
                settled.ok.insert(key, value);
            }
            Err(err) => {
                settled.failed.insert(key, err);
            }
        }
    }
    settled
}
