//! Best-effort batch mutation
//!
//! A batch issues one request per item, strictly one after another. A failed
//! item is recorded and the batch moves on; the caller receives a
//! [`BatchReport`] once every item was attempted.

use crate::error::Result;
use std::fmt::Display;
use std::future::Future;

/// One item that did not succeed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchFailure<K> {
    /// The item, as passed in
    pub key: K,
    /// Server-supplied message (see [`crate::Error::item_message`])
    pub message: String,
}

impl<K: Display> Display for BatchFailure<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.key, self.message)
    }
}

/// Outcome of a batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport<K> {
    /// Number of items that succeeded
    pub succeeded: usize,
    /// Items that failed, in batch order
    pub failures: Vec<BatchFailure<K>>,
}

impl<K> Default for BatchReport<K> {
    fn default() -> Self {
        Self {
            succeeded: 0,
            failures: Vec::new(),
        }
    }
}

impl<K> BatchReport<K> {
    /// Number of items that failed
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of items attempted
    pub fn total(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    /// Whether every item succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Apply `op` to every `(key, change)` pair in order
///
/// `op` is expected to map any response other than the operation's success
/// code to an error. Errors never stop the batch.
pub async fn run_batch<K, V, F, Fut>(action: &str, items: Vec<(K, V)>, mut op: F) -> BatchReport<K>
where
    K: Clone + Display,
    F: FnMut(K, V) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let total = items.len();
    let mut report = BatchReport::default();
    tracing::info!(action, total, "starting batch");

    for (i, (key, change)) in items.into_iter().enumerate() {
        match op(key.clone(), change).await {
            Ok(()) => {
                report.succeeded += 1;
                tracing::debug!(action, item = %key, progress = i + 1, total, "item done");
            }
            Err(e) => {
                tracing::warn!(action, item = %key, error = %e, "item failed");
                report.failures.push(BatchFailure {
                    key,
                    message: e.item_message(),
                });
            }
        }
    }

    tracing::info!(
        action,
        succeeded = report.succeeded,
        failed = report.failed(),
        "batch finished"
    );
    report
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ServerError};
    use std::cell::RefCell;

    fn refused(id: &str) -> Error {
        Error::Api {
            endpoint: format!("tags/{id}"),
            status: 400,
            detail: ServerError::from_body(400, r#"{"message":"Tag not found"}"#),
        }
    }

    #[tokio::test]
    async fn middle_failure_does_not_stop_the_batch() {
        let attempted = RefCell::new(Vec::new());
        let items = vec![
            ("id1".to_string(), ()),
            ("id2".to_string(), ()),
            ("id3".to_string(), ()),
        ];

        let report = run_batch("delete tag", items, |id, ()| {
            attempted.borrow_mut().push(id.clone());
            async move {
                if id == "id2" {
                    Err(refused(&id))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(attempted.into_inner(), vec!["id1", "id2", "id3"]);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.failures,
            vec![BatchFailure {
                key: "id2".to_string(),
                message: "400 - Tag not found".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn counts_always_sum_to_batch_size() {
        for failing_every in 1..=4usize {
            let items: Vec<(usize, usize)> = (0..9).map(|i| (i, i * 10)).collect();
            let report = run_batch("update", items, |i, _| async move {
                if i % failing_every == 0 {
                    Err(Error::Other(format!("item {i}")))
                } else {
                    Ok(())
                }
            })
            .await;

            assert_eq!(report.total(), 9);
            assert_eq!(report.succeeded + report.failed(), 9);
        }
    }

    #[tokio::test]
    async fn change_value_reaches_the_operation() {
        let seen = RefCell::new(Vec::new());
        let items = vec![("a".to_string(), 1), ("b".to_string(), 2)];

        let report = run_batch("update", items, |key, change| {
            seen.borrow_mut().push((key, change));
            async { Ok(()) }
        })
        .await;

        assert!(report.is_clean());
        assert_eq!(
            seen.into_inner(),
            vec![("a".to_string(), 1), ("b".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn empty_batch_reports_nothing() {
        let report = run_batch("update", Vec::<(String, ())>::new(), |_, ()| async {
            Ok(())
        })
        .await;

        assert_eq!(report.total(), 0);
        assert!(report.is_clean());
    }
}
