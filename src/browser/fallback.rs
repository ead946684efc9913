// Ordered fallback chains: run attempts in order until one succeeds

use futures_util::future::BoxFuture;

/// One fallible step of a fallback chain
pub struct Attempt<'a, T, E> {
    pub label: String,
    pub run: BoxFuture<'a, Result<T, E>>,
}

impl<'a, T, E> Attempt<'a, T, E> {
    pub fn new(label: impl Into<String>, run: BoxFuture<'a, Result<T, E>>) -> Self {
        Self {
            label: label.into(),
            run,
        }
    }
}

/// The winning attempt of a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success<T> {
    pub label: String,
    pub value: T,
}

/// Runs attempts strictly in order; later attempts are never polled once one succeeds.
///
/// Returns every failure, labelled and in order, when the list is exhausted.
pub async fn first_success<T, E>(attempts: Vec<Attempt<'_, T, E>>) -> Result<Success<T>, Vec<(String, E)>> {
    let mut failures = Vec::with_capacity(attempts.len());

    for attempt in attempts {
        match attempt.run.await {
            Ok(value) => {
                return Ok(Success {
                    label: attempt.label,
                    value,
                })
            }
            Err(e) => {
                tracing::debug!("Fallback: attempt '{}' failed", attempt.label);
                failures.push((attempt.label, e));
            }
        }
    }

    Err(failures)
}
