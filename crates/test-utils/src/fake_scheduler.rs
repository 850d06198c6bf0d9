use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use dsq::autopsy::{SchedulerQuery, StateRow};
use dsq::errors::Result;

/// A scheduler query that:
/// - returns the same canned rows for any job id
/// - records every job id it was asked about.
#[derive(Clone, Default)]
pub struct FakeScheduler {
    rows: Vec<StateRow>,
    queried: Arc<Mutex<Vec<String>>>,
}

impl FakeScheduler {
    pub fn new(rows: Vec<StateRow>) -> Self {
        Self {
            rows,
            queried: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// One row per index `0..n`, all in `default_state`, except the
    /// overrides given as `(index, state)`.
    pub fn with_states(job_id: &str, n: u64, default_state: &str, overrides: &[(u64, &str)]) -> Self {
        let rows = (0..n)
            .map(|i| {
                let state = overrides
                    .iter()
                    .find(|(idx, _)| *idx == i)
                    .map(|(_, s)| *s)
                    .unwrap_or(default_state);
                StateRow::new(format!("{job_id}_{i}"), state)
            })
            .collect();
        Self::new(rows)
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

impl SchedulerQuery for FakeScheduler {
    fn array_states(
        &self,
        job_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StateRow>>> + Send + '_>> {
        self.queried.lock().unwrap().push(job_id.to_string());
        let rows = self.rows.clone();
        Box::pin(async move { Ok(rows) })
    }
}
