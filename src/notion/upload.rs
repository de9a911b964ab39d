//! Sequential page creation with bounded retry
//!
//! Records are created one at a time, in order. A failed create is retried
//! after a linearly growing pause (`base_delay × attempt`); a record that
//! exhausts its attempts aborts the whole batch. Pages created before the
//! failure stay created, and a re-run without de-duplication creates them
//! again since the API offers no idempotency key.

use miette::Diagnostic;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::entities::MappedRecord;
use crate::notion::client::{ApiError, NotionApi};
use crate::notion::payload::PageRequest;

/// Suspends the caller between attempts
pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

impl<P: Pause + ?Sized> Pause for &mut P {
    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration);
    }
}

/// Blocks the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// How many times to try a record and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// `max_attempts` below 1 is treated as 1
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Pause before 1-based attempt `attempt`: zero for the first,
    /// `base_delay × (attempt - 1)` afterwards
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.saturating_sub(1))
    }
}

/// Outcome of [`with_retry`]
#[derive(Debug)]
pub enum Attempt<T, E> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: E },
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// `op` receives the 1-based attempt number. Pauses happen only before a
/// retry, never after the final failure.
pub fn with_retry<T, E, P, F>(policy: &RetryPolicy, pause: &mut P, mut op: F) -> Attempt<T, E>
where
    E: std::fmt::Display,
    P: Pause + ?Sized,
    F: FnMut(u32) -> Result<T, E>,
{
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => {
                return Attempt::Succeeded {
                    value,
                    attempts: attempt,
                }
            }
            Err(error) => {
                warn!(attempt, max = policy.max_attempts(), %error, "attempt failed");
                if attempt >= policy.max_attempts() {
                    return Attempt::Exhausted {
                        attempts: attempt,
                        last_error: error,
                    };
                }
                attempt += 1;
                let delay = policy.delay_before(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "pausing before retry");
                pause.pause(delay);
            }
        }
    }
}

/// Per-record outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadResult {
    Succeeded { attempts: u32 },
    Failed { attempts: u32 },
}

impl UploadResult {
    pub fn attempts(&self) -> u32 {
        match self {
            UploadResult::Succeeded { attempts } | UploadResult::Failed { attempts } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Succeeded { .. })
    }
}

/// Outcome of a batch in which every record was created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub results: Vec<UploadResult>,
}

impl BatchReport {
    pub fn created(&self) -> usize {
        self.results.len()
    }

    /// Records that needed more than one attempt
    pub fn retried(&self) -> usize {
        self.results.iter().filter(|r| r.attempts() > 1).count()
    }

    pub fn total_attempts(&self) -> u32 {
        self.results.iter().map(UploadResult::attempts).sum()
    }
}

/// A record exhausted its attempts; the batch stopped there
#[derive(Debug, Error, Diagnostic)]
#[error(
    "Record {} of {total} failed after {attempts} attempt(s); {} record(s) were created before it",
    .index + 1,
    .completed.len()
)]
#[diagnostic(code(huntr_notion::upload::batch_failure))]
pub struct BatchFailure {
    /// 0-based position of the failing record in the batch
    pub index: usize,
    pub total: usize,
    pub attempts: u32,
    #[source]
    #[diagnostic_source]
    pub last_error: ApiError,
    /// Pretty-printed request body of the failing record
    pub payload: String,
    /// Results of the records created before the failure
    pub completed: Vec<UploadResult>,
    #[help]
    pub hint: Option<String>,
}

/// Creates mapped records one by one
pub struct UploadDriver<'a, A: ?Sized, P = ThreadSleep> {
    api: &'a A,
    database_id: String,
    policy: RetryPolicy,
    pause: P,
}

impl<'a, A: NotionApi + ?Sized> UploadDriver<'a, A, ThreadSleep> {
    pub fn new(api: &'a A, database_id: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            api,
            database_id: database_id.into(),
            policy,
            pause: ThreadSleep,
        }
    }
}

impl<'a, A: NotionApi + ?Sized, P: Pause> UploadDriver<'a, A, P> {
    /// Replace the pause implementation
    pub fn with_pause<Q: Pause>(self, pause: Q) -> UploadDriver<'a, A, Q> {
        UploadDriver {
            api: self.api,
            database_id: self.database_id,
            policy: self.policy,
            pause,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Create every record, stopping at the first one that exhausts retries
    pub fn upload(&mut self, records: &[MappedRecord]) -> Result<BatchReport, BatchFailure> {
        self.upload_with(records, |_, _, _| {})
    }

    /// Like [`upload`](Self::upload), calling `observer` with each record's
    /// index and outcome as soon as it is known
    pub fn upload_with<F>(
        &mut self,
        records: &[MappedRecord],
        mut observer: F,
    ) -> Result<BatchReport, BatchFailure>
    where
        F: FnMut(usize, &MappedRecord, &UploadResult),
    {
        let total = records.len();
        let mut results = Vec::with_capacity(total);
        info!(records = total, database = %self.database_id, "starting upload");

        for (index, record) in records.iter().enumerate() {
            let page = PageRequest::new(&self.database_id, record);
            let api = self.api;

            let outcome = with_retry(&self.policy, &mut self.pause, |attempt| {
                debug!(index, attempt, company = %record.company, "create page");
                api.create_page(&page)
            });

            match outcome {
                Attempt::Succeeded { attempts, .. } => {
                    let result = UploadResult::Succeeded { attempts };
                    observer(index, record, &result);
                    results.push(result);
                }
                Attempt::Exhausted {
                    attempts,
                    last_error,
                } => {
                    let result = UploadResult::Failed { attempts };
                    observer(index, record, &result);
                    let payload = page.to_pretty_json();
                    warn!(index, attempts, "record exhausted retries; aborting batch");
                    return Err(BatchFailure {
                        index,
                        total,
                        attempts,
                        last_error,
                        hint: Some(format!(
                            "offending payload:\n{payload}\n\
                             pages created before this record were kept; \
                             use --skip-existing when re-running to avoid duplicates"
                        )),
                        payload,
                        completed: results,
                    });
                }
            }
        }

        info!(created = results.len(), "upload finished");
        Ok(BatchReport { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::client::{DatabaseInfo, QueryPage};
    use std::cell::{Cell, RefCell};

    /// Fails the first `failures` create calls, then succeeds
    #[derive(Default)]
    struct FlakyApi {
        failures: Cell<u32>,
        always_fail: bool,
        created: RefCell<Vec<PageRequest>>,
        calls: Cell<u32>,
    }

    impl FlakyApi {
        fn failing_first(failures: u32) -> Self {
            Self {
                failures: Cell::new(failures),
                ..Default::default()
            }
        }

        fn always_failing() -> Self {
            Self {
                always_fail: true,
                ..Default::default()
            }
        }
    }

    impl NotionApi for FlakyApi {
        fn create_page(&self, page: &PageRequest) -> Result<(), ApiError> {
            self.calls.set(self.calls.get() + 1);
            if self.always_fail || self.failures.get() > 0 {
                self.failures.set(self.failures.get().saturating_sub(1));
                return Err(ApiError::Status {
                    url: "http://fake/v1/pages".to_string(),
                    status: 429,
                    body: "rate limited".to_string(),
                });
            }
            self.created.borrow_mut().push(page.clone());
            Ok(())
        }

        fn query_database(&self, _start_cursor: Option<&str>) -> Result<QueryPage, ApiError> {
            unreachable!("upload never queries")
        }

        fn retrieve_database(&self) -> Result<DatabaseInfo, ApiError> {
            unreachable!("upload never retrieves the schema")
        }
    }

    #[derive(Default)]
    struct RecordedPauses(Vec<Duration>);

    impl Pause for RecordedPauses {
        fn pause(&mut self, duration: Duration) {
            self.0.push(duration);
        }
    }

    fn record(company: &str) -> MappedRecord {
        MappedRecord {
            company: company.to_string(),
            position: "Engineer".to_string(),
            status: "Applied".to_string(),
            icon: None,
        }
    }

    const BASE: Duration = Duration::from_millis(250);

    #[test]
    fn test_delay_before() {
        let policy = RetryPolicy::new(3, BASE);
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), BASE);
        assert_eq!(policy.delay_before(3), BASE * 2);
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, BASE).max_attempts(), 1);
    }

    #[test]
    fn test_fail_twice_then_succeed() {
        let api = FlakyApi::failing_first(2);
        let mut pauses = RecordedPauses::default();

        let report = UploadDriver::new(&api, "db", RetryPolicy::new(3, BASE))
            .with_pause(&mut pauses)
            .upload(&[record("Acme")])
            .unwrap();

        assert_eq!(api.calls.get(), 3);
        assert_eq!(pauses.0, vec![BASE, BASE * 2]);
        assert_eq!(report.results, vec![UploadResult::Succeeded { attempts: 3 }]);
        assert_eq!(report.retried(), 1);
        assert_eq!(api.created.borrow().len(), 1);
    }

    #[test]
    fn test_success_needs_no_pause() {
        let api = FlakyApi::default();
        let mut pauses = RecordedPauses::default();

        let report = UploadDriver::new(&api, "db", RetryPolicy::new(3, BASE))
            .with_pause(&mut pauses)
            .upload(&[record("Acme"), record("Beta"), record("Gamma")])
            .unwrap();

        assert_eq!(report.created(), 3);
        assert_eq!(report.total_attempts(), 3);
        assert!(pauses.0.is_empty());

        let created = api.created.borrow();
        let companies: Vec<&str> = created
            .iter()
            .map(|p| p.properties.company.title[0].text.content.as_str())
            .collect();
        assert_eq!(companies, vec!["Acme", "Beta", "Gamma"]);
    }

    #[test]
    fn test_exhaustion_aborts_batch() {
        let api = FlakyApi::always_failing();
        let mut pauses = RecordedPauses::default();
        let mut seen = Vec::new();

        let failure = UploadDriver::new(&api, "db", RetryPolicy::new(3, BASE))
            .with_pause(&mut pauses)
            .upload_with(&[record("Acme"), record("Beta")], |index, _, result| {
                seen.push((index, *result));
            })
            .unwrap_err();

        assert_eq!(api.calls.get(), 3, "no call may be made for the second record");
        assert_eq!(pauses.0, vec![BASE, BASE * 2]);
        assert_eq!(failure.index, 0);
        assert_eq!(failure.total, 2);
        assert_eq!(failure.attempts, 3);
        assert!(failure.completed.is_empty());
        assert!(failure.payload.contains("\"Acme\""));
        assert!(matches!(failure.last_error, ApiError::Status { status: 429, .. }));
        assert_eq!(seen, vec![(0, UploadResult::Failed { attempts: 3 })]);
    }

    #[test]
    fn test_failure_mid_batch_keeps_completed_results() {
        struct FailOn(&'static str, Cell<u32>);

        impl NotionApi for FailOn {
            fn create_page(&self, page: &PageRequest) -> Result<(), ApiError> {
                self.1.set(self.1.get() + 1);
                if page.properties.company.title[0].text.content == self.0 {
                    Err(ApiError::Status {
                        url: "http://fake".to_string(),
                        status: 500,
                        body: String::new(),
                    })
                } else {
                    Ok(())
                }
            }

            fn query_database(&self, _: Option<&str>) -> Result<QueryPage, ApiError> {
                unreachable!()
            }

            fn retrieve_database(&self) -> Result<DatabaseInfo, ApiError> {
                unreachable!()
            }
        }

        let api = FailOn("Beta", Cell::new(0));
        let failure = UploadDriver::new(&api, "db", RetryPolicy::new(2, BASE))
            .with_pause(RecordedPauses::default())
            .upload(&[record("Acme"), record("Beta"), record("Gamma")])
            .unwrap_err();

        assert_eq!(failure.index, 1);
        assert_eq!(failure.completed, vec![UploadResult::Succeeded { attempts: 1 }]);
        assert_eq!(api.1.get(), 3);
        assert!(failure.to_string().starts_with("Record 2 of 3 failed after 2 attempt(s)"));
    }

    #[test]
    fn test_single_attempt_policy_never_pauses() {
        let api = FlakyApi::always_failing();
        let mut pauses = RecordedPauses::default();

        let failure = UploadDriver::new(&api, "db", RetryPolicy::new(1, BASE))
            .with_pause(&mut pauses)
            .upload(&[record("Acme")])
            .unwrap_err();

        assert_eq!(failure.attempts, 1);
        assert!(pauses.0.is_empty());
    }

    #[test]
    fn test_empty_batch() {
        let api = FlakyApi::always_failing();
        let report = UploadDriver::new(&api, "db", RetryPolicy::default())
            .with_pause(RecordedPauses::default())
            .upload(&[])
            .unwrap();

        assert_eq!(report.created(), 0);
        assert_eq!(api.calls.get(), 0);
    }

    #[test]
    fn test_with_retry_reports_attempt_numbers() {
        let mut pauses = RecordedPauses::default();
        let mut seen = Vec::new();

        let outcome: Attempt<u32, String> =
            with_retry(&RetryPolicy::new(4, BASE), &mut pauses, |attempt| {
                seen.push(attempt);
                if attempt < 4 {
                    Err(format!("fail {attempt}"))
                } else {
                    Ok(attempt * 10)
                }
            });

        assert!(matches!(
            outcome,
            Attempt::Succeeded {
                value: 40,
                attempts: 4
            }
        ));
        assert_eq!(seen, vec![1, 2, 3, 4]);
        assert_eq!(pauses.0, vec![BASE, BASE * 2, BASE * 3]);
    }
}
