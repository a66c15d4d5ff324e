//! Aggregate report for a batch.

use serde::Serialize;

use crate::outcome::ExecutionResult;

/// One item's outcome, tagged so callers can correlate without inspecting the inner shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResult {
    pub request_id: i64,
    pub request_name: String,
    pub request_method: String,
    pub request_url: String,
    /// True when the upstream produced a status, whatever that status was.
    pub success: bool,
    #[serde(flatten)]
    pub result: ExecutionResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkExecutionReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BulkItemResult>,
}

impl BulkExecutionReport {
    /// `results` must already be in input order.
    pub fn from_results(results: Vec<BulkItemResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}
