//! Product operation metrics.

use metrics::{counter, histogram};

/// How a product operation ended, as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Caller error: bad id, validation, duplicate SKU, not found
    Rejected,
    /// Storage or other unexpected failure
    Failed,
}

impl Outcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Rejected => "rejected",
            Outcome::Failed => "failed",
        }
    }
}

/// Product metrics recorder
pub struct ProductMetrics;

impl ProductMetrics {
    /// Count one finished operation (`list`, `get`, `create`, ...).
    pub fn record_operation(operation: &'static str, outcome: Outcome) {
        counter!(
            "product_operations_total",
            "operation" => operation,
            "outcome" => outcome.as_str()
        )
        .increment(1);
    }

    /// Record how many products a read operation returned.
    pub fn record_search_results(operation: &'static str, count: usize) {
        histogram!("product_search_results", "operation" => operation).record(count as f64);

        tracing::debug!(operation, count, "Products returned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Success.as_str(), "success");
        assert_eq!(Outcome::Rejected.as_str(), "rejected");
        assert_eq!(Outcome::Failed.as_str(), "failed");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        ProductMetrics::record_operation("delete", Outcome::Failed);
        ProductMetrics::record_search_results("list", 0);
    }
}
