//! Per-item outcome aggregation for bulk operations.
//!
//! Bulk commands run their items sequentially and never roll back, so a
//! partial failure leaves earlier items committed. [`BatchOutcome`] keeps
//! every item's result so callers can report exactly what happened.

use crate::AppError;
use std::fmt;

#[derive(Debug)]
pub struct BatchOutcome<K> {
    pub succeeded: Vec<K>,
    pub failed: Vec<(K, AppError)>,
    /// Items filtered out before any request was issued.
    pub skipped: Vec<K>,
}

impl<K> BatchOutcome<K> {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Record one item's result.
    pub fn record(&mut self, key: K, result: Result<(), AppError>) {
        match result {
            Ok(()) => self.succeeded.push(key),
            Err(err) => self.failed.push((key, err)),
        }
    }

    pub fn skip(&mut self, key: K) {
        self.skipped.push(key);
    }

    /// `true` when no item failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Human-readable counts, e.g. `3 succeeded, 1 failed, 0 skipped`.
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed, {} skipped",
            self.succeeded.len(),
            self.failed.len(),
            self.skipped.len()
        )
    }
}

impl<K> Default for BatchOutcome<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Display> fmt::Display for BatchOutcome<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())?;
        for (key, err) in &self.failed {
            write!(f, "\n  {}: {}", key, err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_every_item_without_stopping() {
        let mut outcome = BatchOutcome::new();
        outcome.record("a.pdf", Ok(()));
        outcome.record("b.pdf", Err(AppError::http_status(500, "boom")));
        outcome.record("c.pdf", Ok(()));
        outcome.skip("notes.txt");

        assert!(!outcome.is_complete());
        assert_eq!(outcome.succeeded, vec!["a.pdf", "c.pdf"]);
        assert_eq!(outcome.failed[0].0, "b.pdf");
        assert_eq!(outcome.summary(), "2 succeeded, 1 failed, 1 skipped");
        assert_eq!(
            outcome.to_string(),
            "2 succeeded, 1 failed, 1 skipped\n  b.pdf: Network error (500): boom"
        );
    }

    #[test]
    fn empty_batch_is_complete() {
        let outcome: BatchOutcome<String> = BatchOutcome::new();
        assert!(outcome.is_complete());
        assert_eq!(outcome.summary(), "0 succeeded, 0 failed, 0 skipped");
    }
}
