/// Incremental progress of a long-running request.
///
/// Zero or more of these precede the terminal response of an execution. The
/// update with `completed` set is the last one an executor reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Progress {
    /// Bytes transferred so far.
    pub completed_bytes: u64,

    /// Total expected bytes, if known.
    ///
    /// This may be `None` when the server does not announce a
    /// Content-Length (e.g. chunked transfer encoding).
    pub total_bytes: Option<u64>,

    /// Whether the transfer has finished.
    pub completed: bool,
}

impl Progress {
    /// An in-flight update.
    pub fn new(completed_bytes: u64, total_bytes: Option<u64>) -> Self {
        Self {
            completed_bytes,
            total_bytes,
            completed: false,
        }
    }

    /// The final update of a transfer of `total_bytes`.
    pub fn finished(total_bytes: u64) -> Self {
        Self {
            completed_bytes: total_bytes,
            total_bytes: Some(total_bytes),
            completed: true,
        }
    }

    /// Completion ratio in `[0, 1]`.
    ///
    /// A completed transfer always reports `1.0`; an unknown total reports
    /// `0.0` until completion.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.completed {
            return 1.0;
        }
        match self.total_bytes {
            Some(total) if total > 0 => (self.completed_bytes as f64 / total as f64).min(1.0),
            _ => 0.0,
        }
    }

    /// Calculate the percentage of completion.
    ///
    /// Returns `None` if `total_bytes` is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|_| self.fraction() * 100.0)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_with_known_total() {
        assert_eq!(Progress::new(25, Some(100)).fraction(), 0.25);
        assert_eq!(Progress::new(150, Some(100)).fraction(), 1.0);
    }

    #[test]
    fn test_fraction_unknown_or_empty_total() {
        assert_eq!(Progress::new(10, None).fraction(), 0.0);
        assert_eq!(Progress::new(0, Some(0)).fraction(), 0.0);
        assert_eq!(Progress::finished(0).fraction(), 1.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(Progress::new(1, Some(4)).percentage(), Some(25.0));
        assert_eq!(Progress::new(1, None).percentage(), None);
        assert!(Progress::finished(8).is_completed());
    }
}
