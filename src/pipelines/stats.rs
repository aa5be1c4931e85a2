use std::time::{Duration, Instant};

/// Statistics for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStats {
    /// Total execution time, including schema checks.
    pub total_time: Duration,
    /// Number of rows in the output.
    pub rows_processed: usize,
    /// Rows that hold a fallback result.
    pub fallback_rows: usize,
}

impl BatchStats {
    /// Create a new stats tracker (call at start of operation).
    pub(crate) fn start() -> BatchStatsBuilder {
        BatchStatsBuilder {
            start_time: Instant::now(),
        }
    }

    /// Rows per second, or 0 when nothing was timed.
    pub fn rows_per_second(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs > 0.0 {
            self.rows_processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Tracks timing from creation to `finish`.
pub(crate) struct BatchStatsBuilder {
    start_time: Instant,
}

impl BatchStatsBuilder {
    pub fn finish(self, rows_processed: usize, fallback_rows: usize) -> BatchStats {
        BatchStats {
            total_time: self.start_time.elapsed(),
            rows_processed,
            fallback_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculates_rate() {
        let stats = BatchStats {
            total_time: Duration::from_secs(2),
            rows_processed: 10,
            fallback_rows: 1,
        };
        assert_eq!(stats.rows_per_second(), 5.0);

        let instant = BatchStats {
            total_time: Duration::ZERO,
            ..stats
        };
        assert_eq!(instant.rows_per_second(), 0.0);
    }

    #[test]
    fn builder_records_counts() {
        let stats = BatchStats::start().finish(3, 0);
        assert_eq!(stats.rows_processed, 3);
        assert_eq!(stats.fallback_rows, 0);
    }
}
