// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outcome of a dispatch run.

use std::fmt;
use std::time::Duration;

use sequin_core::SortMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Items that reached the destination.
    pub sent: usize,
    /// Items drained from the queue.
    pub total: usize,
    pub mode: SortMode,
    pub elapsed: Duration,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Files Sorted {}/{}\nMode: {}\nTime Taken: {}",
            self.sent,
            self.total,
            self.mode,
            format_elapsed(self.elapsed)
        )
    }
}

/// Formats a duration as `H:MM:SS`, dropping sub-second precision.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::from_millis(900)), "0:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(65)), "0:01:05");
        assert_eq!(format_elapsed(Duration::from_secs(3 * 3600 + 7)), "3:00:07");
        assert_eq!(format_elapsed(Duration::from_secs(27 * 3600)), "27:00:00");
    }

    #[test]
    fn summary_text() {
        let report = RunReport {
            sent: 4,
            total: 5,
            mode: SortMode::Quality,
            elapsed: Duration::from_secs(12),
        };
        assert_eq!(
            report.to_string(),
            "Files Sorted 4/5\nMode: quality\nTime Taken: 0:00:12"
        );
    }
}
