//! Transfer result types
//!
//! Defines the summary returned by a completed transfer and the throughput
//! calculation.

use std::time::Duration;

use crate::protocol::Reply;
use crate::transfer::TransferKind;

/// Added to the elapsed seconds so a zero duration never divides by zero
pub const SPEED_EPSILON: f64 = 1e-6;

/// Throughput in kilobytes (1000 bytes) per second
pub fn calculate_speed(bytes: u64, elapsed: Duration) -> f64 {
    (bytes as f64 / 1000.0) / (elapsed.as_secs_f64() + SPEED_EPSILON)
}

/// Result of a completed data transfer
#[derive(Debug, Clone)]
pub struct TransferSummary {
    pub kind: TransferKind,
    pub bytes: u64,
    /// Wall time spent in the byte loop only
    pub elapsed: Duration,
    /// Closing reply on the control connection
    pub reply: Reply,
    /// Listing bytes when no local destination was given
    pub listing: Option<Vec<u8>>,
}

impl TransferSummary {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn throughput_kbps(&self) -> f64 {
        calculate_speed(self.bytes, self.elapsed)
    }
}
