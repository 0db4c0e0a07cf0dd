//! Transfer module for the FTP client
//!
//! Handles active-mode data channel negotiation, the transfer state machine,
//! the byte loops, and transfer metrics.

pub mod data_channel;
pub mod file_ops;
pub mod modes;
pub mod operations;
pub mod results;

// Re-export key types and functions
pub use data_channel::{ActiveDataChannel, format_port_argument};
pub use modes::{TransferKind, TransferType};
pub use operations::{TransferOperation, TransferState};
pub use results::{TransferSummary, calculate_speed};
