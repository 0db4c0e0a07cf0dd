pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transfer;
pub mod utils;

pub use client::ControlSession;
pub use config::ClientConfig;
pub use error::{FtpClientError, Result};
