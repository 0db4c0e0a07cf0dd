//! Control session
//!
//! Handles the control connection, session state, and the operations a
//! caller performs on a connected session.

pub mod operations;
pub mod results;
pub mod session;
pub mod state;

pub use results::{DisconnectResult, LoginResult};
pub use session::ControlSession;
pub use state::SessionState;
