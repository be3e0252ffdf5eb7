//! # atrium-protocol
//!
//! Wire-format types for the Atrium room coordinator.
//!
//! - **Client frames**: the bidirectional socket envelope is
//!   `{type: string, data: object}`; [`frame::ClientFrame`] parses the
//!   client→server direction in two steps so unknown types surface as a
//!   typed error the session loop can answer.
//! - **Server events**: [`events::ServerEvent`] serializes to exactly the
//!   same envelope for the server→client direction.
//! - **REST responses**: the control surface envelope
//!   `{success, data?, error?}`.

#![deny(unsafe_code)]

pub mod events;
pub mod frame;
pub mod response;

pub use events::ServerEvent;
pub use frame::{ClientFrame, FrameError};
pub use response::{ApiError, ApiResponse, MessagesResponse};
