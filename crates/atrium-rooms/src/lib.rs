//! # atrium-rooms
//!
//! The room coordinator core: each room is a single-owner actor addressed by
//! room id. One spawned task owns the room's state and drains its command
//! channel serially, so all in-room bookkeeping is mutated without locks.
//!
//! - [`connection::SocketConnection`] — one open socket's outbound channel
//! - [`roster::Roster`] — session registry + broadcast engine
//! - [`chat::ChatRoom`] / [`challenge::ChallengeRoom`] — the two behaviors
//! - [`actor`] — the command loop and [`actor::RoomHandle`]
//! - [`registry::RoomRegistry`] — room id → exclusive owner

#![deny(unsafe_code)]

pub mod actor;
pub mod challenge;
pub mod chat;
pub mod command;
pub mod connection;
pub mod registry;
pub mod roster;

pub use actor::RoomHandle;
pub use challenge::ChallengeRoom;
pub use chat::ChatRoom;
pub use command::{Identity, RoomCommand};
pub use connection::SocketConnection;
pub use registry::RoomRegistry;
pub use roster::Roster;
