//! # atrium-core
//!
//! Foundation types for the Atrium real-time room coordinator.
//!
//! This crate provides the shared vocabulary the other Atrium crates depend on:
//!
//! - **Branded IDs**: `RoomId`, `ParticipantId`, `ConnectionId`, `MessageId`,
//!   `SubmissionId` as newtypes for type safety
//! - **Domain types**: `Participant`, `ChatMessage`, `Submission`,
//!   `ChallengePhase`, `RoomKind`
//! - **Constants**: history cap, message length cap, score awards
//! - **Errors**: `RoomError` hierarchy via `thiserror` with wire error codes

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod ids;
pub mod types;

pub use errors::RoomError;
pub use ids::{ConnectionId, MessageId, ParticipantId, RoomId, SubmissionId};
pub use types::{
    ChallengeParticipant, ChallengePhase, ChatMessage, MessageKind, Participant, RoomKind,
    Submission,
};
