//! Fixed limits and score awards for room behavior.

/// Maximum number of chat messages retained per room. The oldest message is
/// evicted once the cap would be exceeded.
pub const HISTORY_CAP: usize = 1000;

/// Maximum chat message length in characters. Longer messages are dropped
/// without an error.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Points awarded to the author for each submission.
pub const SUBMISSION_AWARD: i64 = 10;

/// Points awarded to the submission's author for each vote received.
pub const VOTE_AWARD: i64 = 5;

/// Default page size for the message history control route.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Number of recent messages included in the connect snapshot.
pub const SNAPSHOT_HISTORY_LIMIT: usize = 50;

/// Leaderboard size returned for a socket-originated request. The end-of-
/// challenge broadcast carries the full list.
pub const SOCKET_LEADERBOARD_LIMIT: usize = 10;
