//! Challenge room behavior: submissions, vote tallying, scoring,
//! leaderboard, and the Active → Ended lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use atrium_core::constants::{SOCKET_LEADERBOARD_LIMIT, SUBMISSION_AWARD, VOTE_AWARD};
use atrium_core::{
    ChallengeParticipant, ChallengePhase, ConnectionId, ParticipantId, RoomError, RoomId,
    Submission, SubmissionId,
};
use atrium_protocol::{ClientFrame, ServerEvent};

use crate::command::Identity;
use crate::connection::SocketConnection;
use crate::roster::Roster;

/// A live challenge room.
///
/// Unlike chat, participant records survive disconnects: score history must
/// outlive the socket. All mutating operations are no-ops once the phase is
/// [`ChallengePhase::Ended`].
pub struct ChallengeRoom {
    id: RoomId,
    roster: Roster,
    participants: HashMap<ParticipantId, ChallengeParticipant>,
    submissions: HashMap<SubmissionId, Submission>,
    /// Submission ids in arrival order, for listing.
    order: Vec<SubmissionId>,
    phase: ChallengePhase,
}

impl ChallengeRoom {
    /// Create an active challenge room.
    #[must_use]
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            roster: Roster::new(),
            participants: HashMap::new(),
            submissions: HashMap::new(),
            order: Vec::new(),
            phase: ChallengePhase::Active,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ChallengePhase {
        self.phase
    }

    /// Admit an accepted socket.
    ///
    /// Sends the full state snapshot (phase, participants, submissions) to
    /// the new socket only, then announces the join to every other socket.
    /// A returning participant keeps their score and submission count.
    pub fn connect(&mut self, connection: Arc<SocketConnection>, identity: Identity) {
        let participant = self
            .participants
            .entry(identity.user_id.clone())
            .or_insert_with(|| {
                ChallengeParticipant::new(
                    identity.user_id.clone(),
                    identity.username.clone(),
                    identity.avatar_url.clone(),
                )
            });
        participant.info.username = identity.username;
        participant.info.avatar_url = identity.avatar_url;
        participant.info.touch();
        let joined = participant.clone();

        let connection_id = connection.id.clone();
        self.roster.insert(connection);
        debug!(room_id = %self.id, user_id = %joined.info.id, "participant connected to challenge");

        let _ = self.roster.send_to(
            &connection_id,
            &ServerEvent::ChallengeState {
                status: self.phase,
                participants: self.participants(),
                submissions: self.submissions(),
            },
        );
        let failed = self.roster.broadcast(
            &ServerEvent::ParticipantJoined { participant: joined },
            Some(&connection_id),
        );
        self.reap(failed);
    }

    /// Handle a socket close. The participant record is retained.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) {
        let failed = self.remove_session(connection_id);
        self.reap(failed);
    }

    /// Dispatch a parsed client frame.
    ///
    /// Submission and vote failures are deliberately not surfaced on this
    /// path; only an unsupported frame type earns an `error` event.
    pub fn handle_frame(&mut self, connection_id: &ConnectionId, frame: ClientFrame) {
        match frame {
            ClientFrame::SubmitEntry(payload) => {
                let Some(participant_id) = self.roster.participant_of(connection_id) else {
                    return;
                };
                let _ = self.submit(&participant_id, &payload.content, payload.file_url);
            }
            ClientFrame::CastVote(payload) => {
                let Some(participant_id) = self.roster.participant_of(connection_id) else {
                    return;
                };
                let _ = self.vote(&participant_id, &payload.submission_id);
            }
            ClientFrame::GetLeaderboard => {
                let top: Vec<_> = self
                    .leaderboard()
                    .into_iter()
                    .take(SOCKET_LEADERBOARD_LIMIT)
                    .collect();
                let _ = self
                    .roster
                    .send_to(connection_id, &ServerEvent::Leaderboard { leaderboard: top });
            }
            other => self.send_error(
                connection_id,
                format!(
                    "unsupported message type for challenge room: {}",
                    other.frame_type()
                ),
            ),
        }
    }

    /// Answer a single socket with an `error` event.
    pub fn send_error(&self, connection_id: &ConnectionId, message: String) {
        let _ = self.roster.send_to(connection_id, &ServerEvent::error(message));
    }

    /// Accept a submission from a tracked participant.
    ///
    /// Awards the author [`SUBMISSION_AWARD`] points and broadcasts
    /// `new_submission`. Once ended this is a silent no-op.
    pub fn submit(
        &mut self,
        author: &ParticipantId,
        content: &str,
        file_url: Option<String>,
    ) -> Result<(), RoomError> {
        if self.phase == ChallengePhase::Ended {
            return Ok(());
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(RoomError::invalid_params("content must not be empty"));
        }
        let username = {
            let Some(participant) = self.participants.get_mut(author) else {
                return Err(RoomError::not_found("participant", author.as_str()));
            };
            participant.submission_count += 1;
            participant.score += SUBMISSION_AWARD;
            participant.info.touch();
            participant.info.username.clone()
        };

        let submission = Submission::new(author.clone(), username, content.to_owned(), file_url);
        self.order.push(submission.id.clone());
        let _ = self
            .submissions
            .insert(submission.id.clone(), submission.clone());
        debug!(room_id = %self.id, user_id = %author, submission_id = %submission.id, "submission accepted");

        let failed = self
            .roster
            .broadcast(&ServerEvent::NewSubmission { submission }, None);
        self.reap(failed);
        Ok(())
    }

    /// Record a vote.
    ///
    /// The submission's author receives [`VOTE_AWARD`] points — not the
    /// voter. Self-votes and repeat votes are rejected; once ended this is
    /// a silent no-op.
    pub fn vote(
        &mut self,
        voter: &ParticipantId,
        submission_id: &SubmissionId,
    ) -> Result<(), RoomError> {
        if self.phase == ChallengePhase::Ended {
            return Ok(());
        }
        if !self.participants.contains_key(voter) {
            return Err(RoomError::not_found("participant", voter.as_str()));
        }
        let (vote_count, author_id) = {
            let Some(submission) = self.submissions.get_mut(submission_id) else {
                return Err(RoomError::not_found("submission", submission_id.as_str()));
            };
            if submission.user_id == *voter {
                return Err(RoomError::invalid_operation(
                    "voting for your own submission is not allowed",
                ));
            }
            if !submission.voters.insert(voter.clone()) {
                return Err(RoomError::invalid_operation(
                    "already voted on this submission",
                ));
            }
            submission.vote_count += 1;
            (submission.vote_count, submission.user_id.clone())
        };

        if let Some(author) = self.participants.get_mut(&author_id) {
            author.score += VOTE_AWARD;
        }
        if let Some(voting) = self.participants.get_mut(voter) {
            voting.info.touch();
        }

        let failed = self.roster.broadcast(
            &ServerEvent::VoteCast {
                submission_id: submission_id.clone(),
                vote_count,
                voter_id: voter.clone(),
            },
            None,
        );
        self.reap(failed);
        Ok(())
    }

    /// End the challenge.
    ///
    /// Returns `true` if this call performed the transition. Ending an
    /// already-ended room does nothing and broadcasts nothing.
    pub fn end(&mut self) -> bool {
        if self.phase == ChallengePhase::Ended {
            return false;
        }
        self.phase = ChallengePhase::Ended;
        debug!(room_id = %self.id, "challenge ended");
        let leaderboard = self.leaderboard();
        let failed = self
            .roster
            .broadcast(&ServerEvent::ChallengeEnded { leaderboard }, None);
        self.reap(failed);
        true
    }

    /// All tracked participants sorted by score descending, ties broken by
    /// ascending join time (earlier joiners rank higher).
    #[must_use]
    pub fn leaderboard(&self) -> Vec<ChallengeParticipant> {
        let mut standings: Vec<_> = self.participants.values().cloned().collect();
        standings.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.info.joined_at.cmp(&b.info.joined_at))
        });
        standings
    }

    /// All tracked participants, connected or not.
    #[must_use]
    pub fn participants(&self) -> Vec<ChallengeParticipant> {
        self.participants.values().cloned().collect()
    }

    /// All submissions in arrival order.
    #[must_use]
    pub fn submissions(&self) -> Vec<Submission> {
        self.order
            .iter()
            .filter_map(|id| self.submissions.get(id))
            .cloned()
            .collect()
    }

    /// Number of open sockets.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.roster.len()
    }

    /// Remove one session; returns broadcast failures for the caller to reap.
    fn remove_session(&mut self, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        let Some(connection) = self.roster.remove(connection_id) else {
            return Vec::new();
        };
        let participant_id = connection.participant_id.clone();
        if self.roster.session_count(&participant_id) > 0 {
            return Vec::new();
        }
        debug!(room_id = %self.id, user_id = %participant_id, "participant left challenge");
        // Record retained for score history; only the departure is announced
        self.roster.broadcast(
            &ServerEvent::ParticipantLeft {
                user_id: participant_id,
            },
            None,
        )
    }

    /// Treat failed deliveries as implicit disconnects until none remain.
    fn reap(&mut self, mut failed: Vec<ConnectionId>) {
        while let Some(connection_id) = failed.pop() {
            failed.extend(self.remove_session(&connection_id));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::sync::mpsc;

    fn identity(user: &str) -> Identity {
        Identity {
            user_id: ParticipantId::from(user),
            username: user.to_uppercase(),
            avatar_url: None,
        }
    }

    fn join(room: &mut ChallengeRoom, conn: &str, user: &str) -> mpsc::Receiver<Arc<String>> {
        let (tx, rx) = mpsc::channel(256);
        let connection = Arc::new(SocketConnection::new(
            ConnectionId::from(conn),
            ParticipantId::from(user),
            tx,
        ));
        room.connect(connection, identity(user));
        rx
    }

    fn drain(rx: &mut mpsc::Receiver<Arc<String>>) -> Vec<serde_json::Value> {
        let mut events = Vec::new();
        while let Ok(json) = rx.try_recv() {
            events.push(serde_json::from_str(&json).unwrap());
        }
        events
    }

    fn event_types(events: &[serde_json::Value]) -> Vec<String> {
        events
            .iter()
            .map(|v| v["type"].as_str().unwrap().to_owned())
            .collect()
    }

    fn score_of(room: &ChallengeRoom, user: &str) -> i64 {
        room.participants
            .get(&ParticipantId::from(user))
            .unwrap()
            .score
    }

    #[tokio::test]
    async fn connect_snapshot_carries_full_state() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        room.submit(&ParticipantId::from("a"), "entry", None).unwrap();
        let _ = drain(&mut rx_a);

        let mut rx_b = join(&mut room, "cb", "b");
        let events = drain(&mut rx_b);
        assert_eq!(event_types(&events), vec!["challenge_state"]);
        let data = &events[0]["data"];
        assert_eq!(data["status"], "active");
        assert_eq!(data["participants"].as_array().unwrap().len(), 2);
        assert_eq!(data["submissions"].as_array().unwrap().len(), 1);

        // The existing socket was told about the join
        let events = drain(&mut rx_a);
        assert_eq!(event_types(&events), vec!["participant_joined"]);
    }

    #[tokio::test]
    async fn submission_awards_author() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        let _ = drain(&mut rx_a);

        room.submit(&ParticipantId::from("a"), "Hello world", None)
            .unwrap();

        assert_eq!(room.submissions().len(), 1);
        assert_eq!(score_of(&room, "a"), 10);
        let participant = room.participants.get(&ParticipantId::from("a")).unwrap();
        assert_eq!(participant.submission_count, 1);
        let events = drain(&mut rx_a);
        assert_eq!(event_types(&events), vec!["new_submission"]);
    }

    #[tokio::test]
    async fn vote_awards_the_author_not_the_voter() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let _rx_a = join(&mut room, "ca", "a");
        let _rx_b = join(&mut room, "cb", "b");
        room.submit(&ParticipantId::from("a"), "Hello world", None)
            .unwrap();
        let submission_id = room.submissions()[0].id.clone();

        room.vote(&ParticipantId::from("b"), &submission_id).unwrap();

        let submission = &room.submissions()[0];
        assert_eq!(submission.vote_count, 1);
        assert_eq!(score_of(&room, "a"), 15);
        assert_eq!(score_of(&room, "b"), 0);
    }

    #[tokio::test]
    async fn repeat_vote_is_rejected() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let _rx_a = join(&mut room, "ca", "a");
        let _rx_b = join(&mut room, "cb", "b");
        room.submit(&ParticipantId::from("a"), "entry", None).unwrap();
        let submission_id = room.submissions()[0].id.clone();

        room.vote(&ParticipantId::from("b"), &submission_id).unwrap();
        let err = room
            .vote(&ParticipantId::from("b"), &submission_id)
            .unwrap_err();

        assert_matches!(err, RoomError::InvalidOperation { .. });
        assert_eq!(room.submissions()[0].vote_count, 1);
        assert_eq!(score_of(&room, "a"), 15, "no second award");
    }

    #[tokio::test]
    async fn self_vote_is_rejected() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let _rx_a = join(&mut room, "ca", "a");
        room.submit(&ParticipantId::from("a"), "entry", None).unwrap();
        let submission_id = room.submissions()[0].id.clone();

        let err = room
            .vote(&ParticipantId::from("a"), &submission_id)
            .unwrap_err();

        assert_matches!(err, RoomError::InvalidOperation { .. });
        let submission = &room.submissions()[0];
        assert_eq!(submission.vote_count, 0);
        assert!(!submission.voters.contains(&ParticipantId::from("a")));
    }

    #[tokio::test]
    async fn vote_on_unknown_submission_is_not_found() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let _rx_a = join(&mut room, "ca", "a");

        let err = room
            .vote(&ParticipantId::from("a"), &SubmissionId::from("ghost"))
            .unwrap_err();
        assert_matches!(err, RoomError::NotFound { entity: "submission", .. });
    }

    #[tokio::test]
    async fn vote_count_always_matches_voters() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let _rx_a = join(&mut room, "ca", "a");
        let _rx_b = join(&mut room, "cb", "b");
        let _rx_c = join(&mut room, "cc", "c");
        room.submit(&ParticipantId::from("a"), "entry", None).unwrap();
        let submission_id = room.submissions()[0].id.clone();

        room.vote(&ParticipantId::from("b"), &submission_id).unwrap();
        room.vote(&ParticipantId::from("c"), &submission_id).unwrap();
        let _ = room.vote(&ParticipantId::from("b"), &submission_id);
        let _ = room.vote(&ParticipantId::from("a"), &submission_id);

        let submission = &room.submissions()[0];
        assert_eq!(submission.vote_count as usize, submission.voters.len());
        assert!(!submission.voters.contains(&submission.user_id));
    }

    #[tokio::test]
    async fn empty_submission_is_invalid() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let _rx_a = join(&mut room, "ca", "a");
        let err = room
            .submit(&ParticipantId::from("a"), "   ", None)
            .unwrap_err();
        assert_matches!(err, RoomError::InvalidParams { .. });
        assert!(room.submissions().is_empty());
    }

    #[tokio::test]
    async fn submit_from_unknown_participant_is_not_found() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let err = room
            .submit(&ParticipantId::from("stranger"), "entry", None)
            .unwrap_err();
        assert_matches!(err, RoomError::NotFound { entity: "participant", .. });
    }

    #[tokio::test]
    async fn end_is_one_way_and_idempotent() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        let _ = drain(&mut rx_a);

        assert!(room.end());
        assert_eq!(room.phase(), ChallengePhase::Ended);
        assert!(!room.end(), "second end is a no-op");

        let events = drain(&mut rx_a);
        assert_eq!(
            event_types(&events),
            vec!["challenge_ended"],
            "exactly one ended broadcast"
        );
    }

    #[tokio::test]
    async fn ended_broadcast_carries_full_leaderboard() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        for i in 0..12 {
            let _ = join(&mut room, &format!("c{i}"), &format!("u{i}"));
        }
        let _ = drain(&mut rx_a);

        assert!(room.end());
        let events = drain(&mut rx_a);
        let entries = events[0]["data"]["leaderboard"].as_array().unwrap();
        assert_eq!(entries.len(), 13, "full list, not the socket top 10");
    }

    #[tokio::test]
    async fn mutations_after_end_change_nothing() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        let _rx_b = join(&mut room, "cb", "b");
        room.submit(&ParticipantId::from("a"), "entry", None).unwrap();
        assert!(room.end());
        let _ = drain(&mut rx_a);

        let submissions_before = room.submissions();
        let participants_before = room.participants();

        let submission_id = submissions_before[0].id.clone();
        assert!(room.submit(&ParticipantId::from("b"), "late", None).is_ok());
        assert!(room.vote(&ParticipantId::from("b"), &submission_id).is_ok());

        assert_eq!(room.submissions(), submissions_before);
        assert_eq!(room.participants(), participants_before);
        assert!(drain(&mut rx_a).is_empty(), "no broadcasts after end");
    }

    #[tokio::test]
    async fn leaderboard_sorts_by_score_then_join_time() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let _rx_a = join(&mut room, "ca", "a");
        let _rx_b = join(&mut room, "cb", "b");
        let _rx_c = join(&mut room, "cc", "c");
        // Stagger join times deterministically
        let base = chrono::Utc::now();
        for (user, offset) in [("a", 0), ("b", 1), ("c", 2)] {
            room.participants
                .get_mut(&ParticipantId::from(user))
                .unwrap()
                .info
                .joined_at = base + chrono::Duration::seconds(offset);
        }
        // b scores 10; a and c stay tied at 0
        room.submit(&ParticipantId::from("b"), "entry", None).unwrap();

        let standings = room.leaderboard();
        let order: Vec<_> = standings.iter().map(|p| p.info.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"], "tie broken by earlier join");
    }

    #[tokio::test]
    async fn socket_leaderboard_is_top_ten_to_requester_only() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        let mut rx_b = join(&mut room, "cb", "b");
        for i in 0..12 {
            let _ = join(&mut room, &format!("c{i}"), &format!("u{i}"));
        }
        let _ = drain(&mut rx_a);
        let _ = drain(&mut rx_b);

        room.handle_frame(
            &ConnectionId::from("ca"),
            ClientFrame::parse(r#"{"type":"get_leaderboard"}"#).unwrap(),
        );

        let events = drain(&mut rx_a);
        assert_eq!(event_types(&events), vec!["leaderboard"]);
        assert_eq!(
            events[0]["data"]["leaderboard"].as_array().unwrap().len(),
            SOCKET_LEADERBOARD_LIMIT
        );
        assert!(drain(&mut rx_b).is_empty(), "reply goes to the requester");
    }

    #[tokio::test]
    async fn disconnect_retains_participant_record() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let _rx_a = join(&mut room, "ca", "a");
        let mut rx_b = join(&mut room, "cb", "b");
        room.submit(&ParticipantId::from("a"), "entry", None).unwrap();
        let _ = drain(&mut rx_b);

        room.disconnect(&ConnectionId::from("ca"));

        assert_eq!(room.connection_count(), 1);
        assert_eq!(score_of(&room, "a"), 10, "score survives the socket");
        let events = drain(&mut rx_b);
        assert_eq!(event_types(&events), vec!["participant_left"]);
        assert_eq!(events[0]["data"]["user_id"], "a");
    }

    #[tokio::test]
    async fn returning_participant_keeps_score() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let _rx_a = join(&mut room, "ca", "a");
        room.submit(&ParticipantId::from("a"), "entry", None).unwrap();
        room.disconnect(&ConnectionId::from("ca"));

        let mut rx_back = join(&mut room, "ca2", "a");
        assert_eq!(score_of(&room, "a"), 10);
        let events = drain(&mut rx_back);
        let participants = events[0]["data"]["participants"].as_array().unwrap();
        assert_eq!(participants[0]["score"], 10);
    }

    #[tokio::test]
    async fn socket_submit_and_vote_flow() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        let mut rx_b = join(&mut room, "cb", "b");
        let _ = drain(&mut rx_a);
        let _ = drain(&mut rx_b);

        room.handle_frame(
            &ConnectionId::from("ca"),
            ClientFrame::parse(r#"{"type":"submit_entry","data":{"content":"via socket"}}"#)
                .unwrap(),
        );
        let events = drain(&mut rx_b);
        assert_eq!(event_types(&events), vec!["new_submission"]);
        let submission_id = events[0]["data"]["submission"]["id"].as_str().unwrap();

        room.handle_frame(
            &ConnectionId::from("cb"),
            ClientFrame::parse(&format!(
                r#"{{"type":"cast_vote","data":{{"submission_id":"{submission_id}"}}}}"#
            ))
            .unwrap(),
        );
        let events = drain(&mut rx_a);
        // a saw both its own submission and the vote
        assert_eq!(event_types(&events), vec!["new_submission", "vote_cast"]);
        assert_eq!(events[1]["data"]["vote_count"], 1);
    }

    #[tokio::test]
    async fn socket_vote_failures_are_silent() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        room.submit(&ParticipantId::from("a"), "entry", None).unwrap();
        let _ = drain(&mut rx_a);
        let submission_id = room.submissions()[0].id.clone();

        // Self-vote over the socket: no error event, no state change
        room.handle_frame(
            &ConnectionId::from("ca"),
            ClientFrame::parse(&format!(
                r#"{{"type":"cast_vote","data":{{"submission_id":"{submission_id}"}}}}"#
            ))
            .unwrap(),
        );
        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(room.submissions()[0].vote_count, 0);
    }

    #[tokio::test]
    async fn chat_frame_gets_error_reply() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        let _ = drain(&mut rx_a);

        room.handle_frame(
            &ConnectionId::from("ca"),
            ClientFrame::parse(r#"{"type":"send_message","data":{"message":"hi"}}"#).unwrap(),
        );
        let events = drain(&mut rx_a);
        assert_eq!(event_types(&events), vec!["error"]);
    }

    #[tokio::test]
    async fn dead_socket_is_evicted_during_broadcast() {
        let mut room = ChallengeRoom::new(RoomId::from("ch1"));
        let mut rx_a = join(&mut room, "ca", "a");
        let rx_b = join(&mut room, "cb", "b");
        let mut rx_c = join(&mut room, "cc", "c");
        let _ = drain(&mut rx_a);
        drop(rx_b);
        let _ = drain(&mut rx_c);

        room.submit(&ParticipantId::from("a"), "entry", None).unwrap();

        assert_eq!(room.connection_count(), 2);
        // b's record is retained even though its socket was evicted
        assert!(room.participants.contains_key(&ParticipantId::from("b")));
        let types_a = event_types(&drain(&mut rx_a));
        assert!(types_a.contains(&"new_submission".to_owned()));
        assert!(types_a.contains(&"participant_left".to_owned()));
        assert!(event_types(&drain(&mut rx_c)).contains(&"new_submission".to_owned()));
    }
}
