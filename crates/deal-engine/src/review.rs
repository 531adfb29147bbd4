//! Review lifecycle for matched deals.
//!
//! Reviews move NEW -> REVIEWING -> ACCEPTED | DECLINED, with RESET
//! returning any non-NEW state to NEW. Every transition is recorded in an
//! audit trail.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle state of a deal review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// Awaiting review.
    New,
    /// Under active review.
    Reviewing,
    /// Approved for investor presentation.
    Accepted,
    /// Rejected, with reasons.
    Declined,
}

impl ReviewState {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewState::New => "new",
            ReviewState::Reviewing => "reviewing",
            ReviewState::Accepted => "accepted",
            ReviewState::Declined => "declined",
        }
    }

    pub const ALL: [ReviewState; 4] = [
        ReviewState::New,
        ReviewState::Reviewing,
        ReviewState::Accepted,
        ReviewState::Declined,
    ];
}

/// Action that can transition a review's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    StartReview,
    Accept,
    Decline,
    /// Return to NEW (admin only).
    Reset,
}

impl ReviewAction {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewAction::StartReview => "start_review",
            ReviewAction::Accept => "accept",
            ReviewAction::Decline => "decline",
            ReviewAction::Reset => "reset",
        }
    }
}

/// The full transition table.
const fn next_state(state: ReviewState, action: ReviewAction) -> Option<ReviewState> {
    match (state, action) {
        (ReviewState::New, ReviewAction::StartReview) => Some(ReviewState::Reviewing),
        (ReviewState::Reviewing, ReviewAction::Accept) => Some(ReviewState::Accepted),
        (ReviewState::Reviewing, ReviewAction::Decline) => Some(ReviewState::Declined),
        (ReviewState::Reviewing, ReviewAction::Reset)
        | (ReviewState::Accepted, ReviewAction::Reset)
        | (ReviewState::Declined, ReviewAction::Reset) => Some(ReviewState::New),
        _ => None,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("cannot perform '{}' from state '{}'", action.label(), state.label())]
    InvalidTransition {
        state: ReviewState,
        action: ReviewAction,
    },
}

/// Record of a state transition in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from_state: ReviewState,
    pub to_state: ReviewState,
    pub action: ReviewAction,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    #[serde(default)]
    pub notes: String,
}

/// Review record for a listing-mandate match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealReview {
    pub review_id: String,
    pub listing_id: String,
    pub mandate_id: String,
    pub state: ReviewState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// 1 = highest, 5 = lowest.
    pub priority: u8,
    #[serde(default)]
    pub decision_notes: String,
    #[serde(default)]
    pub decline_reasons: Vec<String>,
    #[serde(default)]
    pub history: Vec<StateTransition>,
}

impl DealReview {
    /// Create a new review in the NEW state with a generated id.
    pub fn new(listing_id: &str, mandate_id: &str, priority: u8, assigned_to: Option<String>) -> Self {
        let review_id = format!(
            "REV-{}",
            Uuid::new_v4().simple().to_string()[..8].to_uppercase()
        );
        let now = Utc::now();

        DealReview {
            review_id,
            listing_id: listing_id.to_string(),
            mandate_id: mandate_id.to_string(),
            state: ReviewState::New,
            created_at: now,
            updated_at: now,
            assigned_to,
            priority,
            decision_notes: String::new(),
            decline_reasons: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn can_transition(&self, action: ReviewAction) -> bool {
        next_state(self.state, action).is_some()
    }

    pub fn valid_actions(&self) -> Vec<ReviewAction> {
        [
            ReviewAction::StartReview,
            ReviewAction::Accept,
            ReviewAction::Decline,
            ReviewAction::Reset,
        ]
        .into_iter()
        .filter(|action| self.can_transition(*action))
        .collect()
    }

    /// Apply a transition, recording it in the audit trail.
    pub fn transition(
        &mut self,
        action: ReviewAction,
        actor: &str,
        notes: &str,
    ) -> Result<ReviewState, ReviewError> {
        let to_state = next_state(self.state, action).ok_or(ReviewError::InvalidTransition {
            state: self.state,
            action,
        })?;

        let now = Utc::now();
        self.history.push(StateTransition {
            from_state: self.state,
            to_state,
            action,
            timestamp: now,
            actor: actor.to_string(),
            notes: notes.to_string(),
        });
        self.state = to_state;
        self.updated_at = now;

        Ok(to_state)
    }

    pub fn start_review(&mut self, actor: &str, notes: &str) -> Result<ReviewState, ReviewError> {
        self.transition(ReviewAction::StartReview, actor, notes)
    }

    pub fn accept(&mut self, actor: &str, notes: &str) -> Result<ReviewState, ReviewError> {
        self.decision_notes = notes.to_string();
        self.transition(ReviewAction::Accept, actor, notes)
    }

    pub fn decline(
        &mut self,
        actor: &str,
        reasons: Vec<String>,
        notes: &str,
    ) -> Result<ReviewState, ReviewError> {
        self.decline_reasons = reasons;
        self.decision_notes = notes.to_string();
        self.transition(ReviewAction::Decline, actor, notes)
    }

    pub fn reset(&mut self, actor: &str, notes: &str) -> Result<ReviewState, ReviewError> {
        self.transition(ReviewAction::Reset, actor, notes)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, ReviewState::New | ReviewState::Reviewing)
    }

    pub fn is_decided(&self) -> bool {
        matches!(self.state, ReviewState::Accepted | ReviewState::Declined)
    }

    /// Hours between the last StartReview and the subsequent decision, if
    /// both are present in the history.
    pub fn time_in_review(&self) -> Option<f64> {
        let mut started = None;
        let mut decided = None;

        for transition in &self.history {
            match transition.action {
                ReviewAction::StartReview => started = Some(transition.timestamp),
                ReviewAction::Accept | ReviewAction::Decline => {
                    decided = Some(transition.timestamp);
                }
                ReviewAction::Reset => {}
            }
        }

        match (started, decided) {
            (Some(start), Some(end)) => Some((end - start).num_seconds() as f64 / 3600.0),
            _ => None,
        }
    }
}

/// Queue statistics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub by_state: HashMap<&'static str, usize>,
    pub pending_count: usize,
    pub decided_count: usize,
    pub avg_priority: f64,
}

/// In-memory queue of deal reviews with filtering and batch queries.
#[derive(Debug, Default)]
pub struct ReviewQueue {
    reviews: HashMap<String, DealReview>,
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, review: DealReview) {
        self.reviews.insert(review.review_id.clone(), review);
    }

    pub fn get(&self, review_id: &str) -> Option<&DealReview> {
        self.reviews.get(review_id)
    }

    pub fn remove(&mut self, review_id: &str) -> Option<DealReview> {
        self.reviews.remove(review_id)
    }

    pub fn all(&self) -> Vec<&DealReview> {
        self.reviews.values().collect()
    }

    pub fn by_state(&self, state: ReviewState) -> Vec<&DealReview> {
        self.reviews.values().filter(|r| r.state == state).collect()
    }

    pub fn by_mandate(&self, mandate_id: &str) -> Vec<&DealReview> {
        self.reviews
            .values()
            .filter(|r| r.mandate_id == mandate_id)
            .collect()
    }

    pub fn pending(&self) -> Vec<&DealReview> {
        self.reviews.values().filter(|r| r.is_pending()).collect()
    }

    pub fn decided(&self) -> Vec<&DealReview> {
        self.reviews.values().filter(|r| r.is_decided()).collect()
    }

    /// Reviews at or above the given priority threshold, best first.
    pub fn by_priority(&self, max_priority: u8) -> Vec<&DealReview> {
        let mut matched: Vec<&DealReview> = self
            .reviews
            .values()
            .filter(|r| r.priority <= max_priority)
            .collect();
        matched.sort_by_key(|r| r.priority);
        matched
    }

    /// Transition a review in place by id.
    pub fn transition(
        &mut self,
        review_id: &str,
        action: ReviewAction,
        actor: &str,
        notes: &str,
    ) -> Option<Result<ReviewState, ReviewError>> {
        self.reviews
            .get_mut(review_id)
            .map(|review| review.transition(action, actor, notes))
    }

    pub fn stats(&self) -> QueueStats {
        let reviews: Vec<&DealReview> = self.reviews.values().collect();
        let total = reviews.len();

        let mut by_state = HashMap::new();
        for state in ReviewState::ALL {
            by_state.insert(
                state.label(),
                reviews.iter().filter(|r| r.state == state).count(),
            );
        }

        let avg_priority = if total == 0 {
            0.0
        } else {
            reviews.iter().map(|r| f64::from(r.priority)).sum::<f64>() / total as f64
        };

        QueueStats {
            total,
            by_state,
            pending_count: reviews.iter().filter(|r| r.is_pending()).count(),
            decided_count: reviews.iter().filter(|r| r.is_decided()).count(),
            avg_priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review() -> DealReview {
        DealReview::new("L-1", "MAND-001", 2, None)
    }

    #[test]
    fn new_review_has_generated_id_and_new_state() {
        let r = review();
        assert!(r.review_id.starts_with("REV-"));
        assert_eq!(r.review_id.len(), 12);
        assert_eq!(r.state, ReviewState::New);
        assert!(r.is_pending());
        assert!(!r.is_decided());
        assert!(r.history.is_empty());
    }

    #[test]
    fn full_transition_table() {
        use ReviewAction::*;
        use ReviewState::*;

        let table = [
            (New, StartReview, Some(Reviewing)),
            (New, Accept, None),
            (New, Decline, None),
            (New, Reset, None),
            (Reviewing, StartReview, None),
            (Reviewing, Accept, Some(Accepted)),
            (Reviewing, Decline, Some(Declined)),
            (Reviewing, Reset, Some(New)),
            (Accepted, StartReview, None),
            (Accepted, Accept, None),
            (Accepted, Decline, None),
            (Accepted, Reset, Some(New)),
            (Declined, StartReview, None),
            (Declined, Accept, None),
            (Declined, Decline, None),
            (Declined, Reset, Some(New)),
        ];

        for (state, action, expected) in table {
            assert_eq!(next_state(state, action), expected, "{state:?} + {action:?}");
        }
    }

    #[test]
    fn invalid_transition_is_an_error_and_leaves_state_unchanged() {
        let mut r = review();
        let err = r.accept("alex", "").unwrap_err();
        assert_eq!(
            err,
            ReviewError::InvalidTransition {
                state: ReviewState::New,
                action: ReviewAction::Accept,
            }
        );
        assert_eq!(
            err.to_string(),
            "cannot perform 'accept' from state 'new'"
        );
        assert_eq!(r.state, ReviewState::New);
        assert!(r.history.is_empty());
    }

    #[test]
    fn accept_flow_records_audit_trail() {
        let mut r = review();
        r.start_review("alex", "picking this up").unwrap();
        r.accept("alex", "strong yield").unwrap();

        assert_eq!(r.state, ReviewState::Accepted);
        assert!(r.is_decided());
        assert_eq!(r.decision_notes, "strong yield");
        assert_eq!(r.history.len(), 2);
        assert_eq!(r.history[0].action, ReviewAction::StartReview);
        assert_eq!(r.history[1].from_state, ReviewState::Reviewing);
        assert_eq!(r.history[1].to_state, ReviewState::Accepted);
        assert_eq!(r.history[1].actor, "alex");
        assert!(r.time_in_review().is_some());
    }

    #[test]
    fn decline_captures_reasons_then_reset_returns_to_new() {
        let mut r = review();
        r.start_review("sam", "").unwrap();
        r.decline("sam", vec!["yield below target".to_string()], "pass for now")
            .unwrap();
        assert_eq!(r.state, ReviewState::Declined);
        assert_eq!(r.decline_reasons, vec!["yield below target".to_string()]);

        r.reset("admin", "re-opening").unwrap();
        assert_eq!(r.state, ReviewState::New);
        assert_eq!(r.history.len(), 3);
        // Decision details survive a reset; only state moves.
        assert_eq!(r.decision_notes, "pass for now");
    }

    #[test]
    fn valid_actions_track_state() {
        let mut r = review();
        assert_eq!(r.valid_actions(), vec![ReviewAction::StartReview]);

        r.start_review("alex", "").unwrap();
        assert_eq!(
            r.valid_actions(),
            vec![
                ReviewAction::Accept,
                ReviewAction::Decline,
                ReviewAction::Reset
            ]
        );

        r.accept("alex", "").unwrap();
        assert_eq!(r.valid_actions(), vec![ReviewAction::Reset]);
    }

    #[test]
    fn time_in_review_requires_both_start_and_decision() {
        let mut r = review();
        assert_eq!(r.time_in_review(), None);
        r.start_review("alex", "").unwrap();
        assert_eq!(r.time_in_review(), None);
        r.accept("alex", "").unwrap();
        let hours = r.time_in_review().unwrap();
        assert!(hours >= 0.0 && hours < 1.0);
    }

    #[test]
    fn queue_filters_and_stats() {
        let mut queue = ReviewQueue::new();

        let mut accepted = DealReview::new("L-1", "MAND-001", 1, None);
        accepted.start_review("alex", "").unwrap();
        accepted.accept("alex", "").unwrap();
        let accepted_id = accepted.review_id.clone();

        let pending = DealReview::new("L-2", "MAND-001", 4, Some("sam".to_string()));
        let other_mandate = DealReview::new("L-3", "MAND-002", 2, None);

        queue.add(accepted);
        queue.add(pending);
        queue.add(other_mandate);

        assert_eq!(queue.all().len(), 3);
        assert_eq!(queue.by_state(ReviewState::Accepted).len(), 1);
        assert_eq!(queue.by_mandate("MAND-001").len(), 2);
        assert_eq!(queue.pending().len(), 2);
        assert_eq!(queue.decided().len(), 1);

        let high_priority = queue.by_priority(2);
        assert_eq!(high_priority.len(), 2);
        assert!(high_priority[0].priority <= high_priority[1].priority);

        let stats = queue.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_state["accepted"], 1);
        assert_eq!(stats.by_state["new"], 2);
        assert_eq!(stats.pending_count, 2);
        assert!((stats.avg_priority - 7.0 / 3.0).abs() < 1e-9);

        assert!(queue.get(&accepted_id).is_some());
        assert!(queue.remove(&accepted_id).is_some());
        assert!(queue.get(&accepted_id).is_none());
    }

    #[test]
    fn queue_level_transition() {
        let mut queue = ReviewQueue::new();
        let r = DealReview::new("L-1", "MAND-001", 3, None);
        let id = r.review_id.clone();
        queue.add(r);

        let result = queue
            .transition(&id, ReviewAction::StartReview, "alex", "")
            .unwrap();
        assert_eq!(result, Ok(ReviewState::Reviewing));
        assert_eq!(queue.get(&id).unwrap().state, ReviewState::Reviewing);

        assert!(queue
            .transition("missing", ReviewAction::StartReview, "alex", "")
            .is_none());
    }

    #[test]
    fn review_serializes_round_trip() {
        let mut r = review();
        r.start_review("alex", "notes").unwrap();
        let json = serde_json::to_string(&r).unwrap();
        let back: DealReview = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
