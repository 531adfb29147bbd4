//! Review lifecycle integration: state machine, audit trail, and queue
//! behavior across a realistic reviewing session.

use deal_engine::review::{DealReview, ReviewAction, ReviewError, ReviewQueue, ReviewState};

#[test]
fn only_start_review_leaves_the_new_state() {
    let mut review = DealReview::new("L-1", "MAND-001", 2, None);

    for action in [ReviewAction::Accept, ReviewAction::Decline, ReviewAction::Reset] {
        let err = review.transition(action, "alex", "").unwrap_err();
        assert!(matches!(err, ReviewError::InvalidTransition { .. }));
        assert_eq!(review.state, ReviewState::New);
    }

    review.start_review("alex", "").unwrap();
    assert_eq!(review.state, ReviewState::Reviewing);
}

#[test]
fn decided_states_only_allow_reset() {
    let mut accepted = DealReview::new("L-1", "MAND-001", 2, None);
    accepted.start_review("alex", "").unwrap();
    accepted.accept("alex", "good fit").unwrap();

    for action in [
        ReviewAction::StartReview,
        ReviewAction::Accept,
        ReviewAction::Decline,
    ] {
        assert!(accepted.transition(action, "alex", "").is_err());
    }
    accepted.reset("admin", "").unwrap();
    assert_eq!(accepted.state, ReviewState::New);

    let mut declined = DealReview::new("L-2", "MAND-001", 2, None);
    declined.start_review("sam", "").unwrap();
    declined
        .decline("sam", vec!["yield too thin".to_string()], "")
        .unwrap();
    assert_eq!(declined.valid_actions(), vec![ReviewAction::Reset]);
}

#[test]
fn audit_trail_captures_every_transition_in_order() {
    let mut review = DealReview::new("L-1", "MAND-001", 1, Some("alex".to_string()));
    review.start_review("alex", "taking a look").unwrap();
    review.reset("admin", "reassigning").unwrap();
    review.start_review("sam", "second pass").unwrap();
    review.accept("sam", "approved for presentation").unwrap();

    let actions: Vec<ReviewAction> = review.history.iter().map(|t| t.action).collect();
    assert_eq!(
        actions,
        vec![
            ReviewAction::StartReview,
            ReviewAction::Reset,
            ReviewAction::StartReview,
            ReviewAction::Accept,
        ]
    );
    let actors: Vec<&str> = review.history.iter().map(|t| t.actor.as_str()).collect();
    assert_eq!(actors, vec!["alex", "admin", "sam", "sam"]);
    for transition in &review.history {
        assert!(transition.timestamp <= review.updated_at);
    }
    assert_eq!(review.decision_notes, "approved for presentation");
}

#[test]
fn queue_views_track_a_reviewing_session() {
    let mut queue = ReviewQueue::new();

    let urgent = DealReview::new("L-1", "MAND-001", 1, Some("alex".to_string()));
    let urgent_id = urgent.review_id.clone();
    let routine = DealReview::new("L-2", "MAND-001", 4, None);
    let other = DealReview::new("L-3", "MAND-002", 2, None);
    queue.add(urgent);
    queue.add(routine);
    queue.add(other);

    queue
        .transition(&urgent_id, ReviewAction::StartReview, "alex", "")
        .expect("review exists")
        .expect("transition valid");
    queue
        .transition(&urgent_id, ReviewAction::Accept, "alex", "strong deal")
        .expect("review exists")
        .expect("transition valid");

    assert_eq!(queue.by_state(ReviewState::Accepted).len(), 1);
    assert_eq!(queue.pending().len(), 2);
    assert_eq!(queue.decided().len(), 1);
    assert_eq!(queue.by_mandate("MAND-002").len(), 1);

    let prioritized = queue.by_priority(2);
    assert_eq!(prioritized.len(), 2);
    assert_eq!(prioritized[0].priority, 1);

    let stats = queue.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_state["accepted"], 1);
    assert_eq!(stats.pending_count, 2);
    assert_eq!(stats.decided_count, 1);
}
