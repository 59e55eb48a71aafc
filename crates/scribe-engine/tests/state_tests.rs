use proptest::prelude::*;
use scribe_engine::state_machine::{allowed_transitions, validate_transition};
use scribe_engine::JobStatus;

#[test]
fn test_queued_transitions() {
    assert!(validate_transition(JobStatus::Queued, JobStatus::Running).is_ok());
    assert!(validate_transition(JobStatus::Queued, JobStatus::CancelRequested).is_ok());
    assert!(validate_transition(JobStatus::Queued, JobStatus::Cancelled).is_ok());

    // Invalid
    assert!(validate_transition(JobStatus::Queued, JobStatus::Completed).is_err());
    assert!(validate_transition(JobStatus::Queued, JobStatus::Failed).is_err());
}

#[test]
fn test_terminal_transitions() {
    // No transition leaves a terminal state except via retry, which
    // creates a new job instead of mutating the old one.
    for terminal in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
        for target in ALL_STATUSES {
            assert!(validate_transition(terminal, target).is_err());
        }
    }
}

const ALL_STATUSES: [JobStatus; 6] = [
    JobStatus::Queued,
    JobStatus::Running,
    JobStatus::CancelRequested,
    JobStatus::Completed,
    JobStatus::Failed,
    JobStatus::Cancelled,
];

proptest! {
    #[test]
    fn prop_validation_matches_allowed_set(
        from in prop_oneof![
            Just(JobStatus::Queued),
            Just(JobStatus::Running),
            Just(JobStatus::CancelRequested),
            Just(JobStatus::Completed),
            Just(JobStatus::Failed),
            Just(JobStatus::Cancelled),
        ],
        to in prop_oneof![
            Just(JobStatus::Queued),
            Just(JobStatus::Running),
            Just(JobStatus::CancelRequested),
            Just(JobStatus::Completed),
            Just(JobStatus::Failed),
            Just(JobStatus::Cancelled),
        ]
    ) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_terminal_states_are_sinks(
        to in prop_oneof![
            Just(JobStatus::Queued),
            Just(JobStatus::Running),
            Just(JobStatus::CancelRequested),
            Just(JobStatus::Completed),
            Just(JobStatus::Failed),
            Just(JobStatus::Cancelled),
        ]
    ) {
        for from in ALL_STATUSES {
            if from.is_terminal() {
                prop_assert!(validate_transition(from, to).is_err());
            }
        }
    }
}
