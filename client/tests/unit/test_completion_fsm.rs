//! Completion FSM unit tests

use devtask::models::TaskStatus;
use devtask::tasks::{CompletionFsm, WaitState};

#[test]
fn test_fsm_initial_state() {
    let fsm = CompletionFsm::new();
    assert_eq!(fsm.state(), WaitState::Waiting);
    assert!(fsm.last_status().is_none());
    assert_eq!(fsm.polls(), 0);
}

#[test]
fn test_fsm_success_flow() {
    let mut fsm = CompletionFsm::new();

    // first observation always counts as a change
    assert!(fsm.observe(TaskStatus::Pending));
    assert_eq!(fsm.state(), WaitState::Waiting);

    assert!(fsm.observe(TaskStatus::Processing));
    assert!(!fsm.observe(TaskStatus::Processing));

    assert!(fsm.observe(TaskStatus::Completed));
    assert_eq!(fsm.state(), WaitState::Completed);
    assert_eq!(fsm.polls(), 4);
}

#[test]
fn test_fsm_failure_flow() {
    let mut fsm = CompletionFsm::new();

    fsm.observe(TaskStatus::Processing);
    fsm.observe(TaskStatus::Failed);

    assert_eq!(fsm.state(), WaitState::Failed);
    assert_eq!(fsm.last_status(), Some(TaskStatus::Failed));
}

#[test]
fn test_fsm_failed_checks_keep_waiting() {
    let mut fsm = CompletionFsm::new();

    fsm.observe(TaskStatus::Pending);
    fsm.check_failed();
    fsm.check_failed();

    assert_eq!(fsm.state(), WaitState::Waiting);
    assert_eq!(fsm.failed_polls(), 2);
    assert_eq!(fsm.polls(), 3);

    // a later status equal to the last one is not a change
    assert!(!fsm.observe(TaskStatus::Pending));
}

#[test]
fn test_fsm_expiry() {
    let mut fsm = CompletionFsm::new();
    fsm.observe(TaskStatus::Processing);
    fsm.expire();
    assert_eq!(fsm.state(), WaitState::TimedOut);

    // nothing moves a finished wait
    assert!(!fsm.observe(TaskStatus::Completed));
    assert_eq!(fsm.state(), WaitState::TimedOut);
}
