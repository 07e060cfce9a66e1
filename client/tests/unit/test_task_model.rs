//! Task model unit tests

use serde_json::json;

use devtask::http::classify_response;
use devtask::models::{PriorityInput, Task, TaskPriority, TaskStatus};
use openapi_client::TaskRecord;

fn task_from_envelope(body: serde_json::Value) -> Task {
    let data = classify_response(200, &body.to_string()).unwrap();
    let record: TaskRecord = serde_json::from_value(data).unwrap();
    Task::try_from(record).unwrap()
}

#[test]
fn test_pending_snapshot() {
    let task = task_from_envelope(json!({
        "success": true,
        "data": {
            "id": 21,
            "account_email": "user@example.com",
            "status": "pending",
            "status_code": 0,
            "priority": 3,
            "priority_text": "urgent",
            "queue_position": 5,
            "can_cancel": true,
            "created_at": "2025-01-01 10:00:00"
        }
    }));
    assert_eq!(task.status(), TaskStatus::Pending);
    assert_eq!(task.priority, Some(TaskPriority::Urgent));
    assert_eq!(task.queue_position(), Some(5));
    assert!(task.can_cancel());
    assert!(!task.can_retry());
    assert!(task.completed_at().is_none());
}

#[test]
fn test_failed_snapshot() {
    let task = task_from_envelope(json!({
        "success": true,
        "data": {
            "id": 22,
            "status": "failed",
            "status_code": 3,
            "error_message": "Captcha rejected",
            "retry_count": 1,
            "can_retry": true,
            "can_cancel": true,
            "completed_at": "2025-01-01 10:05:00"
        }
    }));
    assert!(task.status().is_terminal());
    assert_eq!(task.error_message(), Some("Captcha rejected"));
    assert_eq!(task.completed_at(), Some("2025-01-01 10:05:00"));
    assert!(!task.can_cancel());
}

#[test]
fn test_priority_inputs() {
    let inputs: Vec<PriorityInput> = vec![
        TaskPriority::Urgent.into(),
        3.into(),
        json!(3).into(),
        json!({"value": 3}).into(),
    ];
    for input in inputs {
        assert_eq!(input.normalize().unwrap(), TaskPriority::Urgent);
    }
    assert!(PriorityInput::from(0).normalize().is_err());
}
