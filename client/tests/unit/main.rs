//! Unit tests

mod test_completion_fsm;
mod test_task_model;
