//! Integration tests against an in-process mock API

mod common;
mod test_tasks;
mod test_transport;
