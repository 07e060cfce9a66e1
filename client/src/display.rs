//! Human-readable rendering for the CLI

use std::fmt::Write;
use std::time::Duration;

use colored::Colorize;

use crate::errors::ApiError;
use crate::models::{Statistics, Task, TaskStatus};
use crate::tasks::TaskObserver;
use crate::utils::format_secs;

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn status_label(status: TaskStatus) -> colored::ColoredString {
    let label = title_case(status.as_str());
    match status {
        TaskStatus::Pending => label.yellow(),
        TaskStatus::Processing => label.cyan(),
        TaskStatus::Completed => label.green(),
        TaskStatus::Failed => label.red(),
    }
}

/// One-line summary used by `list`
pub fn render_task_line(task: &Task) -> String {
    let priority = task.priority.map(|p| title_case(p.as_str())).unwrap_or_default();
    let mut line = format!(
        "#{:<6} {:<12} {:<8} {}",
        task.id,
        status_label(task.status()),
        priority,
        task.account_email.as_deref().unwrap_or("-")
    );
    if let Some(position) = task.queue_position() {
        let _ = write!(line, "  (queue #{})", position);
    }
    line
}

/// Multi-line task summary showing only the fields of its current stage
pub fn render_task_summary(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Task #{}", task.id).bold());
    if let Some(email) = &task.account_email {
        let _ = writeln!(out, "  Account: {}", email);
    }
    let _ = writeln!(
        out,
        "  Status: {} ({})",
        status_label(task.status()),
        task.status().code()
    );
    if let Some(priority) = task.priority {
        let _ = writeln!(out, "  Priority: {} ({})", title_case(priority.as_str()), priority.value());
    }
    if let Some(created_at) = &task.created_at {
        let _ = writeln!(out, "  Created: {}", created_at);
    }

    match task.status() {
        TaskStatus::Pending => {
            if let Some(position) = task.queue_position() {
                let _ = writeln!(out, "  Queue position: #{}", position);
            }
            let _ = writeln!(out, "  Can cancel: {}", yes_no(task.can_cancel()));
        }
        TaskStatus::Processing => {
            if let Some(server) = task.server_id() {
                let _ = writeln!(out, "  Server: {}", server);
            }
            if let Some(time) = task.processing_time() {
                let _ = writeln!(out, "  Processing time: {}", time);
            }
        }
        TaskStatus::Completed => {
            if let Some(completed_at) = task.completed_at() {
                let _ = writeln!(out, "  Completed: {}", completed_at);
            }
            if let Some(time) = task.processing_time() {
                let _ = writeln!(out, "  Processing time: {}", time);
            }
            if let Some(device) = task.device_info() {
                let _ = writeln!(out, "  Device: {}", device.name.as_deref().unwrap_or("Unknown"));
                let _ = writeln!(out, "  Country: {}", device.country.as_deref().unwrap_or("Unknown"));
            }
        }
        TaskStatus::Failed => {
            let _ = writeln!(
                out,
                "  Failed: {}",
                task.error_message().unwrap_or("Unknown error").red()
            );
            let _ = writeln!(out, "  Retry count: {}", task.retry_count().unwrap_or(0));
            let _ = writeln!(out, "  Can retry: {}", yes_no(task.can_retry()));
        }
    }
    out
}

/// Statistics report; empty sections are left out
pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    let overall = &stats.overall;

    let _ = writeln!(out, "{}", "TASK STATISTICS".bold());
    let _ = writeln!(out, "\nOverall:");
    let _ = writeln!(out, "  Total tasks: {}", overall.total_tasks);
    let _ = writeln!(out, "  Completed: {}", overall.completed);
    let _ = writeln!(out, "  Failed: {}", overall.failed);
    let _ = writeln!(out, "  Success rate: {}%", overall.success_rate);
    if let Some(avg) = &overall.avg_processing_time {
        let _ = writeln!(out, "  Avg processing time: {}", avg);
    }

    let _ = writeln!(out, "\nCurrent status:");
    let _ = writeln!(out, "  Pending: {}", overall.pending);
    let _ = writeln!(out, "  Processing: {}", overall.processing);

    if let Some(limits) = &overall.limits {
        let _ = writeln!(out, "\nLimits:");
        let _ = writeln!(out, "  Max pending: {}", limits.max_pending_tasks);
        let _ = writeln!(out, "  Max processing: {}", limits.max_processing_tasks);
        let _ = writeln!(out, "  Available slots: {}", limits.pending_slots_available);
        let _ = writeln!(out, "  Can create new: {}", yes_no(limits.can_create_new_task));
    }

    for (label, period) in [("Today", Some(&stats.today)), ("This week", stats.week.as_ref())] {
        let Some(period) = period.filter(|p| p.total > 0) else {
            continue;
        };
        let _ = writeln!(out, "\n{}:", label);
        let _ = writeln!(out, "  Total: {}", period.total);
        let _ = writeln!(out, "  Completed: {}", period.completed);
        let _ = writeln!(out, "  Failed: {}", period.failed);
        let _ = writeln!(out, "  Success rate: {}%", period.success_rate);
    }

    let used: Vec<_> = stats
        .priority_breakdown
        .values()
        .filter(|p| p.count > 0)
        .collect();
    if !used.is_empty() {
        let _ = writeln!(out, "\nPriority breakdown:");
        for priority in used {
            let _ = writeln!(
                out,
                "  {}: {}/{} ({}%)",
                title_case(&priority.name),
                priority.completed,
                priority.count,
                priority.success_rate
            );
        }
    }
    out
}

/// Prints wait progress to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl TaskObserver for ConsoleObserver {
    fn on_status_change(&self, task: &Task) {
        println!("Task #{}: {}", task.id, status_label(task.status()));
        if let Some(position) = task.queue_position() {
            println!("   Queue position: #{}", position);
        }
    }

    fn on_complete(&self, task: &Task) {
        println!("{}", format!("Task #{} completed successfully!", task.id).green());
        if let Some(device) = task.device_info() {
            println!("Device: {}", device.name.as_deref().unwrap_or("Unknown"));
            println!("Country: {}", device.country.as_deref().unwrap_or("Unknown"));
        }
    }

    fn on_fail(&self, task: &Task) {
        let message = format!(
            "Task #{} failed: {}",
            task.id,
            task.error_message().unwrap_or("Unknown error")
        );
        println!("{}", message.red());
    }

    fn on_poll_error(&self, _task_id: i64, error: &ApiError) {
        eprintln!("{} {}", "Error checking status:".red(), error);
    }

    fn on_timeout(&self, _task_id: i64, timeout: Duration) {
        println!("{}", format!("Timeout reached after {}s", format_secs(timeout)).yellow());
    }
}
