// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};
use workdesk_app::{
    DashboardData, DashboardStats, EmployeeStats, LoadError, LoadOutcome, LoadTicket,
    RecentAssignment, TaskStats, UpcomingTask, UserActivity,
};

use crate::InternalEvent;

/// Stats shown on the landing view plus the timer that keeps them fresh.
#[derive(Debug, Default)]
pub struct DashboardPane {
    data: Option<DashboardData>,
    issued: Option<LoadTicket>,
    last_error: Option<LoadError>,
    timer: Option<RefreshTimer>,
}

impl DashboardPane {
    pub fn stats(&self) -> Option<&DashboardStats> {
        self.data.as_ref().map(|data| &data.stats)
    }

    /// Upcoming and recent work; only user sessions have any.
    pub fn activity(&self) -> Option<&UserActivity> {
        self.data.as_ref().and_then(|data| data.activity.as_ref())
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    pub fn is_polling(&self) -> bool {
        self.timer.is_some()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = LoadTicket::issue();
        self.issued = Some(ticket);
        ticket
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DashboardData, LoadError>,
    ) -> Result<LoadOutcome, LoadError> {
        if self.issued != Some(ticket) {
            debug!(
                sequence = ticket.sequence(),
                latest = self.issued.map(LoadTicket::sequence),
                "discarding stale dashboard stats"
            );
            return Ok(LoadOutcome::Stale);
        }
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.last_error = None;
                Ok(LoadOutcome::Applied { count: 1 })
            }
            Err(error) => {
                warn!(%error, "dashboard stats failed");
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    pub fn start_polling(&mut self, interval: Duration, tx: Sender<InternalEvent>) {
        if interval.is_zero() {
            return;
        }
        self.timer = Some(RefreshTimer::start(interval, tx));
    }
}

/// Fetches employee and task counts side by side and combines them.
///
/// `employees` is `None` for sessions that may not read the roster.
pub fn join_stats<E, T>(employees: Option<E>, tasks: T) -> Result<DashboardStats, LoadError>
where
    E: FnOnce() -> Result<EmployeeStats, LoadError> + Send,
    T: FnOnce() -> Result<TaskStats, LoadError> + Send,
{
    let (employees, tasks) = thread::scope(|scope| {
        let employee_handle = employees.map(|fetch| scope.spawn(fetch));
        let tasks = tasks();
        let employees = employee_handle.map(|handle| {
            handle
                .join()
                .unwrap_or_else(|_| Err(LoadError::Decode("employee stats worker panicked".into())))
        });
        (employees, tasks)
    });
    let employees = employees.transpose()?;
    Ok(DashboardStats::from_parts(employees, tasks?))
}

/// A user's dashboard: their counts plus upcoming and recently assigned
/// work, fetched side by side.
pub fn join_activity<S, U, R>(stats: S, upcoming: U, recent: R) -> Result<DashboardData, LoadError>
where
    S: FnOnce() -> Result<TaskStats, LoadError> + Send,
    U: FnOnce() -> Result<Vec<UpcomingTask>, LoadError> + Send,
    R: FnOnce() -> Result<Vec<RecentAssignment>, LoadError> + Send,
{
    let (stats, upcoming, recent) = thread::scope(|scope| {
        let upcoming = scope.spawn(upcoming);
        let recent = scope.spawn(recent);
        let stats = stats();
        let panicked = |what: &str| LoadError::Decode(format!("{what} worker panicked"));
        (
            stats,
            upcoming.join().unwrap_or_else(|_| Err(panicked("upcoming tasks"))),
            recent.join().unwrap_or_else(|_| Err(panicked("recent assignments"))),
        )
    });
    Ok(DashboardData {
        stats: DashboardStats::from_parts(None, stats?),
        activity: Some(UserActivity {
            upcoming: upcoming?,
            recent: recent?,
        }),
    })
}

/// Sends [`InternalEvent::RefreshDashboard`] every `interval` until stopped
/// or dropped.
#[derive(Debug)]
pub struct RefreshTimer {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTimer {
    pub fn start(interval: Duration, tx: Sender<InternalEvent>) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tx.send(InternalEvent::RefreshDashboard).is_err() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        debug!(interval_ms = interval.as_millis() as u64, "dashboard polling started");
        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("dashboard timer thread panicked");
            }
            debug!("dashboard polling stopped");
        }
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::{DashboardPane, RefreshTimer, join_activity, join_stats};
    use crate::InternalEvent;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use workdesk_app::{
        DashboardData, EmployeeStats, LoadError, LoadOutcome, TaskId, TaskStats, TaskStatus,
        TaskType, UpcomingTask,
    };

    fn task_stats() -> TaskStats {
        TaskStats {
            total_tasks: 12,
            pending_tasks: 4,
            in_progress_tasks: 3,
            completed_tasks: 5,
            overdue_tasks: Some(2),
        }
    }

    #[test]
    fn stats_are_fetched_concurrently_and_combined() {
        let (started_tx, started_rx) = mpsc::channel();
        let stats = join_stats(
            Some(move || {
                started_tx.send(()).expect("signal employee fetch");
                Ok(EmployeeStats { total_employees: 40 })
            }),
            move || {
                // Blocks until the employee fetch is running on its own thread.
                started_rx
                    .recv_timeout(Duration::from_secs(2))
                    .map_err(|_| LoadError::Unreachable("employee fetch never started".into()))?;
                Ok(task_stats())
            },
        )
        .expect("join stats");
        assert_eq!(stats.total_employees, Some(40));
        assert_eq!(stats.total_tasks, 12);
        assert_eq!(stats.active_tasks, 7);
        assert_eq!(stats.overdue_tasks, Some(2));
    }

    #[test]
    fn either_failure_fails_the_whole_fetch() {
        let error = join_stats(
            Some(|| Err(LoadError::Unreachable("down".into()))),
            || Ok(task_stats()),
        )
        .expect_err("employee failure propagates");
        assert_eq!(error, LoadError::Unreachable("down".into()));

        let stats = join_stats(
            None::<fn() -> Result<EmployeeStats, LoadError>>,
            || Ok(task_stats()),
        )
        .expect("task stats alone");
        assert_eq!(stats.total_employees, None);
    }

    #[test]
    fn stale_dashboard_results_are_ignored() {
        let mut pane = DashboardPane::default();
        let first = pane.begin_load();
        let second = pane.begin_load();

        let outcome = pane
            .finish_load(first, Err(LoadError::Decode("old".into())))
            .expect("stale result is not an error");
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(pane.last_error().is_none());

        let stats = join_stats(None::<fn() -> Result<EmployeeStats, LoadError>>, || {
            Ok(task_stats())
        })
        .expect("stats");
        pane.finish_load(
            second,
            Ok(DashboardData {
                stats,
                activity: None,
            }),
        )
        .expect("apply");
        assert_eq!(pane.stats().map(|stats| stats.completed_tasks), Some(5));
        assert!(pane.activity().is_none());
    }

    #[test]
    fn user_activity_is_fetched_alongside_counts() {
        let (started_tx, started_rx) = mpsc::channel();
        let data = join_activity(
            move || {
                started_rx
                    .recv_timeout(Duration::from_secs(2))
                    .map_err(|_| LoadError::Unreachable("upcoming fetch never started".into()))?;
                Ok(task_stats())
            },
            move || {
                started_tx.send(()).expect("signal upcoming fetch");
                Ok(vec![UpcomingTask {
                    id: TaskId::new(4),
                    title: "Calibrate press".into(),
                    description: String::new(),
                    task_type: TaskType::Maintenance,
                    individual_status: TaskStatus::Pending,
                    due_date_time: None,
                }])
            },
            || Ok(Vec::new()),
        )
        .expect("join activity");
        assert_eq!(data.stats.total_employees, None);
        let activity = data.activity.expect("user dashboards carry activity");
        assert_eq!(activity.upcoming.len(), 1);
        assert!(activity.recent.is_empty());

        let error = join_activity(
            || Ok(task_stats()),
            || Ok(Vec::new()),
            || Err(LoadError::Status { status: 403, message: "forbidden".into() }),
        )
        .expect_err("recent failure fails the dashboard");
        assert!(matches!(error, LoadError::Status { status: 403, .. }));
    }

    #[test]
    fn timer_ticks_until_dropped() {
        let (tx, rx) = mpsc::channel();
        let timer = RefreshTimer::start(Duration::from_millis(10), tx);
        let event = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("timer should tick");
        assert!(matches!(event, InternalEvent::RefreshDashboard));

        drop(timer);
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(40));
        assert!(rx.try_recv().is_err(), "no ticks after the timer is dropped");
    }

    #[test]
    fn zero_interval_disables_polling() {
        let (tx, _rx) = mpsc::channel();
        let mut pane = DashboardPane::default();
        pane.start_polling(Duration::ZERO, tx);
        assert!(!pane.is_polling());
    }
}
