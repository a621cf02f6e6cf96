// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The admin task report and its per-task drill-down.

use time::PrimitiveDateTime;
use tracing::debug;
use workdesk_app::{
    AssignmentReport, ListView, LoadError, LoadOutcome, LoadTicket, Task, TaskDetails, TaskId,
    TaskOverview, TaskStats,
};

use crate::views::{assignment_schema, overview_schema};

/// Report rows plus the server's counts for the same filters.
#[derive(Debug)]
pub struct OverviewPane {
    pub(crate) list: ListView<Task>,
    statistics: Option<TaskStats>,
    total: usize,
}

impl OverviewPane {
    pub fn new(now: PrimitiveDateTime) -> Self {
        Self {
            list: ListView::new(overview_schema(now)),
            statistics: None,
            total: 0,
        }
    }

    pub fn statistics(&self) -> Option<&TaskStats> {
        self.statistics.as_ref()
    }

    /// Matching tasks as counted by the server.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<TaskOverview, LoadError>,
    ) -> Result<LoadOutcome, LoadError> {
        let overview = match result {
            Ok(overview) => overview,
            Err(error) => return self.list.finish_load(ticket, Err(error)),
        };
        let TaskOverview {
            tasks,
            statistics,
            total_count,
        } = overview;
        let outcome = self.list.finish_load(ticket, Ok(tasks))?;
        if let LoadOutcome::Applied { .. } = outcome {
            self.statistics = Some(statistics);
            self.total = total_count;
        }
        Ok(outcome)
    }
}

/// One task's assignees. Closing it puts the report back as it was.
#[derive(Debug)]
pub struct DetailsPane {
    pub(crate) list: ListView<AssignmentReport>,
    task_id: TaskId,
    task: Option<Task>,
    parent: Box<OverviewPane>,
}

impl DetailsPane {
    pub fn new(task_id: TaskId, parent: OverviewPane) -> Self {
        Self {
            list: ListView::new(assignment_schema()),
            task_id,
            task: None,
            parent: Box::new(parent),
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn close(self) -> OverviewPane {
        debug!(task = %self.task_id, "task details closed");
        *self.parent
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<TaskDetails, LoadError>,
    ) -> Result<LoadOutcome, LoadError> {
        let details = match result {
            Ok(details) => details,
            Err(error) => return self.list.finish_load(ticket, Err(error)),
        };
        let outcome = self.list.finish_load(ticket, Ok(details.assignments))?;
        if let LoadOutcome::Applied { .. } = outcome {
            self.task = Some(details.task);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::{DetailsPane, OverviewPane};
    use workdesk_app::{LoadError, LoadOutcome, TaskOverview, TaskStats};
    use workdesk_testkit::{WorkforceFaker, fixture_now};

    fn overview(tasks: usize, faker: &mut WorkforceFaker) -> TaskOverview {
        let roster = faker.roster(2, 4, tasks);
        TaskOverview {
            statistics: TaskStats {
                total_tasks: tasks as i64,
                ..TaskStats::default()
            },
            total_count: roster.tasks.len(),
            tasks: roster.tasks,
        }
    }

    #[test]
    fn statistics_follow_only_applied_loads() {
        let mut faker = WorkforceFaker::new(3);
        let mut pane = OverviewPane::new(fixture_now());
        let stale = pane.list.begin_load();
        let current = pane.list.begin_load();

        let outcome = pane
            .finish_load(stale, Ok(overview(9, &mut faker)))
            .expect("stale load");
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(pane.statistics().is_none());

        pane.finish_load(current, Ok(overview(4, &mut faker)))
            .expect("current load");
        assert_eq!(pane.total(), 4);
        assert_eq!(pane.statistics().map(|stats| stats.total_tasks), Some(4));
        assert_eq!(pane.list.loaded().len(), 4);
    }

    #[test]
    fn closing_details_restores_the_report() {
        let mut faker = WorkforceFaker::new(11);
        let roster = faker.roster(1, 3, 2);
        let mut report = OverviewPane::new(fixture_now());
        let ticket = report.list.begin_load();
        report
            .finish_load(
                ticket,
                Ok(TaskOverview {
                    tasks: roster.tasks.clone(),
                    statistics: TaskStats::default(),
                    total_count: 2,
                }),
            )
            .expect("load report");

        let task = roster.tasks[1].clone();
        let mut details = DetailsPane::new(task.id, report);
        let ticket = details.list.begin_load();
        details
            .finish_load(ticket, Err(LoadError::Decode("bad body".into())))
            .expect_err("failure surfaces");
        assert!(details.task().is_none());

        let ticket = details.list.begin_load();
        details
            .finish_load(ticket, Ok(faker.task_details(&task, &roster)))
            .expect("load details");
        assert_eq!(details.task().map(|loaded| loaded.id), Some(task.id));
        assert_eq!(
            details.list.loaded().len(),
            task.assigned_employees.len()
        );

        let report = details.close();
        assert_eq!(report.total(), 2);
        assert_eq!(report.list.loaded().len(), 2);
    }
}
