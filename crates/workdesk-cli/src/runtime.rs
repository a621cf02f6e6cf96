// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{debug, warn};
use workdesk_api::Client;
use workdesk_app::{
    AssignedTask, ConfirmAction, DashboardData, Department, DepartmentId, Employee, EmployeeId,
    FilterSpec, FormPayload, LoadError, Machine, MachineId, MutationError, Role, Session, Task,
    TaskDetails, TaskId, TaskOverview,
};
use workdesk_tui::{AppRuntime, InternalEvent, LoadRequest, join_activity, join_stats, load_batch};

/// Backs the UI with the portal's REST API. Cheap to clone: each load runs
/// on its own thread with its own copy.
#[derive(Debug, Clone)]
pub struct ApiRuntime {
    client: Client,
    session: Session,
}

impl ApiRuntime {
    pub fn new(client: Client, session: Session) -> Self {
        let client = client.with_token(&session.token);
        Self { client, session }
    }

    fn session_employee(&self) -> Result<EmployeeId, LoadError> {
        self.session
            .employee_id()
            .ok_or_else(|| LoadError::Decode("session has no employee number".to_owned()))
    }

    fn acting_employee(&self) -> Result<EmployeeId, MutationError> {
        self.session
            .employee_id()
            .ok_or_else(|| MutationError::Rejected {
                status: 0,
                message: "session has no employee number".to_owned(),
            })
    }

    fn delete_employees(&self, ids: &[EmployeeId]) -> Result<(), MutationError> {
        let mut failures = Vec::new();
        for id in ids {
            if let Err(error) = self.client.delete_employee(id) {
                warn!(employee = %id, %error, "bulk delete entry rejected");
                failures.push(format!("{id}: {error}"));
            }
        }
        if failures.is_empty() {
            return Ok(());
        }
        Err(MutationError::Rejected {
            status: 0,
            message: format!(
                "{} of {} deletes failed ({})",
                failures.len(),
                ids.len(),
                failures.join("; ")
            ),
        })
    }
}

fn parse_target<T>(target: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Result<T, MutationError> {
    target
        .and_then(|raw| parse(raw.trim()))
        .ok_or_else(|| MutationError::Rejected {
            status: 0,
            message: format!("invalid record id {target:?}"),
        })
}

fn task_target(target: Option<&str>) -> Result<TaskId, MutationError> {
    parse_target(target, |raw| raw.parse().ok().map(TaskId::new))
}

fn department_target(target: Option<&str>) -> Result<DepartmentId, MutationError> {
    parse_target(target, |raw| raw.parse().ok().map(DepartmentId::new))
}

impl AppRuntime for ApiRuntime {
    fn load_employees(&mut self) -> Result<Vec<Employee>, LoadError> {
        self.client.employees()
    }

    fn load_tasks(&mut self, filter: &FilterSpec) -> Result<Vec<Task>, LoadError> {
        self.client.tasks(filter)
    }

    fn load_my_tasks(&mut self) -> Result<Vec<AssignedTask>, LoadError> {
        let employee = self.session_employee()?;
        self.client.user_tasks(&employee)
    }

    fn load_departments(&mut self) -> Result<Vec<Department>, LoadError> {
        self.client.departments()
    }

    fn load_machines(&mut self) -> Result<Vec<Machine>, LoadError> {
        self.client.machines()
    }

    fn load_dashboard(&mut self) -> Result<DashboardData, LoadError> {
        let client = &self.client;
        match self.session.role {
            Role::Admin => {
                let stats = join_stats(Some(|| client.employee_stats()), || client.task_stats())?;
                Ok(DashboardData {
                    stats,
                    activity: None,
                })
            }
            Role::User => {
                let employee = self.session_employee()?;
                join_activity(
                    || client.user_task_stats(&employee),
                    || client.upcoming_tasks(&employee),
                    || client.recent_assignments(&employee),
                )
            }
        }
    }

    fn load_overview(&mut self, filter: &FilterSpec) -> Result<TaskOverview, LoadError> {
        self.client.task_overview(filter)
    }

    fn load_task_details(&mut self, id: TaskId) -> Result<TaskDetails, LoadError> {
        self.client.task_details(id)
    }

    fn load_my_overview(&mut self, filter: &FilterSpec) -> Result<Vec<AssignedTask>, LoadError> {
        let employee = self.session_employee()?;
        self.client.user_overview(&employee, filter)
    }

    fn next_machine_id(&mut self) -> Result<MachineId, LoadError> {
        self.client.next_machine_id()
    }

    fn submit_form(
        &mut self,
        target: Option<&str>,
        payload: &FormPayload,
    ) -> Result<(), MutationError> {
        debug!(form = payload.kind().label(), target, "submitting form");
        match payload {
            FormPayload::Employee(input) => match target {
                Some(id) => self.client.update_employee(&EmployeeId::new(id), input),
                None => self.client.create_employee(input),
            },
            FormPayload::Task(input) => match target {
                Some(_) => self.client.update_task(task_target(target)?, input),
                None => self.client.create_task(input),
            },
            FormPayload::Department(input) => match target {
                Some(_) => self
                    .client
                    .update_department(department_target(target)?, input),
                None => self.client.create_department(input),
            },
            FormPayload::Machine(input) => match target {
                Some(id) => self.client.update_machine(&MachineId::new(id), input),
                None => self.client.create_machine(input),
            },
            FormPayload::PersonalTask(input) => self.client.create_personal_task(input),
            FormPayload::TaskStatus(input) => {
                let employee = self.acting_employee()?;
                self.client
                    .update_task_status(task_target(target)?, &employee, input)
            }
            FormPayload::TaskReport(input) => {
                let employee = self.acting_employee()?;
                self.client
                    .submit_task_report(task_target(target)?, &employee, input)
            }
        }
    }

    fn delete(&mut self, action: &ConfirmAction) -> Result<(), MutationError> {
        match action {
            ConfirmAction::DeleteEmployee(id) => self.client.delete_employee(id),
            ConfirmAction::DeleteEmployees(ids) => self.delete_employees(ids),
            ConfirmAction::DeleteTask(id) => self.client.delete_task(*id),
            ConfirmAction::DeleteDepartment(id) => self.client.delete_department(*id),
            ConfirmAction::DeleteMachine(id) => self.client.delete_machine(id),
            ConfirmAction::DeletePersonalTask(id) => self.client.delete_personal_task(*id),
        }
    }

    fn employee(&self) -> Option<EmployeeId> {
        self.session.employee_id()
    }

    fn spawn_load(&mut self, request: LoadRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let mut worker = self.clone();
        thread::Builder::new()
            .name("workdesk-load".to_owned())
            .spawn(move || {
                let batch = load_batch(&mut worker, request);
                // The UI may have quit while this fetch was in flight.
                let _ = tx.send(InternalEvent::Loaded(batch));
            })?;
        Ok(())
    }
}
