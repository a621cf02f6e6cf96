// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;
use time::{Date, PrimitiveDateTime};

use crate::error::ValidationError;
use crate::{
    AssignedTask, Department, DepartmentId, Employee, EmployeeId, FormKind, Machine, MachineId,
    RecurrenceType, Role, Task, TaskStatus, TaskType, format_date, format_local_datetime,
    parse_date, parse_local_datetime,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "serialize_date")]
    pub date_of_birth: Option<Date>,
    pub department_id: Option<DepartmentId>,
    pub role: Role,
    pub machine_ids: Vec<MachineId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub task_type: TaskType,
    #[serde(serialize_with = "serialize_datetime")]
    pub due_date_time: PrimitiveDateTime,
    pub location: String,
    pub department_id: Option<DepartmentId>,
    pub employee_ids: Option<Vec<EmployeeId>>,
    pub recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_type: Option<RecurrenceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_interval: Option<i32>,
}

/// A task a user creates for themselves. The backend assigns it to the
/// caller, so there is no department or assignee list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalTaskInput {
    pub title: String,
    pub description: String,
    pub task_type: TaskType,
    #[serde(serialize_with = "serialize_datetime")]
    pub due_date_time: PrimitiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentInput {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineInput {
    pub id: MachineId,
    pub name: String,
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusInput {
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportInput {
    pub report: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Employee(EmployeeInput),
    Task(TaskInput),
    PersonalTask(PersonalTaskInput),
    Department(DepartmentInput),
    Machine(MachineInput),
    TaskStatus(StatusInput),
    TaskReport(ReportInput),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Employee(_) => FormKind::Employee,
            Self::Task(_) => FormKind::Task,
            Self::PersonalTask(_) => FormKind::PersonalTask,
            Self::Department(_) => FormKind::Department,
            Self::Machine(_) => FormKind::Machine,
            Self::TaskStatus(_) => FormKind::TaskStatus,
            Self::TaskReport(_) => FormKind::TaskReport,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftField {
    pub key: &'static str,
    pub label: &'static str,
    pub hint: &'static str,
    pub required: bool,
    pub value: String,
}

impl DraftField {
    const fn new(key: &'static str, label: &'static str, hint: &'static str, required: bool) -> Self {
        Self {
            key,
            label,
            hint,
            required,
            value: String::new(),
        }
    }
}

/// Text the user is editing in a modal form, one labelled field per input.
///
/// `target` holds the id of the record being edited; `None` means create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    pub kind: FormKind,
    pub target: Option<String>,
    pub fields: Vec<DraftField>,
    pub focus: usize,
}

impl FormDraft {
    pub fn blank(kind: FormKind) -> Self {
        let fields = match kind {
            FormKind::Employee => vec![
                DraftField::new("name", "Name", "", true),
                DraftField::new("email", "Email", "", true),
                DraftField::new("dateOfBirth", "Date of birth", "YYYY-MM-DD", true),
                DraftField::new("departmentId", "Department", "department id", true),
                DraftField::new("role", "Role", "ADMIN or USER", true),
                DraftField::new("machineIds", "Machines", "comma-separated ids", false),
            ],
            FormKind::Task => vec![
                DraftField::new("title", "Title", "", true),
                DraftField::new("taskType", "Type", "PERSONAL, MEETING or MAINTENANCE", true),
                DraftField::new("dueDateTime", "Due", "YYYY-MM-DD HH:MM", true),
                DraftField::new("description", "Description", "", false),
                DraftField::new("location", "Location", "", false),
                DraftField::new("departmentId", "Department", "department id", false),
                DraftField::new("employeeIds", "Assignees", "comma-separated employee ids", false),
                DraftField::new("recurring", "Recurring", "yes or no", false),
                DraftField::new("recurrenceType", "Repeats", "DAILY, WEEKLY or MONTHLY", false),
                DraftField::new("recurrenceInterval", "Every", "number of periods", false),
            ],
            FormKind::PersonalTask => vec![
                DraftField::new("title", "Title", "", true),
                DraftField::new("taskType", "Type", "PERSONAL, MEETING or MAINTENANCE", true),
                DraftField::new("dueDateTime", "Due", "YYYY-MM-DD HH:MM", true),
                DraftField::new("description", "Description", "", false),
                DraftField::new("location", "Location", "", false),
            ],
            FormKind::Department => vec![
                DraftField::new("name", "Name", "", true),
                DraftField::new("description", "Description", "", false),
            ],
            FormKind::Machine => vec![
                DraftField::new("id", "Machine id", "", true),
                DraftField::new("name", "Name", "", true),
                DraftField::new("departmentId", "Department", "department id", false),
            ],
            FormKind::TaskStatus => vec![DraftField::new(
                "status",
                "Status",
                "PENDING, IN_PROGRESS or COMPLETED",
                true,
            )],
            FormKind::TaskReport => vec![
                DraftField::new("report", "Report", "", true),
                DraftField::new("status", "Status", "PENDING, IN_PROGRESS or COMPLETED", true),
            ],
        };
        Self {
            kind,
            target: None,
            fields,
            focus: 0,
        }
    }

    pub fn for_employee(employee: &Employee) -> Self {
        let mut draft = Self::blank(FormKind::Employee);
        draft.target = Some(employee.id.to_string());
        draft.set("name", &employee.name);
        draft.set("email", &employee.email);
        if let Some(date) = employee.date_of_birth {
            draft.set("dateOfBirth", &format_date(date));
        }
        if let Some(department) = &employee.department {
            draft.set("departmentId", &department.id.to_string());
        }
        draft.set("role", employee.role.as_str());
        let machines = employee
            .assigned_machines
            .iter()
            .map(|machine| machine.id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        draft.set("machineIds", &machines);
        // Existing employees may predate the birth date and department fields.
        draft.mark_optional("dateOfBirth");
        draft.mark_optional("departmentId");
        draft
    }

    pub fn for_task(task: &Task) -> Self {
        let mut draft = Self::blank(FormKind::Task);
        draft.target = Some(task.id.to_string());
        draft.set("title", &task.title);
        draft.set("taskType", task.task_type.as_str());
        if let Some(due) = task.due_date_time {
            draft.set("dueDateTime", &format_local_datetime(due));
        }
        draft.set("description", &task.description);
        draft.set("location", &task.location);
        if let Some(department) = &task.department {
            draft.set("departmentId", &department.id.to_string());
        }
        let assignees = task
            .assigned_employees
            .iter()
            .map(|person| person.id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        draft.set("employeeIds", &assignees);
        draft.set("recurring", if task.recurring { "yes" } else { "no" });
        if let Some(kind) = task.recurrence_type {
            draft.set("recurrenceType", kind.as_str());
        }
        if let Some(interval) = task.recurrence_interval {
            draft.set("recurrenceInterval", &interval.to_string());
        }
        draft
    }

    pub fn for_department(department: &Department) -> Self {
        let mut draft = Self::blank(FormKind::Department);
        draft.target = Some(department.id.to_string());
        draft.set("name", &department.name);
        draft.set("description", &department.description);
        draft
    }

    pub fn for_machine(machine: &Machine) -> Self {
        let mut draft = Self::blank(FormKind::Machine);
        draft.target = Some(machine.id.to_string());
        draft.set("id", machine.id.as_str());
        draft.set("name", &machine.name);
        if let Some(department) = &machine.department {
            draft.set("departmentId", &department.id.to_string());
        }
        draft
    }

    pub fn for_status(task: &AssignedTask) -> Self {
        let mut draft = Self::blank(FormKind::TaskStatus);
        draft.target = Some(task.task.id.to_string());
        draft.set("status", task.individual_status.as_str());
        draft
    }

    pub fn for_report(task: &AssignedTask) -> Self {
        let mut draft = Self::blank(FormKind::TaskReport);
        draft.target = Some(task.task.id.to_string());
        draft.set("report", task.report.as_deref().unwrap_or_default());
        draft.set("status", TaskStatus::Completed.as_str());
        draft
    }

    pub fn is_edit(&self) -> bool {
        self.target.is_some()
    }

    pub fn title(&self) -> String {
        let verb = if self.is_edit() { "Edit" } else { "New" };
        match self.kind {
            FormKind::TaskStatus => "Update status".to_owned(),
            FormKind::TaskReport => "Submit report".to_owned(),
            kind => format!("{verb} {}", kind.label()),
        }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map_or("", |field| field.value.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(field) = self.fields.iter_mut().find(|field| field.key == key) {
            field.value = value.to_owned();
        }
    }

    fn mark_optional(&mut self, key: &str) {
        if let Some(field) = self.fields.iter_mut().find(|field| field.key == key) {
            field.required = false;
        }
    }

    pub fn focused(&self) -> Option<&DraftField> {
        self.fields.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, ch: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    /// Checks required fields and parses the draft into a typed payload.
    pub fn to_payload(&self) -> Result<FormPayload, ValidationError> {
        if let Some(field) = self
            .fields
            .iter()
            .find(|field| field.required && field.value.trim().is_empty())
        {
            return Err(ValidationError::Missing { field: field.label });
        }

        Ok(match self.kind {
            FormKind::Employee => FormPayload::Employee(EmployeeInput {
                name: self.text("name"),
                email: self.text("email"),
                date_of_birth: self.parsed("dateOfBirth", parse_date, "expected YYYY-MM-DD")?,
                department_id: self.department_id()?,
                role: self
                    .parsed("role", Role::parse, "expected ADMIN or USER")?
                    .unwrap_or_default(),
                machine_ids: self.list("machineIds").map(MachineId::from).collect(),
            }),
            FormKind::Task => {
                let recurring = self.flag("recurring")?;
                let employee_ids: Vec<EmployeeId> =
                    self.list("employeeIds").map(EmployeeId::from).collect();
                FormPayload::Task(TaskInput {
                    title: self.text("title"),
                    description: self.text("description"),
                    task_type: self.task_type()?,
                    due_date_time: self.due()?,
                    location: self.text("location"),
                    department_id: self.department_id()?,
                    employee_ids: (!employee_ids.is_empty()).then_some(employee_ids),
                    recurring,
                    recurrence_type: if recurring {
                        self.parsed(
                            "recurrenceType",
                            RecurrenceType::parse,
                            "expected DAILY, WEEKLY or MONTHLY",
                        )?
                    } else {
                        None
                    },
                    recurrence_interval: if recurring {
                        self.parsed(
                            "recurrenceInterval",
                            |raw| raw.parse::<i32>().ok().filter(|value| *value > 0),
                            "expected a positive number",
                        )?
                    } else {
                        None
                    },
                })
            }
            FormKind::PersonalTask => {
                let location = self.text("location");
                FormPayload::PersonalTask(PersonalTaskInput {
                    title: self.text("title"),
                    description: self.text("description"),
                    task_type: self.task_type()?,
                    due_date_time: self.due()?,
                    location: (!location.is_empty()).then_some(location),
                })
            }
            FormKind::Department => FormPayload::Department(DepartmentInput {
                name: self.text("name"),
                description: self.text("description"),
            }),
            FormKind::Machine => FormPayload::Machine(MachineInput {
                id: MachineId::new(self.text("id")),
                name: self.text("name"),
                department_id: self.department_id()?,
            }),
            FormKind::TaskStatus => FormPayload::TaskStatus(StatusInput {
                status: self.status()?,
            }),
            FormKind::TaskReport => FormPayload::TaskReport(ReportInput {
                report: self.text("report"),
                status: self.status()?,
            }),
        })
    }

    fn text(&self, key: &str) -> String {
        self.value(key).trim().to_owned()
    }

    fn field_label(&self, key: &str) -> &'static str {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map_or("field", |field| field.label)
    }

    fn parsed<T>(
        &self,
        key: &str,
        parse: impl Fn(&str) -> Option<T>,
        reason: &str,
    ) -> Result<Option<T>, ValidationError> {
        let raw = self.value(key).trim();
        if raw.is_empty() {
            return Ok(None);
        }
        parse(raw).map(Some).ok_or_else(|| ValidationError::Invalid {
            field: self.field_label(key),
            reason: format!("{reason}, got {raw:?}"),
        })
    }

    fn department_id(&self) -> Result<Option<DepartmentId>, ValidationError> {
        self.parsed(
            "departmentId",
            |raw| raw.parse::<i64>().ok().filter(|id| *id > 0).map(DepartmentId::new),
            "expected a department id",
        )
    }

    fn task_type(&self) -> Result<TaskType, ValidationError> {
        Ok(self
            .parsed("taskType", TaskType::parse, "unknown task type")?
            .unwrap_or(TaskType::Personal))
    }

    fn due(&self) -> Result<PrimitiveDateTime, ValidationError> {
        self.parsed(
            "dueDateTime",
            parse_local_datetime,
            "expected YYYY-MM-DD HH:MM",
        )?
        .ok_or(ValidationError::Missing { field: "Due" })
    }

    fn status(&self) -> Result<TaskStatus, ValidationError> {
        self.parsed(
            "status",
            TaskStatus::parse,
            "expected PENDING, IN_PROGRESS or COMPLETED",
        )?
        .ok_or(ValidationError::Missing { field: "Status" })
    }

    fn flag(&self, key: &str) -> Result<bool, ValidationError> {
        Ok(self
            .parsed(
                key,
                |raw| match raw.to_ascii_lowercase().as_str() {
                    "y" | "yes" | "true" | "1" => Some(true),
                    "n" | "no" | "false" | "0" => Some(false),
                    _ => None,
                },
                "expected yes or no",
            )?
            .unwrap_or(false))
    }

    fn list<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.value(key)
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
    }
}

fn serialize_date<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    crate::model::wire_date::serialize(value, serializer)
}

fn serialize_datetime<S>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    crate::model::wire_datetime::serialize(&Some(*value), serializer)
}

#[cfg(test)]
mod tests {
    use super::{FormDraft, FormPayload};
    use crate::error::ValidationError;
    use crate::{
        AssignedTask, DepartmentId, FormKind, MachineId, Role, Task, TaskId, TaskStatus, TaskType,
    };
    use anyhow::Result;
    use time::macros::datetime;

    fn filled_task_draft() -> FormDraft {
        let mut draft = FormDraft::blank(FormKind::Task);
        draft.set("title", "Replace belts");
        draft.set("taskType", "maintenance");
        draft.set("dueDateTime", "2025-06-01 08:30");
        draft.set("departmentId", "3");
        draft.set("employeeIds", "0001, 0002,");
        draft
    }

    #[test]
    fn empty_required_field_is_reported_by_label() {
        let mut draft = FormDraft::blank(FormKind::Department);
        draft.set("name", "   ");
        assert_eq!(
            draft.to_payload(),
            Err(ValidationError::Missing { field: "Name" })
        );
    }

    #[test]
    fn task_draft_parses_into_typed_payload() -> Result<()> {
        let FormPayload::Task(task) = filled_task_draft().to_payload()? else {
            panic!("expected a task payload");
        };
        assert_eq!(task.task_type, TaskType::Maintenance);
        assert_eq!(task.due_date_time, datetime!(2025-06-01 08:30));
        assert_eq!(task.department_id, Some(DepartmentId::new(3)));
        assert_eq!(task.employee_ids.as_ref().map(Vec::len), Some(2));
        assert!(!task.recurring);
        assert_eq!(task.recurrence_type, None);
        Ok(())
    }

    #[test]
    fn task_payload_serializes_with_backend_field_names() -> Result<()> {
        let FormPayload::Task(task) = filled_task_draft().to_payload()? else {
            panic!("expected a task payload");
        };
        let json = serde_json::to_value(&task)?;
        assert_eq!(json["taskType"], "MAINTENANCE");
        assert_eq!(json["dueDateTime"], "2025-06-01T08:30:00");
        assert_eq!(json["employeeIds"][1], "0002");
        assert!(json.get("recurrenceType").is_none());
        Ok(())
    }

    #[test]
    fn malformed_values_name_the_field() {
        let mut draft = filled_task_draft();
        draft.set("dueDateTime", "next friday");
        let Err(ValidationError::Invalid { field, .. }) = draft.to_payload() else {
            panic!("expected an invalid field error");
        };
        assert_eq!(field, "Due");

        let mut recurring = filled_task_draft();
        recurring.set("recurring", "yes");
        recurring.set("recurrenceInterval", "0");
        assert!(matches!(
            recurring.to_payload(),
            Err(ValidationError::Invalid { field: "Every", .. })
        ));
    }

    #[test]
    fn employee_draft_collects_machines_and_role() -> Result<()> {
        let mut draft = FormDraft::blank(FormKind::Employee);
        draft.set("name", "Ada Byrne");
        draft.set("email", "ada@example.com");
        draft.set("dateOfBirth", "1991-02-03");
        draft.set("departmentId", "1");
        draft.set("role", "admin");
        draft.set("machineIds", "M-01,M-02");
        let FormPayload::Employee(employee) = draft.to_payload()? else {
            panic!("expected an employee payload");
        };
        assert_eq!(employee.role, Role::Admin);
        assert_eq!(
            employee.machine_ids,
            vec![MachineId::new("M-01"), MachineId::new("M-02")]
        );
        let json = serde_json::to_value(&employee)?;
        assert_eq!(json["dateOfBirth"], "1991-02-03");
        assert_eq!(json["departmentId"], 1);
        Ok(())
    }

    #[test]
    fn report_draft_defaults_to_completed() -> Result<()> {
        let assigned: AssignedTask = serde_json::from_value(serde_json::json!({
            "id": 5,
            "title": "Weekly sync",
            "taskType": "MEETING",
            "status": "PENDING",
            "individualStatus": "IN_PROGRESS"
        }))?;
        let mut draft = FormDraft::for_report(&assigned);
        assert_eq!(draft.target.as_deref(), Some("5"));
        assert_eq!(
            draft.to_payload(),
            Err(ValidationError::Missing { field: "Report" })
        );
        draft.set("report", "Notes shared");
        let FormPayload::TaskReport(report) = draft.to_payload()? else {
            panic!("expected a report payload");
        };
        assert_eq!(report.status, TaskStatus::Completed);
        Ok(())
    }

    #[test]
    fn edit_drafts_round_trip_existing_values() -> Result<()> {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": 11,
            "title": "Quarterly review",
            "taskType": "MEETING",
            "status": "PENDING",
            "dueDateTime": "2025-04-02T14:00:00",
            "recurring": true,
            "recurrenceType": "MONTHLY",
            "recurrenceInterval": 3
        }))?;
        let draft = FormDraft::for_task(&task);
        assert!(draft.is_edit());
        assert_eq!(draft.title(), "Edit task");
        let FormPayload::Task(input) = draft.to_payload()? else {
            panic!("expected a task payload");
        };
        assert_eq!(input.due_date_time, datetime!(2025-04-02 14:00));
        assert_eq!(input.recurrence_interval, Some(3));
        assert_eq!(task.id, TaskId::new(11));
        Ok(())
    }

    #[test]
    fn personal_task_draft_omits_blank_location() -> Result<()> {
        let mut draft = FormDraft::blank(FormKind::PersonalTask);
        assert_eq!(draft.title(), "New personal task");
        draft.set("title", "Book dentist");
        draft.set("taskType", "personal");
        draft.set("dueDateTime", "2025-07-09 16:00");
        let FormPayload::PersonalTask(input) = draft.to_payload()? else {
            panic!("expected a personal task payload");
        };
        assert_eq!(input.task_type, TaskType::Personal);
        let json = serde_json::to_value(&input)?;
        assert_eq!(json["dueDateTime"], "2025-07-09T16:00:00");
        assert!(json.get("location").is_none());
        assert!(json.get("employeeIds").is_none());

        draft.set("location", "Clinic");
        let FormPayload::PersonalTask(input) = draft.to_payload()? else {
            panic!("expected a personal task payload");
        };
        assert_eq!(input.location.as_deref(), Some("Clinic"));
        Ok(())
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut draft = FormDraft::blank(FormKind::Machine);
        draft.focus_prev();
        assert_eq!(draft.focused().map(|field| field.key), Some("departmentId"));
        draft.focus_next();
        draft.push_char('M');
        draft.push_char('x');
        draft.pop_char();
        assert_eq!(draft.value("id"), "M");
    }
}
