// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::ids::*;
use crate::listview::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().replace(' ', "_").as_str() {
            "PENDING" => Some(Self::Pending),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Personal,
    Meeting,
    Maintenance,
    #[serde(other)]
    Other,
}

impl TaskType {
    pub const ALL: [Self; 4] = [Self::Personal, Self::Meeting, Self::Maintenance, Self::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Meeting => "MEETING",
            Self::Maintenance => "MAINTENANCE",
            Self::Other => "OTHER",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Meeting => "meeting",
            Self::Maintenance => "maintenance",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PERSONAL" => Some(Self::Personal),
            "MEETING" => Some(Self::Meeting),
            "MAINTENANCE" => Some(Self::Maintenance),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "USER" => Some(Self::User),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    Dashboard,
    Employees,
    Tasks,
    Departments,
    Machines,
    Overview,
    MyTasks,
    MyOverview,
}

impl ViewKind {
    pub const ALL: [Self; 8] = [
        Self::Dashboard,
        Self::Employees,
        Self::Tasks,
        Self::Departments,
        Self::Machines,
        Self::Overview,
        Self::MyTasks,
        Self::MyOverview,
    ];

    const ADMIN: [Self; 6] = [
        Self::Dashboard,
        Self::Employees,
        Self::Tasks,
        Self::Departments,
        Self::Machines,
        Self::Overview,
    ];

    const USER: [Self; 3] = [Self::Dashboard, Self::MyTasks, Self::MyOverview];

    pub const fn for_role(role: Role) -> &'static [Self] {
        match role {
            Role::Admin => &Self::ADMIN,
            Role::User => &Self::USER,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Employees => "employees",
            Self::Tasks => "tasks",
            Self::Departments => "departments",
            Self::Machines => "machines",
            Self::Overview => "overview",
            Self::MyTasks => "my tasks",
            Self::MyOverview => "my overview",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "dashboard" => Some(Self::Dashboard),
            "employees" => Some(Self::Employees),
            "tasks" => Some(Self::Tasks),
            "departments" => Some(Self::Departments),
            "machines" => Some(Self::Machines),
            "overview" => Some(Self::Overview),
            "my_tasks" => Some(Self::MyTasks),
            "my_overview" => Some(Self::MyOverview),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    Employee,
    Task,
    PersonalTask,
    Department,
    Machine,
    TaskStatus,
    TaskReport,
}

impl FormKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Task => "task",
            Self::PersonalTask => "personal task",
            Self::Department => "department",
            Self::Machine => "machine",
            Self::TaskStatus => "task status",
            Self::TaskReport => "task report",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Filter,
    Form(FormKind),
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRef {
    pub id: DepartmentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRef {
    pub id: MachineId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub id: EmployeeId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    #[serde(default)]
    pub employee_number: Option<i64>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default)]
    pub department: Option<DepartmentRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_machines: Vec<MachineRef>,
    #[serde(default, with = "wire_date")]
    pub date_of_birth: Option<Date>,
    #[serde(default, with = "wire_datetime")]
    pub created_at: Option<PrimitiveDateTime>,
}

impl Employee {
    pub fn department_name(&self) -> &str {
        self.department
            .as_ref()
            .map_or("", |department| department.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub employee_count: Option<i64>,
    #[serde(default, with = "wire_datetime")]
    pub created_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    #[serde(default)]
    pub department: Option<DepartmentRef>,
    #[serde(default, with = "wire_datetime")]
    pub created_at: Option<PrimitiveDateTime>,
}

impl Machine {
    pub fn department_name(&self) -> &str {
        self.department
            .as_ref()
            .map_or("", |department| department.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub task_type: TaskType,
    pub status: TaskStatus,
    #[serde(default, with = "wire_datetime")]
    pub due_date_time: Option<PrimitiveDateTime>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recurring: bool,
    #[serde(default)]
    pub recurrence_type: Option<RecurrenceType>,
    #[serde(default)]
    pub recurrence_interval: Option<i32>,
    #[serde(default, with = "wire_datetime")]
    pub created_at: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub creator: Option<PersonRef>,
    #[serde(default)]
    pub department: Option<DepartmentRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_employees: Vec<PersonRef>,
}

impl Task {
    pub fn is_overdue(&self, now: PrimitiveDateTime) -> bool {
        is_overdue(self.due_date_time, self.status, now)
    }

    pub fn assignee_names(&self) -> String {
        self.assigned_employees
            .iter()
            .map(|person| person.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A task as seen by one assignee: the shared task plus that employee's own
/// progress and report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTask {
    #[serde(flatten)]
    pub task: Task,
    pub individual_status: TaskStatus,
    #[serde(default, with = "wire_datetime")]
    pub assigned_at: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub report: Option<String>,
}

impl AssignedTask {
    pub fn is_overdue(&self, now: PrimitiveDateTime) -> bool {
        is_overdue(self.task.due_date_time, self.individual_status, now)
    }
}

fn is_overdue(due: Option<PrimitiveDateTime>, status: TaskStatus, now: PrimitiveDateTime) -> bool {
    status != TaskStatus::Completed && due.is_some_and(|due| due < now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    #[serde(default)]
    pub total_tasks: i64,
    #[serde(default)]
    pub pending_tasks: i64,
    #[serde(default)]
    pub in_progress_tasks: i64,
    #[serde(default)]
    pub completed_tasks: i64,
    #[serde(default)]
    pub overdue_tasks: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    #[serde(default)]
    pub total_employees: i64,
}

/// Figures shown on the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_employees: Option<i64>,
    pub total_tasks: i64,
    pub active_tasks: i64,
    pub overdue_tasks: Option<i64>,
    pub completed_tasks: i64,
}

impl DashboardStats {
    pub fn from_parts(employees: Option<EmployeeStats>, tasks: TaskStats) -> Self {
        Self {
            total_employees: employees.map(|stats| stats.total_employees),
            total_tasks: tasks.total_tasks,
            active_tasks: tasks.pending_tasks + tasks.in_progress_tasks,
            overdue_tasks: tasks.overdue_tasks,
            completed_tasks: tasks.completed_tasks,
        }
    }
}

/// Everything the landing view shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardData {
    pub stats: DashboardStats,
    /// Only regular users get upcoming deadlines and new assignments.
    pub activity: Option<UserActivity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserActivity {
    pub upcoming: Vec<UpcomingTask>,
    pub recent: Vec<RecentAssignment>,
}

/// An open assignment due within the next few days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingTask {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub task_type: TaskType,
    pub individual_status: TaskStatus,
    #[serde(default, with = "wire_datetime")]
    pub due_date_time: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAssignment {
    #[serde(default, with = "wire_datetime")]
    pub assigned_at: Option<PrimitiveDateTime>,
    pub task: AssignedTaskSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTaskSummary {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub task_type: TaskType,
    #[serde(default)]
    pub creator: Option<PersonRef>,
}

/// The admin report: tasks matching the report filters and counts over that
/// same set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOverview {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub statistics: TaskStats,
    #[serde(default)]
    pub total_count: usize,
}

/// One assignee's progress on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentReport {
    /// The assignee's display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub employee: String,
    #[serde(default)]
    pub employee_number: Option<i64>,
    pub individual_status: TaskStatus,
    #[serde(default, with = "wire_datetime")]
    pub assigned_at: Option<PrimitiveDateTime>,
    #[serde(default, with = "wire_datetime")]
    pub started_at: Option<PrimitiveDateTime>,
    #[serde(default, with = "wire_datetime")]
    pub completed_at: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub report: Option<String>,
}

impl AssignmentReport {
    pub fn has_report(&self) -> bool {
        self.report.as_deref().is_some_and(|report| !report.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub task: Task,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assignments: Vec<AssignmentReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub role: Role,
    #[serde(default)]
    pub employee_number: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl Session {
    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.employee_number.map(employee_id_for_number)
    }
}

impl Record for Employee {
    type Id = EmployeeId;

    fn id(&self) -> EmployeeId {
        self.id.clone()
    }
}

impl Record for Department {
    type Id = DepartmentId;

    fn id(&self) -> DepartmentId {
        self.id
    }
}

impl Record for Machine {
    type Id = MachineId;

    fn id(&self) -> MachineId {
        self.id.clone()
    }
}

impl Record for Task {
    type Id = TaskId;

    fn id(&self) -> TaskId {
        self.id
    }
}

impl Record for AssignedTask {
    type Id = TaskId;

    fn id(&self) -> TaskId {
        self.task.id
    }
}

impl Record for AssignmentReport {
    type Id = (Option<i64>, String);

    fn id(&self) -> Self::Id {
        (self.employee_number, self.employee.clone())
    }
}

/// The wall clock as the backend sees it: local time without an offset.
///
/// The offset is read once. The platform lookup refuses to answer once the
/// process has more than one thread, so [`LocalClock::detect`] must run
/// before any worker is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    offset: UtcOffset,
}

impl LocalClock {
    pub fn detect() -> Self {
        Self {
            offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }

    pub const fn fixed(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub const fn offset(self) -> UtcOffset {
        self.offset
    }

    pub fn now(self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::fixed(UtcOffset::UTC)
    }
}

pub fn parse_local_datetime(raw: &str) -> Option<PrimitiveDateTime> {
    let trimmed = raw.trim();
    let whole_seconds = trimmed.split('.').next().unwrap_or(trimmed);
    let normalized = whole_seconds.replacen(' ', "T", 1);
    PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        )
    })
    .ok()
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

pub fn format_local_datetime(value: PrimitiveDateTime) -> String {
    value
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_default()
}

pub fn format_wire_datetime(value: PrimitiveDateTime) -> String {
    value
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .unwrap_or_default()
}

pub fn format_date(value: Date) -> String {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub mod wire_datetime {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::PrimitiveDateTime;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PrimitiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_local_datetime(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date-time {raw:?}"))),
        }
    }

    pub fn serialize<S>(value: &Option<PrimitiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&super::format_wire_datetime(*value)),
            None => serializer.serialize_none(),
        }
    }
}

pub mod wire_date {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date {raw:?}"))),
        }
    }

    pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&super::format_date(*value)),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AssignedTask, DashboardStats, Employee, EmployeeStats, LocalClock, RecentAssignment, Role,
        Task, TaskDetails, TaskOverview, TaskStats, TaskStatus, TaskType, UpcomingTask, ViewKind,
        parse_local_datetime,
    };
    use anyhow::Result;
    use time::macros::{datetime, offset};

    #[test]
    fn fixed_clock_reads_wall_time_at_its_offset() {
        let utc = LocalClock::default().now();
        let ahead = LocalClock::fixed(offset!(+2)).now();
        let drift = (ahead - utc) - time::Duration::hours(2);
        assert!(drift.abs() < time::Duration::seconds(5), "drift {drift}");
        assert_eq!(LocalClock::fixed(offset!(-5)).offset(), offset!(-5));
    }

    #[test]
    fn local_datetime_accepts_minutes_seconds_and_fractions() {
        let expected = datetime!(2025-03-04 09:30);
        assert_eq!(parse_local_datetime("2025-03-04T09:30"), Some(expected));
        assert_eq!(parse_local_datetime("2025-03-04T09:30:00"), Some(expected));
        assert_eq!(
            parse_local_datetime("2025-03-04T09:30:00.123456"),
            Some(expected)
        );
        assert_eq!(parse_local_datetime("2025-03-04 09:30"), Some(expected));
        assert_eq!(parse_local_datetime("yesterday"), None);
    }

    #[test]
    fn employee_decodes_backend_shape_with_nulls() -> Result<()> {
        let employee: Employee = serde_json::from_str(
            r#"{
                "id": "0004",
                "employeeNumber": 4,
                "name": "Rowan Gray",
                "email": null,
                "role": "ADMIN",
                "department": {"id": 2, "name": "Assembly", "machines": []},
                "assignedMachines": [{"id": "M-01", "name": "Lathe"}],
                "dateOfBirth": "1990-05-01",
                "createdAt": "2024-11-02T08:15:00"
            }"#,
        )?;
        assert_eq!(employee.role, Role::Admin);
        assert_eq!(employee.email, "");
        assert_eq!(employee.department_name(), "Assembly");
        assert_eq!(employee.assigned_machines.len(), 1);
        Ok(())
    }

    #[test]
    fn task_decodes_unknown_type_as_other() -> Result<()> {
        let task: Task = serde_json::from_str(
            r#"{
                "id": 9,
                "title": "Audit",
                "description": null,
                "taskType": "TRAINING",
                "status": "IN_PROGRESS",
                "dueDateTime": "2025-01-10T17:00",
                "assignedEmployees": null
            }"#,
        )?;
        assert_eq!(task.task_type, TaskType::Other);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.assigned_employees.is_empty());
        Ok(())
    }

    #[test]
    fn assigned_task_overdue_uses_individual_status() -> Result<()> {
        let assigned: AssignedTask = serde_json::from_str(
            r#"{
                "id": 3,
                "title": "Inspect press",
                "taskType": "MAINTENANCE",
                "status": "PENDING",
                "dueDateTime": "2025-01-10T17:00:00",
                "individualStatus": "COMPLETED",
                "report": "done"
            }"#,
        )?;
        let now = datetime!(2025-02-01 00:00);
        assert!(assigned.task.is_overdue(now));
        assert!(!assigned.is_overdue(now));
        Ok(())
    }

    #[test]
    fn dashboard_active_tasks_sum_pending_and_in_progress() {
        let stats = DashboardStats::from_parts(
            Some(EmployeeStats { total_employees: 12 }),
            TaskStats {
                total_tasks: 10,
                pending_tasks: 3,
                in_progress_tasks: 2,
                completed_tasks: 5,
                overdue_tasks: Some(1),
            },
        );
        assert_eq!(stats.total_employees, Some(12));
        assert_eq!(stats.active_tasks, 5);
        assert_eq!(stats.overdue_tasks, Some(1));
    }

    #[test]
    fn status_parse_accepts_labels_and_wire_values() {
        assert_eq!(TaskStatus::parse("in progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("COMPLETED"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("done"), None);
    }

    #[test]
    fn views_are_scoped_by_role() {
        assert!(ViewKind::for_role(Role::Admin).contains(&ViewKind::Employees));
        assert!(!ViewKind::for_role(Role::User).contains(&ViewKind::Employees));
        assert_eq!(ViewKind::parse("my-tasks"), Some(ViewKind::MyTasks));
        assert_eq!(ViewKind::parse("My Overview"), Some(ViewKind::MyOverview));
        assert!(!ViewKind::for_role(Role::User).contains(&ViewKind::Overview));
    }

    #[test]
    fn overview_report_carries_tasks_and_counts() -> Result<()> {
        let overview: TaskOverview = serde_json::from_str(
            r#"{
                "tasks": [{
                    "id": 4,
                    "title": "Safety walk",
                    "taskType": "MEETING",
                    "status": "PENDING",
                    "creator": {"id": "0001", "name": "Avery Hill", "employeeNumber": 1, "role": "ADMIN"}
                }],
                "statistics": {"totalTasks": 1, "pendingTasks": 1, "overdueTasks": 0},
                "totalCount": 1
            }"#,
        )?;
        assert_eq!(overview.total_count, 1);
        assert_eq!(overview.statistics.pending_tasks, 1);
        let creator = overview.tasks[0].creator.as_ref().expect("creator");
        assert_eq!(creator.role, Some(Role::Admin));
        Ok(())
    }

    #[test]
    fn task_details_list_each_assignee() -> Result<()> {
        let details: TaskDetails = serde_json::from_str(
            r#"{
                "task": {"id": 9, "title": "Oil change", "taskType": "MAINTENANCE", "status": "IN_PROGRESS"},
                "assignments": [
                    {"employee": "Kai Reed", "employeeNumber": 7, "individualStatus": "COMPLETED",
                     "assignedAt": "2025-05-01T08:00", "startedAt": null,
                     "completedAt": "2025-05-02T10:15:30.5", "report": "Filters swapped"},
                    {"employee": "Drew Gray", "employeeNumber": 8, "individualStatus": "PENDING",
                     "assignedAt": "2025-05-01T08:00", "report": ""}
                ]
            }"#,
        )?;
        assert_eq!(details.task.id.get(), 9);
        assert_eq!(details.assignments.len(), 2);
        assert_eq!(details.assignments[0].completed_at, Some(datetime!(2025-05-02 10:15:30)));
        assert!(details.assignments[0].has_report());
        assert!(!details.assignments[1].has_report());
        Ok(())
    }

    #[test]
    fn recent_assignments_nest_the_task() -> Result<()> {
        let recent: Vec<RecentAssignment> = serde_json::from_str(
            r#"[{"assignedAt": "2025-05-30T09:00:00",
                 "task": {"id": 2, "title": "Shift handover", "description": null,
                          "taskType": "MEETING", "creator": {"id": "0003", "name": "Rowan Diaz"}}}]"#,
        )?;
        assert_eq!(recent[0].task.title, "Shift handover");
        assert_eq!(
            recent[0].task.creator.as_ref().map(|person| person.name.as_str()),
            Some("Rowan Diaz")
        );
        let upcoming: Vec<UpcomingTask> = serde_json::from_str(
            r#"[{"id": 5, "title": "Badge renewal", "taskType": "PERSONAL",
                 "individualStatus": "PENDING", "dueDateTime": "2025-06-02T12:00:00"}]"#,
        )?;
        assert_eq!(upcoming[0].due_date_time, Some(datetime!(2025-06-02 12:00)));
        Ok(())
    }
}
