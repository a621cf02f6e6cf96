// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Per-view list configuration: filters, orderings and row formatting.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use time::{Date, PrimitiveDateTime};
use workdesk_app::{
    AssignedTask, AssignmentReport, Department, Employee, EmployeeId, FilterField, ListSchema,
    Machine, PersonRef, Role, RowFormatter, SortKey, Task, TaskStatus, TaskType,
    format_local_datetime, parse_date,
};

pub const EMPLOYEE_PAGE_SIZE: usize = 5;
pub const TASK_PAGE_SIZE: usize = 5;
pub const MY_TASK_PAGE_SIZE: usize = 10;
pub const DEPARTMENT_PAGE_SIZE: usize = 10;
pub const MACHINE_PAGE_SIZE: usize = 10;
pub const OVERVIEW_PAGE_SIZE: usize = 10;
pub const MY_OVERVIEW_PAGE_SIZE: usize = 10;
pub const ASSIGNMENT_PAGE_SIZE: usize = 10;

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

fn overdue_matches(overdue: bool, value: &str) -> bool {
    match value {
        "hide" => !overdue,
        "only" => overdue,
        _ => true,
    }
}

/// Overdue rows first, then by due time with undated rows last.
fn overdue_then_due(
    left_overdue: bool,
    left_due: Option<PrimitiveDateTime>,
    right_overdue: bool,
    right_due: Option<PrimitiveDateTime>,
) -> Ordering {
    right_overdue.cmp(&left_overdue).then_with(|| match (left_due, right_due) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

pub fn employee_schema() -> ListSchema<Employee> {
    ListSchema {
        name: "employees",
        page_size: EMPLOYEE_PAGE_SIZE,
        filters: vec![
            FilterField::new("search", "search", |employee: &Employee, value: &str| {
                contains_folded(&employee.name, value)
                    || contains_folded(employee.id.as_str(), value)
                    || contains_folded(&employee.email, value)
            }),
            FilterField::new("department", "department", |employee: &Employee, value: &str| {
                employee
                    .department
                    .as_ref()
                    .is_some_and(|department| department.id.to_string() == value)
            }),
            FilterField::new("role", "role", |employee: &Employee, value: &str| {
                employee.role.as_str() == value
            }),
            FilterField::new("machine", "machine", |employee: &Employee, value: &str| {
                employee
                    .assigned_machines
                    .iter()
                    .any(|machine| machine.id.as_str() == value)
            }),
        ],
        default_sort: SortKey::by_id(),
    }
}

pub fn employee_sorts() -> Vec<SortKey<Employee>> {
    vec![
        SortKey::by_id(),
        SortKey::new("name", |left: &Employee, right: &Employee| {
            left.name.to_lowercase().cmp(&right.name.to_lowercase())
        }),
        SortKey::new("department", |left: &Employee, right: &Employee| {
            left.department_name().cmp(right.department_name())
        }),
    ]
}

pub fn task_schema(now: PrimitiveDateTime) -> ListSchema<Task> {
    ListSchema {
        name: "tasks",
        page_size: TASK_PAGE_SIZE,
        filters: vec![
            FilterField::new("search", "search", |task: &Task, value: &str| {
                contains_folded(&task.title, value) || contains_folded(&task.description, value)
            }),
            FilterField::new("type", "type", |task: &Task, value: &str| {
                task.task_type.as_str() == value
            }),
            FilterField::new("status", "status", |task: &Task, value: &str| {
                task.status.as_str() == value
            }),
            FilterField::new("department", "department", |task: &Task, value: &str| {
                task.department
                    .as_ref()
                    .is_some_and(|department| department.id.to_string() == value)
            }),
            FilterField::new("overdue", "overdue", move |task: &Task, value: &str| {
                overdue_matches(task.is_overdue(now), value)
            }),
        ],
        default_sort: task_default_sort(now),
    }
}

fn task_default_sort(now: PrimitiveDateTime) -> SortKey<Task> {
    SortKey::new("overdue, due", move |left: &Task, right: &Task| {
        overdue_then_due(
            left.is_overdue(now),
            left.due_date_time,
            right.is_overdue(now),
            right.due_date_time,
        )
    })
}

pub fn task_sorts(now: PrimitiveDateTime) -> Vec<SortKey<Task>> {
    vec![
        task_default_sort(now),
        SortKey::new("due", |left: &Task, right: &Task| {
            left.due_date_time.cmp(&right.due_date_time)
        })
        .descending(),
        SortKey::new("title", |left: &Task, right: &Task| {
            left.title.to_lowercase().cmp(&right.title.to_lowercase())
        }),
        SortKey::by_id(),
    ]
}

pub fn my_task_schema(now: PrimitiveDateTime) -> ListSchema<AssignedTask> {
    ListSchema {
        name: "my tasks",
        page_size: MY_TASK_PAGE_SIZE,
        filters: vec![
            FilterField::new("search", "search", |assigned: &AssignedTask, value: &str| {
                contains_folded(&assigned.task.title, value)
                    || contains_folded(&assigned.task.description, value)
            }),
            FilterField::new("status", "status", |assigned: &AssignedTask, value: &str| {
                assigned.individual_status.as_str() == value
            }),
        ],
        default_sort: my_task_default_sort(now),
    }
}

fn my_task_default_sort(now: PrimitiveDateTime) -> SortKey<AssignedTask> {
    SortKey::new(
        "overdue, due",
        move |left: &AssignedTask, right: &AssignedTask| {
            overdue_then_due(
                left.is_overdue(now),
                left.task.due_date_time,
                right.is_overdue(now),
                right.task.due_date_time,
            )
        },
    )
}

pub fn my_task_sorts(now: PrimitiveDateTime) -> Vec<SortKey<AssignedTask>> {
    vec![
        my_task_default_sort(now),
        SortKey::new("title", |left: &AssignedTask, right: &AssignedTask| {
            left.task.title.to_lowercase().cmp(&right.task.title.to_lowercase())
        }),
    ]
}

pub fn department_schema() -> ListSchema<Department> {
    ListSchema {
        name: "departments",
        page_size: DEPARTMENT_PAGE_SIZE,
        filters: vec![FilterField::new(
            "search",
            "search",
            |department: &Department, value: &str| {
                contains_folded(&department.name, value)
                    || contains_folded(&department.description, value)
            },
        )],
        default_sort: SortKey::by_id(),
    }
}

pub fn department_sorts() -> Vec<SortKey<Department>> {
    vec![
        SortKey::by_id(),
        SortKey::new("name", |left: &Department, right: &Department| {
            left.name.to_lowercase().cmp(&right.name.to_lowercase())
        }),
    ]
}

pub fn machine_schema() -> ListSchema<Machine> {
    ListSchema {
        name: "machines",
        page_size: MACHINE_PAGE_SIZE,
        filters: vec![
            FilterField::new("search", "search", |machine: &Machine, value: &str| {
                contains_folded(machine.id.as_str(), value) || contains_folded(&machine.name, value)
            }),
            FilterField::new("department", "department", |machine: &Machine, value: &str| {
                machine
                    .department
                    .as_ref()
                    .is_some_and(|department| department.id.to_string() == value)
            }),
        ],
        default_sort: SortKey::by_id(),
    }
}

pub fn machine_sorts() -> Vec<SortKey<Machine>> {
    vec![
        SortKey::by_id(),
        SortKey::new("name", |left: &Machine, right: &Machine| {
            left.name.to_lowercase().cmp(&right.name.to_lowercase())
        }),
    ]
}

/// Blank or unparsable bounds do not constrain; undated rows fail a set bound.
fn within_bound(date: Option<Date>, value: &str, keep: fn(Date, Date) -> bool) -> bool {
    match parse_date(value) {
        Some(bound) => date.is_some_and(|date| keep(date, bound)),
        None => true,
    }
}

fn creator_is(creator: Option<&PersonRef>, role: Role) -> bool {
    creator.and_then(|person| person.role) == Some(role)
}

/// The admin report. Its date window applies to creation dates.
pub fn overview_schema(now: PrimitiveDateTime) -> ListSchema<Task> {
    ListSchema {
        name: "overview",
        page_size: OVERVIEW_PAGE_SIZE,
        filters: vec![
            FilterField::new("search", "search", |task: &Task, value: &str| {
                contains_folded(&task.title, value) || contains_folded(&task.description, value)
            }),
            FilterField::new("type", "type", |task: &Task, value: &str| {
                task.task_type.as_str() == value
            }),
            FilterField::new("status", "status", |task: &Task, value: &str| {
                task.status.as_str() == value
            }),
            FilterField::new("department", "department", |task: &Task, value: &str| {
                task.department
                    .as_ref()
                    .is_some_and(|department| department.id.to_string() == value)
            }),
            FilterField::new("creator", "creator", |task: &Task, value: &str| {
                match value {
                    "admin" => creator_is(task.creator.as_ref(), Role::Admin),
                    "employee" => creator_is(task.creator.as_ref(), Role::User),
                    _ => true,
                }
            }),
            FilterField::new("from", "from", |task: &Task, value: &str| {
                within_bound(task.created_at.map(|at| at.date()), value, |date, bound| {
                    date >= bound
                })
            }),
            FilterField::new("to", "to", |task: &Task, value: &str| {
                within_bound(task.created_at.map(|at| at.date()), value, |date, bound| {
                    date <= bound
                })
            }),
        ],
        default_sort: task_default_sort(now),
    }
}

pub fn overview_sorts(now: PrimitiveDateTime) -> Vec<SortKey<Task>> {
    let mut sorts = task_sorts(now);
    sorts.push(
        SortKey::new("created", |left: &Task, right: &Task| {
            left.created_at.cmp(&right.created_at)
        })
        .descending(),
    );
    sorts
}

/// Everything assigned to the signed-in user, filtered by due date.
pub fn my_overview_schema(now: PrimitiveDateTime) -> ListSchema<AssignedTask> {
    ListSchema {
        name: "my overview",
        page_size: MY_OVERVIEW_PAGE_SIZE,
        filters: vec![
            FilterField::new("search", "search", |assigned: &AssignedTask, value: &str| {
                contains_folded(&assigned.task.title, value)
                    || contains_folded(&assigned.task.description, value)
            }),
            FilterField::new("type", "type", |assigned: &AssignedTask, value: &str| {
                assigned.task.task_type.as_str() == value
            }),
            FilterField::new("status", "status", |assigned: &AssignedTask, value: &str| {
                assigned.individual_status.as_str() == value
            }),
            FilterField::new("creator", "creator", |assigned: &AssignedTask, value: &str| {
                match Role::parse(value) {
                    Some(role) => creator_is(assigned.task.creator.as_ref(), role),
                    None => true,
                }
            }),
            FilterField::new("from", "from", |assigned: &AssignedTask, value: &str| {
                within_bound(
                    assigned.task.due_date_time.map(|due| due.date()),
                    value,
                    |date, bound| date >= bound,
                )
            }),
            FilterField::new("to", "to", |assigned: &AssignedTask, value: &str| {
                within_bound(
                    assigned.task.due_date_time.map(|due| due.date()),
                    value,
                    |date, bound| date <= bound,
                )
            }),
            FilterField::new(
                "overdue",
                "overdue",
                move |assigned: &AssignedTask, value: &str| {
                    overdue_matches(assigned.is_overdue(now), value)
                },
            ),
        ],
        default_sort: my_task_default_sort(now),
    }
}

pub fn assignment_schema() -> ListSchema<AssignmentReport> {
    ListSchema {
        name: "assignments",
        page_size: ASSIGNMENT_PAGE_SIZE,
        filters: vec![FilterField::new(
            "status",
            "status",
            |assignment: &AssignmentReport, value: &str| {
                assignment.individual_status.as_str() == value
            },
        )],
        default_sort: SortKey::new(
            "assigned",
            |left: &AssignmentReport, right: &AssignmentReport| {
                left.assigned_at.cmp(&right.assigned_at)
            },
        ),
    }
}

/// Values the status cycle key steps through, blank first.
pub fn status_cycle() -> Vec<&'static str> {
    std::iter::once("")
        .chain(TaskStatus::ALL.iter().map(|status| status.as_str()))
        .collect()
}

pub fn type_cycle() -> Vec<&'static str> {
    std::iter::once("")
        .chain(TaskType::ALL.iter().map(|kind| kind.as_str()))
        .collect()
}

pub const ROLE_CYCLE: [&str; 3] = ["", "ADMIN", "USER"];
pub const OVERDUE_CYCLE: [&str; 3] = ["", "hide", "only"];
/// The admin report names creators by kind rather than by role.
pub const CREATOR_TYPE_CYCLE: [&str; 3] = ["", "admin", "employee"];

/// The value after `current` in `values`, wrapping to the first.
pub fn next_in_cycle(values: &[String], current: Option<&str>) -> String {
    let current = current.unwrap_or("");
    let position = values.iter().position(|value| value == current);
    match position {
        Some(index) => values[(index + 1) % values.len()].clone(),
        None => values.first().cloned().unwrap_or_default(),
    }
}

pub struct EmployeeRows<'a> {
    pub marked: &'a BTreeSet<EmployeeId>,
}

impl RowFormatter<Employee> for EmployeeRows<'_> {
    fn columns(&self) -> Vec<&'static str> {
        vec!["", "ID", "Name", "Email", "Role", "Department", "Machines"]
    }

    fn cells(&self, employee: &Employee) -> Vec<String> {
        let mark = if self.marked.contains(&employee.id) {
            "*"
        } else {
            ""
        };
        vec![
            mark.to_owned(),
            employee.id.to_string(),
            employee.name.clone(),
            employee.email.clone(),
            employee.role.label().to_owned(),
            employee.department_name().to_owned(),
            employee
                .assigned_machines
                .iter()
                .map(|machine| machine.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ]
    }

    fn empty_message(&self) -> &'static str {
        "No employees found"
    }
}

pub struct TaskRows {
    pub now: PrimitiveDateTime,
}

impl RowFormatter<Task> for TaskRows {
    fn columns(&self) -> Vec<&'static str> {
        vec!["ID", "Title", "Type", "Status", "Due", "Department", "Assignees"]
    }

    fn cells(&self, task: &Task) -> Vec<String> {
        vec![
            task.id.to_string(),
            task.title.clone(),
            task.task_type.label().to_owned(),
            task.status.label().to_owned(),
            due_label(task.due_date_time, task.is_overdue(self.now)),
            task.department
                .as_ref()
                .map(|department| department.name.clone())
                .unwrap_or_default(),
            task.assignee_names(),
        ]
    }

    fn emphasize(&self, task: &Task) -> bool {
        task.is_overdue(self.now)
    }

    fn empty_message(&self) -> &'static str {
        "No tasks found"
    }
}

pub struct MyTaskRows {
    pub now: PrimitiveDateTime,
}

impl RowFormatter<AssignedTask> for MyTaskRows {
    fn columns(&self) -> Vec<&'static str> {
        vec!["ID", "Title", "Type", "My status", "Due", "Location", "Report"]
    }

    fn cells(&self, assigned: &AssignedTask) -> Vec<String> {
        vec![
            assigned.task.id.to_string(),
            assigned.task.title.clone(),
            assigned.task.task_type.label().to_owned(),
            assigned.individual_status.label().to_owned(),
            due_label(assigned.task.due_date_time, assigned.is_overdue(self.now)),
            assigned.task.location.clone(),
            if assigned.report.as_deref().is_some_and(|report| !report.is_empty()) {
                "submitted".to_owned()
            } else {
                String::new()
            },
        ]
    }

    fn emphasize(&self, assigned: &AssignedTask) -> bool {
        assigned.is_overdue(self.now)
    }

    fn empty_message(&self) -> &'static str {
        "No tasks assigned to you"
    }
}

/// Report rows show who created each task and when.
pub struct OverviewRows {
    pub now: PrimitiveDateTime,
}

impl RowFormatter<Task> for OverviewRows {
    fn columns(&self) -> Vec<&'static str> {
        vec!["ID", "Title", "Type", "Status", "Due", "Creator", "Created", "Assignees"]
    }

    fn cells(&self, task: &Task) -> Vec<String> {
        vec![
            task.id.to_string(),
            task.title.clone(),
            task.task_type.label().to_owned(),
            task.status.label().to_owned(),
            due_label(task.due_date_time, task.is_overdue(self.now)),
            task.creator
                .as_ref()
                .map(|creator| creator.name.clone())
                .unwrap_or_default(),
            task.created_at.map(format_local_datetime).unwrap_or_default(),
            task.assignee_names(),
        ]
    }

    fn emphasize(&self, task: &Task) -> bool {
        task.is_overdue(self.now)
    }

    fn empty_message(&self) -> &'static str {
        "No tasks match the report filters"
    }
}

pub struct DepartmentRows;

impl RowFormatter<Department> for DepartmentRows {
    fn columns(&self) -> Vec<&'static str> {
        vec!["ID", "Name", "Description", "Employees"]
    }

    fn cells(&self, department: &Department) -> Vec<String> {
        vec![
            department.id.to_string(),
            department.name.clone(),
            department.description.clone(),
            department
                .employee_count
                .map(|count| count.to_string())
                .unwrap_or_default(),
        ]
    }

    fn empty_message(&self) -> &'static str {
        "No departments found"
    }
}

pub struct MachineRows;

impl RowFormatter<Machine> for MachineRows {
    fn columns(&self) -> Vec<&'static str> {
        vec!["ID", "Name", "Department"]
    }

    fn cells(&self, machine: &Machine) -> Vec<String> {
        vec![
            machine.id.to_string(),
            machine.name.clone(),
            machine.department_name().to_owned(),
        ]
    }

    fn empty_message(&self) -> &'static str {
        "No machines found"
    }
}

pub struct AssignmentRows;

impl RowFormatter<AssignmentReport> for AssignmentRows {
    fn columns(&self) -> Vec<&'static str> {
        vec!["Employee", "Number", "Status", "Assigned", "Started", "Completed", "Report"]
    }

    fn cells(&self, assignment: &AssignmentReport) -> Vec<String> {
        let when = |at: Option<PrimitiveDateTime>| at.map(format_local_datetime).unwrap_or_default();
        vec![
            assignment.employee.clone(),
            assignment
                .employee_number
                .map(|number| format!("{number:04}"))
                .unwrap_or_default(),
            assignment.individual_status.label().to_owned(),
            when(assignment.assigned_at),
            when(assignment.started_at),
            when(assignment.completed_at),
            assignment
                .report
                .as_deref()
                .filter(|_| assignment.has_report())
                .unwrap_or_default()
                .trim()
                .to_owned(),
        ]
    }

    fn empty_message(&self) -> &'static str {
        "Nobody is assigned to this task"
    }
}

fn due_label(due: Option<PrimitiveDateTime>, overdue: bool) -> String {
    match due {
        Some(due) if overdue => format!("{} !", format_local_datetime(due)),
        Some(due) => format_local_datetime(due),
        None => String::new(),
    }
}
