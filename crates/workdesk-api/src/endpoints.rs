// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Backend routes, one function per path.

use workdesk_app::{DepartmentId, EmployeeId, MachineId, TaskId};

pub const LOGIN: &str = "/api/login";

pub const EMPLOYEES: &str = "/employees/api/all";
pub const EMPLOYEE_STATS: &str = "/employees/api/stats";
pub const EMPLOYEE_CREATE: &str = "/employees/api/create";
pub const EMPLOYEE_NEXT_NUMBER: &str = "/employees/api/next-number";

pub fn employee_update(id: &EmployeeId) -> String {
    format!("/employees/api/update/{}", segment(id.as_str()))
}

pub fn employee_delete(id: &EmployeeId) -> String {
    format!("/employees/api/delete/{}", segment(id.as_str()))
}

pub const TASKS: &str = "/tasks/api/list";
pub const TASK_STATS: &str = "/tasks/api/stats";
pub const TASK_CREATE: &str = "/tasks/api/create";

pub fn task_update(id: TaskId) -> String {
    format!("/tasks/api/update/{id}")
}

pub fn task_delete(id: TaskId) -> String {
    format!("/tasks/api/delete/{id}")
}

pub fn user_tasks(employee: &EmployeeId) -> String {
    format!("/tasks/api/user/{}/tasks", segment(employee.as_str()))
}

pub fn user_task_stats(employee: &EmployeeId) -> String {
    format!("/tasks/api/user/{}/task-stats", segment(employee.as_str()))
}

pub const USER_TASK_CREATE: &str = "/tasks/api/user/create";

pub fn user_task_delete(id: TaskId) -> String {
    format!("/tasks/api/user/delete/{id}")
}

pub fn user_overview(employee: &EmployeeId) -> String {
    format!("/tasks/api/user/{}/overview", segment(employee.as_str()))
}

pub fn user_upcoming_tasks(employee: &EmployeeId) -> String {
    format!("/tasks/api/user/{}/upcoming-tasks", segment(employee.as_str()))
}

pub fn user_recent_assignments(employee: &EmployeeId) -> String {
    format!("/tasks/api/user/{}/recent-assignments", segment(employee.as_str()))
}

pub const ADMIN_OVERVIEW: &str = "/tasks/api/admin/overview";

pub fn admin_task_details(id: TaskId) -> String {
    format!("/tasks/api/admin/task-details/{id}")
}

pub fn user_task_status(id: TaskId) -> String {
    format!("/tasks/api/user/tasks/{id}/status")
}

pub fn user_task_report(id: TaskId) -> String {
    format!("/tasks/api/user/tasks/{id}/report")
}

pub const DEPARTMENTS: &str = "/departments/api/departments";
pub const DEPARTMENT_CREATE: &str = "/departments/api/create";

pub fn department_update(id: DepartmentId) -> String {
    format!("/departments/api/update/{id}")
}

pub fn department_delete(id: DepartmentId) -> String {
    format!("/departments/api/delete/{id}")
}

pub const MACHINES: &str = "/departments/api/machines";
pub const MACHINE_CREATE: &str = "/departments/api/machines/create";
pub const MACHINE_NEXT_ID: &str = "/departments/api/machines/next-id";

pub fn machine_update(id: &MachineId) -> String {
    format!("/departments/api/machines/update/{}", segment(id.as_str()))
}

pub fn machine_delete(id: &MachineId) -> String {
    format!("/departments/api/machines/delete/{}", segment(id.as_str()))
}

/// Filter keys the task list endpoint understands, mapped to its query names.
pub const TASK_QUERY: [(&str, &str); 4] = [
    ("type", "taskType"),
    ("status", "status"),
    ("department", "departmentId"),
    ("search", "search"),
];

/// The admin report's date window applies to task creation dates.
pub const ADMIN_OVERVIEW_QUERY: [(&str, &str); 7] = [
    ("search", "search"),
    ("type", "taskType"),
    ("status", "status"),
    ("department", "departmentId"),
    ("creator", "creatorType"),
    ("from", "startDate"),
    ("to", "endDate"),
];

/// The personal overview's date window applies to due dates.
pub const USER_OVERVIEW_QUERY: [(&str, &str); 6] = [
    ("search", "search"),
    ("type", "taskType"),
    ("status", "status"),
    ("creator", "creatorRole"),
    ("from", "startDate"),
    ("to", "endDate"),
];

fn segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::{admin_task_details, employee_delete, machine_update, user_overview, user_task_status};
    use workdesk_app::{EmployeeId, MachineId, TaskId};

    #[test]
    fn path_segments_are_escaped() {
        assert_eq!(
            employee_delete(&EmployeeId::new("0007")),
            "/employees/api/delete/0007"
        );
        assert_eq!(
            machine_update(&MachineId::new("M 1/2")),
            "/departments/api/machines/update/M%201%2F2"
        );
        assert_eq!(
            user_task_status(TaskId::new(12)),
            "/tasks/api/user/tasks/12/status"
        );
        assert_eq!(
            user_overview(&EmployeeId::new("0012")),
            "/tasks/api/user/0012/overview"
        );
        assert_eq!(
            admin_task_details(TaskId::new(3)),
            "/tasks/api/admin/task-details/3"
        );
    }
}
