// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, Duration, Month, PrimitiveDateTime, Time};
use workdesk_app::{
    AssignedTask, AssignmentReport, Department, DepartmentId, DepartmentRef, Employee, MachineId,
    Machine, MachineRef, PersonRef, Role, Task, TaskDetails, TaskId, TaskStatus, TaskType,
    employee_id_for_number,
};

const REFERENCE_YEAR: i32 = 2025;

const DEPARTMENTS: [(&str, &str); 8] = [
    ("Assembly", "Final assembly and packaging lines"),
    ("Fabrication", "Cutting, bending and welding"),
    ("Maintenance", "Plant equipment upkeep"),
    ("Quality", "Inspection and release"),
    ("Logistics", "Receiving, storage and shipping"),
    ("Tooling", "Jig and fixture shop"),
    ("Facilities", "Buildings and utilities"),
    ("Office", "Administration and planning"),
];

const MACHINE_KINDS: [&str; 12] = [
    "Lathe",
    "Press Brake",
    "CNC Mill",
    "Laser Cutter",
    "Forklift",
    "Compressor",
    "Spot Welder",
    "Band Saw",
    "Drill Press",
    "Conveyor",
    "Paint Booth",
    "Grinder",
];

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const TASK_TITLES: [(TaskType, &str); 12] = [
    (TaskType::Maintenance, "Lubricate spindle bearings"),
    (TaskType::Maintenance, "Replace hydraulic filter"),
    (TaskType::Maintenance, "Calibrate torque wrenches"),
    (TaskType::Maintenance, "Inspect safety guards"),
    (TaskType::Meeting, "Weekly production sync"),
    (TaskType::Meeting, "Quarterly safety review"),
    (TaskType::Meeting, "Shift handover briefing"),
    (TaskType::Meeting, "Supplier quality call"),
    (TaskType::Personal, "Complete forklift training"),
    (TaskType::Personal, "Update certification records"),
    (TaskType::Personal, "Submit timesheet corrections"),
    (TaskType::Personal, "Review work instructions"),
];

const LOCATIONS: [&str; 6] = [
    "Bay 1",
    "Bay 4",
    "Conference room B",
    "Shipping dock",
    "Tool crib",
    "Line 2",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// A consistent set of portal records: every reference points at a record in
/// the same roster.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub departments: Vec<Department>,
    pub machines: Vec<Machine>,
    pub employees: Vec<Employee>,
    pub tasks: Vec<Task>,
}

impl Roster {
    /// The tasks assigned to `employee`, each with its own status.
    pub fn assignments_for(&self, employee: &Employee, faker: &mut WorkforceFaker) -> Vec<AssignedTask> {
        self.tasks
            .iter()
            .filter(|task| {
                task.assigned_employees
                    .iter()
                    .any(|person| person.id == employee.id)
            })
            .map(|task| faker.assignment(task))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct WorkforceFaker {
    rng: DeterministicRng,
    next_employee: i64,
    next_machine: usize,
    next_department: i64,
    next_task: i64,
}

impl WorkforceFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_employee: 1,
            next_machine: 1,
            next_department: 1,
            next_task: 1,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn department(&mut self) -> Department {
        let id = self.next_department;
        self.next_department += 1;
        let (name, description) = DEPARTMENTS[(id as usize - 1) % DEPARTMENTS.len()];
        let name = if id as usize > DEPARTMENTS.len() {
            format!("{name} {id}")
        } else {
            name.to_owned()
        };
        Department {
            id: DepartmentId::new(id),
            name,
            description: description.to_owned(),
            employee_count: None,
            created_at: Some(self.datetime_in_year(REFERENCE_YEAR - 1)),
        }
    }

    pub fn machine(&mut self, department: Option<&Department>) -> Machine {
        let number = self.next_machine;
        self.next_machine += 1;
        let kind = self.pick(&MACHINE_KINDS);
        Machine {
            id: MachineId::new(format!("M-{number:03}")),
            name: format!("{kind} {number}"),
            department: department.map(department_ref),
            created_at: Some(self.datetime_in_year(REFERENCE_YEAR - 1)),
        }
    }

    pub fn employee(&mut self, department: Option<&Department>, machines: &[Machine]) -> Employee {
        let number = self.next_employee;
        self.next_employee += 1;
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let assigned_machines = machines
            .iter()
            .filter(|_| self.rng.int_n(3) == 0)
            .map(|machine| MachineRef {
                id: machine.id.clone(),
                name: machine.name.clone(),
            })
            .collect();
        Employee {
            id: employee_id_for_number(number),
            employee_number: Some(number),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}{number}@example.com",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            role: if self.rng.int_n(5) == 0 {
                Role::Admin
            } else {
                Role::User
            },
            department: department.map(department_ref),
            assigned_machines,
            date_of_birth: Some(self.birth_date()),
            created_at: Some(self.datetime_in_year(REFERENCE_YEAR - 1)),
        }
    }

    pub fn task(&mut self, department: Option<&Department>, assignees: &[Employee]) -> Task {
        let id = self.next_task;
        self.next_task += 1;
        let (task_type, title) = TASK_TITLES[self.rng.int_n(TASK_TITLES.len())];
        let status = TaskStatus::ALL[self.rng.int_n(TaskStatus::ALL.len())];
        let due = fixture_now() + Duration::hours(self.rng.int_n(24 * 60) as i64 - 24 * 30);
        let assigned_employees = assignees
            .iter()
            .map(person_ref)
            .collect();
        Task {
            id: TaskId::new(id),
            title: title.to_owned(),
            description: self.sentence(),
            task_type,
            status,
            due_date_time: Some(due),
            location: self.pick(&LOCATIONS).to_owned(),
            recurring: false,
            recurrence_type: None,
            recurrence_interval: None,
            created_at: Some(due - Duration::days(14)),
            creator: assignees.first().map(person_ref),
            department: department.map(department_ref),
            assigned_employees,
        }
    }

    /// Per-assignee progress for `task`, one entry per assigned employee.
    pub fn task_details(&mut self, task: &Task, roster: &Roster) -> TaskDetails {
        let assignments = task
            .assigned_employees
            .iter()
            .map(|person| {
                let individual_status = TaskStatus::ALL[self.rng.int_n(TaskStatus::ALL.len())];
                let number = roster
                    .employees
                    .iter()
                    .find(|employee| employee.id == person.id)
                    .and_then(|employee| employee.employee_number);
                let completed = individual_status == TaskStatus::Completed;
                AssignmentReport {
                    employee: person.name.clone(),
                    employee_number: number,
                    individual_status,
                    assigned_at: task.created_at,
                    started_at: (individual_status != TaskStatus::Pending)
                        .then(|| task.created_at.map(|at| at + Duration::days(1)))
                        .flatten(),
                    completed_at: completed
                        .then(|| task.created_at.map(|at| at + Duration::days(2)))
                        .flatten(),
                    report: completed.then(|| self.sentence()),
                }
            })
            .collect();
        TaskDetails {
            task: task.clone(),
            assignments,
        }
    }

    pub fn assignment(&mut self, task: &Task) -> AssignedTask {
        let individual_status = TaskStatus::ALL[self.rng.int_n(TaskStatus::ALL.len())];
        AssignedTask {
            task: task.clone(),
            individual_status,
            assigned_at: task.created_at,
            report: (individual_status == TaskStatus::Completed)
                .then(|| "Finished without issues.".to_owned()),
        }
    }

    /// Departments, machines spread across them, employees with some
    /// machines each, and tasks assigned to one or two employees.
    pub fn roster(&mut self, departments: usize, employees: usize, tasks: usize) -> Roster {
        let departments: Vec<Department> = (0..departments).map(|_| self.department()).collect();
        let machines: Vec<Machine> = departments
            .iter()
            .flat_map(|department| [department.clone(), department.clone()])
            .map(|department| self.machine(Some(&department)))
            .collect();
        let employees: Vec<Employee> = (0..employees)
            .map(|_| {
                let department = self.pick_from(&departments).cloned();
                let local: Vec<Machine> = machines
                    .iter()
                    .filter(|machine| {
                        machine.department.as_ref().map(|dept| dept.id)
                            == department.as_ref().map(|dept| dept.id)
                    })
                    .cloned()
                    .collect();
                self.employee(department.as_ref(), &local)
            })
            .collect();
        let tasks = (0..tasks)
            .map(|_| {
                let department = self.pick_from(&departments).cloned();
                let mut assignees = Vec::new();
                if let Some(first) = self.pick_from(&employees) {
                    assignees.push(first.clone());
                }
                if self.rng.bool()
                    && let Some(second) = self.pick_from(&employees)
                    && !assignees.iter().any(|person| person.id == second.id)
                {
                    assignees.push(second.clone());
                }
                self.task(department.as_ref(), &assignees)
            })
            .collect();
        Roster {
            departments,
            machines,
            employees,
            tasks,
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn pick_from<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.rng.int_n(items.len()))
    }

    fn birth_date(&mut self) -> Date {
        let year = 1960 + self.rng.int_n(45) as i32;
        let ordinal = 1 + self.rng.int_n(365) as u16;
        Date::from_ordinal_date(year, ordinal).unwrap_or(Date::MIN)
    }

    fn datetime_in_year(&mut self, year: i32) -> PrimitiveDateTime {
        let start = midnight(year, Month::January, 1);
        start + Duration::minutes(self.rng.int_n(365 * 24 * 60) as i64)
    }

    fn sentence(&mut self) -> String {
        const WORDS: [&str; 20] = [
            "check",
            "line",
            "shift",
            "report",
            "verify",
            "torque",
            "spare",
            "parts",
            "schedule",
            "safety",
            "inspect",
            "clean",
            "log",
            "output",
            "coolant",
            "fixture",
            "order",
            "review",
            "sign",
            "off",
        ];
        let count = 4 + self.rng.int_n(6);
        let mut sentence = (0..count)
            .map(|_| self.pick(&WORDS))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

/// Fixed "now" the generated due dates are spread around, thirty days either
/// side.
pub fn fixture_now() -> PrimitiveDateTime {
    midnight(REFERENCE_YEAR, Month::June, 1)
}

fn person_ref(employee: &Employee) -> PersonRef {
    PersonRef {
        id: employee.id.clone(),
        name: employee.name.clone(),
        role: Some(employee.role),
    }
}

fn midnight(year: i32, month: Month, day: u8) -> PrimitiveDateTime {
    let date = Date::from_calendar_date(year, month, day).unwrap_or(Date::MIN);
    PrimitiveDateTime::new(date, Time::MIDNIGHT)
}

fn department_ref(department: &Department) -> DepartmentRef {
    DepartmentRef {
        id: department.id,
        name: department.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{WorkforceFaker, fixture_now};
    use std::collections::BTreeSet;
    use workdesk_app::TaskStatus;

    #[test]
    fn same_seed_same_records() {
        let mut left = WorkforceFaker::new(42);
        let mut right = WorkforceFaker::new(42);
        assert_eq!(left.roster(3, 10, 12).employees, right.roster(3, 10, 12).employees);
    }

    #[test]
    fn roster_references_stay_inside_the_roster() {
        let mut faker = WorkforceFaker::new(7);
        let roster = faker.roster(4, 20, 30);
        let departments: BTreeSet<_> = roster.departments.iter().map(|dept| dept.id).collect();
        let employees: BTreeSet<_> = roster.employees.iter().map(|emp| emp.id.clone()).collect();

        assert_eq!(roster.machines.len(), 8);
        for employee in &roster.employees {
            let department = employee.department.as_ref().expect("employee has department");
            assert!(departments.contains(&department.id));
        }
        for task in &roster.tasks {
            assert!(!task.assigned_employees.is_empty());
            assert!(task.assigned_employees.len() <= 2);
            assert!(task.assigned_employees.iter().all(|person| employees.contains(&person.id)));
        }
    }

    #[test]
    fn task_details_cover_every_assignee() {
        let mut faker = WorkforceFaker::new(11);
        let roster = faker.roster(2, 8, 6);
        for task in &roster.tasks {
            let details = faker.task_details(task, &roster);
            assert_eq!(details.assignments.len(), task.assigned_employees.len());
            for assignment in &details.assignments {
                assert!(assignment.employee_number.is_some());
                let completed = assignment.individual_status == TaskStatus::Completed;
                assert_eq!(assignment.completed_at.is_some(), completed);
                assert_eq!(assignment.has_report(), completed);
            }
        }
    }

    #[test]
    fn employee_ids_follow_employee_numbers() {
        let mut faker = WorkforceFaker::new(3);
        let first = faker.employee(None, &[]);
        let second = faker.employee(None, &[]);
        assert_eq!(first.id.as_str(), "0001");
        assert_eq!(second.employee_number, Some(2));
        assert!(first.email.ends_with("1@example.com"));
    }

    #[test]
    fn due_dates_straddle_the_reference_time() {
        let mut faker = WorkforceFaker::new(11);
        let roster = faker.roster(2, 6, 40);
        let now = fixture_now();
        assert!(roster.tasks.iter().any(|task| task.is_overdue(now)));
        assert!(
            roster
                .tasks
                .iter()
                .any(|task| task.due_date_time.is_some_and(|due| due > now))
        );
    }

    #[test]
    fn completed_assignments_carry_a_report() {
        let mut faker = WorkforceFaker::new(5);
        let roster = faker.roster(2, 4, 20);
        for employee in &roster.employees {
            for assigned in roster.assignments_for(employee, &mut faker) {
                if assigned.individual_status == TaskStatus::Completed {
                    assert!(assigned.report.is_some());
                }
            }
        }
    }

    #[test]
    fn variety_across_seeds() {
        let mut titles = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let mut faker = WorkforceFaker::new(seed);
            titles.insert(faker.task(None, &[]).title);
        }
        assert!(titles.len() > 3);
    }
}
