// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// Employees and machines are keyed by zero-padded strings ("0007", "M-003").
macro_rules! text_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

numeric_id!(DepartmentId);
numeric_id!(TaskId);
text_id!(EmployeeId);
text_id!(MachineId);

/// Backend employee ids are the employee number padded to four digits.
pub fn employee_id_for_number(number: i64) -> EmployeeId {
    EmployeeId(format!("{number:04}"))
}

#[cfg(test)]
mod tests {
    use super::{EmployeeId, TaskId, employee_id_for_number};

    #[test]
    fn employee_numbers_pad_to_four_digits() {
        assert_eq!(employee_id_for_number(7), EmployeeId::new("0007"));
        assert_eq!(employee_id_for_number(12345).as_str(), "12345");
    }

    #[test]
    fn ids_serialize_as_bare_values() {
        let task = serde_json::to_string(&TaskId::new(42)).expect("serialize task id");
        assert_eq!(task, "42");
        let employee: EmployeeId = serde_json::from_str("\"0003\"").expect("decode employee id");
        assert_eq!(employee.as_str(), "0003");
    }
}
