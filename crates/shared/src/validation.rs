//! Form boundary checks applied before any store call is issued.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Department, EmployeeFormData, EmployeeStatus, PerformanceScore};

pub const REQUIRED: &str = "This field is required";
pub const NAME_MIN: &str = "Name must be at least 2 characters";
pub const FUTURE_DATE: &str = "Date cannot be in the future";
pub const PERFORMANCE_RANGE: &str = "Score must be between 0 and 100";
pub const UNKNOWN_OPTION: &str = "Please select one of the listed options";

const NAME_MIN_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Department,
    Role,
    JoiningDate,
    Status,
    PerformanceScore,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormField::Name => "name",
            FormField::Department => "department",
            FormField::Role => "role",
            FormField::JoiningDate => "joining date",
            FormField::Status => "status",
            FormField::PerformanceScore => "performance score",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.0.iter().map(|err| err.field)
    }

    pub fn message_for(&self, field: FormField) -> Option<&'static str> {
        self.0
            .iter()
            .find(|err| err.field == field)
            .map(|err| err.message)
    }
}

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|err| format!("{}: {}", err.field, err.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw drawer input before validation. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
    pub name: String,
    pub department: Option<String>,
    pub role: String,
    pub joining_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub performance_score: Option<i64>,
}

impl From<&EmployeeFormData> for EmployeeDraft {
    fn from(data: &EmployeeFormData) -> Self {
        Self {
            name: data.name.clone(),
            department: Some(data.department.to_string()),
            role: data.role.clone(),
            joining_date: Some(data.joining_date),
            status: Some(data.status.to_string()),
            performance_score: Some(i64::from(data.performance_score.value())),
        }
    }
}

/// Checks a draft against the drawer rules, collecting every failing field.
///
/// `today` is the caller's notion of "now" so the future-date rule stays
/// deterministic under test.
pub fn validate_form(
    draft: &EmployeeDraft,
    today: NaiveDate,
) -> Result<EmployeeFormData, ValidationErrors> {
    let mut errors = Vec::new();
    let mut fail = |field, message| errors.push(FieldError { field, message });

    let name = draft.name.trim();
    if name.is_empty() {
        fail(FormField::Name, REQUIRED);
    } else if name.chars().count() < NAME_MIN_CHARS {
        fail(FormField::Name, NAME_MIN);
    }

    let department = match draft.department.as_deref().map(str::trim) {
        None | Some("") => {
            fail(FormField::Department, REQUIRED);
            None
        }
        Some(raw) => match raw.parse::<Department>() {
            Ok(department) => Some(department),
            Err(_) => {
                fail(FormField::Department, UNKNOWN_OPTION);
                None
            }
        },
    };

    let role = draft.role.trim();
    if role.is_empty() {
        fail(FormField::Role, REQUIRED);
    }

    let joining_date = match draft.joining_date {
        None => {
            fail(FormField::JoiningDate, REQUIRED);
            None
        }
        Some(date) if date > today => {
            fail(FormField::JoiningDate, FUTURE_DATE);
            None
        }
        Some(date) => Some(date),
    };

    let status = match draft.status.as_deref().map(str::trim) {
        None | Some("") => {
            fail(FormField::Status, REQUIRED);
            None
        }
        Some(raw) => match raw.parse::<EmployeeStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                fail(FormField::Status, UNKNOWN_OPTION);
                None
            }
        },
    };

    let performance_score = match draft.performance_score {
        None => {
            fail(FormField::PerformanceScore, REQUIRED);
            None
        }
        Some(raw) => match PerformanceScore::new(raw) {
            Ok(score) => Some(score),
            Err(_) => {
                fail(FormField::PerformanceScore, PERFORMANCE_RANGE);
                None
            }
        },
    };

    match (department, joining_date, status, performance_score) {
        (Some(department), Some(joining_date), Some(status), Some(performance_score))
            if errors.is_empty() =>
        {
            Ok(EmployeeFormData {
                name: name.to_string(),
                department,
                role: role.to_string(),
                joining_date,
                status,
                performance_score,
            })
        }
        _ => Err(ValidationErrors(errors)),
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
