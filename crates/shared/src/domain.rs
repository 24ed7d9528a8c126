use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of display labels with serde and `FromStr` support.
/// Parsing is case-insensitive and ignores surrounding whitespace.
macro_rules! labelled_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| ParseEnumError {
                        kind: $kind,
                        value: raw.to_string(),
                    })
            }
        }
    };
}

labelled_enum!(Department, "department", {
    Engineering => "Engineering",
    Hr => "HR",
    Finance => "Finance",
    Marketing => "Marketing",
    Sales => "Sales",
    Operations => "Operations",
    Legal => "Legal",
});

labelled_enum!(EmployeeStatus, "status", {
    Active => "Active",
    OnLeave => "On Leave",
    Resigned => "Resigned",
});

impl EmployeeStatus {
    /// Tag colour used by the table and card views.
    pub fn color(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "green",
            EmployeeStatus::OnLeave => "orange",
            EmployeeStatus::Resigned => "red",
        }
    }
}

pub const MAX_PERFORMANCE_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("performance score {0} is outside 0..=100")]
pub struct ScoreOutOfRange(pub i64);

/// Integer performance score, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct PerformanceScore(u8);

impl PerformanceScore {
    pub fn new(raw: i64) -> Result<Self, ScoreOutOfRange> {
        Self::try_from(raw)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn band(&self) -> PerformanceBand {
        match self.0 {
            90..=100 => PerformanceBand::Excellent,
            75..=89 => PerformanceBand::Good,
            60..=74 => PerformanceBand::Average,
            _ => PerformanceBand::Poor,
        }
    }
}

impl TryFrom<i64> for PerformanceScore {
    type Error = ScoreOutOfRange;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if (0..=i64::from(MAX_PERFORMANCE_SCORE)).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(ScoreOutOfRange(raw))
        }
    }
}

impl From<PerformanceScore> for u8 {
    fn from(value: PerformanceScore) -> Self {
        value.0
    }
}

impl fmt::Display for PerformanceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl PerformanceBand {
    pub fn color(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "#52c41a",
            PerformanceBand::Good => "#1890ff",
            PerformanceBand::Average => "#faad14",
            PerformanceBand::Poor => "#f5222d",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub department: Department,
    pub role: String,
    pub joining_date: NaiveDate,
    pub status: EmployeeStatus,
    pub performance_score: PerformanceScore,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn from_form(id: EmployeeId, data: EmployeeFormData, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: data.name,
            department: data.department,
            role: data.role,
            joining_date: data.joining_date,
            status: data.status,
            performance_score: data.performance_score,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn form_data(&self) -> EmployeeFormData {
        EmployeeFormData {
            name: self.name.clone(),
            department: self.department,
            role: self.role.clone(),
            joining_date: self.joining_date,
            status: self.status,
            performance_score: self.performance_score,
        }
    }

    pub fn apply_form(&mut self, data: EmployeeFormData, now: DateTime<Utc>) {
        self.name = data.name;
        self.department = data.department;
        self.role = data.role;
        self.joining_date = data.joining_date;
        self.status = data.status;
        self.performance_score = data.performance_score;
        self.touch(now);
    }

    pub fn set_archived(&mut self, archived: bool, now: DateTime<Utc>) {
        self.is_archived = archived;
        self.touch(now);
    }

    /// Re-stamps `updated_at`; a clock that went backwards never lowers it.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFormData {
    pub name: String,
    pub department: Department,
    pub role: String,
    pub joining_date: NaiveDate,
    pub status: EmployeeStatus,
    pub performance_score: PerformanceScore,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
