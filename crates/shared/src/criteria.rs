//! Filter, sort, pagination and view state shared by the query pipeline,
//! the dashboard orchestrator and the settings repository.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Department, EmployeeStatus, ParseEnumError};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 20, 50];

/// Inclusive calendar range on the joining date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search: String,
    pub department: Option<Department>,
    pub status: Option<EmployeeStatus>,
    pub date_range: Option<DateRange>,
    /// When set, archived records are listed alongside active ones.
    pub show_archived: bool,
}

impl FilterCriteria {
    /// Criteria with every field cleared except the archived toggle.
    pub fn cleared(&self) -> Self {
        Self {
            show_archived: self.show_archived,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Department,
    JoiningDate,
    PerformanceScore,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const ALL: &'static [SortField] = &[
        SortField::Name,
        SortField::Department,
        SortField::JoiningDate,
        SortField::PerformanceScore,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Department => "department",
            SortField::JoiningDate => "joiningDate",
            SortField::PerformanceScore => "performanceScore",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ParseEnumError {
                kind: "sort field",
                value: raw.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[serde(alias = "asc")]
    Ascend,
    #[serde(alias = "desc")]
    Descend,
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ascend" | "asc" => Ok(SortOrder::Ascend),
            "descend" | "desc" => Ok(SortOrder::Descend),
            _ => Err(ParseEnumError {
                kind: "sort order",
                value: raw.to_string(),
            }),
        }
    }
}

/// A sort selector. Missing field or missing order means "keep fetch order".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: Option<SortField>,
    pub order: Option<SortOrder>,
}

impl SortState {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self {
            field: Some(field),
            order: Some(order),
        }
    }

    pub fn active(&self) -> Option<(SortField, SortOrder)> {
        self.field.zip(self.order)
    }
}

pub fn is_allowed_page_size(page_size: usize) -> bool {
    PAGE_SIZE_OPTIONS.contains(&page_size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// 1-indexed page number.
    pub current: usize,
    pub page_size: usize,
    pub total: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

impl PaginationState {
    pub fn is_valid(&self) -> bool {
        self.current >= 1 && is_allowed_page_size(self.page_size)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Table,
    Card,
}

impl FromStr for ViewMode {
    type Err = ParseEnumError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(ViewMode::Table),
            "card" | "cards" => Ok(ViewMode::Card),
            _ => Err(ParseEnumError {
                kind: "view mode",
                value: raw.to_string(),
            }),
        }
    }
}

/// UI state persisted across sessions. Filter text is never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardPreferences {
    pub view_mode: ViewMode,
    pub sort: SortState,
    pub pagination: PaginationState,
}
