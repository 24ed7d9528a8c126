//! Display-ready rows shared by the table and card renderers.

use chrono::NaiveDate;
use shared::{
    criteria::{PaginationState, SortField, SortState},
    domain::{Department, Employee, EmployeeId, EmployeeStatus, PerformanceBand},
};

pub const JOINING_DATE_FORMAT: &str = "%b %d, %Y";

/// Columns the table lets the user sort by.
pub const SORTABLE_COLUMNS: [SortField; 4] = [
    SortField::Name,
    SortField::Department,
    SortField::JoiningDate,
    SortField::PerformanceScore,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Archive,
    Restore,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Edit => "Edit",
            RowAction::Archive => "Archive",
            RowAction::Restore => "Restore",
        }
    }

    /// Title and prompt shown before the action runs, if it needs confirming.
    pub fn confirmation(&self) -> Option<(&'static str, &'static str)> {
        match self {
            RowAction::Edit => None,
            RowAction::Archive => Some((
                "Archive Employee",
                "Are you sure you want to archive this employee?",
            )),
            RowAction::Restore => Some((
                "Restore Employee",
                "Are you sure you want to restore this employee?",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationRow {
    pub id: EmployeeId,
    pub name: String,
    pub department: Department,
    pub role: String,
    pub joining_date: NaiveDate,
    pub joining_date_label: String,
    pub status: EmployeeStatus,
    pub status_color: &'static str,
    pub performance_score: u8,
    pub performance_band: PerformanceBand,
    pub performance_color: &'static str,
    pub is_archived: bool,
    pub actions: Vec<RowAction>,
}

impl From<&Employee> for PresentationRow {
    fn from(employee: &Employee) -> Self {
        let band = employee.performance_score.band();
        let toggle = if employee.is_archived {
            RowAction::Restore
        } else {
            RowAction::Archive
        };
        Self {
            id: employee.id.clone(),
            name: employee.name.clone(),
            department: employee.department,
            role: employee.role.clone(),
            joining_date: employee.joining_date,
            joining_date_label: employee
                .joining_date
                .format(JOINING_DATE_FORMAT)
                .to_string(),
            status: employee.status,
            status_color: employee.status.color(),
            performance_score: employee.performance_score.value(),
            performance_band: band,
            performance_color: band.color(),
            is_archived: employee.is_archived,
            actions: vec![RowAction::Edit, toggle],
        }
    }
}

/// One page of rows plus the pagination state it was cut with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageModel {
    pub rows: Vec<PresentationRow>,
    pub pagination: PaginationState,
    /// Archived rows are visible, so renderers flag them.
    pub show_archived: bool,
}

impl PageModel {
    pub fn new<'a>(
        rows: impl IntoIterator<Item = &'a Employee>,
        pagination: PaginationState,
        show_archived: bool,
    ) -> Self {
        Self {
            rows: rows.into_iter().map(PresentationRow::from).collect(),
            pagination,
            show_archived,
        }
    }

    pub fn page_count(&self) -> usize {
        query::page_count(self.pagination.total, self.pagination.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Table { page: PageModel, sort: SortState },
    Cards { page: PageModel },
}

impl Presentation {
    pub fn page(&self) -> &PageModel {
        match self {
            Presentation::Table { page, .. } | Presentation::Cards { page } => page,
        }
    }
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;
