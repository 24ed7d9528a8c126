//! Stateless filter / sort / paginate pipeline over an employee collection.
//!
//! Every stage borrows: records flow through as `&Employee` so the caller's
//! collection is never copied or reordered.

use std::cmp::Ordering;

use shared::{
    criteria::{FilterCriteria, SortField, SortOrder, SortState},
    domain::Employee,
};

/// One page of a filtered, sorted collection.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<'a> {
    pub rows: Vec<&'a Employee>,
    /// Number of records that survived the filter, across all pages.
    pub total: usize,
}

/// Keeps the records that satisfy every predicate in `filters`, in input order.
pub fn filter_employees<'a, I>(employees: I, filters: &FilterCriteria) -> Vec<&'a Employee>
where
    I: IntoIterator<Item = &'a Employee>,
{
    let needle = filters.search.to_lowercase();
    employees
        .into_iter()
        .filter(|employee| matches_filters(employee, filters, &needle))
        .collect()
}

fn matches_filters(employee: &Employee, filters: &FilterCriteria, needle: &str) -> bool {
    if employee.is_archived && !filters.show_archived {
        return false;
    }

    if !needle.is_empty() && !matches_search(employee, needle) {
        return false;
    }

    if filters
        .department
        .is_some_and(|department| employee.department != department)
    {
        return false;
    }

    if filters.status.is_some_and(|status| employee.status != status) {
        return false;
    }

    if let Some(range) = filters.date_range {
        if !range.contains(employee.joining_date) {
            return false;
        }
    }

    true
}

fn matches_search(employee: &Employee, needle: &str) -> bool {
    [
        employee.name.as_str(),
        employee.department.as_str(),
        employee.role.as_str(),
        employee.status.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Stable sort by the selected field. An unset field or order returns the
/// input untouched.
pub fn sort_employees<'a>(
    mut employees: Vec<&'a Employee>,
    sort: &SortState,
) -> Vec<&'a Employee> {
    let Some((field, order)) = sort.active() else {
        return employees;
    };

    employees.sort_by(|a, b| {
        let ordering = compare_by(field, a, b);
        match order {
            SortOrder::Ascend => ordering,
            SortOrder::Descend => ordering.reverse(),
        }
    });
    employees
}

fn compare_by(field: SortField, a: &Employee, b: &Employee) -> Ordering {
    match field {
        SortField::Name => compare_case_insensitive(&a.name, &b.name),
        SortField::Department => {
            compare_case_insensitive(a.department.as_str(), b.department.as_str())
        }
        SortField::JoiningDate => a.joining_date.cmp(&b.joining_date),
        SortField::PerformanceScore => a.performance_score.cmp(&b.performance_score),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn compare_case_insensitive(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Returns the 1-indexed `page` of `items`, clipped to bounds. Page 0, a zero
/// page size or a start past the end all yield an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let Some(start) = (page - 1).checked_mul(page_size) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Runs filter, sort and paginate in order.
pub fn run_query<'a>(
    employees: &'a [Employee],
    filters: &FilterCriteria,
    sort: &SortState,
    page: usize,
    page_size: usize,
) -> QueryPage<'a> {
    let matched = sort_employees(filter_employees(employees, filters), sort);
    QueryPage {
        total: matched.len(),
        rows: paginate(&matched, page, page_size).to_vec(),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
