//! Plain-text rendering of a [`DashboardView`].

use std::fmt::Write as _;

use client_core::{DashboardBody, DashboardView, PageModel, Presentation, PresentationRow};
use shared::criteria::{SortOrder, SortState};

pub fn render_view(view: &DashboardView) -> String {
    let mut out = String::new();

    if let Some(banner) = &view.banner {
        let _ = writeln!(out, "Error: {}", banner.message());
        out.push('\n');
    }

    match &view.body {
        DashboardBody::Loading => out.push_str("Loading employees...\n"),
        DashboardBody::NoData | DashboardBody::NoResults => {
            if let Some((title, hint)) = view.body.empty_state() {
                let _ = writeln!(out, "{title}\n{hint}");
            }
        }
        DashboardBody::Ready(Presentation::Table { page, sort }) => {
            render_table(&mut out, page, sort);
            render_footer(&mut out, page);
        }
        DashboardBody::Ready(Presentation::Cards { page }) => {
            render_cards(&mut out, page);
            render_footer(&mut out, page);
        }
    }

    out
}

fn sort_marker(sort: &SortState, key: &str) -> &'static str {
    match sort.active() {
        Some((field, SortOrder::Ascend)) if field.as_str() == key => " ^",
        Some((field, SortOrder::Descend)) if field.as_str() == key => " v",
        _ => "",
    }
}

fn render_table(out: &mut String, page: &PageModel, sort: &SortState) {
    let mut header = vec![
        "ID".to_string(),
        format!("Name{}", sort_marker(sort, "name")),
        format!("Department{}", sort_marker(sort, "department")),
        "Role".to_string(),
        format!("Joining Date{}", sort_marker(sort, "joiningDate")),
        "Status".to_string(),
    ];
    if page.show_archived {
        header.push("Archived".to_string());
    }
    header.push(format!("Performance{}", sort_marker(sort, "performanceScore")));
    header.push("Actions".to_string());

    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| table_cells(row, page.show_archived))
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_line(out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(out, &rule, &widths);
    for cells in &rows {
        write_line(out, cells, &widths);
    }
}

fn table_cells(row: &PresentationRow, show_archived: bool) -> Vec<String> {
    let mut cells = vec![
        row.id.to_string(),
        row.name.clone(),
        row.department.to_string(),
        row.role.clone(),
        row.joining_date_label.clone(),
        row.status.to_string(),
    ];
    if show_archived {
        cells.push(if row.is_archived { "Archived" } else { "" }.to_string());
    }
    cells.push(format!("{}/100", row.performance_score));
    cells.push(actions(row));
    cells
}

fn actions(row: &PresentationRow) -> String {
    row.actions
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

fn render_cards(out: &mut String, page: &PageModel) {
    for (index, row) in page.rows.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let archived = if row.is_archived { " [Archived]" } else { "" };
        let _ = writeln!(out, "[{}] {}{archived}", row.id, row.name);
        let _ = writeln!(out, "  {} / {}", row.role, row.department);
        let _ = writeln!(out, "  Joined {}", row.joining_date_label);
        let _ = writeln!(out, "  Status: {}", row.status);
        let _ = writeln!(out, "  Performance: {}/100", row.performance_score);
        let _ = writeln!(out, "  Actions: {}", actions(row));
    }
}

fn render_footer(out: &mut String, page: &PageModel) {
    let pagination = page.pagination;
    let _ = writeln!(
        out,
        "\nPage {} of {} ({} employees, {} per page)",
        pagination.current,
        page.page_count().max(1),
        pagination.total,
        pagination.page_size
    );
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
