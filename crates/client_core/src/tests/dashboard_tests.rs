use super::*;
use crate::{notice::NoticeCategory, presentation::RowAction};
use shared::{
    criteria::{SortField, SortOrder},
    error::ErrorCode,
    validation::FormField,
};
use storage::{LocalEmployeeStore, Storage, StoredSettings, EMPLOYEES_KEY};

const SEARCH_DELAY: Duration = Duration::from_millis(20);

async fn open(storage: &Storage) -> Dashboard {
    let store = Arc::new(LocalEmployeeStore::with_latency(
        storage.clone(),
        Duration::ZERO,
    ));
    let settings = Arc::new(StoredSettings::new(storage.clone()));
    Dashboard::new(EmployeeController::new(store), settings, SEARCH_DELAY).await
}

async fn seeded() -> (Storage, Dashboard) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let dashboard = open(&storage).await;
    dashboard.refresh().await.expect("load");
    (storage, dashboard)
}

fn names(view: &DashboardView) -> Vec<String> {
    match &view.body {
        DashboardBody::Ready(presentation) => presentation
            .page()
            .rows
            .iter()
            .map(|row| row.name.clone())
            .collect(),
        other => panic!("expected rows, got {other:?}"),
    }
}

fn pagination(view: &DashboardView) -> PaginationState {
    match &view.body {
        DashboardBody::Ready(presentation) => presentation.page().pagination,
        other => panic!("expected rows, got {other:?}"),
    }
}

fn draft(name: &str) -> EmployeeDraft {
    EmployeeDraft {
        name: name.to_string(),
        department: Some("Legal".to_string()),
        role: "Counsel".to_string(),
        joining_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        status: Some("Active".to_string()),
        performance_score: Some(81),
    }
}

#[tokio::test]
async fn initial_view_is_a_table_of_active_records() {
    let (_, dashboard) = seeded().await;
    let view = dashboard.view().await;

    assert_eq!(view.banner, None);
    assert!(view.shows_filters());
    assert!(matches!(
        view.body,
        DashboardBody::Ready(Presentation::Table { .. })
    ));
    let names = names(&view);
    assert_eq!(names.len(), 7);
    assert!(!names.contains(&"Ethan Brown".to_string()));
    assert_eq!(pagination(&view).total, 7);
}

#[tokio::test]
async fn show_archived_includes_archived_records() {
    let (_, dashboard) = seeded().await;
    dashboard.set_show_archived(true).await;

    let view = dashboard.view().await;
    assert_eq!(names(&view).len(), 8);
    match &view.body {
        DashboardBody::Ready(presentation) => {
            let page = presentation.page();
            assert!(page.show_archived);
            let ethan = page
                .rows
                .iter()
                .find(|row| row.name == "Ethan Brown")
                .expect("archived row listed");
            assert_eq!(ethan.actions, vec![RowAction::Edit, RowAction::Restore]);
        }
        other => panic!("expected rows, got {other:?}"),
    }
}

#[tokio::test]
async fn search_filters_across_text_fields() {
    let (_, dashboard) = seeded().await;
    dashboard.apply_search("engineer").await;

    assert_eq!(
        names(&dashboard.view().await),
        vec!["Alice Johnson", "Diana Martinez", "George Wilson"]
    );
}

#[tokio::test]
async fn typed_search_applies_only_after_it_settles() {
    let (_, dashboard) = seeded().await;
    dashboard.type_search("Fi").await;
    dashboard.type_search("Fiona").await;

    assert_eq!(dashboard.search_input().await, "Fiona");
    assert_eq!(dashboard.filters().await.search, "");
    assert_eq!(names(&dashboard.view().await).len(), 7);

    assert!(dashboard.settle_search().await);
    assert_eq!(dashboard.filters().await.search, "Fiona");
    assert_eq!(names(&dashboard.view().await), vec!["Fiona Chen"]);
    assert!(!dashboard.settle_search().await);
}

#[tokio::test]
async fn dropdown_and_date_filters_combine() {
    let (_, dashboard) = seeded().await;
    dashboard.set_department(Some(Department::Engineering)).await;
    dashboard.set_status(Some(EmployeeStatus::Active)).await;
    dashboard
        .set_date_range(Some(DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).expect("date"),
            NaiveDate::from_ymd_opt(2023, 12, 31).expect("date"),
        )))
        .await;

    assert_eq!(
        names(&dashboard.view().await),
        vec!["Alice Johnson", "Diana Martinez"]
    );
}

#[tokio::test]
async fn reset_keeps_the_archived_toggle() {
    let (_, dashboard) = seeded().await;
    dashboard.set_show_archived(true).await;
    dashboard.apply_search("zzz").await;
    dashboard.set_department(Some(Department::Legal)).await;
    dashboard.type_search("pending").await;

    dashboard.reset_filters().await;

    let filters = dashboard.filters().await;
    assert!(filters.show_archived);
    assert_eq!(filters.search, "");
    assert_eq!(filters.department, None);
    assert_eq!(dashboard.search_input().await, "");
    assert!(!dashboard.settle_search().await);
    assert_eq!(names(&dashboard.view().await).len(), 8);
}

#[tokio::test]
async fn unmatched_filters_show_no_results() {
    let (_, dashboard) = seeded().await;
    dashboard.apply_search("zzz").await;

    let view = dashboard.view().await;
    assert_eq!(view.body, DashboardBody::NoResults);
    assert_eq!(
        view.body.empty_state().map(|(title, _)| title),
        Some("No Results Found")
    );
    assert!(view.shows_filters());
}

#[tokio::test]
async fn empty_collection_shows_no_data_unless_archived_are_shown() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_item(EMPLOYEES_KEY, "[]").await.expect("set");
    let dashboard = open(&storage).await;
    dashboard.refresh().await.expect("load");

    let view = dashboard.view().await;
    assert_eq!(view.body, DashboardBody::NoData);
    assert_eq!(
        view.body.empty_state().map(|(title, _)| title),
        Some("No Employees Yet")
    );
    assert!(!view.shows_filters());

    dashboard.set_show_archived(true).await;
    assert!(names(&dashboard.view().await).is_empty());
}

#[tokio::test]
async fn changed_total_returns_to_first_page() {
    let (storage, dashboard) = seeded().await;
    dashboard.set_page(2, 5).await.expect("page");

    let view = dashboard.view().await;
    assert_eq!(names(&view).len(), 2);
    assert_eq!(pagination(&view).current, 2);

    dashboard.set_department(Some(Department::Engineering)).await;
    let view = dashboard.view().await;
    assert_eq!(pagination(&view).current, 1);
    assert_eq!(pagination(&view).total, 3);

    let persisted = StoredSettings::new(storage).load().await;
    assert_eq!(persisted.pagination.current, 1);
    assert_eq!(persisted.pagination.page_size, 5);
    assert_eq!(persisted.pagination.total, 3);
}

#[tokio::test]
async fn unchanged_total_keeps_the_page() {
    let (_, dashboard) = seeded().await;
    dashboard.set_page(2, 5).await.expect("page");
    dashboard.set_sort(SortState::new(SortField::Name, SortOrder::Ascend)).await;
    dashboard.set_status(None).await;

    assert_eq!(dashboard.preferences().await.pagination.current, 2);
}

#[tokio::test]
async fn rejects_out_of_range_pages() {
    let (_, dashboard) = seeded().await;
    assert_eq!(dashboard.set_page(0, 10).await, Err(PageError::ZeroPage));
    assert_eq!(dashboard.set_page(1, 7).await, Err(PageError::PageSize(7)));
    assert_eq!(
        dashboard.preferences().await.pagination,
        PaginationState {
            current: 1,
            page_size: 10,
            total: 7,
        }
    );
}

#[tokio::test]
async fn sort_and_view_mode_survive_a_restart() {
    let (storage, dashboard) = seeded().await;
    dashboard.set_view_mode(ViewMode::Card).await;
    dashboard
        .set_sort(SortState::new(SortField::PerformanceScore, SortOrder::Descend))
        .await;
    let saved = dashboard.preferences().await;

    let reopened = open(&storage).await;
    assert_eq!(reopened.preferences().await, saved);
    reopened.refresh().await.expect("load");

    let view = reopened.view().await;
    assert!(matches!(
        view.body,
        DashboardBody::Ready(Presentation::Cards { .. })
    ));
    assert_eq!(names(&view)[..2], ["Diana Martinez", "Alice Johnson"]);
    assert_eq!(reopened.filters().await, FilterCriteria::default());
}

#[tokio::test]
async fn create_through_the_drawer_closes_it_on_success() {
    let (_, dashboard) = seeded().await;
    dashboard.open_create().await;
    let drawer = dashboard.drawer().await;
    assert_eq!(drawer.title(), Some("Add New Employee"));
    assert_eq!(drawer.initial_draft(), Some(EmployeeDraft::default()));

    let created = dashboard.submit(&draft("Ivy Moreno")).await.expect("submit");
    assert_eq!(created.department, Department::Legal);
    assert_eq!(dashboard.drawer().await, DrawerState::Closed);

    let view = dashboard.view().await;
    assert_eq!(names(&view).len(), 8);
    assert_eq!(pagination(&view).total, 8);
}

#[tokio::test]
async fn invalid_draft_keeps_the_drawer_open() {
    let (_, dashboard) = seeded().await;
    dashboard.open_create().await;

    let mut bad = draft("I");
    bad.performance_score = Some(140);
    bad.status = None;
    let err = dashboard.submit(&bad).await.expect_err("invalid");
    match err {
        SubmitError::Invalid(errors) => assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![FormField::Name, FormField::Status, FormField::PerformanceScore]
        ),
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(dashboard.drawer().await, DrawerState::Creating);
    assert_eq!(names(&dashboard.view().await).len(), 7);
}

#[tokio::test]
async fn edit_prefills_and_updates_the_record() {
    let (_, dashboard) = seeded().await;
    let id = EmployeeId::from("2");
    dashboard.open_edit(&id).await.expect("open");

    let drawer = dashboard.drawer().await;
    assert_eq!(drawer.title(), Some("Edit Employee"));
    let mut edited = drawer.initial_draft().expect("draft");
    assert_eq!(edited.name, "Bob Lee");
    assert_eq!(edited.status.as_deref(), Some("On Leave"));

    edited.role = "Senior Recruiter".to_string();
    let updated = dashboard.submit(&edited).await.expect("submit");
    assert_eq!(updated.id, id);
    assert_eq!(updated.role, "Senior Recruiter");
    assert_eq!(dashboard.drawer().await, DrawerState::Closed);
    assert_eq!(
        dashboard.controller().find(&id).await.map(|e| e.role),
        Some("Senior Recruiter".to_string())
    );
}

#[tokio::test]
async fn save_and_continue_keeps_editing_the_saved_record() {
    let (_, dashboard) = seeded().await;
    dashboard
        .open_edit(&EmployeeId::from("3"))
        .await
        .expect("open");

    let mut edited = dashboard
        .drawer()
        .await
        .initial_draft()
        .expect("draft");
    edited.performance_score = Some(91);
    let saved = dashboard
        .submit_and_continue(&edited)
        .await
        .expect("submit");

    assert_eq!(dashboard.drawer().await, DrawerState::Editing(saved));
}

#[tokio::test]
async fn drawer_failures_surface_as_errors() {
    let (_, dashboard) = seeded().await;
    assert!(matches!(
        dashboard.submit(&draft("Ivy Moreno")).await,
        Err(SubmitError::DrawerClosed)
    ));

    let err = dashboard
        .open_edit(&EmployeeId::from("77"))
        .await
        .expect_err("unknown id");
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(dashboard.drawer().await, DrawerState::Closed);
}

#[tokio::test]
async fn archive_restore_and_delete_update_the_view() {
    let (_, dashboard) = seeded().await;
    dashboard
        .archive(&EmployeeId::from("1"))
        .await
        .expect("archive");
    assert_eq!(pagination(&dashboard.view().await).total, 6);

    dashboard
        .restore(&EmployeeId::from("5"))
        .await
        .expect("restore");
    assert!(names(&dashboard.view().await).contains(&"Ethan Brown".to_string()));

    dashboard
        .delete(&EmployeeId::from("8"))
        .await
        .expect("delete");
    dashboard.set_show_archived(true).await;
    let view = dashboard.view().await;
    assert_eq!(names(&view).len(), 7);
    assert!(!names(&view).contains(&"Hannah Taylor".to_string()));
}

#[tokio::test]
async fn failed_action_raises_a_dismissible_banner() {
    let (_, dashboard) = seeded().await;
    dashboard
        .archive(&EmployeeId::from("99"))
        .await
        .expect_err("unknown id");

    let banner = dashboard.view().await.banner.expect("banner");
    assert_eq!(banner.category(), NoticeCategory::NotFound);
    assert_eq!(
        banner.message(),
        "Failed to archive employee: Employee not found: 99"
    );
    assert_eq!(names(&dashboard.view().await).len(), 7);

    dashboard.dismiss_error().await;
    assert_eq!(dashboard.view().await.banner, None);
}
