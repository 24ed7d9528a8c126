use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDate};
use query::{filter_employees, run_query};
use shared::{
    criteria::{
        is_allowed_page_size, DashboardPreferences, DateRange, FilterCriteria, PaginationState,
        SortState, ViewMode,
    },
    domain::{Department, Employee, EmployeeId, EmployeeStatus},
    error::ApiError,
    validation::{validate_form, EmployeeDraft, ValidationErrors},
};
use storage::SettingsRepository;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    debounce::Debounced,
    notice::Notice,
    presentation::{PageModel, Presentation},
    EmployeeController,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DrawerState {
    #[default]
    Closed,
    Creating,
    Editing(Employee),
}

impl DrawerState {
    pub fn is_open(&self) -> bool {
        !matches!(self, DrawerState::Closed)
    }

    pub fn title(&self) -> Option<&'static str> {
        match self {
            DrawerState::Closed => None,
            DrawerState::Creating => Some("Add New Employee"),
            DrawerState::Editing(_) => Some("Edit Employee"),
        }
    }

    /// Form contents when the drawer opens: blank for create, the record's
    /// current values for edit.
    pub fn initial_draft(&self) -> Option<EmployeeDraft> {
        match self {
            DrawerState::Closed => None,
            DrawerState::Creating => Some(EmployeeDraft::default()),
            DrawerState::Editing(employee) => Some(EmployeeDraft::from(&employee.form_data())),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("the employee drawer is not open")]
    DrawerClosed,
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error("{0}")]
    Store(ApiError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page numbers start at 1")]
    ZeroPage,
    #[error("page size {0} is not one of 5, 10, 20, 50")]
    PageSize(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardBody {
    Loading,
    /// The collection is empty and archived records are hidden.
    NoData,
    /// Records exist but none survive the current filters.
    NoResults,
    Ready(Presentation),
}

impl DashboardBody {
    /// Heading and hint for the empty states.
    pub fn empty_state(&self) -> Option<(&'static str, &'static str)> {
        match self {
            DashboardBody::NoData => Some((
                "No Employees Yet",
                "Get started by adding your first employee to the system",
            )),
            DashboardBody::NoResults => Some((
                "No Results Found",
                "No employees match your current filters. Try adjusting your search criteria.",
            )),
            DashboardBody::Loading | DashboardBody::Ready(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    /// Dismissible error banner for the last failed operation.
    pub banner: Option<Notice>,
    pub body: DashboardBody,
    pub filters: FilterCriteria,
    pub drawer: DrawerState,
}

impl DashboardView {
    pub fn shows_filters(&self) -> bool {
        self.body != DashboardBody::NoData
    }
}

#[derive(Default)]
struct UiState {
    filters: FilterCriteria,
    search_input: String,
    preferences: DashboardPreferences,
    drawer: DrawerState,
}

/// Composes the employee controller, the query pipeline and persisted UI
/// preferences into a renderable view.
pub struct Dashboard {
    controller: Arc<EmployeeController>,
    settings: Arc<dyn SettingsRepository>,
    state: Mutex<UiState>,
    search: Mutex<Debounced<String>>,
}

impl Dashboard {
    pub async fn new(
        controller: Arc<EmployeeController>,
        settings: Arc<dyn SettingsRepository>,
        search_delay: Duration,
    ) -> Self {
        let preferences = settings.load().await;
        debug!(?preferences, "restored dashboard preferences");
        Self {
            controller,
            settings,
            state: Mutex::new(UiState {
                preferences,
                ..UiState::default()
            }),
            search: Mutex::new(Debounced::new(search_delay)),
        }
    }

    pub fn controller(&self) -> &Arc<EmployeeController> {
        &self.controller
    }

    pub async fn filters(&self) -> FilterCriteria {
        self.state.lock().await.filters.clone()
    }

    /// Raw search box contents, which may be ahead of the applied filter.
    pub async fn search_input(&self) -> String {
        self.state.lock().await.search_input.clone()
    }

    pub async fn preferences(&self) -> DashboardPreferences {
        self.state.lock().await.preferences
    }

    pub async fn drawer(&self) -> DrawerState {
        self.state.lock().await.drawer.clone()
    }

    pub async fn refresh(&self) -> Result<usize, ApiError> {
        let result = self.controller.load().await;
        self.sync_total().await;
        result
    }

    pub async fn dismiss_error(&self) {
        self.controller.dismiss_error().await;
    }

    pub async fn type_search(&self, input: impl Into<String>) {
        let input = input.into();
        self.state.lock().await.search_input = input.clone();
        self.search.lock().await.push(input);
    }

    /// Waits until typing has been idle for the debounce delay and applies the
    /// latest input. Returns `false` when nothing was pending.
    pub async fn settle_search(&self) -> bool {
        loop {
            let Some(deadline) = self.search.lock().await.deadline() else {
                return false;
            };
            tokio::time::sleep_until(deadline).await;

            let ready = self.search.lock().await.poll_ready();
            if let Some(term) = ready {
                self.apply_filters(|state| state.filters.search = term).await;
                return true;
            }
        }
    }

    /// Applies a search term immediately, dropping any pending keystrokes.
    pub async fn apply_search(&self, term: impl Into<String>) {
        let term = term.into();
        self.search.lock().await.flush();
        self.apply_filters(|state| {
            state.search_input = term.clone();
            state.filters.search = term;
        })
        .await;
    }

    pub async fn set_department(&self, department: Option<Department>) {
        self.apply_filters(|state| state.filters.department = department)
            .await;
    }

    pub async fn set_status(&self, status: Option<EmployeeStatus>) {
        self.apply_filters(|state| state.filters.status = status).await;
    }

    pub async fn set_date_range(&self, range: Option<DateRange>) {
        self.apply_filters(|state| state.filters.date_range = range)
            .await;
    }

    pub async fn set_show_archived(&self, show_archived: bool) {
        self.apply_filters(|state| state.filters.show_archived = show_archived)
            .await;
    }

    /// Clears every filter except the archived toggle.
    pub async fn reset_filters(&self) {
        self.search.lock().await.flush();
        self.apply_filters(|state| {
            state.filters = state.filters.cleared();
            state.search_input.clear();
        })
        .await;
    }

    async fn apply_filters(&self, change: impl FnOnce(&mut UiState)) {
        change(&mut *self.state.lock().await);
        self.sync_total().await;
    }

    pub async fn set_sort(&self, sort: SortState) {
        let mut state = self.state.lock().await;
        state.preferences.sort = sort;
        self.persist(&state.preferences).await;
    }

    pub async fn set_page(&self, page: usize, page_size: usize) -> Result<(), PageError> {
        if page == 0 {
            return Err(PageError::ZeroPage);
        }
        if !is_allowed_page_size(page_size) {
            return Err(PageError::PageSize(page_size));
        }

        let mut state = self.state.lock().await;
        state.preferences.pagination.current = page;
        state.preferences.pagination.page_size = page_size;
        self.persist(&state.preferences).await;
        Ok(())
    }

    pub async fn set_view_mode(&self, view_mode: ViewMode) {
        let mut state = self.state.lock().await;
        state.preferences.view_mode = view_mode;
        self.persist(&state.preferences).await;
    }

    /// Recounts the filtered collection; a changed total sends the user back
    /// to the first page.
    async fn sync_total(&self) {
        let mut state = self.state.lock().await;
        let total = self
            .controller
            .with_employees(|employees| filter_employees(employees, &state.filters).len())
            .await;

        let pagination = &mut state.preferences.pagination;
        if pagination.total == total {
            return;
        }
        debug!(previous = pagination.total, total, "filtered total changed");
        pagination.total = total;
        pagination.current = 1;
        self.persist(&state.preferences).await;
    }

    async fn persist(&self, preferences: &DashboardPreferences) {
        if let Err(error) = self.settings.save(preferences).await {
            warn!(error = %error, "failed to persist dashboard preferences");
        }
    }

    pub async fn open_create(&self) {
        self.state.lock().await.drawer = DrawerState::Creating;
    }

    pub async fn open_edit(&self, id: &EmployeeId) -> Result<(), ApiError> {
        let employee = self
            .controller
            .find(id)
            .await
            .ok_or_else(|| ApiError::not_found(format!("Employee not found: {id}")))?;
        self.state.lock().await.drawer = DrawerState::Editing(employee);
        Ok(())
    }

    pub async fn close_drawer(&self) {
        self.state.lock().await.drawer = DrawerState::Closed;
    }

    /// Validates the draft and creates or updates depending on the drawer.
    /// The drawer closes only when the store accepted the change.
    pub async fn submit(&self, draft: &EmployeeDraft) -> Result<Employee, SubmitError> {
        self.submit_on(draft, today(), false).await
    }

    /// Like [`Dashboard::submit`] but leaves the drawer open for the next entry.
    pub async fn submit_and_continue(
        &self,
        draft: &EmployeeDraft,
    ) -> Result<Employee, SubmitError> {
        self.submit_on(draft, today(), true).await
    }

    pub async fn submit_on(
        &self,
        draft: &EmployeeDraft,
        today: NaiveDate,
        keep_open: bool,
    ) -> Result<Employee, SubmitError> {
        let target = match &self.state.lock().await.drawer {
            DrawerState::Closed => return Err(SubmitError::DrawerClosed),
            DrawerState::Creating => None,
            DrawerState::Editing(employee) => Some(employee.id.clone()),
        };

        let data = validate_form(draft, today)?;
        let saved = match &target {
            None => self.controller.create(data).await,
            Some(id) => self.controller.update(id, data).await,
        }
        .map_err(SubmitError::Store)?;
        info!(employee_id = %saved.id, created = target.is_none(), "saved employee");

        self.sync_total().await;
        let mut state = self.state.lock().await;
        state.drawer = match (&state.drawer, keep_open) {
            (_, false) => DrawerState::Closed,
            (DrawerState::Editing(_), true) => DrawerState::Editing(saved.clone()),
            (current, true) => current.clone(),
        };
        Ok(saved)
    }

    pub async fn archive(&self, id: &EmployeeId) -> Result<Employee, ApiError> {
        let result = self.controller.archive(id).await;
        self.sync_total().await;
        result
    }

    pub async fn restore(&self, id: &EmployeeId) -> Result<Employee, ApiError> {
        let result = self.controller.restore(id).await;
        self.sync_total().await;
        result
    }

    pub async fn delete(&self, id: &EmployeeId) -> Result<(), ApiError> {
        let result = self.controller.delete(id).await;
        self.sync_total().await;
        result
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.lock().await;
        let banner = self.controller.error().await.map(|error| Notice::from(&error));
        let body = if self.controller.is_loading() {
            DashboardBody::Loading
        } else {
            self.controller
                .with_employees(|employees| {
                    build_body(employees, &state.filters, &state.preferences)
                })
                .await
        };

        DashboardView {
            banner,
            body,
            filters: state.filters.clone(),
            drawer: state.drawer.clone(),
        }
    }
}

fn build_body(
    employees: &[Employee],
    filters: &FilterCriteria,
    preferences: &DashboardPreferences,
) -> DashboardBody {
    if employees.is_empty() && !filters.show_archived {
        return DashboardBody::NoData;
    }

    let pagination = preferences.pagination;
    let result = run_query(
        employees,
        filters,
        &preferences.sort,
        pagination.current,
        pagination.page_size,
    );
    if !employees.is_empty() && result.total == 0 {
        return DashboardBody::NoResults;
    }

    let page = PageModel::new(
        result.rows,
        PaginationState {
            total: result.total,
            ..pagination
        },
        filters.show_archived,
    );
    DashboardBody::Ready(match preferences.view_mode {
        ViewMode::Table => Presentation::Table {
            page,
            sort: preferences.sort,
        },
        ViewMode::Card => Presentation::Cards { page },
    })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
