use std::{
    collections::HashMap,
    future::Future,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

use shared::{
    domain::{Employee, EmployeeFormData, EmployeeId},
    error::ApiError,
};
use storage::{EmployeeStore, StoreError};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod dashboard;
pub mod debounce;
pub mod notice;
pub mod presentation;

pub use dashboard::{
    Dashboard, DashboardBody, DashboardView, DrawerState, PageError, SubmitError,
};
pub use debounce::Debounced;
pub use notice::{Notice, NoticeCategory};
pub use presentation::{PageModel, Presentation, PresentationRow, RowAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Create,
    Update,
    Archive,
    Restore,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Archive => "archive",
            Operation::Restore => "restore",
            Operation::Delete => "delete",
        }
    }

    fn failure_message(&self, err: &StoreError) -> String {
        match self {
            Operation::Load => format!("Failed to load employees: {err}"),
            other => format!("Failed to {} employee: {err}", other.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    Loaded { count: usize },
    Created(Employee),
    Updated(Employee),
    Archived(Employee),
    Restored(Employee),
    Deleted(EmployeeId),
    Failed { operation: Operation, error: ApiError },
}

#[derive(Default)]
struct ControllerState {
    employees: Vec<Employee>,
    error: Option<ApiError>,
    latest_load: u64,
    latest_by_id: HashMap<EmployeeId, u64>,
}

/// Decrements the shared in-flight counter when the request finishes,
/// whichever way it finishes.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Holds the canonical in-memory employee collection and mirrors every
/// successful store mutation into it without a refetch.
///
/// Each request is tagged with a sequence number. Loads are tracked globally
/// and mutations per employee id; a response that is no longer the latest for
/// its key is returned to the caller but never merged into the collection.
pub struct EmployeeController {
    store: Arc<dyn EmployeeStore>,
    inner: Mutex<ControllerState>,
    in_flight: AtomicUsize,
    next_request: AtomicU64,
    events: broadcast::Sender<ControllerEvent>,
}

impl EmployeeController {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            store,
            inner: Mutex::new(ControllerState::default()),
            in_flight: AtomicUsize::new(0),
            next_request: AtomicU64::new(1),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn employees(&self) -> Vec<Employee> {
        self.inner.lock().await.employees.clone()
    }

    /// Runs `f` against the collection without cloning it.
    pub async fn with_employees<R>(&self, f: impl FnOnce(&[Employee]) -> R) -> R {
        let state = self.inner.lock().await;
        f(&state.employees)
    }

    pub async fn find(&self, id: &EmployeeId) -> Option<Employee> {
        self.inner
            .lock()
            .await
            .employees
            .iter()
            .find(|e| &e.id == id)
            .cloned()
    }

    pub async fn error(&self) -> Option<ApiError> {
        self.inner.lock().await.error.clone()
    }

    pub async fn dismiss_error(&self) {
        self.inner.lock().await.error = None;
    }

    fn issue_request(&self) -> u64 {
        self.next_request.fetch_add(1, Ordering::SeqCst)
    }

    /// Full refetch; replaces the local collection.
    pub async fn load(&self) -> Result<usize, ApiError> {
        let _busy = InFlight::enter(&self.in_flight);
        let seq = self.issue_request();
        {
            let mut state = self.inner.lock().await;
            state.latest_load = seq;
            state.error = None;
        }

        let result = self.store.fetch_all().await;

        let mut state = self.inner.lock().await;
        let current = state.latest_load == seq;
        match result {
            Ok(employees) => {
                let count = employees.len();
                if current {
                    state.employees = employees;
                    info!(count, "loaded employees");
                    let _ = self.events.send(ControllerEvent::Loaded { count });
                } else {
                    debug!(seq, "discarding superseded load response");
                }
                Ok(count)
            }
            Err(err) => Err(self.record_failure(&mut state, Operation::Load, &err, current)),
        }
    }

    pub async fn create(&self, data: EmployeeFormData) -> Result<Employee, ApiError> {
        let created = self
            .mutate(Operation::Create, None, self.store.create(data), |employees, created| {
                employees.push(created.clone());
            })
            .await?;
        let _ = self.events.send(ControllerEvent::Created(created.clone()));
        Ok(created)
    }

    pub async fn update(
        &self,
        id: &EmployeeId,
        data: EmployeeFormData,
    ) -> Result<Employee, ApiError> {
        let updated = self
            .mutate(
                Operation::Update,
                Some(id),
                self.store.update(id, data),
                replace_record,
            )
            .await?;
        let _ = self.events.send(ControllerEvent::Updated(updated.clone()));
        Ok(updated)
    }

    pub async fn archive(&self, id: &EmployeeId) -> Result<Employee, ApiError> {
        let archived = self
            .mutate(
                Operation::Archive,
                Some(id),
                self.store.archive(id),
                replace_record,
            )
            .await?;
        let _ = self.events.send(ControllerEvent::Archived(archived.clone()));
        Ok(archived)
    }

    pub async fn restore(&self, id: &EmployeeId) -> Result<Employee, ApiError> {
        let restored = self
            .mutate(
                Operation::Restore,
                Some(id),
                self.store.restore(id),
                replace_record,
            )
            .await?;
        let _ = self.events.send(ControllerEvent::Restored(restored.clone()));
        Ok(restored)
    }

    pub async fn delete(&self, id: &EmployeeId) -> Result<(), ApiError> {
        self.mutate(Operation::Delete, Some(id), self.store.delete(id), |employees, _| {
            employees.retain(|e| &e.id != id);
        })
        .await?;
        let _ = self.events.send(ControllerEvent::Deleted(id.clone()));
        Ok(())
    }

    async fn mutate<T, Fut, F>(
        &self,
        operation: Operation,
        target: Option<&EmployeeId>,
        call: Fut,
        apply: F,
    ) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, StoreError>>,
        F: FnOnce(&mut Vec<Employee>, &T),
    {
        let _busy = InFlight::enter(&self.in_flight);
        let seq = self.issue_request();
        if let Some(id) = target {
            self.inner
                .lock()
                .await
                .latest_by_id
                .insert(id.clone(), seq);
        }

        let result = call.await;

        let mut state = self.inner.lock().await;
        let current = match target {
            Some(id) => state.latest_by_id.get(id) == Some(&seq),
            None => true,
        };
        if current {
            if let Some(id) = target {
                state.latest_by_id.remove(id);
            }
        }

        match result {
            Ok(value) => {
                if current {
                    apply(&mut state.employees, &value);
                } else {
                    debug!(
                        operation = operation.as_str(),
                        employee_id = ?target,
                        seq,
                        "discarding superseded response"
                    );
                }
                Ok(value)
            }
            Err(err) => Err(self.record_failure(&mut state, operation, &err, current)),
        }
    }

    fn record_failure(
        &self,
        state: &mut ControllerState,
        operation: Operation,
        err: &StoreError,
        current: bool,
    ) -> ApiError {
        let error = ApiError::new(err.code(), operation.failure_message(err));
        warn!(
            operation = operation.as_str(),
            code = ?error.code,
            message = %error.message,
            "employee operation failed"
        );
        if current {
            state.error = Some(error.clone());
        }
        let _ = self.events.send(ControllerEvent::Failed {
            operation,
            error: error.clone(),
        });
        error
    }
}

fn replace_record(employees: &mut Vec<Employee>, updated: &Employee) {
    if let Some(slot) = employees.iter_mut().find(|e| e.id == updated.id) {
        *slot = updated.clone();
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
