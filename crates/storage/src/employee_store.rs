use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    domain::{Employee, EmployeeFormData, EmployeeId},
    error::ErrorCode,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{seed::seed_employees, Storage};

/// Key holding the whole serialized employee collection.
pub const EMPLOYEES_KEY: &str = "employees_data";
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(800);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Employee not found: {0}")]
    NotFound(EmployeeId),
    #[error("stored employee collection is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::NotFound(_) => ErrorCode::NotFound,
            StoreError::Corrupt(_) => ErrorCode::Internal,
            StoreError::Backend(_) => ErrorCode::Transport,
        }
    }
}

/// Asynchronous record store consumed by the employee controller.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Employee>, StoreError>;
    async fn create(&self, data: EmployeeFormData) -> Result<Employee, StoreError>;
    async fn update(
        &self,
        id: &EmployeeId,
        data: EmployeeFormData,
    ) -> Result<Employee, StoreError>;
    async fn archive(&self, id: &EmployeeId) -> Result<Employee, StoreError>;
    async fn restore(&self, id: &EmployeeId) -> Result<Employee, StoreError>;
    /// Removes the record permanently. A missing id is not an error.
    async fn delete(&self, id: &EmployeeId) -> Result<(), StoreError>;
}

struct IdClock {
    last_issued: i64,
}

impl IdClock {
    /// Millisecond timestamp ids, bumped past anything already issued or stored.
    fn next_id(&mut self, now: DateTime<Utc>, existing: &[Employee]) -> EmployeeId {
        let taken: HashSet<&str> = existing.iter().map(|e| e.id.as_str()).collect();
        let mut candidate = now.timestamp_millis().max(self.last_issued + 1);
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        self.last_issued = candidate;
        EmployeeId(candidate.to_string())
    }
}

/// Record store over [`Storage`] with a fixed simulated network delay.
pub struct LocalEmployeeStore {
    storage: Storage,
    latency: Duration,
    // Held across every read-modify-write of the collection.
    write_lock: Mutex<IdClock>,
}

impl LocalEmployeeStore {
    pub fn new(storage: Storage) -> Self {
        Self::with_latency(storage, DEFAULT_LATENCY)
    }

    pub fn with_latency(storage: Storage, latency: Duration) -> Self {
        Self {
            storage,
            latency,
            write_lock: Mutex::new(IdClock { last_issued: 0 }),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    async fn simulate_network(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    async fn load_collection(&self) -> Result<Vec<Employee>, StoreError> {
        match self.storage.get_item(EMPLOYEES_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => {
                let seeded = seed_employees()?;
                self.persist(&seeded).await?;
                info!(count = seeded.len(), "seeded employee collection");
                Ok(seeded)
            }
        }
    }

    async fn persist(&self, employees: &[Employee]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(employees)?;
        self.storage.set_item(EMPLOYEES_KEY, &raw).await?;
        Ok(())
    }

    async fn modify<F>(&self, id: &EmployeeId, apply: F) -> Result<Employee, StoreError>
    where
        F: FnOnce(&mut Employee, DateTime<Utc>) + Send,
    {
        self.simulate_network().await;
        let _guard = self.write_lock.lock().await;

        let mut employees = self.load_collection().await?;
        let employee = employees
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        apply(employee, Utc::now());
        let updated = employee.clone();

        self.persist(&employees).await?;
        Ok(updated)
    }
}

#[async_trait]
impl EmployeeStore for LocalEmployeeStore {
    async fn fetch_all(&self) -> Result<Vec<Employee>, StoreError> {
        self.simulate_network().await;
        let _guard = self.write_lock.lock().await;
        let employees = self.load_collection().await?;
        debug!(count = employees.len(), "fetched employees");
        Ok(employees)
    }

    async fn create(&self, data: EmployeeFormData) -> Result<Employee, StoreError> {
        self.simulate_network().await;
        let mut ids = self.write_lock.lock().await;

        let mut employees = self.load_collection().await?;
        let now = Utc::now();
        let id = ids.next_id(now, &employees);
        let employee = Employee::from_form(id, data, now);
        employees.push(employee.clone());

        self.persist(&employees).await?;
        debug!(employee_id = %employee.id, "created employee");
        Ok(employee)
    }

    async fn update(
        &self,
        id: &EmployeeId,
        data: EmployeeFormData,
    ) -> Result<Employee, StoreError> {
        let updated = self
            .modify(id, move |employee, now| employee.apply_form(data, now))
            .await?;
        debug!(employee_id = %id, "updated employee");
        Ok(updated)
    }

    async fn archive(&self, id: &EmployeeId) -> Result<Employee, StoreError> {
        let archived = self
            .modify(id, |employee, now| employee.set_archived(true, now))
            .await?;
        debug!(employee_id = %id, "archived employee");
        Ok(archived)
    }

    async fn restore(&self, id: &EmployeeId) -> Result<Employee, StoreError> {
        let restored = self
            .modify(id, |employee, now| employee.set_archived(false, now))
            .await?;
        debug!(employee_id = %id, "restored employee");
        Ok(restored)
    }

    async fn delete(&self, id: &EmployeeId) -> Result<(), StoreError> {
        self.simulate_network().await;
        let _guard = self.write_lock.lock().await;

        let mut employees = self.load_collection().await?;
        let before = employees.len();
        employees.retain(|e| &e.id != id);
        if employees.len() == before {
            debug!(employee_id = %id, "delete ignored for unknown employee");
            return Ok(());
        }

        self.persist(&employees).await?;
        debug!(employee_id = %id, "deleted employee");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/employee_store_tests.rs"]
mod tests;
