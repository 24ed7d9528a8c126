use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use shared::criteria::{DashboardPreferences, PaginationState};
use tracing::warn;

use crate::Storage;

pub const VIEW_MODE_KEY: &str = "employee_view_mode";
pub const SORT_KEY: &str = "employee_sort_state";
pub const PAGINATION_KEY: &str = "employee_pagination";

/// Load/save contract for persisted dashboard preferences.
///
/// `load` never fails: absent or malformed parts fall back to
/// [`DashboardPreferences::default`] individually.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn load(&self) -> DashboardPreferences;
    async fn save(&self, preferences: &DashboardPreferences) -> anyhow::Result<()>;
    async fn reset(&self) -> anyhow::Result<()>;
}

/// Preferences kept in [`Storage`], one key per part.
#[derive(Clone)]
pub struct StoredSettings {
    storage: Storage,
}

impl StoredSettings {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    async fn read_part<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get_item(key).await {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(key, %error, "failed to read preference; using default");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key, %error, "ignoring malformed preference");
                None
            }
        }
    }

    async fn write_part<T: Serialize + Sync>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value)?;
        self.storage.set_item(key, &raw).await
    }
}

#[async_trait]
impl SettingsRepository for StoredSettings {
    async fn load(&self) -> DashboardPreferences {
        let view_mode = self.read_part(VIEW_MODE_KEY).await.unwrap_or_default();
        let sort = self.read_part(SORT_KEY).await.unwrap_or_default();
        let pagination = self
            .read_part::<PaginationState>(PAGINATION_KEY)
            .await
            .filter(|pagination| {
                let valid = pagination.is_valid();
                if !valid {
                    warn!(?pagination, "ignoring out-of-range pagination preference");
                }
                valid
            })
            .unwrap_or_default();

        DashboardPreferences {
            view_mode,
            sort,
            pagination,
        }
    }

    async fn save(&self, preferences: &DashboardPreferences) -> anyhow::Result<()> {
        self.write_part(VIEW_MODE_KEY, &preferences.view_mode).await?;
        self.write_part(SORT_KEY, &preferences.sort).await?;
        self.write_part(PAGINATION_KEY, &preferences.pagination).await?;
        Ok(())
    }

    async fn reset(&self) -> anyhow::Result<()> {
        for key in [VIEW_MODE_KEY, SORT_KEY, PAGINATION_KEY] {
            self.storage.remove_item(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
