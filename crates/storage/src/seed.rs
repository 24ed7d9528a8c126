//! Example dataset written on first use of an empty store.

use shared::domain::Employee;

const SEED_JSON: &str = include_str!("seed_employees.json");

pub fn seed_employees() -> Result<Vec<Employee>, serde_json::Error> {
    serde_json::from_str(SEED_JSON)
}
