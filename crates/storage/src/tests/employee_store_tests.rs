use super::*;
use chrono::NaiveDate;
use shared::domain::{Department, EmployeeStatus, PerformanceScore};

async fn store() -> (Storage, LocalEmployeeStore) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let store = LocalEmployeeStore::with_latency(storage.clone(), Duration::ZERO);
    (storage, store)
}

fn form(name: &str) -> EmployeeFormData {
    EmployeeFormData {
        name: name.to_string(),
        department: Department::Sales,
        role: "Account Executive".to_string(),
        joining_date: NaiveDate::from_ymd_opt(2024, 2, 1).expect("date"),
        status: EmployeeStatus::Active,
        performance_score: PerformanceScore::new(70).expect("score"),
    }
}

#[tokio::test]
async fn first_fetch_seeds_and_persists_example_dataset() {
    let (storage, store) = store().await;
    assert_eq!(storage.get_item(EMPLOYEES_KEY).await.expect("get"), None);

    let employees = store.fetch_all().await.expect("fetch");
    assert_eq!(employees.len(), 8);
    assert_eq!(employees[0].name, "Alice Johnson");
    assert_eq!(employees.iter().filter(|e| e.is_archived).count(), 1);

    assert!(storage
        .get_item(EMPLOYEES_KEY)
        .await
        .expect("get")
        .is_some());
    assert_eq!(store.fetch_all().await.expect("refetch"), employees);
}

#[tokio::test]
async fn stored_empty_collection_is_not_reseeded() {
    let (storage, store) = store().await;
    storage.set_item(EMPLOYEES_KEY, "[]").await.expect("set");
    assert!(store.fetch_all().await.expect("fetch").is_empty());
}

#[tokio::test]
async fn malformed_collection_surfaces_as_corrupt() {
    let (storage, store) = store().await;
    storage
        .set_item(EMPLOYEES_KEY, "{not json")
        .await
        .expect("set");

    let err = store.fetch_all().await.expect_err("corrupt");
    assert!(matches!(err, StoreError::Corrupt(_)));
    assert_eq!(err.code(), ErrorCode::Internal);
}

#[tokio::test]
async fn sequential_creates_never_collide() {
    let (_, store) = store().await;
    let mut ids = HashSet::new();
    for n in 0..5 {
        let created = store.create(form(&format!("Temp {n}"))).await.expect("create");
        assert!(!created.is_archived);
        assert_eq!(created.created_at, created.updated_at);
        assert!(ids.insert(created.id.clone()), "duplicate id {}", created.id);
    }

    let employees = store.fetch_all().await.expect("fetch");
    assert_eq!(employees.len(), 13);
    assert_eq!(employees.last().map(|e| e.name.as_str()), Some("Temp 4"));
}

#[tokio::test]
async fn update_of_created_record_round_trips_form_fields() {
    let (_, store) = store().await;
    let created = store.create(form("Ivy Park")).await.expect("create");

    let mut changed = form("Ivy Park-Lee");
    changed.department = Department::Legal;
    changed.status = EmployeeStatus::OnLeave;
    let updated = store.update(&created.id, changed.clone()).await.expect("update");

    assert_eq!(updated.form_data(), changed);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn operations_on_missing_id_report_not_found() {
    let (_, store) = store().await;
    let missing = EmployeeId::from("does-not-exist");

    let err = store
        .update(&missing, form("Nobody"))
        .await
        .expect_err("update");
    assert!(matches!(&err, StoreError::NotFound(id) if id == &missing));
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.to_string(), "Employee not found: does-not-exist");

    assert!(matches!(
        store.archive(&missing).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.restore(&missing).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn archive_then_restore_only_moves_updated_at() {
    let (_, store) = store().await;
    let original = store
        .fetch_all()
        .await
        .expect("fetch")
        .into_iter()
        .find(|e| e.id.as_str() == "1")
        .expect("alice");

    let archived = store.archive(&original.id).await.expect("archive");
    assert!(archived.is_archived);
    let restored = store.restore(&original.id).await.expect("restore");
    assert!(!restored.is_archived);
    assert!(restored.updated_at >= archived.updated_at);
    assert!(archived.updated_at >= original.updated_at);

    let mut expected = original.clone();
    expected.updated_at = restored.updated_at;
    assert_eq!(restored, expected);
}

#[tokio::test]
async fn delete_is_terminal_and_ignores_unknown_ids() {
    let (_, store) = store().await;
    let id = EmployeeId::from("3");

    store.delete(&id).await.expect("delete");
    let employees = store.fetch_all().await.expect("fetch");
    assert_eq!(employees.len(), 7);
    assert!(employees.iter().all(|e| e.id != id));

    store.delete(&id).await.expect("delete again is a no-op");
    assert_eq!(store.fetch_all().await.expect("fetch").len(), 7);
    assert!(matches!(store.archive(&id).await, Err(StoreError::NotFound(_))));
}

#[test]
fn id_clock_skips_past_issued_and_stored_ids() {
    let now = Utc::now();
    let millis = now.timestamp_millis();
    let mut clock = IdClock { last_issued: 0 };

    let mut occupant = seed_employees().expect("seed").remove(0);
    occupant.id = EmployeeId((millis + 1).to_string());
    let existing = vec![occupant];

    let first = clock.next_id(now, &existing);
    let second = clock.next_id(now, &existing);
    assert_eq!(first.as_str(), millis.to_string());
    assert_eq!(second.as_str(), (millis + 2).to_string());
}

#[tokio::test]
async fn default_store_simulates_network_latency() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(LocalEmployeeStore::new(storage).latency(), DEFAULT_LATENCY);
}
