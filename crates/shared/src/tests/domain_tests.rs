use super::*;
use serde_json::json;

fn stored_record(score: i64) -> serde_json::Value {
    json!({
        "id": "2",
        "name": "Bob Lee",
        "department": "HR",
        "role": "Recruiter",
        "joiningDate": "2022-10-22",
        "status": "On Leave",
        "performanceScore": score,
        "isArchived": false,
        "createdAt": "2022-10-22T08:00:00Z",
        "updatedAt": "2022-10-22T08:00:00Z"
    })
}

#[test]
fn decodes_persisted_record_with_display_labels() {
    let employee: Employee = serde_json::from_value(stored_record(78)).expect("decode");
    assert_eq!(employee.id, EmployeeId::from("2"));
    assert_eq!(employee.department, Department::Hr);
    assert_eq!(employee.status, EmployeeStatus::OnLeave);
    assert_eq!(employee.performance_score.value(), 78);

    let encoded = serde_json::to_value(&employee).expect("encode");
    assert_eq!(encoded, stored_record(78));
}

#[test]
fn rejects_out_of_range_score_when_decoding() {
    let err = serde_json::from_value::<Employee>(stored_record(140)).expect_err("score");
    assert!(err.to_string().contains("outside 0..=100"));
}

#[test]
fn parses_labels_case_insensitively() {
    assert_eq!("hr".parse::<Department>(), Ok(Department::Hr));
    assert_eq!(" On Leave ".parse::<EmployeeStatus>(), Ok(EmployeeStatus::OnLeave));
    assert!("Research".parse::<Department>().is_err());
}

#[test]
fn performance_bands_follow_score_ranges() {
    let band = |raw| PerformanceScore::new(raw).expect("score").band();
    assert_eq!(band(100), PerformanceBand::Excellent);
    assert_eq!(band(90), PerformanceBand::Excellent);
    assert_eq!(band(89), PerformanceBand::Good);
    assert_eq!(band(75), PerformanceBand::Good);
    assert_eq!(band(74), PerformanceBand::Average);
    assert_eq!(band(60), PerformanceBand::Average);
    assert_eq!(band(59), PerformanceBand::Poor);
    assert_eq!(band(0), PerformanceBand::Poor);
}

#[test]
fn touch_never_moves_updated_at_backwards() {
    let mut employee: Employee = serde_json::from_value(stored_record(78)).expect("decode");
    let before = employee.updated_at;
    employee.set_archived(true, before - chrono::Duration::days(1));
    assert!(employee.is_archived);
    assert_eq!(employee.updated_at, before);

    let later = before + chrono::Duration::seconds(5);
    employee.set_archived(false, later);
    assert_eq!(employee.updated_at, later);
}
