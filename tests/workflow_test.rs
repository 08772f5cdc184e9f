use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde_json::json;
use thesis_workflow::error::{AppError, Outcome};
use thesis_workflow::models::{
    Course, CourseRequestStatus, DefenseDetails, Grade, Professor, ThesisStatus,
};
use thesis_workflow::registry::{Table, load_table, save_table};
use thesis_workflow::repository::{
    Collection, JsonFileGateway, MemoryGateway, PersistenceGateway,
};
use thesis_workflow::services::{DefenseSchedule, ManualClock, SearchField, ThesisService};

fn professor(id: &str, supervision: u32, examiner: u32) -> Professor {
    Professor {
        user_id: id.to_string(),
        name: format!("Prof {}", id),
        password_hash: String::new(),
        supervision_capacity: supervision,
        examiner_capacity: examiner,
    }
}

fn course(id: &str, professor_id: &str, capacity: u32) -> Course {
    Course {
        course_id: id.to_string(),
        title: format!("Thesis course {}", id),
        professor_id: professor_id.to_string(),
        capacity,
        year: Some(2025),
        semester: Some("Fall".to_string()),
        unit: Some(6),
    }
}

fn details(title: &str, keywords: &str) -> DefenseDetails {
    DefenseDetails {
        title: title.to_string(),
        abstract_text: "Abstract".to_string(),
        keywords: keywords.to_string(),
        pdf_path: "/tmp/thesis.pdf".to_string(),
        image_path: "/tmp/cover.png".to_string(),
    }
}

fn schedule(internal: &str, external: &str) -> DefenseSchedule {
    DefenseSchedule {
        defense_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        internal_examiner_id: internal.to_string(),
        external_examiner_id: external.to_string(),
    }
}

async fn seed(gateway: &dyn PersistenceGateway) {
    let professors = Table::from_rows(vec![
        professor("sup", 2, 1),
        professor("int", 1, 1),
        professor("ext", 1, 1),
    ]);
    let courses = Table::from_rows(vec![course("c1", "sup", 1), course("c2", "sup", 3)]);
    save_table(gateway, Collection::Professors, &professors)
        .await
        .expect("seed professors");
    save_table(gateway, Collection::Courses, &courses)
        .await
        .expect("seed courses");
}

async fn setup() -> (Arc<MemoryGateway>, Arc<ManualClock>, ThesisService) {
    let gateway = Arc::new(MemoryGateway::new());
    seed(gateway.as_ref()).await;
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
    ));
    let service = ThesisService::with_clock(gateway.clone(), clock.clone());
    (gateway, clock, service)
}

async fn capacities(service: &ThesisService, id: &str) -> (u32, u32) {
    let p = service.professor(id).await.expect("professor");
    (p.supervision_capacity, p.examiner_capacity)
}

#[tokio::test]
async fn test_full_thesis_lifecycle() {
    let (_gateway, clock, service) = setup().await;

    let request = service.submit_course_request("alice", "c2").await.expect("submit");
    assert_eq!(
        service.pending_supervision_requests("sup").await.unwrap().len(),
        1
    );
    let approved = service
        .decide_course_request("sup", &request.request_id, "approve")
        .await
        .expect("approve");
    assert_eq!(approved.status, CourseRequestStatus::Approved);
    assert_eq!(capacities(&service, "sup").await, (1, 1));

    clock.advance(Duration::days(90));
    let defense = service
        .submit_defense_request("alice", details("Ownership Types", "rust, types"))
        .await
        .expect("defense request");
    assert_eq!(
        service.pending_defense_requests("sup").await.unwrap().len(),
        1
    );

    let thesis = service
        .schedule_defense("sup", &defense.request_id, schedule("int", "ext"))
        .await
        .expect("schedule");
    assert!(thesis.scores.is_empty());
    assert_eq!(capacities(&service, "int").await, (1, 0));
    assert_eq!(capacities(&service, "ext").await, (1, 0));
    assert!(service.pending_defense_requests("sup").await.unwrap().is_empty());
    assert_eq!(service.assigned_for_grading("int").await.unwrap().len(), 1);

    let partial = service.submit_grade(&thesis.thesis_id, "int", 88).await.unwrap();
    assert!(partial.grade.is_none());
    assert!(service.search("alice", SearchField::Author).await.unwrap().is_empty());

    let graded = service.submit_grade(&thesis.thesis_id, "ext", 71).await.unwrap();
    // (88 + 71) / 2 = 79.5
    assert_eq!(graded.grade, Some(Grade::C));
    assert_eq!(graded.status, ThesisStatus::Defended);
    assert_eq!(capacities(&service, "sup").await, (2, 1));
    assert_eq!(capacities(&service, "int").await, (1, 1));
    assert_eq!(capacities(&service, "ext").await, (1, 1));
    assert!(service.assigned_for_grading("int").await.unwrap().is_empty());

    let found = service.search("ALI", SearchField::Author).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Ownership Types");
    assert!(service.search("bob", SearchField::Author).await.unwrap().is_empty());
    assert_eq!(service.search("TYPES", SearchField::Keywords).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_course_capacity_scenario() {
    let (_gateway, _clock, service) = setup().await;

    let request = service.submit_course_request("alice", "c1").await.unwrap();
    service
        .decide_course_request("sup", &request.request_id, "APPROVE")
        .await
        .unwrap();

    let courses = service.available_courses().await.unwrap();
    assert!(courses.iter().all(|c| c.course_id != "c1"));

    let result = service.submit_course_request("bob", "c1").await;
    assert_eq!(result, Err(AppError::CourseUnavailable));
    assert_eq!(
        Outcome::from(&result.unwrap_err()).message,
        "Course not found or its capacity is full."
    );
}

#[tokio::test]
async fn test_waiting_period_scenario() {
    let (_gateway, clock, service) = setup().await;
    let request = service.submit_course_request("alice", "c2").await.unwrap();
    service
        .decide_course_request("sup", &request.request_id, "approve")
        .await
        .unwrap();

    clock.advance(Duration::days(89));
    assert_eq!(
        service
            .submit_defense_request("alice", details("T", "k"))
            .await,
        Err(AppError::WaitingPeriodNotElapsed)
    );

    clock.advance(Duration::days(1));
    assert!(service
        .submit_defense_request("alice", details("T", "k"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_failed_operation_persists_nothing() {
    let (gateway, _clock, service) = setup().await;
    let before = gateway.load_all(Collection::Professors).await.unwrap();

    let request = service.submit_course_request("alice", "c2").await.unwrap();
    assert_eq!(
        service
            .decide_course_request("sup", &request.request_id, "postpone")
            .await,
        Err(AppError::InvalidAction)
    );
    assert_eq!(
        service.submit_course_request("alice", "c1").await,
        Err(AppError::DuplicateActiveRequest)
    );

    assert_eq!(gateway.load_all(Collection::Professors).await.unwrap(), before);
    assert_eq!(gateway.load_all(Collection::Requests).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_capacities_never_negative_under_pressure() {
    let (_gateway, clock, service) = setup().await;

    for student in ["s1", "s2", "s3"] {
        let request = service.submit_course_request(student, "c2").await.unwrap();
        let _ = service
            .decide_course_request("sup", &request.request_id, "approve")
            .await;
    }
    assert_eq!(capacities(&service, "sup").await, (0, 1));
    let pending = service.pending_supervision_requests("sup").await.unwrap();
    assert_eq!(pending.len(), 1);

    clock.advance(Duration::days(100));
    let first = service
        .submit_defense_request("s1", details("A", "k"))
        .await
        .unwrap();
    let second = service
        .submit_defense_request("s2", details("B", "k"))
        .await
        .unwrap();
    service
        .schedule_defense("sup", &first.request_id, schedule("int", "ext"))
        .await
        .unwrap();
    assert_eq!(
        service
            .schedule_defense("sup", &second.request_id, schedule("int", "ext"))
            .await,
        Err(AppError::ExaminerUnavailable("Internal"))
    );

    for id in ["sup", "int", "ext"] {
        let (supervision, examiner) = capacities(&service, id).await;
        assert!(supervision <= 2 && examiner <= 1);
    }
}

#[tokio::test]
async fn test_same_examiner_in_both_slots() {
    let (_gateway, clock, service) = setup().await;
    let request = service.submit_course_request("alice", "c2").await.unwrap();
    service
        .decide_course_request("sup", &request.request_id, "approve")
        .await
        .unwrap();
    clock.advance(Duration::days(90));
    let defense = service
        .submit_defense_request("alice", details("T", "k"))
        .await
        .unwrap();

    // examiner capacity 1 cannot cover both slots
    assert_eq!(
        service
            .schedule_defense("sup", &defense.request_id, schedule("int", "int"))
            .await,
        Err(AppError::ExaminerUnavailable("External"))
    );
    assert_eq!(capacities(&service, "int").await, (1, 1));
}

#[tokio::test]
async fn test_corrupt_collection_is_read_as_empty() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .save_all(
            Collection::Courses,
            vec![json!({"course_id": "c1", "title": "No capacity field"})],
        )
        .await
        .unwrap();
    let service = ThesisService::new(gateway.clone());

    assert!(service.available_courses().await.unwrap().is_empty());
    assert_eq!(
        service.submit_course_request("alice", "c1").await,
        Err(AppError::CourseUnavailable)
    );
}

#[tokio::test]
async fn test_json_files_survive_restart() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let gateway = Arc::new(JsonFileGateway::new(dir.path()));
    seed(gateway.as_ref()).await;

    let service = ThesisService::new(gateway.clone());
    let request = service.submit_course_request("alice", "c1").await.unwrap();
    service
        .decide_course_request("sup", &request.request_id, "approve")
        .await
        .unwrap();
    drop(service);

    let reopened = JsonFileGateway::new(dir.path());
    let courses = load_table::<Course>(&reopened, Collection::Courses).await.unwrap();
    assert_eq!(courses.get("c1").unwrap().capacity, 0);

    let raw = std::fs::read_to_string(dir.path().join("requests.json")).unwrap();
    assert!(raw.contains("\"type\": \"course_request\""));
    assert!(raw.contains("\"status\": \"Approved\""));

    let service = ThesisService::new(Arc::new(reopened));
    let requests = service.student_course_requests("alice").await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].approval_date.is_some());
}

#[tokio::test]
async fn test_reads_requests_written_without_offsets() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let gateway = Arc::new(JsonFileGateway::new(dir.path()));
    seed(gateway.as_ref()).await;
    let stored = json!([
        {
            "request_id": "legacy-1",
            "type": "course_request",
            "student_id": "bob",
            "course_id": "c2",
            "professor_id": "sup",
            "request_date": "2025-01-10T09:00:00.123456",
            "status": "Pending Professor Approval"
        },
        {
            "request_id": "legacy-2",
            "type": "course_request",
            "student_id": "carol",
            "course_id": "c2",
            "professor_id": "sup",
            "request_date": "2024-09-01T10:15:00.5",
            "status": "Approved",
            "approval_date": "2024-09-02T08:00:00"
        }
    ]);
    std::fs::write(
        dir.path().join("requests.json"),
        serde_json::to_string_pretty(&stored).unwrap(),
    )
    .unwrap();

    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
    ));
    let service = ThesisService::with_clock(gateway.clone(), clock);

    assert_eq!(service.student_course_requests("bob").await.unwrap().len(), 1);
    assert_eq!(
        service.submit_course_request("bob", "c2").await,
        Err(AppError::DuplicateActiveRequest)
    );

    // carol was approved long enough ago to ask for a defense
    service
        .submit_defense_request("carol", details("Old Data", "legacy"))
        .await
        .expect("defense request");

    let requests = gateway.load_all(Collection::Requests).await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().any(|r| r["request_id"] == "legacy-1"));
}
