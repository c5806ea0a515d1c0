use roster_core::db::migrations::latest_version;
use roster_core::db::open_db_in_memory;
use roster_core::{
    NewStudent, RepoError, SqliteStudentRepository, StudentListQuery, StudentPatch,
    StudentRepository, StudentService, StudentValidationError,
};
use rusqlite::Connection;

fn draft(name: &str, roll: &str) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        roll_number: roll.to_string(),
        course: "BCA".to_string(),
        year: 2,
        ..NewStudent::default()
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let mut student = draft("Asha Verma", "R-101");
    student.email = Some("asha@example.com".to_string());
    student.attendance = 92.5;
    student.grade = 8.4;
    let id = repo.create(&student).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.name, "Asha Verma");
    assert_eq!(loaded.roll_number, "R-101");
    assert_eq!(loaded.email.as_deref(), Some("asha@example.com"));
    assert_eq!(loaded.phone, None);
    assert_eq!(loaded.attendance, 92.5);
    assert_eq!(loaded.grade, 8.4);
    assert!(loaded.updated_at >= loaded.created_at);
}

#[test]
fn fresh_roll_number_is_immediately_visible_in_list() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = repo.create(&draft("Asha Verma", "R-101")).unwrap();

    let students = repo.list(&StudentListQuery::default()).unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].id, id);
}

#[test]
fn duplicate_roll_number_fails_and_leaves_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    repo.create(&draft("A", "R1")).unwrap();

    let err = repo.create(&draft("B", "R1")).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateRollNumber(roll) if roll == "R1"));

    let students = repo.list(&StudentListQuery::default()).unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].name, "A");
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = repo.create(&draft("", "R1")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(StudentValidationError::EmptyName)
    ));
    assert!(repo.list(&StudentListQuery::default()).unwrap().is_empty());

    let id = repo.create(&draft("A", "R1")).unwrap();
    let err = repo.update(id, &StudentPatch::default()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(StudentValidationError::EmptyName)
    ));
}

#[test]
fn update_replaces_mutable_fields_and_refreshes_updated_at_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = repo.create(&draft("Asha Verma", "R-101")).unwrap();

    // Backdate both stamps so the refresh is observable.
    conn.execute("UPDATE students SET created_at = 1000, updated_at = 1000;", [])
        .unwrap();

    let patch = StudentPatch {
        name: "Asha Verma".to_string(),
        email: Some("asha@new.example.com".to_string()),
        phone: Some("555-0101".to_string()),
        course: "MCA".to_string(),
        year: 3,
        attendance: 80.0,
        grade: 9.1,
    };
    repo.update(id, &patch).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.roll_number, "R-101");
    assert_eq!(loaded.email.as_deref(), Some("asha@new.example.com"));
    assert_eq!(loaded.course, "MCA");
    assert_eq!(loaded.attendance, 80.0);
    assert_eq!(loaded.created_at, 1000);
    assert!(loaded.updated_at > 1000);
}

#[test]
fn update_missing_id_is_not_found_and_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    repo.create(&draft("A", "R1")).unwrap();

    let patch = StudentPatch {
        name: "Ghost".to_string(),
        ..StudentPatch::default()
    };
    let err = repo.update(9999, &patch).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(9999)));

    let students = repo.list(&StudentListQuery::default()).unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].name, "A");
}

#[test]
fn delete_then_get_yields_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = repo.create(&draft("A", "R1")).unwrap();
    repo.delete(id).unwrap();

    assert!(repo.get(id).unwrap().is_none());
    assert!(repo.list(&StudentListQuery::default()).unwrap().is_empty());

    let err = repo.delete(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn list_is_in_insertion_order_and_supports_filters() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let mut a = draft("Asha Verma", "R1");
    a.course = "BCA".to_string();
    let mut b = draft("Rohan Gupta", "R2");
    b.course = "MCA".to_string();
    let mut c = draft("Asha Nair", "R3");
    c.course = "BCA".to_string();
    let id_a = repo.create(&a).unwrap();
    let id_b = repo.create(&b).unwrap();
    let id_c = repo.create(&c).unwrap();

    let all = repo.list(&StudentListQuery::default()).unwrap();
    let ids: Vec<_> = all.iter().map(|student| student.id).collect();
    assert_eq!(ids, vec![id_a, id_b, id_c]);

    let bca = repo
        .list(&StudentListQuery {
            course: Some("BCA".to_string()),
            ..StudentListQuery::default()
        })
        .unwrap();
    assert_eq!(bca.len(), 2);

    let asha = repo
        .list(&StudentListQuery {
            name_contains: Some("asha".to_string()),
            ..StudentListQuery::default()
        })
        .unwrap();
    assert_eq!(asha.len(), 2);

    let narrow = repo
        .list(&StudentListQuery {
            course: Some("BCA".to_string()),
            name_contains: Some("nair".to_string()),
        })
        .unwrap();
    assert_eq!(narrow.len(), 1);
    assert_eq!(narrow[0].id, id_c);
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let service = StudentService::new(repo);

    let id = service.add_student(&draft("Asha Verma", "R-101")).unwrap();

    let fetched = service.get_student(id).unwrap().unwrap();
    assert_eq!(fetched.name, "Asha Verma");

    assert_eq!(
        service
            .list_students(&StudentListQuery::default())
            .unwrap()
            .len(),
        1
    );

    service.delete_student(id).unwrap();
    assert!(service.get_student(id).unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_students_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("students"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            roll_number TEXT NOT NULL UNIQUE
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "students",
            column: "email"
        })
    ));
}

#[test]
fn student_record_serializes_with_stable_field_names() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = repo.create(&draft("Asha Verma", "R-101")).unwrap();
    let loaded = repo.get(id).unwrap().unwrap();

    let json = serde_json::to_value(&loaded).unwrap();
    assert_eq!(json["roll_number"], "R-101");
    assert_eq!(json["email"], serde_json::Value::Null);
    assert_eq!(json["year"], 2);
}
