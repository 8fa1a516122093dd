//! HTTP 端到端测试
//!
//! 使用内存存储组装完整路由，通过 oneshot 发送请求

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use records::{MemoryRecordStore, RecordStore};
use records_api::{routes, state::AppState};
use records_shared::config::ApiConfig;
use serde_json::{Value, json};
use tower::ServiceExt;

fn create_test_app() -> Router {
    app_with_prefix("/api/v1")
}

fn app_with_prefix(prefix: &str) -> Router {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let config = ApiConfig {
        prefix: prefix.to_string(),
        ..ApiConfig::default()
    };
    routes::app(AppState::new(store, config))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn student_body(registration_number: &str, email: &str) -> Value {
    json!({
        "name": "Ana Silva",
        "email": email,
        "registrationNumber": registration_number,
        "birthDate": "2000-05-17"
    })
}

fn course_body(code: &str) -> Value {
    json!({ "code": code, "name": "Algorithms", "creditHours": 60 })
}

#[tokio::test]
async fn test_full_record_lifecycle() {
    let app = create_test_app();

    let (status, student) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(student_body("2024001", "ana@x.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(student["registrationNumber"], "2024001");
    assert_eq!(student["birthDate"], "2000-05-17");
    let student_id = student["id"].as_str().unwrap().to_string();

    let (status, course) = send(&app, "POST", "/api/v1/courses", Some(course_body("CS101"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = course["id"].as_str().unwrap().to_string();

    let grade_body = json!({
        "studentId": student_id,
        "courseId": course_id,
        "value": 8.756,
        "semester": "2024.1"
    });
    let (status, grade) = send(&app, "POST", "/api/v1/grades", Some(grade_body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(grade["value"], 8.76);
    let grade_id = grade["id"].as_str().unwrap().to_string();

    let (status, error) = send(&app, "POST", "/api/v1/grades", Some(grade_body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "DUPLICATE_GRADE");
    assert_eq!(error["success"], false);

    let (status, receipt) = send(&app, "DELETE", &format!("/api/v1/students/{student_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["removedGrades"], 1);

    let (status, _) = send(&app, "GET", &format!("/api/v1/grades/{grade_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, error) = send(
        &app,
        "GET",
        &format!("/api/v1/grades/student/{student_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "STUDENT_NOT_FOUND");

    let (status, grades) = send(&app, "GET", &format!("/api/v1/grades/course/{course_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grades, json!([]));
}

#[tokio::test]
async fn test_student_conflicts_and_validation() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(student_body("2024001", "ana@x.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(student_body("2024001", "other@x.com")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "REGISTRATION_NUMBER_TAKEN");

    let (status, error) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(student_body("2024002", "not-an-email")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "VALIDATION_ERROR");

    // 缺少必填字段
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(json!({ "name": "Ana Silva" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, students) = send(&app, "GET", "/api/v1/students", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(students.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_partial_update_and_birth_date_clearing() {
    let app = create_test_app();
    let (_, student) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(student_body("2024001", "ana@x.com")),
    )
    .await;
    let uri = format!("/api/v1/students/{}", student["id"].as_str().unwrap());

    let (status, updated) = send(&app, "PUT", &uri, Some(json!({ "name": "Ana Souza" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ana Souza");
    assert_eq!(updated["email"], "ana@x.com");
    assert_eq!(updated["birthDate"], "2000-05-17");
    assert_eq!(updated["createdAt"], student["createdAt"]);
    assert_ne!(updated["updatedAt"], student["updatedAt"]);

    let (status, cleared) = send(&app, "PUT", &uri, Some(json!({ "birthDate": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["birthDate"].is_null());
    assert_eq!(cleared["name"], "Ana Souza");
}

#[tokio::test]
async fn test_course_and_grade_rules_over_http() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/courses",
        Some(json!({ "code": "CS101", "name": "Algorithms", "creditHours": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, course) = send(&app, "POST", "/api/v1/courses", Some(course_body("CS101"))).await;
    let (status, error) = send(&app, "POST", "/api/v1/courses", Some(course_body("CS101"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "COURSE_CODE_TAKEN");

    let (_, student) = send(
        &app,
        "POST",
        "/api/v1/students",
        Some(student_body("2024001", "ana@x.com")),
    )
    .await;
    let (_, grade) = send(
        &app,
        "POST",
        "/api/v1/grades",
        Some(json!({
            "studentId": student["id"],
            "courseId": course["id"],
            "value": 5.0,
            "semester": "2024.1"
        })),
    )
    .await;
    let grade_uri = format!("/api/v1/grades/{}", grade["id"].as_str().unwrap());

    let (status, _) = send(&app, "PUT", &grade_uri, Some(json!({ "value": 10.5 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, updated) = send(&app, "PUT", &grade_uri, Some(json!({ "value": 7.333 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["value"], 7.33);

    // 引用不存在的学生
    let (status, error) = send(
        &app,
        "POST",
        "/api/v1/grades",
        Some(json!({
            "studentId": uuid::Uuid::new_v4(),
            "courseId": course["id"],
            "value": 5.0,
            "semester": "2024.2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "STUDENT_NOT_FOUND");

    let course_uri = format!("/api/v1/courses/{}", course["id"].as_str().unwrap());
    let (status, receipt) = send(&app, "DELETE", &course_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["removedGrades"], 1);
    let (status, _) = send(&app, "GET", &grade_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination_and_bad_params() {
    let app = create_test_app();
    for code in ["MAT101", "FIS101", "QUI101"] {
        send(&app, "POST", "/api/v1/courses", Some(course_body(code))).await;
    }

    let (status, page) = send(&app, "GET", "/api/v1/courses?skip=1&limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["code"], "FIS101");

    let (status, _) = send(&app, "GET", "/api/v1/courses?skip=-1", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "GET", "/api/v1/courses?limit=0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "GET", "/api/v1/courses/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/courses/{}", uuid::Uuid::new_v4()),
        Some(json!({ "creditHours": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_system_endpoints() {
    let app = create_test_app();

    let (status, info) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["name"], "Student Records");
    assert_eq!(info["status"], "online");
    assert!(info["version"].is_string());

    let (status, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health, json!({ "status": "healthy" }));

    let (status, ready) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["storage"], "ok");
}

#[tokio::test]
async fn test_api_prefix_variants() {
    for (prefix, uri) in [
        ("", "/courses"),
        ("/", "/courses"),
        ("api/v2/", "/api/v2/courses"),
    ] {
        let app = app_with_prefix(prefix);
        let (status, _) = send(&app, "POST", uri, Some(course_body("CS101"))).await;
        assert_eq!(status, StatusCode::CREATED, "prefix {prefix:?}");

        let (status, courses) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(courses.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
