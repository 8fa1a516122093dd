//! 成绩 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use records::Grade;
use records::dto::{DeletionReceipt, GradeChanges, NewGrade};
use validator::Validate;

use super::{IdPath, JsonBody, PageQuery};
use crate::{error::Result, state::AppState};

/// GET /api/v1/grades?skip=0&limit=100
pub async fn list_grades(
    State(state): State<AppState>,
    query: PageQuery,
) -> Result<Json<Vec<Grade>>> {
    let Query(params) = query?;
    params.validate()?;

    let grades = state
        .grades
        .list(params.offset(), params.limit_or(state.default_page_size()))
        .await?;
    Ok(Json(grades))
}

/// GET /api/v1/grades/{id}
pub async fn get_grade(State(state): State<AppState>, id: IdPath) -> Result<Json<Grade>> {
    let Path(id) = id?;
    Ok(Json(state.grades.get(id).await?))
}

/// 学生的全部成绩，学生不存在时返回 404
///
/// GET /api/v1/grades/student/{id}
pub async fn list_student_grades(
    State(state): State<AppState>,
    id: IdPath,
) -> Result<Json<Vec<Grade>>> {
    let Path(student_id) = id?;
    Ok(Json(state.grades.list_by_student(student_id).await?))
}

/// 课程的全部成绩，课程不存在时返回 404
///
/// GET /api/v1/grades/course/{id}
pub async fn list_course_grades(
    State(state): State<AppState>,
    id: IdPath,
) -> Result<Json<Vec<Grade>>> {
    let Path(course_id) = id?;
    Ok(Json(state.grades.list_by_course(course_id).await?))
}

/// 录入成绩
///
/// POST /api/v1/grades
pub async fn create_grade(
    State(state): State<AppState>,
    body: JsonBody<NewGrade>,
) -> Result<(StatusCode, Json<Grade>)> {
    let Json(req) = body?;
    req.validate()?;

    let grade = state.grades.create(req).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

/// PUT /api/v1/grades/{id}
pub async fn update_grade(
    State(state): State<AppState>,
    id: IdPath,
    body: JsonBody<GradeChanges>,
) -> Result<Json<Grade>> {
    let Path(id) = id?;
    let Json(req) = body?;
    req.validate()?;

    Ok(Json(state.grades.update(id, req).await?))
}

/// DELETE /api/v1/grades/{id}
pub async fn delete_grade(
    State(state): State<AppState>,
    id: IdPath,
) -> Result<Json<DeletionReceipt>> {
    let Path(id) = id?;
    Ok(Json(state.grades.delete(id).await?))
}
