//! 学生 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use records::Student;
use records::dto::{DeletionReceipt, NewStudent, StudentChanges};
use validator::Validate;

use super::{IdPath, JsonBody, PageQuery};
use crate::{error::Result, state::AppState};

/// 学生列表
///
/// GET /api/v1/students?skip=0&limit=100
pub async fn list_students(
    State(state): State<AppState>,
    query: PageQuery,
) -> Result<Json<Vec<Student>>> {
    let Query(params) = query?;
    params.validate()?;

    let students = state
        .students
        .list(params.offset(), params.limit_or(state.default_page_size()))
        .await?;
    Ok(Json(students))
}

/// GET /api/v1/students/{id}
pub async fn get_student(State(state): State<AppState>, id: IdPath) -> Result<Json<Student>> {
    let Path(id) = id?;
    Ok(Json(state.students.get(id).await?))
}

/// 创建学生
///
/// POST /api/v1/students
pub async fn create_student(
    State(state): State<AppState>,
    body: JsonBody<NewStudent>,
) -> Result<(StatusCode, Json<Student>)> {
    let Json(req) = body?;
    req.validate()?;

    let student = state.students.create(req).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// 修改学生，只更新请求中出现的字段
///
/// PUT /api/v1/students/{id}
pub async fn update_student(
    State(state): State<AppState>,
    id: IdPath,
    body: JsonBody<StudentChanges>,
) -> Result<Json<Student>> {
    let Path(id) = id?;
    let Json(req) = body?;
    req.validate()?;

    Ok(Json(state.students.update(id, req).await?))
}

/// 删除学生（级联删除其成绩）
///
/// DELETE /api/v1/students/{id}
pub async fn delete_student(
    State(state): State<AppState>,
    id: IdPath,
) -> Result<Json<DeletionReceipt>> {
    let Path(id) = id?;
    Ok(Json(state.students.delete(id).await?))
}
