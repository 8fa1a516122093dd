//! 课程 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use records::Course;
use records::dto::{CourseChanges, DeletionReceipt, NewCourse};
use validator::Validate;

use super::{IdPath, JsonBody, PageQuery};
use crate::{error::Result, state::AppState};

/// GET /api/v1/courses?skip=0&limit=100
pub async fn list_courses(
    State(state): State<AppState>,
    query: PageQuery,
) -> Result<Json<Vec<Course>>> {
    let Query(params) = query?;
    params.validate()?;

    let courses = state
        .courses
        .list(params.offset(), params.limit_or(state.default_page_size()))
        .await?;
    Ok(Json(courses))
}

/// GET /api/v1/courses/{id}
pub async fn get_course(State(state): State<AppState>, id: IdPath) -> Result<Json<Course>> {
    let Path(id) = id?;
    Ok(Json(state.courses.get(id).await?))
}

/// POST /api/v1/courses
pub async fn create_course(
    State(state): State<AppState>,
    body: JsonBody<NewCourse>,
) -> Result<(StatusCode, Json<Course>)> {
    let Json(req) = body?;
    req.validate()?;

    let course = state.courses.create(req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// 修改课程名称或学时，课程编码不可修改
///
/// PUT /api/v1/courses/{id}
pub async fn update_course(
    State(state): State<AppState>,
    id: IdPath,
    body: JsonBody<CourseChanges>,
) -> Result<Json<Course>> {
    let Path(id) = id?;
    let Json(req) = body?;
    req.validate()?;

    Ok(Json(state.courses.update(id, req).await?))
}

/// DELETE /api/v1/courses/{id}
pub async fn delete_course(
    State(state): State<AppState>,
    id: IdPath,
) -> Result<Json<DeletionReceipt>> {
    let Path(id) = id?;
    Ok(Json(state.courses.delete(id).await?))
}
