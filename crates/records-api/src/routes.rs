//! 路由配置模块
//!
//! 业务路由挂在可配置前缀下（默认 /api/v1），根路径与探针不带前缀

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::get,
};
use records_shared::observability::middleware as obs_middleware;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::{handlers, state::AppState};

/// 学生路由
fn student_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/students",
            get(handlers::student::list_students).post(handlers::student::create_student),
        )
        .route(
            "/students/{id}",
            get(handlers::student::get_student)
                .put(handlers::student::update_student)
                .delete(handlers::student::delete_student),
        )
}

/// 课程路由
fn course_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses",
            get(handlers::course::list_courses).post(handlers::course::create_course),
        )
        .route(
            "/courses/{id}",
            get(handlers::course::get_course)
                .put(handlers::course::update_course)
                .delete(handlers::course::delete_course),
        )
}

/// 成绩路由
fn grade_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/grades",
            get(handlers::grade::list_grades).post(handlers::grade::create_grade),
        )
        .route(
            "/grades/{id}",
            get(handlers::grade::get_grade)
                .put(handlers::grade::update_grade)
                .delete(handlers::grade::delete_grade),
        )
        .route(
            "/grades/student/{id}",
            get(handlers::grade::list_student_grades),
        )
        .route(
            "/grades/course/{id}",
            get(handlers::grade::list_course_grades),
        )
}

/// 全部业务路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(student_routes())
        .merge(course_routes())
        .merge(grade_routes())
}

/// 将业务路由挂到前缀下，前缀为空或 "/" 时直接挂在根路径
pub fn mount_api_routes(prefix: &str) -> Router<AppState> {
    let prefix = prefix.trim().trim_end_matches('/');
    if prefix.is_empty() {
        return api_routes();
    }

    let prefix = if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{prefix}")
    };
    Router::new().nest(&prefix, api_routes())
}

/// 根路径与探针
pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health_check))
        .route("/ready", get(handlers::system::readiness_check))
}

/// 根据配置构建 CORS 层
///
/// `cors_origins` 为 "*" 时允许所有来源，否则按逗号分隔解析
pub fn cors_layer(cors_origins: &str) -> CorsLayer {
    if cors_origins.trim() == "*" {
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", cors_origins);
    let origins: Vec<_> = cors_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 组装完整应用
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.api.cors_origins);

    Router::new()
        .merge(mount_api_routes(&state.api.prefix))
        .merge(system_routes())
        .layer(cors)
        // 可观测性中间件：请求追踪和指标收集
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
