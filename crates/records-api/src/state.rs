//! 应用状态定义

use std::sync::Arc;

use records::{CourseService, GradeService, RecordStore, StudentService};
use records_shared::config::ApiConfig;

/// Axum 应用共享状态
///
/// 三个服务共享同一个记录存储，成绩服务组合学生与课程服务校验引用
#[derive(Clone)]
pub struct AppState {
    pub students: Arc<StudentService>,
    pub courses: Arc<CourseService>,
    pub grades: Arc<GradeService>,
    /// 就绪探针使用
    pub store: Arc<dyn RecordStore>,
    pub api: ApiConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, api: ApiConfig) -> Self {
        let students = Arc::new(StudentService::new(store.clone()));
        let courses = Arc::new(CourseService::new(store.clone()));
        let grades = Arc::new(GradeService::new(
            store.clone(),
            students.clone(),
            courses.clone(),
        ));

        Self {
            students,
            courses,
            grades,
            store,
            api,
        }
    }

    /// 列表接口的默认条数
    pub fn default_page_size(&self) -> i64 {
        self.api.default_page_size
    }
}
