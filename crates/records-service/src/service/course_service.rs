//! 课程服务

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::dto::{CourseChanges, DeletionReceipt, NewCourse};
use super::{CourseDirectory, observe};
use crate::error::{AcademicError, Result};
use crate::models::{Course, next_update_time, now_utc};
use crate::repository::{RecordStore, StoreError, UniqueKey, UnitOfWork};

fn course_conflict(key: UniqueKey, course: &Course) -> AcademicError {
    match key {
        UniqueKey::CourseCode => AcademicError::CourseCodeTaken(course.code.clone()),
        other => StoreError::UniqueViolation(other).into(),
    }
}

/// 课程服务
///
/// 课程编码全局唯一且创建后不可修改，学时范围 1-1000
pub struct CourseService {
    store: Arc<dyn RecordStore>,
}

impl CourseService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Course>> {
        let mut unit = self.store.begin().await?;
        Ok(unit.list_courses(offset, limit).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Course> {
        let mut unit = self.store.begin().await?;
        self.get_within(unit.as_mut(), id).await
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Course>> {
        let mut unit = self.store.begin().await?;
        Ok(unit.find_course_by_code(code).await?)
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, input: NewCourse) -> Result<Course> {
        let result = self.insert(input).await;
        observe("course", "create", &result);
        result
    }

    async fn insert(&self, input: NewCourse) -> Result<Course> {
        input.validate()?;

        let now = now_utc();
        let course = Course {
            id: Uuid::new_v4(),
            code: input.code,
            name: input.name,
            credit_hours: input.credit_hours,
            created_at: now,
            updated_at: now,
        };

        let mut unit = self.store.begin().await?;

        if unit.find_course_by_code(&course.code).await?.is_some() {
            warn!(code = %course.code, "课程编码已存在");
            return Err(AcademicError::CourseCodeTaken(course.code));
        }

        unit.insert_course(&course)
            .await
            .map_err(|e| e.classify(|key| course_conflict(key, &course)))?;
        unit.commit()
            .await
            .map_err(|e| e.classify(|key| course_conflict(key, &course)))?;

        info!(course_id = %course.id, code = %course.code, "课程创建成功");
        Ok(course)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: Uuid, changes: CourseChanges) -> Result<Course> {
        let result = self.modify(id, changes).await;
        observe("course", "update", &result);
        result
    }

    async fn modify(&self, id: Uuid, changes: CourseChanges) -> Result<Course> {
        changes.validate()?;

        let mut unit = self.store.begin().await?;
        let mut course = unit
            .find_course_for_update(id)
            .await?
            .ok_or(AcademicError::CourseNotFound(id))?;

        changes.apply_to(&mut course);
        course.updated_at = next_update_time(course.updated_at);

        if !unit.update_course(&course).await? {
            return Err(AcademicError::CourseNotFound(id));
        }
        unit.commit().await?;

        info!(course_id = %id, "课程信息已更新");
        Ok(course)
    }

    /// 删除课程及其全部成绩
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<DeletionReceipt> {
        let result = self.remove(id).await;
        observe("course", "delete", &result);
        result
    }

    async fn remove(&self, id: Uuid) -> Result<DeletionReceipt> {
        let mut unit = self.store.begin().await?;
        let course = unit
            .find_course_for_update(id)
            .await?
            .ok_or(AcademicError::CourseNotFound(id))?;

        let removed_grades = unit.delete_grades_by_course(id).await?;
        if !unit.delete_course(id).await? {
            return Err(AcademicError::CourseNotFound(id));
        }
        unit.commit().await?;

        info!(course_id = %id, removed_grades, "课程已删除");
        Ok(DeletionReceipt::course(&course, removed_grades))
    }
}

#[async_trait]
impl CourseDirectory for CourseService {
    async fn get_within(&self, unit: &mut dyn UnitOfWork, id: Uuid) -> Result<Course> {
        unit.find_course(id)
            .await?
            .ok_or(AcademicError::CourseNotFound(id))
    }
}
