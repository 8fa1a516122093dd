//! 成绩服务
//!
//! 录入成绩前必须确认学生和课程都存在，同一学生同一课程同一学期只允许一条成绩。
//!
//! ## 录入流程
//!
//! 1. 参数校验 -> 2. 解析学生 -> 3. 解析课程 -> 4. 学期查重 -> 5. 写入并提交

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::dto::{DeletionReceipt, GradeChanges, NewGrade};
use super::{CourseDirectory, StudentDirectory, observe};
use crate::error::{AcademicError, Result};
use crate::models::{
    Grade, MAX_GRADE_VALUE, MIN_GRADE_VALUE, is_valid_grade_value, next_update_time, now_utc,
    round_grade_value,
};
use crate::repository::{RecordStore, StoreError, UniqueKey};

fn grade_conflict(key: UniqueKey, grade: &Grade) -> AcademicError {
    match key {
        UniqueKey::GradeTriple => AcademicError::DuplicateGrade {
            semester: grade.semester.clone(),
        },
        other => StoreError::UniqueViolation(other).into(),
    }
}

/// NaN 与无穷在 validator 的范围检查中不会被拒绝，这里单独兜底
fn ensure_valid_value(value: f64) -> Result<()> {
    if is_valid_grade_value(value) {
        Ok(())
    } else {
        Err(AcademicError::Validation(format!(
            "分数必须在{MIN_GRADE_VALUE}-{MAX_GRADE_VALUE}之间: {value}"
        )))
    }
}

/// 成绩服务
pub struct GradeService {
    store: Arc<dyn RecordStore>,
    students: Arc<dyn StudentDirectory>,
    courses: Arc<dyn CourseDirectory>,
}

impl GradeService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        students: Arc<dyn StudentDirectory>,
        courses: Arc<dyn CourseDirectory>,
    ) -> Self {
        Self {
            store,
            students,
            courses,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Grade>> {
        let mut unit = self.store.begin().await?;
        Ok(unit.list_grades(offset, limit).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Grade> {
        let mut unit = self.store.begin().await?;
        unit.find_grade(id)
            .await?
            .ok_or(AcademicError::GradeNotFound(id))
    }

    /// 查询学生的全部成绩，学生不存在时返回 `StudentNotFound` 而非空列表
    #[instrument(skip(self))]
    pub async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Grade>> {
        let mut unit = self.store.begin().await?;
        self.students.get_within(unit.as_mut(), student_id).await?;
        Ok(unit.list_grades_by_student(student_id).await?)
    }

    /// 查询课程的全部成绩，课程不存在时返回 `CourseNotFound`
    #[instrument(skip(self))]
    pub async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Grade>> {
        let mut unit = self.store.begin().await?;
        self.courses.get_within(unit.as_mut(), course_id).await?;
        Ok(unit.list_grades_by_course(course_id).await?)
    }

    /// 是否已存在相同 (学生, 课程, 学期) 的成绩，可排除指定成绩
    pub async fn check_duplicate(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        semester: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool> {
        let mut unit = self.store.begin().await?;
        let existing = unit
            .find_grade_by_triple(student_id, course_id, semester, exclude_id)
            .await?;
        Ok(existing.is_some())
    }

    #[instrument(skip(self, input), fields(
        student_id = %input.student_id,
        course_id = %input.course_id,
        semester = %input.semester
    ))]
    pub async fn create(&self, input: NewGrade) -> Result<Grade> {
        let result = self.insert(input).await;
        observe("grade", "create", &result);
        result
    }

    async fn insert(&self, input: NewGrade) -> Result<Grade> {
        input.validate()?;
        ensure_valid_value(input.value)?;

        let mut unit = self.store.begin().await?;

        self.students
            .get_within(unit.as_mut(), input.student_id)
            .await?;
        self.courses
            .get_within(unit.as_mut(), input.course_id)
            .await?;

        let duplicate = unit
            .find_grade_by_triple(input.student_id, input.course_id, &input.semester, None)
            .await?;
        if duplicate.is_some() {
            warn!("该学期已有成绩");
            return Err(AcademicError::DuplicateGrade {
                semester: input.semester,
            });
        }

        let now = now_utc();
        let grade = Grade {
            id: Uuid::new_v4(),
            student_id: input.student_id,
            course_id: input.course_id,
            value: round_grade_value(input.value),
            semester: input.semester,
            created_at: now,
            updated_at: now,
        };

        unit.insert_grade(&grade)
            .await
            .map_err(|e| e.classify(|key| grade_conflict(key, &grade)))?;
        unit.commit()
            .await
            .map_err(|e| e.classify(|key| grade_conflict(key, &grade)))?;

        info!(grade_id = %grade.id, value = grade.value, "成绩录入成功");
        Ok(grade)
    }

    /// 修改分数或学期，学生与课程引用不可修改
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: Uuid, changes: GradeChanges) -> Result<Grade> {
        let result = self.modify(id, changes).await;
        observe("grade", "update", &result);
        result
    }

    async fn modify(&self, id: Uuid, changes: GradeChanges) -> Result<Grade> {
        changes.validate()?;
        if let Some(value) = changes.value {
            ensure_valid_value(value)?;
        }

        let mut unit = self.store.begin().await?;
        let mut grade = unit
            .find_grade_for_update(id)
            .await?
            .ok_or(AcademicError::GradeNotFound(id))?;

        if changes.changes_semester(&grade) {
            if let Some(semester) = changes.semester.as_deref() {
                let duplicate = unit
                    .find_grade_by_triple(grade.student_id, grade.course_id, semester, Some(id))
                    .await?;
                if duplicate.is_some() {
                    warn!(grade_id = %id, semester = %semester, "目标学期已有成绩");
                    return Err(AcademicError::DuplicateGrade {
                        semester: semester.to_string(),
                    });
                }
            }
        }

        changes.apply_to(&mut grade);
        grade.updated_at = next_update_time(grade.updated_at);

        let updated = unit
            .update_grade(&grade)
            .await
            .map_err(|e| e.classify(|key| grade_conflict(key, &grade)))?;
        if !updated {
            return Err(AcademicError::GradeNotFound(id));
        }
        unit.commit()
            .await
            .map_err(|e| e.classify(|key| grade_conflict(key, &grade)))?;

        info!(grade_id = %id, value = grade.value, "成绩已更新");
        Ok(grade)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<DeletionReceipt> {
        let result = self.remove(id).await;
        observe("grade", "delete", &result);
        result
    }

    async fn remove(&self, id: Uuid) -> Result<DeletionReceipt> {
        let mut unit = self.store.begin().await?;
        let grade = unit
            .find_grade_for_update(id)
            .await?
            .ok_or(AcademicError::GradeNotFound(id))?;

        if !unit.delete_grade(id).await? {
            return Err(AcademicError::GradeNotFound(id));
        }
        unit.commit().await?;

        info!(grade_id = %id, "成绩已删除");
        Ok(DeletionReceipt::grade(&grade))
    }
}
