//! 学生服务
//!
//! 学号与邮箱全局唯一，学号创建后不可修改。
//! 删除学生时在同一工作单元内先删除其全部成绩。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::dto::{DeletionReceipt, NewStudent, StudentChanges};
use super::{StudentDirectory, observe};
use crate::error::{AcademicError, Result};
use crate::models::{Student, next_update_time, now_utc};
use crate::repository::{RecordStore, StoreError, UniqueKey, UnitOfWork};

/// 唯一约束冲突归类为学生冲突
fn student_conflict(key: UniqueKey, student: &Student) -> AcademicError {
    match key {
        UniqueKey::StudentRegistrationNumber => {
            AcademicError::RegistrationNumberTaken(student.registration_number.clone())
        }
        UniqueKey::StudentEmail => AcademicError::EmailTaken(student.email.clone()),
        other => StoreError::UniqueViolation(other).into(),
    }
}

/// 学生服务
pub struct StudentService {
    store: Arc<dyn RecordStore>,
}

impl StudentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// 分页查询学生，按创建时间排序
    #[instrument(skip(self))]
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Student>> {
        let mut unit = self.store.begin().await?;
        Ok(unit.list_students(offset, limit).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Student> {
        let mut unit = self.store.begin().await?;
        self.get_within(unit.as_mut(), id).await
    }

    pub async fn find_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<Student>> {
        let mut unit = self.store.begin().await?;
        Ok(unit
            .find_student_by_registration_number(registration_number)
            .await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Student>> {
        let mut unit = self.store.begin().await?;
        Ok(unit.find_student_by_email(email).await?)
    }

    /// 创建学生
    ///
    /// 先检查学号，再检查邮箱；并发写入由存储层唯一约束兜底
    #[instrument(skip(self, input), fields(registration_number = %input.registration_number))]
    pub async fn create(&self, input: NewStudent) -> Result<Student> {
        let result = self.insert(input).await;
        observe("student", "create", &result);
        result
    }

    async fn insert(&self, input: NewStudent) -> Result<Student> {
        input.validate()?;

        let now = now_utc();
        let student = Student {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            registration_number: input.registration_number,
            birth_date: input.birth_date,
            created_at: now,
            updated_at: now,
        };

        let mut unit = self.store.begin().await?;

        if unit
            .find_student_by_registration_number(&student.registration_number)
            .await?
            .is_some()
        {
            warn!(registration_number = %student.registration_number, "学号已被注册");
            return Err(AcademicError::RegistrationNumberTaken(
                student.registration_number,
            ));
        }

        if unit.find_student_by_email(&student.email).await?.is_some() {
            warn!(email = %student.email, "邮箱已被使用");
            return Err(AcademicError::EmailTaken(student.email));
        }

        unit.insert_student(&student)
            .await
            .map_err(|e| e.classify(|key| student_conflict(key, &student)))?;
        unit.commit()
            .await
            .map_err(|e| e.classify(|key| student_conflict(key, &student)))?;

        info!(student_id = %student.id, "学生创建成功");
        Ok(student)
    }

    /// 修改学生，只写回提供的字段
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: Uuid, changes: StudentChanges) -> Result<Student> {
        let result = self.modify(id, changes).await;
        observe("student", "update", &result);
        result
    }

    async fn modify(&self, id: Uuid, changes: StudentChanges) -> Result<Student> {
        changes.validate()?;

        let mut unit = self.store.begin().await?;
        let mut student = unit
            .find_student_for_update(id)
            .await?
            .ok_or(AcademicError::StudentNotFound(id))?;

        if changes.changes_email(&student) {
            if let Some(email) = changes.email.as_deref() {
                let owner = unit.find_student_by_email(email).await?;
                if owner.is_some_and(|owner| owner.id != id) {
                    warn!(student_id = %id, email = %email, "邮箱已被其他学生使用");
                    return Err(AcademicError::EmailTaken(email.to_string()));
                }
            }
        }

        changes.apply_to(&mut student);
        student.updated_at = next_update_time(student.updated_at);

        let updated = unit
            .update_student(&student)
            .await
            .map_err(|e| e.classify(|key| student_conflict(key, &student)))?;
        if !updated {
            return Err(AcademicError::StudentNotFound(id));
        }
        unit.commit()
            .await
            .map_err(|e| e.classify(|key| student_conflict(key, &student)))?;

        info!(student_id = %id, "学生信息已更新");
        Ok(student)
    }

    /// 删除学生及其全部成绩
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<DeletionReceipt> {
        let result = self.remove(id).await;
        observe("student", "delete", &result);
        result
    }

    async fn remove(&self, id: Uuid) -> Result<DeletionReceipt> {
        let mut unit = self.store.begin().await?;
        let student = unit
            .find_student_for_update(id)
            .await?
            .ok_or(AcademicError::StudentNotFound(id))?;

        let removed_grades = unit.delete_grades_by_student(id).await?;
        if !unit.delete_student(id).await? {
            return Err(AcademicError::StudentNotFound(id));
        }
        unit.commit().await?;

        info!(student_id = %id, removed_grades, "学生已删除");
        Ok(DeletionReceipt::student(&student, removed_grades))
    }
}

#[async_trait]
impl StudentDirectory for StudentService {
    async fn get_within(&self, unit: &mut dyn UnitOfWork, id: Uuid) -> Result<Student> {
        unit.find_student(id)
            .await?
            .ok_or(AcademicError::StudentNotFound(id))
    }
}
