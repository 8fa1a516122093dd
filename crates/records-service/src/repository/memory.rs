//! 内存记录存储
//!
//! 用于测试和本地演示。工作单元持有全局锁，首次写入时复制一份副本并在副本上修改，
//! 提交时整体写回，drop 时丢弃副本，因此与数据库事务的可见性一致。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::traits::{RecordStore, StoreError, StoreResult, UniqueKey, UnitOfWork};
use crate::models::{Course, Grade, Student};

#[derive(Debug, Clone, Default)]
struct Tables {
    students: HashMap<Uuid, Student>,
    courses: HashMap<Uuid, Course>,
    grades: HashMap<Uuid, Grade>,
}

/// 内存记录存储
///
/// 克隆得到的实例共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            staged: None,
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// 内存工作单元
///
/// 首次写入时才复制数据，只读的工作单元直接读取锁内数据
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    staged: Option<Tables>,
}

/// 按 (created_at, id) 排序后截取分页
fn page<T, K>(mut rows: Vec<T>, key: K, offset: i64, limit: i64) -> Vec<T>
where
    K: Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid),
{
    rows.sort_by_key(|row| key(row));
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    rows.into_iter().skip(offset).take(limit).collect()
}

fn sorted<T, K>(mut rows: Vec<T>, key: K) -> Vec<T>
where
    K: Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid),
{
    rows.sort_by_key(|row| key(row));
    rows
}

impl MemoryUnitOfWork {
    fn read(&self) -> &Tables {
        self.staged.as_ref().unwrap_or(&*self.guard)
    }

    fn write(&mut self) -> &mut Tables {
        let committed: &Tables = &self.guard;
        self.staged.get_or_insert_with(|| Tables::clone(committed))
    }

    fn check_student_unique(&self, student: &Student) -> StoreResult<()> {
        let others = self
            .read()
            .students
            .values()
            .filter(|existing| existing.id != student.id);

        for existing in others {
            if existing.registration_number == student.registration_number {
                return Err(StoreError::UniqueViolation(
                    UniqueKey::StudentRegistrationNumber,
                ));
            }
            if existing.email == student.email {
                return Err(StoreError::UniqueViolation(UniqueKey::StudentEmail));
            }
        }
        Ok(())
    }

    fn check_course_unique(&self, course: &Course) -> StoreResult<()> {
        let taken = self
            .read()
            .courses
            .values()
            .any(|existing| existing.id != course.id && existing.code == course.code);
        if taken {
            return Err(StoreError::UniqueViolation(UniqueKey::CourseCode));
        }
        Ok(())
    }

    fn check_grade(&self, grade: &Grade) -> StoreResult<()> {
        if !self.read().students.contains_key(&grade.student_id) {
            return Err(StoreError::ForeignKeyViolation(
                "grades_student_id_fkey".to_string(),
            ));
        }
        if !self.read().courses.contains_key(&grade.course_id) {
            return Err(StoreError::ForeignKeyViolation(
                "grades_course_id_fkey".to_string(),
            ));
        }
        let duplicate = self.read().grades.values().any(|existing| {
            existing.id != grade.id
                && existing.matches_triple(grade.student_id, grade.course_id, &grade.semester)
        });
        if duplicate {
            return Err(StoreError::UniqueViolation(UniqueKey::GradeTriple));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_student(&mut self, id: Uuid) -> StoreResult<Option<Student>> {
        Ok(self.read().students.get(&id).cloned())
    }

    async fn find_student_for_update(&mut self, id: Uuid) -> StoreResult<Option<Student>> {
        self.find_student(id).await
    }

    async fn find_student_by_registration_number(
        &mut self,
        registration_number: &str,
    ) -> StoreResult<Option<Student>> {
        Ok(self
            .read()
            .students
            .values()
            .find(|s| s.registration_number == registration_number)
            .cloned())
    }

    async fn find_student_by_email(&mut self, email: &str) -> StoreResult<Option<Student>> {
        Ok(self
            .read()
            .students
            .values()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn list_students(&mut self, offset: i64, limit: i64) -> StoreResult<Vec<Student>> {
        let rows: Vec<Student> = self.read().students.values().cloned().collect();
        Ok(page(rows, |s: &Student| (s.created_at, s.id), offset, limit))
    }

    async fn insert_student(&mut self, student: &Student) -> StoreResult<()> {
        self.check_student_unique(student)?;
        self.write().students.insert(student.id, student.clone());
        Ok(())
    }

    async fn update_student(&mut self, student: &Student) -> StoreResult<bool> {
        if !self.read().students.contains_key(&student.id) {
            return Ok(false);
        }
        self.check_student_unique(student)?;
        if let Some(existing) = self.write().students.get_mut(&student.id) {
            existing.name = student.name.clone();
            existing.email = student.email.clone();
            existing.birth_date = student.birth_date;
            existing.updated_at = student.updated_at;
        }
        Ok(true)
    }

    async fn delete_student(&mut self, id: Uuid) -> StoreResult<bool> {
        if self.read().grades.values().any(|g| g.student_id == id) {
            return Err(StoreError::ForeignKeyViolation(
                "grades_student_id_fkey".to_string(),
            ));
        }
        if !self.read().students.contains_key(&id) {
            return Ok(false);
        }
        Ok(self.write().students.remove(&id).is_some())
    }

    async fn find_course(&mut self, id: Uuid) -> StoreResult<Option<Course>> {
        Ok(self.read().courses.get(&id).cloned())
    }

    async fn find_course_for_update(&mut self, id: Uuid) -> StoreResult<Option<Course>> {
        self.find_course(id).await
    }

    async fn find_course_by_code(&mut self, code: &str) -> StoreResult<Option<Course>> {
        Ok(self
            .read()
            .courses
            .values()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn list_courses(&mut self, offset: i64, limit: i64) -> StoreResult<Vec<Course>> {
        let rows: Vec<Course> = self.read().courses.values().cloned().collect();
        Ok(page(rows, |c: &Course| (c.created_at, c.id), offset, limit))
    }

    async fn insert_course(&mut self, course: &Course) -> StoreResult<()> {
        self.check_course_unique(course)?;
        self.write().courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn update_course(&mut self, course: &Course) -> StoreResult<bool> {
        if !self.read().courses.contains_key(&course.id) {
            return Ok(false);
        }
        if let Some(existing) = self.write().courses.get_mut(&course.id) {
            existing.name = course.name.clone();
            existing.credit_hours = course.credit_hours;
            existing.updated_at = course.updated_at;
        }
        Ok(true)
    }

    async fn delete_course(&mut self, id: Uuid) -> StoreResult<bool> {
        if self.read().grades.values().any(|g| g.course_id == id) {
            return Err(StoreError::ForeignKeyViolation(
                "grades_course_id_fkey".to_string(),
            ));
        }
        if !self.read().courses.contains_key(&id) {
            return Ok(false);
        }
        Ok(self.write().courses.remove(&id).is_some())
    }

    async fn find_grade(&mut self, id: Uuid) -> StoreResult<Option<Grade>> {
        Ok(self.read().grades.get(&id).cloned())
    }

    async fn find_grade_for_update(&mut self, id: Uuid) -> StoreResult<Option<Grade>> {
        self.find_grade(id).await
    }

    async fn list_grades(&mut self, offset: i64, limit: i64) -> StoreResult<Vec<Grade>> {
        let rows: Vec<Grade> = self.read().grades.values().cloned().collect();
        Ok(page(rows, |g: &Grade| (g.created_at, g.id), offset, limit))
    }

    async fn list_grades_by_student(&mut self, student_id: Uuid) -> StoreResult<Vec<Grade>> {
        let rows = self
            .read()
            .grades
            .values()
            .filter(|g| g.student_id == student_id)
            .cloned()
            .collect();
        Ok(sorted(rows, |g: &Grade| (g.created_at, g.id)))
    }

    async fn list_grades_by_course(&mut self, course_id: Uuid) -> StoreResult<Vec<Grade>> {
        let rows = self
            .read()
            .grades
            .values()
            .filter(|g| g.course_id == course_id)
            .cloned()
            .collect();
        Ok(sorted(rows, |g: &Grade| (g.created_at, g.id)))
    }

    async fn find_grade_by_triple(
        &mut self,
        student_id: Uuid,
        course_id: Uuid,
        semester: &str,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<Option<Grade>> {
        Ok(self
            .read()
            .grades
            .values()
            .find(|g| {
                Some(g.id) != exclude_id && g.matches_triple(student_id, course_id, semester)
            })
            .cloned())
    }

    async fn insert_grade(&mut self, grade: &Grade) -> StoreResult<()> {
        self.check_grade(grade)?;
        self.write().grades.insert(grade.id, grade.clone());
        Ok(())
    }

    async fn update_grade(&mut self, grade: &Grade) -> StoreResult<bool> {
        if !self.read().grades.contains_key(&grade.id) {
            return Ok(false);
        }
        self.check_grade(grade)?;
        if let Some(existing) = self.write().grades.get_mut(&grade.id) {
            existing.value = grade.value;
            existing.semester = grade.semester.clone();
            existing.updated_at = grade.updated_at;
        }
        Ok(true)
    }

    async fn delete_grade(&mut self, id: Uuid) -> StoreResult<bool> {
        if !self.read().grades.contains_key(&id) {
            return Ok(false);
        }
        Ok(self.write().grades.remove(&id).is_some())
    }

    async fn delete_grades_by_student(&mut self, student_id: Uuid) -> StoreResult<u64> {
        if !self.read().grades.values().any(|g| g.student_id == student_id) {
            return Ok(0);
        }
        let grades = &mut self.write().grades;
        let before = grades.len();
        grades.retain(|_, g| g.student_id != student_id);
        Ok((before - grades.len()) as u64)
    }

    async fn delete_grades_by_course(&mut self, course_id: Uuid) -> StoreResult<u64> {
        if !self.read().grades.values().any(|g| g.course_id == course_id) {
            return Ok(0);
        }
        let grades = &mut self.write().grades;
        let before = grades.len();
        grades.retain(|_, g| g.course_id != course_id);
        Ok((before - grades.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        if let Some(staged) = staged {
            *guard = staged;
        }
        Ok(())
    }
}
