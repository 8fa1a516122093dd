//! 服务层测试用的脚本化工作单元
//!
//! 查重类查询一律返回空，写入或提交按配置返回唯一约束冲突，
//! 用来模拟并发写入越过了服务层预检、由存储层约束拦下的情况。

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Course, Grade, Student};
use crate::repository::{
    MockRecordStore, RecordStore, StoreError, StoreResult, UniqueKey, UnitOfWork,
};

#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedUnit {
    /// 按 ID 查找时返回的已有记录
    pub student: Option<Student>,
    pub course: Option<Course>,
    pub grade: Option<Grade>,
    /// insert_* / update_* 返回的唯一约束冲突
    pub write_violation: Option<UniqueKey>,
    /// commit 返回的唯一约束冲突
    pub commit_violation: Option<UniqueKey>,
    /// update_* / delete_* 报告 0 行受影响（记录已被并发删除）
    pub rows_missing: bool,
}

impl ScriptedUnit {
    /// 每次 begin 都返回一份该脚本的副本
    pub fn into_store(self) -> Arc<dyn RecordStore> {
        let mut store = MockRecordStore::new();
        store
            .expect_begin()
            .returning(move || Ok(Box::new(self.clone()) as Box<dyn UnitOfWork>));
        Arc::new(store)
    }

    fn write(&self) -> StoreResult<()> {
        match self.write_violation {
            Some(key) => Err(StoreError::UniqueViolation(key)),
            None => Ok(()),
        }
    }

    fn touched(&self) -> StoreResult<bool> {
        self.write().map(|_| !self.rows_missing)
    }
}

fn matching<T: Clone>(row: &Option<T>, id: Uuid, row_id: impl Fn(&T) -> Uuid) -> Option<T> {
    row.as_ref().filter(|r| row_id(*r) == id).cloned()
}

#[async_trait]
impl UnitOfWork for ScriptedUnit {
    async fn find_student(&mut self, id: Uuid) -> StoreResult<Option<Student>> {
        Ok(matching(&self.student, id, |s| s.id))
    }

    async fn find_student_for_update(&mut self, id: Uuid) -> StoreResult<Option<Student>> {
        Ok(matching(&self.student, id, |s| s.id))
    }

    async fn find_student_by_registration_number(
        &mut self,
        _registration_number: &str,
    ) -> StoreResult<Option<Student>> {
        Ok(None)
    }

    async fn find_student_by_email(&mut self, _email: &str) -> StoreResult<Option<Student>> {
        Ok(None)
    }

    async fn list_students(&mut self, _offset: i64, _limit: i64) -> StoreResult<Vec<Student>> {
        Ok(Vec::new())
    }

    async fn insert_student(&mut self, _student: &Student) -> StoreResult<()> {
        self.write()
    }

    async fn update_student(&mut self, _student: &Student) -> StoreResult<bool> {
        self.touched()
    }

    async fn delete_student(&mut self, _id: Uuid) -> StoreResult<bool> {
        Ok(!self.rows_missing)
    }

    async fn find_course(&mut self, id: Uuid) -> StoreResult<Option<Course>> {
        Ok(matching(&self.course, id, |c| c.id))
    }

    async fn find_course_for_update(&mut self, id: Uuid) -> StoreResult<Option<Course>> {
        Ok(matching(&self.course, id, |c| c.id))
    }

    async fn find_course_by_code(&mut self, _code: &str) -> StoreResult<Option<Course>> {
        Ok(None)
    }

    async fn list_courses(&mut self, _offset: i64, _limit: i64) -> StoreResult<Vec<Course>> {
        Ok(Vec::new())
    }

    async fn insert_course(&mut self, _course: &Course) -> StoreResult<()> {
        self.write()
    }

    async fn update_course(&mut self, _course: &Course) -> StoreResult<bool> {
        self.touched()
    }

    async fn delete_course(&mut self, _id: Uuid) -> StoreResult<bool> {
        Ok(!self.rows_missing)
    }

    async fn find_grade(&mut self, id: Uuid) -> StoreResult<Option<Grade>> {
        Ok(matching(&self.grade, id, |g| g.id))
    }

    async fn find_grade_for_update(&mut self, id: Uuid) -> StoreResult<Option<Grade>> {
        Ok(matching(&self.grade, id, |g| g.id))
    }

    async fn list_grades(&mut self, _offset: i64, _limit: i64) -> StoreResult<Vec<Grade>> {
        Ok(Vec::new())
    }

    async fn list_grades_by_student(&mut self, _student_id: Uuid) -> StoreResult<Vec<Grade>> {
        Ok(Vec::new())
    }

    async fn list_grades_by_course(&mut self, _course_id: Uuid) -> StoreResult<Vec<Grade>> {
        Ok(Vec::new())
    }

    async fn find_grade_by_triple(
        &mut self,
        _student_id: Uuid,
        _course_id: Uuid,
        _semester: &str,
        _exclude_id: Option<Uuid>,
    ) -> StoreResult<Option<Grade>> {
        Ok(None)
    }

    async fn insert_grade(&mut self, _grade: &Grade) -> StoreResult<()> {
        self.write()
    }

    async fn update_grade(&mut self, _grade: &Grade) -> StoreResult<bool> {
        self.touched()
    }

    async fn delete_grade(&mut self, _id: Uuid) -> StoreResult<bool> {
        Ok(!self.rows_missing)
    }

    async fn delete_grades_by_student(&mut self, _student_id: Uuid) -> StoreResult<u64> {
        Ok(0)
    }

    async fn delete_grades_by_course(&mut self, _course_id: Uuid) -> StoreResult<u64> {
        Ok(0)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        match self.commit_violation {
            Some(key) => Err(StoreError::UniqueViolation(key)),
            None => Ok(()),
        }
    }
}
