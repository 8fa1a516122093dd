//! 服务层输入与输出对象
//!
//! 创建请求包含全部必填字段；修改请求的字段都是可选的，
//! 只有提供的字段才会被校验并写回（`apply_to`）。

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Course, Grade, Student, round_grade_value};

/// 区分"未提供"和"显式置空"
///
/// 字段缺省时由 `#[serde(default)]` 得到 `None`，出现时（包括 null）得到 `Some(..)`
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ==================== 学生 ====================

/// 创建学生请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    #[validate(length(min = 3, max = 100, message = "姓名长度必须在3-100个字符之间"))]
    pub name: String,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 5, max = 20, message = "学号长度必须在5-20个字符之间"))]
    pub registration_number: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

/// 修改学生请求
///
/// 学号不可修改；`birthDate: null` 会清空出生日期
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentChanges {
    #[validate(length(min = 3, max = 100, message = "姓名长度必须在3-100个字符之间"))]
    pub name: Option<String>,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<Option<NaiveDate>>,
}

impl StudentChanges {
    /// 是否会修改邮箱
    pub fn changes_email(&self, current: &Student) -> bool {
        self.email
            .as_deref()
            .is_some_and(|email| email != current.email)
    }

    /// 将提供的字段合并到学生记录
    pub fn apply_to(self, student: &mut Student) {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(email) = self.email {
            student.email = email;
        }
        if let Some(birth_date) = self.birth_date {
            student.birth_date = birth_date;
        }
    }
}

// ==================== 课程 ====================

/// 创建课程请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    #[validate(length(min = 3, max = 20, message = "课程编码长度必须在3-20个字符之间"))]
    pub code: String,
    #[validate(length(min = 3, max = 100, message = "课程名称长度必须在3-100个字符之间"))]
    pub name: String,
    #[validate(range(min = 1, max = 1000, message = "学时必须在1-1000之间"))]
    pub credit_hours: i32,
}

/// 修改课程请求，课程编码不可修改
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourseChanges {
    #[validate(length(min = 3, max = 100, message = "课程名称长度必须在3-100个字符之间"))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 1000, message = "学时必须在1-1000之间"))]
    pub credit_hours: Option<i32>,
}

impl CourseChanges {
    pub fn apply_to(self, course: &mut Course) {
        if let Some(name) = self.name {
            course.name = name;
        }
        if let Some(credit_hours) = self.credit_hours {
            course.credit_hours = credit_hours;
        }
    }
}

// ==================== 成绩 ====================

/// 录入成绩请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewGrade {
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[validate(range(min = 0.0, max = 10.0, message = "分数必须在0-10之间"))]
    pub value: f64,
    #[validate(length(min = 5, max = 10, message = "学期长度必须在5-10个字符之间"))]
    pub semester: String,
}

/// 修改成绩请求
///
/// 学生与课程引用不可修改
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GradeChanges {
    #[validate(range(min = 0.0, max = 10.0, message = "分数必须在0-10之间"))]
    pub value: Option<f64>,
    #[validate(length(min = 5, max = 10, message = "学期长度必须在5-10个字符之间"))]
    pub semester: Option<String>,
}

impl GradeChanges {
    /// 修改后是否会落到另一个学期
    pub fn changes_semester(&self, current: &Grade) -> bool {
        self.semester
            .as_deref()
            .is_some_and(|semester| semester != current.semester)
    }

    /// 合并到成绩记录，分数保留两位小数
    pub fn apply_to(self, grade: &mut Grade) {
        if let Some(value) = self.value {
            grade.value = round_grade_value(value);
        }
        if let Some(semester) = self.semester {
            grade.semester = semester;
        }
    }
}

// ==================== 删除回执 ====================

/// 删除成功的回执
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReceipt {
    /// 被删除的实体类型：student / course / grade
    pub entity: String,
    pub id: Uuid,
    pub message: String,
    /// 级联删除的成绩条数（删除成绩本身时为 0）
    pub removed_grades: u64,
}

impl DeletionReceipt {
    pub fn student(student: &Student, removed_grades: u64) -> Self {
        Self {
            entity: "student".to_string(),
            id: student.id,
            message: format!("学生 {} 已删除", student.name),
            removed_grades,
        }
    }

    pub fn course(course: &Course, removed_grades: u64) -> Self {
        Self {
            entity: "course".to_string(),
            id: course.id,
            message: format!("课程 {} 已删除", course.code),
            removed_grades,
        }
    }

    pub fn grade(grade: &Grade) -> Self {
        Self {
            entity: "grade".to_string(),
            id: grade.id,
            message: "成绩已删除".to_string(),
            removed_grades: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now_utc;

    fn student() -> Student {
        let now = now_utc();
        Student {
            id: Uuid::new_v4(),
            name: "Ana Silva".into(),
            email: "ana@x.com".into(),
            registration_number: "2024001".into(),
            birth_date: NaiveDate::from_ymd_opt(2000, 5, 17),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_new_student_validation() {
        let valid = NewStudent {
            name: "Ana Silva".into(),
            email: "ana@x.com".into(),
            registration_number: "2024001".into(),
            birth_date: None,
        };
        assert!(valid.validate().is_ok());

        let short_name = NewStudent {
            name: "Al".into(),
            ..valid.clone()
        };
        assert!(short_name.validate().is_err());

        let bad_email = NewStudent {
            email: "not-an-email".into(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_reg = NewStudent {
            registration_number: "2024".into(),
            ..valid
        };
        assert!(short_reg.validate().is_err());
    }

    #[test]
    fn test_student_changes_distinguish_absent_and_null() {
        let absent: StudentChanges = serde_json::from_str(r#"{"name": "Ana Souza"}"#).unwrap();
        assert_eq!(absent.birth_date, None);

        let cleared: StudentChanges = serde_json::from_str(r#"{"birthDate": null}"#).unwrap();
        assert_eq!(cleared.birth_date, Some(None));

        let set: StudentChanges =
            serde_json::from_str(r#"{"birthDate": "2001-02-03"}"#).unwrap();
        assert_eq!(set.birth_date, Some(NaiveDate::from_ymd_opt(2001, 2, 3)));
    }

    #[test]
    fn test_student_changes_apply_only_supplied_fields() {
        let mut s = student();
        let original = s.clone();

        StudentChanges {
            name: Some("Ana Souza".into()),
            ..Default::default()
        }
        .apply_to(&mut s);

        assert_eq!(s.name, "Ana Souza");
        assert_eq!(s.email, original.email);
        assert_eq!(s.birth_date, original.birth_date);

        StudentChanges {
            birth_date: Some(None),
            ..Default::default()
        }
        .apply_to(&mut s);
        assert_eq!(s.birth_date, None);
    }

    #[test]
    fn test_changes_email_ignores_same_value() {
        let s = student();
        let same = StudentChanges {
            email: Some(s.email.clone()),
            ..Default::default()
        };
        assert!(!same.changes_email(&s));

        let other = StudentChanges {
            email: Some("other@x.com".into()),
            ..Default::default()
        };
        assert!(other.changes_email(&s));
    }

    #[test]
    fn test_course_validation_bounds() {
        let course = NewCourse {
            code: "CS101".into(),
            name: "Algorithms".into(),
            credit_hours: 60,
        };
        assert!(course.validate().is_ok());
        assert!(NewCourse { credit_hours: 0, ..course.clone() }.validate().is_err());
        assert!(NewCourse { credit_hours: 1001, ..course.clone() }.validate().is_err());
        assert!(NewCourse { code: "CS".into(), ..course }.validate().is_err());

        let changes = CourseChanges {
            credit_hours: Some(0),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }

    #[test]
    fn test_grade_validation_and_rounding() {
        let grade = NewGrade {
            student_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            value: 10.5,
            semester: "2024.1".into(),
        };
        assert!(grade.validate().is_err());
        assert!(NewGrade { value: 10.0, ..grade.clone() }.validate().is_ok());
        assert!(NewGrade { semester: "24.1".into(), value: 5.0, ..grade }.validate().is_err());

        let now = now_utc();
        let mut g = Grade {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            value: 5.0,
            semester: "2024.1".into(),
            created_at: now,
            updated_at: now,
        };
        let changes = GradeChanges {
            value: Some(7.333),
            ..Default::default()
        };
        assert!(!changes.changes_semester(&g));
        changes.apply_to(&mut g);
        assert_eq!(g.value, 7.33);
        assert_eq!(g.semester, "2024.1");
    }
}
