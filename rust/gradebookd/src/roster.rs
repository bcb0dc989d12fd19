use crate::error::{GradebookError, Result};
use crate::structure::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub type ScoreMap = BTreeMap<String, f64>;

/// Grade records keyed by internal student id.
pub type GradeBook = BTreeMap<String, StudentGrade>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGrade {
    pub student_id: String,
    #[serde(default)]
    pub class_participation_grades: ScoreMap,
    #[serde(default)]
    pub exam_grades: ScoreMap,
}

impl StudentGrade {
    pub fn new(student_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            class_participation_grades: ScoreMap::new(),
            exam_grades: ScoreMap::new(),
        }
    }

    pub fn scores(&self, category: Category) -> &ScoreMap {
        match category {
            Category::ClassParticipation => &self.class_participation_grades,
            Category::Exam => &self.exam_grades,
        }
    }

    pub fn scores_mut(&mut self, category: Category) -> &mut ScoreMap {
        match category {
            Category::ClassParticipation => &mut self.class_participation_grades,
            Category::Exam => &mut self.exam_grades,
        }
    }

    /// Raw score for display and export; missing entries read as 0.
    pub fn raw(&self, category: Category, component_id: &str) -> f64 {
        self.scores(category)
            .get(component_id)
            .copied()
            .unwrap_or(0.0)
    }
}

pub fn add_student(students: &mut Vec<Student>, candidate: NewStudent) -> Result<Student> {
    let student_id = candidate.student_id.trim().to_string();
    let first_name = candidate.first_name.trim().to_string();
    let last_name = candidate.last_name.trim().to_string();
    if student_id.is_empty() || first_name.is_empty() || last_name.is_empty() {
        return Err(GradebookError::Validation(
            "Please fill in all fields".to_string(),
        ));
    }
    if students.iter().any(|s| s.student_id == student_id) {
        return Err(GradebookError::DuplicateId(student_id));
    }

    let student = Student {
        id: Uuid::new_v4().to_string(),
        student_id,
        first_name,
        last_name,
    };
    students.push(student.clone());
    Ok(student)
}

/// Grade records are left in place; lookups are by id so orphans are inert.
pub fn remove_student(students: &mut Vec<Student>, id: &str) -> Result<Student> {
    let Some(pos) = students.iter().position(|s| s.id == id) else {
        return Err(GradebookError::NotFound {
            entity: "student",
            id: id.to_string(),
        });
    };
    Ok(students.remove(pos))
}

pub fn update_score<'a>(
    grades: &'a mut GradeBook,
    student_id: &str,
    category: Category,
    component_id: &str,
    value: f64,
) -> &'a StudentGrade {
    let grade = grades
        .entry(student_id.to_string())
        .or_insert_with(|| StudentGrade::new(student_id));
    grade
        .scores_mut(category)
        .insert(component_id.to_string(), value);
    grade
}
