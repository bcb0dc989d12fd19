use crate::calc::{self, Remark};
use crate::roster::{GradeBook, Student, StudentGrade};
use crate::structure::{Category, GradeStructure};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScore {
    pub component_id: String,
    pub name: String,
    pub raw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: String,
    pub student_id: String,
    pub last_name: String,
    pub first_name: String,
    pub class_participation: Vec<ComponentScore>,
    pub class_participation_total: f64,
    pub exam: Vec<ComponentScore>,
    pub exam_total: f64,
    pub midterm_grade: f64,
    pub final_grade: f64,
    pub remark: Remark,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkCount {
    pub remark: Remark,
    pub count: usize,
}

fn component_scores(
    structure: &GradeStructure,
    category: Category,
    grade: Option<&StudentGrade>,
) -> Vec<ComponentScore> {
    structure
        .category(category)
        .components
        .iter()
        .map(|c| ComponentScore {
            component_id: c.id.clone(),
            name: c.name.clone(),
            raw: grade.map(|g| g.raw(category, &c.id)).unwrap_or(0.0),
        })
        .collect()
}

pub fn build_report_row(
    student: &Student,
    structure: &GradeStructure,
    grades: &GradeBook,
) -> ReportRow {
    let grade = grades.get(&student.id);
    let cp = calc::category_subtotal(structure, Category::ClassParticipation, grade);
    let exam = calc::category_subtotal(structure, Category::Exam, grade);
    // Midterm and final share one formula.
    let midterm = calc::final_grade(structure, grade);
    let fin = calc::final_grade(structure, grade);

    ReportRow {
        id: student.id.clone(),
        student_id: student.student_id.clone(),
        last_name: student.last_name.clone(),
        first_name: student.first_name.clone(),
        class_participation: component_scores(structure, Category::ClassParticipation, grade),
        class_participation_total: calc::round_off_2_decimals(cp),
        exam: component_scores(structure, Category::Exam, grade),
        exam_total: calc::round_off_2_decimals(exam),
        midterm_grade: calc::round_off_2_decimals(midterm),
        final_grade: calc::round_off_2_decimals(fin),
        remark: calc::remark(fin),
    }
}

pub fn build_report(
    students: &[Student],
    structure: &GradeStructure,
    grades: &GradeBook,
) -> Vec<ReportRow> {
    students
        .iter()
        .map(|s| build_report_row(s, structure, grades))
        .collect()
}

pub fn report_columns(structure: &GradeStructure) -> Vec<String> {
    let mut cols = vec![
        "Student ID".to_string(),
        "Last Name".to_string(),
        "First Name".to_string(),
    ];
    cols.extend(
        structure
            .class_participation
            .components
            .iter()
            .map(|c| c.name.clone()),
    );
    cols.push("Class Participation Total".to_string());
    cols.extend(structure.exam.components.iter().map(|c| c.name.clone()));
    cols.push("Exam Total".to_string());
    cols.push("Midterm Grade".to_string());
    cols.push("Final Grade".to_string());
    cols.push("Remarks".to_string());
    cols
}

pub fn remark_summary(rows: &[ReportRow]) -> Vec<RemarkCount> {
    Remark::BANDS
        .iter()
        .map(|&remark| RemarkCount {
            remark,
            count: rows.iter().filter(|r| r.remark == remark).count(),
        })
        .collect()
}

fn format_raw(v: f64) -> String {
    // Whole scores print without a trailing ".0".
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

fn csv_record(row: &ReportRow) -> Vec<String> {
    let mut rec = vec![
        row.student_id.clone(),
        row.last_name.clone(),
        row.first_name.clone(),
    ];
    rec.extend(row.class_participation.iter().map(|c| format_raw(c.raw)));
    rec.push(format!("{:.2}", row.class_participation_total));
    rec.extend(row.exam.iter().map(|c| format_raw(c.raw)));
    rec.push(format!("{:.2}", row.exam_total));
    rec.push(format!("{:.2}", row.midterm_grade));
    rec.push(format!("{:.2}", row.final_grade));
    rec.push(row.remark.to_string());
    rec
}

pub fn default_export_file_name(prefix: &str, date: chrono::NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

pub fn export_csv(
    out_path: &Path,
    structure: &GradeStructure,
    rows: &[ReportRow],
) -> anyhow::Result<usize> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let mut writer = csv::Writer::from_path(out_path)
        .with_context(|| format!("failed to create {}", out_path.to_string_lossy()))?;
    writer
        .write_record(report_columns(structure))
        .context("failed to write header row")?;
    for row in rows {
        writer
            .write_record(csv_record(row))
            .with_context(|| format!("failed to write row for {}", row.student_id))?;
    }
    writer.flush().context("failed to flush export")?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::update_score;

    fn student(id: &str, student_id: &str) -> Student {
        Student {
            id: id.into(),
            student_id: student_id.into(),
            first_name: "Ana".into(),
            last_name: "Reyes".into(),
        }
    }

    fn perfect_scores(grades: &mut GradeBook, id: &str) {
        for c in ["1", "2", "3"] {
            update_score(grades, id, Category::ClassParticipation, c, 100.0);
        }
        for c in ["1", "2"] {
            update_score(grades, id, Category::Exam, c, 100.0);
        }
    }

    #[test]
    fn row_for_canonical_scenario() {
        let structure = GradeStructure::default();
        let mut grades = GradeBook::new();
        perfect_scores(&mut grades, "a");
        let row = build_report_row(&student("a", "2024001"), &structure, &grades);

        assert_eq!(row.class_participation.len(), 3);
        assert!(row.class_participation.iter().all(|c| c.raw == 100.0));
        assert_eq!(row.class_participation_total, 70.0);
        assert_eq!(row.exam_total, 30.0);
        assert_eq!(row.midterm_grade, 58.0);
        assert_eq!(row.final_grade, 58.0);
        assert_eq!(row.remark, Remark::Passing);
    }

    #[test]
    fn student_without_grades_gets_zero_row() {
        let structure = GradeStructure::default();
        let row = build_report_row(&student("b", "2024002"), &structure, &GradeBook::new());
        assert!(row.exam.iter().all(|c| c.raw == 0.0));
        assert_eq!(row.final_grade, 0.0);
        assert_eq!(row.remark, Remark::Failed);
    }

    #[test]
    fn display_values_round_to_two_decimals() {
        let structure = GradeStructure::default();
        let mut grades = GradeBook::new();
        update_score(&mut grades, "c", Category::ClassParticipation, "3", 33.33);
        let row = build_report_row(&student("c", "2024003"), &structure, &grades);
        // 33.33 * 20 / 100 = 6.666
        assert_eq!(row.class_participation_total, 6.67);
    }

    #[test]
    fn columns_follow_export_order() {
        let cols = report_columns(&GradeStructure::default());
        assert_eq!(
            cols,
            vec![
                "Student ID",
                "Last Name",
                "First Name",
                "Quizzes",
                "Activities",
                "Attendance",
                "Class Participation Total",
                "Midterm Exam",
                "Final Exam",
                "Exam Total",
                "Midterm Grade",
                "Final Grade",
                "Remarks",
            ]
        );
    }

    #[test]
    fn remark_summary_counts_every_band() {
        let structure = GradeStructure::default();
        let mut grades = GradeBook::new();
        perfect_scores(&mut grades, "a");
        let rows = build_report(
            &[student("a", "1"), student("b", "2"), student("c", "3")],
            &structure,
            &grades,
        );
        let summary = remark_summary(&rows);
        assert_eq!(summary.len(), 6);
        assert_eq!(summary[0].remark, Remark::Excellent);
        let count = |r: Remark| summary.iter().find(|c| c.remark == r).map(|c| c.count);
        assert_eq!(count(Remark::Passing), Some(1));
        assert_eq!(count(Remark::Failed), Some(2));
        assert_eq!(count(Remark::Excellent), Some(0));
    }

    #[test]
    fn csv_record_formats_totals_with_two_decimals() {
        let structure = GradeStructure::default();
        let mut grades = GradeBook::new();
        perfect_scores(&mut grades, "a");
        update_score(&mut grades, "a", Category::Exam, "2", 87.5);
        let row = build_report_row(&student("a", "2024001"), &structure, &grades);
        let rec = csv_record(&row);
        assert_eq!(rec.len(), report_columns(&structure).len());
        assert_eq!(rec[3], "100");
        assert_eq!(rec[8], "87.5");
        assert_eq!(rec[6], "70.00");
        assert_eq!(rec[12], "Passing");
    }

    #[test]
    fn default_file_name_carries_the_date() {
        let d = chrono::NaiveDate::from_ymd_opt(2026, 10, 18).expect("date");
        assert_eq!(
            default_export_file_name("Grades_Report", d),
            "Grades_Report_2026-10-18.csv"
        );
    }
}
