use crate::roster::StudentGrade;
use crate::structure::{Category, GradeStructure};
use serde::Serialize;

/// Half-away-from-zero rounding to 2 decimals, used for every displayed
/// subtotal and grade.
pub fn round_off_2_decimals(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Weighted aggregate of one category's raw scores. Missing records and
/// missing component entries count as 0; raw values are not clamped.
pub fn category_subtotal(
    structure: &GradeStructure,
    category: Category,
    grade: Option<&StudentGrade>,
) -> f64 {
    let Some(grade) = grade else {
        return 0.0;
    };
    let scores = grade.scores(category);
    let mut total = 0.0;
    for component in &structure.category(category).components {
        let raw = scores.get(&component.id).copied().unwrap_or(0.0);
        total += (raw * component.percentage) / 100.0;
    }
    total
}

pub fn final_grade(structure: &GradeStructure, grade: Option<&StudentGrade>) -> f64 {
    let cp = category_subtotal(structure, Category::ClassParticipation, grade);
    let exam = category_subtotal(structure, Category::Exam, grade);

    let cp_total = (cp * structure.class_participation.total) / 100.0;
    let exam_total = (exam * structure.exam.total) / 100.0;
    cp_total + exam_total
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Remark {
    Failed,
    Passing,
    Satisfactory,
    Good,
    #[serde(rename = "Very Good")]
    VeryGood,
    Excellent,
}

impl Remark {
    /// Highest band first.
    pub const BANDS: [Remark; 6] = [
        Remark::Excellent,
        Remark::VeryGood,
        Remark::Good,
        Remark::Satisfactory,
        Remark::Passing,
        Remark::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::Passing => "Passing",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for Remark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn remark(final_grade: f64) -> Remark {
    if final_grade >= 90.0 {
        Remark::Excellent
    } else if final_grade >= 80.0 {
        Remark::VeryGood
    } else if final_grade >= 70.0 {
        Remark::Good
    } else if final_grade >= 60.0 {
        Remark::Satisfactory
    } else if final_grade >= 50.0 {
        Remark::Passing
    } else {
        Remark::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::GradeComponent;

    fn grade_with(cp: &[(&str, f64)], exam: &[(&str, f64)]) -> StudentGrade {
        let mut g = StudentGrade::new("s1");
        for (id, v) in cp {
            g.class_participation_grades.insert(id.to_string(), *v);
        }
        for (id, v) in exam {
            g.exam_grades.insert(id.to_string(), *v);
        }
        g
    }

    #[test]
    fn canonical_regression_scenario() {
        let s = GradeStructure::default();
        let g = grade_with(
            &[("1", 100.0), ("2", 100.0), ("3", 100.0)],
            &[("1", 100.0), ("2", 100.0)],
        );
        let cp = category_subtotal(&s, Category::ClassParticipation, Some(&g));
        let exam = category_subtotal(&s, Category::Exam, Some(&g));
        assert_eq!(cp, 70.0);
        assert_eq!(exam, 30.0);
        let fin = final_grade(&s, Some(&g));
        assert_eq!(fin, 58.0);
        assert_eq!(remark(fin), Remark::Passing);
    }

    #[test]
    fn missing_record_and_entries_count_as_zero() {
        let s = GradeStructure::default();
        assert_eq!(category_subtotal(&s, Category::Exam, None), 0.0);
        assert_eq!(final_grade(&s, None), 0.0);

        let g = grade_with(&[("1", 80.0)], &[]);
        assert_eq!(category_subtotal(&s, Category::ClassParticipation, Some(&g)), 20.0);
        assert_eq!(category_subtotal(&s, Category::Exam, Some(&g)), 0.0);
    }

    #[test]
    fn out_of_range_scores_are_not_clamped() {
        let s = GradeStructure::default();
        let g = grade_with(&[("1", 200.0), ("2", -40.0)], &[]);
        assert_eq!(
            category_subtotal(&s, Category::ClassParticipation, Some(&g)),
            50.0 - 10.0
        );
    }

    #[test]
    fn scores_for_unknown_components_are_ignored() {
        let s = GradeStructure::default();
        let g = grade_with(&[("gone", 100.0)], &[]);
        assert_eq!(category_subtotal(&s, Category::ClassParticipation, Some(&g)), 0.0);
    }

    #[test]
    fn subtotal_is_linear_in_each_raw_score() {
        let s = GradeStructure::default();
        let base = grade_with(&[("1", 40.0), ("2", 60.0), ("3", 10.0)], &[]);
        let bumped = grade_with(&[("1", 50.0), ("2", 60.0), ("3", 10.0)], &[]);
        let a = category_subtotal(&s, Category::ClassParticipation, Some(&base));
        let b = category_subtotal(&s, Category::ClassParticipation, Some(&bumped));
        // +10 raw on a 25% component adds 2.5.
        assert!((b - a - 2.5).abs() < 1e-9);
    }

    #[test]
    fn subtotal_is_invariant_to_component_order() {
        let s = GradeStructure::default();
        let mut reversed = s.clone();
        reversed.class_participation.components.reverse();
        let g = grade_with(&[("1", 73.0), ("2", 88.5), ("3", 91.0)], &[]);
        let a = category_subtotal(&s, Category::ClassParticipation, Some(&g));
        let b = category_subtotal(&reversed, Category::ClassParticipation, Some(&g));
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn components_summing_to_100_reach_full_subtotal() {
        let mut s = GradeStructure::default();
        s.exam.components = vec![
            GradeComponent::new("m", "Midterm", 50.0),
            GradeComponent::new("f", "Final", 50.0),
        ];
        let g = grade_with(&[], &[("m", 100.0), ("f", 100.0)]);
        assert_eq!(category_subtotal(&s, Category::Exam, Some(&g)), 100.0);
    }

    #[test]
    fn final_grade_matches_formula_exactly() {
        let s = GradeStructure::default();
        let g = grade_with(&[("1", 87.5), ("2", 91.25), ("3", 66.0)], &[("1", 72.0), ("2", 59.5)]);
        let cp = category_subtotal(&s, Category::ClassParticipation, Some(&g));
        let exam = category_subtotal(&s, Category::Exam, Some(&g));
        let expected = cp * s.class_participation.total / 100.0 + exam * s.exam.total / 100.0;
        assert_eq!(final_grade(&s, Some(&g)), expected);
    }

    #[test]
    fn remark_boundaries() {
        assert_eq!(remark(90.0), Remark::Excellent);
        assert_eq!(remark(89.999), Remark::VeryGood);
        assert_eq!(remark(89.99), Remark::VeryGood);
        assert_eq!(remark(80.0), Remark::VeryGood);
        assert_eq!(remark(79.99), Remark::Good);
        assert_eq!(remark(70.0), Remark::Good);
        assert_eq!(remark(60.0), Remark::Satisfactory);
        assert_eq!(remark(50.0), Remark::Passing);
        assert_eq!(remark(49.99), Remark::Failed);
        assert_eq!(remark(-5.0), Remark::Failed);
    }

    #[test]
    fn remark_is_monotonic() {
        let mut prev = remark(-10.0);
        let mut x = -10.0;
        while x <= 110.0 {
            let r = remark(x);
            assert!(r >= prev, "{} dropped below {} at {}", r, prev, x);
            prev = r;
            x += 0.25;
        }
    }

    #[test]
    fn round_off_two_decimals() {
        assert_eq!(round_off_2_decimals(58.0), 58.0);
        assert_eq!(round_off_2_decimals(1.0 / 3.0), 0.33);
        assert_eq!(round_off_2_decimals(2.0 / 3.0), 0.67);
    }
}
