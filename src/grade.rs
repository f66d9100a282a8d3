use std::collections::HashMap;

use crate::models::{ScoreObservation, ScoreRow, StudentGrade, WeightedGrade};
use crate::stats::{mean, round2};
use crate::thresholds::{FORMATIVE_WEIGHT, MIDTERM_WEIGHT, SUMMATIVE_WEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentKind {
    Formative,
    Summative,
    Midterm,
}

impl AssessmentKind {
    /// `FA*` and `SA*` codes, or `MIDTERM` / `MID`. Case-insensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_uppercase();
        if code == "MIDTERM" || code == "MID" {
            Some(AssessmentKind::Midterm)
        } else if code.starts_with("FA") {
            Some(AssessmentKind::Formative)
        } else if code.starts_with("SA") {
            Some(AssessmentKind::Summative)
        } else {
            None
        }
    }
}

/// Weighted term grade over whichever components are present.
///
/// Absent components drop out of both the weighted sum and the weight total,
/// so FA and SA alone are normalized over 0.35. No components gives `None`.
pub fn term_grade(
    formative_average: Option<f64>,
    summative_average: Option<f64>,
    midterm: Option<f64>,
) -> Option<f64> {
    let parts = [
        (formative_average, FORMATIVE_WEIGHT),
        (summative_average, SUMMATIVE_WEIGHT),
        (midterm, MIDTERM_WEIGHT),
    ];

    let (weighted, total_weight) = parts
        .iter()
        .filter_map(|(value, weight)| value.map(|v| (v * weight, *weight)))
        .fold((0.0, 0.0), |(sum, total), (part, weight)| {
            (sum + part, total + weight)
        });

    if total_weight == 0.0 {
        return None;
    }
    Some(round2(weighted / total_weight))
}

/// Builds the component averages from `(code, observation)` pairs and blends
/// them. Invalid cells and unknown codes are skipped; the first valid
/// midterm wins.
pub fn weighted_grade<'a, I>(assessments: I) -> WeightedGrade
where
    I: IntoIterator<Item = (&'a str, &'a ScoreObservation)>,
{
    let mut formative = Vec::new();
    let mut summative = Vec::new();
    let mut midterm = None;

    for (code, observation) in assessments {
        let Some(value) = observation.value() else {
            continue;
        };
        match AssessmentKind::from_code(code) {
            Some(AssessmentKind::Formative) => formative.push(value),
            Some(AssessmentKind::Summative) => summative.push(value),
            Some(AssessmentKind::Midterm) => {
                midterm.get_or_insert(value);
            }
            None => {}
        }
    }

    let formative_average = mean(&formative);
    let summative_average = mean(&summative);
    let midterm = midterm.map(round2);

    WeightedGrade {
        formative_average,
        summative_average,
        midterm,
        term_grade: term_grade(formative_average, summative_average, midterm),
    }
}

/// Groups assessment rows by student and course and grades each group.
/// Ordered by class, student name, then course.
pub fn grade_students(rows: &[ScoreRow]) -> Vec<StudentGrade> {
    let mut groups: HashMap<(String, String), Vec<(&ScoreRow, ScoreObservation)>> =
        HashMap::new();

    for row in rows {
        groups
            .entry((row.student_id.clone(), row.course.clone()))
            .or_default()
            .push((row, row.observation()));
    }

    let mut grades: Vec<StudentGrade> = groups
        .into_values()
        .filter_map(|entries| {
            let first = entries.first()?.0;
            let grade = weighted_grade(
                entries
                    .iter()
                    .map(|(row, observation)| (row.code.as_str(), observation)),
            );
            Some(StudentGrade {
                student_id: first.student_id.clone(),
                student_name: first.student_name.clone(),
                class_name: first.class_name.clone(),
                course: first.course.clone(),
                grade,
            })
        })
        .collect();

    grades.sort_by(|a, b| {
        a.class_name
            .cmp(&b.class_name)
            .then_with(|| a.student_name.cmp(&b.student_name))
            .then_with(|| a.course.cmp(&b.course))
    });
    grades
}
