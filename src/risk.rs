use std::collections::HashMap;

use crate::growth::quintile_label;
use crate::models::{GrowthRow, GrowthStatus, QuintileLabel, RiskFlag, RiskKind, StudentGrade, StudentRisk};
use crate::thresholds::{course_scale, GradeScale, RAPID_GUESSING_BANDS, RAPID_GUESSING_FLAGGED};

/// Raises flags for term grades under their course's pass cut, plus weak
/// growth, rapid guessing and low benchmark offsets from MAP rows.
pub fn collect_flags(grades: &[StudentGrade], growth_rows: &[GrowthRow]) -> Vec<RiskFlag> {
    let mut flags = Vec::new();

    for student in grades {
        let Some(term_grade) = student.grade.term_grade else {
            continue;
        };
        if let Some(severity) = grade_severity(term_grade, course_scale(&student.course)) {
            flags.push(RiskFlag {
                student_id: student.student_id.clone(),
                student_name: student.student_name.clone(),
                class_name: student.class_name.clone(),
                kind: RiskKind::FailingGrade,
                context: format!("{} term grade {:.2}", student.course, term_grade),
                severity,
            });
        }
    }

    for row in growth_rows {
        let mut push = |kind: RiskKind, severity: i32, context: String| {
            flags.push(RiskFlag {
                student_id: row.student_id.clone(),
                student_name: row.student_name.clone(),
                class_name: row.class_name.clone(),
                kind,
                context,
                severity,
            });
        };

        let outcome = row.record().outcome();
        if let (Some(status), Some(index)) = (outcome.status, outcome.growth_index) {
            match status {
                GrowthStatus::BelowExpected => push(
                    RiskKind::BelowExpectedGrowth,
                    3,
                    format!("{} growth index {:.2}", row.subject, index),
                ),
                GrowthStatus::NearExpected => push(
                    RiskKind::NearExpectedGrowth,
                    1,
                    format!("{} growth index {:.2}", row.subject, index),
                ),
                GrowthStatus::MetExpected => {}
            }
        }

        if let Some(pct) = row.rapid_guessing_pct {
            if pct > RAPID_GUESSING_FLAGGED {
                let tier = RAPID_GUESSING_BANDS.label_for(pct).unwrap_or("Flagged");
                push(
                    RiskKind::RapidGuessing,
                    2,
                    format!("{} rapid guessing {:.1}% ({})", row.subject, pct, tier),
                );
            }
        }

        if let Some(offset) = row.subgoal_offset {
            if quintile_label(offset) == QuintileLabel::Low {
                push(
                    RiskKind::LowBenchmark,
                    2,
                    format!("{} subgoal offset {:+.1}", row.subject, offset),
                );
            }
        }
    }

    flags
}

/// Accumulates weighted flag severities per student, highest score first.
pub fn score_flags(flags: &[RiskFlag]) -> Vec<StudentRisk> {
    let mut scores: HashMap<String, StudentRisk> = HashMap::new();

    for flag in flags {
        let entry = scores
            .entry(flag.student_id.clone())
            .or_insert_with(|| StudentRisk {
                student_name: flag.student_name.clone(),
                student_id: flag.student_id.clone(),
                class_name: flag.class_name.clone(),
                score: 0.0,
                flag_count: 0,
            });

        entry.score += (flag.severity as f64) * flag_weight(flag.kind);
        entry.flag_count += 1;
    }

    let mut values: Vec<StudentRisk> = scores.into_values().collect();
    values.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.student_name.cmp(&b.student_name))
    });
    values
}

pub fn flag_weight(kind: RiskKind) -> f64 {
    match kind {
        RiskKind::FailingGrade => 1.0,
        RiskKind::BelowExpectedGrowth => 0.8,
        RiskKind::LowBenchmark => 0.7,
        RiskKind::RapidGuessing => 0.6,
        RiskKind::NearExpectedGrowth => 0.4,
    }
}

/// Severity of a term grade under the scale's pass cut, worse the further it
/// falls. The shortfall is measured in percent of the scale's top score.
pub fn grade_severity(term_grade: f64, scale: GradeScale) -> Option<i32> {
    if term_grade >= scale.pass {
        return None;
    }
    match ((scale.pass - term_grade) * 100.0 / scale.max).ceil() as i64 {
        0..=10 => Some(2),
        11..=20 => Some(3),
        _ => Some(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeightedGrade;
    use crate::thresholds::{KCFS_SCALE, PERCENT_SCALE};

    fn graded(student_id: &str, term_grade: Option<f64>) -> StudentGrade {
        StudentGrade {
            student_id: student_id.to_string(),
            student_name: format!("Student {student_id}"),
            class_name: "4B".to_string(),
            course: "Math".to_string(),
            grade: WeightedGrade {
                formative_average: term_grade,
                summative_average: None,
                midterm: None,
                term_grade,
            },
        }
    }

    fn growth_row(student_id: &str, from: f64, to: f64, expected: f64) -> GrowthRow {
        GrowthRow {
            student_id: student_id.to_string(),
            student_name: format!("Student {student_id}"),
            class_name: "4B".to_string(),
            subject: "Reading".to_string(),
            from_score: Some(from),
            to_score: Some(to),
            expected_growth: Some(expected),
            rapid_guessing_pct: None,
            subgoal_offset: None,
        }
    }

    #[test]
    fn severity_follows_expected_tiers() {
        assert_eq!(grade_severity(60.0, PERCENT_SCALE), None);
        assert_eq!(grade_severity(55.0, PERCENT_SCALE), Some(2));
        assert_eq!(grade_severity(45.0, PERCENT_SCALE), Some(3));
        assert_eq!(grade_severity(12.0, PERCENT_SCALE), Some(4));
    }

    #[test]
    fn kcfs_severity_scales_to_five_points() {
        assert_eq!(grade_severity(4.6, KCFS_SCALE), None);
        assert_eq!(grade_severity(3.0, KCFS_SCALE), None);
        assert_eq!(grade_severity(2.5, KCFS_SCALE), Some(2));
        assert_eq!(grade_severity(1.0, KCFS_SCALE), Some(4));
    }

    #[test]
    fn kcfs_grades_flag_against_their_own_pass_cut() {
        let mut excellent = graded("s1", Some(4.6));
        excellent.course = "KCFS".to_string();
        let mut failing = graded("s2", Some(2.5));
        failing.course = "KCFS".to_string();

        let flags = collect_flags(&[excellent, failing], &[]);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].student_id, "s2");
        assert_eq!(flags[0].kind, RiskKind::FailingGrade);
        assert_eq!(flags[0].severity, 2);
    }

    #[test]
    fn growth_flags_follow_the_unrounded_index() {
        // 0.796 displays as 0.80 yet stays below expectation
        let flags = collect_flags(&[], &[growth_row("s1", 200.0, 203.98, 5.0)]);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, RiskKind::BelowExpectedGrowth);
    }

    #[test]
    fn passing_and_ungraded_students_raise_nothing() {
        let flags = collect_flags(&[graded("s1", Some(75.0)), graded("s2", None)], &[]);
        assert!(flags.is_empty());
    }

    #[test]
    fn growth_rows_raise_growth_guessing_and_benchmark_flags() {
        let mut row = growth_row("s1", 200.0, 201.0, 5.0);
        row.rapid_guessing_pct = Some(34.0);
        row.subgoal_offset = Some(-9.5);
        let flags = collect_flags(&[], &[row, growth_row("s2", 200.0, 209.0, 5.0)]);

        let kinds: Vec<RiskKind> = flags.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RiskKind::BelowExpectedGrowth,
                RiskKind::RapidGuessing,
                RiskKind::LowBenchmark
            ]
        );
        assert!(flags.iter().all(|f| f.student_id == "s1"));
    }

    #[test]
    fn zero_expected_growth_is_not_flagged() {
        let flags = collect_flags(&[], &[growth_row("s1", 200.0, 198.0, 0.0)]);
        assert!(flags.is_empty());
    }

    #[test]
    fn scores_accumulate_by_student() {
        let grades = [graded("s1", Some(45.0)), graded("s2", Some(58.0))];
        let growth = [growth_row("s1", 200.0, 204.5, 5.0)];
        let flags = collect_flags(&grades, &growth);
        let scores = score_flags(&flags);

        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].student_id, "s1");
        assert_eq!(scores[0].flag_count, 2);
        let expected = 3.0 * 1.0 + 1.0 * 0.4;
        assert!((scores[0].score - expected).abs() < 0.001);
        assert!((scores[1].score - 2.0).abs() < 0.001);
    }
}
