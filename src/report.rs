use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::distribution::distribution_of;
use crate::grade::grade_students;
use crate::growth::growth_summary;
use crate::models::{
    valid_scores, GrowthRecord, GrowthRow, ScoreObservation, ScoreRow, StatisticsSummary,
};
use crate::risk;
use crate::stats::summarize_on_scale;
use crate::thresholds::{course_bands, course_scale, RAPID_GUESSING_BANDS};

/// Summary per course, ordered by course name. Pass and excellent rates use
/// each course's own grading scale.
pub fn summarize_by_course(rows: &[ScoreRow]) -> BTreeMap<String, StatisticsSummary> {
    let mut map: BTreeMap<String, Vec<ScoreObservation>> = BTreeMap::new();

    for row in rows {
        map.entry(row.course.clone()).or_default().push(row.observation());
    }

    map.into_iter()
        .map(|(course, observations)| {
            let summary = summarize_on_scale(&valid_scores(&observations), course_scale(&course));
            (course, summary)
        })
        .collect()
}

fn dash(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub fn build_report(
    scope: Option<&str>,
    generated_on: NaiveDate,
    scores: &[ScoreRow],
    growth: &[GrowthRow],
) -> String {
    let summaries = summarize_by_course(scores);
    let grades = grade_students(scores);
    let flags = risk::collect_flags(&grades, growth);
    let risks = risk::score_flags(&flags);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all classes");

    let _ = writeln!(output, "# Class Performance Report");
    let _ = writeln!(output, "Generated for {} on {}", scope_label, generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Course Summary");

    if summaries.is_empty() {
        let _ = writeln!(output, "No scores recorded.");
    } else {
        let _ = writeln!(
            output,
            "| Course | Count | Average | Median | Std Dev | Min | Max | Pass % | Excellent % |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|---|---|---|");
        for (course, summary) in summaries.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                course,
                summary.count,
                dash(summary.average),
                dash(summary.median),
                dash(summary.standard_deviation),
                dash(summary.min),
                dash(summary.max),
                dash(summary.pass_rate),
                dash(summary.excellent_rate)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Term Grade Bands");

    let mut by_course: BTreeMap<&str, Vec<ScoreObservation>> = BTreeMap::new();
    for grade in &grades {
        by_course
            .entry(grade.course.as_str())
            .or_default()
            .push(grade.grade.term_grade.into());
    }

    if by_course.is_empty() {
        let _ = writeln!(output, "No term grades available.");
    } else {
        for (course, observations) in by_course.iter() {
            let dist = distribution_of(observations, &course_bands(course));
            let _ = writeln!(output, "### {} (skewness {:.2})", course, dist.skewness);
            for bucket in dist.buckets.iter() {
                let _ = writeln!(
                    output,
                    "- {}: {} ({:.2}%)",
                    bucket.label, bucket.count, bucket.percentage
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## MAP Growth");

    if growth.is_empty() {
        let _ = writeln!(output, "No growth records for this window.");
    } else {
        let records: Vec<GrowthRecord> = growth.iter().map(GrowthRow::record).collect();
        let summary = growth_summary(&records);
        let _ = writeln!(
            output,
            "- {} of {} records have a growth index (mean {})",
            summary.indexed_count,
            summary.record_count,
            dash(summary.mean_growth_index)
        );
        let _ = writeln!(
            output,
            "- Met/Above Expected: {}, Near Expected: {}, Below Expected: {} ({}% met)",
            summary.met_count,
            summary.near_count,
            summary.below_count,
            dash(summary.met_rate)
        );

        let guessing: Vec<ScoreObservation> =
            growth.iter().map(|row| row.rapid_guessing_pct.into()).collect();
        let dist = distribution_of(&guessing, &RAPID_GUESSING_BANDS);
        if dist.buckets.iter().any(|b| b.count > 0) {
            let tiers: Vec<String> = dist
                .buckets
                .iter()
                .map(|b| format!("{} {}", b.label, b.count))
                .collect();
            let _ = writeln!(output, "- Rapid guessing: {}", tiers.join(", "));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students Needing Attention");

    if risks.is_empty() {
        let _ = writeln!(output, "No students flagged.");
    } else {
        for student in risks.iter().take(10) {
            let reasons: Vec<String> = flags
                .iter()
                .filter(|flag| flag.student_id == student.student_id)
                .map(|flag| format!("{} ({})", flag.kind.label(), flag.context))
                .collect();
            let _ = writeln!(
                output,
                "- {} ({}) score {:.2}: {}",
                student.student_name,
                student.class_name,
                student.score,
                reasons.join("; ")
            );
        }
    }

    output
}
