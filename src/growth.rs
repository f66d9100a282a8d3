use crate::models::{
    BenchmarkTransition, GrowthOutcome, GrowthRecord, GrowthStatus, GrowthSummary, QuintileLabel,
};
use crate::stats::{raw_mean, round2};
use crate::thresholds::{
    GROWTH_MET, GROWTH_NEAR, QUINTILE_HIGH, QUINTILE_HI_AVG, QUINTILE_LOW, QUINTILE_LO_AVG,
};

pub fn actual_growth(from_score: Option<f64>, to_score: Option<f64>) -> Option<f64> {
    Some(round2(to_score? - from_score?))
}

/// Unrounded actual growth divided by expected growth.
///
/// `None` when either score is missing, or when expected growth is missing or
/// exactly zero.
pub fn raw_growth_index(
    from_score: Option<f64>,
    to_score: Option<f64>,
    expected_growth: Option<f64>,
) -> Option<f64> {
    let expected = expected_growth.filter(|e| *e != 0.0 && e.is_finite())?;
    let actual = to_score? - from_score?;
    let index = actual / expected;
    index.is_finite().then_some(index)
}

/// [`raw_growth_index`] rounded for display. Classify with the raw value.
pub fn growth_index(
    from_score: Option<f64>,
    to_score: Option<f64>,
    expected_growth: Option<f64>,
) -> Option<f64> {
    raw_growth_index(from_score, to_score, expected_growth).map(round2)
}

pub fn growth_status(index: f64) -> GrowthStatus {
    if index >= GROWTH_MET {
        GrowthStatus::MetExpected
    } else if index >= GROWTH_NEAR {
        GrowthStatus::NearExpected
    } else {
        GrowthStatus::BelowExpected
    }
}

impl GrowthRecord {
    pub fn new(from_score: f64, to_score: f64, expected_growth: f64) -> Self {
        Self {
            from_score: Some(from_score),
            to_score: Some(to_score),
            expected_growth: Some(expected_growth),
        }
    }

    pub fn raw_index(&self) -> Option<f64> {
        raw_growth_index(self.from_score, self.to_score, self.expected_growth)
    }

    pub fn outcome(&self) -> GrowthOutcome {
        let raw = self.raw_index();
        GrowthOutcome {
            actual_growth: actual_growth(self.from_score, self.to_score),
            growth_index: raw.map(round2),
            status: raw.map(growth_status),
        }
    }
}

/// Class-level roll-up. Records without a computable index count toward
/// `record_count` only.
pub fn growth_summary(records: &[GrowthRecord]) -> GrowthSummary {
    let indices: Vec<f64> = records
        .iter()
        .filter_map(GrowthRecord::raw_index)
        .collect();

    let mut met_count = 0;
    let mut near_count = 0;
    let mut below_count = 0;
    for index in &indices {
        match growth_status(*index) {
            GrowthStatus::MetExpected => met_count += 1,
            GrowthStatus::NearExpected => near_count += 1,
            GrowthStatus::BelowExpected => below_count += 1,
        }
    }

    let met_rate = if indices.is_empty() {
        None
    } else {
        Some(round2(met_count as f64 / indices.len() as f64 * 100.0))
    };

    GrowthSummary {
        record_count: records.len(),
        indexed_count: indices.len(),
        mean_growth_index: raw_mean(&indices).map(round2),
        met_count,
        near_count,
        below_count,
        met_rate,
    }
}

/// Benchmark label for a sub-score's offset from its reference average.
///
/// Fixed cut points stand in for a percentile rank.
pub fn quintile_label(offset: f64) -> QuintileLabel {
    if offset >= QUINTILE_HIGH {
        QuintileLabel::High
    } else if offset >= QUINTILE_HI_AVG {
        QuintileLabel::HiAvg
    } else if offset <= QUINTILE_LOW {
        QuintileLabel::Low
    } else if offset <= QUINTILE_LO_AVG {
        QuintileLabel::LoAvg
    } else {
        QuintileLabel::Avg
    }
}

pub fn quintile_for(sub_score: Option<f64>, reference_average: Option<f64>) -> Option<QuintileLabel> {
    let offset = sub_score? - reference_average?;
    offset.is_finite().then(|| quintile_label(offset))
}

pub fn benchmark_transition(from: QuintileLabel, to: QuintileLabel) -> BenchmarkTransition {
    let moved = to.rank() - from.rank();
    match moved {
        0 => BenchmarkTransition::Stable,
        n if n > 0 => BenchmarkTransition::Improved(n),
        n => BenchmarkTransition::Declined(-n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn met_expected_growth_is_index_one() {
        let index = growth_index(Some(200.0), Some(205.0), Some(5.0));
        assert_eq!(index, Some(1.0));
        assert_eq!(growth_status(1.0), GrowthStatus::MetExpected);
    }

    #[test]
    fn zero_expected_growth_has_no_index() {
        assert_eq!(growth_index(Some(200.0), Some(202.0), Some(0.0)), None);
        assert_eq!(growth_index(Some(200.0), Some(202.0), Some(-0.0)), None);
        assert_eq!(growth_index(Some(200.0), Some(202.0), None), None);
    }

    #[test]
    fn missing_scores_have_no_index() {
        assert_eq!(growth_index(None, Some(202.0), Some(4.0)), None);
        assert_eq!(growth_index(Some(200.0), None, Some(4.0)), None);
        assert_eq!(actual_growth(Some(200.0), None), None);
    }

    #[test]
    fn negative_growth_is_below_expected() {
        let record = GrowthRecord::new(210.0, 206.0, 5.0);
        let outcome = record.outcome();
        assert_eq!(outcome.actual_growth, Some(-4.0));
        assert_eq!(outcome.growth_index, Some(-0.8));
        assert_eq!(outcome.status, Some(GrowthStatus::BelowExpected));
    }

    #[test]
    fn status_thresholds_are_inclusive() {
        assert_eq!(growth_status(1.25), GrowthStatus::MetExpected);
        assert_eq!(growth_status(0.99), GrowthStatus::NearExpected);
        assert_eq!(growth_status(0.8), GrowthStatus::NearExpected);
        assert_eq!(growth_status(0.79), GrowthStatus::BelowExpected);
    }

    #[test]
    fn status_uses_the_unrounded_index() {
        // 3.98 / 5 = 0.796 displays as 0.8 but is still below expectation
        let below = GrowthRecord::new(200.0, 203.98, 5.0).outcome();
        assert_eq!(below.growth_index, Some(0.8));
        assert_eq!(below.status, Some(GrowthStatus::BelowExpected));

        // 4.98 / 5 = 0.996 displays as 1.0 but has not met expectation
        let near = GrowthRecord::new(200.0, 204.98, 5.0).outcome();
        assert_eq!(near.growth_index, Some(1.0));
        assert_eq!(near.status, Some(GrowthStatus::NearExpected));

        let summary = growth_summary(&[
            GrowthRecord::new(200.0, 203.98, 5.0),
            GrowthRecord::new(200.0, 204.98, 5.0),
        ]);
        assert_eq!(summary.met_count, 0);
        assert_eq!(summary.near_count, 1);
        assert_eq!(summary.below_count, 1);
    }

    #[test]
    fn near_zero_expected_growth_still_divides() {
        let index = growth_index(Some(200.0), Some(201.0), Some(0.5));
        assert_eq!(index, Some(2.0));
    }

    #[test]
    fn summary_counts_each_status() {
        let records = vec![
            GrowthRecord::new(200.0, 206.0, 5.0),
            GrowthRecord::new(190.0, 194.5, 5.0),
            GrowthRecord::new(180.0, 181.0, 5.0),
            GrowthRecord::new(180.0, 181.0, 0.0),
        ];
        let summary = growth_summary(&records);

        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.indexed_count, 3);
        assert_eq!(summary.met_count, 1);
        assert_eq!(summary.near_count, 1);
        assert_eq!(summary.below_count, 1);
        assert_eq!(summary.met_rate, Some(33.33));
        // (1.2 + 0.9 + 0.2) / 3
        assert_eq!(summary.mean_growth_index, Some(0.77));
    }

    #[test]
    fn empty_summary_has_no_rates() {
        let summary = growth_summary(&[]);
        assert_eq!(summary.indexed_count, 0);
        assert_eq!(summary.mean_growth_index, None);
        assert_eq!(summary.met_rate, None);
    }

    #[test]
    fn quintile_cut_points() {
        assert_eq!(quintile_label(12.0), QuintileLabel::High);
        assert_eq!(quintile_label(8.0), QuintileLabel::High);
        assert_eq!(quintile_label(7.9), QuintileLabel::HiAvg);
        assert_eq!(quintile_label(3.0), QuintileLabel::HiAvg);
        assert_eq!(quintile_label(2.9), QuintileLabel::Avg);
        assert_eq!(quintile_label(0.0), QuintileLabel::Avg);
        assert_eq!(quintile_label(-2.9), QuintileLabel::Avg);
        assert_eq!(quintile_label(-3.0), QuintileLabel::LoAvg);
        assert_eq!(quintile_label(-7.9), QuintileLabel::LoAvg);
        assert_eq!(quintile_label(-8.0), QuintileLabel::Low);
    }

    #[test]
    fn quintile_needs_both_scores() {
        assert_eq!(quintile_for(Some(214.0), Some(205.0)), Some(QuintileLabel::High));
        assert_eq!(quintile_for(None, Some(205.0)), None);
    }

    #[test]
    fn transitions_report_levels_moved() {
        assert_eq!(
            benchmark_transition(QuintileLabel::LoAvg, QuintileLabel::HiAvg),
            BenchmarkTransition::Improved(2)
        );
        assert_eq!(
            benchmark_transition(QuintileLabel::High, QuintileLabel::Low),
            BenchmarkTransition::Declined(4)
        );
        assert_eq!(
            benchmark_transition(QuintileLabel::Avg, QuintileLabel::Avg),
            BenchmarkTransition::Stable
        );
    }
}
