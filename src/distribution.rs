use crate::models::{valid_scores, Distribution, DistributionBucket, ScoreObservation};
use crate::stats::{raw_mean, raw_standard_deviation, round2};
use crate::thresholds::BandTable;

/// Mean of the standardized third powers. Zero for empty input or when every
/// value is identical.
pub fn skewness(values: &[f64]) -> f64 {
    let (Some(mean), Some(sd)) = (raw_mean(values), raw_standard_deviation(values)) else {
        return 0.0;
    };
    if sd == 0.0 {
        return 0.0;
    }
    let cubed: f64 = values.iter().map(|v| ((v - mean) / sd).powi(3)).sum();
    round2(cubed / values.len() as f64)
}

/// Buckets `values` by `table`, with percentages of `values.len()`.
///
/// Values outside the table's range still count toward `total` but land in no
/// bucket, so bucket counts can sum to less than `total`.
pub fn distribution(values: &[f64], table: &BandTable) -> Distribution {
    bucketize(values, values.len(), table)
}

/// Buckets the valid scores, with percentages of every observation supplied,
/// excluded cells included.
pub fn distribution_of(observations: &[ScoreObservation], table: &BandTable) -> Distribution {
    bucketize(&valid_scores(observations), observations.len(), table)
}

fn bucketize(values: &[f64], total: usize, table: &BandTable) -> Distribution {
    let mut counts = vec![0usize; table.bands.len()];
    for value in values {
        if let Some(idx) = table.locate(*value) {
            counts[idx] += 1;
        }
    }

    let buckets = table
        .bands
        .iter()
        .zip(counts)
        .map(|(band, count)| DistributionBucket {
            label: band.label.to_string(),
            min: band.min,
            max: band.max,
            count,
            percentage: if total == 0 {
                0.0
            } else {
                round2(count as f64 / total as f64 * 100.0)
            },
        })
        .collect();

    Distribution {
        table: table.name.to_string(),
        total,
        buckets,
        mean: crate::stats::mean(values),
        median: crate::stats::median(values),
        standard_deviation: crate::stats::standard_deviation(values),
        skewness: skewness(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize_values;
    use crate::thresholds::{Band, Edge, KCFS_BANDS, LEXILE_BANDS, RAPID_GUESSING_BANDS, SCORE_BANDS};

    fn counts(dist: &Distribution) -> Vec<usize> {
        dist.buckets.iter().map(|b| b.count).collect()
    }

    #[test]
    fn symmetric_data_has_no_skew() {
        assert!(skewness(&[10.0, 20.0, 30.0, 40.0, 50.0]).abs() < 1e-9);
    }

    #[test]
    fn skewness_guards_flat_and_empty_input() {
        assert_eq!(skewness(&[]), 0.0);
        assert_eq!(skewness(&[70.0]), 0.0);
        assert_eq!(skewness(&[70.0, 70.0, 70.0]), 0.0);
    }

    #[test]
    fn long_right_tail_is_positive() {
        assert!(skewness(&[1.0, 1.0, 1.0, 2.0, 10.0]) > 0.0);
        assert!(skewness(&[90.0, 92.0, 95.0, 95.0, 20.0]) < 0.0);
    }

    #[test]
    fn skewness_matches_hand_computed_value() {
        // mean 3, population sd sqrt(12.4), sum of cubed deviations 318
        assert_eq!(skewness(&[1.0, 1.0, 1.0, 2.0, 10.0]), 1.46);
        assert_eq!(skewness(&[10.0, 2.0, 1.0, 1.0, 1.0]), 1.46);
        assert_eq!(skewness(&[9.0, 9.0, 9.0, 8.0, 0.0]), -1.46);
    }

    #[test]
    fn near_symmetric_skew_prints_without_sign() {
        let skew = skewness(&[0.1, 0.2, 0.3]);
        assert!(skew.is_sign_positive());
        assert_eq!(format!("{skew:.2}"), "0.00");
    }

    #[test]
    fn score_bands_report_every_bucket() {
        let values = [95.0, 91.0, 85.0, 72.0, 40.0];
        let dist = distribution(&values, &SCORE_BANDS);

        assert_eq!(dist.buckets.len(), 5);
        assert_eq!(counts(&dist), vec![1, 0, 1, 1, 2]);
        assert_eq!(dist.buckets[1].percentage, 0.0);
        assert_eq!(dist.buckets[4].percentage, 40.0);
        assert_eq!(dist.mean, Some(76.6));
        assert_eq!(dist.median, Some(85.0));
    }

    #[test]
    fn percentages_use_every_supplied_observation() {
        let observations = vec![
            ScoreObservation::from(95.0),
            ScoreObservation::from("absent"),
            ScoreObservation::from(55.0),
            ScoreObservation::Missing,
        ];
        let dist = distribution_of(&observations, &SCORE_BANDS);

        assert_eq!(dist.total, 4);
        assert_eq!(dist.buckets[0].percentage, 25.0);
        assert_eq!(dist.buckets[4].percentage, 25.0);
    }

    #[test]
    fn empty_input_gives_zero_buckets() {
        let dist = distribution(&[], &KCFS_BANDS);
        assert_eq!(dist.total, 0);
        assert!(dist.buckets.iter().all(|b| b.count == 0 && b.percentage == 0.0));
        assert_eq!(dist.mean, None);
        assert_eq!(dist.skewness, 0.0);
    }

    #[test]
    fn rapid_guessing_tiers() {
        let dist = distribution(&[0.0, 10.0, 15.0, 22.0, 30.0, 45.0], &RAPID_GUESSING_BANDS);
        assert_eq!(counts(&dist), vec![3, 2, 1]);
    }

    #[test]
    fn lexile_bands_include_beginning_readers() {
        let dist = distribution(&[-50.0, 150.0, 420.0, 880.0, 1100.0], &LEXILE_BANDS);
        assert_eq!(counts(&dist), vec![1, 1, 0, 1, 0, 1, 1]);
    }

    #[test]
    fn lexile_extremes_land_in_the_open_bands() {
        let values = [2050.0, -2500.0, 900.0];
        let dist = distribution(&values, &LEXILE_BANDS);
        assert_eq!(counts(&dist).iter().sum::<usize>(), values.len());
        assert_eq!(dist.buckets[0].count, 1);
        assert_eq!(dist.buckets[6].count, 1);
    }

    #[test]
    fn out_of_range_scores_count_in_total_only() {
        let dist = distribution(&[105.0, 50.0], &SCORE_BANDS);
        assert_eq!(dist.total, 2);
        assert_eq!(counts(&dist).iter().sum::<usize>(), 1);
        assert_eq!(dist.buckets[0].percentage, 50.0);
    }

    #[test]
    fn summary_range_bounds_every_value() {
        let values = [12.346, 50.0, 80.004];
        let summary = summarize_values(&values);
        let (lo, hi) = (summary.min.unwrap(), summary.max.unwrap());
        let bands: &'static [Band] =
            Box::leak(vec![Band { label: "all", min: lo, max: hi }].into_boxed_slice());
        let table = BandTable { name: "range", edge: Edge::LowerClosed, bands };

        assert!(values.iter().all(|v| lo <= *v && *v <= hi));
        assert_eq!(counts(&distribution(&values, &table)), vec![3]);
    }

    #[test]
    fn covering_table_places_each_value_once() {
        let values = [63.0, 12.5, 99.0, 47.0, 81.25, 63.0, 70.0];
        let summary = summarize_values(&values);
        let (lo, hi) = (summary.min.unwrap(), summary.max.unwrap());
        let mid = (lo + hi) / 2.0;
        let bands: &'static [Band] = Box::leak(
            vec![
                Band { label: "lower", min: lo, max: mid },
                Band { label: "upper", min: mid, max: hi },
            ]
            .into_boxed_slice(),
        );
        let table = BandTable { name: "span", edge: Edge::LowerClosed, bands };

        for value in values {
            assert!(table.locate(value).is_some(), "{value} fell outside every band");
        }
        let dist = distribution(&values, &table);
        assert_eq!(dist.buckets.iter().map(|b| b.count).sum::<usize>(), summary.count);
    }
}
