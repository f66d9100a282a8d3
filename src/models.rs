use serde::{Deserialize, Serialize};

/// Raw cell values that mark an assessment as not taken.
pub const EXCLUSION_MARKERS: [&str; 6] = ["X", "-", "N/A", "缺考", "absent", ""];

/// One assessment result as it arrives from a spreadsheet-like export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreObservation {
    Number(f64),
    Text(String),
    Missing,
}

impl ScoreObservation {
    /// The numeric value when this observation counts as a valid score.
    ///
    /// Zero is a real score. Exclusion markers, blank cells, non-numeric text
    /// and non-finite numbers are not.
    pub fn value(&self) -> Option<f64> {
        match self {
            ScoreObservation::Number(value) if value.is_finite() => Some(*value),
            ScoreObservation::Number(_) | ScoreObservation::Missing => None,
            ScoreObservation::Text(text) => {
                let trimmed = text.trim();
                if is_exclusion_marker(trimmed) {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.value().is_some()
    }
}

impl From<f64> for ScoreObservation {
    fn from(value: f64) -> Self {
        ScoreObservation::Number(value)
    }
}

impl From<Option<f64>> for ScoreObservation {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ScoreObservation::Missing, ScoreObservation::Number)
    }
}

impl From<&str> for ScoreObservation {
    fn from(cell: &str) -> Self {
        ScoreObservation::Text(cell.to_string())
    }
}

fn is_exclusion_marker(cell: &str) -> bool {
    EXCLUSION_MARKERS
        .iter()
        .any(|marker| marker.eq_ignore_ascii_case(cell))
}

/// Keeps the valid scores, in input order.
pub fn valid_scores(observations: &[ScoreObservation]) -> Vec<f64> {
    observations.iter().filter_map(ScoreObservation::value).collect()
}

/// Number of observations dropped by the validity rule.
pub fn count_excluded(observations: &[ScoreObservation]) -> usize {
    observations.iter().filter(|obs| !obs.is_valid()).count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicStatistics {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub count: usize,
    pub average: Option<f64>,
    pub median: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pass_rate: Option<f64>,
    pub excellent_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedGrade {
    pub formative_average: Option<f64>,
    pub summative_average: Option<f64>,
    pub midterm: Option<f64>,
    pub term_grade: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRecord {
    pub from_score: Option<f64>,
    pub to_score: Option<f64>,
    pub expected_growth: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GrowthStatus {
    MetExpected,
    NearExpected,
    BelowExpected,
}

impl GrowthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GrowthStatus::MetExpected => "Met/Above Expected",
            GrowthStatus::NearExpected => "Near Expected",
            GrowthStatus::BelowExpected => "Below Expected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthOutcome {
    pub actual_growth: Option<f64>,
    pub growth_index: Option<f64>,
    pub status: Option<GrowthStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSummary {
    pub record_count: usize,
    pub indexed_count: usize,
    pub mean_growth_index: Option<f64>,
    pub met_count: usize,
    pub near_count: usize,
    pub below_count: usize,
    pub met_rate: Option<f64>,
}

/// Five-level benchmark label, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QuintileLabel {
    Low,
    LoAvg,
    Avg,
    HiAvg,
    High,
}

impl QuintileLabel {
    pub fn rank(&self) -> i32 {
        match self {
            QuintileLabel::Low => 1,
            QuintileLabel::LoAvg => 2,
            QuintileLabel::Avg => 3,
            QuintileLabel::HiAvg => 4,
            QuintileLabel::High => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "direction", content = "levels")]
pub enum BenchmarkTransition {
    Improved(i32),
    Stable,
    Declined(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub table: String,
    pub total: usize,
    pub buckets: Vec<DistributionBucket>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub skewness: f64,
}

/// One row of the long-format course assessment export.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRow {
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,
    pub course: String,
    pub code: String,
    pub score: String,
}

impl ScoreRow {
    pub fn observation(&self) -> ScoreObservation {
        ScoreObservation::from(self.score.as_str())
    }
}

/// One student/subject term pair from the MAP growth export.
#[derive(Debug, Clone, Deserialize)]
pub struct GrowthRow {
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,
    pub subject: String,
    pub from_score: Option<f64>,
    pub to_score: Option<f64>,
    pub expected_growth: Option<f64>,
    #[serde(default)]
    pub rapid_guessing_pct: Option<f64>,
    #[serde(default)]
    pub subgoal_offset: Option<f64>,
}

impl GrowthRow {
    pub fn record(&self) -> GrowthRecord {
        GrowthRecord {
            from_score: self.from_score,
            to_score: self.to_score,
            expected_growth: self.expected_growth,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGrade {
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,
    pub course: String,
    pub grade: WeightedGrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskKind {
    FailingGrade,
    BelowExpectedGrowth,
    NearExpectedGrowth,
    RapidGuessing,
    LowBenchmark,
}

impl RiskKind {
    pub fn label(&self) -> &'static str {
        match self {
            RiskKind::FailingGrade => "failing term grade",
            RiskKind::BelowExpectedGrowth => "below expected growth",
            RiskKind::NearExpectedGrowth => "near expected growth",
            RiskKind::RapidGuessing => "rapid guessing",
            RiskKind::LowBenchmark => "low benchmark",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlag {
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,
    pub kind: RiskKind,
    pub context: String,
    pub severity: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRisk {
    pub student_name: String,
    pub student_id: String,
    pub class_name: String,
    pub score: f64,
    pub flag_count: usize,
}
