//! Cut points and band tables shared by every calculation.
//!
//! Anything that classifies a score against a fixed boundary reads it from
//! here, so charts, reports and risk flags all agree on the same edges.

pub const PASS_THRESHOLD: f64 = 60.0;
pub const EXCELLENT_THRESHOLD: f64 = 90.0;

/// Pass and excellent cuts for one grading scale, with its top score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeScale {
    pub pass: f64,
    pub excellent: f64,
    pub max: f64,
}

pub const PERCENT_SCALE: GradeScale = GradeScale {
    pass: PASS_THRESHOLD,
    excellent: EXCELLENT_THRESHOLD,
    max: 100.0,
};

/// Cuts match the `Pass` and `Excellent` bands of [`KCFS_BANDS`].
pub const KCFS_SCALE: GradeScale = GradeScale {
    pass: 3.0,
    excellent: 4.5,
    max: 5.0,
};

pub const FORMATIVE_WEIGHT: f64 = 0.15;
pub const SUMMATIVE_WEIGHT: f64 = 0.20;
pub const MIDTERM_WEIGHT: f64 = 0.10;

/// Growth index at or above this met expectation.
pub const GROWTH_MET: f64 = 1.0;
/// Growth index at or above this (and below [`GROWTH_MET`]) is near expectation.
pub const GROWTH_NEAR: f64 = 0.8;

// Offsets from the reference average. Approximates percentile rank, not a
// true quintile.
pub const QUINTILE_HIGH: f64 = 8.0;
pub const QUINTILE_HI_AVG: f64 = 3.0;
pub const QUINTILE_LO_AVG: f64 = -3.0;
pub const QUINTILE_LOW: f64 = -8.0;

pub const RAPID_GUESSING_CAUTION: f64 = 15.0;
pub const RAPID_GUESSING_FLAGGED: f64 = 30.0;

/// Which end of each band is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// `[min, max)`, with the highest band closed at both ends.
    LowerClosed,
    /// `(min, max]`, with the lowest band closed at both ends.
    UpperClosed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

/// A fixed partition of a metric's range. Bands are listed lowest first and
/// are contiguous: each band's `max` is the next band's `min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandTable {
    pub name: &'static str,
    pub edge: Edge,
    pub bands: &'static [Band],
}

impl BandTable {
    /// Index of the band holding `value`, or `None` outside the table's range.
    pub fn locate(&self, value: f64) -> Option<usize> {
        let last = self.bands.len().checked_sub(1)?;
        self.bands.iter().enumerate().find_map(|(idx, band)| {
            let inside = match self.edge {
                Edge::LowerClosed => {
                    value >= band.min && (value < band.max || (idx == last && value <= band.max))
                }
                Edge::UpperClosed => {
                    value <= band.max && (value > band.min || (idx == 0 && value >= band.min))
                }
            };
            inside.then_some(idx)
        })
    }

    pub fn label_for(&self, value: f64) -> Option<&'static str> {
        self.locate(value).map(|idx| self.bands[idx].label)
    }
}

pub const SCORE_BANDS: BandTable = BandTable {
    name: "score",
    edge: Edge::LowerClosed,
    bands: &[
        Band { label: "Below Standard (0-59)", min: 0.0, max: 60.0 },
        Band { label: "Needs Improvement (60-69)", min: 60.0, max: 70.0 },
        Band { label: "Satisfactory (70-79)", min: 70.0, max: 80.0 },
        Band { label: "Good (80-89)", min: 80.0, max: 90.0 },
        Band { label: "Excellent (90-100)", min: 90.0, max: 100.0 },
    ],
};

/// KCFS is graded on a 0-5 scale instead of 0-100.
pub const KCFS_BANDS: BandTable = BandTable {
    name: "kcfs",
    edge: Edge::LowerClosed,
    bands: &[
        Band { label: "Below Standard (0-2.99)", min: 0.0, max: 3.0 },
        Band { label: "Pass (3-3.49)", min: 3.0, max: 3.5 },
        Band { label: "Satisfactory (3.5-3.99)", min: 3.5, max: 4.0 },
        Band { label: "Good (4-4.49)", min: 4.0, max: 4.5 },
        Band { label: "Excellent (4.5-5)", min: 4.5, max: 5.0 },
    ],
};

pub const LEXILE_BANDS: BandTable = BandTable {
    name: "lexile",
    edge: Edge::LowerClosed,
    bands: &[
        Band { label: "BR (below 0L)", min: f64::NEG_INFINITY, max: 0.0 },
        Band { label: "0L-199L", min: 0.0, max: 200.0 },
        Band { label: "200L-399L", min: 200.0, max: 400.0 },
        Band { label: "400L-599L", min: 400.0, max: 600.0 },
        Band { label: "600L-799L", min: 600.0, max: 800.0 },
        Band { label: "800L-999L", min: 800.0, max: 1000.0 },
        Band { label: "1000L+", min: 1000.0, max: f64::INFINITY },
    ],
};

pub const RAPID_GUESSING_BANDS: BandTable = BandTable {
    name: "rapid-guessing",
    edge: Edge::UpperClosed,
    bands: &[
        Band { label: "Normal", min: 0.0, max: RAPID_GUESSING_CAUTION },
        Band { label: "Caution", min: RAPID_GUESSING_CAUTION, max: RAPID_GUESSING_FLAGGED },
        Band { label: "Flagged", min: RAPID_GUESSING_FLAGGED, max: 100.0 },
    ],
};

fn is_kcfs(course: &str) -> bool {
    course.trim().eq_ignore_ascii_case("kcfs")
}

/// Course-type aware choice of grade bands.
pub fn course_bands(course: &str) -> BandTable {
    if is_kcfs(course) {
        KCFS_BANDS
    } else {
        SCORE_BANDS
    }
}

pub fn course_scale(course: &str) -> GradeScale {
    if is_kcfs(course) {
        KCFS_SCALE
    } else {
        PERCENT_SCALE
    }
}
