//! Score analytics for a primary-school learning-management system.
//!
//! Pure calculations over assessment scores: summary statistics, threshold
//! rates, weighted term grades, MAP growth indices, benchmark quintiles,
//! banded distributions and per-student risk flags. Nothing here performs I/O
//! except [`import`], which reads CSV exports for the command-line tool.

pub mod distribution;
pub mod grade;
pub mod growth;
pub mod import;
pub mod models;
pub mod report;
pub mod risk;
pub mod stats;
pub mod thresholds;

pub use models::{ScoreObservation, StatisticsSummary};
