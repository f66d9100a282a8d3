use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use score_analytics::distribution::distribution_of;
use score_analytics::grade::grade_students;
use score_analytics::growth::growth_summary;
use score_analytics::import::{load_growth_rows, load_score_rows, select_observations};
use score_analytics::models::{valid_scores, GrowthRecord, GrowthRow, ScoreObservation};
use score_analytics::report;
use score_analytics::stats::{summarize_on_scale, threshold_rate};
use score_analytics::thresholds::{
    course_bands, course_scale, BandTable, KCFS_BANDS, LEXILE_BANDS, PERCENT_SCALE,
    RAPID_GUESSING_BANDS, SCORE_BANDS,
};

#[derive(Parser)]
#[command(name = "score-analytics")]
#[command(about = "Score statistics, growth and risk reporting for class dashboards", long_about = None)]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Score,
    Kcfs,
    Lexile,
    RapidGuessing,
}

impl Table {
    fn bands(self) -> BandTable {
        match self {
            Table::Score => SCORE_BANDS,
            Table::Kcfs => KCFS_BANDS,
            Table::Lexile => LEXILE_BANDS,
            Table::RapidGuessing => RAPID_GUESSING_BANDS,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Summary statistics for a score column
    Summary {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        course: Option<String>,
        /// Assessment code prefix, e.g. FA or SA
        #[arg(long)]
        code: Option<String>,
        #[arg(long, env = "SCORE_ANALYTICS_THRESHOLD", default_value_t = 75.0)]
        threshold: f64,
    },
    /// Banded distribution of scores, or of rapid guessing for a growth export
    Distribution {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum)]
        table: Option<Table>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        code: Option<String>,
    },
    /// Weighted term grade per student and course
    Grades {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Growth index and status per MAP growth record
    Growth {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        scores: PathBuf,
        #[arg(long)]
        growth: Option<PathBuf>,
        /// Label for the report header
        #[arg(long)]
        scope: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fmt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            csv,
            course,
            code,
            threshold,
        } => {
            let rows = load_score_rows(&csv)?;
            let observations = select_observations(&rows, course.as_deref(), code.as_deref());
            let values = valid_scores(&observations);
            let scale = course.as_deref().map_or(PERCENT_SCALE, course_scale);
            let summary = summarize_on_scale(&values, scale);
            let custom_rate = threshold_rate(&values, threshold);

            if cli.json {
                #[derive(Serialize)]
                #[serde(rename_all = "camelCase")]
                struct SummaryOutput<'a> {
                    #[serde(flatten)]
                    summary: &'a score_analytics::StatisticsSummary,
                    threshold: f64,
                    threshold_rate: Option<f64>,
                }
                return print_json(&SummaryOutput {
                    summary: &summary,
                    threshold,
                    threshold_rate: custom_rate,
                });
            }

            println!("Scores: {} valid of {}", summary.count, observations.len());
            println!("- average {}", fmt(summary.average));
            println!("- median {}", fmt(summary.median));
            println!("- std dev {}", fmt(summary.standard_deviation));
            println!("- min {} / max {}", fmt(summary.min), fmt(summary.max));
            println!("- pass rate {}%", fmt(summary.pass_rate));
            println!("- excellent rate {}%", fmt(summary.excellent_rate));
            println!("- at or above {threshold}: {}%", fmt(custom_rate));
        }
        Commands::Distribution {
            csv,
            table,
            course,
            code,
        } => {
            let (observations, bands): (Vec<ScoreObservation>, BandTable) = match table {
                Some(Table::RapidGuessing) => {
                    let rows = load_growth_rows(&csv)?;
                    let cells: Vec<ScoreObservation> =
                        rows.iter().map(|row| row.rapid_guessing_pct.into()).collect();
                    (cells, RAPID_GUESSING_BANDS)
                }
                other => {
                    let rows = load_score_rows(&csv)?;
                    let cells = select_observations(&rows, course.as_deref(), code.as_deref());
                    let bands = other.map_or_else(
                        || course_bands(course.as_deref().unwrap_or_default()),
                        Table::bands,
                    );
                    (cells, bands)
                }
            };
            let dist = distribution_of(&observations, &bands);

            if cli.json {
                return print_json(&dist);
            }

            println!("{} bands across {} observations:", dist.table, dist.total);
            for bucket in dist.buckets.iter() {
                println!("- {}: {} ({:.2}%)", bucket.label, bucket.count, bucket.percentage);
            }
            println!(
                "mean {}, median {}, std dev {}, skewness {:.2}",
                fmt(dist.mean),
                fmt(dist.median),
                fmt(dist.standard_deviation),
                dist.skewness
            );
        }
        Commands::Grades { csv, limit } => {
            let rows = load_score_rows(&csv)?;
            let grades = grade_students(&rows);

            if cli.json {
                return print_json(&grades);
            }

            if grades.is_empty() {
                println!("No assessments found.");
                return Ok(());
            }

            println!("Term grades (FA 15%, SA 20%, Midterm 10%):");
            for student in grades.iter().take(limit) {
                println!(
                    "- {} ({}, {}) FA {} SA {} Mid {} => {}",
                    student.student_name,
                    student.class_name,
                    student.course,
                    fmt(student.grade.formative_average),
                    fmt(student.grade.summative_average),
                    fmt(student.grade.midterm),
                    fmt(student.grade.term_grade)
                );
            }
        }
        Commands::Growth { csv } => {
            let rows = load_growth_rows(&csv)?;
            let records: Vec<GrowthRecord> = rows.iter().map(GrowthRow::record).collect();
            let summary = growth_summary(&records);

            if cli.json {
                #[derive(Serialize)]
                struct GrowthOutput<'a> {
                    summary: score_analytics::models::GrowthSummary,
                    records: Vec<(&'a str, &'a str, score_analytics::models::GrowthOutcome)>,
                }
                let records = rows
                    .iter()
                    .map(|row| {
                        (
                            row.student_id.as_str(),
                            row.subject.as_str(),
                            row.record().outcome(),
                        )
                    })
                    .collect();
                return print_json(&GrowthOutput { summary, records });
            }

            for row in rows.iter() {
                let outcome = row.record().outcome();
                println!(
                    "- {} ({}) {}: growth {} index {} {}",
                    row.student_name,
                    row.class_name,
                    row.subject,
                    fmt(outcome.actual_growth),
                    fmt(outcome.growth_index),
                    outcome.status.map_or("no index", |s| s.label())
                );
            }
            println!(
                "{} of {} met expected growth ({}%), mean index {}",
                summary.met_count,
                summary.indexed_count,
                fmt(summary.met_rate),
                fmt(summary.mean_growth_index)
            );
        }
        Commands::Report {
            scores,
            growth,
            scope,
            out,
        } => {
            let score_rows = load_score_rows(&scores)?;
            let growth_rows = match growth {
                Some(path) => load_growth_rows(&path)?,
                None => Vec::new(),
            };
            let report = report::build_report(
                scope.as_deref(),
                Utc::now().date_naive(),
                &score_rows,
                &growth_rows,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            log::info!("report written to {}", out.display());
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
