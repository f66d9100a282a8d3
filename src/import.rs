use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::models::{count_excluded, GrowthRow, ScoreObservation, ScoreRow};

fn read_rows<T, R>(reader: R, source: &str) -> anyhow::Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (line, result) in reader.deserialize::<T>().enumerate() {
        let row = result.with_context(|| format!("{source}: bad record {}", line + 1))?;
        rows.push(row);
    }

    log::info!("loaded {} rows from {}", rows.len(), source);
    Ok(rows)
}

pub fn read_score_rows<R: Read>(reader: R, source: &str) -> anyhow::Result<Vec<ScoreRow>> {
    let rows: Vec<ScoreRow> = read_rows(reader, source)?;
    let observations: Vec<ScoreObservation> = rows.iter().map(ScoreRow::observation).collect();
    let excluded = count_excluded(&observations);
    if excluded > 0 {
        log::warn!("{source}: {excluded} score cells excluded as absent or non-numeric");
    }
    Ok(rows)
}

pub fn read_growth_rows<R: Read>(reader: R, source: &str) -> anyhow::Result<Vec<GrowthRow>> {
    let rows: Vec<GrowthRow> = read_rows(reader, source)?;
    let unindexed = rows
        .iter()
        .filter(|row| row.record().outcome().growth_index.is_none())
        .count();
    if unindexed > 0 {
        log::warn!("{source}: {unindexed} growth rows have no computable growth index");
    }
    Ok(rows)
}

pub fn load_score_rows(path: &Path) -> anyhow::Result<Vec<ScoreRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_score_rows(file, &path.display().to_string())
}

pub fn load_growth_rows(path: &Path) -> anyhow::Result<Vec<GrowthRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_growth_rows(file, &path.display().to_string())
}

/// Selects score cells for one course and/or assessment code prefix.
pub fn select_observations(
    rows: &[ScoreRow],
    course: Option<&str>,
    code_prefix: Option<&str>,
) -> Vec<ScoreObservation> {
    rows.iter()
        .filter(|row| course.map_or(true, |c| row.course.eq_ignore_ascii_case(c)))
        .filter(|row| {
            code_prefix.map_or(true, |p| {
                row.code.to_ascii_uppercase().starts_with(&p.to_ascii_uppercase())
            })
        })
        .map(ScoreRow::observation)
        .collect()
}
