use crate::model::{ExclusionSet, Provider, Schedule};
use anyhow::Context;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ligne d'exclusion refusée (non fatale : la ligne est ignorée).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("empty provider name")]
    EmptyProvider,
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("end date {end} is before start date {start}")]
    ReversedRange { start: NaiveDate, end: NaiveDate },
    #[error("unreadable row: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Numéro de ligne dans le fichier (en-tête = 1), quand il est connu.
    pub line: Option<u64>,
    pub error: ParseError,
}

/// Résultat d'un import : les exclusions valides et les lignes écartées.
#[derive(Debug, Clone, Default)]
pub struct ExclusionImport {
    pub exclusions: ExclusionSet,
    pub skipped: Vec<SkippedRow>,
}

/// Roster saisi comme texte libre, un nom par ligne.
/// Les blancs sont retirés, les lignes vides ignorées, les doublons supprimés.
pub fn parse_providers(text: &str) -> Vec<Provider> {
    let mut seen = BTreeSet::new();
    text.lines()
        .map(str::trim)
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(Provider::new)
        .collect()
}

/// Import d'exclusions depuis un CSV: header `Provider, Start Date, End Date`
pub fn import_exclusions_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<ExclusionImport> {
    let path = path.as_ref();
    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let import = read_exclusions(file);
    for row in &import.skipped {
        tracing::warn!(file = %path.display(), line = ?row.line, "skipped row: {}", row.error);
    }
    Ok(import)
}

/// Exclusions fusionnées de plusieurs fichiers (congés + admin).
#[derive(Debug, Clone, Default)]
pub struct MergedExclusions {
    pub exclusions: ExclusionSet,
    /// Fichiers ayant des lignes écartées, avec leur nombre.
    pub skipped: Vec<(PathBuf, usize)>,
}

impl MergedExclusions {
    pub fn skipped_rows(&self) -> usize {
        self.skipped.iter().map(|(_, n)| n).sum()
    }
}

/// Importe et fusionne chaque fichier ; une ligne invalide est comptée, un fichier illisible est fatal.
pub fn import_exclusion_files<I, P>(paths: I) -> anyhow::Result<MergedExclusions>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut out = MergedExclusions::default();
    for path in paths {
        let path = path.as_ref();
        let import = import_exclusions_csv(path)?;
        if !import.skipped.is_empty() {
            out.skipped.push((path.to_path_buf(), import.skipped.len()));
        }
        out.exclusions.merge(import.exclusions);
    }
    Ok(out)
}

/// Comme [`import_exclusions_csv`], depuis n'importe quel lecteur.
pub fn read_exclusions<R: Read>(reader: R) -> ExclusionImport {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut out = ExclusionImport::default();
    for rec in rdr.records() {
        let (line, parsed) = match rec {
            Ok(rec) => (rec.position().map(|p| p.line()), parse_row(&rec)),
            Err(err) => (
                err.position().map(|p| p.line()),
                Err(ParseError::Malformed(err.to_string())),
            ),
        };
        let outcome = parsed.and_then(|(provider, start, end)| {
            out.exclusions
                .insert_range(provider, start, end)
                .map_err(|_| ParseError::ReversedRange { start, end })
        });
        if let Err(error) = outcome {
            out.skipped.push(SkippedRow { line, error });
        }
    }
    out
}

fn parse_row(rec: &StringRecord) -> Result<(Provider, NaiveDate, NaiveDate), ParseError> {
    let provider = rec.get(0).ok_or(ParseError::MissingField("Provider"))?;
    if provider.is_empty() {
        return Err(ParseError::EmptyProvider);
    }
    let start = rec.get(1).ok_or(ParseError::MissingField("Start Date"))?;
    let end = rec.get(2).ok_or(ParseError::MissingField("End Date"))?;
    Ok((Provider::new(provider), parse_date(start)?, parse_date(end)?))
}

/// Formats acceptés : `2025-03-01`, `2025/03/01`, `03/01/2025`, `2025-03-01 00:00:00`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ParseError> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::InvalidDate(raw.to_string()));
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .ok_or_else(|| ParseError::InvalidDate(raw.to_string()))
}

/// Export JSON du planning (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des créneaux: header `date,weekday,duty,provider` (provider vide = trou)
pub fn export_schedule_csv<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "weekday", "duty", "provider"])?;
    for date in schedule.range.days() {
        let day = date.to_string();
        let weekday = date.weekday().to_string();
        for duty in schedule.duties_on(date) {
            let provider = schedule
                .assignment_for(date, &duty.name)
                .map(|a| a.provider.as_str())
                .unwrap_or("");
            w.write_record([day.as_str(), weekday.as_str(), duty.name.as_str(), provider])?;
        }
    }
    w.flush()?;
    Ok(())
}
