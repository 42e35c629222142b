use super::{types::SchedError, util};
use crate::model::{Assignment, DateRange, DutyType, ExclusionSet, Gap, Provider, Schedule};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// Compteurs d'un type de garde, indexés comme le roster trié.
struct Ledger {
    counts: Vec<usize>,
    last: Vec<Option<NaiveDate>>,
}

impl Ledger {
    fn new(size: usize) -> Self {
        Self {
            counts: vec![0; size],
            last: vec![None; size],
        }
    }

    fn record(&mut self, idx: usize, date: NaiveDate) {
        self.counts[idx] += 1;
        self.last[idx] = Some(date);
    }
}

pub(super) fn generate(
    providers: &[Provider],
    duties: &[DutyType],
    range: DateRange,
    exclusions: &ExclusionSet,
) -> Result<Schedule, SchedError> {
    range.validate()?;
    util::ensure_unique_duties(duties)?;

    // roster trié et dédoublonné : l'index sert de départage alphabétique
    let roster: Vec<Provider> = providers
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let active: Vec<&DutyType> = duties
        .iter()
        .filter(|duty| match duty.validate() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(duty = %duty.name, "{err}, no slot generated");
                false
            }
        })
        .collect();

    let mut ledgers: Vec<Ledger> = active.iter().map(|_| Ledger::new(roster.len())).collect();
    let mut booked = vec![false; roster.len()];
    let mut assignments = Vec::new();
    let mut gaps = Vec::new();

    for date in range.days() {
        booked.fill(false);
        let weekday = date.weekday();

        for (duty, ledger) in active.iter().zip(ledgers.iter_mut()) {
            if !duty.days.contains(weekday) {
                continue;
            }

            // moins de gardes d'abord, puis le moins récemment affecté, puis le nom
            let chosen = (0..roster.len())
                .filter(|&idx| !booked[idx] && !exclusions.is_excluded(&roster[idx], date))
                .min_by_key(|&idx| (ledger.counts[idx], ledger.last[idx], idx));

            match chosen {
                Some(idx) => {
                    ledger.record(idx, date);
                    booked[idx] = true;
                    assignments.push(Assignment {
                        date,
                        duty: duty.name.clone(),
                        provider: roster[idx].clone(),
                    });
                }
                None => {
                    let reason = util::gap_reason(&roster, exclusions, date);
                    tracing::debug!(%date, duty = %duty.name, ?reason, "unfilled slot");
                    gaps.push(Gap {
                        date,
                        duty: duty.name.clone(),
                        reason,
                    });
                }
            }
        }
    }

    tracing::info!(
        start = %range.start,
        end = %range.end,
        providers = roster.len(),
        assignments = assignments.len(),
        gaps = gaps.len(),
        "schedule generated"
    );

    Ok(Schedule {
        range,
        providers: roster,
        duties: duties.to_vec(),
        assignments,
        gaps,
        exclusions: exclusions.clone(),
    })
}
