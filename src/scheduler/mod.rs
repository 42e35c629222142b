mod assignment;
mod conflicts;
mod mutate;
mod types;
mod util;

pub use types::{SchedError, Violation, ViolationKind};

use crate::model::{DateRange, DutyType, ExclusionSet, Provider, Schedule};
use chrono::NaiveDate;

/// Génère le planning : rotation équitable, déterministe, sans double garde.
pub fn generate(
    providers: &[Provider],
    duties: &[DutyType],
    range: DateRange,
    exclusions: &ExclusionSet,
) -> Result<Schedule, SchedError> {
    assignment::generate(providers, duties, range, exclusions)
}

/// Revérifie un planning (éventuellement retouché) contre ses propres exclusions
/// et celles de `extra`.
pub fn check_schedule(schedule: &Schedule, extra: &ExclusionSet) -> Vec<Violation> {
    conflicts::check_schedule(schedule, extra)
}

/// Affecte (ou libère avec `None`) un créneau ; renvoie un nouveau planning.
/// Les exclusions du planning s'appliquent toujours, `extra` s'y ajoute.
pub fn reassign(
    schedule: &Schedule,
    date: NaiveDate,
    duty: &str,
    provider: Option<&Provider>,
    extra: &ExclusionSet,
) -> Result<Schedule, SchedError> {
    mutate::reassign(schedule, date, duty, provider, extra)
}

/// Échange les praticiens de deux créneaux affectés ; renvoie un nouveau planning.
pub fn swap(
    schedule: &Schedule,
    a: (NaiveDate, &str),
    b: (NaiveDate, &str),
    extra: &ExclusionSet,
) -> Result<Schedule, SchedError> {
    mutate::swap(schedule, a, b, extra)
}

/// Scheduler : regroupe la configuration d'une génération (roster, gardes, exclusions).
#[derive(Debug, Clone)]
pub struct Scheduler {
    providers: Vec<Provider>,
    duties: Vec<DutyType>,
    exclusions: ExclusionSet,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Roster vide, gardes par défaut (consultation + hospitalisation).
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            duties: crate::model::default_duties(),
            exclusions: ExclusionSet::new(),
        }
    }

    pub fn with_duties(mut self, duties: Vec<DutyType>) -> Self {
        self.duties = duties;
        self
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }
    pub fn duties(&self) -> &[DutyType] {
        &self.duties
    }
    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }
    pub fn exclusions_mut(&mut self) -> &mut ExclusionSet {
        &mut self.exclusions
    }

    pub fn add_providers(&mut self, providers: Vec<Provider>) {
        self.providers.extend(providers);
    }

    pub fn generate(&self, range: DateRange) -> Result<Schedule, SchedError> {
        generate(&self.providers, &self.duties, range, &self.exclusions)
    }

    pub fn check(&self, schedule: &Schedule) -> Vec<Violation> {
        check_schedule(schedule, &self.exclusions)
    }

    pub fn reassign(
        &self,
        schedule: &Schedule,
        date: NaiveDate,
        duty: &str,
        provider: Option<&Provider>,
    ) -> Result<Schedule, SchedError> {
        reassign(schedule, date, duty, provider, &self.exclusions)
    }

    pub fn swap(
        &self,
        schedule: &Schedule,
        a: (NaiveDate, &str),
        b: (NaiveDate, &str),
    ) -> Result<Schedule, SchedError> {
        swap(schedule, a, b, &self.exclusions)
    }
}
