use crate::scheduler::SchedError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Nom de la garde de consultation par défaut.
pub const CLINIC: &str = "Clinic";
/// Nom de la garde d'hospitalisation par défaut.
pub const INPATIENT: &str = "Inpatient";

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Praticien, identifié uniquement par son nom.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Provider(String);

impl Provider {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ensemble de jours de la semaine (bit 0 = lundi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "Vec<Weekday>", from = "Vec<Weekday>")
)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: Self = Self(0);

    /// Lundi au vendredi.
    pub fn working_days() -> Self {
        Self(0b001_1111)
    }

    pub fn all() -> Self {
        Self(0b111_1111)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Jours dans l'ordre lundi → dimanche.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> {
        let set = *self;
        WEEK.iter().copied().filter(move |d| set.contains(*d))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<Vec<Weekday>> for WeekdaySet {
    fn from(days: Vec<Weekday>) -> Self {
        days.into_iter().collect()
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().collect()
    }
}

/// Accepte `Mon,Tue` comme `monday, tuesday` ; une chaîne vide donne l'ensemble vide.
impl FromStr for WeekdaySet {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| {
                chunk
                    .parse::<Weekday>()
                    .map_err(|_| SchedError::InvalidWeekday(chunk.to_string()))
            })
            .collect()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days: Vec<String> = self.iter().map(|d| d.to_string()).collect();
        f.write_str(&days.join(","))
    }
}

/// Type de garde (consultation, hospitalisation, ...) et ses jours actifs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DutyType {
    pub name: String,
    pub days: WeekdaySet,
}

impl DutyType {
    pub fn new<N: Into<String>>(name: N, days: WeekdaySet) -> Self {
        Self {
            name: name.into(),
            days,
        }
    }

    pub fn clinic() -> Self {
        Self::new(CLINIC, WeekdaySet::working_days())
    }

    pub fn inpatient() -> Self {
        Self::new(INPATIENT, WeekdaySet::all())
    }

    /// Un type sans jour actif est dégénéré : il ne produit aucun créneau.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.days.is_empty() {
            return Err(SchedError::EmptyDutyType(self.name.clone()));
        }
        Ok(())
    }
}

/// Consultation du lundi au vendredi, hospitalisation tous les jours.
pub fn default_duties() -> Vec<DutyType> {
    vec![DutyType::clinic(), DutyType::inpatient()]
}

/// Période inclusive `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SchedError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// `weeks` semaines pleines à partir de `start`.
    pub fn weeks(start: NaiveDate, weeks: u16) -> Result<Self, SchedError> {
        if weeks == 0 {
            return Err(SchedError::InvalidRange { start, end: start });
        }
        let end = start
            .checked_add_days(Days::new(u64::from(weeks) * 7 - 1))
            .ok_or(SchedError::InvalidRange { start, end: start })?;
        Self::new(start, end)
    }

    pub fn validate(&self) -> Result<(), SchedError> {
        if self.start > self.end {
            return Err(SchedError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len_days(&self) -> usize {
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Jours d'indisponibilité (congés, jours admin) par praticien.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ExclusionSet(BTreeMap<Provider, BTreeSet<NaiveDate>>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: Provider, day: NaiveDate) -> bool {
        self.0.entry(provider).or_default().insert(day)
    }

    /// Ajoute chaque jour de `[start, end]` ; renvoie le nombre de jours nouveaux.
    pub fn insert_range(
        &mut self,
        provider: Provider,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, SchedError> {
        let range = DateRange::new(start, end)?;
        let days = self.0.entry(provider).or_default();
        Ok(range.days().filter(|d| days.insert(*d)).count())
    }

    pub fn is_excluded(&self, provider: &Provider, day: NaiveDate) -> bool {
        self.0.get(provider).is_some_and(|days| days.contains(&day))
    }

    pub fn merge(&mut self, other: ExclusionSet) {
        for (provider, days) in other.0 {
            self.0.entry(provider).or_default().extend(days);
        }
    }

    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.0.keys()
    }

    pub fn days_for(&self, provider: &Provider) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.get(provider).into_iter().flatten().copied()
    }

    /// Nombre total de couples (praticien, jour).
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Affectation d'un praticien à un créneau (jour, garde).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    pub date: NaiveDate,
    pub duty: String,
    pub provider: Provider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum GapReason {
    /// Aucun praticien saisi.
    EmptyRoster,
    /// Tous les praticiens sont en congé ou en jour admin.
    Unavailable,
    /// Les praticiens disponibles sont déjà pris sur une autre garde ce jour-là.
    AlreadyBooked,
    /// Créneau libéré à la main après génération.
    Released,
}

impl GapReason {
    pub fn describe(&self) -> &'static str {
        match self {
            GapReason::EmptyRoster => "no providers on the roster",
            GapReason::Unavailable => "all providers unavailable",
            GapReason::AlreadyBooked => "all available providers already booked",
            GapReason::Released => "released manually",
        }
    }
}

/// Créneau resté sans praticien.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gap {
    pub date: NaiveDate,
    pub duty: String,
    pub reason: GapReason,
}

/// Planning complet ; valeur immuable reconstruite à chaque génération.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schedule {
    pub range: DateRange,
    pub providers: Vec<Provider>,
    pub duties: Vec<DutyType>,
    pub assignments: Vec<Assignment>,
    pub gaps: Vec<Gap>,
    /// Exclusions prises en compte à la génération ; les retouches les respectent aussi.
    #[cfg_attr(feature = "serde", serde(default))]
    pub exclusions: ExclusionSet,
}

impl Schedule {
    /// Exclu d'après le planning lui-même ou d'après `extra` (fichiers fournis après coup).
    pub fn is_excluded(&self, extra: &ExclusionSet, provider: &Provider, day: NaiveDate) -> bool {
        self.exclusions.is_excluded(provider, day) || extra.is_excluded(provider, day)
    }

    pub fn assignment_for(&self, date: NaiveDate, duty: &str) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.date == date && a.duty == duty)
    }

    pub fn gap_for(&self, date: NaiveDate, duty: &str) -> Option<&Gap> {
        self.gaps.iter().find(|g| g.date == date && g.duty == duty)
    }

    pub fn find_duty(&self, name: &str) -> Option<&DutyType> {
        self.duties.iter().find(|d| d.name == name)
    }

    /// Garde déjà tenue par `provider` ce jour-là, s'il y en a une.
    pub fn booked_duty(&self, provider: &Provider, date: NaiveDate) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.date == date && &a.provider == provider)
            .map(|a| a.duty.as_str())
    }

    /// Nombre de gardes `duty` par praticien du roster (zéros compris).
    pub fn counts_for(&self, duty: &str) -> BTreeMap<&Provider, usize> {
        let mut counts: BTreeMap<&Provider, usize> =
            self.providers.iter().map(|p| (p, 0)).collect();
        for a in self.assignments.iter().filter(|a| a.duty == duty) {
            *counts.entry(&a.provider).or_insert(0) += 1;
        }
        counts
    }

    /// Écart max - min des compteurs pour `duty` (None si roster vide).
    pub fn spread(&self, duty: &str) -> Option<usize> {
        let counts = self.counts_for(duty);
        let max = counts.values().max()?;
        let min = counts.values().min()?;
        Some(max - min)
    }

    /// Types de garde ignorés faute de jour actif.
    pub fn skipped_duties(&self) -> impl Iterator<Item = &DutyType> {
        self.duties.iter().filter(|d| d.days.is_empty())
    }

    /// Créneaux attendus pour ce jour, dans l'ordre de traitement des gardes.
    pub fn duties_on(&self, date: NaiveDate) -> impl Iterator<Item = &DutyType> {
        let weekday = date.weekday();
        self.duties.iter().filter(move |d| d.days.contains(weekday))
    }
}
