use crate::io::{self, MergedExclusions};
use crate::model::{default_duties, DateRange, DutyType, ExclusionSet, Provider, Schedule};
use crate::scheduler::Scheduler;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Paramètres complets d'une génération : roster, gardes, horizon, fichiers d'exclusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default = "default_duties")]
    pub duties: Vec<DutyType>,
    pub horizon_weeks: u16,
    #[serde(default)]
    pub vacation_files: Vec<PathBuf>,
    #[serde(default)]
    pub admin_files: Vec<PathBuf>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl Profile {
    /// Une garde sans jour actif reste acceptée : elle ne produira simplement aucun créneau.
    pub fn validate(&self) -> Result<()> {
        check_id(&self.id)?;
        if self.name.trim().is_empty() {
            bail!("profile name cannot be empty");
        }
        if self.horizon_weeks == 0 {
            bail!("horizon_weeks must be > 0");
        }
        if self.duties.is_empty() {
            bail!("profile must define at least one duty type");
        }
        let mut names = BTreeSet::new();
        for duty in &self.duties {
            if duty.name.trim().is_empty() {
                bail!("duty type name cannot be empty");
            }
            if !names.insert(duty.name.as_str()) {
                bail!("duty type {} is declared twice", duty.name);
            }
        }
        Ok(())
    }

    /// Roster normalisé (même règles que la saisie texte).
    pub fn roster(&self) -> Vec<Provider> {
        io::parse_providers(&self.providers.join("\n"))
    }

    pub fn date_range(&self, start: NaiveDate) -> Result<DateRange> {
        Ok(DateRange::weeks(start, self.horizon_weeks)?)
    }

    /// Charge et fusionne les fichiers congés + admin du profil.
    pub fn load_exclusions(&self) -> Result<MergedExclusions> {
        io::import_exclusion_files(self.vacation_files.iter().chain(&self.admin_files))
    }

    pub fn scheduler(&self, exclusions: ExclusionSet) -> Scheduler {
        let mut scheduler = Scheduler::new().with_duties(self.duties.clone());
        scheduler.add_providers(self.roster());
        *scheduler.exclusions_mut() = exclusions;
        scheduler
    }
}

/// Planning issu d'un profil, avec les lignes d'exclusion écartées en route.
#[derive(Debug, Clone)]
pub struct ProfileSchedule {
    pub schedule: Schedule,
    pub skipped: Vec<(PathBuf, usize)>,
}

#[derive(Debug, Clone)]
pub struct ProfileInfo {
    pub profile: Profile,
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
}

/// Gestion simple des profils persistés sur disque.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    base_dir: PathBuf,
}

impl ProfileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            base_dir: dir.as_ref().to_path_buf(),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("creating profile directory {}", self.base_dir.display()))
    }

    pub fn save(&self, profile: &Profile) -> Result<PathBuf> {
        profile.validate()?;
        self.ensure_dir()?;
        let path = self.base_dir.join(format!("{}.json", profile.id));
        export_profile_json(&path, profile)
            .with_context(|| format!("writing profile {}", path.display()))?;
        Ok(path)
    }

    pub fn load(&self, id: &str) -> Result<Profile> {
        check_id(id)?;
        let path = self.base_dir.join(format!("{}.json", id));
        load_profile_from_file(&path).with_context(|| format!("loading profile {id}"))
    }

    /// Profils valides triés par id ; les fichiers illisibles ou invalides sont mis à part.
    pub fn list(&self) -> Result<ProfileListing> {
        let mut listing = ProfileListing::default();
        if !self.base_dir.exists() {
            return Ok(listing);
        }
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match load_profile_from_file(&path) {
                Ok(profile) => {
                    let modified = fs::metadata(&path)
                        .and_then(|meta| meta.modified())
                        .ok()
                        .map(DateTime::<Utc>::from);
                    listing.profiles.push(ProfileInfo {
                        profile,
                        path,
                        modified,
                    });
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), "skipping profile: {err:#}");
                    listing.unreadable.push(path);
                }
            }
        }
        listing
            .profiles
            .sort_by(|a, b| a.profile.id.cmp(&b.profile.id));
        listing.unreadable.sort();
        Ok(listing)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileListing {
    pub profiles: Vec<ProfileInfo>,
    pub unreadable: Vec<PathBuf>,
}

/// L'id sert de nom de fichier dans le répertoire des profils.
fn check_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("profile id cannot be empty");
    }
    if id.contains(['/', '\\']) || id == ".." {
        bail!("profile id cannot contain path separators: {id}");
    }
    Ok(())
}

/// Génère un planning à partir d'un profil, en ajoutant `extra` aux exclusions du profil.
pub fn generate_from_profile(
    profile: &Profile,
    start: NaiveDate,
    extra: ExclusionSet,
) -> Result<ProfileSchedule> {
    profile.validate()?;
    let range = profile.date_range(start)?;
    let MergedExclusions {
        mut exclusions,
        skipped,
    } = profile.load_exclusions()?;
    exclusions.merge(extra);
    let schedule = profile.scheduler(exclusions).generate(range)?;
    Ok(ProfileSchedule { schedule, skipped })
}

pub fn export_profile_json<P: AsRef<Path>>(path: P, profile: &Profile) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_profile_from_file<P: AsRef<Path>>(path: P) -> Result<Profile> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading profile {}", path.display()))?;
    let profile: Profile = serde_json::from_slice(&data)
        .with_context(|| format!("parsing profile {}", path.display()))?;
    profile.validate()?;
    Ok(profile)
}
