#![forbid(unsafe_code)]
//! Garde — génération de plannings de garde (consultation / hospitalisation), sans BD.
//!
//! - Rotation équitable et déterministe, sans double garde le même jour.
//! - Congés et jours admin importés depuis CSV (`Provider, Start Date, End Date`).
//! - Créneaux sans praticien disponible conservés comme trous explicites.
//! - Stockage fichiers (JSON/CSV) et profils de génération.

#[cfg(feature = "serde")]
pub mod io;
pub mod model;
#[cfg(feature = "serde")]
pub mod profile;
pub mod report;
pub mod scheduler;
#[cfg(feature = "serde")]
pub mod storage;

pub use model::{
    default_duties, Assignment, DateRange, DutyType, ExclusionSet, Gap, GapReason, Provider,
    Schedule, WeekdaySet,
};
#[cfg(feature = "serde")]
pub use profile::{
    generate_from_profile, Profile, ProfileInfo, ProfileListing, ProfileSchedule, ProfileStore,
};
pub use report::{summarize, Summary, SummaryRenderer, TextSummary};
pub use scheduler::{generate, SchedError, Scheduler, Violation, ViolationKind};
#[cfg(feature = "serde")]
pub use storage::{JsonStorage, Storage};
