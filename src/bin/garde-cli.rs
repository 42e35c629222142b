#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use garde::{
    io,
    model::{DateRange, DutyType, ExclusionSet, Provider, WeekdaySet, CLINIC, INPATIENT},
    profile::{generate_from_profile, Profile, ProfileStore},
    report::{summarize, SummaryRenderer, TextSummary},
    scheduler::{self, Scheduler},
    storage::{JsonStorage, Storage},
};
use std::path::{Path, PathBuf};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de plannings de garde (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du planning
    #[arg(long, global = true, default_value = "schedule.json")]
    schedule: PathBuf,

    /// Répertoire des profils
    #[arg(long, global = true, default_value = "profiles")]
    profiles_dir: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

/// Fichiers CSV `Provider, Start Date, End Date`
#[derive(clap::Args, Debug)]
struct ExclusionArgs {
    /// CSV des congés (répétable)
    #[arg(long = "vacations")]
    vacations: Vec<PathBuf>,
    /// CSV des jours admin (répétable)
    #[arg(long = "admin")]
    admin: Vec<PathBuf>,
}

/// Roster et gardes saisis en ligne de commande
#[derive(clap::Args, Debug)]
struct RosterArgs {
    /// Nom d'un praticien (répétable)
    #[arg(long = "provider")]
    providers: Vec<String>,
    /// Fichier texte, un praticien par ligne
    #[arg(long)]
    providers_file: Option<PathBuf>,
    /// Jours de consultation, ex. "Mon,Tue,Wed"
    #[arg(long, default_value = "Mon,Tue,Wed,Thu,Fri")]
    clinic_days: String,
    /// Jours d'hospitalisation
    #[arg(long, default_value = "Mon,Tue,Wed,Thu,Fri,Sat,Sun")]
    inpatient_days: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer un planning
    Generate {
        /// Premier jour (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Dernier jour inclus (sinon `--weeks`)
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = 4)]
        weeks: u16,
        /// Générer depuis un profil enregistré (roster, gardes et horizon viennent du profil)
        #[arg(
            long,
            conflicts_with_all = [
                "end",
                "weeks",
                "providers",
                "providers_file",
                "clinic_days",
                "inpatient_days",
            ]
        )]
        profile: Option<String>,
        #[command(flatten)]
        roster: RosterArgs,
        #[command(flatten)]
        exclusions: ExclusionArgs,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<PathBuf>,
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },

    /// Vérifier le planning (exclusions, doubles gardes, trous)
    Check {
        #[command(flatten)]
        exclusions: ExclusionArgs,
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Affecter un créneau à un praticien, ou le libérer
    Reassign {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        duty: String,
        #[arg(long, conflicts_with = "release", required_unless_present = "release")]
        provider: Option<String>,
        #[arg(long)]
        release: bool,
        #[command(flatten)]
        exclusions: ExclusionArgs,
    },

    /// Échanger les praticiens de deux créneaux
    Swap {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        duty: String,
        #[arg(long)]
        with_date: NaiveDate,
        #[arg(long)]
        with_duty: String,
        #[command(flatten)]
        exclusions: ExclusionArgs,
    },

    /// Bilan texte : charge par praticien et trous
    Report {
        /// Fichier de sortie (sinon stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Enregistrer un profil de génération
    SaveProfile {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = 4)]
        weeks: u16,
        #[command(flatten)]
        roster: RosterArgs,
        #[command(flatten)]
        exclusions: ExclusionArgs,
    },

    /// Lister les profils enregistrés
    Profiles,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    let storage = JsonStorage::open(&cli.schedule)?;
    let profiles = ProfileStore::new(&cli.profiles_dir);

    let code = match cli.cmd {
        Commands::Generate {
            start,
            end,
            weeks,
            profile,
            roster,
            exclusions,
        } => {
            let extra = load_exclusions(&exclusions)?;
            let schedule = match profile {
                Some(id) => {
                    let profile = profiles.load(&id)?;
                    let run = generate_from_profile(&profile, start, extra)?;
                    warn_skipped_rows(&run.skipped);
                    run.schedule
                }
                None => {
                    let range = match end {
                        Some(end) => DateRange::new(start, end)?,
                        None => DateRange::weeks(start, weeks)?,
                    };
                    let providers = roster_providers(&roster)?;
                    if providers.is_empty() {
                        eprintln!("Warning: empty roster, every slot will be a gap");
                    }
                    warn_unknown_providers(&providers, &extra);
                    let mut scheduler = Scheduler::new().with_duties(roster_duties(&roster)?);
                    scheduler.add_providers(providers);
                    *scheduler.exclusions_mut() = extra;
                    scheduler.generate(range)?
                }
            };
            storage.save(&schedule)?;
            println!(
                "Generated {} assignment(s), {} gap(s) into {}",
                schedule.assignments.len(),
                schedule.gaps.len(),
                storage.path().display()
            );
            0
        }
        Commands::List { out_json, out_csv } => {
            let schedule = storage.load()?;
            if let Some(path) = out_json {
                io::export_schedule_json(path, &schedule)?;
            }
            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &schedule)?;
            }
            for date in schedule.range.days() {
                for duty in schedule.duties_on(date) {
                    let assigned = schedule
                        .assignment_for(date, &duty.name)
                        .map(|a| a.provider.as_str())
                        .unwrap_or("-");
                    println!("{} | {} | {}", date, duty.name, assigned);
                }
            }
            0
        }
        Commands::Check { exclusions, report } => {
            let schedule = storage.load()?;
            let exclusions = load_exclusions(&exclusions)?;
            let violations = scheduler::check_schedule(&schedule, &exclusions);
            if violations.is_empty() && schedule.gaps.is_empty() {
                println!("OK: no violations, no gaps");
                0
            } else {
                if !violations.is_empty() {
                    eprintln!("Found {} violation(s)", violations.len());
                }
                if !schedule.gaps.is_empty() {
                    eprintln!("Found {} unfilled slot(s)", schedule.gaps.len());
                }
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["date", "duty", "provider", "kind"])?;
                    for v in &violations {
                        let date = v.date.to_string();
                        w.write_record([
                            date.as_str(),
                            v.duty.as_str(),
                            v.provider.as_str(),
                            v.kind.as_str(),
                        ])?;
                    }
                    for gap in &schedule.gaps {
                        let date = gap.date.to_string();
                        w.write_record([date.as_str(), gap.duty.as_str(), "", "gap"])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Reassign {
            date,
            duty,
            provider,
            release,
            exclusions,
        } => {
            let schedule = storage.load()?;
            let exclusions = load_exclusions(&exclusions)?;
            let provider = match (provider, release) {
                (_, true) => None,
                (Some(name), false) => Some(Provider::new(name.trim())),
                (None, false) => bail!("either --provider or --release is required"),
            };
            let next =
                scheduler::reassign(&schedule, date, &duty, provider.as_ref(), &exclusions)?;
            storage.save(&next)?;
            0
        }
        Commands::Swap {
            date,
            duty,
            with_date,
            with_duty,
            exclusions,
        } => {
            let schedule = storage.load()?;
            let exclusions = load_exclusions(&exclusions)?;
            let next = scheduler::swap(
                &schedule,
                (date, duty.as_str()),
                (with_date, with_duty.as_str()),
                &exclusions,
            )?;
            storage.save(&next)?;
            0
        }
        Commands::Report { out } => {
            let schedule = storage.load()?;
            let text = TextSummary.render(&schedule, &summarize(&schedule));
            match out {
                Some(path) => std::fs::write(&path, text)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{text}"),
            }
            0
        }
        Commands::SaveProfile {
            id,
            name,
            description,
            weeks,
            roster,
            exclusions,
        } => {
            let profile = Profile {
                id,
                name,
                description,
                providers: roster_providers(&roster)?
                    .iter()
                    .map(|p| p.as_str().to_string())
                    .collect(),
                duties: roster_duties(&roster)?,
                horizon_weeks: weeks,
                vacation_files: exclusions.vacations,
                admin_files: exclusions.admin,
                metadata: None,
            };
            let path = profiles.save(&profile)?;
            println!("Profile {} saved to {}", profile.id, path.display());
            0
        }
        Commands::Profiles => {
            let listing = profiles.list()?;
            for path in &listing.unreadable {
                eprintln!("Warning: unreadable profile {}", path.display());
            }
            for info in &listing.profiles {
                println!(
                    "{} | {} | {} provider(s) | {} week(s)",
                    info.profile.id,
                    info.profile.name,
                    info.profile.roster().len(),
                    info.profile.horizon_weeks
                );
            }
            0
        }
    };

    std::process::exit(code);
}

fn roster_providers(args: &RosterArgs) -> Result<Vec<Provider>> {
    let mut text = args.providers.join("\n");
    if let Some(path) = &args.providers_file {
        let raw = read_text(path)?;
        text.push('\n');
        text.push_str(&raw);
    }
    Ok(io::parse_providers(&text))
}

fn roster_duties(args: &RosterArgs) -> Result<Vec<DutyType>> {
    let clinic: WeekdaySet = args.clinic_days.parse()?;
    let inpatient: WeekdaySet = args.inpatient_days.parse()?;
    Ok(vec![
        DutyType::new(CLINIC, clinic),
        DutyType::new(INPATIENT, inpatient),
    ])
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_exclusions(args: &ExclusionArgs) -> Result<ExclusionSet> {
    let merged = io::import_exclusion_files(args.vacations.iter().chain(&args.admin))?;
    warn_skipped_rows(&merged.skipped);
    Ok(merged.exclusions)
}

fn warn_skipped_rows(skipped: &[(PathBuf, usize)]) {
    for (path, count) in skipped {
        eprintln!(
            "Warning: skipped {} malformed row(s) in {}",
            count,
            path.display()
        );
    }
}

fn warn_unknown_providers(roster: &[Provider], exclusions: &ExclusionSet) {
    for provider in exclusions.providers().filter(|p| !roster.contains(p)) {
        eprintln!("Warning: exclusions listed for {provider}, who is not on the roster");
    }
}
