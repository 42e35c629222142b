use crate::model::{Gap, Provider, Schedule};

/// Charge d'un praticien : une colonne par type de garde, dans l'ordre du planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderLoad {
    pub provider: Provider,
    pub per_duty: Vec<usize>,
    pub total: usize,
}

/// Bilan d'un planning : charges et créneaux restés vides.
#[derive(Debug, Clone)]
pub struct Summary {
    pub duties: Vec<String>,
    pub loads: Vec<ProviderLoad>,
    pub assignment_count: usize,
    pub gaps: Vec<Gap>,
}

pub fn summarize(schedule: &Schedule) -> Summary {
    let duties: Vec<String> = schedule.duties.iter().map(|d| d.name.clone()).collect();
    let per_duty: Vec<_> = duties.iter().map(|d| schedule.counts_for(d)).collect();

    let loads = schedule
        .providers
        .iter()
        .map(|provider| {
            let counts: Vec<usize> = per_duty
                .iter()
                .map(|c| c.get(provider).copied().unwrap_or(0))
                .collect();
            ProviderLoad {
                provider: provider.clone(),
                total: counts.iter().sum(),
                per_duty: counts,
            }
        })
        .collect();

    Summary {
        duties,
        loads,
        assignment_count: schedule.assignments.len(),
        gaps: schedule.gaps.clone(),
    }
}

/// Permet de customiser le rendu du bilan (texte, mail, ...).
pub trait SummaryRenderer {
    fn render(&self, schedule: &Schedule, summary: &Summary) -> String;
}

/// Rendu texte brut, sans mise en page calendrier.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextSummary;

impl SummaryRenderer for TextSummary {
    fn render(&self, schedule: &Schedule, summary: &Summary) -> String {
        let mut lines = vec![
            format!(
                "Schedule {} .. {} ({} days)",
                schedule.range.start,
                schedule.range.end,
                schedule.range.len_days()
            ),
            format!(
                "Assignments: {}, gaps: {}",
                summary.assignment_count,
                summary.gaps.len()
            ),
        ];

        for (idx, duty) in summary.duties.iter().enumerate() {
            let counts: Vec<String> = summary
                .loads
                .iter()
                .map(|l| format!("{}={}", l.provider, l.per_duty[idx]))
                .collect();
            lines.push(format!("{duty}: {}", counts.join(", ")));
        }

        for duty in schedule.skipped_duties() {
            lines.push(format!("Skipped: {} (no eligible weekday)", duty.name));
        }

        if !summary.gaps.is_empty() {
            lines.push("Gaps:".to_string());
            for gap in &summary.gaps {
                lines.push(format!(
                    "- {} {} ({})",
                    gap.date,
                    gap.duty,
                    gap.reason.describe()
                ));
            }
        }

        lines.join("\n")
    }
}
