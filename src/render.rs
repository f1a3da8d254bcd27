use crate::model::Snapshot;
use crate::report::RosterResult;
use std::fmt::Write;

/// Permet de customiser le rendu d'un résultat (texte, markdown, etc.).
pub trait ReportRenderer {
    fn render(&self, snapshot: &Snapshot, result: &RosterResult) -> String;
}

/// Résumé texte destiné à la sortie de la CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextSummary {
    /// Liste aussi chaque affectation.
    pub detailed: bool,
}

impl ReportRenderer for TextSummary {
    fn render(&self, snapshot: &Snapshot, result: &RosterResult) -> String {
        let summary = &result.report.summary;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "roster {} .. {}: {} units, {} filled, {} unmet, {} assignments, {} pairs",
            result.period.start,
            result.period.end,
            summary.units,
            summary.filled,
            summary.unmet,
            summary.assignments,
            summary.double_station_pairs,
        );
        if summary.cancelled {
            let _ = writeln!(out, "cancelled before completion");
        }

        if self.detailed {
            for a in &result.assignments {
                let location = snapshot
                    .find_location(a.location_id)
                    .map_or("?", |l| l.name.as_str());
                let start = snapshot
                    .find_slot(a.time_slot_id)
                    .map(|s| s.start_time.format("%H:%M").to_string())
                    .unwrap_or_default();
                let half = if a.is_double_stationed { " (double)" } else { "" };
                let _ = writeln!(
                    out,
                    "{} {} {} staff={} fte={:.3}{}",
                    a.date, start, location, a.staff_id, a.fte_contribution, half
                );
            }
        }

        for unmet in &result.report.unmet {
            let location = snapshot
                .find_location(unmet.location_id)
                .map_or("?", |l| l.name.as_str());
            let _ = writeln!(
                out,
                "unmet {} {} slot={} missing={} ({})",
                unmet.date, location, unmet.time_slot_id, unmet.unmet, unmet.reason
            );
        }
        for issue in &result.report.issues {
            let _ = writeln!(out, "issue {} {}: {}", issue.kind, issue.subject, issue.message);
        }
        for conflict in &result.report.violations {
            let _ = writeln!(out, "violation {:?}: {}", conflict.kind, conflict.detail);
        }
        out
    }
}
