//! Résultat d'une génération : affectations + rapport de diagnostic.

use crate::model::{DateRange, FteCategory, LocationId, RequirementId, RosterAssignment, SlotId, StaffId};
use crate::scheduler::{Conflict, Rejection, UnmetReason};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterResult {
    pub period: DateRange,
    pub assignments: Vec<RosterAssignment>,
    pub report: DiagnosticReport,
}

impl RosterResult {
    pub fn assignments_for(&self, staff: StaffId) -> impl Iterator<Item = &RosterAssignment> + '_ {
        self.assignments.iter().filter(move |a| a.staff_id == staff)
    }

    pub fn fte_for(&self, staff: StaffId) -> Option<&StaffFteSummary> {
        self.report.fte.iter().find(|s| s.staff_id == staff)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub unmet: Vec<UnmetDemand>,
    pub issues: Vec<ConfigIssue>,
    pub fte: Vec<StaffFteSummary>,
    /// Vérification finale ; vide sauf bogue.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Conflict>,
    pub summary: RunSummary,
}

/// Unité de demande restée sous son effectif requis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmetDemand {
    pub location_id: LocationId,
    pub time_slot_id: SlotId,
    pub date: NaiveDate,
    pub required: u32,
    pub assigned: u32,
    pub unmet: u32,
    pub reason: UnmetReason,
    pub unsatisfied_requirements: Vec<RequirementId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rejections: BTreeMap<Rejection, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnknownRole,
    UnknownGroup,
    UnknownLocation,
    UnknownStaff,
    InvalidSlot,
    InvalidFte,
    InvalidPoints,
    MissingFteConfiguration,
    UnusableFteConfiguration,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::UnknownRole => "unknown role",
            IssueKind::UnknownGroup => "unknown group",
            IssueKind::UnknownLocation => "unknown location",
            IssueKind::UnknownStaff => "unknown staff",
            IssueKind::InvalidSlot => "invalid slot",
            IssueKind::InvalidFte => "invalid fte",
            IssueKind::InvalidPoints => "invalid points",
            IssueKind::MissingFteConfiguration => "missing fte configuration",
            IssueKind::UnusableFteConfiguration => "unusable fte configuration",
        };
        f.write_str(s)
    }
}

/// Enregistrement ignoré pour cause de configuration invalide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigIssue {
    pub kind: IssueKind,
    /// Enregistrement fautif, ex. `requirement:12`.
    pub subject: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new<S: Into<String>, M: Into<String>>(kind: IssueKind, subject: S, message: M) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryFte {
    pub initial_budget: f64,
    pub consumed_budget: f64,
    pub target_shifts: f64,
    pub actual_shifts: f64,
    pub deviation: f64,
    pub actual_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffFteSummary {
    pub staff_id: StaffId,
    pub assignments: u32,
    pub clinical: CategoryFte,
    pub research: CategoryFte,
    pub admin: CategoryFte,
}

impl StaffFteSummary {
    pub fn category(&self, category: FteCategory) -> &CategoryFte {
        match category {
            FteCategory::Clinical => &self.clinical,
            FteCategory::Research => &self.research,
            FteCategory::Admin => &self.admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub units: u32,
    pub filled: u32,
    pub unmet: u32,
    pub assignments: u32,
    pub double_station_pairs: u32,
    /// Mouvements de réparation locale conservés.
    #[serde(default)]
    pub repairs: u32,
    pub fairness_passes: u32,
    pub fairness_moves: u32,
    /// Σ écart² en milli-gardes au carré.
    pub squared_deviation: i64,
    pub cancelled: bool,
}
