#![forbid(unsafe_code)]
//! Rostering — moteur de génération de plannings pour équipes soignantes.
//!
//! - Entrée : instantané figé (personnel, postes, créneaux, exigences, congés, FTE).
//! - Sortie : affectations + rapport de diagnostic (demande non couverte, écarts FTE).
//! - Glouton par priorité, binômes en double poste, rééquilibrage borné.
//! - Pur et déterministe ; la persistance reste côté appelant.

pub mod availability;
pub mod config;
pub mod demand;
pub mod io;
pub mod model;
pub mod render;
pub mod report;
pub mod scheduler;
pub mod storage;

pub use availability::AvailabilityIndex;
pub use config::{EngineConfig, RankingWeights};
pub use demand::{expand, DemandUnit, Expansion};
pub use model::{
    DateRange, FteCategory, FteConfiguration, LeaveRequest, LeaveStatus, LeaveType, Location,
    LocationStaffRequirement, LocationTimeSlot, PairKey, Role, RosterAssignment, Snapshot, Staff,
    StaffGroup,
};
pub use render::{ReportRenderer, TextSummary};
pub use report::{ConfigIssue, DiagnosticReport, IssueKind, RosterResult, UnmetDemand};
pub use scheduler::{verify, CancellationToken, Conflict, ConflictKind, EngineError, Scheduler};
pub use storage::{JsonStorage, Storage};
