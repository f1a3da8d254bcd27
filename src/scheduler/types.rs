use crate::model::{LocationId, PairKey, SlotId, StaffId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Cycle de vie d'une unité de demande pendant une exécution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Unfilled,
    PartiallyFilled,
    Filled,
    Unmet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmetReason {
    NoEligibleStaff,
    Cancelled,
}

impl fmt::Display for UnmetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmetReason::NoEligibleStaff => f.write_str("no eligible staff"),
            UnmetReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Première raison pour laquelle un membre n'est pas éligible à une unité.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Inactive,
    OnLeave,
    RoleMismatch,
    GroupMismatch,
    Overlap,
    InsufficientBudget,
}

/// Mode d'affectation : poste complet ou moitié de double poste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    Half,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Overlap,
    Contribution,
    Overfilled,
    BudgetExceeded,
    OnLeave,
    BrokenPair,
    UnknownReference,
}

/// Incohérence détectée sur un résultat déjà produit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<StaffId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot_id: Option<SlotId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair: Option<PairKey>,
    pub detail: String,
}

/// Erreurs internes des mutations d'état ; ne sortent jamais d'une exécution.
#[derive(Error, Debug)]
pub(crate) enum SchedError {
    #[error("budget exhausted for staff {0}")]
    BudgetExhausted(StaffId),
    #[error("transfer invalid: {0}")]
    TransferInvalid(&'static str),
}
