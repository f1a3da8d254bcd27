//! Index de disponibilité : congés approuvés et budget FTE restant par catégorie.

use crate::model::{to_milli, DateRange, FteCategory, LeaveRequest, Staff, StaffId};
use crate::report::{ConfigIssue, IssueKind};
use crate::scheduler::EngineError;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

#[derive(Debug, Clone)]
struct Entry {
    blocked: BTreeSet<NaiveDate>,
    initial: [i64; 3],
    remaining: [i64; 3],
}

#[derive(Debug, Clone)]
pub struct AvailabilityIndex {
    period: DateRange,
    entries: HashMap<StaffId, Entry>,
    issues: Vec<ConfigIssue>,
}

impl AvailabilityIndex {
    /// Construit l'index pour la période ; seul le personnel actif avec des
    /// fractions FTE valides est indexé.
    pub fn build(
        staff: &[Staff],
        leave: &[LeaveRequest],
        period: DateRange,
    ) -> Result<Self, EngineError> {
        period.validate()?;
        let weeks = period.num_weeks();
        let mut issues = Vec::new();
        let mut entries = HashMap::with_capacity(staff.len());

        for member in staff.iter().filter(|s| s.active) {
            if let Err(message) = member.validate_fte() {
                warn!(staff = %member.id, %message, "staff excluded: invalid fte");
                issues.push(ConfigIssue::new(
                    IssueKind::InvalidFte,
                    format!("staff:{}", member.id),
                    message,
                ));
                continue;
            }
            let mut budget = [0i64; 3];
            for category in FteCategory::ALL {
                budget[category.index()] = to_milli(member.fraction(category)) * weeks;
            }
            entries.insert(
                member.id,
                Entry {
                    blocked: BTreeSet::new(),
                    initial: budget,
                    remaining: budget,
                },
            );
        }

        for request in leave.iter().filter(|l| l.blocks()) {
            if !staff.iter().any(|s| s.id == request.staff_id) {
                warn!(leave = %request.id, staff = %request.staff_id, "leave for unknown staff ignored");
                issues.push(ConfigIssue::new(
                    IssueKind::UnknownStaff,
                    format!("leave:{}", request.id),
                    format!("leave references unknown staff {}", request.staff_id),
                ));
                continue;
            }
            let Some(entry) = entries.get_mut(&request.staff_id) else {
                continue;
            };
            entry
                .blocked
                .extend(period.days().filter(|d| request.covers(*d)));
        }

        Ok(Self {
            period,
            entries,
            issues,
        })
    }

    pub fn period(&self) -> DateRange {
        self.period
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn is_indexed(&self, staff: StaffId) -> bool {
        self.entries.contains_key(&staff)
    }

    /// Faux hors période, en congé approuvé, ou pour un membre non indexé.
    pub fn is_available(&self, staff: StaffId, date: NaiveDate) -> bool {
        if !self.period.contains(date) {
            return false;
        }
        self.entries
            .get(&staff)
            .is_some_and(|e| !e.blocked.contains(&date))
    }

    pub fn remaining_milli(&self, staff: StaffId, category: FteCategory) -> i64 {
        self.entries
            .get(&staff)
            .map_or(0, |e| e.remaining[category.index()])
    }

    pub fn initial_milli(&self, staff: StaffId, category: FteCategory) -> i64 {
        self.entries
            .get(&staff)
            .map_or(0, |e| e.initial[category.index()])
    }

    pub fn consumed_milli(&self, staff: StaffId, category: FteCategory) -> i64 {
        self.initial_milli(staff, category) - self.remaining_milli(staff, category)
    }

    pub fn remaining_budget(&self, staff: StaffId, category: FteCategory) -> f64 {
        crate::model::from_milli(self.remaining_milli(staff, category))
    }

    /// Débite le budget ; refuse (faux) si le solde deviendrait négatif.
    pub fn consume(&mut self, staff: StaffId, category: FteCategory, milli: i64) -> bool {
        let Some(entry) = self.entries.get_mut(&staff) else {
            return false;
        };
        let slot = &mut entry.remaining[category.index()];
        if *slot < milli {
            return false;
        }
        *slot -= milli;
        true
    }

    pub fn release(&mut self, staff: StaffId, category: FteCategory, milli: i64) {
        if let Some(entry) = self.entries.get_mut(&staff) {
            let idx = category.index();
            entry.remaining[idx] = (entry.remaining[idx] + milli).min(entry.initial[idx]);
        }
    }
}
