mod assignment;
mod balance;
mod cancel;
mod conflicts;
mod double_station;
mod eligibility;
mod lookup;
mod mutate;
mod repair;
mod state;
mod types;

pub use cancel::CancellationToken;
pub use conflicts::verify;
pub use types::{
    Conflict, ConflictKind, EngineError, Mode, Rejection, UnitState, UnmetReason,
};

use crate::availability::AvailabilityIndex;
use crate::config::EngineConfig;
use crate::demand;
use crate::model::{from_milli, DateRange, FteCategory, RosterAssignment, Snapshot};
use crate::report::{
    CategoryFte, ConfigIssue, DiagnosticReport, RosterResult, RunSummary, StaffFteSummary,
    UnmetDemand,
};
use lookup::Lookup;
use state::{RunState, FULL_SHIFT};
use tracing::{info, warn};

/// Scheduler : moteur de génération de planning sur un instantané figé.
#[derive(Debug, Default, Clone)]
pub struct Scheduler {
    config: EngineConfig,
}

impl Scheduler {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn generate(
        &self,
        snapshot: &Snapshot,
        period: DateRange,
    ) -> Result<RosterResult, EngineError> {
        self.generate_with_cancel(snapshot, period, &CancellationToken::new())
    }

    /// Génère le planning ; en cas d'annulation, renvoie le résultat partiel.
    pub fn generate_with_cancel(
        &self,
        snapshot: &Snapshot,
        period: DateRange,
        cancel: &CancellationToken,
    ) -> Result<RosterResult, EngineError> {
        period.validate()?;
        info!(start = %period.start, end = %period.end, staff = snapshot.staff.len(), "roster generation started");

        let mut issues: Vec<ConfigIssue> = Vec::new();
        let lookup = Lookup::build(snapshot, &self.config, &mut issues);
        let availability = AvailabilityIndex::build(&snapshot.staff, &snapshot.leave, period)?;
        issues.extend_from_slice(availability.issues());
        let expansion = demand::expand(
            &snapshot.locations,
            &snapshot.time_slots,
            lookup.requirements(),
            period,
        )?;
        issues.extend(expansion.issues);

        let mut state = RunState::new(&lookup, &self.config, availability, expansion.units, period);
        assignment::solve(&mut state, cancel);

        let (mut pairs, mut repairs) = (0, 0);
        if !state.cancelled {
            if self.config.repair {
                repairs = repair::repair(&mut state);
            }
            if self.config.double_station {
                pairs = double_station::resolve(&mut state);
            }
            if self.config.fairness {
                balance::balance(&mut state);
            }
        }

        let mut result = finish(state, period, issues, pairs, repairs);
        result.report.violations = verify(snapshot, &result);
        if !result.report.violations.is_empty() {
            warn!(count = result.report.violations.len(), "generated roster failed verification");
        }
        let summary = &result.report.summary;
        info!(
            units = summary.units,
            filled = summary.filled,
            unmet = summary.unmet,
            assignments = summary.assignments,
            pairs = summary.double_station_pairs,
            cancelled = summary.cancelled,
            "roster generation finished"
        );
        Ok(result)
    }
}

fn finish(
    state: RunState<'_>,
    period: DateRange,
    issues: Vec<ConfigIssue>,
    pairs: u32,
    repairs: u32,
) -> RosterResult {
    let mut order: Vec<usize> = (0..state.placements.len()).collect();
    order.sort_by_key(|&p| {
        let placement = &state.placements[p];
        let unit = &state.units[placement.unit];
        (unit.date, unit.start_time, unit.location_id, unit.slot_id, placement.staff)
    });
    let assignments: Vec<RosterAssignment> = order
        .into_iter()
        .map(|p| {
            let placement = &state.placements[p];
            let unit = &state.units[placement.unit];
            RosterAssignment {
                staff_id: placement.staff,
                location_id: unit.location_id,
                time_slot_id: unit.slot_id,
                date: unit.date,
                is_double_stationed: placement.mode == Mode::Half,
                double_station_pair: placement.pair,
                fte_contribution: from_milli(state.points_for(placement.unit, placement.mode)),
            }
        })
        .collect();

    let mut unmet = Vec::new();
    let mut filled = 0;
    for (index, (unit, progress)) in state.units.iter().zip(&state.progress).enumerate() {
        if progress.state != UnitState::Unmet {
            filled += u32::from(progress.state == UnitState::Filled);
            continue;
        }
        let required = unit.required_headcount();
        let seats = progress.seats();
        unmet.push(UnmetDemand {
            location_id: unit.location_id,
            time_slot_id: unit.slot_id,
            date: unit.date,
            required,
            assigned: seats,
            unmet: required.saturating_sub(seats),
            reason: progress.reason.unwrap_or(UnmetReason::NoEligibleStaff),
            unsatisfied_requirements: unit
                .requirements
                .iter()
                .filter(|r| state.matching_half_seats(index, r, None) / 2 < r.min_staff)
                .map(|r| r.id)
                .collect(),
            rejections: progress.rejections.clone(),
        });
    }

    let hours_per_shift = state.lookup.fte().hours_per_shift;
    let fte = state
        .lookup
        .all_staff()
        .filter(|s| s.active && state.availability.is_indexed(s.id))
        .map(|s| {
            let tally = state.tally(s.id);
            let category = |c: FteCategory| {
                let actual_shifts = tally.actual[c.index()] as f64 / FULL_SHIFT as f64;
                CategoryFte {
                    initial_budget: from_milli(state.availability.initial_milli(s.id, c)),
                    consumed_budget: from_milli(state.availability.consumed_milli(s.id, c)),
                    target_shifts: tally.target[c.index()] as f64 / FULL_SHIFT as f64,
                    actual_shifts,
                    deviation: tally.deviation(c) as f64 / FULL_SHIFT as f64,
                    actual_hours: actual_shifts * hours_per_shift,
                }
            };
            StaffFteSummary {
                staff_id: s.id,
                assignments: tally.assignments,
                clinical: category(FteCategory::Clinical),
                research: category(FteCategory::Research),
                admin: category(FteCategory::Admin),
            }
        })
        .collect();

    let summary = RunSummary {
        units: state.units.len() as u32,
        filled,
        unmet: unmet.len() as u32,
        assignments: assignments.len() as u32,
        double_station_pairs: pairs,
        repairs,
        fairness_passes: state.fairness_passes,
        fairness_moves: state.fairness_moves,
        squared_deviation: state.squared_deviation(),
        cancelled: state.cancelled,
    };

    RosterResult {
        period,
        assignments,
        report: DiagnosticReport {
            unmet,
            issues,
            fte,
            violations: Vec::new(),
            summary,
        },
    }
}
