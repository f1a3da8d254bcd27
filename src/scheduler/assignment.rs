use super::cancel::CancellationToken;
use super::state::{RunState, FULL_SHIFT};
use super::types::{Mode, Rejection, UnitState, UnmetReason};
use super::{eligibility, mutate};
use crate::model::{FteCategory, StaffId};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Candidats éligibles classés, plus le décompte des refus.
#[derive(Debug, Default)]
pub(super) struct Candidates {
    pub ranked: Vec<StaffId>,
    pub rejections: BTreeMap<Rejection, u32>,
}

pub(super) fn candidates(state: &RunState<'_>, unit_index: usize, mode: Mode) -> Candidates {
    let mut out = Candidates::default();
    for staff in state.lookup.all_staff() {
        if state.holds_unit(staff.id, unit_index) {
            continue;
        }
        match eligibility::check(state, staff, unit_index, mode) {
            Ok(()) => out.ranked.push(staff.id),
            Err(reason) => *out.rejections.entry(reason).or_default() += 1,
        }
    }
    rank(state, &mut out.ranked, state.units[unit_index].category);
    out
}

/// Plus gros manque d'abord, puis moins d'affectations, puis départage.
pub(super) fn rank(state: &RunState<'_>, ids: &mut [StaffId], category: FteCategory) {
    let weights = state.config.ranking;
    ids.sort_by_cached_key(|id| {
        let tally = state.tally(*id);
        let load = i64::from(tally.assignments) * FULL_SHIFT;
        // poids arbitraires : on sature plutôt que de déborder
        let score = weights
            .shortfall
            .saturating_mul(tally.shortfall(category))
            .saturating_sub(weights.load.saturating_mul(load));
        (Reverse(score), tally.assignments, tally.tie_key, *id)
    });
}

/// Parcourt les unités dans l'ordre de priorité et les remplit de façon gloutonne.
pub(super) fn solve(state: &mut RunState<'_>, cancel: &CancellationToken) {
    for unit_index in 0..state.units.len() {
        if cancel.is_cancelled() {
            cancel_remaining(state, unit_index);
            return;
        }
        fill_unit(state, unit_index);
    }
}

pub(super) fn fill_unit(state: &mut RunState<'_>, unit_index: usize) {
    let required = state.units[unit_index].required_headcount();
    loop {
        if state.progress[unit_index].seats() >= required {
            let progress = &mut state.progress[unit_index];
            progress.state = UnitState::Filled;
            progress.reason = None;
            return;
        }

        let found = candidates(state, unit_index, Mode::Full);
        let Some(&best) = found.ranked.first() else {
            let unit = &state.units[unit_index];
            debug!(
                location = %unit.location_id,
                slot = %unit.slot_id,
                date = %unit.date,
                seats = state.progress[unit_index].seats(),
                required,
                "unit unmet"
            );
            mark_unmet(state, unit_index, found.rejections);
            return;
        };

        if let Err(err) = mutate::place(state, unit_index, best, Mode::Full, None) {
            warn!(%err, "placement refused");
            mark_unmet(state, unit_index, found.rejections);
            return;
        }
        state.progress[unit_index].state = UnitState::PartiallyFilled;
    }
}

fn mark_unmet(state: &mut RunState<'_>, unit_index: usize, rejections: BTreeMap<Rejection, u32>) {
    let progress = &mut state.progress[unit_index];
    progress.state = UnitState::Unmet;
    progress.reason = Some(UnmetReason::NoEligibleStaff);
    progress.rejections = rejections;
}

fn cancel_remaining(state: &mut RunState<'_>, from: usize) {
    info!(
        processed = from,
        remaining = state.units.len() - from,
        "roster generation cancelled"
    );
    for progress in state.progress.iter_mut().skip(from) {
        progress.state = UnitState::Unmet;
        progress.reason = Some(UnmetReason::Cancelled);
    }
    state.cancelled = true;
}
