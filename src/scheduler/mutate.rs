use super::state::{half_seats, shift_weight, Placement, RunState};
use super::types::{Mode, SchedError, UnitState, UnmetReason};
use crate::model::{PairKey, StaffId};
use tracing::debug;

/// Enregistre une affectation et débite le budget du membre.
pub(super) fn place(
    state: &mut RunState<'_>,
    unit_index: usize,
    staff: StaffId,
    mode: Mode,
    pair: Option<PairKey>,
) -> Result<usize, SchedError> {
    let unit = &state.units[unit_index];
    let (category, date) = (unit.category, unit.date);
    let points = state.points_for(unit_index, mode);

    if !state.availability.consume(staff, category, points) {
        return Err(SchedError::BudgetExhausted(staff));
    }

    let index = state.placements.len();
    state.placements.push(Placement {
        unit: unit_index,
        staff,
        mode,
        pair,
    });
    state
        .by_staff_date
        .entry((staff, date))
        .or_default()
        .push(index);

    let tally = state.tallies.entry(staff).or_default();
    tally.assignments += 1;
    tally.actual[category.index()] += shift_weight(mode);

    state.progress[unit_index].half_seats += half_seats(mode);
    Ok(index)
}

/// Transfère une affectation existante vers un autre membre ; l'unité garde son effectif.
pub(super) fn transfer(
    state: &mut RunState<'_>,
    placement: usize,
    to: StaffId,
) -> Result<(), SchedError> {
    let Placement {
        unit: unit_index,
        staff: from,
        mode,
        ..
    } = state.placements[placement].clone();
    if from == to {
        return Err(SchedError::TransferInvalid("same staff"));
    }
    let unit = &state.units[unit_index];
    let (category, date) = (unit.category, unit.date);
    let points = state.points_for(unit_index, mode);

    if !state.availability.consume(to, category, points) {
        return Err(SchedError::BudgetExhausted(to));
    }
    state.availability.release(from, category, points);

    if let Some(list) = state.by_staff_date.get_mut(&(from, date)) {
        list.retain(|&p| p != placement);
    }
    state
        .by_staff_date
        .entry((to, date))
        .or_default()
        .push(placement);

    let weight = shift_weight(mode);
    if let Some(tally) = state.tallies.get_mut(&from) {
        tally.assignments = tally.assignments.saturating_sub(1);
        tally.actual[category.index()] -= weight;
    }
    let tally = state.tallies.entry(to).or_default();
    tally.assignments += 1;
    tally.actual[category.index()] += weight;

    state.placements[placement].staff = to;
    debug!(%from, %to, %date, unit = unit_index, "assignment transferred");
    Ok(())
}

/// Retire une affectation ; l'unité repasse sous son effectif si besoin.
pub(super) fn unplace(state: &mut RunState<'_>, placement: usize) {
    if placement >= state.placements.len() {
        return;
    }
    let removed = state.placements.remove(placement);
    let unit = &state.units[removed.unit];
    let (category, required) = (unit.category, unit.required_headcount());
    let points = state.points_for(removed.unit, removed.mode);

    state.availability.release(removed.staff, category, points);
    if let Some(tally) = state.tallies.get_mut(&removed.staff) {
        tally.assignments = tally.assignments.saturating_sub(1);
        tally.actual[category.index()] -= shift_weight(removed.mode);
    }
    let progress = &mut state.progress[removed.unit];
    progress.half_seats = progress.half_seats.saturating_sub(half_seats(removed.mode));
    if progress.seats() < required {
        progress.state = UnitState::Unmet;
        progress.reason = Some(UnmetReason::NoEligibleStaff);
    }
    state.reindex();
}

/// Annule la dernière affectation enregistrée par [`place`].
pub(super) fn retract_last(state: &mut RunState<'_>) {
    if let Some(last) = state.placements.len().checked_sub(1) {
        unplace(state, last);
    }
}
