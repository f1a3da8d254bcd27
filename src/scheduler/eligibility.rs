use super::state::{half_seats, satisfies, RunState};
use super::types::{Mode, Rejection};
use crate::model::{LocationStaffRequirement, Staff};

/// Prédicat d'éligibilité d'un membre pour une unité ; renvoie la première
/// contrainte violée.
pub(super) fn check(
    state: &RunState<'_>,
    staff: &Staff,
    unit_index: usize,
    mode: Mode,
) -> Result<(), Rejection> {
    check_replacing(state, staff, unit_index, mode, None)
}

/// Comme [`check`], en considérant l'affectation `replacing` déjà libérée
/// (transfert d'une affectation existante vers `staff`).
pub(super) fn check_replacing(
    state: &RunState<'_>,
    staff: &Staff,
    unit_index: usize,
    mode: Mode,
    replacing: Option<usize>,
) -> Result<(), Rejection> {
    let unit = &state.units[unit_index];

    if !staff.active || !state.availability.is_indexed(staff.id) {
        return Err(Rejection::Inactive);
    }
    if !state.availability.is_available(staff.id, unit.date) {
        return Err(Rejection::OnLeave);
    }
    requirement_fit(state, staff, unit_index, mode, replacing)?;
    let overlapping = state
        .placements_near(staff.id, unit.date)
        .filter(|&p| Some(p) != replacing)
        .any(|p| state.units[state.placements[p].unit].overlaps(unit));
    if overlapping {
        return Err(Rejection::Overlap);
    }
    let needed = state.points_for(unit_index, mode);
    if state.availability.remaining_milli(staff.id, unit.category) < needed {
        return Err(Rejection::InsufficientBudget);
    }
    Ok(())
}

/// Les exigences nommant un rôle ou un groupe comptent des places : un membre
/// qui n'en satisfait pas une n'est refusé que si les places restantes ne
/// suffiraient plus à combler les manques.
fn requirement_fit(
    state: &RunState<'_>,
    staff: &Staff,
    unit_index: usize,
    mode: Mode,
    replacing: Option<usize>,
) -> Result<(), Rejection> {
    let unit = &state.units[unit_index];
    let weight = i64::from(half_seats(mode));

    // (exigence, demi-places encore manquantes)
    let gaps: Vec<(&LocationStaffRequirement, i64)> = unit
        .requirements
        .iter()
        .filter(|r| r.is_scoped())
        .map(|r| {
            let held = state.matching_half_seats(unit_index, r, replacing);
            (r, (i64::from(r.min_staff) * 2 - i64::from(held)).max(0))
        })
        .filter(|(_, gap)| *gap > 0)
        .collect();

    let Some(&(missed, _)) = gaps.iter().find(|(r, _)| !satisfies(staff, r)) else {
        return Ok(());
    };

    let occupied: i64 = state
        .unit_placements(unit_index)
        .filter(|&p| Some(p) != replacing)
        .map(|p| i64::from(half_seats(state.placements[p].mode)))
        .sum();
    let open_after = i64::from(unit.required_headcount()) * 2 - occupied - weight;
    let gaps_after: i64 = gaps
        .iter()
        .map(|(r, gap)| if satisfies(staff, r) { (gap - weight).max(0) } else { *gap })
        .sum();
    if gaps_after <= open_after {
        return Ok(());
    }

    if missed.role_id.is_some_and(|role| role != staff.role_id) {
        Err(Rejection::RoleMismatch)
    } else {
        Err(Rejection::GroupMismatch)
    }
}
