use super::assignment::fill_unit;
use super::state::RunState;
use super::types::{Mode, Rejection, UnitState, UnmetReason};
use super::{eligibility, mutate};
use crate::model::StaffId;
use tracing::debug;

/// Réparation locale sans retour arrière global, après le glouton.
///
/// Pour chaque unité restée sous effectif, deux mouvements sont tentés sur
/// les membres bloqués par un chevauchement ou par leur budget :
///
/// - *déplacer* : une de leurs affectations gênantes passe à un autre membre
///   éligible, ce qui les libère pour l'unité ;
/// - *défaire puis recompléter* : une affectation gênante est retirée, le
///   membre prend l'unité, puis les unités sous effectif sont recomplétées
///   dans l'ordre de priorité. Conservé seulement si le nombre d'unités non
///   couvertes baisse strictement.
///
/// Chaque mouvement conservé fait baisser (unités non couvertes, −places
/// occupées) dans l'ordre lexicographique, donc la boucle termine. Renvoie le
/// nombre de mouvements conservés.
pub(super) fn repair(state: &mut RunState<'_>) -> u32 {
    let mut budget = state.config.max_repair_attempts;
    let mut repairs = 0;
    loop {
        let mut improved = false;
        for unit_index in 0..state.units.len() {
            while is_open(state, unit_index) {
                if relocate(state, unit_index, &mut budget)
                    || ruin_and_refill(state, unit_index, &mut budget)
                {
                    repairs += 1;
                    improved = true;
                } else {
                    break;
                }
            }
            settle(state, unit_index);
        }
        if !improved || budget == 0 {
            break;
        }
    }
    debug!(repairs, attempts_left = budget, "local repair finished");
    repairs
}

fn is_open(state: &RunState<'_>, unit_index: usize) -> bool {
    let progress = &state.progress[unit_index];
    progress.reason != Some(UnmetReason::Cancelled)
        && progress.seats() < state.units[unit_index].required_headcount()
}

fn settle(state: &mut RunState<'_>, unit_index: usize) {
    let required = state.units[unit_index].required_headcount();
    let progress = &mut state.progress[unit_index];
    if progress.seats() >= required {
        progress.state = UnitState::Filled;
        progress.reason = None;
    }
}

/// Membres refusés pour l'unité à cause d'un chevauchement ou du budget.
fn blocked_staff(state: &RunState<'_>, unit_index: usize) -> Vec<(StaffId, Rejection)> {
    state
        .lookup
        .all_staff()
        .filter(|s| !state.holds_unit(s.id, unit_index))
        .filter_map(|s| match eligibility::check(state, s, unit_index, Mode::Full) {
            Err(reason @ (Rejection::Overlap | Rejection::InsufficientBudget)) => {
                Some((s.id, reason))
            }
            _ => None,
        })
        .collect()
}

/// Affectations de `staff` à l'origine du refus : celles qui chevauchent
/// l'unité, ou celles qui consomment le même budget.
fn blockers(
    state: &RunState<'_>,
    (staff, reason): (StaffId, Rejection),
    unit_index: usize,
) -> Vec<usize> {
    let unit = &state.units[unit_index];
    state
        .placements
        .iter()
        .enumerate()
        .filter(|(_, p)| p.staff == staff && p.pair.is_none())
        .filter(|(_, p)| {
            let other = &state.units[p.unit];
            match reason {
                Rejection::Overlap => other.overlaps(unit),
                _ => other.category == unit.category,
            }
        })
        .map(|(i, _)| i)
        .collect()
}

fn take_attempt(budget: &mut u32) -> bool {
    if *budget == 0 {
        return false;
    }
    *budget -= 1;
    true
}

fn relocate(state: &mut RunState<'_>, unit_index: usize, budget: &mut u32) -> bool {
    for blocked in blocked_staff(state, unit_index) {
        let member = blocked.0;
        for placement in blockers(state, blocked, unit_index) {
            let (blocked_unit, mode) = {
                let p = &state.placements[placement];
                (p.unit, p.mode)
            };
            let takers: Vec<StaffId> = state
                .lookup
                .all_staff()
                .filter(|s| s.id != member)
                .filter(|s| {
                    eligibility::check_replacing(state, s, blocked_unit, mode, Some(placement))
                        .is_ok()
                })
                .map(|s| s.id)
                .collect();

            for taker in takers {
                if !take_attempt(budget) {
                    return false;
                }
                let checkpoint = state.checkpoint();
                if mutate::transfer(state, placement, taker).is_ok()
                    && place_full(state, unit_index, member)
                {
                    debug!(%member, %taker, unit = unit_index, "assignment relocated");
                    return true;
                }
                state.restore(checkpoint);
            }
        }
    }
    false
}

fn ruin_and_refill(state: &mut RunState<'_>, unit_index: usize, budget: &mut u32) -> bool {
    let before = state.unmet_count();
    for blocked in blocked_staff(state, unit_index) {
        let member = blocked.0;
        for placement in blockers(state, blocked, unit_index) {
            if !take_attempt(budget) {
                return false;
            }
            let checkpoint = state.checkpoint();
            mutate::unplace(state, placement);
            if place_full(state, unit_index, member) {
                for other in 0..state.units.len() {
                    if is_open(state, other) {
                        fill_unit(state, other);
                    }
                }
                if state.unmet_count() < before {
                    debug!(%member, unit = unit_index, "assignment ruined and units refilled");
                    return true;
                }
            }
            state.restore(checkpoint);
        }
    }
    false
}

fn place_full(state: &mut RunState<'_>, unit_index: usize, member: StaffId) -> bool {
    let Some(staff) = state.lookup.staff(member) else {
        return false;
    };
    eligibility::check(state, staff, unit_index, Mode::Full).is_ok()
        && mutate::place(state, unit_index, member, Mode::Full, None).is_ok()
}
