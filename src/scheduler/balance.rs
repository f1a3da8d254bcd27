use super::state::{shift_weight, RunState};
use super::{eligibility, mutate};
use crate::model::StaffId;
use tracing::{debug, warn};

/// Passes de transfert réduisant Σ écart² entre membres interchangeables.
///
/// Chaque transfert accepté fait strictement baisser une somme entière
/// positive ; le plafond de passes n'est qu'un garde-fou.
pub(super) fn balance(state: &mut RunState<'_>) {
    let ceiling = state.config.max_fairness_passes;
    while state.fairness_passes < ceiling {
        state.fairness_passes += 1;
        let moves = run_pass(state);
        state.fairness_moves += moves;
        debug!(
            pass = state.fairness_passes,
            moves,
            squared_deviation = state.squared_deviation(),
            "fairness pass"
        );
        if moves == 0 {
            break;
        }
    }
}

fn run_pass(state: &mut RunState<'_>) -> u32 {
    let mut moves = 0;
    for placement in 0..state.placements.len() {
        let Some(to) = best_transfer(state, placement) else {
            continue;
        };
        match mutate::transfer(state, placement, to) {
            Ok(()) => moves += 1,
            Err(err) => warn!(%err, "fairness transfer refused"),
        }
    }
    moves
}

/// Membre vers lequel transférer l'affectation pour la plus forte baisse d'écart².
fn best_transfer(state: &RunState<'_>, placement: usize) -> Option<StaffId> {
    let current = &state.placements[placement];
    let holder = state.lookup.staff(current.staff)?;
    let category = state.units[current.unit].category;
    let weight = shift_weight(current.mode);
    let from_dev = state.tally(holder.id).deviation(category);

    let mut best: Option<(i64, StaffId)> = None;
    for other in state.lookup.all_staff() {
        if other.id == holder.id
            || other.role_id != holder.role_id
            || other.group_id != holder.group_id
        {
            continue;
        }
        if eligibility::check_replacing(state, other, current.unit, current.mode, Some(placement))
            .is_err()
        {
            continue;
        }
        let to_dev = state.tally(other.id).deviation(category);
        let delta = squared_delta(from_dev, to_dev, weight);
        if delta < 0 && best.map_or(true, |(d, _)| delta < d) {
            best = Some((delta, other.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Variation de `a² + b²` quand `weight` passe de `a` vers `b`.
fn squared_delta(from_dev: i64, to_dev: i64, weight: i64) -> i64 {
    let before = from_dev * from_dev + to_dev * to_dev;
    let after = (from_dev - weight).pow(2) + (to_dev + weight).pow(2);
    after - before
}

#[cfg(test)]
mod tests {
    use super::squared_delta;

    #[test]
    fn transfer_helps_only_when_gap_exceeds_weight() {
        // A a 2 gardes d'avance, B 1 de retard : l'écart (3000) dépasse le poids
        assert!(squared_delta(2000, -1000, 1000) < 0);
        // écart égal au poids : permutation neutre, refusée
        assert_eq!(squared_delta(500, -500, 1000), 0);
        assert!(squared_delta(0, 0, 1000) > 0);
    }
}
