use super::assignment::candidates;
use super::mutate;
use super::state::RunState;
use super::types::{Mode, UnitState, UnmetReason};
use crate::model::PairKey;
use tracing::{debug, warn};

/// Comble les places manquantes des unités en double poste avec des binômes
/// de deux demi-affectations. Renvoie le nombre de binômes créés.
pub(super) fn resolve(state: &mut RunState<'_>) -> u32 {
    let mut pairs = 0;
    for unit_index in 0..state.units.len() {
        let progress = &state.progress[unit_index];
        let unit = &state.units[unit_index];
        // non couverte ou partiellement couverte, hors annulation
        if progress.seats() >= unit.required_headcount()
            || progress.reason == Some(UnmetReason::Cancelled)
        {
            continue;
        }
        if !unit.allows_double_station || unit.half_points_milli() == 0 {
            continue;
        }
        pairs += fill_with_pairs(state, unit_index);
    }
    pairs
}

fn fill_with_pairs(state: &mut RunState<'_>, unit_index: usize) -> u32 {
    let required = state.units[unit_index].required_headcount();
    let mut pairs = 0;

    while state.progress[unit_index].seats() < required {
        let found = candidates(state, unit_index, Mode::Half);
        let &[first, second, ..] = found.ranked.as_slice() else {
            break;
        };
        let unit = &state.units[unit_index];
        let key = PairKey::derive(
            unit.location_id,
            unit.slot_id,
            unit.date,
            state.progress[unit_index].seats(),
        );

        if let Err(err) = mutate::place(state, unit_index, first, Mode::Half, Some(key)) {
            warn!(%err, "double-station placement refused");
            break;
        }
        if let Err(err) = mutate::place(state, unit_index, second, Mode::Half, Some(key)) {
            // une moitié seule ne compte pas : on annule la première
            warn!(%err, "double-station placement refused");
            mutate::retract_last(state);
            break;
        }
        pairs += 1;
        debug!(%first, %second, %key, unit = unit_index, "double-station pair placed");
    }

    let progress = &mut state.progress[unit_index];
    if progress.seats() >= required {
        progress.state = UnitState::Filled;
        progress.reason = None;
    }
    pairs
}
