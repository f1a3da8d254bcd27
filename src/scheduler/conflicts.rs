use super::{Conflict, ConflictKind};
use crate::model::{
    dated_slots_overlap, to_milli, FteCategory, LocationId, PairKey, RosterAssignment, SlotId,
    Snapshot, StaffId,
};
use crate::report::RosterResult;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Revérifie un résultat contre l'instantané qui l'a produit.
pub fn verify(snapshot: &Snapshot, result: &RosterResult) -> Vec<Conflict> {
    let mut out = Vec::new();
    let weeks = result.period.num_weeks();

    let mut by_staff: BTreeMap<StaffId, Vec<&RosterAssignment>> = BTreeMap::new();
    let mut by_unit: BTreeMap<(LocationId, SlotId, NaiveDate), i64> = BTreeMap::new();
    let mut consumed: HashMap<(StaffId, FteCategory), i64> = HashMap::new();
    let mut pairs: BTreeMap<PairKey, Vec<&RosterAssignment>> = BTreeMap::new();

    for a in &result.assignments {
        let (Some(staff), Some(location), Some(_)) = (
            snapshot.find_staff(a.staff_id),
            snapshot.find_location(a.location_id),
            snapshot.find_slot(a.time_slot_id),
        ) else {
            out.push(conflict(ConflictKind::UnknownReference, a, "assignment references unknown record"));
            continue;
        };

        let contribution = to_milli(a.fte_contribution);
        let points = to_milli(location.fte_points);
        if contribution > points {
            out.push(conflict(
                ConflictKind::Contribution,
                a,
                format!("contribution {} exceeds fte_points {}", a.fte_contribution, location.fte_points),
            ));
        }
        if a.is_double_stationed && contribution != points / 2 {
            out.push(conflict(
                ConflictKind::Contribution,
                a,
                "double-stationed contribution must be half of fte_points",
            ));
        }

        match (a.is_double_stationed, a.double_station_pair) {
            (true, Some(key)) => pairs.entry(key).or_default().push(a),
            (false, None) => {}
            _ => out.push(conflict(
                ConflictKind::BrokenPair,
                a,
                "double-station flag and pair key disagree",
            )),
        }

        let on_leave = snapshot
            .leave
            .iter()
            .any(|l| l.staff_id == staff.id && l.blocks() && l.covers(a.date));
        if on_leave {
            out.push(conflict(ConflictKind::OnLeave, a, "assignment on approved leave"));
        }

        *by_unit
            .entry((a.location_id, a.time_slot_id, a.date))
            .or_default() += contribution;
        *consumed
            .entry((staff.id, location.location_type))
            .or_default() += contribution;
        by_staff.entry(a.staff_id).or_default().push(a);
    }

    for (&staff_id, list) in &mut by_staff {
        list.sort_by_key(|a| a.date);
        for (idx, a) in list.iter().enumerate() {
            // nuit comprise : seule la veille peut déborder
            for b in list[idx + 1..].iter().take_while(|b| (b.date - a.date).num_days() <= 1) {
                if assignments_overlap(snapshot, a, b) {
                    out.push(Conflict {
                        kind: ConflictKind::Overlap,
                        staff_id: Some(staff_id),
                        location_id: Some(b.location_id),
                        time_slot_id: Some(b.time_slot_id),
                        date: Some(b.date),
                        pair: None,
                        detail: format!(
                            "overlaps slot {} at location {}",
                            a.time_slot_id, a.location_id
                        ),
                    });
                }
            }
        }
    }

    for (&(location_id, slot_id, date), &sum) in &by_unit {
        let Some(location) = snapshot.find_location(location_id) else {
            continue;
        };
        let headcount = snapshot
            .requirements
            .iter()
            .filter(|r| r.active && r.location_id == location_id)
            .map(|r| r.min_staff)
            .fold(location.min_staff_required, u32::max);
        let cap = i64::from(headcount) * to_milli(location.fte_points);
        if sum > cap {
            out.push(Conflict {
                kind: ConflictKind::Overfilled,
                staff_id: None,
                location_id: Some(location_id),
                time_slot_id: Some(slot_id),
                date: Some(date),
                pair: None,
                detail: format!("unit holds {sum} milli-fte, capacity {cap}"),
            });
        }
    }

    let mut consumed: Vec<_> = consumed.into_iter().collect();
    consumed.sort();
    for ((staff_id, category), sum) in consumed {
        let Some(staff) = snapshot.find_staff(staff_id) else {
            continue;
        };
        let budget = to_milli(staff.fraction(category)) * weeks;
        if sum > budget {
            out.push(Conflict {
                kind: ConflictKind::BudgetExceeded,
                staff_id: Some(staff_id),
                location_id: None,
                time_slot_id: None,
                date: None,
                pair: None,
                detail: format!("{category} consumption {sum} exceeds budget {budget}"),
            });
        }
    }

    for (key, members) in pairs {
        let same_unit = members.windows(2).all(|w| {
            (w[0].location_id, w[0].time_slot_id, w[0].date)
                == (w[1].location_id, w[1].time_slot_id, w[1].date)
        });
        if members.len() != 2 || !same_unit || members[0].staff_id == members[1].staff_id {
            let first = members[0];
            out.push(Conflict {
                pair: Some(key),
                ..conflict(
                    ConflictKind::BrokenPair,
                    first,
                    format!("pair key shared by {} assignments", members.len()),
                )
            });
        }
    }

    out
}

fn assignments_overlap(snapshot: &Snapshot, a: &RosterAssignment, b: &RosterAssignment) -> bool {
    let (Some(sa), Some(sb)) = (snapshot.find_slot(a.time_slot_id), snapshot.find_slot(b.time_slot_id))
    else {
        return false;
    };
    dated_slots_overlap(
        (a.date, sa.start_time, sa.end_time),
        (b.date, sb.start_time, sb.end_time),
    )
}

fn conflict<S: Into<String>>(kind: ConflictKind, a: &RosterAssignment, detail: S) -> Conflict {
    Conflict {
        kind,
        staff_id: Some(a.staff_id),
        location_id: Some(a.location_id),
        time_slot_id: Some(a.time_slot_id),
        date: Some(a.date),
        pair: a.double_station_pair,
        detail: detail.into(),
    }
}
