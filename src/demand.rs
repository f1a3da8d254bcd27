//! Expansion des créneaux récurrents en unités de demande datées.

use crate::model::{
    dated_slots_overlap, to_milli, DateRange, FteCategory, Location, LocationId,
    LocationStaffRequirement, LocationTimeSlot, SlotId,
};
use crate::report::{ConfigIssue, IssueKind};
use crate::scheduler::EngineError;
use chrono::{NaiveDate, NaiveTime};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Une occurrence concrète (location, date, créneau) avec son effectif requis.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandUnit {
    pub location_id: LocationId,
    pub slot_id: SlotId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub priority: i32,
    pub priority_group: Option<String>,
    pub category: FteCategory,
    pub fte_points_milli: i64,
    pub allows_double_station: bool,
    pub min_staff_required: u32,
    pub requirements: Vec<LocationStaffRequirement>,
}

impl DemandUnit {
    /// Effectif le plus strict entre le plancher de la Location et ses exigences.
    pub fn required_headcount(&self) -> u32 {
        self.requirements
            .iter()
            .map(|r| r.min_staff)
            .fold(self.min_staff_required, u32::max)
    }

    pub fn half_points_milli(&self) -> i64 {
        self.fte_points_milli / 2
    }

    /// Chevauchement horaire `[start, end)`, nuit comprise.
    pub fn overlaps(&self, other: &DemandUnit) -> bool {
        dated_slots_overlap(
            (self.date, self.start_time, self.end_time),
            (other.date, other.start_time, other.end_time),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub units: Vec<DemandUnit>,
    pub issues: Vec<ConfigIssue>,
}

/// Génère les unités de demande de la période, triées par priorité d'ordonnancement.
pub fn expand(
    locations: &[Location],
    slots: &[LocationTimeSlot],
    requirements: &[LocationStaffRequirement],
    period: DateRange,
) -> Result<Expansion, EngineError> {
    period.validate()?;

    let mut issues = Vec::new();
    let known: HashSet<LocationId> = locations.iter().map(|l| l.id).collect();
    let mut by_id: HashMap<LocationId, &Location> = HashMap::new();
    for location in locations.iter().filter(|l| l.active) {
        if let Err(message) = location.validate_points() {
            warn!(location = %location.id, %message, "location with invalid points skipped");
            issues.push(ConfigIssue::new(
                IssueKind::InvalidPoints,
                format!("location:{}", location.id),
                message,
            ));
            continue;
        }
        by_id.insert(location.id, location);
    }

    let mut reqs_by_location: HashMap<LocationId, Vec<LocationStaffRequirement>> = HashMap::new();
    for req in requirements.iter().filter(|r| r.active) {
        if !known.contains(&req.location_id) {
            warn!(requirement = %req.id, location = %req.location_id, "requirement for unknown location skipped");
            issues.push(ConfigIssue::new(
                IssueKind::UnknownLocation,
                format!("requirement:{}", req.id),
                format!("requirement references unknown location {}", req.location_id),
            ));
            continue;
        }
        reqs_by_location
            .entry(req.location_id)
            .or_default()
            .push(req.clone());
    }
    for reqs in reqs_by_location.values_mut() {
        reqs.sort_by_key(|r| r.id);
    }

    let mut units = Vec::new();
    for slot in slots.iter().filter(|s| s.active) {
        if !known.contains(&slot.location_id) {
            warn!(slot = %slot.id, location = %slot.location_id, "slot for unknown location skipped");
            issues.push(ConfigIssue::new(
                IssueKind::UnknownLocation,
                format!("slot:{}", slot.id),
                format!("slot references unknown location {}", slot.location_id),
            ));
            continue;
        }
        let Some(location) = by_id.get(&slot.location_id) else {
            continue;
        };
        if let Err(message) = slot.validate() {
            warn!(slot = %slot.id, %message, "invalid slot skipped");
            issues.push(ConfigIssue::new(
                IssueKind::InvalidSlot,
                format!("slot:{}", slot.id),
                message,
            ));
            continue;
        }
        let requirements = reqs_by_location
            .get(&location.id)
            .cloned()
            .unwrap_or_default();

        for date in period.days().filter(|d| slot.recurs_on(*d)) {
            units.push(DemandUnit {
                location_id: location.id,
                slot_id: slot.id,
                date,
                start_time: slot.start_time,
                end_time: slot.end_time,
                priority: location.priority,
                priority_group: location.priority_group.clone(),
                category: location.location_type,
                fte_points_milli: to_milli(location.fte_points),
                allows_double_station: location.allows_double_station,
                min_staff_required: location.min_staff_required,
                requirements: requirements.clone(),
            });
        }
    }

    units.sort_by(|a, b| {
        let key = |u: &DemandUnit| {
            (
                Reverse(u.priority),
                u.priority_group.clone().unwrap_or_default(),
                u.date,
                u.start_time,
                u.location_id,
                u.slot_id,
            )
        };
        key(a).cmp(&key(b))
    });
    debug!(units = units.len(), "demand expanded");

    Ok(Expansion { units, issues })
}
