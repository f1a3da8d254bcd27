#![allow(dead_code)]
use chrono::{NaiveDate, NaiveTime};
use rostering::model::{LeaveId, LocationId, RoleId, StaffId};
use rostering::{
    DateRange, LeaveRequest, LeaveStatus, LeaveType, Location, LocationTimeSlot, Role, Snapshot,
    Staff,
};

pub const WEEKDAYS: [u8; 5] = [1, 2, 3, 4, 5];

/// Janvier 2025 : le 6 est un lundi.
pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn range(start: u32, end: u32) -> DateRange {
    DateRange::new(date(start), date(end)).unwrap()
}

/// Lundi → vendredi.
pub fn work_week() -> DateRange {
    range(6, 10)
}

pub fn role(id: u64, name: &str) -> Role {
    Role {
        id: RoleId(id),
        name: name.into(),
        description: None,
        active: true,
    }
}

pub fn staff(id: u64, clinical: f64) -> Staff {
    let mut s = Staff::new(id, RoleId(1));
    s.fte_clinical = clinical;
    s
}

pub fn approved_leave(id: u64, staff: u64, start: u32, end: u32) -> LeaveRequest {
    LeaveRequest {
        id: LeaveId(id),
        staff_id: StaffId(staff),
        leave_type: LeaveType::NonUrgent,
        start_date: date(start),
        end_date: date(end),
        status: LeaveStatus::Approved,
        active: true,
    }
}

pub fn thyroid_clinic() -> Location {
    let mut loc = Location::new(1, "Thyroid Clinic");
    loc.priority = 5;
    loc.min_staff_required = 1;
    loc.fte_points = 0.1;
    loc.allows_double_station = false;
    loc
}

pub fn morning_slot(id: u64, location: LocationId, days: &[u8]) -> LocationTimeSlot {
    LocationTimeSlot::new(id, location, time(8, 0), time(12, 0), days.to_vec())
}

/// Thyroid Clinic, créneau lun–ven 08:00–12:00, un membre à 1.0 FTE clinique.
pub fn thyroid_snapshot() -> Snapshot {
    let loc = thyroid_clinic();
    Snapshot {
        staff: vec![staff(1, 1.0)],
        roles: vec![role(1, "Radiologist"), role(2, "Senior Radiologist")],
        time_slots: vec![morning_slot(1, loc.id, &WEEKDAYS)],
        locations: vec![loc],
        ..Snapshot::default()
    }
}

/// Plusieurs postes, priorités, créneaux qui se chevauchent et congés.
pub fn busy_department(extra_staff: usize) -> Snapshot {
    let mut locations = Vec::new();
    let mut slots = Vec::new();
    for (idx, (name, priority, min_staff)) in [
        ("CT", 9, 2u32),
        ("MRI", 7, 1),
        ("Ultrasound", 5, 1),
        ("Reporting", 1, 2),
    ]
    .into_iter()
    .enumerate()
    {
        let mut loc = Location::new(idx as u64 + 1, name);
        loc.priority = priority;
        loc.min_staff_required = min_staff;
        loc.fte_points = 0.1;
        loc.allows_double_station = name == "Reporting";
        slots.push(morning_slot(idx as u64 * 10 + 1, loc.id, &WEEKDAYS));
        slots.push(LocationTimeSlot::new(
            idx as u64 * 10 + 2,
            loc.id,
            time(11, 0),
            time(15, 0),
            WEEKDAYS.to_vec(),
        ));
        locations.push(loc);
    }

    let mut members = vec![
        staff(1, 1.0),
        staff(2, 0.8),
        staff(3, 0.6),
        staff(4, 0.35),
        staff(5, 0.25),
    ];
    for n in 0..extra_staff {
        members.push(staff(100 + n as u64, 1.0));
    }

    Snapshot {
        staff: members,
        roles: vec![role(1, "Radiologist")],
        locations,
        time_slots: slots,
        leave: vec![approved_leave(1, 2, 7, 8), approved_leave(2, 3, 10, 10)],
        ..Snapshot::default()
    }
}
