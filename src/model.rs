use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::scheduler::EngineError;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifiant fort pour Staff
    StaffId
);
id_type!(RoleId);
id_type!(GroupId);
id_type!(LocationId);
id_type!(SlotId);
id_type!(RequirementId);
id_type!(LeaveId);
id_type!(FteConfigId);

fn default_true() -> bool {
    true
}

/// Catégorie FTE, portée par le type de la Location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FteCategory {
    Clinical,
    Research,
    Admin,
}

impl FteCategory {
    pub const ALL: [FteCategory; 3] = [
        FteCategory::Clinical,
        FteCategory::Research,
        FteCategory::Admin,
    ];

    pub fn index(self) -> usize {
        match self {
            FteCategory::Clinical => 0,
            FteCategory::Research => 1,
            FteCategory::Admin => 2,
        }
    }
}

impl fmt::Display for FteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FteCategory::Clinical => "clinical",
            FteCategory::Research => "research",
            FteCategory::Admin => "admin",
        };
        f.write_str(s)
    }
}

/// Membre du personnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub user_id: u64,
    pub role_id: RoleId,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default = "default_clinical")]
    pub fte_clinical: f64,
    #[serde(default)]
    pub fte_research: f64,
    #[serde(default)]
    pub fte_admin: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_clinical() -> f64 {
    1.0
}

impl Staff {
    pub fn new(id: u64, role_id: RoleId) -> Self {
        Self {
            id: StaffId(id),
            user_id: id,
            role_id,
            group_id: None,
            fte_clinical: 1.0,
            fte_research: 0.0,
            fte_admin: 0.0,
            active: true,
        }
    }

    pub fn fraction(&self, category: FteCategory) -> f64 {
        match category {
            FteCategory::Clinical => self.fte_clinical,
            FteCategory::Research => self.fte_research,
            FteCategory::Admin => self.fte_admin,
        }
    }

    /// Vérifie que chaque fraction est dans [0,1] et que leur somme ≤ 1.
    pub fn validate_fte(&self) -> Result<(), String> {
        for category in FteCategory::ALL {
            let value = self.fraction(category);
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("fte_{category} out of [0,1]: {value}"));
            }
        }
        let total = self.fte_clinical + self.fte_research + self.fte_admin;
        // tolérance sur l'arrondi des fractions saisies
        if total > 1.0 + 1e-9 {
            return Err(format!("fte fractions sum to {total:.3} > 1.0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffGroup {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Lieu de travail (poste clinique, recherche ou administratif).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default = "default_location_type")]
    pub location_type: FteCategory,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub priority_group: Option<String>,
    #[serde(default = "default_min_staff")]
    pub min_staff_required: u32,
    #[serde(default = "default_fte_points")]
    pub fte_points: f64,
    #[serde(default)]
    pub allows_double_station: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_location_type() -> FteCategory {
    FteCategory::Clinical
}

fn default_min_staff() -> u32 {
    1
}

fn default_fte_points() -> f64 {
    0.1
}

impl Location {
    pub fn new<N: Into<String>>(id: u64, name: N) -> Self {
        Self {
            id: LocationId(id),
            name: name.into(),
            location_type: FteCategory::Clinical,
            priority: 0,
            priority_group: None,
            min_staff_required: 1,
            fte_points: 0.1,
            allows_double_station: false,
            active: true,
        }
    }

    /// `fte_points` doit être un nombre fini dans `[0, 1]`.
    pub fn validate_points(&self) -> Result<(), String> {
        if !self.fte_points.is_finite() || !(0.0..=1.0).contains(&self.fte_points) {
            return Err(format!(
                "fte_points {} out of [0,1] for location {}",
                self.fte_points, self.id
            ));
        }
        Ok(())
    }
}

/// Créneau récurrent d'une Location. `days_of_week` en numérotation ISO (1 = lundi).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTimeSlot {
    pub id: SlotId,
    pub location_id: LocationId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub days_of_week: Vec<u8>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl LocationTimeSlot {
    pub fn new(
        id: u64,
        location_id: LocationId,
        start_time: NaiveTime,
        end_time: NaiveTime,
        days_of_week: Vec<u8>,
    ) -> Self {
        Self {
            id: SlotId(id),
            location_id,
            start_time,
            end_time,
            days_of_week,
            active: true,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.start_time == self.end_time {
            return Err("slot start_time and end_time cannot be equal".to_string());
        }
        if self.days_of_week.is_empty() {
            return Err("slot must define at least one day".to_string());
        }
        if let Some(day) = self.days_of_week.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(format!("invalid weekday {day} (expected 1..=7)"));
        }
        Ok(())
    }

    pub fn recurs_on(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().number_from_monday() as u8;
        self.days_of_week.contains(&weekday)
    }
}

/// Bornes d'un créneau en minutes depuis minuit ; un créneau de nuit déborde après 24h.
pub fn slot_bounds_minutes(start: NaiveTime, end: NaiveTime) -> (u32, u32) {
    let start_min = start.num_seconds_from_midnight() / 60;
    let mut end_min = end.num_seconds_from_midnight() / 60;
    if end <= start {
        end_min += 24 * 60;
    }
    (start_min, end_min)
}

/// Créneau daté `(date, début, fin)`.
pub type DatedSlot = (NaiveDate, NaiveTime, NaiveTime);

/// Chevauchement de deux créneaux datés ; un créneau de nuit empiète sur le lendemain.
pub fn dated_slots_overlap(a: DatedSlot, b: DatedSlot) -> bool {
    let offset = (b.0 - a.0).num_days();
    if offset.abs() > 1 {
        return false;
    }
    let (a_start, a_end) = slot_bounds_minutes(a.1, a.2);
    let (b_start, b_end) = slot_bounds_minutes(b.1, b.2);
    let shift = offset * 24 * 60;
    let (b_start, b_end) = (i64::from(b_start) + shift, i64::from(b_end) + shift);
    i64::from(a_start) < b_end && b_start < i64::from(a_end)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStaffRequirement {
    pub id: RequirementId,
    pub location_id: LocationId,
    #[serde(default)]
    pub role_id: Option<RoleId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default = "default_min_staff")]
    pub min_staff: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl LocationStaffRequirement {
    /// Une exigence sans rôle ni groupe s'applique à tout le monde.
    pub fn is_scoped(&self) -> bool {
        self.role_id.is_some() || self.group_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Forecast,
    NonUrgent,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Demande de congé, intervalle de dates inclusif [start_date, end_date].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: LeaveId,
    pub staff_id: StaffId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl LeaveRequest {
    pub fn blocks(&self) -> bool {
        self.active && self.status == LeaveStatus::Approved
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FteConfiguration {
    pub id: FteConfigId,
    pub name: String,
    pub shifts_per_week: f64,
    pub hours_per_shift: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Default for FteConfiguration {
    fn default() -> Self {
        Self {
            id: FteConfigId(0),
            name: "Standard Shift".to_string(),
            shifts_per_week: 10.0,
            hours_per_shift: 4.0,
            active: true,
        }
    }
}

/// Période de planification, bornes incluses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.end < self.start {
            return Err(EngineError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Nombre de semaines entamées (au moins une).
    pub fn num_weeks(&self) -> i64 {
        ((self.num_days() + 6) / 7).max(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days().max(0)).map(move |offset| start + Duration::days(offset))
    }
}

/// Clé de binôme partagée par les deux moitiés d'un double poste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(Uuid);

impl PairKey {
    /// Clé déterministe : même unité et même place donnent la même clé.
    pub fn derive(location: LocationId, slot: SlotId, date: NaiveDate, seat: u32) -> Self {
        let name = format!("{location}:{slot}:{date}:{seat}");
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Affectation produite par le moteur (sans identifiant de persistance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterAssignment {
    pub staff_id: StaffId,
    pub location_id: LocationId,
    pub time_slot_id: SlotId,
    pub date: NaiveDate,
    pub is_double_stationed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_station_pair: Option<PairKey>,
    pub fte_contribution: f64,
}

/// Instantané complet des entités consommées par le moteur.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub staff: Vec<Staff>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub groups: Vec<StaffGroup>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub time_slots: Vec<LocationTimeSlot>,
    #[serde(default)]
    pub requirements: Vec<LocationStaffRequirement>,
    #[serde(default)]
    pub leave: Vec<LeaveRequest>,
    #[serde(default)]
    pub fte_configurations: Vec<FteConfiguration>,
}

impl Snapshot {
    pub fn find_staff(&self, id: StaffId) -> Option<&Staff> {
        self.staff.iter().find(|s| s.id == id)
    }
    pub fn find_location(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }
    pub fn find_slot(&self, id: SlotId) -> Option<&LocationTimeSlot> {
        self.time_slots.iter().find(|s| s.id == id)
    }
}

/// Conversion en millièmes, unité exacte utilisée dans le moteur.
pub fn to_milli(value: f64) -> i64 {
    (value * 1000.0).round() as i64
}

pub fn from_milli(value: i64) -> f64 {
    value as f64 / 1000.0
}
