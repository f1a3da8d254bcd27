use super::lookup::Lookup;
use super::types::{Mode, Rejection, UnitState, UnmetReason};
use crate::availability::AvailabilityIndex;
use crate::config::EngineConfig;
use crate::demand::DemandUnit;
use crate::model::{DateRange, FteCategory, LocationStaffRequirement, PairKey, Staff, StaffId};
use chrono::NaiveDate;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};

/// Milli-gardes comptées pour une affectation complète.
pub(crate) const FULL_SHIFT: i64 = 1000;

#[derive(Debug, Clone)]
pub(crate) struct Progress {
    pub state: UnitState,
    /// Demi-places occupées : 2 par affectation complète, 1 par moitié de binôme.
    pub half_seats: u32,
    pub reason: Option<UnmetReason>,
    pub rejections: BTreeMap<Rejection, u32>,
}

impl Progress {
    pub fn seats(&self) -> u32 {
        self.half_seats / 2
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Placement {
    pub unit: usize,
    pub staff: StaffId,
    pub mode: Mode,
    pub pair: Option<PairKey>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Tally {
    pub assignments: u32,
    pub actual: [i64; 3],
    pub target: [i64; 3],
    pub tie_key: u64,
}

impl Tally {
    pub fn deviation(&self, category: FteCategory) -> i64 {
        self.actual[category.index()] - self.target[category.index()]
    }

    pub fn shortfall(&self, category: FteCategory) -> i64 {
        -self.deviation(category)
    }
}

/// Copie des parties mutables de l'état, pour annuler une tentative de réparation.
pub(crate) struct Checkpoint {
    availability: AvailabilityIndex,
    progress: Vec<Progress>,
    placements: Vec<Placement>,
    by_staff_date: HashMap<(StaffId, NaiveDate), Vec<usize>>,
    tallies: HashMap<StaffId, Tally>,
}

/// État mutable d'une exécution ; rien n'en sort hormis le résultat.
pub(crate) struct RunState<'a> {
    pub lookup: &'a Lookup<'a>,
    pub config: &'a EngineConfig,
    pub availability: AvailabilityIndex,
    pub units: Vec<DemandUnit>,
    pub progress: Vec<Progress>,
    pub placements: Vec<Placement>,
    pub by_staff_date: HashMap<(StaffId, NaiveDate), Vec<usize>>,
    pub tallies: HashMap<StaffId, Tally>,
    pub cancelled: bool,
    pub fairness_passes: u32,
    pub fairness_moves: u32,
}

impl<'a> RunState<'a> {
    pub fn new(
        lookup: &'a Lookup<'a>,
        config: &'a EngineConfig,
        availability: AvailabilityIndex,
        units: Vec<DemandUnit>,
        period: DateRange,
    ) -> Self {
        let fte = lookup.fte();
        let days = period.num_days() as f64;
        let mut rng = config.tie_break_seed.map(StdRng::seed_from_u64);

        let mut tallies = HashMap::new();
        for member in lookup.all_staff() {
            let mut target = [0i64; 3];
            // cible nulle hors personnel actif indexé
            if member.active && availability.is_indexed(member.id) {
                for category in FteCategory::ALL {
                    let shifts = member.fraction(category) * fte.shifts_per_week * days / 7.0;
                    target[category.index()] = (shifts * FULL_SHIFT as f64).round() as i64;
                }
            }
            // tirage dans l'ordre des identifiants : même graine, mêmes clés
            let tie_key = rng.as_mut().map_or(0, |r| r.random::<u64>());
            tallies.insert(
                member.id,
                Tally {
                    target,
                    tie_key,
                    ..Tally::default()
                },
            );
        }

        let progress = units
            .iter()
            .map(|_| Progress {
                state: UnitState::Unfilled,
                half_seats: 0,
                reason: None,
                rejections: BTreeMap::new(),
            })
            .collect();

        Self {
            lookup,
            config,
            availability,
            units,
            progress,
            placements: Vec::new(),
            by_staff_date: HashMap::new(),
            tallies,
            cancelled: false,
            fairness_passes: 0,
            fairness_moves: 0,
        }
    }

    pub fn tally(&self, staff: StaffId) -> Tally {
        self.tallies.get(&staff).cloned().unwrap_or_default()
    }

    pub fn placements_on(&self, staff: StaffId, date: NaiveDate) -> &[usize] {
        self.by_staff_date
            .get(&(staff, date))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Affectations du membre la veille, le jour même et le lendemain.
    pub fn placements_near(&self, staff: StaffId, date: NaiveDate) -> impl Iterator<Item = usize> + '_ {
        [date.pred_opt(), Some(date), date.succ_opt()]
            .into_iter()
            .flatten()
            .flat_map(move |d| self.placements_on(staff, d).iter().copied())
    }

    pub fn unit_placements(&self, unit: usize) -> impl Iterator<Item = usize> + '_ {
        self.placements
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.unit == unit)
            .map(|(i, _)| i)
    }

    /// Demi-places occupées dans l'unité par des membres satisfaisant `req`.
    pub fn matching_half_seats(
        &self,
        unit: usize,
        req: &LocationStaffRequirement,
        skip: Option<usize>,
    ) -> u32 {
        self.unit_placements(unit)
            .filter(|&p| Some(p) != skip)
            .filter(|&p| {
                self.lookup
                    .staff(self.placements[p].staff)
                    .is_some_and(|s| satisfies(s, req))
            })
            .map(|p| half_seats(self.placements[p].mode))
            .sum()
    }

    /// Unités sous leur effectif requis.
    pub fn unmet_count(&self) -> usize {
        self.units
            .iter()
            .zip(&self.progress)
            .filter(|(u, p)| p.seats() < u.required_headcount())
            .count()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            availability: self.availability.clone(),
            progress: self.progress.clone(),
            placements: self.placements.clone(),
            by_staff_date: self.by_staff_date.clone(),
            tallies: self.tallies.clone(),
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.availability = checkpoint.availability;
        self.progress = checkpoint.progress;
        self.placements = checkpoint.placements;
        self.by_staff_date = checkpoint.by_staff_date;
        self.tallies = checkpoint.tallies;
    }

    /// Reconstruit l'index (membre, date) après suppression d'une affectation.
    pub fn reindex(&mut self) {
        self.by_staff_date.clear();
        for (index, placement) in self.placements.iter().enumerate() {
            let date = self.units[placement.unit].date;
            self.by_staff_date
                .entry((placement.staff, date))
                .or_default()
                .push(index);
        }
    }

    pub fn holds_unit(&self, staff: StaffId, unit: usize) -> bool {
        let date = self.units[unit].date;
        self.placements_on(staff, date)
            .iter()
            .any(|&p| self.placements[p].unit == unit)
    }

    pub fn points_for(&self, unit: usize, mode: Mode) -> i64 {
        let unit = &self.units[unit];
        match mode {
            Mode::Full => unit.fte_points_milli,
            Mode::Half => unit.half_points_milli(),
        }
    }

    /// Somme des écarts² sur tout le personnel et toutes les catégories.
    pub fn squared_deviation(&self) -> i64 {
        self.tallies
            .values()
            .flat_map(|t| FteCategory::ALL.map(|c| t.deviation(c)))
            .map(|d| d * d)
            .sum()
    }
}

pub(crate) fn half_seats(mode: Mode) -> u32 {
    match mode {
        Mode::Full => 2,
        Mode::Half => 1,
    }
}

/// Un membre satisfait une exigence s'il a le rôle et le groupe qu'elle nomme.
pub(crate) fn satisfies(staff: &Staff, req: &LocationStaffRequirement) -> bool {
    req.role_id.map_or(true, |role| role == staff.role_id)
        && req.group_id.map_or(true, |group| Some(group) == staff.group_id)
}

pub(crate) fn shift_weight(mode: Mode) -> i64 {
    match mode {
        Mode::Full => FULL_SHIFT,
        Mode::Half => FULL_SHIFT / 2,
    }
}
