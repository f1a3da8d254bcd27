#![forbid(unsafe_code)]
mod common;

use common::*;
use rostering::model::{FteConfigId, GroupId, LocationId, RequirementId, RoleId, StaffId};
use rostering::scheduler::{Rejection, UnmetReason};
use rostering::{
    CancellationToken, EngineConfig, EngineError, FteCategory, FteConfiguration, IssueKind,
    Location, LocationStaffRequirement, LocationTimeSlot, RankingWeights, Scheduler, StaffGroup,
};
use std::time::Duration;

#[test]
fn thyroid_clinic_fills_every_weekday() {
    let snapshot = thyroid_snapshot();
    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();

    assert_eq!(result.assignments.len(), 5);
    assert!(result.report.unmet.is_empty());
    assert_eq!(result.report.summary.filled, 5);
    assert!(result
        .assignments
        .iter()
        .all(|a| a.staff_id == StaffId(1) && a.fte_contribution == 0.1 && !a.is_double_stationed));

    let fte = result.fte_for(StaffId(1)).unwrap();
    assert_eq!(fte.category(FteCategory::Clinical).consumed_budget, 0.5);
    assert_eq!(fte.category(FteCategory::Clinical).initial_budget, 1.0);
    assert!(result.report.violations.is_empty());
}

#[test]
fn approved_leave_leaves_wednesday_unmet() {
    let mut snapshot = thyroid_snapshot();
    snapshot.leave.push(approved_leave(1, 1, 8, 8));

    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();

    assert_eq!(result.assignments.len(), 4);
    assert!(result.assignments.iter().all(|a| a.date != date(8)));
    assert_eq!(result.report.unmet.len(), 1);
    let unmet = &result.report.unmet[0];
    assert_eq!(unmet.date, date(8));
    assert_eq!(unmet.unmet, 1);
    assert_eq!(unmet.reason, UnmetReason::NoEligibleStaff);
    assert_eq!(unmet.reason.to_string(), "no eligible staff");
    assert_eq!(unmet.rejections.get(&Rejection::OnLeave), Some(&1));
}

#[test]
fn pending_leave_does_not_block() {
    let mut snapshot = thyroid_snapshot();
    let mut leave = approved_leave(1, 1, 8, 8);
    leave.status = rostering::LeaveStatus::Pending;
    snapshot.leave.push(leave);

    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();
    assert_eq!(result.assignments.len(), 5);
}

#[test]
fn two_staff_fill_a_two_person_unit_with_full_points() {
    let mut snapshot = thyroid_snapshot();
    snapshot.locations[0].min_staff_required = 2;
    snapshot.staff.push(staff(2, 1.0));

    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();

    assert_eq!(result.assignments.len(), 2);
    let mut holders: Vec<_> = result.assignments.iter().map(|a| a.staff_id).collect();
    holders.sort();
    assert_eq!(holders, vec![StaffId(1), StaffId(2)]);
    assert!(result
        .assignments
        .iter()
        .all(|a| a.fte_contribution == 0.1 && a.double_station_pair.is_none()));
    assert!(result.report.unmet.is_empty());
}

#[test]
fn inverted_range_is_rejected() {
    let snapshot = thyroid_snapshot();
    let period = rostering::DateRange {
        start: date(10),
        end: date(6),
    };
    let err = Scheduler::default().generate(&snapshot, period).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange { .. }));
}

#[test]
fn role_requirement_restricts_candidates() {
    let mut snapshot = thyroid_snapshot();
    let mut senior = staff(2, 1.0);
    senior.role_id = RoleId(2);
    snapshot.staff.push(senior);
    snapshot.requirements.push(LocationStaffRequirement {
        id: RequirementId(1),
        location_id: LocationId(1),
        role_id: Some(RoleId(2)),
        group_id: None,
        min_staff: 1,
        active: true,
    });

    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();
    assert_eq!(result.assignments.len(), 5);
    assert!(result.assignments.iter().all(|a| a.staff_id == StaffId(2)));
}

#[test]
fn unmet_requirement_is_cited() {
    let mut snapshot = thyroid_snapshot();
    snapshot.requirements.push(LocationStaffRequirement {
        id: RequirementId(7),
        location_id: LocationId(1),
        role_id: None,
        group_id: None,
        min_staff: 2,
        active: true,
    });

    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();
    assert_eq!(result.assignments.len(), 1);
    let unmet = &result.report.unmet[0];
    assert_eq!(unmet.required, 2);
    assert_eq!(unmet.assigned, 1);
    assert_eq!(unmet.unsatisfied_requirements, vec![RequirementId(7)]);
}

#[test]
fn requirement_with_unknown_group_is_skipped_and_reported() {
    let mut snapshot = thyroid_snapshot();
    snapshot.requirements.push(LocationStaffRequirement {
        id: RequirementId(3),
        location_id: LocationId(1),
        role_id: None,
        group_id: Some(GroupId(42)),
        min_staff: 1,
        active: true,
    });

    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();
    assert_eq!(result.assignments.len(), 5);
    assert!(result
        .report
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::UnknownGroup && i.subject == "requirement:3"));
}

#[test]
fn overlapping_slots_never_share_a_person() {
    let mut snapshot = thyroid_snapshot();
    // créneau de nuit qui déborde sur le lendemain, et un second à cheval
    snapshot.time_slots = vec![
        LocationTimeSlot::new(1, LocationId(1), time(22, 0), time(6, 0), vec![1]),
        LocationTimeSlot::new(2, LocationId(1), time(23, 0), time(1, 0), vec![1]),
    ];

    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.report.unmet.len(), 1);
    assert_eq!(
        result.report.unmet[0].rejections.get(&Rejection::Overlap),
        Some(&1)
    );
}

#[test]
fn shortfall_ranking_prefers_staff_behind_target() {
    let mut snapshot = thyroid_snapshot();
    snapshot.staff = vec![staff(1, 0.2), staff(2, 1.0)];

    let result = Scheduler::new(EngineConfig {
        fairness: false,
        ..EngineConfig::default()
    })
    .generate(&snapshot, range(6, 6))
    .unwrap();
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.assignments[0].staff_id, StaffId(2));
}

#[test]
fn budget_caps_assignments() {
    let mut snapshot = thyroid_snapshot();
    snapshot.staff = vec![staff(1, 0.3)];

    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();
    assert_eq!(result.assignments.len(), 3);
    assert_eq!(result.report.unmet.len(), 2);
    assert!(result
        .report
        .unmet
        .iter()
        .all(|u| u.rejections.get(&Rejection::InsufficientBudget) == Some(&1)));
}

#[test]
fn double_station_pairs_staff_with_half_budgets() {
    let mut snapshot = thyroid_snapshot();
    snapshot.locations[0].allows_double_station = true;
    snapshot.locations[0].fte_points = 0.2;
    snapshot.staff = vec![staff(1, 0.1), staff(2, 0.1), staff(3, 0.1)];

    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();

    assert!(result.report.unmet.is_empty());
    assert_eq!(result.report.summary.double_station_pairs, 1);
    assert_eq!(result.assignments.len(), 2);
    let key = result.assignments[0].double_station_pair.unwrap();
    for a in &result.assignments {
        assert!(a.is_double_stationed);
        assert_eq!(a.fte_contribution, 0.1);
        assert_eq!(a.double_station_pair, Some(key));
    }
    let mut holders: Vec<_> = result.assignments.iter().map(|a| a.staff_id).collect();
    holders.sort();
    assert_eq!(holders, vec![StaffId(1), StaffId(2)]);
    assert!(result.report.violations.is_empty());
}

#[test]
fn double_station_disabled_leaves_unit_unmet() {
    let mut snapshot = thyroid_snapshot();
    snapshot.locations[0].fte_points = 0.2;
    snapshot.staff = vec![staff(1, 0.1), staff(2, 0.1)];

    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();
    assert!(result.assignments.is_empty());
    assert_eq!(
        result.report.unmet[0].rejections.get(&Rejection::InsufficientBudget),
        Some(&2)
    );
}

#[test]
fn single_half_candidate_is_not_paired() {
    let mut snapshot = thyroid_snapshot();
    snapshot.locations[0].allows_double_station = true;
    snapshot.locations[0].fte_points = 0.2;
    snapshot.staff = vec![staff(1, 0.1)];

    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();
    assert!(result.assignments.is_empty());
    assert_eq!(result.report.summary.double_station_pairs, 0);
}

#[test]
fn fairness_pass_moves_work_towards_target() {
    let mut snapshot = thyroid_snapshot();
    snapshot.time_slots = vec![morning_slot(1, LocationId(1), &[1, 2, 3, 4])];
    snapshot.staff = vec![staff(1, 1.0), staff(2, 0.3)];
    // classement par charge seule : la glouton alterne A/B
    let ranking = RankingWeights {
        shortfall: 0,
        load: 1,
    };

    let unbalanced = Scheduler::new(EngineConfig {
        ranking,
        fairness: false,
        ..EngineConfig::default()
    })
    .generate(&snapshot, range(6, 12))
    .unwrap();
    assert_eq!(unbalanced.assignments_for(StaffId(2)).count(), 2);

    let balanced = Scheduler::new(EngineConfig {
        ranking,
        ..EngineConfig::default()
    })
    .generate(&snapshot, range(6, 12))
    .unwrap();
    assert_eq!(balanced.assignments_for(StaffId(1)).count(), 4);
    assert_eq!(balanced.report.summary.fairness_moves, 2);
    assert_eq!(balanced.report.summary.fairness_passes, 2);
    assert!(
        balanced.report.summary.squared_deviation < unbalanced.report.summary.squared_deviation
    );
    assert_eq!(
        balanced
            .fte_for(StaffId(2))
            .unwrap()
            .category(FteCategory::Clinical)
            .consumed_budget,
        0.0
    );
}

#[test]
fn fairness_ceiling_bounds_passes() {
    let mut snapshot = thyroid_snapshot();
    snapshot.time_slots = vec![morning_slot(1, LocationId(1), &[1, 2, 3, 4])];
    snapshot.staff = vec![staff(1, 1.0), staff(2, 0.3)];

    let result = Scheduler::new(EngineConfig {
        ranking: RankingWeights {
            shortfall: 0,
            load: 1,
        },
        max_fairness_passes: 1,
        ..EngineConfig::default()
    })
    .generate(&snapshot, range(6, 12))
    .unwrap();
    assert_eq!(result.report.summary.fairness_passes, 1);
}

#[test]
fn cancelled_run_returns_partial_result() {
    let snapshot = thyroid_snapshot();
    let token = CancellationToken::new();
    token.cancel();

    let result = Scheduler::default()
        .generate_with_cancel(&snapshot, work_week(), &token)
        .unwrap();
    assert!(result.report.summary.cancelled);
    assert!(result.assignments.is_empty());
    assert_eq!(result.report.unmet.len(), 5);
    assert!(result
        .report
        .unmet
        .iter()
        .all(|u| u.reason == UnmetReason::Cancelled));
}

#[test]
fn inactive_staff_and_locations_are_ignored() {
    let mut snapshot = thyroid_snapshot();
    snapshot.staff[0].active = false;
    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();
    assert!(result.assignments.is_empty());
    assert!(result.report.fte.is_empty());
    assert_eq!(
        result.report.unmet[0].rejections.get(&Rejection::Inactive),
        Some(&1)
    );

    let mut snapshot = thyroid_snapshot();
    snapshot.locations[0].active = false;
    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();
    assert_eq!(result.report.summary.units, 0);
}

#[test]
fn text_summary_lists_assignments_and_gaps() {
    use rostering::{ReportRenderer, TextSummary};

    let mut snapshot = thyroid_snapshot();
    snapshot.leave.push(approved_leave(1, 1, 8, 8));
    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();

    let text = TextSummary { detailed: true }.render(&snapshot, &result);
    insta::assert_snapshot!(text.trim_end(), @r"
    roster 2025-01-06 .. 2025-01-10: 5 units, 4 filled, 1 unmet, 4 assignments, 0 pairs
    2025-01-06 08:00 Thyroid Clinic staff=1 fte=0.100
    2025-01-07 08:00 Thyroid Clinic staff=1 fte=0.100
    2025-01-09 08:00 Thyroid Clinic staff=1 fte=0.100
    2025-01-10 08:00 Thyroid Clinic staff=1 fte=0.100
    unmet 2025-01-08 Thyroid Clinic slot=1 missing=1 (no eligible staff)
    ");
}

fn fte_configuration(id: u64, shifts_per_week: f64, hours_per_shift: f64) -> FteConfiguration {
    FteConfiguration {
        id: FteConfigId(id),
        name: format!("{shifts_per_week} shifts"),
        shifts_per_week,
        hours_per_shift,
        active: true,
    }
}

fn requirement(
    id: u64,
    role: Option<u64>,
    group: Option<u64>,
    min_staff: u32,
) -> LocationStaffRequirement {
    LocationStaffRequirement {
        id: RequirementId(id),
        location_id: LocationId(1),
        role_id: role.map(RoleId),
        group_id: group.map(GroupId),
        min_staff,
        active: true,
    }
}

#[test]
fn configured_fte_configuration_sets_targets_and_hours() {
    let mut snapshot = thyroid_snapshot();
    snapshot.fte_configurations = vec![
        fte_configuration(1, 10.0, 4.0),
        fte_configuration(2, 5.0, 6.0),
    ];

    let result = Scheduler::new(EngineConfig {
        fte_configuration: Some(FteConfigId(2)),
        ..EngineConfig::default()
    })
    .generate(&snapshot, work_week())
    .unwrap();

    let clinical = *result.fte_for(StaffId(1)).unwrap().category(FteCategory::Clinical);
    // 1.0 × 5 créneaux/semaine × 5/7 semaine
    assert_eq!(clinical.target_shifts, 3.571);
    assert_eq!(clinical.actual_shifts, 5.0);
    assert_eq!(clinical.actual_hours, 30.0);
    assert!(result.report.issues.is_empty());
}

#[test]
fn missing_fte_configuration_falls_back_and_is_reported() {
    let mut snapshot = thyroid_snapshot();
    snapshot.fte_configurations = vec![
        fte_configuration(1, 10.0, 4.0),
        fte_configuration(2, 5.0, 6.0),
    ];

    let result = Scheduler::new(EngineConfig {
        fte_configuration: Some(FteConfigId(9)),
        ..EngineConfig::default()
    })
    .generate(&snapshot, work_week())
    .unwrap();

    assert!(result
        .report
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::MissingFteConfiguration));
    let clinical = *result.fte_for(StaffId(1)).unwrap().category(FteCategory::Clinical);
    assert_eq!(clinical.target_shifts, 7.143);
    assert_eq!(clinical.actual_hours, 20.0);
}

#[test]
fn unusable_fte_configuration_is_not_used() {
    let mut inactive = fte_configuration(2, 5.0, 6.0);
    inactive.active = false;
    let zero_shifts = fte_configuration(3, 0.0, 6.0);

    for (configured, unusable) in [(2, inactive), (3, zero_shifts)] {
        let mut snapshot = thyroid_snapshot();
        snapshot.fte_configurations = vec![fte_configuration(1, 10.0, 4.0), unusable];

        let result = Scheduler::new(EngineConfig {
            fte_configuration: Some(FteConfigId(configured)),
            ..EngineConfig::default()
        })
        .generate(&snapshot, work_week())
        .unwrap();

        assert!(result
            .report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::UnusableFteConfiguration));
        let clinical = *result.fte_for(StaffId(1)).unwrap().category(FteCategory::Clinical);
        assert_eq!(clinical.target_shifts, 7.143);
        assert_eq!(clinical.actual_hours, 20.0);
    }
}

#[test]
fn shifts_per_week_changes_who_is_behind_target() {
    let mut snapshot = thyroid_snapshot();
    snapshot.time_slots = vec![morning_slot(1, LocationId(1), &[1, 2])];
    snapshot.staff = vec![staff(1, 1.0), staff(2, 0.5)];
    let holder_on_tuesday = |snapshot: &rostering::Snapshot, config: EngineConfig| {
        let result = Scheduler::new(config).generate(snapshot, range(6, 12)).unwrap();
        result
            .assignments
            .iter()
            .find(|a| a.date == date(7))
            .map(|a| a.staff_id)
    };

    // 10 créneaux/semaine : A reste loin de sa cible après lundi
    let default = holder_on_tuesday(&snapshot, EngineConfig {
        fairness: false,
        ..EngineConfig::default()
    });
    assert_eq!(default, Some(StaffId(1)));

    // 1 créneau/semaine : A a atteint sa cible, B passe devant
    snapshot.fte_configurations = vec![fte_configuration(1, 1.0, 8.0)];
    let sparse = holder_on_tuesday(&snapshot, EngineConfig {
        fairness: false,
        fte_configuration: Some(FteConfigId(1)),
        ..EngineConfig::default()
    });
    assert_eq!(sparse, Some(StaffId(2)));
}

#[test]
fn leave_for_unknown_staff_is_reported() {
    let mut snapshot = thyroid_snapshot();
    snapshot.leave.push(approved_leave(5, 77, 8, 8));

    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();
    assert_eq!(result.assignments.len(), 5);
    assert!(result
        .report
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::UnknownStaff && i.subject == "leave:5"));
}

#[test]
fn group_requirement_rejects_staff_outside_group() {
    let mut snapshot = thyroid_snapshot();
    snapshot.groups.push(StaffGroup {
        id: GroupId(1),
        name: "Nuclear Medicine".into(),
        description: None,
        active: true,
    });
    let mut member = staff(2, 1.0);
    member.group_id = Some(GroupId(1));
    snapshot.staff.push(member);
    snapshot.requirements.push(requirement(1, None, Some(1), 1));
    snapshot.leave.push(approved_leave(1, 2, 6, 6));

    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();

    assert_eq!(result.assignments.len(), 4);
    assert!(result.assignments.iter().all(|a| a.staff_id == StaffId(2)));
    let monday = &result.report.unmet[0];
    assert_eq!(monday.date, date(6));
    assert_eq!(monday.rejections.get(&Rejection::GroupMismatch), Some(&1));
    assert_eq!(monday.rejections.get(&Rejection::OnLeave), Some(&1));
}

#[test]
fn scoped_requirement_counts_seats() {
    // ≥ 1 senior et ≥ 2 au total : un senior et un junior suffisent
    let mut snapshot = thyroid_snapshot();
    let mut senior = staff(2, 1.0);
    senior.role_id = RoleId(2);
    snapshot.staff.push(senior);
    snapshot.requirements = vec![requirement(1, Some(2), None, 1), requirement(2, None, None, 2)];

    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();
    let mut holders: Vec<_> = result.assignments.iter().map(|a| a.staff_id).collect();
    holders.sort();
    assert_eq!(holders, vec![StaffId(1), StaffId(2)]);
    assert!(result.report.unmet.is_empty());

    // un second junior ne peut pas prendre la place réservée au senior
    snapshot.staff.push(staff(3, 1.0));
    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();
    let mut holders: Vec<_> = result.assignments.iter().map(|a| a.staff_id).collect();
    holders.sort();
    assert_eq!(holders, vec![StaffId(1), StaffId(2)]);
}

#[test]
fn deadline_cancels_the_run() {
    let snapshot = thyroid_snapshot();
    let token = CancellationToken::new().with_timeout(Duration::ZERO);

    let result = Scheduler::default()
        .generate_with_cancel(&snapshot, work_week(), &token)
        .unwrap();
    assert!(result.report.summary.cancelled);
    assert!(result.assignments.is_empty());
    assert!(result
        .report
        .unmet
        .iter()
        .all(|u| u.reason == UnmetReason::Cancelled));
}

#[test]
fn seeded_tie_break_can_change_the_holder() {
    let mut snapshot = thyroid_snapshot();
    snapshot.staff.push(staff(2, 1.0));
    let holder = |seed: Option<u64>| {
        Scheduler::new(EngineConfig {
            tie_break_seed: seed,
            fairness: false,
            ..EngineConfig::default()
        })
        .generate(&snapshot, range(6, 6))
        .unwrap()
        .assignments[0]
            .staff_id
    };

    assert_eq!(holder(None), StaffId(1));
    assert!((0..64).any(|seed| holder(Some(seed)) == StaffId(2)));
    assert!((0..64).any(|seed| holder(Some(seed)) == StaffId(1)));
}

#[test]
fn location_with_negative_points_is_reported() {
    let mut snapshot = thyroid_snapshot();
    snapshot.locations[0].fte_points = -0.1;

    let result = Scheduler::default()
        .generate(&snapshot, work_week())
        .unwrap();
    assert!(result.assignments.is_empty());
    assert_eq!(result.report.summary.units, 0);
    assert!(result
        .report
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::InvalidPoints && i.subject == "location:1"));
}

#[test]
fn huge_ranking_weights_saturate() {
    let mut snapshot = thyroid_snapshot();
    snapshot.staff.push(staff(2, 0.5));

    for ranking in [
        RankingWeights {
            shortfall: i64::MAX / 2,
            load: 0,
        },
        RankingWeights {
            shortfall: i64::MAX,
            load: i64::MAX,
        },
    ] {
        let config = EngineConfig {
            ranking,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_ok());
        let result = Scheduler::new(config).generate(&snapshot, work_week()).unwrap();
        assert_eq!(result.assignments.len(), 5);
        assert!(result.report.violations.is_empty());
    }
}

#[test]
fn night_shift_blocks_next_morning() {
    let mut snapshot = thyroid_snapshot();
    snapshot.time_slots = vec![
        LocationTimeSlot::new(1, LocationId(1), time(22, 0), time(6, 0), vec![1]),
        LocationTimeSlot::new(2, LocationId(1), time(5, 0), time(9, 0), vec![2]),
    ];

    let result = Scheduler::default()
        .generate(&snapshot, range(6, 7))
        .unwrap();
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.assignments[0].date, date(6));
    let tuesday = &result.report.unmet[0];
    assert_eq!(tuesday.date, date(7));
    assert_eq!(tuesday.rejections.get(&Rejection::Overlap), Some(&1));

    // un créneau qui commence à la fin de la nuit ne chevauche pas
    snapshot.time_slots[1] =
        LocationTimeSlot::new(2, LocationId(1), time(6, 0), time(9, 0), vec![2]);
    let result = Scheduler::default()
        .generate(&snapshot, range(6, 7))
        .unwrap();
    assert_eq!(result.assignments.len(), 2);
}

/// Deux postes le lundi : Reading Room 08–12 puis `second` à partir de
/// `second_start`, tous deux en double poste possible.
fn reading_then_fluoroscopy(second_start: u32) -> rostering::Snapshot {
    let mut reading = Location::new(1, "Reading Room");
    reading.priority = 9;
    reading.fte_points = 0.1;
    reading.allows_double_station = true;
    let mut fluoroscopy = Location::new(2, "Fluoroscopy");
    fluoroscopy.priority = 5;
    fluoroscopy.fte_points = 0.4;
    fluoroscopy.allows_double_station = true;

    rostering::Snapshot {
        staff: vec![staff(1, 0.3), staff(2, 0.2)],
        roles: vec![role(1, "Radiologist")],
        time_slots: vec![
            morning_slot(1, reading.id, &[1]),
            LocationTimeSlot::new(
                2,
                fluoroscopy.id,
                time(second_start, 0),
                time(second_start + 4, 0),
                vec![1],
            ),
        ],
        locations: vec![reading, fluoroscopy],
        ..rostering::Snapshot::default()
    }
}

#[test]
fn staff_on_adjacent_slot_joins_a_pair() {
    let snapshot = reading_then_fluoroscopy(12);
    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();

    assert!(result.report.unmet.is_empty());
    assert_eq!(result.report.summary.double_station_pairs, 1);
    let reading: Vec<_> = result
        .assignments
        .iter()
        .filter(|a| a.location_id == LocationId(1))
        .collect();
    assert_eq!(reading.len(), 1);
    assert_eq!(reading[0].staff_id, StaffId(1));
    assert!(!reading[0].is_double_stationed);

    let mut paired: Vec<_> = result
        .assignments
        .iter()
        .filter(|a| a.location_id == LocationId(2))
        .map(|a| (a.staff_id, a.fte_contribution, a.is_double_stationed))
        .collect();
    paired.sort_by_key(|p| p.0);
    assert_eq!(paired, vec![(StaffId(1), 0.2, true), (StaffId(2), 0.2, true)]);
    assert!(result.report.violations.is_empty());
}

#[test]
fn staff_on_overlapping_slot_never_joins_a_pair() {
    let snapshot = reading_then_fluoroscopy(10);
    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();

    assert_eq!(result.report.summary.double_station_pairs, 0);
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.report.unmet.len(), 1);
    assert_eq!(result.report.unmet[0].location_id, LocationId(2));
}

#[test]
fn partially_filled_unit_is_completed_by_a_pair() {
    let mut snapshot = thyroid_snapshot();
    snapshot.locations[0].min_staff_required = 2;
    snapshot.locations[0].fte_points = 0.2;
    snapshot.locations[0].allows_double_station = true;
    snapshot.staff = vec![staff(1, 1.0), staff(2, 0.1), staff(3, 0.1)];

    let result = Scheduler::default()
        .generate(&snapshot, range(6, 6))
        .unwrap();

    assert!(result.report.unmet.is_empty());
    assert_eq!(result.report.summary.double_station_pairs, 1);
    assert_eq!(result.assignments.len(), 3);
    let full: Vec<_> = result
        .assignments
        .iter()
        .filter(|a| !a.is_double_stationed)
        .map(|a| (a.staff_id, a.fte_contribution))
        .collect();
    assert_eq!(full, vec![(StaffId(1), 0.2)]);
    assert!(result.report.violations.is_empty());
}
