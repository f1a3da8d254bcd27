use crate::config::EngineConfig;
use crate::model::{
    FteConfiguration, GroupId, LocationStaffRequirement, RoleId, Snapshot, Staff, StaffId,
};
use crate::report::{ConfigIssue, IssueKind};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Tables de correspondance construites une fois par exécution.
#[derive(Debug)]
pub(crate) struct Lookup<'a> {
    staff: BTreeMap<StaffId, &'a Staff>,
    requirements: Vec<LocationStaffRequirement>,
    fte: FteConfiguration,
}

impl<'a> Lookup<'a> {
    pub(crate) fn build(
        snapshot: &'a Snapshot,
        config: &EngineConfig,
        issues: &mut Vec<ConfigIssue>,
    ) -> Self {
        let roles: HashSet<RoleId> = snapshot.roles.iter().map(|r| r.id).collect();
        let groups: HashSet<GroupId> = snapshot.groups.iter().map(|g| g.id).collect();

        let mut requirements = Vec::with_capacity(snapshot.requirements.len());
        for req in snapshot.requirements.iter().filter(|r| r.active) {
            if let Some(role) = req.role_id.filter(|r| !roles.contains(r)) {
                warn!(requirement = %req.id, %role, "requirement with unknown role skipped");
                issues.push(ConfigIssue::new(
                    IssueKind::UnknownRole,
                    format!("requirement:{}", req.id),
                    format!("requirement references unknown role {role}"),
                ));
                continue;
            }
            if let Some(group) = req.group_id.filter(|g| !groups.contains(g)) {
                warn!(requirement = %req.id, %group, "requirement with unknown group skipped");
                issues.push(ConfigIssue::new(
                    IssueKind::UnknownGroup,
                    format!("requirement:{}", req.id),
                    format!("requirement references unknown group {group}"),
                ));
                continue;
            }
            requirements.push(req.clone());
        }

        let mut staff = BTreeMap::new();
        for member in &snapshot.staff {
            if !roles.contains(&member.role_id) {
                issues.push(ConfigIssue::new(
                    IssueKind::UnknownRole,
                    format!("staff:{}", member.id),
                    format!("staff references unknown role {}", member.role_id),
                ));
            }
            if let Some(group) = member.group_id.filter(|g| !groups.contains(g)) {
                issues.push(ConfigIssue::new(
                    IssueKind::UnknownGroup,
                    format!("staff:{}", member.id),
                    format!("staff references unknown group {group}"),
                ));
            }
            staff.insert(member.id, member);
        }

        let fte = select_fte_configuration(snapshot, config, issues);

        Self {
            staff,
            requirements,
            fte,
        }
    }

    pub(crate) fn staff(&self, id: StaffId) -> Option<&'a Staff> {
        self.staff.get(&id).copied()
    }

    /// Personnel trié par identifiant.
    pub(crate) fn all_staff(&self) -> impl Iterator<Item = &'a Staff> + '_ {
        self.staff.values().copied()
    }

    pub(crate) fn requirements(&self) -> &[LocationStaffRequirement] {
        &self.requirements
    }

    pub(crate) fn fte(&self) -> &FteConfiguration {
        &self.fte
    }
}

fn select_fte_configuration(
    snapshot: &Snapshot,
    config: &EngineConfig,
    issues: &mut Vec<ConfigIssue>,
) -> FteConfiguration {
    if let Some(id) = config.fte_configuration {
        match snapshot.fte_configurations.iter().find(|c| c.id == id) {
            Some(found) if usable(found) => return found.clone(),
            Some(_) => {
                warn!(fte_configuration = %id, "configured fte configuration unusable");
                issues.push(ConfigIssue::new(
                    IssueKind::UnusableFteConfiguration,
                    format!("fte_configuration:{id}"),
                    "configured fte configuration is inactive or has no shifts, falling back",
                ));
            }
            None => {
                warn!(fte_configuration = %id, "configured fte configuration not found");
                issues.push(ConfigIssue::new(
                    IssueKind::MissingFteConfiguration,
                    format!("fte_configuration:{id}"),
                    "configured fte configuration not found, falling back",
                ));
            }
        }
    }
    snapshot
        .fte_configurations
        .iter()
        .filter(|c| usable(c))
        .min_by_key(|c| c.id)
        .cloned()
        .unwrap_or_default()
}

fn usable(config: &FteConfiguration) -> bool {
    config.active && config.shifts_per_week.is_finite() && config.shifts_per_week > 0.0
}
