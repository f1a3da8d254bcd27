use crate::model::{
    GroupId, LeaveId, LeaveRequest, LeaveStatus, LeaveType, RoleId, Snapshot, Staff, StaffId,
};
use crate::report::RosterResult;
use crate::storage::write_json_atomic;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import du personnel depuis CSV:
/// header `id,user_id,role_id,group_id,fte_clinical,fte_research,fte_admin[,active]`
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Staff>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = parse_u64(rec.get(0).context("missing id")?, "id")?;
        let user_id = parse_u64(rec.get(1).context("missing user_id")?, "user_id")?;
        let role_id = parse_u64(rec.get(2).context("missing role_id")?, "role_id")?;
        let group = rec.get(3).map(str::trim).unwrap_or("");
        let group_id = if group.is_empty() {
            None
        } else {
            Some(GroupId(parse_u64(group, "group_id")?))
        };

        let mut staff = Staff::new(id, RoleId(role_id));
        staff.user_id = user_id;
        staff.group_id = group_id;
        staff.fte_clinical = parse_fraction(rec.get(4), 1.0)
            .with_context(|| format!("invalid fte_clinical for staff {id}"))?;
        staff.fte_research = parse_fraction(rec.get(5), 0.0)
            .with_context(|| format!("invalid fte_research for staff {id}"))?;
        staff.fte_admin = parse_fraction(rec.get(6), 0.0)
            .with_context(|| format!("invalid fte_admin for staff {id}"))?;
        if let Some(flag) = rec.get(7) {
            let flag = flag.trim();
            if !flag.is_empty() {
                staff.active = parse_bool(flag)
                    .with_context(|| format!("invalid active value for staff {id}"))?;
            }
        }
        out.push(staff);
    }
    Ok(out)
}

/// Import des congés: header `id,staff_id,leave_type,start_date,end_date,status`
pub fn import_leave_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<LeaveRequest>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = parse_u64(rec.get(0).context("missing id")?, "id")?;
        let staff_id = parse_u64(rec.get(1).context("missing staff_id")?, "staff_id")?;
        let leave_type = parse_leave_type(rec.get(2).context("missing leave_type")?.trim())?;
        let start_date = parse_date(rec.get(3).context("missing start_date")?)?;
        let end_date = parse_date(rec.get(4).context("missing end_date")?)?;
        if end_date < start_date {
            bail!("leave {id}: end_date before start_date");
        }
        let status = parse_status(rec.get(5).context("missing status")?.trim())?;
        out.push(LeaveRequest {
            id: LeaveId(id),
            staff_id: StaffId(staff_id),
            leave_type,
            start_date,
            end_date,
            status,
            active: true,
        });
    }
    Ok(out)
}

/// Fusionne par identifiant : une ligne importée remplace l'existante.
pub fn merge_staff(snapshot: &mut Snapshot, staff: Vec<Staff>) {
    for member in staff {
        match snapshot.staff.iter_mut().find(|s| s.id == member.id) {
            Some(existing) => *existing = member,
            None => snapshot.staff.push(member),
        }
    }
    snapshot.staff.sort_by_key(|s| s.id);
}

pub fn merge_leave(snapshot: &mut Snapshot, leave: Vec<LeaveRequest>) {
    for request in leave {
        match snapshot.leave.iter_mut().find(|l| l.id == request.id) {
            Some(existing) => *existing = request,
            None => snapshot.leave.push(request),
        }
    }
    snapshot.leave.sort_by_key(|l| l.id);
}

fn parse_u64(raw: &str, field: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse()
        .with_context(|| format!("invalid {field}: {raw}"))
}

fn parse_fraction(raw: Option<&str>, default: f64) -> anyhow::Result<f64> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(default);
    }
    let value: f64 = raw.parse().context("expected a number")?;
    if !(0.0..=1.0).contains(&value) {
        bail!("fraction {value} out of [0,1]");
    }
    Ok(value)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn parse_leave_type(raw: &str) -> anyhow::Result<LeaveType> {
    match raw.to_ascii_lowercase().as_str() {
        "forecast" => Ok(LeaveType::Forecast),
        "non_urgent" | "non-urgent" => Ok(LeaveType::NonUrgent),
        "urgent" => Ok(LeaveType::Urgent),
        other => bail!("unknown leave type: {other}"),
    }
}

fn parse_status(raw: &str) -> anyhow::Result<LeaveStatus> {
    match raw.to_ascii_lowercase().as_str() {
        "pending" => Ok(LeaveStatus::Pending),
        "approved" => Ok(LeaveStatus::Approved),
        "rejected" => Ok(LeaveStatus::Rejected),
        other => bail!("unknown leave status: {other}"),
    }
}

/// Export JSON du résultat (jolie mise en forme, écriture atomique)
pub fn export_result_json<P: AsRef<Path>>(path: P, result: &RosterResult) -> anyhow::Result<()> {
    write_json_atomic(path, result)
}

pub fn load_result_json<P: AsRef<Path>>(path: P) -> anyhow::Result<RosterResult> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let result = serde_json::from_slice(&data)
        .with_context(|| format!("parsing roster result {}", path.display()))?;
    Ok(result)
}

/// Export CSV des affectations:
/// header `date,location_id,time_slot_id,staff_id,fte_contribution,double_station_pair`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, result: &RosterResult) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "date",
        "location_id",
        "time_slot_id",
        "staff_id",
        "fte_contribution",
        "double_station_pair",
    ])?;
    for a in &result.assignments {
        let pair = a
            .double_station_pair
            .map(|k| k.to_string())
            .unwrap_or_default();
        w.write_record([
            a.date.to_string(),
            a.location_id.to_string(),
            a.time_slot_id.to_string(),
            a.staff_id.to_string(),
            format!("{:.3}", a.fte_contribution),
            pair,
        ])?;
    }
    w.flush()?;
    Ok(())
}
