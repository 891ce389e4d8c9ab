//! Raw record shapes and the single normalization step into the strict
//! [`crate::roster`] model.
//!
//! Every optional field is resolved here, once: missing hours become `0.0`,
//! missing display names become [`MISSING_LABEL`], missing multipliers and
//! coefficients become `1.0`. Numbers that are present but invalid are
//! rejected rather than silently defaulted.

use serde::Deserialize;

use crate::error::CoreError;
use crate::roster::{
    Assignment, BillingPeriodicity, ClientFile, Collaborator, ManagerCapacity, Month, Prospect,
    RoleTag, Urgency,
};
use crate::threshold_validation::{validate_hours, validate_percentage, validate_positive};
use crate::types::{EntityId, Hours};

/// Display name used when a record carries none.
pub const MISSING_LABEL: &str = "N/A";

/// Period tag used when an assignment carries none.
pub const DEFAULT_PERIOD: &str = "current";

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCollaborator {
    pub id: EntityId,
    pub name: Option<String>,
    pub weekly_hours: Option<Hours>,
    pub leave_days: Option<u32>,
    pub annual_capacity: Option<Hours>,
    pub hourly_rate: Option<f64>,
    pub experience_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAssignment {
    pub id: EntityId,
    pub collaborator_id: EntityId,
    pub client_file_id: EntityId,
    pub role: String,
    /// Label for `custom` roles.
    pub custom_label: Option<String>,
    pub budgeted_hours: Option<Hours>,
    pub realized_hours: Option<Hours>,
    pub value_coefficient: Option<f64>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClientFile {
    pub id: EntityId,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub budgeted_hours: Option<Hours>,
    pub billing: Option<String>,
    #[serde(default)]
    pub peak_months: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProspect {
    pub id: EntityId,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub hourly_budget: Option<Hours>,
    pub economic_budget: Option<f64>,
    pub urgency: Option<String>,
    #[serde(default)]
    pub needs: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManager {
    pub id: EntityId,
    pub name: Option<String>,
    pub weekly_capacity: Option<Hours>,
    pub utilization_pct: Option<f64>,
    pub remaining_weekly: Option<Hours>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub current_clients: Option<u32>,
    pub max_clients: Option<u32>,
}

/// A full portfolio as loaded from a seed document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPortfolio {
    #[serde(default)]
    pub collaborators: Vec<RawCollaborator>,
    #[serde(default)]
    pub client_files: Vec<RawClientFile>,
    #[serde(default)]
    pub assignments: Vec<RawAssignment>,
    #[serde(default)]
    pub prospects: Vec<RawProspect>,
    #[serde(default)]
    pub managers: Vec<RawManager>,
}

/// Normalized portfolio, ready to build stores from.
#[derive(Debug, Clone, Default)]
pub struct PortfolioSeed {
    pub collaborators: Vec<Collaborator>,
    pub client_files: Vec<ClientFile>,
    pub assignments: Vec<Assignment>,
    pub prospects: Vec<Prospect>,
    pub managers: Vec<ManagerCapacity>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn name_or_missing(name: Option<String>) -> String {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| MISSING_LABEL.to_string())
}

fn hours_or_zero(value: Option<Hours>, field: &str) -> Result<Hours, CoreError> {
    let value = value.unwrap_or(0.0);
    validate_hours(value, field)?;
    Ok(value)
}

fn weight_or_one(value: Option<f64>, field: &str) -> Result<f64, CoreError> {
    let value = value.unwrap_or(1.0);
    validate_positive(value, field)?;
    Ok(value)
}

fn with_context(err: CoreError, entity: &str, id: EntityId) -> CoreError {
    match err {
        CoreError::Validation(msg) => CoreError::Validation(format!("{entity} {id}: {msg}")),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

pub fn normalize_collaborator(raw: RawCollaborator) -> Result<Collaborator, CoreError> {
    let id = raw.id;
    let build = || -> Result<Collaborator, CoreError> {
        Ok(Collaborator {
            id,
            name: name_or_missing(raw.name),
            weekly_hours: hours_or_zero(raw.weekly_hours, "weekly_hours")?,
            leave_days: raw.leave_days.unwrap_or(0),
            annual_capacity: hours_or_zero(raw.annual_capacity, "annual_capacity")?,
            hourly_rate: hours_or_zero(raw.hourly_rate, "hourly_rate")?,
            experience_multiplier: weight_or_one(
                raw.experience_multiplier,
                "experience_multiplier",
            )?,
        })
    };
    build().map_err(|e| with_context(e, "collaborator", id))
}

pub fn normalize_assignment(raw: RawAssignment) -> Result<Assignment, CoreError> {
    let id = raw.id;
    let build = || -> Result<Assignment, CoreError> {
        Ok(Assignment {
            id,
            collaborator_id: raw.collaborator_id,
            client_file_id: raw.client_file_id,
            role: RoleTag::parse(&raw.role, raw.custom_label.as_deref())?,
            budgeted_hours: hours_or_zero(raw.budgeted_hours, "budgeted_hours")?,
            realized_hours: hours_or_zero(raw.realized_hours, "realized_hours")?,
            value_coefficient: weight_or_one(raw.value_coefficient, "value_coefficient")?,
            period: raw
                .period
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PERIOD.to_string()),
        })
    };
    build().map_err(|e| with_context(e, "assignment", id))
}

pub fn normalize_client_file(raw: RawClientFile) -> Result<ClientFile, CoreError> {
    let id = raw.id;
    let build = || -> Result<ClientFile, CoreError> {
        let billing = match raw.billing.as_deref() {
            Some(s) => BillingPeriodicity::parse(s)?,
            None => BillingPeriodicity::Annual,
        };
        let mut peak_months = raw
            .peak_months
            .iter()
            .map(|m| Month::parse(m))
            .collect::<Result<Vec<_>, _>>()?;
        peak_months.sort();
        peak_months.dedup();

        Ok(ClientFile {
            id,
            name: name_or_missing(raw.name),
            kind: name_or_missing(raw.kind),
            budgeted_hours: hours_or_zero(raw.budgeted_hours, "budgeted_hours")?,
            billing,
            peak_months,
        })
    };
    build().map_err(|e| with_context(e, "client file", id))
}

pub fn normalize_prospect(raw: RawProspect) -> Result<Prospect, CoreError> {
    let id = raw.id;
    let build = || -> Result<Prospect, CoreError> {
        let urgency = match raw.urgency.as_deref() {
            Some(s) => Urgency::parse(s)?,
            None => Urgency::Medium,
        };
        Ok(Prospect {
            id,
            name: name_or_missing(raw.name),
            kind: name_or_missing(raw.kind),
            hourly_budget: hours_or_zero(raw.hourly_budget, "hourly_budget")?,
            economic_budget: hours_or_zero(raw.economic_budget, "economic_budget")?,
            urgency,
            needs: raw
                .needs
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        })
    };
    build().map_err(|e| with_context(e, "prospect", id))
}

pub fn normalize_manager(raw: RawManager) -> Result<ManagerCapacity, CoreError> {
    let id = raw.id;
    let build = || -> Result<ManagerCapacity, CoreError> {
        let utilization_pct = raw.utilization_pct.unwrap_or(0.0);
        validate_percentage(utilization_pct, "utilization_pct")?;
        Ok(ManagerCapacity {
            id,
            name: name_or_missing(raw.name),
            weekly_capacity: hours_or_zero(raw.weekly_capacity, "weekly_capacity")?,
            utilization_pct,
            remaining_weekly: hours_or_zero(raw.remaining_weekly, "remaining_weekly")?,
            specialties: raw.specialties,
            current_clients: raw.current_clients.unwrap_or(0),
            max_clients: raw.max_clients.unwrap_or(0),
        })
    };
    build().map_err(|e| with_context(e, "manager", id))
}

/// Normalize every record of a raw portfolio.
///
/// Duplicate ids within one collection are a conflict; the first error found
/// aborts the whole load.
pub fn normalize_portfolio(raw: RawPortfolio) -> Result<PortfolioSeed, CoreError> {
    let seed = PortfolioSeed {
        collaborators: normalize_all(raw.collaborators, normalize_collaborator)?,
        client_files: normalize_all(raw.client_files, normalize_client_file)?,
        assignments: normalize_all(raw.assignments, normalize_assignment)?,
        prospects: normalize_all(raw.prospects, normalize_prospect)?,
        managers: normalize_all(raw.managers, normalize_manager)?,
    };

    ensure_unique(seed.collaborators.iter().map(|c| c.id), "collaborator")?;
    ensure_unique(seed.client_files.iter().map(|f| f.id), "client file")?;
    ensure_unique(seed.assignments.iter().map(|a| a.id), "assignment")?;
    ensure_unique(seed.prospects.iter().map(|p| p.id), "prospect")?;
    ensure_unique(seed.managers.iter().map(|m| m.id), "manager")?;

    Ok(seed)
}

/// Parse and normalize a JSON seed document.
pub fn parse_portfolio_json(json: &str) -> Result<PortfolioSeed, CoreError> {
    let raw: RawPortfolio = serde_json::from_str(json)
        .map_err(|e| CoreError::Validation(format!("Invalid portfolio document: {e}")))?;
    normalize_portfolio(raw)
}

fn normalize_all<R, T>(
    raws: Vec<R>,
    f: fn(R) -> Result<T, CoreError>,
) -> Result<Vec<T>, CoreError> {
    raws.into_iter().map(f).collect()
}

fn ensure_unique(ids: impl Iterator<Item = EntityId>, entity: &str) -> Result<(), CoreError> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CoreError::Conflict(format!("duplicate {entity} id {id}")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
