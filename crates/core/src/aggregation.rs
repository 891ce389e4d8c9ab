//! Per-collaborator load aggregation, alert policy and client file
//! summaries.
//!
//! Everything here is recomputed from an assignment slice on every call.
//! Nothing is cached or written back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::roster::{Assignment, BillingPeriodicity, ClientFile, Collaborator};
use crate::threshold_validation::{ratio_or_zero, round_percent};
use crate::types::{EntityId, Hours};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Charge above which a collaborator is flagged as overloaded.
pub const OVERLOAD_THRESHOLD_PCT: i64 = 95;

/// Charge above which a collaborator is put on watch.
pub const WATCH_THRESHOLD_PCT: i64 = 85;

/// Lower bound of the "optimal" load bucket.
pub const OPTIMAL_LOWER_PCT: i64 = 65;

// ---------------------------------------------------------------------------
// Alert level and load bucket
// ---------------------------------------------------------------------------

/// Alert raised from a collaborator's charge percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadAlert {
    None,
    Watch,
    Overload,
}

impl LoadAlert {
    pub fn from_charge(charge_pct: i64) -> Self {
        if charge_pct > OVERLOAD_THRESHOLD_PCT {
            Self::Overload
        } else if charge_pct > WATCH_THRESHOLD_PCT {
            Self::Watch
        } else {
            Self::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Watch => "watch",
            Self::Overload => "overload",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "watch" => Some(Self::Watch),
            "overload" => Some(Self::Overload),
            _ => None,
        }
    }
}

/// Display bucket used by the capacity views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadBucket {
    Available,
    Optimal,
    Overloaded,
}

impl LoadBucket {
    pub fn from_charge(charge_pct: i64) -> Self {
        if charge_pct > OVERLOAD_THRESHOLD_PCT {
            Self::Overloaded
        } else if charge_pct >= OPTIMAL_LOWER_PCT {
            Self::Optimal
        } else {
            Self::Available
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Optimal => "OPTIMAL",
            Self::Overloaded => "OVERLOADED",
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate types
// ---------------------------------------------------------------------------

/// Hours for one role-tag of one collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleBreakdown {
    pub role_key: String,
    pub role_label: String,
    pub assignment_count: usize,
    pub budgeted_hours: Hours,
    pub realized_hours: Hours,
}

/// Aggregated load for a single collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaboratorLoad {
    pub collaborator_id: EntityId,
    pub name: String,
    pub annual_capacity: Hours,
    pub total_budgeted: Hours,
    pub total_realized: Hours,
    /// `round(total_budgeted / annual_capacity * 100)`, unclamped.
    pub charge_pct: i64,
    pub value_added: f64,
    /// May be negative when overbooked.
    pub remaining_hours: Hours,
    pub alert: LoadAlert,
    pub bucket: LoadBucket,
    pub by_role: Vec<RoleBreakdown>,
    /// Distinct custom role labels joined with `", "`, empty when none.
    pub custom_roles: String,
}

/// Firm-wide totals over all collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub collaborator_count: usize,
    pub total_capacity: Hours,
    pub total_budgeted: Hours,
    pub total_realized: Hours,
    pub total_value_added: f64,
    pub team_charge_pct: i64,
    pub watch_count: usize,
    pub overload_count: usize,
}

/// Totals for a single client file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientFileSummary {
    pub client_file_id: EntityId,
    pub name: String,
    pub kind: String,
    pub budgeted_hours: Hours,
    pub billing: BillingPeriodicity,
    pub invoices_per_year: u32,
    pub assigned_budgeted: Hours,
    pub realized_hours: Hours,
    /// `Σ realized × coefficient` over the file's assignments.
    pub value_added: f64,
    /// Realized hours as a percentage of the file budget; 0 when unbudgeted.
    pub consumption_pct: i64,
    pub collaborator_count: usize,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate one collaborator's assignments.
///
/// Assignments for other collaborators are skipped, so the caller may pass
/// the full snapshot.
pub fn aggregate_collaborator(
    collaborator: &Collaborator,
    assignments: &[Assignment],
) -> CollaboratorLoad {
    let mut by_role: Vec<RoleBreakdown> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut custom_labels: Vec<String> = Vec::new();

    let mut total_budgeted = 0.0;
    let mut total_realized = 0.0;
    let mut value_added = 0.0;

    for a in assignments
        .iter()
        .filter(|a| a.collaborator_id == collaborator.id)
    {
        total_budgeted += a.budgeted_hours;
        total_realized += a.realized_hours;
        value_added += a.realized_hours * a.value_coefficient * collaborator.experience_multiplier;

        let key = a.role.key();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            if a.role.is_custom() {
                custom_labels.push(a.role.label().to_string());
            }
            by_role.push(RoleBreakdown {
                role_key: key,
                role_label: a.role.label().to_string(),
                assignment_count: 0,
                budgeted_hours: 0.0,
                realized_hours: 0.0,
            });
            by_role.len() - 1
        });
        let entry = &mut by_role[slot];
        entry.assignment_count += 1;
        entry.budgeted_hours += a.budgeted_hours;
        entry.realized_hours += a.realized_hours;
    }

    let charge_pct = round_percent(ratio_or_zero(total_budgeted, collaborator.annual_capacity));

    CollaboratorLoad {
        collaborator_id: collaborator.id,
        name: collaborator.name.clone(),
        annual_capacity: collaborator.annual_capacity,
        total_budgeted,
        total_realized,
        charge_pct,
        value_added,
        remaining_hours: collaborator.annual_capacity - total_budgeted,
        alert: LoadAlert::from_charge(charge_pct),
        bucket: LoadBucket::from_charge(charge_pct),
        by_role,
        custom_roles: custom_labels.join(", "),
    }
}

/// Aggregate every collaborator, preserving roster order.
///
/// Assignments referencing unknown collaborators contribute nothing.
pub fn aggregate_team(
    collaborators: &[Collaborator],
    assignments: &[Assignment],
) -> Vec<CollaboratorLoad> {
    collaborators
        .iter()
        .map(|c| aggregate_collaborator(c, assignments))
        .collect()
}

/// Reduce per-collaborator loads into firm-wide totals.
pub fn summarize_team(loads: &[CollaboratorLoad]) -> TeamSummary {
    let total_capacity: Hours = loads.iter().map(|l| l.annual_capacity).sum();
    let total_budgeted: Hours = loads.iter().map(|l| l.total_budgeted).sum();

    TeamSummary {
        collaborator_count: loads.len(),
        total_capacity,
        total_budgeted,
        total_realized: loads.iter().map(|l| l.total_realized).sum(),
        total_value_added: loads.iter().map(|l| l.value_added).sum(),
        team_charge_pct: round_percent(ratio_or_zero(total_budgeted, total_capacity)),
        watch_count: loads.iter().filter(|l| l.alert == LoadAlert::Watch).count(),
        overload_count: loads
            .iter()
            .filter(|l| l.alert == LoadAlert::Overload)
            .count(),
    }
}

/// Value-added total for one client file: `Σ realized × coefficient`.
///
/// The experience multiplier is a collaborator attribute and is not applied
/// at the file level.
pub fn client_file_value_added(client_file_id: EntityId, assignments: &[Assignment]) -> f64 {
    assignments
        .iter()
        .filter(|a| a.client_file_id == client_file_id)
        .map(|a| a.realized_hours * a.value_coefficient)
        .sum()
}

/// Summaries for every client file, preserving input order.
pub fn summarize_client_files(
    files: &[ClientFile],
    assignments: &[Assignment],
) -> Vec<ClientFileSummary> {
    files
        .iter()
        .map(|file| {
            let mine: Vec<&Assignment> = assignments
                .iter()
                .filter(|a| a.client_file_id == file.id)
                .collect();
            let realized_hours: Hours = mine.iter().map(|a| a.realized_hours).sum();
            let mut collaborators: Vec<EntityId> =
                mine.iter().map(|a| a.collaborator_id).collect();
            collaborators.sort_unstable();
            collaborators.dedup();

            ClientFileSummary {
                client_file_id: file.id,
                name: file.name.clone(),
                kind: file.kind.clone(),
                budgeted_hours: file.budgeted_hours,
                billing: file.billing,
                invoices_per_year: file.billing.invoices_per_year(),
                assigned_budgeted: mine.iter().map(|a| a.budgeted_hours).sum(),
                realized_hours,
                value_added: client_file_value_added(file.id, assignments),
                consumption_pct: round_percent(ratio_or_zero(realized_hours, file.budgeted_hours)),
                collaborator_count: collaborators.len(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Listing: sort, filter, paginate
// ---------------------------------------------------------------------------

/// Default page size for load listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Maximum page size for load listings.
pub const MAX_LIST_LIMIT: i64 = 200;

/// Sortable columns of the load table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSortKey {
    #[default]
    Name,
    Charge,
    ValueAdded,
    Remaining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Listing parameters for [`list_loads`].
#[derive(Debug, Clone, Default)]
pub struct LoadListing {
    pub sort_by: LoadSortKey,
    pub direction: SortDirection,
    pub alert: Option<LoadAlert>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Clamp a requested page size into `[1, max]`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Filter, sort and paginate loads. Returns the page and the filtered total.
pub fn list_loads(
    mut loads: Vec<CollaboratorLoad>,
    listing: &LoadListing,
) -> (Vec<CollaboratorLoad>, usize) {
    if let Some(alert) = listing.alert {
        loads.retain(|l| l.alert == alert);
    }

    loads.sort_by(|a, b| {
        let ord = match listing.sort_by {
            LoadSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            LoadSortKey::Charge => a.charge_pct.cmp(&b.charge_pct),
            LoadSortKey::ValueAdded => a.value_added.total_cmp(&b.value_added),
            LoadSortKey::Remaining => a.remaining_hours.total_cmp(&b.remaining_hours),
        };
        let ord = ord.then_with(|| a.collaborator_id.cmp(&b.collaborator_id));
        match listing.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let total = loads.len();
    let limit = clamp_limit(listing.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT) as usize;
    let offset = clamp_offset(listing.offset) as usize;
    let page = loads.into_iter().skip(offset).take(limit).collect();
    (page, total)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
