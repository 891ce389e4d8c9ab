//! Portfolio data model: collaborators, assignments, client files,
//! prospects and manager capacity records.
//!
//! These are the strict, normalized shapes. Raw seed or request records with
//! optional fields go through [`crate::ingest`] first.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Hours};

// ---------------------------------------------------------------------------
// Collaborator
// ---------------------------------------------------------------------------

/// A staff member whose capacity is planned against client files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: EntityId,
    pub name: String,
    /// Contracted hours per week.
    pub weekly_hours: Hours,
    /// Annual leave in days.
    pub leave_days: u32,
    /// Theoretical annual capacity. Precomputed, not derived from a calendar.
    pub annual_capacity: Hours,
    pub hourly_rate: f64,
    /// Weight applied to value-added, e.g. `1.2` for a senior.
    pub experience_multiplier: f64,
}

// ---------------------------------------------------------------------------
// Role tags
// ---------------------------------------------------------------------------

/// Role ("casquette") a collaborator holds on a client file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleTag {
    Manager,
    Encoder,
    Supervisor,
    Custom { label: String },
}

/// All valid non-custom role strings.
const VALID_ROLE_STRINGS: &[&str] = &["manager", "encoder", "supervisor", "custom"];

impl RoleTag {
    /// Stable grouping key. Custom roles are keyed by their normalized label
    /// so that `"Audit"` and `" audit "` land in the same bucket.
    pub fn key(&self) -> String {
        match self {
            Self::Manager => "manager".to_string(),
            Self::Encoder => "encoder".to_string(),
            Self::Supervisor => "supervisor".to_string(),
            Self::Custom { label } => format!("custom:{}", label.trim().to_lowercase()),
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Self::Manager => "Manager",
            Self::Encoder => "Encoder",
            Self::Supervisor => "Supervisor",
            Self::Custom { label } => label.trim(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }

    /// Parse a role from its kind string and an optional custom label.
    pub fn parse(kind: &str, label: Option<&str>) -> Result<Self, CoreError> {
        match kind.trim().to_lowercase().as_str() {
            "manager" => Ok(Self::Manager),
            "encoder" => Ok(Self::Encoder),
            "supervisor" => Ok(Self::Supervisor),
            "custom" => {
                let label = label.map(str::trim).unwrap_or_default();
                if label.is_empty() {
                    return Err(CoreError::Validation(
                        "custom role requires a non-empty label".to_string(),
                    ));
                }
                Ok(Self::Custom {
                    label: label.to_string(),
                })
            }
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {}",
                VALID_ROLE_STRINGS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// A collaborator's role on one client file, with its hour budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: EntityId,
    pub collaborator_id: EntityId,
    pub client_file_id: EntityId,
    pub role: RoleTag,
    pub budgeted_hours: Hours,
    pub realized_hours: Hours,
    /// Quality/complexity weight applied to realized hours.
    pub value_coefficient: f64,
    /// Free-form period tag, e.g. `"2024"` or `"2024-Q2"`.
    pub period: String,
}

// ---------------------------------------------------------------------------
// Months and client files
// ---------------------------------------------------------------------------

/// Calendar month, used for client peak periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

/// Accepted spellings for each month, in calendar order.
const MONTH_NAMES: [(Month, &[&str]); 12] = [
    (Month::January, &["january", "jan", "janvier"]),
    (Month::February, &["february", "feb", "février", "fevrier"]),
    (Month::March, &["march", "mar", "mars"]),
    (Month::April, &["april", "apr", "avril"]),
    (Month::May, &["may", "mai"]),
    (Month::June, &["june", "jun", "juin"]),
    (Month::July, &["july", "jul", "juillet"]),
    (Month::August, &["august", "aug", "août", "aout"]),
    (Month::September, &["september", "sep", "septembre"]),
    (Month::October, &["october", "oct", "octobre"]),
    (Month::November, &["november", "nov", "novembre"]),
    (Month::December, &["december", "dec", "décembre", "decembre"]),
];

impl Month {
    /// 1-based month number.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Parse an English or French month name, case-insensitive.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        let needle = name.trim().to_lowercase();
        MONTH_NAMES
            .iter()
            .find(|(_, spellings)| spellings.contains(&needle.as_str()))
            .map(|(month, _)| *month)
            .ok_or_else(|| CoreError::Validation(format!("Unknown month name '{name}'")))
    }
}

/// How often a client file is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriodicity {
    Monthly,
    Quarterly,
    Annual,
}

impl BillingPeriodicity {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "mensuel" => Ok(Self::Monthly),
            "quarterly" | "trimestriel" => Ok(Self::Quarterly),
            "annual" | "annuel" => Ok(Self::Annual),
            other => Err(CoreError::Validation(format!(
                "Invalid billing periodicity '{other}'. Must be one of: monthly, quarterly, annual"
            ))),
        }
    }

    /// Number of invoices issued per year.
    pub fn invoices_per_year(self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Annual => 1,
        }
    }
}

/// A client file (dossier) in the firm's portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFile {
    pub id: EntityId,
    pub name: String,
    /// Legal/professional type, e.g. `"SARL"` or `"Médecin - BNC"`.
    pub kind: String,
    pub budgeted_hours: Hours,
    pub billing: BillingPeriodicity,
    pub peak_months: Vec<Month>,
}

// ---------------------------------------------------------------------------
// Prospects and managers
// ---------------------------------------------------------------------------

/// Urgency of onboarding a new client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_lowercase().as_str() {
            "low" | "basse" | "faible" => Ok(Self::Low),
            "medium" | "moyenne" | "normale" => Ok(Self::Medium),
            "high" | "haute" | "urgente" => Ok(Self::High),
            other => Err(CoreError::Validation(format!(
                "Invalid urgency '{other}'. Must be one of: low, medium, high"
            ))),
        }
    }
}

/// A new client waiting to be assigned to a manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: EntityId,
    pub name: String,
    /// Legal/professional type matched against manager specialties.
    pub kind: String,
    /// Annual hour budget.
    pub hourly_budget: Hours,
    /// Annual fee budget.
    pub economic_budget: f64,
    pub urgency: Urgency,
    pub needs: Vec<String>,
}

/// A manager's capacity figures. Maintained independently of assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerCapacity {
    pub id: EntityId,
    pub name: String,
    pub weekly_capacity: Hours,
    pub utilization_pct: f64,
    pub remaining_weekly: Hours,
    pub specialties: Vec<String>,
    pub current_clients: u32,
    pub max_clients: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
