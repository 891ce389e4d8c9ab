//! Prospect-to-manager compatibility scoring.
//!
//! Rules are additive and evaluated independently; the total is clamped to
//! [`MAX_SCORE`]. Keyword matching is case-insensitive substring containment.

use serde::Serialize;

use crate::roster::{ManagerCapacity, Prospect};
use crate::types::{EntityId, Hours};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MAX_SCORE: u32 = 100;

/// Weeks per year used to turn an annual hour budget into a weekly need.
pub const WEEKS_PER_YEAR: f64 = 52.0;

/// Points when the weekly need fits in the manager's remaining hours.
pub const CAPACITY_FIT_POINTS: u32 = 20;

/// Points when the weekly need fits within the tolerance margin.
pub const CAPACITY_TOLERANCE_POINTS: u32 = 10;

/// Remaining capacity multiplier for the tolerance margin.
pub const CAPACITY_TOLERANCE: f64 = 1.2;

/// Points for a client-load ratio under [`LOW_LOAD_RATIO`].
pub const LOW_LOAD_POINTS: u32 = 10;
pub const LOW_LOAD_RATIO: f64 = 0.8;

/// Points for a client-load ratio under [`MODERATE_LOAD_RATIO`].
pub const MODERATE_LOAD_POINTS: u32 = 5;
pub const MODERATE_LOAD_RATIO: f64 = 0.9;

/// A keyword pairing: prospect type needle, accepted specialty needles, points.
struct KeywordRule {
    prospect: &'static str,
    specialties: &'static [&'static str],
    points: u32,
}

const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        prospect: "médecin",
        specialties: &["médecin"],
        points: 40,
    },
    KeywordRule {
        prospect: "dentiste",
        specialties: &["selarl"],
        points: 40,
    },
    KeywordRule {
        prospect: "bnc",
        specialties: &["bnc"],
        points: 30,
    },
    KeywordRule {
        prospect: "sarl",
        specialties: &["sociétés", "sarl"],
        points: 30,
    },
];

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Why points were awarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MatchReason {
    Specialty { keyword: &'static str, points: u32 },
    CapacityFit { points: u32 },
    CapacityTolerance { points: u32 },
    LowLoad { points: u32 },
    ModerateLoad { points: u32 },
}

impl MatchReason {
    pub fn points(&self) -> u32 {
        match self {
            Self::Specialty { points, .. }
            | Self::CapacityFit { points }
            | Self::CapacityTolerance { points }
            | Self::LowLoad { points }
            | Self::ModerateLoad { points } => *points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compatibility {
    pub prospect_id: EntityId,
    pub manager_id: EntityId,
    pub manager_name: String,
    /// Clamped to `[0, MAX_SCORE]`.
    pub score: u32,
    /// Weekly hours the prospect would require.
    pub required_weekly: Hours,
    pub reasons: Vec<MatchReason>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Weekly hours needed for a prospect's annual budget.
pub fn required_weekly_hours(prospect: &Prospect) -> Hours {
    prospect.hourly_budget / WEEKS_PER_YEAR
}

fn specialty_reasons(prospect: &Prospect, manager: &ManagerCapacity) -> Vec<MatchReason> {
    let kind = prospect.kind.to_lowercase();
    let specialties: Vec<String> = manager
        .specialties
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    KEYWORD_RULES
        .iter()
        .filter(|rule| kind.contains(rule.prospect))
        .filter(|rule| {
            specialties
                .iter()
                .any(|s| rule.specialties.iter().any(|needle| s.contains(needle)))
        })
        .map(|rule| MatchReason::Specialty {
            keyword: rule.prospect,
            points: rule.points,
        })
        .collect()
}

fn capacity_reason(required_weekly: Hours, manager: &ManagerCapacity) -> Option<MatchReason> {
    if required_weekly <= manager.remaining_weekly {
        Some(MatchReason::CapacityFit {
            points: CAPACITY_FIT_POINTS,
        })
    } else if required_weekly <= manager.remaining_weekly * CAPACITY_TOLERANCE {
        Some(MatchReason::CapacityTolerance {
            points: CAPACITY_TOLERANCE_POINTS,
        })
    } else {
        None
    }
}

fn load_reason(manager: &ManagerCapacity) -> Option<MatchReason> {
    if manager.max_clients == 0 {
        return None;
    }
    let ratio = manager.current_clients as f64 / manager.max_clients as f64;
    if ratio < LOW_LOAD_RATIO {
        Some(MatchReason::LowLoad {
            points: LOW_LOAD_POINTS,
        })
    } else if ratio < MODERATE_LOAD_RATIO {
        Some(MatchReason::ModerateLoad {
            points: MODERATE_LOAD_POINTS,
        })
    } else {
        None
    }
}

/// Score one prospect against one manager.
pub fn score(prospect: &Prospect, manager: &ManagerCapacity) -> Compatibility {
    let required_weekly = required_weekly_hours(prospect);

    let mut reasons = specialty_reasons(prospect, manager);
    reasons.extend(capacity_reason(required_weekly, manager));
    reasons.extend(load_reason(manager));

    let raw: u32 = reasons.iter().map(MatchReason::points).sum();

    Compatibility {
        prospect_id: prospect.id,
        manager_id: manager.id,
        manager_name: manager.name.clone(),
        score: raw.min(MAX_SCORE),
        required_weekly,
        reasons,
    }
}

/// Score a prospect against every manager, best match first.
///
/// Ties are broken by remaining weekly hours (more first), then manager id.
pub fn rank_managers(prospect: &Prospect, managers: &[ManagerCapacity]) -> Vec<Compatibility> {
    let mut ranked: Vec<(Compatibility, Hours)> = managers
        .iter()
        .map(|m| (score(prospect, m), m.remaining_weekly))
        .collect();

    ranked.sort_by(|(a, a_remaining), (b, b_remaining)| {
        b.score
            .cmp(&a.score)
            .then_with(|| b_remaining.total_cmp(a_remaining))
            .then_with(|| a.manager_id.cmp(&b.manager_id))
    });

    ranked.into_iter().map(|(c, _)| c).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
