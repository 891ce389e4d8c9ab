//! Quarterly load projection with client peak periods.
//!
//! A collaborator's hours on each client file are spread evenly over the four
//! calendar quarters; quarters containing one of the file's peak months are
//! inflated by [`PEAK_MULTIPLIER`]. Results are memoized per collaborator and
//! assignment snapshot revision in [`SeasonalityCache`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::roster::{Assignment, ClientFile, Collaborator, Month};
use crate::threshold_validation::{ratio_or_zero, round_percent};
use crate::types::{EntityId, Hours};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Load multiplier applied in a quarter containing a peak month.
pub const PEAK_MULTIPLIER: f64 = 1.5;

/// Displayed quarterly percentages are capped here.
pub const MAX_DISPLAY_PCT: i64 = 100;

/// Percentage above which a quarter is critical.
pub const CRITICAL_THRESHOLD_PCT: i64 = 90;

/// Percentage above which a quarter is elevated.
pub const ELEVATED_THRESHOLD_PCT: i64 = 70;

// ---------------------------------------------------------------------------
// Quarter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// The three fixed calendar months of the quarter.
    pub fn months(self) -> [Month; 3] {
        match self {
            Self::Q1 => [Month::January, Month::February, Month::March],
            Self::Q2 => [Month::April, Month::May, Month::June],
            Self::Q3 => [Month::July, Month::August, Month::September],
            Self::Q4 => [Month::October, Month::November, Month::December],
        }
    }

    /// The quarter a month falls in.
    pub fn of(month: Month) -> Self {
        Self::ALL[usize::from((month.number() - 1) / 3)]
    }

    pub fn contains(self, month: Month) -> bool {
        Self::of(month) == self
    }
}

/// Load status of a quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonStatus {
    Normal,
    Elevated,
    Critical,
}

impl SeasonStatus {
    pub fn from_percentage(pct: i64) -> Self {
        if pct > CRITICAL_THRESHOLD_PCT {
            Self::Critical
        } else if pct > ELEVATED_THRESHOLD_PCT {
            Self::Elevated
        } else {
            Self::Normal
        }
    }
}

// ---------------------------------------------------------------------------
// Projection types
// ---------------------------------------------------------------------------

/// One client file as seen by the projector: the collaborator's hours on it
/// and the file's peak months.
#[derive(Debug, Clone, PartialEq)]
pub struct FileWorkload {
    pub client_file_id: EntityId,
    pub hours: Hours,
    pub peak_months: Vec<Month>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterLoad {
    pub quarter: Quarter,
    /// Projected hours, including peak inflation.
    pub projected_hours: Hours,
    /// Share of quarterly capacity, capped at [`MAX_DISPLAY_PCT`].
    pub percentage: i64,
    pub status: SeasonStatus,
    /// Client files peaking in this quarter.
    pub peak_files: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalProjection {
    pub collaborator_id: EntityId,
    pub quarterly_capacity: Hours,
    pub quarters: Vec<QuarterLoad>,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Collect the collaborator's budgeted hours per client file, joined with
/// each file's peak months. Files missing from `files` have no peaks.
pub fn workloads_for(
    collaborator_id: EntityId,
    assignments: &[Assignment],
    files: &[ClientFile],
) -> Vec<FileWorkload> {
    let mut workloads: Vec<FileWorkload> = Vec::new();
    for a in assignments
        .iter()
        .filter(|a| a.collaborator_id == collaborator_id)
    {
        match workloads
            .iter_mut()
            .find(|w| w.client_file_id == a.client_file_id)
        {
            Some(w) => w.hours += a.budgeted_hours,
            None => workloads.push(FileWorkload {
                client_file_id: a.client_file_id,
                hours: a.budgeted_hours,
                peak_months: files
                    .iter()
                    .find(|f| f.id == a.client_file_id)
                    .map(|f| f.peak_months.clone())
                    .unwrap_or_default(),
            }),
        }
    }
    workloads
}

/// Project quarterly load for one collaborator.
pub fn project(collaborator: &Collaborator, workloads: &[FileWorkload]) -> SeasonalProjection {
    let quarterly_capacity = collaborator.annual_capacity / 4.0;

    let quarters = Quarter::ALL
        .iter()
        .map(|&quarter| {
            let mut projected_hours = 0.0;
            let mut peak_files = Vec::new();
            for w in workloads {
                let base = w.hours / 4.0;
                if w.peak_months.iter().any(|m| quarter.contains(*m)) {
                    projected_hours += base * PEAK_MULTIPLIER;
                    peak_files.push(w.client_file_id);
                } else {
                    projected_hours += base;
                }
            }

            let percentage = round_percent(ratio_or_zero(projected_hours, quarterly_capacity))
                .min(MAX_DISPLAY_PCT);

            QuarterLoad {
                quarter,
                projected_hours,
                percentage,
                status: SeasonStatus::from_percentage(percentage),
                peak_files,
            }
        })
        .collect();

    SeasonalProjection {
        collaborator_id: collaborator.id,
        quarterly_capacity,
        quarters,
    }
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

/// Memoizes projections per `(collaborator, snapshot revision)`.
///
/// Entries for older revisions are dropped whenever a newer revision is
/// requested, so the cache never holds more than one dataset generation.
#[derive(Debug, Default)]
pub struct SeasonalityCache {
    inner: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    revision: u64,
    entries: HashMap<EntityId, Arc<SeasonalProjection>>,
    hits: u64,
    misses: u64,
}

/// Hit/miss counters, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub revision: u64,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl SeasonalityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized projection or compute it with `compute`.
    pub fn get_or_compute<F>(
        &self,
        collaborator_id: EntityId,
        revision: u64,
        compute: F,
    ) -> Arc<SeasonalProjection>
    where
        F: FnOnce() -> SeasonalProjection,
    {
        // Projections are pure; a poisoned lock still holds consistent data.
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if revision != state.revision {
            state.entries.clear();
            state.revision = revision;
        }

        if let Some(hit) = state.entries.get(&collaborator_id).cloned() {
            state.hits += 1;
            return hit;
        }

        state.misses += 1;
        let projection = Arc::new(compute());
        state
            .entries
            .insert(collaborator_id, Arc::clone(&projection));
        projection
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        CacheStats {
            revision: state.revision,
            entries: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{BillingPeriodicity, RoleTag};

    fn collaborator(capacity: Hours) -> Collaborator {
        Collaborator {
            id: 1,
            name: "Alice".to_string(),
            weekly_hours: 35.0,
            leave_days: 25,
            annual_capacity: capacity,
            hourly_rate: 60.0,
            experience_multiplier: 1.0,
        }
    }

    fn workload(id: EntityId, hours: Hours, peaks: &[Month]) -> FileWorkload {
        FileWorkload {
            client_file_id: id,
            hours,
            peak_months: peaks.to_vec(),
        }
    }

    #[test]
    fn quarters_cover_all_twelve_months_once() {
        let mut months: Vec<Month> = Quarter::ALL.iter().flat_map(|q| q.months()).collect();
        months.sort();
        months.dedup();
        assert_eq!(months.len(), 12);
    }

    #[test]
    fn month_maps_to_its_calendar_quarter() {
        assert_eq!(Quarter::of(Month::January), Quarter::Q1);
        assert_eq!(Quarter::of(Month::March), Quarter::Q1);
        assert_eq!(Quarter::of(Month::April), Quarter::Q2);
        assert_eq!(Quarter::of(Month::September), Quarter::Q3);
        assert_eq!(Quarter::of(Month::December), Quarter::Q4);
        for quarter in Quarter::ALL {
            assert!(quarter.months().iter().all(|m| Quarter::of(*m) == quarter));
        }
    }

    #[test]
    fn even_spread_without_peaks() {
        let projection = project(&collaborator(1600.0), &[workload(10, 800.0, &[])]);
        assert_eq!(projection.quarterly_capacity, 400.0);
        for q in &projection.quarters {
            assert_eq!(q.projected_hours, 200.0);
            assert_eq!(q.percentage, 50);
            assert_eq!(q.status, SeasonStatus::Normal);
            assert!(q.peak_files.is_empty());
        }
    }

    #[test]
    fn peak_month_inflates_only_its_quarter() {
        let projection = project(
            &collaborator(1600.0),
            &[workload(10, 800.0, &[Month::April])],
        );
        let q2 = &projection.quarters[1];
        assert_eq!(q2.quarter, Quarter::Q2);
        assert_eq!(q2.projected_hours, 300.0);
        assert_eq!(q2.percentage, 75);
        assert_eq!(q2.status, SeasonStatus::Elevated);
        assert_eq!(q2.peak_files, vec![10]);
        assert_eq!(projection.quarters[0].projected_hours, 200.0);
    }

    #[test]
    fn multiple_peaks_in_one_quarter_apply_once() {
        let projection = project(
            &collaborator(1600.0),
            &[workload(10, 800.0, &[Month::January, Month::March])],
        );
        assert_eq!(projection.quarters[0].projected_hours, 300.0);
    }

    #[test]
    fn percentage_capped_at_100() {
        // 2000h/4 * 1.5 = 750h against a 250h quarter.
        let projection = project(
            &collaborator(1000.0),
            &[workload(10, 2000.0, &[Month::May])],
        );
        let q2 = &projection.quarters[1];
        assert_eq!(q2.projected_hours, 750.0);
        assert_eq!(q2.percentage, 100);
        assert_eq!(q2.status, SeasonStatus::Critical);
        for q in &projection.quarters {
            assert!(q.percentage <= MAX_DISPLAY_PCT);
        }
    }

    #[test]
    fn zero_capacity_yields_zero_percent() {
        let projection = project(&collaborator(0.0), &[workload(10, 100.0, &[])]);
        for q in &projection.quarters {
            assert_eq!(q.percentage, 0);
            assert_eq!(q.status, SeasonStatus::Normal);
        }
    }

    #[test]
    fn status_boundaries() {
        assert_eq!(SeasonStatus::from_percentage(70), SeasonStatus::Normal);
        assert_eq!(SeasonStatus::from_percentage(71), SeasonStatus::Elevated);
        assert_eq!(SeasonStatus::from_percentage(90), SeasonStatus::Elevated);
        assert_eq!(SeasonStatus::from_percentage(91), SeasonStatus::Critical);
    }

    #[test]
    fn workloads_merge_hours_per_file_and_join_peaks() {
        let files = vec![ClientFile {
            id: 10,
            name: "Dupont".to_string(),
            kind: "SARL".to_string(),
            budgeted_hours: 200.0,
            billing: BillingPeriodicity::Monthly,
            peak_months: vec![Month::April],
        }];
        let assignments = vec![
            Assignment {
                id: 1,
                collaborator_id: 1,
                client_file_id: 10,
                role: RoleTag::Manager,
                budgeted_hours: 40.0,
                realized_hours: 0.0,
                value_coefficient: 1.0,
                period: "2024".to_string(),
            },
            Assignment {
                id: 2,
                collaborator_id: 1,
                client_file_id: 10,
                role: RoleTag::Encoder,
                budgeted_hours: 60.0,
                realized_hours: 0.0,
                value_coefficient: 1.0,
                period: "2024".to_string(),
            },
            Assignment {
                id: 3,
                collaborator_id: 1,
                client_file_id: 99,
                role: RoleTag::Encoder,
                budgeted_hours: 8.0,
                realized_hours: 0.0,
                value_coefficient: 1.0,
                period: "2024".to_string(),
            },
            Assignment {
                id: 4,
                collaborator_id: 2,
                client_file_id: 10,
                role: RoleTag::Encoder,
                budgeted_hours: 500.0,
                realized_hours: 0.0,
                value_coefficient: 1.0,
                period: "2024".to_string(),
            },
        ];
        let workloads = workloads_for(1, &assignments, &files);
        assert_eq!(workloads.len(), 2);
        assert_eq!(workloads[0].hours, 100.0);
        assert_eq!(workloads[0].peak_months, vec![Month::April]);
        assert!(workloads[1].peak_months.is_empty());
    }

    // -- cache ----------------------------------------------------------------

    #[test]
    fn cache_hits_within_a_revision() {
        let cache = SeasonalityCache::new();
        let c = collaborator(1600.0);
        let mut calls = 0;
        for _ in 0..3 {
            cache.get_or_compute(1, 1, || {
                calls += 1;
                project(&c, &[])
            });
        }
        assert_eq!(calls, 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn cache_invalidated_by_new_revision() {
        let cache = SeasonalityCache::new();
        let c = collaborator(1600.0);
        let first = cache.get_or_compute(1, 1, || project(&c, &[]));
        let second = cache.get_or_compute(1, 2, || project(&c, &[workload(10, 400.0, &[])]));
        assert_ne!(first, second);
        assert_eq!(second.quarters[0].projected_hours, 100.0);
        let stats = cache.stats();
        assert_eq!(stats.revision, 2);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.misses, 2);
    }
}
