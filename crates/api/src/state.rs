use std::sync::Arc;

use cabinet_core::seasonality::SeasonalityCache;
use cabinet_core::store::Portfolio;
use cabinet_events::{ActivityLog, EventBus};

use crate::annotations::AnnotationBoards;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Roster plus the assignment store and prospect queue.
    pub portfolio: Arc<Portfolio>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing dashboard events.
    pub event_bus: Arc<EventBus>,
    /// Recent events, fed by a background consumer of `event_bus`.
    pub activity: Arc<ActivityLog>,
    /// Quarterly projections memoized per assignment snapshot revision.
    pub seasonality_cache: Arc<SeasonalityCache>,
    /// One annotator per document.
    pub annotations: Arc<AnnotationBoards>,
}

impl AppState {
    /// Assemble state around a portfolio, spawning the activity consumer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(portfolio: Portfolio, config: ServerConfig) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let activity = Arc::new(ActivityLog::new(config.activity_log_capacity));
        tokio::spawn(ActivityLog::run(
            Arc::clone(&activity),
            event_bus.subscribe(),
        ));

        Self {
            portfolio: Arc::new(portfolio),
            config: Arc::new(config),
            annotations: Arc::new(AnnotationBoards::new(Arc::clone(&event_bus))),
            event_bus,
            activity,
            seasonality_cache: Arc::new(SeasonalityCache::new()),
        }
    }
}
