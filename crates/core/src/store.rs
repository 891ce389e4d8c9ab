//! Owned in-memory stores with immutable snapshots.
//!
//! [`AssignmentStore`] and [`ProspectQueue`] are the single owners of their
//! lists. Every mutation publishes a new [`Snapshot`] on a
//! `tokio::sync::watch` channel; readers either take the current snapshot or
//! subscribe for changes. Snapshots are never mutated after publication.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::ingest::PortfolioSeed;
use crate::roster::{Assignment, ClientFile, Collaborator, ManagerCapacity, Prospect};
use crate::threshold_validation::{validate_hours, validate_positive};
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable view of a store at one revision.
#[derive(Debug, Serialize)]
pub struct Snapshot<T> {
    /// Incremented on every successful mutation, starting at 1.
    pub revision: u64,
    pub items: Vec<T>,
}

impl<T> Snapshot<T> {
    fn initial(items: Vec<T>) -> Arc<Self> {
        Arc::new(Self { revision: 1, items })
    }
}

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

// ---------------------------------------------------------------------------
// Assignment store
// ---------------------------------------------------------------------------

/// Known collaborator and client file ids an assignment must reference.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIds {
    pub collaborators: Vec<EntityId>,
    pub client_files: Vec<EntityId>,
}

#[derive(Debug)]
pub struct AssignmentStore {
    sender: watch::Sender<Arc<Snapshot<Assignment>>>,
    references: Option<ReferenceIds>,
}

/// Validate an assignment's numbers and, when provided, its references.
pub fn validate_assignment(
    assignment: &Assignment,
    references: Option<&ReferenceIds>,
) -> Result<(), CoreError> {
    validate_hours(assignment.budgeted_hours, "budgeted_hours")?;
    validate_hours(assignment.realized_hours, "realized_hours")?;
    validate_positive(assignment.value_coefficient, "value_coefficient")?;

    if let Some(refs) = references {
        if !refs.collaborators.contains(&assignment.collaborator_id) {
            return Err(CoreError::NotFound {
                entity: "collaborator",
                id: assignment.collaborator_id,
            });
        }
        if !refs.client_files.contains(&assignment.client_file_id) {
            return Err(CoreError::NotFound {
                entity: "client_file",
                id: assignment.client_file_id,
            });
        }
    }
    Ok(())
}

impl AssignmentStore {
    /// Create a store without reference checks.
    pub fn new(initial: Vec<Assignment>) -> Self {
        let (sender, _) = watch::channel(Snapshot::initial(initial));
        Self {
            sender,
            references: None,
        }
    }

    /// Create a store that rejects assignments to unknown collaborators or
    /// client files.
    pub fn with_references(initial: Vec<Assignment>, references: ReferenceIds) -> Self {
        let (sender, _) = watch::channel(Snapshot::initial(initial));
        Self {
            sender,
            references: Some(references),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot<Assignment>> {
        Arc::clone(&self.sender.borrow())
    }

    /// Subscribe to future snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<Assignment>>> {
        self.sender.subscribe()
    }

    /// Insert or replace an assignment by id.
    pub fn upsert(
        &self,
        assignment: Assignment,
    ) -> Result<(UpsertOutcome, Arc<Snapshot<Assignment>>), CoreError> {
        validate_assignment(&assignment, self.references.as_ref())?;

        let mut outcome = UpsertOutcome::Inserted;
        let mut published = None;
        self.sender.send_modify(|current| {
            let mut items = current.items.clone();
            match items.iter_mut().find(|a| a.id == assignment.id) {
                Some(existing) => {
                    *existing = assignment;
                    outcome = UpsertOutcome::Updated;
                }
                None => items.push(assignment),
            }
            let next = Arc::new(Snapshot {
                revision: current.revision + 1,
                items,
            });
            published = Some(Arc::clone(&next));
            *current = next;
        });
        let snapshot = published
            .ok_or_else(|| CoreError::Internal("upsert published no snapshot".to_string()))?;
        Ok((outcome, snapshot))
    }

    /// Insert a new assignment under the next free id, ignoring `assignment.id`.
    pub fn create(
        &self,
        mut assignment: Assignment,
    ) -> Result<(Assignment, Arc<Snapshot<Assignment>>), CoreError> {
        validate_assignment(&assignment, self.references.as_ref())?;

        let mut published = None;
        self.sender.send_modify(|current| {
            assignment.id = current.items.iter().map(|a| a.id).max().unwrap_or(0) + 1;
            let mut items = current.items.clone();
            items.push(assignment.clone());
            let next = Arc::new(Snapshot {
                revision: current.revision + 1,
                items,
            });
            published = Some(Arc::clone(&next));
            *current = next;
        });
        let snapshot = published
            .ok_or_else(|| CoreError::Internal("create published no snapshot".to_string()))?;
        Ok((assignment, snapshot))
    }

    /// Remove an assignment by id.
    pub fn remove(
        &self,
        id: EntityId,
    ) -> Result<(Assignment, Arc<Snapshot<Assignment>>), CoreError> {
        let mut removed = None;
        self.sender.send_if_modified(|current| {
            let Some(pos) = current.items.iter().position(|a| a.id == id) else {
                return false;
            };
            let mut items = current.items.clone();
            let assignment = items.remove(pos);
            let next = Arc::new(Snapshot {
                revision: current.revision + 1,
                items,
            });
            removed = Some((assignment, Arc::clone(&next)));
            *current = next;
            true
        });

        match removed {
            Some(result) => Ok(result),
            None => Err(CoreError::NotFound {
                entity: "assignment",
                id,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Prospect queue
// ---------------------------------------------------------------------------

/// Pending prospects awaiting a manager.
#[derive(Debug)]
pub struct ProspectQueue {
    sender: watch::Sender<Arc<Snapshot<Prospect>>>,
}

impl ProspectQueue {
    pub fn new(initial: Vec<Prospect>) -> Self {
        let (sender, _) = watch::channel(Snapshot::initial(initial));
        Self { sender }
    }

    pub fn snapshot(&self) -> Arc<Snapshot<Prospect>> {
        Arc::clone(&self.sender.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<Prospect>>> {
        self.sender.subscribe()
    }

    pub fn get(&self, id: EntityId) -> Result<Prospect, CoreError> {
        self.sender
            .borrow()
            .items
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "prospect",
                id,
            })
    }

    /// Remove a prospect from the pending list and return it.
    pub fn take(&self, id: EntityId) -> Result<Prospect, CoreError> {
        let mut taken = None;
        self.sender.send_if_modified(|current| {
            let Some(pos) = current.items.iter().position(|p| p.id == id) else {
                return false;
            };
            let mut items = current.items.clone();
            taken = Some(items.remove(pos));
            *current = Arc::new(Snapshot {
                revision: current.revision + 1,
                items,
            });
            true
        });
        taken.ok_or(CoreError::NotFound {
            entity: "prospect",
            id,
        })
    }
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// The firm's roster plus its mutable stores.
#[derive(Debug)]
pub struct Portfolio {
    pub collaborators: Vec<Collaborator>,
    pub client_files: Vec<ClientFile>,
    pub managers: Vec<ManagerCapacity>,
    pub assignments: AssignmentStore,
    pub prospects: ProspectQueue,
}

impl Portfolio {
    /// Build from a normalized seed. Seed assignments must reference known
    /// collaborators and client files.
    pub fn from_seed(seed: PortfolioSeed) -> Result<Self, CoreError> {
        let references = ReferenceIds {
            collaborators: seed.collaborators.iter().map(|c| c.id).collect(),
            client_files: seed.client_files.iter().map(|f| f.id).collect(),
        };
        for a in &seed.assignments {
            validate_assignment(a, Some(&references))?;
        }

        Ok(Self {
            collaborators: seed.collaborators,
            client_files: seed.client_files,
            managers: seed.managers,
            assignments: AssignmentStore::with_references(seed.assignments, references),
            prospects: ProspectQueue::new(seed.prospects),
        })
    }

    pub fn collaborator(&self, id: EntityId) -> Result<&Collaborator, CoreError> {
        self.collaborators
            .iter()
            .find(|c| c.id == id)
            .ok_or(CoreError::NotFound {
                entity: "collaborator",
                id,
            })
    }

    pub fn manager(&self, id: EntityId) -> Result<&ManagerCapacity, CoreError> {
        self.managers
            .iter()
            .find(|m| m.id == id)
            .ok_or(CoreError::NotFound {
                entity: "manager",
                id,
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
