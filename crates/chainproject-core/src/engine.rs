//! Projection engine — applies decoded events to entity store snapshots.
//!
//! ```text
//! EventEnvelope ──resolve(contract, event)──► Binding
//!                                               ├── schema.validate(params)
//!                                               └── projection.project(event, store)
//!                                                        │
//!                      EntityStore ◄──fold writes────────┘
//! ```
//!
//! The engine holds no entity data between calls. Callers thread the
//! snapshot returned by one `apply` into the next.

use serde::Serialize;
use std::sync::Arc;

use crate::config::{EngineConfig, UnhandledPolicy};
use crate::cursor::EventCursor;
use crate::entity::EntityWrite;
use crate::envelope::EventEnvelope;
use crate::error::ProjectionError;
use crate::registry::ProjectionRegistry;
use crate::store::EntityStore;

/// Result of applying one event: the new snapshot plus the writes that
/// produced it, in application order.
#[derive(Debug, Clone, Serialize)]
pub struct Applied {
    pub store: EntityStore,
    pub writes: Vec<EntityWrite>,
}

/// Summary of a `replay` run.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Snapshot after the last applied event.
    pub store: EntityStore,
    /// Every write in application order, for the persistence layer.
    pub writes: Vec<EntityWrite>,
    /// Events that matched a projection.
    pub applied: usize,
    /// Unhandled events skipped under `UnhandledPolicy::Skip`.
    pub skipped: usize,
    /// Position of the last event consumed.
    pub cursor: EventCursor,
}

/// Applies envelopes to snapshots using a fixed registry.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    registry: Arc<ProjectionRegistry>,
    config: EngineConfig,
}

impl ProjectionEngine {
    /// Engine with the default config (abort on unhandled, enforce ordering).
    pub fn new(registry: ProjectionRegistry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: ProjectionRegistry, config: EngineConfig) -> Self {
        tracing::info!(
            projections = registry.len(),
            unhandled = %config.unhandled,
            enforce_ordering = config.enforce_ordering,
            "projection engine ready"
        );
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    pub fn registry(&self) -> &ProjectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply one event and return the next snapshot.
    ///
    /// Fails with `UnhandledEvent` if nothing is bound to the event's
    /// (contract, event) pair, `MalformedEnvelope` if its params do not
    /// match the bound schema, or `ForeignEntityId` if the projection sets an
    /// entity under any id but the event's own. On failure `store` is
    /// untouched.
    pub fn apply(
        &self,
        event: &EventEnvelope,
        store: &EntityStore,
    ) -> Result<EntityStore, ProjectionError> {
        self.apply_logged(event, store).map(|applied| applied.store)
    }

    /// Like [`apply`](Self::apply), but also returns the write log.
    pub fn apply_logged(
        &self,
        event: &EventEnvelope,
        store: &EntityStore,
    ) -> Result<Applied, ProjectionError> {
        let binding = self
            .registry
            .resolve(event.contract(), event.event())
            .ok_or_else(|| ProjectionError::UnhandledEvent {
                contract: event.contract().to_string(),
                event: event.event().to_string(),
            })?;

        binding.schema().validate(event.params())?;
        let writes = binding.projection().project(event, store)?;
        check_write_ids(event, &writes)?;

        let next = writes.iter().fold(store.clone(), |s, w| s.apply_write(w));

        tracing::debug!(
            contract = event.contract(),
            event = event.event(),
            entity_id = %event.entity_id(),
            block = event.block_number(),
            writes = writes.len(),
            "applied event"
        );

        Ok(Applied {
            store: next,
            writes,
        })
    }

    /// Apply a stream of events in arrival order.
    ///
    /// Unhandled events are skipped or abort the run according to
    /// `config.unhandled`. Any other error aborts immediately; the snapshot
    /// reached so far is discarded with it.
    pub fn replay<'a, I>(&self, events: I, store: &EntityStore) -> Result<ReplayReport, ProjectionError>
    where
        I: IntoIterator<Item = &'a EventEnvelope>,
    {
        let mut report = ReplayReport {
            store: store.clone(),
            writes: Vec::new(),
            applied: 0,
            skipped: 0,
            cursor: EventCursor::new(),
        };

        for event in events {
            if self.config.enforce_ordering {
                report.cursor.advance(event.position())?;
            }
            match self.apply_logged(event, &report.store) {
                Ok(applied) => {
                    report.store = applied.store;
                    report.writes.extend(applied.writes);
                    report.applied += 1;
                }
                Err(err)
                    if err.is_recoverable() && self.config.unhandled == UnhandledPolicy::Skip =>
                {
                    tracing::warn!(
                        contract = event.contract(),
                        event = event.event(),
                        block = event.block_number(),
                        log_index = event.log_index(),
                        "skipping unhandled event"
                    );
                    report.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            applied = report.applied,
            skipped = report.skipped,
            writes = report.writes.len(),
            entities = report.store.len(),
            "replay finished"
        );
        Ok(report)
    }
}

/// Every `Set` must carry the triggering event's id. Deletes may target any
/// entity already in the store.
fn check_write_ids(event: &EventEnvelope, writes: &[EntityWrite]) -> Result<(), ProjectionError> {
    let expected = event.entity_id();
    for write in writes {
        if let EntityWrite::Set { entity_type, entity } = write {
            if entity.id() != &expected {
                return Err(ProjectionError::ForeignEntityId {
                    contract: event.contract().to_string(),
                    event: event.event().to_string(),
                    entity_type: entity_type.clone(),
                    expected: expected.to_string(),
                    written: entity.id().to_string(),
                });
            }
        }
    }
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
