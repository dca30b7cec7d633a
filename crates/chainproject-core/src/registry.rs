//! Projection trait + registry.
//!
//! The registry is built once at startup and is read-only afterwards. Each
//! (contract, event) pair is bound to exactly one projection together with
//! the [`EventSchema`] its envelopes must satisfy.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::entity::EntityWrite;
use crate::envelope::EventEnvelope;
use crate::error::ProjectionError;
use crate::schema::EventSchema;
use crate::store::EntityStore;

/// A pure mapping from one decoded event to entity writes.
///
/// Implementations must not block, perform I/O, or read clocks/randomness:
/// the same envelope and store must always yield the same writes. The only
/// error a projection may return is `MalformedEnvelope`, raised by the
/// envelope's typed param accessors.
pub trait Projection: Send + Sync {
    fn project(
        &self,
        event: &EventEnvelope,
        store: &EntityStore,
    ) -> Result<Vec<EntityWrite>, ProjectionError>;
}

impl<F> Projection for F
where
    F: Fn(&EventEnvelope, &EntityStore) -> Result<Vec<EntityWrite>, ProjectionError>
        + Send
        + Sync,
{
    fn project(
        &self,
        event: &EventEnvelope,
        store: &EntityStore,
    ) -> Result<Vec<EntityWrite>, ProjectionError> {
        self(event, store)
    }
}

/// A registered projection and the schema of the event it consumes.
#[derive(Clone)]
pub struct Binding {
    schema: EventSchema,
    projection: Arc<dyn Projection>,
}

impl Binding {
    pub fn schema(&self) -> &EventSchema {
        &self.schema
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("schema", &self.schema.signature())
            .finish_non_exhaustive()
    }
}

/// Registry of projections keyed by exact (contract, event) match.
#[derive(Debug, Clone, Default)]
pub struct ProjectionRegistry {
    bindings: BTreeMap<(String, String), Binding>,
}

impl ProjectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `projection` to the (contract, event) pair named by `schema`.
    ///
    /// Fails with `DuplicateRegistration` if that pair is already bound; the
    /// existing binding is left in place.
    pub fn register<P>(&mut self, schema: EventSchema, projection: P) -> Result<(), ProjectionError>
    where
        P: Projection + 'static,
    {
        let key = (schema.contract.clone(), schema.event.clone());
        if self.bindings.contains_key(&key) {
            return Err(ProjectionError::DuplicateRegistration {
                contract: key.0,
                event: key.1,
            });
        }
        tracing::debug!(
            contract = %schema.contract,
            event = %schema.event,
            signature = %schema.signature(),
            "registered projection"
        );
        self.bindings.insert(
            key,
            Binding {
                schema,
                projection: Arc::new(projection),
            },
        );
        Ok(())
    }

    /// Look up the binding for an exact (contract, event) pair.
    pub fn resolve(&self, contract: &str, event: &str) -> Option<&Binding> {
        self.bindings.get(&(contract.to_string(), event.to_string()))
    }

    /// Look up the schema for an exact (contract, event) pair.
    pub fn schema(&self, contract: &str, event: &str) -> Option<&EventSchema> {
        self.resolve(contract, event).map(Binding::schema)
    }

    /// All registered (contract, event) pairs, sorted.
    pub fn triggers(&self) -> Vec<(String, String)> {
        self.bindings.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::value::ParamType;

    fn noop(_: &EventEnvelope, _: &EntityStore) -> Result<Vec<EntityWrite>, ProjectionError> {
        Ok(vec![])
    }

    fn record(e: &EventEnvelope, _: &EntityStore) -> Result<Vec<EntityWrite>, ProjectionError> {
        Ok(vec![EntityWrite::set("Recorded", Entity::for_event(e))])
    }

    #[test]
    fn resolve_exact_pair() {
        let mut registry = ProjectionRegistry::new();
        registry
            .register(EventSchema::new("EntryPoint", "BeforeExecution"), record)
            .unwrap();

        assert!(registry.resolve("EntryPoint", "BeforeExecution").is_some());
        assert!(registry.resolve("EntryPoint", "Deposited").is_none());
        assert!(registry.resolve("Paymaster", "BeforeExecution").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = ProjectionRegistry::new();
        let schema = EventSchema::new("EntryPoint", "Deposited")
            .indexed("account", ParamType::Address)
            .param("totalDeposit", ParamType::Uint(256));
        registry.register(schema.clone(), record).unwrap();

        let err = registry.register(schema, noop).unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::DuplicateRegistration { ref contract, ref event }
                if contract == "EntryPoint" && event == "Deposited"
        ));

        // The first binding survives.
        let binding = registry.resolve("EntryPoint", "Deposited").unwrap();
        let event = EventEnvelope::builder("EntryPoint", "Deposited").build();
        let writes = binding.projection().project(&event, &EntityStore::new()).unwrap();
        assert_eq!(writes.len(), 1);
    }

    #[test]
    fn closures_are_projections() {
        let mut registry = ProjectionRegistry::new();
        let entity_type = String::from("Closure");
        registry
            .register(
                EventSchema::new("EntryPoint", "BeforeExecution"),
                move |e: &EventEnvelope,
                      _: &EntityStore|
                      -> Result<Vec<EntityWrite>, ProjectionError> {
                    Ok(vec![EntityWrite::set(entity_type.clone(), Entity::for_event(e))])
                },
            )
            .unwrap();
        assert_eq!(
            registry.triggers(),
            vec![("EntryPoint".to_string(), "BeforeExecution".to_string())]
        );
    }
}
