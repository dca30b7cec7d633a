//! chainproject-core — event-to-entity projection for decoded contract logs.
//!
//! # Architecture
//!
//! ```text
//! EventEnvelope → ProjectionEngine
//!                     ├── ProjectionRegistry (contract, event) → Binding
//!                     │       ├── EventSchema   (param validation)
//!                     │       └── Projection    (pure: envelope + store → writes)
//!                     ├── EventCursor        (canonical block/log ordering)
//!                     └── EntityStore        (immutable snapshots)
//!
//! MockHarness = create_mock_db + create_mock_event + process_event
//! ```

pub mod config;
pub mod cursor;
pub mod engine;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod mock;
pub mod registry;
pub mod schema;
pub mod store;
pub mod value;

pub use config::{EngineConfig, UnhandledPolicy};
pub use cursor::EventCursor;
pub use engine::{Applied, ProjectionEngine, ReplayReport};
pub use entity::{Entity, EntityId, EntityWrite};
pub use envelope::{EnvelopeBuilder, EventEnvelope};
pub use error::ProjectionError;
pub use logging::{init_tracing, LogConfig, LogFormat};
pub use mock::{
    default_mock_address, mock_addresses, MockDb, MockDefaults, MockHarness, MockOverrides,
};
pub use registry::{Binding, Projection, ProjectionRegistry};
pub use schema::{EventSchema, ParamDef};
pub use store::EntityStore;
pub use value::{ParamType, Value};
