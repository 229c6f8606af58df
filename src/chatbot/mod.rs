//! Support-chat pipeline: message intake → intent classification → entity
//! extraction → response routing (canned / catalog-backed / model-backed).
//!
//! The classifier and extractor are pure functions over normalized text;
//! pattern tables are compiled once at startup and shared read-only. The
//! router owns the fallback policy and never fails a turn: every branch,
//! including generation-service outages, degrades to a valid reply.

pub mod entities;
pub mod gateway;
pub mod intent;
pub mod responses;
pub mod router;

pub use entities::{EntityExtractor, EntityKind, EntitySet};
pub use gateway::{GeneratedReply, LlmGateway};
pub use intent::{Intent, IntentClassifier, IntentResult};
pub use router::{ChatPayload, ResponseRouter};
