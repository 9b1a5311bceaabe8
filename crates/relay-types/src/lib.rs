//! Wire types shared by `relay-server` and `relay-client`.
//!
//! Everything here is a request-scoped value object.  Validation lives in the
//! constructors so that a [`ChatMessage`] with blank content can never be
//! built, whether it comes from Rust code or from a JSON body.

pub mod chat;
pub mod error;
pub mod health;
pub mod model;
pub mod usage;

pub use chat::{ChatMessage, ChatRequest, ChatResponse, Role};
pub use error::ValidationError;
pub use health::{HealthStatus, ServiceStatus};
pub use model::{ModelInfo, ModelsResponse};
pub use usage::Usage;
