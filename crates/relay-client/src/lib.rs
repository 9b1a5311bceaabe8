//! Client side of the chat relay.
//!
//! The relay keeps no conversation state, so the client owns all of it:
//! history, selected model and the last usage counters.  [`Conversation`]
//! implements that bookkeeping on top of any [`RelayApi`]; [`RelayClient`]
//! is the HTTP implementation.

pub mod api;
pub mod conversation;
pub mod error;

pub use api::{RelayApi, RelayClient, DEFAULT_RELAY_URL};
pub use conversation::{Conversation, ServiceIndicator, TurnOutcome, APOLOGY, CONNECTION_APOLOGY};
pub use error::ClientError;
