//! Inbound webhook surface: typed payloads and the HTTP edge.

pub mod events;
pub mod server;

pub use events::{WebhookDecodeError, WebhookEnvelope, WebhookEvent, section_events};
pub use server::{WebhookState, build_router};

#[cfg(test)]
mod tests;
