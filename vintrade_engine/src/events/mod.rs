//! Downstream notifications.
//!
//! Components outside the engine subscribe to reconciliation events through [`EventHooks`]. Delivery is best-effort:
//! a full or closed channel is logged and the event is dropped, and the reconciliation result is never affected.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::OrderReconciledEvent;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
