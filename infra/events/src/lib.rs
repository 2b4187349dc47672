//! # Event Bus
//!
//! A typed, in-process publish/subscribe bus. Events are keyed by their Rust type; every
//! type gets one `tokio::sync::broadcast` channel created on first use. Publishing with no
//! subscribers is not an error: the event is dropped and `0` is returned.
//!
//! The router announces navigations on it and modules raise user-visible notifications.
//!
//! ```rust
//! use farm_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Debug, PartialEq)]
//! struct SaleRecorded { quantity: u32 }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<SaleRecorded>()?;
//!     bus.publish(SaleRecorded { quantity: 12 })?;
//!
//!     let event = rx.next_event().await.expect("open channel");
//!     assert_eq!(event.quantity, 12);
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
