use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::trace;

/// Buffer per event type; slow subscribers skip ahead past this many events.
const DEFAULT_CAPACITY: usize = 64;

/// Marker trait for types that can travel on the [`EventBus`].
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug, Default)]
struct BusInner {
    channels: RwLock<FxHashMap<TypeId, Box<dyn Any + Send + Sync>>>,
    closed: AtomicBool,
}

/// Typed broadcast bus. Cloning shares the same channels.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to events of type `T`.
    ///
    /// # Errors
    /// [`EventBusError::Closed`] after [`EventBus::shutdown`].
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity(DEFAULT_CAPACITY)
    }

    /// Subscribes with an explicit buffer size for a not-yet-created channel.
    ///
    /// The capacity only applies when this call creates the channel.
    ///
    /// # Errors
    /// [`EventBusError::InvalidCapacity`] for zero, [`EventBusError::Closed`] after shutdown.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        if capacity == 0 {
            return Err(EventBusError::InvalidCapacity {
                message: "capacity must be greater than zero".into(),
                context: Some(type_name::<T>().into()),
            });
        }
        Ok(self.sender::<T>(capacity)?.subscribe())
    }

    /// Publishes `event` to every current subscriber of `T`; returns how many received it.
    ///
    /// # Errors
    /// [`EventBusError::Closed`] after shutdown.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        let sender = self.sender::<T>(DEFAULT_CAPACITY)?;
        let delivered = sender.send(Arc::new(event)).unwrap_or(0);
        trace!(event = type_name::<T>(), delivered, "Event published");
        Ok(delivered)
    }

    /// Number of live subscribers for `T`.
    #[must_use]
    pub fn subscriber_count<T: Event>(&self) -> usize {
        self.inner
            .channels
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|sender| sender.downcast_ref::<broadcast::Sender<Arc<T>>>())
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Drops every channel; pending receivers observe closure. Returns the channel count.
    pub fn shutdown(&self) -> usize {
        self.inner.closed.store(true, Ordering::Release);
        let mut channels = self.inner.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn sender<T: Event>(&self, capacity: usize) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(EventBusError::Closed {
                message: type_name::<T>().into(),
                context: None,
            });
        }

        let id = TypeId::of::<T>();
        if let Some(existing) = self.inner.channels.read().get(&id) {
            return downcast::<T>(&**existing);
        }

        let mut channels = self.inner.channels.write();
        let entry = channels.entry(id).or_insert_with(|| {
            let (tx, _) = broadcast::channel::<Arc<T>>(capacity);
            Box::new(tx)
        });
        downcast::<T>(&**entry)
    }
}

fn downcast<T: Event>(
    sender: &(dyn Any + Send + Sync),
) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
    sender.downcast_ref::<broadcast::Sender<Arc<T>>>().cloned().ok_or_else(|| {
        EventBusError::TypeMismatch { message: type_name::<T>().into(), context: None }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventReceiverExt;

    #[derive(Debug, PartialEq)]
    struct Tick(u32);

    #[derive(Debug, PartialEq)]
    struct Tock(&'static str);

    #[tokio::test]
    async fn events_are_routed_by_type() {
        let bus = EventBus::new();
        let mut ticks = bus.subscribe::<Tick>().unwrap();
        let mut tocks = bus.subscribe::<Tock>().unwrap();

        assert_eq!(bus.publish(Tick(1)).unwrap(), 1);
        assert_eq!(bus.publish(Tock("a")).unwrap(), 1);

        assert_eq!(*ticks.next_event().await.unwrap(), Tick(1));
        assert_eq!(*tocks.next_event().await.unwrap(), Tock("a"));
        assert!(ticks.drain().is_empty());
    }

    #[test]
    fn publishing_without_subscribers_returns_zero() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(Tick(7)).unwrap(), 0);
        assert_eq!(bus.subscriber_count::<Tick>(), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_to_the_tail() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_with_capacity::<Tick>(2).unwrap();
        for i in 0..10 {
            bus.publish(Tick(i)).unwrap();
        }
        let received: Vec<u32> = rx.drain().iter().map(|t| t.0).collect();
        assert_eq!(received, [8, 9]);
    }

    #[tokio::test]
    async fn shutdown_closes_receivers_and_rejects_new_channels() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe::<Tick>().unwrap();
        assert_eq!(bus.shutdown(), 1);

        assert!(rx.next_event().await.is_none());
        assert!(matches!(bus.publish(Tick(1)), Err(EventBusError::Closed { .. })));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let bus = EventBus::new();
        assert!(matches!(
            bus.subscribe_with_capacity::<Tick>(0),
            Err(EventBusError::InvalidCapacity { .. })
        ));
    }
}
