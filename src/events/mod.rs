//! Lifecycle notifications from the CDC slot table
//!
//! A table attached to an [`EventBus`] reports each slot that becomes
//! occupied or empty, and each init/deinit it rejects. Nothing is buffered
//! for a table without a bus.

pub mod types;

pub use types::CdcEvent;

use tokio::sync::broadcast;

/// Lifecycle events kept for a slow subscriber before it sees `Lagged`
const LIFECYCLE_BACKLOG: usize = 64;

/// Fan-out of [`CdcEvent`]s to any number of listeners
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use usb_cdc_slots::cdc::{CdcConfig, CdcSlotTable, UsbDevHandle};
/// use usb_cdc_slots::events::EventBus;
///
/// let bus = Arc::new(EventBus::new());
/// let mut rx = bus.subscribe();
/// let mut table: CdcSlotTable = CdcSlotTable::new().with_event_bus(bus);
///
/// table.init(0, &CdcConfig::acm(UsbDevHandle::USBDEV_0)).ok();
/// while let Ok(event) = rx.try_recv() {
///     println!("{} on interface {}", event.event_name(), event.itf());
/// }
/// ```
pub struct EventBus {
    tx: broadcast::Sender<CdcEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(LIFECYCLE_BACKLOG);
        Self { tx }
    }

    /// Hand `event` to every current listener; with none it is discarded
    pub fn publish(&self, event: CdcEvent) {
        let _ = self.tx.send(event);
    }

    /// Listen for events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CdcEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdc::ClassKind;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(CdcEvent::InterfaceDeinitialized {
            itf: 0,
            class_kind: ClassKind::Communications,
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, CdcEvent::InterfaceDeinitialized { .. }));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(CdcEvent::OperationFailed {
            itf: 1,
            operation: "init".to_string(),
            error: "test".to_string(),
        });

        let event1 = rx1.recv().await.unwrap();
        let event2 = rx2.recv().await.unwrap();
        assert_eq!(event1.event_name(), "cdc.operation_failed");
        assert_eq!(event2.event_name(), "cdc.operation_failed");
    }

    #[test]
    fn test_slow_subscriber_lags() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        for _ in 0..LIFECYCLE_BACKLOG + 1 {
            bus.publish(CdcEvent::InterfaceDeinitialized {
                itf: 0,
                class_kind: ClassKind::Data,
            });
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
        assert_eq!(rx.try_recv().unwrap().itf(), 0);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        bus.publish(CdcEvent::InterfaceDeinitialized {
            itf: 0,
            class_kind: ClassKind::Data,
        });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
