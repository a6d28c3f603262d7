//! CDC slot table - per-interface lifecycle and state validation
//!
//! Each slot is either empty or holds one active [`CdcInterface`]:
//!
//! ```text
//! Empty ──init(Communications)──▶ Occupied(Communications) ──deinit──▶ Empty
//! Empty ──init(Data)────────────▶ Occupied(Data) ───────────deinit──▶ Empty
//! ```
//!
//! Every operation goes through [`CdcSlotTable::obj_check`] before it touches
//! a slot. A failed operation leaves the table exactly as it was.

use std::sync::Arc;
use tracing::{debug, error};

use super::class::ClassKind;
use super::endpoint::{EndpointAllocator, DEFAULT_MAX_ENDPOINTS};
use super::interface::{CdcConfig, CdcInterface};
use super::object::default_object;
use crate::error::{CdcError, Result};
use crate::events::{CdcEvent, EventBus};

/// Number of CDC slots in the table (`CFG_TUD_CDC`)
pub const CDC_INTF_NUM: usize = 2;

/// Interface numbers below this bound are accepted by `init`/`deinit`
///
/// The USB stack currently drives a single CDC interface, so only
/// interface 0 is usable even when the table has room for more.
pub const MAX_SUPPORTED_ITF: usize = 1;

/// Fixed-capacity table of CDC interface slots, indexed by interface number
pub struct CdcSlotTable<const N: usize = CDC_INTF_NUM> {
    slots: [Option<CdcInterface>; N],
    endpoint_allocator: EndpointAllocator,
    events: Option<Arc<EventBus>>,
}

impl<const N: usize> CdcSlotTable<N> {
    /// Create an empty table with the default endpoint budget
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_MAX_ENDPOINTS)
    }

    /// Create an empty table with a custom endpoint budget
    pub fn with_endpoints(max_endpoints: u8) -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            endpoint_allocator: EndpointAllocator::new(max_endpoints),
            events: None,
        }
    }

    /// Publish lifecycle events to `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Check if the slot holds an interface
    ///
    /// Indices outside the table are reported as not initialized.
    pub fn is_initialized(&self, itf: usize) -> bool {
        matches!(self.slots.get(itf), Some(Some(_)))
    }

    /// Fail with `InvalidState` unless the slot is occupied
    pub fn interface_check(&self, itf: usize) -> Result<()> {
        if self.is_initialized(itf) {
            Ok(())
        } else {
            error!("Interface is not initialized. Use `init` for initialization");
            Err(CdcError::InvalidState(format!(
                "CDC interface {} is not initialized",
                itf
            )))
        }
    }

    /// Validate the slot state before an operation
    ///
    /// * `expected_inited` - whether the slot must be occupied
    /// * `expected_kind` - class the occupant must have; `None` if any class will do
    ///
    /// Occupancy mismatch yields `InvalidState`, class mismatch `InvalidArgument`.
    pub fn obj_check(
        &self,
        itf: usize,
        expected_inited: bool,
        expected_kind: Option<ClassKind>,
    ) -> Result<()> {
        let current = self.slots.get(itf).and_then(Option::as_ref);

        if expected_inited != current.is_some() {
            let expected = if expected_inited {
                "initialized"
            } else {
                "not initialized"
            };
            error!(
                "Wrong state of the interface {}. Expected state: {}",
                itf, expected
            );
            return Err(CdcError::InvalidState(format!(
                "CDC interface {} expected to be {}",
                itf, expected
            )));
        }

        if let (Some(intf), Some(kind)) = (current, expected_kind) {
            if intf.class_kind() != kind {
                error!(
                    "Wrong type of the interface {}. Should be: {}",
                    itf, kind
                );
                return Err(CdcError::InvalidArgument(format!(
                    "CDC interface {} is {}, expected {}",
                    itf,
                    intf.class_kind(),
                    kind
                )));
            }
        }

        Ok(())
    }

    /// Get the interface at `itf`, or `None` if the slot is empty
    pub fn get_intf(&self, itf: usize) -> Option<&CdcInterface> {
        self.interface_check(itf).ok()?;
        self.slots.get(itf)?.as_ref()
    }

    /// Mutable variant of [`get_intf`](Self::get_intf)
    pub fn get_intf_mut(&mut self, itf: usize) -> Option<&mut CdcInterface> {
        self.interface_check(itf).ok()?;
        self.slots.get_mut(itf)?.as_mut()
    }

    /// Initialize a CDC interface in an empty slot
    pub fn init(&mut self, itf: usize, config: &CdcConfig) -> Result<()> {
        debug!("CDC initialization...");
        let result = self.try_init(itf, config);
        self.notify_failure(itf, "init", &result);
        result
    }

    /// Tear down the interface at `itf`
    ///
    /// The teardown path is picked from the stored class, never from the caller.
    pub fn deinit(&mut self, itf: usize) -> Result<()> {
        let result = self.try_deinit(itf);
        self.notify_failure(itf, "deinit", &result);
        result
    }

    /// Interface numbers of all occupied slots, ascending
    pub fn initialized_interfaces(&self) -> Vec<usize> {
        self.iter().map(|(itf, _)| itf).collect()
    }

    /// Iterate over occupied slots
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CdcInterface)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(itf, slot)| slot.as_ref().map(|intf| (itf, intf)))
    }

    /// Get endpoint usage info (used, max)
    pub fn endpoint_info(&self) -> (u8, u8) {
        (
            self.endpoint_allocator.used(),
            self.endpoint_allocator.max(),
        )
    }

    fn try_init(&mut self, itf: usize, config: &CdcConfig) -> Result<()> {
        self.check_supported(itf)?;

        match config.class_kind() {
            ClassKind::Communications => self.comm_init(itf, config).map_err(|e| {
                error!("CDC Comm init failed: {}", e);
                e
            })?,
            ClassKind::Data => self.data_init(itf, config).map_err(|e| {
                error!("CDC Data init failed: {}", e);
                e
            })?,
        }

        Ok(())
    }

    fn try_deinit(&mut self, itf: usize) -> Result<()> {
        self.check_supported(itf)?;

        let kind = match self.slots[itf].as_ref() {
            Some(intf) => intf.class_kind(),
            None => return self.obj_check(itf, true, None),
        };

        match kind {
            ClassKind::Communications => self.deinit_comm(itf).map_err(|e| {
                error!("CDC Comm deinit failed: {}", e);
                e
            })?,
            ClassKind::Data => self.deinit_data(itf).map_err(|e| {
                error!("CDC Data deinit failed: {}", e);
                e
            })?,
        }

        debug!("De-initialized CDC interface {}", itf);
        Ok(())
    }

    fn comm_init(&mut self, itf: usize, config: &CdcConfig) -> Result<()> {
        self.obj_check(itf, false, None)?;
        self.occupy(itf, config)?;
        debug!("CDC Comm class initialized");
        Ok(())
    }

    fn data_init(&mut self, itf: usize, config: &CdcConfig) -> Result<()> {
        self.obj_check(itf, false, Some(ClassKind::Data))?;
        self.occupy(itf, config)?;
        debug!("CDC Data class initialized");
        Ok(())
    }

    fn deinit_comm(&mut self, itf: usize) -> Result<()> {
        self.obj_check(itf, true, Some(ClassKind::Communications))?;
        self.vacate(itf, ClassKind::Communications);
        Ok(())
    }

    fn deinit_data(&mut self, itf: usize) -> Result<()> {
        self.obj_check(itf, true, Some(ClassKind::Data))?;
        self.vacate(itf, ClassKind::Data);
        Ok(())
    }

    /// Reserve resources and store a new interface in an empty slot
    ///
    /// `itf` must already have passed `check_supported`.
    fn occupy(&mut self, itf: usize, config: &CdcConfig) -> Result<()> {
        let kind = config.class_kind();
        self.endpoint_allocator
            .reserve(kind)
            .map_err(|e| {
                error!("CDC {} initialization error: {}", kind.description(), e);
                e
            })?;

        self.slots[itf] = Some(CdcInterface::new(config, default_object(&config.subclass)));

        if let Some(bus) = &self.events {
            bus.publish(CdcEvent::InterfaceInitialized {
                itf,
                class_kind: kind,
                subclass: config.subclass,
            });
        }
        Ok(())
    }

    /// Drop the interface in `itf` and release what it held
    ///
    /// The caller has already gated `itf` as occupied by `kind`.
    fn vacate(&mut self, itf: usize, kind: ClassKind) {
        drop(self.slots[itf].take());
        self.endpoint_allocator.release(kind);

        if let Some(bus) = &self.events {
            bus.publish(CdcEvent::InterfaceDeinitialized {
                itf,
                class_kind: kind,
            });
        }
    }

    fn check_supported(&self, itf: usize) -> Result<()> {
        if itf >= MAX_SUPPORTED_ITF || itf >= N {
            error!("There is no CDC interface no.{}", itf);
            return Err(CdcError::InvalidArgument(format!(
                "There is no CDC interface no.{}",
                itf
            )));
        }
        Ok(())
    }

    fn notify_failure(&self, itf: usize, operation: &str, result: &Result<()>) {
        if let (Err(e), Some(bus)) = (result, &self.events) {
            bus.publish(CdcEvent::OperationFailed {
                itf,
                operation: operation.to_string(),
                error: e.to_string(),
            });
        }
    }
}

impl<const N: usize> Default for CdcSlotTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdc::class::{CdcSubclass, CommSubclass, DataSubclass};
    use crate::cdc::interface::UsbDevHandle;
    use crate::cdc::object::{AcmState, LineCoding, Parity};

    const DEV: UsbDevHandle = UsbDevHandle::USBDEV_0;

    fn table() -> CdcSlotTable {
        CdcSlotTable::new()
    }

    #[test]
    fn test_unsupported_index_rejected() {
        let mut t = table();
        for itf in 1..CDC_INTF_NUM + 3 {
            assert!(matches!(
                t.init(itf, &CdcConfig::acm(DEV)),
                Err(CdcError::InvalidArgument(_))
            ));
            assert!(matches!(t.deinit(itf), Err(CdcError::InvalidArgument(_))));
            assert!(!t.is_initialized(itf));
        }
        assert!(t.initialized_interfaces().is_empty());
        assert_eq!(t.endpoint_info().0, 0);
    }

    #[test]
    fn test_unsupported_index_leaves_occupied_slot() {
        let mut t = table();
        t.init(0, &CdcConfig::data(DEV)).unwrap();

        assert!(matches!(
            t.init(1, &CdcConfig::acm(DEV)),
            Err(CdcError::InvalidArgument(_))
        ));
        assert!(matches!(t.deinit(1), Err(CdcError::InvalidArgument(_))));
        assert_eq!(t.get_intf(0).unwrap().class_kind(), ClassKind::Data);
        assert_eq!(t.initialized_interfaces(), vec![0]);
    }

    #[test]
    fn test_init_empty_slot() {
        let mut t = table();
        assert!(!t.is_initialized(0));
        t.init(0, &CdcConfig::data(UsbDevHandle(3))).unwrap();
        assert!(t.is_initialized(0));

        let intf = t.get_intf(0).unwrap();
        assert_eq!(intf.usb_dev(), UsbDevHandle(3));
        assert_eq!(intf.subclass(), CdcSubclass::Data(DataSubclass::Data));
    }

    #[test]
    fn test_init_occupied_slot_rejected() {
        let mut t = table();
        t.init(0, &CdcConfig::acm(DEV)).unwrap();
        let before = t.get_intf(0).unwrap().info(0);
        let endpoints_before = t.endpoint_info();

        for cfg in [
            CdcConfig::acm(UsbDevHandle(1)),
            CdcConfig::comm(DEV, CommSubclass::NetworkControl),
            CdcConfig::data(DEV),
        ] {
            assert!(matches!(t.init(0, &cfg), Err(CdcError::InvalidState(_))));
        }

        assert_eq!(t.get_intf(0).unwrap().info(0), before);
        assert_eq!(t.endpoint_info(), endpoints_before);
    }

    #[test]
    fn test_deinit_empty_slot_rejected() {
        let mut t = table();
        assert!(matches!(t.deinit(0), Err(CdcError::InvalidState(_))));
        assert!(!t.is_initialized(0));
        assert_eq!(t.endpoint_info(), (0, DEFAULT_MAX_ENDPOINTS));
    }

    #[test]
    fn test_deinit_empty_slot_goes_through_gate() {
        let bus = Arc::new(EventBus::new());
        let mut rx = bus.subscribe();
        let mut t: CdcSlotTable = CdcSlotTable::with_endpoints(3).with_event_bus(bus);
        t.init(0, &CdcConfig::acm(DEV)).unwrap();
        t.deinit(0).unwrap();
        let _ = rx.try_recv().unwrap();
        let _ = rx.try_recv().unwrap();

        let gate = t.obj_check(0, true, None).unwrap_err();
        let err = t.deinit(0).unwrap_err();
        assert_eq!(err.to_string(), gate.to_string());
        assert_eq!(err.kind(), "invalid_state");
        assert_eq!(t.endpoint_info(), (0, 3));

        // only the failure is reported, no teardown event
        assert!(matches!(
            rx.try_recv().unwrap(),
            CdcEvent::OperationFailed { itf: 0, .. }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_deinit_twice() {
        let mut t = table();
        t.init(0, &CdcConfig::acm(DEV)).unwrap();
        t.deinit(0).unwrap();
        assert!(matches!(t.deinit(0), Err(CdcError::InvalidState(_))));
    }

    #[test]
    fn test_reuse_across_class_kinds() {
        let mut t = table();
        t.init(0, &CdcConfig::acm(DEV)).unwrap();
        t.deinit(0).unwrap();
        assert!(!t.is_initialized(0));

        t.init(0, &CdcConfig::data(DEV)).unwrap();
        assert_eq!(t.get_intf(0).unwrap().class_kind(), ClassKind::Data);
        t.deinit(0).unwrap();
        assert_eq!(t.endpoint_info().0, 0);
    }

    #[test]
    fn test_deinit_dispatches_on_stored_class() {
        let bus = Arc::new(EventBus::new());
        let mut rx = bus.subscribe();
        let mut t = table().with_event_bus(bus);

        t.init(0, &CdcConfig::acm(DEV)).unwrap();
        t.deinit(0).unwrap();

        assert!(matches!(
            rx.try_recv().unwrap(),
            CdcEvent::InterfaceInitialized {
                itf: 0,
                class_kind: ClassKind::Communications,
                ..
            }
        ));
        assert_eq!(
            rx.try_recv().unwrap(),
            CdcEvent::InterfaceDeinitialized {
                itf: 0,
                class_kind: ClassKind::Communications,
            }
        );

        t.init(0, &CdcConfig::data(DEV)).unwrap();
        t.deinit(0).unwrap();
        let _ = rx.try_recv().unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            CdcEvent::InterfaceDeinitialized {
                itf: 0,
                class_kind: ClassKind::Data,
            }
        );
    }

    #[test]
    fn test_failure_events() {
        let bus = Arc::new(EventBus::new());
        let mut rx = bus.subscribe();
        let mut t = table().with_event_bus(bus);

        assert!(t.deinit(0).is_err());
        match rx.try_recv().unwrap() {
            CdcEvent::OperationFailed { itf, operation, .. } => {
                assert_eq!(itf, 0);
                assert_eq!(operation, "deinit");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_get_intf() {
        let mut t = table();
        assert!(t.get_intf(0).is_none());
        assert!(t.get_intf(7).is_none());

        t.init(0, &CdcConfig::comm(DEV, CommSubclass::EthernetNetworking))
            .unwrap();
        let intf = t.get_intf(0).unwrap();
        assert_eq!(intf.class_kind(), ClassKind::Communications);
        assert_eq!(
            intf.subclass(),
            CdcSubclass::Communications(CommSubclass::EthernetNetworking)
        );
        assert!(intf.subclass_obj().is_none());
    }

    #[test]
    fn test_acm_scenario() {
        let mut t = table();
        t.init(0, &CdcConfig::acm(DEV)).unwrap();
        assert!(t.is_initialized(0));
        assert_eq!(
            t.get_intf(0).unwrap().class_kind(),
            ClassKind::Communications
        );
        t.deinit(0).unwrap();
        assert!(!t.is_initialized(0));
    }

    #[test]
    fn test_index_one_scenario() {
        let mut t = table();
        assert!(matches!(
            t.init(1, &CdcConfig::data(DEV)),
            Err(CdcError::InvalidArgument(_))
        ));
        assert!(!t.is_initialized(1));
    }

    #[test]
    fn test_obj_check() {
        let mut t = table();
        assert!(t.obj_check(0, false, None).is_ok());
        assert!(t.obj_check(0, false, Some(ClassKind::Data)).is_ok());
        assert!(matches!(
            t.obj_check(0, true, None),
            Err(CdcError::InvalidState(_))
        ));

        t.init(0, &CdcConfig::acm(DEV)).unwrap();
        assert!(t.obj_check(0, true, None).is_ok());
        assert!(t
            .obj_check(0, true, Some(ClassKind::Communications))
            .is_ok());
        assert!(matches!(
            t.obj_check(0, true, Some(ClassKind::Data)),
            Err(CdcError::InvalidArgument(_))
        ));
        // occupancy is checked before class
        assert!(matches!(
            t.obj_check(0, false, Some(ClassKind::Data)),
            Err(CdcError::InvalidState(_))
        ));
    }

    #[test]
    fn test_interface_check() {
        let mut t = table();
        assert!(matches!(
            t.interface_check(0),
            Err(CdcError::InvalidState(_))
        ));
        t.init(0, &CdcConfig::data(DEV)).unwrap();
        assert!(t.interface_check(0).is_ok());
        assert!(t.interface_check(CDC_INTF_NUM).is_err());
    }

    #[test]
    fn test_allocation_failure_leaves_slot_empty() {
        let mut t: CdcSlotTable = CdcSlotTable::with_endpoints(1);
        assert!(matches!(
            t.init(0, &CdcConfig::data(DEV)),
            Err(CdcError::AllocationFailure(_))
        ));
        assert!(!t.is_initialized(0));
        assert_eq!(t.endpoint_info(), (0, 1));

        // Communications needs only the notification endpoint
        t.init(0, &CdcConfig::acm(DEV)).unwrap();
        assert_eq!(t.endpoint_info(), (1, 1));
    }

    #[test]
    fn test_acm_object_lifetime() {
        let mut t = table();
        t.init(0, &CdcConfig::acm(DEV)).unwrap();

        let coding = LineCoding {
            bit_rate: 9600,
            parity: Parity::Even,
            ..LineCoding::default()
        };
        {
            let acm = t
                .get_intf_mut(0)
                .and_then(|i| i.subclass_obj_mut())
                .and_then(|o| o.downcast_mut::<AcmState>())
                .unwrap();
            acm.set_line_coding(coding);
            acm.set_control_line_state(true, true);
        }
        let acm = t
            .get_intf(0)
            .and_then(|i| i.subclass_obj())
            .and_then(|o| o.downcast_ref::<AcmState>())
            .unwrap();
        assert_eq!(acm.line_coding().bit_rate, 9600);
        assert!(acm.dtr());

        // a new init starts from a fresh object
        t.deinit(0).unwrap();
        t.init(0, &CdcConfig::acm(DEV)).unwrap();
        let acm = t
            .get_intf(0)
            .and_then(|i| i.subclass_obj())
            .and_then(|o| o.downcast_ref::<AcmState>())
            .unwrap();
        assert_eq!(acm.line_coding(), &LineCoding::default());
        assert!(!acm.dtr());
    }

    #[test]
    fn test_tables_are_independent() {
        let mut a = table();
        let b = table();
        a.init(0, &CdcConfig::acm(DEV)).unwrap();
        assert!(a.is_initialized(0));
        assert!(!b.is_initialized(0));
    }

    #[test]
    fn test_single_slot_table() {
        let mut t: CdcSlotTable<1> = CdcSlotTable::new();
        assert_eq!(t.capacity(), 1);
        t.init(0, &CdcConfig::data(DEV)).unwrap();
        assert!(!t.is_initialized(1));
        assert!(matches!(
            t.init(1, &CdcConfig::data(DEV)),
            Err(CdcError::InvalidArgument(_))
        ));
        assert!(matches!(t.deinit(1), Err(CdcError::InvalidArgument(_))));
        assert_eq!(t.endpoint_info().0, 2);
    }
}
