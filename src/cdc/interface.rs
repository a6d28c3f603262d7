//! CDC interface record and its configuration

use serde::{Deserialize, Serialize};

use super::class::{CdcSubclass, ClassKind, CommSubclass, DataSubclass};
use super::object::SubclassObject;
use crate::error::Result;

/// Identifier of the USB device an interface belongs to (`tinyusb_usbdev_t`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsbDevHandle(pub u8);

impl UsbDevHandle {
    /// The first (and on most chips only) USB device
    pub const USBDEV_0: UsbDevHandle = UsbDevHandle(0);
}

/// Configuration consumed by `init`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdcConfig {
    /// USB device to set up
    pub usb_dev: UsbDevHandle,
    /// Class and subclass, tagged together
    pub subclass: CdcSubclass,
}

impl CdcConfig {
    /// Communications interface with the given subclass
    pub fn comm(usb_dev: UsbDevHandle, subclass: CommSubclass) -> Self {
        Self {
            usb_dev,
            subclass: CdcSubclass::Communications(subclass),
        }
    }

    /// Abstract Control Model (virtual serial port)
    pub fn acm(usb_dev: UsbDevHandle) -> Self {
        Self::comm(usb_dev, CommSubclass::AbstractControl)
    }

    /// Data interface
    pub fn data(usb_dev: UsbDevHandle) -> Self {
        Self {
            usb_dev,
            subclass: CdcSubclass::Data(DataSubclass::Data),
        }
    }

    /// Build from raw USB class and subclass codes
    pub fn from_raw(usb_dev: UsbDevHandle, class_code: u8, subclass_code: u8) -> Result<Self> {
        Ok(Self {
            usb_dev,
            subclass: CdcSubclass::from_codes(class_code, subclass_code)?,
        })
    }

    pub fn class_kind(&self) -> ClassKind {
        self.subclass.class_kind()
    }
}

/// An active CDC interface, owned by its slot
#[derive(Debug)]
pub struct CdcInterface {
    usb_dev: UsbDevHandle,
    subclass: CdcSubclass,
    subclass_obj: Option<Box<dyn SubclassObject>>,
}

impl CdcInterface {
    pub(crate) fn new(
        config: &CdcConfig,
        subclass_obj: Option<Box<dyn SubclassObject>>,
    ) -> Self {
        Self {
            usb_dev: config.usb_dev,
            subclass: config.subclass,
            subclass_obj,
        }
    }

    pub fn usb_dev(&self) -> UsbDevHandle {
        self.usb_dev
    }

    pub fn class_kind(&self) -> ClassKind {
        self.subclass.class_kind()
    }

    pub fn subclass(&self) -> CdcSubclass {
        self.subclass
    }

    pub fn subclass_obj(&self) -> Option<&(dyn SubclassObject + 'static)> {
        self.subclass_obj.as_deref()
    }

    pub fn subclass_obj_mut(&mut self) -> Option<&mut (dyn SubclassObject + 'static)> {
        self.subclass_obj.as_deref_mut()
    }

    /// Attach or replace the subclass object, returning the previous one
    pub fn set_subclass_obj(
        &mut self,
        obj: Option<Box<dyn SubclassObject>>,
    ) -> Option<Box<dyn SubclassObject>> {
        std::mem::replace(&mut self.subclass_obj, obj)
    }

    /// Snapshot for callers that cannot hold a borrow
    pub fn info(&self, itf: usize) -> CdcInterfaceInfo {
        CdcInterfaceInfo {
            itf,
            usb_dev: self.usb_dev,
            class_kind: self.class_kind(),
            subclass: self.subclass,
            subclass_obj: self.subclass_obj.as_ref().map(|o| o.name().to_string()),
        }
    }
}

/// Owned snapshot of an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CdcInterfaceInfo {
    pub itf: usize,
    pub usb_dev: UsbDevHandle,
    pub class_kind: ClassKind,
    pub subclass: CdcSubclass,
    /// Name of the attached subclass object, if any
    pub subclass_obj: Option<String>,
}
