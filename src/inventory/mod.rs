//! Inventory domain: device kinds, devices, inspection documents and checklist templates.

pub mod checklist;
pub mod device;
pub mod doc;
pub mod kind;

pub use checklist::{ChecklistForm, ChecklistTemplate};
pub use device::{Device, DeviceForm};
pub use doc::{CheckpointResult, DeviceDoc, DeviceDocForm, UpdateDeviceDocForm};
pub use kind::{DeviceKind, UnknownDeviceKind};
