//! The location picker subsystem.
//!
//! `LocationPicker` is the hierarchy state machine an embedding form
//! drives: it holds the Region -> Province -> City/Municipality -> Barangay
//! selection, keeps the four dropdown option lists fresh through tagged
//! asynchronous fetches, and emits the canonical location string on every
//! transition. The resolver reconstructs a selection from a stored string
//! when a record is reopened for editing.

pub mod resolver;
pub mod state;

pub use resolver::{resolve, ResolvedLocation};
pub use state::{
    ChangeListener, CompletionLevel, HierarchySelection, LocationPicker, PickerProps,
    RegionListener,
};
