//! Inventory domain module.
//!
//! This crate contains the consignment item record, its status machine and
//! the view-model that filters/sorts records for display. Everything here is
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;
pub mod stats;
pub mod view;

pub use item::{transition, transition_to, InventoryItem, ItemPatch, ItemStatus, NewItem};
pub use stats::InventoryStats;
pub use view::{
    history, malformed_fields, project, SearchDirective, SortDirection, SortDirective, SortField,
};
