//! Entity type definitions
//!
//! mfgdocs stores the following record types:
//!
//! - [`Step`] - One manufacturing operation with inputs, outputs and dependencies
//! - [`Part`] - Trackable items with a bill of materials
//! - [`Resource`] - Tools, machines, roles, actions, locations, consumables and
//!   companies, which share one record shape

pub mod part;
pub mod resource;
pub mod step;

pub use part::Part;
pub use resource::Resource;
pub use step::Step;
