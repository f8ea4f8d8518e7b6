//! mfgdocs: Manufacturing process documentation toolkit
//!
//! Stores manufacturing steps and the resources they use (parts, tools,
//! machines, roles, consumables, actions, locations, companies) as plain JSON
//! records and answers dependency and part-flow questions about them.

pub mod cli;
pub mod core;
pub mod entities;
pub mod json;
