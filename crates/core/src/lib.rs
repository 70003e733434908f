//! Domain core for the rota schedule editor.
//!
//! Canonical types, calendar-date normalization, wire decoding and the
//! pure pieces of the assignment grid (model builder, staging store,
//! past-date guard, close flow). No I/O and no internal deps, so every
//! other crate in the workspace can use it.

pub mod close_flow;
pub mod confirm;
pub mod dates;
pub mod error;
pub mod grid;
pub mod guard;
pub mod schedule;
pub mod staging;
pub mod types;
pub mod wire;
