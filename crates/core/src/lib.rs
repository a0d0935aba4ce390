//! # ShiftSync Core
//!
//! Domain types and pure scheduling logic shared by the database layer and the
//! HTTP API. Nothing in this crate performs I/O.

pub mod errors;
pub mod models;
