//! # Folio Server Library
//!
//! Wiring and operational endpoints for the Folio server binary.

pub mod app;
pub mod di;
pub mod startup;
