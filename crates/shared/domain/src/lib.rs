//! # Domain Models
//!
//! Pure data for FarmHub: the farm records, the [`app_data::SharedAppData`] snapshot every
//! module reads and writes, configuration, and well-known names.
//! Keep it lean: `serde` and `bitflags` only, no I/O.

pub mod app_data;
pub mod config;
pub mod constants;
pub mod modules;
pub mod records;
