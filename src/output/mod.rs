//! Output for the `sizetree` application.
//!
//! # Available Formatters
//!
//! - **Terminal**: human-readable listing of one drill level with size,
//!   share of the parent and an "Other" roll-up
//! - **CSV**: export of the root listing (`Name, Path, Type, Size`)
//! - **Status**: spinner-backed [`ScanObserver`](crate::explorer::ScanObserver)
//!   showing what is being scanned
//!
//! The formatters take already-sorted item slices and contain no scan logic.

pub mod csv;
pub mod status;
pub mod terminal;

/// CSV export function.
///
/// See [`csv::export`] for full documentation.
pub use csv::export as export_csv;
