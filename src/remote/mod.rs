//! Adapters for the upstream data sources.
//!
//! Each adapter issues plain GET requests through a shared [`HttpClient`] and
//! deserializes only the fields the service reads.

pub mod client;
pub mod congress;
pub mod fec;
pub mod legislators;
pub mod lenient;

pub use client::{FetchError, HttpClient};
pub use congress::{CongressApi, RawMember, RawTerm};
pub use fec::{CandidateTotals, FecApi, ScheduleARow};
pub use legislators::{ContactDirectory, LegislatorsApi};
