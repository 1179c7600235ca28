//! Pure data passes: normalizers, state tables, and the aggregations that
//! turn upstream listings into dashboard views.

pub mod aggregator;
pub mod normalize;
pub mod states;
