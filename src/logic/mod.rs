//! Aggregations over decoded collections.
//!
//! - [`filter`]: lane / surface / read / channel selection
//! - [`q_metric`]: q-score extents and per-lane roll-up
//! - [`heatmap`]: cycle by q-score heatmap
//! - [`by_lane`]: per-lane grouping of a scalar value

pub mod by_lane;
pub mod filter;
pub mod heatmap;
pub mod q_metric;
