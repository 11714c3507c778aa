//! Domain models for the street service.
//!
//! - [`Street`]: a named polyline with a capacity attribute. Its geometry is an
//!   ordered list of [`Coordinate`]s; the order defines the path.
//! - [`Coordinate`]: a single 2-D point.
//!
//! Geometry only ever grows one point at a time, at either end, through the
//! insertion strategies in [`crate::ops`].

mod street;

pub use street::*;
