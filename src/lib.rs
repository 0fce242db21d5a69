#![warn(missing_docs)]

//! Coordinate mappings as used in astronomical world coordinate system (WCS) pipelines. \
//! The central mapping is [`LutMap`], which transforms 1-dimensional coordinates by linear
//! interpolation in a lookup table. Every mapping shares the [`Mapping`] interface and can be
//! stored in the polymorphic [`Map`] handle, which composes mappings in series or in parallel.
//!
//! ## Interface
//! Each mapping is constructed once and is immutable afterwards; construction copies the data it
//! is given. Additional attributes are assigned either through an options string of
//! comma-separated `Key=Value` pairs or via `with_*()` functions.
//!
//! Example:
//! ```rust
//! use astmap::{LutMap, Mapping};
//!
//! let lut = LutMap::new(&[0., 1., 4., 9.], 0., 1., "LutEpsilon=1e-3").unwrap();
//! assert_eq!(lut.apply(1.5), 2.5);
//! assert_eq!(lut.apply_inverse(2.5).unwrap(), 1.5);
//! assert_eq!(lut.n_in(), 1);
//! ```
//!
//! Mappings are applied to batches of points stored as `ndarray` arrays of shape
//! `(n_points, n_coordinates)`:
//! ```rust
//! use astmap::{Map, Mapping, ShiftMap, ZoomMap};
//! use ndarray::array;
//!
//! let shift = Map::from(ShiftMap::new(&[-0.5, 1.2], "").unwrap());
//! let zoom = Map::from(ZoomMap::new(2, 2., "").unwrap());
//! let series = shift.then(zoom).unwrap();
//! let out = series.tran_forward(array![[1., 3.]].view()).unwrap();
//! assert_eq!(out, array![[1., 8.4]]);
//! ```
//!
//! With the default `parallel` feature, batches can also be transformed on the rayon thread
//! pool (see [`MappingPar`]).
//!
//! ## Mapping kinds
//! - [`LutMap`]: 1-D lookup table with linear interpolation and extrapolation.
//! - [`UnitMap`], [`ZoomMap`], [`ShiftMap`], [`MatrixMap`]: simple linear mappings.
//! - [`SeriesMap`], [`ParallelMap`]: compound mappings.
//! - [`UnitNormMap`]: unit vector and norm relative to a centre.
//! - [`RateMap`]: rate of change of one output of a mapping with respect to one input.
//!
//! [`MapSplit`] extracts the part of a mapping that transforms a subset of its inputs, and
//! [`Map::simplify()`] removes redundant steps from compound mappings.

pub mod attributes;
pub mod basic;
pub mod compound;
pub mod error;
pub mod lut;
pub mod mapping;
pub(crate) mod ndarray_utils;
pub mod rate;
pub(crate) mod simplify;
pub mod split;
pub mod unit_norm;

pub use attributes::Attributes;
pub use basic::{MatrixMap, ShiftMap, UnitMap, ZoomMap};
pub use compound::{ParallelMap, SeriesMap};
pub use error::{MappingError, Result};
pub use lut::{Interpolation, LutMap, Monotonicity};
pub use mapping::{Direction, Map, Mapping};
#[cfg(feature = "parallel")]
pub use mapping::MappingPar;
pub use ndarray_utils::IntoNdarray2;
pub use rate::RateMap;
pub use split::MapSplit;
pub use unit_norm::UnitNormMap;

/// A generic float trait such that all mappings are generic over `f32`/`f64`.
///
/// This trait is automatically implemented for all types implementing the supertraits.
/// Particularly, this includes `f32` and `f64`.
/// [`num_traits::Float`] is not a supertrait as the need to specify the provider of the redundant definitions of the basic math functions would clutter the code.
pub trait Float: Copy + Default + nalgebra::RealField + num_traits::FromPrimitive {}

impl<F> Float for F where F: Copy + Default + nalgebra::RealField + num_traits::FromPrimitive {}
