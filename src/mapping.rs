//! The generic mapping interface and the polymorphic [`Map`] handle.

use std::fmt;

use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::basic::{MatrixMap, ShiftMap, UnitMap, ZoomMap};
use crate::compound::{ParallelMap, SeriesMap};
use crate::error::{MappingError, Result};
use crate::lut::LutMap;
use crate::ndarray_utils::IntoNdarray2;
use crate::rate::RateMap;
use crate::unit_norm::UnitNormMap;
use crate::Float;

/// Direction in which a mapping is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From input to output coordinates.
    Forward,
    /// From output to input coordinates.
    Inverse,
}

impl Direction {
    /// The opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }
}

pub(crate) fn check_point<F>(point: &[F], expected: usize) -> Result<()> {
    if point.len() == expected {
        Ok(())
    } else {
        Err(MappingError::DimensionMismatch {
            expected,
            found: point.len(),
        })
    }
}

/// A coordinate transformation between a fixed number of input and output coordinates.
pub trait Mapping<F: Float> {
    /// Name of the mapping kind, e.g. `"LutMap"`.
    fn class_name(&self) -> &'static str;

    /// Number of input coordinates.
    fn n_in(&self) -> usize;

    /// Number of output coordinates.
    fn n_out(&self) -> usize;

    /// Whether the forward transformation is defined.
    fn has_forward(&self) -> bool;

    /// Whether the inverse transformation is defined.
    fn has_inverse(&self) -> bool;

    /// Transform a single point.
    ///
    /// `point` has [`n_in`](Mapping::n_in()) coordinates for [`Direction::Forward`]
    /// and [`n_out`](Mapping::n_out()) for [`Direction::Inverse`].
    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>>;

    /// Number of coordinates `(in, out)` when applied in `direction`.
    fn dims(&self, direction: Direction) -> (usize, usize) {
        match direction {
            Direction::Forward => (self.n_in(), self.n_out()),
            Direction::Inverse => (self.n_out(), self.n_in()),
        }
    }

    /// Fail unless the mapping can be applied in `direction`.
    fn check_direction(&self, direction: Direction) -> Result<()> {
        match direction {
            Direction::Forward if !self.has_forward() => {
                Err(MappingError::NoForward(self.class_name()))
            }
            Direction::Inverse if !self.has_inverse() => {
                Err(MappingError::NotInvertible(self.class_name()))
            }
            _ => Ok(()),
        }
    }

    /// Transform a batch of points of shape `(n_points, n_coordinates)`.
    fn transform(&self, points: ArrayView2<F>, direction: Direction) -> Result<Array2<F>> {
        self.check_direction(direction)?;
        let (n_in, n_out) = self.dims(direction);
        if points.ncols() != n_in {
            return Err(MappingError::DimensionMismatch {
                expected: n_in,
                found: points.ncols(),
            });
        }

        let mut transformed = Array2::zeros((points.nrows(), n_out));
        for (point, mut row) in points.rows().into_iter().zip(transformed.rows_mut()) {
            let out = self.transform_point(&point.to_vec(), direction)?;
            row.assign(&ArrayView1::from(&out));
        }
        Ok(transformed)
    }

    /// Apply the forward transformation to points of shape `(n_points, n_in)`.
    fn tran_forward(&self, points: ArrayView2<F>) -> Result<Array2<F>> {
        self.transform(points, Direction::Forward)
    }

    /// Apply the inverse transformation to points of shape `(n_points, n_out)`.
    fn tran_inverse(&self, points: ArrayView2<F>) -> Result<Array2<F>> {
        self.transform(points, Direction::Inverse)
    }

    /// Apply the forward transformation to an owned array, `nalgebra` matrix or nested `Vec`
    /// of points.
    ///
    /// Fails with [`MappingError::DimensionMismatch`] for rows of unequal length.
    fn tran_forward_points<P>(&self, points: P) -> Result<Array2<F>>
    where
        P: IntoNdarray2<Out = Array2<F>>,
        Self: Sized,
    {
        self.tran_forward(points.into_ndarray2()?.view())
    }
}

/// A handle holding any kind of mapping.
///
/// This is the type used to combine mappings: [`then`](Map::then()) and [`of`](Map::of())
/// build series mappings, [`beside`](Map::beside()) builds parallel mappings and
/// [`inverse`](Map::inverse()) swaps the directions.
#[derive(Clone, Debug, PartialEq)]
pub enum Map<F: Float> {
    /// Identity.
    Unit(UnitMap<F>),
    /// Scaling of every axis.
    Zoom(ZoomMap<F>),
    /// Translation.
    Shift(ShiftMap<F>),
    /// Linear transformation.
    Matrix(MatrixMap<F>),
    /// Lookup table.
    Lut(LutMap<F>),
    /// Unit vector and norm relative to a centre.
    UnitNorm(UnitNormMap<F>),
    /// Rate of change of another mapping.
    Rate(RateMap<F>),
    /// Two mappings applied one after the other.
    Series(SeriesMap<F>),
    /// Two mappings applied side by side.
    Parallel(ParallelMap<F>),
    /// Another mapping with forward and inverse swapped.
    Inverted(Box<Map<F>>),
}

macro_rules! dispatch {
    ($self:ident, $map:ident => $body:expr, $inner:ident => $inverted:expr) => {
        match $self {
            Map::Unit($map) => $body,
            Map::Zoom($map) => $body,
            Map::Shift($map) => $body,
            Map::Matrix($map) => $body,
            Map::Lut($map) => $body,
            Map::UnitNorm($map) => $body,
            Map::Rate($map) => $body,
            Map::Series($map) => $body,
            Map::Parallel($map) => $body,
            Map::Inverted($inner) => $inverted,
        }
    };
}

impl<F: Float> Mapping<F> for Map<F> {
    fn class_name(&self) -> &'static str {
        dispatch!(self, map => map.class_name(), inner => inner.class_name())
    }

    fn n_in(&self) -> usize {
        dispatch!(self, map => map.n_in(), inner => inner.n_out())
    }

    fn n_out(&self) -> usize {
        dispatch!(self, map => map.n_out(), inner => inner.n_in())
    }

    fn has_forward(&self) -> bool {
        dispatch!(self, map => map.has_forward(), inner => inner.has_inverse())
    }

    fn has_inverse(&self) -> bool {
        dispatch!(self, map => map.has_inverse(), inner => inner.has_forward())
    }

    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>> {
        dispatch!(
            self,
            map => map.transform_point(point, direction),
            inner => inner.transform_point(point, direction.reverse())
        )
    }
}

impl<F: Float> Map<F> {
    /// Series mapping applying `self` first and `next` second.
    ///
    /// Fails if the outputs of `self` do not match the inputs of `next`.
    pub fn then(self, next: Map<F>) -> Result<Map<F>> {
        Ok(SeriesMap::new(self, next, "")?.into())
    }

    /// Series mapping applying `first` first and `self` second.
    pub fn of(self, first: Map<F>) -> Result<Map<F>> {
        first.then(self)
    }

    /// Parallel mapping applying `self` to the leading and `other` to the trailing coordinates.
    pub fn beside(self, other: Map<F>) -> Map<F> {
        ParallelMap::join(self, other).into()
    }

    /// A mapping with forward and inverse transformations swapped.
    pub fn inverse(&self) -> Map<F> {
        match self {
            Self::Unit(unit) => Self::Unit(unit.clone()),
            Self::Zoom(zoom) => Self::Zoom(zoom.inverse()),
            Self::Shift(shift) => Self::Shift(shift.inverse()),
            Self::Matrix(matrix) => match matrix.inverse() {
                Some(inverse) => Self::Matrix(inverse),
                None => Self::Inverted(Box::new(self.clone())),
            },
            Self::Series(series) => Self::Series(series.inverse()),
            Self::Parallel(parallel) => Self::Parallel(parallel.inverse()),
            Self::Inverted(map) => (**map).clone(),
            _ => Self::Inverted(Box::new(self.clone())),
        }
    }

    /// Simplified but equivalent mapping.
    ///
    /// Series chains are flattened, adjacent mappings that are inverses of each other cancel,
    /// adjacent zooms and shifts are merged and unit mappings are dropped.
    pub fn simplify(&self) -> Map<F> {
        let simplified = crate::simplify::simplify(self);
        debug!(
            "Simplified {} to {}.",
            self.class_name(),
            simplified.class_name()
        );
        simplified
    }

    /// Identification string of the mapping.
    pub fn ident(&self) -> &str {
        dispatch!(self, map => map.ident(), inner => inner.ident())
    }

    /// Identification string of this object; not carried over to copies.
    pub fn id(&self) -> &str {
        dispatch!(self, map => map.id(), inner => inner.id())
    }

    /// Borrow the mapping as a [`LutMap`].
    ///
    /// Fails with [`MappingError::TypeMismatch`] for any other kind of mapping.
    pub fn as_lut(&self) -> Result<&LutMap<F>> {
        match self {
            Self::Lut(lut) => Ok(lut),
            _ => Err(MappingError::TypeMismatch {
                expected: "LutMap",
                found: self.class_name(),
            }),
        }
    }

    /// Whether this is an [`Inverted`](Map::Inverted) wrapper.
    pub fn is_inverted(&self) -> bool {
        matches!(self, Self::Inverted(_))
    }
}

impl<F: Float> TryFrom<Map<F>> for LutMap<F> {
    type Error = MappingError;

    fn try_from(map: Map<F>) -> Result<Self> {
        match map {
            Map::Lut(lut) => Ok(lut),
            other => Err(MappingError::TypeMismatch {
                expected: "LutMap",
                found: other.class_name(),
            }),
        }
    }
}

macro_rules! impl_from {
    ($($variant:ident($kind:ty)),* $(,)?) => {
        $(
            impl<F: Float> From<$kind> for Map<F> {
                fn from(map: $kind) -> Self {
                    Map::$variant(map)
                }
            }
        )*
    };
}

impl_from!(
    Unit(UnitMap<F>),
    Zoom(ZoomMap<F>),
    Shift(ShiftMap<F>),
    Matrix(MatrixMap<F>),
    Lut(LutMap<F>),
    UnitNorm(UnitNormMap<F>),
    Rate(RateMap<F>),
    Series(SeriesMap<F>),
    Parallel(ParallelMap<F>),
);

impl<F: Float> fmt::Display for Map<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inverted(map) => write!(f, "Inverted({map})"),
            Self::Lut(lut) => write!(f, "{lut}"),
            Self::Series(series) => write!(f, "SeriesMap({}, {})", series.first(), series.second()),
            Self::Parallel(parallel) => {
                write!(f, "ParallelMap({}, {})", parallel.first(), parallel.second())
            }
            _ => write!(
                f,
                "{}(nin={}, nout={})",
                self.class_name(),
                self.n_in(),
                self.n_out()
            ),
        }
    }
}

#[cfg(feature = "parallel")]
pub use parallel::*;

#[cfg(feature = "parallel")]
mod parallel {
    use super::*;
    use itertools::Itertools;
    use log::info;
    use ndarray::Axis;
    use rayon::prelude::*;

    /// Batch transformation on the rayon thread pool.
    ///
    /// This trait is automatically implemented for every [`Mapping`] that is [`Sync`].
    pub trait MappingPar<F: Float>: Mapping<F> + Sync {
        /// Transform a batch of points of shape `(n_points, n_coordinates)`, in parallel.
        ///
        /// Also see [`transform`](Mapping::transform()) for more details.
        fn transform_par(&self, points: ArrayView2<F>, direction: Direction) -> Result<Array2<F>> {
            self.check_direction(direction)?;
            let (n_in, n_out) = self.dims(direction);
            if points.ncols() != n_in {
                return Err(MappingError::DimensionMismatch {
                    expected: n_in,
                    found: points.ncols(),
                });
            }

            info!(
                "Transforming {} points with {} in parallel.",
                points.nrows(),
                self.class_name()
            );
            let transformed = points
                .axis_iter(Axis(0))
                .into_par_iter()
                .map(|point| self.transform_point(&point.to_vec(), direction))
                .collect::<Result<Vec<_>>>()?;
            collect_points(transformed, n_out)
        }

        /// Apply the forward transformation in parallel.
        fn tran_forward_par(&self, points: ArrayView2<F>) -> Result<Array2<F>> {
            self.transform_par(points, Direction::Forward)
        }

        /// Apply the inverse transformation in parallel.
        fn tran_inverse_par(&self, points: ArrayView2<F>) -> Result<Array2<F>> {
            self.transform_par(points, Direction::Inverse)
        }
    }

    impl<F: Float, M: Mapping<F> + Sync> MappingPar<F> for M {}

    /// Flatten per-point results into a batch array.
    fn collect_points<F: Float>(points: Vec<Vec<F>>, n_coordinates: usize) -> Result<Array2<F>> {
        let n_points = points.len();
        let flat = points.into_iter().flatten().collect_vec();
        Ok(Array2::from_shape_vec((n_points, n_coordinates), flat)?)
    }
}
