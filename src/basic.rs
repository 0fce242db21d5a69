//! Simple linear mappings: identity, zoom, shift and matrix.

use std::marker::PhantomData;

use log::debug;
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;

use crate::attributes::Attributes;
use crate::error::{MappingError, Result};
use crate::mapping::{Direction, Mapping, check_point};
use crate::ndarray_utils::to_dmatrix;
use crate::Float;

/// Identity mapping of `n` coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitMap<F: Float> {
    n: usize,
    attributes: Attributes,
    _float: PhantomData<F>,
}

impl<F: Float> UnitMap<F> {
    /// Create an identity mapping of `n` coordinates.
    pub fn new(n: usize, options: &str) -> Result<Self> {
        if n == 0 {
            return Err(MappingError::invalid("UnitMap needs at least one axis"));
        }
        Ok(Self {
            n,
            attributes: Attributes::from_options("UnitMap", options)?,
            _float: PhantomData,
        })
    }

    /// Identification string.
    pub fn ident(&self) -> &str {
        self.attributes.ident()
    }

    /// Identification string of this object; not carried over to copies.
    pub fn id(&self) -> &str {
        self.attributes.id()
    }
}

impl<F: Float> Mapping<F> for UnitMap<F> {
    fn class_name(&self) -> &'static str {
        "UnitMap"
    }

    fn n_in(&self) -> usize {
        self.n
    }

    fn n_out(&self) -> usize {
        self.n
    }

    fn has_forward(&self) -> bool {
        true
    }

    fn has_inverse(&self) -> bool {
        true
    }

    fn transform_point(&self, point: &[F], _direction: Direction) -> Result<Vec<F>> {
        check_point(point, self.n)?;
        Ok(point.to_vec())
    }
}

/// Multiplies each of `n` coordinates by the same factor.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomMap<F: Float> {
    n: usize,
    zoom: F,
    attributes: Attributes,
}

impl<F: Float> ZoomMap<F> {
    /// Create a zoom mapping of `n` coordinates.
    ///
    /// `zoom` must be finite and non-zero.
    pub fn new(n: usize, zoom: F, options: &str) -> Result<Self> {
        if n == 0 {
            return Err(MappingError::invalid("ZoomMap needs at least one axis"));
        }
        if zoom.is_zero() || !zoom.is_finite() {
            return Err(MappingError::invalid(format!(
                "zoom factor must be finite and non-zero, got {zoom}"
            )));
        }
        Ok(Self {
            n,
            zoom,
            attributes: Attributes::from_options("ZoomMap", options)?,
        })
    }

    /// The zoom factor.
    pub fn zoom(&self) -> F {
        self.zoom
    }

    /// Identification string.
    pub fn ident(&self) -> &str {
        self.attributes.ident()
    }

    /// Identification string of this object; not carried over to copies.
    pub fn id(&self) -> &str {
        self.attributes.id()
    }

    pub(crate) fn inverse(&self) -> Self {
        Self {
            zoom: F::one() / self.zoom,
            ..self.clone()
        }
    }

    /// Same mapping restricted to `n` axes.
    pub(crate) fn with_axes(&self, n: usize) -> Self {
        Self { n, ..self.clone() }
    }
}

impl<F: Float> Mapping<F> for ZoomMap<F> {
    fn class_name(&self) -> &'static str {
        "ZoomMap"
    }

    fn n_in(&self) -> usize {
        self.n
    }

    fn n_out(&self) -> usize {
        self.n
    }

    fn has_forward(&self) -> bool {
        true
    }

    fn has_inverse(&self) -> bool {
        true
    }

    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>> {
        check_point(point, self.n)?;
        Ok(match direction {
            Direction::Forward => point.iter().map(|&x| x * self.zoom).collect(),
            Direction::Inverse => point.iter().map(|&x| x / self.zoom).collect(),
        })
    }
}

/// Adds a constant offset to each coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftMap<F: Float> {
    shift: Vec<F>,
    attributes: Attributes,
}

impl<F: Float> ShiftMap<F> {
    /// Create a shift mapping; the number of coordinates is `shift.len()`.
    pub fn new(shift: &[F], options: &str) -> Result<Self> {
        if shift.is_empty() {
            return Err(MappingError::invalid("ShiftMap needs at least one axis"));
        }
        if shift.iter().any(|s| !s.is_finite()) {
            return Err(MappingError::invalid("shift must be finite"));
        }
        Ok(Self {
            shift: shift.to_vec(),
            attributes: Attributes::from_options("ShiftMap", options)?,
        })
    }

    /// The offset of each coordinate.
    pub fn shift(&self) -> &[F] {
        &self.shift
    }

    /// Identification string.
    pub fn ident(&self) -> &str {
        self.attributes.ident()
    }

    /// Identification string of this object; not carried over to copies.
    pub fn id(&self) -> &str {
        self.attributes.id()
    }

    pub(crate) fn inverse(&self) -> Self {
        Self {
            shift: self.shift.iter().map(|&s| -s).collect(),
            attributes: self.attributes.clone(),
        }
    }

    /// Same mapping with the offsets replaced.
    pub(crate) fn with_shift(&self, shift: Vec<F>) -> Self {
        Self {
            shift,
            attributes: self.attributes.clone(),
        }
    }
}

impl<F: Float> Mapping<F> for ShiftMap<F> {
    fn class_name(&self) -> &'static str {
        "ShiftMap"
    }

    fn n_in(&self) -> usize {
        self.shift.len()
    }

    fn n_out(&self) -> usize {
        self.shift.len()
    }

    fn has_forward(&self) -> bool {
        true
    }

    fn has_inverse(&self) -> bool {
        true
    }

    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>> {
        check_point(point, self.shift.len())?;
        let shifted = point.iter().zip(&self.shift);
        Ok(match direction {
            Direction::Forward => shifted.map(|(&x, &s)| x + s).collect(),
            Direction::Inverse => shifted.map(|(&x, &s)| x - s).collect(),
        })
    }
}

/// Linear transformation `y = M x`.
///
/// The mapping has one input per column and one output per row of `M`.
/// The inverse is available if `M` is square and invertible.
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixMap<F: Float> {
    matrix: DMatrix<F>,
    inverse: Option<DMatrix<F>>,
    attributes: Attributes,
}

impl<F: Float> MatrixMap<F> {
    /// Create a matrix mapping.
    pub fn new(matrix: DMatrix<F>, options: &str) -> Result<Self> {
        if matrix.is_empty() {
            return Err(MappingError::invalid("MatrixMap needs a non-empty matrix"));
        }
        if matrix.iter().any(|m| !m.is_finite()) {
            return Err(MappingError::invalid("matrix elements must be finite"));
        }

        let inverse = if matrix.is_square() {
            matrix.clone().try_inverse()
        } else {
            None
        };
        debug!(
            "Constructed {}x{} MatrixMap, invertible: {}.",
            matrix.nrows(),
            matrix.ncols(),
            inverse.is_some()
        );

        Ok(Self {
            matrix,
            inverse,
            attributes: Attributes::from_options("MatrixMap", options)?,
        })
    }

    /// Create a matrix mapping from an `ndarray` array.
    pub fn from_array(matrix: &Array2<F>, options: &str) -> Result<Self> {
        Self::new(to_dmatrix(matrix.view()), options)
    }

    /// The transformation matrix.
    pub fn matrix(&self) -> &DMatrix<F> {
        &self.matrix
    }

    /// Identification string.
    pub fn ident(&self) -> &str {
        self.attributes.ident()
    }

    /// Identification string of this object; not carried over to copies.
    pub fn id(&self) -> &str {
        self.attributes.id()
    }

    /// The mapping with matrix and inverse swapped, if the matrix is invertible.
    pub(crate) fn inverse(&self) -> Option<Self> {
        let inverse = self.inverse.clone()?;
        Some(Self {
            matrix: inverse,
            inverse: Some(self.matrix.clone()),
            attributes: self.attributes.clone(),
        })
    }
}

impl<F: Float> Mapping<F> for MatrixMap<F> {
    fn class_name(&self) -> &'static str {
        "MatrixMap"
    }

    fn n_in(&self) -> usize {
        self.matrix.ncols()
    }

    fn n_out(&self) -> usize {
        self.matrix.nrows()
    }

    fn has_forward(&self) -> bool {
        true
    }

    fn has_inverse(&self) -> bool {
        self.inverse.is_some()
    }

    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>> {
        let matrix = match direction {
            Direction::Forward => &self.matrix,
            Direction::Inverse => self
                .inverse
                .as_ref()
                .ok_or(MappingError::NotInvertible("MatrixMap"))?,
        };
        check_point(point, matrix.ncols())?;
        let transformed = matrix * DVector::from_column_slice(point);
        Ok(transformed.as_slice().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::dmatrix;
    use ndarray::array;

    use super::*;

    #[test]
    fn unit() {
        let unit = UnitMap::<f64>::new(3, "").unwrap();
        assert_eq!(
            unit.transform_point(&[1., 2., 3.], Direction::Inverse).unwrap(),
            vec![1., 2., 3.]
        );
        assert!(UnitMap::<f64>::new(0, "").is_err());
    }

    #[test]
    fn zoom() {
        let zoom = ZoomMap::new(2, 1.3, "Ident=zoom").unwrap();
        assert_eq!(zoom.ident(), "zoom");
        let out = zoom.tran_forward(array![[1., 3.], [-2., 0.]].view()).unwrap();
        assert_abs_diff_eq!(out, array![[1.3, 3.9], [-2.6, 0.]], epsilon = 1e-12);
        let back = zoom.tran_inverse(out.view()).unwrap();
        assert_abs_diff_eq!(back, array![[1., 3.], [-2., 0.]], epsilon = 1e-12);

        assert!(ZoomMap::new(2, 0., "").is_err());
        assert!(ZoomMap::new(2, f64::NAN, "").is_err());
        assert!(ZoomMap::new(2, 2., "Zoom=3").is_err());
        assert_eq!(zoom.inverse().zoom(), 1. / 1.3);
    }

    #[test]
    fn shift() {
        let shift = ShiftMap::new(&[-0.5, 1.2], "").unwrap();
        let out = shift.tran_forward(array![[1., 3.]].view()).unwrap();
        assert_abs_diff_eq!(out, array![[0.5, 4.2]], epsilon = 1e-12);
        assert_eq!(shift.inverse().shift(), &[0.5, -1.2]);
        assert!(ShiftMap::<f64>::new(&[], "").is_err());
    }

    #[test]
    fn matrix() {
        let map = MatrixMap::new(dmatrix![0., -2.; 1., 0.], "").unwrap();
        assert!(map.has_inverse());
        let out = map.transform_point(&[1., 2.], Direction::Forward).unwrap();
        assert_abs_diff_eq!(out.as_slice(), [-4., 1.].as_slice(), epsilon = 1e-12);
        let back = map.transform_point(&out, Direction::Inverse).unwrap();
        assert_abs_diff_eq!(back.as_slice(), [1., 2.].as_slice(), epsilon = 1e-12);
    }

    #[test]
    fn matrix_not_square() {
        let map = MatrixMap::from_array(&array![[1., 0., 2.], [0., 1., 3.]], "").unwrap();
        assert_eq!((map.n_in(), map.n_out()), (3, 2));
        assert!(!map.has_inverse());
        assert!(map.inverse().is_none());
        assert_eq!(
            map.transform_point(&[1., 1., 1.], Direction::Forward).unwrap(),
            vec![3., 4.]
        );
        assert!(matches!(
            map.transform_point(&[1., 1.], Direction::Inverse),
            Err(MappingError::NotInvertible("MatrixMap"))
        ));
    }

    #[test]
    fn singular_matrix() {
        let map = MatrixMap::new(dmatrix![1., 2.; 2., 4.], "").unwrap();
        assert!(!map.has_inverse());
    }
}
