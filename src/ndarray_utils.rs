//! Conversions between `ndarray` point batches and `nalgebra` matrices,
//! inspired by [`nshare`](https://github.com/rust-cv/nshare).

use nalgebra::allocator::Allocator;
use nalgebra::{DMatrix, DefaultAllocator, Dim, Matrix, Scalar, Storage};
use ndarray::{Array2, ArrayView2};

use crate::error::{MappingError, Result};
use crate::Float;

/// Conversion into a 2-dimensional `ndarray` array of points, one point per row.
pub trait IntoNdarray2 {
    /// The resulting array type.
    type Out;

    /// Perform the conversion.
    fn into_ndarray2(self) -> Result<Self::Out>;
}

impl<N: Scalar> IntoNdarray2 for Array2<N> {
    type Out = Array2<N>;

    fn into_ndarray2(self) -> Result<Self::Out> {
        Ok(self)
    }
}

impl<N: Scalar, C: Dim, R: Dim, S: Storage<N, R, C>> IntoNdarray2 for Matrix<N, R, C, S>
where
    DefaultAllocator: Allocator<R, C, Buffer<N> = S>,
{
    type Out = Array2<N>;

    fn into_ndarray2(self) -> Result<Self::Out> {
        let (rows, cols) = self.shape();
        // nalgebra stores column-major, so each row is strided by one element
        let data: Vec<N> = self.iter().cloned().collect();
        Ok(Array2::from_shape_fn((rows, cols), |(r, c)| {
            data[r + c * rows].clone()
        }))
    }
}

impl<F: Float> IntoNdarray2 for Vec<Vec<F>> {
    type Out = Array2<F>;

    /// Fails with [`MappingError::DimensionMismatch`] if the rows differ in length.
    fn into_ndarray2(self) -> Result<Self::Out> {
        let rows = self.len();
        let cols = self.first().map_or(0, Vec::len);
        if let Some(row) = self.iter().find(|row| row.len() != cols) {
            return Err(MappingError::DimensionMismatch {
                expected: cols,
                found: row.len(),
            });
        }
        let flat: Vec<F> = self.into_iter().flatten().collect();
        Ok(Array2::from_shape_vec((rows, cols), flat)?)
    }
}

/// Copy an `ndarray` view into a `nalgebra` matrix of the same shape.
pub(crate) fn to_dmatrix<F: Float>(arr: ArrayView2<F>) -> DMatrix<F> {
    DMatrix::from_fn(arr.nrows(), arr.ncols(), |r, c| arr[[r, c]])
}
