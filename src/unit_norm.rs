//! Conversion of vectors to a unit vector and a norm.

use nalgebra::DVector;

use crate::attributes::Attributes;
use crate::error::{MappingError, Result};
use crate::mapping::{Direction, Mapping, check_point};
use crate::Float;

/// Converts an `n`-dimensional point into a unit vector relative to a centre, plus its norm.
///
/// The forward transformation maps `x` to `((x - c) / r, r)` with `r = |x - c|`, so there
/// are `n` inputs and `n + 1` outputs. If `x` equals the centre, the unit vector is zero.
/// The inverse transformation maps `(u, r)` to `c + r u`.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitNormMap<F: Float> {
    centre: DVector<F>,
    attributes: Attributes,
}

impl<F: Float> UnitNormMap<F> {
    /// Create a unit normalisation mapping around `centre`.
    pub fn new(centre: &[F], options: &str) -> Result<Self> {
        if centre.is_empty() {
            return Err(MappingError::invalid("UnitNormMap needs at least one axis"));
        }
        if centre.iter().any(|c| !c.is_finite()) {
            return Err(MappingError::invalid("centre must be finite"));
        }
        Ok(Self {
            centre: DVector::from_column_slice(centre),
            attributes: Attributes::from_options("UnitNormMap", options)?,
        })
    }

    /// The centre.
    pub fn centre(&self) -> &[F] {
        self.centre.as_slice()
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

impl<F: Float> Mapping<F> for UnitNormMap<F> {
    fn class_name(&self) -> &'static str {
        "UnitNormMap"
    }

    fn n_in(&self) -> usize {
        self.centre.len()
    }

    fn n_out(&self) -> usize {
        self.centre.len() + 1
    }

    fn has_forward(&self) -> bool {
        true
    }

    fn has_inverse(&self) -> bool {
        true
    }

    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>> {
        let n = self.centre.len();
        match direction {
            Direction::Forward => {
                check_point(point, n)?;
                let offset = DVector::from_column_slice(point) - &self.centre;
                let norm = offset.norm();
                let unit = if norm.is_zero() {
                    offset
                } else {
                    offset / norm
                };
                let mut transformed = unit.as_slice().to_vec();
                transformed.push(norm);
                Ok(transformed)
            }
            Direction::Inverse => {
                check_point(point, n + 1)?;
                let unit = DVector::from_column_slice(&point[..n]);
                Ok((&self.centre + unit * point[n]).as_slice().to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, Axis, array};
    use ndarray_rand::{RandomExt, rand_distr::Uniform};

    use super::*;

    #[test]
    fn forward() {
        let map = UnitNormMap::new(&[1., -1.], "").unwrap();
        assert_eq!((map.n_in(), map.n_out()), (2, 3));
        let out = map.tran_forward(array![[4., 3.], [1., -1.]].view()).unwrap();
        assert_abs_diff_eq!(out, array![[0.6, 0.8, 5.], [0., 0., 0.]], epsilon = 1e-12);
    }

    #[test]
    fn round_trip() {
        let map = UnitNormMap::new(&[0.5, -2., 10.], "Ident=norm").unwrap();
        let points = Array2::random((20, 3), Uniform::new(-5., 5.));
        let out = map.tran_forward(points.view()).unwrap();

        for row in out.axis_iter(Axis(0)) {
            let unit = row.slice(ndarray::s![..3]);
            assert_abs_diff_eq!(unit.dot(&unit), 1., epsilon = 1e-10);
        }

        let back = map.tran_inverse(out.view()).unwrap();
        assert_abs_diff_eq!(back, points, epsilon = 1e-10);
    }

    #[test]
    fn invalid() {
        assert!(UnitNormMap::<f64>::new(&[], "").is_err());
        assert!(UnitNormMap::new(&[f64::INFINITY], "").is_err());
        assert!(UnitNormMap::new(&[0.], "LutEpsilon=1").is_err());
    }
}
