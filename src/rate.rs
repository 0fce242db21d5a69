//! Rate of change of a mapping output with respect to one of its inputs.

use crate::attributes::Attributes;
use crate::error::{MappingError, Result};
use crate::mapping::{Direction, Map, Mapping, check_point};
use crate::Float;

/// Evaluates the rate of change `∂y[ax1] / ∂x[ax2]` of the forward transformation of a wrapped
/// mapping.
///
/// The result has the same number of inputs as the wrapped mapping and a single output.
/// There is no inverse transformation. Axes are counted from zero.
///
/// The derivative is estimated with a central difference whose step scales with the magnitude
/// of the input coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct RateMap<F: Float> {
    map: Box<Map<F>>,
    ax1: usize,
    ax2: usize,
    attributes: Attributes,
}

impl<F: Float> RateMap<F> {
    /// Create a rate mapping of output `ax1` with respect to input `ax2` of `map`.
    pub fn new(map: Map<F>, ax1: usize, ax2: usize, options: &str) -> Result<Self> {
        if ax1 >= map.n_out() {
            return Err(MappingError::invalid(format!(
                "output axis {ax1} out of range for {} with {} outputs",
                map.class_name(),
                map.n_out()
            )));
        }
        if ax2 >= map.n_in() {
            return Err(MappingError::invalid(format!(
                "input axis {ax2} out of range for {} with {} inputs",
                map.class_name(),
                map.n_in()
            )));
        }
        if !map.has_forward() {
            return Err(MappingError::NoForward(map.class_name()));
        }

        Ok(Self {
            map: Box::new(map),
            ax1,
            ax2,
            attributes: Attributes::from_options("RateMap", options)?,
        })
    }

    /// The wrapped mapping.
    pub fn map(&self) -> &Map<F> {
        &self.map
    }

    /// Output axis being differentiated.
    pub fn ax1(&self) -> usize {
        self.ax1
    }

    /// Input axis the derivative is taken with respect to.
    pub fn ax2(&self) -> usize {
        self.ax2
    }

    /// Identification string.
    pub fn ident(&self) -> &str {
        self.attributes.ident()
    }

    /// Identification string of this object; not carried over to copies.
    pub fn id(&self) -> &str {
        self.attributes.id()
    }

    fn rate(&self, point: &[F]) -> Result<F> {
        let x = point[self.ax2];
        let step = F::default_epsilon().cbrt() * x.abs().max(F::one());

        let mut ahead = point.to_vec();
        ahead[self.ax2] = x + step;
        let mut behind = point.to_vec();
        behind[self.ax2] = x - step;

        let y_ahead = self.map.transform_point(&ahead, Direction::Forward)?[self.ax1];
        let y_behind = self.map.transform_point(&behind, Direction::Forward)?[self.ax1];
        // divide by the step actually taken after rounding
        Ok((y_ahead - y_behind) / (ahead[self.ax2] - behind[self.ax2]))
    }
}

impl<F: Float> Mapping<F> for RateMap<F> {
    fn class_name(&self) -> &'static str {
        "RateMap"
    }

    fn n_in(&self) -> usize {
        self.map.n_in()
    }

    fn n_out(&self) -> usize {
        1
    }

    fn has_forward(&self) -> bool {
        true
    }

    fn has_inverse(&self) -> bool {
        false
    }

    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>> {
        self.check_direction(direction)?;
        check_point(point, self.map.n_in())?;
        Ok(vec![self.rate(point)?])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::dmatrix;
    use ndarray::array;

    use super::*;
    use crate::basic::{MatrixMap, ZoomMap};
    use crate::lut::LutMap;

    #[test]
    fn zoom_rate() {
        let zoom: Map<f64> = ZoomMap::new(2, 3., "").unwrap().into();
        let diagonal = RateMap::new(zoom.clone(), 0, 0, "").unwrap();
        let off_diagonal = RateMap::new(zoom, 0, 1, "").unwrap();

        let points = array![[1., 2.], [-40., 0.5], [0., 0.]];
        let out = diagonal.tran_forward(points.view()).unwrap();
        assert_abs_diff_eq!(out, array![[3.], [3.], [3.]], epsilon = 1e-8);
        let out = off_diagonal.tran_forward(points.view()).unwrap();
        assert_abs_diff_eq!(out, array![[0.], [0.], [0.]], epsilon = 1e-8);
    }

    #[test]
    fn matrix_rate() {
        let matrix: Map<f64> = MatrixMap::new(dmatrix![1., 2.; 3., 4.], "").unwrap().into();
        let rate = RateMap::new(matrix, 1, 0, "").unwrap();
        let out = rate.transform_point(&[10., -3.], Direction::Forward).unwrap();
        assert_abs_diff_eq!(out[0], 3., epsilon = 1e-7);
    }

    #[test]
    fn lut_rate() {
        let lut: Map<f64> = LutMap::new(&[0., 2., 8.], 0., 1., "").unwrap().into();
        let rate = RateMap::new(lut, 0, 0, "").unwrap();
        let out = rate.tran_forward(array![[0.5], [1.5], [-3.]].view()).unwrap();
        assert_abs_diff_eq!(out, array![[2.], [6.], [2.]], epsilon = 1e-7);
    }

    #[test]
    fn no_inverse() {
        let zoom: Map<f64> = ZoomMap::new(1, 3., "").unwrap().into();
        let rate = RateMap::new(zoom, 0, 0, "").unwrap();
        assert!(!rate.has_inverse());
        assert!(matches!(
            rate.tran_inverse(array![[1.]].view()),
            Err(MappingError::NotInvertible("RateMap"))
        ));
    }

    #[test]
    fn invalid_axes() {
        let zoom: Map<f64> = ZoomMap::new(2, 3., "").unwrap().into();
        assert!(RateMap::new(zoom.clone(), 2, 0, "").is_err());
        assert!(RateMap::new(zoom.clone(), 0, 2, "").is_err());

        let bumpy: Map<f64> = LutMap::new(&[0., 2., 1.], 0., 1., "").unwrap().into();
        assert!(matches!(
            RateMap::new(bumpy.inverse(), 0, 0, ""),
            Err(MappingError::NoForward("LutMap"))
        ));
    }
}
