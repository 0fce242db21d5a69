//! Compound mappings built from two component mappings.

use log::debug;

use crate::attributes::Attributes;
use crate::error::{MappingError, Result};
use crate::mapping::{Direction, Map, Mapping, check_point};
use crate::Float;

/// Applies one mapping after the other.
///
/// The outputs of the first mapping are the inputs of the second.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesMap<F: Float> {
    first: Box<Map<F>>,
    second: Box<Map<F>>,
    attributes: Attributes,
}

impl<F: Float> SeriesMap<F> {
    /// Create a series mapping applying `first`, then `second`.
    ///
    /// Fails if `first.n_out()` differs from `second.n_in()`.
    pub fn new(first: Map<F>, second: Map<F>, options: &str) -> Result<Self> {
        if first.n_out() != second.n_in() {
            return Err(MappingError::DimensionMismatch {
                expected: first.n_out(),
                found: second.n_in(),
            });
        }
        debug!(
            "Constructed SeriesMap of {} and {}.",
            first.class_name(),
            second.class_name()
        );
        Ok(Self {
            first: Box::new(first),
            second: Box::new(second),
            attributes: Attributes::from_options("SeriesMap", options)?,
        })
    }

    /// Join two mappings whose dimensions are known to match.
    pub(crate) fn join_map(first: Map<F>, second: Map<F>) -> Map<F> {
        Map::Series(Self {
            first: Box::new(first),
            second: Box::new(second),
            attributes: Attributes::default(),
        })
    }

    /// The mapping applied first.
    pub fn first(&self) -> &Map<F> {
        &self.first
    }

    /// The mapping applied second.
    pub fn second(&self) -> &Map<F> {
        &self.second
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
            first: Box::new(self.second.inverse()),
            second: Box::new(self.first.inverse()),
            attributes: self.attributes.clone(),
        }
    }
}

impl<F: Float> Mapping<F> for SeriesMap<F> {
    fn class_name(&self) -> &'static str {
        "SeriesMap"
    }

    fn n_in(&self) -> usize {
        self.first.n_in()
    }

    fn n_out(&self) -> usize {
        self.second.n_out()
    }

    fn has_forward(&self) -> bool {
        self.first.has_forward() && self.second.has_forward()
    }

    fn has_inverse(&self) -> bool {
        self.first.has_inverse() && self.second.has_inverse()
    }

    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>> {
        match direction {
            Direction::Forward => {
                let intermediate = self.first.transform_point(point, direction)?;
                self.second.transform_point(&intermediate, direction)
            }
            Direction::Inverse => {
                let intermediate = self.second.transform_point(point, direction)?;
                self.first.transform_point(&intermediate, direction)
            }
        }
    }
}

/// Applies two mappings side by side.
///
/// The leading coordinates are transformed by the first mapping,
/// the trailing coordinates by the second.
#[derive(Clone, Debug, PartialEq)]
pub struct ParallelMap<F: Float> {
    first: Box<Map<F>>,
    second: Box<Map<F>>,
    attributes: Attributes,
}

impl<F: Float> ParallelMap<F> {
    /// Create a parallel mapping of `first` and `second`.
    pub fn new(first: Map<F>, second: Map<F>, options: &str) -> Result<Self> {
        let attributes = Attributes::from_options("ParallelMap", options)?;
        Ok(Self {
            attributes,
            ..Self::join(first, second)
        })
    }

    pub(crate) fn join(first: Map<F>, second: Map<F>) -> Self {
        debug!(
            "Constructed ParallelMap of {} and {}.",
            first.class_name(),
            second.class_name()
        );
        Self {
            first: Box::new(first),
            second: Box::new(second),
            attributes: Attributes::default(),
        }
    }

    /// The mapping applied to the leading coordinates.
    pub fn first(&self) -> &Map<F> {
        &self.first
    }

    /// The mapping applied to the trailing coordinates.
    pub fn second(&self) -> &Map<F> {
        &self.second
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
            first: Box::new(self.first.inverse()),
            second: Box::new(self.second.inverse()),
            attributes: self.attributes.clone(),
        }
    }
}

impl<F: Float> Mapping<F> for ParallelMap<F> {
    fn class_name(&self) -> &'static str {
        "ParallelMap"
    }

    fn n_in(&self) -> usize {
        self.first.n_in() + self.second.n_in()
    }

    fn n_out(&self) -> usize {
        self.first.n_out() + self.second.n_out()
    }

    fn has_forward(&self) -> bool {
        self.first.has_forward() && self.second.has_forward()
    }

    fn has_inverse(&self) -> bool {
        self.first.has_inverse() && self.second.has_inverse()
    }

    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>> {
        let (n_in, _) = self.dims(direction);
        check_point(point, n_in)?;
        let (split, _) = self.first.dims(direction);
        let (leading, trailing) = point.split_at(split);

        let mut transformed = self.first.transform_point(leading, direction)?;
        transformed.extend(self.second.transform_point(trailing, direction)?);
        Ok(transformed)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array, s};

    use super::*;
    use crate::basic::{ShiftMap, UnitMap, ZoomMap};
    use crate::lut::LutMap;

    const ZOOM: f64 = 1.3;

    fn zoom() -> Map<f64> {
        ZoomMap::new(2, ZOOM, "").unwrap().into()
    }

    fn shift() -> Map<f64> {
        ShiftMap::new(&[-0.5, 1.2], "").unwrap().into()
    }

    fn check_round_trip(map: &Map<f64>, points: &Array2<f64>) {
        let forward = map.tran_forward(points.view()).unwrap();
        let back = map.tran_inverse(forward.view()).unwrap();
        assert_abs_diff_eq!(&back, points, epsilon = 1e-8);

        let back = map.inverse().tran_forward(forward.view()).unwrap();
        assert_abs_diff_eq!(&back, points, epsilon = 1e-8);

        let identity = map.inverse().of(map.clone()).unwrap();
        assert_abs_diff_eq!(&identity.tran_forward(points.view()).unwrap(), points, epsilon = 1e-8);
    }

    #[test]
    fn series() {
        let series = SeriesMap::new(shift(), zoom(), "Ident=series").unwrap();
        assert_eq!((series.n_in(), series.n_out()), (2, 2));
        assert_eq!(series.ident(), "series");

        let points = array![[1., 3.], [2., 99.9], [-6., -5.1], [30., 21.], [0.2, 0.]];
        let expected = (&points + &array![-0.5, 1.2]) * ZOOM;
        let out = series.tran_forward(points.view()).unwrap();
        assert_abs_diff_eq!(out, expected, epsilon = 1e-10);

        let map: Map<f64> = series.into();
        check_round_trip(&map, &points);

        let via_of = zoom().of(shift()).unwrap();
        assert_eq!(via_of, shift().then(zoom()).unwrap());
    }

    #[test]
    fn series_dimension_mismatch() {
        let unit: Map<f64> = UnitMap::new(3, "").unwrap().into();
        assert!(matches!(
            SeriesMap::new(zoom(), unit, ""),
            Err(MappingError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn parallel() {
        let parallel = ParallelMap::new(shift(), zoom(), "").unwrap();
        assert_eq!((parallel.n_in(), parallel.n_out()), (4, 4));

        let points = array![
            [-3., 2.2, -5.6, 0.32],
            [1., 3., 2., 99.9],
            [-6., -5.1, 30., 21.]
        ];
        let mut expected = points.clone();
        expected
            .slice_mut(s![.., 0..2])
            .zip_mut_with(&array![-0.5, 1.2], |p, s| *p += s);
        expected.slice_mut(s![.., 2..4]).mapv_inplace(|p| p * ZOOM);

        let out = parallel.tran_forward(points.view()).unwrap();
        assert_abs_diff_eq!(out, expected, epsilon = 1e-10);

        check_round_trip(&parallel.into(), &points);
    }

    #[test]
    fn parallel_uneven() {
        let lut: Map<f64> = LutMap::new(&[0., 2., 4.], 0., 1., "").unwrap().into();
        let map = lut.beside(zoom());
        assert_eq!((map.n_in(), map.n_out()), (3, 3));
        let out = map
            .transform_point(&[1.5, 1., 2.], Direction::Forward)
            .unwrap();
        assert_abs_diff_eq!(out.as_slice(), [3., ZOOM, 2. * ZOOM].as_slice(), epsilon = 1e-12);
        assert!(matches!(
            map.transform_point(&[1.5, 1.], Direction::Forward),
            Err(MappingError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn partially_invertible() {
        let bumpy: Map<f64> = LutMap::new(&[0., 2., 1.], 0., 1., "").unwrap().into();
        let series = bumpy.clone().then(bumpy.clone()).unwrap();
        assert!(series.has_forward());
        assert!(!series.has_inverse());
        let parallel = bumpy.beside(zoom());
        assert!(!parallel.has_inverse());
        assert!(parallel.tran_inverse(array![[1., 1., 1.]].view()).is_err());
    }
}
