//! 1-dimensional lookup table mapping.

use std::fmt;

use itertools::Itertools;
use log::{debug, warn};

use crate::attributes::{Attributes, assignments};
use crate::error::{MappingError, Result};
use crate::mapping::{Direction, Mapping, check_point};
use crate::Float;

/// Interpolation method between table entries (the `LutInterp` attribute).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Linear interpolation between the two nearest entries, linear extrapolation outside the table.
    #[default]
    Linear,
    /// Value of the nearest entry; the boundary entries are used outside the table.
    Nearest,
}

impl Interpolation {
    /// Numeric code of the method: `0` for linear, `1` for nearest neighbour.
    pub fn code(self) -> i32 {
        match self {
            Self::Linear => 0,
            Self::Nearest => 1,
        }
    }
}

impl TryFrom<i32> for Interpolation {
    type Error = MappingError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Linear),
            1 => Ok(Self::Nearest),
            _ => Err(MappingError::invalid(format!(
                "LutInterp must be 0 (linear) or 1 (nearest), got {code}"
            ))),
        }
    }
}

/// Direction in which the table entries run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Monotonicity {
    /// Strictly increasing.
    Increasing,
    /// Strictly decreasing.
    Decreasing,
    /// Neither; equal neighbours, a change of direction or a non-finite entry anywhere
    /// disqualify the table.
    None,
}

impl Monotonicity {
    fn of<F: Float>(table: &[F]) -> Self {
        let all = |cmp: fn(&F, &F) -> bool| table.iter().tuple_windows().all(|(a, b)| cmp(a, b));

        if table.iter().any(|v| !v.is_finite()) {
            Self::None
        } else if all(|a, b| a < b) {
            Self::Increasing
        } else if all(|a, b| a > b) {
            Self::Decreasing
        } else {
            Self::None
        }
    }
}

/// Transforms 1-dimensional coordinates by linear interpolation in a lookup table.
///
/// Each input coordinate is scaled to a (fractional) table index by subtracting `start`, the input
/// coordinate of the first entry, and dividing by `increment`, the spacing between entries.
/// The output is interpolated linearly between the two neighbouring entries.
/// Outside the table, the two entries at the start or the end are extrapolated linearly.
///
/// If the table entries increase or decrease strictly monotonically, the inverse transformation
/// is available as well; otherwise [`apply_inverse`](LutMap::apply_inverse()) fails.
///
/// # Example
/// ```
/// # use astmap::LutMap;
/// let lut = LutMap::new(&[0., 1., 2.], 0., 1., "").unwrap();
/// assert_eq!(lut.apply(-1.), -1.);
/// assert_eq!(lut.apply(3.), 3.);
///
/// let bumpy = LutMap::new(&[1., 3., 2.], 0., 1., "").unwrap();
/// assert!(bumpy.apply_inverse(2.5).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LutMap<F: Float> {
    table: Vec<F>,
    start: F,
    increment: F,
    epsilon: F,
    interpolation: Interpolation,
    monotonicity: Monotonicity,
    attributes: Attributes,
}

impl<F: Float> LutMap<F> {
    /// Construct a lookup table mapping.
    ///
    /// # Arguments
    /// - `table`: The lookup table. At least two entries, copied into the mapping.
    /// - `start`: Input coordinate corresponding to the first table entry.
    /// - `increment`: Spacing in input coordinate between successive entries.
    ///     May be positive or negative, but not zero.
    /// - `options`: Comma-separated attribute assignments. Known attributes are
    ///     `LutEpsilon`, `LutInterp`, `Ident` and `ID`.
    pub fn new(table: &[F], start: F, increment: F, options: &str) -> Result<Self> {
        if table.len() < 2 {
            return Err(MappingError::invalid(format!(
                "lookup table needs at least 2 entries, got {}",
                table.len()
            )));
        }
        if !start.is_finite() {
            return Err(MappingError::invalid(format!("start {start} is not finite")));
        }
        if increment.is_zero() || !increment.is_finite() {
            return Err(MappingError::invalid(format!(
                "increment must be finite and non-zero, got {increment}"
            )));
        }

        let mut lut = Self {
            table: table.to_vec(),
            start,
            increment,
            epsilon: F::default_epsilon(),
            interpolation: Interpolation::Linear,
            monotonicity: Monotonicity::of(table),
            attributes: Attributes::default(),
        };

        for assignment in assignments(options)? {
            if assignment.is("LutEpsilon") {
                let epsilon = F::from_f64(assignment.parse()?)
                    .ok_or_else(|| MappingError::invalid("LutEpsilon out of range"))?;
                lut = lut.with_epsilon(epsilon)?;
            } else if assignment.is("LutInterp") {
                lut.interpolation = Interpolation::try_from(assignment.parse::<i32>()?)?;
            } else if !lut.attributes.set(&assignment) {
                return Err(assignment.unknown("LutMap"));
            }
        }

        debug!(
            "Constructed LutMap with {} entries, {:?}.",
            lut.table.len(),
            lut.monotonicity
        );
        if lut.monotonicity == Monotonicity::None {
            warn!("LutMap table is not monotonic, the inverse transformation is unavailable.");
        }

        Ok(lut)
    }

    /// Set the relative error of the table values.
    pub fn with_epsilon(mut self, epsilon: F) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < F::zero() {
            return Err(MappingError::invalid(format!(
                "LutEpsilon must be finite and non-negative, got {epsilon}"
            )));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    /// Set the interpolation method.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Set the identification string.
    pub fn with_ident(mut self, ident: impl Into<String>) -> Self {
        self.attributes.set_ident(ident);
        self
    }

    /// Set the identification string of this object, which copies do not inherit.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.attributes.set_id(id);
        self
    }

    /// The relative error of the values in the table (`LutEpsilon`).
    pub fn epsilon(&self) -> F {
        self.epsilon
    }

    /// The interpolation method used between table entries (`LutInterp`).
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// The lookup table.
    pub fn table(&self) -> &[F] {
        &self.table
    }

    /// Input coordinate of the first table entry.
    pub fn start(&self) -> F {
        self.start
    }

    /// Spacing in input coordinate between table entries.
    pub fn increment(&self) -> F {
        self.increment
    }

    /// Direction of the table entries.
    pub fn monotonicity(&self) -> Monotonicity {
        self.monotonicity
    }

    /// Whether the inverse transformation is available.
    pub fn is_monotonic(&self) -> bool {
        self.monotonicity != Monotonicity::None
    }

    /// Identification string.
    pub fn ident(&self) -> &str {
        self.attributes.ident()
    }

    /// Identification string of this object; not carried over to copies.
    pub fn id(&self) -> &str {
        self.attributes.id()
    }

    fn last(&self) -> usize {
        self.table.len() - 1
    }

    fn index_to_coord(&self, index: F) -> F {
        self.start + index * self.increment
    }

    /// Transform an input coordinate.
    pub fn apply(&self, x: F) -> F {
        let index = (x - self.start) / self.increment;
        if is_nan(index) {
            return index;
        }

        match self.interpolation {
            Interpolation::Linear => {
                let segment = clamp_index(index.floor(), self.last() - 1);
                let low = self.table[segment];
                let high = self.table[segment + 1];
                low + (index - as_float::<F>(segment)) * (high - low)
            }
            Interpolation::Nearest => self.table[clamp_index(index.round(), self.last())],
        }
    }

    /// Transform an output coordinate back to the input coordinate.
    ///
    /// Fails with [`MappingError::NotInvertible`] if the table is not monotonic.
    pub fn apply_inverse(&self, y: F) -> Result<F> {
        if !self.is_monotonic() {
            return Err(MappingError::NotInvertible("LutMap"));
        }
        if is_nan(y) {
            return Ok(y);
        }

        // number of entries on the near side of `y` in table order
        let below = match self.monotonicity {
            Monotonicity::Increasing => self.table.partition_point(|&v| v <= y),
            _ => self.table.partition_point(|&v| v >= y),
        };

        let index = match self.interpolation {
            Interpolation::Linear => {
                let segment = below.clamp(1, self.last()) - 1;
                let low = self.table[segment];
                let high = self.table[segment + 1];
                as_float::<F>(segment) + (y - low) / (high - low)
            }
            Interpolation::Nearest => {
                let nearest = if below == 0 {
                    0
                } else if below > self.last() {
                    self.last()
                } else if (y - self.table[below - 1]).abs() <= (self.table[below] - y).abs() {
                    below - 1
                } else {
                    below
                };
                as_float(nearest)
            }
        };

        Ok(self.index_to_coord(index))
    }
}

impl<F: Float> Mapping<F> for LutMap<F> {
    fn class_name(&self) -> &'static str {
        "LutMap"
    }

    fn n_in(&self) -> usize {
        1
    }

    fn n_out(&self) -> usize {
        1
    }

    fn has_forward(&self) -> bool {
        true
    }

    fn has_inverse(&self) -> bool {
        self.is_monotonic()
    }

    fn transform_point(&self, point: &[F], direction: Direction) -> Result<Vec<F>> {
        check_point(point, 1)?;
        match direction {
            Direction::Forward => Ok(vec![self.apply(point[0])]),
            Direction::Inverse => Ok(vec![self.apply_inverse(point[0])?]),
        }
    }
}

impl<F: Float> fmt::Display for LutMap<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LutMap(n={}, start={}, increment={}, interp={})",
            self.table.len(),
            self.start,
            self.increment,
            self.interpolation.code()
        )
    }
}

/// Clamp a whole-numbered float index to `[0, max]`.
fn clamp_index<F: Float>(index: F, max: usize) -> usize {
    if index <= F::zero() {
        0
    } else {
        // saturating float-to-int conversion keeps huge indices in range
        let index = nalgebra::try_convert::<F, f64>(index).unwrap_or(f64::MAX) as usize;
        index.min(max)
    }
}

fn is_nan<F: Float>(x: F) -> bool {
    x.partial_cmp(&x).is_none()
}

fn as_float<F: Float>(index: usize) -> F {
    nalgebra::convert(index as f64)
}
