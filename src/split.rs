//! Splitting a mapping into the part that transforms a subset of its inputs.

use itertools::Itertools;
use log::debug;

use crate::basic::{MatrixMap, ShiftMap, UnitMap, ZoomMap};
use crate::compound::{ParallelMap, SeriesMap};
use crate::error::{MappingError, Result};
use crate::mapping::{Map, Mapping};
use crate::ndarray_utils::to_dmatrix;
use crate::Float;

/// The part of a mapping that transforms a subset of its inputs into a subset of its outputs,
/// independently of all other inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct MapSplit<F: Float> {
    /// Mapping from the selected inputs to the selected outputs.
    pub split_map: Map<F>,
    /// Indices of the original inputs feeding `split_map`, in its input order.
    pub orig_in: Vec<usize>,
    /// Indices of the original outputs produced by `split_map`, in its output order.
    pub orig_out: Vec<usize>,
}

impl<F: Float> MapSplit<F> {
    /// Split `map` on the inputs `inputs` (zero-based).
    ///
    /// Returns `Ok(None)` if the selected inputs cannot be separated from the others,
    /// and fails if an input is out of range or selected twice.
    ///
    /// # Example
    /// ```
    /// # use astmap::{LutMap, Map, MapSplit, ZoomMap};
    /// let lut: Map<f64> = LutMap::new(&[0., 1., 4.], 0., 1., "").unwrap().into();
    /// let zoom: Map<f64> = ZoomMap::new(2, 2., "").unwrap().into();
    /// let split = MapSplit::new(&lut.beside(zoom), &[2]).unwrap().unwrap();
    /// assert_eq!(split.orig_out, vec![2]);
    /// ```
    pub fn new(map: &Map<F>, inputs: &[usize]) -> Result<Option<Self>> {
        if inputs.is_empty() {
            return Err(MappingError::invalid("no inputs selected for splitting"));
        }
        if let Some(&input) = inputs.iter().find(|&&i| i >= map.n_in()) {
            return Err(MappingError::invalid(format!(
                "input {input} out of range for {} with {} inputs",
                map.class_name(),
                map.n_in()
            )));
        }
        if !inputs.iter().all_unique() {
            return Err(MappingError::invalid(format!(
                "inputs {inputs:?} contain duplicates"
            )));
        }

        let split = split(map, inputs).map(|(split_map, orig_out)| Self {
            split_map,
            orig_in: inputs.to_vec(),
            orig_out,
        });
        debug!(
            "Split of {} on inputs {:?}: {:?}.",
            map.class_name(),
            inputs,
            split.as_ref().map(|s| &s.orig_out)
        );
        Ok(split)
    }
}

/// Find the sub-mapping of `map` fed by `inputs` and the outputs it produces.
fn split<F: Float>(map: &Map<F>, inputs: &[usize]) -> Option<(Map<F>, Vec<usize>)> {
    if inputs.iter().copied().eq(0..map.n_in()) {
        return Some((map.clone(), (0..map.n_out()).collect()));
    }

    let n = inputs.len();
    let split_map: Map<F> = match map {
        Map::Unit(_) => UnitMap::new(n, "").ok()?.into(),
        Map::Zoom(zoom) => zoom.with_axes(n).into(),
        Map::Shift(shift) => shift
            .with_shift(inputs.iter().map(|&i| shift.shift()[i]).collect())
            .into(),
        Map::Matrix(matrix) => return split_matrix(matrix, inputs),
        Map::Parallel(parallel) => return split_parallel(parallel, inputs),
        Map::Series(series) => return split_series(series, inputs),
        Map::Inverted(inner) => match &**inner {
            Map::Unit(_) | Map::Zoom(_) | Map::Shift(_) => {
                let (split_map, outputs) = split(inner, inputs)?;
                return Some((split_map.inverse(), outputs));
            }
            _ => return None,
        },
        Map::Lut(_) | Map::UnitNorm(_) | Map::Rate(_) => return None,
    };
    // per-axis mappings: every input feeds the output with the same index
    Some((split_map, inputs.to_vec()))
}

fn split_matrix<F: Float>(matrix: &MatrixMap<F>, inputs: &[usize]) -> Option<(Map<F>, Vec<usize>)> {
    let m = matrix.matrix();
    let depends_on = |row: usize, col: usize| !m[(row, col)].is_zero();

    let outputs = (0..m.nrows())
        .filter(|&row| inputs.iter().any(|&col| depends_on(row, col)))
        .collect_vec();
    let isolated = outputs.iter().all(|&row| {
        (0..m.ncols())
            .filter(|col| !inputs.contains(col))
            .all(|col| !depends_on(row, col))
    });
    if outputs.is_empty() || !isolated {
        return None;
    }

    let sub = m.select_rows(&outputs).select_columns(inputs);
    let split_map = MatrixMap::new(sub, "").ok()?;
    Some((split_map.into(), outputs))
}

fn split_parallel<F: Float>(
    parallel: &ParallelMap<F>,
    inputs: &[usize],
) -> Option<(Map<F>, Vec<usize>)> {
    let (first, second) = (parallel.first(), parallel.second());
    let boundary = first.n_in();
    let leading = inputs.iter().take_while(|&&i| i < boundary).count();
    let (first_inputs, second_inputs) = inputs.split_at(leading);
    // inputs of the first mapping have to precede those of the second
    if second_inputs.iter().any(|&i| i < boundary) {
        return None;
    }
    let second_inputs = second_inputs.iter().map(|&i| i - boundary).collect_vec();

    let first_split = match first_inputs {
        [] => None,
        _ => Some(split(first, first_inputs)?),
    };
    let second_split = match second_inputs.as_slice() {
        [] => None,
        _ => Some(split(second, &second_inputs)?),
    };

    let offset = first.n_out();
    match (first_split, second_split) {
        (Some(split), None) => Some(split),
        (None, Some((map, outputs))) => {
            Some((map, outputs.into_iter().map(|o| o + offset).collect()))
        }
        (Some((first_map, mut outputs)), Some((second_map, second_outputs))) => {
            outputs.extend(second_outputs.into_iter().map(|o| o + offset));
            Some((first_map.beside(second_map), outputs))
        }
        (None, None) => None,
    }
}

fn split_series<F: Float>(
    series: &SeriesMap<F>,
    inputs: &[usize],
) -> Option<(Map<F>, Vec<usize>)> {
    let (first_map, intermediate) = split(series.first(), inputs)?;
    let (second_map, outputs) = split(series.second(), &intermediate)?;
    let map = first_map.then(second_map).ok()?;
    Some((map, outputs))
}
