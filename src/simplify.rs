//! Simplification of compound mappings.

use approx::{abs_diff_eq, relative_eq};
use nalgebra::DMatrix;

use crate::basic::{MatrixMap, ShiftMap, UnitMap, ZoomMap};
use crate::compound::{ParallelMap, SeriesMap};
use crate::lut::Interpolation;
use crate::mapping::{Map, Mapping};
use crate::Float;

/// Result of combining two neighbouring mappings of a series.
enum Merged<F: Float> {
    /// The two mappings are inverses of each other.
    Cancelled,
    /// The two mappings were replaced by one.
    Into(Map<F>),
    /// Nothing to combine.
    Kept,
}

pub(crate) fn simplify<F: Float>(map: &Map<F>) -> Map<F> {
    match map {
        Map::Series(_) => simplify_series(map),
        Map::Parallel(parallel) => simplify_parallel(parallel),
        Map::Inverted(inner) => simplify(inner).inverse(),
        Map::Zoom(zoom) if relative_eq!(zoom.zoom(), F::one()) => unit(map.n_in()),
        Map::Shift(shift) if shift.shift().iter().all(|s| s.is_zero()) => unit(map.n_in()),
        Map::Matrix(matrix) if is_identity(matrix.matrix()) => unit(map.n_in()),
        _ => map.clone(),
    }
}

fn unit<F: Float>(n: usize) -> Map<F> {
    match UnitMap::new(n, "") {
        Ok(unit) => unit.into(),
        Err(_) => unreachable!("mappings have at least one axis"),
    }
}

fn is_identity<F: Float>(matrix: &DMatrix<F>) -> bool {
    matrix.is_square()
        && abs_diff_eq!(
            *matrix,
            DMatrix::identity(matrix.nrows(), matrix.ncols()),
            epsilon = F::default_epsilon() * nalgebra::convert(1e3)
        )
}

/// Flatten nested series mappings into their simplified components, in order.
fn flatten<F: Float>(map: &Map<F>, parts: &mut Vec<Map<F>>) {
    match map {
        Map::Series(series) => {
            flatten(series.first(), parts);
            flatten(series.second(), parts);
        }
        _ => match simplify(map) {
            series @ Map::Series(_) => flatten(&series, parts),
            simplified => parts.push(simplified),
        },
    }
}

fn simplify_series<F: Float>(map: &Map<F>) -> Map<F> {
    let mut parts = Vec::new();
    flatten(map, &mut parts);

    let mut stack: Vec<Map<F>> = Vec::with_capacity(parts.len());
    for part in parts {
        let mut next = Some(part);
        while let Some(current) = next.take() {
            if matches!(current, Map::Unit(_)) {
                break;
            }
            let Some(previous) = stack.pop() else {
                stack.push(current);
                break;
            };
            match merge(&previous, &current) {
                Merged::Cancelled => {}
                Merged::Into(merged) => next = Some(merged),
                Merged::Kept => {
                    stack.push(previous);
                    stack.push(current);
                }
            }
        }
    }

    stack
        .into_iter()
        .reduce(SeriesMap::join_map)
        .unwrap_or_else(|| unit(map.n_in()))
}

fn simplify_parallel<F: Float>(parallel: &ParallelMap<F>) -> Map<F> {
    let first = simplify(parallel.first());
    let second = simplify(parallel.second());
    match (&first, &second) {
        (Map::Unit(_), Map::Unit(_)) => unit(first.n_in() + second.n_in()),
        _ => first.beside(second),
    }
}

/// Whether applying `map` forward and then inverse returns every input unchanged.
fn forward_round_trips<F: Float>(map: &Map<F>) -> bool {
    match map {
        Map::Lut(lut) => lut.interpolation() == Interpolation::Linear,
        Map::Rate(_) => false,
        Map::Series(series) => {
            forward_round_trips(series.first()) && forward_round_trips(series.second())
        }
        Map::Parallel(parallel) => {
            forward_round_trips(parallel.first()) && forward_round_trips(parallel.second())
        }
        Map::Inverted(inner) => inverse_round_trips(inner),
        Map::Unit(_) | Map::Zoom(_) | Map::Shift(_) | Map::Matrix(_) | Map::UnitNorm(_) => true,
    }
}

/// Whether applying `map` inverse and then forward returns every output unchanged.
fn inverse_round_trips<F: Float>(map: &Map<F>) -> bool {
    match map {
        // only unit vectors come back unchanged
        Map::UnitNorm(_) => false,
        Map::Series(series) => {
            inverse_round_trips(series.first()) && inverse_round_trips(series.second())
        }
        Map::Parallel(parallel) => {
            inverse_round_trips(parallel.first()) && inverse_round_trips(parallel.second())
        }
        Map::Inverted(inner) => forward_round_trips(inner),
        _ => forward_round_trips(map),
    }
}

fn merge<F: Float>(previous: &Map<F>, current: &Map<F>) -> Merged<F> {
    if previous.has_forward()
        && previous.has_inverse()
        && forward_round_trips(previous)
        && *current == previous.inverse()
    {
        return Merged::Cancelled;
    }

    match (previous, current) {
        (Map::Zoom(a), Map::Zoom(b)) if a.n_in() == b.n_in() => {
            merged(ZoomMap::new(a.n_in(), a.zoom() * b.zoom(), ""))
        }
        (Map::Shift(a), Map::Shift(b)) => {
            let shift: Vec<F> = a.shift().iter().zip(b.shift()).map(|(&x, &y)| x + y).collect();
            merged(ShiftMap::new(&shift, ""))
        }
        // a product of two non-square matrices may be invertible where the pair is not
        (Map::Matrix(a), Map::Matrix(b)) if a.matrix().is_square() || b.matrix().is_square() => {
            merged(MatrixMap::new(b.matrix() * a.matrix(), ""))
        }
        (Map::Parallel(a), Map::Parallel(b)) if a.first().n_out() == b.first().n_in() => {
            let first = SeriesMap::join_map(a.first().clone(), b.first().clone());
            let second = SeriesMap::join_map(a.second().clone(), b.second().clone());
            Merged::Into(simplify_parallel(&ParallelMap::join(
                simplify(&first),
                simplify(&second),
            )))
        }
        _ => Merged::Kept,
    }
}

/// Wrap a freshly combined mapping, reducing it to a unit mapping where possible.
fn merged<F: Float, M: Into<Map<F>>>(map: crate::Result<M>) -> Merged<F> {
    match map {
        Ok(map) => Merged::Into(simplify(&map.into())),
        Err(_) => Merged::Kept,
    }
}
