use std::thread;

use approx::assert_abs_diff_eq;
use astmap::{
    Interpolation, LutMap, Map, MapSplit, Mapping, MappingError, RateMap, ShiftMap, UnitNormMap,
    ZoomMap,
};
use ndarray::{Array2, Axis, array};
use ndarray_rand::{RandomExt, rand_distr::Uniform};
use rand::Rng;
use simplelog::{Config, LevelFilter, TestLogger};

fn init_logger() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

fn random_table(len: usize, increasing: bool) -> Vec<f64> {
    let mut rng = rand::rng();
    let mut value = rng.random_range(-10.0..10.0);
    (0..len)
        .map(|_| {
            let step = rng.random_range(0.01..2.0);
            value += if increasing { step } else { -step };
            value
        })
        .collect()
}

#[test]
fn exact_at_table_nodes() {
    init_logger();
    let mut rng = rand::rng();

    for _ in 0..20 {
        let len = rng.random_range(2..50);
        let table: Vec<f64> = (0..len).map(|_| rng.random_range(-100.0..100.0)).collect();
        let start = rng.random_range(-10.0..10.0);
        let increment = rng.random_range(0.1..5.0) * if rng.random_bool(0.5) { 1. } else { -1. };
        let lut = LutMap::new(&table, start, increment, "").unwrap();

        for (k, value) in table.iter().enumerate() {
            let x = start + k as f64 * increment;
            assert_abs_diff_eq!(lut.apply(x), *value, epsilon = 1e-10 * value.abs().max(1.));
        }
    }
}

#[test]
fn inverse_round_trip() {
    init_logger();
    let mut rng = rand::rng();

    for increasing in [true, false] {
        let table = random_table(30, increasing);
        let lut = LutMap::new(&table, 3., -0.25, "").unwrap();
        assert!(lut.is_monotonic());

        let (lo, hi) = (3. - 29. * 0.25, 3.);
        for _ in 0..200 {
            let x = rng.random_range(lo..hi);
            assert_abs_diff_eq!(lut.apply_inverse(lut.apply(x)).unwrap(), x, epsilon = 1e-9);
        }
    }
}

#[test]
fn extrapolation_and_errors() {
    let lut = LutMap::new(&[0., 1., 2.], 0., 1., "").unwrap();
    assert_eq!(lut.apply(-1.), -1.);
    assert_eq!(lut.apply(3.), 3.);
    assert_eq!(lut.interpolation(), Interpolation::Linear);
    assert!(lut.epsilon() > 0.);

    let bumpy = LutMap::new(&[1., 3., 2.], 0., 1., "").unwrap();
    assert!(matches!(
        bumpy.apply_inverse(2.),
        Err(MappingError::NotInvertible(_))
    ));
    assert!(matches!(
        LutMap::new(&[5.], 0., 1., ""),
        Err(MappingError::InvalidArgument(_))
    ));
    assert!(matches!(
        LutMap::new(&[0., 1.], 0., 0., ""),
        Err(MappingError::InvalidArgument(_))
    ));
}

#[test]
fn threads_share_a_mapping() {
    let lut = LutMap::new(&random_table(100, true), -5., 0.1, "").unwrap();
    let inputs = Array2::random((1000, 1), Uniform::new(-10., 10.));
    let sequential = lut.tran_forward(inputs.view()).unwrap();

    let shared = &lut;
    let rows: Vec<_> = thread::scope(|s| {
        inputs
            .axis_chunks_iter(Axis(0), 100)
            .map(|chunk| s.spawn(move || shared.tran_forward(chunk).unwrap()))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });
    let views: Vec<_> = rows.iter().map(|r| r.view()).collect();
    let concurrent = ndarray::concatenate(Axis(0), &views).unwrap();

    assert_eq!(sequential, concurrent);
}

#[test]
fn lut_in_a_pipeline() {
    init_logger();
    let lut: Map<f64> = LutMap::new(&[0., 1., 4., 9., 16.], 0., 1., "Ident=squares")
        .unwrap()
        .into();
    let shift: Map<f64> = ShiftMap::new(&[1., -2.], "").unwrap().into();
    let zoom: Map<f64> = ZoomMap::new(1, 10., "").unwrap().into();

    let pipeline = shift.then(lut.clone().beside(zoom)).unwrap();
    let points = array![[0.5, 2.], [2., 3.]];
    let out = pipeline.tran_forward(points.view()).unwrap();
    assert_abs_diff_eq!(out, array![[2.5, 0.], [9., 10.]], epsilon = 1e-12);

    let back = pipeline.tran_inverse(out.view()).unwrap();
    assert_abs_diff_eq!(back, points, epsilon = 1e-12);

    let identity = pipeline.inverse().of(pipeline.clone()).unwrap().simplify();
    assert_eq!(identity.class_name(), "UnitMap");

    let split = MapSplit::new(&pipeline, &[0]).unwrap().unwrap();
    assert_eq!(split.orig_out, vec![0]);
    assert_abs_diff_eq!(
        split.split_map.tran_forward(array![[0.5]].view()).unwrap(),
        array![[2.5]],
        epsilon = 1e-12
    );
    assert!(split.split_map.simplify().as_lut().is_err());

    let rate = RateMap::new(lut, 0, 0, "").unwrap();
    let slopes = rate.tran_forward(array![[0.5], [2.5]].view()).unwrap();
    assert_abs_diff_eq!(slopes, array![[1.], [5.]], epsilon = 1e-6);
}

#[test]
fn unit_norm_of_lut_output() {
    let lut: Map<f64> = LutMap::new(&[0., 3.], 0., 1., "").unwrap().into();
    let norm: Map<f64> = UnitNormMap::new(&[0., 0.], "").unwrap().into();
    let map = lut.clone().beside(lut).then(norm).unwrap();
    assert_eq!((map.n_in(), map.n_out()), (2, 3));

    let out = map.tran_forward(array![[1., 1.]].view()).unwrap();
    let expected = std::f64::consts::FRAC_1_SQRT_2;
    assert_abs_diff_eq!(out, array![[expected, expected, 18f64.sqrt()]], epsilon = 1e-12);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_batches() {
    use astmap::MappingPar;

    let lut = LutMap::new(&random_table(64, false), 0., 1., "").unwrap();
    let points = Array2::random((10_000, 1), Uniform::new(-5., 70.));
    let forward = lut.tran_forward_par(points.view()).unwrap();
    assert_eq!(forward, lut.tran_forward(points.view()).unwrap());

    let back = lut.tran_inverse_par(forward.view()).unwrap();
    assert_abs_diff_eq!(back, points, epsilon = 1e-8);
}
