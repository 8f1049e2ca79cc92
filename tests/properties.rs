//! 보간 엔진의 성질 기반 테스트.
use engineering_materials::interp::delaunay::Triangulation;
use engineering_materials::{ModelArgs, ScatterTable, State, TableData, TableSlice};
use proptest::prelude::*;

fn table_1d(values: &[f64]) -> ScatterTable {
    ScatterTable::new(
        vec!["temperature".into()],
        TableData::OneD {
            coords: (0..values.len()).map(|i| i as f64).collect(),
            values: values.to_vec(),
        },
        Vec::new(),
    )
    .unwrap()
}

/// 3×3 격자 [0, 1]² 위의 표
fn grid_2d(values: &[f64]) -> ScatterTable {
    let slices = (0..3)
        .map(|i| TableSlice {
            key: i as f64 * 0.5,
            coords: vec![0.0, 0.5, 1.0],
            values: values[i * 3..i * 3 + 3].to_vec(),
        })
        .collect();
    ScatterTable::new(vec!["a".into(), "b".into()], TableData::TwoD(slices), Vec::new()).unwrap()
}

fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// 반시계 방향 볼록 껍질 (monotone chain)
fn convex_hull(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mut hull: Vec<(f64, f64)> = Vec::new();
    for pass in [sorted.clone(), sorted.into_iter().rev().collect()] {
        let start = hull.len();
        for p in pass {
            while hull.len() >= start + 2
                && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

proptest! {
    #[test]
    fn linear_1d_stays_between_neighbours(
        values in prop::collection::vec(-1.0e3f64..1.0e3, 2..12),
        t in 0.0f64..1.0,
    ) {
        let table = table_1d(&values);
        let x = t * (values.len() - 1) as f64;
        let i = (x.floor() as usize).min(values.len() - 2);
        let (lo, hi) = if values[i] < values[i + 1] {
            (values[i], values[i + 1])
        } else {
            (values[i + 1], values[i])
        };
        let v = table
            .query_value(&State::new().with("temperature", x), &ModelArgs::default())
            .unwrap()
            .as_scalar()
            .unwrap();
        prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9, "v={} not in [{}, {}]", v, lo, hi);
    }

    #[test]
    fn queries_are_idempotent(
        values in prop::collection::vec(-1.0e3f64..1.0e3, 9),
        a in prop::collection::vec(-0.5f64..1.5, 1..8),
        b in -0.5f64..1.5,
    ) {
        let table = grid_2d(&values);
        let state = State::new().with("a", a.clone()).with("b", b);
        let first = table.query_value(&state, &ModelArgs::default()).unwrap();
        let second = table.query_value(&state, &ModelArgs::default()).unwrap();
        prop_assert_eq!(first.len(), a.len());
        for (x, y) in first.as_slice().iter().zip(second.as_slice()) {
            prop_assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn broadcast_length_follows_array_input(
        k in 1usize..20,
        scalar in 0.0f64..1.0,
    ) {
        let table = grid_2d(&[0.0, 1.0, 2.0, 1.0, 2.0, 3.0, 2.0, 3.0, 4.0]);
        let column: Vec<f64> = (0..k).map(|i| i as f64 / k as f64).collect();
        let state = State::new().with("a", scalar).with("b", column.clone());
        prop_assert_eq!(table.query_value(&state, &ModelArgs::default()).unwrap().len(), k);

        let both = State::new().with("a", column.clone()).with("b", column);
        prop_assert_eq!(table.query_value(&both, &ModelArgs::default()).unwrap().len(), k);
    }

    #[test]
    fn in_hull_interpolation_is_bounded(
        values in prop::collection::vec(-1.0e3f64..1.0e3, 9),
        a in 0.001f64..0.999,
        b in 0.001f64..0.999,
        rescale in any::<bool>(),
    ) {
        let table = grid_2d(&values);
        let args = ModelArgs { rescale, ..ModelArgs::default() };
        let v = table
            .query_value(&State::new().with("a", a).with("b", b), &args)
            .unwrap()
            .as_scalar()
            .unwrap();
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(!v.is_nan());
        prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
    }

    #[test]
    fn irregular_cloud_covers_its_hull(
        points in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0), 5..35),
        values in prop::collection::vec(-1.0e3f64..1.0e3, 35),
        queries in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0), 32),
    ) {
        let hull = convex_hull(&points);
        prop_assume!(hull.len() >= 3);
        let tri = Triangulation::new(&points);
        let values = &values[..points.len()];
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let inside = |q: (f64, f64)| {
            (0..hull.len()).all(|i| cross(hull[i], hull[(i + 1) % hull.len()], q) > 1e-9)
        };
        for q in queries.into_iter().filter(|q| inside(*q)) {
            let v = tri.interpolate(values, q);
            prop_assert!(v.is_some(), "{:?} not covered", q);
            let v = v.unwrap();
            prop_assert!(!v.is_nan());
            prop_assert!(v >= lo - 1e-6 && v <= hi + 1e-6, "v={} not in [{}, {}]", v, lo, hi);
        }
    }
}
