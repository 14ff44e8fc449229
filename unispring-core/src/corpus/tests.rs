use std::collections::BTreeSet;

use approx::assert_relative_eq;
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use test_log::test;

use super::*;
use crate::error::TriangulationError;

fn random_positions(n: usize, seed: u64) -> Vec<R2<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| R2::new(rng.gen::<f64>(), rng.gen::<f64>())).collect()
}

fn square() -> Region {
    Region::unit_square().unwrap()
}

fn resized() -> CorpusConfig {
    CorpusConfig { seeding: Seeding::Resize, ..CorpusConfig::default() }
}

fn nearest_neighbor_distances(corpus: &Corpus) -> Vec<f64> {
    let positions = corpus.positions();
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            positions
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, q)| p.distance(q))
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

#[test]
fn test_new_builds_buffers_in_id_order() {
    let track = Track::from([
        (9, vec![vec![5., 0., 10.]]),
        (2, vec![vec![1., 1., 20.], vec![3., 2., 40.]]),
    ]);
    let config = CorpusConfig { descr_x: 0, descr_y: 2, seeding: Seeding::Resize, ..CorpusConfig::default() };
    let corpus = Corpus::new(&track, square(), &config).unwrap();
    assert!(corpus.is_normalized());
    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus.buffers(), &[
        Buffer { id: 2, range: 0..2 },
        Buffer { id: 9, range: 2..3 },
    ]);
    let (xs, ys) = corpus.buffer_positions(2).unwrap();
    assert_eq!(xs, vec![0., 0.5]);
    assert_eq!(ys, vec![1. / 3., 1.]);
    assert_eq!(corpus.buffer_positions(9).unwrap(), (vec![1.], vec![0.]));
    assert_eq!(corpus.buffer_positions(4).unwrap_err(), CorpusError::UnknownBuffer(4));
}

#[test]
fn test_new_rejects_bad_input() {
    let config = CorpusConfig::default();
    assert_eq!(Corpus::new(&Track::new(), square(), &config).unwrap_err(), CorpusError::Empty);
    assert_eq!(
        Corpus::new(&Track::from([(1, vec![])]), square(), &config).unwrap_err(),
        CorpusError::Empty,
    );
    let short = Track::from([(1, vec![vec![0., 1.], vec![0.5]])]);
    assert_eq!(
        Corpus::new(&short, square(), &config).unwrap_err(),
        CorpusError::MissingDescriptor { buffer: 1, record: 1, index: 1, len: 1 },
    );
    let flat = vec![R2::new(0., 0.3), R2::new(1., 0.3), R2::new(2., 0.3)];
    assert_eq!(
        Corpus::from_positions(&flat, square(), &config).unwrap_err(),
        CorpusError::DegenerateAxis { axis: 'y' },
    );
}

#[test]
fn test_normalization_is_idempotent() {
    let mut corpus = Corpus::from_positions(&random_positions(30, 1), square(), &resized()).unwrap();
    let before = corpus.positions();
    corpus.normalize().unwrap();
    for (a, b) in before.iter().zip(corpus.positions()) {
        assert_relative_eq!(*a, b, epsilon = 1e-12);
    }
}

#[test]
fn test_sorted_seeding_spreads_ranks() {
    let positions = vec![R2::new(0.3, 0.9), R2::new(0.1, 0.2), R2::new(0.7, 0.5)];
    let corpus = Corpus::from_positions(&positions, square(), &CorpusConfig::default()).unwrap();
    assert_eq!(corpus.positions(), vec![R2::new(0.5, 1.), R2::new(0., 0.), R2::new(1., 0.5)]);
}

#[test]
fn test_seeding_frames() {
    let positions = vec![R2::new(0., 0.), R2::new(1., 0.5), R2::new(0.5, 1.)];
    let mut corpus = Corpus::from_positions(&positions, square(), &resized()).unwrap();
    corpus.pre_uniformization(Seeding::Resize, Frame::Square { origin: R2::new(2., 3.), side: 0.5 }).unwrap();
    assert_relative_eq!(corpus.points()[1].position, R2::new(2.5, 3.25), epsilon = 1e-12);

    corpus.set_region(Region::circle(R2::new(0.5, 0.5), 0.3).unwrap());
    corpus.pre_uniformization(Seeding::Resize, Frame::BoundingBox).unwrap();
    assert_relative_eq!(corpus.points()[0].position, R2::new(0.2, 0.2), epsilon = 1e-12);
    assert_relative_eq!(corpus.points()[1].position, R2::new(0.8, 0.5), epsilon = 1e-12);

    corpus.pre_uniformization(Seeding::Sorted, Frame::InscribedSquare).unwrap();
    let half = 0.3 / 2_f64.sqrt();
    assert_relative_eq!(corpus.points()[0].position, R2::new(0.5 - half, 0.5 - half), epsilon = 1e-12);
    assert_relative_eq!(corpus.points()[2].position, R2::new(0.5, 0.5 + half), epsilon = 1e-12);
}

#[test]
fn test_rest_length_and_scaling() {
    let mut corpus = Corpus::from_positions(&random_positions(40, 2), square(), &resized()).unwrap();
    let l0 = corpus.rest_length();
    assert_relative_eq!(l0, (2. / (3_f64.sqrt() * 40.)).sqrt(), epsilon = 1e-12);
    // No neighbors yet
    assert_eq!(corpus.scaling_factor(l0), l0);

    let pairs = corpus.triangulate().unwrap();
    assert!(pairs >= 40);
    assert_relative_eq!(corpus.scaling_factor(l0), l0, epsilon = 1e-12);
    corpus.set_density(Density::gaussian());
    assert!(corpus.scaling_factor(l0) > l0);
}

/// Variance of the lengths of all current neighbor links.
fn link_length_variance(corpus: &Corpus) -> f64 {
    let points = corpus.points();
    let lengths: Vec<f64> = points
        .iter()
        .enumerate()
        .flat_map(|(i, p)| p.neighbors.iter().filter(move |&&j| j > i).map(move |&j| p.distance_to(&points[j])))
        .collect();
    let n = lengths.len() as f64;
    let mean = lengths.iter().sum::<f64>() / n;
    lengths.iter().map(|l| (l - mean) * (l - mean)).sum::<f64>() / n
}

#[test]
fn test_triangulate_errors() {
    let collinear = vec![R2::new(0., 0.), R2::new(0.5, 0.5), R2::new(1., 1.)];
    let mut corpus = Corpus::from_positions(&collinear, square(), &resized()).unwrap();
    assert_eq!(corpus.triangulate().unwrap_err(), TriangulationError::Collinear { count: 3 });
    assert_eq!(
        corpus.unispring(&RelaxConfig::default(), None).unwrap_err(),
        CorpusError::Triangulation(TriangulationError::Collinear { count: 3 }),
    );
}

#[test]
fn test_four_corners() {
    let positions = vec![
        R2::new(0.1, 0.1),
        R2::new(0.9, 0.1),
        R2::new(0.1, 0.9),
        R2::new(0.9, 0.9),
    ];
    let mut corpus = Corpus::from_positions(&positions, square(), &resized()).unwrap();
    let relaxation = corpus.unispring(&RelaxConfig::default(), None).unwrap();
    assert!(relaxation.is_converged());
    for p in corpus.points() {
        assert!(corpus.region().contains(&p.position), "{} escaped", p.position);
        assert!(p.neighbors.is_empty());
    }
    let distances = nearest_neighbor_distances(&corpus);
    let (lo, hi) = distances.iter().fold((f64::INFINITY, 0_f64), |(lo, hi), d| (lo.min(*d), hi.max(*d)));
    assert!(hi <= lo * 1.1, "nearest-neighbor distances {:?}", distances);
}

#[test]
fn test_relaxation_stays_inside() {
    let triangle = Region::polygon(vec![R2::new(0., 0.), R2::new(1., 0.), R2::new(0.5, 1.)]).unwrap();
    let mut corpus = Corpus::from_positions(&random_positions(40, 3), triangle, &CorpusConfig::default()).unwrap();
    let config = RelaxConfig { limit: Some(300), ..RelaxConfig::default() };
    let relaxation = corpus.unispring(&config, None).unwrap();
    assert!(relaxation.steps <= 300);
    assert_ne!(relaxation.exit, Exit::TriangulationFailed);
    for p in corpus.points() {
        assert!(corpus.region().contains(&p.position), "{} escaped", p.position);
    }
}

#[test]
fn test_terminates_within_limit() {
    let mut corpus = Corpus::from_positions(&random_positions(200, 4), square(), &CorpusConfig::default()).unwrap();
    let relaxation = corpus.unispring(&RelaxConfig::default(), None).unwrap();
    assert!(relaxation.steps <= 1000);
    match relaxation.exit {
        Exit::Converged => {}
        Exit::ForcedExit => assert_eq!(relaxation.steps, 1000),
        Exit::TriangulationFailed => panic!("unexpected triangulation failure"),
    }
}

#[test]
fn test_forced_exit() {
    let mut corpus = Corpus::from_positions(&random_positions(50, 5), square(), &CorpusConfig::default()).unwrap();
    let config = RelaxConfig { limit: Some(1), ..RelaxConfig::default() };
    let relaxation = corpus.unispring(&config, None).unwrap();
    assert_eq!(relaxation.steps, 1);
    assert_eq!(relaxation.exit, Exit::ForcedExit);
    assert!(!relaxation.is_converged());
}

#[test]
fn test_link_lengths_even_out() {
    let mut corpus = Corpus::from_positions(&random_positions(30, 11), square(), &resized()).unwrap();
    corpus.triangulate().unwrap();
    let l0 = corpus.rest_length();
    let config = RelaxConfig::default();
    let windows: Vec<f64> = (0..4)
        .map(|_| {
            let mut total = 0.;
            for _ in 0..25 {
                let outcome = corpus.step(l0, &config);
                if outcome.retriangulate {
                    corpus.triangulate().unwrap();
                }
                total += link_length_variance(&corpus);
            }
            total / 25.
        })
        .collect();
    debug!("windowed link length variance: {:?}", windows);
    assert!(windows[3] < windows[0], "variance did not decrease: {:?}", windows);
}

#[test]
fn test_failed_retriangulation_keeps_last_step() {
    let mut corpus = Corpus::from_positions(&random_positions(10, 12), square(), &resized()).unwrap();
    // Points lined up on y = 0.5, linked in a chain, far from their origins:
    // the first step forces a re-triangulation that cannot succeed.
    let n = corpus.len();
    let snapshot = Snapshot {
        positions: (0..n).map(|i| R2::new(0.3 + 0.01 * i as f64, 0.5)).collect(),
        origins: (0..n).map(|i| R2::new(0.3 + 0.01 * i as f64, 0.2)).collect(),
        neighbors: (0..n)
            .map(|i| {
                let mut links = BTreeSet::new();
                if i > 0 {
                    links.insert(i - 1);
                }
                if i + 1 < n {
                    links.insert(i + 1);
                }
                links
            })
            .collect(),
    };
    corpus.restore(&snapshot).unwrap();
    let config = RelaxConfig { stiffness: 0.01, min_dist: 1e-6, ..RelaxConfig::default() };
    let l0 = corpus.rest_length();

    let mut expected = corpus.clone();
    let outcome = expected.step(l0, &config);
    assert!(outcome.retriangulate && !outcome.converged);
    assert_eq!(expected.triangulate().unwrap_err(), TriangulationError::Collinear { count: n });

    let relaxation = corpus.relax(l0, &config, None);
    assert_eq!(relaxation.exit, Exit::TriangulationFailed);
    assert_eq!(relaxation.steps, 1);
    assert_eq!(relaxation.retriangulations, 0);
    assert!(!relaxation.is_converged());
    assert_eq!(corpus.positions(), expected.positions());
    assert_ne!(corpus.positions(), snapshot.positions);
    for p in corpus.points() {
        assert_eq!(p.y(), 0.5);
        assert!(p.neighbors.is_empty());
    }
}

#[test]
fn test_region_swap() {
    let mut corpus = Corpus::from_positions(&random_positions(50, 6), square(), &CorpusConfig::default()).unwrap();
    let first = corpus.unispring(&RelaxConfig::default(), None).unwrap();
    assert_ne!(first.exit, Exit::TriangulationFailed);

    corpus.set_region(Region::circle(R2::new(0.5, 0.5), 0.3).unwrap());
    let second = corpus.unispring(&RelaxConfig::default(), None).unwrap();
    assert_ne!(second.exit, Exit::TriangulationFailed);
    assert!(second.l0 < first.l0);
    for p in corpus.points() {
        assert!(p.position.distance(&R2::new(0.5, 0.5)) <= 0.3 + 1e-9, "{} outside the circle", p.position);
    }
}

#[test]
fn test_periodic_export() {
    let mut corpus = Corpus::from_positions(&random_positions(30, 7), square(), &CorpusConfig::default()).unwrap();
    let config = RelaxConfig { limit: Some(6), export_period: 2, ..RelaxConfig::default() };
    let mut exports = 0;
    let mut sink = |id: BufferId, xs: &[f64], ys: &[f64]| {
        assert_eq!(id, 0);
        assert_eq!(xs.len(), 30);
        assert_eq!(ys.len(), 30);
        exports += 1;
    };
    let relaxation = corpus.unispring(&config, Some(&mut sink)).unwrap();
    assert_eq!(exports, relaxation.steps / 2);
}

#[test]
fn test_snapshot_and_reference() {
    let mut corpus = Corpus::from_positions(&random_positions(25, 8), square(), &CorpusConfig::default()).unwrap();
    let seeded = corpus.positions();
    let snapshot = corpus.snapshot();
    corpus.store_reference();

    corpus.unispring(&RelaxConfig { limit: Some(20), ..RelaxConfig::default() }, None).unwrap();
    assert_ne!(corpus.positions(), seeded);
    let relaxed = corpus.positions();

    assert_eq!(corpus.recall_reference(), 25);
    assert_eq!(corpus.positions(), seeded);

    corpus.unispring(&RelaxConfig { limit: Some(20), ..RelaxConfig::default() }, None).unwrap();
    corpus.restore(&snapshot).unwrap();
    assert_eq!(corpus.positions(), seeded);
    assert_eq!(corpus.snapshot(), snapshot);
    assert_ne!(relaxed, seeded);

    let other = Corpus::from_positions(&random_positions(5, 9), square(), &CorpusConfig::default()).unwrap();
    assert_eq!(
        corpus.restore(&other.snapshot()).unwrap_err(),
        CorpusError::SnapshotMismatch { expected: 25, actual: 5 },
    );
}

#[test]
fn test_set_region_keeps_points() {
    let mut corpus = Corpus::from_positions(&random_positions(10, 10), square(), &CorpusConfig::default()).unwrap();
    corpus.triangulate().unwrap();
    let snapshot = corpus.snapshot();
    corpus.set_region(Region::circle(R2::new(0., 0.), 5.).unwrap());
    assert_eq!(corpus.snapshot(), snapshot);
    assert_relative_eq!(corpus.region().area(), 25. * std::f64::consts::PI, epsilon = 1e-9);
}

#[test]
fn test_attract() {
    let grid: Vec<R2<f64>> = (0..5)
        .flat_map(|i| (0..5).map(move |j| R2::new(i as f64 / 4., j as f64 / 4.)))
        .collect();
    let mut corpus = Corpus::from_positions(&grid, square(), &resized()).unwrap();
    let center = R2::new(0.5, 0.5);
    let before: Vec<f64> = corpus.positions().iter().map(|p| p.distance(&center)).collect();
    let config = AttractorConfig::new(vec![Attractor::new(center, 0.2, 0.05).unwrap()]);
    let report = corpus.attract(&config);
    assert_eq!(report.moved, 24);
    assert!(report.max_displacement > 0. && report.max_displacement <= 0.05);
    for (p, d) in corpus.points().iter().zip(before) {
        let after = p.position.distance(&center);
        if d > 0. {
            assert!(after < d, "{} did not move toward the center", p.position);
        } else {
            assert_eq!(after, 0.);
        }
        assert!(corpus.region().contains(&p.position));
    }
}
