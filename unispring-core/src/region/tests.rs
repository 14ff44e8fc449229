use approx::assert_relative_eq;
use test_log::test;

use super::*;

fn square() -> Region {
    Region::unit_square().unwrap()
}

fn triangle() -> Region {
    Region::polygon(vec![
        R2::new(0., 0.),
        R2::new(1., 0.),
        R2::new(0.5, 1.),
    ]).unwrap()
}

fn grid(lo: f64, hi: f64, n: usize) -> Vec<R2<f64>> {
    let step = (hi - lo) / (n - 1) as f64;
    (0..n)
        .flat_map(|i| (0..n).map(move |j| R2::new(lo + i as f64 * step, lo + j as f64 * step)))
        .collect()
}

#[test]
fn test_square_area() {
    assert_relative_eq!(square().area(), 1.0, epsilon = 1e-10);
}

#[test]
fn test_triangle_area() {
    // Base 1, height 1
    assert_relative_eq!(triangle().area(), 0.5, epsilon = 1e-10);
}

#[test]
fn test_clockwise_outline_is_reoriented() {
    let cw = Region::polygon(vec![
        R2::new(0., 0.),
        R2::new(0., 1.),
        R2::new(1., 1.),
        R2::new(1., 0.),
    ]).unwrap();
    assert_relative_eq!(cw.area(), 1.0, epsilon = 1e-10);
    assert!(cw.contains(&R2::new(0.5, 0.5)));
    assert!(!cw.contains(&R2::new(1.5, 0.5)));
}

#[test]
fn test_bounding_box() {
    let bbox = triangle().bounding_box();
    assert_eq!(bbox.min, R2::new(0., 0.));
    assert_eq!(bbox.max, R2::new(1., 1.));

    let circle = Region::circle(R2::new(0.5, 0.5), 0.3).unwrap();
    let bbox = circle.bounding_box();
    assert_relative_eq!(bbox.min, R2::new(0.2, 0.2), epsilon = 1e-12);
    assert_relative_eq!(bbox.max, R2::new(0.8, 0.8), epsilon = 1e-12);
}

#[test]
fn test_square_contains_interior() {
    let region = square();
    for p in grid(0.01, 0.99, 25) {
        assert!(region.contains(&p), "{} should be inside", p);
    }
}

#[test]
fn test_triangle_contains_interior() {
    let region = triangle();
    let [a, b, c] = [R2::new(0., 0.), R2::new(1., 0.), R2::new(0.5, 1.)];
    for i in 1..10 {
        for j in 1..(10 - i) {
            let (u, v) = (i as f64 / 10., j as f64 / 10.);
            let p = a * (1. - u - v) + b * u + c * v;
            assert!(region.contains(&p), "{} should be inside", p);
        }
    }
}

#[test]
fn test_far_outside() {
    for region in [square(), triangle(), Region::circle(R2::new(0.5, 0.5), 0.5).unwrap()] {
        for p in [
            R2::new(10., 10.),
            R2::new(-10., 0.5),
            R2::new(0.5, -9.),
            R2::new(10., -10.),
            R2::new(-10., 10.),
        ] {
            assert!(!region.contains(&p), "{} should be outside", p);
        }
    }
}

#[test]
fn test_containment_uses_displacement() {
    let region = square();
    let position = R2::new(0.5, 0.5);
    let inside = region.containment(&position, &R2::new(0.3, 0.));
    assert!(inside.inside);

    let outside = region.containment(&position, &R2::new(0.7, 0.));
    assert!(!outside.inside);
    assert_relative_eq!(outside.nearest, R2::new(1., 0.5), epsilon = 1e-12);
}

#[test]
fn test_vertices_are_inside() {
    let region = square();
    for v in [R2::new(0., 0.), R2::new(1., 0.), R2::new(1., 1.), R2::new(0., 1.)] {
        assert!(region.contains(&v), "vertex {} should count as inside", v);
    }
}

#[test]
fn test_nearest_border() {
    let region = square();
    assert_relative_eq!(region.nearest_border(&R2::new(0.5, -0.1)), R2::new(0.5, 0.), epsilon = 1e-12);
    let circle = Region::circle(R2::new(0., 0.), 2.).unwrap();
    assert_relative_eq!(circle.nearest_border(&R2::new(0., 5.)), R2::new(0., 2.), epsilon = 1e-12);
}

#[test]
fn test_circle_containment() {
    let circle = Region::circle(R2::new(0.5, 0.5), 0.3).unwrap();
    assert_relative_eq!(circle.area(), std::f64::consts::PI * 0.09, epsilon = 1e-12);
    assert!(circle.contains(&R2::new(0.5, 0.5)));
    assert!(circle.contains(&R2::new(0.7, 0.6)));
    let c = circle.containment(&R2::new(0.5, 0.5), &R2::new(0.5, 0.));
    assert!(!c.inside);
    assert_relative_eq!(c.nearest, R2::new(0.8, 0.5), epsilon = 1e-12);
    // A point snapped onto the circle counts as inside.
    let on = circle.nearest_border(&R2::new(1., 1.));
    assert!(circle.contains(&on));
}

#[test]
fn test_inscribed_square() {
    let (side, origin) = square().inscribed_square();
    assert_relative_eq!(side, 2. * 0.5 / 2_f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(origin, R2::new(0.5 - side / 2., 0.5 - side / 2.), epsilon = 1e-12);

    let circle = Region::circle(R2::new(0.5, 0.5), 0.3).unwrap();
    let (side, origin) = circle.inscribed_square();
    let half = 0.3 / 2_f64.sqrt();
    assert_relative_eq!(side, 2. * half, epsilon = 1e-12);
    assert_relative_eq!(origin, R2::new(0.5 - half, 0.5 - half), epsilon = 1e-12);
}

#[test]
fn test_border_sampling() {
    let Region::Polygon(polygon) = square() else { panic!("expected polygon") };
    // 50 samples per unit edge, 4 edges
    assert_eq!(polygon.samples().len(), 200);
    assert!(polygon.samples().iter().all(|s| s.edge < 4));

    let coarse = PolygonRegion::new(polygon.vertices().to_vec(), 0.5).unwrap();
    // Edges shorter than 1/density still get one sample.
    assert_eq!(coarse.samples().len(), 4);
}

#[test]
fn test_invalid_regions() {
    assert_eq!(
        Region::polygon(vec![R2::new(0., 0.), R2::new(1., 0.)]).unwrap_err(),
        RegionError::TooFewVertices { count: 2 },
    );
    assert_eq!(
        Region::polygon(vec![R2::new(0., 0.), R2::new(2., 2.), R2::new(2., 0.), R2::new(0., 1.)]).unwrap_err(),
        RegionError::SelfIntersecting { first: 0, second: 2 },
    );
    // Outline pinched at (1, 1), visited twice
    let pinched = vec![
        R2::new(0., 0.),
        R2::new(2., 0.),
        R2::new(1., 1.),
        R2::new(2., 2.),
        R2::new(0., 2.),
        R2::new(1., 1.),
    ];
    assert_eq!(Region::polygon(pinched).unwrap_err(), RegionError::SelfIntersecting { first: 1, second: 4 });
    // Last edge runs back along the first one
    assert_eq!(
        Region::polygon(vec![R2::new(0., 0.), R2::new(2., 0.), R2::new(2., 1.), R2::new(1., 0.)]).unwrap_err(),
        RegionError::SelfIntersecting { first: 0, second: 2 },
    );
    // A vertex touching a non-adjacent edge
    assert_eq!(
        Region::polygon(vec![
            R2::new(0., 0.),
            R2::new(2., 0.),
            R2::new(2., 2.),
            R2::new(1., 0.),
            R2::new(0., 2.),
        ]).unwrap_err(),
        RegionError::SelfIntersecting { first: 0, second: 2 },
    );
    assert_eq!(
        Region::polygon(vec![R2::new(0., 0.), R2::new(1., 0.), R2::new(1., 0.), R2::new(0., 1.)]).unwrap_err(),
        RegionError::DegenerateEdge { index: 1 },
    );
    assert_eq!(
        Region::polygon(vec![R2::new(0., 0.), R2::new(1., 1.), R2::new(2., 2.)]).unwrap_err(),
        RegionError::ZeroArea,
    );
    assert_eq!(
        PolygonRegion::new(vec![R2::new(0., 0.), R2::new(1., 0.), R2::new(0., 1.)], 0.).unwrap_err(),
        RegionError::NonPositiveDensity(0.),
    );
    assert_eq!(Region::circle(R2::new(0., 0.), -1.).unwrap_err(), RegionError::NonPositiveRadius(-1.));
}

#[test]
fn test_region_spec_json() {
    let spec: RegionSpec = serde_json::from_str(
        r#"{"kind": "polygon", "vertices": [{"x": 0, "y": 0}, {"x": 1, "y": 0}, {"x": 0, "y": 1}]}"#
    ).unwrap();
    assert_eq!(spec, RegionSpec::Polygon {
        vertices: vec![R2::new(0., 0.), R2::new(1., 0.), R2::new(0., 1.)],
        density: DEFAULT_BORDER_DENSITY,
    });
    let region = spec.build().unwrap();
    assert_relative_eq!(region.area(), 0.5, epsilon = 1e-12);

    let circle: RegionSpec = serde_json::from_str(
        r#"{"kind": "circle", "center": {"x": 0.5, "y": 0.5}, "radius": 0.25}"#
    ).unwrap();
    let region = Region::try_from(circle.clone()).unwrap();
    assert_eq!(region.spec(), circle);
}
