//! Geometric primitives (spec §4.A): points, segment intersection
//! classification, polygon point-location, convex hull, and the
//! lexicographic comparators the rest of the crate is built on.
//!
//! Grounded in the teacher's small free-function style (`utils.rs`) and in
//! the pack's polygon/hull modules (`rgeometry`, `geo`); `OrderedFloat`
//! (a teacher dependency) is used wherever a scalar needs `Ord` for sorting.

use nalgebra::Point2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A point in the plane. Thin wrapper around `nalgebra::Point2<f64>` so the
/// rest of the crate can attach its own comparator/epsilon semantics instead
/// of relying on `PartialOrd`/`Eq` on raw floats.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Point(pub Point2<f64>);

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point2::new(x, y))
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.0.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.0.y
    }

    #[must_use]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.0 - other.0).norm()
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x() == other.x() && self.y() == other.y()
    }
}

impl std::ops::Sub for Point {
    type Output = (f64, f64);
    fn sub(self, rhs: Point) -> (f64, f64) {
        (self.x() - rhs.x(), self.y() - rhs.y())
    }
}

/// Returns true when `|a - b| <= epsilon`.
#[must_use]
pub fn near(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Cross product of `(a - p0)` and `(b - p0)`. Sign gives turn direction:
/// negative = right (clockwise), zero = collinear, positive = left
/// (counter-clockwise), assuming mathematical (y-up) orientation.
#[must_use]
pub fn cross(p0: Point, a: Point, b: Point) -> f64 {
    (a.x() - p0.x()) * (b.y() - p0.y()) - (b.x() - p0.x()) * (a.y() - p0.y())
}

/// Lexicographic comparator axis: `Y` orders primarily by `y` then `x`
/// (used by the cycle finder's sweep and the DCEL vertex collection);
/// `X` orders primarily by `x` then `y` (used by the trapezoidal map).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Y,
    X,
}

/// Exact lexicographic ordering, no epsilon.
#[must_use]
pub fn compare_exact(axis: Axis, a: Point, b: Point) -> std::cmp::Ordering {
    let (primary_a, secondary_a, primary_b, secondary_b) = match axis {
        Axis::Y => (a.y(), a.x(), b.y(), b.x()),
        Axis::X => (a.x(), a.y(), b.x(), b.y()),
    };
    OrderedFloat(primary_a)
        .cmp(&OrderedFloat(primary_b))
        .then(OrderedFloat(secondary_a).cmp(&OrderedFloat(secondary_b)))
}

/// Epsilon lexicographic ordering: both coordinates compare equal when
/// within `epsilon` of one another.
#[must_use]
pub fn compare_epsilon(axis: Axis, a: Point, b: Point, epsilon: f64) -> std::cmp::Ordering {
    let (primary_a, secondary_a, primary_b, secondary_b) = match axis {
        Axis::Y => (a.y(), a.x(), b.y(), b.x()),
        Axis::X => (a.x(), a.y(), b.x(), b.y()),
    };
    if !near(primary_a, primary_b, epsilon) {
        return primary_a.partial_cmp(&primary_b).unwrap_or(std::cmp::Ordering::Equal);
    }
    if !near(secondary_a, secondary_b, epsilon) {
        return secondary_a.partial_cmp(&secondary_b).unwrap_or(std::cmp::Ordering::Equal);
    }
    std::cmp::Ordering::Equal
}

// ---------------------------------------------------------------------
// Segment intersection classification (spec §4.A)
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Parallel,
    Collinear,
    Divergent,
}

/// Where an intersection/projection lands relative to a segment's own
/// extent, or (for parallel/collinear cases) where one segment's endpoint
/// lands relative to the other's line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegLocation {
    Before,
    Start,
    Between,
    End,
    After,
    Left,
    Right,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Intersection {
    pub exists: bool,
    pub relation: Relation,
    pub shared: Option<Point>,
    pub first: SegLocation,
    pub second: SegLocation,
}

/// Classifies the intersection of segment `a0`-`a1` against `b0`-`b1`,
/// per spec §4.A. `epsilon` controls both the parallel-slope tolerance and
/// the endpoint-snapping tolerance on the shared point.
#[must_use]
pub fn intersect(a0: Point, a1: Point, b0: Point, b1: Point, epsilon: f64) -> Intersection {
    let (ax, ay) = a1 - a0;
    let (bx, by) = b1 - b0;
    let denom = ax * by - ay * bx;

    if near(denom, 0.0, epsilon) {
        // Parallel lines: decide collinearity by checking whether b0 lies on line a.
        let cross_val = cross(a0, a1, b0);
        let collinear = near(cross_val, 0.0, epsilon * (1.0 + ax.hypot(ay)));
        let relation = if collinear { Relation::Collinear } else { Relation::Parallel };

        // Project b0 and b1 onto the a-axis to report their locations.
        let t0 = project_param(a0, a1, b0);
        let t1 = project_param(a0, a1, b1);
        let first = classify_param(t0, epsilon).min_order(classify_param(t1, epsilon));
        let second = if cross_val > epsilon { SegLocation::Left } else if cross_val < -epsilon { SegLocation::Right } else { SegLocation::Start };

        return Intersection {
            exists: collinear,
            relation,
            shared: if collinear && points_overlap(a0, a1, b0, b1, epsilon) { Some(if near(t0, 0.0, epsilon) { a0 } else if near(t0, 1.0, epsilon) { a1 } else { b0 }) } else { None },
            first,
            second,
        };
    }

    let dx = b0.x() - a0.x();
    let dy = b0.y() - a0.y();
    let t = (dx * by - dy * bx) / denom;
    let u = (dx * ay - dy * ax) / denom;

    let shared_raw = Point::new(a0.x() + t * ax, a0.y() + t * ay);
    let shared = snap_to_endpoint(shared_raw, a0, a1, b0, b1, epsilon);

    let exists = (-epsilon..=1.0 + epsilon).contains(&t) && (-epsilon..=1.0 + epsilon).contains(&u);

    Intersection {
        exists,
        relation: Relation::Divergent,
        shared: Some(shared),
        first: classify_param(t, epsilon),
        second: classify_param(u, epsilon),
    }
}

fn classify_param(t: f64, epsilon: f64) -> SegLocation {
    if near(t, 0.0, epsilon) {
        SegLocation::Start
    } else if near(t, 1.0, epsilon) {
        SegLocation::End
    } else if t < 0.0 {
        SegLocation::Before
    } else if t > 1.0 {
        SegLocation::After
    } else {
        SegLocation::Between
    }
}

trait MinOrder {
    fn min_order(self, other: Self) -> Self;
}
impl MinOrder for SegLocation {
    fn min_order(self, other: Self) -> Self {
        // Prefer the more specific (interior) classification when collinear
        // endpoints straddle both segments' parameter ranges.
        fn rank(l: SegLocation) -> u8 {
            match l {
                SegLocation::Between => 0,
                SegLocation::Start | SegLocation::End => 1,
                SegLocation::Before | SegLocation::After => 2,
                SegLocation::Left | SegLocation::Right => 3,
            }
        }
        if rank(self) <= rank(other) { self } else { other }
    }
}

fn project_param(a0: Point, a1: Point, p: Point) -> f64 {
    let (ax, ay) = a1 - a0;
    let len2 = ax * ax + ay * ay;
    if len2 <= f64::EPSILON {
        return 0.0;
    }
    let (px, py) = p - a0;
    (px * ax + py * ay) / len2
}

fn points_overlap(a0: Point, a1: Point, b0: Point, b1: Point, epsilon: f64) -> bool {
    let ta0 = 0.0;
    let ta1 = 1.0;
    let tb0 = project_param(a0, a1, b0);
    let tb1 = project_param(a0, a1, b1);
    let (lo_b, hi_b) = if tb0 <= tb1 { (tb0, tb1) } else { (tb1, tb0) };
    hi_b >= ta0 - epsilon && lo_b <= ta1 + epsilon
}

fn snap_to_endpoint(shared: Point, a0: Point, a1: Point, b0: Point, b1: Point, epsilon: f64) -> Point {
    for candidate in [a0, a1, b0, b1] {
        if near(shared.x(), candidate.x(), epsilon) && near(shared.y(), candidate.y(), epsilon) {
            return candidate;
        }
    }
    shared
}

// ---------------------------------------------------------------------
// Polygon point location (spec §4.A)
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonLocation {
    Inside,
    Outside,
    Edge,
    Vertex,
}

/// Ray-crossings point-in-polygon test with explicit epsilon handling for
/// vertex/edge coincidence, per spec §4.A.
#[must_use]
pub fn point_in_polygon(polygon: &[Point], query: Point, epsilon: f64) -> PolygonLocation {
    let n = polygon.len();
    if n < 3 {
        return PolygonLocation::Outside;
    }

    for &v in polygon {
        if near(v.x(), query.x(), epsilon) && near(v.y(), query.y(), epsilon) {
            return PolygonLocation::Vertex;
        }
    }

    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if on_segment_within(a, b, query, epsilon) {
            return PolygonLocation::Edge;
        }
    }

    let mut crossings = 0i64;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if (a.y() > query.y()) != (b.y() > query.y()) {
            let x_at_y = a.x() + (query.y() - a.y()) / (b.y() - a.y()) * (b.x() - a.x());
            if x_at_y > query.x() {
                crossings += 1;
            }
        }
    }

    if crossings % 2 == 1 {
        PolygonLocation::Inside
    } else {
        PolygonLocation::Outside
    }
}

pub(crate) fn on_segment_within(a: Point, b: Point, p: Point, epsilon: f64) -> bool {
    let d = cross(a, b, p);
    let len = a.distance(&b).max(f64::EPSILON);
    if (d / len).abs() > epsilon {
        return false;
    }
    let t = project_param(a, b, p);
    (-epsilon / len.max(1.0)..=1.0 + epsilon / len.max(1.0)).contains(&t)
}

// ---------------------------------------------------------------------
// Convex hull: Graham scan, spec §4.A
// ---------------------------------------------------------------------

/// Computes the convex hull of `points` via a Graham scan, O(n log n).
/// Duplicate and collinear interior points are filtered; for 1 input point
/// returns that point, for 2 distinct inputs returns both.
#[must_use]
pub fn convex_hull(points: &[Point], epsilon: f64) -> Vec<Point> {
    let mut unique: Vec<Point> = Vec::new();
    'outer: for &p in points {
        for &q in &unique {
            if near(p.x(), q.x(), epsilon) && near(p.y(), q.y(), epsilon) {
                continue 'outer;
            }
        }
        unique.push(p);
    }

    if unique.len() <= 2 {
        return unique;
    }

    let pivot_idx = unique
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| compare_exact(Axis::Y, **a, **b))
        .map(|(i, _)| i)
        .expect("non-empty");
    let pivot = unique.swap_remove(pivot_idx);

    unique.sort_by(|a, b| {
        let angle_a = (a.y() - pivot.y()).atan2(a.x() - pivot.x());
        let angle_b = (b.y() - pivot.y()).atan2(b.x() - pivot.x());
        angle_a
            .partial_cmp(&angle_b)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| OrderedFloat(pivot.distance(a)).cmp(&OrderedFloat(pivot.distance(b))))
    });

    let mut hull: Vec<Point> = vec![pivot];
    for p in unique {
        while hull.len() >= 2 {
            let top = hull[hull.len() - 1];
            let below = hull[hull.len() - 2];
            if cross(below, top, p) <= epsilon {
                hull.pop();
            } else {
                break;
            }
        }
        hull.push(p);
    }

    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_signs() {
        let p0 = Point::new(0.0, 0.0);
        let a = Point::new(1.0, 0.0);
        let b = Point::new(0.0, 1.0);
        assert!(cross(p0, a, b) > 0.0); // left turn
        assert!(cross(p0, b, a) < 0.0); // right turn
        assert_eq!(cross(p0, a, Point::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn intersect_crossing_segments() {
        let result = intersect(
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, -2.0),
            Point::new(2.0, 2.0),
            0.0,
        );
        assert!(result.exists);
        assert_eq!(result.relation, Relation::Divergent);
        let shared = result.shared.unwrap();
        assert!(near(shared.x(), 2.0, 1e-9));
        assert!(near(shared.y(), 0.0, 1e-9));
    }

    #[test]
    fn intersect_parallel_no_overlap() {
        let result = intersect(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            1e-9,
        );
        assert_eq!(result.relation, Relation::Parallel);
        assert!(!result.exists);
    }

    #[test]
    fn point_in_polygon_cases() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        assert_eq!(point_in_polygon(&square, Point::new(2.0, 2.0), 1e-9), PolygonLocation::Inside);
        assert_eq!(point_in_polygon(&square, Point::new(0.0, 0.0), 1e-9), PolygonLocation::Vertex);
        assert_eq!(point_in_polygon(&square, Point::new(2.0, 0.0), 1e-9), PolygonLocation::Edge);
        assert_eq!(point_in_polygon(&square, Point::new(10.0, 10.0), 1e-9), PolygonLocation::Outside);
    }

    #[test]
    fn convex_hull_square_with_interior_point() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(2.0, 2.0),
        ];
        let hull = convex_hull(&points, 1e-9);
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn convex_hull_single_and_pair() {
        assert_eq!(convex_hull(&[Point::new(1.0, 1.0)], 1e-9).len(), 1);
        assert_eq!(
            convex_hull(&[Point::new(1.0, 1.0), Point::new(2.0, 2.0)], 1e-9).len(),
            2
        );
    }
}
