//! Point location (spec §4.G): the shared [`Location`] result type and the
//! brute-force locator used both standalone and as the trapezoidal map's
//! reference/fallback implementation.

use std::fmt::Debug;

use crate::dcel::{EdgeID, FaceID, Subdivision, VertID};
use crate::geometry::{self, Point, PolygonLocation};

/// Where a query point landed relative to a subdivision's topology.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Vertex(VertID),
    Edge(EdgeID),
    Face(FaceID),
}

/// Locates `point` by testing every face's boundary directly: O(V + E) per
/// query. Used as ground truth against [`crate::trapezoidal::TrapezoidalMap`]
/// and as the default locator when a subdivision is queried only rarely.
pub fn locate_brute_force<
    VData: Default + Clone + Debug,
    EData: Default + Clone + Debug,
    FData: Default + Clone + Debug,
>(
    sub: &Subdivision<VData, EData, FData>,
    point: Point,
) -> Location {
    for (face, _) in sub.faces.iter() {
        if face == sub.unbounded_face() {
            continue;
        }
        let outer_corners = sub.corners(face);
        if outer_corners.len() < 3 {
            continue;
        }
        let poly: Vec<Point> = outer_corners.iter().map(|&v| sub.position(v)).collect();

        if geometry::point_in_polygon(&poly, point, sub.epsilon()) == PolygonLocation::Outside {
            continue;
        }

        // Vertex/edge coincidence takes priority over a plain `Face` match,
        // and must be tested against every boundary half-edge of the face —
        // its outer cycle *and* every hole (spec §4.G), not just the outer
        // boundary the classification above used to narrow down candidates.
        let boundary = sub.boundary_edges(face);
        if let Some(&e) = boundary.iter().find(|&&e| {
            let a = sub.root(e);
            geometry::near(sub.position(a).x(), point.x(), sub.epsilon()) && geometry::near(sub.position(a).y(), point.y(), sub.epsilon())
        }) {
            return Location::Vertex(sub.root(e));
        }
        if let Some(&e) = boundary.iter().find(|&&e| {
            let (a, b) = sub.endpoints(e);
            geometry::on_segment_within(sub.position(a), sub.position(b), point, sub.epsilon())
        }) {
            return Location::Edge(e);
        }

        return Location::Face(face);
    }
    Location::Face(sub.unbounded_face())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcel::Subdivision;

    #[test]
    fn locates_interior_boundary_and_outside_points() {
        let polygon = vec![vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ]];
        let (sub, _, _) = Subdivision::<(), (), ()>::from_polygons(&polygon, 1e-9).unwrap();

        assert!(matches!(locate_brute_force(&sub, Point::new(2.0, 2.0)), Location::Face(f) if f != sub.unbounded_face()));
        assert!(matches!(locate_brute_force(&sub, Point::new(-1.0, -1.0)), Location::Face(f) if f == sub.unbounded_face()));
        assert!(matches!(locate_brute_force(&sub, Point::new(0.0, 2.0)), Location::Edge(_)));
        assert!(matches!(locate_brute_force(&sub, Point::new(0.0, 0.0)), Location::Vertex(_)));
    }
}
