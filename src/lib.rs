#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

//! A planar subdivision engine: a doubly-connected edge list (DCEL) over a
//! connected arrangement of non-crossing straight segments, the cycle
//! finder that assigns faces to a soup of half-edges, incremental edit
//! operations, an overlay (intersection) of two subdivisions, and a
//! trapezoidal-map point-location index with a brute-force reference
//! locator. See `DESIGN.md` for the corpus this crate is grounded on.

pub mod builder;
pub mod cycles;
pub mod dcel;
pub mod error;
pub mod geometry;
pub mod locate;
pub mod overlay;
pub mod trapezoidal;

pub use dcel::{EdgeID, FaceID, Subdivision, VertID};
pub use error::{Result, SubdivisionError};
pub use geometry::Point;
pub use locate::Location;

#[cfg(test)]
mod tests {
    use rand::Rng;

    use crate::dcel::Subdivision;
    use crate::geometry::Point;
    use crate::locate::{Location, locate_brute_force};
    use crate::overlay::overlay;
    use crate::trapezoidal::TrapezoidalMap;

    /// Spec §8, scenario 1.
    #[test]
    fn scenario_triangle() {
        let segments = vec![
            (Point::new(0.0, 0.0), Point::new(4.0, 0.0)),
            (Point::new(4.0, 0.0), Point::new(2.0, 3.0)),
            (Point::new(2.0, 3.0), Point::new(0.0, 0.0)),
        ];
        let (sub, _, _, _) = Subdivision::<(), (), ()>::from_segments(&segments, 1e-9).unwrap();
        sub.validate().unwrap();

        assert_eq!(sub.nr_verts(), 3);
        assert_eq!(sub.nr_edges(), 6);
        assert_eq!(sub.nr_faces(), 2);

        let triangle_face = sub.find_face(Point::new(2.0, 1.0));
        assert_ne!(triangle_face, sub.unbounded_face());

        assert!(matches!(locate_brute_force(&sub, Point::new(2.0, 1.0)), Location::Face(f) if f == triangle_face));
        assert!(matches!(locate_brute_force(&sub, Point::new(4.0, 0.0)), Location::Vertex(v) if sub.position(v) == Point::new(4.0, 0.0)));
        assert!(matches!(locate_brute_force(&sub, Point::new(2.0, 0.0)), Location::Edge(_)));
    }

    /// Spec §8, scenario 2.
    #[test]
    fn scenario_square_with_diagonal() {
        let mut segments = vec![
            (Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            (Point::new(1.0, 0.0), Point::new(1.0, 1.0)),
            (Point::new(1.0, 1.0), Point::new(0.0, 1.0)),
            (Point::new(0.0, 1.0), Point::new(0.0, 0.0)),
        ];
        segments.push((Point::new(0.0, 0.0), Point::new(1.0, 1.0)));
        let (sub, _, _, _) = Subdivision::<(), (), ()>::from_segments(&segments, 1e-9).unwrap();
        sub.validate().unwrap();

        assert_eq!(sub.nr_verts(), 4);
        assert_eq!(sub.nr_edges(), 10);
        assert_eq!(sub.nr_faces(), 3);

        let upper_triangle = sub.find_face(Point::new(0.25, 0.5));
        assert_ne!(upper_triangle, sub.unbounded_face());
        assert!(matches!(locate_brute_force(&sub, Point::new(0.25, 0.5)), Location::Face(f) if f == upper_triangle));
    }

    /// Spec §8, scenario 3.
    #[test]
    fn scenario_nested_squares() {
        let outer = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let inner = vec![
            Point::new(3.0, 3.0),
            Point::new(7.0, 3.0),
            Point::new(7.0, 7.0),
            Point::new(3.0, 7.0),
        ];
        let (sub, _, _) = Subdivision::<(), (), ()>::from_polygons(&[outer, inner], 1e-9).unwrap();
        sub.validate().unwrap();

        assert_eq!(sub.nr_faces(), 3);

        let inner_face = sub.find_face(Point::new(5.0, 5.0));
        assert_ne!(inner_face, sub.unbounded_face());
        assert!(matches!(locate_brute_force(&sub, Point::new(5.0, 5.0)), Location::Face(f) if f == inner_face));

        let outer_face = sub
            .faces
            .keys()
            .find(|&f| f != sub.unbounded_face() && f != inner_face)
            .expect("an outer annulus face exists");
        assert_eq!(sub.inner_edges(outer_face).len(), 4);
    }

    /// Spec §8, scenario 4.
    #[test]
    fn scenario_overlay_crossing_segments() {
        let s1 = Subdivision::<(), (), ()>::from_segments(&[(Point::new(0.0, 0.0), Point::new(4.0, 0.0))], 0.0).unwrap().0;
        let s2 = Subdivision::<(), (), ()>::from_segments(&[(Point::new(2.0, -2.0), Point::new(2.0, 2.0))], 0.0).unwrap().0;

        let (merged, provenance) = overlay(&s1, &s2).unwrap();
        merged.validate().unwrap();

        assert_eq!(merged.nr_verts(), 5);
        assert!(merged.find_vertex(Point::new(2.0, 0.0)).is_some());
        assert_eq!(merged.nr_edges(), 8);
        assert_eq!(merged.nr_faces(), 1);

        let entry = provenance.get(&merged.unbounded_face()).expect("unbounded face has provenance");
        assert_eq!(entry.s1_face, s1.unbounded_face());
        assert_eq!(entry.s2_face, s2.unbounded_face());
    }

    /// Spec §8, scenario 5: overlay of two axis-aligned squares sharing a
    /// corner region — every resulting face's provenance pair identifies
    /// which operand(s) contain it.
    #[test]
    fn scenario_overlay_corner_sharing_squares() {
        let square_a = vec![vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ]];
        let square_b = vec![vec![
            Point::new(2.0, 2.0),
            Point::new(6.0, 2.0),
            Point::new(6.0, 6.0),
            Point::new(2.0, 6.0),
        ]];
        let s1 = Subdivision::<(), (), ()>::from_polygons(&square_a, 1e-9).unwrap().0;
        let s2 = Subdivision::<(), (), ()>::from_polygons(&square_b, 1e-9).unwrap().0;

        let (merged, provenance) = overlay(&s1, &s2).unwrap();
        merged.validate().unwrap();

        // The shared 2x2 interior maps to (s1.inner, s2.inner).
        let shared_face = merged.find_face(Point::new(3.0, 3.0));
        let shared_entry = provenance.get(&shared_face).unwrap();
        assert_ne!(shared_entry.s1_face, s1.unbounded_face());
        assert_ne!(shared_entry.s2_face, s2.unbounded_face());

        // A point only inside square A maps to (s1.inner, s2.unbounded).
        let a_only_face = merged.find_face(Point::new(1.0, 1.0));
        let a_only_entry = provenance.get(&a_only_face).unwrap();
        assert_ne!(a_only_entry.s1_face, s1.unbounded_face());
        assert_eq!(a_only_entry.s2_face, s2.unbounded_face());

        // A point only inside square B maps to (s1.unbounded, s2.inner).
        let b_only_face = merged.find_face(Point::new(5.0, 5.0));
        let b_only_entry = provenance.get(&b_only_face).unwrap();
        assert_eq!(b_only_entry.s1_face, s1.unbounded_face());
        assert_ne!(b_only_entry.s2_face, s2.unbounded_face());
    }

    /// Spec §8, scenario 6: the trapezoidal map agrees with the
    /// brute-force locator on 20 sample points over the nested-squares
    /// arrangement.
    #[test]
    fn scenario_trapezoidal_matches_brute_force() {
        let outer = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let inner = vec![
            Point::new(3.0, 3.0),
            Point::new(7.0, 3.0),
            Point::new(7.0, 7.0),
            Point::new(3.0, 7.0),
        ];
        let (sub, _, _) = Subdivision::<(), (), ()>::from_polygons(&[outer, inner], 1e-9).unwrap();
        let map = TrapezoidalMap::build(&sub, false).unwrap();

        // 20 random query points spread across and beyond both squares, per
        // spec §8 scenario 6. Drawn from `rand` (already load-bearing for
        // the trapezoidal map's own edge shuffle, see `src/trapezoidal.rs`)
        // rather than a fixed seed, so the assertion exercises genuinely
        // arbitrary coordinates each run instead of only one fixed diagonal.
        let mut rng = rand::rng();
        let samples: Vec<Point> = (0..20)
            .map(|_| Point::new(rng.random_range(-2.0..12.0), rng.random_range(-2.0..12.0)))
            .collect();

        for p in samples {
            assert_eq!(map.find(p), locate_brute_force(&sub, p), "mismatch at {p:?}");
        }
    }

    /// Spec §8 round-trip laws.
    #[test]
    fn round_trip_build_lines_and_polygons() {
        let segments = vec![
            (Point::new(0.0, 0.0), Point::new(4.0, 0.0)),
            (Point::new(4.0, 0.0), Point::new(2.0, 3.0)),
            (Point::new(2.0, 3.0), Point::new(0.0, 0.0)),
        ];
        let (sub, _, _, _) = Subdivision::<(), (), ()>::from_segments(&segments, 1e-9).unwrap();
        let lines = sub.to_lines();
        assert_eq!(lines.len(), segments.len());

        let square = vec![vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ]];
        let (poly_sub, _, _) = Subdivision::<(), (), ()>::from_polygons(&square, 1e-9).unwrap();
        let polygons = poly_sub.to_polygons();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].len(), 4);
    }

    /// Spec §8: `addEdge` followed by `removeEdge` restores the original
    /// structure; `clone(S).structureEquals(S)`; `overlay(S, empty)`
    /// yields `S` up to face renumbering.
    #[test]
    fn round_trip_add_remove_clone_and_overlay_identity() {
        let segments = vec![
            (Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            (Point::new(1.0, 0.0), Point::new(1.0, 1.0)),
            (Point::new(1.0, 1.0), Point::new(0.0, 1.0)),
            (Point::new(0.0, 1.0), Point::new(0.0, 0.0)),
        ];
        let (mut sub, _, _, _) = Subdivision::<(), (), ()>::from_segments(&segments, 0.0).unwrap();
        let before = sub.clone();
        assert!(before.structure_equals(&sub));

        let added = sub.add_edge(Point::new(0.0, 0.0), Point::new(1.0, 1.0)).unwrap();
        assert!(!before.structure_equals(&sub));
        assert!(sub.remove_edge(added));
        assert!(before.structure_equals(&sub));
        sub.validate().unwrap();

        let empty = Subdivision::<(), (), ()>::new(sub.epsilon().max(0.0));
        let (overlaid, _) = overlay(&sub, &empty).unwrap();
        assert_eq!(overlaid.nr_edges(), sub.nr_edges());
        assert_eq!(overlaid.nr_faces(), sub.nr_faces());
    }

    /// Spec §8 boundary behaviors, beyond what `builder.rs` already covers.
    #[test]
    fn boundary_crossing_edge_rejected() {
        let segments = vec![
            (Point::new(0.0, 0.0), Point::new(4.0, 0.0)),
            (Point::new(4.0, 0.0), Point::new(4.0, 4.0)),
            (Point::new(4.0, 4.0), Point::new(0.0, 4.0)),
            (Point::new(0.0, 4.0), Point::new(0.0, 0.0)),
        ];
        let (mut sub, _, _, _) = Subdivision::<(), (), ()>::from_segments(&segments, 1e-9).unwrap();
        // A strict diagonal crossing another diagonal already present fails.
        assert!(sub.add_edge(Point::new(0.0, 0.0), Point::new(4.0, 4.0)).is_some());
        assert!(sub.add_edge(Point::new(4.0, 0.0), Point::new(0.0, 4.0)).is_none());
    }

    /// Spec §6: the subdivision is storable via ordinary object-graph
    /// serialization, matching the teacher's own `serde_json` round-trip
    /// of `Douconel` in its `lib.rs` test suite.
    #[test]
    fn serialize() {
        let outer = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let inner = vec![
            Point::new(3.0, 3.0),
            Point::new(7.0, 3.0),
            Point::new(7.0, 7.0),
            Point::new(3.0, 7.0),
        ];
        let (sub, _, _) = Subdivision::<(), (), ()>::from_polygons(&[outer, inner], 1e-9).unwrap();

        let serialized = serde_json::to_string(&sub);
        assert!(serialized.is_ok(), "{:?}", serialized.unwrap());

        if let Ok(serialized) = serialized {
            let deserialized = serde_json::from_str::<Subdivision<(), (), ()>>(&serialized);
            assert!(deserialized.is_ok(), "{deserialized:?}");
            if let Ok(deserialized) = deserialized {
                assert_eq!(sub.nr_verts(), deserialized.nr_verts());
                assert_eq!(sub.nr_edges(), deserialized.nr_edges());
                assert_eq!(sub.nr_faces(), deserialized.nr_faces());
                assert!(sub.structure_equals(&deserialized));
            }
        }
    }
}
