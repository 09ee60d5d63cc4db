//! Subdivision overlay / geometric intersection (spec §4.E).
//!
//! Produces a new subdivision whose edges are the union of both operands
//! split at mutual crossings, together with a provenance map from each new
//! face back to the pair of faces (one per operand) that contained it.

use std::collections::HashMap;
use std::fmt::Debug;

use slotmap::SlotMap;

use crate::dcel::{Face, FaceID, Subdivision};
use crate::error::{Result, SubdivisionError};
use crate::geometry::{self, Point, Relation, SegLocation};

#[derive(Copy, Clone, Debug)]
pub struct ProvenanceEntry {
    pub s1_face: FaceID,
    pub s2_face: FaceID,
}

pub type ProvenanceMap = HashMap<FaceID, ProvenanceEntry>;

/// Computes the overlay of `s1` and `s2` (spec §4.E). Requires
/// `epsilon(s2) >= epsilon(s1)`; the internal sweep epsilon is
/// `max(epsilon(s1), 1e-10)` to guard against degenerate near-parallel
/// cases, per spec.
pub fn overlay<
    VData: Default + Clone + Debug,
    EData: Default + Clone + Debug,
    FData: Default + Clone + Debug,
>(
    s1: &Subdivision<VData, EData, FData>,
    s2: &Subdivision<VData, EData, FData>,
) -> Result<(Subdivision<VData, EData, FData>, ProvenanceMap)> {
    if s2.epsilon() < s1.epsilon() {
        return Err(SubdivisionError::argument("overlay requires epsilon(s2) >= epsilon(s1)"));
    }
    let sweep_epsilon = s1.epsilon().max(1e-10);

    // Step 1/2: clone S1's vertices and half-edges (not faces) into S. A
    // plain `.clone()` preserves every VertID/EdgeID exactly (spec §3's
    // key-preserving clone), so the old-edge -> original-S1-face map can be
    // read straight off `s1` before the faces are stripped from the copy.
    let mut edge_to_s1_face: HashMap<crate::dcel::EdgeID, FaceID> =
        s1.edges.iter().map(|(id, _)| (id, s1.face(id))).collect();
    let edge_to_s2_face: HashMap<crate::dcel::EdgeID, FaceID> = HashMap::new();

    let mut s = s1.clone();
    s.faces = SlotMap::with_key();
    s.unbounded = s.faces.insert(Face::default());
    let all_original: Vec<_> = s.edges.keys().collect();
    for id in all_original {
        s.edges[id].face = s.unbounded;
    }

    let mut edge_to_s2_face = edge_to_s2_face;

    // Step 3: insert S2's edges, recording duplicates instead of recreating
    // them, and collecting the freshly-created ones for pairwise comparison.
    let mut worklist = Vec::new();
    let mut visited_s2 = std::collections::HashSet::new();
    for (s2_edge, _) in s2.edges.iter() {
        if visited_s2.contains(&s2_edge) {
            continue;
        }
        visited_s2.insert(s2_edge);
        visited_s2.insert(s2.twin(s2_edge));

        let (u, v) = s2.endpoints(s2_edge);
        let pu = s2.position(u);
        let pv = s2.position(v);
        let va = match s.find_vertex(pu) {
            Some(id) => id,
            None => s.insert_fresh_vertex(pu),
        };
        let vb = match s.find_vertex(pv) {
            Some(id) => id,
            None => s.insert_fresh_vertex(pv),
        };

        if let Some(existing) = s.find_edge(va, vb) {
            edge_to_s2_face.insert(existing, s2.face(s2_edge));
            edge_to_s2_face.insert(s.twin(existing), s2.face(s2.twin(s2_edge)));
            continue;
        }
        if let Some(existing_rev) = s.find_edge(vb, va) {
            edge_to_s2_face.insert(existing_rev, s2.face(s2.twin(s2_edge)));
            edge_to_s2_face.insert(s.twin(existing_rev), s2.face(s2_edge));
            continue;
        }

        let (e, et) = s.splice_new_edge(va, vb);
        edge_to_s2_face.insert(e, s2.face(s2_edge));
        edge_to_s2_face.insert(et, s2.face(s2.twin(s2_edge)));
        worklist.push(e);
    }

    // Step 4: pairwise intersection of every newly-added S2 edge against
    // every S1-derived edge currently in S, splitting at crossings.
    while let Some(s2_edge) = worklist.pop() {
        if !s.edges.contains_key(s2_edge) {
            continue;
        }
        let (a0, a1) = s.endpoints(s2_edge);
        let p_a0 = s.position(a0);
        let p_a1 = s.position(a1);

        let candidates: Vec<_> = edge_to_s1_face.keys().copied().filter(|id| s.edges.contains_key(*id)).collect();
        for s1_edge in candidates {
            if !s.edges.contains_key(s2_edge) || s1_edge == s2_edge {
                continue;
            }
            let (b0, b1) = s.endpoints(s1_edge);
            let pb0 = s.position(b0);
            let pb1 = s.position(b1);
            let result = geometry::intersect(p_a0, p_a1, pb0, pb1, sweep_epsilon);

            match result.relation {
                Relation::Divergent if result.exists && result.first == SegLocation::Between => {
                    let point = result.shared.expect("divergent intersection has a point");
                    let (_, new_half) = s.split_edge_at(s1_edge, point);
                    if let Some(&f) = edge_to_s1_face.get(&s1_edge) {
                        edge_to_s1_face.insert(new_half, f);
                    }
                    if let Some(&f) = edge_to_s2_face.get(&s1_edge) {
                        edge_to_s2_face.insert(new_half, f);
                    }

                    if result.second == SegLocation::Between {
                        let (_, new_half2) = s.split_edge_at(s2_edge, point);
                        if let Some(&f) = edge_to_s2_face.get(&s2_edge) {
                            edge_to_s2_face.insert(new_half2, f);
                        }
                        if let Some(&f) = edge_to_s1_face.get(&s2_edge) {
                            edge_to_s1_face.insert(new_half2, f);
                        }
                        worklist.push(new_half2);
                    }
                }
                Relation::Collinear if result.exists && is_congruent(p_a0, p_a1, pb0, pb1, sweep_epsilon) => {
                    return Err(SubdivisionError::internal(
                        "overlay encountered congruent collinear edges across both operands",
                    ));
                }
                _ => {}
            }
        }
    }

    // Step 5: rebuild faces over the full merged edge set.
    let all_edges: Vec<_> = s.edges.keys().collect();
    let unbounded = s.unbounded_face();
    s.assign_faces_from_cycles(&all_edges, unbounded);

    // Step 6: provenance, by locating a representative interior point of
    // each new face (its outer-cycle centroid) against both operands.
    let mut provenance = ProvenanceMap::new();
    for (face, _) in s.faces.iter() {
        let corners = s.corners(face);
        let point = if corners.is_empty() {
            Point::new(0.0, 0.0)
        } else {
            let (sx, sy) = corners.iter().fold((0.0, 0.0), |(sx, sy), &v| {
                let p = s.position(v);
                (sx + p.x(), sy + p.y())
            });
            Point::new(sx / corners.len() as f64, sy / corners.len() as f64)
        };
        let s1_face = s1.find_face(point);
        let s2_face = s2.find_face(point);
        provenance.insert(face, ProvenanceEntry { s1_face, s2_face });
    }

    Ok((s, provenance))
}

fn is_congruent(a0: Point, a1: Point, b0: Point, b1: Point, epsilon: f64) -> bool {
    let same = |p: Point, q: Point| geometry::near(p.x(), q.x(), epsilon) && geometry::near(p.y(), q.y(), epsilon);
    (same(a0, b0) && same(a1, b1)) || (same(a0, b1) && same(a1, b0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcel::Subdivision;

    #[test]
    fn overlay_of_crossing_segments() {
        let s1 = Subdivision::<(), (), ()>::from_segments(
            &[(Point::new(0.0, 0.0), Point::new(4.0, 0.0))],
            0.0,
        )
        .unwrap()
        .0;
        let s2 = Subdivision::<(), (), ()>::from_segments(
            &[(Point::new(2.0, -2.0), Point::new(2.0, 2.0))],
            0.0,
        )
        .unwrap()
        .0;

        let (merged, provenance) = overlay(&s1, &s2).unwrap();
        assert_eq!(merged.nr_verts(), 5);
        assert_eq!(merged.nr_edges(), 8);
        assert_eq!(merged.nr_faces(), 1);
        assert_eq!(provenance.len(), 1);
    }

    #[test]
    fn overlay_requires_monotone_epsilon() {
        let s1 = Subdivision::<(), (), ()>::from_segments(&[(Point::new(0.0, 0.0), Point::new(1.0, 0.0))], 1e-3).unwrap().0;
        let s2 = Subdivision::<(), (), ()>::from_segments(&[(Point::new(0.0, 0.0), Point::new(1.0, 0.0))], 0.0).unwrap().0;
        assert!(overlay(&s1, &s2).is_err());
    }
}
