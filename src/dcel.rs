//! The doubly-connected edge list store (spec §3, §4.B).
//!
//! Realizes design note §9's preferred strategy for a systems language: an
//! arena of half-edges/vertices/faces with stable, generational keys
//! (`slotmap`, already a teacher dependency) rather than raw pointers or
//! `Rc`/`RefCell` cycles. Mirrors the teacher's `Douconel<V, E, F>` generic
//! shape, except the per-vertex payload is the spec's concrete `Point`
//! rather than an optional trait-provided position.

use std::fmt::Debug;

use bimap::BiHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, SubdivisionError};
use crate::geometry::{self, Axis, Point};

new_key_type! {
    pub struct VertID;
    pub struct EdgeID;
    pub struct FaceID;
}

pub type VertMap = BiHashMap<usize, VertID>;
pub type EdgeMap = BiHashMap<usize, EdgeID>;
pub type FaceMap = BiHashMap<usize, FaceID>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vertex<VData> {
    pub position: Point,
    pub(crate) rep: Option<EdgeID>,
    pub data: VData,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HalfEdge<EData> {
    pub(crate) origin: VertID,
    pub(crate) twin: EdgeID,
    pub(crate) next: EdgeID,
    pub(crate) previous: EdgeID,
    pub(crate) face: FaceID,
    pub data: EData,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Face<FData> {
    pub(crate) outer: Option<EdgeID>,
    pub(crate) inner: Vec<EdgeID>,
    pub data: FData,
}

impl<FData: Default> Default for Face<FData> {
    fn default() -> Self {
        Self { outer: None, inner: Vec::new(), data: FData::default() }
    }
}

/// A connected arrangement of non-crossing straight segments and the faces
/// they induce (spec §3). Generic over optional per-element payloads,
/// defaulting to `()`, exactly like the teacher's `Douconel<V, E, F>`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subdivision<VData = (), EData = (), FData = ()> {
    pub(crate) verts: SlotMap<VertID, Vertex<VData>>,
    pub(crate) edges: SlotMap<EdgeID, HalfEdge<EData>>,
    pub(crate) faces: SlotMap<FaceID, Face<FData>>,
    /// Kept sorted by `comparator` + `epsilon`; a plain `Vec` because a
    /// `BTreeMap` cannot host a non-transitive epsilon order.
    pub(crate) sorted_verts: Vec<(Point, VertID)>,
    pub(crate) epsilon: f64,
    pub(crate) comparator: Axis,
    pub(crate) unbounded: FaceID,
}

impl<VData: Default + Clone + Debug, EData: Default + Clone + Debug, FData: Default + Clone + Debug> Default
    for Subdivision<VData, EData, FData>
{
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<VData: Default + Clone + Debug, EData: Default + Clone + Debug, FData: Default + Clone + Debug>
    Subdivision<VData, EData, FData>
{
    /// Creates an empty subdivision with a single unbounded face (key-analog
    /// 0) and the given epsilon. `epsilon` must be non-negative and is
    /// immutable once any vertex exists (spec §3, §7).
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        let mut faces = SlotMap::with_key();
        let unbounded = faces.insert(Face::default());
        Self {
            verts: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            faces,
            sorted_verts: Vec::new(),
            epsilon,
            comparator: Axis::Y,
            unbounded,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Sets epsilon; only legal while no vertex has been inserted yet.
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        if !self.verts.is_empty() {
            return Err(SubdivisionError::property(
                "epsilon cannot change after vertices exist",
            ));
        }
        if epsilon < 0.0 {
            return Err(SubdivisionError::argument("epsilon must be non-negative"));
        }
        self.epsilon = epsilon;
        Ok(())
    }

    pub fn set_comparator(&mut self, axis: Axis) -> Result<()> {
        if !self.verts.is_empty() {
            return Err(SubdivisionError::property(
                "comparator cannot change after vertices exist",
            ));
        }
        self.comparator = axis;
        Ok(())
    }

    pub fn unbounded_face(&self) -> FaceID {
        self.unbounded
    }

    pub fn nr_verts(&self) -> usize {
        self.verts.len()
    }

    pub fn nr_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn nr_faces(&self) -> usize {
        self.faces.len()
    }

    // -- basic accessors, half-edge chain ------------------------------

    pub fn twin(&self, e: EdgeID) -> EdgeID {
        self.edges[e].twin
    }

    pub fn next(&self, e: EdgeID) -> EdgeID {
        self.edges[e].next
    }

    pub fn previous(&self, e: EdgeID) -> EdgeID {
        self.edges[e].previous
    }

    pub fn root(&self, e: EdgeID) -> VertID {
        self.edges[e].origin
    }

    pub fn face(&self, e: EdgeID) -> FaceID {
        self.edges[e].face
    }

    pub fn destination(&self, e: EdgeID) -> VertID {
        self.root(self.twin(e))
    }

    pub fn endpoints(&self, e: EdgeID) -> (VertID, VertID) {
        (self.root(e), self.destination(e))
    }

    pub fn position(&self, v: VertID) -> Point {
        self.verts[v].position
    }

    pub fn representative(&self, v: VertID) -> Option<EdgeID> {
        self.verts[v].rep
    }

    /// All half-edges on the boundary cycle containing `start`, in `next`
    /// order, stopping when the cycle returns to `start`.
    #[must_use]
    pub fn cycle(&self, start: EdgeID) -> Vec<EdgeID> {
        let mut out = vec![start];
        let mut cur = self.next(start);
        while cur != start {
            out.push(cur);
            cur = self.next(cur);
        }
        out
    }

    /// Outer-boundary half-edges of `face`, or empty if `face` is unbounded.
    #[must_use]
    pub fn outer_edges(&self, face: FaceID) -> Vec<EdgeID> {
        self.faces[face].outer.map(|e| self.cycle(e)).unwrap_or_default()
    }

    /// Half-edges of every inner boundary (hole) of `face`.
    #[must_use]
    pub fn inner_edges(&self, face: FaceID) -> Vec<EdgeID> {
        self.faces[face]
            .inner
            .iter()
            .flat_map(|&e| self.cycle(e))
            .collect()
    }

    /// All boundary half-edges (outer + every hole) of `face`.
    #[must_use]
    pub fn boundary_edges(&self, face: FaceID) -> Vec<EdgeID> {
        let mut out = self.outer_edges(face);
        out.extend(self.inner_edges(face));
        out
    }

    /// Vertices of `face`'s outer boundary, one per corner, in cycle order.
    #[must_use]
    pub fn corners(&self, face: FaceID) -> Vec<VertID> {
        self.outer_edges(face).into_iter().map(|e| self.root(e)).collect()
    }

    /// Outgoing half-edges at `v`, ordered clockwise (following
    /// `twin.next`), spec §3's vertex-chain invariant.
    #[must_use]
    pub fn outgoing(&self, v: VertID) -> Vec<EdgeID> {
        let Some(start) = self.representative(v) else { return Vec::new() };
        let mut out = vec![start];
        let mut cur = self.next(self.twin(start));
        while cur != start {
            out.push(cur);
            cur = self.next(self.twin(cur));
        }
        out
    }

    /// Incident faces across an edge: `(face(e), face(twin(e)))`.
    pub fn faces_of(&self, e: EdgeID) -> (FaceID, FaceID) {
        (self.face(e), self.face(self.twin(e)))
    }

    /// Signed area (shoelace) of a face's outer cycle. Positive for
    /// counter-clockwise (mathematical orientation) outer cycles.
    #[must_use]
    pub fn outer_area(&self, face: FaceID) -> f64 {
        let verts = self.corners(face);
        signed_area(&verts.iter().map(|&v| self.position(v)).collect::<Vec<_>>())
    }

    // -- lookup ----------------------------------------------------------

    /// Locates a half-edge by origin/destination vertex via the
    /// twin/next chain at `origin` (spec §4.B): O(log V + deg(origin)).
    #[must_use]
    pub fn find_edge(&self, origin: VertID, destination: VertID) -> Option<EdgeID> {
        self.outgoing(origin).into_iter().find(|&e| self.destination(e) == destination)
    }

    /// Finds the vertex (if any) at `point`, per the configured comparator
    /// and epsilon.
    #[must_use]
    pub fn find_vertex(&self, point: Point) -> Option<VertID> {
        let idx = self
            .sorted_verts
            .binary_search_by(|(p, _)| geometry::compare_epsilon(self.comparator, *p, point, self.epsilon));
        idx.ok().map(|i| self.sorted_verts[i].1)
    }

    /// Brute-force face lookup (spec §4.B): the bounded face whose outer
    /// boundary contains `point`, breaking ties on nested faces by
    /// preferring the smaller outer-cycle area. Falls back to the
    /// unbounded face.
    #[must_use]
    pub fn find_face(&self, point: Point) -> FaceID {
        let mut best: Option<(FaceID, f64)> = None;
        for (face, _) in self.faces.iter() {
            if face == self.unbounded {
                continue;
            }
            let verts = self.corners(face);
            let poly: Vec<Point> = verts.iter().map(|&v| self.position(v)).collect();
            if poly.len() < 3 {
                continue;
            }
            let loc = geometry::point_in_polygon(&poly, point, self.epsilon);
            if matches!(
                loc,
                geometry::PolygonLocation::Inside | geometry::PolygonLocation::Edge | geometry::PolygonLocation::Vertex
            ) {
                let area = self.outer_area(face).abs();
                match best {
                    Some((_, best_area)) if best_area <= area => {}
                    _ => best = Some((face, area)),
                }
            }
        }
        best.map(|(f, _)| f).unwrap_or(self.unbounded)
    }

    /// Traverses `points` as a closed polygon, one half-edge per consecutive
    /// pair, eliminating sides whose incident face changes; when `verify`
    /// is set, confirms the surviving candidate's outer boundary forms the
    /// same cycle (spec §4.B).
    #[must_use]
    pub fn find_face_by_polygon(&self, points: &[VertID], verify: bool) -> Option<FaceID> {
        if points.len() < 3 {
            return None;
        }
        let mut candidates: Option<std::collections::HashSet<FaceID>> = None;
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            let edge = self.find_edge(a, b)?;
            let this_face: std::collections::HashSet<FaceID> = [self.face(edge)].into_iter().collect();
            candidates = Some(match candidates {
                None => this_face,
                Some(prev) => prev.intersection(&this_face).copied().collect(),
            });
        }
        let face = candidates?.into_iter().next()?;
        if verify {
            let cycle_verts: Vec<VertID> = self.corners(face);
            let matches_rotation = (0..cycle_verts.len()).any(|offset| {
                (0..cycle_verts.len()).all(|i| cycle_verts[(i + offset) % cycle_verts.len()] == points[i % points.len()])
            });
            if !matches_rotation {
                return None;
            }
        }
        Some(face)
    }

    /// Nearest vertex to `point` under the configured comparator (spec
    /// §4.B): returns the predecessor/successor in sorted order closest
    /// by Euclidean distance, which is what the crate exposes beyond pure
    /// comparator-adjacency.
    #[must_use]
    pub fn find_nearest_vertex(&self, point: Point) -> Option<VertID> {
        self.sorted_verts
            .iter()
            .min_by(|(a, _), (b, _)| {
                OrderedFloatDistance(a.distance(&point)).cmp(&OrderedFloatDistance(b.distance(&point)))
            })
            .map(|(_, id)| *id)
    }

    /// Nearest edge to `point`: scans every half-edge's boundary segment
    /// and returns the closest by point-to-segment distance (spec §4.B).
    #[must_use]
    pub fn find_nearest_edge(&self, point: Point) -> Option<EdgeID> {
        let mut best: Option<(EdgeID, f64)> = None;
        for (id, _) in self.edges.iter() {
            let (u, v) = self.endpoints(id);
            let d = point_segment_distance(self.position(u), self.position(v), point);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((id, d));
            }
        }
        best.map(|(e, _)| e)
    }

    /// Deterministic ordered traversal of all half-edges grouped per
    /// vertex, each group arranged clockwise (spec §4.B).
    #[must_use]
    pub fn edges_by_origin(&self) -> Vec<(VertID, Vec<EdgeID>)> {
        self.sorted_verts.iter().map(|&(_, v)| (v, self.outgoing(v))).collect()
    }

    // -- invariant checking (spec §8) ------------------------------------

    /// Self-check asserting every invariant in spec §3/§8. Test-only in
    /// spirit (the teacher's own diagnostics, `mem.rs::debug_print`, are
    /// likewise only exercised from tests) but left `pub` so downstream
    /// integration tests can call it directly.
    pub fn validate(&self) -> Result<()> {
        if self.edges.len() % 2 != 0 {
            return Err(SubdivisionError::internal("odd number of half-edges"));
        }
        for (id, e) in self.edges.iter() {
            if self.edges[e.twin].twin != id {
                return Err(SubdivisionError::internal(format!("{id:?}.twin.twin != {id:?}")));
            }
            if self.edges[e.next].previous != id {
                return Err(SubdivisionError::internal(format!("{id:?}.next.previous != {id:?}")));
            }
            if self.edges[e.previous].next != id {
                return Err(SubdivisionError::internal(format!("{id:?}.previous.next != {id:?}")));
            }
            if self.edges[e.twin].origin != self.edges[e.next].origin {
                return Err(SubdivisionError::internal(format!("{id:?}.twin.origin != {id:?}.next.origin")));
            }
        }
        for (vid, v) in self.verts.iter() {
            let Some(rep) = v.rep else {
                return Err(SubdivisionError::internal(format!("{vid:?} has no incident half-edge")));
            };
            if self.root(rep) != vid {
                return Err(SubdivisionError::internal(format!("{vid:?}.rep does not originate at {vid:?}")));
            }
        }
        for (fid, f) in self.faces.iter() {
            if fid == self.unbounded && f.outer.is_some() {
                return Err(SubdivisionError::internal("unbounded face has an outer boundary"));
            }
            if fid != self.unbounded && f.outer.is_none() {
                return Err(SubdivisionError::internal(format!("{fid:?} is bounded but has no outer boundary")));
            }
            if let Some(outer) = f.outer {
                for e in self.cycle(outer) {
                    if self.face(e) != fid {
                        return Err(SubdivisionError::internal(format!("edge in {fid:?}'s outer cycle points to a different face")));
                    }
                }
            }
            for &inner in &f.inner {
                for e in self.cycle(inner) {
                    if self.face(e) != fid {
                        return Err(SubdivisionError::internal(format!("edge in {fid:?}'s inner cycle points to a different face")));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn debug_dump(&self) -> String {
        format!(
            "Subdivision {{ verts: {}, half-edges: {}, faces: {}, epsilon: {} }}",
            self.nr_verts(),
            self.nr_edges(),
            self.nr_faces(),
            self.epsilon
        )
    }

    /// Fresh `usize -> EdgeID` numbering in current arena iteration order
    /// (spec §5, §8's "key equals index after renumbering"). Because
    /// `EdgeID` is a generational `slotmap` key rather than a raw index
    /// (design note §9(a)), "renumbering" here produces an external index
    /// map rather than mutating the arena keys themselves — the same
    /// `BiHashMap<usize, EdgeID>` shape the bulk constructors already
    /// return (see `DESIGN.md`).
    #[must_use]
    pub fn renumber_edges(&self) -> EdgeMap {
        let mut map = EdgeMap::new();
        for (idx, (id, _)) in self.edges.iter().enumerate() {
            map.insert(idx, id);
        }
        map
    }

    /// Fresh `usize -> FaceID` numbering, key 0 always the unbounded face
    /// (spec §3, §5).
    #[must_use]
    pub fn renumber_faces(&self) -> FaceMap {
        let mut map = FaceMap::new();
        map.insert(0, self.unbounded);
        let mut idx = 1;
        for (id, _) in self.faces.iter() {
            if id == self.unbounded {
                continue;
            }
            map.insert(idx, id);
            idx += 1;
        }
        map
    }

    /// Structural equality up to arena-key identity and face/cycle
    /// rotation (spec §8's round-trip laws, e.g. `addEdge` then
    /// `removeEdge` restores the original structure). Compares the sets
    /// of vertex positions, full-edge endpoint pairs, and per-face corner
    /// polygons (each up to rotation) rather than raw `VertID`/`EdgeID`
    /// values, since two independently-built subdivisions never share an
    /// arena.
    #[must_use]
    pub fn structure_equals(&self, other: &Self) -> bool {
        if self.nr_verts() != other.nr_verts() || self.nr_edges() != other.nr_edges() || self.nr_faces() != other.nr_faces() {
            return false;
        }

        let mut self_verts: Vec<(OrderedFloat<f64>, OrderedFloat<f64>)> =
            self.verts.values().map(|v| (OrderedFloat(v.position.x()), OrderedFloat(v.position.y()))).collect();
        let mut other_verts: Vec<(OrderedFloat<f64>, OrderedFloat<f64>)> =
            other.verts.values().map(|v| (OrderedFloat(v.position.x()), OrderedFloat(v.position.y()))).collect();
        self_verts.sort();
        other_verts.sort();
        if self_verts != other_verts {
            return false;
        }

        let edge_key = |sub: &Self, id: EdgeID| {
            let (u, w) = sub.endpoints(id);
            let pu = sub.position(u);
            let pw = sub.position(w);
            let a = (OrderedFloat(pu.x()), OrderedFloat(pu.y()));
            let b = (OrderedFloat(pw.x()), OrderedFloat(pw.y()));
            if a <= b { (a, b) } else { (b, a) }
        };
        let mut self_edges: Vec<_> = self.edges.keys().map(|id| edge_key(self, id)).collect();
        let mut other_edges: Vec<_> = other.edges.keys().map(|id| edge_key(other, id)).collect();
        self_edges.sort();
        other_edges.sort();
        if self_edges != other_edges {
            return false;
        }

        let face_key = |sub: &Self, id: FaceID| -> Vec<(OrderedFloat<f64>, OrderedFloat<f64>)> {
            sub.corners(id).into_iter().map(|v| {
                let p = sub.position(v);
                (OrderedFloat(p.x()), OrderedFloat(p.y()))
            }).collect()
        };
        let canonical_rotation = |poly: &[(OrderedFloat<f64>, OrderedFloat<f64>)]| -> Vec<(OrderedFloat<f64>, OrderedFloat<f64>)> {
            if poly.is_empty() {
                return Vec::new();
            }
            (0..poly.len())
                .map(|offset| (0..poly.len()).map(|i| poly[(i + offset) % poly.len()]).collect::<Vec<_>>())
                .min()
                .expect("non-empty")
        };
        let mut self_faces: Vec<_> = self
            .faces
            .keys()
            .filter(|&id| id != self.unbounded)
            .map(|id| canonical_rotation(&face_key(self, id)))
            .collect();
        let mut other_faces: Vec<_> = other
            .faces
            .keys()
            .filter(|&id| id != other.unbounded)
            .map(|id| canonical_rotation(&face_key(other, id)))
            .collect();
        self_faces.sort();
        other_faces.sort();
        self_faces == other_faces
    }

    // -- internal helpers used by builder/cycles/overlay -----------------

    pub(crate) fn insert_sorted_vertex(&mut self, position: Point, id: VertID) {
        let idx = self
            .sorted_verts
            .partition_point(|(p, _)| geometry::compare_epsilon(self.comparator, *p, position, self.epsilon) == std::cmp::Ordering::Less);
        self.sorted_verts.insert(idx, (position, id));
    }

    pub(crate) fn remove_sorted_vertex(&mut self, id: VertID) {
        self.sorted_verts.retain(|&(_, v)| v != id);
    }
}

struct OrderedFloatDistance(f64);
impl PartialEq for OrderedFloatDistance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for OrderedFloatDistance {}
impl PartialOrd for OrderedFloatDistance {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for OrderedFloatDistance {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
    }
}

#[must_use]
pub fn signed_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        sum += a.x() * b.y() - b.x() * a.y();
    }
    sum * 0.5
}

#[must_use]
pub fn point_segment_distance(a: Point, b: Point, p: Point) -> f64 {
    let (abx, aby) = b - a;
    let len2 = abx * abx + aby * aby;
    if len2 <= f64::EPSILON {
        return a.distance(&p);
    }
    let (apx, apy) = p - a;
    let t = ((apx * abx + apy * aby) / len2).clamp(0.0, 1.0);
    let proj = Point::new(a.x() + t * abx, a.y() + t * aby);
    proj.distance(&p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_subdivision_has_single_unbounded_face() {
        let sub = Subdivision::<(), (), ()>::new(1e-9);
        assert_eq!(sub.nr_faces(), 1);
        assert_eq!(sub.nr_verts(), 0);
        assert_eq!(sub.nr_edges(), 0);
    }

    #[test]
    fn epsilon_locked_after_first_vertex() {
        let mut sub = Subdivision::<(), (), ()>::new(0.0);
        let id = sub.verts.insert(Vertex { position: Point::new(0.0, 0.0), rep: None, data: () });
        sub.insert_sorted_vertex(Point::new(0.0, 0.0), id);
        assert!(sub.set_epsilon(1e-3).is_err());
    }
}
