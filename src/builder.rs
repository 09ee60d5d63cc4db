//! Subdivision builder (spec §4.D): bulk construction from line segments or
//! polygons, and the incremental edit operations (`add_edge`, `remove_edge`,
//! `split_edge`, `move_vertex`, `remove_vertex`).
//!
//! Grounded in the teacher's extension-impl style (`douconel_extended.rs`,
//! `douconel_obj.rs`): bulk constructors return `(Self, VertMap, ...)` so
//! callers can map their own input indices back onto the arena's keys.

use std::collections::HashMap;
use std::fmt::Debug;

use crate::cycles::{self, CycleForest};
use crate::dcel::{EdgeID, EdgeMap, Face, FaceMap, HalfEdge, Subdivision, Vertex, VertID, VertMap};
use crate::error::{Result, SubdivisionError};
use crate::geometry::{self, Point, Relation, SegLocation};

pub enum SplitOutcome {
    Split { vertex: VertID, edge: EdgeID },
    Deleted,
}

impl<
        VData: Default + Clone + Debug,
        EData: Default + Clone + Debug,
        FData: Default + Clone + Debug,
    > Subdivision<VData, EData, FData>
{
    // -----------------------------------------------------------------
    // Bulk construction (spec §4.D)
    // -----------------------------------------------------------------

    /// Builds a subdivision from a soup of oriented segments. Duplicate
    /// endpoints (within `epsilon`) are unified into a single vertex.
    pub fn from_segments(
        segments: &[(Point, Point)],
        epsilon: f64,
    ) -> Result<(Self, VertMap, EdgeMap, FaceMap)> {
        if segments.is_empty() {
            return Err(SubdivisionError::argument("from_segments requires at least one segment"));
        }
        let mut sub = Self::new(epsilon);
        let mut vert_map = VertMap::new();
        let mut edge_map = EdgeMap::new();

        let mut touched_edges: Vec<EdgeID> = Vec::new();
        for (idx, &(a, b)) in segments.iter().enumerate() {
            if geometry::near(a.x(), b.x(), epsilon) && geometry::near(a.y(), b.y(), epsilon) {
                return Err(SubdivisionError::argument(format!("segment {idx} has coincident endpoints")));
            }
            let va = sub.get_or_create_vertex(a, &mut vert_map);
            let vb = sub.get_or_create_vertex(b, &mut vert_map);
            let (e, _) = sub.splice_new_edge(va, vb);
            edge_map.insert(idx, e);
            touched_edges.push(e);
            touched_edges.push(sub.twin(e));
        }

        sub.assign_faces_from_cycles(&touched_edges, sub.unbounded_face());
        let face_map = sub.default_face_map();
        Ok((sub, vert_map, edge_map, face_map))
    }

    /// Builds a subdivision from a set of polygon boundaries (one point
    /// array per polygon, vertices in either orientation). Equivalent to
    /// flattening each polygon into its consecutive-vertex segments and
    /// calling [`Subdivision::from_segments`].
    pub fn from_polygons(polygons: &[Vec<Point>], epsilon: f64) -> Result<(Self, VertMap, FaceMap)> {
        if polygons.is_empty() {
            return Err(SubdivisionError::argument("from_polygons requires at least one polygon"));
        }
        let mut segments = Vec::new();
        for (idx, poly) in polygons.iter().enumerate() {
            if poly.len() < 3 {
                return Err(SubdivisionError::argument(format!("polygon {idx} has fewer than 3 vertices")));
            }
            for i in 0..poly.len() {
                let a = poly[i];
                let b = poly[(i + 1) % poly.len()];
                if geometry::near(a.x(), b.x(), epsilon) && geometry::near(a.y(), b.y(), epsilon) {
                    return Err(SubdivisionError::argument(format!("polygon {idx} has consecutive duplicate vertices")));
                }
                segments.push((a, b));
            }
        }
        let (sub, vert_map, _edge_map, _face_map) = Self::from_segments(&segments, epsilon)?;

        let mut face_map = FaceMap::new();
        for (idx, poly) in polygons.iter().enumerate() {
            let verts: Vec<VertID> = poly
                .iter()
                .map(|&p| sub.find_vertex(p).expect("vertex inserted above"))
                .collect();
            if let Some(face) = sub.find_face_by_polygon(&verts, false) {
                face_map.insert(idx, face);
            }
        }
        Ok((sub, vert_map, face_map))
    }

    /// Exports the subdivision's bounded faces back into their outer-cycle
    /// point sequences, the inverse of [`Subdivision::from_polygons`]
    /// (up to rotation/orientation per face, spec §8).
    #[must_use]
    pub fn to_polygons(&self) -> Vec<Vec<Point>> {
        self.faces
            .iter()
            .filter(|&(id, _)| id != self.unbounded_face())
            .map(|(id, _)| self.corners(id).into_iter().map(|v| self.position(v)).collect())
            .collect()
    }

    /// Exports every full edge as an (unordered) pair of endpoints, the
    /// inverse of [`Subdivision::from_segments`] (spec §8).
    #[must_use]
    pub fn to_lines(&self) -> Vec<(Point, Point)> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for (id, _) in self.edges.iter() {
            let t = self.twin(id);
            if seen.contains(&t) {
                continue;
            }
            seen.insert(id);
            out.push((self.position(self.root(id)), self.position(self.destination(id))));
        }
        out
    }

    fn default_face_map(&self) -> FaceMap {
        let mut map = FaceMap::new();
        for (idx, (id, _)) in self.faces.iter().enumerate() {
            map.insert(idx, id);
        }
        map
    }

    fn get_or_create_vertex(&mut self, point: Point, map: &mut VertMap) -> VertID {
        if let Some(existing) = self.find_vertex(point) {
            existing
        } else {
            let id = self.verts.insert(Vertex { position: point, rep: None, data: VData::default() });
            self.insert_sorted_vertex(point, id);
            map.insert(map.len(), id);
            id
        }
    }

    // -----------------------------------------------------------------
    // Vertex-chain insertion (spec §4.D, critical subroutine)
    // -----------------------------------------------------------------

    /// Creates a fresh half-edge pair between `from` and `to` and splices
    /// each direction into its origin vertex's cyclic rotation so angular
    /// (CCW) order is preserved. Returns `(from->to, to->from)`.
    pub(crate) fn splice_new_edge(&mut self, from: VertID, to: VertID) -> (EdgeID, EdgeID) {
        let e = self.edges.insert(HalfEdge {
            origin: from,
            twin: EdgeID::default(),
            next: EdgeID::default(),
            previous: EdgeID::default(),
            face: self.unbounded_face(),
            data: EData::default(),
        });
        let t = self.edges.insert(HalfEdge {
            origin: to,
            twin: e,
            next: EdgeID::default(),
            previous: EdgeID::default(),
            face: self.unbounded_face(),
            data: EData::default(),
        });
        self.edges[e].twin = t;

        self.splice_outgoing(from, e);
        self.splice_outgoing(to, t);

        (e, t)
    }

    /// Inserts outgoing half-edge `new_out` into `v`'s rotational order.
    fn splice_outgoing(&mut self, v: VertID, new_out: EdgeID) {
        let Some(_rep) = self.representative(v) else {
            // first edge at this (possibly fresh) vertex: trivial 1-cycle
            self.edges[new_out].next = self.twin(new_out);
            self.edges[self.twin(new_out)].previous = new_out;
            self.verts[v].rep = Some(new_out);
            return;
        };

        let existing = self.outgoing(v);
        if existing.len() == 1 {
            // degree becomes 2: form the trivial 2-cycle directly.
            let other = existing[0];
            self.edges[self.twin(other)].next = new_out;
            self.edges[new_out].previous = self.twin(other);
            self.edges[self.twin(new_out)].next = other;
            self.edges[other].previous = self.twin(new_out);
            return;
        }

        let angle_of = |e: EdgeID, sub: &Self| -> f64 {
            let (dx, dy) = sub.position(sub.destination(e)) - sub.position(sub.root(e));
            dy.atan2(dx)
        };
        let new_angle = angle_of(new_out, self);

        // `existing` is already in ascending-angle (CCW) order by invariant.
        let mut insert_at = existing.len();
        for (i, &e) in existing.iter().enumerate() {
            if angle_of(e, self) > new_angle {
                insert_at = i;
                break;
            }
        }
        let succ = existing[insert_at % existing.len()];
        let pred = existing[(insert_at + existing.len() - 1) % existing.len()];

        let pred_twin = self.twin(pred);
        self.edges[pred_twin].next = new_out;
        self.edges[new_out].previous = pred_twin;
        let new_twin = self.twin(new_out);
        self.edges[new_twin].next = succ;
        self.edges[succ].previous = new_twin;
    }

    /// Inverse of [`Subdivision::splice_outgoing`]: removes `out` from `v`'s
    /// rotational order. Returns `true` if `v` is left with no incident
    /// edges (and should be deleted by the caller).
    fn unsplice_outgoing(&mut self, v: VertID, out: EdgeID) -> bool {
        let out_twin = self.twin(out);
        if self.next(out_twin) == out {
            // was the only outgoing edge at v
            return true;
        }
        let pred = {
            // the edge whose twin's `next` is `out`
            self.previous(out)
        };
        let succ = self.next(out_twin);
        self.edges[pred].next = succ;
        self.edges[succ].previous = pred;
        if self.representative(v) == Some(out) {
            self.verts[v].rep = Some(succ);
        }
        false
    }

    // -----------------------------------------------------------------
    // Face (re)assignment via the cycle finder (spec §4.C, §4.D)
    // -----------------------------------------------------------------

    /// Runs the cycle finder over `edges` and materializes fresh `Face`s
    /// for every outer cycle found, nesting inner cycles as holes. Any
    /// inner cycle with no container becomes a hole of `fallback_unbounded`.
    pub(crate) fn assign_faces_from_cycles(&mut self, edges: &[EdgeID], fallback_unbounded: crate::dcel::FaceID) {
        let forest: CycleForest = cycles::find_cycles(self, edges);

        let mut new_faces = Vec::with_capacity(forest.outer.len());
        for outer in &forest.outer {
            let fid = self.faces.insert(Face::default());
            for &e in &outer.edges {
                self.edges[e].face = fid;
            }
            self.faces[fid].outer = Some(outer.edges[0]);
            new_faces.push(fid);
        }
        for (i, holes) in forest.holes_of.iter().enumerate() {
            for hole in holes {
                for &e in &hole.edges {
                    self.edges[e].face = new_faces[i];
                }
                self.faces[new_faces[i]].inner.push(hole.edges[0]);
            }
        }
        for hole in &forest.unbounded_holes {
            for &e in &hole.edges {
                self.edges[e].face = fallback_unbounded;
            }
            self.faces[fallback_unbounded].inner.push(hole.edges[0]);
        }
    }

    // -----------------------------------------------------------------
    // Incremental editing (spec §4.D)
    // -----------------------------------------------------------------

    /// Adds an edge between `start` and `end`, creating either endpoint if
    /// it doesn't already exist, subject to the planarity pre-checks of
    /// spec §4.D. Returns `None` (subdivision unchanged) on any failure.
    pub fn add_edge(&mut self, start: Point, end: Point) -> Option<EdgeID> {
        if geometry::near(start.x(), end.x(), self.epsilon()) && geometry::near(start.y(), end.y(), self.epsilon()) {
            return None;
        }

        let existing_start = self.find_vertex(start);
        let existing_end = self.find_vertex(end);

        if let (Some(a), Some(b)) = (existing_start, existing_end) {
            if self.find_edge(a, b).is_some() {
                return None; // duplicate edge
            }
        }

        let face = match (existing_start, existing_end) {
            (None, None) => self.find_face(midpoint(start, end)),
            (Some(v), None) | (None, Some(v)) => self.angular_gap_face(v, if existing_start.is_some() { end } else { start })?,
            (Some(a), Some(b)) => {
                let fa = self.angular_gap_face(a, end)?;
                let fb = self.angular_gap_face(b, start)?;
                if fa != fb {
                    return None;
                }
                fa
            }
        };

        for boundary_edge in self.boundary_edges(face) {
            let (u, v) = self.endpoints(boundary_edge);
            let bu = self.position(u);
            let bv = self.position(v);
            let result = geometry::intersect(start, end, bu, bv, self.epsilon());
            if result.relation == Relation::Divergent
                && result.first == SegLocation::Between
                && result.second == SegLocation::Between
            {
                return None;
            }
        }

        let va = match existing_start {
            Some(v) => v,
            None => self.insert_fresh_vertex(start),
        };
        let vb = match existing_end {
            Some(v) => v,
            None => self.insert_fresh_vertex(end),
        };

        let old_local_edges = self.boundary_edges(face);
        let (e, et) = self.splice_new_edge(va, vb);

        let mut local = old_local_edges;
        local.push(e);
        local.push(et);
        self.dissolve_face(face);
        self.assign_faces_from_cycles(&local, self.unbounded_face());

        Some(e)
    }

    /// Determines which face lies in the angular gap a new edge from `v`
    /// towards `direction_towards` would land in (spec §4.D step 2).
    fn angular_gap_face(&self, v: VertID, direction_towards: Point) -> Option<crate::dcel::FaceID> {
        let existing = self.outgoing(v);
        if existing.is_empty() {
            return None;
        }
        let (dx, dy) = direction_towards - self.position(v);
        let new_angle = dy.atan2(dx);

        let angle_of = |e: EdgeID| -> f64 {
            let (dx, dy) = self.position(self.destination(e)) - self.position(self.root(e));
            dy.atan2(dx)
        };

        let mut insert_at = existing.len();
        for (i, &e) in existing.iter().enumerate() {
            if angle_of(e) > new_angle {
                insert_at = i;
                break;
            }
        }
        let pred = existing[(insert_at + existing.len() - 1) % existing.len()];
        Some(self.face(self.twin(pred)))
    }

    pub(crate) fn insert_fresh_vertex(&mut self, point: Point) -> VertID {
        let id = self.verts.insert(Vertex { position: point, rep: None, data: VData::default() });
        self.insert_sorted_vertex(point, id);
        id
    }

    /// Removes a face record without touching its half-edges (used right
    /// before a local cycle rebuild replaces them).
    pub(crate) fn dissolve_face(&mut self, face: crate::dcel::FaceID) {
        if face != self.unbounded_face() {
            self.faces.remove(face);
        } else {
            self.faces[face].outer = None;
            self.faces[face].inner.clear();
        }
    }

    /// Removes the full edge `e` (and its twin). Returns `true` on success.
    /// Pre-condition failures (none defined for removal beyond `e` existing)
    /// never occur for a valid `EdgeID`.
    pub fn remove_edge(&mut self, e: EdgeID) -> bool {
        if !self.edges.contains_key(e) {
            return false;
        }
        let et = self.twin(e);
        let f1 = self.face(e);
        let f2 = self.face(et);
        let u = self.root(e);
        let w = self.root(et);

        let e_is_inner_of_f1 = self.faces[f1].inner.contains(&e) || self.faces[f1].inner.iter().any(|&h| self.cycle(h).contains(&e));
        let et_is_inner_of_f2 = self.faces[f2].inner.contains(&et) || self.faces[f2].inner.iter().any(|&h| self.cycle(h).contains(&et));

        let mut local_edges: Vec<EdgeID> = self.boundary_edges(f1);
        if f2 != f1 {
            local_edges.extend(self.boundary_edges(f2));
        }
        local_edges.retain(|&x| x != e && x != et);

        let u_isolated = self.unsplice_outgoing(u, e);
        let w_isolated = self.unsplice_outgoing(w, et);

        self.edges.remove(e);
        self.edges.remove(et);
        if u_isolated {
            self.verts.remove(u);
            self.remove_sorted_vertex(u);
        }
        if w_isolated {
            self.verts.remove(w);
            self.remove_sorted_vertex(w);
        }

        if f1 == f2 {
            self.dissolve_face(f1);
            self.assign_faces_from_cycles(&local_edges, self.unbounded_face());
        } else {
            let retain_f1 = if f1 == self.unbounded_face() {
                true
            } else if f2 == self.unbounded_face() {
                false
            } else if e_is_inner_of_f1 {
                true
            } else if et_is_inner_of_f2 {
                false
            } else {
                slotmap::Key::data(&f1) < slotmap::Key::data(&f2)
            };
            let (retained, dropped) = if retain_f1 { (f1, f2) } else { (f2, f1) };

            self.dissolve_face(retained);
            self.faces.remove(dropped);
            self.assign_faces_from_cycles(&local_edges, self.unbounded_face());
            // faces_from_cycles may have recreated `retained`'s slot under a
            // fresh key if it was the unbounded face; nothing further to do.
        }

        true
    }

    /// Splits `e` at its midpoint. Shorthand for
    /// [`Subdivision::split_edge_at`].
    pub fn split_edge(&mut self, e: EdgeID) -> (VertID, EdgeID) {
        let (u, w) = self.endpoints(e);
        let mid = midpoint(self.position(u), self.position(w));
        self.split_edge_at(e, mid)
    }

    /// Inserts a new vertex at `point` on edge `e`, preserving face
    /// incidences (spec §4.D). Does not check that `point` actually lies on
    /// `e`; callers are expected to have located it there.
    pub fn split_edge_at(&mut self, e: EdgeID, point: Point) -> (VertID, EdgeID) {
        let te = self.twin(e);
        let w = self.root(te);
        let old_next_e = self.next(e);
        let old_prev_te = self.previous(te);
        let face_e = self.face(e);
        let face_te = self.face(te);

        let nv = self.verts.insert(Vertex { position: point, rep: None, data: VData::default() });
        self.insert_sorted_vertex(point, nv);

        let e2 = self.edges.insert(HalfEdge {
            origin: nv,
            twin: EdgeID::default(),
            next: old_next_e,
            previous: e,
            face: face_e,
            data: EData::default(),
        });
        let e2t = self.edges.insert(HalfEdge {
            origin: w,
            twin: e2,
            next: te,
            previous: old_prev_te,
            face: face_te,
            data: EData::default(),
        });
        self.edges[e2].twin = e2t;

        self.edges[e].next = e2;
        self.edges[old_next_e].previous = e2;
        self.edges[te].origin = nv;
        self.edges[te].previous = e2t;
        self.edges[old_prev_te].next = e2t;
        self.verts[nv].rep = Some(e2);

        (nv, e2)
    }

    /// Three-way split helper (spec §4.D): if `point` already coincides
    /// with an existing vertex that is already connected to both endpoints
    /// of `e`, the split is redundant and `e` is deleted instead.
    pub fn try_split_edge(&mut self, e: EdgeID, point: Point) -> SplitOutcome {
        let (u, w) = self.endpoints(e);
        if let Some(existing) = self.find_vertex(point) {
            if existing != u && existing != w {
                let uv = self.find_edge(u, existing);
                let vw = self.find_edge(existing, w);
                if uv.is_some() && vw.is_some() {
                    self.remove_edge(e);
                    return SplitOutcome::Deleted;
                }
            }
        }
        let (v, ne) = self.split_edge_at(e, point);
        SplitOutcome::Split { vertex: v, edge: ne }
    }

    /// Attempts to move `v` to `new_position`. Refuses (returning `false`,
    /// subdivision unchanged) if that would collide with another vertex or
    /// introduce a crossing with any non-incident edge of an incident face.
    /// Because vertices are identified by a stable arena key rather than a
    /// position-derived index, callers do **not** need to re-query `v`
    /// after a successful move (see `DESIGN.md`).
    pub fn move_vertex(&mut self, v: VertID, new_position: Point) -> bool {
        if let Some(other) = self.find_vertex(new_position) {
            if other != v {
                return false;
            }
        }

        let incident_edges = self.outgoing(v);
        let mut incident_faces = std::collections::HashSet::new();
        for &e in &incident_edges {
            incident_faces.insert(self.face(e));
            incident_faces.insert(self.face(self.twin(e)));
        }
        let incident_set: std::collections::HashSet<EdgeID> = incident_edges
            .iter()
            .copied()
            .chain(incident_edges.iter().map(|&e| self.twin(e)))
            .collect();

        for &face in &incident_faces {
            for boundary_edge in self.boundary_edges(face) {
                if incident_set.contains(&boundary_edge) {
                    continue;
                }
                let (bu, bv) = self.endpoints(boundary_edge);
                for &out in &incident_edges {
                    let other_end = self.position(self.destination(out));
                    let result = geometry::intersect(new_position, other_end, self.position(bu), self.position(bv), self.epsilon());
                    if result.relation == Relation::Divergent
                        && result.first == SegLocation::Between
                        && result.second == SegLocation::Between
                    {
                        return false;
                    }
                }
            }
        }

        self.remove_sorted_vertex(v);
        self.verts[v].position = new_position;
        self.insert_sorted_vertex(new_position, v);
        true
    }

    /// Removes `v` and joins its two incident edges into one, provided the
    /// joined segment does not cross any other edge of the incident faces.
    /// Only legal when `v` has exactly two incident half-edges.
    pub fn remove_vertex(&mut self, v: VertID) -> bool {
        let out = self.outgoing(v);
        if out.len() != 2 {
            return false;
        }
        let e1 = out[0]; // v -> a
        let e2 = out[1]; // v -> b
        let te1 = self.twin(e1); // a -> v
        let te2 = self.twin(e2); // b -> v
        let a = self.destination(e1);
        let b = self.destination(e2);

        let face_ba = self.face(e1); // boundary ... te2, e1 ...
        let face_ab = self.face(e2); // boundary ... te1, e2 ...

        let joined_a_pos = self.position(a);
        let joined_b_pos = self.position(b);
        for &face in &[face_ba, face_ab] {
            for boundary_edge in self.boundary_edges(face) {
                if [e1, e2, te1, te2].contains(&boundary_edge) {
                    continue;
                }
                let (bu, bw) = self.endpoints(boundary_edge);
                let result = geometry::intersect(joined_a_pos, joined_b_pos, self.position(bu), self.position(bw), self.epsilon());
                if result.relation == Relation::Divergent
                    && result.first == SegLocation::Between
                    && result.second == SegLocation::Between
                {
                    return false;
                }
            }
        }

        let prev_of_te2 = self.previous(te2);
        let next_of_e1 = self.next(e1);
        let prev_of_e2 = self.previous(e2);
        let next_of_te1 = self.next(te1);

        let edge_ba = self.edges.insert(HalfEdge {
            origin: b,
            twin: EdgeID::default(),
            next: next_of_e1,
            previous: prev_of_te2,
            face: face_ba,
            data: EData::default(),
        });
        let edge_ab = self.edges.insert(HalfEdge {
            origin: a,
            twin: edge_ba,
            next: next_of_te1,
            previous: prev_of_e2,
            face: face_ab,
            data: EData::default(),
        });
        self.edges[edge_ba].twin = edge_ab;

        self.edges[prev_of_te2].next = edge_ba;
        self.edges[next_of_e1].previous = edge_ba;
        self.edges[prev_of_e2].next = edge_ab;
        self.edges[next_of_te1].previous = edge_ab;

        if self.faces[face_ba].outer == Some(e1) || self.faces[face_ba].outer == Some(te2) {
            self.faces[face_ba].outer = Some(edge_ba);
        }
        for h in &mut self.faces[face_ba].inner.clone() {
            if *h == e1 || *h == te2 {
                let pos = self.faces[face_ba].inner.iter().position(|x| x == h).unwrap();
                self.faces[face_ba].inner[pos] = edge_ba;
            }
        }
        if self.faces[face_ab].outer == Some(e2) || self.faces[face_ab].outer == Some(te1) {
            self.faces[face_ab].outer = Some(edge_ab);
        }
        for h in &mut self.faces[face_ab].inner.clone() {
            if *h == e2 || *h == te1 {
                let pos = self.faces[face_ab].inner.iter().position(|x| x == h).unwrap();
                self.faces[face_ab].inner[pos] = edge_ab;
            }
        }

        if self.representative(a) == Some(te1) {
            self.verts[a].rep = Some(edge_ab);
        }
        if self.representative(b) == Some(te2) {
            self.verts[b].rep = Some(edge_ba);
        }

        self.edges.remove(e1);
        self.edges.remove(e2);
        self.edges.remove(te1);
        self.edges.remove(te2);
        self.verts.remove(v);
        self.remove_sorted_vertex(v);

        true
    }
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x() + b.x()) / 2.0, (a.y() + b.y()) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcel::Subdivision;

    fn square(epsilon: f64) -> (Subdivision<(), (), ()>, VertMap, EdgeMap, FaceMap) {
        let segments = vec![
            (Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            (Point::new(1.0, 0.0), Point::new(1.0, 1.0)),
            (Point::new(1.0, 1.0), Point::new(0.0, 1.0)),
            (Point::new(0.0, 1.0), Point::new(0.0, 0.0)),
        ];
        Subdivision::from_segments(&segments, epsilon).unwrap()
    }

    #[test]
    fn triangle_scenario() {
        let segments = vec![
            (Point::new(0.0, 0.0), Point::new(4.0, 0.0)),
            (Point::new(4.0, 0.0), Point::new(2.0, 3.0)),
            (Point::new(2.0, 3.0), Point::new(0.0, 0.0)),
        ];
        let (sub, _, _, _) = Subdivision::<(), (), ()>::from_segments(&segments, 1e-9).unwrap();
        assert_eq!(sub.nr_verts(), 3);
        assert_eq!(sub.nr_edges(), 6);
        assert_eq!(sub.nr_faces(), 2);
        sub.validate().unwrap();
    }

    #[test]
    fn square_with_diagonal_scenario() {
        let (mut sub, _, _, _) = square(0.0);
        let e = sub.add_edge(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        assert!(e.is_some());
        assert_eq!(sub.nr_verts(), 4);
        assert_eq!(sub.nr_edges(), 10);
        assert_eq!(sub.nr_faces(), 3);
        sub.validate().unwrap();
    }

    #[test]
    fn add_edge_rejects_duplicate() {
        let (mut sub, _, _, _) = square(0.0);
        assert!(sub.add_edge(Point::new(0.0, 0.0), Point::new(1.0, 0.0)).is_none());
    }

    #[test]
    fn add_edge_rejects_coincident_endpoints() {
        let (mut sub, _, _, _) = square(0.0);
        assert!(sub.add_edge(Point::new(0.0, 0.0), Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn add_then_remove_restores_counts() {
        let (mut sub, _, _, _) = square(0.0);
        let before_edges = sub.nr_edges();
        let before_faces = sub.nr_faces();
        let e = sub.add_edge(Point::new(0.0, 0.0), Point::new(1.0, 1.0)).unwrap();
        assert!(sub.remove_edge(e));
        assert_eq!(sub.nr_edges(), before_edges);
        assert_eq!(sub.nr_faces(), before_faces);
        sub.validate().unwrap();
    }

    #[test]
    fn split_then_remove_vertex_restores_structure() {
        let (mut sub, _, _, _) = square(0.0);
        let bottom = sub.find_edge(sub.find_vertex(Point::new(0.0, 0.0)).unwrap(), sub.find_vertex(Point::new(1.0, 0.0)).unwrap()).unwrap();
        let before_edges = sub.nr_edges();
        let (nv, _) = sub.split_edge(bottom);
        assert_eq!(sub.nr_edges(), before_edges + 2);
        assert!(sub.remove_vertex(nv));
        assert_eq!(sub.nr_edges(), before_edges);
        sub.validate().unwrap();
    }
}
