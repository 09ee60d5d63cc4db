//! Cycle discovery and face assignment (spec §4.C).
//!
//! Given a DCEL whose half-edges and vertex chains are linked but whose
//! faces are not yet assigned, partitions the half-edges into boundary
//! cycles, classifies each as inner/outer, and nests inner cycles inside
//! the outer cycle (or the unbounded face) that contains them via a
//! one-pass upward plane sweep.

use std::collections::{HashMap, HashSet};

use std::fmt::Debug;

use crate::dcel::{EdgeID, Subdivision, VertID};
use crate::geometry::{self, Axis, Point};

#[derive(Clone, Debug)]
pub struct Cycle {
    pub edges: Vec<EdgeID>,
    pub pivot_edge: EdgeID,
    pub pivot_vertex: VertID,
    pub is_outer: bool,
}

/// Output of cycle discovery: every outer cycle found (each becomes a
/// bounded face) paired with the inner cycles (holes) nested directly
/// inside it, plus the inner cycles that belong to no outer cycle (they
/// become holes of the unbounded face).
pub struct CycleForest {
    pub outer: Vec<Cycle>,
    /// `holes_of[i]` lists the inner cycles nested inside `outer[i]`.
    pub holes_of: Vec<Vec<Cycle>>,
    pub unbounded_holes: Vec<Cycle>,
}

/// Runs the two-stage cycle finder over every half-edge reachable from
/// `edges` (spec §4.C): cycle traversal + inner/outer classification,
/// then a containment sweep nesting inner cycles.
pub fn find_cycles<VData: Default + Clone + Debug, EData: Default + Clone + Debug, FData: Default + Clone + Debug>(
    sub: &Subdivision<VData, EData, FData>,
    edges: &[EdgeID],
) -> CycleForest {
    let raw_cycles = traverse_cycles(sub, edges);

    let mut outer = Vec::new();
    let mut inner = Vec::new();
    for cycle in raw_cycles {
        if cycle.is_outer {
            outer.push(cycle);
        } else {
            inner.push(cycle);
        }
    }

    let (holes_of, unbounded_holes) = nest_inner_cycles(sub, &outer, inner);

    CycleForest { outer, holes_of, unbounded_holes }
}

/// Stage 1: pop unvisited half-edges, follow `next` to collect a full
/// cycle, find its pivot (lexicographically smallest vertex under the `Y`
/// axis), and classify inner vs outer.
fn traverse_cycles<VData: Default + Clone + Debug, EData: Default + Clone + Debug, FData: Default + Clone + Debug>(
    sub: &Subdivision<VData, EData, FData>,
    edges: &[EdgeID],
) -> Vec<Cycle> {
    let mut visited: HashSet<EdgeID> = HashSet::new();
    let mut cycles = Vec::new();

    for &start in edges {
        if visited.contains(&start) {
            continue;
        }
        let cycle_edges = sub.cycle(start);
        for &e in &cycle_edges {
            visited.insert(e);
        }

        let cycle_set: HashSet<EdgeID> = cycle_edges.iter().copied().collect();
        let all_twins_inside = cycle_edges.iter().all(|&e| cycle_set.contains(&sub.twin(e)));

        let pivot_idx = cycle_edges
            .iter()
            .enumerate()
            .min_by(|(_, &a), (_, &b)| {
                geometry::compare_epsilon(Axis::Y, sub.position(sub.root(a)), sub.position(sub.root(b)), sub.epsilon())
            })
            .map(|(i, _)| i)
            .expect("cycle is non-empty");
        let pivot_edge = cycle_edges[pivot_idx];
        let pivot_vertex = sub.root(pivot_edge);

        let is_outer = if all_twins_inside {
            false
        } else {
            let n = cycle_edges.len();
            let prev_vertex = sub.root(cycle_edges[(pivot_idx + n - 1) % n]);
            let next_vertex = sub.destination(cycle_edges[pivot_idx]);
            let turn = geometry::cross(sub.position(prev_vertex), sub.position(pivot_vertex), sub.position(next_vertex));
            turn > sub.epsilon()
        };

        cycles.push(Cycle { edges: cycle_edges, pivot_edge, pivot_vertex, is_outer });
    }

    cycles
}

/// Stage 2: an upward sweep over every vertex event. At each inner cycle's
/// pivot, finds the nearest live downward-pointing edge to its left and
/// attaches the cycle as a hole of whichever outer/inner cycle owns that
/// edge; absent any live edge to the left, the cycle belongs to the
/// unbounded face.
fn nest_inner_cycles<VData: Default + Clone + Debug, EData: Default + Clone + Debug, FData: Default + Clone + Debug>(
    sub: &Subdivision<VData, EData, FData>,
    outer: &[Cycle],
    inner: Vec<Cycle>,
) -> (Vec<Vec<Cycle>>, Vec<Cycle>) {
    let mut holes_of: Vec<Vec<Cycle>> = vec![Vec::new(); outer.len()];
    let mut unbounded_holes = Vec::new();

    // Owning cycle (outer index, or None meaning "this edge belongs to some
    // inner cycle we haven't nested yet") for every half-edge.
    let mut owner_of_edge: HashMap<EdgeID, usize> = HashMap::new();
    for (i, c) in outer.iter().enumerate() {
        for &e in &c.edges {
            owner_of_edge.insert(e, i);
        }
    }

    // Events: every vertex touched by an outer cycle or an inner-cycle
    // pivot, sorted upward by the Y axis.
    let mut events: Vec<VertID> = Vec::new();
    for c in outer.iter().chain(inner.iter()) {
        for &e in &c.edges {
            events.push(sub.root(e));
        }
    }
    events.sort_by(|&a, &b| geometry::compare_epsilon(Axis::Y, sub.position(a), sub.position(b), sub.epsilon()));
    events.dedup();

    // Live downward-pointing half-edges: half-edges whose origin has
    // already been swept and whose destination has not.
    let mut live: Vec<EdgeID> = Vec::new();

    let pivot_owner_of = |pivot: VertID, live: &[EdgeID]| -> Option<usize> {
        let pivot_pos = sub.position(pivot);
        live.iter()
            .filter_map(|&e| {
                let x = x_at_y(sub.position(sub.root(e)), sub.position(sub.destination(e)), pivot_pos.y());
                (x <= pivot_pos.x() + sub.epsilon()).then_some((x, e))
            })
            .filter_map(|(x, e)| owner_of_edge.get(&e).copied().map(|owner| (x, owner)))
            .max_by(|(xa, _), (xb, _)| xa.partial_cmp(xb).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, owner)| owner)
    };

    // Process inner cycles by the Y-order of their pivot so that a hole
    // nested inside another hole resolves after its immediate container.
    let mut remaining: Vec<Cycle> = inner;
    remaining.sort_by(|a, b| {
        geometry::compare_epsilon(Axis::Y, sub.position(a.pivot_vertex), sub.position(b.pivot_vertex), sub.epsilon())
    });

    for &vertex in &events {
        // Attach any inner cycles whose pivot is this vertex.
        let mut i = 0;
        while i < remaining.len() {
            if remaining[i].pivot_vertex == vertex {
                let cycle = remaining.remove(i);
                match pivot_owner_of(vertex, &live) {
                    Some(owner) => {
                        for &e in &cycle.edges {
                            owner_of_edge.insert(e, owner);
                        }
                        holes_of[owner].push(cycle);
                    }
                    None => unbounded_holes.push(cycle),
                }
            } else {
                i += 1;
            }
        }

        // Remove edges whose far endpoint already swept (below current
        // line); insert edges whose far endpoint is still above.
        live.retain(|&e| {
            let far = sub.destination(e);
            geometry::compare_epsilon(Axis::Y, sub.position(far), sub.position(vertex), sub.epsilon())
                != std::cmp::Ordering::Less
        });

        for c in outer.iter().chain(holes_of.iter().flatten()) {
            for &e in &c.edges {
                if sub.root(e) == vertex {
                    let far = sub.destination(e);
                    if geometry::compare_epsilon(Axis::Y, sub.position(far), sub.position(vertex), sub.epsilon())
                        == std::cmp::Ordering::Greater
                        && !live.contains(&e)
                    {
                        live.push(e);
                    }
                }
            }
        }

        sort_live_by_x(sub, &mut live, vertex);
    }

    (holes_of, unbounded_holes)
}

fn sort_live_by_x<VData: Default + Clone + Debug, EData: Default + Clone + Debug, FData: Default + Clone + Debug>(
    sub: &Subdivision<VData, EData, FData>,
    live: &mut [EdgeID],
    at: VertID,
) {
    let y = sub.position(at).y();
    live.sort_by(|&a, &b| {
        let xa = x_at_y(sub.position(sub.root(a)), sub.position(sub.destination(a)), y);
        let xb = x_at_y(sub.position(sub.root(b)), sub.position(sub.destination(b)), y);
        xa.partial_cmp(&xb).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
    });
}

fn x_at_y(a: Point, b: Point, y: f64) -> f64 {
    if (b.y() - a.y()).abs() <= f64::EPSILON {
        a.x().min(b.x())
    } else {
        a.x() + (y - a.y()) / (b.y() - a.y()) * (b.x() - a.x())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcel::Subdivision;

    #[test]
    fn triangle_has_single_outer_cycle() {
        let segments = vec![
            (Point::new(0.0, 0.0), Point::new(4.0, 0.0)),
            (Point::new(4.0, 0.0), Point::new(2.0, 3.0)),
            (Point::new(2.0, 3.0), Point::new(0.0, 0.0)),
        ];
        let (sub, _, _, _) = Subdivision::<(), (), ()>::from_segments(&segments, 1e-9).unwrap();
        assert_eq!(sub.nr_faces(), 2);
    }
}
