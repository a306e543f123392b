use crate::problem::{node::NodeId, vehicle::VehicleId};
use crate::solver::moves::{Move, SENTINEL_VEHICLE};
use crate::solver::solution::Solution;
use crate::solver::twc::CompatibilityOracle;

/// Produces a bounded candidate move list per move family from the
/// current `Solution`. Every candidate has already passed the
/// route-level delta screen, a travel-time-only pre-filter, and carries
/// an *exact* savings figure, obtained by cloning the one or two
/// touched routes, applying the edit, and diffing `cost()` before and
/// after. Cloning a `Route` is cheap (two flat `Vec`s), and this keeps
/// the reported savings exactly equal to `current_cost - predicted_cost`
/// (8.3), including the capacity/time-window penalty terms the travel-only
/// screen cannot see.
pub fn insertions(solution: &Solution, oracle: &CompatibilityOracle) -> Vec<Move> {
    let problem = solution.problem();
    let mut candidates = Vec::new();

    let assigned_containers = problem.pickups().filter(|c| !solution.unassigned().contains(c));
    for container in assigned_containers {
        let (source_vid, source_pos) = locate(solution, container).expect("assigned container must be in a route");
        for vid in problem.vehicle_ids() {
            if vid == source_vid {
                continue; // covered by IntraSw
            }
            if let Some(mv) = best_insertion(solution, oracle, container, Some((source_vid, source_pos)), vid) {
                candidates.push(mv);
            }
        }
    }

    for &container in solution.unassigned() {
        for vid in problem.vehicle_ids() {
            if let Some(mv) = best_insertion(solution, oracle, container, None, vid) {
                candidates.push(mv);
            }
        }
    }

    candidates
}

fn locate(solution: &Solution, container: NodeId) -> Option<(VehicleId, usize)> {
    for vid in solution.problem().vehicle_ids() {
        let route = solution.route(vid);
        for pos in route.first_editable_pos()..route.editable_end_pos() {
            if route.node_at(pos) == container {
                return Some((vid, pos));
            }
        }
    }
    None
}

/// Best screened insertion position of `container` into route `dest`,
/// one candidate per (container, route) pair.
fn best_insertion(
    solution: &Solution,
    oracle: &CompatibilityOracle,
    container: NodeId,
    source: Option<(VehicleId, usize)>,
    dest: VehicleId,
) -> Option<Move> {
    let dest_route = solution.route(dest);
    let mut best: Option<(usize, f64)> = None;

    for pos in dest_route.first_editable_pos()..=dest_route.editable_end_pos() {
        let prev = dest_route.node_at(pos - 1);
        if !oracle.compatible(prev, container) {
            continue;
        }
        let Some(delta) = dest_route.delta_time_insert(container, pos) else {
            continue;
        };
        // Ascending `pos` plus a strict `<` means a tie keeps the
        // smaller-index position, matching §4.B's tie-break rule.
        if best.is_none_or(|(_, best_delta)| delta < best_delta) {
            best = Some((pos, delta));
        }
    }

    let (pos, _) = best?;

    let old_cost = match source {
        Some((svid, _)) => solution.route(svid).cost() + dest_route.cost(),
        None => dest_route.cost(),
    };

    let mut dest_clone = dest_route.clone();
    dest_clone.insert(container, pos);
    let new_cost = match source {
        Some((svid, spos)) => {
            let mut src_clone = solution.route(svid).clone();
            src_clone.erase(spos);
            src_clone.cost() + dest_clone.cost()
        }
        None => dest_clone.cost(),
    };

    let savings = old_cost - new_cost;
    let (vid1, pos1) = source.unwrap_or((SENTINEL_VEHICLE, 0));
    Some(Move::insert(container, vid1, pos1, dest, pos, savings))
}

/// Intra-route swaps. For every route with at least two pickups, every
/// unordered pair of pickup positions is a candidate.
pub fn intra_swaps(solution: &Solution) -> Vec<Move> {
    let problem = solution.problem();
    let mut candidates = Vec::new();
    for vid in problem.vehicle_ids() {
        let route = solution.route(vid);
        let positions: Vec<usize> = (route.first_editable_pos()..route.editable_end_pos())
            .filter(|&pos| problem.catalog().node(route.node_at(pos)).kind().is_pickup())
            .collect();
        if positions.len() < 2 {
            continue;
        }
        for a in 0..positions.len() {
            for b in (a + 1)..positions.len() {
                let (pos1, pos2) = (positions[a], positions[b]);
                if route.delta_time_swap(pos1, pos2).is_none() {
                    continue;
                }
                let old_cost = route.cost();
                let mut clone = route.clone();
                clone.swap_positions(pos1, pos2);
                let savings = old_cost - clone.cost();
                candidates.push(Move::intra_swap(vid, route.node_at(pos1), pos1, route.node_at(pos2), pos2, savings));
            }
        }
    }
    candidates
}

/// Inter-route swaps. For every unordered pair of routes, every
/// pickup-position pair is a candidate when both single-side replacement
/// screens are finite.
pub fn inter_swaps(solution: &Solution) -> Vec<Move> {
    let problem = solution.problem();
    let vids: Vec<VehicleId> = problem.vehicle_ids().collect();
    let mut candidates = Vec::new();

    for a in 0..vids.len() {
        for b in (a + 1)..vids.len() {
            let (v1, v2) = (vids[a], vids[b]);
            let r1 = solution.route(v1);
            let r2 = solution.route(v2);
            let positions1: Vec<usize> = (r1.first_editable_pos()..r1.editable_end_pos())
                .filter(|&pos| problem.catalog().node(r1.node_at(pos)).kind().is_pickup())
                .collect();
            let positions2: Vec<usize> = (r2.first_editable_pos()..r2.editable_end_pos())
                .filter(|&pos| problem.catalog().node(r2.node_at(pos)).kind().is_pickup())
                .collect();

            for &pos1 in &positions1 {
                for &pos2 in &positions2 {
                    let n1 = r1.node_at(pos1);
                    let n2 = r2.node_at(pos2);
                    if r1.delta_time_replace(n2, pos1).is_none() || r2.delta_time_replace(n1, pos2).is_none() {
                        continue;
                    }
                    let old_cost = r1.cost() + r2.cost();
                    let mut c1 = r1.clone();
                    let mut c2 = r2.clone();
                    c1.swap_with(&mut c2, pos1, pos2);
                    let savings = old_cost - (c1.cost() + c2.cost());
                    candidates.push(Move::inter_swap(v1, n1, pos1, v2, n2, pos2, savings));
                }
            }
        }
    }

    candidates
}
