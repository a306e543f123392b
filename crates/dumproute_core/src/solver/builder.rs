use crate::problem::{Problem, capacity::Capacity, node::NodeId, vehicle::VehicleId};
use crate::solver::solution::Solution;
use crate::solver::twc::CompatibilityOracle;

/// Seeded greedy construction of an initial solution. Vehicles are seeded
/// in shift-open order; each route is grown by repeatedly appending the
/// feasible pickup whose [`crate::solver::route::Route::delta_time_insert`]
/// screen is smallest, pruned first by the compatibility oracle and then
/// by a direct capacity check (the delta screen is time-window-only); ties
/// left by the delta screen are broken by the oracle's geographic
/// nearest-to-edge distance, then by node id for full determinism.
/// When nothing more fits, a dump visit is appended, resetting carried
/// load to zero, and the vehicle keeps going; when even a dump
/// visit doesn't unblock anything (the route is already unloaded and still
/// nothing fits), the route is closed and the next vehicle starts.
/// Containers that never fit any vehicle stay in the unassigned bucket.
/// The dump sandwich already exists at `Route::new`, so insertion here
/// never has to special-case an "empty" route.
pub fn build_initial_solution<'a>(problem: &'a Problem, oracle: &CompatibilityOracle) -> Solution<'a> {
    let mut solution = Solution::new(problem);

    let mut remaining: Vec<NodeId> = problem.pickups().collect();
    remaining.sort_by_key(NodeId::get);

    let mut vehicle_order: Vec<VehicleId> = problem.vehicle_ids().collect();
    vehicle_order.sort_by_key(|&vid| problem.vehicle(vid).shift().open());

    for vid in vehicle_order {
        if remaining.is_empty() {
            break;
        }
        fill_route(problem, oracle, &mut solution, vid, &mut remaining);
    }

    solution.recompute_cost();
    solution
}

fn fill_route(
    problem: &Problem,
    oracle: &CompatibilityOracle,
    solution: &mut Solution,
    vid: VehicleId,
    remaining: &mut Vec<NodeId>,
) {
    let vehicle = problem.vehicle(vid);

    loop {
        let pos = solution.route(vid).editable_end_pos();
        let prev = solution.route(vid).node_at(pos - 1);
        let next = solution.route(vid).node_at(pos);
        let carried_load = solution.route(vid).state_at(pos - 1).carried_load;

        let mut best: Option<(usize, f64, f64, NodeId)> = None;
        for (idx, &candidate) in remaining.iter().enumerate() {
            if !oracle.compatible(prev, candidate) {
                continue;
            }
            let demand = problem.catalog().node(candidate).demand();
            if (carried_load + demand).exceeds(vehicle.capacity()) {
                continue;
            }
            let Some(delta) = solution.route(vid).delta_time_insert(candidate, pos) else {
                continue;
            };
            // Geographic nearest-to-edge distance only breaks ties the
            // delta screen leaves tied; node id is the final tie-break so
            // iteration stays deterministic.
            let edge_distance = oracle.nearest_edge_distance(problem.catalog(), candidate, prev, next);
            let take = match best {
                None => true,
                Some((_, best_delta, best_edge_distance, best_node)) => {
                    delta < best_delta
                        || (delta == best_delta && edge_distance < best_edge_distance)
                        || (delta == best_delta && edge_distance == best_edge_distance && candidate.get() < best_node.get())
                }
            };
            if take {
                best = Some((idx, delta, edge_distance, candidate));
            }
        }

        if let Some((idx, _, _, node)) = best {
            solution.route_mut(vid).insert(node, pos);
            solution.mark_assigned(node);
            remaining.remove(idx);
            continue;
        }

        if carried_load == Capacity::ZERO {
            // Nothing fit and the route is already unloaded: the
            // rejections were all time-window/compatibility, not
            // capacity, so a dump visit wouldn't unblock anything either.
            break;
        }

        match oracle.nearest_dump(prev) {
            Some(dump) if solution.route(vid).delta_time_insert(dump, pos).is_some() => {
                solution.route_mut(vid).insert(dump, pos);
            }
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::node::NodeKind;
    use crate::test_utils::basic_problem;

    #[test]
    fn assigns_every_pickup_when_capacity_allows() {
        let problem = basic_problem();
        let oracle = CompatibilityOracle::build(&problem);
        let solution = build_initial_solution(&problem, &oracle);

        assert!(solution.unassigned().is_empty());
        let total_pickups = problem.catalog().nodes_of_kind(NodeKind::Pickup).count();
        let served: usize = solution
            .routes()
            .iter()
            .map(|r| {
                r.nodes()
                    .iter()
                    .filter(|&&n| problem.catalog().node(n).kind().is_pickup())
                    .count()
            })
            .sum();
        assert_eq!(served, total_pickups);
    }

    #[test]
    fn every_route_keeps_the_dump_sandwich_invariant() {
        let problem = basic_problem();
        let oracle = CompatibilityOracle::build(&problem);
        let solution = build_initial_solution(&problem, &oracle);
        for route in solution.routes() {
            assert!(route.has_dump_sandwich_invariant());
        }
    }

    #[test]
    fn leaves_container_unassigned_when_it_fits_nowhere() {
        use crate::problem::{
            Problem, capacity::Capacity, catalog::NodeCatalog, location::Location,
            node::NodeBuilder, time_window::TimeWindow, vehicle::VehicleBuilder,
        };
        use dumproute_matrix::TravelTimeMatrix;

        let wide = || TimeWindow::from_offsets_secs(0.0, 1.0e9);
        let nodes = vec![
            NodeBuilder::default()
                .set_external_id("depot".into())
                .set_kind(NodeKind::Depot)
                .set_location(Location::from_xy(0.0, 0.0))
                .set_time_window(wide())
                .build(),
            NodeBuilder::default()
                .set_external_id("dump".into())
                .set_kind(NodeKind::Dump)
                .set_location(Location::from_xy(1.0, 0.0))
                .set_time_window(wide())
                .build(),
            NodeBuilder::default()
                .set_external_id("oversized".into())
                .set_kind(NodeKind::Pickup)
                .set_location(Location::from_xy(2.0, 0.0))
                .set_demand(Capacity::new(999.0))
                .set_time_window(wide())
                .build(),
        ];
        let matrix = TravelTimeMatrix::from_constant(nodes.len(), 1.0);
        let catalog = NodeCatalog::new(nodes, matrix);
        let vehicle = VehicleBuilder::default()
            .set_external_id("small".into())
            .set_capacity(Capacity::new(5.0))
            .set_start_depot(NodeId::from(0))
            .set_dump(NodeId::from(1))
            .set_end_depot(NodeId::from(0))
            .set_shift(wide())
            .build();
        let problem = Problem::new(catalog, vec![vehicle]);

        let oracle = CompatibilityOracle::build(&problem);
        let solution = build_initial_solution(&problem, &oracle);

        assert_eq!(solution.unassigned().len(), 1);
        assert!(solution.routes()[0].is_empty());
    }
}
