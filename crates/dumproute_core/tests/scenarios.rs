//! End-to-end evaluation scenarios over literal, hand-built instances: a
//! single route/solution is constructed directly against the public API
//! and checked against an expected cost, feasibility, or shape, rather than
//! through the full parser + search pipeline.

use dumproute_core::problem::{
    Problem,
    capacity::Capacity,
    catalog::NodeCatalog,
    location::Location,
    node::{Node, NodeBuilder, NodeId, NodeKind},
    time_window::TimeWindow,
    vehicle::{ObjectiveWeights, VehicleBuilder, VehicleId},
};
use dumproute_core::solver::moves::{Move, SENTINEL_VEHICLE};
use dumproute_core::solver::route::Route;
use dumproute_core::solver::solution::Solution;
use dumproute_matrix::TravelTimeMatrix;

const WIDE: (f64, f64) = (0.0, 1.0e9);

fn location_node(external_id: &str, kind: NodeKind, demand: f64, tw: (f64, f64), service: f64) -> Node {
    NodeBuilder::default()
        .set_external_id(external_id.to_string())
        .set_kind(kind)
        .set_location(Location::from_xy(0.0, 0.0))
        .set_demand(Capacity::new(demand))
        .set_time_window(TimeWindow::from_offsets_secs(tw.0, tw.1))
        .set_service_duration(jiff::SignedDuration::from_secs_f64(service))
        .build()
}

fn one_vehicle_problem(nodes: Vec<Node>, pairs: Vec<(usize, usize, f64)>, capacity: f64) -> Problem {
    let n = nodes.len();
    let matrix = TravelTimeMatrix::from_pairs(n, pairs);
    let catalog = NodeCatalog::new(nodes, matrix);
    let vehicle = VehicleBuilder::default()
        .set_external_id("v1".to_string())
        .set_capacity(Capacity::new(capacity))
        .set_start_depot(NodeId::from(0))
        .set_dump(NodeId::from(1))
        .set_end_depot(NodeId::from(0))
        .set_shift(TimeWindow::from_offsets_secs(WIDE.0, WIDE.1))
        .set_weights(ObjectiveWeights::default())
        .build();
    Problem::new(catalog, vec![vehicle])
}

/// One vehicle, a depot/dump pair, two pickups with trivial windows; the
/// route that serves both back to back before dumping costs exactly the
/// sum of the four hops and carries no feasibility violations.
#[test]
fn straight_line_route_costs_exactly_total_travel() {
    let nodes = vec![
        location_node("depot", NodeKind::Depot, 0.0, WIDE, 0.0),
        location_node("dump", NodeKind::Dump, 0.0, WIDE, 0.0),
        location_node("p1", NodeKind::Pickup, 10.0, WIDE, 0.0),
        location_node("p2", NodeKind::Pickup, 20.0, WIDE, 0.0),
    ];
    let pairs = vec![
        (0, 2, 1.0), // depot -> p1
        (2, 3, 1.0), // p1 -> p2
        (3, 1, 1.0), // p2 -> dump
        (1, 0, 1.0), // dump -> depot
    ];
    let problem = one_vehicle_problem(nodes, pairs, 100.0);
    let vid = VehicleId::new(0);

    let mut route = Route::new(&problem, vid);
    route.push_back(NodeId::from(2));
    route.push_back(NodeId::from(3));

    assert_eq!(
        route.nodes().to_vec(),
        vec![NodeId::from(0), NodeId::from(2), NodeId::from(3), NodeId::from(1), NodeId::from(0)]
    );
    assert!((route.travel_time() - 4.0).abs() < 1e-9);
    assert_eq!(route.tw_violations(), 0);
    assert_eq!(route.cap_violations(), 0);
    assert!(route.feasible());
    assert!((route.cost() - 4.0).abs() < 1e-9);
    assert!(route.has_dump_sandwich_invariant());
}

/// When capacity forces it, an interior dump visit splits the two pickups
/// into separate loads, resetting carried load to zero between them, and
/// the resulting route still has zero capacity violations.
#[test]
fn dump_visit_resets_load_when_capacity_requires_a_mid_route_split() {
    let nodes = vec![
        location_node("depot", NodeKind::Depot, 0.0, WIDE, 0.0),
        location_node("dump", NodeKind::Dump, 0.0, WIDE, 0.0),
        location_node("p1", NodeKind::Pickup, 10.0, WIDE, 0.0),
        location_node("p2", NodeKind::Pickup, 10.0, WIDE, 0.0),
    ];
    let pairs = vec![
        (0, 2, 1.0), // depot -> p1
        (2, 1, 1.0), // p1 -> dump
        (1, 3, 1.0), // dump -> p2
        (3, 1, 1.0), // p2 -> dump
        (1, 0, 1.0), // dump -> depot
    ];
    // Capacity 15 can hold one pickup of demand 10 but not both (20) at once.
    let problem = one_vehicle_problem(nodes, pairs, 15.0);
    let vid = VehicleId::new(0);

    let mut route = Route::new(&problem, vid);
    route.push_back(NodeId::from(2)); // [depot, p1, dump, depot]
    let mid_dump_pos = route.editable_end_pos();
    route.insert(NodeId::from(1), mid_dump_pos); // [depot, p1, dump, dump, depot]
    route.push_back(NodeId::from(3)); // [depot, p1, dump, p2, dump, depot]

    assert_eq!(
        route.nodes().to_vec(),
        vec![
            NodeId::from(0),
            NodeId::from(2),
            NodeId::from(1),
            NodeId::from(3),
            NodeId::from(1),
            NodeId::from(0),
        ]
    );
    assert_eq!(route.cap_violations(), 0);
    assert!((route.travel_time() - 5.0).abs() < 1e-9);
    assert!(route.has_dump_sandwich_invariant());
}

/// A pickup whose window is missed because the preceding pickup's service
/// duration eats the slack still gets served (best-effort), but the
/// running `tw_violations` counter picks it up and the cost carries the
/// w3 penalty term.
#[test]
fn missed_time_window_is_counted_and_penalized_not_rejected() {
    let nodes = vec![
        location_node("depot", NodeKind::Depot, 0.0, WIDE, 0.0),
        location_node("dump", NodeKind::Dump, 0.0, WIDE, 0.0),
        location_node("p1", NodeKind::Pickup, 10.0, WIDE, 5.0),
        location_node("p2", NodeKind::Pickup, 20.0, (0.0, 1.0), 0.0),
    ];
    let pairs = vec![
        (0, 2, 1.0), // depot -> p1
        (2, 3, 1.0), // p1 -> p2
        (3, 1, 1.0), // p2 -> dump
        (1, 0, 1.0), // dump -> depot
    ];
    let problem = one_vehicle_problem(nodes, pairs, 100.0);
    let vid = VehicleId::new(0);

    let mut route = Route::new(&problem, vid);
    route.push_back(NodeId::from(2));
    route.push_back(NodeId::from(3));

    assert!((route.travel_time() - 4.0).abs() < 1e-9);
    assert!(route.tw_violations() >= 1);
    assert!(!route.feasible());

    let weights = problem.vehicle(vid).weights();
    let expected_cost = weights.travel * route.travel_time() + weights.time_window_violation * route.tw_violations() as f64;
    assert!((route.cost() - expected_cost).abs() < 1e-9);
}

/// Applying a move and then its inverse restores a solution's cost and
/// per-route node arrangement, for both move directions of an inter-route
/// swap.
#[test]
fn inter_route_swap_followed_by_its_inverse_restores_the_solution() {
    let nodes = vec![
        location_node("depot", NodeKind::Depot, 0.0, WIDE, 0.0),
        location_node("dump", NodeKind::Dump, 0.0, WIDE, 0.0),
        location_node("a", NodeKind::Pickup, 5.0, WIDE, 0.0),
        location_node("b", NodeKind::Pickup, 5.0, WIDE, 0.0),
    ];
    let pairs = vec![
        (0, 2, 1.0),
        (2, 1, 1.0),
        (0, 3, 2.0),
        (3, 1, 2.0),
        (1, 0, 1.0),
        (1, 2, 1.0),
        (1, 3, 2.0),
        (2, 0, 1.0),
        (3, 0, 2.0),
    ];
    let n = nodes.len();
    let matrix = TravelTimeMatrix::from_pairs(n, pairs);
    let catalog = NodeCatalog::new(nodes, matrix);
    let make_vehicle = || {
        VehicleBuilder::default()
            .set_external_id("v".to_string())
            .set_capacity(Capacity::new(100.0))
            .set_start_depot(NodeId::from(0))
            .set_dump(NodeId::from(1))
            .set_end_depot(NodeId::from(0))
            .set_shift(TimeWindow::from_offsets_secs(WIDE.0, WIDE.1))
            .build()
    };
    let problem = Problem::new(catalog, vec![make_vehicle(), make_vehicle()]);

    let v0 = VehicleId::new(0);
    let v1 = VehicleId::new(1);
    let a = NodeId::from(2);
    let b = NodeId::from(3);

    let mut solution = Solution::new(&problem);
    let pos0 = solution.route(v0).editable_end_pos();
    solution.route_mut(v0).insert(a, pos0);
    let pos1 = solution.route(v1).editable_end_pos();
    solution.route_mut(v1).insert(b, pos1);
    solution.recompute_cost();

    let original_cost = solution.cost();
    let original_nodes_v0 = solution.route(v0).nodes().to_vec();
    let original_nodes_v1 = solution.route(v1).nodes().to_vec();

    let mv = Move::inter_swap(v0, a, pos0, v1, b, pos1, 0.0);
    solution.apply(&mv);
    assert_ne!(solution.route(v0).nodes().to_vec(), original_nodes_v0);

    solution.apply(&mv.inverse());

    assert!((solution.cost() - original_cost).abs() < 1e-9);
    assert_eq!(solution.route(v0).nodes().to_vec(), original_nodes_v0);
    assert_eq!(solution.route(v1).nodes().to_vec(), original_nodes_v1);
}

/// The same round trip for an `Ins` move whose source is the unassigned
/// bucket rather than another route: applying the move assigns the
/// container, and applying its inverse puts it back in the unassigned
/// bucket with the route and cost exactly as they started.
#[test]
fn insert_from_unassigned_followed_by_its_inverse_restores_the_solution() {
    let nodes = vec![
        location_node("depot", NodeKind::Depot, 0.0, WIDE, 0.0),
        location_node("dump", NodeKind::Dump, 0.0, WIDE, 0.0),
        location_node("c", NodeKind::Pickup, 5.0, WIDE, 0.0),
    ];
    let pairs = vec![(0, 2, 1.0), (2, 1, 1.0), (1, 0, 1.0)];
    let problem = one_vehicle_problem(nodes, pairs, 100.0);
    let vid = VehicleId::new(0);
    let c = NodeId::from(2);

    let mut solution = Solution::new(&problem);
    solution.mark_unassigned(c);
    solution.recompute_cost();

    let original_cost = solution.cost();
    let original_nodes = solution.route(vid).nodes().to_vec();
    assert!(solution.unassigned().contains(&c));

    let pos = solution.route(vid).editable_end_pos();
    let mv = Move::insert(c, SENTINEL_VEHICLE, 0, vid, pos, 0.0);
    solution.apply(&mv);
    assert!(!solution.unassigned().contains(&c));
    assert_ne!(solution.route(vid).nodes().to_vec(), original_nodes);

    solution.apply(&mv.inverse());

    assert!((solution.cost() - original_cost).abs() < 1e-9);
    assert_eq!(solution.route(vid).nodes().to_vec(), original_nodes);
    assert!(solution.unassigned().contains(&c));
}
