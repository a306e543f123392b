//! Fixture builders shared by the `#[cfg(test)]` modules colocated with
//! each solver component: a small, wide-open problem instance that keeps
//! every feasibility check trivially true unless a test deliberately
//! tightens a window or capacity.

use crate::problem::{
    Problem,
    capacity::Capacity,
    catalog::NodeCatalog,
    node::{Node, NodeBuilder, NodeId, NodeKind},
    location::Location,
    time_window::TimeWindow,
    vehicle::{Vehicle, VehicleBuilder},
};
use dumproute_matrix::TravelTimeMatrix;

const WIDE_OPEN: (f64, f64) = (0.0, 1.0e9);
const NUM_PICKUP_SLOTS: usize = 6;

/// One depot, one dump, `NUM_PICKUP_SLOTS` pickups, and two vehicles
/// sharing the depot/dump, all with wide-open time windows and a
/// constant-1.0 travel matrix so any edit is feasible unless a test
/// narrows a window or capacity on purpose.
pub fn basic_problem() -> Problem {
    let mut nodes: Vec<Node> = Vec::new();

    nodes.push(
        NodeBuilder::default()
            .set_external_id("depot".to_string())
            .set_kind(NodeKind::Depot)
            .set_location(Location::from_xy(0.0, 0.0))
            .set_demand(Capacity::ZERO)
            .set_time_window(TimeWindow::from_offsets_secs(WIDE_OPEN.0, WIDE_OPEN.1))
            .build(),
    );
    nodes.push(
        NodeBuilder::default()
            .set_external_id("dump".to_string())
            .set_kind(NodeKind::Dump)
            .set_location(Location::from_xy(1.0, 0.0))
            .set_demand(Capacity::ZERO)
            .set_time_window(TimeWindow::from_offsets_secs(WIDE_OPEN.0, WIDE_OPEN.1))
            .build(),
    );
    for i in 0..NUM_PICKUP_SLOTS {
        nodes.push(
            NodeBuilder::default()
                .set_external_id(format!("pickup{i}"))
                .set_kind(NodeKind::Pickup)
                .set_location(Location::from_xy(2.0 + i as f64, 0.0))
                .set_demand(Capacity::new(10.0))
                .set_time_window(TimeWindow::from_offsets_secs(WIDE_OPEN.0, WIDE_OPEN.1))
                .build(),
        );
    }

    let matrix = TravelTimeMatrix::from_constant(nodes.len(), 1.0);
    let catalog = NodeCatalog::new(nodes, matrix);

    let depot = NodeId::from(0);
    let dump = NodeId::from(1);

    let vehicles: Vec<Vehicle> = (0..2)
        .map(|i| {
            VehicleBuilder::default()
                .set_external_id(format!("truck{i}"))
                .set_capacity(Capacity::new(1000.0))
                .set_start_depot(depot)
                .set_dump(dump)
                .set_end_depot(depot)
                .set_shift(TimeWindow::from_offsets_secs(WIDE_OPEN.0, WIDE_OPEN.1))
                .build()
        })
        .collect();

    Problem::new(catalog, vehicles)
}

/// Looks up the `index`-th catalog node of `kind` in `problem` (built by
/// [`basic_problem`]) rather than fabricating a node out-of-band, since a
/// `Problem`'s catalog is immutable once constructed.
pub fn make_node(problem: &Problem, kind: NodeKind, index: usize) -> NodeId {
    problem
        .catalog()
        .nodes_of_kind(kind)
        .nth(index)
        .unwrap_or_else(|| panic!("fixture problem has no node #{index} of kind {kind:?}"))
}
