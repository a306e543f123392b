use dumproute_matrix::TravelTimeMatrix;

use crate::utils::enumerate_idx::EnumerateIdx;

use super::node::{Node, NodeId, NodeKind};

/// The immutable data store backing every search. Holds the dense node
/// list (indexed 0..N by `NodeId`) alongside the travel-time matrix built
/// over the same index space. Built once from the input files and shared
/// by reference for the lifetime of a search; nothing here is ever
/// mutated after [`NodeCatalog::new`] returns.
pub struct NodeCatalog {
    nodes: Vec<Node>,
    matrix: TravelTimeMatrix,
}

impl NodeCatalog {
    pub fn new(nodes: Vec<Node>, matrix: TravelTimeMatrix) -> Self {
        assert_eq!(
            nodes.len(),
            matrix.num_locations(),
            "node catalog size must match the travel-time matrix dimension"
        );
        Self { nodes, matrix }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Nonnegative travel duration in seconds between two catalog nodes, or
    /// `f64::INFINITY` if the pair is unreachable. `travel(i, j)` need not
    /// equal `travel(j, i)`.
    pub fn travel_time(&self, from: NodeId, to: NodeId) -> f64 {
        self.matrix.travel_time(from.get(), to.get())
    }

    pub fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
        self.matrix.is_reachable(from.get(), to.get())
    }

    pub fn matrix(&self) -> &TravelTimeMatrix {
        &self.matrix
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        let indexed: crate::utils::enumerate_idx::IndexedIter<_, NodeId> = self.nodes.iter().enumerate_idx();
        indexed.filter(move |&(_, n)| n.kind() == kind).map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate_idx()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{
        capacity::Capacity, location::Location, node::NodeBuilder, time_window::TimeWindow,
    };

    fn node(kind: NodeKind) -> Node {
        NodeBuilder::default()
            .set_external_id("n".to_string())
            .set_kind(kind)
            .set_location(Location::from_xy(0.0, 0.0))
            .set_demand(Capacity::ZERO)
            .set_time_window(TimeWindow::from_offsets_secs(0.0, 1.0e9))
            .build()
    }

    #[test]
    fn nodes_of_kind_filters_correctly() {
        let nodes = vec![node(NodeKind::Depot), node(NodeKind::Pickup), node(NodeKind::Dump)];
        let matrix = TravelTimeMatrix::from_constant(3, 1.0);
        let catalog = NodeCatalog::new(nodes, matrix);

        let pickups: Vec<_> = catalog.nodes_of_kind(NodeKind::Pickup).collect();
        assert_eq!(pickups, vec![NodeId::from(1)]);
    }

    #[test]
    fn travel_time_indexes_the_matrix_in_order() {
        let nodes = vec![node(NodeKind::Depot), node(NodeKind::Pickup)];
        let matrix = TravelTimeMatrix::from_pairs(2, [(0, 1, 7.0), (1, 0, 3.0)]);
        let catalog = NodeCatalog::new(nodes, matrix);

        assert_eq!(catalog.travel_time(NodeId::from(0), NodeId::from(1)), 7.0);
        assert_eq!(catalog.travel_time(NodeId::from(1), NodeId::from(0)), 3.0);
    }
}
