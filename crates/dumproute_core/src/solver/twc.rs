use crate::problem::{Problem, node::NodeId};

/// Precomputed pairwise reachability and distance hints, built once from
/// a `Problem` and immutable afterward. Used implicitly by the
/// neighborhood generator (via the route-level delta screens) and
/// directly by the initial-solution builder to prune obviously infeasible
/// candidates before paying for a full delta query.
pub struct CompatibilityOracle {
    num_nodes: usize,
    /// `compatible[i * num_nodes + j]`: true iff serving `j` directly
    /// after `i` is time-window feasible, i.e. the earliest possible
    /// arrival at `j` (departing `i` at its own window open, or as late
    /// as `i`'s close if that is later; see `earliest_departure`) does not
    /// exceed `j`'s close.
    compatible: Vec<bool>,
    /// Nearest reachable dump id per node, used by the builder's
    /// dump-insertion heuristic when more than one dump exists.
    nearest_dump: Vec<Option<NodeId>>,
}

impl CompatibilityOracle {
    pub fn build(problem: &Problem) -> Self {
        let catalog = problem.catalog();
        let n = catalog.len();
        let mut compatible = vec![false; n * n];

        for (i, node_i) in catalog.iter() {
            // Earliest a vehicle could depart i: arrive at i's own open at
            // the earliest, then serve it.
            let earliest_departure = node_i.time_window().open() + node_i.service_duration();
            for (j, node_j) in catalog.iter() {
                if i == j {
                    continue;
                }
                let travel = catalog.travel_time(i, j);
                if !travel.is_finite() {
                    continue;
                }
                let earliest_arrival = earliest_departure + jiff::SignedDuration::from_secs_f64(travel);
                compatible[i.get() * n + j.get()] = node_j.time_window().is_satisfied(earliest_arrival);
            }
        }

        let dumps: Vec<NodeId> = catalog.nodes_of_kind(crate::problem::node::NodeKind::Dump).collect();
        let nearest_dump = (0..n)
            .map(|idx| {
                let from = NodeId::from(idx);
                dumps
                    .iter()
                    .copied()
                    .filter(|&d| catalog.is_reachable(from, d))
                    .min_by(|&a, &b| {
                        catalog
                            .travel_time(from, a)
                            .partial_cmp(&catalog.travel_time(from, b))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
            })
            .collect();

        Self {
            num_nodes: n,
            compatible,
            nearest_dump,
        }
    }

    /// Best-case feasibility hint: is it even plausible for `j` to follow
    /// `i` directly, assuming `i` is served at the earliest possible
    /// instant? A `false` here is a hard veto; no route position can
    /// make the pair feasible. A `true` does not guarantee feasibility in
    /// a concrete route (later arrival may be pushed past `j`'s close by
    /// accumulated wait/service earlier in the route).
    pub fn compatible(&self, i: NodeId, j: NodeId) -> bool {
        self.compatible[i.get() * self.num_nodes + j.get()]
    }

    pub fn nearest_dump(&self, from: NodeId) -> Option<NodeId> {
        self.nearest_dump[from.get()]
    }

    /// Geographic distance from `candidate` to the route edge `edge_from`
    /// -> `edge_to`, used by the initial-solution builder to break ties
    /// between candidates the time-window screen cannot distinguish. Not
    /// part of the precomputed tables above (a route's edges change during
    /// construction and search), so this reads node locations directly off
    /// `catalog` rather than a cached pairwise table.
    pub fn nearest_edge_distance(&self, catalog: &crate::problem::catalog::NodeCatalog, candidate: NodeId, edge_from: NodeId, edge_to: NodeId) -> f64 {
        let point = catalog.node(candidate).location();
        let from = catalog.node(edge_from).location();
        let to = catalog.node(edge_to).location();
        point.distance_to_segment(from, to)
    }
}
