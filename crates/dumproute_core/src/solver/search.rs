use std::time::{Duration, Instant};

use fxhash::FxHashMap;
use tracing::{debug, info};

use crate::problem::Problem;
use crate::solver::builder::build_initial_solution;
use crate::solver::moves::{Move, MoveKind, TabuKey, sort_by_savings};
use crate::solver::neighborhood;
use crate::solver::solution::Solution;
use crate::solver::twc::CompatibilityOracle;

/// Tabu search tunables. `tabu_tenure` is the constant `T`; the three
/// stagnation caps are `S_Ins`/`S_IntraSw`/`S_InterSw`.
/// Defaults match the typical values used for this problem class.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub tabu_tenure: usize,
    pub max_stagnation_ins: usize,
    pub max_stagnation_intra_sw: usize,
    pub max_stagnation_inter_sw: usize,
    pub max_outer_iterations: usize,
    pub time_budget: Option<Duration>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            tabu_tenure: 10,
            max_stagnation_ins: 500,
            max_stagnation_intra_sw: 300,
            max_stagnation_inter_sw: 300,
            max_outer_iterations: 10_000,
            time_budget: None,
        }
    }
}

/// Per-family move-generation/application counters, returned as plain
/// data rather than printed from inside the driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct FamilyStats {
    pub candidates_generated: u64,
    pub moves_applied: u64,
}

/// Running totals handed back by [`TabuSearchDriver::run`]; the CLI's
/// `--stats` surfaces these directly.
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    pub outer_iterations: usize,
    pub moves_checked: u64,
    pub moves_checked_tabu: u64,
    pub best_updated_cnt: u64,
    pub ins: FamilyStats,
    pub intra_sw: FamilyStats,
    pub inter_sw: FamilyStats,
}

impl SearchStatistics {
    fn family_mut(&mut self, kind: MoveKind) -> &mut FamilyStats {
        match kind {
            MoveKind::Ins => &mut self.ins,
            MoveKind::IntraSw => &mut self.intra_sw,
            MoveKind::InterSw => &mut self.inter_sw,
        }
    }
}

/// Tabu search's memory: every currently-tabu move's expiration iteration,
/// keyed by tabu-equivalence. Expired entries are swept lazily on insert,
/// bounding memory without a separate background sweep. Insertions do not
/// de-duplicate; the newest expiration overwrites the old one, which is
/// exactly `HashMap::insert`'s behavior.
pub struct TabuList {
    tenure: usize,
    expirations: FxHashMap<TabuKey, usize>,
}

impl TabuList {
    pub fn new(tenure: usize) -> Self {
        Self {
            tenure,
            expirations: FxHashMap::default(),
        }
    }

    /// True iff `key` has an active (unexpired) entry at `iter`.
    pub fn is_active(&self, key: &TabuKey, iter: usize) -> bool {
        self.expirations.get(key).is_some_and(|&expiry| expiry > iter)
    }

    pub fn insert(&mut self, key: TabuKey, iter: usize) {
        self.expirations.retain(|_, expiry| *expiry > iter);
        self.expirations.insert(key, iter + self.tenure);
    }

    pub fn len(&self) -> usize {
        self.expirations.len()
    }
}

/// The token-ring tabu search driver. Owns the current and best-so-far
/// solutions, the iteration counter, and the tabu list; repeatedly asks
/// the neighborhood generator for move candidates against the current
/// solution, applies accepted moves through
/// [`Solution::apply`], and tracks the best-so-far solution by cost.
pub struct TabuSearchDriver<'a> {
    oracle: &'a CompatibilityOracle,
    params: SearchParams,
    tabu: TabuList,
    iter: usize,
    stats: SearchStatistics,
}

impl<'a> TabuSearchDriver<'a> {
    pub fn new(oracle: &'a CompatibilityOracle, params: SearchParams) -> Self {
        Self {
            oracle,
            tabu: TabuList::new(params.tabu_tenure),
            params,
            iter: 0,
            stats: SearchStatistics::default(),
        }
    }

    /// Runs the full search starting from `current`, returning the
    /// best-so-far `Solution` and the accumulated [`SearchStatistics`].
    /// The outer loop terminates when an entire round produces no change,
    /// the iteration cap is reached, or the wall-clock budget (consulted
    /// only between outer iterations, never inside an inner pass) elapses.
    pub fn run(mut self, mut current: Solution<'a>) -> (Solution<'a>, SearchStatistics) {
        let start = Instant::now();
        let mut best_cost = current.cost();
        let mut best = current.clone();

        for outer in 0..self.params.max_outer_iterations {
            self.stats.outer_iterations = outer + 1;
            if let Some(budget) = self.params.time_budget
                && start.elapsed() >= budget
            {
                break;
            }

            let ins_changed = self.inner_pass(
                MoveKind::Ins,
                self.params.max_stagnation_ins,
                &mut current,
                &mut best,
                &mut best_cost,
            );
            let intra_changed = self.inner_pass(
                MoveKind::IntraSw,
                self.params.max_stagnation_intra_sw,
                &mut current,
                &mut best,
                &mut best_cost,
            );
            let inter_changed = self.inner_pass(
                MoveKind::InterSw,
                self.params.max_stagnation_inter_sw,
                &mut current,
                &mut best,
                &mut best_cost,
            );

            debug!(
                iteration = self.stats.outer_iterations,
                ins_applied = self.stats.ins.moves_applied,
                intra_sw_applied = self.stats.intra_sw.moves_applied,
                inter_sw_applied = self.stats.inter_sw.moves_applied,
                best_cost,
                "outer iteration finished"
            );

            if !(ins_changed || intra_changed || inter_changed) {
                break;
            }
        }

        info!(
            outer_iterations = self.stats.outer_iterations,
            best_cost,
            moves_checked = self.stats.moves_checked,
            "search finished"
        );

        (best, self.stats)
    }

    fn generate(&self, kind: MoveKind, solution: &Solution<'a>) -> Vec<Move> {
        match kind {
            MoveKind::Ins => neighborhood::insertions(solution, self.oracle),
            MoveKind::IntraSw => neighborhood::intra_swaps(solution),
            MoveKind::InterSw => neighborhood::inter_swaps(solution),
        }
    }

    /// One move family's stagnation-bounded inner pass. Returns whether
    /// the pass applied at least one move.
    fn inner_pass(
        &mut self,
        kind: MoveKind,
        max_stagnation: usize,
        current: &mut Solution<'a>,
        best: &mut Solution<'a>,
        best_cost: &mut f64,
    ) -> bool {
        let mut pass_changed = false;
        let mut stagnation = 0usize;

        loop {
            if stagnation >= max_stagnation {
                break;
            }

            let mut candidates = self.generate(kind, current);
            self.stats.family_mut(kind).candidates_generated += candidates.len() as u64;
            if candidates.is_empty() {
                break;
            }
            sort_by_savings(&mut candidates);

            let mut accepted: Option<(Move, bool)> = None;
            for mv in &candidates {
                self.stats.moves_checked += 1;
                let predicted = current.cost() - mv.savings;

                if predicted < *best_cost {
                    accepted = Some((*mv, true));
                    break;
                }

                if !self.tabu.is_active(&mv.tabu_key(), self.iter) {
                    accepted = Some((*mv, false));
                    break;
                }

                self.stats.moves_checked_tabu += 1;
            }

            let Some((mv, is_aspiration)) = accepted else {
                break;
            };

            current.apply(&mv);
            self.tabu.insert(mv.tabu_key(), self.iter);
            self.stats.family_mut(kind).moves_applied += 1;
            pass_changed = true;

            if is_aspiration && current.cost() < *best_cost {
                *best = current.clone();
                *best_cost = current.cost();
                self.stats.best_updated_cnt += 1;
                stagnation = 0;
            } else {
                stagnation += 1;
            }

            self.iter += 1;
        }

        pass_changed
    }
}

/// Convenience entry point: builds the compatibility oracle and initial
/// solution, then runs the tabu search to completion. The CLI's `optimize`
/// path is this function plus I/O on either side.
pub fn solve(problem: &Problem, params: SearchParams) -> (Solution<'_>, SearchStatistics) {
    let oracle = CompatibilityOracle::build(problem);
    solve_with_oracle(problem, &oracle, params)
}

/// Same as [`solve`] but reuses an already-built oracle (the CLI builds
/// one oracle per problem and may want to inspect it afterward).
pub fn solve_with_oracle<'a>(
    problem: &'a Problem,
    oracle: &CompatibilityOracle,
    params: SearchParams,
) -> (Solution<'a>, SearchStatistics) {
    let initial = crate::timer_debug!("initial-solution construction", build_initial_solution(problem, oracle));
    let driver = TabuSearchDriver::new(oracle, params);
    driver.run(initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::node::NodeKind;
    use crate::test_utils::{basic_problem, make_node};

    #[test]
    fn tabu_list_expires_after_tenure() {
        let mut tabu = TabuList::new(5);
        let mv = Move::intra_swap(
            crate::problem::vehicle::VehicleId::new(0),
            crate::problem::node::NodeId::new(1),
            1,
            crate::problem::node::NodeId::new(2),
            2,
            3.0,
        );
        tabu.insert(mv.tabu_key(), 10);
        assert!(tabu.is_active(&mv.tabu_key(), 10));
        assert!(tabu.is_active(&mv.tabu_key(), 14));
        assert!(!tabu.is_active(&mv.tabu_key(), 15));
    }

    #[test]
    fn newest_insertion_overwrites_expiration() {
        let mut tabu = TabuList::new(5);
        let mv = Move::intra_swap(
            crate::problem::vehicle::VehicleId::new(0),
            crate::problem::node::NodeId::new(1),
            1,
            crate::problem::node::NodeId::new(2),
            2,
            3.0,
        );
        tabu.insert(mv.tabu_key(), 0);
        tabu.insert(mv.tabu_key(), 3);
        assert!(tabu.is_active(&mv.tabu_key(), 7));
        assert!(!tabu.is_active(&mv.tabu_key(), 8));
    }

    #[test]
    fn solve_never_increases_cost_relative_to_the_initial_solution() {
        let problem = basic_problem();
        let oracle = CompatibilityOracle::build(&problem);
        let initial = build_initial_solution(&problem, &oracle);
        let initial_cost = initial.cost();

        let params = SearchParams {
            max_outer_iterations: 20,
            ..SearchParams::default()
        };
        let driver = TabuSearchDriver::new(&oracle, params);
        let (best, stats) = driver.run(initial);

        assert!(best.cost() <= initial_cost + 1e-9);
        assert!(stats.outer_iterations > 0);
    }

    #[test]
    fn reassigns_far_cluster_to_the_other_vehicle() {
        // Two geographic clusters; everything starts on vehicle 0.
        use crate::problem::{
            Problem, capacity::Capacity, catalog::NodeCatalog, location::Location,
            node::NodeBuilder, time_window::TimeWindow, vehicle::VehicleBuilder,
        };
        use dumproute_matrix::TravelTimeMatrix;

        let wide = || TimeWindow::from_offsets_secs(0.0, 1.0e9);
        let mut nodes = vec![
            NodeBuilder::default()
                .set_external_id("depot".into())
                .set_kind(NodeKind::Depot)
                .set_location(Location::from_xy(0.0, 0.0))
                .set_time_window(wide())
                .build(),
            NodeBuilder::default()
                .set_external_id("dump".into())
                .set_kind(NodeKind::Dump)
                .set_location(Location::from_xy(0.0, 0.0))
                .set_time_window(wide())
                .build(),
        ];
        // Cluster A near the depot, cluster B far away.
        for (i, x) in [1.0, 1.1, 100.0, 100.1].into_iter().enumerate() {
            nodes.push(
                NodeBuilder::default()
                    .set_external_id(format!("p{i}"))
                    .set_kind(NodeKind::Pickup)
                    .set_location(Location::from_xy(x, 0.0))
                    .set_demand(Capacity::new(1.0))
                    .set_time_window(wide())
                    .build(),
            );
        }
        let n = nodes.len();
        let coords: Vec<f64> = nodes.iter().map(|n| n.location().x()).collect();
        let mut flat = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                flat[i * n + j] = (coords[i] - coords[j]).abs();
            }
        }
        let matrix = TravelTimeMatrix::from_flat(flat, n).unwrap();
        let catalog = NodeCatalog::new(nodes, matrix);

        let make_vehicle = |name: &str| {
            VehicleBuilder::default()
                .set_external_id(name.to_string())
                .set_capacity(Capacity::new(100.0))
                .set_start_depot(crate::problem::node::NodeId::from(0))
                .set_dump(crate::problem::node::NodeId::from(1))
                .set_end_depot(crate::problem::node::NodeId::from(0))
                .set_shift(wide())
                .build()
        };
        let problem = Problem::new(catalog, vec![make_vehicle("v0"), make_vehicle("v1")]);

        let v0 = crate::problem::vehicle::VehicleId::new(0);
        let v1 = crate::problem::vehicle::VehicleId::new(1);

        let mut degenerate = Solution::new(&problem);
        for i in 0..4 {
            let pickup = make_node(&problem, NodeKind::Pickup, i);
            let pos = degenerate.route(v0).editable_end_pos();
            degenerate.route_mut(v0).insert(pickup, pos);
            degenerate.mark_assigned(pickup);
        }
        degenerate.recompute_cost();
        let degenerate_cost = degenerate.cost();
        let _ = v1;

        let oracle = CompatibilityOracle::build(&problem);
        let params = SearchParams {
            max_outer_iterations: 50,
            ..SearchParams::default()
        };
        let driver = TabuSearchDriver::new(&oracle, params);
        let (best, _stats) = driver.run(degenerate);

        assert!(best.cost() < degenerate_cost);
    }
}
