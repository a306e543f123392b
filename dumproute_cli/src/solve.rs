//! Wires a parsed [`dumproute_core::problem::Problem`] into the tabu search
//! driver and reports the result: build the search parameters, run the
//! search to completion, log a one-line summary of the best solution found.

use std::time::Duration;

use dumproute_core::problem::Problem;
use dumproute_core::solver::search::{solve, SearchParams, SearchStatistics};
use dumproute_core::solver::solution::Solution;
use tracing::info;

/// CLI-tunable overrides (`--tabu-tenure`, `--max-iterations`,
/// `--time-budget`, and the three per-family stagnation caps) layered onto
/// [`SearchParams::default`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOverrides {
    pub tabu_tenure: Option<usize>,
    pub max_stagnation_ins: Option<usize>,
    pub max_stagnation_intra_sw: Option<usize>,
    pub max_stagnation_inter_sw: Option<usize>,
    pub max_outer_iterations: Option<usize>,
    pub time_budget: Option<Duration>,
}

impl SearchOverrides {
    fn apply(self, mut params: SearchParams) -> SearchParams {
        if let Some(v) = self.tabu_tenure {
            params.tabu_tenure = v;
        }
        if let Some(v) = self.max_stagnation_ins {
            params.max_stagnation_ins = v;
        }
        if let Some(v) = self.max_stagnation_intra_sw {
            params.max_stagnation_intra_sw = v;
        }
        if let Some(v) = self.max_stagnation_inter_sw {
            params.max_stagnation_inter_sw = v;
        }
        if let Some(v) = self.max_outer_iterations {
            params.max_outer_iterations = v;
        }
        if self.time_budget.is_some() {
            params.time_budget = self.time_budget;
        }
        params
    }
}

/// Builds an initial solution, runs the tabu search to completion, and logs
/// a one-line summary of the outcome.
pub fn run(problem: &Problem, overrides: SearchOverrides) -> (Solution<'_>, SearchStatistics) {
    let params = overrides.apply(SearchParams::default());
    let (best, stats) = solve(problem, params);

    let non_empty_routes = best.non_empty_routes().count();
    let moves_applied = stats.ins.moves_applied + stats.intra_sw.moves_applied + stats.inter_sw.moves_applied;
    info!(
        "Finished: routes = {}, cost = {:.3}, unassigned = {}, outer_iterations = {}, moves_applied = {}",
        non_empty_routes,
        best.cost(),
        best.unassigned().len(),
        stats.outer_iterations,
        moves_applied,
    );

    (best, stats)
}

/// Prints the per-family breakdown behind the one-line summary `run` logs,
/// for `--stats`.
pub fn print_stats(stats: &SearchStatistics) {
    println!("outer_iterations: {}", stats.outer_iterations);
    println!("moves_checked: {}", stats.moves_checked);
    println!("moves_checked_tabu: {}", stats.moves_checked_tabu);
    println!("best_updated_cnt: {}", stats.best_updated_cnt);
    for (label, family) in [("ins", &stats.ins), ("intra_sw", &stats.intra_sw), ("inter_sw", &stats.inter_sw)] {
        println!(
            "{label}: candidates_generated = {}, moves_applied = {}",
            family.candidates_generated, family.moves_applied,
        );
    }
}
