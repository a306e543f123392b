use fxhash::FxHashSet;

use crate::problem::{Problem, node::NodeId, vehicle::VehicleId};
use crate::solver::moves::{Move, MoveKind, SENTINEL_VEHICLE};
use crate::solver::route::Route;

/// A fleet of routes plus the set of containers not yet assigned to any
/// route. `cost()` is a cache kept current by `apply`, which only
/// re-derives the two (at most) routes a move actually touched, never the
/// whole fleet.
#[derive(Clone)]
pub struct Solution<'a> {
    problem: &'a Problem,
    routes: Vec<Route<'a>>,
    unassigned: FxHashSet<NodeId>,
    cost: f64,
}

impl<'a> Solution<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        let routes: Vec<Route<'a>> = problem.vehicle_ids().map(|vid| Route::new(problem, vid)).collect();
        let cost = routes.iter().map(Route::cost).sum();
        Self {
            problem,
            routes,
            unassigned: problem.pickups().collect(),
            cost,
        }
    }

    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    pub fn routes(&self) -> &[Route<'a>] {
        &self.routes
    }

    pub fn route(&self, vid: VehicleId) -> &Route<'a> {
        &self.routes[vid.get()]
    }

    pub fn route_mut(&mut self, vid: VehicleId) -> &mut Route<'a> {
        &mut self.routes[vid.get()]
    }

    pub fn unassigned(&self) -> &FxHashSet<NodeId> {
        &self.unassigned
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Sum over routes, recomputed from scratch. Used by property tests to
    /// check the incremental `cost` cache never drifts.
    pub fn recompute_cost_from_scratch(&self) -> f64 {
        self.routes.iter().map(Route::cost).sum()
    }

    /// Re-derives the cached total from scratch. The initial-solution
    /// builder edits routes directly through [`Route`]'s own contract
    /// rather than through [`Solution::apply`] (dump insertions
    /// have no `Move` representation), so it calls this once after
    /// construction instead of tracking a running delta.
    pub fn recompute_cost(&mut self) {
        self.cost = self.recompute_cost_from_scratch();
    }

    pub fn mark_assigned(&mut self, node: NodeId) {
        self.unassigned.remove(&node);
    }

    pub fn mark_unassigned(&mut self, node: NodeId) {
        self.unassigned.insert(node);
    }

    /// Dispatches `mv` to the route operation(s) it describes and updates
    /// the cached total cost by the exact delta of the route(s) touched.
    /// This is the single mutation entry point local search uses;
    /// the route-level primitives in `route.rs` are never called directly
    /// by the tabu driver.
    pub fn apply(&mut self, mv: &Move) {
        match mv.kind {
            MoveKind::Ins => self.apply_insert(mv),
            MoveKind::IntraSw => self.apply_intra_swap(mv),
            MoveKind::InterSw => self.apply_inter_swap(mv),
        }
    }

    /// Whether the move has a real source/destination route is read off
    /// `mv.vid1`/`mv.vid2` against the sentinel, not off the current
    /// membership of `mv.nid1` in `self.unassigned` — the latter is only
    /// true for a forward move sourced from the unassigned bucket, but it
    /// is *also* true after that move has been applied, which is exactly
    /// the state `mv.inverse()` gets applied against. Branching on the
    /// node's live membership would misroute the inverse of such a move
    /// into the "has a source route" arm with `vid2 == SENTINEL_VEHICLE`,
    /// an out-of-bounds route index.
    fn apply_insert(&mut self, mv: &Move) {
        let has_source = mv.vid1 != SENTINEL_VEHICLE;
        let has_dest = mv.vid2 != SENTINEL_VEHICLE;

        let cost_of = |solution: &Self| -> f64 {
            let mut total = 0.0;
            if has_source {
                total += solution.routes[mv.vid1.get()].cost();
            }
            if has_dest {
                total += solution.routes[mv.vid2.get()].cost();
            }
            total
        };

        let old = cost_of(self);

        if has_source {
            let removed = self.routes[mv.vid1.get()].erase(mv.pos1);
            debug_assert_eq!(removed, mv.nid1);
        }
        if has_dest {
            self.routes[mv.vid2.get()].insert(mv.nid1, mv.pos2);
            self.mark_assigned(mv.nid1);
        } else {
            self.mark_unassigned(mv.nid1);
        }

        let new = cost_of(self);
        self.cost += new - old;
    }

    fn apply_intra_swap(&mut self, mv: &Move) {
        let route = &mut self.routes[mv.vid1.get()];
        let old = route.cost();
        route.swap_positions(mv.pos1, mv.pos2);
        let new = route.cost();
        self.cost += new - old;
    }

    fn apply_inter_swap(&mut self, mv: &Move) {
        assert_ne!(mv.vid1, mv.vid2, "inter-route swap requires two distinct routes");
        let old = self.routes[mv.vid1.get()].cost() + self.routes[mv.vid2.get()].cost();

        let (i, j) = (mv.vid1.get(), mv.vid2.get());
        let (lo, hi) = (i.min(j), i.max(j));
        let (left, right) = self.routes.split_at_mut(hi);
        if i < j {
            left[lo].swap_with(&mut right[0], mv.pos1, mv.pos2);
        } else {
            right[0].swap_with(&mut left[lo], mv.pos1, mv.pos2);
        }

        let new = self.routes[mv.vid1.get()].cost() + self.routes[mv.vid2.get()].cost();
        self.cost += new - old;
    }

    pub fn non_empty_routes(&self) -> impl Iterator<Item = &Route<'a>> {
        self.routes.iter().filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::node::NodeKind;
    use crate::test_utils::{basic_problem, make_node};

    #[test]
    fn new_solution_starts_with_all_pickups_unassigned() {
        let problem = basic_problem();
        let solution = Solution::new(&problem);
        assert_eq!(solution.cost(), 0.0);
        assert!(solution.unassigned().is_empty(), "fixture problem carries no pre-declared pickups");
    }

    #[test]
    fn apply_insert_updates_cached_cost_to_match_recompute() {
        let problem = basic_problem();
        let pickup = make_node(&problem, NodeKind::Pickup, 0);
        let mut solution = Solution::new(&problem);
        solution.mark_unassigned(pickup);

        let vid = VehicleId::new(0);
        let pos = solution.route(vid).editable_end_pos();
        let mv = Move::insert(pickup, VehicleId::new(usize::MAX), 0, vid, pos, 0.0);
        solution.apply(&mv);

        assert!((solution.cost() - solution.recompute_cost_from_scratch()).abs() < 1e-9);
        assert!(!solution.unassigned().contains(&pickup));
    }

    #[test]
    fn apply_inter_swap_keeps_cost_cache_exact() {
        let problem = basic_problem();
        let mut solution = Solution::new(&problem);
        let a = make_node(&problem, NodeKind::Pickup, 0);
        let b = make_node(&problem, NodeKind::Pickup, 1);

        let v0 = VehicleId::new(0);
        let v1 = VehicleId::new(1);
        let pos0 = solution.route(v0).editable_end_pos();
        solution.route_mut(v0).insert(a, pos0);
        let pos1 = solution.route(v1).editable_end_pos();
        solution.route_mut(v1).insert(b, pos1);
        solution.cost = solution.recompute_cost_from_scratch();

        let mv = Move::inter_swap(v0, a, pos0, v1, b, pos1, 0.0);
        solution.apply(&mv);

        assert_eq!(solution.route(v0).node_at(pos0), b);
        assert_eq!(solution.route(v1).node_at(pos1), a);
        assert!((solution.cost() - solution.recompute_cost_from_scratch()).abs() < 1e-9);
    }
}
