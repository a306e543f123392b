use jiff::{SignedDuration, Timestamp};

use crate::problem::{Problem, capacity::Capacity, node::NodeId, vehicle::VehicleId};

/// Stand-in travel duration substituted for an unreachable edge so that
/// `Timestamp` arithmetic stays in range. Any node whose travel-time
/// matrix entry is `UNREACHABLE` (`f64::INFINITY`) is guaranteed to miss
/// its own close by this margin, so the resulting `tw_violations` count is
/// unaffected by the substitution; only the timestamp arithmetic is.
/// `cum_travel` itself is summed from the raw (possibly infinite) travel
/// values, never from this stand-in, so it still reports `+inf` truthfully.
const UNREACHABLE_TRAVEL_SECS: f64 = 1.0e10;

/// Per-position cumulative state, recomputed by every full evaluation
/// pass. `cum_travel`/`cum_wait`/`cum_service` are running sums in
/// seconds (not `SignedDuration`, so an unreachable edge can legitimately
/// push `cum_travel` to `+inf` without panicking); `arrival`/`departure`
/// are wall-clock instants checked against both the visited node's own
/// window and the vehicle's shift window.
#[derive(Debug, Clone, Copy)]
pub struct PositionState {
    pub arrival: Timestamp,
    pub wait: SignedDuration,
    pub departure: Timestamp,
    pub carried_load: Capacity,
    pub cum_travel: f64,
    pub cum_wait: f64,
    pub cum_service: f64,
    pub dump_visits: u32,
    pub tw_violations: u32,
    pub cap_violations: u32,
}

/// An ordered sequence of visits for one vehicle, with
/// per-position cumulative state maintained alongside. The last two
/// positions are always the vehicle's dump and ending depot (the "dump
/// sandwich" invariant); `Route::new` establishes this at construction
/// and every edit preserves it.
#[derive(Debug, Clone)]
pub struct Route<'a> {
    problem: &'a Problem,
    vehicle_id: VehicleId,
    nodes: Vec<NodeId>,
    state: Vec<PositionState>,
}

impl<'a> Route<'a> {
    /// Builds the minimal dump-sandwich route: start depot, dump, end
    /// depot, with no pickups. This "empty" route always costs 0 regardless
    /// of the depot-dump-depot travel it still reports.
    pub fn new(problem: &'a Problem, vehicle_id: VehicleId) -> Self {
        let vehicle = problem.vehicle(vehicle_id);
        let nodes = vec![vehicle.start_depot(), vehicle.dump(), vehicle.end_depot()];
        let mut route = Self {
            problem,
            vehicle_id,
            nodes,
            state: Vec::new(),
        };
        route.state.resize(
            route.nodes.len(),
            PositionState {
                arrival: Timestamp::UNIX_EPOCH,
                wait: SignedDuration::ZERO,
                departure: Timestamp::UNIX_EPOCH,
                carried_load: Capacity::ZERO,
                cum_travel: 0.0,
                cum_wait: 0.0,
                cum_service: 0.0,
                dump_visits: 0,
                tw_violations: 0,
                cap_violations: 0,
            },
        );
        route.re_evaluate_from(0);
        route
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // A route is never empty in the Vec sense (it always carries at
        // least the dump sandwich); "empty" here means "no pickups".
        self.num_pickups() == 0
    }

    pub fn node_at(&self, pos: usize) -> NodeId {
        self.nodes[pos]
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn state_at(&self, pos: usize) -> PositionState {
        self.state[pos]
    }

    fn num_pickups(&self) -> usize {
        self.nodes
            .iter()
            .filter(|&&n| self.problem.catalog().node(n).kind().is_pickup())
            .count()
    }

    fn last(&self) -> PositionState {
        *self.state.last().expect("route always has at least the dump sandwich")
    }

    pub fn travel_time(&self) -> f64 {
        self.last().cum_travel
    }

    pub fn tw_violations(&self) -> u32 {
        self.last().tw_violations
    }

    pub fn cap_violations(&self) -> u32 {
        self.last().cap_violations
    }

    pub fn feasible(&self) -> bool {
        self.tw_violations() == 0 && self.cap_violations() == 0
    }

    /// `w1*cum_travel + w2*cap_violations + w3*tw_violations`, except an
    /// empty route (no pickups) costs 0.
    pub fn cost(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let weights = self.problem.vehicle(self.vehicle_id).weights();
        let last = self.last();
        weights.travel * last.cum_travel
            + weights.capacity_violation * last.cap_violations as f64
            + weights.time_window_violation * last.tw_violations as f64
    }

    /// True when the last two positions are structurally (dump, ending
    /// depot) for this route's vehicle.
    pub fn has_dump_sandwich_invariant(&self) -> bool {
        let vehicle = self.problem.vehicle(self.vehicle_id);
        let n = self.nodes.len();
        n >= 3
            && self.nodes[0] == vehicle.start_depot()
            && self.nodes[n - 2] == vehicle.dump()
            && self.nodes[n - 1] == vehicle.end_depot()
            && self.problem.catalog().node(self.nodes[n - 2]).kind().is_dump()
            && self.problem.catalog().node(self.nodes[n - 1]).kind().is_depot()
    }

    /// First interior position an edit may target: right after the start
    /// depot. Neighborhood generators must never target position 0 or
    /// either of the trailing two positions, to preserve the dump sandwich
    /// invariant.
    pub fn first_editable_pos(&self) -> usize {
        1
    }

    /// One past the last interior position an edit may target (exclusive):
    /// the trailing dump and ending depot are off limits.
    pub fn editable_end_pos(&self) -> usize {
        self.nodes.len().saturating_sub(2)
    }

    fn assert_editable(&self, pos: usize) {
        assert!(
            pos >= self.first_editable_pos() && pos < self.editable_end_pos(),
            "position {pos} is not editable; it is part of the dump-sandwich invariant"
        );
    }

    /// Appends `node` as the last interior visit, just before the trailing
    /// dump and ending depot; used by the initial-solution builder.
    pub fn push_back(&mut self, node: NodeId) {
        let pos = self.editable_end_pos();
        self.insert(node, pos);
    }

    /// Inserts `node` so it becomes the visit at `pos`, shifting everything
    /// from `pos` onward one position later. `pos` must be interior (an
    /// existing editable position, or one past the last one, i.e. an
    /// append).
    pub fn insert(&mut self, node: NodeId, pos: usize) {
        assert!(
            pos >= self.first_editable_pos() && pos <= self.editable_end_pos(),
            "insert position {pos} would corrupt the dump-sandwich invariant"
        );
        self.nodes.insert(pos, node);
        self.state.insert(pos, self.state[pos.min(self.state.len() - 1)]);
        self.re_evaluate_from(pos);
    }

    /// Removes the visit at `pos`, returning its node id.
    pub fn erase(&mut self, pos: usize) -> NodeId {
        self.assert_editable(pos);
        let node = self.nodes.remove(pos);
        self.state.remove(pos);
        self.re_evaluate_from(pos.max(self.first_editable_pos()).min(self.nodes.len() - 1));
        node
    }

    /// Removes visits in `[from, to)`.
    pub fn erase_range(&mut self, from: usize, to: usize) {
        assert!(from <= to);
        if from == to {
            return;
        }
        self.assert_editable(from);
        self.assert_editable(to - 1);
        self.nodes.drain(from..to);
        self.state.drain(from..to);
        let p = from.max(self.first_editable_pos()).min(self.nodes.len() - 1);
        self.re_evaluate_from(p);
    }

    pub fn swap_positions(&mut self, i: usize, j: usize) {
        self.assert_editable(i);
        self.assert_editable(j);
        if i == j {
            return;
        }
        self.nodes.swap(i, j);
        self.re_evaluate_from(i.min(j));
    }

    /// Removes the node at `from` and re-inserts it at `to`, where `to` is
    /// interpreted as an index into the array *after* the removal.
    pub fn move_position(&mut self, from: usize, to: usize) {
        self.assert_editable(from);
        let node = self.nodes.remove(from);
        self.state.remove(from);
        assert!(
            to >= self.first_editable_pos() && to <= self.editable_end_pos(),
            "move destination {to} would corrupt the dump-sandwich invariant"
        );
        self.nodes.insert(to, node);
        self.state.insert(to, self.state[to.min(self.state.len() - 1)]);
        self.re_evaluate_from(from.min(to));
    }

    /// Reverses the interior segment `[i, j]` (inclusive).
    pub fn reverse(&mut self, i: usize, j: usize) {
        self.assert_editable(i);
        self.assert_editable(j);
        let (lo, hi) = (i.min(j), i.max(j));
        self.nodes[lo..=hi].reverse();
        self.re_evaluate_from(lo);
    }

    /// Removes the segment `[i, j]` (inclusive), reverses it, and
    /// reinserts it starting at `dest` (an index into the array after the
    /// segment has been removed).
    pub fn move_reverse(&mut self, i: usize, j: usize, dest: usize) {
        self.assert_editable(i);
        self.assert_editable(j);
        let (lo, hi) = (i.min(j), i.max(j));
        let mut segment: Vec<NodeId> = self.nodes.drain(lo..=hi).collect();
        self.state.drain(lo..=hi);
        segment.reverse();
        assert!(
            dest >= self.first_editable_pos() && dest <= self.editable_end_pos(),
            "move_reverse destination {dest} would corrupt the dump-sandwich invariant"
        );
        for (k, node) in segment.into_iter().enumerate() {
            self.nodes.insert(dest + k, node);
            self.state.insert(dest + k, self.state[(dest + k).min(self.state.len() - 1)]);
        }
        self.re_evaluate_from(lo.min(dest));
    }

    /// Exchanges the nodes at position `i` of `self` and position `j` of
    /// `other`. Both routes are re-evaluated from the earlier of their two
    /// modified positions.
    pub fn swap_with(&mut self, other: &mut Route<'a>, i: usize, j: usize) {
        self.assert_editable(i);
        other.assert_editable(j);
        std::mem::swap(&mut self.nodes[i], &mut other.nodes[j]);
        self.re_evaluate_from(i);
        other.re_evaluate_from(j);
    }

    /// Full re-evaluation from position `p` to the end: the earliest
    /// position whose predecessor changed is the one every edit above
    /// passes in.
    fn re_evaluate_from(&mut self, p: usize) {
        let catalog = self.problem.catalog();
        let vehicle = self.problem.vehicle(self.vehicle_id);

        let shift = vehicle.shift();
        let start = p.max(1);
        if p == 0 {
            let node = catalog.node(self.nodes[0]);
            let tw = node.time_window();
            // The vehicle's shift window bounds every visit, including the
            // earliest departure from its own starting depot.
            let arrival = if shift.open() > tw.open() { shift.open() } else { tw.open() };
            let tw_violation = !tw.is_satisfied(arrival) || !shift.is_satisfied(arrival);
            self.state[0] = PositionState {
                arrival,
                wait: SignedDuration::ZERO,
                departure: arrival + node.service_duration(),
                carried_load: Capacity::ZERO,
                cum_travel: 0.0,
                cum_wait: 0.0,
                cum_service: 0.0,
                dump_visits: 0,
                tw_violations: tw_violation as u32,
                cap_violations: 0,
            };
        }

        for i in start..self.nodes.len() {
            let prev = self.state[i - 1];
            let prev_id = self.nodes[i - 1];
            let cur_id = self.nodes[i];
            let cur = catalog.node(cur_id);
            let tw = cur.time_window();

            let raw_travel = catalog.travel_time(prev_id, cur_id);
            let reachable = raw_travel.is_finite();
            let travel_for_clock = if reachable { raw_travel } else { UNREACHABLE_TRAVEL_SECS };

            let arrival = prev.departure + SignedDuration::from_secs_f64(travel_for_clock);
            let tw_violation = !reachable || !tw.is_satisfied(arrival) || !shift.is_satisfied(arrival);
            let wait = tw.wait_for(arrival);
            let departure = arrival + wait + cur.service_duration();

            // A dump's own stored demand is never consulted here: carried
            // load resets to exactly zero on departure regardless of it.
            let is_dump = cur.kind().is_dump();
            let carried_load = if is_dump { Capacity::ZERO } else { prev.carried_load + cur.demand() };
            let cap_violation = carried_load.exceeds(vehicle.capacity());

            self.state[i] = PositionState {
                arrival,
                wait,
                departure,
                carried_load,
                cum_travel: prev.cum_travel + raw_travel,
                cum_wait: prev.cum_wait + wait.as_secs_f64(),
                cum_service: prev.cum_service + cur.service_duration().as_secs_f64(),
                dump_visits: prev.dump_visits + is_dump as u32,
                tw_violations: prev.tw_violations + tw_violation as u32,
                cap_violations: prev.cap_violations + cap_violation as u32,
            };
        }
    }

    // ---- delta queries: pure, non-mutating screens ----

    /// Change in `cum_travel(last)` if `node` were inserted before `pos`,
    /// or `None` if that would create a time-window violation anywhere
    /// from `pos` onward, checked by full forward simulation: the full
    /// forward-prefix check is required here, not just a check of the
    /// inserted node itself.
    pub fn delta_time_insert(&self, node: NodeId, pos: usize) -> Option<f64> {
        assert!(pos >= self.first_editable_pos() && pos <= self.editable_end_pos());
        let catalog = self.problem.catalog();

        let prev_id = self.nodes[pos - 1];
        let next_id = self.nodes[pos];
        let node_travel = catalog.travel_time(prev_id, node);
        let old_edge = catalog.travel_time(prev_id, next_id);

        let prev_departure = self.state[pos - 1].departure;
        if !self.forward_scan_feasible(prev_departure, std::iter::once(node).chain(self.nodes[pos..].iter().copied())) {
            return None;
        }

        let second_leg = catalog.travel_time(node, next_id);
        Some(node_travel + second_leg - old_edge)
    }

    /// Change in `cum_travel(last)` if the nodes at `pos1` and `pos2`
    /// (an intra-route swap) were exchanged, or `None` if infeasible.
    /// Adjacent and non-adjacent pairs are both handled by the same
    /// general forward scan.
    pub fn delta_time_swap(&self, pos1: usize, pos2: usize) -> Option<f64> {
        assert!(pos1 >= self.first_editable_pos() && pos1 < self.editable_end_pos());
        assert!(pos2 >= self.first_editable_pos() && pos2 < self.editable_end_pos());
        if pos1 == pos2 {
            return Some(0.0);
        }
        let (lo, hi) = (pos1.min(pos2), pos1.max(pos2));

        let old_travel = self.last().cum_travel;
        let mut swapped: Vec<NodeId> = self.nodes.clone();
        swapped.swap(lo, hi);

        let prev_departure = self.state[lo - 1].departure;
        if !self.forward_scan_feasible(prev_departure, swapped[lo..].iter().copied()) {
            return None;
        }

        let new_travel = self.simulate_travel_from(lo, &swapped);
        Some(new_travel - old_travel)
    }

    /// Change in `cum_travel(last)` if `pos` were overwritten with `node`
    /// (used for inter-route swap screening on each side), or `None` if
    /// infeasible.
    pub fn delta_time_replace(&self, node: NodeId, pos: usize) -> Option<f64> {
        assert!(pos >= self.first_editable_pos() && pos < self.editable_end_pos());
        let prev_departure = self.state[pos - 1].departure;
        if !self.forward_scan_feasible(prev_departure, std::iter::once(node).chain(self.nodes[pos + 1..].iter().copied())) {
            return None;
        }
        let catalog = self.problem.catalog();
        let old_in = catalog.travel_time(self.nodes[pos - 1], self.nodes[pos]);
        let new_in = catalog.travel_time(self.nodes[pos - 1], node);
        let mut delta = new_in - old_in;
        if pos + 1 < self.nodes.len() {
            let old_out = catalog.travel_time(self.nodes[pos], self.nodes[pos + 1]);
            let new_out = catalog.travel_time(node, self.nodes[pos + 1]);
            delta += new_out - old_out;
        }
        Some(delta)
    }

    /// Forward-simulates arrivals starting from `prev_departure` through
    /// every node in `nodes` in order, returning `false` the instant any
    /// position's arrival would exceed its own close. This is a full
    /// forward-prefix check, not just a check of the first node.
    fn forward_scan_feasible(&self, prev_departure: Timestamp, nodes: impl Iterator<Item = NodeId>) -> bool {
        let catalog = self.problem.catalog();
        let shift = self.problem.vehicle(self.vehicle_id).shift();
        let mut prev_departure = prev_departure;
        let mut prev_id: Option<NodeId> = None;
        for cur_id in nodes {
            let travel = match prev_id {
                Some(p) => catalog.travel_time(p, cur_id),
                None => 0.0,
            };
            if prev_id.is_some() && !travel.is_finite() {
                return false;
            }
            let node = catalog.node(cur_id);
            let arrival = prev_departure + SignedDuration::from_secs_f64(travel);
            if !node.time_window().is_satisfied(arrival) || !shift.is_satisfied(arrival) {
                return false;
            }
            let wait = node.time_window().wait_for(arrival);
            prev_departure = arrival + wait + node.service_duration();
            prev_id = Some(cur_id);
        }
        true
    }

    /// Recomputes `cum_travel(last)` for a hypothetical node sequence that
    /// differs from `self.nodes` only from `from` onward (used by
    /// `delta_time_swap`, where a plain edge-delta formula doesn't hold
    /// because both swapped positions may be non-adjacent).
    fn simulate_travel_from(&self, from: usize, nodes: &[NodeId]) -> f64 {
        let catalog = self.problem.catalog();
        let mut cum = self.state[from - 1].cum_travel;
        for i in from..nodes.len() {
            cum += catalog.travel_time(nodes[i - 1], nodes[i]);
        }
        cum
    }
}
