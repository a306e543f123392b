use serde::{Deserialize, Serialize};

use crate::define_index_newtype;

use super::{capacity::Capacity, node::NodeId, time_window::TimeWindow};

define_index_newtype!(VehicleId, Vehicle);

/// Weights on the three terms of `cost()`, carried per vehicle as the
/// input files specify them rather than globally: `w1 * cum_travel +
/// w2 * cap_violations + w3 * tw_violations`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub travel: f64,
    pub capacity_violation: f64,
    pub time_window_violation: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            travel: 1.0,
            capacity_violation: 1000.0,
            time_window_violation: 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    external_id: String,
    capacity: Capacity,
    start_depot: NodeId,
    dump: NodeId,
    end_depot: NodeId,
    shift: TimeWindow,
    weights: ObjectiveWeights,
}

impl Vehicle {
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn start_depot(&self) -> NodeId {
        self.start_depot
    }

    pub fn dump(&self) -> NodeId {
        self.dump
    }

    pub fn end_depot(&self) -> NodeId {
        self.end_depot
    }

    pub fn shift(&self) -> TimeWindow {
        self.shift
    }

    pub fn weights(&self) -> ObjectiveWeights {
        self.weights
    }
}

#[derive(Default)]
pub struct VehicleBuilder {
    external_id: Option<String>,
    capacity: Option<Capacity>,
    start_depot: Option<NodeId>,
    dump: Option<NodeId>,
    end_depot: Option<NodeId>,
    shift: Option<TimeWindow>,
    weights: Option<ObjectiveWeights>,
}

impl VehicleBuilder {
    pub fn set_external_id(mut self, external_id: String) -> Self {
        self.external_id = Some(external_id);
        self
    }

    pub fn set_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn set_start_depot(mut self, start_depot: NodeId) -> Self {
        self.start_depot = Some(start_depot);
        self
    }

    pub fn set_dump(mut self, dump: NodeId) -> Self {
        self.dump = Some(dump);
        self
    }

    pub fn set_end_depot(mut self, end_depot: NodeId) -> Self {
        self.end_depot = Some(end_depot);
        self
    }

    pub fn set_shift(mut self, shift: TimeWindow) -> Self {
        self.shift = Some(shift);
        self
    }

    pub fn set_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn build(self) -> Vehicle {
        Vehicle {
            external_id: self.external_id.expect("vehicle external id is required"),
            capacity: self.capacity.expect("vehicle capacity is required"),
            start_depot: self.start_depot.expect("vehicle start depot is required"),
            dump: self.dump.expect("vehicle dump is required"),
            end_depot: self.end_depot.expect("vehicle end depot is required"),
            shift: self.shift.expect("vehicle shift window is required"),
            weights: self.weights.unwrap_or_default(),
        }
    }
}
