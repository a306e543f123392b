use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::define_index_newtype;

use super::{capacity::Capacity, location::Location, time_window::TimeWindow};

define_index_newtype!(NodeId, Node);

/// Tags a node's role in the route: a depot starts/ends every vehicle's
/// day, a dump resets carried load to zero, a pickup adds positive demand.
/// Carried forward from the original solver's `ntype` field (0 = depot,
/// 1 = dump, 2 = pickup), which the distilled spec names but never labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Depot,
    Dump,
    Pickup,
}

impl NodeKind {
    pub fn is_dump(&self) -> bool {
        matches!(self, NodeKind::Dump)
    }

    pub fn is_depot(&self) -> bool {
        matches!(self, NodeKind::Depot)
    }

    pub fn is_pickup(&self) -> bool {
        matches!(self, NodeKind::Pickup)
    }
}

/// An immutable catalog entry: one container, depot, or dump site. Created
/// at load time from the container/otherlocs input files and never mutated
/// afterward; routes only ever reference a `NodeId` into the catalog.
#[derive(Debug, Clone)]
pub struct Node {
    external_id: String,
    kind: NodeKind,
    location: Location,
    demand: Capacity,
    time_window: TimeWindow,
    service_duration: SignedDuration,
}

impl Node {
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn demand(&self) -> Capacity {
        self.demand
    }

    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    pub fn service_duration(&self) -> SignedDuration {
        self.service_duration
    }
}

#[derive(Default)]
pub struct NodeBuilder {
    external_id: Option<String>,
    kind: Option<NodeKind>,
    location: Option<Location>,
    demand: Option<Capacity>,
    time_window: Option<TimeWindow>,
    service_duration: Option<SignedDuration>,
}

impl NodeBuilder {
    pub fn set_external_id(mut self, external_id: String) -> Self {
        self.external_id = Some(external_id);
        self
    }

    pub fn set_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn set_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn set_demand(mut self, demand: Capacity) -> Self {
        self.demand = Some(demand);
        self
    }

    pub fn set_time_window(mut self, time_window: TimeWindow) -> Self {
        self.time_window = Some(time_window);
        self
    }

    pub fn set_service_duration(mut self, service_duration: SignedDuration) -> Self {
        self.service_duration = Some(service_duration);
        self
    }

    pub fn build(self) -> Node {
        Node {
            external_id: self.external_id.expect("node external id is required"),
            kind: self.kind.expect("node kind is required"),
            location: self.location.expect("node location is required"),
            demand: self.demand.unwrap_or(Capacity::ZERO),
            time_window: self
                .time_window
                .expect("node time window is required"),
            service_duration: self.service_duration.unwrap_or(SignedDuration::ZERO),
        }
    }
}
