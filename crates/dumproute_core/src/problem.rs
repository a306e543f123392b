pub mod capacity;
pub mod catalog;
pub mod location;
pub mod node;
pub mod time_window;
pub mod vehicle;

use catalog::NodeCatalog;
use vehicle::{Vehicle, VehicleId};

/// The fully assembled, immutable problem instance: the node catalog
/// (travel-time matrix + node attributes) alongside the fleet. Built once
/// by the input-file parsers and shared by reference for the lifetime of a
/// search; every solver component (Route, Solution, the TWC oracle, the
/// builder, the tabu driver) borrows from one `Problem`.
pub struct Problem {
    catalog: NodeCatalog,
    vehicles: Vec<Vehicle>,
}

impl Problem {
    pub fn new(catalog: NodeCatalog, vehicles: Vec<Vehicle>) -> Self {
        Self { catalog, vehicles }
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    pub fn vehicle(&self, id: VehicleId) -> &Vehicle {
        &self.vehicles[id]
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    pub fn vehicle_ids(&self) -> impl Iterator<Item = VehicleId> {
        (0..self.vehicles.len()).map(VehicleId::from)
    }

    pub fn pickups(&self) -> impl Iterator<Item = node::NodeId> + '_ {
        self.catalog.nodes_of_kind(node::NodeKind::Pickup)
    }
}
