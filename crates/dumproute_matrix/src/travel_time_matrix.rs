use std::sync::Arc;

use crate::error::MatrixError;
use serde::{Deserialize, Serialize};

/// Sentinel used for an entry that is absent from the matrix file, or that
/// the routing engine reported as unreachable. Treated as "infinity" by
/// every consumer: any route touching it is infeasible, never a panic.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// Dense N×N travel-time matrix, stored flat the way a real routing
/// collaborator hands it back: `times[from * num_locations + to]`.
///
/// Built once per problem and shared by reference for the lifetime of a
/// search; nothing in this crate ever mutates one after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelTimeMatrix {
    times: Arc<Vec<f64>>,
    num_locations: usize,
}

impl TravelTimeMatrix {
    pub fn from_flat(times: Vec<f64>, num_locations: usize) -> Result<Self, MatrixError> {
        if times.len() != num_locations * num_locations {
            return Err(MatrixError::MatrixIncomplete {
                from: times.len(),
                to: num_locations * num_locations,
            });
        }

        Ok(Self {
            times: Arc::new(times),
            num_locations,
        })
    }

    /// Builds a matrix from sparse (from, to, duration) triples, as read off
    /// the `dmatrix-time.txt` input file. Pairs never mentioned stay
    /// [`UNREACHABLE`].
    pub fn from_pairs(num_locations: usize, pairs: impl IntoIterator<Item = (usize, usize, f64)>) -> Self {
        let mut times = vec![UNREACHABLE; num_locations * num_locations];
        for (from, to, duration) in pairs {
            times[from * num_locations + to] = duration;
        }
        Self {
            times: Arc::new(times),
            num_locations,
        }
    }

    /// Every pair shares the same duration. Used by tests and by callers
    /// building a quick estimate before a real matrix is available.
    pub fn from_constant(num_locations: usize, value: f64) -> Self {
        Self {
            times: Arc::new(vec![value; num_locations * num_locations]),
            num_locations,
        }
    }

    fn index(&self, from: usize, to: usize) -> usize {
        from * self.num_locations + to
    }

    /// Nonnegative travel duration in seconds, or [`UNREACHABLE`] if the pair
    /// was never provided. Not necessarily symmetric.
    pub fn travel_time(&self, from: usize, to: usize) -> f64 {
        if from == to {
            return 0.0;
        }
        self.times[self.index(from, to)]
    }

    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.travel_time(from, to).is_finite()
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }
}
