use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A single-commodity load quantity: vehicle capacity, container demand, or
/// carried load at a route position. This problem has exactly one commodity
/// (waste volume/weight), so a plain newtype over `f64` is all the domain
/// needs.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct Capacity(f64);

impl Capacity {
    pub const ZERO: Capacity = Capacity(0.0);

    pub fn new(value: f64) -> Self {
        Capacity(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn exceeds(&self, limit: Capacity) -> bool {
        self.0 > limit.0
    }
}

impl Add for Capacity {
    type Output = Capacity;
    fn add(self, rhs: Capacity) -> Capacity {
        Capacity(self.0 + rhs.0)
    }
}

impl AddAssign for Capacity {
    fn add_assign(&mut self, rhs: Capacity) {
        self.0 += rhs.0;
    }
}

impl Sub for Capacity {
    type Output = Capacity;
    fn sub(self, rhs: Capacity) -> Capacity {
        Capacity(self.0 - rhs.0)
    }
}

impl SubAssign for Capacity {
    fn sub_assign(&mut self, rhs: Capacity) {
        self.0 -= rhs.0;
    }
}
