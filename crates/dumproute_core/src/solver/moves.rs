use crate::problem::{node::NodeId, vehicle::VehicleId};

/// Sentinel node id for a Move field that a given `MoveKind` does not use
/// (e.g. `nid2` on an `Ins`). Unused fields are sentinel values rather than
/// wrapped in `Option`, which would make the lexicographic `Ord` derive
/// below impossible to derive directly.
pub const SENTINEL_NODE: NodeId = NodeId::new(usize::MAX);
pub const SENTINEL_VEHICLE: VehicleId = VehicleId::new(usize::MAX);
pub const SENTINEL_POS: usize = usize::MAX;

/// The three move families. Declared in this order because `Move`'s
/// lexicographic tie-break orders on `(kind, ...)` first, and
/// `#[derive(Ord)]` compares enum variants by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoveKind {
    Ins,
    IntraSw,
    InterSw,
}

/// A tagged edit descriptor. `Eq`/`Ord` are implemented by hand because
/// they must ignore `savings`; two moves that edit the same nodes/routes
/// are the same move regardless of what they're worth, and
/// tabu-equivalence (`tabu_key`) narrows that further by ignoring
/// positions too.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub kind: MoveKind,
    pub nid1: NodeId,
    pub nid2: NodeId,
    pub vid1: VehicleId,
    pub vid2: VehicleId,
    pub pos1: usize,
    pub pos2: usize,
    pub savings: f64,
}

/// The fields `tabu_key` and `Eq`/`Ord` both compare, in lexicographic
/// order, excluding `savings`.
type MoveIdentity = (MoveKind, NodeId, NodeId, VehicleId, VehicleId, usize, usize);

/// Tabu-equivalence key: same kind, same identifying node and route-id
/// fields; positions are allowed to differ.
pub type TabuKey = (MoveKind, NodeId, NodeId, VehicleId, VehicleId);

impl Move {
    pub fn insert(nid1: NodeId, vid1: VehicleId, pos1: usize, vid2: VehicleId, pos2: usize, savings: f64) -> Self {
        Self {
            kind: MoveKind::Ins,
            nid1,
            nid2: SENTINEL_NODE,
            vid1,
            vid2,
            pos1,
            pos2,
            savings,
        }
    }

    pub fn intra_swap(vid1: VehicleId, nid1: NodeId, pos1: usize, nid2: NodeId, pos2: usize, savings: f64) -> Self {
        Self {
            kind: MoveKind::IntraSw,
            nid1,
            nid2,
            vid1,
            vid2: SENTINEL_VEHICLE,
            pos1,
            pos2,
            savings,
        }
    }

    pub fn inter_swap(
        vid1: VehicleId,
        nid1: NodeId,
        pos1: usize,
        vid2: VehicleId,
        nid2: NodeId,
        pos2: usize,
        savings: f64,
    ) -> Self {
        Self {
            kind: MoveKind::InterSw,
            nid1,
            nid2,
            vid1,
            vid2,
            pos1,
            pos2,
            savings,
        }
    }

    fn identity(&self) -> MoveIdentity {
        (self.kind, self.nid1, self.nid2, self.vid1, self.vid2, self.pos1, self.pos2)
    }

    /// Tabu-equivalence: same kind, matching on the identifying node and
    /// route-id fields (positions may differ).
    pub fn tabu_key(&self) -> TabuKey {
        (self.kind, self.nid1, self.nid2, self.vid1, self.vid2)
    }

    /// Well-defined self-/structural inverse: for a
    /// swap (intra or inter), swapping the same two (route, position)
    /// pairs back restores the prior arrangement, since neither route
    /// changes length. For an insertion, the inverse moves `nid1` back
    /// from its destination to its original source.
    pub fn inverse(&self) -> Move {
        match self.kind {
            MoveKind::Ins => Move {
                kind: MoveKind::Ins,
                nid1: self.nid1,
                nid2: SENTINEL_NODE,
                vid1: self.vid2,
                vid2: self.vid1,
                pos1: self.pos2,
                pos2: self.pos1,
                savings: -self.savings,
            },
            MoveKind::IntraSw | MoveKind::InterSw => Move {
                savings: -self.savings,
                ..*self
            },
        }
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Move {}

impl PartialOrd for Move {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Move {
    /// Move's lexicographic order on (kind, nid1, nid2, vid1, vid2, pos1,
    /// pos2).
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.identity().cmp(&other.identity())
    }
}

/// Sorts candidates by savings descending; ties broken by `Move`'s
/// lexicographic order, so iteration order is fully deterministic.
pub fn sort_by_savings(candidates: &mut [Move]) {
    candidates.sort_by(|a, b| {
        b.savings
            .partial_cmp(&a.savings)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(b))
    });
}
