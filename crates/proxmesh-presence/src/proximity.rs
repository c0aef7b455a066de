//! Proximity decision between two participants.

use proxmesh_common::Position;

/// Distance at or under which two participants should be connected.
pub const DEFAULT_THRESHOLD: f64 = 200.0;

/// `true` when `a` and `b` are no farther apart than `threshold`.
pub fn is_within_range(a: &Position, b: &Position, threshold: f64) -> bool {
    a.distance_to(b) <= threshold
}
