//! Property-based testing strategies using proptest.

use proptest::prelude::*;
use vibe_core::CapacityPolicy;

/// An event capacity within the allowed range.
pub fn capacity() -> impl Strategy<Value = u32> {
    1u32..=500
}

/// A sequence of reservation requests, each for 1-20 tickets.
pub fn ticket_requests() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..=20, 0..40)
}

/// Either capacity policy.
pub fn capacity_policy() -> impl Strategy<Value = CapacityPolicy> {
    prop_oneof![
        Just(CapacityPolicy::KeepLastSpot),
        Just(CapacityPolicy::AllowExactFill),
    ]
}
