//! Debug assertion macros for cart-queue invariants. Only active in debug
//! builds (`#[cfg(debug_assertions)]`), so there is zero overhead in release
//! builds.

// =============================================================================
// Cart conservation
// =============================================================================

/// Assert that every cart is accounted for exactly once across the three pools.
///
/// **Invariant**: `empty_pool.len() + slot_carts_in_use + full_queue.len() == total_carts`
///
/// Used in: `CartQueue::enqueue`, `CartQueue::dequeue`, `CartQueue::close` after
/// each state transition, while the management mutex is held.
macro_rules! debug_assert_cart_conservation {
    ($empty:expr, $slotted:expr, $full:expr, $total:expr) => {
        debug_assert!(
            $empty + $slotted + $full == $total,
            "cart conservation violated: empty {} + slotted {} + full {} != total {}",
            $empty,
            $slotted,
            $full,
            $total
        )
    };
}

// =============================================================================
// Slot cart partial fill
// =============================================================================

/// Assert that a slot-attached cart never holds more than `capacity` elements.
///
/// **Invariant**: `1 <= cart.len() <= capacity` for any cart attached to a slot.
macro_rules! debug_assert_slot_cart_bounds {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len >= 1 && $len <= $capacity,
            "slot cart length {} outside [1, {}]",
            $len,
            $capacity
        )
    };
}

pub(crate) use debug_assert_cart_conservation;
pub(crate) use debug_assert_slot_cart_bounds;
