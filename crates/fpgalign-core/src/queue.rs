//! The slotted cart queue: a bounded MPMC queue that batches values by key
//! ("slot") into fixed-capacity carts, handing whole carts to consumers
//! instead of individual elements.
//!
//! Two `Mutex`es guard disjoint state — `management` (the empty pool and the
//! partially-filled per-slot carts) and `full` (the FIFO of carts ready for
//! consumers) — plus one `Condvar` per mutex for the blocking fast path. Lock
//! order is always `management` before `full`; `dequeue`/`recycle` only ever
//! touch one lock at a time, so there is no cycle.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

use crate::cart::CartHandle;
use crate::error::{FpgAlignError, Result};
use crate::invariants::{debug_assert_cart_conservation, debug_assert_slot_cart_bounds};

struct Management<T> {
    empty_pool: Vec<Vec<T>>,
    slot_carts: HashMap<u32, Vec<T>>,
}

struct FullQueueState<T> {
    queue: VecDeque<(u32, Vec<T>)>,
}

/// A bounded multi-producer/multi-consumer queue batching values per slot.
///
/// `T` must be `Send` for the queue itself to be usable across threads,
/// which the blanket `unsafe impl` below provides (mirroring the
/// producer/consumer handles of a classic channel: the queue owns no `T`
/// outside of a lock).
pub struct CartQueue<T> {
    capacity: usize,
    total_carts: usize,
    closed: AtomicBool,
    management: Mutex<Management<T>>,
    empty_cv: Condvar,
    full: Mutex<FullQueueState<T>>,
    full_cv: Condvar,
}

impl<T> CartQueue<T> {
    /// Creates a queue with `slots` distinct batching keys, `carts` total
    /// preallocated carts (`carts >= slots`), and per-cart `capacity`
    /// (`capacity >= 1`).
    pub fn new(slots: usize, carts: usize, capacity: usize) -> Result<Self> {
        if slots == 0 {
            return Err(FpgAlignError::InvalidConfig(
                "slots must be >= 1".to_string(),
            ));
        }
        if carts < slots {
            return Err(FpgAlignError::InvalidConfig(format!(
                "carts ({carts}) must be >= slots ({slots})"
            )));
        }
        if capacity == 0 {
            return Err(FpgAlignError::InvalidConfig(
                "capacity must be >= 1".to_string(),
            ));
        }

        let empty_pool = (0..carts).map(|_| Vec::with_capacity(capacity)).collect();

        Ok(Self {
            capacity,
            total_carts: carts,
            closed: AtomicBool::new(false),
            management: Mutex::new(Management {
                empty_pool,
                slot_carts: HashMap::with_capacity(slots),
            }),
            empty_cv: Condvar::new(),
            full: Mutex::new(FullQueueState {
                queue: VecDeque::new(),
            }),
            full_cv: Condvar::new(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Appends `value` to the cart batching `slot`. Blocks if no cart is
    /// attached to the slot and the empty pool is exhausted; wakes once one
    /// is recycled. Fails with [`FpgAlignError::QueueClosed`] if the queue is
    /// already closed.
    pub fn enqueue(&self, slot: u32, value: T) -> Result<()> {
        let mut mgmt = self.management.lock().unwrap();
        loop {
            if self.closed.load(Ordering::Acquire) {
                return Err(FpgAlignError::QueueClosed);
            }

            if let Some(cart) = mgmt.slot_carts.get_mut(&slot) {
                cart.push(value);
                debug_assert_slot_cart_bounds!(cart.len(), self.capacity);
                if cart.len() == self.capacity {
                    let cart = mgmt.slot_carts.remove(&slot).expect("just matched above");
                    self.publish_full(slot, cart);
                }
                return Ok(());
            }

            if let Some(mut cart) = mgmt.empty_pool.pop() {
                cart.push(value);
                if cart.len() == self.capacity {
                    self.publish_full(slot, cart);
                } else {
                    mgmt.slot_carts.insert(slot, cart);
                }
                return Ok(());
            }

            mgmt = self.empty_cv.wait(mgmt).unwrap();
        }
    }

    /// Pushes a full (or final, partially-filled) cart onto the full queue
    /// and wakes one waiting consumer. Must be called while `management` is
    /// still locked by the caller, to keep the `management` -> `full` lock
    /// order and avoid exposing a half-removed slot cart to another thread.
    fn publish_full(&self, slot: u32, cart: Vec<T>) {
        let mut full = self.full.lock().unwrap();
        full.queue.push_back((slot, cart));
        drop(full);
        self.full_cv.notify_one();
    }

    /// Blocks until a full cart is available or the queue is closed and
    /// drained, in which case an invalid handle is returned.
    pub fn dequeue(&self) -> CartHandle<'_, T> {
        let mut full = self.full.lock().unwrap();
        loop {
            if let Some((slot, cart)) = full.queue.pop_front() {
                return CartHandle {
                    queue: self,
                    slot,
                    cart: Some(cart),
                };
            }
            if self.closed.load(Ordering::Acquire) {
                return CartHandle::invalid(self);
            }
            full = self.full_cv.wait(full).unwrap();
        }
    }

    /// Marks the queue closed, moves every partially-filled slot cart to the
    /// full queue as a final cart, and wakes every blocked producer and
    /// consumer. Idempotent.
    pub fn close(&self) {
        let mut mgmt = self.management.lock().unwrap();
        self.closed.store(true, Ordering::SeqCst);
        let drained: Vec<(u32, Vec<T>)> = mgmt.slot_carts.drain().collect();
        if !drained.is_empty() {
            let mut full = self.full.lock().unwrap();
            full.queue.extend(drained);
        }
        drop(mgmt);
        self.empty_cv.notify_all();
        self.full_cv.notify_all();
    }

    pub(crate) fn recycle(&self, cart: Vec<T>) {
        let mut mgmt = self.management.lock().unwrap();
        mgmt.empty_pool.push(cart);
        drop(mgmt);
        self.empty_cv.notify_one();
    }

    /// Snapshot check of cart conservation (`empty + slotted + full == total`).
    ///
    /// Locks both mutexes at once, so it is only used from tests: the
    /// production fast path deliberately never holds both locks long enough
    /// to take a consistent two-pool snapshot.
    #[doc(hidden)]
    pub fn debug_check_conservation(&self) {
        let mgmt = self.management.lock().unwrap();
        let full = self.full.lock().unwrap();
        let empty = mgmt.empty_pool.len();
        let slotted = mgmt.slot_carts.len();
        let full_len = full.queue.len();
        debug_assert_cart_conservation!(empty, slotted, full_len, self.total_carts);
    }
}

// Safety: the queue's only interior mutable state lives behind its two
// `Mutex`es; `T` crossing threads through it requires `T: Send`, same as
// `std::sync::mpsc::Sender`.
unsafe impl<T: Send> Send for CartQueue<T> {}
unsafe impl<T: Send> Sync for CartQueue<T> {}
