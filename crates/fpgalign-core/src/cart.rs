use crate::queue::CartQueue;

/// A dequeued cart handle.
///
/// Borrowed from the queue it came from; its contents are visible through
/// [`CartHandle::items`] and [`CartHandle::slot`]. Dropping a valid handle
/// returns the cart's backing allocation to the queue's empty pool and wakes
/// one waiting producer — RAII release, chosen over an explicit `release()`
/// call so a leaked handle is a compile-time impossibility rather than a
/// debug-only assertion.
///
/// An *invalid* handle (`is_valid() == false`) is the sentinel returned once
/// the queue has been closed and fully drained; it carries no elements.
pub struct CartHandle<'a, T> {
    pub(crate) queue: &'a CartQueue<T>,
    pub(crate) slot: u32,
    pub(crate) cart: Option<Vec<T>>,
}

impl<'a, T> CartHandle<'a, T> {
    pub(crate) fn invalid(queue: &'a CartQueue<T>) -> Self {
        Self {
            queue,
            slot: 0,
            cart: None,
        }
    }

    /// Returns `false` for the sentinel handle produced by a closed, drained queue.
    pub fn is_valid(&self) -> bool {
        self.cart.is_some()
    }

    /// The batching key all elements in this cart share.
    ///
    /// Meaningless on an invalid handle (returns `0`).
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// The cart's elements in producer insertion order.
    ///
    /// Empty for an invalid handle.
    pub fn items(&self) -> &[T] {
        self.cart.as_deref().unwrap_or(&[])
    }

    /// Number of elements carried, `0` for an invalid handle.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl<'a, T> Drop for CartHandle<'a, T> {
    fn drop(&mut self) {
        if let Some(mut cart) = self.cart.take() {
            cart.clear();
            self.queue.recycle(cart);
        }
    }
}
