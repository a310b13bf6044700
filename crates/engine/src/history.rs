use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;

use common::{Error, PriceObservation, Result};

/// Bounded FIFO of the most recent observations, oldest first.
///
/// Owned and mutated only by the engine. Strategies see either a
/// [`Snapshot`] or a borrowed [`window`](Self::window); neither can change
/// while it is held.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    items: VecDeque<PriceObservation>,
    capacity: usize,
}

impl HistoryBuffer {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Config("max_history must be >= 1".to_string()));
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append, evicting the oldest entry first when full.
    pub fn append(&mut self, observation: PriceObservation) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(observation);
    }

    /// Copy the current contents into an immutable view.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.items.iter().cloned().collect())
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Borrow the contents as one contiguous slice, oldest first.
    ///
    /// Copies nothing; may rotate the ring in place. The buffer cannot be
    /// appended to while the slice is alive.
    pub fn window(&mut self) -> &[PriceObservation] {
        self.items.make_contiguous()
    }
}

/// Point-in-time, read-only copy of a [`HistoryBuffer`]. Cheap to clone;
/// never changes after creation.
#[derive(Debug, Clone)]
pub struct Snapshot(Arc<[PriceObservation]>);

impl Deref for Snapshot {
    type Target = [PriceObservation];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
