/// Why a pool operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// `get` with every slot already given out.
    #[error("no free items left in pool")]
    Exhausted,
    /// `give` of an item that is not currently given out (double free, or foreign item).
    #[error("item is not given out (already returned or not from this pool)")]
    InvalidRelease,
    /// Slot index past the end of the backing store.
    #[error("slot {index} out of range for pool of size {size}")]
    IndexOutOfRange { index: usize, size: usize },
}

/// Fixed-capacity pool that recycles pre-built items. No allocs after init.
///
/// `[0, free_index)` is given out, `[free_index, size)` is free.
/// Returning an item swaps it with the last given-out slot, so both
/// regions stay contiguous and nothing else moves.
///
/// `give` has to find the item first (linear scan). Hot paths should
/// hold on to the slot index and use [`Pool::give_at`] instead.
pub struct Pool<T> {
    items: Vec<T>,
    free_index: usize,
}

impl<T> Pool<T> {
    /// Wrap `items` as the backing store. Everything starts free.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            free_index: 0,
        }
    }

    /// Build `size` items by calling `factory(i)` for each slot.
    pub fn from_factory(size: usize, factory: impl FnMut(usize) -> T) -> Self {
        Self::new((0..size).map(factory).collect())
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Index of the next slot `get` will hand out.
    pub fn next_index(&self) -> usize {
        self.free_index
    }

    pub fn has_free_slot(&self) -> bool {
        self.free_index < self.items.len()
    }

    /// Whole backing store, given-out region first.
    pub fn source(&self) -> &[T] {
        &self.items
    }

    pub fn given_items(&self) -> &[T] {
        &self.items[..self.free_index]
    }

    pub fn free_items(&self) -> &[T] {
        &self.items[self.free_index..]
    }

    pub fn iter_given(&self) -> impl Iterator<Item = &T> {
        self.given_items().iter()
    }

    pub fn iter_given_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items[..self.free_index].iter_mut()
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Hand out the next free slot and return its index.
    pub fn get_index(&mut self) -> Result<usize, PoolError> {
        if !self.has_free_slot() {
            return Err(PoolError::Exhausted);
        }
        let idx = self.free_index;
        self.free_index += 1;
        log::trace!("pool: gave out slot {idx} ({}/{})", self.free_index, self.size());
        Ok(idx)
    }

    /// Return the item in slot `index`.
    ///
    /// The last given-out item is swapped into `index`. Returns its old
    /// index so index holders can follow it, or `None` when `index` was
    /// already the boundary slot and nothing moved.
    pub fn give_at(&mut self, index: usize) -> Result<Option<usize>, PoolError> {
        let size = self.size();
        if index >= size {
            return Err(PoolError::IndexOutOfRange { index, size });
        }
        if index >= self.free_index {
            return Err(PoolError::InvalidRelease);
        }

        let new_free = self.free_index - 1;
        self.items.swap(new_free, index);
        self.free_index = new_free;
        log::trace!("pool: slot {index} returned ({}/{})", self.free_index, size);

        Ok((new_free != index).then_some(new_free))
    }
}

impl<T: Clone> Pool<T> {
    /// Hand out the next free item.
    pub fn get(&mut self) -> Result<T, PoolError> {
        let idx = self.get_index()?;
        Ok(self.items[idx].clone())
    }
}

impl<T: PartialEq> Pool<T> {
    /// Return an item previously handed out by `get`.
    pub fn give(&mut self, item: &T) -> Result<(), PoolError> {
        let idx = self
            .items
            .iter()
            .position(|it| it == item)
            .ok_or(PoolError::InvalidRelease)?;
        self.give_at(idx).map(|_| ())
    }
}
