/// An entry that can sit in a [`SlotPool`]. Inactive slots are free for reuse.
pub trait Slot: Default {
    fn is_active(&self) -> bool;
}

/// Fixed-capacity entity storage. Capacity is a hard ceiling: when no slot is free,
/// spawning is simply skipped by the caller.
#[derive(Debug)]
pub struct SlotPool<T: Slot, const N: usize> {
    slots: [T; N],
}

impl<T: Slot, const N: usize> Default for SlotPool<T, N> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T: Slot, const N: usize> SlotPool<T, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn slots(&self) -> &[T; N] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [T; N] {
        &mut self.slots
    }

    /// Index of the lowest inactive slot.
    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(|slot| !slot.is_active())
    }

    /// Indices of the two lowest inactive slots, or `None` if fewer than two are free.
    pub fn first_two_free(&self) -> Option<(usize, usize)> {
        let mut free = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_active())
            .map(|(index, _)| index);
        let first = free.next()?;
        let second = free.next()?;
        Some((first, second))
    }

    /// Mutable references to two distinct slots.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> (&mut T, &mut T) {
        debug_assert!(a != b, "pair_mut needs two distinct slots");
        if a < b {
            let (head, tail) = self.slots.split_at_mut(b);
            (&mut head[a], &mut tail[0])
        } else {
            let (head, tail) = self.slots.split_at_mut(a);
            (&mut tail[0], &mut head[b])
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|slot| slot.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Resets every slot to its default (inactive) state.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = T::default();
        }
    }
}
