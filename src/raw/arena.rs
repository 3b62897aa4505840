use alloc::vec::Vec;
use core::num::NonZero;

/// Index of an occupied [`Arena`] slot.
///
/// Stored as slot index plus one in a `NonZero<u32>` so `Option<Handle>` gets
/// the niche optimization and stays four bytes. Every tree node carries three
/// optional links, so the niche matters for node size.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<u32>);

impl Handle {
    /// The largest slot index a handle can name.
    pub(crate) const MAX: usize = (u32::MAX - 1) as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        // `index + 1` is nonzero and fits in a u32 after the assert above.
        Self(NonZero::new(index as u32 + 1).unwrap())
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Slot arena owning every node of a tree.
///
/// Freed slots go on a free list and are recycled by later allocations, so a
/// handle is only meaningful while the slot it names stays occupied. The tree
/// guarantees that by construction: the only live handles are the root and the
/// links stored inside occupied nodes.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.to_index()] = Some(element);
            handle
        } else {
            // `Handle::from_index` asserts the slot count stays representable.
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Removes and returns the element, leaving the slot free for reuse.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Verify the niche optimization `Handle` exists for.
    assert_eq_size!(Handle, Option<Handle>);
    assert_eq_size!(Handle, u32);

    #[test]
    #[should_panic(expected = "`Handle::from_index()` - `index` > `Handle::MAX`!")]
    fn handle_index_out_of_range() {
        let _ = Handle::from_index(Handle::MAX + 1);
    }

    #[test]
    fn slots_are_recycled() {
        let mut arena: Arena<&str> = Arena::new();
        let first = arena.alloc("a");
        let second = arena.alloc("b");
        assert_eq!(arena.take(first), "a");
        // The freed slot is handed back out before a new one is grown.
        assert_eq!(arena.alloc("c"), first);
        assert_eq!(*arena.get(second), "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn clear_empties_the_arena() {
        let mut arena: Arena<u32> = Arena::with_capacity(4);
        assert!(arena.capacity() >= 4);
        arena.alloc(1);
        arena.alloc(2);
        arena.clear();
        assert_eq!(arena.len(), 0);
    }

    proptest! {
        #[test]
        fn handle_round_trip(index in 0..=Handle::MAX) {
            prop_assert_eq!(Handle::from_index(index).to_index(), index);
        }

        /// Random alloc/take/overwrite sequences, checked against a Vec model.
        #[test]
        fn arena_matches_model(ops in proptest::collection::vec(any::<(u8, u32)>(), 0..128)) {
            let mut arena: Arena<u32> = Arena::new();
            let mut model: Vec<(Handle, u32)> = Vec::new();

            for (op, value) in ops {
                match op % 3 {
                    0 => {
                        let handle = arena.alloc(value);
                        model.push((handle, value));
                    }
                    1 if !model.is_empty() => {
                        let index = value as usize % model.len();
                        let (handle, expected) = model.swap_remove(index);
                        prop_assert_eq!(arena.take(handle), expected);
                    }
                    2 if !model.is_empty() => {
                        let index = value as usize % model.len();
                        let (handle, _) = model[index];
                        *arena.get_mut(handle) = value;
                        model[index].1 = value;
                    }
                    _ => {}
                }

                prop_assert_eq!(arena.len(), model.len());
                for &(handle, expected) in &model {
                    prop_assert_eq!(*arena.get(handle), expected);
                }
            }
        }
    }
}
