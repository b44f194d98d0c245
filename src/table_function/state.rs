//! # Opaque Callback State
//!
//! Bind-state and init-state flow from table-function callbacks into the
//! engine as opaque boxes. The engine owns them for the lifetime of the
//! call and must release each exactly once at teardown — callback code
//! never frees state directly.
//!
//! The [`StateArena`] is a generation-checked slot map: the engine holds
//! only small integer handles, a released slot can be recycled without a
//! stale handle ever resolving, and dropping the arena releases whatever
//! is still live — so every abort path tears down correctly.

use std::any::Any;

use eyre::{ensure, Result};

/// Opaque key into a [`StateArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHandle {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    value: Option<Box<dyn Any + Send>>,
}

/// Generation-checked slot map for opaque callback state.
#[derive(Default)]
pub struct StateArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl StateArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, returning the handle the engine keeps.
    pub fn insert(&mut self, value: Box<dyn Any + Send>) -> StateHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            StateHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            StateHandle {
                index,
                generation: 0,
            }
        }
    }

    fn slot(&self, handle: StateHandle) -> Result<&Slot> {
        let slot = self
            .slots
            .get(handle.index as usize)
            .ok_or_else(|| eyre::eyre!("state not available"))?;
        ensure!(slot.generation == handle.generation, "state not available");
        Ok(slot)
    }

    /// The state behind `handle`, untyped.
    pub fn get_dyn(&self, handle: StateHandle) -> Result<&(dyn Any + Send)> {
        self.slot(handle)?
            .value
            .as_deref()
            .ok_or_else(|| eyre::eyre!("state not available"))
    }

    pub fn get_dyn_mut(&mut self, handle: StateHandle) -> Result<&mut (dyn Any + Send)> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .ok_or_else(|| eyre::eyre!("state not available"))?;
        ensure!(slot.generation == handle.generation, "state not available");
        slot.value
            .as_deref_mut()
            .ok_or_else(|| eyre::eyre!("state not available"))
    }

    /// The state behind `handle`, downcast to its concrete type.
    pub fn get<T: Any>(&self, handle: StateHandle) -> Result<&T> {
        self.get_dyn(handle)?
            .downcast_ref::<T>()
            .ok_or_else(|| eyre::eyre!("state has a different type"))
    }

    pub fn get_mut<T: Any>(&mut self, handle: StateHandle) -> Result<&mut T> {
        self.get_dyn_mut(handle)?
            .downcast_mut::<T>()
            .ok_or_else(|| eyre::eyre!("state has a different type"))
    }

    /// One shared and one mutable state at once; the handles must differ.
    pub fn pair_mut(
        &mut self,
        shared: StateHandle,
        mutable: StateHandle,
    ) -> Result<(&(dyn Any + Send), &mut (dyn Any + Send))> {
        ensure!(
            shared.index != mutable.index,
            "cannot borrow one state both ways"
        );
        self.slot(shared)?;
        let si = shared.index as usize;
        let mi = mutable.index as usize;
        ensure!(mi < self.slots.len(), "state not available");
        ensure!(
            self.slots[mi].generation == mutable.generation,
            "state not available"
        );

        let (shared_slot, mutable_slot) = if si < mi {
            let (left, right) = self.slots.split_at_mut(mi);
            (&left[si], &mut right[0])
        } else {
            let (left, right) = self.slots.split_at_mut(si);
            (&right[0], &mut left[mi])
        };
        let shared_ref = shared_slot
            .value
            .as_deref()
            .ok_or_else(|| eyre::eyre!("state not available"))?;
        let mutable_ref = mutable_slot
            .value
            .as_deref_mut()
            .ok_or_else(|| eyre::eyre!("state not available"))?;
        Ok((shared_ref, mutable_ref))
    }

    /// Releases the state behind `handle`, returning whether this call was
    /// the one that freed it. A second release of the same handle — or a
    /// stale handle after the slot was recycled — is a safe no-op.
    pub fn release(&mut self, handle: StateHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation || slot.value.is_none() {
            return false;
        }
        slot.value = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        true
    }

    /// Number of live states.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn insert_get_release_round_trip() {
        let mut arena = StateArena::new();
        let handle = arena.insert(Box::new(41_i64));
        *arena.get_mut::<i64>(handle).expect("live") += 1;
        assert_eq!(*arena.get::<i64>(handle).expect("live"), 42);

        assert!(arena.release(handle));
        assert!(arena.get::<i64>(handle).is_err(), "released handle is dead");
        assert_eq!(arena.live_count(), 0);
    }

    #[test]
    fn release_is_exactly_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut arena = StateArena::new();
        let handle = arena.insert(Box::new(DropCounter(drops.clone())));

        assert!(arena.release(handle));
        assert!(!arena.release(handle), "second release is a no-op");
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stale_handles_do_not_resolve_recycled_slots() {
        let mut arena = StateArena::new();
        let old = arena.insert(Box::new(1_i32));
        arena.release(old);

        let new = arena.insert(Box::new(2_i32));
        assert!(arena.get::<i32>(old).is_err(), "old generation is stale");
        assert_eq!(*arena.get::<i32>(new).expect("new generation"), 2);
        assert!(!arena.release(old), "stale release cannot free the new state");
        assert_eq!(arena.live_count(), 1);
    }

    #[test]
    fn dropping_the_arena_releases_live_state_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        {
            let mut arena = StateArena::new();
            let released = arena.insert(Box::new(DropCounter(drops.clone())));
            let _leaked_to_drop = arena.insert(Box::new(DropCounter(drops.clone())));
            arena.release(released);
            assert_eq!(drops.load(Ordering::SeqCst), 1);
        }
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn pair_mut_borrows_two_states_at_once() {
        let mut arena = StateArena::new();
        let a = arena.insert(Box::new(10_i64));
        let b = arena.insert(Box::new(0_i64));

        let (shared, mutable) = arena.pair_mut(a, b).expect("distinct slots");
        let base = *shared.downcast_ref::<i64>().expect("shared");
        *mutable.downcast_mut::<i64>().expect("mutable") = base * 2;

        assert_eq!(*arena.get::<i64>(b).expect("written"), 20);
        assert!(arena.pair_mut(a, a).is_err(), "one slot cannot go both ways");
    }
}
