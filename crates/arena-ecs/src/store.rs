//! Fixed-capacity entity storage with deferred deletion.
//!
//! [`EntityStore`] is a slot array. Each slot holds a generation counter, a
//! [`ComponentSet`], and a payload `T`. Allocation reuses reclaimed slots in
//! FIFO order (so generations spread over time rather than concentrating on a
//! hot index) and otherwise grows the array up to a fixed capacity.
//!
//! Deletion is two-phase:
//!
//! 1. [`request_delete`](EntityStore::request_delete) marks the slot
//!    pending-delete. The payload stays readable through
//!    [`get`](EntityStore::get) for the rest of the tick so in-flight logic
//!    holding the id never observes a torn entity.
//! 2. [`reclaim`](EntityStore::reclaim), called once at the end of the tick,
//!    resets every pending slot, bumps its generation and returns it to the
//!    free list. Every outstanding id for that slot is stale from then on.

use std::collections::VecDeque;

use crate::component::{Component, ComponentSet};
use crate::entity::EntityId;
use crate::EcsError;

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    Live,
    PendingDelete,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    state: SlotState,
    components: ComponentSet,
    value: T,
}

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

/// Generational slot array with a component bitmask per slot.
#[derive(Debug)]
pub struct EntityStore<T> {
    slots: Vec<Slot<T>>,
    /// Reclaimed indices, reused oldest first.
    free_indices: VecDeque<u32>,
    /// Indices marked pending-delete this tick, in request order.
    pending: Vec<u32>,
    capacity: usize,
    live: usize,
}

impl<T: Default> EntityStore<T> {
    /// Create an empty store that will never hold more than `capacity`
    /// entities at once.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity < u32::MAX as usize,
            "entity capacity must fit in a 32-bit index, got {capacity}"
        );
        Self {
            slots: Vec::new(),
            free_indices: VecDeque::new(),
            pending: Vec::new(),
            capacity,
            live: 0,
        }
    }

    /// Allocate a zero-initialized slot with a fresh generation.
    ///
    /// Fails with [`EcsError::CapacityExhausted`] once `capacity` slots are in
    /// use. Slots that are pending delete still count until reclaimed.
    pub fn alloc(&mut self) -> Result<(EntityId, &mut T), EcsError> {
        let index = if let Some(index) = self.free_indices.pop_front() {
            index
        } else if self.slots.len() < self.capacity {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                state: SlotState::Free,
                components: ComponentSet::EMPTY,
                value: T::default(),
            });
            index
        } else {
            tracing::debug!(capacity = self.capacity, "entity store full");
            return Err(EcsError::CapacityExhausted {
                capacity: self.capacity,
            });
        };

        let slot = &mut self.slots[index as usize];
        debug_assert_eq!(slot.state, SlotState::Free);
        slot.state = SlotState::Live;
        slot.components = ComponentSet::EMPTY;
        slot.value = T::default();
        self.live += 1;
        Ok((EntityId::new(index, slot.generation), &mut slot.value))
    }

    /// Mark `id` for deletion at the next [`reclaim`](Self::reclaim).
    ///
    /// Idempotent: returns `true` only for the call that actually marked the
    /// slot, `false` if it was already pending or `id` is stale.
    pub fn request_delete(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        if slot.state != SlotState::Live {
            return false;
        }
        slot.state = SlotState::PendingDelete;
        self.pending.push(id.index());
        true
    }

    /// Free every pending-delete slot, bump its generation and return it to
    /// the free list. Returns the ids that were reclaimed, in request order.
    pub fn reclaim(&mut self) -> Vec<EntityId> {
        let mut reclaimed = Vec::with_capacity(self.pending.len());
        for index in self.pending.drain(..) {
            let slot = &mut self.slots[index as usize];
            debug_assert_eq!(slot.state, SlotState::PendingDelete);
            reclaimed.push(EntityId::new(index, slot.generation));
            slot.state = SlotState::Free;
            slot.components = ComponentSet::EMPTY;
            slot.value = T::default();
            slot.generation = slot.generation.wrapping_add(1);
            self.free_indices.push_back(index);
            self.live -= 1;
        }
        reclaimed
    }
}

impl<T> EntityStore<T> {
    fn slot(&self, id: EntityId) -> Option<&Slot<T>> {
        let slot = self.slots.get(id.index() as usize)?;
        (slot.generation == id.generation() && slot.state != SlotState::Free).then_some(slot)
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot<T>> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        (slot.generation == id.generation() && slot.state != SlotState::Free).then_some(slot)
    }

    /// Whether `id` still names an allocated slot this tick.
    ///
    /// Pending-delete entities still exist until the tick's reclamation point.
    #[inline]
    pub fn exists(&self, id: EntityId) -> bool {
        self.slot(id).is_some()
    }

    /// Whether `id` exists and has been marked for deletion.
    #[inline]
    pub fn is_pending_delete(&self, id: EntityId) -> bool {
        self.slot(id)
            .is_some_and(|s| s.state == SlotState::PendingDelete)
    }

    /// Payload for `id`, if it exists (pending-delete included).
    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slot(id).map(|s| &s.value)
    }

    /// Mutable payload for `id`, if it exists (pending-delete included).
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slot_mut(id).map(|s| &mut s.value)
    }

    /// Component bitmask for `id`, or the empty set for a stale id.
    #[inline]
    pub fn components(&self, id: EntityId) -> ComponentSet {
        self.slot(id).map_or(ComponentSet::EMPTY, |s| s.components)
    }

    #[inline]
    pub fn has_component(&self, id: EntityId, component: Component) -> bool {
        self.components(id).contains(component)
    }

    /// Attach `component` to `id`. Returns `false` for a stale id.
    pub fn add_component(&mut self, id: EntityId, component: Component) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.components.insert(component);
                true
            }
            None => false,
        }
    }

    /// Ids of every existing entity, in slot order.
    ///
    /// The list is a copy so callers may mutate the store while walking it;
    /// they must re-check existence before each use.
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _, _)| id).collect()
    }

    /// Ids of every existing entity carrying all components in `mask`.
    pub fn ids_with(&self, mask: impl Into<ComponentSet>) -> Vec<EntityId> {
        let mask = mask.into();
        self.iter()
            .filter(|(_, components, _)| components.contains_all(mask))
            .map(|(id, _, _)| id)
            .collect()
    }

    /// Iterate existing entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, ComponentSet, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.state != SlotState::Free)
            .map(|(i, s)| (EntityId::new(i as u32, s.generation), s.components, &s.value))
    }

    /// Number of existing entities (pending-delete included).
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Maximum number of simultaneously existing entities.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entities waiting for the next reclamation.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
