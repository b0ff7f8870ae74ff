use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Generation-checked handle into an [`Arena`](crate::Arena).
///
/// A handle stays valid until the slot it points at is freed. Once the slot is
/// recycled the generation moves on, so stale handles simply stop resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32, // For handling slot reuse
}

impl Entity {
    pub fn new(index: u32, generation: u32) -> Self {
        Entity { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// EntityAllocator hands out slot indices and tracks their generations
#[derive(Debug, Default, Clone)]
pub struct EntityAllocator {
    generations: Vec<u32>,    // Current generation for each slot
    free_slots: VecDeque<u32>, // Slots that can be recycled
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle, recycling freed slots first
    pub fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free_slots.pop_front() {
            Entity::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            Entity::new(index, 0)
        }
    }

    /// Free the slot behind `entity`. Returns false for stale handles.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_live(entity) {
            return false;
        }

        // Bump the generation so every outstanding copy of the handle goes stale
        let slot = &mut self.generations[entity.index() as usize];
        *slot = slot.wrapping_add(1);
        self.free_slots.push_back(entity.index());
        true
    }

    /// A handle is live if its generation matches the slot's current generation.
    /// Freed slots move to a generation that has not been handed out yet.
    pub fn is_live(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index() as usize)
            .map_or(false, |generation| *generation == entity.generation())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_handles_go_stale_and_slots_are_recycled() {
        let mut allocator = EntityAllocator::new();
        let a = allocator.allocate();
        let b = allocator.allocate();
        assert_ne!(a, b);

        assert!(allocator.free(a));
        assert!(!allocator.is_live(a));
        assert!(allocator.is_live(b));
        assert!(!allocator.free(a), "double free must be rejected");

        let c = allocator.allocate();
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert!(allocator.is_live(c));
        assert!(!allocator.is_live(a));
    }
}
