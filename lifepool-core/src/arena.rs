//! Slot storage addressed by generation-checked [`Entity`] handles.

use crate::entity::{Entity, EntityAllocator};

/// Owning storage for values addressed by [`Entity`] handles.
///
/// Values live in `Vec<Option<T>>` slots indexed by the handle's slot index.
/// A value can be temporarily taken out of its slot (its handle stays live)
/// so that it can be mutated while the rest of the arena is borrowed.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    allocator: EntityAllocator,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            allocator: EntityAllocator::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value and return its handle
    pub fn insert(&mut self, value: T) -> Entity {
        self.insert_with(|_| value)
    }

    /// Insert a value built from its own handle
    pub fn insert_with(&mut self, build: impl FnOnce(Entity) -> T) -> Entity {
        let entity = self.allocator.allocate();
        let idx = entity.index() as usize;

        // Ensure the vectors are large enough
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
            self.generations.resize(idx + 1, 0);
        }

        self.generations[idx] = entity.generation();
        self.slots[idx] = Some(build(entity));
        self.len += 1;
        entity
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        self.slots.get(entity.index() as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        self.slots.get_mut(entity.index() as usize).and_then(Option::as_mut)
    }

    /// Remove a value and free its slot. Stale handles return `None`.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        let value = self.slots[entity.index() as usize].take();
        self.allocator.free(entity);
        if value.is_some() {
            self.len -= 1;
        }
        value
    }

    /// Move a value out while keeping its handle live. Pair with [`Arena::restore`].
    pub fn take(&mut self, entity: Entity) -> Option<T> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        let value = self.slots[entity.index() as usize].take();
        if value.is_some() {
            self.len -= 1;
        }
        value
    }

    /// Put back a value moved out with [`Arena::take`].
    /// Returns the value if the handle went stale or the slot is occupied.
    pub fn restore(&mut self, entity: Entity, value: T) -> Result<(), T> {
        if !self.allocator.is_live(entity) {
            return Err(value);
        }
        match &mut self.slots[entity.index() as usize] {
            slot @ None => {
                *slot = Some(value);
                self.len += 1;
                Ok(())
            }
            Some(_) => Err(value),
        }
    }

    /// Number of stored values (values currently taken out are not counted)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all stored values in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        let generations = &self.generations;
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(idx, opt)| {
                opt.as_ref().map(|value| (Entity::new(idx as u32, generations[idx]), value))
            })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        let generations = &self.generations;
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(move |(idx, opt)| {
                opt.as_mut().map(|value| (Entity::new(idx as u32, generations[idx]), value))
            })
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Snapshot of the handles currently stored, in slot order
    pub fn entities(&self) -> Vec<Entity> {
        self.iter().map(|(entity, _)| entity).collect()
    }

    /// Remove every value for which `keep` returns false, returning what was removed
    pub fn retain(&mut self, mut keep: impl FnMut(Entity, &T) -> bool) -> Vec<(Entity, T)> {
        let doomed: Vec<Entity> = self
            .iter()
            .filter(|(entity, value)| !keep(*entity, value))
            .map(|(entity, _)| entity)
            .collect();

        doomed
            .into_iter()
            .filter_map(|entity| self.remove(entity).map(|value| (entity, value)))
            .collect()
    }

    /// Drop every value and invalidate every outstanding handle
    pub fn clear(&mut self) {
        for entity in self.entities() {
            self.remove(entity);
        }
    }
}
