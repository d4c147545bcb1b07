//! Generational arena keyed by `DisplayId`

use super::types::DisplayId;

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot table; freed slots are reused with a bumped generation
pub struct DisplayTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> DisplayTable<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a value built from its own id
    pub fn insert_with<F>(&mut self, build: F) -> DisplayId
    where
        F: FnOnce(DisplayId) -> T,
    {
        let id = match self.free.pop() {
            Some(index) => DisplayId::new(index, self.slots[index as usize].generation),
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                DisplayId::new((self.slots.len() - 1) as u32, 0)
            }
        };
        self.slots[id.index() as usize].value = Some(build(id));
        self.len += 1;
        id
    }

    pub fn get(&self, id: DisplayId) -> Option<&T> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn contains(&self, id: DisplayId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: DisplayId) -> Option<T> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.len -= 1;
        Some(value)
    }

    /// Live ids in slot order
    pub fn ids(&self) -> Vec<DisplayId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DisplayId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|v| (DisplayId::new(index as u32, slot.generation), v))
        })
    }
}

impl<T> Default for DisplayTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
