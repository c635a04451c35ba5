//! Items carried by the actor.

use tilequest_core::Item;

#[derive(Debug)]
pub(crate) struct Inventory {
    items: Vec<Item>,
    capacity: usize,
}

impl Inventory {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Adds the item, handing it back if there is no room.
    pub(crate) fn push(&mut self, item: Item) -> Result<(), Item> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    pub(crate) fn has_hammer(&self) -> bool {
        self.items.iter().any(Item::is_hammer)
    }

    /// Removes and returns the first item matching `predicate`.
    pub(crate) fn take_first(&mut self, predicate: impl Fn(&Item) -> bool) -> Option<Item> {
        let index = self.items.iter().position(predicate)?;
        Some(self.items.remove(index))
    }

    pub(crate) fn items(&self) -> &[Item] {
        &self.items
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
