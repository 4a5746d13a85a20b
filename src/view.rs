//! UI-local override list
//!
//! A [`ListView`] projects a [`PageSnapshot`] and hides items the user
//! removed locally. The paginator's accumulator is never touched: hidden ids
//! survive later pages of the same generation and are dropped on reset.

use crate::pagination::{Generation, PageSnapshot};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Items with a stable identity
pub trait Identify {
    /// Identity type
    type Id: Clone + Eq + Hash + Debug;

    /// Identity of this item
    fn id(&self) -> Self::Id;
}

/// A snapshot minus locally removed items
#[derive(Debug)]
pub struct ListView<T: Identify> {
    source: Arc<Vec<T>>,
    visible: Vec<usize>,
    hidden: HashSet<T::Id>,
    generation: Generation,
    has_more: bool,
}

impl<T: Identify> ListView<T> {
    /// Create a view over a snapshot with nothing hidden
    pub fn new(snapshot: &PageSnapshot<T>) -> Self {
        let mut view = Self {
            source: Arc::clone(&snapshot.items),
            visible: Vec::new(),
            hidden: HashSet::new(),
            generation: snapshot.generation,
            has_more: snapshot.has_more,
        };
        view.project();
        view
    }

    /// Move to a newer snapshot
    ///
    /// Hidden ids carry over within a generation; a snapshot from another
    /// generation starts with nothing hidden.
    pub fn refresh(&mut self, snapshot: &PageSnapshot<T>) {
        if snapshot.generation != self.generation {
            self.hidden.clear();
            self.generation = snapshot.generation;
        }
        self.source = Arc::clone(&snapshot.items);
        self.has_more = snapshot.has_more;
        self.project();
    }

    /// Hide the item at a visible index, returning its id
    pub fn remove(&mut self, index: usize) -> Option<T::Id> {
        let position = *self.visible.get(index)?;
        let id = self.source[position].id();
        self.hidden.insert(id.clone());
        self.visible.remove(index);
        Some(id)
    }

    /// Hide every visible item with this id
    pub fn remove_id(&mut self, id: &T::Id) -> bool {
        if !self.visible.iter().any(|&i| self.source[i].id() == *id) {
            return false;
        }
        self.hidden.insert(id.clone());
        self.project();
        true
    }

    /// Visible items, in accumulator order
    pub fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.visible.iter().map(|&i| &self.source[i])
    }

    /// Visible item at `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.visible.get(index).map(|&i| &self.source[i])
    }

    /// Number of visible items
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    /// True when every loaded item is hidden or nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Whether the underlying paginator can load more
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Number of hidden ids
    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    fn project(&mut self) {
        let hidden = &self.hidden;
        self.visible = self
            .source
            .iter()
            .enumerate()
            .filter(|(_, item)| !hidden.contains(&item.id()))
            .map(|(i, _)| i)
            .collect();
    }
}
