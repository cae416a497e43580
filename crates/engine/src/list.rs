//! Observable row list with an incrementally filtered view.
//!
//! `EventList` (all items) and `FilterList` (items accepted by the current
//! matcher) are two handles on the same state behind one
//! `parking_lot::RwLock`:
//! - writers: item mutation, matcher replacement
//! - readers: data access, iteration
//! - change notifications go out after the write lock is released

use std::sync::Arc;

use nattable_core::Range;
use parking_lot::{Mutex, RwLock};

use crate::command::LayerCommand;
use crate::filter::Matcher;

/// A change to a list, in that list's positions. `Deleted` ranges are in the
/// layout before the change, `Inserted` ranges in the layout after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    Inserted(Range),
    Deleted(Range),
    Updated(Range),
    Reset,
}

pub type ListListener = Box<dyn FnMut(&ListChange) + Send>;

struct ListState<T> {
    items: Vec<T>,
    matcher: Option<Arc<dyn Matcher<T>>>,
    /// Source indexes of accepted items, ascending
    visible: Vec<usize>,
}

impl<T> ListState<T> {
    fn accepts(&self, item: &T) -> bool {
        self.matcher.as_ref().map_or(true, |m| m.matches(item))
    }

    fn rebuild_visible(&mut self) {
        let visible: Vec<usize> =
            (0..self.items.len()).filter(|&i| self.accepts(&self.items[i])).collect();
        self.visible = visible;
    }

    fn visible_position(&self, source_index: usize) -> Result<usize, usize> {
        self.visible.binary_search(&source_index)
    }
}

struct Shared<T> {
    state: RwLock<ListState<T>>,
    source_listeners: Mutex<Vec<ListListener>>,
    filtered_listeners: Mutex<Vec<ListListener>>,
}

impl<T> Shared<T> {
    fn publish(&self, source: Option<ListChange>, filtered: Option<ListChange>) {
        if let Some(change) = source {
            for listener in self.source_listeners.lock().iter_mut() {
                listener(&change);
            }
        }
        if let Some(change) = filtered {
            for listener in self.filtered_listeners.lock().iter_mut() {
                listener(&change);
            }
        }
    }

    fn insert(&self, index: usize, item: T) {
        let mut state = self.state.write();
        let index = index.min(state.items.len());
        let accepted = state.accepts(&item);
        state.items.insert(index, item);
        for v in state.visible.iter_mut() {
            if *v >= index {
                *v += 1;
            }
        }
        let filtered = accepted.then(|| {
            let pos = state.visible.partition_point(|&v| v < index);
            state.visible.insert(pos, index);
            ListChange::Inserted(Range::single(pos))
        });
        drop(state);

        self.publish(Some(ListChange::Inserted(Range::single(index))), filtered);
    }

    fn remove(&self, index: usize) -> Option<T> {
        let mut state = self.state.write();
        if index >= state.items.len() {
            return None;
        }
        let item = state.items.remove(index);
        let filtered = state.visible_position(index).ok().map(|pos| {
            state.visible.remove(pos);
            ListChange::Deleted(Range::single(pos))
        });
        for v in state.visible.iter_mut() {
            if *v > index {
                *v -= 1;
            }
        }
        drop(state);

        self.publish(Some(ListChange::Deleted(Range::single(index))), filtered);
        Some(item)
    }

    fn update<R>(&self, index: usize, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut state = self.state.write();
        let item = state.items.get_mut(index)?;
        let result = f(item);

        let now = state.accepts(&state.items[index]);
        let filtered = match (state.visible_position(index), now) {
            (Ok(pos), true) => Some(ListChange::Updated(Range::single(pos))),
            (Ok(pos), false) => {
                state.visible.remove(pos);
                Some(ListChange::Deleted(Range::single(pos)))
            }
            (Err(pos), true) => {
                state.visible.insert(pos, index);
                Some(ListChange::Inserted(Range::single(pos)))
            }
            (Err(_), false) => None,
        };
        drop(state);

        self.publish(Some(ListChange::Updated(Range::single(index))), filtered);
        Some(result)
    }
}

/// All items, in source order.
pub struct EventList<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for EventList<T> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<T> EventList<T> {
    pub fn new(items: Vec<T>) -> Self {
        let visible = (0..items.len()).collect();
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(ListState { items, matcher: None, visible }),
                source_listeners: Mutex::new(Vec::new()),
                filtered_listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The filtered view sharing this list's lock.
    pub fn filter_list(&self) -> FilterList<T> {
        FilterList { shared: Arc::clone(&self.shared) }
    }

    pub fn len(&self) -> usize {
        self.shared.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.shared.state.read().items.get(index).cloned()
    }

    /// Run `f` over all items under the read lock.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.shared.state.read().items)
    }

    pub fn push(&self, item: T) {
        self.shared.insert(usize::MAX, item);
    }

    /// Insert at `index`; past the end appends.
    pub fn insert(&self, index: usize, item: T) {
        self.shared.insert(index, item);
    }

    pub fn remove(&self, index: usize) -> Option<T> {
        self.shared.remove(index)
    }

    pub fn update<R>(&self, index: usize, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.shared.update(index, f)
    }

    pub fn set(&self, index: usize, item: T) -> Option<T> {
        self.shared.update(index, |slot| std::mem::replace(slot, item))
    }

    pub fn replace_all(&self, items: Vec<T>) {
        let mut state = self.shared.state.write();
        state.items = items;
        state.rebuild_visible();
        drop(state);

        self.shared.publish(Some(ListChange::Reset), Some(ListChange::Reset));
    }

    /// Listen to changes in source positions.
    pub fn add_listener(&self, listener: ListListener) {
        self.shared.source_listeners.lock().push(listener);
    }
}

/// Items accepted by the current matcher, in source order.
pub struct FilterList<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for FilterList<T> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<T> FilterList<T> {
    pub fn source(&self) -> EventList<T> {
        EventList { shared: Arc::clone(&self.shared) }
    }

    pub fn len(&self) -> usize {
        self.shared.state.read().visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn source_index(&self, position: usize) -> Option<usize> {
        self.shared.state.read().visible.get(position).copied()
    }

    pub fn visible_indexes(&self) -> Vec<usize> {
        self.shared.state.read().visible.clone()
    }

    /// Whether the source item at `source_index` passes the current matcher.
    pub fn matches(&self, source_index: usize) -> bool {
        self.shared.state.read().visible_position(source_index).is_ok()
    }

    pub fn get(&self, position: usize) -> Option<T>
    where
        T: Clone,
    {
        self.with_item(position, T::clone)
    }

    pub fn with_item<R>(&self, position: usize, f: impl FnOnce(&T) -> R) -> Option<R> {
        let state = self.shared.state.read();
        let index = *state.visible.get(position)?;
        state.items.get(index).map(f)
    }

    /// Mutate the item at a filtered position. The item may drop out of the
    /// filtered view as a result.
    pub fn update_item<R>(&self, position: usize, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let index = self.source_index(position)?;
        self.shared.update(index, f)
    }

    /// Replace the matcher and recompute the view; `None` accepts everything.
    pub fn set_matcher(&self, matcher: Option<Arc<dyn Matcher<T>>>) {
        let mut state = self.shared.state.write();
        state.matcher = matcher;
        state.rebuild_visible();
        drop(state);

        self.shared.publish(None, Some(ListChange::Reset));
    }

    /// Listen to changes in filtered positions.
    pub fn add_listener(&self, listener: ListListener) {
        self.shared.filtered_listeners.lock().push(listener);
    }
}

/// Queue bridging filtered-list changes into `RowsChanged` commands for a
/// layer stack built over the list.
#[derive(Clone, Default)]
pub struct RowChangeQueue {
    pending: Arc<Mutex<Vec<ListChange>>>,
}

impl RowChangeQueue {
    pub fn attach<T>(list: &FilterList<T>) -> Self {
        let queue = Self::default();
        let pending = Arc::clone(&queue.pending);
        list.add_listener(Box::new(move |change| pending.lock().push(change.clone())));
        queue
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn drain_commands(&self) -> Vec<LayerCommand> {
        std::mem::take(&mut *self.pending.lock())
            .into_iter()
            .map(LayerCommand::RowsChanged)
            .collect()
    }
}
