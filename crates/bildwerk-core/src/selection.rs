// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered image selection. The order of the list is the page order of the
// generated document.

use std::fmt;

use tracing::{debug, instrument};

use crate::error::{BildwerkError, Result};
use crate::types::ImageItem;

/// Size of the selection after a mutation, for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionStatus {
    pub count: usize,
}

impl SelectionStatus {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl fmt::Display for SelectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "No images selected.")
        } else {
            write!(f, "{} image(s) ready.", self.count)
        }
    }
}

type ChangeListener = Box<dyn FnMut(SelectionStatus) + Send>;

/// The ordered collection of images chosen for conversion.
///
/// Items are never absent: removal compacts the list. The only mutations are
/// append, remove-at, move and clear; each one reports the new size to the
/// registered change listener, if any.
#[derive(Default)]
pub struct SelectionList {
    items: Vec<ImageItem>,
    listener: Option<ChangeListener>,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked with the current size after every mutation.
    pub fn on_change(&mut self, listener: impl FnMut(SelectionStatus) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    // -- Accessors ------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageItem> {
        self.items.iter()
    }

    pub fn status(&self) -> SelectionStatus {
        SelectionStatus {
            count: self.items.len(),
        }
    }

    /// Immutable copy of the current order for a conversion run. Image bytes
    /// are shared, not duplicated.
    pub fn snapshot(&self) -> Vec<ImageItem> {
        self.items.clone()
    }

    // -- Mutations ------------------------------------------------------------

    /// Append images, silently dropping anything not declared as `image/*`.
    ///
    /// Returns the number of items actually appended. When nothing survives
    /// the filter the list is untouched and no change is reported.
    #[instrument(skip_all)]
    pub fn append(&mut self, images: impl IntoIterator<Item = ImageItem>) -> usize {
        let before = self.items.len();
        let mut dropped = 0usize;
        for item in images {
            if item.is_image() {
                self.items.push(item);
            } else {
                debug!(name = %item.name, media_type = %item.media_type, "Dropping non-image item");
                dropped += 1;
            }
        }

        let added = self.items.len() - before;
        debug!(added, dropped, total = self.items.len(), "Append complete");
        if added > 0 {
            self.notify();
        }
        added
    }

    /// Remove and return the item at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<ImageItem> {
        if index >= self.items.len() {
            return Err(BildwerkError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        debug!(index, name = %removed.name, "Removed item");
        self.notify();
        Ok(removed)
    }

    /// Move the item at `from` so that it ends up at `to`.
    ///
    /// `to` is interpreted against the list with the source item already
    /// removed; positions past the end append.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.items.len() {
            return Err(BildwerkError::OutOfRange {
                index: from,
                len: self.items.len(),
            });
        }
        let item = self.items.remove(from);
        let to = to.min(self.items.len());
        self.items.insert(to, item);
        debug!(from, to, "Moved item");
        self.notify();
        Ok(())
    }

    /// [`SelectionList::move_to`] for indices that arrive as text.
    ///
    /// If either side is not a non-negative integer nothing happens and
    /// `Ok(false)` is returned.
    pub fn move_parsed(&mut self, from: &str, to: &str) -> Result<bool> {
        match (from.trim().parse::<usize>(), to.trim().parse::<usize>()) {
            (Ok(from), Ok(to)) => self.move_to(from, to).map(|()| true),
            _ => {
                debug!(from, to, "Ignoring move with non-integer index");
                Ok(false)
            }
        }
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.notify();
    }

    fn notify(&mut self) {
        let status = self.status();
        if let Some(listener) = self.listener.as_mut() {
            listener(status);
        }
    }
}

impl fmt::Debug for SelectionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionList")
            .field("items", &self.items)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl<'a> IntoIterator for &'a SelectionList {
    type Item = &'a ImageItem;
    type IntoIter = std::slice::Iter<'a, ImageItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn item(name: &str) -> ImageItem {
        ImageItem::new(name, "image/png", name.as_bytes().to_vec())
    }

    fn names(list: &SelectionList) -> Vec<String> {
        list.iter().map(|i| i.name.clone()).collect()
    }

    fn list_of(names: &[&str]) -> SelectionList {
        let mut list = SelectionList::new();
        list.append(names.iter().map(|n| item(n)));
        list
    }

    #[test]
    fn append_drops_non_images() {
        let mut list = SelectionList::new();
        let added = list.append(vec![
            item("a"),
            ImageItem::new("notes.txt", "text/plain", b"hello".to_vec()),
            item("b"),
        ]);
        assert_eq!(added, 2);
        assert_eq!(names(&list), vec!["a", "b"]);
        assert_eq!(list.status().to_string(), "2 image(s) ready.");
    }

    #[test]
    fn append_of_only_non_images_is_a_noop() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut list = SelectionList::new();
        let sink = Arc::clone(&seen);
        list.on_change(move |status| sink.lock().unwrap().push(status.count));

        let added = list.append(vec![ImageItem::new("x.pdf", "application/pdf", vec![1])]);
        assert_eq!(added, 0);
        assert!(list.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn remove_compacts() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        let removed = list.remove_at(1).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(names(&list), vec!["a", "c", "d"]);
        for i in 0..list.len() {
            assert!(list.get(i).is_some());
        }
    }

    #[test]
    fn remove_out_of_range() {
        let mut list = list_of(&["a"]);
        let err = list.remove_at(3).unwrap_err();
        assert!(matches!(err, BildwerkError::OutOfRange { index: 3, len: 1 }));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn move_uses_shortened_list() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        list.move_to(0, 2).unwrap();
        assert_eq!(names(&list), vec!["b", "c", "a", "d"]);

        list.move_to(3, 0).unwrap();
        assert_eq!(names(&list), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn move_then_inverse_restores_order() {
        let original = vec!["a", "b", "c", "d", "e"];
        for from in 0..original.len() {
            for to in 0..original.len() {
                let mut list = list_of(&original);
                list.move_to(from, to).unwrap();
                list.move_to(to, from).unwrap();
                assert_eq!(names(&list), original, "from={from} to={to}");
            }
        }
    }

    #[test]
    fn move_past_end_appends() {
        let mut list = list_of(&["a", "b", "c"]);
        list.move_to(0, 10).unwrap();
        assert_eq!(names(&list), vec!["b", "c", "a"]);
    }

    #[test]
    fn move_with_bad_source_leaves_list_untouched() {
        let mut list = list_of(&["a", "b"]);
        assert!(list.move_to(5, 0).is_err());
        assert_eq!(names(&list), vec!["a", "b"]);
    }

    #[test]
    fn move_parsed_ignores_non_integers() {
        let mut list = list_of(&["a", "b", "c"]);
        assert!(!list.move_parsed("x", "1").unwrap());
        assert!(!list.move_parsed("0", "-1").unwrap());
        assert!(!list.move_parsed("", "").unwrap());
        assert_eq!(names(&list), vec!["a", "b", "c"]);

        assert!(list.move_parsed(" 2 ", "0").unwrap());
        assert_eq!(names(&list), vec!["c", "a", "b"]);
    }

    #[test]
    fn listener_sees_every_mutation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut list = SelectionList::new();
        let sink = Arc::clone(&seen);
        list.on_change(move |status| sink.lock().unwrap().push(status.count));

        list.append(vec![item("a"), item("b"), item("c")]);
        list.move_to(0, 1).unwrap();
        list.remove_at(0).unwrap();
        list.clear();

        assert_eq!(*seen.lock().unwrap(), vec![3, 3, 2, 0]);
        assert_eq!(list.status().to_string(), "No images selected.");
    }

    #[test]
    fn snapshot_is_independent_of_later_edits() {
        let mut list = list_of(&["a", "b"]);
        let snapshot = list.snapshot();
        assert!(Arc::ptr_eq(&snapshot[0].data, &list.get(0).unwrap().data));

        list.clear();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].name, "b");
    }
}
