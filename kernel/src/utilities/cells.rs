// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Cell types for sharing driver state with interrupt handlers.
//!
//! Driver structs are referenced both from the main context (the
//! registration surface) and from interrupt handlers, so all of their
//! state lives behind `&self`. These cells keep that interior
//! mutability explicit and panic-free.

use core::cell::Cell;

/// A `Cell` that wraps an `Option`.
///
/// Used for client references and other values that may not be set
/// yet. Keeps call sites free of `Option` plumbing.
pub struct OptionalCell<T: Copy> {
    value: Cell<Option<T>>,
}

impl<T: Copy> Default for OptionalCell<T> {
    fn default() -> Self {
        OptionalCell::empty()
    }
}

impl<T: Copy> OptionalCell<T> {
    /// Create an empty cell (contains just `None`).
    pub const fn empty() -> OptionalCell<T> {
        OptionalCell {
            value: Cell::new(None),
        }
    }

    /// Update the stored value.
    pub fn set(&self, val: T) {
        self.value.set(Some(val));
    }

    /// Reset the stored value to `None`.
    pub fn clear(&self) {
        self.value.set(None);
    }

    /// Check if the cell contains something.
    pub fn is_some(&self) -> bool {
        self.value.get().is_some()
    }

    /// Check if the cell is `None`.
    pub fn is_none(&self) -> bool {
        self.value.get().is_none()
    }

    /// Return a copy of the contained value, if any.
    pub fn get(&self) -> Option<T> {
        self.value.get()
    }

    /// Call `closure` on the contained value, if any.
    pub fn map<F, R>(&self, closure: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        self.value.get().map(|val| closure(&val))
    }
}

/// A shared reference to a mutable reference.
///
/// A `TakeCell` holds a potential mutable reference that clients
/// either move out or operate on within a closure; only one referrer
/// has access to the underlying memory at a time. Taking the value
/// out of an empty `TakeCell` yields `None` rather than panicking,
/// which is what makes it safe to use from both the registration
/// surface and interrupt handlers.
pub struct TakeCell<'a, T: 'a + ?Sized> {
    val: Cell<Option<&'a mut T>>,
}

impl<'a, T: ?Sized> Default for TakeCell<'a, T> {
    fn default() -> Self {
        TakeCell::empty()
    }
}

impl<'a, T: ?Sized> TakeCell<'a, T> {
    /// Create an empty cell.
    pub const fn empty() -> TakeCell<'a, T> {
        TakeCell {
            val: Cell::new(None),
        }
    }

    /// Create a new `TakeCell` containing `value`.
    pub const fn new(value: &'a mut T) -> TakeCell<'a, T> {
        TakeCell {
            val: Cell::new(Some(value)),
        }
    }

    pub fn is_none(&self) -> bool {
        let inner = self.take();
        let result = inner.is_none();
        self.val.set(inner);
        result
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Take the mutable reference out, leaving `None` in its place.
    pub fn take(&self) -> Option<&'a mut T> {
        self.val.replace(None)
    }

    /// Store `val`, returning the previous contents, if any.
    pub fn replace(&self, val: &'a mut T) -> Option<&'a mut T> {
        self.val.replace(Some(val))
    }

    /// Call `closure` with a mutable borrow of the contents, if any.
    ///
    /// The contents are moved out for the duration of the call, so a
    /// re-entrant `map` on the same cell observes it empty instead of
    /// aliasing the borrow.
    pub fn map<F, R>(&self, closure: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let maybe_val = self.take();
        maybe_val.map(|mut val| {
            let result = closure(&mut val);
            self.replace(val);
            result
        })
    }
}

#[cfg(test)]
mod test {
    use super::{OptionalCell, TakeCell};

    #[test]
    fn optional_cell_set_get_clear() {
        let cell: OptionalCell<u32> = OptionalCell::empty();
        assert!(cell.is_none());
        cell.set(7);
        assert_eq!(cell.get(), Some(7));
        assert_eq!(cell.map(|v| v + 1), Some(8));
        cell.clear();
        assert!(cell.is_none());
    }

    #[test]
    fn take_cell_single_access() {
        let mut value = [0u8; 4];
        let cell = TakeCell::new(&mut value[..]);
        let taken = cell.take().unwrap();
        // Second take sees the cell empty until the buffer is replaced.
        assert!(cell.take().is_none());
        cell.replace(taken);
        assert!(cell.is_some());
        assert_eq!(cell.map(|buf| buf.len()), Some(4));
    }
}
