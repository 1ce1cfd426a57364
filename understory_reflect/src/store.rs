// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container sparse storage for static property values.
//!
//! Static properties live in the type's spec table; a container only stores
//! the values and status flags that differ from the spec defaults.
//!
//! Both tables are sorted vectors searched by slot. Containers typically
//! override a handful of properties, so a binary search over contiguous
//! entries beats a hash map on both lookup time and memory.

use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::flags::PropertyFlags;
use crate::value::Value;

/// Most containers change fewer than 8 static properties from their defaults,
/// so this avoids heap allocation in the common case.
const INLINE_CAPACITY: usize = 8;

/// Sparse static values and status overrides, keyed by slot.
#[derive(Clone, Debug, Default)]
pub(crate) struct StaticStore {
    /// Values differing from the spec default, sorted by slot.
    values: SmallVec<[(usize, Value); INLINE_CAPACITY]>,
    /// Status flags differing from the spec flags, sorted by slot.
    ///
    /// Stored out-of-line: status overrides are rare.
    status: Vec<(usize, PropertyFlags)>,
}

impl StaticStore {
    #[inline]
    fn find_value(&self, slot: usize) -> Result<usize, usize> {
        self.values.binary_search_by_key(&slot, |(s, _)| *s)
    }

    #[inline]
    fn find_status(&self, slot: usize) -> Result<usize, usize> {
        self.status.binary_search_by_key(&slot, |(s, _)| *s)
    }

    /// Returns the number of slots holding a non-default value.
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns the stored value for `slot`, or `None` if it is at its default.
    pub(crate) fn value(&self, slot: usize) -> Option<&Value> {
        self.find_value(slot).ok().map(|idx| &self.values[idx].1)
    }

    /// Stores `value` for `slot` and returns the previous effective value.
    ///
    /// Writing the default drops the entry.
    pub(crate) fn replace(&mut self, slot: usize, value: Value, default: &Value) -> Value {
        let is_default = value.same_as(default);
        match self.find_value(slot) {
            Ok(idx) if is_default => self.values.remove(idx).1,
            Ok(idx) => core::mem::replace(&mut self.values[idx].1, value),
            Err(_) if is_default => value,
            Err(idx) => {
                self.values.insert(idx, (slot, value));
                default.clone()
            }
        }
    }

    /// Returns the status of `slot`, falling back to `default`.
    pub(crate) fn status(&self, slot: usize, default: PropertyFlags) -> PropertyFlags {
        self.find_status(slot)
            .map_or(default, |idx| self.status[idx].1)
    }

    /// Sets the status of `slot`; writing `default` drops the override.
    pub(crate) fn set_status(&mut self, slot: usize, flags: PropertyFlags, default: PropertyFlags) {
        match self.find_status(slot) {
            Ok(idx) if flags == default => {
                self.status.remove(idx);
            }
            Ok(idx) => self.status[idx].1 = flags,
            Err(_) if flags == default => {}
            Err(idx) => self.status.insert(idx, (slot, flags)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn store_starts_empty() {
        let store = StaticStore::default();
        assert_eq!(store.len(), 0);
        assert!(store.value(0).is_none());
        assert_eq!(store.status(0, PropertyFlags::HIDDEN), PropertyFlags::HIDDEN);
    }

    #[test]
    fn replace_returns_previous_effective_value() {
        let default = Value::Float(0.0);
        let mut store = StaticStore::default();

        let old = store.replace(3, Value::Float(2.5), &default);
        assert_eq!(old, default);
        assert_eq!(store.value(3), Some(&Value::Float(2.5)));

        let old = store.replace(3, Value::Float(4.0), &default);
        assert_eq!(old, Value::Float(2.5));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn writing_default_keeps_store_sparse() {
        let default = Value::String(String::from("Concrete"));
        let mut store = StaticStore::default();

        store.replace(1, Value::String(String::from("Brick")), &default);
        assert_eq!(store.len(), 1);

        let old = store.replace(1, default.clone(), &default);
        assert_eq!(old, Value::String(String::from("Brick")));
        assert_eq!(store.len(), 0);
        assert!(store.value(1).is_none());

        // Writing the default when nothing is stored is a no-op.
        store.replace(1, default.clone(), &default);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn negative_zero_is_not_the_default() {
        let default = Value::Float(0.0);
        let mut store = StaticStore::default();

        store.replace(0, Value::Float(-0.0), &default);
        assert_eq!(store.len(), 1);
        let stored = store.value(0).and_then(Value::get::<f64>).copied();
        assert!(stored.is_some_and(f64::is_sign_negative));

        let old = store.replace(0, Value::Float(0.0), &default);
        assert!(old.same_as(&Value::Float(-0.0)));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn nan_default_stays_sparse() {
        let default = Value::Float(f64::NAN);
        let mut store = StaticStore::default();
        store.replace(0, Value::Float(f64::NAN), &default);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn slots_stay_sorted() {
        let default = Value::Integer(0);
        let mut store = StaticStore::default();
        for slot in [7, 2, 9, 0, 4] {
            let value = i64::try_from(slot).unwrap() + 1;
            store.replace(slot, Value::Integer(value), &default);
        }
        for slot in 0..10 {
            let expected = [7, 2, 9, 0, 4]
                .contains(&slot)
                .then(|| Value::Integer(i64::try_from(slot).unwrap() + 1));
            assert_eq!(store.value(slot), expected.as_ref());
        }
        assert!(store.values.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn status_overrides() {
        let mut store = StaticStore::default();
        let default = PropertyFlags::HIDDEN;

        store.set_status(2, PropertyFlags::HIDDEN | PropertyFlags::LOCKED, default);
        assert_eq!(
            store.status(2, default),
            PropertyFlags::HIDDEN | PropertyFlags::LOCKED
        );
        assert_eq!(store.status(1, default), default);

        store.set_status(2, default, default);
        assert!(store.status.is_empty());
        assert_eq!(store.status(2, default), default);
    }
}
