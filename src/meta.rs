// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{self, AtomicU64};
use std::sync::Arc;

use crate::Error;

static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(0);

fn next_key_id() -> u64 {
    let id = NEXT_KEY_ID.fetch_add(1, atomic::Ordering::Relaxed);
    assert!(id != u64::MAX, "metadata key id space exhausted");
    id
}

type AnyVal = dyn Any + Send + Sync;

/// A typed metadata key.
///
/// Every key carries a process-unique id, so two keys declared with the
/// same name are still distinct keys. The id order is the binding order
/// used by [`Meta::compare`].
pub struct Key<T> {
    id: u64,
    name: Arc<str>,
    pp: fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
    cmp: fn(&T, &T) -> Ordering,
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Key {
            id: self.id,
            name: self.name.clone(),
            pp: self.pp,
            cmp: self.cmp,
        }
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

impl<T: Any + Send + Sync> Key<T> {
    /// Declares a fresh key, printing and comparing values the derived way.
    pub fn new(name: &str) -> Key<T>
    where
        T: Ord + fmt::Debug,
    {
        Key::with(name, <T as Ord>::cmp, <T as fmt::Debug>::fmt)
    }

    /// Declares a fresh key with an explicit value comparator.
    ///
    /// Use this for value types whose floats keep them from being `Ord`.
    pub fn with_cmp(name: &str, cmp: fn(&T, &T) -> Ordering) -> Key<T>
    where
        T: fmt::Debug,
    {
        Key::with(name, cmp, <T as fmt::Debug>::fmt)
    }

    /// Declares a fresh key with an explicit value comparator and printer.
    pub fn with(
        name: &str,
        cmp: fn(&T, &T) -> Ordering,
        pp: fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> Key<T> {
        Key {
            id: next_key_id(),
            name: Arc::from(name),
            pp,
            cmp,
        }
    }

    /// Returns the key name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone)]
struct Binding {
    id: u64,
    name: Arc<str>,
    value: Arc<AnyVal>,
    pp: Arc<dyn Fn(&AnyVal, &mut fmt::Formatter<'_>) -> fmt::Result + Send + Sync>,
    cmp: Arc<dyn Fn(&AnyVal, &AnyVal) -> Ordering + Send + Sync>,
}

/// A typed, heterogeneous key→value map.
///
/// Used to attach document metadata and rendering hints to images and
/// renderers. Metas are immutable values; [`add`](Meta::add) and
/// [`rem`](Meta::rem) return new maps.
#[derive(Clone, Default)]
pub struct Meta {
    // Sorted by key id.
    bindings: Vec<Binding>,
}

impl Meta {
    /// Creates a new empty metadata map.
    #[inline]
    pub fn new() -> Meta {
        Meta::default()
    }

    /// Returns `true` if the map contains no binding.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns the number of bindings.
    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    fn index_of(&self, id: u64) -> Result<usize, usize> {
        self.bindings.binary_search_by(|b| b.id.cmp(&id))
    }

    /// Checks if the key is bound.
    pub fn mem<T: Any + Send + Sync>(&self, key: &Key<T>) -> bool {
        self.index_of(key.id).is_ok()
    }

    /// Binds `key` to `value`, replacing any previous binding.
    #[must_use]
    pub fn add<T: Any + Send + Sync>(mut self, key: &Key<T>, value: T) -> Meta {
        let pp = key.pp;
        let cmp = key.cmp;
        let binding = Binding {
            id: key.id,
            name: key.name.clone(),
            value: Arc::new(value),
            pp: Arc::new(move |v: &AnyVal, f: &mut fmt::Formatter<'_>| {
                // A binding only ever holds the value its key stored.
                let v = v.downcast_ref::<T>().expect("metadata value type mismatch");
                pp(v, f)
            }),
            cmp: Arc::new(move |a: &AnyVal, b: &AnyVal| {
                let a = a.downcast_ref::<T>().expect("metadata value type mismatch");
                let b = b.downcast_ref::<T>().expect("metadata value type mismatch");
                cmp(a, b)
            }),
        };

        match self.index_of(key.id) {
            Ok(i) => self.bindings[i] = binding,
            Err(i) => self.bindings.insert(i, binding),
        }

        self
    }

    /// Removes the binding for `key`, if any.
    #[must_use]
    pub fn rem<T: Any + Send + Sync>(mut self, key: &Key<T>) -> Meta {
        if let Ok(i) = self.index_of(key.id) {
            self.bindings.remove(i);
        }

        self
    }

    /// Returns the value bound to `key`.
    pub fn find<T: Any + Send + Sync>(&self, key: &Key<T>) -> Option<&T> {
        let i = self.index_of(key.id).ok()?;
        Some(
            self.bindings[i]
                .value
                .downcast_ref::<T>()
                .expect("metadata value type mismatch"),
        )
    }

    /// Returns the value bound to `key` or [`Error::UnboundKey`].
    pub fn get<T: Any + Send + Sync>(&self, key: &Key<T>) -> Result<&T, Error> {
        self.find(key)
            .ok_or_else(|| Error::UnboundKey(key.name().to_string()))
    }

    /// Merges `other` into the map. Bindings of `other` win.
    #[must_use]
    pub fn add_meta(mut self, other: &Meta) -> Meta {
        for binding in &other.bindings {
            match self.index_of(binding.id) {
                Ok(i) => self.bindings[i] = binding.clone(),
                Err(i) => self.bindings.insert(i, binding.clone()),
            }
        }

        self
    }

    /// Totally orders two metadata maps.
    ///
    /// Bindings are compared in key id order, falling back to the key's
    /// value comparator.
    pub fn compare(&self, other: &Meta) -> Ordering {
        for (a, b) in self.bindings.iter().zip(other.bindings.iter()) {
            let ord = a.id.cmp(&b.id);
            if ord != Ordering::Equal {
                return ord;
            }

            let ord = (a.cmp)(&*a.value, &*b.value);
            if ord != Ordering::Equal {
                return ord;
            }
        }

        self.bindings.len().cmp(&other.bindings.len())
    }
}

impl PartialEq for Meta {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Meta {}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        struct Value<'a>(&'a Binding);

        impl fmt::Debug for Value<'_> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                (self.0.pp)(&*self.0.value, f)
            }
        }

        f.debug_map()
            .entries(self.bindings.iter().map(|b| (&*b.name, Value(b))))
            .finish()
    }
}

/// Standard metadata keys.
///
/// How a render target uses them is target specific; a key that a
/// target does not understand is simply ignored.
pub mod keys {
    use std::cmp::Ordering;

    use once_cell::sync::Lazy;

    use super::Key;
    use crate::V2;

    /// A calendar date and daytime.
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
    #[allow(missing_docs)]
    pub struct DateTime {
        pub year: i32,
        pub month: u8,
        pub day: u8,
        pub hour: u8,
        pub minute: u8,
        pub second: u8,
    }

    fn v2_cmp(a: &V2, b: &V2) -> Ordering {
        a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
    }

    static RESOLUTION: Lazy<Key<V2>> = Lazy::new(|| Key::with_cmp("resolution", v2_cmp));
    static TITLE: Lazy<Key<String>> = Lazy::new(|| Key::new("title"));
    static AUTHORS: Lazy<Key<Vec<String>>> = Lazy::new(|| Key::new("authors"));
    static CREATOR: Lazy<Key<String>> = Lazy::new(|| Key::new("creator"));
    static KEYWORDS: Lazy<Key<Vec<String>>> = Lazy::new(|| Key::new("keywords"));
    static SUBJECT: Lazy<Key<String>> = Lazy::new(|| Key::new("subject"));
    static DESCRIPTION: Lazy<Key<String>> = Lazy::new(|| Key::new("description"));
    static CREATION_DATE: Lazy<Key<DateTime>> = Lazy::new(|| Key::new("creation_date"));

    /// The output resolution hint, in samples per meter.
    pub fn resolution() -> Key<V2> {
        RESOLUTION.clone()
    }

    /// The document title.
    pub fn title() -> Key<String> {
        TITLE.clone()
    }

    /// The document authors.
    pub fn authors() -> Key<Vec<String>> {
        AUTHORS.clone()
    }

    /// The document creator tool.
    pub fn creator() -> Key<String> {
        CREATOR.clone()
    }

    /// The document keywords.
    pub fn keywords() -> Key<Vec<String>> {
        KEYWORDS.clone()
    }

    /// The document subject.
    pub fn subject() -> Key<String> {
        SUBJECT.clone()
    }

    /// The document description.
    pub fn description() -> Key<String> {
        DESCRIPTION.clone()
    }

    /// The document creation date.
    pub fn creation_date() -> Key<DateTime> {
        CREATION_DATE.clone()
    }
}
