//! The thread-safe ordered-map facade.
//!
//! [`OrderedMap`] puts any [`TreeEngine`] behind a single
//! [`parking_lot::Mutex`]: every operation holds the lock for its whole
//! duration, so concurrent callers observe a linearizable map. Values handed
//! out by the facade are clones; [`OrderedMap::lock`] gives borrowing access
//! to the engine for as long as the guard lives.
//!
//! # Examples
//!
//! ```rust
//! use ordmap::{OrderedMap, RedBlackMap};
//!
//! let map: RedBlackMap<String, &str> = OrderedMap::new();
//! map.put("5".to_string(), "a");
//! map.put("3".to_string(), "b");
//! map.put("8".to_string(), "c");
//! map.delete(&"3".to_string());
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get(&"3".to_string()), None);
//! assert_eq!(map.min_key(), Some(("5".to_string(), "a")));
//! assert_eq!(map.max_key(), Some(("8".to_string(), "c")));
//! assert!(map.check());
//! ```

use std::fmt;
use std::iter::FusedIterator;

use parking_lot::{Mutex, MutexGuard};

use crate::comparator::Comparator;
use crate::error::{InvariantViolation, Result};
use crate::tree::{AvlTree, RecursiveAvlTree, RedBlackTree, TreeEngine};
use crate::value::{FromValue, Value};

// =============================================================================
// OrderedMap Definition
// =============================================================================

/// An ordered map shared between threads, backed by the engine `E`.
pub struct OrderedMap<E> {
    engine: Mutex<E>,
}

/// An ordered map backed by a [`RedBlackTree`].
pub type RedBlackMap<K, V> = OrderedMap<RedBlackTree<K, V>>;

/// An ordered map backed by the balance-factor [`AvlTree`].
pub type AvlMap<K, V> = OrderedMap<AvlTree<K, V>>;

/// An ordered map backed by the height-based [`RecursiveAvlTree`].
pub type RecursiveAvlMap<K, V> = OrderedMap<RecursiveAvlTree<K, V>>;

impl<E: TreeEngine + Default> OrderedMap<E> {
    /// Creates an empty map with the engine's default ordering.
    #[must_use]
    pub fn new() -> Self {
        Self::from_engine(E::default())
    }
}

impl<E: TreeEngine> OrderedMap<E> {
    /// Wraps an existing engine.
    pub fn from_engine(engine: E) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }

    /// Creates an empty map ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::{AvlMap, Comparator, OrderedMap};
    ///
    /// let map: AvlMap<String, ()> = OrderedMap::with_comparator(Comparator::numeric());
    /// for key in ["10", "9", "100"] {
    ///     map.put(key.to_string(), ());
    /// }
    /// assert_eq!(map.key_sorted_list(), vec!["9", "10", "100"]);
    /// ```
    pub fn with_comparator(comparator: Comparator<E::Key>) -> Self {
        Self::from_engine(E::with_comparator(comparator))
    }

    /// Inserts or overwrites `key`, returning the replaced value.
    pub fn put(&self, key: E::Key, value: E::Value) -> Option<E::Value> {
        self.engine.lock().put(key, value)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn delete(&self, key: &E::Key) -> Option<E::Value> {
        self.engine.lock().delete(key)
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get(&self, key: &E::Key) -> Option<E::Value>
    where
        E::Value: Clone,
    {
        self.engine.lock().get(key).cloned()
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &E::Key) -> bool {
        self.engine.lock().contains(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.engine.lock().len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.engine.lock().is_empty()
    }

    /// The entry with the smallest key.
    pub fn min_key(&self) -> Option<(E::Key, E::Value)>
    where
        E::Key: Clone,
        E::Value: Clone,
    {
        self.engine
            .lock()
            .min()
            .map(|(key, value)| (key.clone(), value.clone()))
    }

    /// The entry with the largest key.
    pub fn max_key(&self) -> Option<(E::Key, E::Value)>
    where
        E::Key: Clone,
        E::Value: Clone,
    {
        self.engine
            .lock()
            .max()
            .map(|(key, value)| (key.clone(), value.clone()))
    }

    /// Keys in breadth-first order of the underlying tree.
    pub fn key_list(&self) -> Vec<E::Key>
    where
        E::Key: Clone,
    {
        self.engine.lock().key_list()
    }

    /// Keys in ascending order.
    pub fn key_sorted_list(&self) -> Vec<E::Key>
    where
        E::Key: Clone,
    {
        self.engine.lock().key_sorted_list()
    }

    /// Snapshots the entries in breadth-first order.
    ///
    /// The snapshot is taken under the lock; later writes do not affect it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::RecursiveAvlMap;
    ///
    /// let map = RecursiveAvlMap::new();
    /// map.put(2, "two");
    /// map.put(1, "one");
    ///
    /// let mut entries = map.iter();
    /// map.put(3, "three");
    ///
    /// assert!(entries.has_next());
    /// assert_eq!(entries.next(), Some((2, "two")));
    /// assert_eq!(entries.next(), Some((1, "one")));
    /// assert!(!entries.has_next());
    /// ```
    pub fn iter(&self) -> MapIterator<E::Key, E::Value>
    where
        E::Key: Clone,
        E::Value: Clone,
    {
        let engine = self.engine.lock();
        let entries: Vec<_> = engine
            .level_order()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        MapIterator {
            entries: entries.into_iter(),
        }
    }

    /// Installs a new ordering if the map is empty.
    ///
    /// Returns `false`, leaving the current ordering in place, once any entry
    /// has been stored.
    pub fn set_comparator(&self, comparator: Comparator<E::Key>) -> bool {
        let mut engine = self.engine.lock();
        let installed = engine.set_comparator(comparator);
        if !installed {
            tracing::debug!(
                entries = engine.len(),
                "comparator change ignored on non-empty map"
            );
        }
        installed
    }

    /// Runs the engine's invariant checks, logging any violation.
    pub fn check(&self) -> bool {
        self.engine.lock().check()
    }

    /// Runs the engine's invariant checks.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn verify(&self) -> std::result::Result<(), InvariantViolation> {
        self.engine.lock().verify()
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.engine.lock().height()
    }

    /// Locks the map and returns the engine for borrowing access.
    ///
    /// Every other operation on this map blocks until the guard is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::{RedBlackMap, tree::TreeEngine};
    ///
    /// let map = RedBlackMap::new();
    /// map.put(1, "one".to_string());
    ///
    /// let engine = map.lock();
    /// let lengths: Vec<usize> = engine.level_order().map(|(_, value)| value.len()).collect();
    /// assert_eq!(lengths, vec![3]);
    /// ```
    pub fn lock(&self) -> MutexGuard<'_, E> {
        self.engine.lock()
    }

    /// Consumes the map and returns the engine.
    pub fn into_inner(self) -> E {
        self.engine.into_inner()
    }
}

// =============================================================================
// Typed Accessors
// =============================================================================

impl<E: TreeEngine<Value = Value>> OrderedMap<E> {
    /// Looks up `key` and extracts a `T` from the stored [`Value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the key
    /// is present but holds another type. A missing key is `Ok(None)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::{RedBlackMap, Value};
    ///
    /// let map: RedBlackMap<String, Value> = RedBlackMap::new();
    /// map.put("age".to_string(), Value::Int(42));
    ///
    /// assert_eq!(map.get_as::<isize>(&"age".to_string()), Ok(Some(42)));
    /// assert_eq!(map.get_as::<isize>(&"name".to_string()), Ok(None));
    /// assert!(map.get_as::<String>(&"age".to_string()).is_err());
    /// ```
    pub fn get_as<T: FromValue>(&self, key: &E::Key) -> Result<Option<T>> {
        self.engine.lock().get(key).map(Value::cast::<T>).transpose()
    }

    /// Looks up an [`isize`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// value is not an int.
    pub fn get_int(&self, key: &E::Key) -> Result<Option<isize>> {
        self.get_as(key)
    }

    /// Looks up an [`i64`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// value is not an int64.
    pub fn get_int64(&self, key: &E::Key) -> Result<Option<i64>> {
        self.get_as(key)
    }

    /// Looks up a [`String`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// value is not a string.
    pub fn get_string(&self, key: &E::Key) -> Result<Option<String>> {
        self.get_as(key)
    }

    /// Looks up an [`f64`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// value is not a float64.
    pub fn get_float64(&self, key: &E::Key) -> Result<Option<f64>> {
        self.get_as(key)
    }

    /// Looks up a byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// value is not bytes.
    pub fn get_bytes(&self, key: &E::Key) -> Result<Option<Vec<u8>>> {
        self.get_as(key)
    }

    /// Looks up a [`bool`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// value is not a bool.
    pub fn get_bool(&self, key: &E::Key) -> Result<Option<bool>> {
        self.get_as(key)
    }
}

// =============================================================================
// Factories
// =============================================================================

/// Creates an empty map backed by the default engine, a [`RedBlackTree`].
pub fn new<K: Ord + fmt::Debug + 'static, V>() -> RedBlackMap<K, V> {
    new_red_black_map()
}

/// Creates an empty map backed by a [`RedBlackTree`].
pub fn new_red_black_map<K: Ord + fmt::Debug + 'static, V>() -> RedBlackMap<K, V> {
    OrderedMap::new()
}

/// Creates an empty map backed by the balance-factor [`AvlTree`].
pub fn new_avl_map<K: Ord + fmt::Debug + 'static, V>() -> AvlMap<K, V> {
    OrderedMap::new()
}

/// Creates an empty map backed by the height-based [`RecursiveAvlTree`].
pub fn new_recursive_avl_map<K: Ord + fmt::Debug + 'static, V>() -> RecursiveAvlMap<K, V> {
    OrderedMap::new()
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A snapshot of a map's entries in breadth-first order.
pub struct MapIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> MapIterator<K, V> {
    /// Returns `true` while entries remain.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.entries.len() > 0
    }
}

impl<K, V> Iterator for MapIterator<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for MapIterator<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> FusedIterator for MapIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<E: TreeEngine + Default> Default for OrderedMap<E> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<E: TreeEngine + Default> FromIterator<(E::Key, E::Value)> for OrderedMap<E> {
    fn from_iter<I: IntoIterator<Item = (E::Key, E::Value)>>(iter: I) -> Self {
        let mut engine = E::default();
        for (key, value) in iter {
            engine.put(key, value);
        }
        Self::from_engine(engine)
    }
}

impl<E: Clone> Clone for OrderedMap<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Mutex::new(self.engine.lock().clone()),
        }
    }
}

impl<E> fmt::Debug for OrderedMap<E>
where
    E: TreeEngine,
    E::Key: fmt::Debug,
    E::Value: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine = self.engine.lock();
        formatter.debug_map().entries(engine.in_order()).finish()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<E> serde::Serialize for OrderedMap<E>
where
    E: TreeEngine,
    E::Key: serde::Serialize,
    E::Value: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let engine = self.engine.lock();
        let mut map = serializer.serialize_map(Some(engine.len()))?;
        for (key, value) in engine.in_order() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedMapVisitor<E> {
    engine_marker: std::marker::PhantomData<fn() -> E>,
}

#[cfg(feature = "serde")]
impl<E> OrderedMapVisitor<E> {
    const fn new() -> Self {
        Self {
            engine_marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, E> serde::de::Visitor<'de> for OrderedMapVisitor<E>
where
    E: TreeEngine + Default,
    E::Key: serde::Deserialize<'de>,
    E::Value: serde::Deserialize<'de>,
{
    type Value = OrderedMap<E>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut engine = E::default();
        while let Some((key, value)) = access.next_entry()? {
            engine.put(key, value);
        }
        Ok(OrderedMap::from_engine(engine))
    }
}

#[cfg(feature = "serde")]
impl<'de, E> serde::Deserialize<'de> for OrderedMap<E>
where
    E: TreeEngine + Default,
    E::Key: serde::Deserialize<'de>,
    E::Value: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
