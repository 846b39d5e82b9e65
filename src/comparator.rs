//! Pluggable total orders over map keys.
//!
//! Every tree engine stores its own [`Comparator`]. The default is the key's
//! natural [`Ord`], which for `String`, `&str`, `Vec<u8>` and `&[u8]` is
//! byte-lexicographic order. A comparator may only be swapped while a map is
//! empty; changing the order of a populated tree would silently break every
//! structural invariant.
//!
//! # Examples
//!
//! ```rust
//! use ordmap::Comparator;
//! use std::cmp::Ordering;
//!
//! let natural: Comparator<String> = Comparator::natural();
//! assert_eq!(natural.compare(&"10".to_string(), &"9".to_string()), Ordering::Less);
//!
//! let numeric: Comparator<String> = Comparator::numeric();
//! assert_eq!(numeric.compare(&"10".to_string(), &"9".to_string()), Ordering::Greater);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type CompareFunction<K> = dyn Fn(&K, &K) -> Ordering + Send + Sync;

/// A shareable total order over keys of type `K`.
///
/// Cloning a comparator is cheap: the underlying function is reference
/// counted.
pub struct Comparator<K> {
    function: Arc<CompareFunction<K>>,
}

/// The default ordering: the key's own [`Ord`] implementation.
fn natural_order<K: Ord>(left: &K, right: &K) -> Ordering {
    left.cmp(right)
}

impl<K: 'static> Comparator<K> {
    /// Wraps an arbitrary comparison function.
    ///
    /// The function must be a total order; the engines rely on it being
    /// antisymmetric and transitive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::Comparator;
    /// use std::cmp::Ordering;
    ///
    /// let by_length = Comparator::new(|left: &String, right: &String| {
    ///     left.len().cmp(&right.len()).then_with(|| left.cmp(right))
    /// });
    /// assert_eq!(by_length.compare(&"zz".to_string(), &"aaa".to_string()), Ordering::Less);
    /// ```
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
        }
    }

    /// Returns a comparator that orders keys the other way around.
    #[must_use]
    pub fn reversed(self) -> Self {
        let inner = self.function;
        Self::new(move |left, right| (*inner)(right, left))
    }
}

impl<K> Comparator<K> {
    /// Compares two keys.
    #[inline]
    pub fn compare(&self, left: &K, right: &K) -> Ordering {
        (*self.function)(left, right)
    }
}

impl<K: Ord + 'static> Comparator<K> {
    /// The key's natural order.
    pub fn natural() -> Self {
        Self::new(natural_order::<K>)
    }
}

impl<K: AsRef<str> + 'static> Comparator<K> {
    /// Orders keys as base-10 integers.
    ///
    /// Keys that parse as `i64` sort numerically and before every key that
    /// does not parse. Unparsable keys sort lexicographically among
    /// themselves, and numerically equal spellings (`"01"` and `"1"`) fall
    /// back to lexicographic order so that the order stays total.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::Comparator;
    /// use std::cmp::Ordering;
    ///
    /// let numeric: Comparator<&str> = Comparator::numeric();
    /// assert_eq!(numeric.compare(&"2", &"10"), Ordering::Less);
    /// assert_eq!(numeric.compare(&"10", &"apple"), Ordering::Less);
    /// ```
    pub fn numeric() -> Self {
        Self::new(|left: &K, right: &K| {
            let (left, right) = (left.as_ref(), right.as_ref());
            match (left.parse::<i64>(), right.parse::<i64>()) {
                (Ok(left_number), Ok(right_number)) => left_number
                    .cmp(&right_number)
                    .then_with(|| left.cmp(right)),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => left.cmp(right),
            }
        })
    }
}

#[cfg(feature = "fxhash")]
impl<K: std::hash::Hash + Ord + 'static> Comparator<K> {
    /// Orders keys by their 64-bit Fx hash, breaking ties by natural order.
    ///
    /// The resulting order is deterministic but unrelated to the key's
    /// natural order, which spreads sequential keys across the tree.
    pub fn hashed() -> Self {
        Self::new(|left: &K, right: &K| {
            fx_hash(left)
                .cmp(&fx_hash(right))
                .then_with(|| left.cmp(right))
        })
    }
}

#[cfg(feature = "fxhash")]
fn fx_hash<K: std::hash::Hash>(key: &K) -> u64 {
    use std::hash::Hasher;

    let mut hasher = rustc_hash::FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

impl<K> Clone for Comparator<K> {
    fn clone(&self) -> Self {
        Self {
            function: Arc::clone(&self.function),
        }
    }
}

impl<K: Ord + 'static> Default for Comparator<K> {
    #[inline]
    fn default() -> Self {
        Self::natural()
    }
}

impl<K> fmt::Debug for Comparator<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Comparator(..)")
    }
}
