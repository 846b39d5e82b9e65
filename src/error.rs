//! Error types for ordered maps.
//!
//! Structural operations never fail: a missing key is `None`, not an error.
//! The only caller-facing failure is [`Error::TypeMismatch`], raised by the
//! typed accessors. [`InvariantViolation`] is produced exclusively by the
//! per-engine verifiers and always indicates an engine bug.

use thiserror::Error;

/// Result type alias for fallible map operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to map callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A typed accessor found the key, but the stored value has another type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::Error;
    ///
    /// let error = Error::TypeMismatch {
    ///     expected: "int",
    ///     actual: "string",
    ///     value: "\"9\"".to_string(),
    /// };
    /// assert_eq!(
    ///     error.to_string(),
    ///     "expected int, but type is string, value is: \"9\""
    /// );
    /// ```
    #[error("expected {expected}, but type is {actual}, value is: {value}")]
    TypeMismatch {
        /// The type the accessor asked for.
        expected: &'static str,
        /// The type actually stored under the key.
        actual: &'static str,
        /// Debug rendering of the stored value.
        value: String,
    },
}

/// Which child of a node a violation was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The left child.
    Left,
    /// The right child.
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => formatter.write_str("left"),
            Self::Right => formatter.write_str("right"),
        }
    }
}

/// A broken structural law detected by an engine verifier.
///
/// Keys are rendered with `Debug` at detection time so that the violation
/// can outlive the tree it was found in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A child key is not strictly ordered relative to an ancestor bound.
    #[error("key {key} is out of order: {side} subtree bound is {bound}")]
    OutOfOrder {
        /// The offending key.
        key: String,
        /// The ancestor key it should have been bounded by.
        bound: String,
        /// Which subtree of `bound` contains `key`.
        side: Side,
    },

    /// The root of a red-black tree is red.
    #[error("root {key} is red")]
    RedRoot {
        /// The root key.
        key: String,
    },

    /// A red node has a red child.
    #[error("red node {parent} has a red {side} child {child}")]
    RedRed {
        /// The red parent key.
        parent: String,
        /// The red child key.
        child: String,
        /// Which side the child hangs on.
        side: Side,
    },

    /// Two root-to-leaf paths cross different numbers of black links.
    #[error("black height below {key} differs: left {left}, right {right}")]
    BlackHeight {
        /// The node whose subtrees disagree.
        key: String,
        /// Black height of the left subtree.
        left: usize,
        /// Black height of the right subtree.
        right: usize,
    },

    /// A stored balance factor disagrees with the true subtree heights.
    #[error("balance factor of {key} is {stored}, but subtree heights give {actual}")]
    BalanceFactor {
        /// The node key.
        key: String,
        /// The stored balance factor.
        stored: i64,
        /// The balance factor computed from the real subtrees.
        actual: i64,
    },

    /// A stored height disagrees with the true subtree height.
    #[error("height of {key} is {stored}, but the subtree is {actual} high")]
    Height {
        /// The node key.
        key: String,
        /// The stored height.
        stored: usize,
        /// The height computed from the real subtree.
        actual: usize,
    },

    /// Subtree heights differ by more than one.
    #[error("node {key} is unbalanced: left height {left}, right height {right}")]
    Unbalanced {
        /// The node key.
        key: String,
        /// Height of the left subtree.
        left: usize,
        /// Height of the right subtree.
        right: usize,
    },

    /// A child does not point back at its parent.
    #[error("{side} child {child} of {parent} has a stale parent link")]
    ParentLink {
        /// The parent key.
        parent: String,
        /// The child key.
        child: String,
        /// Which side the child hangs on.
        side: Side,
    },

    /// The root carries a parent link.
    #[error("root {key} has a parent link")]
    RootParent {
        /// The root key.
        key: String,
    },

    /// The live count does not match the number of reachable nodes.
    #[error("tree reports {recorded} entries but {reachable} nodes are reachable")]
    Length {
        /// The count the tree recorded.
        recorded: usize,
        /// The number of nodes actually reachable from the root.
        reachable: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_type_mismatch_display() {
        let error = Error::TypeMismatch {
            expected: "float64",
            actual: "int",
            value: "3".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "expected float64, but type is int, value is: 3"
        );
    }

    #[rstest]
    #[case(Side::Left, "left")]
    #[case(Side::Right, "right")]
    fn test_side_display(#[case] side: Side, #[case] expected: &str) {
        assert_eq!(side.to_string(), expected);
    }

    #[rstest]
    fn test_red_red_display() {
        let violation = InvariantViolation::RedRed {
            parent: "\"5\"".to_string(),
            child: "\"3\"".to_string(),
            side: Side::Left,
        };
        assert_eq!(
            violation.to_string(),
            "red node \"5\" has a red left child \"3\""
        );
    }

    #[rstest]
    fn test_length_display() {
        let violation = InvariantViolation::Length {
            recorded: 3,
            reachable: 2,
        };
        assert_eq!(
            violation.to_string(),
            "tree reports 3 entries but 2 nodes are reachable"
        );
    }
}
