//! Partially ordered multisets: a multiset of label occurrences together with
//! a partial order over those occurrences.
//!
//! The same label value may occur several times, so every order query targets
//! an *occurrence*: a `(value, occurrence index)` pair, the index counting
//! equal values in insertion order starting from zero.
use crate::order::{Error as OrderError, Order, Relation};
use ndarray::Array2;
use std::{
    collections::BTreeSet,
    fmt::{Debug, Display, Formatter},
};

/// Capabilities required of the opaque values stored in pomsets and
/// hypergraphs.
///
/// The trait is blanket-implemented. `Ord` rather than `Hash` is required so
/// that query results, derived graphs, and breadth-first layers iterate
/// deterministically; `Debug` lets errors name the offending value.
pub trait Label: Clone + Ord + Debug {}

impl<T: Clone + Ord + Debug> Label for T {}

/// A partially ordered multiset.
///
/// A pomset is a sequence of labels (the items of the multiset, in insertion
/// order) plus an [`Order`] over their positions. The *size* of a pomset is
/// its number of labels, the *support* is the set of distinct labels, and the
/// *cardinality* is the size of the support.
///
/// # Examples
///
/// ```
/// use pomset_hypergraphs::Pomset;
///
/// let mut p = Pomset::from_labels(["fetch", "build", "test"]);
/// p.add_dependency(&"fetch", 0, &"build", 0).unwrap();
/// p.add_dependency(&"build", 0, &"test", 0).unwrap();
/// // transitivity is propagated: "test" is also above "fetch"
/// assert_eq!(p.strictly_above(&"fetch", 0).unwrap(), [&"build", &"test"]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Pomset<T: Label> {
    labels: Vec<T>,
    order: Order,
}

impl<T: Label> Pomset<T> {
    /// The empty pomset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            order: Order::unordered(0),
        }
    }

    /// A fully unordered pomset over the given labels.
    #[must_use]
    pub fn from_labels(labels: impl IntoIterator<Item = T>) -> Self {
        let labels: Vec<T> = labels.into_iter().collect();
        let order = Order::unordered(labels.len());
        Self { labels, order }
    }

    /// A pomset over the given labels with an explicit order matrix, using
    /// the convention `matrix[i][j] == 1` iff the `i`th label is above the
    /// `j`th (see [`Order`]). The matrix is transitively closed on the way in.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidShape`] if the matrix dimensions disagree with the
    /// label count, or an [`Error::Order`] if the matrix itself is malformed.
    pub fn with_order(
        labels: impl IntoIterator<Item = T>,
        order: Array2<i8>,
    ) -> Result<Self, Error> {
        let labels: Vec<T> = labels.into_iter().collect();
        if order.nrows() != labels.len() || order.ncols() != labels.len() {
            return Err(Error::InvalidShape {
                rows: order.nrows(),
                cols: order.ncols(),
                labels: labels.len(),
            });
        }
        let order = Order::from_matrix(order)?;
        Ok(Self { labels, order })
    }

    /// A pomset over the given labels in which every position of `lower` is
    /// strictly below every position of `upper`. Interchangeable with
    /// [`Pomset::with_order`] on the equivalent matrix.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidShape`] if the two blocks don't account for every
    /// label, or an [`Error::Order`] if they don't partition the positions.
    pub fn with_bipartition(
        labels: impl IntoIterator<Item = T>,
        lower: &[usize],
        upper: &[usize],
    ) -> Result<Self, Error> {
        let labels: Vec<T> = labels.into_iter().collect();
        if lower.len() + upper.len() != labels.len() {
            return Err(Error::InvalidShape {
                rows: lower.len() + upper.len(),
                cols: lower.len() + upper.len(),
                labels: labels.len(),
            });
        }
        let order = Order::from_bipartition(lower, upper)?;
        Ok(Self { labels, order })
    }

    /// General constructor taking an optional order matrix and an optional
    /// bipartition; with neither, the pomset is fully unordered.
    ///
    /// # Errors
    ///
    /// [`Error::ConflictingConstruction`] if both an order and a bipartition
    /// are supplied, otherwise whatever [`Pomset::with_order`] or
    /// [`Pomset::with_bipartition`] report.
    pub fn build(
        labels: impl IntoIterator<Item = T>,
        order: Option<Array2<i8>>,
        bipartition: Option<(Vec<usize>, Vec<usize>)>,
    ) -> Result<Self, Error> {
        match (order, bipartition) {
            (Some(_), Some(_)) => Err(Error::ConflictingConstruction),
            (Some(order), None) => Self::with_order(labels, order),
            (None, Some((lower, upper))) => Self::with_bipartition(labels, &lower, &upper),
            (None, None) => Ok(Self::from_labels(labels)),
        }
    }

    /// The labels, in insertion order. This numbering is what occurrence
    /// indices and the order relation's rows and columns refer to.
    #[must_use]
    pub fn labels(&self) -> &[T] {
        &self.labels
    }

    /// Number of label occurrences.
    #[must_use]
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Does this pomset have no labels at all?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The set of distinct labels.
    #[must_use]
    pub fn support(&self) -> BTreeSet<&T> {
        self.labels.iter().collect()
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.support().len()
    }

    /// Number of occurrences of `label`.
    #[must_use]
    pub fn multiplicity(&self, label: &T) -> usize {
        self.labels.iter().filter(|l| *l == label).count()
    }

    /// Is every pair of occurrences unrelated?
    #[must_use]
    pub fn is_unordered(&self) -> bool {
        self.order.is_unordered()
    }

    /// The partial order over occurrence positions.
    #[must_use]
    pub const fn order(&self) -> &Order {
        &self.order
    }

    /// The two-block split of the occurrences, if the order has one; see
    /// [`Order::bipartition`].
    #[must_use]
    pub fn bipartition(&self) -> Option<(Vec<usize>, Vec<usize>)> {
        self.order.bipartition()
    }

    /// Resolve `(label, occurrence)` to a position in the label sequence.
    fn position(&self, label: &T, occurrence: usize) -> Result<usize, Error> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| *l == label)
            .map(|(position, _)| position)
            .nth(occurrence)
            .ok_or_else(|| Error::OutOfRange {
                occurrence,
                multiplicity: self.multiplicity(label),
            })
    }

    /// Occurrences weakly above the given occurrence, i.e. not strictly
    /// below it, in label order.
    ///
    /// On an unordered pomset this is the entire label sequence, the queried
    /// occurrence included; on an ordered pomset the queried occurrence
    /// itself is not reported. This asymmetry is deliberate and mirrored by
    /// [`Pomset::weakly_below`].
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `occurrence >= self.multiplicity(label)`.
    pub fn weakly_above(&self, label: &T, occurrence: usize) -> Result<Vec<&T>, Error> {
        let p = self.position(label, occurrence)?;
        if self.order.is_unordered() {
            return Ok(self.labels.iter().collect());
        }
        Ok(self
            .labels
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != p && self.order.relation(p, j) != Relation::Above)
            .map(|(_, l)| l)
            .collect())
    }

    /// Occurrences strictly above the given occurrence, in label order.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `occurrence >= self.multiplicity(label)`.
    pub fn strictly_above(&self, label: &T, occurrence: usize) -> Result<Vec<&T>, Error> {
        let p = self.position(label, occurrence)?;
        Ok(self
            .labels
            .iter()
            .enumerate()
            .filter(|&(j, _)| self.order.relation(p, j) == Relation::Below)
            .map(|(_, l)| l)
            .collect())
    }

    /// Occurrences weakly below the given occurrence, i.e. not strictly
    /// above it; the dual of [`Pomset::weakly_above`], including its
    /// unordered-pomset contract.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `occurrence >= self.multiplicity(label)`.
    pub fn weakly_below(&self, label: &T, occurrence: usize) -> Result<Vec<&T>, Error> {
        let p = self.position(label, occurrence)?;
        if self.order.is_unordered() {
            return Ok(self.labels.iter().collect());
        }
        Ok(self
            .labels
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != p && self.order.relation(p, j) != Relation::Below)
            .map(|(_, l)| l)
            .collect())
    }

    /// Occurrences strictly below the given occurrence, in label order.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `occurrence >= self.multiplicity(label)`.
    pub fn strictly_below(&self, label: &T, occurrence: usize) -> Result<Vec<&T>, Error> {
        let p = self.position(label, occurrence)?;
        Ok(self
            .labels
            .iter()
            .enumerate()
            .filter(|&(j, _)| self.order.relation(p, j) == Relation::Above)
            .map(|(_, l)| l)
            .collect())
    }

    /// Is the first occurrence not strictly below the second? On an
    /// unordered pomset every weak comparison holds.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if either occurrence index exceeds its label's
    /// multiplicity.
    pub fn weakly_greater_than(
        &self,
        first: &T,
        first_occurrence: usize,
        second: &T,
        second_occurrence: usize,
    ) -> Result<bool, Error> {
        let i = self.position(first, first_occurrence)?;
        let j = self.position(second, second_occurrence)?;
        Ok(self.order.relation(i, j) != Relation::Below)
    }

    /// Is the first occurrence strictly above the second? On an unordered
    /// pomset every strict comparison fails.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if either occurrence index exceeds its label's
    /// multiplicity.
    pub fn strictly_greater_than(
        &self,
        first: &T,
        first_occurrence: usize,
        second: &T,
        second_occurrence: usize,
    ) -> Result<bool, Error> {
        let i = self.position(first, first_occurrence)?;
        let j = self.position(second, second_occurrence)?;
        Ok(self.order.relation(i, j) == Relation::Above)
    }

    /// Is the first occurrence not strictly above the second?
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if either occurrence index exceeds its label's
    /// multiplicity.
    pub fn weakly_less_than(
        &self,
        first: &T,
        first_occurrence: usize,
        second: &T,
        second_occurrence: usize,
    ) -> Result<bool, Error> {
        let i = self.position(first, first_occurrence)?;
        let j = self.position(second, second_occurrence)?;
        Ok(self.order.relation(i, j) != Relation::Above)
    }

    /// Is the first occurrence strictly below the second?
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if either occurrence index exceeds its label's
    /// multiplicity.
    pub fn strictly_less_than(
        &self,
        first: &T,
        first_occurrence: usize,
        second: &T,
        second_occurrence: usize,
    ) -> Result<bool, Error> {
        let i = self.position(first, first_occurrence)?;
        let j = self.position(second, second_occurrence)?;
        Ok(self.order.relation(i, j) == Relation::Below)
    }

    /// Append a new occurrence, unrelated to every existing one. Use
    /// [`Pomset::add_dependency`] to relate it afterwards.
    pub fn add_label(&mut self, label: T) {
        self.labels.push(label);
        self.order.grow();
    }

    /// Append several occurrences, each unrelated to everything else.
    pub fn add_labels_from(&mut self, labels: impl IntoIterator<Item = T>) {
        for label in labels {
            self.add_label(label);
        }
    }

    /// Assert that the `from` occurrence is strictly below the `to`
    /// occurrence, propagating every transitive consequence: everything
    /// already below `from` ends up below everything already above `to`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for a bad occurrence index, or
    /// [`OrderError::CyclicDependency`] if the order already places `from`
    /// above `to` (or the two are the same occurrence).
    pub fn add_dependency(
        &mut self,
        from: &T,
        from_occurrence: usize,
        to: &T,
        to_occurrence: usize,
    ) -> Result<(), Error> {
        let lo = self.position(from, from_occurrence)?;
        let hi = self.position(to, to_occurrence)?;
        self.order.relate(lo, hi)?;
        Ok(())
    }

    /// Assert several dependencies, each a `(from, from_occurrence, to,
    /// to_occurrence)` tuple, in the given order; later entries see the
    /// transitive consequences of earlier ones.
    ///
    /// # Errors
    ///
    /// As [`Pomset::add_dependency`]; entries before the failing one stay
    /// applied.
    pub fn add_dependencies_from(
        &mut self,
        dependencies: impl IntoIterator<Item = (T, usize, T, usize)>,
    ) -> Result<(), Error> {
        for (from, from_occurrence, to, to_occurrence) in dependencies {
            self.add_dependency(&from, from_occurrence, &to, to_occurrence)?;
        }
        Ok(())
    }

    /// Delete an occurrence along with its row and column of the order,
    /// returning the removed value.
    ///
    /// Every later position shifts down by one; in particular, the
    /// occurrence indices of *equal* values later in the sequence drop by
    /// one, so an occurrence previously addressed as `(label, k)` becomes
    /// `(label, k - 1)` once a lower-indexed occurrence of `label` is
    /// removed.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `occurrence >= self.multiplicity(label)`.
    pub fn remove_label(&mut self, label: &T, occurrence: usize) -> Result<T, Error> {
        let p = self.position(label, occurrence)?;
        let removed = self.labels.remove(p);
        self.order.remove(p);
        Ok(removed)
    }

    /// Retract the relation between two occurrences, setting the pair
    /// unrelated in both directions and re-closing the order from the
    /// surviving relations. A relation between the pair still supported by
    /// some other chain is re-derived; relations between other pairs are
    /// untouched.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for a bad occurrence index.
    pub fn remove_dependency(
        &mut self,
        from: &T,
        from_occurrence: usize,
        to: &T,
        to_occurrence: usize,
    ) -> Result<(), Error> {
        let lo = self.position(from, from_occurrence)?;
        let hi = self.position(to, to_occurrence)?;
        self.order.unrelate(lo, hi)?;
        Ok(())
    }

    /// Reverse the order in place, so every `i < j` becomes `i > j`.
    pub fn reverse_order(&mut self) {
        self.order.reverse();
    }
}

impl<T: Label> Default for Pomset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Label> Display for Pomset<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("⟨")?;
        for (i, label) in self.labels.iter().enumerate() {
            let sep = if i > 0 { ", " } else { "" };
            write!(f, "{sep}{label:?}")?;
        }
        f.write_str("⟩")
    }
}

impl<T: Label> Debug for Pomset<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Reuse Display cuz it's nice
        Display::fmt(self, f)
    }
}

/// Errors that can arise when building or querying a pomset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An occurrence index referred past the last occurrence of its label.
    #[error("occurrence index {occurrence} is out of range for a label with multiplicity {multiplicity}")]
    OutOfRange {
        /// The requested occurrence index
        occurrence: usize,
        /// How many occurrences the label actually has
        multiplicity: usize,
    },
    /// An order's dimensions disagreed with the label count.
    #[error("an order over {rows}×{cols} positions cannot describe {labels} labels")]
    InvalidShape {
        /// Rows of the supplied order
        rows: usize,
        /// Columns of the supplied order
        cols: usize,
        /// Number of labels
        labels: usize,
    },
    /// Both an explicit order and a bipartition were supplied.
    #[error("a pomset takes an explicit order or a bipartition, not both")]
    ConflictingConstruction,
    /// An order error occurred: {0}
    #[error("an order error occurred: {0}")]
    Order(#[from] OrderError),
}
