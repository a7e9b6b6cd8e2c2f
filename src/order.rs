//! Partial orders over positions, backed by a square relation matrix.
//!
//! An [`Order`] records, for every ordered pair of positions, whether one is
//! strictly above, strictly below, or unrelated to the other. It is kept
//! antisymmetric and transitively closed through every mutation; the
//! position-to-value bookkeeping lives one layer up in
//! [`Pomset`](crate::pomset::Pomset).
use ndarray::Array2;
use std::fmt::{Debug, Display, Formatter};

/// How one position of an [`Order`] relates to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    /// The first position is strictly above the second.
    Above,
    /// The first position is strictly below the second.
    Below,
    /// The two positions are incomparable.
    Unrelated,
}

impl Relation {
    /// The relation seen from the other side of the pair.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Above => Self::Below,
            Self::Below => Self::Above,
            Self::Unrelated => Self::Unrelated,
        }
    }

    const fn from_entry(entry: i8) -> Self {
        match entry {
            1 => Self::Above,
            -1 => Self::Below,
            _ => Self::Unrelated,
        }
    }
}

/// A partial order over positions `0..len`, stored as a square `i8` matrix
/// with `matrix[i][j] == 1` iff position `i` is strictly above position `j`,
/// `-1` iff strictly below, and `0` iff the two are unrelated.
///
/// Two invariants hold after every operation:
/// - antisymmetry: `matrix[i][j] == -matrix[j][i]`, so the diagonal is zero;
/// - transitive closure: if `i` is above `j` and `j` above `k`, the matrix
///   records `i` above `k` directly.
#[derive(Clone, PartialEq, Eq)]
pub struct Order {
    rel: Array2<i8>,
}

impl Order {
    /// The all-unrelated order on `n` positions.
    #[must_use]
    pub fn unordered(n: usize) -> Self {
        Self {
            rel: Array2::zeros((n, n)),
        }
    }

    /// Build an order from an explicit relation matrix.
    ///
    /// The matrix is validated and then transitively closed, so the stored
    /// order may relate strictly more pairs than the input did.
    ///
    /// # Errors
    ///
    /// [`Error::NotSquare`] if the matrix isn't square, [`Error::InvalidEntry`]
    /// for entries outside `{-1, 0, 1}`, [`Error::NotAntisymmetric`] if
    /// `matrix[i][j] != -matrix[j][i]` anywhere (a nonzero diagonal included),
    /// and [`Error::CyclicDependency`] if closing the relation would make some
    /// position both above and below another.
    pub fn from_matrix(rel: Array2<i8>) -> Result<Self, Error> {
        if rel.nrows() != rel.ncols() {
            return Err(Error::NotSquare {
                rows: rel.nrows(),
                cols: rel.ncols(),
            });
        }
        for i in 0..rel.nrows() {
            for j in 0..rel.ncols() {
                let entry = rel[[i, j]];
                if !(-1..=1).contains(&entry) {
                    return Err(Error::InvalidEntry {
                        row: i,
                        col: j,
                        entry,
                    });
                }
                if rel[[j, i]] != -entry {
                    return Err(Error::NotAntisymmetric { row: i, col: j });
                }
            }
        }
        let mut order = Self { rel };
        order.close()?;
        Ok(order)
    }

    /// Build the order in which every position of `lower` is strictly below
    /// every position of `upper`, and no other pair is related.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedBipartition`] unless the two blocks together cover
    /// each position of `0..(lower.len() + upper.len())` exactly once.
    pub fn from_bipartition(lower: &[usize], upper: &[usize]) -> Result<Self, Error> {
        let n = lower.len() + upper.len();
        let mut seen = vec![false; n];
        for &position in lower.iter().chain(upper) {
            if position >= n || seen[position] {
                return Err(Error::MalformedBipartition { position, size: n });
            }
            seen[position] = true;
        }
        let mut rel = Array2::zeros((n, n));
        for &l in lower {
            for &u in upper {
                rel[[l, u]] = -1;
                rel[[u, l]] = 1;
            }
        }
        Ok(Self { rel })
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rel.nrows()
    }

    /// Does this order have no positions at all?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Is every pair of positions unrelated?
    #[must_use]
    pub fn is_unordered(&self) -> bool {
        self.rel.iter().all(|&entry| entry == 0)
    }

    /// How position `i` relates to position `j`.
    ///
    /// # Panics
    ///
    /// If either position is out of range.
    #[must_use]
    pub fn relation(&self, i: usize, j: usize) -> Relation {
        Relation::from_entry(self.rel[[i, j]])
    }

    /// The underlying relation matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Array2<i8> {
        &self.rel
    }

    /// Positions strictly above `i`, in increasing position order.
    pub fn strictly_above(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.rel.row(i).into_iter().enumerate().filter_map(
            |(j, &entry)| {
                if entry == -1 { Some(j) } else { None }
            },
        )
    }

    /// Positions strictly below `i`, in increasing position order.
    pub fn strictly_below(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.rel
            .row(i)
            .into_iter()
            .enumerate()
            .filter_map(|(j, &entry)| if entry == 1 { Some(j) } else { None })
    }

    /// The two-block split of this order, if it has one: every position in
    /// the first block strictly below every position in the second, and no
    /// relations within a block.
    #[must_use]
    pub fn bipartition(&self) -> Option<(Vec<usize>, Vec<usize>)> {
        let mut lower = Vec::new();
        let mut upper = Vec::new();
        for i in 0..self.len() {
            let row = self.rel.row(i);
            let below_something = row.iter().any(|&entry| entry == -1);
            let above_something = row.iter().any(|&entry| entry == 1);
            match (below_something, above_something) {
                (true, false) => lower.push(i),
                (false, true) => upper.push(i),
                _ => return None,
            }
        }
        for &l in &lower {
            for &u in &upper {
                if self.rel[[l, u]] != -1 {
                    return None;
                }
            }
        }
        Some((lower, upper))
    }

    /// Append one position, unrelated to every existing one.
    pub fn grow(&mut self) {
        let n = self.len();
        self.rel = Array2::from_shape_fn((n + 1, n + 1), |(i, j)| {
            if i < n && j < n { self.rel[[i, j]] } else { 0 }
        });
    }

    /// Delete position `k`, compacting every later position down by one.
    ///
    /// A sub-relation of a transitively closed relation is itself closed, so
    /// no repair pass is needed.
    ///
    /// # Panics
    ///
    /// If `k` is out of range.
    pub fn remove(&mut self, k: usize) {
        assert!(k < self.len());
        let n = self.len();
        let keep = |x: usize| if x < k { x } else { x + 1 };
        self.rel = Array2::from_shape_fn((n - 1, n - 1), |(i, j)| self.rel[[keep(i), keep(j)]]);
    }

    /// Assert that `lo` is strictly below `hi`, propagating the full
    /// transitive consequences: everything weakly below `lo` ends up below
    /// everything weakly above `hi`.
    ///
    /// # Errors
    ///
    /// [`Error::CyclicDependency`] if `lo` and `hi` are the same position or
    /// the order already places `lo` above `hi`.
    ///
    /// # Panics
    ///
    /// If either position is out of range.
    pub fn relate(&mut self, lo: usize, hi: usize) -> Result<(), Error> {
        if lo == hi || self.rel[[lo, hi]] == 1 {
            return Err(Error::CyclicDependency { lower: lo, upper: hi });
        }
        let mut lows: Vec<usize> = self.strictly_below(lo).collect();
        lows.push(lo);
        let mut highs: Vec<usize> = self.strictly_above(hi).collect();
        highs.push(hi);
        for &d in &lows {
            for &u in &highs {
                self.rel[[d, u]] = -1;
                self.rel[[u, d]] = 1;
            }
        }
        Ok(())
    }

    /// Retract the relation between `lo` and `hi`, then re-close from the
    /// surviving entries. A relation between the pair that is still supported
    /// by some other path is re-derived rather than lost.
    ///
    /// # Errors
    ///
    /// Re-closing a retracted order cannot introduce a conflict, so the
    /// [`Error::CyclicDependency`] this shares with [`Order::from_matrix`] is
    /// never actually produced here.
    ///
    /// # Panics
    ///
    /// If either position is out of range.
    pub fn unrelate(&mut self, lo: usize, hi: usize) -> Result<(), Error> {
        self.rel[[lo, hi]] = 0;
        self.rel[[hi, lo]] = 0;
        self.close()
    }

    /// Reverse the order in place, so that `i` above `j` becomes `i` below `j`.
    pub fn reverse(&mut self) {
        self.rel = self.rel.t().to_owned();
    }

    /// Warshall pass re-establishing transitive closure.
    fn close(&mut self) -> Result<(), Error> {
        let n = self.len();
        for k in 0..n {
            for i in 0..n {
                if self.rel[[i, k]] != 1 {
                    continue;
                }
                for j in 0..n {
                    if self.rel[[k, j]] == 1 && self.rel[[i, j]] != 1 {
                        if self.rel[[i, j]] == -1 {
                            return Err(Error::CyclicDependency { lower: j, upper: i });
                        }
                        self.rel[[i, j]] = 1;
                        self.rel[[j, i]] = -1;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        for i in 0..self.len() {
            if i > 0 {
                writeln!(f)?;
            }
            for j in 0..self.len() {
                let sep = if j > 0 { " " } else { "" };
                write!(f, "{sep}{:+}", self.rel[[i, j]])?;
            }
        }
        Ok(())
    }
}

impl Debug for Order {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Reuse Display cuz it's nice
        Display::fmt(self, f)
    }
}

/// Errors that can arise when building or mutating an order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An order matrix must be square.
    #[error("an order matrix must be square, got {rows}×{cols}")]
    NotSquare {
        /// Rows of the offending matrix
        rows: usize,
        /// Columns of the offending matrix
        cols: usize,
    },
    /// A matrix entry was outside `{-1, 0, 1}`.
    #[error("entry {entry} at ({row}, {col}) is not one of -1, 0, 1")]
    InvalidEntry {
        /// Row of the offending entry
        row: usize,
        /// Column of the offending entry
        col: usize,
        /// The offending entry
        entry: i8,
    },
    /// `matrix[i][j]` and `matrix[j][i]` disagree.
    #[error("entries at ({row}, {col}) and ({col}, {row}) are not antisymmetric")]
    NotAntisymmetric {
        /// Row of the offending pair
        row: usize,
        /// Column of the offending pair
        col: usize,
    },
    /// A bipartition's blocks must cover each position exactly once.
    #[error("a bipartition must place position {position} exactly once within 0..{size}")]
    MalformedBipartition {
        /// The repeated or out-of-range position
        position: usize,
        /// Total number of positions
        size: usize,
    },
    /// The requested relation would make a position both above and below another.
    #[error("relating positions {lower} < {upper} would contradict the existing order")]
    CyclicDependency {
        /// The position asserted to be lower
        lower: usize,
        /// The position asserted to be upper
        upper: usize,
    },
}
