//! Directed hypergraphs: a bidirectional bipartite structure mapping each
//! node to the pomset of edges incident on it, and each edge to the pomset
//! of node labels it relates.
//!
//! The edge-side pomset's order is the sole source of directed structure: a
//! hyperedge modeling a task might place its inputs below its outputs, and
//! the predecessor/successor queries, directed cliquifications, and layered
//! breadth-first search all read that order back out.
use crate::{
    order::Relation,
    pomset::{Error as PomsetError, Label, Pomset},
};
use itertools::Itertools;
use ndarray::Array2;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Debug, Display, Formatter},
};

/// Which notion of adjacency a traversal follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Ignore edge orders entirely.
    Undirected,
    /// Follow weak successors (everything not strictly below).
    Weak,
    /// Follow strict successors only.
    Strict,
}

/// Which per-edge size a [`Hypergraph::size_distribution`] tabulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeStatistic {
    /// The edge's cardinality, ignoring its order.
    Cardinality,
    /// Occurrences weakly above the node within the edge (weak out-size).
    WeaklyAbove,
    /// Occurrences weakly below the node within the edge (weak in-size).
    WeaklyBelow,
    /// Occurrences strictly above the node within the edge (strict out-size).
    StrictlyAbove,
    /// Occurrences strictly below the node within the edge (strict in-size).
    StrictlyBelow,
}

/// A vertex of the bipartite representation: hypergraph nodes and hypergraph
/// edges live in a tagged disjoint union, so overlapping node and edge value
/// spaces never collide.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BipartiteVertex<T> {
    /// A hypergraph node.
    Node(T),
    /// A hypergraph edge.
    Edge(T),
}

/// A directed hypergraph.
///
/// Two instance-owned maps, never unioned: `node` takes each node value to
/// the pomset of edges incident on it, and `edge` takes each edge value to
/// the pomset of node labels it relates (possibly with repeats, possibly
/// ordered). The incidence invariant holds at every return: an edge appears
/// in `node[n]` once per occurrence of `n` in `edge[e]`.
///
/// # Examples
///
/// ```
/// use pomset_hypergraphs::Hypergraph;
///
/// let mut h = Hypergraph::new();
/// h.add_bipartite_edge("bake", vec!["flour", "water"], vec!["bread"]).unwrap();
/// assert_eq!(
///     h.strict_successors(&"flour").unwrap(),
///     [&"bread"].into_iter().collect()
/// );
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Hypergraph<T: Label> {
    node: BTreeMap<T, Pomset<T>>,
    edge: BTreeMap<T, Pomset<T>>,
}

impl<T: Label> Hypergraph<T> {
    /// The empty hypergraph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            node: BTreeMap::new(),
            edge: BTreeMap::new(),
        }
    }

    /// A discrete hypergraph over the given nodes, with no edges yet.
    #[must_use]
    pub fn with_nodes(nodes: impl IntoIterator<Item = T>) -> Self {
        let mut result = Self::new();
        for node in nodes {
            result.add_node(node);
        }
        result
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.node.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edge.len()
    }

    /// The node values, in order.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.node.keys()
    }

    /// The edge values, in order.
    pub fn edges(&self) -> impl Iterator<Item = &T> {
        self.edge.keys()
    }

    /// Has this node value been inserted?
    #[must_use]
    pub fn contains_node(&self, node: &T) -> bool {
        self.node.contains_key(node)
    }

    /// Has this edge value been inserted?
    #[must_use]
    pub fn contains_edge(&self, edge: &T) -> bool {
        self.edge.contains_key(edge)
    }

    /// The pomset of edges incident on `node`, one occurrence per occurrence
    /// of `node` in the edge.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if the node was never inserted.
    pub fn incident_edges(&self, node: &T) -> Result<&Pomset<T>, Error<T>> {
        self.node.get(node).ok_or_else(|| Error::UnknownNode {
            node: node.clone(),
        })
    }

    /// Mutable access to a node's incident-edge pomset, e.g. to order the
    /// node's participation across its edges.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if the node was never inserted.
    pub fn incident_edges_mut(&mut self, node: &T) -> Result<&mut Pomset<T>, Error<T>> {
        self.node.get_mut(node).ok_or_else(|| Error::UnknownNode {
            node: node.clone(),
        })
    }

    /// The pomset of node labels an edge relates.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownEdge`] if the edge was never inserted.
    pub fn members(&self, edge: &T) -> Result<&Pomset<T>, Error<T>> {
        self.edge.get(edge).ok_or_else(|| Error::UnknownEdge {
            edge: edge.clone(),
        })
    }

    /// Mutable access to an edge's member pomset, e.g. to add or retract
    /// dependencies after insertion.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownEdge`] if the edge was never inserted.
    pub fn members_mut(&mut self, edge: &T) -> Result<&mut Pomset<T>, Error<T>> {
        self.edge.get_mut(edge).ok_or_else(|| Error::UnknownEdge {
            edge: edge.clone(),
        })
    }

    /// Insert a node with an empty incident-edge pomset.
    ///
    /// Re-adding an existing node silently resets its incident-edge pomset,
    /// orphaning any edges already recorded there; callers wanting
    /// idempotence must check [`Hypergraph::contains_node`] first.
    pub fn add_node(&mut self, node: T) {
        self.node.insert(node, Pomset::new());
    }

    /// Insert a hyperedge over the given members, ordered by the optional
    /// matrix (see [`Pomset::with_order`]) or fully unordered without one.
    ///
    /// Members not yet present become nodes; each member's incident-edge
    /// pomset gains one unordered occurrence of `edge` per occurrence of the
    /// member, so both sides of the incidence structure are installed before
    /// this returns. Directionality is *not* pushed back to the node side:
    /// the edge's internal order is the sole source of directed structure.
    ///
    /// Re-inserting an existing edge value replaces its member pomset but
    /// does not retract occurrences already recorded on the node side; use
    /// [`Hypergraph::remove_edge`] first.
    ///
    /// # Errors
    ///
    /// [`Error::Pomset`] if the order matrix is malformed for the members.
    pub fn add_edge(
        &mut self,
        edge: T,
        members: impl IntoIterator<Item = T>,
        order: Option<Array2<i8>>,
    ) -> Result<(), Error<T>> {
        let members: Vec<T> = members.into_iter().collect();
        let pomset = match order {
            Some(matrix) => Pomset::with_order(members.clone(), matrix)?,
            None => Pomset::from_labels(members.clone()),
        };
        self.install_edge(edge, members, pomset);
        Ok(())
    }

    /// Insert a hyperedge whose order is a bipartition: every member of
    /// `lower` strictly below every member of `upper`.
    ///
    /// # Errors
    ///
    /// [`Error::Pomset`] if the bipartition is malformed.
    pub fn add_bipartite_edge(
        &mut self,
        edge: T,
        lower: impl IntoIterator<Item = T>,
        upper: impl IntoIterator<Item = T>,
    ) -> Result<(), Error<T>> {
        let lower: Vec<T> = lower.into_iter().collect();
        let upper: Vec<T> = upper.into_iter().collect();
        let lower_positions: Vec<usize> = (0..lower.len()).collect();
        let upper_positions: Vec<usize> = (lower.len()..lower.len() + upper.len()).collect();
        let members: Vec<T> = lower.into_iter().chain(upper).collect();
        let pomset = Pomset::with_bipartition(members.clone(), &lower_positions, &upper_positions)?;
        self.install_edge(edge, members, pomset);
        Ok(())
    }

    fn install_edge(&mut self, edge: T, members: Vec<T>, pomset: Pomset<T>) {
        self.edge.insert(edge.clone(), pomset);
        for member in members {
            self.node
                .entry(member)
                .or_insert_with(Pomset::new)
                .add_label(edge.clone());
        }
    }

    /// Delete an edge, retracting every occurrence of it from every member's
    /// incident-edge pomset so the incidence structure stays consistent.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownEdge`] if the edge was never inserted.
    pub fn remove_edge(&mut self, edge: &T) -> Result<(), Error<T>> {
        let members = self.edge.remove(edge).ok_or_else(|| Error::UnknownEdge {
            edge: edge.clone(),
        })?;
        for member in members.support() {
            if let Some(incident) = self.node.get_mut(member) {
                while incident.multiplicity(edge) > 0 {
                    incident.remove_label(edge, 0)?;
                }
            }
        }
        Ok(())
    }

    /// The undirected adjacency of a node: the union, over every edge
    /// incident on it, of that edge's full member set (the node itself
    /// included), ignoring edge orders.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if the node was never inserted.
    pub fn neighbors(&self, node: &T) -> Result<BTreeSet<&T>, Error<T>> {
        let incident = self.incident_edges(node)?;
        let mut result = BTreeSet::new();
        for edge in incident.support() {
            result.extend(self.members(edge)?.labels());
        }
        Ok(result)
    }

    /// Nodes weakly below `node` in some incident edge, across every
    /// occurrence of `node` in that edge.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if the node was never inserted.
    pub fn weak_predecessors(&self, node: &T) -> Result<BTreeSet<&T>, Error<T>> {
        self.related(node, |members, occurrence| {
            members.weakly_below(node, occurrence)
        })
    }

    /// Nodes weakly above `node` in some incident edge, across every
    /// occurrence of `node` in that edge. The directed analogue of
    /// [`Hypergraph::neighbors`].
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if the node was never inserted.
    pub fn weak_successors(&self, node: &T) -> Result<BTreeSet<&T>, Error<T>> {
        self.related(node, |members, occurrence| {
            members.weakly_above(node, occurrence)
        })
    }

    /// Nodes strictly below `node` in some incident edge.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if the node was never inserted.
    pub fn strict_predecessors(&self, node: &T) -> Result<BTreeSet<&T>, Error<T>> {
        self.related(node, |members, occurrence| {
            members.strictly_below(node, occurrence)
        })
    }

    /// Nodes strictly above `node` in some incident edge.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if the node was never inserted.
    pub fn strict_successors(&self, node: &T) -> Result<BTreeSet<&T>, Error<T>> {
        self.related(node, |members, occurrence| {
            members.strictly_above(node, occurrence)
        })
    }

    fn related<'a>(
        &'a self,
        node: &T,
        select: impl Fn(&'a Pomset<T>, usize) -> Result<Vec<&'a T>, PomsetError>,
    ) -> Result<BTreeSet<&'a T>, Error<T>> {
        let incident = self.incident_edges(node)?;
        let mut result = BTreeSet::new();
        for edge in incident.support() {
            let members = self.members(edge)?;
            for occurrence in 0..members.multiplicity(node) {
                result.extend(select(members, occurrence)?);
            }
        }
        Ok(result)
    }

    /// The dual hypergraph, with the roles of nodes and edges exchanged. A
    /// fresh value sharing no mutable state with this one; applying it twice
    /// gives back a structurally equal hypergraph.
    #[must_use]
    pub fn dual(&self) -> Self {
        Self {
            node: self.edge.clone(),
            edge: self.node.clone(),
        }
    }

    /// The undirected cliquification: every pair of distinct members of each
    /// hyperedge, as canonical `(min, max)` pairs with no self-pairs, paired
    /// with the full node set. The caller can hand the result to any graph
    /// library.
    #[must_use]
    pub fn undirected_two_section(&self) -> (BTreeSet<T>, BTreeSet<(T, T)>) {
        let nodes: BTreeSet<T> = self.node.keys().cloned().collect();
        let mut pairs = BTreeSet::new();
        for members in self.edge.values() {
            let support = members.support();
            for (a, b) in support.iter().tuple_combinations() {
                pairs.insert(((*a).clone(), (*b).clone()));
            }
        }
        (nodes, pairs)
    }

    /// The weakly directed cliquification: a directed pair `(m, w)` for
    /// every occurrence `w` weakly above an occurrence of `m` with a
    /// different value, within some hyperedge. Unrelated pairs are included
    /// (in both directions); only strict predecessors are excluded.
    #[must_use]
    pub fn weak_two_section(&self) -> (BTreeSet<T>, BTreeSet<(T, T)>) {
        self.directed_two_section(false)
    }

    /// The strictly directed cliquification: a directed pair `(m, s)` for
    /// every occurrence `s` strictly above an occurrence of `m` within some
    /// hyperedge.
    #[must_use]
    pub fn strict_two_section(&self) -> (BTreeSet<T>, BTreeSet<(T, T)>) {
        self.directed_two_section(true)
    }

    fn directed_two_section(&self, strict: bool) -> (BTreeSet<T>, BTreeSet<(T, T)>) {
        let nodes: BTreeSet<T> = self.node.keys().cloned().collect();
        let mut pairs = BTreeSet::new();
        for members in self.edge.values() {
            let labels = members.labels();
            for (i, lower) in labels.iter().enumerate() {
                for (j, upper) in labels.iter().enumerate() {
                    if lower == upper {
                        continue;
                    }
                    let keep = if strict {
                        members.order().relation(i, j) == Relation::Below
                    } else {
                        members.order().relation(i, j) != Relation::Above
                    };
                    if keep {
                        pairs.insert((lower.clone(), upper.clone()));
                    }
                }
            }
        }
        (nodes, pairs)
    }

    /// The bipartite representation: vertices are the disjoint union of
    /// nodes and edges, with one `(edge, node)` pair per member of each
    /// hyperedge.
    #[must_use]
    #[allow(clippy::type_complexity)]
    pub fn bipartite_representation(
        &self,
    ) -> (
        BTreeSet<BipartiteVertex<T>>,
        BTreeSet<(BipartiteVertex<T>, BipartiteVertex<T>)>,
    ) {
        let mut vertices: BTreeSet<BipartiteVertex<T>> = self
            .node
            .keys()
            .cloned()
            .map(BipartiteVertex::Node)
            .collect();
        vertices.extend(self.edge.keys().cloned().map(BipartiteVertex::Edge));
        let mut pairs = BTreeSet::new();
        for (edge, members) in &self.edge {
            for node in members.support() {
                pairs.insert((
                    BipartiteVertex::Edge(edge.clone()),
                    BipartiteVertex::Node(node.clone()),
                ));
            }
        }
        (vertices, pairs)
    }

    /// Layered breadth-first reachability from `root`: layer 0 is `{root}`,
    /// and each next layer is the union, over the current frontier, of the
    /// undirected neighbors, weak successors, or strict successors per
    /// `direction` — computed fresh each step, so a node can reappear in
    /// several layers.
    ///
    /// This is a layered expansion, not a visited-set search: on a cyclic
    /// structure (and under [`Direction::Weak`] even a single unordered edge
    /// cycles, since a node is its own weak successor there) the layers never
    /// dry up, which is why `max_depth` is mandatory. Expansion stops at the
    /// first empty layer or after `max_depth` steps, whichever comes first.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if `root` was never inserted.
    pub fn breadth_first_search(
        &self,
        root: &T,
        direction: Direction,
        max_depth: usize,
    ) -> Result<Vec<BTreeSet<T>>, Error<T>> {
        if !self.contains_node(root) {
            return Err(Error::UnknownNode { node: root.clone() });
        }
        let mut frontier = BTreeSet::from([root.clone()]);
        let mut layers = vec![frontier.clone()];
        for _ in 0..max_depth {
            let mut next = BTreeSet::new();
            for node in &frontier {
                let reached = match direction {
                    Direction::Undirected => self.neighbors(node)?,
                    Direction::Weak => self.weak_successors(node)?,
                    Direction::Strict => self.strict_successors(node)?,
                };
                next.extend(reached.into_iter().cloned());
            }
            if next.is_empty() {
                break;
            }
            layers.push(next.clone());
            frontier = next;
        }
        Ok(layers)
    }

    /// Tabulate, for each node, how many of its distinct incident edges have
    /// each possible relevant size per `statistic`, then count the nodes
    /// into a matrix: entry `(i, j)` is the number of nodes with exactly `i`
    /// incident edges of relevant size `j`. Column sums therefore all equal
    /// the node count.
    ///
    /// A pure counting pass over the neighbor/predecessor/successor
    /// primitives; an empty hypergraph gives the 1×1 zero matrix.
    #[must_use]
    pub fn size_distribution(&self, statistic: EdgeStatistic) -> Array2<usize> {
        let mut per_node: Vec<BTreeMap<usize, usize>> = Vec::new();
        for (node, incident) in &self.node {
            let mut sizes: BTreeMap<usize, usize> = BTreeMap::new();
            for edge in incident.support() {
                if let Some(members) = self.edge.get(edge) {
                    *sizes
                        .entry(Self::relevant_size(members, node, statistic))
                        .or_insert(0) += 1;
                }
            }
            per_node.push(sizes);
        }
        let max_size = per_node
            .iter()
            .flat_map(|sizes| sizes.keys().copied())
            .max()
            .unwrap_or(0);
        let max_count = per_node
            .iter()
            .flat_map(|sizes| sizes.values().copied())
            .max()
            .unwrap_or(0);
        let mut matrix = Array2::zeros((max_count + 1, max_size + 1));
        for sizes in &per_node {
            for (&size, &count) in sizes {
                matrix[[count, size]] += 1;
            }
        }
        for j in 0..=max_size {
            let with_some: usize = (1..=max_count).map(|i| matrix[[i, j]]).sum();
            matrix[[0, j]] = self.node.len() - with_some;
        }
        matrix
    }

    /// The size an edge contributes for `node` under the given statistic:
    /// the edge's cardinality, or the number of distinct positions
    /// weakly/strictly related as requested to any occurrence of `node`.
    fn relevant_size(members: &Pomset<T>, node: &T, statistic: EdgeStatistic) -> usize {
        match statistic {
            EdgeStatistic::Cardinality => members.cardinality(),
            EdgeStatistic::WeaklyAbove | EdgeStatistic::WeaklyBelow
                if members.is_unordered() =>
            {
                members.size()
            }
            _ => {
                let labels = members.labels();
                let order = members.order();
                let mut related = BTreeSet::new();
                for (i, label) in labels.iter().enumerate() {
                    if label != node {
                        continue;
                    }
                    for j in 0..labels.len() {
                        if j == i {
                            continue;
                        }
                        let keep = match statistic {
                            EdgeStatistic::WeaklyAbove => order.relation(i, j) != Relation::Above,
                            EdgeStatistic::StrictlyAbove => order.relation(i, j) == Relation::Below,
                            EdgeStatistic::WeaklyBelow => order.relation(i, j) != Relation::Below,
                            EdgeStatistic::StrictlyBelow => order.relation(i, j) == Relation::Above,
                            EdgeStatistic::Cardinality => false,
                        };
                        if keep {
                            related.insert(j);
                        }
                    }
                }
                related.len()
            }
        }
    }
}

impl<T: Label> Default for Hypergraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Label> Display for Hypergraph<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "⟨{} nodes, {} edges⟩", self.node.len(), self.edge.len())
    }
}

impl<T: Label> Debug for Hypergraph<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Reuse Display cuz it's nice
        Display::fmt(self, f)
    }
}

/// Errors that can arise when building or querying a hypergraph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error<T: Label> {
    /// A query named a node that was never inserted.
    #[error("unknown node {node:?}")]
    UnknownNode {
        /// The missing node value
        node: T,
    },
    /// A query named an edge that was never inserted.
    #[error("unknown edge {edge:?}")]
    UnknownEdge {
        /// The missing edge value
        edge: T,
    },
    /// A pomset error occurred: {0}
    #[error("a pomset error occurred: {0}")]
    Pomset(#[from] PomsetError),
}

/// `proptest` strategies for generating arbitrary hypergraphs.
#[cfg(test)]
pub(crate) mod strategies {
    use super::*;
    use crate::pomset::strategies as pomsets;
    use proptest::prelude::*;

    /// Hypergraphs over small `u8` labels; node ids stay below 8 and edge
    /// ids start at 100, but nothing relies on the two spaces being disjoint.
    pub fn hypergraphs() -> impl Strategy<Value = Hypergraph<u8>> {
        proptest::collection::vec(
            (
                proptest::collection::vec(0..8u8, 1..5),
                proptest::collection::vec((0..5usize, 0..5usize), 0..4),
            ),
            0..6,
        )
        .prop_map(|edges| {
            let mut h = Hypergraph::new();
            for (index, (members, pairs)) in edges.into_iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let edge = 100 + index as u8;
                h.add_edge(edge, members, None).unwrap();
                let pomset = h.members_mut(&edge).unwrap();
                for (lo, hi) in pairs {
                    if lo < pomset.size() && hi < pomset.size() {
                        let (from, from_occurrence) = pomsets::occurrence(pomset, lo);
                        let (to, to_occurrence) = pomsets::occurrence(pomset, hi);
                        // contradictory pairs are skipped
                        let _ = pomset.add_dependency(&from, from_occurrence, &to, to_occurrence);
                    }
                }
            }
            h
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chain_matrix() -> Array2<i8> {
        let mut m = Array2::zeros((3, 3));
        for (lo, hi) in [(0, 1), (0, 2), (1, 2)] {
            m[[lo, hi]] = -1;
            m[[hi, lo]] = 1;
        }
        m
    }

    /// e1 = {a, b, c} with a < b < c, e2 = {x, y} unordered.
    fn sample() -> Hypergraph<&'static str> {
        let mut h = Hypergraph::new();
        h.add_edge("e1", vec!["a", "b", "c"], Some(chain_matrix()))
            .unwrap();
        h.add_edge("e2", vec!["x", "y"], None).unwrap();
        h
    }

    fn set<'a>(items: impl IntoIterator<Item = &'a &'static str>) -> BTreeSet<&'a &'static str> {
        items.into_iter().collect()
    }

    #[test]
    fn add_edge_installs_both_sides() {
        let h = sample();
        assert_eq!(h.num_nodes(), 5);
        assert_eq!(h.num_edges(), 2);
        for node in ["a", "b", "c"] {
            assert_eq!(h.incident_edges(&node).unwrap().multiplicity(&"e1"), 1);
        }
        assert!(h.contains_node(&"a") && !h.contains_edge(&"a"));
        assert!(h.contains_edge(&"e1") && !h.contains_node(&"e1"));
    }

    #[test]
    fn directed_queries_follow_the_edge_order() {
        let h = sample();
        assert_eq!(h.strict_successors(&"a").unwrap(), set([&"b", &"c"]));
        assert_eq!(h.weak_successors(&"a").unwrap(), set([&"b", &"c"]));
        assert_eq!(h.strict_successors(&"b").unwrap(), set([&"c"]));
        assert_eq!(h.strict_predecessors(&"c").unwrap(), set([&"a", &"b"]));
        // unordered edges contribute nothing strictly, everything weakly
        assert!(h.strict_successors(&"x").unwrap().is_empty());
        assert_eq!(h.weak_successors(&"x").unwrap(), set([&"x", &"y"]));
        assert_eq!(h.weak_predecessors(&"x").unwrap(), set([&"x", &"y"]));
    }

    #[test]
    fn neighbors_cover_the_full_member_set() {
        let h = sample();
        assert_eq!(h.neighbors(&"a").unwrap(), set([&"a", &"b", &"c"]));
        assert_eq!(h.neighbors(&"x").unwrap(), set([&"x", &"y"]));
        assert!(matches!(
            h.neighbors(&"nope"),
            Err(Error::UnknownNode { node: "nope" })
        ));
    }

    #[test]
    fn two_sections_of_a_total_chain_coincide() {
        let mut h = Hypergraph::new();
        h.add_edge("e1", vec!["a", "b", "c"], Some(chain_matrix()))
            .unwrap();
        let expected: BTreeSet<(&str, &str)> =
            [("a", "b"), ("a", "c"), ("b", "c")].into_iter().collect();
        let (nodes, undirected) = h.undirected_two_section();
        assert_eq!(nodes, ["a", "b", "c"].into_iter().collect());
        assert_eq!(undirected, expected);
        // the chain is total, so no unrelated pairs widen the weak section
        assert_eq!(h.strict_two_section().1, expected);
        assert_eq!(h.weak_two_section().1, expected);
    }

    #[test]
    fn weak_section_includes_unrelated_pairs_both_ways() {
        let mut h = Hypergraph::new();
        h.add_edge("e2", vec!["x", "y"], None).unwrap();
        assert!(h.strict_two_section().1.is_empty());
        assert_eq!(
            h.weak_two_section().1,
            [("x", "y"), ("y", "x")].into_iter().collect()
        );
        assert_eq!(
            h.undirected_two_section().1,
            [("x", "y")].into_iter().collect()
        );
    }

    #[test]
    fn bipartite_representation_tags_the_disjoint_union() {
        let h = sample();
        let (vertices, pairs) = h.bipartite_representation();
        assert_eq!(vertices.len(), 7);
        assert_eq!(pairs.len(), 5);
        assert!(pairs.contains(&(BipartiteVertex::Edge("e1"), BipartiteVertex::Node("a"))));
    }

    #[test]
    fn bfs_recomputes_each_layer_from_the_frontier() {
        let h = sample();
        let layers = h.breadth_first_search(&"a", Direction::Strict, 10).unwrap();
        // c is reached both at depth 1 and again from b at depth 2
        assert_eq!(
            layers,
            vec![
                ["a"].into_iter().collect(),
                ["b", "c"].into_iter().collect(),
                ["c"].into_iter().collect(),
            ]
        );
    }

    #[test]
    fn bfs_is_cut_off_by_the_depth_bound() {
        let h = sample();
        // under Weak, x is its own successor, so layers repeat forever
        let layers = h.breadth_first_search(&"x", Direction::Weak, 3).unwrap();
        assert_eq!(layers.len(), 4);
        let expected: BTreeSet<&str> = ["x", "y"].into_iter().collect();
        assert!(layers[1..].iter().all(|layer| *layer == expected));
        assert!(matches!(
            h.breadth_first_search(&"nope", Direction::Undirected, 1),
            Err(Error::UnknownNode { .. })
        ));
    }

    #[test]
    fn undirected_bfs_walks_shared_nodes() {
        let mut h = Hypergraph::new();
        h.add_edge(10, vec![1, 2], None).unwrap();
        h.add_edge(11, vec![2, 3], None).unwrap();
        let layers = h
            .breadth_first_search(&1, Direction::Undirected, 1)
            .unwrap();
        assert_eq!(
            layers,
            vec![[1].into_iter().collect(), [1, 2].into_iter().collect()]
        );
        let layers = h
            .breadth_first_search(&1, Direction::Undirected, 2)
            .unwrap();
        assert_eq!(layers[2], [1, 2, 3].into_iter().collect());
    }

    #[test]
    fn size_distributions_count_nodes_by_relevant_size() {
        let h = sample();
        let cardinality = h.size_distribution(EdgeStatistic::Cardinality);
        assert_eq!(cardinality.dim(), (2, 4));
        // a, b, c each have one incident edge of cardinality 3; x, y one of 2
        assert_eq!(cardinality[[1, 3]], 3);
        assert_eq!(cardinality[[1, 2]], 2);
        assert_eq!(cardinality[[0, 2]], 3);
        let strict_out = h.size_distribution(EdgeStatistic::StrictlyAbove);
        // a has 2 strict successors in e1, b has 1, c/x/y have 0
        assert_eq!(strict_out[[1, 2]], 1);
        assert_eq!(strict_out[[1, 1]], 1);
        assert_eq!(strict_out[[1, 0]], 3);
        let weak_out = h.size_distribution(EdgeStatistic::WeaklyAbove);
        // a sees b and c above it; x and y each see the whole unordered edge
        assert_eq!(weak_out[[1, 2]], 3);
    }

    #[test]
    fn empty_hypergraph_distribution_is_trivial() {
        let h: Hypergraph<u8> = Hypergraph::new();
        let matrix = h.size_distribution(EdgeStatistic::Cardinality);
        assert_eq!(matrix.dim(), (1, 1));
        assert_eq!(matrix[[0, 0]], 0);
    }

    #[test]
    fn remove_edge_retracts_the_node_side() {
        let mut h = sample();
        h.remove_edge(&"e1").unwrap();
        assert!(!h.contains_edge(&"e1"));
        assert_eq!(h.incident_edges(&"a").unwrap().size(), 0);
        // the nodes themselves stay
        assert!(h.contains_node(&"a"));
        assert!(matches!(
            h.remove_edge(&"e1"),
            Err(Error::UnknownEdge { edge: "e1" })
        ));
    }

    #[test]
    fn repeated_members_get_one_incidence_per_occurrence() {
        let mut h = Hypergraph::new();
        h.add_edge("loop", vec!["n", "n"], None).unwrap();
        assert_eq!(h.incident_edges(&"n").unwrap().multiplicity(&"loop"), 2);
        h.remove_edge(&"loop").unwrap();
        assert_eq!(h.incident_edges(&"n").unwrap().size(), 0);
    }

    #[test]
    fn readding_a_node_resets_its_incidence() {
        let mut h = sample();
        h.add_node("a");
        assert_eq!(h.incident_edges(&"a").unwrap().size(), 0);
    }

    #[test]
    fn bipartite_edges_order_lower_below_upper() {
        let mut h = Hypergraph::new();
        h.add_bipartite_edge("bake", vec!["flour", "water"], vec!["bread"])
            .unwrap();
        assert_eq!(h.strict_successors(&"flour").unwrap(), set([&"bread"]));
        assert_eq!(
            h.strict_predecessors(&"bread").unwrap(),
            set([&"flour", &"water"])
        );
        assert_eq!(
            h.members(&"bake").unwrap().bipartition(),
            Some((vec![0, 1], vec![2]))
        );
    }

    #[test]
    fn dual_swaps_nodes_and_edges() {
        let h = sample();
        let d = h.dual();
        assert!(d.contains_node(&"e1") && d.contains_edge(&"a"));
        assert_eq!(d.members(&"a").unwrap().labels(), ["e1"]);
        assert_eq!(d.dual(), h);
    }

    proptest! {
        #[test]
        fn incidence_is_consistent(h in strategies::hypergraphs()) {
            for edge in h.edges() {
                let members = h.members(edge).unwrap();
                for node in members.support() {
                    let incident = h.incident_edges(node).unwrap();
                    prop_assert_eq!(incident.multiplicity(edge), members.multiplicity(node));
                }
            }
        }

        #[test]
        fn dual_is_an_involution(h in strategies::hypergraphs()) {
            prop_assert_eq!(h.dual().dual(), h);
        }

        #[test]
        fn two_sections_are_monotone(h in strategies::hypergraphs()) {
            let (_, strict) = h.strict_two_section();
            let (_, weak) = h.weak_two_section();
            let (_, undirected) = h.undirected_two_section();
            for pair in &strict {
                prop_assert!(weak.contains(pair));
            }
            for &(a, b) in &weak {
                let canonical = (a.min(b), a.max(b));
                prop_assert!(undirected.contains(&canonical));
            }
        }

        #[test]
        fn bfs_starts_at_the_root_and_respects_the_bound(
            h in strategies::hypergraphs(),
            depth in 0..4usize,
        ) {
            if let Some(root) = h.nodes().next().cloned() {
                let layers = h.breadth_first_search(&root, Direction::Undirected, depth).unwrap();
                prop_assert_eq!(layers[0].len(), 1);
                prop_assert!(layers[0].contains(&root));
                prop_assert!(layers.len() <= depth + 1);
            }
        }

        #[test]
        fn distribution_columns_sum_to_the_node_count(h in strategies::hypergraphs()) {
            for statistic in [
                EdgeStatistic::Cardinality,
                EdgeStatistic::WeaklyAbove,
                EdgeStatistic::WeaklyBelow,
                EdgeStatistic::StrictlyAbove,
                EdgeStatistic::StrictlyBelow,
            ] {
                let matrix = h.size_distribution(statistic);
                for column in matrix.columns() {
                    prop_assert_eq!(column.sum(), h.num_nodes());
                }
            }
        }
    }
}
