//! Search tree node.
//!
//! Edge statistics live on the child node the edge leads to: `prior` is
//! fixed at expansion (root noise mutates it once per search), and
//! `visit_count` / `value_sum` accumulate from the perspective of the player
//! who moved into the child. Ownership points strictly downward; there are
//! no parent links, backpropagation happens on recursion unwind in the
//! engine. Children sit in a `BTreeMap` so iteration order is ascending by
//! action index, which makes PUCT tie-breaking deterministic.

use std::collections::BTreeMap;

/// A node of the search tree, holding the statistics of the edge that
/// reaches it.
#[derive(Debug, Clone, Default)]
pub struct SearchNode {
    /// Action that led here, `None` for the root.
    pub action: Option<usize>,
    /// Prior probability assigned by the predictor at expansion.
    pub prior: f32,
    /// Times the edge into this node was traversed.
    pub visit_count: u32,
    /// Sum of backed-up values, from the parent mover's perspective.
    pub value_sum: f64,
    children: BTreeMap<usize, SearchNode>,
}

impl SearchNode {
    /// Fresh root with no statistics.
    pub fn new_root() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Total visits below this node, the `N` in the PUCT exploration term.
    pub fn total_visits(&self) -> u32 {
        self.children.values().map(|child| child.visit_count).sum()
    }

    /// Mean backed-up value of the edge into this node, 0 before any visit.
    pub fn q_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / f64::from(self.visit_count)
        }
    }

    /// Create one child per `(action, prior)` pair.
    pub fn expand(&mut self, priors: &[(usize, f32)]) {
        debug_assert!(self.children.is_empty(), "node expanded twice");
        for &(action, prior) in priors {
            self.children.insert(
                action,
                SearchNode {
                    action: Some(action),
                    prior,
                    ..SearchNode::default()
                },
            );
        }
    }

    /// Pick the child maximising
    /// `Q(a) + c_puct * P(a) * sqrt(N) / (1 + n(a))`.
    ///
    /// Ascending iteration plus a strict comparison means ties go to the
    /// lowest action index.
    pub fn select(&self, c_puct: f64) -> Option<usize> {
        let sqrt_total = f64::from(self.total_visits()).sqrt();
        let mut best: Option<(usize, f64)> = None;
        for (&action, child) in &self.children {
            let exploration =
                c_puct * f64::from(child.prior) * sqrt_total / (1.0 + f64::from(child.visit_count));
            let score = child.q_value() + exploration;
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((action, score));
            }
        }
        best.map(|(action, _)| action)
    }

    pub fn child(&self, action: usize) -> Option<&SearchNode> {
        self.children.get(&action)
    }

    pub fn child_mut(&mut self, action: usize) -> Option<&mut SearchNode> {
        self.children.get_mut(&action)
    }

    /// Children in ascending action order.
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut SearchNode> {
        self.children.values_mut()
    }

    /// `(action, visit_count)` pairs in ascending action order.
    pub fn visit_counts(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.children
            .iter()
            .map(|(&action, child)| (action, child.visit_count))
    }

    /// Descend into the subtree under `action`, dropping the rest of the
    /// tree. The chosen child becomes a root; a fresh root is returned if
    /// the action was never expanded.
    pub fn reroot(mut self, action: usize) -> SearchNode {
        let mut root = self.children.remove(&action).unwrap_or_default();
        root.action = None;
        root
    }
}
