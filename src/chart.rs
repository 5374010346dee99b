//! Projective chart parser (C3) and its cell/arena types. See spec §3, §4.3.
//!
//! Grounded on `original_source/scripts/cky.py`'s `CKYParser.parse`, a
//! textbook Eisner chart: four tables per span, filled bottom-up by
//! increasing width. The `satisfied` bookkeeping follows the "Arena +
//! indices for the chart" design note: each [`SubtreeCell`] carries a sorted
//! small set of [`ConstraintId`]s rather than the source's Python object set.

use smallvec::SmallVec;

use crate::constraint_index::{ConstraintId, ConstraintIndex};
use crate::edge_scorer::best_edge;
use crate::util::{TokenIndex, Weight};

/// Which end of a span is the (potential) head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Sorted small set of constraint ids already credited to a subtree's
/// score, so `HasIncomingRel`/`DependencyDirection` constraints are not
/// re-added when two subtrees combine. Bounded by 3N distinct constraints
/// touched by any one subtree (spec §5), so a `SmallVec` avoids heap
/// allocation for the common case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SatisfiedSet(SmallVec<[ConstraintId; 8]>);

impl SatisfiedSet {
    pub fn empty() -> Self {
        Self(SmallVec::new())
    }

    pub fn contains(&self, id: ConstraintId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    pub fn insert(&mut self, id: ConstraintId) {
        if let Err(pos) = self.0.binary_search(&id) {
            self.0.insert(pos, id);
        }
    }

    /// Union of `self`, `other` and every id in `extra`.
    pub fn union_with(&self, other: &SatisfiedSet, extra: impl IntoIterator<Item = ConstraintId>) -> SatisfiedSet {
        let mut merged = self.clone();
        for &id in other.0.iter() {
            merged.insert(id);
        }
        for id in extra {
            merged.insert(id);
        }
        merged
    }
}

/// One DP chart cell: the best score for a span, how it was split, the
/// label of the edge introduced (incomplete spans only), and which
/// non-additive constraints have already been credited.
#[derive(Debug, Clone)]
pub struct SubtreeCell {
    pub score: Weight,
    pub split: Option<TokenIndex>,
    pub edge_label: Option<String>,
    pub satisfied: SatisfiedSet,
}

impl SubtreeCell {
    fn base() -> Self {
        Self {
            score: 0.0,
            split: None,
            edge_label: None,
            satisfied: SatisfiedSet::empty(),
        }
    }
}

fn side_bit(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

/// Dense `(s, t, side, complete)` table, flattened as spec §9 recommends.
pub struct Chart {
    n: usize,
    cells: Vec<SubtreeCell>,
}

impl Chart {
    fn dim(&self) -> usize {
        self.n + 1
    }

    fn index(&self, s: TokenIndex, t: TokenIndex, side: Side, complete: bool) -> usize {
        let dim = self.dim();
        (((s * dim + t) * 2 + side_bit(side)) * 2) + complete as usize
    }

    pub fn get(&self, s: TokenIndex, t: TokenIndex, side: Side, complete: bool) -> &SubtreeCell {
        &self.cells[self.index(s, t, side, complete)]
    }

    fn set(&mut self, s: TokenIndex, t: TokenIndex, side: Side, complete: bool, cell: SubtreeCell) {
        let idx = self.index(s, t, side, complete);
        self.cells[idx] = cell;
    }

    /// The score of the best projective tree rooted at the synthetic root,
    /// i.e. `C[0, N, Right, true].score`.
    pub fn best_score(&self) -> Weight {
        self.get(0, self.n, Side::Right, true).score
    }

    pub fn num_tokens(&self) -> TokenIndex {
        self.n
    }
}

/// Run the Eisner DP over `[0, num_tokens]`. `num_tokens == 0` yields a
/// chart with only the base cell.
pub fn parse(index: &ConstraintIndex) -> Chart {
    let n = index.num_tokens();
    let dim = n + 1;
    let mut chart = Chart {
        n,
        cells: Vec::with_capacity(dim * dim * 4),
    };
    chart.cells.resize_with(dim * dim * 4, || SubtreeCell {
        score: Weight::NEG_INFINITY,
        split: None,
        edge_label: None,
        satisfied: SatisfiedSet::empty(),
    });

    for s in 0..=n {
        for side in [Side::Left, Side::Right] {
            for complete in [true, false] {
                chart.set(s, s, side, complete, SubtreeCell::base());
            }
        }
    }

    for k in 1..=n {
        for s in 0..=(n - k) {
            let t = s + k;

            // Left incomplete: s is a dependent of t.
            let mut best_score = Weight::NEG_INFINITY;
            let mut best_split = None;
            let mut best_label = None;
            let mut best_extra = SatisfiedSet::empty();
            for r in s..t {
                let left = chart.get(s, r, Side::Right, true);
                let right = chart.get(r + 1, t, Side::Left, true);
                let edge = best_edge(index, left, right, t, s);
                let score = left.score + right.score + edge.score;
                if score > best_score {
                    best_score = score;
                    best_split = Some(r);
                    best_label = edge.label.clone();
                    best_extra = edge.satisfied;
                }
            }
            let r = best_split.unwrap();
            let satisfied = chart
                .get(s, r, Side::Right, true)
                .satisfied
                .union_with(&chart.get(r + 1, t, Side::Left, true).satisfied, best_extra.0.iter().copied());
            chart.set(
                s,
                t,
                Side::Left,
                false,
                SubtreeCell {
                    score: best_score,
                    split: best_split,
                    edge_label: best_label,
                    satisfied,
                },
            );

            // Right incomplete: t is a dependent of s.
            let mut best_score = Weight::NEG_INFINITY;
            let mut best_split = None;
            let mut best_label = None;
            let mut best_extra = SatisfiedSet::empty();
            for r in s..t {
                let left = chart.get(s, r, Side::Right, true);
                let right = chart.get(r + 1, t, Side::Left, true);
                let edge = best_edge(index, left, right, s, t);
                let score = left.score + right.score + edge.score;
                if score > best_score {
                    best_score = score;
                    best_split = Some(r);
                    best_label = edge.label.clone();
                    best_extra = edge.satisfied;
                }
            }
            let r = best_split.unwrap();
            let satisfied = chart
                .get(s, r, Side::Right, true)
                .satisfied
                .union_with(&chart.get(r + 1, t, Side::Left, true).satisfied, best_extra.0.iter().copied());
            chart.set(
                s,
                t,
                Side::Right,
                false,
                SubtreeCell {
                    score: best_score,
                    split: best_split,
                    edge_label: best_label,
                    satisfied,
                },
            );

            // Left complete.
            let mut best_score = Weight::NEG_INFINITY;
            let mut best_split = None;
            for r in s..t {
                let score = chart.get(s, r, Side::Left, true).score + chart.get(r, t, Side::Left, false).score;
                if score > best_score {
                    best_score = score;
                    best_split = Some(r);
                }
            }
            let r = best_split.unwrap();
            let satisfied = chart
                .get(s, r, Side::Left, true)
                .satisfied
                .union_with(&chart.get(r, t, Side::Left, false).satisfied, std::iter::empty());
            chart.set(
                s,
                t,
                Side::Left,
                true,
                SubtreeCell {
                    score: best_score,
                    split: best_split,
                    edge_label: None,
                    satisfied,
                },
            );

            // Right complete.
            let mut best_score = Weight::NEG_INFINITY;
            let mut best_split = None;
            for r in (s + 1)..=t {
                let score = chart.get(s, r, Side::Right, false).score + chart.get(r, t, Side::Right, true).score;
                if score > best_score {
                    best_score = score;
                    best_split = Some(r);
                }
            }
            let r = best_split.unwrap();
            let satisfied = chart
                .get(s, r, Side::Right, false)
                .satisfied
                .union_with(&chart.get(r, t, Side::Right, true).satisfied, std::iter::empty());
            chart.set(
                s,
                t,
                Side::Right,
                true,
                SubtreeCell {
                    score: best_score,
                    split: best_split,
                    edge_label: None,
                    satisfied,
                },
            );
        }
    }

    chart
}
