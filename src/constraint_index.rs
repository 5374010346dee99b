//! Constraint index (C1). See spec §3, §4.1.
//!
//! Grounded on `original_source/scripts/cky.py`'s `CKYParser.addConstraint`,
//! which partitions an unordered constraint stream into three dense
//! structures keyed by token index. Every constraint is additionally
//! assigned a small unique [`ConstraintId`] on insertion — the Python source
//! relies on object identity (it puts constraint objects straight into a
//! `set`); this crate threads integer ids through [`crate::chart::SatisfiedSet`]
//! instead, per the "Arena + indices for the chart" design note.

use crate::constraint::{Constraint, DependencyDirection, HasDependency, HasIncomingRel};
use crate::error::ParseError;
use crate::util::TokenIndex;

/// Identifies one constraint instance for satisfied-set bookkeeping.
pub type ConstraintId = u32;

/// A constraint paired with the id it was assigned at index-build time.
#[derive(Debug, Clone)]
pub struct Indexed<T> {
    pub id: ConstraintId,
    pub value: T,
}

/// Three dense structures over token indices `0..=num_tokens`, built once
/// per sentence and read-only thereafter.
#[derive(Debug, Default)]
pub struct ConstraintIndex {
    num_tokens: TokenIndex,
    /// `incoming[h]` — `HasIncomingRel` constraints asserting `h` should
    /// receive an incoming edge with some label.
    incoming: Vec<Vec<Indexed<HasIncomingRel>>>,
    /// `outgoing[d]` — `DependencyDirection` constraints on `d`'s outgoing edge.
    outgoing: Vec<Vec<Indexed<DependencyDirection>>>,
    /// `edges[d][h]` — at most one `HasDependency` per `(d, h)`.
    edges: Vec<Vec<Vec<Indexed<HasDependency>>>>,
    next_id: ConstraintId,
}

impl ConstraintIndex {
    /// Allocate empty structures for a sentence of `num_tokens` real tokens
    /// (token indices `1..=num_tokens`, plus the synthetic root `0`).
    pub fn new(num_tokens: TokenIndex) -> Self {
        Self {
            num_tokens,
            incoming: vec![Vec::new(); num_tokens + 1],
            outgoing: vec![Vec::new(); num_tokens + 1],
            edges: vec![vec![Vec::new(); num_tokens + 1]; num_tokens + 1],
            next_id: 0,
        }
    }

    /// Build an index from an unordered constraint stream. No merging,
    /// deduplication or weight arithmetic happens here; constraints with an
    /// index out of `0..=num_tokens` are an [`ParseError::InputFormatError`],
    /// and a second `HasDependency` for an already-seen `(dependent, head)`
    /// is an [`ParseError::InvariantError`].
    pub fn build(num_tokens: TokenIndex, constraints: impl IntoIterator<Item = Constraint>) -> Result<Self, ParseError> {
        let mut index = Self::new(num_tokens);
        for constraint in constraints {
            index.add(constraint)?;
        }
        Ok(index)
    }

    fn next_id(&mut self) -> ConstraintId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_bounds(&self, token: TokenIndex, what: &str) -> Result<(), ParseError> {
        if token > self.num_tokens {
            return Err(ParseError::InputFormatError {
                detail: format!("{what} index {token} out of range 0..={}", self.num_tokens),
                sentence_index: None,
                token_index: Some(token),
            });
        }
        Ok(())
    }

    fn add(&mut self, constraint: Constraint) -> Result<(), ParseError> {
        match constraint {
            Constraint::HasIncomingRel(c) => {
                self.check_bounds(c.head, "HasIncomingRel.head")?;
                let id = self.next_id();
                self.incoming[c.head].push(Indexed { id, value: c });
            }
            Constraint::DependencyDirection(c) => {
                self.check_bounds(c.token, "DependencyDirection.token")?;
                let id = self.next_id();
                self.outgoing[c.token].push(Indexed { id, value: c });
            }
            Constraint::HasDependency(c) => {
                self.check_bounds(c.dependent, "HasDependency.dependent")?;
                self.check_bounds(c.head, "HasDependency.head")?;
                if !self.edges[c.dependent][c.head].is_empty() {
                    return Err(ParseError::InvariantError {
                        detail: "more than one HasDependency for the same (dependent, head)".to_string(),
                        dependent: c.dependent,
                        head: c.head,
                    });
                }
                let id = self.next_id();
                self.edges[c.dependent][c.head].push(Indexed { id, value: c });
            }
        }
        Ok(())
    }

    pub fn num_tokens(&self) -> TokenIndex {
        self.num_tokens
    }

    pub fn incoming(&self, head: TokenIndex) -> &[Indexed<HasIncomingRel>] {
        &self.incoming[head]
    }

    pub fn outgoing(&self, token: TokenIndex) -> &[Indexed<DependencyDirection>] {
        &self.outgoing[token]
    }

    pub fn edges(&self, dependent: TokenIndex, head: TokenIndex) -> &[Indexed<HasDependency>] {
        &self.edges[dependent][head]
    }

    /// The unique `HasDependency` for `(dependent, head)`, if any.
    pub fn edge(&self, dependent: TokenIndex, head: TokenIndex) -> Option<&HasDependency> {
        self.edges[dependent][head].first().map(|indexed| &indexed.value)
    }
}
