//! The three weighted soft-constraint families. See spec §3.
//!
//! Grounded on `original_source/scripts/deptree.py`'s `Constraint` class
//! hierarchy; reworked here as a closed sum type per spec design note
//! "Tagged variants over inheritance" rather than the source's inheritance.

use serde::{Deserialize, Serialize};

use crate::util::{Direction, TokenIndex, Weight};

/// Asserts that the directed labelled edge `head -> dependent` with label
/// `rel_type` is worth `weight`. At most one `HasDependency` may exist for a
/// given `(dependent, head)` pair — enforced by [`crate::constraint_index::ConstraintIndex::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HasDependency {
    pub dependent: TokenIndex,
    pub head: TokenIndex,
    pub rel_type: String,
    pub weight: Weight,
}

/// Asserts that `head` should receive at least one incoming edge labelled
/// `rel_type`; contributes `weight` the first time such an edge is
/// introduced into `head`'s subtree, and never more than once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HasIncomingRel {
    pub head: TokenIndex,
    pub rel_type: String,
    pub weight: Weight,
}

/// Asserts that `token`'s outgoing (head-ward) relation is in direction
/// `direction`; contributes `weight` the first time `token` is attached
/// consistently with it, and never more than once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyDirection {
    pub token: TokenIndex,
    pub direction: Direction,
    pub weight: Weight,
}

/// A tagged union over the three constraint families, as consumed by
/// [`crate::constraint_index::ConstraintIndex::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    HasDependency(HasDependency),
    HasIncomingRel(HasIncomingRel),
    DependencyDirection(DependencyDirection),
}

impl From<HasDependency> for Constraint {
    fn from(c: HasDependency) -> Self {
        Constraint::HasDependency(c)
    }
}

impl From<HasIncomingRel> for Constraint {
    fn from(c: HasIncomingRel) -> Self {
        Constraint::HasIncomingRel(c)
    }
}

impl From<DependencyDirection> for Constraint {
    fn from(c: DependencyDirection) -> Self {
        Constraint::DependencyDirection(c)
    }
}
