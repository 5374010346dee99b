//! Edge scorer (C2). See spec §4.2.
//!
//! Grounded on `original_source/scripts/cky.py`'s `CKYParser.bestEdge`.
//! Reproduces the `-0.5` sentinel and the strict `>` tie-break verbatim —
//! both are part of the DP's observable behaviour (spec §9).

use crate::chart::{SatisfiedSet, SubtreeCell};
use crate::constraint_index::ConstraintIndex;
use crate::util::{TokenIndex, Weight, NO_DEPENDENCY_SENTINEL, ROOT_LABEL};

/// The result of scoring one candidate directed edge `head -> dependent`.
pub struct EdgeScore {
    pub label: Option<String>,
    pub score: Weight,
    pub satisfied: SatisfiedSet,
}

/// Score a single candidate edge `head -> dependent`, combining the two
/// complete subtrees about to meet at it. `left`/`right`'s `satisfied` sets
/// are consulted so `HasIncomingRel`/`DependencyDirection` constraints
/// already credited below are not added again.
pub fn best_edge(
    index: &ConstraintIndex,
    left: &SubtreeCell,
    right: &SubtreeCell,
    head: TokenIndex,
    dependent: TokenIndex,
) -> EdgeScore {
    if head == 0 {
        return best_root_edge(index, dependent);
    }

    let mut best_label = None;
    let mut best_score = NO_DEPENDENCY_SENTINEL;
    let mut best_satisfied = SatisfiedSet::empty();

    for edge in index.edges(dependent, head) {
        let mut score = edge.value.weight;
        let label = edge.value.rel_type.clone();
        let mut satisfied = SatisfiedSet::empty();
        satisfied.insert(edge.id);

        for incoming in index.incoming(head) {
            if incoming.value.rel_type == label
                && !left.satisfied.contains(incoming.id)
                && !right.satisfied.contains(incoming.id)
            {
                score += incoming.value.weight;
                satisfied.insert(incoming.id);
            }
        }

        for outgoing in index.outgoing(dependent) {
            use crate::util::Direction;
            let consistent = match outgoing.value.direction {
                Direction::Left => head < dependent,
                Direction::Right => head > dependent,
                Direction::Root => false,
            };
            if consistent && !left.satisfied.contains(outgoing.id) && !right.satisfied.contains(outgoing.id) {
                score += outgoing.value.weight;
                satisfied.insert(outgoing.id);
            }
        }

        if score > best_score {
            best_score = score;
            best_label = Some(label);
            best_satisfied = satisfied;
        }
    }

    EdgeScore {
        label: best_label,
        score: best_score,
        satisfied: best_satisfied,
    }
}

fn best_root_edge(index: &ConstraintIndex, dependent: TokenIndex) -> EdgeScore {
    use crate::util::Direction;

    let mut score = 0.0;
    let mut label = ROOT_LABEL.to_string();
    let mut satisfied = SatisfiedSet::empty();

    for outgoing in index.outgoing(dependent) {
        if outgoing.value.direction == Direction::Root {
            score += outgoing.value.weight;
            satisfied.insert(outgoing.id);
        }
    }

    if let Some(edge) = index.edges(dependent, 0).first() {
        score += edge.value.weight;
        label = edge.value.rel_type.clone();
        satisfied.insert(edge.id);
    }

    EdgeScore {
        label: Some(label),
        score,
        satisfied,
    }
}
