//! Whole-tree evaluator (C5). See spec §4.5.
//!
//! Grounded on `original_source/scripts/csidp.py`'s `evaluateTree`.

use std::collections::HashSet;

use crate::constraint_index::ConstraintIndex;
use crate::util::{direction_of, Sentence, Weight};

/// Sum the contributions of all three constraint families in the tree
/// currently recorded on `sentence`'s `HEAD`/`DEPREL` fields.
pub fn evaluate_tree(sentence: &Sentence, index: &ConstraintIndex) -> Weight {
    let n = sentence.len();
    let mut score = 0.0;

    for i in 1..=n {
        let in_rels: HashSet<&str> = sentence
            .tokens
            .iter()
            .filter(|token| token.head() == Some(i))
            .map(|token| token.get(crate::util::Column::Deprel))
            .collect();

        for constraint in index.incoming(i) {
            if in_rels.contains(constraint.value.rel_type.as_str()) {
                score += constraint.value.weight;
            }
        }

        let head = sentence.head_of(i).unwrap_or(0);
        let direction = direction_of(head, i);
        for constraint in index.outgoing(i) {
            if constraint.value.direction == direction {
                score += constraint.value.weight;
            }
        }

        let deprel = sentence.deprel_of(i);
        if let Some(edge) = index.edge(i, head) {
            if edge.rel_type == deprel {
                score += edge.weight;
            }
        }
    }

    score
}
