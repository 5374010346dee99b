//! Classifier instance stream parser (C9). See spec §6.
//!
//! Grounded on `original_source/scripts/csiparse2.py` (`parseInstanceLine`,
//! `parseDist`, `formulateWCSP`) and `common.py`'s `pairIterator`/`isScoringToken`.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};

use unicode_general_category::{get_general_category, GeneralCategory};

use crate::constraint::{Constraint, DependencyDirection, HasDependency, HasIncomingRel};
use crate::error::{ParseError, StreamKind};
use crate::util::{Column, Direction, Sentence, TokenIndex, Weight};

/// No-edge / no-relation sentinel predicted class, per spec §6.
const NO_CLASS: &str = "__";

/// One parsed classifier-output line: feature tokens (last one is the
/// predicted class) plus its normalised label distribution.
#[derive(Debug, Clone)]
pub struct ParsedInstance {
    pub features: Vec<String>,
    pub distribution: HashMap<String, Weight>,
}

impl ParsedInstance {
    pub fn predicted_class(&self) -> &str {
        self.features.last().map(String::as_str).unwrap_or(NO_CLASS)
    }
}

/// Find the last `{` and the first `}` following it, split the fields
/// before `{` off as the feature list, and normalise the comma-separated
/// `label weight` pairs in between to sum to 1.
///
/// Matches `parseInstanceLine`/`parseDist` verbatim, including their pitfall:
/// a brace occurring inside an earlier feature token is never mistaken for
/// the distribution's opening brace, because the search is for the *last*
/// `{` in the line.
fn parse_instance_line(line: &str, sentence_index: usize) -> Result<ParsedInstance, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let start = tokens
        .iter()
        .rposition(|&t| t == "{")
        .ok_or_else(|| ParseError::InputFormatError {
            detail: "classifier instance line has no '{'".to_string(),
            sentence_index: Some(sentence_index),
            token_index: None,
        })?;
    let end = tokens[start..]
        .iter()
        .position(|&t| t == "}")
        .map(|offset| start + offset)
        .ok_or_else(|| ParseError::InputFormatError {
            detail: "classifier instance line has no closing '}'".to_string(),
            sentence_index: Some(sentence_index),
            token_index: None,
        })?;

    let dist_str = tokens[start..end].join(" ");
    let dist_str = dist_str.trim_start_matches('{').trim_end_matches('}');
    let distribution = parse_dist(dist_str, sentence_index)?;
    let features = tokens[..start].iter().map(|s| s.to_string()).collect();

    Ok(ParsedInstance { features, distribution })
}

fn parse_dist(s: &str, sentence_index: usize) -> Result<HashMap<String, Weight>, ParseError> {
    let malformed = || ParseError::InputFormatError {
        detail: format!("malformed label distribution {s:?}"),
        sentence_index: Some(sentence_index),
        token_index: None,
    };

    let mut raw = HashMap::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut fields = part.split_whitespace();
        let label = fields.next().ok_or_else(malformed)?.to_string();
        let weight: Weight = fields.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
        raw.insert(label, weight);
    }
    let sum: Weight = raw.values().sum();
    if sum == 0.0 {
        return Err(malformed());
    }
    for weight in raw.values_mut() {
        *weight /= sum;
    }
    Ok(raw)
}

/// `true` if `form` contains no character of Unicode general category `Po`
/// (punctuation, other). Grounded on `common.py`'s `isScoringToken`.
fn is_scoring_token(form: &str) -> bool {
    !form.chars().any(|c| get_general_category(c) == GeneralCategory::OtherPunctuation)
}

/// Ordered pairs `(dependent, head)` of distinct tokens over `1..=n`,
/// filtered by `max_dist` and `skip_non_scoring`, in the nested
/// dependent-then-head iteration order of `common.pairIterator`.
///
/// `max_dist == Some(0)` is treated the same as `None`: `common.pairIterator`
/// guards the distance check with `if maxDist`, and `0` is falsy in Python,
/// so an explicit zero leaves the stream unfiltered rather than rejecting
/// every non-root pair.
fn pair_iterator<'a>(
    sentence: &'a Sentence,
    max_dist: Option<usize>,
    skip_non_scoring: bool,
) -> impl Iterator<Item = (TokenIndex, TokenIndex)> + 'a {
    let max_dist = max_dist.filter(|&m| m != 0);
    let n = sentence.len();
    (1..=n).flat_map(move |dependent| {
        (1..=n).filter_map(move |head| {
            if dependent == head {
                return None;
            }
            if skip_non_scoring && !is_scoring_token(sentence.tokens[dependent - 1].get(Column::Form)) {
                return None;
            }
            let dist = dependent.abs_diff(head);
            if let Some(max_dist) = max_dist {
                if dist > max_dist {
                    return None;
                }
            }
            Some((dependent, head))
        })
    })
}

/// One open classifier-output stream, consumed one instance per call.
pub struct InstanceStream {
    lines: std::io::Lines<BufReader<Box<dyn Read>>>,
    kind: StreamKind,
}

impl InstanceStream {
    pub fn new(reader: Box<dyn Read>, kind: StreamKind) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            kind,
        }
    }

    fn next_instance(&mut self, sentence_index: usize) -> Result<ParsedInstance, ParseError> {
        match self.lines.next() {
            Some(Ok(line)) => parse_instance_line(&line, sentence_index),
            Some(Err(e)) => Err(e.into()),
            None => Err(ParseError::StreamDesyncError {
                stream: self.kind,
                sentence_index,
            }),
        }
    }
}

/// Build every constraint for `sentence` from its three instance streams, in
/// lock-step with the sentence iteration. `dep` is mandatory; `dir`/`modstream`
/// are each optional. See spec §6 and `csiparse2.formulateWCSP`.
#[allow(clippy::too_many_arguments)]
pub fn build_constraints(
    sentence: &Sentence,
    sentence_index: usize,
    dep: &mut InstanceStream,
    dir: Option<&mut InstanceStream>,
    modstream: Option<&mut InstanceStream>,
    max_dist: Option<usize>,
    skip_non_scoring: bool,
) -> Result<Vec<Constraint>, ParseError> {
    let n = sentence.len();
    let mut constraints = Vec::new();

    for dependent in 1..=n {
        let instance = dep.next_instance(sentence_index)?;
        let cls = instance.predicted_class();
        if cls != NO_CLASS {
            let conf = *instance.distribution.get(cls).unwrap_or(&0.0);
            constraints.push(Constraint::HasDependency(HasDependency {
                dependent,
                head: 0,
                rel_type: cls.to_string(),
                weight: conf,
            }));
        }
    }

    for (dependent, head) in pair_iterator(sentence, max_dist, skip_non_scoring) {
        let instance = dep.next_instance(sentence_index)?;
        let cls = instance.predicted_class();
        if cls != NO_CLASS {
            let conf = *instance.distribution.get(cls).unwrap_or(&0.0);
            constraints.push(Constraint::HasDependency(HasDependency {
                dependent,
                head,
                rel_type: cls.to_string(),
                weight: conf,
            }));
        }
    }

    if let Some(dir) = dir {
        for token in 1..=n {
            let instance = dir.next_instance(sentence_index)?;
            for (cls, weight) in &instance.distribution {
                let direction: Direction = cls.parse()?;
                constraints.push(Constraint::DependencyDirection(DependencyDirection {
                    token,
                    direction,
                    weight: *weight,
                }));
            }
        }
    }

    if let Some(modstream) = modstream {
        for token in 1..=n {
            let instance = modstream.next_instance(sentence_index)?;
            let cls = instance.predicted_class();
            if cls == NO_CLASS {
                continue;
            }
            for rel in cls.split('|') {
                let conf: Weight = instance
                    .distribution
                    .iter()
                    .filter(|(key, _)| key.split('|').any(|label| label == rel))
                    .map(|(_, weight)| weight)
                    .sum();
                constraints.push(Constraint::HasIncomingRel(HasIncomingRel {
                    head: token,
                    rel_type: rel.to_string(),
                    weight: conf,
                }));
            }
        }
    }

    Ok(constraints)
}
