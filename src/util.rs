//! Core data types shared across the constraint index, chart parser and I/O layers.

use serde::{Deserialize, Serialize};

/// Real-valued constraint and chart weight.
pub type Weight = f64;

/// 1-based token index; 0 is the synthetic root.
pub type TokenIndex = usize;

/// The ten CoNLL-style columns, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Form,
    Lemma,
    Cpostag,
    Postag,
    Feats,
    Head,
    Deprel,
    Phead,
    Pdeprel,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Id,
        Column::Form,
        Column::Lemma,
        Column::Cpostag,
        Column::Postag,
        Column::Feats,
        Column::Head,
        Column::Deprel,
        Column::Phead,
        Column::Pdeprel,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// One CoNLL token: ten string fields addressable by [`Column`].
///
/// `HEAD` and `DEPREL` are the only columns the parser writes; everything
/// else is read-only input that is copied through to the output unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    fields: [String; 10],
}

impl Token {
    pub fn new(fields: [String; 10]) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: Column) -> &str {
        &self.fields[column.index()]
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.fields[column.index()] = value.into();
    }

    /// The token's 1-based `ID` field, parsed.
    pub fn id(&self) -> Option<TokenIndex> {
        self.get(Column::Id).parse().ok()
    }

    pub fn head(&self) -> Option<TokenIndex> {
        self.get(Column::Head).parse().ok()
    }
}

/// An ordered sentence of tokens with contiguous 1-based IDs.
///
/// Index 0 of the implied token space is the synthetic root and has no
/// [`Token`] record; `tokens[i]` corresponds to token ID `i + 1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Number of real tokens (excludes the synthetic root).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn head_of(&self, token_index: TokenIndex) -> Option<TokenIndex> {
        self.tokens.get(token_index - 1).and_then(Token::head)
    }

    pub fn deprel_of(&self, token_index: TokenIndex) -> &str {
        self.tokens[token_index - 1].get(Column::Deprel)
    }

    pub fn set_head_deprel(&mut self, token_index: TokenIndex, head: TokenIndex, deprel: impl Into<String>) {
        let token = &mut self.tokens[token_index - 1];
        token.set(Column::Head, head.to_string());
        token.set(Column::Deprel, deprel);
    }
}

/// Direction of a token's outgoing (head-ward) relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Root,
    Left,
    Right,
}

impl std::str::FromStr for Direction {
    type Err = crate::error::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROOT" => Ok(Direction::Root),
            "LEFT" => Ok(Direction::Left),
            "RIGHT" => Ok(Direction::Right),
            other => Err(crate::error::ParseError::InputFormatError {
                detail: format!("unknown direction class {other:?}"),
                sentence_index: None,
                token_index: None,
            }),
        }
    }
}

/// The literal edge label assigned to a root edge that no `HasDependency`
/// constraint overrides. See spec design note on the `"ROOT"` sentinel.
pub const ROOT_LABEL: &str = "ROOT";

/// Label assigned by the refiner when attaching a dependent to a head with
/// no matching `HasDependency` constraint, for a non-root head.
pub const UNKNOWN_LABEL: &str = "unk";

/// The direction of `dependent`'s actual outgoing relation, given its head.
pub fn direction_of(head: TokenIndex, dependent: TokenIndex) -> Direction {
    if head == 0 {
        Direction::Root
    } else if head < dependent {
        Direction::Left
    } else {
        Direction::Right
    }
}

/// The score contributed by an edge that no `HasDependency` constraint
/// supports. Negative so edges without classifier support are disfavoured,
/// but not `-inf`, so the dominant substructure can still outweigh it. Part
/// of the DP's observable behaviour — do not change this value.
pub const NO_DEPENDENCY_SENTINEL: Weight = -0.5;
