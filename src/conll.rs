//! CoNLL-style token I/O (C8). See spec §6.
//!
//! Grounded on `original_source/scripts/sentences.py`'s `sentenceIterator`
//! (blank-line delimited blocks) and `common.py` (the ten column names).

use std::io::{BufRead, Write};

use itertools::Itertools;

use crate::error::ParseError;
use crate::util::{Sentence, Token};

const NUM_COLUMNS: usize = 10;
/// Column count accepted in "test mode", where HEAD/DEPREL are absent.
const TEST_MODE_COLUMNS: usize = 8;

/// Split `reader` into blank-line-delimited sentences. Each sentence is
/// parsed eagerly; use [`Sentences::next`] / iterate for one sentence at a
/// time, matching `sentenceIterator`'s streaming contract.
pub struct Sentences<R> {
    reader: R,
    sentence_index: usize,
    finished: bool,
}

impl<R: BufRead> Sentences<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            sentence_index: 0,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for Sentences<R> {
    type Item = Result<Sentence, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut tokens = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            let read = match self.reader.read_line(&mut line) {
                Ok(n) => n,
                Err(e) => return Some(Err(e.into())),
            };
            if read == 0 {
                self.finished = true;
                break;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.trim().is_empty() {
                break;
            }
            match parse_token_line(trimmed, self.sentence_index, tokens.len() + 1) {
                Ok(token) => tokens.push(token),
                Err(e) => return Some(Err(e)),
            }
        }

        if tokens.is_empty() && self.finished {
            return None;
        }
        let result = Sentence::new(tokens);
        self.sentence_index += 1;
        Some(Ok(result))
    }
}

fn parse_token_line(line: &str, sentence_index: usize, expected_id: usize) -> Result<Token, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let padded: Vec<String> = match fields.len() {
        NUM_COLUMNS => fields.iter().map(|s| s.to_string()).collect(),
        TEST_MODE_COLUMNS => fields
            .iter()
            .map(|s| s.to_string())
            .chain(std::iter::repeat(String::new()).take(2))
            .collect(),
        other => {
            return Err(ParseError::InputFormatError {
                detail: format!("expected {NUM_COLUMNS} columns (or {TEST_MODE_COLUMNS} in test mode), got {other}"),
                sentence_index: Some(sentence_index),
                token_index: Some(expected_id),
            })
        }
    };

    let id: usize = padded[0].parse().map_err(|_| ParseError::InputFormatError {
        detail: format!("non-integer ID {:?}", padded[0]),
        sentence_index: Some(sentence_index),
        token_index: Some(expected_id),
    })?;
    if id != expected_id {
        return Err(ParseError::InputFormatError {
            detail: format!("non-contiguous ID: expected {expected_id}, got {id}"),
            sentence_index: Some(sentence_index),
            token_index: Some(expected_id),
        });
    }

    let array: [String; NUM_COLUMNS] = padded.try_into().expect("padded to NUM_COLUMNS above");
    Ok(Token::new(array))
}

/// Write `sentence` as whitespace-separated CoNLL lines followed by a blank
/// line, matching spec §6's output contract exactly (including for an empty
/// sentence, which still emits the blank line).
pub fn write_sentence<W: Write>(writer: &mut W, sentence: &Sentence) -> Result<(), ParseError> {
    for token in &sentence.tokens {
        let line = crate::util::Column::ALL.iter().map(|column| token.get(*column)).join(" ");
        writeln!(writer, "{line}")?;
    }
    writeln!(writer)?;
    Ok(())
}
