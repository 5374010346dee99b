//! Driver/orchestration (C7, generalised to C13). See spec §4.7.
//!
//! Grounded on `original_source/scripts/csidp.py`'s `main_`: read a sentence,
//! build its constraint index from the three instance streams, run the
//! chart parser, backtrace, optionally refine, write the result. Aborts the
//! whole run on the first error, matching the source's lack of per-sentence
//! recovery (see the REDESIGN FLAGS note on OQ-1 in `SPEC_FULL.md`).

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::chart;
use crate::cli::Cli;
use crate::conll::{self, Sentences};
use crate::constraint_index::ConstraintIndex;
use crate::error::{ParseError, StreamKind};
use crate::instances::{self, InstanceStream};
use crate::refiner;
use crate::util::Sentence;

/// Parse, and optionally refine, a single already-indexed sentence in place.
/// Returns the final tree score. Pure given `(sentence, index)` — callers
/// may run this concurrently over disjoint sentences (see spec §5).
pub fn parse_sentence(sentence: &mut Sentence, index: &ConstraintIndex, non_projective: bool) -> f64 {
    let parsed = chart::parse(index);
    crate::backtrace::backtrace(&parsed, sentence);
    if non_projective {
        let report = refiner::refine(sentence, index);
        debug!(iterations = report.iterations, delta = report.final_score - report.initial_score, "refined");
        report.final_score
    } else {
        parsed.best_score()
    }
}

fn open_instance_stream(path: &Path, kind: StreamKind) -> Result<InstanceStream, ParseError> {
    let file = File::open(path)?;
    Ok(InstanceStream::new(Box::new(file), kind))
}

/// Run the whole pipeline per the CLI's flags: open the three classifier
/// streams, iterate sentences from `cli.files` (stdin if empty), and write
/// annotated output to `cli.out`.
pub fn run(cli: &Cli) -> Result<(), ParseError> {
    let mut dep = open_instance_stream(&cli.dep, StreamKind::Dep)?;
    let mut dir = cli.dir.as_deref().map(|p| open_instance_stream(p, StreamKind::Dir)).transpose()?;
    let mut modstream = cli
        .modstream
        .as_deref()
        .map(|p| open_instance_stream(p, StreamKind::Mod))
        .transpose()?;

    let reader: Box<dyn BufRead> = if cli.files.is_empty() {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(concat_files(&cli.files)?))
    };

    let mut out = File::create(&cli.out)?;

    for (sentence_index, sentence) in Sentences::new(reader).enumerate() {
        let mut sentence = sentence?;
        let constraints = instances::build_constraints(
            &sentence,
            sentence_index,
            &mut dep,
            dir.as_mut(),
            modstream.as_mut(),
            cli.max_dist,
            cli.exclude_non_scoring,
        )?;
        let index = ConstraintIndex::build(sentence.len(), constraints)?;
        let score = parse_sentence(&mut sentence, &index, cli.non_projective);
        info!(sentence_index, tokens = sentence.len(), score, "parsed sentence");
        conll::write_sentence(&mut out, &sentence)?;
    }

    Ok(())
}

/// Concatenate `files` into a single stream, matching Python's
/// `fileinput.input(args)` treatment of multiple positional files as one
/// logical stream of lines.
fn concat_files(files: &[std::path::PathBuf]) -> io::Result<impl BufRead> {
    let mut buf = Vec::new();
    for path in files {
        let mut file = BufReader::new(File::open(path)?);
        io::copy(&mut file, &mut buf)?;
    }
    Ok(io::Cursor::new(buf))
}
