//! CLI surface (C10). See spec §6.
//!
//! Grounded on the teacher's `cli.rs`, which groups flags into a `clap`-derive
//! struct and dispatches to library entry points from `main.rs`.

use std::path::PathBuf;

use clap::Parser;

/// Constraint-satisfaction inference for projective dependency parsing.
#[derive(Debug, Parser)]
#[command(name = "csidp", author, version, about)]
pub struct Cli {
    /// Maximum |dependent.ID - head.ID| considered when building the dep
    /// stream. `0` is treated the same as leaving this unset.
    #[arg(short = 'm', long = "max-dist")]
    pub max_dist: Option<usize>,

    /// Skip generating dep-stream instances for tokens whose FORM is
    /// Unicode punctuation-other (category Po).
    #[arg(short = 'x', long = "exclude-non-scoring")]
    pub exclude_non_scoring: bool,

    /// Classifier output for the dep (pairwise head/edge) stream.
    #[arg(long = "dep")]
    pub dep: PathBuf,

    /// Classifier output for the dir (outgoing direction) stream.
    #[arg(long = "dir")]
    pub dir: Option<PathBuf>,

    /// Classifier output for the mod (incoming relation) stream.
    #[arg(long = "mod")]
    pub modstream: Option<PathBuf>,

    /// Output file for the annotated sentences.
    #[arg(long = "out")]
    pub out: PathBuf,

    /// Run the non-projective hill-climb refiner after the chart parse.
    #[arg(long = "non-projective")]
    pub non_projective: bool,

    /// Input sentence files; reads stdin when empty.
    pub files: Vec<PathBuf>,
}
