//! `interactome` fuses protein-protein interaction evidence from several
//! independent datasets into one reliability score per protein pair and
//! reduces Gene Ontology (GO) annotations to the informative terms.
//!
//! The crate has two computational cores:
//!
//! - **Evidence fusion** ([`fusion`]): every primary interaction record is
//!   checked against a set of auxiliary [`EvidenceSet`]s and the individual
//!   confidences are combined with a noisy-OR rule.
//! - **Term relevance** ([`relevance`]): GO terms are arranged in an
//!   [`AnnotationHierarchy`], protein counts are rolled up from the leaves
//!   and a term is kept only if it is well supported while none of its
//!   direct children is.
//!
//! Everything else (reading and writing tab- or space-delimited files,
//! splitting annotation files, the whole run) lives in [`annotations`],
//! [`network`] and [`pipeline`].
//!
//! # Examples
//!
//! ```
//! use interactome::{fusion, EvidenceSet, InteractionRecord, ProteinPair};
//!
//! let record = InteractionRecord::try_from(
//!     "9606.P1 9606.P2 0 0 0 0 0 0 0 500"
//! ).unwrap();
//!
//! let mut hi14 = EvidenceSet::new("HI-II-14", 0.9);
//! hi14.insert(ProteinPair::new("2", "1"));
//!
//! let fused = fusion::fuse(&record, "1", "2", &[hi14]);
//! assert!((fused.final_score() - 950.0).abs() < 1e-9);
//! ```
use thiserror::Error;

pub mod annotations;
pub mod evidence;
pub mod fusion;
pub mod hierarchy;
pub mod interaction;
pub mod network;
mod parser;
pub mod pipeline;
pub mod relevance;
pub mod term;

pub use annotations::{AnnotationRecord, Subontologies, Subontology};
pub use evidence::{EvidenceSet, EvidenceSource, IdentifierMap, ProteinPair};
pub use fusion::FusedInteractions;
pub use hierarchy::AnnotationHierarchy;
pub use interaction::{FusedInteraction, InteractionRecord};
pub use network::ProteinIndex;
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use relevance::{DirectAnnotations, RollupCounts};
pub use term::{TermGroup, TermId};

/// Minimum rollup count of a term to be considered informative
pub const DEFAULT_ANNOTATION_THRESHOLD: usize = 30;
/// Minimum trust score of an annotation row to be considered reliable
pub const DEFAULT_TRUST_THRESHOLD: u32 = 3;
/// Final score cut-offs (out of 1000) used to write filtered interaction files
pub const DEFAULT_SCORE_THRESHOLDS: [u32; 2] = [700, 900];
/// Prefix of STRING protein identifiers for human proteins
pub const DEFAULT_SPECIES_PREFIX: &str = "9606.";

/// Upper bound of all interaction scores
pub const MAX_SCORE: f64 = 1000.0;

const DEFAULT_NUM_SOURCES: usize = 4;
const DEFAULT_NUM_CHILDREN: usize = 8;

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InteractomeError {
    /// A line has too few fields or a field cannot be parsed
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    /// A protein is not present in the [`IdentifierMap`]
    #[error("no identifier mapping for protein {0}")]
    MissingMapping(String),
    /// Failed to open a file for reading
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// Failed to create or write an output file
    #[error("cannot write file {0}")]
    CannotWriteFile(String),
    /// The input data is structurally invalid
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The term hierarchy contains a cycle through the given term
    #[error("cyclic term hierarchy at {0}")]
    CyclicHierarchy(TermId),
}

/// Shortcut for `Result<T, InteractomeError>`
pub type InteractomeResult<T> = Result<T, InteractomeError>;
