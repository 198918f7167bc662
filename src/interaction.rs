//! Protein-protein interaction records of the primary evidence source
//!
//! The primary source is the STRING `protein.links.detailed` file:
//!
//! ```text
//! protein1 protein2 neighborhood fusion cooccurence coexpression experimental database textmining combined_score
//! 9606.ENSP00000000233 9606.ENSP00000003084 0 0 0 0 0 0 900 900
//! ```
//!
//! After fusion, every record is written back with one extra column per
//! auxiliary evidence source and the final score as the last column.
use std::fmt::Display;

use smallvec::SmallVec;

use crate::{InteractomeError, InteractomeResult, DEFAULT_NUM_SOURCES, MAX_SCORE};

/// Number of channel scores in the primary evidence file (without the combined score)
pub const NUM_CHANNELS: usize = 7;

/// Number of fields of a primary record: two proteins, the channels and the combined score
const NUM_FIELDS: usize = 2 + NUM_CHANNELS + 1;

/// Per-source scores of a [`FusedInteraction`]
pub type SourceScores = SmallVec<[f64; DEFAULT_NUM_SOURCES]>;

/// The individual evidence channels of a primary interaction record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Channel {
    /// Gene neighborhood
    Neighborhood,
    /// Gene fusion events
    Fusion,
    /// Phylogenetic co-occurrence
    Cooccurrence,
    /// Co-expression
    Coexpression,
    /// Experimental evidence
    Experimental,
    /// Curated databases
    Database,
    /// Text mining
    Textmining,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::Neighborhood => 0,
            Channel::Fusion => 1,
            Channel::Cooccurrence => 2,
            Channel::Coexpression => 3,
            Channel::Experimental => 4,
            Channel::Database => 5,
            Channel::Textmining => 6,
        }
    }
}

/// One row of the primary evidence file
///
/// The pair is unordered by identity: `(A, B)` describes the same
/// interaction as `(B, A)`. The record is immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRecord {
    protein_a: String,
    protein_b: String,
    channels: [f64; NUM_CHANNELS],
    combined_score: f64,
}

impl InteractionRecord {
    /// Creates a new record
    ///
    /// # Errors
    ///
    /// [`InteractomeError::MalformedRecord`] if any score is outside of `0..=1000`
    pub fn new(
        protein_a: &str,
        protein_b: &str,
        channels: [f64; NUM_CHANNELS],
        combined_score: f64,
    ) -> InteractomeResult<Self> {
        for score in channels.iter().chain(std::iter::once(&combined_score)) {
            if !(0.0..=MAX_SCORE).contains(score) {
                return Err(InteractomeError::MalformedRecord(format!(
                    "score {score} of {protein_a} {protein_b} is out of range"
                )));
            }
        }
        Ok(Self {
            protein_a: protein_a.to_string(),
            protein_b: protein_b.to_string(),
            channels,
            combined_score,
        })
    }

    /// The first protein of the pair
    pub fn protein_a(&self) -> &str {
        &self.protein_a
    }

    /// The second protein of the pair
    pub fn protein_b(&self) -> &str {
        &self.protein_b
    }

    /// The score of one evidence channel
    pub fn channel(&self, channel: Channel) -> f64 {
        self.channels[channel.index()]
    }

    /// The combined score of the primary source, scaled `0..=1000`
    pub fn combined_score(&self) -> f64 {
        self.combined_score
    }

    /// The combined score normalized to `0..=1`
    pub fn confidence(&self) -> f64 {
        self.combined_score / MAX_SCORE
    }
}

/// Parses one space-delimited line of the primary evidence file
///
/// Fields may be separated by one or more spaces. Additional trailing
/// fields are ignored.
impl TryFrom<&str> for InteractionRecord {
    type Error = InteractomeError;
    fn try_from(line: &str) -> InteractomeResult<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < NUM_FIELDS {
            return Err(InteractomeError::MalformedRecord(line.to_string()));
        }
        parse_fields(&fields[..NUM_FIELDS], line)
    }
}

fn parse_fields(fields: &[&str], line: &str) -> InteractomeResult<InteractionRecord> {
    let mut channels = [0f64; NUM_CHANNELS];
    for (score, field) in channels.iter_mut().zip(&fields[2..2 + NUM_CHANNELS]) {
        *score = parse_score(field, line)?;
    }
    let combined_score = parse_score(fields[2 + NUM_CHANNELS], line)?;
    InteractionRecord::new(fields[0], fields[1], channels, combined_score)
}

fn parse_score(field: &str, line: &str) -> InteractomeResult<f64> {
    match field.parse::<f64>() {
        Ok(score) if score.is_finite() => Ok(score),
        _ => Err(InteractomeError::MalformedRecord(line.to_string())),
    }
}

impl Display for InteractionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.protein_a, self.protein_b)?;
        for score in &self.channels {
            write!(f, " {score:.6}")?;
        }
        write!(f, " {:.6}", self.combined_score)
    }
}

/// An [`InteractionRecord`] with its fused reliability
///
/// Holds one score per auxiliary evidence source (either `0` or the
/// source's reliability weight, scaled to `0..=1000`) and the final,
/// fused score.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedInteraction {
    record: InteractionRecord,
    source_scores: SourceScores,
    final_score: f64,
}

impl FusedInteraction {
    pub(crate) fn new(record: InteractionRecord, source_scores: SourceScores, final_score: f64) -> Self {
        Self {
            record,
            source_scores,
            final_score,
        }
    }

    /// The underlying primary record
    pub fn record(&self) -> &InteractionRecord {
        &self.record
    }

    /// Scores of the auxiliary evidence sources, in the order of the sources
    pub fn source_scores(&self) -> &[f64] {
        &self.source_scores
    }

    /// The fused score, scaled `0..=1000`
    pub fn final_score(&self) -> f64 {
        self.final_score
    }

    /// Parses a line that was previously written from a [`FusedInteraction`]
    ///
    /// The number of evidence sources is derived from the number of fields.
    ///
    /// # Errors
    ///
    /// [`InteractomeError::MalformedRecord`] if the line has fewer than
    /// 11 fields or any score is not numeric
    pub fn from_line(line: &str) -> InteractomeResult<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() <= NUM_FIELDS {
            return Err(InteractomeError::MalformedRecord(line.to_string()));
        }
        let record = parse_fields(&fields[..NUM_FIELDS], line)?;
        let (final_field, source_fields) = fields[NUM_FIELDS..]
            .split_last()
            .ok_or_else(|| InteractomeError::MalformedRecord(line.to_string()))?;
        let source_scores = source_fields
            .iter()
            .map(|field| parse_score(field, line))
            .collect::<InteractomeResult<SourceScores>>()?;
        let final_score = parse_score(final_field, line)?;
        Ok(Self::new(record, source_scores, final_score))
    }
}

impl Display for FusedInteraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.record)?;
        for score in &self.source_scores {
            write!(f, " {score:.6}")?;
        }
        write!(f, " {:.6}", self.final_score)
    }
}
