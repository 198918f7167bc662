//! Noisy-OR fusion of independent interaction evidence
//!
//! Every evidence source, including the primary source itself, is treated
//! as an independent channel that supports an interaction. The fused
//! reliability is the probability that at least one channel is right:
//!
//! ```text
//! final = (1 - (1 - p0) * Π (1 - s_i)) * 1000
//! ```
//!
//! where `p0` is the normalized combined score of the primary record and
//! `s_i` is the weight of source `i` if the source reports the pair and
//! `0` otherwise.
use std::io::BufRead;
use std::path::Path;

use tracing::info;

use crate::interaction::SourceScores;
use crate::parser;
use crate::{
    EvidenceSet, FusedInteraction, IdentifierMap, InteractionRecord, InteractomeResult, MAX_SCORE,
};

/// Combines the evidence for one interaction record
///
/// `mapped_a` and `mapped_b` are the identifiers of the two proteins in the
/// naming convention of the evidence sources. The pair is looked up
/// unordered, so it does not matter in which order a source lists it.
///
/// The result is bounded by `0..=1000`, is monotonic in every source weight
/// and in the primary score and equals the primary combined score if no
/// source reports the pair.
///
/// # Examples
///
/// ```
/// use interactome::{fusion, EvidenceSet, InteractionRecord};
///
/// let record = InteractionRecord::try_from("P1 P2 0 0 0 0 0 0 0 500").unwrap();
/// let empty = EvidenceSet::new("empty", 0.95);
///
/// let fused = fusion::fuse(&record, "1", "2", &[empty]);
/// assert_eq!(fused.final_score(), 500.0);
/// assert_eq!(fused.source_scores(), &[0.0]);
/// ```
pub fn fuse(
    record: &InteractionRecord,
    mapped_a: &str,
    mapped_b: &str,
    sources: &[EvidenceSet],
) -> FusedInteraction {
    let mut source_scores = SourceScores::with_capacity(sources.len());
    let mut unsupported = 1.0;
    for source in sources {
        let score = if source.contains(mapped_a, mapped_b) {
            source.weight()
        } else {
            0.0
        };
        unsupported *= 1.0 - score;
        source_scores.push(score * MAX_SCORE);
    }
    // Equals the combined score exactly if no source supports the pair
    let final_score = (MAX_SCORE - (MAX_SCORE - record.combined_score()) * unsupported)
        .clamp(0.0, MAX_SCORE);
    FusedInteraction::new(record.clone(), source_scores, final_score)
}

/// All fused interactions of one run, in the order of the primary source
#[derive(Debug, Default, Clone)]
pub struct FusedInteractions {
    inner: Vec<FusedInteraction>,
}

impl FusedInteractions {
    /// Fuses every primary record with the evidence sources
    ///
    /// # Errors
    ///
    /// [`crate::InteractomeError::MissingMapping`] if a protein of any record
    /// is not present in the [`IdentifierMap`]
    pub fn build(
        records: &[InteractionRecord],
        ids: &IdentifierMap,
        sources: &[EvidenceSet],
    ) -> InteractomeResult<Self> {
        let inner = records
            .iter()
            .map(|record| {
                let mapped_a = ids.get(record.protein_a())?;
                let mapped_b = ids.get(record.protein_b())?;
                Ok(fuse(record, mapped_a, mapped_b, sources))
            })
            .collect::<InteractomeResult<Vec<FusedInteraction>>>()?;
        info!("Combined data built: {} interactions", inner.len());
        Ok(Self { inner })
    }

    /// Returns the number of interactions
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no interactions
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates all interactions
    pub fn iter(&self) -> std::slice::Iter<'_, FusedInteraction> {
        self.inner.iter()
    }

    /// Iterates the interactions with a final score of at least `min_score`,
    /// preserving their relative order
    pub fn above(&self, min_score: f64) -> impl Iterator<Item = &FusedInteraction> {
        self.inner
            .iter()
            .filter(move |interaction| interaction.final_score() >= min_score)
    }

    /// Writes all interactions to `path`
    ///
    /// # Errors
    ///
    /// [`crate::InteractomeError::CannotWriteFile`] if the file cannot be written
    pub fn write<P: AsRef<Path>>(&self, path: P) -> InteractomeResult<usize> {
        self.write_by_score(path, 0.0)
    }

    /// Writes the interactions with a final score of at least `min_score` to `path`
    ///
    /// # Errors
    ///
    /// [`crate::InteractomeError::CannotWriteFile`] if the file cannot be written
    pub fn write_by_score<P: AsRef<Path>>(&self, path: P, min_score: f64) -> InteractomeResult<usize> {
        let filename = path.as_ref().display().to_string();
        let mut writer = parser::create(path)?;
        for interaction in self.above(min_score) {
            writer.write_line(interaction)?;
        }
        let written = writer.finish()?;
        info!("Minimum score {min_score} output finished: {written} interactions to {filename}");
        Ok(written)
    }
}

impl<'a> IntoIterator for &'a FusedInteractions {
    type Item = &'a FusedInteraction;
    type IntoIter = std::slice::Iter<'a, FusedInteraction>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

/// Filters an already fused interaction file by final score
///
/// Rows are copied unchanged and in their original order, so filtering
/// an output file again with the same threshold reproduces it exactly.
///
/// # Errors
///
/// - [`crate::InteractomeError::CannotOpenFile`]: input not present or not readable
/// - [`crate::InteractomeError::CannotWriteFile`]: output cannot be written
/// - [`crate::InteractomeError::MalformedRecord`]: a row is not a fused interaction
pub fn filter_fused_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    min_score: f64,
) -> InteractomeResult<usize> {
    filter_fused(parser::open(input)?, output, min_score)
}

fn filter_fused<R: BufRead, P: AsRef<Path>>(
    reader: R,
    output: P,
    min_score: f64,
) -> InteractomeResult<usize> {
    parser::filter_lines(reader, output, |line| {
        Ok(FusedInteraction::from_line(line)?.final_score() >= min_score)
    })
}
