//! GO annotations of proteins
//!
//! Annotations are read from tab-delimited files with one protein-term
//! association per row:
//!
//! ```text
//! 9606    ENSP00000000233    ARF5    GO:0005737    Cytoplasm    ...    4
//! ```
//!
//! - Column 1: source / organism
//! - Column 2: protein ID, without the species prefix
//! - Column 3: protein name
//! - Column 4: GO term ID
//! - Last column: trust score
//!
//! This module contains the row parser and the row filters that reduce an
//! annotation file to the reliable annotations of proteins in the interactome.
//! All filters copy the selected rows unchanged.
use std::io::BufRead;
use std::path::Path;

use tracing::info;

use crate::network::ProteinIndex;
use crate::parser;
use crate::{InteractomeError, InteractomeResult, TermId};

mod subontology;
pub use subontology::{read_term_list, Subontologies, Subontology};

/// Minimum number of columns of an annotation row
const MIN_FIELDS: usize = 5;

/// One row of an annotation file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    source_id: String,
    protein_id: String,
    protein_name: String,
    term_id: TermId,
    trust_score: u32,
}

impl AnnotationRecord {
    /// The source (organism) of the annotation
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// The annotated protein
    pub fn protein_id(&self) -> &str {
        &self.protein_id
    }

    /// The name of the annotated protein (third column)
    pub fn protein_name(&self) -> &str {
        &self.protein_name
    }

    /// The annotating GO term
    pub fn term_id(&self) -> TermId {
        self.term_id
    }

    /// The trust score of the annotation
    pub fn trust_score(&self) -> u32 {
        self.trust_score
    }
}

impl TryFrom<&str> for AnnotationRecord {
    type Error = InteractomeError;
    fn try_from(line: &str) -> InteractomeResult<Self> {
        let cols: Vec<&str> = line.trim().split('\t').collect();
        if cols.len() < MIN_FIELDS {
            return Err(InteractomeError::MalformedRecord(line.to_string()));
        }
        let term_id = TermId::try_from(cols[3])
            .map_err(|_| InteractomeError::MalformedRecord(line.to_string()))?;
        let trust_score = cols[cols.len() - 1]
            .trim()
            .parse::<u32>()
            .map_err(|_| InteractomeError::MalformedRecord(line.to_string()))?;

        Ok(Self {
            source_id: cols[0].to_string(),
            protein_id: cols[1].to_string(),
            protein_name: cols[2].to_string(),
            term_id,
            trust_score,
        })
    }
}

/// Parses every row of an annotation file
///
/// # Errors
///
/// - [`InteractomeError::CannotOpenFile`]: file not present or not readable
/// - [`InteractomeError::MalformedRecord`]: a row cannot be parsed
pub fn read_annotation_file<P: AsRef<Path>>(path: P) -> InteractomeResult<Vec<AnnotationRecord>> {
    read_annotations(parser::open(path)?)
}

/// Parses every row of annotation data
///
/// # Errors
///
/// [`InteractomeError::MalformedRecord`]: a row cannot be parsed
pub fn read_annotations<R: BufRead>(reader: R) -> InteractomeResult<Vec<AnnotationRecord>> {
    parser::lines(reader)
        .map(|line| AnnotationRecord::try_from(line?.as_str()))
        .collect()
}

/// Keeps only annotations of proteins that are part of the interactome
///
/// The protein IDs of the annotation file lack the species prefix used in
/// the interaction file, `species_prefix` is prepended before the lookup.
///
/// # Errors
///
/// - [`InteractomeError::CannotOpenFile`]: an input is not present or not readable
/// - [`InteractomeError::CannotWriteFile`]: output cannot be written
/// - [`InteractomeError::MalformedRecord`]: a row of either input cannot be parsed
pub fn filter_by_interactome<P, Q, O>(
    annotations: P,
    interactions: Q,
    output: O,
    species_prefix: &str,
) -> InteractomeResult<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    O: AsRef<Path>,
{
    let proteins = ProteinIndex::from_file(interactions)?;
    let written = filter_by_proteins(parser::open(annotations)?, &proteins, &output, species_prefix)?;
    info!(
        "{} annotations of {} interactome proteins written to {}",
        written,
        proteins.len(),
        output.as_ref().display()
    );
    Ok(written)
}

fn filter_by_proteins<R: BufRead, P: AsRef<Path>>(
    reader: R,
    proteins: &ProteinIndex,
    output: P,
    species_prefix: &str,
) -> InteractomeResult<usize> {
    let mut key = String::new();
    parser::filter_lines(reader, output, |line| {
        let record = AnnotationRecord::try_from(line)?;
        key.clear();
        key.push_str(species_prefix);
        key.push_str(record.protein_id());
        Ok(proteins.contains(&key))
    })
}

/// Removes unreliable annotations
///
/// Keeps all rows with a trust score of at least `min_trust`.
///
/// # Errors
///
/// - [`InteractomeError::CannotOpenFile`]: input not present or not readable
/// - [`InteractomeError::CannotWriteFile`]: output cannot be written
/// - [`InteractomeError::MalformedRecord`]: a row cannot be parsed
pub fn filter_unreliable<P: AsRef<Path>, Q: AsRef<Path>>(
    annotations: P,
    output: Q,
    min_trust: u32,
) -> InteractomeResult<usize> {
    let written = filter_by_trust(parser::open(annotations)?, &output, min_trust)?;
    info!(
        "{written} annotations with trust >= {min_trust} written to {}",
        output.as_ref().display()
    );
    Ok(written)
}

fn filter_by_trust<R: BufRead, P: AsRef<Path>>(
    reader: R,
    output: P,
    min_trust: u32,
) -> InteractomeResult<usize> {
    parser::filter_lines(reader, output, |line| {
        Ok(AnnotationRecord::try_from(line)?.trust_score() >= min_trust)
    })
}
