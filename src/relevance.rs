//! Selection of informative (relevant) GO terms
//!
//! A term is relevant if it annotates at least `threshold` proteins,
//! counting the proteins of all its descendant terms as well, while none of
//! its direct children does. This keeps the most specific terms that are
//! still well supported and removes redundant annotations with more
//! general terms.
//!
//! # Rollup counts
//!
//! The rollup count of a term is the number of distinct proteins annotated
//! directly with the term **plus the sum** of the rollup counts of its
//! children. Proteins are not deduplicated across branches: a protein
//! annotated with a term and with two of its children is counted three
//! times. This is intended and changes the effective meaning of the
//! threshold compared to a set union.
//!
//! # Examples
//!
//! ```
//! use interactome::{AnnotationHierarchy, DirectAnnotations, TermId};
//! use interactome::relevance::RelevanceEngine;
//!
//! let parent = TermId::from(1u32);
//! let child = TermId::from(2u32);
//!
//! let mut hierarchy = AnnotationHierarchy::default();
//! hierarchy.add_edge(parent, child);
//!
//! let mut direct = DirectAnnotations::default();
//! for protein in 0..20 {
//!     direct.insert(parent, &format!("P{protein}"));
//!     direct.insert(child, &format!("P{protein}"));
//! }
//!
//! let engine = RelevanceEngine::new(&direct, &hierarchy).unwrap().with_threshold(30);
//! assert_eq!(engine.counts().get(&parent), Some(40));
//! assert!(engine.is_relevant(&parent));
//! assert!(!engine.is_relevant(&child));
//! ```
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info};

use crate::annotations::AnnotationRecord;
use crate::parser;
use crate::term::TermSet;
use crate::{
    AnnotationHierarchy, InteractomeError, InteractomeResult, TermId, DEFAULT_ANNOTATION_THRESHOLD,
};

/// A set of protein IDs
pub type Proteins = HashSet<String>;

/// The proteins annotated by every term, ignoring the hierarchy
#[derive(Debug, Default, Clone)]
pub struct DirectAnnotations {
    inner: HashMap<TermId, Proteins>,
}

impl DirectAnnotations {
    /// Groups the proteins of all annotation rows by their exact term
    ///
    /// # Errors
    ///
    /// - [`InteractomeError::CannotOpenFile`]: file not present or not readable
    /// - [`InteractomeError::MalformedRecord`]: a row cannot be parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> InteractomeResult<Self> {
        let direct = Self::from_reader(parser::open(path)?)?;
        info!("Proteins per term found for {} terms", direct.len());
        Ok(direct)
    }

    /// Groups the proteins of all annotation rows, see [`DirectAnnotations::from_file`]
    ///
    /// # Errors
    ///
    /// See [`DirectAnnotations::from_file`]
    pub fn from_reader<R: BufRead>(reader: R) -> InteractomeResult<Self> {
        let mut direct = Self::default();
        for line in parser::lines(reader) {
            let record = AnnotationRecord::try_from(line?.as_str())?;
            direct.insert(record.term_id(), record.protein_id());
        }
        Ok(direct)
    }

    /// Adds a protein to a term, returns `false` if the term already annotated it
    pub fn insert<I: Into<TermId>>(&mut self, term: I, protein: &str) -> bool {
        let proteins = self.inner.entry(term.into()).or_default();
        if proteins.contains(protein) {
            return false;
        }
        proteins.insert(protein.to_string())
    }

    /// The proteins directly annotated by `term`
    pub fn proteins(&self, term: &TermId) -> Option<&Proteins> {
        self.inner.get(term)
    }

    /// The number of proteins directly annotated by `term`
    pub fn count(&self, term: &TermId) -> usize {
        self.inner.get(term).map_or(0, HashSet::len)
    }

    /// Iterates all terms with at least one annotation
    pub fn terms(&self) -> impl Iterator<Item = TermId> + '_ {
        self.inner.keys().copied()
    }

    /// The number of annotating terms
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no annotations
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<'a> FromIterator<&'a AnnotationRecord> for DirectAnnotations {
    fn from_iter<T: IntoIterator<Item = &'a AnnotationRecord>>(iter: T) -> Self {
        let mut direct = DirectAnnotations::default();
        for record in iter {
            direct.insert(record.term_id(), record.protein_id());
        }
        direct
    }
}

/// Groups proteins by the exact term that annotates them
pub fn count_direct<'a, I: IntoIterator<Item = &'a AnnotationRecord>>(
    records: I,
) -> DirectAnnotations {
    records.into_iter().collect()
}

enum Visit {
    Enter(TermId),
    Exit(TermId),
}

/// Returns the rollup count of `term`
///
/// The count is the number of proteins directly annotated by `term` plus
/// the sum of the rollup counts of all its children (see the
/// [module documentation](self) for the double-counting semantics).
/// Terms without direct annotations contribute `0` themselves, but still
/// add the counts of their children.
///
/// The result of every visited term is stored in `memo`, so shared
/// descendants are only counted once per call and subsequent calls with
/// the same `memo` reuse all previous results.
///
/// The hierarchy is traversed with an explicit stack, so deep hierarchies
/// do not exhaust the call stack.
///
/// # Errors
///
/// [`InteractomeError::CyclicHierarchy`] if a term is reached again while
/// its own descendants are still being counted
pub fn rollup(
    term: TermId,
    direct: &DirectAnnotations,
    hierarchy: &AnnotationHierarchy,
    memo: &mut HashMap<TermId, usize>,
) -> InteractomeResult<usize> {
    if let Some(count) = memo.get(&term) {
        return Ok(*count);
    }

    let mut in_progress: HashSet<TermId> = HashSet::new();
    let mut stack = vec![Visit::Enter(term)];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(current) => {
                if memo.contains_key(&current) {
                    continue;
                }
                if !in_progress.insert(current) {
                    return Err(InteractomeError::CyclicHierarchy(current));
                }
                stack.push(Visit::Exit(current));
                for child in hierarchy.children(&current) {
                    if in_progress.contains(&child) {
                        return Err(InteractomeError::CyclicHierarchy(child));
                    }
                    if !memo.contains_key(&child) {
                        stack.push(Visit::Enter(child));
                    }
                }
            }
            Visit::Exit(current) => {
                let mut count = direct.count(&current);
                for child in hierarchy.children(&current) {
                    count += memo.get(&child).copied().unwrap_or_default();
                }
                in_progress.remove(&current);
                memo.insert(current, count);
            }
        }
    }

    Ok(memo.get(&term).copied().unwrap_or_default())
}

/// The rollup counts of all annotated terms
///
/// Terms that neither annotate a protein directly nor through any
/// descendant have no count.
#[derive(Debug, Default, Clone)]
pub struct RollupCounts {
    counts: HashMap<TermId, usize>,
}

impl RollupCounts {
    /// Calculates the rollup count of every term of `direct` and `hierarchy`
    ///
    /// # Errors
    ///
    /// [`InteractomeError::CyclicHierarchy`] if the hierarchy contains a cycle
    /// that is reachable from any term
    pub fn compute(
        direct: &DirectAnnotations,
        hierarchy: &AnnotationHierarchy,
    ) -> InteractomeResult<Self> {
        let mut memo: HashMap<TermId, usize> = HashMap::with_capacity(direct.len());
        for term in direct.terms().chain(hierarchy.terms()) {
            rollup(term, direct, hierarchy, &mut memo)?;
        }
        memo.retain(|_, count| *count > 0);
        debug!("Rollup counts for {} terms", memo.len());
        Ok(Self { counts: memo })
    }

    /// The rollup count of `term`, if the term annotates any protein
    pub fn get(&self, term: &TermId) -> Option<usize> {
        self.counts.get(term).copied()
    }

    /// Iterates all terms with a rollup count
    pub fn terms(&self) -> impl Iterator<Item = TermId> + '_ {
        self.counts.keys().copied()
    }

    /// The number of terms with a rollup count
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if no term annotates a protein
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Classifies terms as relevant or irrelevant
#[derive(Debug)]
pub struct RelevanceEngine<'a> {
    hierarchy: &'a AnnotationHierarchy,
    counts: RollupCounts,
    threshold: usize,
}

impl<'a> RelevanceEngine<'a> {
    /// Calculates all rollup counts, using the default threshold of
    /// [`DEFAULT_ANNOTATION_THRESHOLD`]
    ///
    /// # Errors
    ///
    /// [`InteractomeError::CyclicHierarchy`] if the hierarchy contains a cycle
    pub fn new(
        direct: &DirectAnnotations,
        hierarchy: &'a AnnotationHierarchy,
    ) -> InteractomeResult<Self> {
        Ok(Self {
            hierarchy,
            counts: RollupCounts::compute(direct, hierarchy)?,
            threshold: DEFAULT_ANNOTATION_THRESHOLD,
        })
    }

    /// Sets the minimum rollup count of relevant terms
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// The minimum rollup count of relevant terms
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The rollup counts of all terms
    pub fn counts(&self) -> &RollupCounts {
        &self.counts
    }

    /// Returns `true` if `term` is relevant
    ///
    /// The term must have a rollup count of at least the threshold, while
    /// all direct children with a rollup count stay below it. Children
    /// without a count do not disqualify the term. Grandchildren are not
    /// checked.
    pub fn is_relevant(&self, term: &TermId) -> bool {
        match self.counts.get(term) {
            Some(count) if count >= self.threshold => self
                .hierarchy
                .children(term)
                .iter()
                .filter_map(|child| self.counts.get(&child))
                .all(|count| count < self.threshold),
            _ => false,
        }
    }

    /// All relevant terms, in ascending order
    pub fn relevant_terms(&self) -> Vec<TermId> {
        let mut terms: Vec<TermId> = self
            .counts
            .terms()
            .filter(|term| self.is_relevant(term))
            .collect();
        terms.sort_unstable();
        terms
    }

    /// Writes all relevant terms to `path`, one term per line
    ///
    /// # Errors
    ///
    /// [`InteractomeError::CannotWriteFile`] if the file cannot be written
    pub fn write_relevant_terms<P: AsRef<Path>>(&self, path: P) -> InteractomeResult<usize> {
        let mut writer = parser::create(&path)?;
        for term in self.relevant_terms() {
            writer.write_line(term)?;
        }
        let written = writer.finish()?;
        info!(
            "{} relevant terms (threshold {}) written to {}",
            written,
            self.threshold,
            path.as_ref().display()
        );
        Ok(written)
    }
}

/// Removes all annotations with irrelevant terms
///
/// Rows are copied unchanged and in their original order.
///
/// # Errors
///
/// - [`InteractomeError::CannotOpenFile`]: input not present or not readable
/// - [`InteractomeError::CannotWriteFile`]: output cannot be written
/// - [`InteractomeError::MalformedRecord`]: a row cannot be parsed
pub fn clean_annotation_file<P: AsRef<Path>, Q: AsRef<Path>>(
    annotations: P,
    relevant: &TermSet,
    output: Q,
) -> InteractomeResult<usize> {
    let written = clean_annotations(parser::open(&annotations)?, relevant, &output)?;
    info!(
        "{} cleaned: {} relevant annotations",
        annotations.as_ref().display(),
        written
    );
    Ok(written)
}

fn clean_annotations<R: BufRead, P: AsRef<Path>>(
    reader: R,
    relevant: &TermSet,
    output: P,
) -> InteractomeResult<usize> {
    parser::filter_lines(reader, output, |line| {
        Ok(relevant.contains(&AnnotationRecord::try_from(line)?.term_id()))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn annotate(direct: &mut DirectAnnotations, term: u32, proteins: std::ops::Range<u32>) {
        for protein in proteins {
            direct.insert(term, &format!("P{protein}"));
        }
    }

    #[test]
    fn count_direct_groups_by_term() {
        let data = "9606\tP1\tA\tGO:0000001\tx\t3\n\
            9606\tP2\tB\tGO:0000001\tx\t3\n\
            9606\tP1\tA\tGO:0000001\tx\t5\n\
            9606\tP1\tA\tGO:0000002\tx\t3\n";
        let records = crate::annotations::read_annotations(data.as_bytes()).unwrap();
        let direct = count_direct(&records);
        assert_eq!(direct.len(), 2);
        assert_eq!(direct.count(&1u32.into()), 2);
        assert_eq!(direct.count(&2u32.into()), 1);
        assert_eq!(direct.count(&3u32.into()), 0);

        let streamed = DirectAnnotations::from_reader(data.as_bytes()).unwrap();
        assert_eq!(streamed.proteins(&1u32.into()), direct.proteins(&1u32.into()));
    }

    #[test]
    fn leaf_rollup_is_direct_count() {
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 1, 0..7);
        let hierarchy = AnnotationHierarchy::default();
        let mut memo = HashMap::new();
        assert_eq!(rollup(1u32.into(), &direct, &hierarchy, &mut memo).unwrap(), 7);
    }

    #[test]
    fn rollup_sums_children() {
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 1, 0..5);
        annotate(&mut direct, 2, 10..13);
        annotate(&mut direct, 3, 20..24);
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 2u32);
        hierarchy.add_edge(1u32, 3u32);

        let mut memo = HashMap::new();
        assert_eq!(rollup(1u32.into(), &direct, &hierarchy, &mut memo).unwrap(), 5 + 3 + 4);
    }

    #[test]
    fn rollup_counts_shared_proteins_multiple_times() {
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 1, 0..5);
        annotate(&mut direct, 2, 0..5);
        annotate(&mut direct, 3, 0..5);
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 2u32);
        hierarchy.add_edge(1u32, 3u32);

        let mut memo = HashMap::new();
        assert_eq!(rollup(1u32.into(), &direct, &hierarchy, &mut memo).unwrap(), 15);
    }

    #[test]
    fn rollup_through_unannotated_term() {
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 3, 0..4);
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 2u32);
        hierarchy.add_edge(2u32, 3u32);

        let mut memo = HashMap::new();
        assert_eq!(rollup(1u32.into(), &direct, &hierarchy, &mut memo).unwrap(), 4);
        assert_eq!(memo.get(&2u32.into()), Some(&4));
    }

    #[test]
    fn rollup_of_dag_with_shared_descendant() {
        // 1 -> 2 -> 4, 1 -> 3 -> 4
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 4, 0..10);
        annotate(&mut direct, 2, 10..11);
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 2u32);
        hierarchy.add_edge(1u32, 3u32);
        hierarchy.add_edge(2u32, 4u32);
        hierarchy.add_edge(3u32, 4u32);

        let mut memo = HashMap::new();
        assert_eq!(rollup(1u32.into(), &direct, &hierarchy, &mut memo).unwrap(), 11 + 10);
        assert_eq!(memo.get(&4u32.into()), Some(&10));
        assert_eq!(memo.get(&3u32.into()), Some(&10));
    }

    #[test]
    fn cycle_is_detected() {
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 1, 0..3);
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 2u32);
        hierarchy.add_edge(2u32, 3u32);
        hierarchy.add_edge(3u32, 1u32);

        let mut memo = HashMap::new();
        assert!(matches!(
            rollup(1u32.into(), &direct, &hierarchy, &mut memo),
            Err(InteractomeError::CyclicHierarchy(_))
        ));
        assert!(RollupCounts::compute(&direct, &hierarchy).is_err());
    }

    #[test]
    fn self_loop_is_detected() {
        let direct = DirectAnnotations::default();
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 1u32);
        assert!(RollupCounts::compute(&direct, &hierarchy).is_err());
    }

    #[test]
    fn unannotated_terms_have_no_count() {
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 2, 0..3);
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 2u32);
        hierarchy.add_edge(5u32, 6u32);

        let counts = RollupCounts::compute(&direct, &hierarchy).unwrap();
        assert_eq!(counts.get(&1u32.into()), Some(3));
        assert_eq!(counts.get(&2u32.into()), Some(3));
        assert_eq!(counts.get(&5u32.into()), None);
        assert_eq!(counts.get(&6u32.into()), None);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn dominant_child_makes_parent_irrelevant() {
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 1, 0..40);
        annotate(&mut direct, 2, 100..135);
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 2u32);

        let engine = RelevanceEngine::new(&direct, &hierarchy).unwrap();
        assert_eq!(engine.threshold(), 30);
        assert_eq!(engine.counts().get(&2u32.into()), Some(35));
        assert!(!engine.is_relevant(&1u32.into()));
        assert!(engine.is_relevant(&2u32.into()));
    }

    #[test]
    fn weak_child_keeps_parent_relevant() {
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 1, 0..40);
        annotate(&mut direct, 2, 100..110);
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 2u32);

        let engine = RelevanceEngine::new(&direct, &hierarchy).unwrap();
        assert!(engine.is_relevant(&1u32.into()));
        assert!(!engine.is_relevant(&2u32.into()));
        assert_eq!(engine.relevant_terms(), vec![TermId::from(1u32)]);
    }

    #[test]
    fn only_direct_children_are_checked() {
        // 1 -> 2 -> 3, only 3 passes on its own, but 2 passes through 3
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 3, 0..30);
        let mut hierarchy = AnnotationHierarchy::default();
        hierarchy.add_edge(1u32, 2u32);
        hierarchy.add_edge(2u32, 3u32);

        let engine = RelevanceEngine::new(&direct, &hierarchy).unwrap();
        assert!(engine.is_relevant(&3u32.into()));
        assert!(!engine.is_relevant(&2u32.into()));
        assert!(!engine.is_relevant(&1u32.into()));
    }

    #[test]
    fn unknown_term_is_not_relevant() {
        let direct = DirectAnnotations::default();
        let hierarchy = AnnotationHierarchy::default();
        let engine = RelevanceEngine::new(&direct, &hierarchy).unwrap();
        assert!(!engine.is_relevant(&1u32.into()));
        assert!(engine.relevant_terms().is_empty());
    }

    #[test]
    fn clean_keeps_relevant_rows() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("clean.tsv");
        let data = "9606\tP1\tA\tGO:0000001\tx\t3\n\
            9606\tP1\tA\tGO:0000002\tx\t3\n\
            9606\tP2\tB\tGO:0000001\tx\t4\n";
        let relevant: TermSet = [TermId::from(1u32)].into_iter().collect();
        assert_eq!(clean_annotations(data.as_bytes(), &relevant, &output).unwrap(), 2);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "9606\tP1\tA\tGO:0000001\tx\t3\n9606\tP2\tB\tGO:0000001\tx\t4\n"
        );
    }

    #[test]
    fn relevant_terms_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("relevant-terms");
        let mut direct = DirectAnnotations::default();
        annotate(&mut direct, 20, 0..3);
        annotate(&mut direct, 10, 0..3);
        let hierarchy = AnnotationHierarchy::default();
        let engine = RelevanceEngine::new(&direct, &hierarchy).unwrap().with_threshold(2);
        assert_eq!(engine.write_relevant_terms(&output).unwrap(), 2);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "GO:0000010\nGO:0000020\n"
        );
        let terms = crate::annotations::read_term_list(&output).unwrap();
        assert_eq!(terms.len(), 2);
    }
}
