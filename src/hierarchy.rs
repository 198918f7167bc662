//! Parent-child hierarchy of GO terms
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info};

use crate::parser;
use crate::{InteractomeError, InteractomeResult, TermGroup, TermId};

/// Relation types that make up the hierarchy
///
/// All other relation types of the GO relation files (e.g. `regulates`)
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The child is a subtype of the parent
    IsA,
    /// The child is a component of the parent
    PartOf,
}

impl TryFrom<&str> for Relation {
    type Error = InteractomeError;
    fn try_from(value: &str) -> InteractomeResult<Self> {
        match value {
            "is_a" => Ok(Relation::IsA),
            "part_of" => Ok(Relation::PartOf),
            _ => Err(InteractomeError::InvalidInput(format!(
                "unsupported relation {value}"
            ))),
        }
    }
}

/// Maps every GO term to its set of direct child terms
///
/// The hierarchy is expected to be a directed acyclic graph. A term can
/// have multiple parents and the hierarchy can be assembled from any
/// number of relation files (e.g. one per subontology); edges of the same
/// parent are merged into one set of children.
///
/// # Examples
///
/// ```
/// use interactome::{AnnotationHierarchy, TermId};
///
/// let mut hierarchy = AnnotationHierarchy::default();
/// hierarchy.add_edge(1u32, 2u32);
/// hierarchy.add_edge(1u32, 3u32);
/// hierarchy.add_edge(1u32, 2u32);
///
/// assert_eq!(hierarchy.children(&TermId::from(1u32)).len(), 2);
/// assert!(hierarchy.children(&TermId::from(2u32)).is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct AnnotationHierarchy {
    children: HashMap<TermId, TermGroup>,
    no_children: TermGroup,
}

impl AnnotationHierarchy {
    /// Builds the hierarchy from several relation files
    ///
    /// ```text
    /// GO:0000015 is_a GO:1902494
    /// GO:0000015 part_of GO:0005829
    /// ```
    ///
    /// # Errors
    ///
    /// - [`InteractomeError::CannotOpenFile`]: a file is not present or not readable
    /// - [`InteractomeError::MalformedRecord`]: a line has fewer than 3 fields
    ///   or an `is_a`/`part_of` line contains an invalid term
    pub fn from_files<P: AsRef<Path>>(files: &[P]) -> InteractomeResult<Self> {
        let mut hierarchy = Self::default();
        for file in files {
            let edges = hierarchy.add_relations(parser::open(file)?)?;
            debug!("{} edges read from {}", edges, file.as_ref().display());
        }
        info!(
            "Annotation network built: {} parent terms",
            hierarchy.children.len()
        );
        Ok(hierarchy)
    }

    /// Adds all hierarchical edges of one relation file, returns the number of parsed edges
    ///
    /// # Errors
    ///
    /// See [`AnnotationHierarchy::from_files`]
    pub fn add_relations<R: BufRead>(&mut self, reader: R) -> InteractomeResult<usize> {
        parser::relations::parse(reader, |parent, child| {
            self.add_edge(parent, child);
        })
    }

    /// Adds `child` to the children of `parent`
    ///
    /// Adding the same edge multiple times has no effect. Returns `true`
    /// if the edge is new.
    pub fn add_edge<I: Into<TermId>, J: Into<TermId>>(&mut self, parent: I, child: J) -> bool {
        match self.children.entry(parent.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().insert(child),
            Entry::Vacant(entry) => entry.insert(TermGroup::new()).insert(child),
        }
    }

    /// The direct children of `term`
    ///
    /// Returns an empty group for leaf terms and unknown terms.
    pub fn children(&self, term: &TermId) -> &TermGroup {
        self.children.get(term).unwrap_or(&self.no_children)
    }

    /// Iterates all terms that appear in the hierarchy, as parent or child
    ///
    /// A term with multiple parents is returned multiple times.
    pub fn terms(&self) -> impl Iterator<Item = TermId> + '_ {
        self.children
            .iter()
            .flat_map(|(parent, children)| std::iter::once(*parent).chain(children.iter()))
    }

    /// Returns the number of terms that have at least one child
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the hierarchy has no edges
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
