//! Gene Ontology terms and groups of terms
use std::collections::HashSet;

mod group;
mod termid;

pub use group::{TermGroup, TermIds};
pub use termid::TermId;

/// An unordered set of terms, e.g. all terms of one subontology
pub type TermSet = HashSet<TermId>;
