//! Proteins of an interaction network
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::parser;
use crate::{InteractomeError, InteractomeResult};

/// Assigns a dense, numerical ID to every protein of an interaction file
///
/// IDs are given in the order in which the proteins first appear, first
/// column before second column. The index is used as the node set of the
/// interaction graph and to check which proteins are part of the interactome.
#[derive(Debug, Default, Clone)]
pub struct ProteinIndex {
    ids: HashMap<String, usize>,
}

impl ProteinIndex {
    /// Reads all proteins of a space-delimited interaction file without header
    ///
    /// Only the first two columns of every row are considered.
    ///
    /// # Errors
    ///
    /// - [`InteractomeError::CannotOpenFile`]: file not present or not readable
    /// - [`InteractomeError::MalformedRecord`]: a row has fewer than two columns
    pub fn from_file<P: AsRef<Path>>(path: P) -> InteractomeResult<Self> {
        let filename = path.as_ref().display().to_string();
        let index = Self::from_reader(parser::open(path)?)?;
        debug!("{} proteins in {}", index.len(), filename);
        Ok(index)
    }

    /// Reads all proteins from any buffered reader, see [`ProteinIndex::from_file`]
    ///
    /// # Errors
    ///
    /// [`InteractomeError::MalformedRecord`]: a row has fewer than two columns
    pub fn from_reader<R: BufRead>(reader: R) -> InteractomeResult<Self> {
        let mut index = Self::default();
        for line in parser::lines(reader) {
            let line = line?;
            let mut cols = line.split_whitespace();
            let (Some(a), Some(b)) = (cols.next(), cols.next()) else {
                return Err(InteractomeError::MalformedRecord(line.clone()));
            };
            index.insert(a);
            index.insert(b);
        }
        Ok(index)
    }

    /// Adds a protein and returns its ID
    ///
    /// If the protein is already present, the existing ID is returned.
    pub fn insert(&mut self, protein: &str) -> usize {
        let next = self.ids.len();
        match self.ids.entry(protein.to_string()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => *entry.insert(next),
        }
    }

    /// Returns the ID of a protein
    pub fn get(&self, protein: &str) -> Option<usize> {
        self.ids.get(protein).copied()
    }

    /// Returns `true` if the protein is part of the network
    pub fn contains(&self, protein: &str) -> bool {
        self.ids.contains_key(protein)
    }

    /// Returns the number of proteins
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if there are no proteins
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
