//! Auxiliary evidence sources and their protein-pair indices
//!
//! Each auxiliary dataset (e.g. a yeast-two-hybrid screen) is reduced to the
//! set of unordered protein pairs it reports. The datasets use a different
//! protein naming convention than the primary source; the [`IdentifierMap`]
//! translates primary identifiers into that convention.
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::parser;
use crate::{InteractomeError, InteractomeResult};

/// An unordered pair of proteins
///
/// The pair is normalized on construction, so that `(A, B)` and `(B, A)`
/// are equal and hash identically.
///
/// # Examples
///
/// ```
/// use interactome::ProteinPair;
///
/// assert_eq!(ProteinPair::new("7157", "4193"), ProteinPair::new("4193", "7157"));
/// assert_eq!(ProteinPair::new("7157", "4193").to_string(), "4193 7157");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProteinPair {
    low: String,
    high: String,
}

impl ProteinPair {
    /// Creates a new, normalized pair
    pub fn new(a: &str, b: &str) -> Self {
        let (low, high) = ordered(a, b);
        Self {
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    /// The lexicographically smaller protein
    pub fn low(&self) -> &str {
        &self.low
    }

    /// The lexicographically larger protein
    pub fn high(&self) -> &str {
        &self.high
    }
}

/// Returns `(a, b)` sorted lexicographically
fn ordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Display for ProteinPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.low, self.high)
    }
}

/// Maps protein identifiers of the primary source to the naming convention
/// of the auxiliary sources (STRING protein ID to Entrez gene ID)
#[derive(Debug, Default, Clone)]
pub struct IdentifierMap {
    inner: HashMap<String, String>,
}

impl IdentifierMap {
    /// Reads the mapping file
    ///
    /// ```text
    /// entrez_gene_id  STRING_Locus_ID
    /// 1   9606.ENSP00000263100
    /// ```
    ///
    /// # Errors
    ///
    /// - [`InteractomeError::CannotOpenFile`]: file not present or not readable
    /// - [`InteractomeError::InvalidInput`]: file has no header
    /// - [`InteractomeError::MalformedRecord`]: a row has less than 2 columns
    ///   or a non-numerical Entrez ID
    pub fn from_file<P: AsRef<Path>>(path: P) -> InteractomeResult<Self> {
        let map = Self::from_reader(parser::open(path)?)?;
        info!("Identifier mappings read-in: {}", map.len());
        Ok(map)
    }

    /// Reads the mapping from any buffered reader, see [`IdentifierMap::from_file`]
    ///
    /// # Errors
    ///
    /// See [`IdentifierMap::from_file`]
    pub fn from_reader<R: BufRead>(reader: R) -> InteractomeResult<Self> {
        Ok(Self {
            inner: parser::id_mapping::parse(reader)?,
        })
    }

    /// Adds a single mapping
    pub fn insert(&mut self, from: &str, to: &str) {
        self.inner.insert(from.to_string(), to.to_string());
    }

    /// Returns the mapped identifier
    ///
    /// # Errors
    ///
    /// [`InteractomeError::MissingMapping`] if the identifier is not mapped
    pub fn get(&self, id: &str) -> InteractomeResult<&str> {
        self.inner
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| InteractomeError::MissingMapping(id.to_string()))
    }

    /// Returns the number of mapped identifiers
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the map contains no identifiers
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Configuration of one auxiliary evidence source
///
/// Every source is a tab-delimited file with a header line. The two
/// interacting proteins are found at source-specific column indices.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSource {
    /// Human readable name, e.g. `HI-II-14`
    pub name: String,
    /// Path of the source file
    pub path: PathBuf,
    /// 0-based column of the first protein
    pub column_a: usize,
    /// 0-based column of the second protein
    pub column_b: usize,
    /// Reliability of the source in `0..=1`
    pub weight: f64,
    /// Translate the identifiers through the [`IdentifierMap`]
    ///
    /// Set this if the source uses the naming convention of the primary source.
    pub translate_ids: bool,
}

impl EvidenceSource {
    /// Creates a new source configuration
    pub fn new<P: Into<PathBuf>>(
        name: &str,
        path: P,
        column_a: usize,
        column_b: usize,
        weight: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            column_a,
            column_b,
            weight,
            translate_ids: false,
        }
    }

    /// The four CCSB human interactome datasets of the reference deployment
    ///
    /// | Source | File | Columns | Weight |
    /// | --- | --- | --- | --- |
    /// | HI-II-14 | `HI-II-14.tsv` | 0, 2 | 0.95 |
    /// | Venkatesan-09 | `Venkatesan-09.tsv` | 0, 3 | 0.85 |
    /// | Yu-11 | `Yu-11.tsv` | 0, 2 | 0.85 |
    /// | Lit-BM-13 | `Lit-BM-13.tsv` | 0, 2 | 0.90 |
    pub fn reference_sources<P: AsRef<Path>>(folder: P) -> Vec<Self> {
        let folder = folder.as_ref();
        vec![
            Self::new("HI-II-14", folder.join("HI-II-14.tsv"), 0, 2, 0.95),
            Self::new("Venkatesan-09", folder.join("Venkatesan-09.tsv"), 0, 3, 0.85),
            Self::new("Yu-11", folder.join("Yu-11.tsv"), 0, 2, 0.85),
            Self::new("Lit-BM-13", folder.join("Lit-BM-13.tsv"), 0, 2, 0.90),
        ]
    }

    /// Parses a single row of the source and returns the interacting pair
    fn parse_line(&self, line: &str, ids: &IdentifierMap) -> InteractomeResult<ProteinPair> {
        let cols: Vec<&str> = line.trim().split('\t').collect();
        let (Some(a), Some(b)) = (cols.get(self.column_a), cols.get(self.column_b)) else {
            return Err(InteractomeError::MalformedRecord(line.to_string()));
        };
        if self.translate_ids {
            Ok(ProteinPair::new(ids.get(a)?, ids.get(b)?))
        } else {
            Ok(ProteinPair::new(a, b))
        }
    }
}

/// The protein pairs reported by one evidence source, along with the
/// reliability weight of the source
///
/// Built once per source and read-only afterwards.
#[derive(Debug, Clone)]
pub struct EvidenceSet {
    name: String,
    weight: f64,
    // smaller protein -> all larger partners
    pairs: HashMap<String, HashSet<String>>,
    len: usize,
}

impl EvidenceSet {
    /// Creates an empty set
    ///
    /// # Panics
    ///
    /// If the weight is not within `0..=1`
    pub fn new(name: &str, weight: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&weight),
            "reliability weight must be within 0..=1"
        );
        Self {
            name: name.to_string(),
            weight,
            pairs: HashMap::new(),
            len: 0,
        }
    }

    /// Builds the set from the source file
    ///
    /// # Errors
    ///
    /// - [`InteractomeError::CannotOpenFile`]: source file not present or not readable
    /// - [`InteractomeError::InvalidInput`]: file has no header or the
    ///   configured weight is outside of `0..=1`
    /// - [`InteractomeError::MalformedRecord`]: a row has fewer columns than configured
    /// - [`InteractomeError::MissingMapping`]: `translate_ids` is set and an
    ///   identifier is not mapped
    pub fn from_source(source: &EvidenceSource, ids: &IdentifierMap) -> InteractomeResult<Self> {
        let set = Self::from_reader(source, parser::open(&source.path)?, ids)?;
        info!("{} data read-in: {} pairs", set.name, set.len());
        Ok(set)
    }

    /// Builds the set from any buffered reader, see [`EvidenceSet::from_source`]
    ///
    /// # Errors
    ///
    /// See [`EvidenceSet::from_source`]
    pub fn from_reader<R: BufRead>(
        source: &EvidenceSource,
        mut reader: R,
        ids: &IdentifierMap,
    ) -> InteractomeResult<Self> {
        if !(0.0..=1.0).contains(&source.weight) {
            return Err(InteractomeError::InvalidInput(format!(
                "weight of {} must be within 0..=1",
                source.name
            )));
        }
        parser::remove_header(&mut reader)?;
        let mut set = Self::new(&source.name, source.weight);
        for line in parser::lines(reader) {
            let pair = source.parse_line(&line?, ids)?;
            if !set.insert(pair) {
                debug!("Duplicate pair in {}", source.name);
            }
        }
        Ok(set)
    }

    /// Adds a pair to the set, returns `false` if it was already present
    pub fn insert(&mut self, pair: ProteinPair) -> bool {
        let ProteinPair { low, high } = pair;
        let inserted = self.pairs.entry(low).or_default().insert(high);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Returns `true` if the source reports the pair, in any order
    pub fn contains(&self, a: &str, b: &str) -> bool {
        let (low, high) = ordered(a, b);
        self.pairs
            .get(low)
            .is_some_and(|partners| partners.contains(high))
    }

    /// The name of the source
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The reliability weight of the source
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The number of distinct pairs
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set contains no pairs
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HI14: &str = "Entrez Gene IDA\tSymbol A\tEntrez Gene IDB\tSymbol B\n\
        7157\tTP53\t4193\tMDM2\n\
        1\tA1BG\t2\tA2M\n\
        4193\tMDM2\t7157\tTP53\n";

    #[test]
    fn pair_is_unordered() {
        let pair = ProteinPair::new("B", "A");
        assert_eq!(pair.low(), "A");
        assert_eq!(pair.high(), "B");
        assert_eq!(pair, ProteinPair::new("A", "B"));
    }

    #[test]
    fn build_from_reader() {
        let source = EvidenceSource::new("HI-II-14", "unused", 0, 2, 0.95);
        let set = EvidenceSet::from_reader(&source, HI14.as_bytes(), &IdentifierMap::default())
            .expect("valid source");
        assert_eq!(set.len(), 2);
        assert_eq!(set.weight(), 0.95);
        assert!(set.contains("7157", "4193"));
        assert!(set.contains("4193", "7157"));
        assert!(set.contains("2", "1"));
        assert!(!set.contains("7157", "1"));
    }

    #[test]
    fn pairs_sharing_a_protein() {
        let mut set = EvidenceSet::new("Yu-11", 0.85);
        assert!(set.insert(ProteinPair::new("1", "3")));
        assert!(set.insert(ProteinPair::new("2", "1")));
        assert!(!set.insert(ProteinPair::new("3", "1")));
        assert_eq!(set.len(), 2);

        assert!(set.contains("1", "2"));
        assert!(set.contains("3", "1"));
        assert!(!set.contains("2", "3"));
        assert!(!set.contains("1", "1"));
        assert!(!set.contains("4", "1"));
        assert!(EvidenceSet::new("empty", 0.5).is_empty());
    }

    #[test]
    fn source_specific_columns() {
        let data = "a\tb\tc\td\nX\t-\t-\tY\n";
        let source = EvidenceSource::new("Venkatesan-09", "unused", 0, 3, 0.85);
        let set = EvidenceSet::from_reader(&source, data.as_bytes(), &IdentifierMap::default())
            .expect("valid source");
        assert!(set.contains("Y", "X"));
    }

    #[test]
    fn missing_column() {
        let data = "a\tb\tc\td\nX\t-\t-\n";
        let source = EvidenceSource::new("Venkatesan-09", "unused", 0, 3, 0.85);
        assert!(matches!(
            EvidenceSet::from_reader(&source, data.as_bytes(), &IdentifierMap::default()),
            Err(InteractomeError::MalformedRecord(_))
        ));
    }

    #[test]
    fn translated_ids() {
        let mut ids = IdentifierMap::default();
        ids.insert("9606.P1", "1");
        ids.insert("9606.P2", "2");

        let mut source = EvidenceSource::new("custom", "unused", 0, 1, 0.5);
        source.translate_ids = true;

        let set = EvidenceSet::from_reader(&source, "h\th\n9606.P2\t9606.P1\n".as_bytes(), &ids)
            .expect("valid source");
        assert!(set.contains("1", "2"));

        let err = EvidenceSet::from_reader(&source, "h\th\n9606.P2\t9606.P3\n".as_bytes(), &ids)
            .unwrap_err();
        assert!(matches!(err, InteractomeError::MissingMapping(id) if id == "9606.P3"));
    }

    #[test]
    fn invalid_weight() {
        let source = EvidenceSource::new("broken", "unused", 0, 1, 1.5);
        assert!(matches!(
            EvidenceSet::from_reader(&source, "h\n".as_bytes(), &IdentifierMap::default()),
            Err(InteractomeError::InvalidInput(_))
        ));
    }

    #[test]
    fn reference_sources() {
        let sources = EvidenceSource::reference_sources("data/ccsb");
        let weights: Vec<f64> = sources.iter().map(|s| s.weight).collect();
        assert_eq!(weights, vec![0.95, 0.85, 0.85, 0.90]);
        assert_eq!(sources[1].column_b, 3);
        assert_eq!(sources[3].path, Path::new("data/ccsb/Lit-BM-13.tsv"));
    }

    #[test]
    fn missing_mapping() {
        let ids = IdentifierMap::default();
        assert!(matches!(ids.get("9606.P1"), Err(InteractomeError::MissingMapping(_))));
    }
}
