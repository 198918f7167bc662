use std::fmt::Display;
use std::io::BufRead;
use std::path::Path;

use tracing::info;

use crate::annotations::AnnotationRecord;
use crate::parser;
use crate::term::TermSet;
use crate::{InteractomeResult, TermId};

/// The three disjoint branches of the Gene Ontology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subontology {
    /// Cellular component (CC)
    CellularComponent,
    /// Molecular function (MF)
    MolecularFunction,
    /// Biological process (BP)
    BiologicalProcess,
}

impl Subontology {
    /// All subontologies, in the order used for file sets
    pub const ALL: [Subontology; 3] = [
        Subontology::CellularComponent,
        Subontology::MolecularFunction,
        Subontology::BiologicalProcess,
    ];

    /// Two-letter abbreviation, e.g. `cc`
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Subontology::CellularComponent => "cc",
            Subontology::MolecularFunction => "mf",
            Subontology::BiologicalProcess => "bp",
        }
    }

    fn index(self) -> usize {
        match self {
            Subontology::CellularComponent => 0,
            Subontology::MolecularFunction => 1,
            Subontology::BiologicalProcess => 2,
        }
    }
}

impl Display for Subontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// The terms belonging to each [`Subontology`]
///
/// Used to split annotation files into one file per subontology.
#[derive(Debug, Default, Clone)]
pub struct Subontologies {
    terms: [TermSet; 3],
}

impl Subontologies {
    /// Reads three term lists, one term ID per line
    ///
    /// # Errors
    ///
    /// - [`crate::InteractomeError::CannotOpenFile`]: a file is not present or not readable
    /// - [`crate::InteractomeError::MalformedRecord`]: a line is not a valid term ID
    pub fn from_files<P: AsRef<Path>>(cc: P, mf: P, bp: P) -> InteractomeResult<Self> {
        let mut subontologies = Self::default();
        for (subontology, file) in Subontology::ALL.into_iter().zip([cc, mf, bp]) {
            let terms = read_term_list(file)?;
            info!("{} {} terms read-in", terms.len(), subontology);
            subontologies.terms[subontology.index()] = terms;
        }
        Ok(subontologies)
    }

    /// Adds a term to a subontology
    pub fn insert<I: Into<TermId>>(&mut self, subontology: Subontology, term: I) -> bool {
        self.terms[subontology.index()].insert(term.into())
    }

    /// The terms of a subontology
    pub fn terms(&self, subontology: Subontology) -> &TermSet {
        &self.terms[subontology.index()]
    }

    /// The subontologies a term belongs to
    pub fn classify(&self, term: &TermId) -> impl Iterator<Item = Subontology> + '_ {
        let term = *term;
        Subontology::ALL
            .into_iter()
            .filter(move |subontology| self.terms[subontology.index()].contains(&term))
    }

    /// Splits an annotation file into one file per subontology
    ///
    /// Every row is written to the output of each subontology that
    /// contains the row's term, unchanged. Returns the number of rows
    /// written per subontology, in the order of `outputs`.
    ///
    /// # Errors
    ///
    /// - [`crate::InteractomeError::CannotOpenFile`]: input not present or not readable
    /// - [`crate::InteractomeError::CannotWriteFile`]: an output cannot be written
    /// - [`crate::InteractomeError::MalformedRecord`]: a row cannot be parsed
    pub fn split<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        annotations: P,
        outputs: [Q; 3],
    ) -> InteractomeResult<[usize; 3]> {
        let counts = self.split_reader(parser::open(&annotations)?, outputs)?;
        info!(
            "{} split into cc: {}, mf: {}, bp: {}",
            annotations.as_ref().display(),
            counts[0],
            counts[1],
            counts[2]
        );
        Ok(counts)
    }

    fn split_reader<R: BufRead, Q: AsRef<Path>>(
        &self,
        reader: R,
        outputs: [Q; 3],
    ) -> InteractomeResult<[usize; 3]> {
        let [cc, mf, bp] = outputs;
        let mut writers = [parser::create(cc)?, parser::create(mf)?, parser::create(bp)?];
        for line in parser::lines(reader) {
            let line = line?;
            let record = AnnotationRecord::try_from(line.as_str())?;
            for subontology in self.classify(&record.term_id()) {
                writers[subontology.index()].write_line(&line)?;
            }
        }
        let [cc, mf, bp] = writers;
        Ok([cc.finish()?, mf.finish()?, bp.finish()?])
    }
}

/// Reads a list of terms, one term ID per line
///
/// # Errors
///
/// - [`crate::InteractomeError::CannotOpenFile`]: file not present or not readable
/// - [`crate::InteractomeError::MalformedRecord`]: a line is not a valid term ID
pub fn read_term_list<P: AsRef<Path>>(path: P) -> InteractomeResult<TermSet> {
    parse_term_list(parser::open(path)?)
}

pub(crate) fn parse_term_list<R: BufRead>(reader: R) -> InteractomeResult<TermSet> {
    parser::lines(reader)
        .map(|line| TermId::try_from(line?.trim()))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn id(s: &str) -> TermId {
        TermId::try_from(s).expect("valid term id")
    }

    fn subontologies() -> Subontologies {
        let mut sub = Subontologies::default();
        sub.insert(Subontology::CellularComponent, id("GO:0005737"));
        sub.insert(Subontology::MolecularFunction, id("GO:0003674"));
        sub.insert(Subontology::BiologicalProcess, id("GO:0008150"));
        // Some terms are listed in two subontologies
        sub.insert(Subontology::BiologicalProcess, id("GO:0005737"));
        sub
    }

    #[test]
    fn term_list() {
        let terms = parse_term_list("GO:0005737\n GO:0005829 \n\n".as_bytes()).expect("valid list");
        assert_eq!(terms.len(), 2);
        assert!(terms.contains(&id("GO:0005829")));
    }

    #[test]
    fn invalid_term_list() {
        assert!(parse_term_list("GO:0005737\ncytosol\n".as_bytes()).is_err());
    }

    #[test]
    fn classify() {
        let sub = subontologies();
        let classes: Vec<Subontology> = sub.classify(&id("GO:0005737")).collect();
        assert_eq!(
            classes,
            vec![Subontology::CellularComponent, Subontology::BiologicalProcess]
        );
        assert_eq!(sub.classify(&id("GO:0000001")).count(), 0);
    }

    #[test]
    fn split_rows() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = ["cc.tsv", "mf.tsv", "bp.tsv"].map(|name| dir.path().join(name));
        let data = "9606\tP1\tA\tGO:0005737\tx\t3\n\
            9606\tP1\tA\tGO:0003674\tx\t3\n\
            9606\tP2\tB\tGO:0000001\tx\t3\n";

        let counts = subontologies()
            .split_reader(data.as_bytes(), outputs.clone())
            .expect("valid annotations");
        assert_eq!(counts, [1, 1, 1]);

        let cc = std::fs::read_to_string(&outputs[0]).unwrap();
        assert_eq!(cc, "9606\tP1\tA\tGO:0005737\tx\t3\n");
        let bp = std::fs::read_to_string(&outputs[2]).unwrap();
        assert_eq!(bp, cc);
    }

    #[test]
    fn display() {
        assert_eq!(Subontology::MolecularFunction.to_string(), "mf");
    }
}
