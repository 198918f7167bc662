//! Reading and writing the line-oriented input and output files
//!
//! All files are read completely in one pass. Readers and writers are
//! scoped to the function that uses them, so every file is closed on
//! return, no matter if the pass succeeded or failed.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::{InteractomeError, InteractomeResult};

/// Opens a file for buffered reading
pub(crate) fn open<P: AsRef<Path>>(path: P) -> InteractomeResult<BufReader<File>> {
    let filename = path.as_ref().display().to_string();
    let file = File::open(path).map_err(|_| InteractomeError::CannotOpenFile(filename))?;
    Ok(BufReader::new(file))
}

/// Creates (or truncates) a file for buffered writing
pub(crate) fn create<P: AsRef<Path>>(path: P) -> InteractomeResult<LineWriter> {
    let filename = path.as_ref().display().to_string();
    let file = File::create(path).map_err(|_| InteractomeError::CannotWriteFile(filename.clone()))?;
    Ok(LineWriter {
        inner: BufWriter::new(file),
        filename,
        lines: 0,
    })
}

/// Buffered output file that writes one record per line
pub(crate) struct LineWriter {
    inner: BufWriter<File>,
    filename: String,
    lines: usize,
}

impl LineWriter {
    /// Writes `line` followed by a newline
    pub fn write_line<D: std::fmt::Display>(&mut self, line: D) -> InteractomeResult<()> {
        writeln!(self.inner, "{line}")
            .map_err(|_| InteractomeError::CannotWriteFile(self.filename.clone()))?;
        self.lines += 1;
        Ok(())
    }

    /// Flushes all buffered data and returns the number of written lines
    ///
    /// Dropping the writer without calling `finish` would swallow write errors
    pub fn finish(mut self) -> InteractomeResult<usize> {
        self.inner
            .flush()
            .map_err(|_| InteractomeError::CannotWriteFile(self.filename.clone()))?;
        Ok(self.lines)
    }
}

/// Removes the first (header) line
///
/// Returns an error if the input is empty, because every file that is
/// read with this method must have a header.
pub(crate) fn remove_header<R: BufRead>(reader: &mut R) -> InteractomeResult<()> {
    let mut trash = String::with_capacity(80);
    let bytes = reader
        .read_line(&mut trash)
        .map_err(|err| InteractomeError::InvalidInput(err.to_string()))?;
    if bytes == 0 {
        return Err(InteractomeError::InvalidInput(
            "file must contain a header".to_string(),
        ));
    }
    Ok(())
}

/// Iterates all non-blank lines of `reader`
///
/// Lines are returned unchanged, including leading and trailing whitespace.
pub(crate) fn lines<R: BufRead>(reader: R) -> impl Iterator<Item = InteractomeResult<String>> {
    reader
        .lines()
        .map(|line| line.map_err(|err| InteractomeError::InvalidInput(err.to_string())))
        .filter(|line| match line {
            Ok(line) => !line.trim().is_empty(),
            Err(_) => true,
        })
}

/// Copies every line of `reader` for which `keep` returns `true` to `output`
///
/// The lines are written without any modification and in their original
/// order. Returns the number of written lines.
pub(crate) fn filter_lines<R, P, F>(reader: R, output: P, mut keep: F) -> InteractomeResult<usize>
where
    R: BufRead,
    P: AsRef<Path>,
    F: FnMut(&str) -> InteractomeResult<bool>,
{
    let mut writer = create(output)?;
    for line in lines(reader) {
        let line = line?;
        if keep(&line)? {
            writer.write_line(&line)?;
        }
    }
    writer.finish()
}

/// Module to parse the identifier mapping file
///
/// ```text
/// entrez_gene_id  STRING_Locus_ID
/// 1   9606.ENSP00000263100
/// 2   9606.ENSP00000323929
/// ```
pub(crate) mod id_mapping {
    use std::collections::HashMap;
    use std::io::BufRead;

    use super::{lines, remove_header};
    use crate::{InteractomeError, InteractomeResult};

    /// Parses a single line and returns `(string_id, entrez_id)`
    fn parse_line(line: &str) -> InteractomeResult<(&str, &str)> {
        let mut cols = line.trim().split('\t');

        // Column 1 is the Entrez gene ID
        let Some(entrez_id) = cols.next() else {
            return Err(InteractomeError::MalformedRecord(line.to_string()));
        };
        if entrez_id.parse::<u64>().is_err() {
            return Err(InteractomeError::MalformedRecord(line.to_string()));
        }

        // Column 2 is the STRING protein ID
        let Some(string_id) = cols.next() else {
            return Err(InteractomeError::MalformedRecord(line.to_string()));
        };

        Ok((string_id, entrez_id))
    }

    pub(crate) fn parse<R: BufRead>(mut reader: R) -> InteractomeResult<HashMap<String, String>> {
        remove_header(&mut reader)?;
        let mut map = HashMap::new();
        for line in lines(reader) {
            let line = line?;
            let (string_id, entrez_id) = parse_line(&line)?;
            map.insert(string_id.to_string(), entrez_id.to_string());
        }
        Ok(map)
    }

    #[cfg(test)]
    mod test_id_mapping {
        use super::*;

        #[test]
        fn correct_line() {
            let (string_id, entrez_id) =
                parse_line("7157\t9606.ENSP00000269305").expect("valid line");
            assert_eq!(string_id, "9606.ENSP00000269305");
            assert_eq!(entrez_id, "7157");
        }

        #[test]
        fn missing_column() {
            assert!(parse_line("7157").is_err());
        }

        #[test]
        fn non_numeric_entrez_id() {
            assert!(parse_line("TP53\t9606.ENSP00000269305").is_err());
        }

        #[test]
        fn parse_skips_header() {
            let data = "entrez\tstring\n1\t9606.A\n2\t9606.B\n".as_bytes();
            let map = parse(data).expect("valid mapping");
            assert_eq!(map.len(), 2);
            assert_eq!(map.get("9606.B").map(String::as_str), Some("2"));
        }
    }
}

/// Module to parse the primary evidence (STRING) file
pub(crate) mod string_links {
    use std::io::BufRead;

    use super::{lines, remove_header};
    use crate::{InteractionRecord, InteractomeResult};

    pub(crate) fn parse<R: BufRead>(mut reader: R) -> InteractomeResult<Vec<InteractionRecord>> {
        remove_header(&mut reader)?;
        lines(reader)
            .map(|line| InteractionRecord::try_from(line?.as_str()))
            .collect()
    }

}

/// Module to parse GO relation files
///
/// ```text
/// GO:0000015 is_a GO:1902494
/// GO:0000015 part_of GO:0005829
/// GO:0000018 regulates GO:0006310
/// ```
pub(crate) mod relations {
    use std::io::BufRead;

    use super::lines;
    use crate::hierarchy::Relation;
    use crate::{InteractomeError, InteractomeResult, TermId};

    /// Parses a `child relation parent` line into `(child, parent)`
    ///
    /// Returns `None` for relation types that do not contribute to the hierarchy
    pub(crate) fn parse_line(line: &str) -> InteractomeResult<Option<(TermId, TermId)>> {
        let mut cols = line.split_whitespace();
        let (Some(child), Some(relation), Some(parent)) = (cols.next(), cols.next(), cols.next())
        else {
            return Err(InteractomeError::MalformedRecord(line.to_string()));
        };

        if Relation::try_from(relation).is_err() {
            return Ok(None);
        }

        Ok(Some((TermId::try_from(child)?, TermId::try_from(parent)?)))
    }

    /// Parses a relation file and calls `add_edge(parent, child)` for every hierarchical edge
    pub(crate) fn parse<R: BufRead, F: FnMut(TermId, TermId)>(
        reader: R,
        mut add_edge: F,
    ) -> InteractomeResult<usize> {
        let mut edges = 0;
        for line in lines(reader) {
            if let Some((child, parent)) = parse_line(&line?)? {
                add_edge(parent, child);
                edges += 1;
            }
        }
        Ok(edges)
    }

    #[cfg(test)]
    mod test_relations {
        use super::*;

        #[test]
        fn is_a_edge() {
            let (child, parent) = parse_line("GO:0000015 is_a GO:1902494")
                .expect("valid line")
                .expect("is_a is hierarchical");
            assert_eq!(child, "GO:0000015");
            assert_eq!(parent, "GO:1902494");
        }

        #[test]
        fn part_of_edge_with_trailing_fields() {
            let res = parse_line("GO:0000015 part_of GO:0005829 ! cytosol").expect("valid line");
            assert!(res.is_some());
        }

        #[test]
        fn other_relations_are_ignored() {
            assert!(parse_line("GO:0000018 regulates GO:0006310")
                .expect("valid line")
                .is_none());
            assert!(parse_line("GO:0000018 has_part XYZ")
                .expect("valid line")
                .is_none());
        }

        #[test]
        fn too_few_fields() {
            assert!(parse_line("GO:0000018 is_a").is_err());
        }

        #[test]
        fn invalid_term() {
            assert!(parse_line("GO:0000018 is_a foobar").is_err());
        }
    }
}
