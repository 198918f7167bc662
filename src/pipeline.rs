//! One complete batch run, from the raw evidence files to cleaned annotations
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::annotations::{self, Subontologies, Subontology};
use crate::parser;
use crate::relevance::{self, RelevanceEngine};
use crate::term::TermSet;
use crate::{
    AnnotationHierarchy, DirectAnnotations, EvidenceSet, EvidenceSource, FusedInteractions,
    IdentifierMap, InteractomeError, InteractomeResult, DEFAULT_ANNOTATION_THRESHOLD,
    DEFAULT_SCORE_THRESHOLDS, DEFAULT_SPECIES_PREFIX, DEFAULT_TRUST_THRESHOLD,
};

/// All input files and parameters of a [`Pipeline`] run
///
/// The [`Default`] configuration uses the file layout of the reference
/// deployment inside a `data` folder, see [`PipelineConfig::from_data_dir`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Primary evidence file (STRING `protein.links.detailed`)
    pub interactions: PathBuf,
    /// Mapping of primary protein IDs to the IDs of the evidence sources
    pub id_mapping: PathBuf,
    /// Auxiliary evidence sources with their reliability weights
    pub evidence: Vec<EvidenceSource>,
    /// Filtered interaction files are written to `<prefix>_<threshold>`
    pub interaction_prefix: PathBuf,
    /// Minimum final scores, one filtered interaction file per threshold
    pub score_thresholds: Vec<u32>,
    /// Complete annotation file
    pub annotations: PathBuf,
    /// GO relation files, e.g. one per subontology
    pub relation_files: Vec<PathBuf>,
    /// Term lists of cellular component, molecular function and biological process
    ///
    /// If `None`, annotation files are not split.
    pub subontology_terms: Option<[PathBuf; 3]>,
    /// Folder for all annotation output files
    pub annotation_dir: PathBuf,
    /// Name prefix of annotation output files, e.g. `human_ppi`
    pub annotation_prefix: String,
    /// Prefix that turns an annotation protein ID into an interaction protein ID
    pub species_prefix: String,
    /// Minimum trust score of reliable annotations
    pub trust_threshold: u32,
    /// Minimum rollup count of relevant terms
    pub annotation_threshold: usize,
}

impl PipelineConfig {
    /// Configuration with the file layout of the reference deployment
    ///
    /// ```text
    /// <dir>/string/9606.protein.links.detailed.v9.1.txt
    /// <dir>/mappings/entrez_gene_id.vs.string.v9.05.28122012.txt
    /// <dir>/ccsb/{HI-II-14,Venkatesan-09,Yu-11,Lit-BM-13}.tsv
    /// <dir>/go/9606_go_knowledge_full.tsv
    /// <dir>/go/subontologies/{CC,MF,BP}GOfull.txt
    /// <dir>/go/subontologies/{CC,MF,BP}GOterms.txt
    /// ```
    pub fn from_data_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let go = dir.join("go");
        let subontologies = go.join("subontologies");
        Self {
            interactions: dir.join("string").join("9606.protein.links.detailed.v9.1.txt"),
            id_mapping: dir
                .join("mappings")
                .join("entrez_gene_id.vs.string.v9.05.28122012.txt"),
            evidence: EvidenceSource::reference_sources(dir.join("ccsb")),
            interaction_prefix: dir.join("human_ppi_data"),
            score_thresholds: DEFAULT_SCORE_THRESHOLDS.to_vec(),
            annotations: go.join("9606_go_knowledge_full.tsv"),
            relation_files: ["CC", "MF", "BP"]
                .iter()
                .map(|sub| subontologies.join(format!("{sub}GOfull.txt")))
                .collect(),
            subontology_terms: Some(
                ["CC", "MF", "BP"].map(|sub| subontologies.join(format!("{sub}GOterms.txt"))),
            ),
            annotation_dir: go,
            annotation_prefix: "human_ppi".to_string(),
            species_prefix: DEFAULT_SPECIES_PREFIX.to_string(),
            trust_threshold: DEFAULT_TRUST_THRESHOLD,
            annotation_threshold: DEFAULT_ANNOTATION_THRESHOLD,
        }
    }

    /// The filtered interaction file of one score threshold
    pub fn interaction_file(&self, threshold: u32) -> PathBuf {
        let mut name: OsString = self.interaction_prefix.clone().into_os_string();
        name.push(format!("_{threshold}"));
        PathBuf::from(name)
    }

    /// The annotation file of the interactome at one score threshold
    fn annotation_file(&self, threshold: u32, suffix: &str) -> PathBuf {
        self.annotation_dir.join(format!(
            "{}{}_go{}.tsv",
            self.annotation_prefix, threshold, suffix
        ))
    }

    /// The file that lists all relevant terms
    pub fn relevant_terms_file(&self) -> PathBuf {
        self.annotation_dir.join("relevant-terms")
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_data_dir("data")
    }
}

/// Counts of one complete [`Pipeline`] run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of fused interactions
    pub interactions: usize,
    /// Number of interactions written per score threshold
    pub interactions_by_threshold: Vec<(u32, usize)>,
    /// Number of relevant terms
    pub relevant_terms: usize,
    /// All cleaned annotation files and their number of rows
    pub cleaned_files: Vec<(PathBuf, usize)>,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// The context of one batch run
///
/// A `Pipeline` owns the configuration; every in-memory structure
/// (identifier map, evidence sets, hierarchy, counts) is created by the
/// stage that needs it and dropped when the stage returns. Nothing is
/// shared between runs, so multiple pipelines can run independently.
///
/// Any error aborts the run. Outputs of a failed run are incomplete and
/// must not be used.
///
/// ```mermaid
/// flowchart TD
///     STRING[primary evidence] --> FUSE[fuse_interactions]
///     MAP[identifier map] --> FUSE
///     CCSB[evidence sources] --> FUSE
///     FUSE --> PPI[ppi file per threshold]
///     PPI --> FILTER[filter_annotations]
///     GO[annotations] --> FILTER
///     FILTER --> SPLIT[split_annotations]
///     GO --> REL[relevant_terms]
///     REL_FILES[relation files] --> REL
///     SPLIT --> CLEAN[clean_annotations]
///     REL --> CLEAN
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates the context of a new run
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration of the run
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reads all evidence and fuses it
    ///
    /// # Errors
    ///
    /// Any error while reading one of the evidence files, see
    /// [`IdentifierMap::from_file`], [`EvidenceSet::from_source`] and
    /// [`FusedInteractions::build`]
    pub fn fuse_interactions(&self) -> InteractomeResult<FusedInteractions> {
        let records = parser::string_links::parse(parser::open(&self.config.interactions)?)?;
        info!("String data read-in: {} interactions", records.len());

        let ids = IdentifierMap::from_file(&self.config.id_mapping)?;
        let sources = self
            .config
            .evidence
            .iter()
            .map(|source| EvidenceSet::from_source(source, &ids))
            .collect::<InteractomeResult<Vec<EvidenceSet>>>()?;

        FusedInteractions::build(&records, &ids, &sources)
    }

    /// Writes one interaction file per score threshold
    ///
    /// # Errors
    ///
    /// [`InteractomeError::CannotWriteFile`] if an output cannot be written
    pub fn write_interactions(
        &self,
        fused: &FusedInteractions,
    ) -> InteractomeResult<Vec<(u32, usize)>> {
        let mut written = Vec::with_capacity(self.config.score_thresholds.len());
        for threshold in &self.config.score_thresholds {
            let path = self.config.interaction_file(*threshold);
            written.push((*threshold, fused.write_by_score(path, f64::from(*threshold))?));
        }
        Ok(written)
    }

    /// Keeps the reliable annotations of proteins in each interaction file
    ///
    /// Returns the unfiltered and the reliable annotation file of every
    /// score threshold.
    ///
    /// # Errors
    ///
    /// See [`annotations::filter_by_interactome`] and [`annotations::filter_unreliable`]
    pub fn filter_annotations(&self) -> InteractomeResult<Vec<PathBuf>> {
        create_dir(&self.config.annotation_dir)?;
        let mut files = Vec::with_capacity(self.config.score_thresholds.len() * 2);
        for threshold in &self.config.score_thresholds {
            let all = self.config.annotation_file(*threshold, "");
            let reliable = self.config.annotation_file(*threshold, "_conf");
            annotations::filter_by_interactome(
                &self.config.annotations,
                self.config.interaction_file(*threshold),
                &all,
                &self.config.species_prefix,
            )?;
            annotations::filter_unreliable(&all, &reliable, self.config.trust_threshold)?;
            files.push(all);
            files.push(reliable);
        }
        Ok(files)
    }

    /// Splits every annotation file into one file per subontology
    ///
    /// The split files are written to the `split` subfolder. If no
    /// subontology terms are configured, `files` is returned unchanged.
    ///
    /// # Errors
    ///
    /// See [`Subontologies::from_files`] and [`Subontologies::split`]
    pub fn split_annotations(&self, files: Vec<PathBuf>) -> InteractomeResult<Vec<PathBuf>> {
        let Some([cc, mf, bp]) = &self.config.subontology_terms else {
            return Ok(files);
        };
        let subontologies = Subontologies::from_files(cc, mf, bp)?;
        let split_dir = self.config.annotation_dir.join("split");
        create_dir(&split_dir)?;

        let mut split_files = Vec::with_capacity(files.len() * 3);
        for file in files {
            let (stem, suffix) = split_stem(&file)?;
            let outputs = Subontology::ALL
                .map(|sub| split_dir.join(format!("{stem}_{}{suffix}.tsv", sub.abbreviation())));
            subontologies.split(&file, outputs.clone())?;
            split_files.extend(outputs);
        }
        Ok(split_files)
    }

    /// Determines all relevant terms and writes them to the relevant-terms file
    ///
    /// # Errors
    ///
    /// See [`AnnotationHierarchy::from_files`], [`DirectAnnotations::from_file`]
    /// and [`RelevanceEngine::new`]
    pub fn relevant_terms(&self) -> InteractomeResult<TermSet> {
        let direct = DirectAnnotations::from_file(&self.config.annotations)?;
        let hierarchy = AnnotationHierarchy::from_files(&self.config.relation_files)?;
        let engine = RelevanceEngine::new(&direct, &hierarchy)?
            .with_threshold(self.config.annotation_threshold);
        create_dir(&self.config.annotation_dir)?;
        engine.write_relevant_terms(self.config.relevant_terms_file())?;
        Ok(engine.relevant_terms().into_iter().collect())
    }

    /// Removes irrelevant annotations from every file
    ///
    /// Every file `<name>.tsv` is cleaned into `<name>_clean.tsv` in the same folder.
    ///
    /// # Errors
    ///
    /// See [`relevance::clean_annotation_file`]
    pub fn clean_annotations(
        &self,
        files: &[PathBuf],
        relevant: &TermSet,
    ) -> InteractomeResult<Vec<(PathBuf, usize)>> {
        let mut cleaned = Vec::with_capacity(files.len());
        for file in files {
            let output = clean_file_name(file)?;
            let written = relevance::clean_annotation_file(file, relevant, &output)?;
            cleaned.push((output, written));
        }
        Ok(cleaned)
    }

    /// Runs all stages
    ///
    /// # Errors
    ///
    /// The first error of any stage aborts the run
    pub fn run(&self) -> InteractomeResult<RunSummary> {
        let fused = self.fuse_interactions()?;
        let interactions_by_threshold = self.write_interactions(&fused)?;
        let interactions = fused.len();
        drop(fused);

        let files = self.filter_annotations()?;
        let files = self.split_annotations(files)?;
        let relevant = self.relevant_terms()?;
        let cleaned_files = self.clean_annotations(&files, &relevant)?;

        info!("Run finished: {} cleaned annotation files", cleaned_files.len());
        Ok(RunSummary {
            interactions,
            interactions_by_threshold,
            relevant_terms: relevant.len(),
            cleaned_files,
        })
    }
}

fn create_dir(dir: &Path) -> InteractomeResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|_| InteractomeError::CannotWriteFile(dir.display().to_string()))
}

/// Splits `human_ppi700_go_conf.tsv` into `("human_ppi700_go", "_conf")`
fn split_stem(file: &Path) -> InteractomeResult<(String, String)> {
    let stem = file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| InteractomeError::InvalidInput(file.display().to_string()))?;
    Ok(match stem.strip_suffix("_conf") {
        Some(base) => (base.to_string(), "_conf".to_string()),
        None => (stem.to_string(), String::new()),
    })
}

fn clean_file_name(file: &Path) -> InteractomeResult<PathBuf> {
    let stem = file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| InteractomeError::InvalidInput(file.display().to_string()))?;
    Ok(file.with_file_name(format!("{stem}_clean.tsv")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reference_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.score_thresholds, vec![700, 900]);
        assert_eq!(config.evidence.len(), 4);
        assert_eq!(config.relation_files.len(), 3);
        assert_eq!(
            config.interaction_file(700),
            Path::new("data/human_ppi_data_700")
        );
        assert_eq!(
            config.annotation_file(900, "_conf"),
            Path::new("data/go/human_ppi900_go_conf.tsv")
        );
        assert_eq!(
            config.relevant_terms_file(),
            Path::new("data/go/relevant-terms")
        );
    }

    #[test]
    fn stems() {
        assert_eq!(
            split_stem(Path::new("go/human_ppi700_go_conf.tsv")).unwrap(),
            ("human_ppi700_go".to_string(), "_conf".to_string())
        );
        assert_eq!(
            split_stem(Path::new("go/human_ppi700_go.tsv")).unwrap(),
            ("human_ppi700_go".to_string(), String::new())
        );
        assert_eq!(
            clean_file_name(Path::new("go/split/human_ppi700_go_cc.tsv")).unwrap(),
            Path::new("go/split/human_ppi700_go_cc_clean.tsv")
        );
    }

    #[test]
    fn missing_input_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(PipelineConfig::from_data_dir(dir.path()));
        assert!(matches!(
            pipeline.run(),
            Err(InteractomeError::CannotOpenFile(_))
        ));
    }
}
