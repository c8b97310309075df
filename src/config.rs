use crate::error::{AnnotError, Result};
use std::path::PathBuf;

/// Startup configuration passed explicitly into every stage; no
/// process-wide state is derived from it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Barcoded reads with ccs pass counts in their headers.
    pub reads: PathBuf,
    /// Expected-error threshold requested on the command line. The
    /// annotation pass itself runs with a no-drop ceiling; this value is
    /// carried for the downstream trimming stages.
    pub max_ee: f64,
    /// Host genome fasta for the contamination check.
    pub host_reference: PathBuf,
    /// Combined forward+reverse primer fasta.
    pub primer_file: PathBuf,
    /// Accepted for interface compatibility, not consumed by this core.
    pub chimera_db: Option<PathBuf>,
    pub taxonomy_db: Option<PathBuf>,
    pub lineage_reference: Option<PathBuf>,
    /// Directory receiving every intermediate artifact and the report.
    pub work_dir: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        for path in [&self.reads, &self.host_reference, &self.primer_file] {
            if !path.is_file() {
                return Err(AnnotError::MissingInput { path: path.clone() });
            }
        }
        Ok(())
    }

    /// Input file stem used to prefix derived artifact names.
    pub fn stem(&self) -> String {
        self.reads
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("reads")
            .to_string()
    }

    pub fn work_path(&self, suffix: &str) -> PathBuf {
        self.work_dir.join(format!("{}_{}", self.stem(), suffix))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reads: PathBuf::new(),
            max_ee: 1.0,
            host_reference: PathBuf::new(),
            primer_file: PathBuf::new(),
            chimera_db: None,
            taxonomy_db: None,
            lineage_reference: None,
            work_dir: PathBuf::from("."),
        }
    }
}
