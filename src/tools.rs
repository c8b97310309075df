use crate::error::{AnnotError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// No-drop ceiling handed to the quality filter: the pass exists only to
// annotate per-read expected errors, never to discard reads.
pub const EE_NO_DROP_CEILING: u32 = 20000;

/// Listings produced by the host-alignment chain. The "mapped" side
/// drives the contamination flag; the "unmapped" side is exported as a
/// derived fastq for use outside this pipeline.
pub struct HostMapArtifacts {
    pub mapped_listing: PathBuf,
    pub unmapped_listing: PathBuf,
}

/// Capability interface over the external bioinformatics binaries. Each
/// call is a synchronous, single-attempt subprocess invocation; tests
/// substitute a double that writes canned outputs.
pub trait Toolchain {
    /// Quality-filter pass used purely for ee annotation.
    fn quality_filter(&self, reads: &Path, out: &Path) -> Result<()>;

    /// Align reads against the host reference and partition the result
    /// into mapped/unmapped listings under `prefix`.
    fn host_align(&self, reads: &Path, reference: &Path, prefix: &Path)
        -> Result<HostMapArtifacts>;

    /// Probe reads against a primer database on both strands.
    fn oligo_search(&self, reads: &Path, db: &Path, raw_out: &Path) -> Result<()>;

    /// Normalize raw oligo-search output into the per-read match table.
    fn parse_oligo_hits(&self, raw: &Path, table_out: &Path) -> Result<()>;
}

pub fn require_artifact(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(AnnotError::MissingArtifact {
            path: path.to_path_buf(),
        }),
    }
}

/// Real toolchain shelling out to usearch, bwa, sambamba and the
/// secondary primer parser.
pub struct SystemToolchain {
    threads: usize,
    primer_parser: PathBuf,
}

impl SystemToolchain {
    pub fn new(threads: usize, primer_parser: PathBuf) -> Self {
        SystemToolchain {
            threads,
            primer_parser,
        }
    }

    fn run(tool: &str, cmd: &mut Command) -> Result<()> {
        let status = cmd.status().map_err(|e| AnnotError::ToolFailed {
            tool: tool.to_string(),
            reason: e.to_string(),
        })?;
        if !status.success() {
            return Err(AnnotError::ToolFailed {
                tool: tool.to_string(),
                reason: format!("exited with {}", status),
            });
        }
        Ok(())
    }

    fn run_to_file(tool: &str, cmd: &mut Command, out: &Path) -> Result<()> {
        let file = File::create(out)?;
        Self::run(tool, cmd.stdout(Stdio::from(file)))
    }
}

impl Toolchain for SystemToolchain {
    fn quality_filter(&self, reads: &Path, out: &Path) -> Result<()> {
        Self::run(
            "usearch",
            Command::new("usearch")
                .arg("-fastq_filter")
                .arg(reads)
                .arg("-fastqout")
                .arg(out)
                .arg("-fastq_maxee")
                .arg(EE_NO_DROP_CEILING.to_string())
                .args(["-fastq_qmax", "75"])
                .arg("-fastq_eeout")
                .args(["-sample", "all"]),
        )
    }

    fn host_align(
        &self,
        reads: &Path,
        reference: &Path,
        prefix: &Path,
    ) -> Result<HostMapArtifacts> {
        let sam = prefix.with_extension("sam");
        let bam = prefix.with_extension("bam");
        let sorted_bam = PathBuf::from(format!("{}_sorted.bam", prefix.display()));
        let mapped = PathBuf::from(format!("{}_mapped.txt", prefix.display()));
        let unmapped = PathBuf::from(format!("{}_unmapped.txt", prefix.display()));

        Self::run_to_file(
            "bwa",
            Command::new("bwa")
                .arg("mem")
                .args(["-t", &self.threads.to_string()])
                .arg(reference)
                .arg(reads),
            &sam,
        )?;
        require_artifact(&sam)?;

        Self::run(
            "sambamba",
            Command::new("sambamba")
                .args(["view", "-S", "-f", "bam"])
                .arg(&sam)
                .arg("-o")
                .arg(&bam),
        )?;
        require_artifact(&bam)?;

        Self::run(
            "sambamba",
            Command::new("sambamba")
                .arg("sort")
                .arg(format!("-t{}", self.threads))
                .arg("-o")
                .arg(&sorted_bam)
                .arg(&bam),
        )?;

        Self::run_to_file(
            "sambamba",
            Command::new("sambamba")
                .args(["view", "-F", "not unmapped"])
                .arg(&bam),
            &mapped,
        )?;

        Self::run_to_file(
            "sambamba",
            Command::new("sambamba")
                .args(["view", "-F", "unmapped"])
                .arg(&bam),
            &unmapped,
        )?;

        // The listings may legitimately be empty (no contamination, or
        // everything contaminated); only their existence is required.
        if !mapped.exists() || !unmapped.exists() {
            return Err(AnnotError::MissingArtifact {
                path: mapped.clone(),
            });
        }

        Ok(HostMapArtifacts {
            mapped_listing: mapped,
            unmapped_listing: unmapped,
        })
    }

    fn oligo_search(&self, reads: &Path, db: &Path, raw_out: &Path) -> Result<()> {
        Self::run(
            "usearch",
            Command::new("usearch")
                .arg("-search_oligodb")
                .arg(reads)
                .arg("-db")
                .arg(db)
                .args(["-strand", "both"])
                .arg("-userout")
                .arg(raw_out)
                .args(["-userfields", "query+target+qstrand+diffs+tlo+thi+qlo+qhi"]),
        )
    }

    fn parse_oligo_hits(&self, raw: &Path, table_out: &Path) -> Result<()> {
        Self::run(
            "primer-parser",
            Command::new(&self.primer_parser)
                .arg("-p")
                .arg(raw)
                .arg("-o")
                .arg(table_out),
        )
    }
}
