use crate::config::Config;
use crate::error::Result;
use crate::merge::{
    export_unmapped_fastq, merge_expected_errors, merge_host_mapping, merge_primer_hits,
    read_primer_table,
};
use crate::primers::create_half_primer_files;
use crate::recovery::{merge_half_primer_matches, recover_singletons};
use crate::report::write_report;
use crate::store::ReadStore;
use crate::tools::Toolchain;
use std::path::PathBuf;

pub const REPORT_FILE: &str = "all_bc_reads_info.txt";

#[derive(Debug, Default)]
pub struct RunSummary {
    pub total_reads: usize,
    pub malformed_headers: usize,
    pub ee_annotated: usize,
    pub host_mapped: usize,
    pub unmapped_exported: usize,
    pub no_primer_hits: usize,
    pub singletons: usize,
    pub half_primer_recovered: usize,
    pub report: PathBuf,
}

impl RunSummary {
    pub fn print_summary(&self) {
        println!("Annotation summary:");
        println!("  Total reads: {}", self.total_reads);
        if self.malformed_headers > 0 {
            println!("  Reads with unparseable headers: {}", self.malformed_headers);
        }
        println!("  EE-annotated reads: {}", self.ee_annotated);
        println!("  Host-mapped reads: {}", self.host_mapped);
        println!("  Unmapped reads exported: {}", self.unmapped_exported);
        println!("  Reads without primer hits: {}", self.no_primer_hits);
        println!("  Singleton reads: {}", self.singletons);
        println!(
            "  Singletons recovered by half-primer probe: {}",
            self.half_primer_recovered
        );
        println!("  Report: {}", self.report.display());
    }
}

/// Strictly sequential batch pipeline: each stage, including its external
/// tool calls, completes before the next begins. Reruns overwrite prior
/// artifacts in place.
pub struct Pipeline<'a, T: Toolchain> {
    config: &'a Config,
    tools: &'a T,
}

impl<'a, T: Toolchain> Pipeline<'a, T> {
    pub fn new(config: &'a Config, tools: &'a T) -> Self {
        Pipeline { config, tools }
    }

    pub fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;
        std::fs::create_dir_all(&self.config.work_dir)?;
        let stem = self.config.stem();

        let mut store = ReadStore::from_reads_file(&self.config.reads)?;
        store.report_malformed();

        // Expected-error annotation.
        let ee_out = self.config.work_path("ee_pretrim.fq");
        self.tools.quality_filter(&self.config.reads, &ee_out)?;
        let ee_annotated = merge_expected_errors(&mut store, &ee_out)?;

        // Host contamination flagging plus the unmapped export.
        let host_prefix = self.config.work_path("host_map");
        let host = self
            .tools
            .host_align(&self.config.reads, &self.config.host_reference, &host_prefix)?;
        let host_mapped = merge_host_mapping(&mut store, &host.mapped_listing)?;
        let unmapped_fq = self.config.work_path("host_map_unmapped.fq");
        let unmapped_exported = export_unmapped_fastq(&host.unmapped_listing, &unmapped_fq)?;

        // Full-length primer matching.
        let raw = self.config.work_path("primer_map.txt");
        let table = self.config.work_path("primer_info.txt");
        self.tools
            .oligo_search(&self.config.reads, &self.config.primer_file, &raw)?;
        self.tools.parse_oligo_hits(&raw, &table)?;
        let hits = read_primer_table(&table)?;
        let outcome = merge_primer_hits(&mut store, &hits);
        if outcome.no_primer_hits > 0 {
            eprintln!("{} reads had no primer hits", outcome.no_primer_hits);
        }

        // Singleton recovery with half-length probes.
        let half_files = create_half_primer_files(&self.config.primer_file, &self.config.work_dir)?;
        let maps = recover_singletons(
            &store,
            &outcome.singletons,
            &half_files,
            self.tools,
            &self.config.work_dir,
            &stem,
        )?;
        let half_primer_recovered = maps
            .forward_missing
            .values()
            .chain(maps.reverse_missing.values())
            .filter(|&&accepted| accepted)
            .count();
        merge_half_primer_matches(&mut store, &maps);

        let report = self.config.work_dir.join(REPORT_FILE);
        write_report(&store, &report)?;

        Ok(RunSummary {
            total_reads: store.len(),
            malformed_headers: store.malformed.len(),
            ee_annotated,
            host_mapped,
            unmapped_exported,
            no_primer_hits: outcome.no_primer_hits,
            singletons: outcome.singletons.len(),
            half_primer_recovered,
            report,
        })
    }
}
