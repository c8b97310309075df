use crate::error::{AnnotError, Result};
use crate::reader::ReadsFile;
use crate::record::Tri;
use crate::store::ReadStore;
use crate::writer::FastqWriter;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Parse the quality-filter output and fold `ee=` values into
/// `ee_pretrim`. The filter is run with a no-drop error ceiling purely to
/// obtain this annotation, so every store read is expected to appear.
pub fn merge_expected_errors(store: &mut ReadStore, ee_file: &Path) -> Result<usize> {
    let file = ReadsFile::open_artifact(ee_file)?;
    let ee_re = Regex::new(r"ee=([^;]+)").unwrap();

    let mut ee_by_read: HashMap<String, f64> = HashMap::new();
    for (idx, result) in file.records().enumerate() {
        let fq = result?;
        let head = fq.head_str()?;
        let name = head
            .split(';')
            .next()
            .unwrap_or("")
            .trim_start_matches('@');

        let ee = ee_re
            .captures(head)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .ok_or_else(|| AnnotError::InvalidTable {
                path: ee_file.to_path_buf(),
                line: idx + 1,
                msg: format!("no parseable ee= token in header '{}'", head),
            })?;
        ee_by_read.insert(name.to_string(), ee);
    }

    let mut merged = 0;
    for (name, ee) in ee_by_read {
        if let Some(rec) = store.get_mut(&name) {
            rec.ee_pretrim = ee;
            merged += 1;
        }
    }
    Ok(merged)
}

/// Read the "mapped" alignment listing and flag host contamination. The
/// read name is the first `;`-delimited field of each record; names are
/// deduplicated into a set before merging.
pub fn merge_host_mapping(store: &mut ReadStore, mapped_listing: &Path) -> Result<usize> {
    let text =
        std::fs::read_to_string(mapped_listing).map_err(|_| AnnotError::MissingArtifact {
            path: mapped_listing.to_path_buf(),
        })?;

    let mapped: HashSet<&str> = text
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| l.split(';').next().unwrap_or(""))
        .collect();

    let mut count = 0;
    for rec in store.iter_mut() {
        if mapped.contains(rec.read_name.as_str()) {
            rec.host_map = true;
            count += 1;
        }
    }
    Ok(count)
}

/// Emit the "unmapped" subset as a derived fastq artifact. SAM-style
/// records: field 1 is the name, 10 the sequence, 11 the quality.
pub fn export_unmapped_fastq(unmapped_listing: &Path, out: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(unmapped_listing)?;
    let mut writer = FastqWriter::to_file(out)?;
    let mut count = 0;

    for line in text.lines() {
        if line.is_empty() || line.starts_with('@') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 11 {
            continue;
        }
        writer.write_record(fields[0], fields[9].as_bytes(), fields[10].as_bytes())?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// One row of the secondary primer-parser table: read name, two match
/// flags, four positions, orientation, note. The half-probe tables reuse
/// the same layout with the probe's query start and end carried in the
/// `f_start` and `r_start` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimerHit {
    pub forward_match: bool,
    pub reverse_match: bool,
    pub f_start: i64,
    pub f_end: i64,
    pub r_start: i64,
    pub r_end: i64,
    pub orientation: String,
    pub note: String,
}

pub fn read_primer_table(path: &Path) -> Result<HashMap<String, PrimerHit>> {
    let file = ReadsFile::open_artifact(path)?;
    let text = std::str::from_utf8(file.bytes())?;

    let mut hits = HashMap::new();
    for (idx, line) in text.lines().enumerate() {
        // Row 0 is the column header.
        if idx == 0 || line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 8 {
            return Err(AnnotError::InvalidTable {
                path: path.to_path_buf(),
                line: idx + 1,
                msg: format!("expected at least 8 columns, found {}", cols.len()),
            });
        }

        let pos = |i: usize| -> Result<i64> {
            cols[i].parse::<i64>().map_err(|_| AnnotError::InvalidTable {
                path: path.to_path_buf(),
                line: idx + 1,
                msg: format!("column {} is not an integer: '{}'", i, cols[i]),
            })
        };

        hits.insert(
            cols[0].to_string(),
            PrimerHit {
                forward_match: cols[1] == "true",
                reverse_match: cols[2] == "true",
                f_start: pos(3)?,
                f_end: pos(4)?,
                r_start: pos(5)?,
                r_end: pos(6)?,
                orientation: cols[7].to_string(),
                note: cols.get(8).unwrap_or(&"").to_string(),
            },
        );
    }
    Ok(hits)
}

pub struct PrimerMergeOutcome {
    /// Reads matched on only one primer end, with their (forward, reverse)
    /// match flags. Built once; recovery consumes it read-only.
    pub singletons: HashMap<String, (bool, bool)>,
    pub no_primer_hits: usize,
}

pub fn merge_primer_hits(
    store: &mut ReadStore,
    hits: &HashMap<String, PrimerHit>,
) -> PrimerMergeOutcome {
    let mut singletons = HashMap::new();
    let mut no_primer_hits = 0;

    for rec in store.iter_mut() {
        match hits.get(&rec.read_name) {
            Some(hit) => {
                rec.f_primer_matches = Tri::from_bool(hit.forward_match);
                rec.r_primer_matches = Tri::from_bool(hit.reverse_match);
                rec.f_primer_start = Some(hit.f_start);
                rec.f_primer_end = Some(hit.f_end);
                rec.r_primer_start = Some(hit.r_start);
                rec.r_primer_end = Some(hit.r_end);
                rec.read_orientation = Some(hit.orientation.clone());
                rec.primer_note = hit.note.clone();

                if !hit.forward_match || !hit.reverse_match {
                    singletons.insert(
                        rec.read_name.clone(),
                        (hit.forward_match, hit.reverse_match),
                    );
                }
            }
            None => {
                // Absent from the parser output: every primer field stays
                // at its unknown sentinel.
                rec.f_primer_matches = Tri::Unknown;
                rec.r_primer_matches = Tri::Unknown;
                rec.f_primer_start = None;
                rec.f_primer_end = None;
                rec.r_primer_start = None;
                rec.r_primer_end = None;
                rec.read_orientation = None;
                rec.primer_note = "no_primer_hits".to_string();
                no_primer_hits += 1;
            }
        }
    }

    PrimerMergeOutcome {
        singletons,
        no_primer_hits,
    }
}
