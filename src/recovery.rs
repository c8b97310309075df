use crate::error::Result;
use crate::merge::{read_primer_table, PrimerHit};
use crate::primers::HalfPrimerFiles;
use crate::record::Tri;
use crate::store::ReadStore;
use crate::tools::Toolchain;
use crate::writer::FastqWriter;
use std::collections::HashMap;
use std::path::Path;

// A half-primer probe must anchor within this many bases of the read
// terminus it is recovering.
const TERMINUS_WINDOW: i64 = 100;

/// Per-group recovery verdicts keyed by read name. Two maps are kept
/// because the two probe runs are bookkept separately; see
/// `classify_reverse_missing` for the historical cross-write between them.
pub struct RecoveryMaps {
    pub forward_missing: HashMap<String, bool>,
    pub reverse_missing: HashMap<String, bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeStrand {
    Plus,
    Minus,
}

/// Positional acceptance rule for a half-probe hit on a read of length
/// `read_len`: both match flags must be set and the probe's query span
/// must sit within the terminus window, respecting strand. The parser
/// emits the query start and end in the `f_start`/`r_start` columns for
/// these runs.
fn half_probe_strand(hit: &PrimerHit, read_len: i64) -> Option<ProbeStrand> {
    if !hit.forward_match || !hit.reverse_match {
        return None;
    }
    let qstart = hit.f_start;
    let qend = hit.r_start;
    match hit.orientation.as_str() {
        "+" if qstart <= TERMINUS_WINDOW && qend >= read_len - TERMINUS_WINDOW => {
            Some(ProbeStrand::Plus)
        }
        "-" if qstart >= read_len - TERMINUS_WINDOW && qend <= TERMINUS_WINDOW => {
            Some(ProbeStrand::Minus)
        }
        _ => None,
    }
}

/// Split singleton reads into per-missing-end fastq groups. The partition
/// is asymmetric and first-branch-wins: a read with forward_match false
/// lands in the forward-missing group regardless of its reverse flag.
fn partition_groups(
    store: &ReadStore,
    singletons: &HashMap<String, (bool, bool)>,
    forward_path: &Path,
    reverse_path: &Path,
) -> Result<(usize, usize)> {
    let mut forward = FastqWriter::to_file(forward_path)?;
    let mut reverse = FastqWriter::to_file(reverse_path)?;
    let mut counts = (0usize, 0usize);

    // Store order keeps the group files stable across reruns.
    for name in store.names() {
        let Some(&(f_match, r_match)) = singletons.get(name) else {
            continue;
        };
        let Some(sq) = store.seq(name) else {
            continue;
        };
        if !f_match {
            forward.write_record(name, &sq.seq, &sq.qual)?;
            counts.0 += 1;
        } else if !r_match {
            reverse.write_record(name, &sq.seq, &sq.qual)?;
            counts.1 += 1;
        }
    }

    forward.flush()?;
    reverse.flush()?;
    Ok(counts)
}

fn probe_group<T: Toolchain>(
    tools: &T,
    group_fq: &Path,
    probe_db: &Path,
    raw_out: &Path,
    table_out: &Path,
) -> Result<HashMap<String, PrimerHit>> {
    tools.oligo_search(group_fq, probe_db, raw_out)?;
    tools.parse_oligo_hits(raw_out, table_out)?;
    read_primer_table(table_out)
}

fn read_len(store: &ReadStore, name: &str) -> i64 {
    store.seq(name).map(|sq| sq.len() as i64).unwrap_or(0)
}

/// Re-probe singleton reads with the half-length databases and classify
/// each hit with the positional rule.
pub fn recover_singletons<T: Toolchain>(
    store: &ReadStore,
    singletons: &HashMap<String, (bool, bool)>,
    half_files: &HalfPrimerFiles,
    tools: &T,
    work_dir: &Path,
    stem: &str,
) -> Result<RecoveryMaps> {
    let fm_fq = work_dir.join(format!("{}_singletons_forward_missing.fq", stem));
    let rm_fq = work_dir.join(format!("{}_singletons_reverse_missing.fq", stem));
    let (fm_count, rm_count) = partition_groups(store, singletons, &fm_fq, &rm_fq)?;

    let mut maps = RecoveryMaps {
        forward_missing: HashMap::new(),
        reverse_missing: HashMap::new(),
    };

    // An empty group has nothing to probe; its result map stays empty.
    if fm_count > 0 {
        let raw = work_dir.join(format!("{}_forward_missing_primer_map.txt", stem));
        let table = work_dir.join(format!("{}_forward_missing_primer_info.txt", stem));
        let hits = probe_group(tools, &fm_fq, &half_files.forward_half, &raw, &table)?;
        for (name, hit) in &hits {
            let accepted = half_probe_strand(hit, read_len(store, name)).is_some();
            maps.forward_missing.insert(name.clone(), accepted);
        }
    }

    if rm_count > 0 {
        let raw = work_dir.join(format!("{}_reverse_missing_primer_map.txt", stem));
        let table = work_dir.join(format!("{}_reverse_missing_primer_info.txt", stem));
        let hits = probe_group(tools, &rm_fq, &half_files.reverse_half, &raw, &table)?;
        classify_reverse_missing(store, &hits, &mut maps);
    }

    Ok(maps)
}

/// Historical quirk, preserved on purpose: a plus-strand accept from the
/// reverse-missing probe run is recorded in the forward-missing map, so
/// only minus-strand accepts and rejections reach the reverse-missing
/// map. The final merge reads both maps for both truth values, so the
/// published half_primer_match is unaffected.
fn classify_reverse_missing(
    store: &ReadStore,
    hits: &HashMap<String, PrimerHit>,
    maps: &mut RecoveryMaps,
) {
    for (name, hit) in hits {
        match half_probe_strand(hit, read_len(store, name)) {
            Some(ProbeStrand::Plus) => {
                maps.forward_missing.insert(name.clone(), true);
            }
            Some(ProbeStrand::Minus) => {
                maps.reverse_missing.insert(name.clone(), true);
            }
            None => {
                maps.reverse_missing.insert(name.clone(), false);
            }
        }
    }
}

/// Fold the recovery verdicts into `half_primer_match`; reads not probed
/// by either group keep the unknown sentinel.
pub fn merge_half_primer_matches(store: &mut ReadStore, maps: &RecoveryMaps) {
    for rec in store.iter_mut() {
        let verdict = maps
            .forward_missing
            .get(&rec.read_name)
            .or_else(|| maps.reverse_missing.get(&rec.read_name));
        if let Some(&accepted) = verdict {
            rec.half_primer_match = Tri::from_bool(accepted);
        }
    }
}
