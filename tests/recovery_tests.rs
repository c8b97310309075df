use ccs_annotate::merge::read_primer_table;
use ccs_annotate::primers::create_half_primer_files;
use ccs_annotate::recovery::{merge_half_primer_matches, recover_singletons};
use ccs_annotate::tools::{HostMapArtifacts, Toolchain};
use ccs_annotate::{ReadStore, Result, Tri};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const PRIMER_HEADER: &str =
    "read_name\tf_match\tr_match\tf_start\tf_end\tr_start\tr_end\torientation\tnote";

struct ProbeMock {
    forward_half_table: String,
    reverse_half_table: String,
}

impl Toolchain for ProbeMock {
    fn quality_filter(&self, _reads: &Path, _out: &Path) -> Result<()> {
        unreachable!("recovery never filters")
    }
    fn host_align(&self, _r: &Path, _f: &Path, _p: &Path) -> Result<HostMapArtifacts> {
        unreachable!("recovery never aligns")
    }
    fn oligo_search(&self, _reads: &Path, db: &Path, raw_out: &Path) -> Result<()> {
        fs::write(raw_out, db.file_name().unwrap().to_str().unwrap())?;
        Ok(())
    }
    fn parse_oligo_hits(&self, raw: &Path, table_out: &Path) -> Result<()> {
        let table = match fs::read_to_string(raw)?.as_str() {
            "primer_half_fow.fasta" => &self.forward_half_table,
            _ => &self.reverse_half_table,
        };
        fs::write(table_out, table)?;
        Ok(())
    }
}

fn store_of_singletons(dir: &Path) -> ReadStore {
    let seq = "A".repeat(500);
    let qual = "I".repeat(500);
    let mut reads = String::new();
    for name in ["s1", "s2", "s3"] {
        reads.push_str(&format!(
            "@{};barcodelabel=BC01_A;ccs=3\n{}\n+\n{}\n",
            name, seq, qual
        ));
    }
    let path = dir.join("reads.fastq");
    fs::write(&path, reads).unwrap();
    ReadStore::from_reads_file(&path).unwrap()
}

#[test]
fn both_groups_probed_and_cross_write_preserved() {
    let dir = tempdir().unwrap();
    let store = store_of_singletons(dir.path());

    // s1 misses its forward primer; s2 and s3 miss their reverse one.
    let mut singletons = HashMap::new();
    singletons.insert("s1".to_string(), (false, true));
    singletons.insert("s2".to_string(), (true, false));
    singletons.insert("s3".to_string(), (true, false));

    let primers = dir.path().join("primers.fasta");
    fs::write(
        &primers,
        ">27f_forward\nAGAGTTTGATCMTGGCTCAG\n>1492r_reverse\nTACGGYTACCTTGTTACGACTT\n",
    )
    .unwrap();
    let half_files = create_half_primer_files(&primers, dir.path()).unwrap();

    let tools = ProbeMock {
        forward_half_table: format!("{}\ns1\ttrue\ttrue\t50\t60\t420\t430\t+\tok\n", PRIMER_HEADER),
        // s2 is accepted on the plus strand and therefore lands in the
        // forward-missing map; s3 fails the window and stays here.
        reverse_half_table: format!(
            "{}\ns2\ttrue\ttrue\t50\t60\t420\t430\t+\tok\n\
             s3\ttrue\ttrue\t50\t60\t350\t360\t+\tshort\n",
            PRIMER_HEADER
        ),
    };

    let maps = recover_singletons(&store, &singletons, &half_files, &tools, dir.path(), "reads")
        .unwrap();

    assert_eq!(maps.forward_missing.get("s1"), Some(&true));
    assert_eq!(maps.forward_missing.get("s2"), Some(&true));
    assert_eq!(maps.reverse_missing.get("s2"), None);
    assert_eq!(maps.reverse_missing.get("s3"), Some(&false));

    let mut store = store;
    merge_half_primer_matches(&mut store, &maps);
    assert_eq!(store.get("s1").unwrap().half_primer_match, Tri::True);
    assert_eq!(store.get("s2").unwrap().half_primer_match, Tri::True);
    assert_eq!(store.get("s3").unwrap().half_primer_match, Tri::False);

    // Each group was probed against the database for its missing end.
    let fm_table = dir.path().join("reads_forward_missing_primer_info.txt");
    let rm_table = dir.path().join("reads_reverse_missing_primer_info.txt");
    assert!(read_primer_table(&fm_table).unwrap().contains_key("s1"));
    assert!(read_primer_table(&rm_table).unwrap().contains_key("s3"));
}

#[test]
fn minus_strand_recovery() {
    let dir = tempdir().unwrap();
    let store = store_of_singletons(dir.path());

    let mut singletons = HashMap::new();
    singletons.insert("s1".to_string(), (false, true));

    let primers = dir.path().join("primers.fasta");
    fs::write(&primers, ">27f_forward\nAGAGTTTGATCMTGGCTCAG\n>1492r_reverse\nTACGG\n").unwrap();
    let half_files = create_half_primer_files(&primers, dir.path()).unwrap();

    let tools = ProbeMock {
        // Minus strand: query start near the far end, query end near the
        // beginning (L=500: 450 >= 400 and 80 <= 100).
        forward_half_table: format!("{}\ns1\ttrue\ttrue\t450\t460\t80\t90\t-\tok\n", PRIMER_HEADER),
        reverse_half_table: format!("{}\n", PRIMER_HEADER),
    };

    let maps = recover_singletons(&store, &singletons, &half_files, &tools, dir.path(), "reads")
        .unwrap();
    assert_eq!(maps.forward_missing.get("s1"), Some(&true));
    assert!(maps.reverse_missing.is_empty());
}
