use crate::error::{AnnotError, Result};
use crate::reader::ReadsFile;
use crate::record::{ReadRecord, SeqQual};
use std::collections::HashMap;
use std::path::Path;

/// Identity fields recovered from one read header of the form
/// `name;barcodelabel=BC_SAMPLE;ccs=N`. The two marker tokens may appear
/// in either order; they are recognized by content, not position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub read_name: String,
    pub basename: String,
    pub barcode: String,
    pub sample: String,
    pub ccs: u32,
}

pub fn parse_header(head: &str) -> Result<HeaderInfo> {
    let malformed = || AnnotError::MalformedHeader {
        header: head.to_string(),
    };

    let mut tokens = head.split(';');
    let read_name = tokens.next().unwrap_or("");
    if read_name.is_empty() {
        return Err(malformed());
    }

    let mut basename = None;
    let mut ccs = None;
    for token in tokens {
        if let Some(value) = token.strip_prefix("barcodelabel=") {
            basename = Some(value);
        } else if let Some(value) = token.strip_prefix("ccs=") {
            ccs = value.parse::<u32>().ok();
        }
    }

    let (basename, ccs) = match (basename, ccs) {
        (Some(b), Some(c)) => (b, c),
        _ => return Err(malformed()),
    };

    // Barcode is the prefix before the first underscore; the remainder is
    // the sample name, underscores and all.
    let (barcode, sample) = match basename.split_once('_') {
        Some((bc, rest)) => (bc, rest),
        None => (basename, ""),
    };

    Ok(HeaderInfo {
        read_name: read_name.to_string(),
        basename: basename.to_string(),
        barcode: barcode.to_string(),
        sample: sample.to_string(),
        ccs,
    })
}

/// Insertion-ordered store of per-read annotation records plus the
/// retained sequence/quality strings. Iteration follows input order so
/// that identical inputs reproduce byte-identical artifacts.
pub struct ReadStore {
    order: Vec<String>,
    records: HashMap<String, ReadRecord>,
    seqs: HashMap<String, SeqQual>,
    pub malformed: Vec<String>,
}

impl ReadStore {
    pub fn from_reads_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = ReadsFile::open(path)?;
        let mut store = ReadStore {
            order: Vec::new(),
            records: HashMap::new(),
            seqs: HashMap::new(),
            malformed: Vec::new(),
        };

        for result in file.records() {
            let fq = result?;
            let head = fq.head_str()?;
            let info = match parse_header(head) {
                Ok(info) => info,
                Err(AnnotError::MalformedHeader { header }) => {
                    store.malformed.push(header);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut rec = ReadRecord::new(&info.read_name);
            rec.basename = info.basename;
            rec.barcode = info.barcode;
            rec.sample = info.sample;
            rec.ccs = info.ccs;
            rec.length_pretrim = fq.seq.len();

            if !store.records.contains_key(&info.read_name) {
                store.order.push(info.read_name.clone());
            }
            store.seqs.insert(
                info.read_name.clone(),
                SeqQual {
                    seq: fq.seq.to_ascii_uppercase(),
                    qual: fq.qual.to_vec(),
                },
            );
            store.records.insert(info.read_name, rec);
        }

        Ok(store)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, read_name: &str) -> Option<&ReadRecord> {
        self.records.get(read_name)
    }

    pub fn get_mut(&mut self, read_name: &str) -> Option<&mut ReadRecord> {
        self.records.get_mut(read_name)
    }

    pub fn seq(&self, read_name: &str) -> Option<&SeqQual> {
        self.seqs.get(read_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReadRecord> {
        self.order.iter().map(move |name| &self.records[name])
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ReadRecord> {
        self.records.values_mut()
    }

    pub fn report_malformed(&self) {
        for header in &self.malformed {
            eprintln!(
                "Skipping read without barcodelabel=/ccs= header markers: {}",
                header
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn header_barcode_sample_ccs() {
        let info = parse_header("read1;barcodelabel=BC01_SampleA;ccs=5").unwrap();
        assert_eq!(info.read_name, "read1");
        assert_eq!(info.basename, "BC01_SampleA");
        assert_eq!(info.barcode, "BC01");
        assert_eq!(info.sample, "SampleA");
        assert_eq!(info.ccs, 5);
    }

    #[test]
    fn header_markers_in_either_order() {
        let a = parse_header("r;barcodelabel=BC_S;ccs=7").unwrap();
        let b = parse_header("r;ccs=7;barcodelabel=BC_S").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sample_keeps_inner_underscores() {
        let info = parse_header("r;barcodelabel=BC01_Sample_A_2;ccs=1").unwrap();
        assert_eq!(info.barcode, "BC01");
        assert_eq!(info.sample, "Sample_A_2");
    }

    #[test]
    fn header_without_markers_is_malformed() {
        assert!(parse_header("read1;foo=bar").is_err());
        assert!(parse_header("read1").is_err());
        assert!(parse_header("read1;barcodelabel=BC_S").is_err());
        assert!(parse_header("read1;ccs=3").is_err());
        assert!(parse_header("read1;barcodelabel=BC_S;ccs=notanumber").is_err());
    }

    #[test]
    fn store_excludes_malformed_reads() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(
            b"@r1;barcodelabel=BC01_A;ccs=3\nACGT\n+\nIIII\n@bad_header\nTGCA\n+\nJJJJ\n",
        )
        .unwrap();

        let store = ReadStore::from_reads_file(tmp.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.malformed, vec!["bad_header".to_string()]);
        let rec = store.get("r1").unwrap();
        assert_eq!(rec.length_pretrim, 4);
        assert_eq!(rec.barcode, "BC01");
    }

    #[test]
    fn store_uppercases_retained_sequence() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"@r1;barcodelabel=BC01_A;ccs=3\nacgt\n+\nIIII\n")
            .unwrap();
        let store = ReadStore::from_reads_file(tmp.path()).unwrap();
        assert_eq!(store.seq("r1").unwrap().seq, b"ACGT");
    }

    proptest! {
        #[test]
        fn header_roundtrip(
            name in "[A-Za-z0-9/._-]{1,30}",
            bc in "[A-Z0-9]{1,8}",
            sample in "[A-Za-z0-9_]{0,16}",
            ccs in 0u32..10_000,
            swapped in proptest::bool::ANY,
        ) {
            let basename = if sample.is_empty() {
                bc.clone()
            } else {
                format!("{}_{}", bc, sample)
            };
            let head = if swapped {
                format!("{};ccs={};barcodelabel={}", name, ccs, basename)
            } else {
                format!("{};barcodelabel={};ccs={}", name, basename, ccs)
            };
            let info = parse_header(&head).unwrap();
            prop_assert_eq!(info.read_name, name);
            prop_assert_eq!(info.barcode, bc);
            prop_assert_eq!(info.sample, sample);
            prop_assert_eq!(info.ccs, ccs);
        }
    }
}
