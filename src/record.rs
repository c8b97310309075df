use std::fmt;

/// Tri-state annotation value: a stage either proved a flag true or false,
/// or never examined the read. Serialized as `true`/`false`/`NA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tri {
    True,
    False,
    #[default]
    Unknown,
}

impl Tri {
    #[inline]
    pub fn from_bool(b: bool) -> Self {
        if b {
            Tri::True
        } else {
            Tri::False
        }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        !matches!(self, Tri::Unknown)
    }
}

impl fmt::Display for Tri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tri::True => f.write_str("true"),
            Tri::False => f.write_str("false"),
            Tri::Unknown => f.write_str("NA"),
        }
    }
}

/// One consolidated annotation record per unique read name. Fields are
/// filled incrementally: ingestion sets the identity fields, then each
/// merge stage sets its own group exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRecord {
    pub read_name: String,
    pub basename: String,
    pub ccs: u32,
    pub barcode: String,
    pub sample: String,
    pub ee_pretrim: f64,
    pub ee_posttrim: f64,
    pub length_pretrim: usize,
    pub length_posttrim: usize,
    pub host_map: bool,
    pub f_primer_matches: Tri,
    pub r_primer_matches: Tri,
    pub f_primer_start: Option<i64>,
    pub f_primer_end: Option<i64>,
    pub r_primer_start: Option<i64>,
    pub r_primer_end: Option<i64>,
    pub read_orientation: Option<String>,
    pub primer_note: String,
    pub half_primer_match: Tri,
}

impl ReadRecord {
    pub fn new(read_name: &str) -> Self {
        ReadRecord {
            read_name: read_name.to_string(),
            basename: String::new(),
            ccs: 0,
            barcode: String::new(),
            sample: String::new(),
            ee_pretrim: 0.0,
            ee_posttrim: 0.0,
            length_pretrim: 0,
            length_posttrim: 0,
            host_map: false,
            f_primer_matches: Tri::Unknown,
            r_primer_matches: Tri::Unknown,
            f_primer_start: None,
            f_primer_end: None,
            r_primer_start: None,
            r_primer_end: None,
            read_orientation: None,
            primer_note: String::new(),
            half_primer_match: Tri::Unknown,
        }
    }

    pub fn tsv_row(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.read_name,
            self.basename,
            self.ccs,
            self.barcode,
            self.sample,
            self.ee_pretrim,
            self.ee_posttrim,
            self.length_pretrim,
            self.length_posttrim,
            self.host_map,
            self.f_primer_matches,
            self.r_primer_matches,
            na_int(self.f_primer_start),
            na_int(self.f_primer_end),
            na_int(self.r_primer_start),
            na_int(self.r_primer_end),
            self.read_orientation.as_deref().unwrap_or("NA"),
            self.primer_note,
            self.half_primer_match,
        )
    }
}

fn na_int(v: Option<i64>) -> String {
    match v {
        Some(n) => n.to_string(),
        None => "NA".to_string(),
    }
}

/// Sequence and quality string retained per read for fastq emission
/// during singleton recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqQual {
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl SeqQual {
    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}
