use crate::error::{AnnotError, Result};
use memchr::memchr;

/// Borrowed FASTQ record. The header is kept whole (minus the leading
/// `@`) because downstream stages key on `;`-delimited tokens inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fq<'a> {
    pub head: &'a [u8],
    pub seq: &'a [u8],
    pub qual: &'a [u8],
}

impl<'a> Fq<'a> {
    #[inline]
    pub fn head_str(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.head)?)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

pub struct FastqParser<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> FastqParser<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        FastqParser { data, pos: 0, line: 1 }
    }

    #[inline]
    fn read_line(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        if start >= self.data.len() {
            return Err(AnnotError::InvalidFastq {
                line: self.line,
                msg: "unexpected end of file".to_string(),
            });
        }

        let mut end = match memchr(b'\n', &self.data[start..]) {
            Some(nl) => {
                self.pos = start + nl + 1;
                start + nl
            }
            None => {
                self.pos = self.data.len();
                self.data.len()
            }
        };
        self.line += 1;

        if end > start && self.data[end - 1] == b'\r' {
            end -= 1;
        }
        Ok(&self.data[start..end])
    }

    pub fn parse_record(&mut self) -> Result<Option<Fq<'a>>> {
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_whitespace() {
            if self.data[self.pos] == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
        if self.pos >= self.data.len() {
            return Ok(None);
        }

        let header_line = self.read_line()?;
        if header_line.first() != Some(&b'@') {
            return Err(AnnotError::InvalidFastq {
                line: self.line - 1,
                msg: "expected '@' at record start".to_string(),
            });
        }

        let seq = self.read_line()?;
        let sep = self.read_line()?;
        if sep.first() != Some(&b'+') {
            return Err(AnnotError::InvalidFastq {
                line: self.line - 1,
                msg: "expected '+' separator".to_string(),
            });
        }
        let qual = self.read_line()?;

        if seq.len() != qual.len() {
            return Err(AnnotError::InvalidFastq {
                line: self.line - 1,
                msg: format!(
                    "sequence and quality lengths differ (seq: {}, qual: {})",
                    seq.len(),
                    qual.len()
                ),
            });
        }

        Ok(Some(Fq {
            head: &header_line[1..],
            seq,
            qual,
        }))
    }
}

impl<'a> Iterator for FastqParser<'a> {
    type Item = Result<Fq<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_records() {
        let data = b"@r1;ccs=3\nACGT\n+\nIIII\n@r2;ccs=4\nTGCA\n+\nJJJJ\n";
        let records: Vec<_> = FastqParser::new(data)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].head, b"r1;ccs=3");
        assert_eq!(records[0].seq, b"ACGT");
        assert_eq!(records[1].qual, b"JJJJ");
    }

    #[test]
    fn tolerates_crlf_and_missing_trailing_newline() {
        let data = b"@r1\r\nACGT\r\n+\r\nIIII";
        let rec = FastqParser::new(data).parse_record().unwrap().unwrap();
        assert_eq!(rec.head, b"r1");
        assert_eq!(rec.seq, b"ACGT");
        assert_eq!(rec.qual, b"IIII");
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(FastqParser::new(b"").parse_record().unwrap().is_none());
        assert!(FastqParser::new(b"\n\n").parse_record().unwrap().is_none());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let data = b"@r1\nACGT\n+\nIII\n";
        match FastqParser::new(data).parse_record() {
            Err(AnnotError::InvalidFastq { .. }) => {}
            other => panic!("expected InvalidFastq, got {:?}", other),
        }
    }

    #[test]
    fn bad_separator_is_an_error() {
        let data = b"@r1\nACGT\nIIII\nIIII\n";
        assert!(FastqParser::new(data).parse_record().is_err());
    }
}
