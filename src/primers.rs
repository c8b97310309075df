use crate::error::{AnnotError, Result};
use crate::writer::FastaWriter;
use std::path::{Path, PathBuf};

/// The two derived probe databases used for singleton recovery: each
/// carries the half-length probe for one primer end plus the full-length
/// sequence of the other.
pub struct HalfPrimerFiles {
    pub forward_half: PathBuf,
    pub reverse_half: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FastaEntry {
    head: String,
    seq: Vec<u8>,
}

fn read_fasta(path: &Path) -> Result<Vec<FastaEntry>> {
    let text = std::fs::read_to_string(path)?;
    let mut entries: Vec<FastaEntry> = Vec::new();

    for line in text.lines() {
        if let Some(head) = line.strip_prefix('>') {
            entries.push(FastaEntry {
                head: head.to_string(),
                seq: Vec::new(),
            });
        } else if !line.is_empty() {
            match entries.last_mut() {
                Some(entry) => entry.seq.extend_from_slice(line.trim_end().as_bytes()),
                None => {
                    return Err(AnnotError::InvalidFasta {
                        path: path.to_path_buf(),
                        msg: "sequence data before first '>' header".to_string(),
                    })
                }
            }
        }
    }
    Ok(entries)
}

/// First half of a primer, inclusive of the midpoint index: a length-21
/// primer yields an 11-base probe. The one-base overlap at the midpoint
/// is intentional and must not be shortened.
#[inline]
fn half_probe(seq: &[u8]) -> &[u8] {
    &seq[..=seq.len() / 2]
}

/// Derive the two half-primer probe databases from the combined primer
/// file. Entries are classified by the substrings `forward`/`reverse` in
/// their identifiers (case-sensitive); anything else is skipped. All
/// emitted sequences are upper-cased.
pub fn create_half_primer_files(primer_file: &Path, work_dir: &Path) -> Result<HalfPrimerFiles> {
    let fow_path = work_dir.join("primer_half_fow.fasta");
    let rev_path = work_dir.join("primer_half_rev.fasta");

    let entries = read_fasta(primer_file)?;
    {
        let mut fow = FastaWriter::to_file(&fow_path)?;
        let mut rev = FastaWriter::to_file(&rev_path)?;

        for entry in &entries {
            if entry.seq.is_empty() {
                continue;
            }
            let upper = entry.seq.to_ascii_uppercase();
            if entry.head.contains("forward") {
                fow.write_record(&entry.head, half_probe(&upper))?;
                rev.write_record(&entry.head, &upper)?;
            } else if entry.head.contains("reverse") {
                fow.write_record(&entry.head, &upper)?;
                rev.write_record(&entry.head, half_probe(&upper))?;
            }
        }

        fow.flush()?;
        rev.flush()?;
    }

    require_non_empty(&fow_path)?;
    require_non_empty(&rev_path)?;

    Ok(HalfPrimerFiles {
        forward_half: fow_path,
        reverse_half: rev_path,
    })
}

fn require_non_empty(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(AnnotError::MissingArtifact {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn half_probe_is_inclusive_of_midpoint() {
        let seq = b"AAAAAAAAAACAAAAAAAAAA"; // length 21
        assert_eq!(half_probe(seq).len(), 11);
        let seq20 = b"AAAAAAAAAACAAAAAAAAA"; // length 20
        assert_eq!(half_probe(seq20).len(), 11);
        assert_eq!(half_probe(b"A"), b"A");
    }

    #[test]
    fn builds_both_probe_files() {
        let mut primers = NamedTempFile::new().unwrap();
        primers
            .write_all(b">27f_forward\nagagtttgatcmtggctcag\n>1492r_reverse\ntacggytaccttgttacgactt\n")
            .unwrap();

        let dir = tempdir().unwrap();
        let files = create_half_primer_files(primers.path(), dir.path()).unwrap();

        let fow = std::fs::read_to_string(&files.forward_half).unwrap();
        let rev = std::fs::read_to_string(&files.reverse_half).unwrap();

        // Forward entry: half in the forward file, full in the reverse one.
        assert_eq!(
            fow,
            ">27f_forward\nAGAGTTTGATC\n>1492r_reverse\nTACGGYTACCTTGTTACGACTT\n"
        );
        assert_eq!(
            rev,
            ">27f_forward\nAGAGTTTGATCMTGGCTCAG\n>1492r_reverse\nTACGGYTACCTT\n"
        );
    }

    #[test]
    fn untagged_entries_are_skipped() {
        let mut primers = NamedTempFile::new().unwrap();
        primers
            .write_all(b">spike_in\nACGTACGT\n>27f_forward\nACGTACGTACGT\n>1492r_reverse\nTTGGCCAATTGG\n")
            .unwrap();

        let dir = tempdir().unwrap();
        let files = create_half_primer_files(primers.path(), dir.path()).unwrap();
        let fow = std::fs::read_to_string(&files.forward_half).unwrap();
        assert!(!fow.contains("spike_in"));
    }

    #[test]
    fn empty_output_is_fatal() {
        let mut primers = NamedTempFile::new().unwrap();
        primers.write_all(b">untagged\nACGT\n").unwrap();

        let dir = tempdir().unwrap();
        match create_half_primer_files(primers.path(), dir.path()) {
            Err(AnnotError::MissingArtifact { .. }) => {}
            other => panic!("expected MissingArtifact, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn multiline_fasta_sequences_concatenate() {
        let mut primers = NamedTempFile::new().unwrap();
        primers
            .write_all(b">27f_forward\nAGAGTTTGAT\nCMTGGCTCAG\n")
            .unwrap();
        let entries = read_fasta(primers.path()).unwrap();
        assert_eq!(entries[0].seq, b"AGAGTTTGATCMTGGCTCAG");
    }
}
