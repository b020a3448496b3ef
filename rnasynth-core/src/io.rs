//! FASTA input and output.

use std::io::Write;
use std::path::Path;

use bio::io::fasta;

use crate::types::{SeqRecord, SynthError};

/// Reads all sequences from a FASTA file as `(id, sequence)` records.
pub fn read_fasta_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<SeqRecord>, SynthError> {
    let reader = fasta::Reader::from_file(path.as_ref())
        .map_err(|e| SynthError::ParseError(e.to_string()))?;
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| SynthError::ParseError(e.to_string()))?;
        let seq = String::from_utf8(record.seq().to_vec())
            .map_err(|e| SynthError::ParseError(e.to_string()))?;
        records.push((record.id().to_string(), seq));
    }
    Ok(records)
}

/// Writes `(header, sequence)` records as FASTA.
pub fn write_fasta<W: Write>(
    writer: &mut W,
    records: impl IntoIterator<Item = SeqRecord>,
) -> Result<(), SynthError> {
    for (header, seq) in records {
        writeln!(writer, ">{header}")?;
        writeln!(writer, "{seq}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_fasta_sequences_basic() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, ">seq1 comment\nGGCC\nAAUU\n>seq2\nACGU\n").unwrap();
        let records = read_fasta_sequences(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ("seq1".to_string(), "GGCCAAUU".to_string()));
        assert_eq!(records[1].0, "seq2");
    }

    #[test]
    fn test_read_fasta_missing_file() {
        assert!(read_fasta_sequences("no_such_file.fa").is_err());
    }

    #[test]
    fn test_write_fasta_roundtrip() {
        let records = vec![("a;0;--;--".to_string(), "ACGU".to_string())];
        let mut out = Vec::new();
        write_fasta(&mut out, records).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">a;0;--;--\nACGU\n");
    }
}
