use std::fmt;

use thiserror::Error;

/// A named sequence, as read from FASTA: `(id, sequence)`.
pub type SeqRecord = (String, String);

/// Delimiter used when assembling synthesized-sequence headers.
pub const HEADER_DELIMITER: char = ';';

/// Wildcard pad character in sequence constraint strings.
pub const SEQUENCE_PAD: char = 'N';

/// Inert pad character in structure constraint strings.
///
/// Carried over from the upstream constraint format: any position that is
/// neither a retained basepair nor a qualifying unpaired region is padded
/// with `A`, which downstream designers treat as unconstrained.
pub const STRUCTURE_PAD: char = 'A';

/// Placeholder substituted for pad characters when constraints are embedded
/// in output headers, keeping them readable next to real nucleotides.
pub const HEADER_PLACEHOLDER: char = '-';

/// Errors produced by the synthesis pipeline.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Node ids are not 0-based contiguous, a basepair is duplicated or out
    /// of range, or a node lacks a required importance annotation.
    #[error("malformed graph: {0}")]
    GraphMalformed(String),
    /// GC content is undefined for a graph with no nodes.
    #[error("cannot compute GC content of an empty graph")]
    ZeroNodeGraph,
    /// Input sequence contains characters outside the RNA alphabet.
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),
    /// Error parsing input data.
    #[error("parse error: {0}")]
    ParseError(String),
    /// File I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Classifier training could not be carried out.
    #[error("training failed: {0}")]
    Training(String),
}

/// RNA nucleotide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    A,
    U,
    G,
    C,
}

impl Base {
    /// Parses one character, accepting lowercase and DNA `T` for `U`.
    pub fn from_char(c: char) -> Result<Self, SynthError> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'U' | 'T' => Ok(Self::U),
            'G' => Ok(Self::G),
            'C' => Ok(Self::C),
            other => Err(SynthError::InvalidSequence(format!(
                "unexpected character '{other}' in RNA sequence"
            ))),
        }
    }

    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::U => 'U',
            Self::G => 'G',
            Self::C => 'C',
        }
    }

    /// Watson-Crick complement.
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            Self::A => Self::U,
            Self::U => Self::A,
            Self::G => Self::C,
            Self::C => Self::G,
        }
    }

    /// Whether this base counts toward GC content.
    #[must_use]
    pub const fn is_gc(self) -> bool {
        matches!(self, Self::G | Self::C)
    }

    /// Whether two bases can form a basepair (Watson-Crick or GU wobble).
    #[must_use]
    pub const fn can_pair(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::A, Self::U)
                | (Self::U, Self::A)
                | (Self::G, Self::C)
                | (Self::C, Self::G)
                | (Self::G, Self::U)
                | (Self::U, Self::G)
        )
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parses an RNA sequence string into bases.
pub fn parse_rna(seq: &str) -> Result<Vec<Base>, SynthError> {
    seq.chars().map(Base::from_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_from_char() {
        assert_eq!(Base::from_char('a').unwrap(), Base::A);
        assert_eq!(Base::from_char('T').unwrap(), Base::U);
        assert_eq!(Base::from_char('u').unwrap(), Base::U);
        assert!(Base::from_char('X').is_err());
    }

    #[test]
    fn test_complement_involution() {
        for b in [Base::A, Base::U, Base::G, Base::C] {
            assert_eq!(b.complement().complement(), b);
            assert!(b.can_pair(b.complement()));
        }
    }

    #[test]
    fn test_wobble_pair() {
        assert!(Base::G.can_pair(Base::U));
        assert!(Base::U.can_pair(Base::G));
        assert!(!Base::A.can_pair(Base::G));
    }

    #[test]
    fn test_parse_rna_maps_dna() {
        let bases = parse_rna("acgt").unwrap();
        assert_eq!(bases, vec![Base::A, Base::C, Base::G, Base::U]);
    }

    #[test]
    fn test_parse_rna_rejects_invalid() {
        assert!(matches!(
            parse_rna("ACGN"),
            Err(SynthError::InvalidSequence(_))
        ));
    }
}
