//! Character reductions
//!
//! A [`Reduction`] maps every byte of a sequence either to a replacement byte or to
//! nothing. Bytes without an entry are ambiguous and are deleted from the output,
//! which is what makes the keep-mask of a reduction non-trivial.
//!
//! Mappings are read from JSON objects whose keys and values are single ASCII
//! characters:
//!
//! ```json
//! { "A": "R", "G": "R", "C": "Y", "T": "Y" }
//! ```
//!
//! Lookups are case-sensitive; a mapping that should accept soft-masked input has
//! to list the lowercase characters as well.

use std::{collections::BTreeMap, fs::File, io::BufReader, io::Read, path::Path};

use serde::Deserialize;

use crate::{
    error::ReductionError,
    job::{MaskedTransform, Transform},
    mask::KeepMask,
    Result,
};

/// A per-byte reduction that deletes unmapped bytes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>")]
pub struct Reduction {
    table: [Option<u8>; 256],
}
impl Reduction {
    /// Builds a reduction from a character mapping
    pub fn from_mapping(mapping: &BTreeMap<String, String>) -> Result<Self> {
        Ok(Self::try_from_mapping(mapping)?)
    }

    fn try_from_mapping(
        mapping: &BTreeMap<String, String>,
    ) -> std::result::Result<Self, ReductionError> {
        let mut table = [None; 256];
        for (key, value) in mapping {
            let from =
                single_ascii(key).ok_or_else(|| ReductionError::InvalidKey(key.clone()))?;
            let to = single_ascii(value).ok_or_else(|| ReductionError::InvalidValue {
                key: key.clone(),
                value: value.clone(),
            })?;
            table[usize::from(from)] = Some(to);
        }
        Ok(Self { table })
    }

    /// Reads a JSON mapping
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mapping: BTreeMap<String, String> = serde_json::from_reader(reader)?;
        Self::from_mapping(&mapping)
    }

    /// Reads a JSON mapping from a file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Keeps the four nucleotides and deletes everything else
    ///
    /// Lowercase nucleotides are kept and uppercased; `N` and the other IUPAC
    /// ambiguity codes are deleted.
    #[must_use]
    pub fn nucleotides() -> Self {
        let mut table = [None; 256];
        for base in *b"ACGT" {
            table[usize::from(base)] = Some(base);
            table[usize::from(base.to_ascii_lowercase())] = Some(base);
        }
        Self { table }
    }

    /// Returns the replacement for a byte, or `None` if the byte is deleted
    #[must_use]
    pub fn lookup(&self, byte: u8) -> Option<u8> {
        self.table[usize::from(byte)]
    }

    /// Number of bytes with a replacement
    #[must_use]
    pub fn mapped(&self) -> usize {
        self.table.iter().filter(|entry| entry.is_some()).count()
    }
}

impl TryFrom<BTreeMap<String, String>> for Reduction {
    type Error = ReductionError;

    fn try_from(mapping: BTreeMap<String, String>) -> std::result::Result<Self, Self::Error> {
        Self::try_from_mapping(&mapping)
    }
}

fn single_ascii(s: &str) -> Option<u8> {
    match s.as_bytes() {
        [byte] if byte.is_ascii() => Some(*byte),
        _ => None,
    }
}

impl Transform for Reduction {
    fn apply(&self, sequence: &str) -> String {
        sequence
            .bytes()
            .filter_map(|byte| self.lookup(byte))
            .map(char::from)
            .collect()
    }
}

impl MaskedTransform for Reduction {
    fn apply_masked(&self, sequence: &str) -> (String, KeepMask) {
        let mut reduced = String::with_capacity(sequence.len());
        let mut keep = KeepMask::with_capacity(sequence.len());
        for byte in sequence.bytes() {
            match self.lookup(byte) {
                Some(to) => {
                    reduced.push(char::from(to));
                    keep.push(true);
                }
                None => keep.push(false),
            }
        }
        (reduced, keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const PURINES: &str = r#"{"A": "R", "G": "R", "C": "Y", "T": "Y"}"#;

    #[test]
    fn test_nucleotides() {
        let reduction = Reduction::nucleotides();
        assert_eq!(reduction.apply("ACNGTRacgt"), "ACGTACGT");
        assert_eq!(reduction.mapped(), 8);
    }

    #[test]
    fn test_from_reader() -> Result<()> {
        let reduction = Reduction::from_reader(PURINES.as_bytes())?;
        assert_eq!(reduction.apply("AGNCTa"), "RRYY");
        assert_eq!(reduction.lookup(b'a'), None);
        Ok(())
    }

    #[test]
    fn test_masked_matches_plain() -> Result<()> {
        let reduction = Reduction::from_reader(PURINES.as_bytes())?;
        let (reduced, keep) = reduction.apply_masked("ANNGTX");
        assert_eq!(reduced, reduction.apply("ANNGTX"));
        assert_eq!(reduced, "RRY");
        assert_eq!(keep.len(), 6);
        assert_eq!(keep.count_ones(), 3);
        assert_eq!(
            keep.iter().collect::<Vec<_>>(),
            vec![true, false, false, true, true, false]
        );
        assert_eq!(keep.rank(5)?, reduced.len());
        Ok(())
    }

    #[test]
    fn test_invalid_key() {
        let err = Reduction::from_reader(r#"{"AC": "R"}"#.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::ReductionError(ReductionError::InvalidKey(key)) if key == "AC"
        ));
    }

    #[test]
    fn test_invalid_value() {
        let err = Reduction::from_reader(r#"{"A": ""}"#.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::ReductionError(ReductionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_not_a_mapping() {
        let err = Reduction::from_reader("[1, 2]".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::JsonError(_)));
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: Reduction = serde_json::from_str(PURINES).unwrap();
        assert_eq!(parsed.lookup(b'T'), Some(b'Y'));
        assert!(serde_json::from_str::<Reduction>(r#"{"é": "A"}"#).is_err());
    }
}
