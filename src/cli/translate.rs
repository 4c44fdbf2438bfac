use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use seqreduce::{mask::KeepMask, offsets::OffsetReader};

use super::Command;

/// Translate a coordinate between an original and a reduced sequence
///
/// Positions are 0-based. Deleted original positions have no reduced coordinate.
#[derive(Debug, Parser)]
#[command(name = "translate")]
pub struct Translate {
    /// Offset file written by `seqreduce reduce --offsets`
    #[arg(long)]
    pub offsets: PathBuf,

    /// Name of the record to query
    #[arg(long)]
    pub name: String,

    /// Position to translate
    #[arg(long)]
    pub position: usize,

    /// Translate a reduced position back to its original position
    #[arg(long)]
    pub reverse: bool,
}
impl Translate {
    fn answer(&self, mask: &KeepMask) -> Result<String> {
        if self.reverse {
            let original = mask.select(self.position + 1)?;
            return Ok(original.to_string());
        }
        let kept = mask.rank(self.position)?;
        match mask.get(self.position) {
            Some(true) => Ok((kept - 1).to_string()),
            _ => Ok("deleted".to_string()),
        }
    }
}

impl Command for Translate {
    fn execute(&self) -> Result<()> {
        let mut reader = OffsetReader::from_path(&self.offsets)?;
        let mask = reader
            .find_mask(&self.name)?
            .ok_or_else(|| anyhow!("No record named {} in {}", self.name, self.offsets.display()))?;
        println!("{}", self.answer(&mask)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(position: usize, reverse: bool) -> Translate {
        Translate {
            offsets: PathBuf::new(),
            name: "seqB".to_string(),
            position,
            reverse,
        }
    }

    #[test]
    fn test_answers() -> Result<()> {
        let mask: KeepMask = [true, true, false, true].into_iter().collect();
        assert_eq!(query(3, false).answer(&mask)?, "2");
        assert_eq!(query(2, false).answer(&mask)?, "deleted");
        assert_eq!(query(2, true).answer(&mask)?, "3");
        assert!(query(4, false).answer(&mask).is_err());
        assert!(query(3, true).answer(&mask).is_err());
        Ok(())
    }
}
