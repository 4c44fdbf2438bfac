use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use seqreduce::{
    fasta::{self, DEFAULT_LINE_WIDTH},
    offsets, FastaWriter, PipelineBuilder, Record, Reduction, RunSummary,
};

use super::Command;

/// Apply a reduction to every sequence of a FASTA file
#[derive(Debug, Parser)]
#[command(name = "reduce")]
pub struct Reduce {
    /// Input sequences in FASTA format, optionally compressed
    #[arg(long)]
    pub sequences: PathBuf,

    /// Output path of the reduced sequences in FASTA format
    #[arg(long)]
    pub output: PathBuf,

    /// JSON character mapping; defaults to keeping the four nucleotides
    #[arg(long)]
    pub reduction: Option<PathBuf>,

    /// Path of the offset file mapping original to reduced positions
    #[arg(long)]
    pub offsets: Option<PathBuf>,

    /// Compress the entries of the offset file with zstd
    #[arg(long, requires = "offsets")]
    pub compress_offsets: bool,

    /// Number of worker threads (0 uses all cores)
    #[arg(short = 't', long, default_value_t = 1)]
    pub threads: usize,

    /// Write reduced sequences in input order
    #[arg(long)]
    pub preserve: bool,

    /// Width of sequence lines in the output (0 disables wrapping)
    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    pub line_width: usize,
}
impl Reduce {
    fn load_reduction(&self) -> Result<Reduction> {
        match &self.reduction {
            Some(path) => Reduction::from_path(path)
                .with_context(|| format!("Could not parse reduction file {}", path.display())),
            None => Ok(Reduction::nucleotides()),
        }
    }

    fn num_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }

    fn write_reduced(&self, batch: Vec<Record>, reduction: Reduction) -> Result<RunSummary> {
        let pipeline = PipelineBuilder::default()
            .pool_size(self.num_threads())
            .track_offsets(self.offsets.is_some())
            .preserve_order(self.preserve)
            .build()?;

        let handle = File::create(&self.output)
            .map(BufWriter::new)
            .with_context(|| format!("Could not create output FASTA {}", self.output.display()))?;
        let mut writer = FastaWriter::new(handle).with_line_width(self.line_width);
        let summary = pipeline.run(batch, Arc::new(reduction), &mut writer);
        drop(writer);

        if summary.is_err() {
            remove_partial(&self.output);
        }
        Ok(summary?)
    }
}

impl Command for Reduce {
    fn execute(&self) -> Result<()> {
        let reduction = self.load_reduction()?;
        let batch = fasta::read_batch(&self.sequences)
            .with_context(|| format!("Error reading FASTA {}", self.sequences.display()))?;

        let summary = self.write_reduced(batch, reduction)?;

        if let Some(path) = &self.offsets {
            offsets::write_offsets_to_path(path, &summary.offsets, self.compress_offsets)
                .with_context(|| format!("Could not write offset file {}", path.display()))?;
            info!(
                "Wrote {} offset entries to {}",
                summary.offsets.len(),
                path.display()
            );
        }

        info!(
            "Reduced {} sequences into {}",
            summary.records,
            self.output.display()
        );
        Ok(())
    }
}

fn remove_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!("Could not remove partial output {}: {err}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use seqreduce::offsets::OffsetReader;

    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("seqreduce-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn command(dir: &Path) -> Reduce {
        Reduce {
            sequences: dir.join("in.fa"),
            output: dir.join("out.fa"),
            reduction: None,
            offsets: Some(dir.join("out.kofs")),
            compress_offsets: true,
            threads: 2,
            preserve: true,
            line_width: 3,
        }
    }

    #[test]
    fn test_reduce_end_to_end() -> Result<()> {
        let dir = scratch_dir("reduce");
        let reduce = command(&dir);
        File::create(&reduce.sequences)?.write_all(b">seqA\nACGT\n>seqB\nAANT\n")?;

        reduce.execute()?;

        let output = fs::read_to_string(&reduce.output)?;
        assert_eq!(output, ">seqA\nACG\nT\n>seqB\nAAT\n");

        let mut reader = OffsetReader::from_path(dir.join("out.kofs"))?;
        assert_eq!(reader.num_records(), 2);
        let mask = reader.find_mask("seqB")?.unwrap();
        assert_eq!(mask.translate(2), None);
        assert_eq!(mask.translate(3), Some(2));

        fs::remove_dir_all(dir)?;
        Ok(())
    }

    #[test]
    fn test_unreadable_input_writes_nothing() -> Result<()> {
        let dir = scratch_dir("failed");
        let reduce = command(&dir);
        File::create(&reduce.sequences)?.write_all(b">seqA\nAC\xffGT\n")?;

        assert!(reduce.execute().is_err());
        assert!(!reduce.output.exists());
        assert!(!dir.join("out.kofs").exists());

        fs::remove_dir_all(dir)?;
        Ok(())
    }

    #[test]
    fn test_remove_partial() -> Result<()> {
        let dir = scratch_dir("partial");
        let path = dir.join("partial.fa");
        File::create(&path)?.write_all(b">seqA\nAC")?;
        remove_partial(&path);
        assert!(!path.exists());
        remove_partial(&path);

        fs::remove_dir_all(dir)?;
        Ok(())
    }
}
