//! Command line interface of the `seqreduce` binary

mod reduce;
mod translate;

use anyhow::Result;
use clap::Parser;

pub use reduce::Reduce;
pub use translate::Translate;

/// Trait implemented by all seqreduce commands.
pub trait Command {
    fn execute(&self) -> Result<()>;
}

#[derive(Parser, Debug)]
#[command(version, about = "Reduce sequences in parallel and translate their coordinates")]
pub struct Args {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(Parser, Debug)]
pub enum Subcommand {
    #[command(display_order = 1)]
    Reduce(Reduce),
    #[command(display_order = 2)]
    Translate(Translate),
}
impl Command for Subcommand {
    fn execute(&self) -> Result<()> {
        match self {
            Self::Reduce(command) => command.execute(),
            Self::Translate(command) => command.execute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_parse_reduce() {
        let args = Args::try_parse_from([
            "seqreduce",
            "reduce",
            "--sequences",
            "in.fa.gz",
            "--output",
            "out.fa",
            "--offsets",
            "out.kofs",
            "--compress-offsets",
            "--threads",
            "0",
            "--preserve",
        ])
        .unwrap();
        let Subcommand::Reduce(reduce) = args.subcommand else {
            panic!("expected the reduce command");
        };
        assert_eq!(reduce.sequences, PathBuf::from("in.fa.gz"));
        assert_eq!(reduce.threads, 0);
        assert_eq!(reduce.line_width, 80);
        assert!(reduce.preserve);
        assert!(reduce.compress_offsets);
        assert!(reduce.reduction.is_none());
    }

    #[test]
    fn test_compression_requires_offsets() {
        let parsed = Args::try_parse_from([
            "seqreduce",
            "reduce",
            "--sequences",
            "in.fa",
            "--output",
            "out.fa",
            "--compress-offsets",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_translate() {
        let args = Args::try_parse_from([
            "seqreduce",
            "translate",
            "--offsets",
            "out.kofs",
            "--name",
            "seqB",
            "--position",
            "3",
            "--reverse",
        ])
        .unwrap();
        let Subcommand::Translate(translate) = args.subcommand else {
            panic!("expected the translate command");
        };
        assert_eq!(translate.name, "seqB");
        assert_eq!(translate.position, 3);
        assert!(translate.reverse);
    }
}
