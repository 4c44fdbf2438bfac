/// Custom Result type for seqreduce operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the seqreduce library, encompassing all possible error cases
/// that can occur while reducing sequences and handling their coordinate masks.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors from encoding, decoding or querying keep-masks
    CodecError(#[from] CodecError),
    /// Errors raised while executing a single job
    TransformError(#[from] TransformError),
    /// Protocol violations of the dispatch / pool / collect pipeline
    PipelineError(#[from] PipelineError),
    /// Invalid pipeline configuration
    ConfigError(#[from] ConfigError),
    /// Errors while building a reduction function
    ReductionError(#[from] ReductionError),
    /// Errors specific to the offset artifact
    OffsetFileError(#[from] OffsetFileError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// UTF-8 errors on record names or sequences
    Utf8Error(#[from] std::str::Utf8Error),
    /// UTF-8 errors on owned record names or sequences
    FromUtf8Error(#[from] std::string::FromUtf8Error),
    /// Errors from the FASTA parser
    FastaError(#[from] seq_io::fasta::Error),
    /// Errors while detecting or opening a compressed input
    NifflerError(#[from] niffler::Error),
    /// Errors while parsing a reduction mapping
    JsonError(#[from] serde_json::Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}

/// Errors from the coordinate codec
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// The encoded mask could not be parsed
    #[error("Malformed mask payload: {0}")]
    MalformedPayload(#[from] PayloadError),

    /// A select query asked for a kept position that does not exist
    ///
    /// # Arguments
    /// * First `usize` - The requested (1-indexed) rank
    /// * Second `usize` - The number of kept positions in the mask
    #[error("Requested rank ({0}) is out of the kept range ({1})")]
    OutOfRange(usize, usize),

    /// A rank query addressed a position past the end of the mask
    ///
    /// # Arguments
    /// * First `usize` - The requested position
    /// * Second `usize` - The number of positions in the mask
    #[error("Requested position ({0}) is out of mask range ({1})")]
    PositionOutOfRange(usize, usize),
}

/// Defects found while decoding an encoded keep-mask
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PayloadError {
    /// The buffer is shorter than the fixed-size mask header
    #[error("Buffer of {0} bytes is shorter than the mask header ({1})")]
    TruncatedHeader(usize, usize),

    /// The magic number in the header does not match the expected value
    #[error("Invalid magic number: {0}")]
    InvalidMagicNumber(u32),

    /// The format version in the header is not supported
    #[error("Invalid format version: {0}")]
    InvalidFormatVersion(u8),

    /// The reserved bytes in the header contain unexpected values
    #[error("Invalid reserved bytes")]
    InvalidReservedBytes,

    /// The payload size does not match the declared number of positions
    ///
    /// # Arguments
    /// * First `usize` - The actual number of payload bytes
    /// * Second `usize` - The expected number of payload bytes
    #[error("Invalid number of payload bytes provided: {0}. Expected: {1}")]
    InvalidSize(usize, usize),

    /// The declared number of kept positions disagrees with the payload
    #[error("Header declares {declared} kept positions but payload holds {counted}")]
    InconsistentKept { declared: u64, counted: usize },

    /// Bits beyond the last position of the final word are set
    #[error("Padding bits past the last position are not zero")]
    DirtyPadding,
}

/// Mismatch between a keep-mask and the sequences it describes
#[derive(thiserror::Error, Debug)]
pub enum MaskMismatch {
    /// The mask does not cover the original sequence exactly
    #[error("mask covers {mask} positions but the original sequence has {sequence}")]
    OriginalLength { mask: usize, sequence: usize },

    /// The number of kept positions differs from the transformed length
    #[error("mask keeps {kept} positions but the transformed sequence has {transformed}")]
    KeptLength { kept: usize, transformed: usize },
}

/// Errors that can occur while executing a job
#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    /// The keep-mask of a record could not be encoded
    #[error("Could not encode the keep-mask of record {name}: {source}")]
    CodecFailure {
        name: String,
        #[source]
        source: MaskMismatch,
    },
}

/// Violations of the one-outcome-per-job pipeline protocol
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The result stream closed before every dispatched job reported back
    #[error("Received {received} outcomes for {expected} dispatched jobs")]
    MissingOutcomes { expected: usize, received: usize },

    /// A job that tracks offsets produced a record without a mask
    #[error("Record {0} carries no keep-mask although offsets are tracked")]
    MissingMask(String),

    /// A worker thread panicked while executing a job
    ///
    /// Returned by the [`WorkerPool`](crate::pipeline::WorkerPool) supervisor. A
    /// full pipeline run reports the lost outcome as `MissingOutcomes` instead and
    /// only logs the panic.
    #[error("Worker thread {0} panicked")]
    WorkerPanicked(usize),

    /// The dispatcher thread panicked while feeding the work queue
    #[error("Dispatcher thread panicked")]
    DispatcherPanicked,

    /// The thread supervising the workers panicked
    #[error("Worker pool supervisor panicked")]
    SupervisorPanicked,
}

/// Errors from pipeline configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The worker pool needs at least one worker
    #[error("Invalid pool size: {0}. At least one worker is required")]
    InvalidPoolSize(usize),
}

/// Errors raised while building a reduction from a character mapping
#[derive(thiserror::Error, Debug)]
pub enum ReductionError {
    /// Mapping keys must be exactly one ASCII character
    #[error("Invalid mapping key: {0:?}. Expected a single ASCII character")]
    InvalidKey(String),

    /// Mapping values must be exactly one ASCII character
    #[error("Invalid mapping value for key {key:?}: {value:?}. Expected a single ASCII character")]
    InvalidValue { key: String, value: String },
}

/// Errors specific to reading and writing the offset artifact
#[derive(thiserror::Error, Debug)]
pub enum OffsetFileError {
    /// The magic number in the header does not match the expected value
    #[error("Invalid magic number: {0}")]
    InvalidMagicNumber(u32),

    /// The format version in the header is not supported
    #[error("Invalid format version: {0}")]
    InvalidFormatVersion(u8),

    /// The reserved bytes in the header contain unexpected values
    #[error("Invalid reserved bytes")]
    InvalidReservedBytes,

    /// The compression flag in the header is neither 0 nor 1
    #[error("Invalid compression flag: {0}")]
    InvalidCompressionFlag(u8),

    /// A record name does not fit into the 32-bit length prefix
    #[error("Record name of {0} bytes is too long for the offset file")]
    NameTooLong(usize),

    /// The file ended before the declared number of entries was read
    #[error("Offset file truncated after {0} of {1} entries")]
    Truncated(u64, u64),
}
