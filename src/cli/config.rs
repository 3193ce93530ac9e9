// CLI configuration
use clap::{Args, Parser, Subcommand, ValueEnum};

use oxidemux::{Codec, Container, ReaderConfig};

/// Oxidemux - Ogg/WebM audio packet extractor
#[derive(Parser, Debug)]
#[command(name = "oxidemux")]
#[command(about = "Extract raw Opus and Vorbis packets from Ogg and WebM streams", long_about = None)]
#[command(version)]
#[command(author = "xwsjjctz <xwsjjctz@icloud.com>")]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the container of file(s)
    Detect {
        /// Input file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// List every packet and notice in a stream
    Packets {
        /// Input file path, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Include base64 packet payloads
        #[arg(long)]
        payload: bool,
    },

    /// Write the audio packets to a file, each prefixed with its 4-byte big-endian length
    Extract {
        /// Input file path, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output file path, or "-" for stdout
        #[arg(short, long)]
        output: String,
    },

    /// Show the comment header of a stream
    Tags {
        /// Input file path, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Count packets in every file matching a pattern
    Scan {
        /// Directory path
        #[arg(short, long)]
        directory: String,

        /// File pattern (e.g., "*.ogg", "*.webm")
        #[arg(short, long)]
        pattern: String,

        /// Codec carried by WebM files
        #[arg(long, value_enum, default_value = "opus")]
        codec: CodecArg,
    },
}

/// How to open an input stream
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Container format (detected from the first bytes if omitted)
    #[arg(short, long, value_enum)]
    pub container: Option<ContainerArg>,

    /// Codec carried by the container
    #[arg(long, value_enum, default_value = "opus")]
    pub codec: CodecArg,

    /// Bytes read from the input per chunk
    #[arg(long, default_value_t = ReaderConfig::default().chunk_size)]
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContainerArg {
    Ogg,
    Webm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodecArg {
    Opus,
    Vorbis,
}

impl From<ContainerArg> for Container {
    fn from(arg: ContainerArg) -> Self {
        match arg {
            ContainerArg::Ogg => Container::Ogg,
            ContainerArg::Webm => Container::Webm,
        }
    }
}

impl From<CodecArg> for Codec {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Opus => Codec::Opus,
            CodecArg::Vorbis => Codec::Vorbis,
        }
    }
}

impl SourceArgs {
    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            chunk_size: self.chunk_size,
        }
    }
}
