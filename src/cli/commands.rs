// CLI command implementations
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Write};

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use glob::glob;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use oxidemux::comment::{VorbisFields, VORBIS_COMMENT_SIGNATURE};
use oxidemux::webm::vorbis::VORBIS_SIGNATURE;
use oxidemux::{
    detect_file, open_demuxer, sniff, Codec, Container, Demux, DemuxEvent, EventKind, OpusHead,
    PacketReader, ReaderConfig, VorbisComment,
};

use crate::cli::config::{CodecArg, Commands, Config, SourceArgs};
use crate::cli::output::{OutputFormatter, ProgressBar};

type Input = Box<dyn Read>;
type EventStream = PacketReader<Input, Box<dyn Demux + Send>>;

/// An opened input with its demuxer
struct Source {
    container: Container,
    codec: Codec,
    events: EventStream,
}

/// One line of the `packets` listing
#[derive(Debug, Serialize)]
struct EventRecord {
    index: usize,
    kind: EventKind,
    len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
    #[serde(skip)]
    head: Option<OpusHead>,
}

/// Totals for one input
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct PacketCount {
    packets: usize,
    bytes: usize,
}

/// Run the selected subcommand
pub fn run(config: &Config) -> Result<()> {
    let formatter = OutputFormatter::new(config.format, config.quiet);

    match &config.command {
        Commands::Detect { files } => command_detect(files, &formatter),
        Commands::Packets { file, source, payload } => command_packets(file, source, *payload, &formatter),
        Commands::Extract { file, source, output } => command_extract(file, source, output, &formatter),
        Commands::Tags { file, source } => command_tags(file, source, &formatter),
        Commands::Scan {
            directory,
            pattern,
            codec,
        } => command_scan(directory, pattern, *codec, &formatter),
    }
}

/// Detect the container of each file
fn command_detect(files: &[String], formatter: &OutputFormatter) -> Result<()> {
    let mut records = Vec::with_capacity(files.len());
    let mut failed = 0;

    for file_path in files {
        match detect_file(file_path) {
            Ok(Some(container)) => records.push(json!({ "file": file_path, "container": container })),
            Ok(None) => {
                formatter.print_error(&format!("{}: Unknown format", file_path));
                failed += 1;
            }
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                failed += 1;
            }
        }
    }

    formatter.output_records(&records, &mut io::stdout().lock())?;
    if failed > 0 {
        bail!("{} of {} files not recognized", failed, files.len());
    }
    Ok(())
}

/// List every event of a stream
fn command_packets(file: &str, args: &SourceArgs, payload: bool, formatter: &OutputFormatter) -> Result<()> {
    let mut source = open_source(file, args)?;
    let records = list_events(&mut source.events, payload).with_context(|| format!("{}: demux failed", file))?;
    let head = records.iter().find_map(|r| r.head.as_ref());

    let count = PacketCount {
        packets: records.iter().filter(|r| r.kind == EventKind::Packet).count(),
        bytes: records.iter().filter(|r| r.kind == EventKind::Packet).map(|r| r.len).sum(),
    };

    let rows = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    formatter.output_records(&rows, &mut io::stdout().lock())?;
    if let Some(head) = head {
        formatter.print_info(&format!(
            "OpusHead: {} channels, {} Hz input, pre-skip {}",
            head.channels, head.input_sample_rate, head.pre_skip
        ));
    }
    formatter.print_success(&packet_summary(file, source.container, source.codec, &count));
    Ok(())
}

fn packet_summary(file: &str, container: Container, codec: Codec, count: &PacketCount) -> String {
    format!("{}: {}/{}: {} packets, {} bytes", file, container, codec, count.packets, count.bytes)
}

/// Write audio packets with a 4-byte big-endian length prefix each
fn command_extract(file: &str, args: &SourceArgs, output: &str, formatter: &OutputFormatter) -> Result<()> {
    let mut source = open_source(file, args)?;

    let mut writer: Box<dyn Write> = if output == "-" {
        Box::new(BufWriter::new(io::stdout().lock()))
    } else {
        let out = File::create(output).with_context(|| format!("failed to create {}", output))?;
        Box::new(BufWriter::new(out))
    };

    let count = write_framed(&mut source.events, &mut writer).with_context(|| format!("{}: demux failed", file))?;
    writer.flush()?;

    formatter.print_success(&format!("Extracted {} packets ({} bytes) to {}", count.packets, count.bytes, output));
    Ok(())
}

/// Print the comment header of a stream
fn command_tags(file: &str, args: &SourceArgs, formatter: &OutputFormatter) -> Result<()> {
    let mut source = open_source(file, args)?;
    let comment = find_comment(&mut source.events).with_context(|| format!("{}: demux failed", file))?;

    let Some(comment) = comment else {
        bail!("{}: no comment header found", file);
    };
    if let Some(title) = comment.get(VorbisFields::TITLE) {
        let artist = comment.get(VorbisFields::ARTIST).map_or("unknown artist", String::as_str);
        match comment.get(VorbisFields::ALBUM) {
            Some(album) => formatter.print_info(&format!("{} - {} ({})", artist, title, album)),
            None => formatter.print_info(&format!("{} - {}", artist, title)),
        }
    }
    formatter.output_value(&comment_value(file, &comment), &mut io::stdout().lock())?;
    Ok(())
}

/// Count packets in every file matching a pattern
fn command_scan(directory: &str, pattern: &str, codec: CodecArg, formatter: &OutputFormatter) -> Result<()> {
    // Build glob pattern
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory, pattern)
    } else {
        format!("{}/**/{}", directory, pattern)
    };

    let mut files = Vec::new();
    for entry in glob(&glob_pattern).context("Invalid glob pattern")? {
        match entry {
            Ok(path) if path.is_file() => {
                if let Some(path_str) = path.to_str() {
                    files.push(path_str.to_string());
                }
            }
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
        }
    }

    if files.is_empty() {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }
    formatter.print_info(&format!("Processing {} files...", files.len()));

    let args = SourceArgs {
        container: None,
        codec,
        chunk_size: ReaderConfig::default().chunk_size,
    };
    let mut progress = ProgressBar::new(files.len(), !formatter.quiet());
    let mut records = Vec::with_capacity(files.len());
    let mut error_count = 0;

    for file_path in &files {
        progress.increment(file_path);

        let result = open_source(file_path, &args).and_then(|mut source| {
            let count = count_packets(&mut source.events)?;
            Ok((source.container, count))
        });
        match result {
            Ok((container, count)) => records.push(json!({
                "file": file_path,
                "container": container,
                "codec": Codec::from(codec),
                "packets": count.packets,
                "bytes": count.bytes,
            })),
            Err(e) => {
                formatter.print_error(&format!("{}: {:#}", file_path, e));
                error_count += 1;
            }
        }
    }

    formatter.output_records(&records, &mut io::stdout().lock())?;
    formatter.print_info(&format!("Completed: {} successful, {} errors", records.len(), error_count));
    Ok(())
}

/// Open a file (or stdin for "-") and pick a demuxer for it
fn open_source(file: &str, args: &SourceArgs) -> Result<Source> {
    let mut input: Input = if file == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(file).with_context(|| format!("failed to open {}", file))?)
    };

    let container = match args.container {
        Some(container) => container.into(),
        None => {
            let mut prefix = Vec::with_capacity(4);
            input.by_ref().take(4).read_to_end(&mut prefix)?;
            let container = sniff(&prefix).with_context(|| format!("{}: unknown container", file))?;
            input = Box::new(Cursor::new(prefix).chain(input));
            container
        }
    };

    let codec = Codec::from(args.codec);
    let demuxer = open_demuxer(container, codec)
        .with_context(|| format!("{} in {} is not supported", codec, container))?;
    debug!(file, %container, %codec, chunk_size = args.chunk_size, "opened input");

    Ok(Source {
        container,
        codec,
        events: PacketReader::with_config(input, demuxer, args.reader_config()),
    })
}

fn list_events<R: Read, D: Demux>(events: &mut PacketReader<R, D>, payload: bool) -> Result<Vec<EventRecord>> {
    let mut records = Vec::new();
    for (index, event) in events.enumerate() {
        let event = event?;
        let data = event.data();
        records.push(EventRecord {
            index,
            kind: event.kind(),
            len: data.map_or(0, |d| d.len()),
            id: match &event {
                DemuxEvent::UnknownTag { id } => Some(format!("{:#x}", id)),
                _ => None,
            },
            payload: data.filter(|_| payload).map(|d| STANDARD.encode(d)),
            head: match &event {
                DemuxEvent::Head(data) => OpusHead::parse(data),
                _ => None,
            },
        });
    }
    Ok(records)
}

fn write_framed<R: Read, D: Demux>(events: &mut PacketReader<R, D>, writer: &mut impl Write) -> Result<PacketCount> {
    let mut count = PacketCount::default();
    for event in events {
        let Some(packet) = event?.into_packet() else { continue };
        let len = u32::try_from(packet.len()).context("packet too large to frame")?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&packet)?;
        count.packets += 1;
        count.bytes += packet.len();
    }
    Ok(count)
}

fn count_packets<R: Read, D: Demux>(events: &mut PacketReader<R, D>) -> Result<PacketCount> {
    write_framed(events, &mut io::sink())
}

/// Scan until the comment packet shows up or audio starts
fn find_comment<R: Read, D: Demux>(events: &mut PacketReader<R, D>) -> Result<Option<VorbisComment>> {
    for event in events {
        match event? {
            DemuxEvent::Tags(packet) => return Ok(VorbisComment::parse(&packet)),
            DemuxEvent::Packet(packet) if packet.starts_with(VORBIS_COMMENT_SIGNATURE) => {
                return Ok(VorbisComment::parse(&packet));
            }
            DemuxEvent::Packet(packet) if !is_vorbis_header(&packet) => return Ok(None),
            _ => {}
        }
    }
    Ok(None)
}

// Vorbis header packets have an odd type byte, the signature and a body
fn is_vorbis_header(packet: &[u8]) -> bool {
    packet.len() > VORBIS_SIGNATURE.len() + 1
        && packet[0] & 1 == 1
        && &packet[1..=VORBIS_SIGNATURE.len()] == VORBIS_SIGNATURE
}

/// Flatten a comment header into one object; repeated fields are joined
fn comment_value(file: &str, comment: &VorbisComment) -> Value {
    let mut map = Map::new();
    map.insert("file".to_string(), json!(file));
    map.insert("vendor".to_string(), json!(comment.vendor_string));

    for (field, value) in &comment.comments {
        let key = field.to_ascii_uppercase();
        match map.get_mut(&key) {
            Some(Value::String(existing)) => {
                existing.push_str("; ");
                existing.push_str(value);
            }
            _ => {
                map.insert(key, json!(value));
            }
        }
    }
    Value::Object(map)
}
