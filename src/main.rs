//! # utfconv CLI
//!
//! Command-line front end for converting, checking and inspecting UTF-8 and
//! UTF-16 text.

#[cfg(feature = "cli")]
use std::fs::File;
#[cfg(feature = "cli")]
use std::io::{self, BufReader, BufWriter, Read, Write};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::process::ExitCode;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use utfconv::detection::EncodingDetector;
#[cfg(feature = "cli")]
use utfconv::{
    ByteCursor, CodePoint, Converter, DecodeError, Encoding, Endianness, SourceByteOrder,
    StreamCursor, TranscodeOptions, Transcoder,
};

/// Largest buffer `detect` reserves up front
#[cfg(feature = "cli")]
const MAX_SAMPLE_PREALLOC: usize = 1 << 20;

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// utfconv: UTF-8 / UTF-16 converter
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "utfconv")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json). JSON from `convert` goes to stderr when the
    /// converted text is written to stdout.
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert text between encodings
    Convert(ConvertArgs),

    /// Detect the encoding of the input
    Detect(DetectArgs),

    /// Check that the input is well formed in an encoding
    Validate(ValidateArgs),

    /// Print every code point of the input with its byte offset
    Dump(DumpArgs),

    /// List the supported encodings
    List(ListArgs),
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Source encoding
    #[arg(short = 'f', long = "from")]
    from: Encoding,

    /// Target encoding
    #[arg(short = 't', long = "to")]
    to: Encoding,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Start the output with a byte-order mark
    #[arg(long)]
    add_bom: bool,

    /// Byte order for UTF-16 input without a BOM
    #[arg(long)]
    assume: Option<ByteOrderArg>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct DetectArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Show confidence scores of every candidate
    #[arg(long)]
    confidence: bool,

    /// Maximum bytes to read for detection
    #[arg(long, default_value = "8192")]
    sample_size: usize,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ValidateArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Expected encoding
    #[arg(short, long)]
    encoding: Encoding,

    /// Byte order for UTF-16 input without a BOM
    #[arg(long)]
    assume: Option<ByteOrderArg>,

    /// Show position of first error
    #[arg(long)]
    show_errors: bool,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct DumpArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Input encoding
    #[arg(short, long)]
    encoding: Encoding,

    /// Byte order for UTF-16 input without a BOM
    #[arg(long)]
    assume: Option<ByteOrderArg>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ListArgs {
    /// Show encoding details
    #[arg(long)]
    details: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ByteOrderArg {
    /// Little endian
    Le,
    /// Big endian
    Be,
}

#[cfg(feature = "cli")]
impl From<ByteOrderArg> for Endianness {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Le => Endianness::Little,
            ByteOrderArg::Be => Endianness::Big,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ValidationResult {
    encoding: Encoding,
    valid: bool,
    code_points: usize,
    bom_detected: bool,
    byte_order: Endianness,
    error: Option<String>,
    error_position: Option<usize>,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct DumpEntry {
    offset: usize,
    code_point: String,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct EncodingInfo {
    name: &'static str,
    bom: Option<String>,
    byte_order: &'static str,
    unit_size: usize,
}

#[cfg(feature = "cli")]
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli),
        Commands::Detect(ref args) => detect_command(args, &cli),
        Commands::Validate(ref args) => validate_command(args, &cli),
        Commands::Dump(ref args) => dump_command(args, &cli),
        Commands::List(ref args) => list_command(args, &cli),
    }
}

#[cfg(feature = "cli")]
fn open_input(path: Option<&Path>, verbose: bool) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            if verbose {
                eprintln!("Reading from: {}", path.display());
            }
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            if verbose {
                eprintln!("Reading from stdin");
            }
            Ok(Box::new(io::stdin().lock()))
        }
    }
}

#[cfg(feature = "cli")]
fn open_output(path: Option<&Path>, verbose: bool) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            if verbose {
                eprintln!("Writing to: {}", path.display());
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Consume the source BOM and settle the byte order to decode in
#[cfg(feature = "cli")]
fn source_byte_order<C: ByteCursor>(
    encoding: Encoding,
    cursor: &mut C,
    assume: Option<ByteOrderArg>,
    verbose: bool,
) -> Result<SourceByteOrder> {
    let order = match encoding.read_byte_order(cursor, assume.map(Endianness::from)) {
        Err(e @ utfconv::Error::UnknownEndianness { .. }) => {
            return Err(e).context("Pass --assume le or --assume be to pick one");
        }
        result => result.context("Failed to read byte-order mark")?,
    };
    if verbose {
        if order.bom_detected {
            eprintln!("BOM found, reading {}", order.endian.name());
        } else {
            eprintln!("No BOM, reading {}", order.endian.name());
        }
    }
    Ok(order)
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<ExitCode> {
    let start_time = std::time::Instant::now();

    if cli.verbose {
        eprintln!("Converting from {} to {}", args.from.name(), args.to.name());
    }

    let options = TranscodeOptions {
        write_bom: args.add_bom,
        fallback_endianness: args.assume.map(Endianness::from),
    };
    let transcoder = Transcoder::with_options(args.from, args.to, options);

    let reader = open_input(args.input.as_deref(), cli.verbose)?;
    let mut writer = open_output(args.output.as_deref(), cli.verbose)?;

    let report = transcoder
        .convert_stream(reader, &mut writer)
        .with_context(|| {
            format!(
                "Conversion from {} to {} failed",
                args.from.name(),
                args.to.name()
            )
        })?;
    writer.flush().context("Failed to flush output")?;

    if cli.verbose {
        eprintln!(
            "Converted {} code points: {} bytes -> {} bytes in {:?}",
            report.code_points,
            report.bytes_read,
            report.bytes_written,
            start_time.elapsed()
        );
    }

    if let OutputFormat::Json = cli.format {
        let json = serde_json::to_string_pretty(&report)?;
        // keep converted text on stdout clean
        if args.output.is_some() {
            println!("{json}");
        } else {
            eprintln!("{json}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "cli")]
fn detect_command(args: &DetectArgs, cli: &Cli) -> Result<ExitCode> {
    // one byte past the limit tells the detector the sample was cut
    let mut sample = Vec::with_capacity(args.sample_size.min(MAX_SAMPLE_PREALLOC));
    open_input(args.input.as_deref(), cli.verbose)?
        .take((args.sample_size as u64).saturating_add(1))
        .read_to_end(&mut sample)
        .context("Failed to read input")?;

    let detector = EncodingDetector::with_sample_size(args.sample_size);
    let result = detector.detect(&sample);
    let sample_len = sample.len().min(args.sample_size);

    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "detected_encoding": result.encoding.map(Encoding::name),
                "confidence": result.confidence,
                "bom_detected": result.bom_detected,
                "sample_size": sample_len,
                "candidates": result
                    .candidates
                    .iter()
                    .map(|(encoding, confidence)| serde_json::json!({
                        "encoding": encoding.name(),
                        "confidence": confidence,
                    }))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            match result.encoding {
                Some(encoding) => println!("Detected encoding: {}", encoding.name()),
                None => println!("Detected encoding: unknown"),
            }
            println!("Confidence: {:.1}%", result.confidence * 100.0);
            if result.bom_detected {
                println!("BOM detected: Yes");
            }
            println!("Sample size: {} bytes", sample_len);

            if args.confidence && result.candidates.len() > 1 {
                println!("\nAll candidates:");
                for (encoding, confidence) in &result.candidates {
                    println!("  {}: {:.1}%", encoding.name(), confidence * 100.0);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "cli")]
fn validate_command(args: &ValidateArgs, cli: &Cli) -> Result<ExitCode> {
    let decoder = Converter::for_encoding(args.encoding);
    let mut cursor = StreamCursor::new(open_input(args.input.as_deref(), cli.verbose)?);
    let SourceByteOrder {
        endian,
        bom_detected,
    } = source_byte_order(args.encoding, &mut cursor, args.assume, cli.verbose)?;

    let mut code_points = 0;
    let mut failure: Option<DecodeError> = None;
    for result in decoder.decode_all(&mut cursor, endian) {
        match result {
            Ok(_) => code_points += 1,
            Err(DecodeError::Io(e)) => return Err(e).context("Failed to read input"),
            Err(e) => failure = Some(e),
        }
    }

    let result = ValidationResult {
        encoding: args.encoding,
        valid: failure.is_none(),
        code_points,
        bom_detected,
        byte_order: endian,
        error_position: failure.as_ref().and_then(DecodeError::position),
        error: failure.as_ref().map(ToString::to_string),
    };

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => match &failure {
            None => {
                println!("✓ Input is valid {}", args.encoding.name());
                if cli.verbose {
                    eprintln!("{} code points", code_points);
                }
            }
            Some(e) => {
                println!("✗ Input is not valid {}", args.encoding.name());
                if args.show_errors {
                    println!("  Error: {}", e);
                }
            }
        },
    }

    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(feature = "cli")]
fn dump_command(args: &DumpArgs, cli: &Cli) -> Result<ExitCode> {
    let decoder = Converter::for_encoding(args.encoding);
    let mut cursor = StreamCursor::new(open_input(args.input.as_deref(), cli.verbose)?);
    let endian = source_byte_order(args.encoding, &mut cursor, args.assume, cli.verbose)?.endian;

    let mut entries = Vec::new();
    let mut out = BufWriter::new(io::stdout().lock());
    let mut code_points = decoder.decode_all(&mut cursor, endian);
    loop {
        let offset = code_points.position();
        let Some(result) = code_points.next() else {
            break;
        };
        let code_point: CodePoint = result.context("Failed to decode input")?;
        match cli.format {
            OutputFormat::Json => entries.push(DumpEntry {
                offset,
                code_point: format!("U+{code_point:04X}"),
            }),
            OutputFormat::Text => writeln!(out, "{offset:>8}  U+{code_point:04X}")?,
        }
    }

    if let OutputFormat::Json = cli.format {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
    }
    out.flush().context("Failed to write to stdout")?;

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "cli")]
fn list_command(args: &ListArgs, cli: &Cli) -> Result<ExitCode> {
    let infos: Vec<EncodingInfo> = Encoding::ALL
        .iter()
        .map(|&encoding| EncodingInfo {
            name: encoding.name(),
            bom: encoding.bom().map(|bom| format!("{:02X?}", bom)),
            byte_order: byte_order_description(encoding),
            unit_size: match encoding {
                Encoding::UTF8 => 1,
                _ => 2,
            },
        })
        .collect();

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&infos)?),
        OutputFormat::Text => {
            println!("Supported Encodings ({} total):", infos.len());
            println!();

            for info in &infos {
                println!("{:10} {}", info.name, info.byte_order);

                if args.details {
                    println!("           Code unit: {} byte(s)", info.unit_size);
                    match &info.bom {
                        Some(bom) => println!("           BOM: {}", bom),
                        None => println!("           BOM: FF FE or FE FF"),
                    }
                    println!();
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "cli")]
fn byte_order_description(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::UTF8 => "no byte order",
        Encoding::UTF16 => "byte order from BOM",
        Encoding::UTF16LE => "little endian",
        Encoding::UTF16BE => "big endian",
    }
}
