//! dcl-cli - Command-line interface for the PKWare DCL codec
//!
//! Compresses and decompresses files, inspects compressed file headers, and
//! runs the codec on hex strings given on the command line.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, LevelFilter, Log, Metadata, Record};
use pkware_dcl::{
    explode, explode_bytes, implode, implode_bytes, CompressionMode, CompressionStats,
    DictionarySize, StreamHeader,
};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Inputs larger than this get a progress bar
const PROGRESS_THRESHOLD: u64 = 1024 * 1024;

/// Bytes per line in hex dumps
const HEX_DUMP_WIDTH: usize = 32;

#[derive(Parser)]
#[command(name = "dcl-cli")]
#[command(about = "A CLI tool for PKWare DCL compression and decompression")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    Compress {
        /// Input file to compress
        input: PathBuf,

        /// Output compressed file
        output: PathBuf,

        /// Compression mode
        #[arg(short, long, value_enum, default_value_t = CliCompressionMode::Binary)]
        mode: CliCompressionMode,

        /// Dictionary size
        #[arg(short, long, value_enum, default_value_t = CliDictionarySize::Size2K)]
        dict_size: CliDictionarySize,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Decompress a DCL-compressed file
    Decompress {
        /// Input compressed file
        input: PathBuf,

        /// Output decompressed file
        output: PathBuf,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Get information about a compressed file
    Info {
        /// Compressed file to analyze
        input: PathBuf,
    },

    /// Compress bytes given as a hex string
    ImplodeHex {
        /// Hex input; whitespace and 0x prefixes are ignored
        hex: String,

        /// Compression mode
        #[arg(short, long, value_enum, default_value_t = CliCompressionMode::Binary)]
        mode: CliCompressionMode,

        /// Dictionary size
        #[arg(short, long, value_enum, default_value_t = CliDictionarySize::Size4K)]
        dict_size: CliDictionarySize,

        /// Write the raw compressed bytes to stdout instead of a hex dump
        #[arg(long)]
        raw: bool,
    },

    /// Decompress bytes given as a hex string
    ExplodeHex {
        /// Hex input; whitespace and 0x prefixes are ignored
        hex: String,

        /// Write the raw decompressed bytes to stdout instead of a hex dump
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CliCompressionMode {
    /// Binary compression mode (optimized for binary data)
    Binary,
    /// ASCII compression mode (optimized for text data)
    Ascii,
}

impl From<CliCompressionMode> for CompressionMode {
    fn from(mode: CliCompressionMode) -> Self {
        match mode {
            CliCompressionMode::Binary => CompressionMode::Binary,
            CliCompressionMode::Ascii => CompressionMode::ASCII,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CliDictionarySize {
    /// 1KB dictionary (1024 bytes)
    Size1K,
    /// 2KB dictionary (2048 bytes)
    Size2K,
    /// 4KB dictionary (4096 bytes)
    Size4K,
}

impl From<CliDictionarySize> for DictionarySize {
    fn from(size: CliDictionarySize) -> Self {
        match size {
            CliDictionarySize::Size1K => DictionarySize::Size1K,
            CliDictionarySize::Size2K => DictionarySize::Size2K,
            CliDictionarySize::Size4K => DictionarySize::Size4K,
        }
    }
}

/// Minimal logger writing `level: message` lines to stderr
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level().as_str().to_lowercase(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            mode,
            dict_size,
            force,
        } => compress_file(&input, &output, mode.into(), dict_size.into(), force, cli.quiet),
        Commands::Decompress {
            input,
            output,
            force,
        } => decompress_file(&input, &output, force, cli.quiet),
        Commands::Info { input } => show_file_info(&input, cli.verbose),
        Commands::ImplodeHex {
            hex,
            mode,
            dict_size,
            raw,
        } => implode_hex(&hex, mode.into(), dict_size.into(), raw),
        Commands::ExplodeHex { hex, raw } => explode_hex(&hex, raw),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn check_paths(input: &Path, output: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }

    Ok(())
}

/// Progress bar over the input file, or `None` for small inputs and quiet mode
fn progress_bar(
    input_size: u64,
    quiet: bool,
    message: &'static str,
) -> Result<Option<ProgressBar>, Box<dyn std::error::Error>> {
    if quiet || input_size <= PROGRESS_THRESHOLD {
        return Ok(None);
    }

    let pb = ProgressBar::new(input_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message(message);
    Ok(Some(pb))
}

fn open_input(
    input: &Path,
    quiet: bool,
    message: &'static str,
) -> Result<(Box<dyn Read>, Option<ProgressBar>), Box<dyn std::error::Error>> {
    let file = File::open(input)?;
    let input_size = file.metadata()?.len();
    let reader = BufReader::new(file);

    Ok(match progress_bar(input_size, quiet, message)? {
        Some(pb) => (Box::new(pb.wrap_read(reader)), Some(pb)),
        None => (Box::new(reader), None),
    })
}

fn print_summary(title: &str, stats: &CompressionStats, input: u64, output: u64, start: Instant) {
    println!("✓ {title} successful!");
    println!("  Input:   {input} bytes");
    println!("  Output:  {output} bytes");
    if input > 0 {
        println!("  Ratio:   {:.1}%", output as f64 / input as f64 * 100.0);
    }
    println!(
        "  Symbols: {} literals, {} repetitions (longest {})",
        stats.literal_count, stats.match_count, stats.longest_match
    );
    println!("  Time:    {:.2?}", start.elapsed());
}

fn compress_file(
    input: &Path,
    output: &Path,
    mode: CompressionMode,
    dict_size: DictionarySize,
    force: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    check_paths(input, output, force)?;
    debug!(
        "compressing '{}' to '{}' ({mode:?}, {} byte dictionary)",
        input.display(),
        output.display(),
        dict_size.bytes()
    );

    let start_time = Instant::now();
    let (reader, progress) = open_input(input, quiet, "Compressing...")?;
    let writer = BufWriter::new(File::create(output)?);

    let stats = implode(reader, writer, mode, dict_size)
        .map_err(|e| format!("Compression failed: {e}"))?;

    if let Some(pb) = progress {
        pb.finish_with_message("Compression complete");
    }

    if !quiet {
        print_summary(
            "Compression",
            &stats,
            stats.input_bytes,
            stats.output_bytes,
            start_time,
        );
        if stats.output_bytes > stats.input_bytes {
            println!("  Note: File expanded during compression (common for small/random data)");
        }
    }

    Ok(())
}

fn decompress_file(
    input: &Path,
    output: &Path,
    force: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    check_paths(input, output, force)?;
    debug!(
        "decompressing '{}' to '{}'",
        input.display(),
        output.display()
    );

    let start_time = Instant::now();
    let input_size = fs::metadata(input)?.len();
    let (reader, progress) = open_input(input, quiet, "Decompressing...")?;
    let writer = BufWriter::new(File::create(output)?);

    let stats = explode(reader, writer).map_err(|e| format!("Decompression failed: {e}"))?;

    if let Some(pb) = progress {
        pb.finish_with_message("Decompression complete");
    }

    if !quiet {
        print_summary(
            "Decompression",
            &stats,
            input_size,
            stats.output_bytes,
            start_time,
        );
    }

    Ok(())
}

fn show_file_info(input: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let data = fs::read(input)?;
    let file_size = data.len();

    let header = StreamHeader::parse(&data)
        .map_err(|e| format!("Not a valid DCL compressed file: {e}"))?;

    println!("DCL File Information:");
    println!("  File: {}", input.display());
    println!("  Size: {file_size} bytes");
    println!("  Compression Mode: {:?} ({})", header.mode, header.mode as u8);
    println!(
        "  Dictionary Size: {} bytes ({} distance bits)",
        header.dict_size.bytes(),
        header.dict_size.bits()
    );

    if verbose && data.len() >= 3 {
        println!(
            "  Header bytes: {:02x} {:02x} {:02x}",
            data[0], data[1], data[2]
        );
    }

    // Trial decode for the decompressed size
    match explode_bytes(&data) {
        Ok(decompressed) => {
            println!("  Decompressed Size: {} bytes", decompressed.len());
            if !decompressed.is_empty() {
                println!(
                    "  Compression Ratio: {:.1}%",
                    file_size as f64 / decompressed.len() as f64 * 100.0
                );
            }
            println!("  Status: ✓ Valid DCL stream");
        }
        Err(e) => {
            println!("  Status: ✗ Invalid or corrupted DCL stream");
            if verbose {
                println!("  Error: {e}");
            }
        }
    }

    Ok(())
}

/// Parse hex digits, ignoring whitespace and `0x` prefixes, case-insensitive
fn parse_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let cleaned: String = input.split_whitespace().collect();
    let cleaned = cleaned.replace("0x", "").replace("0X", "");
    hex::decode(cleaned)
}

/// Offset-prefixed uppercase hex dump, [`HEX_DUMP_WIDTH`] bytes per line
fn format_hex_dump(data: &[u8]) -> String {
    data.chunks(HEX_DUMP_WIDTH)
        .enumerate()
        .map(|(line, chunk)| {
            let bytes: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
            format!("{:08X}: {}", line * HEX_DUMP_WIDTH, bytes.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Printable ASCII as-is, everything else as `.`
fn ascii_rendering(data: &[u8]) -> String {
    data.iter()
        .map(|&b| if (32..=126).contains(&b) { b as char } else { '.' })
        .collect()
}

fn implode_hex(
    hex_input: &str,
    mode: CompressionMode,
    dict_size: DictionarySize,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = parse_hex(hex_input).map_err(|e| format!("Invalid hex input: {e}"))?;
    let output = implode_bytes(&input, mode, dict_size)?;

    if raw {
        io::stdout().write_all(&output)?;
        return Ok(());
    }

    println!("Input: {} bytes", input.len());
    println!("{}\n", format_hex_dump(&input));
    if mode == CompressionMode::ASCII {
        println!("ASCII interpretation: \"{}\"\n", ascii_rendering(&input));
    }
    println!("Mode: {mode:?}");
    println!("Dictionary size: {} bytes\n", dict_size.bytes());
    println!("Output: {} bytes", output.len());
    if !input.is_empty() {
        println!(
            "Compression ratio: {:.1}%\n",
            output.len() as f64 / input.len() as f64 * 100.0
        );
    }
    println!("{}", format_hex_dump(&output));
    Ok(())
}

fn explode_hex(hex_input: &str, raw: bool) -> Result<(), Box<dyn std::error::Error>> {
    let input = parse_hex(hex_input).map_err(|e| format!("Invalid hex input: {e}"))?;
    let output = explode_bytes(&input)?;

    if raw {
        io::stdout().write_all(&output)?;
        return Ok(());
    }

    println!("Input: {} bytes", input.len());
    println!("{}\n", format_hex_dump(&input));
    println!("Output: {} bytes", output.len());
    println!("{}\n", format_hex_dump(&output));
    println!("ASCII interpretation: \"{}\"", ascii_rendering(&output));
    Ok(())
}
