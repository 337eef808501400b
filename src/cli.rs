// Command-line driver.
//
// Subcommands: compress, decompress, config, header, blocks. File or
// stdin/stdout I/O with explicit overwrite protection; stats go to stderr,
// optionally as JSON.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::codec::{self, BlockIter, FrameHeader, HEADER_SIZE};
use crate::hash::config::Params;

// ---------------------------------------------------------------------------
// Byte-size buffering
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Sampling interval parsing (power of two -> mask)
// ---------------------------------------------------------------------------

fn parse_sample_every(s: &str) -> Result<u64, String> {
    let n: u64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid interval '{s}': {e}"))?;
    if n == 0 || !n.is_power_of_two() {
        return Err(format!("interval '{s}' must be a power of two"));
    }
    Ok(n)
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Long-distance matching pre-compressor.
#[derive(Parser, Debug)]
#[command(
    name = "oxildm",
    version,
    about = "Long-distance matching pre-compressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress an input stream.
    Compress(CompressArgs),
    /// Decompress a container produced by `compress`.
    Decompress(DecompressArgs),
    /// Print build/configuration details.
    Config,
    /// Print a container header.
    Header(PrintArgs),
    /// Print the block structure of a compressed container.
    Blocks(PrintArgs),
}

#[derive(Args, Debug)]
struct TuningArgs {
    /// Window size as a power of two (max back-reference distance).
    #[arg(long = "window-log", value_parser = clap::value_parser!(u32).range(1..=32), default_value_t = Params::DEFAULT.window_log)]
    window_log: u32,

    /// Minimum match length in bytes.
    #[arg(long = "min-match", default_value_t = Params::DEFAULT.min_match)]
    min_match: usize,

    /// Hash-table footprint as a power of two, in bytes.
    #[arg(long = "mem-log", value_parser = clap::value_parser!(u32).range(4..=34), default_value_t = Params::DEFAULT.mem_log)]
    mem_log: u32,

    /// Bucket capacity as a power of two.
    #[arg(long = "bucket-log", value_parser = clap::value_parser!(u32).range(0..=8), default_value_t = Params::DEFAULT.bucket_log)]
    bucket_log: u32,

    /// Index one input position in this many (power of two).
    #[arg(long = "sample-every", value_parser = parse_sample_every, default_value_t = Params::DEFAULT.sample_mask + 1)]
    sample_every: u64,

    /// Insertion lag in bytes (0 disables).
    #[arg(long = "lag", default_value_t = 0)]
    lag: u64,
}

impl TuningArgs {
    fn to_params(&self) -> Params {
        Params {
            window_log: self.window_log,
            min_match: self.min_match,
            hash_length: self.min_match,
            mem_log: self.mem_log,
            bucket_log: self.bucket_log,
            sample_mask: self.sample_every - 1,
            lag: self.lag,
        }
    }
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    #[command(flatten)]
    tuning: TuningArgs,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Minimum match length the stream was compressed with.
    #[arg(long = "min-match", default_value_t = Params::DEFAULT.min_match)]
    min_match: usize,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PrintArgs {
    /// Compressed input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Minimum match length the stream was compressed with.
    #[arg(long = "min-match", default_value_t = Params::DEFAULT.min_match)]
    min_match: usize,
}

// ---------------------------------------------------------------------------
// Shared I/O helpers
// ---------------------------------------------------------------------------

fn read_input(path: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match path {
        Some(p) => std::fs::read(p),
        None => {
            let mut data = Vec::new();
            BufReader::with_capacity(BUF_SIZE, io::stdin().lock()).read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

fn open_output(
    path: Option<&PathBuf>,
    use_stdout: bool,
    force: bool,
) -> Result<Box<dyn Write>, String> {
    if use_stdout || path.is_none() {
        return Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        )));
    }
    let path = path.unwrap();
    if path.exists() && !force {
        return Err(format!(
            "output file exists, use -f to overwrite: {}",
            path.display()
        ));
    }
    match File::create(path) {
        Ok(f) => Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
        Err(e) => Err(format!("output file: {}: {e}", path.display())),
    }
}

fn decoder_params(min_match: usize) -> Params {
    Params {
        min_match,
        hash_length: min_match,
        ..Params::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn cmd_compress(args: &CompressArgs, force: bool, quiet: bool, verbose: u8, json: bool) -> i32 {
    let params = args.tuning.to_params();
    if let Err(e) = params.validate() {
        eprintln!("oxildm: invalid parameters: {e}");
        return 1;
    }

    let input_path = args.input.as_ref().or(args.input_pos.as_ref());
    let output_path = args.output.as_ref().or(args.output_pos.as_ref());

    let input = match read_input(input_path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("oxildm: input: {e}");
            return 1;
        }
    };

    let mut payload = vec![0u8; codec::compress_bound(input.len())];
    let (written, stats) = match codec::compress_with_stats(&input, &mut payload, &params) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("oxildm: compress error: {e}");
            return 1;
        }
    };
    payload.truncate(written);

    let header = FrameHeader {
        compressed_size: written as u64,
        decompressed_size: input.len() as u64,
    };

    let mut writer = match open_output(output_path, args.stdout, force) {
        Ok(w) => w,
        Err(msg) => {
            eprintln!("oxildm: {msg}");
            return 1;
        }
    };
    if let Err(e) = header
        .encode(&mut writer)
        .and_then(|_| writer.write_all(&payload))
        .and_then(|_| writer.flush())
    {
        eprintln!("oxildm: write error: {e}");
        return 1;
    }

    let output_size = HEADER_SIZE + written;
    if verbose > 0 && !quiet {
        eprintln!(
            "oxildm: compress: {} -> {} bytes ({:.2}%), {} matches, {:.1}% matched",
            input.len(),
            output_size,
            if input.is_empty() {
                100.0
            } else {
                100.0 * output_size as f64 / input.len() as f64
            },
            stats.num_matches,
            100.0 * stats.matched_fraction()
        );
    }
    if json {
        let json = serde_json::json!({
            "command": "compress",
            "input_size": input.len(),
            "output_size": output_size,
            "matches": stats.num_matches,
            "matched_bytes": stats.total_match_length,
            "literal_bytes": stats.total_literal_length,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Decompress command
// ---------------------------------------------------------------------------

fn cmd_decompress(args: &DecompressArgs, force: bool, quiet: bool, verbose: u8, json: bool) -> i32 {
    let params = decoder_params(args.min_match);

    let input_path = args.input.as_ref().or(args.input_pos.as_ref());
    let output_path = args.output.as_ref().or(args.output_pos.as_ref());

    let input = match read_input(input_path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("oxildm: input: {e}");
            return 1;
        }
    };

    let header = match FrameHeader::from_bytes(&input) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("oxildm: container header: {e}");
            return 1;
        }
    };
    let payload = &input[HEADER_SIZE..];
    if payload.len() as u64 != header.compressed_size {
        eprintln!(
            "oxildm: container promises {} payload bytes, input carries {}",
            header.compressed_size,
            payload.len()
        );
        return 1;
    }
    let Ok(decompressed_size) = usize::try_from(header.decompressed_size) else {
        eprintln!("oxildm: decompressed size exceeds address space");
        return 1;
    };

    let mut output = vec![0u8; decompressed_size];
    let written = match codec::decompress_with_params(payload, &mut output, &params) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("oxildm: decompress error: {e}");
            return 1;
        }
    };
    if written != decompressed_size {
        eprintln!(
            "oxildm: container promises {decompressed_size} decompressed bytes, payload decodes to {written}"
        );
        return 1;
    }

    let mut writer = match open_output(output_path, args.stdout, force) {
        Ok(w) => w,
        Err(msg) => {
            eprintln!("oxildm: {msg}");
            return 1;
        }
    };
    if let Err(e) = writer.write_all(&output).and_then(|_| writer.flush()) {
        eprintln!("oxildm: write error: {e}");
        return 1;
    }

    if verbose > 0 && !quiet {
        eprintln!(
            "oxildm: decompress: {} -> {} bytes",
            input.len(),
            written
        );
    }
    if json {
        let json = serde_json::json!({
            "command": "decompress",
            "input_size": input.len(),
            "output_size": written,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let p = Params::DEFAULT;
    println!("oxildm {}", env!("CARGO_PKG_VERSION"));
    println!("window log:           {}", p.window_log);
    println!("min match length:     {}", p.min_match);
    println!("hash window length:   {}", p.hash_length);
    println!("table memory log:     {}", p.mem_log);
    println!("bucket log:           {}", p.bucket_log);
    println!("buckets:              {}", p.num_buckets());
    println!("sample mask:          {:#x}", p.sample_mask);
    println!("insertion lag:        {}", p.lag);
    println!("container header:     {HEADER_SIZE} bytes");
    0
}

// ---------------------------------------------------------------------------
// Header / blocks commands
// ---------------------------------------------------------------------------

fn cmd_header(args: &PrintArgs) -> i32 {
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("oxildm: {}: {e}", args.input.display());
            return 1;
        }
    };
    let mut reader = BufReader::with_capacity(BUF_SIZE, file);
    let header = match FrameHeader::decode(&mut reader) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("oxildm: invalid container header: {e}");
            return 1;
        }
    };
    println!("compressed size:   {}", header.compressed_size);
    println!("decompressed size: {}", header.decompressed_size);
    0
}

fn cmd_blocks(args: &PrintArgs) -> i32 {
    let input = match std::fs::read(&args.input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("oxildm: {}: {e}", args.input.display());
            return 1;
        }
    };
    let header = match FrameHeader::from_bytes(&input) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("oxildm: invalid container header: {e}");
            return 1;
        }
    };
    let payload = &input[HEADER_SIZE..];
    if payload.len() as u64 != header.compressed_size {
        eprintln!(
            "oxildm: container promises {} payload bytes, file carries {}",
            header.compressed_size,
            payload.len()
        );
        return 1;
    }

    let params = decoder_params(args.min_match);
    let mut index = 0u64;
    for block in BlockIter::new(payload, &params) {
        match block {
            Ok(b) => match (b.offset, b.match_length) {
                (Some(offset), Some(match_length)) => println!(
                    "block {index}: pos {}, literals {}, offset {offset}, match {match_length}",
                    b.position, b.literal_length
                ),
                _ => println!(
                    "block {index}: pos {}, literals {} (trailing run)",
                    b.position, b.literal_length
                ),
            },
            Err(e) => {
                eprintln!("oxildm: block {index}: {e}");
                return 1;
            }
        }
        index += 1;
    }
    0
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxildm".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        match cli.command {
            Cmd::Compress(args) => {
                let _ = args.tuning.to_params().validate();
            }
            Cmd::Decompress(args) => {
                let _ = decoder_params(args.min_match).validate();
            }
            Cmd::Config | Cmd::Header(_) | Cmd::Blocks(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();

    let exit_code = match &cli.command {
        Cmd::Compress(args) => {
            cmd_compress(args, cli.force, cli.quiet, cli.verbose, cli.json_output)
        }
        Cmd::Decompress(args) => {
            cmd_decompress(args, cli.force, cli.quiet, cli.verbose, cli.json_output)
        }
        Cmd::Config => cmd_config(),
        Cmd::Header(args) => cmd_header(args),
        Cmd::Blocks(args) => cmd_blocks(args),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
