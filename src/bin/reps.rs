//! Reps CLI - Command-line interface for Synheart Reps
//!
//! Commands:
//! - count: Count reps in a recorded frame file (batch mode)
//! - run: Count reps in frames streamed on stdin (streaming mode)
//! - validate: Validate pose.frame.v1 input
//! - config: Print the default counter configuration
//! - doctor: Diagnose configuration and environment

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use synheart_reps::schema::{FrameReader, FRAME_SCHEMA_VERSION};
use synheart_reps::types::{PoseEstimate, RepRecord};
use synheart_reps::{CounterConfig, RepCounter, RepError, PRODUCER_NAME, REPS_VERSION};

/// Reps - On-device exercise repetition counting from pose keypoints
#[derive(Parser)]
#[command(name = "reps")]
#[command(author = "Synheart AI Inc")]
#[command(version = REPS_VERSION)]
#[command(about = "Count exercise repetitions in pose keypoint streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count reps in a frame file (batch mode)
    Count {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Counter configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the workout summary to stderr when done
        #[arg(long)]
        summary: bool,
    },

    /// Count reps in frames streamed on stdin (streaming mode)
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Counter configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Flush output after each record (ndjson only; `--flush false` to buffer)
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        flush: bool,

        /// Print the workout summary to stderr on exit
        #[arg(long)]
        summary: bool,
    },

    /// Validate pose.frame.v1 input
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default counter configuration
    Config,

    /// Diagnose configuration and environment
    Doctor {
        /// Check a counter configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one frame per line)
    Ndjson,
    /// JSON array of frames
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one rep record per line)
    Ndjson,
    /// JSON array of rep records
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("synheart_reps=info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), RepsCliError> {
    match cli.command {
        Commands::Count {
            input,
            output,
            input_format,
            output_format,
            config,
            summary,
        } => cmd_count(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
            summary,
        ),

        Commands::Run {
            output_format,
            config,
            flush,
            summary,
        } => cmd_run(output_format, config.as_deref(), flush, summary),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Config => cmd_config(),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_count(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    summary: bool,
) -> Result<(), RepsCliError> {
    let input_data = read_input(input)?;
    let frames = parse_frames(&input_data, &input_format)?;

    if frames.is_empty() {
        return Err(RepsCliError::NoFrames);
    }

    let mut counter = RepCounter::with_config(load_config(config)?)?;
    let records = counter.process_frames(&frames);

    let output_data = format_output(&records, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    if summary {
        eprintln!("{}", serde_json::to_string_pretty(&counter.finish())?);
    }

    Ok(())
}

fn cmd_run(
    output_format: OutputFormat,
    config: Option<&Path>,
    flush: bool,
    summary: bool,
) -> Result<(), RepsCliError> {
    let mut counter = RepCounter::with_config(load_config(config)?)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    stream_records(&mut counter, stdin.lock(), &mut stdout, &output_format, flush)?;

    if summary {
        eprintln!("{}", serde_json::to_string_pretty(&counter.finish())?);
    }

    Ok(())
}

/// Count reps over a line stream. NDJSON records are written as they are
/// counted; the array formats are written once, as a single document, at EOF.
fn stream_records<R: BufRead, W: Write>(
    counter: &mut RepCounter,
    reader: R,
    out: &mut W,
    output_format: &OutputFormat,
    flush: bool,
) -> Result<(), RepsCliError> {
    let mut buffered: Vec<RepRecord> = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let frame = PoseEstimate::from_json(trimmed).map_err(|e| {
            RepsCliError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
        })?;

        let Some(record) = counter.process_frame(&frame) else {
            continue;
        };

        match output_format {
            OutputFormat::Ndjson => {
                write!(out, "{}", format_output(&[record], output_format)?)?;
                if flush {
                    out.flush()?;
                }
            }
            OutputFormat::Json | OutputFormat::JsonPretty => buffered.push(record),
        }
    }

    if !matches!(output_format, OutputFormat::Ndjson) {
        write!(out, "{}", format_output(&buffered, output_format)?)?;
    }
    out.flush()?;

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), RepsCliError> {
    let input_data = read_input(input)?;
    let frames = parse_frames(&input_data, &input_format)?;

    let results = FrameReader::validate_frames(&frames);

    let report = ValidationReport {
        total_frames: frames.len(),
        valid_frames: frames.len() - results.len(),
        invalid_frames: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                frame_index: r.frame_index,
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total frames:   {}", report.total_frames);
        println!("Valid frames:   {}", report.valid_frames);
        println!("Invalid frames: {}", report.invalid_frames);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                let frame = err
                    .frame_index
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("  - Frame {} (index {}): {}", frame, err.index, err.error);
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(RepsCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

fn cmd_config() -> Result<(), RepsCliError> {
    println!("{}", CounterConfig::default().to_json()?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), RepsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "reps_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Reps version {}", REPS_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", FRAME_SCHEMA_VERSION),
    });

    if let Some(config_path) = config {
        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(content) => match CounterConfig::from_json(&content) {
                    Ok(parsed) => {
                        let order: Vec<&str> =
                            parsed.detector.priority.iter().map(|e| e.as_str()).collect();
                        checks.push(DoctorCheck {
                            name: "config".to_string(),
                            status: CheckStatus::Ok,
                            message: format!(
                                "Config valid (priority: {}, {} reps per set)",
                                order.join(" > "),
                                parsed.session.reps_per_set
                            ),
                        });
                    }
                    Err(e) => {
                        checks.push(DoctorCheck {
                            name: "config".to_string(),
                            status: CheckStatus::Error,
                            message: e.to_string(),
                        });
                    }
                },
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot read config file: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist, defaults will be used".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: REPS_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Reps Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(RepsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, RepsCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_frames(data: &str, format: &InputFormat) -> Result<Vec<PoseEstimate>, RepsCliError> {
    let frames = match format {
        InputFormat::Ndjson => FrameReader::parse_ndjson(data)?,
        InputFormat::Json => FrameReader::parse_array(data)?,
    };
    Ok(frames)
}

fn load_config(path: Option<&Path>) -> Result<CounterConfig, RepsCliError> {
    match path {
        Some(path) => Ok(CounterConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(CounterConfig::default()),
    }
}

fn format_output(records: &[RepRecord], format: &OutputFormat) -> Result<String, RepsCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            if lines.is_empty() {
                Ok(String::new())
            } else {
                Ok(lines.join("\n") + "\n")
            }
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)? + "\n"),
    }
}

// Error types

#[derive(Debug)]
enum RepsCliError {
    Io(io::Error),
    Reps(RepError),
    Json(serde_json::Error),
    NoFrames,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for RepsCliError {
    fn from(e: io::Error) -> Self {
        RepsCliError::Io(e)
    }
}

impl From<RepError> for RepsCliError {
    fn from(e: RepError) -> Self {
        RepsCliError::Reps(e)
    }
}

impl From<serde_json::Error> for RepsCliError {
    fn from(e: serde_json::Error) -> Self {
        RepsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RepsCliError> for CliError {
    fn from(e: RepsCliError) -> Self {
        match e {
            RepsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RepsCliError::Reps(RepError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'reps config' to see a valid configuration".to_string()),
            },
            RepsCliError::Reps(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches {} schema", FRAME_SCHEMA_VERSION)),
            },
            RepsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            RepsCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            RepsCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} frames failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            RepsCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            RepsCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_frames: usize,
    valid_frames: usize,
    invalid_frames: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    frame_index: Option<u64>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
