//! nxmeta: experiment metadata from synchrotron NeXus files.
//!
//! nxmeta reads the metadata a beamline writes next to its detector data
//! (regions of interest, beam energy, transmission, detector distance) and
//! finds the detector data file itself, even when the path recorded at
//! acquisition time points at a filesystem that does not exist locally.
//!
//! # Modules
//!
//! - [`nexus`]: In-memory NeXus tree and its JSON loader
//! - [`document`]: Beamline-agnostic accessors ([`MetadataDocument`])
//! - [`beamline`]: Beamline-specific field mappings ([`NexusFile`])
//! - [`region`]: Normalized detector regions of interest
//! - [`resolve`]: Locating data files recorded on another machine
//! - [`inspect`]: Whole-file inspection reports
//! - [`error`]: Error types for nxmeta operations

pub mod beamline;
pub mod document;
pub mod error;
pub mod inspect;
pub mod nexus;
pub mod region;
pub mod resolve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use beamline::{Beamline, Detector, NexusFile};
pub use document::{AxisType, MetadataDocument};
pub use error::NxError;
pub use region::Region;
pub use resolve::FileResolver;

/// The nxmeta CLI application.
#[derive(Parser)]
#[command(name = "nxmeta")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Report the metadata that can be read from a NeXus file.
    Inspect(InspectArgs),
    /// Find files recorded on another machine under local directories.
    Locate(LocateArgs),
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// NeXus file (JSON dump) to inspect.
    input: PathBuf,

    /// Beamline that wrote the file ('i07' or 'i10').
    #[arg(long, env = "NXMETA_BEAMLINE", default_value = "i07")]
    beamline: String,

    /// Extra directory to search for the detector data file (repeatable).
    #[arg(long = "search-root", env = "NXMETA_SEARCH_ROOTS", value_delimiter = ':')]
    search_roots: Vec<PathBuf>,

    /// Do not look for the detector data file on disk.
    #[arg(long)]
    no_data_file: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,

    /// Fail if any field could not be read.
    #[arg(long)]
    strict: bool,
}

/// Arguments for the locate subcommand.
#[derive(clap::Args)]
struct LocateArgs {
    /// Paths as recorded at acquisition time.
    #[arg(required = true)]
    names: Vec<PathBuf>,

    /// Extra directory to search (repeatable).
    #[arg(long = "search-root", env = "NXMETA_SEARCH_ROOTS", value_delimiter = ':')]
    search_roots: Vec<PathBuf>,
}

/// Run the nxmeta CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), NxError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Locate(args)) => run_locate(args),
        None => {
            println!("nxmeta {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Beamline metadata from NeXus files.");
            println!();
            println!("Run 'nxmeta --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), NxError> {
    if !matches!(args.output.as_str(), "text" | "json") {
        return Err(NxError::UnsupportedOutput(format!(
            "'{}' (supported: text, json)",
            args.output
        )));
    }

    let beamline: Beamline = args.beamline.parse()?;
    let doc = NexusFile::load(&args.input, beamline)?;

    let opts = inspect::InspectOptions {
        search_roots: args.search_roots,
        skip_data_file: args.no_data_file,
    };
    let report = inspect::inspect_document(&doc, &opts);

    match args.output.as_str() {
        "json" => {
            let json = report.to_json().map_err(NxError::ReportWrite)?;
            println!("{}", json);
        }
        _ => print!("{}", report),
    }

    let unavailable = report.unavailable_count();
    if args.strict && unavailable > 0 {
        Err(NxError::InspectFailed { unavailable })
    } else {
        Ok(())
    }
}

/// Execute the locate subcommand.
fn run_locate(args: LocateArgs) -> Result<(), NxError> {
    let found = resolve::find_files(&args.names, &args.search_roots)?;
    for path in found {
        println!("{}", path);
    }
    Ok(())
}
