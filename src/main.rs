//! CLI entry point for treescan

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use treescan::{
    ConfigError, JsonCollector, OutputConfig, PathStyle, ReportFormatter, ScanConfig, ScanError,
    SearchMode, TreeWalker, print_json,
};

const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 2;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // https://no-color.org/
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "treescan")]
#[command(about = "Scan a directory tree, classify every entry and summarize what is in it")]
#[command(version)]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Descend into subdirectories, optionally at most DEPTH levels (0 = unlimited).
    /// Place it after PATH when giving no depth.
    #[arg(
        short = 'r',
        long = "recursive",
        value_name = "DEPTH",
        num_args = 0..=1,
        default_missing_value = "0"
    )]
    recursive: Option<u64>,

    /// Show permission bits
    #[arg(short = 'p', long = "permissions")]
    permissions: bool,

    /// Show last modification time
    #[arg(short = 't', long = "mtime")]
    mtime: bool,

    /// Include entries whose name starts with a dot
    #[arg(short = 'H', long = "hidden")]
    hidden: bool,

    /// List regular files individually instead of a per-directory count
    #[arg(short = 'f', long = "files")]
    files: bool,

    /// List symlinks individually instead of a per-directory count
    #[arg(short = 'l', long = "symlinks")]
    symlinks: bool,

    /// List sockets, devices and pipes individually instead of a per-directory count
    #[arg(short = 's', long = "special")]
    special: bool,

    /// Compute the recursive size of every listed directory
    #[arg(short = 'd', long = "dir-size")]
    dir_size: bool,

    /// Report entries and directories that could not be read
    #[arg(short = 'e', long = "errors")]
    errors: bool,

    /// Print absolute paths instead of indented names
    #[arg(short = 'A', long = "absolute")]
    absolute: bool,

    /// Print paths relative to the scan root instead of indented names
    #[arg(short = 'R', long = "relative")]
    relative: bool,

    /// Only report entries whose name equals PATTERN
    #[arg(short = 'S', long = "search", value_name = "PATTERN")]
    search: Option<String>,

    /// Only report entries whose name without its last extension equals PATTERN
    #[arg(long = "search-noext", value_name = "PATTERN")]
    search_noext: Option<String>,

    /// Only report entries whose name contains PATTERN
    #[arg(long = "contains", value_name = "PATTERN")]
    contains: Option<String>,

    /// Output in JSON format
    #[arg(long = "json")]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn scan_config(&self) -> Result<ScanConfig, ConfigError> {
        let (search_mode, search_pattern) = SearchMode::from_flags(
            self.search.clone(),
            self.search_noext.clone(),
            self.contains.clone(),
        )?;

        let config = ScanConfig {
            recursive: self.recursive.is_some(),
            max_depth: self.recursive.unwrap_or(0),
            show_permissions: self.permissions,
            show_mtime: self.mtime,
            show_hidden: self.hidden,
            show_files: self.files,
            show_symlinks: self.symlinks,
            show_special: self.special,
            show_dir_size: self.dir_size,
            show_errors: self.errors,
            abs_paths: self.absolute,
            rel_paths: self.relative,
            search_mode,
            search_pattern,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Search results default to absolute paths, since they lose their tree context.
fn path_style(config: &ScanConfig) -> PathStyle {
    if config.abs_paths {
        PathStyle::Absolute
    } else if config.rel_paths {
        PathStyle::Relative
    } else if config.is_search() {
        PathStyle::Absolute
    } else {
        PathStyle::Indented
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the `-v` level.
fn setup_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);
    process::exit(run(&args));
}

fn run(args: &Args) -> i32 {
    let config = match args.scan_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("treescan: {}", e);
            return EXIT_CONFIG;
        }
    };
    debug!(?config, "resolved configuration");

    let root = match TreeWalker::resolve_root(&args.path) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("treescan: {}", e);
            return EXIT_FAILURE;
        }
    };

    let output = OutputConfig {
        use_color: !args.json && should_use_color(args.color),
        path_style: path_style(&config),
        show_permissions: config.show_permissions,
        show_mtime: config.show_mtime,
        root: root.clone(),
    };

    let walker = match TreeWalker::new(config) {
        Ok(walker) => walker,
        Err(e) => {
            eprintln!("treescan: {}", e);
            return EXIT_CONFIG;
        }
    };

    let result = if args.json {
        let mut collector = JsonCollector::new(&root);
        walker.walk(&root, &mut collector).and_then(|_| {
            print_json(&collector.into_report()).map_err(ScanError::from)
        })
    } else {
        let mut formatter = ReportFormatter::stdio(output);
        walker.walk(&root, &mut formatter).map(|_| ())
    };

    match result {
        Ok(()) => 0,
        // reader went away, e.g. piped into head
        Err(ScanError::Output(e)) if e.kind() == io::ErrorKind::BrokenPipe => 0,
        Err(e @ ScanError::Config(_)) => {
            eprintln!("treescan: {}", e);
            EXIT_CONFIG
        }
        Err(e) => {
            eprintln!("treescan: {}", e);
            EXIT_FAILURE
        }
    }
}
