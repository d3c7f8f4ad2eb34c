use std::borrow::Cow;
use std::path::PathBuf;

use anyhow::Context as AnyhowContext;
use clap::{Parser, Subcommand};
use flexi_logger::{FileSpec, LevelFilter, LogSpecification, Logger, LoggerHandle, WriteMode};

use uxengine::{Context, DefaultContext};

mod parsers;
mod utils;

mod start;
use start::Start;

mod show;
use show::Show;

mod reset;
use reset::Reset;

mod consent;
use consent::Consent;

mod displayed;
use displayed::Displayed;

mod flags;
use flags::Flags;

mod uxes;
use uxes::Uxes;

const SIMPLE_VERSION_STRING: &'static str =
    include!(concat!(env!("OUT_DIR"), "/simple_version_string"));
const VERSION_STRING: &'static str = include!(concat!(env!("OUT_DIR"), "/version_string"));

#[derive(Parser)]
#[command(name = "uxengine")]
#[command(version(SIMPLE_VERSION_STRING))]
#[command(long_version(VERSION_STRING))]
struct Cli {
    /// `-e`, `--log-stderr`: Flag value, when enabled will cause logs to be output to `stderr`
    /// instead of a log file. Disabled by default (logs go to a file by default)
    #[arg(short = 'e', long, help = "Log to stderr instead of a file", action = clap::ArgAction::SetTrue, default_value_t = false)]
    log_stderr: bool,

    /// `-f`, `--log-file`: Path to desired log output file location. Optional, defaults to
    /// `$UXENGINE_HOME/log`
    #[arg(short = 'f', long, help = "Send log output to the given file")]
    log_file: Option<PathBuf>,

    /// `-s`, `--log-spec`: Raw [flexi_logger](https://docs.rs/flexi_logger/latest/flexi_logger/struct.LogSpecification.html) spec
    #[arg(short = 's', long, help = "Log spec for flexi_logger")]
    log_spec: Option<String>,

    /// `-l`, `--log-level`: Set the desired log verbosity. Defaults to 0, all values are listed
    /// below:
    ///
    /// | Value | Log Level |
    /// | ----- | --------- |
    /// | **0** | **Warn** |
    /// | 1 | Info |
    /// | 2 | Debug |
    /// | 3 | Trace |
    #[arg(
        short = 'l',
        long,
        help = "Set the log level, 0 = warn, 1 = info, etc",
        long_help = None,
        default_value_t = 0
    )]
    log_level: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the full version string and exit
    #[command()]
    Version,

    /// Run UX and enrollment channel selection for a request
    ///
    /// The consent state is read from and written back to the state file.
    #[command()]
    Start(Start),

    /// Print the stored consent state
    #[command()]
    Show(Show),

    /// Reset the stored consent state to the initial state
    #[command()]
    Reset(Reset),

    /// Record a user consent decision
    #[command()]
    Consent(Consent),

    /// Record that a consent notification was shown to the user
    #[command()]
    Displayed(Displayed),

    /// Print the effective flag values
    #[command()]
    Flags(Flags),

    /// Print the UX precedence and each UX's enrollment channels
    #[command()]
    Uxes(Uxes),
}

fn level_filter(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

impl Cli {
    fn configure_loggers(&self, ctx: &DefaultContext) -> anyhow::Result<LoggerHandle> {
        let log_spec = match &self.log_spec {
            Some(s) => {
                LogSpecification::parse(s).with_context(|| format!("parsing log spec {}", s))?
            }
            None => {
                if self.log_level > 0 {
                    LogSpecification::builder()
                        .module("uxengine", level_filter(self.log_level))
                        .build()
                } else {
                    LogSpecification::env().with_context(|| "getting log spec from env")?
                }
            }
        };

        let mut logger = Logger::with(log_spec);

        if !self.log_stderr {
            let path = match &self.log_file {
                Some(v) => {
                    if v.is_absolute() {
                        Some(Cow::Borrowed(v))
                    } else {
                        let full_path = std::env::current_dir()?.join(v);
                        Some(Cow::Owned(full_path))
                    }
                }
                None => ctx.get_log_dir().map(Cow::Owned).ok(),
            };

            if let Some(p) = &path {
                logger = logger
                    .log_to_file(
                        FileSpec::try_from(p.as_ref()).with_context(|| "creating filespec")?,
                    )
                    .append()
                    .write_mode(WriteMode::BufferAndFlush);
            }
        }

        Ok(logger.start().with_context(|| "starting logger")?)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = &cli.command {
        println!("{}", VERSION_STRING);
        return Ok(());
    }

    let ctx = DefaultContext::default();

    let log_handle = cli.configure_loggers(&ctx)?;

    let res = match cli.command {
        Commands::Start(c) => c.run(&ctx),
        Commands::Show(c) => c.run(&ctx),
        Commands::Reset(c) => c.run(&ctx),
        Commands::Consent(c) => c.run(&ctx),
        Commands::Displayed(c) => c.run(&ctx),
        Commands::Flags(c) => c.run(&ctx),
        Commands::Uxes(c) => c.run(),

        Commands::Version => panic!("unreachable"),
    };

    log_handle.flush();
    res
}
