//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lcc::Pipeline;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "libcallcount")]
#[command(about = "Instrument IR modules to count calls to library functions")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a pass pipeline over a textual IR module
    Instrument {
        /// Input module
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Build pipeline the module comes from
        #[arg(long, value_enum, default_value = "compile-time")]
        pipeline: PipelineArg,

        /// Function names never instrumented (repeatable)
        #[arg(long, value_name = "NAME")]
        exclude: Vec<String>,

        /// Passes to run, in order (comma-separated)
        #[arg(long, value_delimiter = ',', default_value = "count-libcalls")]
        passes: Vec<String>,

        /// Print pass statistics and metrics to stderr
        #[arg(long)]
        stats: bool,
    },
    /// List registered passes
    Passes {
        /// Show only this pass
        #[arg(value_name = "NAME")]
        name: Option<String>,
    },
}

/// Pipeline argument.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PipelineArg {
    /// Whole program after linking, with the runtime merged in
    LinkTime,
    /// Single translation unit; the counter is declared on demand
    CompileTime,
}

impl From<PipelineArg> for Pipeline {
    fn from(arg: PipelineArg) -> Self {
        match arg {
            PipelineArg::LinkTime => Self::LinkTime,
            PipelineArg::CompileTime => Self::CompileTime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_instrument_defaults() {
        let cli = Cli::try_parse_from(["libcallcount", "instrument", "a.ll"]).unwrap();
        let Commands::Instrument {
            input,
            output,
            pipeline,
            exclude,
            passes,
            stats,
        } = cli.command
        else {
            panic!("expected instrument");
        };
        assert_eq!(input, PathBuf::from("a.ll"));
        assert!(output.is_none());
        assert_eq!(Pipeline::from(pipeline), Pipeline::CompileTime);
        assert!(exclude.is_empty());
        assert_eq!(passes, ["count-libcalls"]);
        assert!(!stats);
    }

    #[test]
    fn test_instrument_options() {
        let cli = Cli::try_parse_from([
            "libcallcount",
            "-v",
            "instrument",
            "a.ll",
            "-o",
            "b.ll",
            "--pipeline",
            "link-time",
            "--exclude",
            "puts",
            "--exclude",
            "exit",
            "--passes",
            "dump-ir,count-libcalls",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Instrument {
            output,
            pipeline,
            exclude,
            passes,
            ..
        } = cli.command
        else {
            panic!("expected instrument");
        };
        assert_eq!(output, Some(PathBuf::from("b.ll")));
        assert_eq!(Pipeline::from(pipeline), Pipeline::LinkTime);
        assert_eq!(exclude, ["puts", "exit"]);
        assert_eq!(passes, ["dump-ir", "count-libcalls"]);
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        assert!(Cli::try_parse_from(["libcallcount", "-v", "-s", "passes"]).is_err());
    }

    #[test]
    fn test_passes_name_is_optional() {
        let cli = Cli::try_parse_from(["libcallcount", "passes"]).unwrap();
        assert!(matches!(cli.command, Commands::Passes { name: None }));

        let cli = Cli::try_parse_from(["libcallcount", "passes", "dump-ir"]).unwrap();
        assert!(matches!(cli.command, Commands::Passes { name: Some(ref n) } if n == "dump-ir"));
    }
}
