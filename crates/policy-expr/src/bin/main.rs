//! Policy expression command-line interface

use clap::{Args, Parser, Subcommand};
use policy_expr::cli::configure::{self, ConfigureConfig};
use policy_expr::cli::evaluate::{self, EvaluateConfig};
use policy_expr::cli::input::{ConditionSource, InputConfig};
use policy_expr::cli::inspect::{self, InspectConfig};
use policy_expr::cli::output::{self, OutputFormat};
use policy_expr::cli::serialize::{self, SerializeConfig};
use policy_expr::cli::to_filter::{self, ToFilterConfig};
use std::path::PathBuf;

/// Policy condition tool
#[derive(Parser)]
#[command(name = "pexpr")]
#[command(author, version, about = "Policy condition expression tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, table, pretty)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    /// Engine settings file (JSON)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Condition and its context, shared by every command
#[derive(Args)]
struct InputArgs {
    /// Condition in filter text, e.g. "@Name='master' and @Size>100"
    condition: Option<String>,

    /// Read the condition from a file (XML document or filter text)
    #[arg(long = "file", conflicts_with = "condition")]
    file: Option<PathBuf>,

    /// Facet declaration (JSON) used to type attributes
    #[arg(long)]
    facet: Option<PathBuf>,

    /// Enum definitions (JSON array)
    #[arg(short, long)]
    enums: Option<PathBuf>,

    /// Properties (name=value)
    #[arg(short, long = "prop")]
    props: Vec<String>,

    /// Properties file (JSON object)
    #[arg(short = 'P', long = "props")]
    props_file: Option<PathBuf>,
}

impl InputArgs {
    fn into_config(self, settings: Option<PathBuf>) -> InputConfig {
        InputConfig {
            source: ConditionSource {
                condition: self.condition,
                file: self.file,
            },
            facet: self.facet,
            enums: self.enums,
            settings,
            props: self.props,
            props_file: self.props_file,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a condition against properties
    Eval {
        #[command(flatten)]
        input: InputArgs,

        /// Print the evaluated tree as a document with results
        #[arg(long)]
        with_results: bool,
    },

    /// Write a condition as an XML document
    Serialize {
        #[command(flatten)]
        input: InputArgs,

        /// Evaluate first and include every node's result
        #[arg(long)]
        with_results: bool,
    },

    /// Show the nodes and derived flags of a condition
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        /// Evaluate first to fill in node results
        #[arg(long)]
        evaluate: bool,
    },

    /// Print a condition in the filter grammar
    ToFilter {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List the property writes that would make a condition hold
    Configure {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let format = cli
        .format
        .as_deref()
        .map(OutputFormat::parse)
        .unwrap_or_default();
    let settings = cli.settings;

    let result = match cli.command {
        Commands::Eval {
            input,
            with_results,
        } => evaluate::evaluate(EvaluateConfig {
            input: input.into_config(settings),
            with_results,
            verbose: cli.verbose,
            output_format: format,
            output_file: cli.output,
        }),

        Commands::Serialize {
            input,
            with_results,
        } => serialize::serialize_condition(SerializeConfig {
            input: input.into_config(settings),
            with_results,
            output_file: cli.output,
        }),

        Commands::Inspect { input, evaluate } => inspect::inspect(InspectConfig {
            input: input.into_config(settings),
            evaluate,
            output_format: format,
            output_file: cli.output,
        }),

        Commands::ToFilter { input } => to_filter::to_filter(ToFilterConfig {
            input: input.into_config(settings),
            output_file: cli.output,
        }),

        Commands::Configure { input } => configure::configure(ConfigureConfig {
            input: input.into_config(settings),
            output_format: format,
            output_file: cli.output,
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
