mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use optstore::{register_builtin_options, register_option, set_global_option};

#[derive(Parser)]
#[command(name = "optstore", version, about = "Typed configuration options tooling")]
struct Cli {
    /// Set a global option before running the command (repeatable)
    #[arg(long = "set", global = true, value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Declare an extra option, e.g. `retries:unsigned=3` (repeatable)
    #[arg(long = "declare", global = true, value_name = "NAME:KIND=DEFAULT")]
    declare: Vec<String>,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List declared options
    Decls {
        /// Only show names under this prefix (e.g. `pp`)
        #[arg(long = "prefix")]
        prefix: Option<String>,
        /// Print declarations as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Build an options object from NAME=VALUE pairs and print it
    Build {
        #[arg(value_name = "NAME=VALUE")]
        pairs: Vec<String>,
        #[arg(long = "json")]
        json: bool,
    },
    /// Read one option from the global options
    Get {
        name: String,
        /// Value used when the option is unset (defaults to the declared default)
        #[arg(long = "default", value_name = "VALUE")]
        default: Option<String>,
    },
    /// Print the global options
    Show {
        #[arg(long = "json")]
        json: bool,
    },
    /// Interactive options session
    Repl,
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    register_builtin_options().context("failed to register built-in options")?;
    for entry in &cli.declare {
        let (name, kind, default) = commands::parse_declaration(entry)?;
        register_option(name, kind, default, "declared on the command line")
            .with_context(|| format!("invalid --declare `{entry}`"))?;
    }
    for entry in &cli.set {
        let (name, value) = commands::parse_assignment(entry)?;
        set_global_option(None, name, value).with_context(|| format!("invalid --set `{entry}`"))?;
    }

    match cli.command {
        Command::Decls { prefix, json } => commands::cmd_decls(prefix.as_deref(), json),
        Command::Build { pairs, json } => commands::cmd_build(&pairs, json),
        Command::Get { name, default } => commands::cmd_get(&name, default.as_deref()),
        Command::Show { json } => commands::cmd_show(json),
        Command::Repl => commands::cmd_repl(),
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
