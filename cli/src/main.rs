use argmap_core::{ArgTable, OPTION_PREFIX};
use clap::{Args, Parser, Subcommand};

/// Output format for `dump`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

/// Accessor used by `get`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ValueKind {
    String,
    Int,
    Bool,
}

#[derive(Debug, Parser)]
#[command(name = "argmap")]
#[command(about = "Parse option tokens into an option table and query it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the resolved option table for the tokens after `--`.
    Dump(DumpArgs),
    /// Look up one option in the tokens after `--`.
    Get(GetArgs),
}

#[derive(Debug, Args)]
struct DumpArgs {
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Tokens to parse (program name excluded).
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Option name, with or without the leading dash (e.g. `-port` or `port`).
    #[arg(long, allow_hyphen_values = true)]
    name: String,
    /// Accessor to use.
    #[arg(long, default_value = "string")]
    kind: ValueKind,
    /// Value returned when the option is absent.
    #[arg(long, allow_hyphen_values = true)]
    default: Option<String>,
    /// Reject values that are not well-formed instead of coercing them (int only).
    #[arg(long)]
    strict: bool,
    /// Tokens to parse (program name excluded).
    #[arg(last = true)]
    tokens: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Dump(args) => run_dump(args),
        Command::Get(args) => run_get(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// dump command
// ---------------------------------------------------------------------------

fn run_dump(args: DumpArgs) -> Result<(), String> {
    let table = ArgTable::parse(&args.tokens);

    match args.format {
        CliOutputFormat::Json => {
            let json = serde_json::to_string_pretty(&table)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            println!("{json}");
        }
        CliOutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&table)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            print!("{yaml}");
        }
        CliOutputFormat::Table => print!("{}", table_to_text(&table)),
    }
    Ok(())
}

fn table_to_text(table: &ArgTable) -> String {
    let width = table.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (name, value) in table.iter() {
        out.push_str(&format!("{name:<width$}  {value}\n"));
    }
    if !table.positional().is_empty() {
        out.push_str(&format!("positional: {}\n", table.positional().join(" ")));
    }
    out
}

// ---------------------------------------------------------------------------
// get command
// ---------------------------------------------------------------------------

fn run_get(args: GetArgs) -> Result<(), String> {
    let table = ArgTable::parse(&args.tokens);
    let name = normalize_name(&args.name);
    let default = args.default.as_deref();

    let output = match args.kind {
        ValueKind::String => table.get_arg(&name, default.unwrap_or_default()),
        ValueKind::Int => {
            let default = match default {
                Some(raw) => raw
                    .parse::<i64>()
                    .map_err(|e| format!("Invalid --default '{raw}' for int: {e}"))?,
                None => 0,
            };
            if args.strict {
                table
                    .try_get_arg::<i64>(&name)
                    .map_err(|e| e.to_string())?
                    .unwrap_or(default)
                    .to_string()
            } else {
                table.get_int_arg(&name, default).to_string()
            }
        }
        ValueKind::Bool => {
            let default = match default {
                Some(raw) => raw
                    .parse::<bool>()
                    .map_err(|e| format!("Invalid --default '{raw}' for bool: {e}"))?,
                None => false,
            };
            table.get_bool_arg(&name, default).to_string()
        }
    };

    println!("{output}");
    Ok(())
}

/// Adds the option prefix to bare names so `port` and `-port` are equivalent.
fn normalize_name(name: &str) -> String {
    if name.starts_with(OPTION_PREFIX) {
        name.to_string()
    } else {
        format!("{OPTION_PREFIX}{name}")
    }
}
