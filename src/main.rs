use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

mod encode;
mod error;
mod invoke;
mod request;
mod util;
mod variant;

use crate::invoke::{InvokeOptions, RunMode, SolverLocator};
use crate::request::SolveRequest;
use crate::variant::ALL_VARIANTS;

#[derive(Parser, Debug)]
#[command(
    name = "khost",
    version,
    about = "Host process for external knapsack solver executables",
    after_help = "Commands:\n  solve --request <PATH>     Encode, invoke the solver, print the response envelope\n  encode --request <PATH>    Print the encoded argument vector without spawning\n  variants                   List supported variants and their token shapes\n\nExamples:\n  khost solve --request request.json\n  cat request.json | khost solve --timeout-secs 30\n  khost solve --request request.json --solvers-dir ./build/cpp --pretty\n  khost encode --request request.json\n  khost variants --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one invocation and print the `{success, data | error}` envelope
    Solve(SolveArgs),
    /// Print the argument vector a request would encode to
    Encode(EncodeArgs),
    /// List supported variant identifiers and shapes
    Variants(VariantsArgs),
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// Path to the request envelope JSON (stdin when omitted)
    #[arg(long, value_name = "PATH")]
    request: Option<PathBuf>,

    /// Override the solver base directory entirely
    #[arg(long, value_name = "DIR", conflicts_with = "packaged")]
    solvers_dir: Option<PathBuf>,

    /// Resolve solvers from the bundled resources directory next to khost
    #[arg(long)]
    packaged: bool,

    /// Source-tree root for development-mode resolution
    #[arg(long, value_name = "DIR", default_value = ".", conflicts_with = "packaged")]
    root: PathBuf,

    /// Kill the solver and fail the invocation after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Pretty-print the response envelope
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Path to the request envelope JSON (stdin when omitted)
    #[arg(long, value_name = "PATH")]
    request: Option<PathBuf>,

    /// Pretty-print the argument vector
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct VariantsArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Solve(args) => cmd_solve(args),
        Commands::Encode(args) => cmd_encode(args),
        Commands::Variants(args) => cmd_variants(args),
    }
}

fn cmd_solve(args: SolveArgs) -> Result<()> {
    let request = read_request(args.request.as_deref())?;
    let locator = match args.solvers_dir {
        Some(dir) => SolverLocator::explicit(dir),
        None if args.packaged => SolverLocator::for_mode(RunMode::Packaged, &args.root),
        None => SolverLocator::for_mode(RunMode::Development, &args.root),
    };
    let options = InvokeOptions {
        timeout: args.timeout_secs.map(Duration::from_secs),
    };
    let response = invoke::solve(&locator, &request, options);
    print_json(&response, args.pretty)
}

fn cmd_encode(args: EncodeArgs) -> Result<()> {
    let request = read_request(args.request.as_deref())?;
    match encode::encode(request.algorithm, &request.params) {
        Ok(argv) => print_json(&argv, args.pretty),
        Err(err) => {
            let response = request::SolveResponse::failure(err.to_string());
            print_json(&response, args.pretty)
        }
    }
}

#[derive(Serialize)]
struct VariantRow {
    id: &'static str,
    solver: &'static str,
    leading: Option<&'static str>,
    item_token: &'static str,
}

fn variant_rows() -> Vec<VariantRow> {
    ALL_VARIANTS
        .iter()
        .map(|variant| {
            let shape = variant.shape();
            VariantRow {
                id: variant.id(),
                solver: variant.solver_stem(),
                leading: shape.leading.field(),
                item_token: shape.fields.layout(),
            }
        })
        .collect()
}

fn cmd_variants(args: VariantsArgs) -> Result<()> {
    let rows = variant_rows();
    if args.json {
        return print_json(&rows, true);
    }
    for row in rows {
        let leading = row.leading.map(|f| format!(" +{f}")).unwrap_or_default();
        println!("{:<22} {:<20}{}  [{}]", row.id, row.solver, leading, row.item_token);
    }
    Ok(())
}

fn read_request(path: Option<&std::path::Path>) -> Result<SolveRequest> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read request {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("read request from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&raw).context("parse request envelope JSON")
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("serialize output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_rows_cover_the_whole_catalog() {
        let rows = variant_rows();
        assert_eq!(rows.len(), ALL_VARIANTS.len());
        assert!(rows.iter().any(|row| row.id == "zero_one"));
        assert!(rows
            .iter()
            .any(|row| row.id == "kth_optimal" && row.leading == Some("k")));
        assert!(rows
            .iter()
            .any(|row| row.id == "two_dimensional_cost" && row.item_token == "weight,volume,value"));
    }

    #[test]
    fn cli_parses_solve_flags() {
        let cli = Cli::try_parse_from([
            "khost",
            "solve",
            "--request",
            "req.json",
            "--timeout-secs",
            "30",
            "--pretty",
        ])
        .expect("parse solve args");
        match cli.command {
            Commands::Solve(args) => {
                assert_eq!(args.request.as_deref(), Some(std::path::Path::new("req.json")));
                assert_eq!(args.timeout_secs, Some(30));
                assert!(args.pretty);
                assert!(!args.packaged);
            }
            _ => panic!("expected solve"),
        }
    }

    #[test]
    fn solvers_dir_conflicts_with_packaged() {
        let result = Cli::try_parse_from([
            "khost",
            "solve",
            "--solvers-dir",
            "/tmp/solvers",
            "--packaged",
        ]);
        assert!(result.is_err());
    }
}
