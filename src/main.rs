//! facadegen CLI - Command-line interface
//!
//! Commands:
//!   generate - Create or extend facades for annotated services
//!   status   - Show missing and stale facade methods
//!   scaffold - Generate a demo MCP project
//!   schema   - Print JSON schemas of the input formats

mod cli;

use facadegen::{logging, VERSION};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    logging::init_logger(cli::util::has_flag(&args[2..], "--verbose"));

    let result = match args[1].as_str() {
        "generate" | "gen" => cli::cmd_generate(&args[2..]),
        "status" => cli::cmd_status(&args[2..]),
        "scaffold" => cli::cmd_scaffold(&args[2..]),
        "schema" => cli::cmd_schema(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("facadegen {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
facadegen - Incremental MCP facade synthesis

USAGE:
    facadegen <COMMAND> [OPTIONS]

COMMANDS:
    generate <inputs>...             Create facades, append new methods to existing ones
    status <inputs>...               Report missing and stale facade methods (read-only)
    scaffold --group-id <G> --artifact-id <A>
                                     Generate a demo Spring Boot MCP project
    schema [config|declarations|manifest]
                                     Print JSON schema for an input format
    version                          Print version

INPUTS:
    *.java, directories              Parsed for @MCPService classes
    *.yaml, *.yml, *.json            Declaration files (see `facadegen schema declarations`)

OPTIONS:
    --root <dir>                     Generation root (overrides FACADEGEN_ROOT and facadegen.yaml)
    --config <file>                  Config file (default: ./facadegen.yaml)
    --json                           JSON output (generate, status)
    --verbose                        Debug logging (RUST_LOG overrides)
    --output <dir>                   Scaffold output directory (default: .)
    --version <v>                    Scaffold project version
    --framework-version <v>          Scaffold Spring Boot version
    --library-version <v>            Scaffold Spring AI version
    --force                          Scaffold into a non-empty directory

EXAMPLES:
    facadegen generate src/main/java --root src/main/java
    facadegen generate services.yaml --json
    facadegen status src/main/java
    facadegen scaffold --group-id com.example.demo --artifact-id mcp-demo
"#
    );
}
