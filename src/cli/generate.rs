//! `generate` and `status` commands

use super::util::{flag_value, has_flag, load_config, positional, InputProvider};
use facadegen::*;
use std::path::Path;

pub fn cmd_generate(args: &[String]) -> Result<()> {
    let inputs = positional(args);
    if inputs.is_empty() {
        return Err(
            "Usage: facadegen generate <src-dir|File.java|decl.yaml>... [--root DIR] [--config FILE] [--json]"
                .into(),
        );
    }

    let config = load_config(args)?;
    let root = flag_value(args, "--root").map(Path::new);
    let mut session = Session::from_config(&config, root)?;

    let mut provider = InputProvider::new(&inputs);
    session.run(&mut provider);
    let report = session.into_report();

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.provider_errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Declaration(format!(
            "{} input(s) could not be read",
            report.provider_errors.len()
        )))
    }
}

fn print_report(report: &SessionReport) {
    for outcome in &report.services {
        match outcome {
            ServiceOutcome::Created {
                artifact, methods, ..
            } => println!("✓ Created {} ({} methods)", artifact.display(), methods),
            ServiceOutcome::Patched {
                artifact,
                added,
                failed,
                ..
            } => {
                if !added.is_empty() {
                    println!("+ {}: added {}", artifact.display(), added.join(", "));
                }
                if !failed.is_empty() {
                    println!("✗ {}: failed {}", artifact.display(), failed.join(", "));
                }
            }
            ServiceOutcome::Unchanged { artifact, .. } => {
                println!("= {} up to date", artifact.display())
            }
            ServiceOutcome::AlreadyProcessed { .. } => {}
            ServiceOutcome::Failed { service, error } => println!("✗ {}: {}", service, error),
        }
    }
    for outcome in &report.methods {
        match outcome {
            MethodOutcome::Added {
                service, method, ..
            } => println!("+ {}: added {}", service, method),
            MethodOutcome::Created {
                artifact, method, ..
            } => println!("✓ Created {} (recreated for {})", artifact.display(), method),
            MethodOutcome::Failed {
                service,
                method,
                error,
            } => println!("✗ {}.{}: {}", service, method, error),
            MethodOutcome::UnknownService { service, method } => {
                println!("⚠ {}.{}: service not declared in this run", service, method)
            }
            MethodOutcome::Skipped { .. } => {}
        }
    }
    for error in &report.provider_errors {
        println!("✗ {}", error);
    }

    println!();
    println!(
        "{} created, {} method(s) added, {} failure(s)",
        report.created(),
        report.added_methods(),
        report.failures()
    );
}

pub fn cmd_status(args: &[String]) -> Result<()> {
    let inputs = positional(args);
    if inputs.is_empty() {
        return Err(
            "Usage: facadegen status <src-dir|File.java|decl.yaml>... [--root DIR] [--config FILE] [--json]"
                .into(),
        );
    }

    let config = load_config(args)?;
    let root = flag_value(args, "--root").map(Path::new);
    let session = Session::from_config(&config, root)?;

    let mut provider = InputProvider::new(&inputs);
    let mut statuses = Vec::new();
    while let Some(round) = provider.next_round()? {
        for service in &round.services {
            statuses.push(session.status(service)?);
        }
    }

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    for status in &statuses {
        if !status.exists {
            println!("✗ {} (not generated)", status.artifact.display());
            continue;
        }
        if status.is_current() {
            println!("✓ {}", status.artifact.display());
            continue;
        }
        println!("⚠ {}", status.artifact.display());
        for name in &status.missing {
            println!("    missing: {}", name);
        }
        for name in &status.stale {
            println!("    stale:   {} (declaration changed, block kept)", name);
        }
    }
    Ok(())
}
