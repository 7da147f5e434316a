//! `scaffold` and `schema` commands

use super::util::{flag_value, has_flag};
use facadegen::*;

pub fn cmd_scaffold(args: &[String]) -> Result<()> {
    let (Some(group_id), Some(artifact_id)) = (
        flag_value(args, "--group-id"),
        flag_value(args, "--artifact-id"),
    ) else {
        return Err(
            "Usage: facadegen scaffold --group-id <G> --artifact-id <A> [--output DIR] [--version V] [--framework-version V] [--library-version V] [--force]"
                .into(),
        );
    };

    let output = flag_value(args, "--output")
        .or_else(|| flag_value(args, "-o"))
        .unwrap_or(".");

    let mut request = ScaffoldRequest::new(output, group_id, artifact_id);
    if let Some(v) = flag_value(args, "--version") {
        request.version = v.to_string();
    }
    if let Some(v) = flag_value(args, "--framework-version") {
        request.framework_version = v.to_string();
    }
    if let Some(v) = flag_value(args, "--library-version") {
        request.library_version = v.to_string();
    }
    request.force = has_flag(args, "--force");

    let written = scaffold(&request)?;
    for path in &written {
        println!("  {}", path.display());
    }
    println!("✓ Created {}", request.project_dir().display());
    Ok(())
}

pub fn cmd_schema(args: &[String]) -> Result<()> {
    let schema_name = args.first().map(|s| s.as_str()).unwrap_or("list");

    match schema_name {
        "list" => {
            println!("Available schemas: config, declarations, manifest");
            Ok(())
        }
        "config" => print_schema::<FacadeConfig>(),
        "declarations" => print_schema::<Round>(),
        "manifest" => print_schema::<ArtifactManifest>(),
        _ => Err(format!("Unknown schema: {}", schema_name).into()),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<()> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
