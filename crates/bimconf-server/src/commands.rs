use anyhow::{Context, Result};
use bimconf_core::{synthesize_file, ConfigurationDocument, SynthesisOptions};

use crate::cli::{InputArgs, SynthArgs};

pub fn synth(args: &SynthArgs, options: &SynthesisOptions) -> Result<()> {
    let document = synthesize_file(&args.input, options)?;
    let json = render(&document, args.compact)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
            log::info!("Configuration document written to {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn labels(args: &InputArgs, options: &SynthesisOptions) -> Result<()> {
    let document = synthesize_file(&args.input, options)?;
    for ticket in document.label_handoff()? {
        println!("{}\t{}", ticket.label, ticket.category);
    }
    Ok(())
}

pub fn inventory(args: &InputArgs, options: &SynthesisOptions) -> Result<()> {
    let document = synthesize_file(&args.input, options)?;
    let json = serde_json::to_string_pretty(&document.inventory())
        .context("Failed to serialize inventory")?;
    println!("{}", json);
    Ok(())
}

fn render(document: &ConfigurationDocument, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(document)
    } else {
        document.to_json_pretty()
    };
    json.context("Failed to serialize configuration document")
}
