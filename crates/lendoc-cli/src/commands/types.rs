//! Types command - list supported document types and their prompts.

use clap::Args;
use console::style;

use lendoc_core::{ExtractorRegistry, FieldKind, FieldSpec};

/// Arguments for the types command.
#[derive(Args)]
pub struct TypesArgs {
    /// Print the extraction prompt of one document type
    #[arg(long, value_name = "TYPE")]
    prompt: Option<String>,
}

pub fn run(args: TypesArgs) -> anyhow::Result<()> {
    let registry = ExtractorRegistry::builtin();

    if let Some(document_type) = args.prompt {
        let extractor = registry.get_extractor(&document_type)?;
        print!("{}", extractor.get_extraction_prompt());
        return Ok(());
    }

    println!("{}", style("Supported document types:").bold());
    println!();

    for extractor in registry.iter() {
        let schema = extractor.schema();
        println!("  {} ({})", style(schema.key).cyan(), schema.label);
        print_fields(schema.fields, 2);
        println!();
    }

    Ok(())
}

fn print_fields(fields: &[FieldSpec], depth: usize) {
    let pad = "  ".repeat(depth);
    for field in fields {
        match field.kind {
            FieldKind::Group(inner) => {
                println!("{}  {}:", pad, field.name);
                print_fields(inner, depth + 1);
            }
            kind => println!("{}  {} [{}]", pad, field.name, kind_label(kind)),
        }
    }
}

fn kind_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Code => "code",
        FieldKind::Flag => "flag",
        FieldKind::Group(_) => "group",
    }
}
