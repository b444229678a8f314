use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::cli::{OutputFormat, SignatureSource};
use crate::core::signature::{Frame, Signature};
use crate::core::types::{FormatId, Gap};

#[derive(Args)]
pub struct SignaturesArgs {
    #[command(subcommand)]
    pub command: SignaturesCommands,
}

#[derive(Subcommand)]
pub enum SignaturesCommands {
    /// List all signatures in the set
    List {
        #[command(flatten)]
        source: SignatureSource,
    },

    /// Show details of a specific signature
    Show {
        /// Format id (e.g. "x-fmt/pdf")
        id: String,

        #[command(flatten)]
        source: SignatureSource,
    },

    /// Export the signature set to a file
    Export {
        /// Output file
        output: PathBuf,

        /// Write the compiled (bincode) form instead of JSON
        #[arg(long)]
        binary: bool,

        #[command(flatten)]
        source: SignatureSource,
    },
}

/// Execute signatures subcommand
///
/// # Errors
///
/// Returns an error if the signature set cannot be loaded, the id is unknown,
/// or the export cannot be written.
pub fn run(args: SignaturesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        SignaturesCommands::List { source } => run_list(&source, format, verbose),
        SignaturesCommands::Show { id, source } => run_show(&id, &source, format, verbose),
        SignaturesCommands::Export {
            output,
            binary,
            source,
        } => run_export(&output, binary, &source, verbose),
    }
}

fn run_list(source: &SignatureSource, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let set = source.load(verbose)?;

    match format {
        OutputFormat::Text => {
            let id_width = set
                .signatures()
                .iter()
                .map(|s| s.id.as_str().len())
                .max()
                .unwrap_or(2)
                .max(2);
            let name_width = set
                .signatures()
                .iter()
                .map(|s| s.name.len().min(40))
                .max()
                .unwrap_or(4)
                .max(4);

            println!("Signature Set ({} signatures)\n", set.len());
            println!(
                "{:<id_w$} {:<name_w$} {:<6} {:>8} Extensions",
                "ID",
                "Name",
                "Anchor",
                "Segments",
                id_w = id_width,
                name_w = name_width,
            );
            println!("{}", "-".repeat(id_width + name_width + 30));
            for s in set.signatures() {
                println!(
                    "{:<id_w$} {:<name_w$} {:<6} {:>8} {}",
                    s.id.as_str(),
                    truncate(&s.name, name_width),
                    s.anchor.to_string(),
                    s.segments.len(),
                    s.extensions.join(", "),
                    id_w = id_width,
                    name_w = name_width,
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = set
                .signatures()
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "id": s.id,
                        "name": s.name,
                        "anchor": s.anchor,
                        "segments": s.segments.len(),
                        "extensions": s.extensions,
                        "mime": s.mime,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\tanchor\tsegments\textensions\tmime");
            for s in set.signatures() {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    s.id,
                    s.name,
                    s.anchor,
                    s.segments.len(),
                    s.extensions.join(","),
                    s.mime.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}

fn run_show(
    id: &str,
    source: &SignatureSource,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let set = source.load(verbose)?;
    let signature = set
        .get(&FormatId::new(id))
        .ok_or_else(|| anyhow::anyhow!("Signature '{}' not found", id))?;

    match format {
        OutputFormat::Text => print_signature(signature),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(signature)?),
        OutputFormat::Tsv => {
            println!("segment\tgap\tframes");
            for (i, segment) in signature.segments.iter().enumerate() {
                println!(
                    "{}\t{}\t{}",
                    i + 1,
                    format_gap(segment.gap),
                    format_frames(&segment.frames)
                );
            }
        }
    }

    Ok(())
}

fn print_signature(signature: &Signature) {
    println!("Signature: {}\n", signature.name);
    println!("ID:         {}", signature.id);
    println!("Anchor:     {}", signature.anchor);
    if !signature.extensions.is_empty() {
        println!("Extensions: {}", signature.extensions.join(", "));
    }
    if let Some(mime) = &signature.mime {
        println!("MIME:       {mime}");
    }

    println!("\nSegments:");
    println!("{:<4} {:<12} Frames", "#", "Gap");
    println!("{}", "-".repeat(60));
    for (i, segment) in signature.segments.iter().enumerate() {
        println!(
            "{:<4} {:<12} {}",
            i + 1,
            format_gap(segment.gap),
            format_frames(&segment.frames)
        );
    }
}

fn run_export(
    output: &Path,
    binary: bool,
    source: &SignatureSource,
    verbose: bool,
) -> anyhow::Result<()> {
    let set = source.load(verbose)?;

    if binary {
        std::fs::write(output, set.to_bincode()?)?;
    } else {
        std::fs::write(output, set.to_json()?)?;
    }

    println!(
        "Exported {} signatures to {}",
        set.len(),
        output.display()
    );

    Ok(())
}

fn format_gap(gap: Gap) -> String {
    match gap.max {
        Some(max) if max == gap.min => gap.min.to_string(),
        Some(max) => format!("{}-{max}", gap.min),
        None => format!("{}-*", gap.min),
    }
}

fn format_frames(frames: &[Frame]) -> String {
    frames
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
