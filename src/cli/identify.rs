use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::warn;

use crate::buffer::Buffer;
use crate::cli::{OutputFormat, SignatureSource};
use crate::core::identification::{sort_by_confidence, Identification};
use crate::identify::{ByteIdentifier, ExtensionIdentifier, Orchestrator, OrchestratorConfig};
use crate::matching::engine::{
    Matcher, MatchingConfig, DEFAULT_CHOICES, DEFAULT_DISTANCE, DEFAULT_RANGE, DEFAULT_VAR_LENGTH,
};

#[derive(Args)]
pub struct IdentifyArgs {
    /// Files to identify
    /// Use '-' for stdin
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub source: SignatureSource,

    /// Maximum variable gap extent, in bytes
    #[arg(long, default_value_t = DEFAULT_DISTANCE)]
    pub distance: usize,

    /// Width of the positions a segment is tried over, in bytes
    #[arg(long, default_value_t = DEFAULT_RANGE)]
    pub range: usize,

    /// Maximum alternation expansion per segment
    #[arg(long, default_value_t = DEFAULT_CHOICES)]
    pub choices: usize,

    /// Minimum wildcard length that splits a segment
    #[arg(long, default_value_t = DEFAULT_VAR_LENGTH)]
    pub var_length: usize,

    /// Ignore filename extensions
    #[arg(long)]
    pub no_extension: bool,

    /// Hide identifications below this confidence (0.0-1.0)
    #[arg(long, default_value = "0.0")]
    pub min_confidence: f64,
}

impl IdentifyArgs {
    fn matching_config(&self) -> MatchingConfig {
        MatchingConfig::default()
            .with_distance(self.distance)
            .with_range(self.range)
            .with_choices(self.choices)
            .with_var_length(self.var_length)
    }
}

/// Identifications for one input
#[derive(Debug, serde::Serialize)]
struct InputReport {
    input: String,
    identifications: Vec<Identification>,
}

/// Execute identify subcommand
///
/// # Errors
///
/// Returns an error if the signature set cannot be loaded or an input cannot
/// be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: IdentifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let set = Arc::new(args.source.load(verbose)?);
    if set.is_empty() {
        eprintln!("Warning: Signature set is empty, nothing to match against.");
    }

    let config = args.matching_config();
    if verbose {
        eprintln!(
            "Matching with distance {}, range {}, choices {}, var-length {}",
            config.distance, config.range, config.choices, config.var_length
        );
    }

    let mut orchestrator = Orchestrator::new(OrchestratorConfig::default()).with_identifier(
        ByteIdentifier::new(Matcher::new(Arc::clone(&set), config))
            .with_extension_check(!args.no_extension),
    );
    if !args.no_extension {
        orchestrator.add_identifier(Arc::new(ExtensionIdentifier::new(set)));
    }

    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    let reports = rt.block_on(async {
        let mut reports = Vec::with_capacity(args.inputs.len());
        for input in &args.inputs {
            let mut identifications = identify_input(&orchestrator, input).await?;
            identifications.retain(|i| i.confidence() >= args.min_confidence);
            reports.push(InputReport {
                input: input.display().to_string(),
                identifications,
            });
        }
        anyhow::Ok(reports)
    })?;

    match format {
        OutputFormat::Text => print_text_results(&reports, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Tsv => print_tsv_results(&reports),
    }

    Ok(())
}

async fn identify_input(
    orchestrator: &Orchestrator,
    input: &Path,
) -> anyhow::Result<Vec<Identification>> {
    let stream = if input == Path::new("-") {
        orchestrator.identify(tokio::io::stdin(), None).await?
    } else {
        let path = input.to_path_buf();
        let limits = orchestrator.config().buffer_limits;
        let buffer = tokio::task::spawn_blocking(move || -> anyhow::Result<Buffer> {
            let file = std::fs::File::open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Buffer::from_seekable(file, limits)
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .await??;
        orchestrator.identify_buffer(buffer, input.to_str())
    };

    let (mut identifications, report) = stream.collect().await?;
    for name in &report.failed {
        warn!("Identifier '{name}' failed on {}", input.display());
    }

    // Arrival order between identifiers is not deterministic
    identifications.sort_by(|a, b| a.identifier().cmp(b.identifier()));
    sort_by_confidence(&mut identifications);
    Ok(identifications)
}

fn print_text_results(reports: &[InputReport], verbose: bool) {
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(60));
        }
        println!("\n{}", report.input);

        if report.identifications.is_empty() {
            println!("   No identifications above the confidence threshold.");
            continue;
        }

        for id in &report.identifications {
            println!(
                "   {:<10} {} [{:.2} {}]",
                id.identifier(),
                id.label(),
                id.confidence(),
                id.level()
            );
            if verbose || id.is_unknown() {
                for part in id.basis_parts() {
                    println!("      - {part}");
                }
            }
        }
    }
}

fn print_tsv_results(reports: &[InputReport]) {
    println!("input\tidentifier\tformat_id\tlabel\tconfidence\tlevel\tbasis");
    for report in reports {
        for id in &report.identifications {
            println!(
                "{}\t{}\t{}\t{}\t{:.4}\t{}\t{}",
                report.input,
                id.identifier(),
                id.format_id().map(|f| f.as_str()).unwrap_or(""),
                id.label(),
                id.confidence(),
                id.level(),
                id.basis(),
            );
        }
    }
}
