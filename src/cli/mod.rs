//! Command-line interface for sigid.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **identify**: Identify the format of one or more files (or stdin)
//! - **signatures**: List, show, or export the signature set
//!
//! ## Usage
//!
//! ```text
//! # Identify files
//! sigid identify report.pdf image.png
//!
//! # Pipe from another tool
//! curl -s https://example.org/file | sigid identify -
//!
//! # JSON output for scripting
//! sigid identify report.pdf --format json
//!
//! # Use a compiled signature set from the home directory
//! SIGID_HOME=/opt/sigid sigid identify --signatures pronom.sig report.pdf
//!
//! # Compile the embedded set to bincode
//! sigid signatures export default.sig --binary
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::catalog::store::SignatureSet;
use crate::utils::settings::Settings;

pub mod identify;
pub mod signatures;

#[derive(Parser)]
#[command(name = "sigid")]
#[command(version)]
#[command(about = "Identify file formats from byte signatures")]
#[command(
    long_about = "sigid identifies the true format of a file by matching its bytes against a set of format signatures.\n\nIt reports every signature that matches, with a confidence and the evidence behind it:\n- Exact and approximate segment matches\n- Agreement between the byte match and the filename extension\n- Extension-only candidates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify the format of files
    Identify(identify::IdentifyArgs),

    /// Inspect or export the signature set
    Signatures(signatures::SignaturesArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Where to load the signature set from
#[derive(Args, Debug, Clone, Default)]
pub struct SignatureSource {
    /// Signature file (JSON or compiled); a bare name is looked up in the home directory
    #[arg(long)]
    pub signatures: Option<PathBuf>,

    /// Home directory for signature files (defaults to $SIGID_HOME or ~/.sigid)
    #[arg(long)]
    pub home: Option<PathBuf>,
}

impl SignatureSource {
    /// Resolve the settings for this invocation
    #[must_use]
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(home) = &self.home {
            settings = settings.with_home(home);
        }
        if let Some(signature) = &self.signatures {
            settings = settings.with_signature(signature);
        }
        settings
    }

    /// Load the signature set.
    ///
    /// An explicitly named file must exist. Otherwise the default file in the
    /// home directory is used when present, and the embedded set when not.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be loaded.
    pub fn load(&self, verbose: bool) -> anyhow::Result<SignatureSet> {
        let settings = self.settings();
        let path = settings.signature_path();

        let set = if !settings.uses_default_signature() || path.exists() {
            SignatureSet::load_from_file(&path)
                .with_context(|| format!("Failed to load signatures from {}", path.display()))?
        } else {
            debug!("No signature file at {}, using embedded set", path.display());
            SignatureSet::load_embedded()?
        };

        if verbose {
            eprintln!("Loaded signature set with {} signatures", set.len());
        }
        Ok(set)
    }
}
