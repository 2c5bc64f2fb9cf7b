use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use tabula_core::Directive;
use tabula_import::{Importer, RuleCategorizer, StatementFile};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Beancount directives, one blank line apart.
    Beancount,
    /// A JSON array of directives.
    Json,
}

/// Build an importer from a TOML config, optionally with a categorization
/// rule file.
pub fn load_importer(config: &Path, rules: Option<&Path>) -> Result<Importer> {
    let text = std::fs::read_to_string(config)
        .with_context(|| format!("Failed to read importer config {}", config.display()))?;
    let importer =
        Importer::from_toml(&text).with_context(|| format!("Invalid importer config {}", config.display()))?;

    let Some(rules) = rules else {
        return Ok(importer);
    };
    let text = std::fs::read_to_string(rules)
        .with_context(|| format!("Failed to read rule file {}", rules.display()))?;
    let categorizer =
        RuleCategorizer::from_toml(&text).with_context(|| format!("Invalid rule file {}", rules.display()))?;
    info!(rules = categorizer.len(), file = %rules.display(), "loaded categorization rules");
    Ok(importer.with_categorizer(categorizer))
}

fn open(path: &Path) -> Result<StatementFile> {
    StatementFile::open(path).with_context(|| format!("Failed to read statement {}", path.display()))
}

pub fn extract(importer: &Importer, files: &[PathBuf], format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let mut entries: Vec<Directive> = Vec::new();
    for path in files {
        let file = open(path)?;
        if !importer.identify(&file) {
            warn!(file = %path.display(), importer = %importer.name(), "statement does not match importer config");
        }
        let extracted = importer
            .extract(&file)
            .with_context(|| format!("Failed to extract {}", path.display()))?;
        entries.extend(extracted);
    }

    match format {
        OutputFormat::Beancount => {
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                write!(out, "{entry}")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &entries)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn identify(importer: &Importer, files: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for path in files {
        let file = open(path)?;
        if importer.identify(&file) {
            writeln!(out, "{}\t{}", path.display(), importer.name())?;
        } else {
            writeln!(out, "{}\t-", path.display())?;
        }
    }
    Ok(())
}

pub fn file_date(importer: &Importer, files: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for path in files {
        let file = open(path)?;
        let date = importer
            .file_date(&file)
            .with_context(|| format!("Failed to read dates from {}", path.display()))?;
        match date {
            Some(date) => writeln!(out, "{}\t{}\t{}", path.display(), date, importer.file_account())?,
            None => writeln!(out, "{}\t-\t{}", path.display(), importer.file_account())?,
        }
    }
    Ok(())
}
