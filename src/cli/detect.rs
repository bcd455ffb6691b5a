//! Grammar format auto-detection

use crate::serialization::GrammarFormat;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

/// Detected format with the method that found it
#[derive(Debug, Clone, Copy)]
pub struct FormatDetection {
    /// Detected format
    pub format: GrammarFormat,
    /// Detection method used
    pub method: DetectionMethod,
}

/// Method used to detect grammar format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    /// Leading bytes of the file
    Content,
    /// File extension
    Extension,
    /// User explicitly specified
    UserSpecified,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Extension => write!(f, "file extension"),
            Self::UserSpecified => write!(f, "user specified"),
        }
    }
}

/// Detect grammar format from file
///
/// An explicit format always wins. Otherwise the leading bytes are checked
/// (a JSON grammar is an object), then the extension.
pub fn detect_format(path: &Path, user_format: Option<GrammarFormat>) -> Result<FormatDetection> {
    if let Some(format) = user_format {
        return Ok(FormatDetection {
            format,
            method: DetectionMethod::UserSpecified,
        });
    }

    if let Ok(format) = detect_by_content(path) {
        return Ok(FormatDetection {
            format,
            method: DetectionMethod::Content,
        });
    }

    Ok(FormatDetection {
        format: detect_by_extension(path)?,
        method: DetectionMethod::Extension,
    })
}

fn detect_by_content(path: &Path) -> Result<GrammarFormat> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let mut header = [0u8; 64];
    let bytes_read = file
        .read(&mut header)
        .with_context(|| format!("Failed to read file header: {}", path.display()))?;

    match header[..bytes_read]
        .iter()
        .find(|b| !b.is_ascii_whitespace())
    {
        Some(b'{') => Ok(GrammarFormat::Json),
        Some(_) => Ok(GrammarFormat::Bincode),
        None => bail!("File is empty"),
    }
}

fn detect_by_extension(path: &Path) -> Result<GrammarFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .context("No file extension")?;

    match ext.to_lowercase().as_str() {
        "json" => Ok(GrammarFormat::Json),
        "bin" | "bincode" => Ok(GrammarFormat::Bincode),
        _ => bail!("Unknown file extension: {}", ext),
    }
}
