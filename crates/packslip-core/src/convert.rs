//! Packing-slip conversion to printable PDF.
//!
//! The pipeline only sees [`DocumentConverter`]; the concrete converter shells
//! out to `wkhtmltopdf` at a configured location.

use crate::error::ConvertError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Converts an HTML document on disk into a printable file.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, html: &Path, output: &Path) -> Result<(), ConvertError>;
}

/// Fixed page layout for printed slips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_size: String,
    /// Applied to all four sides
    pub margin: String,
    pub encoding: String,
    pub outline: bool,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_size: "Letter".to_string(),
            margin: "0.75in".to_string(),
            encoding: "UTF-8".to_string(),
            outline: false,
        }
    }
}

impl PageLayout {
    /// Command-line options understood by wkhtmltopdf.
    pub fn wkhtmltopdf_args(&self) -> Vec<String> {
        let mut args = vec!["--page-size".to_string(), self.page_size.clone()];
        for side in ["top", "right", "bottom", "left"] {
            args.push(format!("--margin-{side}"));
            args.push(self.margin.clone());
        }
        args.push("--encoding".to_string());
        args.push(self.encoding.clone());
        if !self.outline {
            args.push("--no-outline".to_string());
        }
        args
    }
}

/// Configuration for [`WkhtmltopdfConverter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Converter executable; a bare name is resolved through PATH
    pub executable: PathBuf,

    /// Timeout in seconds (0 waits forever)
    pub timeout_secs: u64,

    pub layout: PageLayout,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            executable: std::env::var_os("PACKSLIP_WKHTMLTOPDF")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("wkhtmltopdf")),
            timeout_secs: 120,
            layout: PageLayout::default(),
        }
    }
}

impl ConverterConfig {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Converter backed by the wkhtmltopdf executable.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfConverter {
    config: ConverterConfig,
}

impl WkhtmltopdfConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(ConverterConfig::from_env())
    }

    fn command_args(&self, html: &Path, output: &Path) -> Vec<String> {
        let mut args = self.config.layout.wkhtmltopdf_args();
        args.push(html.to_string_lossy().into_owned());
        args.push(output.to_string_lossy().into_owned());
        args
    }
}

#[async_trait]
impl DocumentConverter for WkhtmltopdfConverter {
    async fn convert(&self, html: &Path, output: &Path) -> Result<(), ConvertError> {
        let start = Instant::now();
        let exe = &self.config.executable;

        let child = Command::new(exe)
            .args(self.command_args(html, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ConvertError::ExecutableNotFound(exe.to_string_lossy().into_owned())
                }
                _ => ConvertError::Io(e),
            })?;

        let result = if self.config.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| ConvertError::TimedOut(self.config.timeout_secs))?
        } else {
            child.wait_with_output().await
        };
        let out = result?;

        debug!(
            html = %html.display(),
            duration_ms = start.elapsed().as_millis() as u64,
            "converter finished"
        );

        if out.status.success() {
            Ok(())
        } else {
            Err(ConvertError::Failed {
                exit_code: out.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_args() {
        let args = PageLayout::default().wkhtmltopdf_args();
        assert_eq!(
            args,
            vec![
                "--page-size", "Letter",
                "--margin-top", "0.75in",
                "--margin-right", "0.75in",
                "--margin-bottom", "0.75in",
                "--margin-left", "0.75in",
                "--encoding", "UTF-8",
                "--no-outline",
            ]
        );
    }

    #[test]
    fn test_command_args_end_with_input_then_output() {
        let converter = WkhtmltopdfConverter::new(ConverterConfig::default());
        let args = converter.command_args(Path::new("P1.html"), Path::new("P1.pdf"));
        assert_eq!(args[args.len() - 2], "P1.html");
        assert_eq!(args[args.len() - 1], "P1.pdf");
    }

    #[tokio::test]
    async fn test_successful_executable() {
        let converter = WkhtmltopdfConverter::new(ConverterConfig::default().with_executable("true"));
        converter
            .convert(Path::new("in.html"), Path::new("out.pdf"))
            .await
            .expect("convert failed");
    }

    #[tokio::test]
    async fn test_failing_executable() {
        let converter = WkhtmltopdfConverter::new(ConverterConfig::default().with_executable("false"));
        let err = converter
            .convert(Path::new("in.html"), Path::new("out.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let converter = WkhtmltopdfConverter::new(
            ConverterConfig::default().with_executable("/nonexistent/wkhtmltopdf"),
        );
        let err = converter
            .convert(Path::new("in.html"), Path::new("out.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::ExecutableNotFound(_)));
    }
}
