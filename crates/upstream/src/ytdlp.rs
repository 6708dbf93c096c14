use crate::{ExtractOptions, MetadataExtractor, UpstreamError};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Metadata extractor that shells out to the `yt-dlp` executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command line for a metadata-only extraction of `url`
    pub fn args(url: &str, options: &ExtractOptions) -> Vec<String> {
        let mut args = vec![
            "--skip-download".to_string(),
            "--dump-single-json".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
        ];

        if options.comments {
            args.push("--write-comments".to_string());
            let mut hints = format!("youtube:comment_sort={}", options.comment_sort.as_str());
            if let Some(max) = options.max_comments {
                hints.push_str(&format!(";max_comments={}", max));
            }
            args.push("--extractor-args".to_string());
            args.push(hints);
        }

        if let Some(proxy) = &options.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.url().to_string());
        }

        args.push(url.to_string());
        args
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl MetadataExtractor for YtDlp {
    async fn extract_info(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<Value, UpstreamError> {
        let program = self.program.display().to_string();
        debug!("Running {} for {}", program, url);

        let output = Command::new(&self.program)
            .args(Self::args(url, options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| UpstreamError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} exited with {}", program, output.status));
            return Err(UpstreamError::Extraction(message));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| UpstreamError::Parse(format!("{} output is not JSON: {}", program, e)))
    }
}
