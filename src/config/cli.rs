use crate::core::RecordSink;
use crate::utils::error::Result;
use std::fs::OpenOptions;
use std::io::Write;

/// Where record lines end up: appended to a file, or written to stdout
/// (the default, matching piping a reading into other tooling).
#[derive(Debug, Clone)]
pub enum LocalSink {
    File { path: String },
    Stdout,
}

impl LocalSink {
    pub fn file(path: String) -> Self {
        Self::File { path }
    }

    pub fn stdout() -> Self {
        Self::Stdout
    }
}

impl RecordSink for LocalSink {
    async fn append_line(&self, line: &str) -> Result<String> {
        match self {
            LocalSink::File { path } => {
                let mut file = OpenOptions::new().append(true).create(true).open(path)?;
                writeln!(file, "{}", line)?;
                Ok(path.clone())
            }
            LocalSink::Stdout => {
                let mut out = std::io::stdout();
                writeln!(out, "{}", line)?;
                Ok("stdout".to_string())
            }
        }
    }
}
