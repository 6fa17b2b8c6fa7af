//! Manual correction sessions.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use apicorpus_core::determinism::canonical_json::to_canonical_pretty;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("no editor configured (set VISUAL or EDITOR)")]
    NoEditor,

    #[error("editor {editor:?} exited with {status}; run aborted")]
    EditorFailed { editor: String, status: String },

    #[error("edited document is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Corpus(#[from] apicorpus_core::CorpusError),
}

/// Lets an operator edit a document and hands back the result.
/// Blocks until the operator is done; an error aborts the whole run.
pub trait EditSession {
    fn edit(&self, document: &Value, label: &str) -> Result<Value, EditError>;
}

/// Opens `$VISUAL` / `$EDITOR` on a temporary file.
#[derive(Debug, Clone)]
pub struct EditorSession {
    command: Vec<String>,
    scratch_dir: PathBuf,
}

impl EditorSession {
    pub fn new(editor: &str) -> Result<Self, EditError> {
        let command: Vec<String> = editor.split_whitespace().map(str::to_string).collect();
        if command.is_empty() {
            return Err(EditError::NoEditor);
        }
        Ok(Self {
            command,
            scratch_dir: env::temp_dir(),
        })
    }

    pub fn from_env() -> Result<Self, EditError> {
        let editor = env::var("VISUAL")
            .or_else(|_| env::var("EDITOR"))
            .map_err(|_| EditError::NoEditor)?;
        Self::new(&editor)
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    fn run_editor(&self, file: &Path) -> Result<(), EditError> {
        let (program, args) = self.command.split_first().ok_or(EditError::NoEditor)?;
        let status = Command::new(program).args(args).arg(file).status()?;
        if !status.success() {
            return Err(EditError::EditorFailed {
                editor: self.command.join(" "),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

impl EditSession for EditorSession {
    fn edit(&self, document: &Value, label: &str) -> Result<Value, EditError> {
        let file = self
            .scratch_dir
            .join(format!("apicorpus-{}.json", uuid::Uuid::new_v4()));
        fs::write(&file, to_canonical_pretty(document)?)?;
        info!(%label, file = %file.display(), "waiting for editor");

        let result = self.run_editor(&file).and_then(|()| {
            let raw = fs::read_to_string(&file)?;
            Ok(serde_json::from_str(&raw)?)
        });
        let _ = fs::remove_file(&file);
        result
    }
}
