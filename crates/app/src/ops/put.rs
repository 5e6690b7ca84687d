use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::Args;

use common::tree::FileKind;
use common::workspace::Intent;

use super::{At, WorkspaceOpError};
use crate::render::render;

#[derive(Args, Debug, Clone)]
pub struct Put {
    /// Text to save as a note
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub text: Option<String>,

    /// Upload a file instead
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Type tag for the upload (guessed from the file otherwise)
    #[arg(long, requires = "file")]
    pub kind: Option<String>,

    /// Name for the upload (defaults to the file name)
    #[arg(long, requires = "file")]
    pub name: Option<String>,

    #[command(flatten)]
    pub at: At,
}

const CODE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "ts", "go", "c", "h", "cpp", "hpp", "java", "kt", "rb", "sh", "swift",
];
const DATASET_EXTENSIONS: &[&str] = &["csv", "tsv", "json", "parquet", "xlsx", "xls", "sqlite"];

/// Best-effort type tag for an upload.
pub fn guess_kind(path: &Path) -> FileKind {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if CODE_EXTENSIONS.contains(&extension.as_str()) {
        return FileKind::Code;
    }
    if DATASET_EXTENSIONS.contains(&extension.as_str()) {
        return FileKind::Dataset;
    }
    let Some(mime) = mime_guess::from_path(path).first() else {
        return FileKind::Other("other".to_string());
    };
    match mime.type_().as_str() {
        "image" => FileKind::Photo,
        "video" => FileKind::Video,
        "audio" => FileKind::Audio,
        "text" => FileKind::Document,
        "application" if mime.subtype() == "pdf" => FileKind::Document,
        _ => FileKind::Other("other".to_string()),
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Put {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let at = self.at.destination()?;

        let reply = match (&self.text, &self.file) {
            (Some(text), _) => {
                workspace
                    .execute(
                        &ctx.actor,
                        Intent::PutText {
                            at,
                            text: text.clone(),
                        },
                    )
                    .await?
            }
            (None, Some(file)) => {
                let data = tokio::fs::read(file).await?;
                let kind = match &self.kind {
                    Some(kind) => FileKind::from(kind.as_str()),
                    None => guess_kind(file),
                };
                let name = self.name.clone().or_else(|| {
                    file.file_name()
                        .and_then(|name| name.to_str())
                        .map(str::to_string)
                });
                workspace
                    .put_blob(&ctx.actor, at, kind, name, Bytes::from(data))
                    .await?
            }
            (None, None) => {
                return Err(WorkspaceOpError::Usage(
                    "give some text or --file".to_string(),
                ))
            }
        };
        Ok(render(&reply))
    }
}
