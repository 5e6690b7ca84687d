use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;

use common::ids::ShortId;
use common::tree::FileEntry;
use common::workspace::{Intent, Reply};

use super::{At, WorkspaceOpError};
use crate::render::{file_line, render};

#[derive(Args, Debug, Clone)]
pub struct Cat {
    /// Short id shown next to the file in a listing
    #[arg(required_unless_present = "all")]
    pub short_id: Option<ShortId>,

    /// Fetch every file in the folder
    #[arg(long, conflicts_with = "short_id")]
    pub all: bool,

    #[command(flatten)]
    pub at: At,

    /// Write the content to this path instead of printing it (a directory with --all)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Text to print for `file`, or None when it needs to go to disk.
pub fn printable(file: &FileEntry, data: &Bytes) -> Option<String> {
    if let Some(text) = file.inline() {
        return Some(text.to_string());
    }
    file.kind()
        .is_textual()
        .then(|| String::from_utf8_lossy(data).into_owned())
}

impl Cat {
    async fn fetch_file(
        &self,
        ctx: &crate::op::OpContext,
        short_id: &ShortId,
    ) -> Result<String, WorkspaceOpError> {
        let workspace = ctx.workspace().await?;
        let reply = workspace
            .execute(
                &ctx.actor,
                Intent::Open {
                    at: self.at.destination()?,
                    short_id: short_id.clone(),
                },
            )
            .await?;
        let Reply::Opened { file } = &reply else {
            return Ok(render(&reply));
        };
        let data = workspace.fetch_content(file).await?;

        if let Some(out) = &self.out {
            tokio::fs::write(out, &data).await?;
            tracing::info!(file = %file.name(), out = %out.display(), "wrote file");
            return Ok(format!("wrote {} bytes to {}", data.len(), out.display()));
        }

        match printable(file, &data) {
            Some(text) => Ok(text),
            None => Ok(format!(
                "{}\n{} bytes of binary content, use --out to save it",
                file_line(file),
                data.len()
            )),
        }
    }

    async fn fetch_folder(&self, ctx: &crate::op::OpContext) -> Result<String, WorkspaceOpError> {
        let workspace = ctx.workspace().await?;
        let files = workspace
            .fetch_all(&ctx.actor, self.at.destination()?)
            .await?;
        if files.is_empty() {
            return Ok("no files in this folder".to_string());
        }

        if let Some(dir) = &self.out {
            tokio::fs::create_dir_all(dir).await?;
            for (file, data) in &files {
                tokio::fs::write(dir.join(file.name()), data).await?;
            }
            tracing::info!(count = files.len(), out = %dir.display(), "wrote folder");
            return Ok(format!("wrote {} files to {}", files.len(), dir.display()));
        }

        let sections: Vec<String> = files
            .iter()
            .map(|(file, data)| match printable(file, data) {
                Some(text) => format!("{}\n{}", file_line(file), text),
                None => format!(
                    "{}\n{} bytes of binary content, use --out to save it",
                    file_line(file),
                    data.len()
                ),
            })
            .collect();
        Ok(sections.join("\n\n"))
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Cat {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        match (&self.short_id, self.all) {
            (_, true) => self.fetch_folder(ctx).await,
            (Some(short_id), false) => self.fetch_file(ctx, short_id).await,
            (None, false) => Err(WorkspaceOpError::Usage(
                "give a short id or --all".to_string(),
            )),
        }
    }
}
