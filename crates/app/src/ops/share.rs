use clap::Args;

use common::workspace::Intent;

use super::{split_path, WorkspaceOpError};
use crate::render::render;

#[derive(Args, Debug, Clone)]
pub struct Share {
    /// Folder to share, from the root of your tree (defaults to the current folder)
    #[arg(long)]
    pub path: Option<String>,
}

#[async_trait::async_trait]
impl crate::op::Op for Share {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let reply = workspace
            .execute(
                &ctx.actor,
                Intent::Share {
                    path: self.path.as_deref().map(split_path),
                },
            )
            .await?;
        Ok(render(&reply))
    }
}
