use clap::Args;

use common::workspace::Intent;

use crate::ops::{ProjectArg, WorkspaceOpError};
use crate::render::render;

/// Snapshot the current branch
#[derive(Args, Debug, Clone)]
pub struct Commit {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Commit message
    #[arg(long, short)]
    pub message: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Commit {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let intent = Intent::Commit {
            project: self.project.project_ref(),
            message: self.message.clone(),
        };
        let reply = workspace.execute(&ctx.actor, intent).await?;
        Ok(render(&reply))
    }
}
