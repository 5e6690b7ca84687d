use clap::Args;

use common::workspace::Intent;

use crate::ops::{ProjectArg, WorkspaceOpError};
use crate::render::render;

/// Drop every commit after the given one
#[derive(Args, Debug, Clone)]
pub struct Rollback {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Commit to return to
    #[arg(long)]
    pub to: u64,
}

#[async_trait::async_trait]
impl crate::op::Op for Rollback {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let intent = Intent::Rollback {
            project: self.project.project_ref(),
            commit_id: self.to,
        };
        let reply = workspace.execute(&ctx.actor, intent).await?;
        Ok(render(&reply))
    }
}
