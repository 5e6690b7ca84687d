use clap::Args;

use common::workspace::Intent;

use crate::ops::{ProjectArg, WorkspaceOpError};
use crate::render::render;

/// Fork the current branch and switch to the fork
#[derive(Args, Debug, Clone)]
pub struct Branch {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Name of the new branch
    #[arg(long)]
    pub branch: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Branch {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let intent = Intent::Branch {
            project: self.project.project_ref(),
            name: self.branch.clone(),
        };
        let reply = workspace.execute(&ctx.actor, intent).await?;
        Ok(render(&reply))
    }
}
