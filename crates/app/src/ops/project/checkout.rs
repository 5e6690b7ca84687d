use clap::Args;

use common::workspace::Intent;

use crate::ops::{ProjectArg, WorkspaceOpError};
use crate::render::render;

/// Switch to another branch
#[derive(Args, Debug, Clone)]
pub struct Checkout {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Branch to switch to
    #[arg(long)]
    pub branch: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Checkout {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let intent = Intent::Checkout {
            project: self.project.project_ref(),
            branch: self.branch.clone(),
        };
        let reply = workspace.execute(&ctx.actor, intent).await?;
        Ok(render(&reply))
    }
}
