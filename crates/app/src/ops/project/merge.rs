use clap::Args;

use common::workspace::Intent;

use crate::ops::{ProjectArg, WorkspaceOpError};
use crate::render::render;

/// Fold one branch into another (source wins on file names)
#[derive(Args, Debug, Clone)]
pub struct Merge {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Branch whose newer commits and files are folded in
    #[arg(long)]
    pub from: String,

    /// Branch that receives them; files only it has are kept
    #[arg(long, default_value = common::versioning::DEFAULT_BRANCH)]
    pub into: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Merge {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let intent = Intent::Merge {
            project: self.project.project_ref(),
            source: self.from.clone(),
            target: self.into.clone(),
        };
        let reply = workspace.execute(&ctx.actor, intent).await?;
        Ok(render(&reply))
    }
}
