use clap::Args;

use common::workspace::Intent;

use crate::ops::{ProjectArg, WorkspaceOpError};
use crate::render::render;

/// Show the commits of the current branch
#[derive(Args, Debug, Clone)]
pub struct Log {
    #[command(flatten)]
    pub project: ProjectArg,
}

#[async_trait::async_trait]
impl crate::op::Op for Log {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let intent = Intent::Log {
            project: self.project.project_ref(),
        };
        let reply = workspace.execute(&ctx.actor, intent).await?;
        Ok(render(&reply))
    }
}
