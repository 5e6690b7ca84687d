use clap::Args;

use common::workspace::Intent;

use crate::ops::{ProjectArg, WorkspaceOpError};
use crate::render::render;

/// Add a collaborator by handle
#[derive(Args, Debug, Clone)]
pub struct Invite {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Handle of the user to invite, with or without @
    #[arg(long)]
    pub handle: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Invite {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let intent = Intent::Invite {
            project: self.project.project_ref(),
            handle: self.handle.clone(),
        };
        let reply = workspace.execute(&ctx.actor, intent).await?;
        Ok(render(&reply))
    }
}
