use clap::Args;

use common::workspace::Intent;

use crate::ops::WorkspaceOpError;
use crate::render::render;

/// Create a project in the current folder
#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Project name, must end in .git
    pub name: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let reply = workspace
            .execute(
                &ctx.actor,
                Intent::InitProject {
                    name: self.name.clone(),
                },
            )
            .await?;
        Ok(render(&reply))
    }
}
