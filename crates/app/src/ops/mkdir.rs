use clap::Args;

use common::workspace::Intent;

use super::WorkspaceOpError;
use crate::render::render;

#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    /// Name of the new folder
    pub name: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Mkdir {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let reply = workspace
            .execute(
                &ctx.actor,
                Intent::Mkdir {
                    name: self.name.clone(),
                },
            )
            .await?;
        Ok(render(&reply))
    }
}
