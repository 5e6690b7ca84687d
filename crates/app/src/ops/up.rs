use clap::Args;

use common::workspace::Intent;

use super::WorkspaceOpError;
use crate::render::render;

#[derive(Args, Debug, Clone)]
pub struct Up;

#[async_trait::async_trait]
impl crate::op::Op for Up {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let reply = workspace.execute(&ctx.actor, Intent::Up).await?;
        Ok(render(&reply))
    }
}
