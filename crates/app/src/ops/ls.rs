use clap::Args;

use common::workspace::Intent;

use super::{zero_based, At, WorkspaceOpError};
use crate::render::render;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    #[command(flatten)]
    pub at: At,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let reply = workspace
            .execute(
                &ctx.actor,
                Intent::Ls {
                    at: self.at.destination()?,
                    page: zero_based(self.page),
                },
            )
            .await?;
        Ok(render(&reply))
    }
}
