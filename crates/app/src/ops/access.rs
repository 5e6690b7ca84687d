use clap::Args;

use common::ids::CapabilityKey;

use super::{split_path, zero_based, WorkspaceOpError};
use crate::render::render;

#[derive(Args, Debug, Clone)]
pub struct Access {
    /// Share key handed out by the owner
    pub key: CapabilityKey,

    /// Folder below the shared one
    #[arg(long)]
    pub path: Option<String>,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[async_trait::async_trait]
impl crate::op::Op for Access {
    type Error = WorkspaceOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let workspace = ctx.workspace().await?;
        let path = self.path.as_deref().map(split_path).unwrap_or_default();
        let reply = workspace
            .access(&ctx.actor, self.key.clone(), path, zero_based(self.page))
            .await?;
        Ok(render(&reply))
    }
}
