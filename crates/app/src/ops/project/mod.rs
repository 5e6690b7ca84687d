use clap::{Args, Subcommand};

pub mod branch;
pub mod branches;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod invite;
pub mod log;
pub mod merge;
pub mod rollback;

use crate::op::Op;

crate::command_enum! {
    (Init, init::Init),
    (Commit, commit::Commit),
    (Branch, branch::Branch),
    (Checkout, checkout::Checkout),
    (Branches, branches::Branches),
    (Log, log::Log),
    (Rollback, rollback::Rollback),
    (Merge, merge::Merge),
    (Invite, invite::Invite),
}

// Rename the generated Command to ProjectCommand for clarity
pub type ProjectCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Project {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[async_trait::async_trait]
impl Op for Project {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
