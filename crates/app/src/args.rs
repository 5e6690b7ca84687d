pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "burrow")]
#[command(about = "Versioned folders, projects and shared views")]
pub struct Args {
    /// Path to the burrow directory (defaults to ~/.burrow)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Id of the acting user
    #[arg(long, global = true, env = "BURROW_USER", default_value = "local")]
    pub user: String,

    /// Handle others can invite this user by
    #[arg(long, global = true, env = "BURROW_HANDLE")]
    pub handle: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
