mod args;
mod logging;
mod op;
mod ops;
mod render;
mod state;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Access, Cat, Cd, Init, Ls, Mkdir, Project, Put, Share, Up};
use state::AppConfig;

command_enum! {
    (Init, Init),
    (Mkdir, Mkdir),
    (Cd, Cd),
    (Up, Up),
    (Ls, Ls),
    (Put, Put),
    (Cat, Cat),
    (Share, Share),
    (Access, Access),
    (Project, Project),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let ctx = op::OpContext::new(args.config_path, args.user, args.handle);

    // Before `init` there is no config yet; log with the defaults.
    let config = ctx.state().map(|state| state.config).unwrap_or_default();
    let guards = logging::init_logging(config.log_level(), config.log_dir.as_deref());

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            drop(guards);
            std::process::exit(1);
        }
    }
}
