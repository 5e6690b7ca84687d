use clap::Args;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Milliseconds a command waits for a concurrent one before giving up
    #[arg(long, default_value_t = 5_000)]
    pub lock_timeout_ms: u64,

    /// Entries per listing page
    #[arg(long, default_value_t = common::tree::DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Also write daily log files to this directory
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            lock_timeout_ms: self.lock_timeout_ms,
            page_size: self.page_size.max(1),
            log_dir: self.log_dir.clone(),
            ..Default::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized burrow directory at: {}\n\
             - Document: {}\n\
             - Blobs: {}\n\
             - Config: {}\n\
             - Page size: {}\n\
             - Lock timeout: {}ms",
            state.burrow_dir.display(),
            state.data_path.display(),
            state.blobs_path.display(),
            state.config_path.display(),
            state.config.page_size,
            state.config.lock_timeout_ms,
        ))
    }
}
