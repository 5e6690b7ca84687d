use clap::Args;

use common::ids::CapabilityKey;
use common::workspace::{Destination, ProjectRef, WorkspaceError};

use crate::state::StateError;

pub mod access;
pub mod cat;
pub mod cd;
pub mod init;
pub mod ls;
pub mod mkdir;
pub mod project;
pub mod put;
pub mod share;
pub mod up;

pub use access::Access;
pub use cat::Cat;
pub use cd::Cd;
pub use init::Init;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use project::Project;
pub use put::Put;
pub use share::Share;
pub use up::Up;

/// Error shared by every command that opens the workspace.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceOpError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("{0}")]
    Workspace(#[from] WorkspaceError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}

/// Split `a/b/c` into folder names, ignoring empty segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert a 1-based page flag into the zero-based page the workspace uses.
pub fn zero_based(page: usize) -> usize {
    page.saturating_sub(1)
}

/// Selects the folder a command works on.
#[derive(Args, Debug, Clone, Default)]
pub struct At {
    /// Work inside this project's current branch
    #[arg(long)]
    pub project: Option<String>,

    /// Owner of the project (defaults to the acting user)
    #[arg(long, requires = "project")]
    pub owner: Option<String>,

    /// Read through a share key
    #[arg(long, conflicts_with = "project")]
    pub key: Option<CapabilityKey>,

    /// Folder below the project root or shared folder, e.g. docs/2024
    #[arg(long)]
    pub path: Option<String>,
}

impl At {
    pub fn destination(&self) -> Result<Destination, WorkspaceOpError> {
        let path = self.path.as_deref().map(split_path).unwrap_or_default();
        match (&self.key, &self.project) {
            (Some(key), _) => Ok(Destination::Shared {
                key: key.clone(),
                path,
            }),
            (None, Some(name)) => Ok(Destination::Project {
                project: ProjectRef {
                    owner: self.owner.clone(),
                    name: name.clone(),
                },
                path,
            }),
            (None, None) if path.is_empty() => Ok(Destination::Cwd),
            (None, None) => Err(WorkspaceOpError::Usage(
                "--path needs --project or --key".to_string(),
            )),
        }
    }
}

/// A project by name, optionally someone else's.
#[derive(Args, Debug, Clone)]
pub struct ProjectArg {
    /// Project name, e.g. app.git
    pub name: String,

    /// Owner of the project (defaults to the acting user)
    #[arg(long)]
    pub owner: Option<String>,
}

impl ProjectArg {
    pub fn project_ref(&self) -> ProjectRef {
        ProjectRef {
            owner: self.owner.clone(),
            name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("docs//2024/"), vec!["docs", "2024"]);
        assert!(split_path("/").is_empty());
    }

    #[test]
    fn test_destination() {
        assert_eq!(At::default().destination().unwrap(), Destination::Cwd);

        let at = At {
            project: Some("app.git".to_string()),
            path: Some("src".to_string()),
            ..Default::default()
        };
        assert_eq!(
            at.destination().unwrap(),
            Destination::Project {
                project: ProjectRef::own("app.git"),
                path: vec!["src".to_string()],
            }
        );

        let at = At {
            path: Some("src".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            at.destination(),
            Err(WorkspaceOpError::Usage(_))
        ));
    }

    #[test]
    fn test_zero_based() {
        assert_eq!(zero_based(0), 0);
        assert_eq!(zero_based(1), 0);
        assert_eq!(zero_based(3), 2);
    }
}
