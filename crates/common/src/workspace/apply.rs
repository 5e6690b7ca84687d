use crate::access;
use crate::blobs::BlobId;
use crate::document::{Document, UserId};
use crate::ids::ShortId;
use crate::navigator::{locate, resolve, resolve_mut, Location};
use crate::tree::{validate_name, FileEntry, FileKind, Listing, Node, TreeError};

use super::{
    Actor, Destination, Intent, ListingContext, LogEntry, ProjectRef, Reply, Settings,
    WorkspaceError,
};

const PROJECT_SUFFIX: &str = ".git";

/// A destination pinned down against the document.
enum Target {
    Folder {
        owner: UserId,
        path: Vec<String>,
    },
    Project {
        owner: UserId,
        name: String,
        path: Vec<String>,
    },
    Shared {
        key: crate::ids::CapabilityKey,
        path: Vec<String>,
    },
}

/// Apply one intent to `doc` on behalf of `actor`.
///
/// The actor is observed first, so a user record exists for every caller.
///  On error `doc` may be partially modified; run this inside
///  [`Store::transact`](crate::store::Store::transact), which discards it.
pub fn apply(
    doc: &mut Document,
    actor: &Actor,
    intent: Intent,
    settings: &Settings,
) -> Result<Reply, WorkspaceError> {
    doc.observe(&actor.id, actor.handle.as_deref());

    match intent {
        Intent::Mkdir { name } => mkdir(doc, actor, name),
        Intent::Cd { name } => cd(doc, actor, name),
        Intent::Up => up(doc, actor),
        Intent::Ls { at, page } => ls(doc, actor, at, page, settings.page_size),
        Intent::PutText { at, text } => {
            put(doc, actor, at, |short_id| {
                FileEntry::text(short_id.clone(), format!("message_{}", short_id), text)
            })
        }
        Intent::PutBlob {
            at,
            kind,
            name,
            blob_id,
        } => put_blob(doc, actor, at, kind, name, blob_id),
        Intent::Open { at, short_id } => open(doc, actor, at, short_id),
        Intent::OpenAll { at } => {
            let target = target(doc, actor, at)?;
            let files = node_at(doc, &target)?.files().to_vec();
            Ok(Reply::OpenedAll { files })
        }
        Intent::Share { path } => {
            let path = match path {
                Some(path) => path,
                None => current_path(doc, actor)?.to_vec(),
            };
            let key = access::share(doc, &actor.id, path)?;
            Ok(Reply::Shared { key })
        }
        Intent::InitProject { name } => init_project(doc, actor, name),
        Intent::Commit { project, message } => {
            let (owner, name) = split(&project, actor);
            let commit_id = access::project_mut(doc, &actor.id, &owner, &name)?.commit(message);
            Ok(Reply::Committed {
                project: name,
                commit_id,
            })
        }
        Intent::Branch { project, name: branch } => {
            if branch.trim().is_empty() {
                return Err(WorkspaceError::Invalid("branch name is empty".to_string()));
            }
            let (owner, name) = split(&project, actor);
            if !access::project_mut(doc, &actor.id, &owner, &name)?.create_branch(&branch) {
                return Err(WorkspaceError::BranchExists(branch));
            }
            Ok(Reply::BranchCreated {
                project: name,
                branch,
            })
        }
        Intent::Checkout { project, branch } => {
            let (owner, name) = split(&project, actor);
            if !access::project_mut(doc, &actor.id, &owner, &name)?.switch_branch(&branch) {
                return Err(WorkspaceError::BranchNotFound(branch));
            }
            Ok(Reply::SwitchedBranch {
                project: name,
                branch,
            })
        }
        Intent::Branches { project } => {
            let (owner, name) = split(&project, actor);
            let found = access::project(doc, &actor.id, &owner, &name)?;
            Ok(Reply::Branches {
                current: found.current_branch_name().to_string(),
                names: found.branch_names().map(str::to_string).collect(),
                project: name,
            })
        }
        Intent::Log { project } => {
            let (owner, name) = split(&project, actor);
            let found = access::project(doc, &actor.id, &owner, &name)?;
            let entries = found
                .current()
                .commits()
                .iter()
                .rev()
                .map(|commit| LogEntry {
                    commit_id: commit.id(),
                    message: commit.message().to_string(),
                })
                .collect();
            Ok(Reply::Log {
                branch: found.current_branch_name().to_string(),
                entries,
                project: name,
            })
        }
        Intent::Rollback { project, commit_id } => {
            let (owner, name) = split(&project, actor);
            let found = access::project_mut(doc, &actor.id, &owner, &name)?;
            if !found.rollback(commit_id) {
                return Err(WorkspaceError::CommitOutOfRange {
                    commit_id,
                    len: found.current().commits().len(),
                });
            }
            Ok(Reply::RolledBack {
                project: name,
                commit_id,
            })
        }
        Intent::Merge {
            project,
            source,
            target,
        } => {
            let (owner, name) = split(&project, actor);
            let found = access::project_mut(doc, &actor.id, &owner, &name)?;
            for branch in [&source, &target] {
                if !found.has_branch(branch) {
                    return Err(WorkspaceError::BranchNotFound(branch.clone()));
                }
            }
            found.merge(&source, &target);
            Ok(Reply::Merged {
                project: name,
                source,
                target,
            })
        }
        Intent::Invite { project, handle } => {
            let (owner, name) = split(&project, actor);
            let user_id = access::invite(doc, &actor.id, &owner, &name, &handle)?;
            Ok(Reply::Invited {
                project: name,
                user_id,
                handle,
            })
        }
    }
}

fn split(project: &ProjectRef, actor: &Actor) -> (UserId, String) {
    (project.owner_or(actor).to_string(), project.name.clone())
}

fn current_path<'a>(doc: &'a Document, actor: &Actor) -> Result<&'a [String], WorkspaceError> {
    doc.user(&actor.id)
        .map(|user| user.current_path.as_slice())
        .ok_or_else(|| WorkspaceError::UserNotFound(actor.id.clone()))
}

/* Targets */

fn target(doc: &Document, actor: &Actor, at: Destination) -> Result<Target, WorkspaceError> {
    match at {
        Destination::Cwd => {
            let user = doc
                .user(&actor.id)
                .ok_or_else(|| WorkspaceError::UserNotFound(actor.id.clone()))?;
            match locate(&user.structure, &user.current_path)? {
                Location::Folder => Ok(Target::Folder {
                    owner: actor.id.clone(),
                    path: user.current_path.clone(),
                }),
                Location::Project { project, inner, .. } => {
                    access::project(doc, &actor.id, &actor.id, &project)?;
                    Ok(Target::Project {
                        owner: actor.id.clone(),
                        name: project,
                        path: inner,
                    })
                }
            }
        }
        Destination::Project { project, path } => {
            let (owner, name) = split(&project, actor);
            access::project(doc, &actor.id, &owner, &name)?;
            Ok(Target::Project { owner, name, path })
        }
        Destination::Shared { key, path } => Ok(Target::Shared { key, path }),
    }
}

fn node_at<'a>(doc: &'a Document, target: &Target) -> Result<&'a Node, WorkspaceError> {
    match target {
        Target::Folder { owner, path } => {
            let user = doc
                .user(owner)
                .ok_or_else(|| WorkspaceError::UserNotFound(owner.clone()))?;
            Ok(resolve(&user.structure, path)?)
        }
        Target::Project { owner, name, path } => {
            let project = doc
                .project(owner, name)
                .ok_or_else(|| WorkspaceError::ProjectNotFound(name.clone()))?;
            Ok(resolve(project.working_tree(), path)?)
        }
        Target::Shared { key, path } => Ok(access::shared_view(doc, key, path)?.1),
    }
}

fn node_at_mut<'a>(doc: &'a mut Document, target: &Target) -> Result<&'a mut Node, WorkspaceError> {
    match target {
        Target::Folder { owner, path } => {
            let user = doc
                .user_mut(owner)
                .ok_or_else(|| WorkspaceError::UserNotFound(owner.clone()))?;
            Ok(resolve_mut(&mut user.structure, path)?)
        }
        Target::Project { owner, name, path } => {
            let project = doc
                .project_mut(owner, name)
                .ok_or_else(|| WorkspaceError::ProjectNotFound(name.clone()))?;
            Ok(resolve_mut(project.working_tree_mut(), path)?)
        }
        Target::Shared { .. } => Err(WorkspaceError::ReadOnly),
    }
}

/* Navigation */

fn mkdir(doc: &mut Document, actor: &Actor, name: String) -> Result<Reply, WorkspaceError> {
    let target = target(doc, actor, Destination::Cwd)?;
    node_at_mut(doc, &target)?.create_folder(&name)?;
    Ok(Reply::FolderCreated { name })
}

fn cd(doc: &mut Document, actor: &Actor, name: String) -> Result<Reply, WorkspaceError> {
    let target = target(doc, actor, Destination::Cwd)?;
    let depth = current_path(doc, actor)?.len();
    let entering = node_at(doc, &target)?.folder(&name).ok_or_else(|| TreeError::NotFound {
        segment: name.clone(),
        depth,
    })?;

    let project = match (&target, entering.tag().project()) {
        (Target::Project { name: project, .. }, _) => Some(project.clone()),
        (_, Some(project)) => Some(project.to_string()),
        _ => None,
    };

    let user = doc
        .user_mut(&actor.id)
        .ok_or_else(|| WorkspaceError::UserNotFound(actor.id.clone()))?;
    user.current_path.push(name);
    Ok(Reply::Moved {
        path: user.current_path.clone(),
        project,
    })
}

fn up(doc: &mut Document, actor: &Actor) -> Result<Reply, WorkspaceError> {
    let user = doc
        .user_mut(&actor.id)
        .ok_or_else(|| WorkspaceError::UserNotFound(actor.id.clone()))?;
    Ok(Reply::Up {
        left: user.current_path.pop(),
    })
}

fn ls(
    doc: &Document,
    actor: &Actor,
    at: Destination,
    page: usize,
    page_size: usize,
) -> Result<Reply, WorkspaceError> {
    let target = target(doc, actor, at)?;
    let node = node_at(doc, &target)?;
    let page = Listing::of(node).page(page, page_size);

    let context = match target {
        Target::Folder { path, .. } => ListingContext::Folder { path },
        Target::Project { owner, name, path } => {
            let branch = doc
                .project(&owner, &name)
                .map(|p| p.current_branch_name().to_string())
                .unwrap_or_default();
            ListingContext::Project {
                owner,
                project: name,
                branch,
                path,
            }
        }
        Target::Shared { key, path } => ListingContext::Shared { key, path },
    };
    Ok(Reply::Listing { context, page })
}

/* Files */

/// Insert the entry built by `build` at `at`, committing when the target
///  is inside a project.
fn put(
    doc: &mut Document,
    actor: &Actor,
    at: Destination,
    build: impl FnOnce(&ShortId) -> FileEntry,
) -> Result<Reply, WorkspaceError> {
    let target = target(doc, actor, at)?;
    let node = node_at_mut(doc, &target)?;
    let entry = build(&node.fresh_short_id());
    let file_name = entry.name().to_string();
    node.add_or_replace_file(entry);
    let file = node.file(&file_name).cloned().ok_or_else(|| {
        WorkspaceError::Invalid(format!("file '{}' vanished on insert", file_name))
    })?;

    match target {
        Target::Project { owner, name, .. } => {
            let project = doc
                .project_mut(&owner, &name)
                .ok_or_else(|| WorkspaceError::ProjectNotFound(name.clone()))?;
            let message = format!("auto: added/updated {} '{}'", file.kind(), file.name());
            let commit_id = project.commit(message);
            Ok(Reply::Saved {
                file,
                project: Some(name),
                commit_id: Some(commit_id),
            })
        }
        _ => Ok(Reply::Saved {
            file,
            project: None,
            commit_id: None,
        }),
    }
}

fn put_blob(
    doc: &mut Document,
    actor: &Actor,
    at: Destination,
    kind: FileKind,
    name: Option<String>,
    blob_id: BlobId,
) -> Result<Reply, WorkspaceError> {
    if let Some(name) = &name {
        validate_name(name)?;
    }
    let mapped = blob_id.clone();
    let reply = put(doc, actor, at, |short_id| {
        let name = name.unwrap_or_else(|| format!("file_{}", short_id));
        FileEntry::blob(kind, short_id.clone(), name, blob_id)
    })?;

    if let Reply::Saved { file, .. } = &reply {
        let user = doc
            .user_mut(&actor.id)
            .ok_or_else(|| WorkspaceError::UserNotFound(actor.id.clone()))?;
        user.file_mappings.insert(file.short_id().clone(), mapped);
    }
    Ok(reply)
}

fn open(
    doc: &Document,
    actor: &Actor,
    at: Destination,
    short_id: ShortId,
) -> Result<Reply, WorkspaceError> {
    let target = target(doc, actor, at)?;
    let file = node_at(doc, &target)?
        .file_by_short_id(&short_id)
        .cloned()
        .ok_or(WorkspaceError::FileNotFound(short_id))?;
    Ok(Reply::Opened { file })
}

/* Projects */

fn init_project(doc: &mut Document, actor: &Actor, name: String) -> Result<Reply, WorkspaceError> {
    validate_name(&name)?;
    if !name.ends_with(PROJECT_SUFFIX) || name.len() == PROJECT_SUFFIX.len() {
        return Err(WorkspaceError::Invalid(format!(
            "project names end in '{}', e.g. MyProject{}",
            PROJECT_SUFFIX, PROJECT_SUFFIX
        )));
    }

    let target = target(doc, actor, Destination::Cwd)?;
    let Target::Folder { path, .. } = &target else {
        return Err(WorkspaceError::Invalid(
            "projects cannot be created inside a project".to_string(),
        ));
    };
    if doc.project(&actor.id, &name).is_some() {
        return Err(WorkspaceError::ProjectExists(name));
    }
    if node_at(doc, &target)?.has_folder(&name) {
        return Err(TreeError::AlreadyExists(name).into());
    }

    let path = path.clone();
    doc.insert_project(&actor.id, &name);
    let user = doc
        .user_mut(&actor.id)
        .ok_or_else(|| WorkspaceError::UserNotFound(actor.id.clone()))?;
    resolve_mut(&mut user.structure, &path)?.insert_folder(&name, Node::project_root(&name))?;

    tracing::info!(owner = %actor.id, project = %name, "initialised project");
    Ok(Reply::ProjectCreated { name })
}
