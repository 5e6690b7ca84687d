//! Membership checks and capability-key sharing.

use crate::document::{Document, SharedFolder, UserId};
use crate::ids::CapabilityKey;
use crate::navigator::{locate, resolve, Location};
use crate::tree::Node;
use crate::versioning::Project;
use crate::workspace::WorkspaceError;

/// `owner`'s project `name`, if `user` is a member of it.
pub(crate) fn project<'a>(
    doc: &'a Document,
    user: &str,
    owner: &str,
    name: &str,
) -> Result<&'a Project, WorkspaceError> {
    let project = doc
        .project(owner, name)
        .ok_or_else(|| WorkspaceError::ProjectNotFound(name.to_string()))?;
    if !project.is_member(user, owner) {
        return Err(WorkspaceError::NotMember(name.to_string()));
    }
    Ok(project)
}

pub(crate) fn project_mut<'a>(
    doc: &'a mut Document,
    user: &str,
    owner: &str,
    name: &str,
) -> Result<&'a mut Project, WorkspaceError> {
    let project = doc
        .project_mut(owner, name)
        .ok_or_else(|| WorkspaceError::ProjectNotFound(name.to_string()))?;
    if !project.is_member(user, owner) {
        return Err(WorkspaceError::NotMember(name.to_string()));
    }
    Ok(project)
}

/// Add the user behind `handle` to `owner`'s project. Only the owner may
///  invite; handles that were never observed do not resolve.
pub(crate) fn invite(
    doc: &mut Document,
    user: &str,
    owner: &str,
    name: &str,
    handle: &str,
) -> Result<UserId, WorkspaceError> {
    if doc.project(owner, name).is_none() {
        return Err(WorkspaceError::ProjectNotFound(name.to_string()));
    }
    if user != owner {
        return Err(WorkspaceError::OwnerOnly("invite collaborators"));
    }

    let invitee = doc
        .lookup_handle(handle)
        .cloned()
        .ok_or_else(|| WorkspaceError::UnknownHandle(handle.to_string()))?;

    let project = project_mut(doc, user, owner, name)?;
    if project.is_member(&invitee, owner) || !project.add_collaborator(invitee.clone()) {
        return Err(WorkspaceError::AlreadyMember(handle.to_string()));
    }
    tracing::info!(project = name, invitee = %invitee, "added collaborator");
    Ok(invitee)
}

/// Publish `owner`'s folder at `path` under a fresh capability key.
pub(crate) fn share(
    doc: &mut Document,
    owner: &str,
    path: Vec<String>,
) -> Result<CapabilityKey, WorkspaceError> {
    let user = doc
        .user(owner)
        .ok_or_else(|| WorkspaceError::UserNotFound(owner.to_string()))?;

    if let Location::Project { project, .. } = locate(&user.structure, &path)? {
        return Err(WorkspaceError::Invalid(format!(
            "cannot share a folder inside project {}",
            project
        )));
    }
    if resolve(&user.structure, &path)?.is_empty() {
        return Err(WorkspaceError::Invalid(
            "the folder is empty, nothing to share".to_string(),
        ));
    }

    let key = doc.insert_share(owner, path);
    tracing::info!(owner, "shared folder");
    Ok(key)
}

/// Live view of a shared folder, optionally descended into `sub_path`.
pub(crate) fn shared_view<'a>(
    doc: &'a Document,
    key: &CapabilityKey,
    sub_path: &[String],
) -> Result<(&'a SharedFolder, &'a Node), WorkspaceError> {
    let shared = doc
        .shared_folder(key)
        .ok_or(WorkspaceError::ShareNotFound)?;
    let owner = doc
        .user(&shared.user_id)
        .ok_or_else(|| WorkspaceError::UserNotFound(shared.user_id.clone()))?;
    let base = resolve(&owner.structure, &shared.path)?;
    let node = resolve(base, sub_path)?;
    Ok((shared, node))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tree::FileEntry;

    fn doc_with_project() -> Document {
        let mut doc = Document::new();
        doc.observe("owner", Some("Owner"));
        doc.observe("guest", Some("Guest"));
        doc.insert_project("owner", "P.git");
        doc
    }

    #[test]
    fn test_membership_gate() {
        let mut doc = doc_with_project();
        assert!(project(&doc, "owner", "owner", "P.git").is_ok());
        let err = project(&doc, "guest", "owner", "P.git").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        invite(&mut doc, "owner", "owner", "P.git", "@GUEST").unwrap();
        assert!(project(&doc, "guest", "owner", "P.git").is_ok());

        let err = project(&doc, "guest", "owner", "Q.git").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_invite_errors() {
        let mut doc = doc_with_project();
        let err = invite(&mut doc, "owner", "owner", "P.git", "stranger").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        invite(&mut doc, "owner", "owner", "P.git", "guest").unwrap();
        let err = invite(&mut doc, "owner", "owner", "P.git", "guest").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let err = invite(&mut doc, "owner", "owner", "P.git", "owner").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        // members cannot delegate
        let err = invite(&mut doc, "guest", "owner", "P.git", "owner").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_share_is_live() {
        let mut doc = Document::new();
        let user = doc.observe("owner", None);
        let docs = user.structure.create_folder("docs").unwrap();
        docs.add_or_replace_file(FileEntry::text(docs.fresh_short_id(), "a", "1"));

        let key = share(&mut doc, "owner", vec!["docs".to_string()]).unwrap();
        assert_eq!(shared_view(&doc, &key, &[]).unwrap().1.files().len(), 1);

        let docs = doc
            .user_mut("owner")
            .unwrap()
            .structure
            .folder_mut("docs")
            .unwrap();
        docs.add_or_replace_file(FileEntry::text(docs.fresh_short_id(), "b", "2"));
        assert_eq!(shared_view(&doc, &key, &[]).unwrap().1.files().len(), 2);
    }

    #[test]
    fn test_share_refuses_empty_and_project_paths() {
        let mut doc = Document::new();
        doc.observe("owner", None)
            .structure
            .create_folder("empty")
            .unwrap();
        let err = share(&mut doc, "owner", vec!["empty".to_string()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        doc.user_mut("owner")
            .unwrap()
            .structure
            .insert_folder("P.git", Node::project_root("P.git"))
            .unwrap();
        let err = share(&mut doc, "owner", vec!["P.git".to_string()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = share(&mut doc, "owner", vec!["missing".to_string()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_unknown_key() {
        let doc = Document::new();
        let err = shared_view(&doc, &CapabilityKey::generate(), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
