use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::document::UserId;
use crate::tree::Node;

use super::merge::merge_structures;

pub const DEFAULT_BRANCH: &str = "master";

/// An immutable snapshot of a branch's working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    commit_id: u64,
    message: String,
    structure: Arc<Node>,
}

impl Commit {
    pub fn id(&self) -> u64 {
        self.commit_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> &Node {
        &self.structure
    }
}

/// A named live working tree plus its linear history.
///
/// Commit ids are `1..=len` and always match their position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default)]
    commits: Vec<Commit>,
    #[serde(default)]
    structure: Arc<Node>,
}

impl Branch {
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn commit(&self, id: u64) -> Option<&Commit> {
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        self.commits.get(idx)
    }

    /// The live working tree.
    pub fn structure(&self) -> &Node {
        &self.structure
    }

    /// The live working tree, un-shared from any commit still holding it.
    pub fn structure_mut(&mut self) -> &mut Node {
        Arc::make_mut(&mut self.structure)
    }

    fn renumber(&mut self) {
        for (idx, commit) in self.commits.iter_mut().enumerate() {
            commit.commit_id = idx as u64 + 1;
        }
    }
}

/**
 * Projects
 * ========
 * A project is a set of branches and a pointer to the current one.
 *  The only transitions are pointer swaps (switch, create) and growth
 *  or truncation of a branch's commit list (commit, rollback, merge).
 * Every branch owns its full history: creating a branch clones the
 *  current branch's commits and working tree outright. There is no
 *  shared commit graph.
 * Operations report outcome as `bool` / ids rather than errors; the
 *  caller already knows which input it handed in and attributes the
 *  cause itself.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProject")]
pub struct Project {
    branches: IndexMap<String, Branch>,
    current_branch: String,
    collaborators: IndexSet<UserId>,
}

/// Wire shape with every field optional. Converting into [`Project`]
///  restores the invariant that `current_branch` names an existing branch.
#[derive(Deserialize)]
struct RawProject {
    #[serde(default)]
    branches: IndexMap<String, Branch>,
    #[serde(default = "default_branch")]
    current_branch: String,
    #[serde(default)]
    collaborators: IndexSet<UserId>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl From<RawProject> for Project {
    fn from(raw: RawProject) -> Self {
        let mut branches = raw.branches;
        if !branches.contains_key(&raw.current_branch) {
            branches.insert(raw.current_branch.clone(), Branch::default());
        }
        let mut project = Project {
            branches,
            current_branch: raw.current_branch,
            collaborators: raw.collaborators,
        };
        // older documents may carry gaps; ids follow position
        for branch in project.branches.values_mut() {
            branch.renumber();
        }
        project
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// A fresh project: one empty `master` branch, no commits.
    pub fn new() -> Self {
        Project {
            branches: IndexMap::from([(DEFAULT_BRANCH.to_string(), Branch::default())]),
            current_branch: DEFAULT_BRANCH.to_string(),
            collaborators: IndexSet::new(),
        }
    }

    pub fn current_branch_name(&self) -> &str {
        &self.current_branch
    }

    pub fn current(&self) -> &Branch {
        // current_branch is a key of branches by construction
        &self.branches[self.current_branch.as_str()]
    }

    pub fn current_mut(&mut self) -> &mut Branch {
        let name = self.current_branch.as_str();
        &mut self.branches[name]
    }

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    /// Branch names in creation order.
    pub fn branch_names(&self) -> impl Iterator<Item = &str> {
        self.branches.keys().map(String::as_str)
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Working tree of the current branch.
    pub fn working_tree(&self) -> &Node {
        self.current().structure()
    }

    pub fn working_tree_mut(&mut self) -> &mut Node {
        self.current_mut().structure_mut()
    }

    /* Versioning */

    /// Snapshot the current working tree. The id is `len + 1`; a commit
    ///  with no changes since the last one is still recorded.
    pub fn commit(&mut self, message: impl Into<String>) -> u64 {
        let branch = self.current_mut();
        let commit_id = branch.commits.len() as u64 + 1;
        let commit = Commit {
            commit_id,
            message: message.into(),
            structure: Arc::clone(&branch.structure),
        };
        branch.commits.push(commit);
        tracing::debug!(commit_id, branch = %self.current_branch, "created commit");
        commit_id
    }

    /// Fork the current branch into `name` and switch to it.
    ///
    /// Returns false, leaving everything untouched, if `name` exists.
    pub fn create_branch(&mut self, name: &str) -> bool {
        if self.branches.contains_key(name) {
            return false;
        }
        let fork = self.current().clone();
        self.branches.insert(name.to_string(), fork);
        self.current_branch = name.to_string();
        true
    }

    /// Point the project at another existing branch.
    pub fn switch_branch(&mut self, name: &str) -> bool {
        if !self.branches.contains_key(name) {
            return false;
        }
        self.current_branch = name.to_string();
        true
    }

    /// Reset the current branch to commit `commit_id`, dropping every
    ///  later commit. Returns false, leaving everything untouched, if the
    ///  id is outside `1..=len`.
    pub fn rollback(&mut self, commit_id: u64) -> bool {
        let branch = self.current_mut();
        let Some(snapshot) = branch.commit(commit_id).map(|c| Arc::clone(&c.structure)) else {
            return false;
        };
        // nothing fallible past this point
        branch.commits.truncate(commit_id as usize);
        branch.structure = snapshot;
        true
    }

    /// Fold `source` into `target`.
    ///
    /// Commits of `source` past the length of `target`'s history are
    ///  appended, on the assumption that the source history extends the
    ///  target's. Divergent histories are not detected. The working trees
    ///  are merged with [`merge_structures`], source winning on file names.
    ///  Only `target` is modified. Returns false if either branch is absent.
    pub fn merge(&mut self, source: &str, target: &str) -> bool {
        let Some(source) = self.branches.get(source).cloned() else {
            return false;
        };
        let Some(target) = self.branches.get_mut(target) else {
            return false;
        };

        let known = target.commits.len();
        if source.commits.len() > known {
            target
                .commits
                .extend(source.commits[known..].iter().cloned());
        }
        merge_structures(target.structure_mut(), source.structure());
        true
    }

    /* Membership */

    pub fn collaborators(&self) -> impl Iterator<Item = &UserId> {
        self.collaborators.iter()
    }

    /// Owner or collaborator.
    pub fn is_member(&self, user: &str, owner: &str) -> bool {
        user == owner || self.collaborators.contains(user)
    }

    /// Returns false if `user` was already a collaborator.
    pub fn add_collaborator(&mut self, user: UserId) -> bool {
        self.collaborators.insert(user)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::navigator::resolve;
    use crate::tree::FileEntry;

    fn add_text(project: &mut Project, name: &str, body: &str) {
        let tree = project.working_tree_mut();
        let entry = FileEntry::text(tree.fresh_short_id(), name, body);
        tree.add_or_replace_file(entry);
    }

    #[test]
    fn test_new_project() {
        let project = Project::new();
        assert_eq!(project.current_branch_name(), "master");
        assert_eq!(project.branch_names().collect::<Vec<_>>(), vec!["master"]);
        assert!(project.current().commits().is_empty());
        assert!(project.working_tree().is_empty());
    }

    #[test]
    fn test_commit_ids_follow_length() {
        let mut project = Project::new();
        add_text(&mut project, "f", "hi");
        assert_eq!(project.commit("m1"), 1);
        assert_eq!(project.commit("m2"), 2);

        let commits = project.current().commits();
        assert_eq!(commits[0].structure(), commits[1].structure());
        assert!(commits[0].structure().file("f").is_some());
    }

    #[test]
    fn test_commit_snapshot_is_frozen() {
        let mut project = Project::new();
        project.working_tree_mut().create_folder("src").unwrap();
        project.commit("m1");

        add_text(&mut project, "late", "x");
        project
            .working_tree_mut()
            .folder_mut("src")
            .unwrap()
            .create_folder("deep")
            .unwrap();

        let snapshot = project.current().commit(1).unwrap().structure();
        assert!(snapshot.file("late").is_none());
        assert!(resolve(snapshot, &["src", "deep"]).is_err());
    }

    #[test]
    fn test_create_branch_existing_is_noop() {
        let mut project = Project::new();
        project.commit("m1");
        let before = serde_json::to_string(&project).unwrap();
        assert!(!project.create_branch("master"));
        assert_eq!(serde_json::to_string(&project).unwrap(), before);
    }

    #[test]
    fn test_branch_isolation() {
        let mut project = Project::new();
        add_text(&mut project, "f", "hi");
        project.commit("m1");

        assert!(project.create_branch("dev"));
        assert_eq!(project.current_branch_name(), "dev");
        assert_eq!(project.current().commits().len(), 1);
        add_text(&mut project, "g", "dev only");

        let master = project.branch("master").unwrap();
        assert!(master.structure().file("g").is_none());
        assert!(project.working_tree().file("g").is_some());
    }

    #[test]
    fn test_switch_branch() {
        let mut project = Project::new();
        assert!(!project.switch_branch("nope"));
        project.create_branch("dev");
        assert!(project.switch_branch("master"));
        assert_eq!(project.current_branch_name(), "master");
    }

    #[test]
    fn test_rollback() {
        let mut project = Project::new();
        add_text(&mut project, "a", "1");
        project.commit("m1");
        add_text(&mut project, "b", "2");
        project.commit("m2");

        assert!(project.rollback(1));
        assert_eq!(project.current().commits().len(), 1);
        assert_eq!(project.working_tree(), project.current().commit(1).unwrap().structure());
        assert!(project.working_tree().file("b").is_none());

        assert_eq!(project.commit("m3"), 2);
    }

    #[test]
    fn test_rollback_out_of_range_changes_nothing() {
        let mut project = Project::new();
        add_text(&mut project, "a", "1");
        project.commit("m1");
        add_text(&mut project, "dirty", "uncommitted");
        let before = project.clone();

        assert!(!project.rollback(0));
        assert!(!project.rollback(2));
        assert!(!project.rollback(u64::MAX));
        assert_eq!(project, before);
    }

    #[test]
    fn test_commit_then_rollback_is_identity() {
        let mut project = Project::new();
        add_text(&mut project, "a", "1");
        project.working_tree_mut().create_folder("d").unwrap();
        let tree = project.working_tree().clone();
        let id = project.commit("snap");
        assert!(project.rollback(id));
        assert_eq!(project.working_tree(), &tree);
    }

    #[test]
    fn test_merge_appends_and_unions() {
        let mut project = Project::new();
        add_text(&mut project, "base", "0");
        project.commit("m1");
        project.create_branch("dev");
        add_text(&mut project, "feature", "1");
        project.commit("m2");
        project.switch_branch("master");
        add_text(&mut project, "hotfix", "2");

        assert!(project.merge("dev", "master"));
        let master = project.branch("master").unwrap();
        assert_eq!(master.commits().len(), 2);
        assert_eq!(master.commits()[1].message(), "m2");
        assert!(master.structure().file("feature").is_some());
        assert!(master.structure().file("hotfix").is_some());

        // source untouched
        let dev = project.branch("dev").unwrap();
        assert!(dev.structure().file("hotfix").is_none());

        let once = project.clone();
        assert!(project.merge("dev", "master"));
        assert_eq!(project, once);
    }

    #[test]
    fn test_merge_missing_branch() {
        let mut project = Project::new();
        let before = project.clone();
        assert!(!project.merge("ghost", "master"));
        assert!(!project.merge("master", "ghost"));
        assert_eq!(project, before);
    }

    #[test]
    fn test_membership() {
        let mut project = Project::new();
        assert!(project.is_member("owner", "owner"));
        assert!(!project.is_member("guest", "owner"));
        assert!(project.add_collaborator("guest".to_string()));
        assert!(!project.add_collaborator("guest".to_string()));
        assert!(project.is_member("guest", "owner"));
    }

    #[test]
    fn test_decode_fills_defaults() {
        let project: Project = serde_json::from_str(
            r#"{"branches": {"master": {"commits": []}}}"#,
        )
        .unwrap();
        assert_eq!(project.current_branch_name(), "master");
        assert!(project.working_tree().is_empty());
        assert_eq!(project.collaborators().count(), 0);

        let project: Project = serde_json::from_str(r#"{"current_branch": "dev"}"#).unwrap();
        assert!(project.has_branch("dev"));
    }
}
