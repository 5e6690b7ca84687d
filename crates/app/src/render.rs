//! Plain-text rendering of workspace replies.

use std::fmt::Write;

use common::tree::{FileEntry, FileKind, ListItem, Page};
use common::workspace::{ListingContext, Reply};

pub const FOLDER_ICON: &str = "📂";
pub const PROJECT_ICON: &str = "🔧";

pub fn kind_icon(kind: &FileKind) -> &'static str {
    match kind {
        FileKind::Text => "📝",
        FileKind::Document => "📄",
        FileKind::Photo => "🖼️",
        FileKind::Video => "🎬",
        FileKind::Audio => "🎵",
        FileKind::Code => "💻",
        FileKind::Dataset => "📊",
        FileKind::Other(_) => "📁",
    }
}

fn display_path(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}

fn context_line(context: &ListingContext) -> String {
    match context {
        ListingContext::Folder { path } => display_path(path),
        ListingContext::Project {
            owner,
            project,
            branch,
            path,
        } => format!(
            "{} {} [{}] (owner {}) {}",
            PROJECT_ICON,
            project,
            branch,
            owner,
            display_path(path)
        ),
        ListingContext::Shared { key, path } => format!("shared {} {}", key, display_path(path)),
    }
}

fn item_line(item: &ListItem) -> String {
    match item {
        ListItem::Folder {
            name,
            project: true,
        } => format!("{} {}", PROJECT_ICON, name),
        ListItem::Folder { name, .. } => format!("{} {}", FOLDER_ICON, name),
        ListItem::File {
            short_id,
            name,
            kind,
        } => format!("{} {}  ({})", kind_icon(kind), name, short_id),
    }
}

pub fn render_page(context: &ListingContext, page: &Page) -> String {
    let mut out = context_line(context);
    if page.items.is_empty() {
        out.push_str("\n(empty)");
        return out;
    }
    for item in &page.items {
        out.push('\n');
        out.push_str(&item_line(item));
    }
    if page.total_pages > 1 {
        let _ = write!(out, "\npage {}/{}", page.page + 1, page.total_pages);
        if page.has_prev() {
            let _ = write!(out, "  prev: --page {}", page.page);
        }
        if page.has_next() {
            let _ = write!(out, "  next: --page {}", page.page + 2);
        }
    }
    if page.has_files {
        out.push_str("\nopen a file with: burrow cat <id>");
    }
    out
}

pub fn file_line(file: &FileEntry) -> String {
    format!("{} {} ({})", kind_icon(file.kind()), file.name(), file.short_id())
}

pub fn render(reply: &Reply) -> String {
    match reply {
        Reply::FolderCreated { name } => format!("{} created {}", FOLDER_ICON, name),
        Reply::Moved {
            path,
            project: Some(project),
        } => format!("now in {} (project {})", display_path(path), project),
        Reply::Moved { path, project: None } => format!("now in {}", display_path(path)),
        Reply::Up { left: Some(left) } => format!("left {}", left),
        Reply::Up { left: None } => "already at the root".to_string(),
        Reply::Listing { context, page } => render_page(context, page),
        Reply::Saved {
            file,
            project,
            commit_id,
        } => {
            let mut out = format!("saved {}", file_line(file));
            if let (Some(project), Some(commit_id)) = (project, commit_id) {
                let _ = write!(out, "\ncommitted to {} as #{}", project, commit_id);
            }
            out
        }
        Reply::Opened { file } => match file.inline() {
            Some(text) => text.to_string(),
            None => file_line(file),
        },
        Reply::OpenedAll { files } if files.is_empty() => "no files in this folder".to_string(),
        Reply::OpenedAll { files } => files
            .iter()
            .map(file_line)
            .collect::<Vec<_>>()
            .join("\n"),
        Reply::Shared { key } => format!("share key: {}", key),
        Reply::ProjectCreated { name } => format!("{} created project {}", PROJECT_ICON, name),
        Reply::Committed { project, commit_id } => {
            format!("committed to {} as #{}", project, commit_id)
        }
        Reply::BranchCreated { project, branch } => {
            format!("created branch {} in {} and switched to it", branch, project)
        }
        Reply::SwitchedBranch { project, branch } => {
            format!("switched {} to branch {}", project, branch)
        }
        Reply::Branches {
            project,
            current,
            names,
        } => {
            let mut out = format!("branches of {}", project);
            for name in names {
                let marker = if name == current { "*" } else { " " };
                let _ = write!(out, "\n{} {}", marker, name);
            }
            out
        }
        Reply::Log {
            project,
            branch,
            entries,
        } => {
            let mut out = format!("{} [{}]", project, branch);
            if entries.is_empty() {
                out.push_str("\n(no commits)");
            }
            for entry in entries {
                let _ = write!(out, "\n#{} {}", entry.commit_id, entry.message);
            }
            out
        }
        Reply::RolledBack { project, commit_id } => {
            format!("rolled {} back to #{}", project, commit_id)
        }
        Reply::Merged {
            project,
            source,
            target,
        } => format!("merged {} into {} in {}", source, target, project),
        Reply::Invited {
            project,
            user_id,
            handle,
        } => format!("invited {} ({}) to {}", handle, user_id, project),
    }
}
