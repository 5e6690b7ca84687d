use std::sync::Arc;

use crate::tree::Node;

/// Source-wins union of `source` into `target`.
///
/// Files: a source file replaces the target file of the same name in its
///  current position; files only in the target stay; files only in the
///  source are appended in source order.
/// Folders: shared names are merged recursively, folders only in the
///  source are attached to the target.
///
/// This is not a three-way merge. Nothing is ever deleted from the target
///  and there is no conflict detection.
pub fn merge_structures(target: &mut Node, source: &Node) {
    for file in source.files() {
        target.add_or_replace_file(file.clone());
    }

    for (name, source_folder) in source.folders() {
        let slots = target.folder_slots_mut();
        match slots.get_mut(name) {
            Some(slot) => merge_structures(Arc::make_mut(slot), source_folder),
            None => {
                slots.insert(name.to_string(), Arc::new(source_folder.clone()));
            }
        }
    }
}
