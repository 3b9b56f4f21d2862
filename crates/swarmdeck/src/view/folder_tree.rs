//! Folder picker tree.
//!
//! A small tree of folders with expand/collapse and node selection. It shares
//! the drag arbitration of the table view; only the "is this point on the
//! selection" test differs.

use std::path::{Path, PathBuf};

use slotmap::{SlotMap, new_key_type};
use swarmdeck_core::{Point, Size};
use swarmdeck_core::logging::targets;

use crate::input::{DragPayload, DragSurface, InputPipeline, MouseButton, PointerEvent, PointerKind};

new_key_type! {
    /// Identifier of a folder node.
    pub struct FolderId;
}

#[derive(Debug)]
struct FolderNode {
    path: PathBuf,
    parent: Option<FolderId>,
    children: Vec<FolderId>,
    expanded: bool,
}

/// A tree of folders with a flattened, scrollable row layout.
#[derive(Debug)]
pub struct FolderTree {
    nodes: SlotMap<FolderId, FolderNode>,
    roots: Vec<FolderId>,
    /// Selected nodes in selection order.
    selected: Vec<FolderId>,
    multi_select: bool,
    row_height: f32,
    viewport: Size,
    scroll_y: f32,
}

impl Default for FolderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderTree {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            selected: Vec::new(),
            multi_select: true,
            row_height: 20.0,
            viewport: Size::ZERO,
            scroll_y: 0.0,
        }
    }

    /// Registers the tree's selection handler on `pipeline`.
    pub fn install_listeners(pipeline: &mut InputPipeline<Self>) {
        pipeline.add_input_listener(|tree: &mut Self, event: &mut PointerEvent| {
            tree.handle_selection_press(event);
        });
    }

    pub fn set_multi_select(&mut self, multi: bool) {
        self.multi_select = multi;
        if !multi && self.selected.len() > 1 {
            self.selected.drain(..self.selected.len() - 1);
        }
    }

    pub fn set_row_height(&mut self, height: f32) {
        self.row_height = height.max(1.0);
    }

    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
        self.set_scroll_y(self.scroll_y);
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Scrolls vertically; the last row stops at the bottom of the viewport.
    pub fn set_scroll_y(&mut self, y: f32) {
        let content = self.visible_rows().len() as f32 * self.row_height;
        let visible = self.viewport.height.max(0.0);
        self.scroll_y = y.clamp(0.0, (content - visible).max(0.0));
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub fn add_root(&mut self, path: impl Into<PathBuf>) -> FolderId {
        let id = self.nodes.insert(FolderNode {
            path: path.into(),
            parent: None,
            children: Vec::new(),
            expanded: false,
        });
        self.roots.push(id);
        id
    }

    /// Adds a child folder. Returns `None` if `parent` no longer exists.
    pub fn add_child(&mut self, parent: FolderId, path: impl Into<PathBuf>) -> Option<FolderId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self.nodes.insert(FolderNode {
            path: path.into(),
            parent: Some(parent),
            children: Vec::new(),
            expanded: false,
        });
        self.nodes[parent].children.push(id);
        Some(id)
    }

    /// Removes a folder and everything below it.
    pub fn remove(&mut self, id: FolderId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        match node.parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent) {
                    p.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
        self.selected.retain(|s| self.nodes.contains_key(*s));
        self.set_scroll_y(self.scroll_y);
        true
    }

    pub fn path(&self, id: FolderId) -> Option<&Path> {
        self.nodes.get(id).map(|n| n.path.as_path())
    }

    /// Nesting depth; roots are 0.
    pub fn depth(&self, id: FolderId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes.get(parent).and_then(|n| n.parent);
        }
        depth
    }

    pub fn is_expanded(&self, id: FolderId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.expanded)
    }

    /// Expands or collapses a folder. Selected nodes that become hidden stay
    /// selected but can no longer be hit.
    pub fn set_expanded(&mut self, id: FolderId, expanded: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.expanded = expanded;
        }
        self.set_scroll_y(self.scroll_y);
    }

    /// Nodes in display order: depth-first through expanded folders.
    pub fn visible_rows(&self) -> Vec<FolderId> {
        let mut rows = Vec::new();
        let mut stack: Vec<FolderId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            rows.push(id);
            if node.expanded {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        rows
    }

    /// The visible node under `point`.
    pub fn node_at(&self, point: Point) -> Option<FolderId> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let row = ((point.y + self.scroll_y) / self.row_height).floor() as usize;
        self.visible_rows().get(row).copied()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn is_selected(&self, id: FolderId) -> bool {
        self.selected.contains(&id)
    }

    pub fn select(&mut self, id: FolderId) {
        if self.nodes.contains_key(id) {
            self.selected.clear();
            self.selected.push(id);
        }
    }

    /// Adds or removes `id` in multi-select mode; selects it otherwise.
    pub fn toggle(&mut self, id: FolderId) {
        if !self.multi_select {
            self.select(id);
        } else if let Some(pos) = self.selected.iter().position(|&s| s == id) {
            self.selected.remove(pos);
        } else if self.nodes.contains_key(id) {
            self.selected.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Paths of the selected folders in selection order.
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.selected
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|n| n.path.clone()))
            .collect()
    }

    /// Click and Ctrl+click selection on unconsumed left presses.
    pub fn handle_selection_press(&mut self, event: &mut PointerEvent) {
        if event.kind != PointerKind::Press || event.button != Some(MouseButton::Left) {
            return;
        }
        match self.node_at(event.position) {
            Some(id) if event.modifiers.control => self.toggle(id),
            Some(id) => self.select(id),
            None => self.clear_selection(),
        }
        tracing::trace!(target: targets::VIEW, selected = self.selected.len(), "folder selection changed");
    }
}

impl DragSurface for FolderTree {
    fn is_in_selection(&self, point: Point) -> bool {
        self.node_at(point).is_some_and(|id| self.is_selected(id))
    }

    fn export_payload(&self) -> DragPayload {
        DragPayload::from_paths(self.selected_paths())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DragArbiter, KeyboardModifiers, RecordingRecognizer};

    fn tree() -> (FolderTree, FolderId, FolderId, FolderId) {
        let mut tree = FolderTree::new();
        let home = tree.add_root("/home");
        let music = tree.add_child(home, "/home/music").expect("parent exists");
        let video = tree.add_child(home, "/home/video").expect("parent exists");
        tree.add_root("/srv");
        (tree, home, music, video)
    }

    fn row(n: usize) -> Point {
        Point::new(5.0, n as f32 * 20.0 + 10.0)
    }

    #[test]
    fn test_visible_rows_follow_expansion() {
        let (mut tree, home, music, _) = tree();
        assert_eq!(tree.visible_rows().len(), 2);
        tree.set_expanded(home, true);
        let rows = tree.visible_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], music);
        assert_eq!(tree.depth(music), 1);
        assert_eq!(tree.node_at(row(3)).and_then(|id| tree.path(id)), Some(Path::new("/srv")));
    }

    #[test]
    fn test_scroll_keeps_last_row_in_view() {
        let (mut tree, home, _, _) = tree();
        tree.set_expanded(home, true);
        tree.set_viewport(Size::new(200.0, 50.0));

        tree.set_scroll_y(1000.0);
        assert_eq!(tree.scroll_y(), 30.0);
        assert_eq!(
            tree.node_at(Point::new(5.0, 45.0)).and_then(|id| tree.path(id)),
            Some(Path::new("/srv"))
        );

        tree.set_expanded(home, false);
        assert_eq!(tree.scroll_y(), 0.0);
    }

    #[test]
    fn test_remove_subtree() {
        let (mut tree, home, music, _) = tree();
        tree.select(music);
        assert!(tree.remove(home));
        assert!(tree.path(music).is_none());
        assert!(tree.selected_paths().is_empty());
        assert_eq!(tree.visible_rows().len(), 1);
        assert!(!tree.remove(home));
        assert!(tree.add_child(home, "/x").is_none());
    }

    #[test]
    fn test_click_selection() {
        let (mut tree, home, music, video) = tree();
        tree.set_expanded(home, true);
        let mut press = PointerEvent::press(row(1), KeyboardModifiers::NONE);
        tree.handle_selection_press(&mut press);
        let mut ctrl = PointerEvent::press(row(2), KeyboardModifiers::CTRL);
        tree.handle_selection_press(&mut ctrl);
        assert!(tree.is_selected(music) && tree.is_selected(video));

        tree.set_multi_select(false);
        assert_eq!(tree.selected_paths(), vec![PathBuf::from("/home/video")]);
    }

    #[test]
    fn test_drag_from_tree_keeps_selection() {
        let (mut tree, home, music, video) = tree();
        tree.set_expanded(home, true);
        tree.select(music);
        tree.toggle(video);

        let recorder = RecordingRecognizer::new();
        let mut pipeline = InputPipeline::new(DragArbiter::new(recorder.clone()));
        FolderTree::install_listeners(&mut pipeline);

        pipeline.dispatch(&mut tree, PointerEvent::press(row(1), KeyboardModifiers::NONE));
        pipeline.dispatch(&mut tree, PointerEvent::drag_move(Point::new(5.0, 60.0)));
        assert_eq!(tree.selected_paths().len(), 2);
        assert_eq!(recorder.started()[0].payload.len(), 2);
    }

    #[test]
    fn test_click_on_selected_folder_collapses_selection() {
        let (mut tree, home, music, video) = tree();
        tree.set_expanded(home, true);
        tree.select(music);
        tree.toggle(video);

        let mut pipeline = InputPipeline::new(DragArbiter::new(RecordingRecognizer::new()));
        FolderTree::install_listeners(&mut pipeline);
        pipeline.dispatch(&mut tree, PointerEvent::press(row(2), KeyboardModifiers::NONE));
        assert_eq!(tree.selected_paths().len(), 2);
        pipeline.dispatch(&mut tree, PointerEvent::release(row(2)));
        assert_eq!(tree.selected_paths(), vec![PathBuf::from("/home/video")]);
    }
}
