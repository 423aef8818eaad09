//! In-process document used by the stdio bridge and the tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::host::{
    Bounds, DocumentHost, HostError, ImageHash, NodeId, NodeInfo, NodeKind, Paint, Parent, Point,
};

struct StoredNode {
    kind: NodeKind,
    name: String,
    bounds: Bounds,
    fills: Vec<Paint>,
    children: Vec<NodeId>,
    locked: bool,
}

impl StoredNode {
    fn has_fills(&self) -> bool {
        !matches!(self.kind, NodeKind::Group | NodeKind::Line)
    }

    fn can_have_children(&self) -> bool {
        matches!(self.kind, NodeKind::Frame | NodeKind::Group)
    }
}

#[derive(Default)]
struct DocumentState {
    next_id: u64,
    nodes: BTreeMap<NodeId, StoredNode>,
    page_children: Vec<NodeId>,
    selection: Vec<NodeId>,
    viewport_center: Point,
    images: HashMap<ImageHash, usize>,
    closed: bool,
}

impl DocumentState {
    fn insert(&mut self, kind: NodeKind, name: &str, bounds: Bounds) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        let fills = if matches!(kind, NodeKind::Rectangle | NodeKind::Frame) {
            vec![Paint::Solid {
                r: 0.85,
                g: 0.85,
                b: 0.85,
            }]
        } else {
            Vec::new()
        };
        self.nodes.insert(
            id,
            StoredNode {
                kind,
                name: name.to_string(),
                bounds,
                fills,
                children: Vec::new(),
                locked: false,
            },
        );
        id
    }

    fn parent_of(&self, id: NodeId) -> Option<Parent> {
        if self.page_children.contains(&id) {
            return Some(Parent::Page);
        }
        self.nodes
            .iter()
            .find(|(_, node)| node.children.contains(&id))
            .map(|(parent, _)| Parent::Node(*parent))
    }

    fn detach(&mut self, child: NodeId) {
        self.page_children.retain(|c| *c != child);
        for node in self.nodes.values_mut() {
            node.children.retain(|c| *c != child);
        }
    }
}

/// A single-page document held in memory.
#[derive(Default)]
pub struct InMemoryDocument {
    state: Mutex<DocumentState>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport_center(center: Point) -> Self {
        let doc = Self::default();
        doc.lock().viewport_center = center;
        doc
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a node directly to the page.
    pub fn add_node(&self, kind: NodeKind, name: &str, bounds: Bounds) -> NodeId {
        let mut state = self.lock();
        let id = state.insert(kind, name, bounds);
        state.page_children.push(id);
        id
    }

    /// Locked nodes reject fill changes.
    pub fn set_locked(&self, id: NodeId, locked: bool) {
        if let Some(node) = self.lock().nodes.get_mut(&id) {
            node.locked = locked;
        }
    }

    pub fn fills(&self, id: NodeId) -> Option<Vec<Paint>> {
        self.lock().nodes.get(&id).map(|n| n.fills.clone())
    }

    pub fn children(&self, parent: Parent) -> Vec<NodeId> {
        let state = self.lock();
        match parent {
            Parent::Page => state.page_children.clone(),
            Parent::Node(id) => state
                .nodes
                .get(&id)
                .map(|n| n.children.clone())
                .unwrap_or_default(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn image_count(&self) -> usize {
        self.lock().images.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

impl DocumentHost for InMemoryDocument {
    fn selection(&self) -> Vec<NodeId> {
        self.lock().selection.clone()
    }

    fn set_selection(&self, nodes: &[NodeId]) {
        let mut state = self.lock();
        let known: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|id| state.nodes.contains_key(id))
            .collect();
        state.selection = known;
    }

    fn node(&self, id: NodeId) -> Option<NodeInfo> {
        let state = self.lock();
        state.nodes.get(&id).map(|n| NodeInfo {
            id,
            kind: n.kind,
            name: n.name.clone(),
            bounds: n.bounds,
            parent: state.parent_of(id),
            has_fills: n.has_fills(),
            can_have_children: n.can_have_children(),
        })
    }

    fn viewport_center(&self) -> Point {
        self.lock().viewport_center
    }

    fn create_rectangle(&self, name: &str, bounds: Bounds) -> Result<NodeId, HostError> {
        let id = self.lock().insert(NodeKind::Rectangle, name, bounds);
        debug!(node = %id, name = %name, "rectangle created");
        Ok(id)
    }

    fn append_child(&self, parent: Parent, child: NodeId) -> Result<(), HostError> {
        let mut state = self.lock();
        if !state.nodes.contains_key(&child) {
            return Err(HostError::NodeNotFound(child));
        }
        if let Parent::Node(parent_id) = parent {
            let node = state
                .nodes
                .get(&parent_id)
                .ok_or(HostError::NodeNotFound(parent_id))?;
            if !node.can_have_children() {
                return Err(HostError::ChildrenUnsupported(parent_id));
            }
        }

        state.detach(child);
        match parent {
            Parent::Page => state.page_children.push(child),
            Parent::Node(parent_id) => {
                if let Some(node) = state.nodes.get_mut(&parent_id) {
                    node.children.push(child);
                }
            }
        }
        Ok(())
    }

    fn remove_node(&self, node: NodeId) -> Result<(), HostError> {
        let mut state = self.lock();
        if !state.nodes.contains_key(&node) {
            return Err(HostError::NodeNotFound(node));
        }
        state.detach(node);
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(removed) = state.nodes.remove(&id) {
                pending.extend(removed.children);
            }
        }
        let DocumentState { nodes, selection, .. } = &mut *state;
        selection.retain(|id| nodes.contains_key(id));
        debug!(node = %node, "node removed");
        Ok(())
    }

    fn create_image(&self, bytes: &[u8]) -> Result<ImageHash, HostError> {
        if bytes.is_empty() {
            return Err(HostError::ImageRejected("no image data".to_string()));
        }
        let hash = ImageHash(hex::encode(Sha256::digest(bytes)));
        self.lock().images.insert(hash.clone(), bytes.len());
        Ok(hash)
    }

    fn set_fills(&self, id: NodeId, fills: Vec<Paint>) -> Result<(), HostError> {
        let mut state = self.lock();
        let node = state.nodes.get_mut(&id).ok_or(HostError::NodeNotFound(id))?;
        if node.locked {
            return Err(HostError::Locked(id));
        }
        if !node.has_fills() {
            return Err(HostError::FillsUnsupported(id));
        }
        node.fills = fills;
        Ok(())
    }

    fn close(&self) {
        info!("plugin session closed");
        self.lock().closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(w: f64, h: f64) -> Bounds {
        Bounds {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
        }
    }

    #[test]
    fn image_import_is_content_addressed() {
        let doc = InMemoryDocument::new();
        let a = doc.create_image(b"poster").unwrap();
        let b = doc.create_image(b"poster").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 64);
        assert_eq!(doc.image_count(), 1);
        assert!(doc.create_image(&[]).is_err());
    }

    #[test]
    fn locked_and_fill_less_nodes_reject_fills() {
        let doc = InMemoryDocument::new();
        let rect = doc.add_node(NodeKind::Rectangle, "r", bounds(10.0, 10.0));
        let group = doc.add_node(NodeKind::Group, "g", bounds(10.0, 10.0));
        let hash = doc.create_image(b"x").unwrap();

        doc.set_locked(rect, true);
        assert_eq!(
            doc.set_fills(rect, vec![Paint::image_fill(hash.clone())]),
            Err(HostError::Locked(rect))
        );
        assert_eq!(
            doc.set_fills(group, vec![Paint::image_fill(hash)]),
            Err(HostError::FillsUnsupported(group))
        );
    }

    #[test]
    fn append_child_moves_nodes_between_parents() {
        let doc = InMemoryDocument::new();
        let frame = doc.add_node(NodeKind::Frame, "f", bounds(100.0, 100.0));
        let rect = doc.create_rectangle("r", bounds(10.0, 10.0)).unwrap();

        doc.append_child(Parent::Page, rect).unwrap();
        assert_eq!(doc.children(Parent::Page), vec![frame, rect]);

        doc.append_child(Parent::Node(frame), rect).unwrap();
        assert_eq!(doc.children(Parent::Page), vec![frame]);
        assert_eq!(doc.children(Parent::Node(frame)), vec![rect]);

        assert_eq!(
            doc.append_child(Parent::Node(rect), frame),
            Err(HostError::ChildrenUnsupported(rect))
        );
    }

    #[test]
    fn node_reports_its_parent() {
        let doc = InMemoryDocument::new();
        let frame = doc.add_node(NodeKind::Frame, "f", bounds(100.0, 100.0));
        let rect = doc.create_rectangle("r", bounds(10.0, 10.0)).unwrap();
        assert_eq!(doc.node(rect).unwrap().parent, None);

        doc.append_child(Parent::Node(frame), rect).unwrap();
        assert_eq!(doc.node(frame).unwrap().parent, Some(Parent::Page));
        assert_eq!(doc.node(rect).unwrap().parent, Some(Parent::Node(frame)));
    }

    #[test]
    fn remove_node_drops_subtree_and_selection() {
        let doc = InMemoryDocument::new();
        let frame = doc.add_node(NodeKind::Frame, "f", bounds(100.0, 100.0));
        let rect = doc.create_rectangle("r", bounds(10.0, 10.0)).unwrap();
        doc.append_child(Parent::Node(frame), rect).unwrap();
        doc.set_selection(&[rect]);

        doc.remove_node(frame).unwrap();

        assert_eq!(doc.node_count(), 0);
        assert!(doc.children(Parent::Page).is_empty());
        assert!(doc.selection().is_empty());
        assert_eq!(doc.remove_node(frame), Err(HostError::NodeNotFound(frame)));
    }

    #[test]
    fn selection_ignores_unknown_nodes() {
        let doc = InMemoryDocument::new();
        let rect = doc.add_node(NodeKind::Rectangle, "r", bounds(1.0, 1.0));
        doc.set_selection(&[rect, NodeId(999)]);
        assert_eq!(doc.selection(), vec![rect]);
    }
}
