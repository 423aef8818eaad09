//! Capabilities the plugin needs from the host document.

use poster_finder_core::error::PosterError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("node {0} cannot hold fills")]
    FillsUnsupported(NodeId),
    #[error("node {0} cannot hold children")]
    ChildrenUnsupported(NodeId),
    #[error("node {0} is locked")]
    Locked(NodeId),
    #[error("image rejected: {0}")]
    ImageRejected(String),
}

impl From<HostError> for PosterError {
    fn from(e: HostError) -> Self {
        PosterError::Host(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Rectangle,
    Frame,
    Ellipse,
    Text,
    Group,
    Line,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "RECTANGLE",
            Self::Frame => "FRAME",
            Self::Ellipse => "ELLIPSE",
            Self::Text => "TEXT",
            Self::Group => "GROUP",
            Self::Line => "LINE",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Snapshot of a node as the host reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    /// Position relative to `parent`.
    pub bounds: Bounds,
    /// `None` while the node is detached.
    pub parent: Option<Parent>,
    /// The node exposes a fill list.
    pub has_fills: bool,
    pub can_have_children: bool,
}

impl NodeInfo {
    pub fn accepts_fills(&self) -> bool {
        matches!(self.kind, NodeKind::Rectangle | NodeKind::Frame) || self.has_fills
    }
}

/// Opaque handle of an image imported into the host's image store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHash(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    Fill,
    Fit,
    Crop,
    Tile,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid { r: f64, g: f64, b: f64 },
    Image { image_hash: ImageHash, scale_mode: ScaleMode },
}

impl Paint {
    /// Image paint scaled to cover the node bounds.
    pub fn image_fill(image_hash: ImageHash) -> Self {
        Self::Image {
            image_hash,
            scale_mode: ScaleMode::Fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Page,
    Node(NodeId),
}

/// Host document operations used by the command handler.
///
/// Calls are synchronous; the host applies each mutation immediately.
pub trait DocumentHost: Send + Sync {
    fn selection(&self) -> Vec<NodeId>;

    fn set_selection(&self, nodes: &[NodeId]);

    fn node(&self, id: NodeId) -> Option<NodeInfo>;

    fn viewport_center(&self) -> Point;

    /// Create a detached rectangle with the given name and bounds.
    fn create_rectangle(&self, name: &str, bounds: Bounds) -> Result<NodeId, HostError>;

    fn append_child(&self, parent: Parent, child: NodeId) -> Result<(), HostError>;

    /// Delete a node and everything below it.
    fn remove_node(&self, node: NodeId) -> Result<(), HostError>;

    /// Import image bytes and return the handle paints refer to.
    fn create_image(&self, bytes: &[u8]) -> Result<ImageHash, HostError>;

    /// Replace the node's entire fill list.
    fn set_fills(&self, node: NodeId, fills: Vec<Paint>) -> Result<(), HostError>;

    /// End the plugin session.
    fn close(&self);
}
