//! Arena document tree
//!
//! The engine does not own a live browser DOM; it operates on handles into
//! a host-managed tree. This module provides that tree: an arena keyed by
//! `NodeId`, where removal vacates slots and ids are never reused. A stale
//! handle therefore resolves to nothing, which every consumer treats as a
//! silent no-op — the element was already gone, the goal is satisfied.

use std::collections::HashMap;

/// Opaque handle to an element. Never reused within one tree.
pub type NodeId = u32;

// =============================================================================
// Element Data
// =============================================================================

/// Attributes of interest for classification.
///
/// Geometry is the rendered size as last laid out; `0 x 0` means the
/// element has not been laid out yet.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    /// The `id` attribute, empty if absent.
    pub id_attr: String,
    /// Class tokens.
    pub classes: Vec<String>,
    /// Remaining attributes as name/value pairs.
    pub attrs: Vec<(String, String)>,
    /// Rendered width in px.
    pub width: f32,
    /// Rendered height in px.
    pub height: f32,
}

impl ElementData {
    /// Convenience constructor for a bare element of the given tag.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id_attr = id.to_string();
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes
            .extend(class.split_whitespace().map(|c| c.to_string()));
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Rendered area in px².
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Look up an attribute value by name (case-insensitive name match).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whether the class token list contains `class` exactly.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

// =============================================================================
// Mutation Batches
// =============================================================================

/// One tree-mutation record: the element nodes inserted by a single edit.
#[derive(Debug, Clone, Default)]
pub struct MutationRecord {
    pub added: Vec<NodeId>,
}

/// A batch of mutation records, as delivered by the host's tree observer.
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    pub records: Vec<MutationRecord>,
}

impl MutationBatch {
    /// Batch containing a single record with the given added nodes.
    pub fn of(added: Vec<NodeId>) -> Self {
        Self {
            records: vec![MutationRecord { added }],
        }
    }
}

// =============================================================================
// Document Tree
// =============================================================================

struct Slot {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: ElementData,
}

/// Arena-backed document tree.
///
/// The root element is created at construction and cannot be removed.
pub struct DomTree {
    slots: HashMap<NodeId, Slot>,
    next_id: NodeId,
    root: NodeId,
    origin_host: String,
}

impl DomTree {
    pub fn new(origin_host: &str) -> Self {
        let mut slots = HashMap::new();
        slots.insert(
            0,
            Slot {
                parent: None,
                children: Vec::new(),
                data: ElementData::new("html"),
            },
        );
        Self {
            slots,
            next_id: 1,
            root: 0,
            origin_host: origin_host.to_string(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn origin_host(&self) -> &str {
        &self.origin_host
    }

    /// Number of attached elements, root included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Insert a new element under `parent`. Returns `None` if the parent is
    /// stale.
    pub fn insert(&mut self, parent: NodeId, data: ElementData) -> Option<NodeId> {
        if !self.slots.contains_key(&parent) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.slots.insert(
            id,
            Slot {
                parent: Some(parent),
                children: Vec::new(),
                data,
            },
        );
        if let Some(p) = self.slots.get_mut(&parent) {
            p.children.push(id);
        }
        Some(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&ElementData> {
        self.slots.get(&id).map(|s| &s.data)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.slots.get_mut(&id).map(|s| &mut s.data)
    }

    #[inline]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(&id).and_then(|s| s.parent)
    }

    /// Children of `id`, empty for stale handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots.get(&id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// Ancestors of `id`, nearest first. Does not include `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Preorder traversal of the subtree below `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        if let Some(slot) = self.slots.get(&id) {
            stack.extend(slot.children.iter().rev().copied());
        }
        Descendants { tree: self, stack }
    }

    /// Detach the subtree rooted at `id`, vacating every slot in it.
    ///
    /// Idempotent: stale handles and the root return `false` and nothing
    /// changes.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.slots.contains_key(&id) {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(p) = self.slots.get_mut(&parent) {
                p.children.retain(|&c| c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(slot) = self.slots.remove(&cur) {
                stack.extend(slot.children);
            }
        }
        true
    }
}

/// Iterator over ancestors, nearest first.
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.parent(cur);
        Some(cur)
    }
}

/// Preorder iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.stack.pop()?;
        if let Some(slot) = self.tree.slots.get(&cur) {
            self.stack.extend(slot.children.iter().rev().copied());
        }
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_chain() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new("example.com");
        let a = tree.insert(tree.root(), ElementData::new("div")).unwrap();
        let b = tree.insert(a, ElementData::new("section")).unwrap();
        let c = tree.insert(b, ElementData::new("ins")).unwrap();
        (tree, a, b, c)
    }

    #[test]
    fn test_insert_and_lookup() {
        let (tree, a, _, c) = tree_with_chain();
        assert_eq!(tree.get(a).unwrap().tag, "div");
        assert_eq!(tree.get(c).unwrap().tag, "ins");
        assert_eq!(tree.parent(a), Some(tree.root()));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = DomTree::new("example.com");
        let a = tree.insert(tree.root(), ElementData::new("div")).unwrap();
        let a1 = tree.insert(a, ElementData::new("span")).unwrap();
        let a2 = tree.insert(a, ElementData::new("p")).unwrap();
        let a1x = tree.insert(a1, ElementData::new("b")).unwrap();
        let order: Vec<NodeId> = tree.descendants(a).collect();
        assert_eq!(order, vec![a1, a1x, a2]);
    }

    #[test]
    fn test_remove_vacates_subtree() {
        let (mut tree, a, b, c) = tree_with_chain();
        assert!(tree.remove(a));
        assert!(!tree.is_attached(a));
        assert!(!tree.is_attached(b));
        assert!(!tree.is_attached(c));
        assert_eq!(tree.len(), 1);
        // Stale handles are a no-op, not an error.
        assert!(!tree.remove(a));
        assert!(!tree.remove(c));
    }

    #[test]
    fn test_root_is_not_removable() {
        let mut tree = DomTree::new("example.com");
        assert!(!tree.remove(tree.root()));
        assert!(tree.is_attached(tree.root()));
    }

    #[test]
    fn test_insert_under_stale_parent() {
        let (mut tree, a, _, _) = tree_with_chain();
        tree.remove(a);
        assert!(tree.insert(a, ElementData::new("div")).is_none());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let (tree, a, b, c) = tree_with_chain();
        let anc: Vec<NodeId> = tree.ancestors(c).collect();
        assert_eq!(anc, vec![b, a, tree.root()]);
    }

    #[test]
    fn test_element_data_accessors() {
        let el = ElementData::new("iframe")
            .with_class("ad-slot wide")
            .with_attr("src", "https://ads.example.net/frame")
            .with_size(300.0, 250.0);
        assert!(el.has_class("ad-slot"));
        assert!(!el.has_class("ad"));
        assert_eq!(el.attr("SRC"), Some("https://ads.example.net/frame"));
        assert_eq!(el.area(), 75_000.0);
    }
}
