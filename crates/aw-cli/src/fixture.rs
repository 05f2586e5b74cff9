//! JSON document fixtures
//!
//! The CLI exercises the engine against serialized document trees instead
//! of a live browser DOM. A fixture is the origin host plus a tree of
//! element specs with the attributes the classifier reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use aw_core::dom::{DomTree, ElementData, NodeId};

/// One element in a fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub tag: String,
    pub id: String,
    /// Space-separated class list, as in markup.
    pub class: String,
    pub attrs: BTreeMap<String, String>,
    pub width: f32,
    pub height: f32,
    pub children: Vec<NodeSpec>,
}

/// A whole document fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFixture {
    pub origin: String,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    fn element_data(&self) -> ElementData {
        let mut el = ElementData::new(if self.tag.is_empty() { "div" } else { &self.tag })
            .with_id(&self.id)
            .with_size(self.width, self.height);
        el.classes = self.class.split_whitespace().map(|c| c.to_string()).collect();
        el.attrs = self
            .attrs
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        el
    }
}

/// Build the arena tree. Returns the tree and the ids of the fixture's
/// top-level elements, which the CLI feeds to the engine as the initial
/// mutation batch.
pub fn build_tree(fixture: &DocumentFixture) -> (DomTree, Vec<NodeId>) {
    let origin = if fixture.origin.is_empty() {
        "localhost"
    } else {
        &fixture.origin
    };
    let mut tree = DomTree::new(origin);
    let root = tree.root();
    let mut top_level = Vec::new();
    for spec in &fixture.children {
        if let Some(id) = insert_spec(&mut tree, root, spec) {
            top_level.push(id);
        }
    }
    (tree, top_level)
}

fn insert_spec(tree: &mut DomTree, parent: NodeId, spec: &NodeSpec) -> Option<NodeId> {
    let id = tree.insert(parent, spec.element_data())?;
    for child in &spec.children {
        insert_spec(tree, id, child);
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_round_trip() {
        let json = r#"{
            "origin": "news.example",
            "children": [
                {
                    "tag": "div",
                    "class": "content",
                    "children": [
                        { "tag": "ins", "class": "adsbygoogle", "width": 728, "height": 90 }
                    ]
                }
            ]
        }"#;
        let fixture: DocumentFixture = serde_json::from_str(json).unwrap();
        let (tree, top_level) = build_tree(&fixture);
        assert_eq!(tree.origin_host(), "news.example");
        assert_eq!(top_level.len(), 1);
        assert_eq!(tree.len(), 3);

        let ins = tree.children(top_level[0])[0];
        let el = tree.get(ins).unwrap();
        assert!(el.has_class("adsbygoogle"));
        assert_eq!(el.area(), 728.0 * 90.0);
    }

    #[test]
    fn test_defaults_fill_in() {
        let fixture: DocumentFixture = serde_json::from_str(r#"{"children":[{}]}"#).unwrap();
        let (tree, top_level) = build_tree(&fixture);
        assert_eq!(tree.origin_host(), "localhost");
        assert_eq!(tree.get(top_level[0]).unwrap().tag, "div");
    }
}
