//! JSON tree documents.
//!
//! `{"label": "D", "value": 3}` is a leaf, `{"label": "B", "children": [...]}`
//! is an internal node.

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeDocument {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeDocument>>,
}

impl TreeDocument {
    pub fn from_json(source: &str) -> DomainResult<Self> {
        serde_json::from_str(source).map_err(|e| DomainError::Parse {
            message: format!("json: {e}"),
        })
    }

    pub fn to_json(&self) -> DomainResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DomainError::Parse {
            message: format!("json: {e}"),
        })
    }

    /// Converts into a `Node`, requiring exactly one of `value`/`children`.
    pub fn into_node(self) -> DomainResult<Node> {
        match (self.value, self.children) {
            (Some(value), None) => Ok(Node::leaf(self.label, value)),
            (None, Some(children)) => {
                let children = children
                    .into_iter()
                    .map(TreeDocument::into_node)
                    .collect::<DomainResult<Vec<_>>>()?;
                Ok(Node::internal(self.label, children))
            }
            (Some(_), Some(_)) => Err(DomainError::invalid_tree(
                self.label,
                "node has both value and children",
            )),
            (None, None) => Err(DomainError::invalid_tree(
                self.label,
                "node needs either value or children",
            )),
        }
    }
}

impl From<&Node> for TreeDocument {
    fn from(node: &Node) -> Self {
        match node.kind() {
            NodeKind::Leaf { value } => Self {
                label: node.label().to_string(),
                value: Some(*value),
                children: None,
            },
            NodeKind::Internal { children } => Self {
                label: node.label().to_string(),
                value: None,
                children: Some(children.iter().map(TreeDocument::from).collect()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parser::sample_tree;

    #[test]
    fn given_json_when_converting_then_builds_tree() {
        let doc = TreeDocument::from_json(
            r#"{"label": "A", "children": [
                {"label": "B", "value": 3},
                {"label": "C", "children": [{"label": "D", "value": -1.5}]}
            ]}"#,
        )
        .unwrap();
        let node = doc.into_node().unwrap();
        assert_eq!(node.size(), 4);
        assert_eq!(node.children()[1].children()[0].value(), Some(-1.5));
    }

    #[test]
    fn given_both_value_and_children_when_converting_then_invalid_tree() {
        let doc = TreeDocument::from_json(r#"{"label": "A", "value": 1, "children": []}"#).unwrap();
        assert!(matches!(
            doc.into_node(),
            Err(DomainError::InvalidTree { label, .. }) if label == "A"
        ));
    }

    #[test]
    fn given_unknown_field_when_parsing_then_parse_error() {
        let result = TreeDocument::from_json(r#"{"label": "A", "score": 1}"#);
        assert!(matches!(result, Err(DomainError::Parse { .. })));
    }

    #[test]
    fn given_node_when_exporting_then_document_keeps_structure() {
        let doc = TreeDocument::from(&sample_tree());
        let json = doc.to_json().unwrap();
        let back = TreeDocument::from_json(&json).unwrap().into_node().unwrap();
        assert_eq!(back.size(), 14);
        assert_eq!(back.leaf_count(), 8);
    }
}
