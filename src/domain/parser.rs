//! Text formats for building trees.
//!
//! The expression format mirrors how trees are usually written by hand:
//!
//! ```text
//! node('A', [
//!   node('B', [ node('D', 3), node('E', 5) ]),
//!   node('C', 4)
//! ])
//! ```
//!
//! A numeric payload makes a leaf, a list makes an internal node and a bare
//! `node('X')` is a leaf with value 0.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, cut, map, opt};
use nom::error::{context, convert_error, ParseError, VerboseError};
use nom::multi::separated_list0;
use nom::number::complete::double;
use nom::sequence::{delimited, preceded, terminated, tuple};
use nom::{Finish, IResult, Parser};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::document::TreeDocument;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::Node;

type Res<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// The canonical 8-leaf sample tree.
pub const DEFAULT_TREE: &str = r#"node('A', [
  node('B', [
    node('D', 3),
    node('E', 5)
  ]),
  node('C', [
    node('F', [
      node('I', [
        node('M', 0),
        node('N', 7)
      ]),
      node('J', 5)
    ]),
    node('G', [
      node('K', 7),
      node('L', 8)
    ]),
    node('H', 4)
  ])
])"#;

/// Builds the same tree as [`DEFAULT_TREE`] without parsing.
pub fn sample_tree() -> Node {
    Node::internal(
        "A",
        vec![
            Node::internal("B", vec![Node::leaf("D", 3.0), Node::leaf("E", 5.0)]),
            Node::internal(
                "C",
                vec![
                    Node::internal(
                        "F",
                        vec![
                            Node::internal("I", vec![Node::leaf("M", 0.0), Node::leaf("N", 7.0)]),
                            Node::leaf("J", 5.0),
                        ],
                    ),
                    Node::internal("G", vec![Node::leaf("K", 7.0), Node::leaf("L", 8.0)]),
                    Node::leaf("H", 4.0),
                ],
            ),
        ],
    )
}

/// Text representation of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeFormat {
    /// Pick by file extension, then by content
    #[default]
    Auto,
    /// `node('A', [...])` expressions
    Expr,
    Json,
}

impl TreeFormat {
    /// Resolves `Auto` using the file extension, if any, then the content.
    pub fn resolve(self, path: Option<&Path>, source: &str) -> TreeFormat {
        if self != TreeFormat::Auto {
            return self;
        }
        let by_ext = path
            .and_then(|p| p.extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match by_ext.as_deref() {
            Some("json") => TreeFormat::Json,
            Some("tree") | Some("abt") | Some("txt") => TreeFormat::Expr,
            _ if source.trim_start().starts_with('{') => TreeFormat::Json,
            _ => TreeFormat::Expr,
        }
    }
}

impl fmt::Display for TreeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeFormat::Auto => write!(f, "auto"),
            TreeFormat::Expr => write!(f, "expr"),
            TreeFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for TreeFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(TreeFormat::Auto),
            "expr" | "tree" => Ok(TreeFormat::Expr),
            "json" => Ok(TreeFormat::Json),
            other => Err(DomainError::UnknownFormat(other.to_string())),
        }
    }
}

/// Parses `source` in the given format. `Auto` is resolved from content.
pub fn parse_tree(source: &str, format: TreeFormat) -> DomainResult<Node> {
    match format.resolve(None, source) {
        TreeFormat::Json => TreeDocument::from_json(source)?.into_node(),
        _ => parse_expr(source),
    }
}

/// Parses the `node(...)` expression format.
#[instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn parse_expr(source: &str) -> DomainResult<Node> {
    match all_consuming(ws(node))(source).finish() {
        Ok((_, node)) => {
            debug!(nodes = node.size(), "parsed tree");
            Ok(node)
        }
        Err(e) => Err(DomainError::Parse {
            message: convert_error(source, e),
        }),
    }
}

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
fn ws<'a, F, O, E: ParseError<&'a str>>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: Parser<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

fn quoted(input: &str) -> Res<&str> {
    alt((
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
    ))(input)
}

enum Payload {
    Value(f64),
    Children(Vec<Node>),
}

fn children(input: &str) -> Res<Vec<Node>> {
    delimited(
        char('['),
        terminated(
            separated_list0(ws(char(',')), ws(node)),
            opt(ws(char(','))),
        ),
        cut(context("closing ']'", ws(char(']')))),
    )(input)
}

fn payload(input: &str) -> Res<Payload> {
    context(
        "value or child list",
        alt((
            map(ws(children), Payload::Children),
            map(ws(double), Payload::Value),
        )),
    )(input)
}

fn node(input: &str) -> Res<Node> {
    map(
        preceded(
            tag("node"),
            cut(delimited(
                context("'(' after node", ws(char('('))),
                tuple((
                    context("quoted label", quoted),
                    opt(preceded(ws(char(',')), payload)),
                )),
                context("closing ')'", ws(char(')'))),
            )),
        ),
        |(label, payload)| match payload {
            Some(Payload::Children(children)) => Node::internal(label, children),
            Some(Payload::Value(value)) => Node::leaf(label, value),
            None => Node::leaf(label, 0.0),
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::NodeKind;
    use rstest::rstest;

    fn shape(node: &Node) -> String {
        match node.kind() {
            NodeKind::Leaf { value } => format!("{}:{}", node.label(), value),
            NodeKind::Internal { children } => format!(
                "{}({})",
                node.label(),
                children.iter().map(shape).collect::<Vec<_>>().join(",")
            ),
        }
    }

    #[test]
    fn given_default_tree_when_parsing_then_matches_sample_tree() {
        let parsed = parse_expr(DEFAULT_TREE).unwrap();
        assert_eq!(shape(&parsed), shape(&sample_tree()));
        assert_eq!(
            shape(&parsed),
            "A(B(D:3,E:5),C(F(I(M:0,N:7),J:5),G(K:7,L:8),H:4))"
        );
    }

    #[rstest]
    #[case("node('X', 2.5)", "X:2.5")]
    #[case("node(\"X\", -3)", "X:-3")]
    #[case("node('X')", "X:0")]
    #[case("node('A', [node('B', 1), node('C', 2),])", "A(B:1,C:2)")]
    #[case("  node ( 'A' , [ node('B', 1e1) ] )  ", "A(B:10)")]
    fn given_expression_when_parsing_then_builds_shape(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(shape(&parse_expr(source).unwrap()), expected);
    }

    #[test]
    fn given_empty_list_when_parsing_then_internal_without_children() {
        let node = parse_expr("node('A', [])").unwrap();
        assert!(!node.is_leaf());
        assert!(node.validate().is_err());
    }

    #[rstest]
    #[case("node('A', [node('B', 1)")]
    #[case("node(A, 1)")]
    #[case("node('A', 1) trailing")]
    #[case("leaf('A', 1)")]
    fn given_malformed_expression_when_parsing_then_parse_error(#[case] source: &str) {
        assert!(matches!(parse_expr(source), Err(DomainError::Parse { .. })));
    }

    #[test]
    fn given_auto_format_when_resolving_then_uses_extension_then_content() {
        assert_eq!(
            TreeFormat::Auto.resolve(Some(Path::new("t.json")), "node('A')"),
            TreeFormat::Json
        );
        assert_eq!(TreeFormat::Auto.resolve(None, "  {\"label\": \"A\"}"), TreeFormat::Json);
        assert_eq!(TreeFormat::Auto.resolve(None, "node('A')"), TreeFormat::Expr);
        assert_eq!(TreeFormat::Expr.resolve(Some(Path::new("t.json")), "{"), TreeFormat::Expr);
    }
}
