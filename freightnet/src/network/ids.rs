use std::fmt;
use std::str::FromStr;

pub type NodeId = u32;

/// Unordered pair of nodes, always stored with the lowest node first.
///
/// Links and origin-destination pairs are both identified this way, so that
/// `"25-10"` and `"10-25"` refer to the same entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePair {
    a: NodeId,
    b: NodeId,
}

pub type LinkId = NodePair;
pub type OdId = NodePair;

pub const NODE_SEPARATOR: char = '-';

#[derive(Debug, Fail, PartialEq)]
pub enum ParseIdError {
    #[fail(display = "expected two nodes separated by '-', got \"{}\"", _0)]
    Malformed(String),
    #[fail(display = "node \"{}\" is not an integer", _0)]
    Node(String),
}

impl NodePair {
    pub fn new(a: NodeId, b: NodeId) -> NodePair {
        if a <= b {
            NodePair { a, b }
        } else {
            NodePair { a: b, b: a }
        }
    }

    pub fn first(&self) -> NodeId { self.a }
    pub fn second(&self) -> NodeId { self.b }

    pub fn is_loop(&self) -> bool {
        self.a == self.b
    }
}

impl fmt::Display for NodePair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}", self.a, NODE_SEPARATOR, self.b)
    }
}

fn parse_node(s: &str) -> Result<NodeId, ParseIdError> {
    s.trim().parse::<NodeId>().map_err(|_| ParseIdError::Node(s.to_string()))
}

impl FromStr for NodePair {
    type Err = ParseIdError;
    fn from_str(s: &str) -> Result<NodePair, ParseIdError> {
        let mut parts = s.split(NODE_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => Ok(NodePair::new(parse_node(a)?, parse_node(b)?)),
            _ => Err(ParseIdError::Malformed(s.to_string())),
        }
    }
}

/// Rewrites an id so that the lowest numbered node comes first.
pub fn canonicalize(id: &str) -> Result<String, ParseIdError> {
    Ok(id.parse::<NodePair>()?.to_string())
}

/// Splits a path string such as `"10-17-25"` into its nodes.
/// Returns `None` when any part is not an integer node.
pub fn parse_nodes(path: &str) -> Option<Vec<NodeId>> {
    path.split(NODE_SEPARATOR)
        .map(|n| n.trim().parse::<NodeId>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order() {
        assert_eq!(canonicalize("25-10").unwrap(), "10-25");
        assert_eq!(canonicalize("10-25").unwrap(), "10-25");
        assert_eq!("25-10".parse::<NodePair>().unwrap(),
                   "10-25".parse::<NodePair>().unwrap());
    }

    #[test]
    fn numeric_not_lexical() {
        // 9 < 10 even though "9" > "10" as strings
        assert_eq!(canonicalize("10-9").unwrap(), "9-10");
    }

    #[test]
    fn loops_and_errors() {
        assert!("5-5".parse::<NodePair>().unwrap().is_loop());
        assert_eq!(canonicalize("5"), Err(ParseIdError::Malformed("5".to_string())));
        assert_eq!(canonicalize("1-2-3"), Err(ParseIdError::Malformed("1-2-3".to_string())));
        assert_eq!(canonicalize("a-2"), Err(ParseIdError::Node("a".to_string())));
    }

    #[test]
    fn path_nodes() {
        assert_eq!(parse_nodes("10-17-25"), Some(vec![10, 17, 25]));
        assert_eq!(parse_nodes("no path found"), None);
    }
}
