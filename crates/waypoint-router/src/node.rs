//! Radix tree node implementation.
//!
//! Each node represents one path segment. Static children are kept sorted
//! for binary search; a node has at most one parameter child and one
//! wildcard child.

use http::Method;

use crate::methods::MethodTable;
use crate::params::Params;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal segment (`users`).
    Static,
    /// Named parameter (`{id}`).
    Param(String),
    /// Catch-all for the rest of the path (`*path` or `{path...}`).
    Wildcard(String),
}

impl SegmentKind {
    /// Classifies a single pattern segment.
    #[must_use]
    pub fn parse(segment: &str) -> Self {
        if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            match inner.strip_suffix("...") {
                Some(name) => Self::Wildcard(name.to_string()),
                None => Self::Param(inner.to_string()),
            }
        } else if let Some(name) = segment.strip_prefix('*') {
            Self::Wildcard(name.to_string())
        } else {
            Self::Static
        }
    }
}

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node {
    segment: String,
    kind: SegmentKind,
    methods: Option<MethodTable>,
    static_children: Vec<Node>,
    param_child: Option<Box<Node>>,
    wildcard_child: Option<Box<Node>>,
}

impl Node {
    fn new(segment: &str, kind: SegmentKind) -> Self {
        Self {
            segment: segment.to_string(),
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new("", SegmentKind::Static)
    }

    /// The pattern segment this node was built from.
    #[must_use]
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// The kind of segment.
    #[must_use]
    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    /// Binds `method` on `path` to `key`, returning the key it replaced.
    ///
    /// A wildcard segment swallows the rest of the pattern.
    pub fn insert(&mut self, path: &str, method: Method, key: &str) -> Option<String> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let names = parameter_names(&segments);
        self.insert_segments(&segments, method, key, names)
    }

    fn insert_segments(&mut self, segments: &[&str], method: Method, key: &str, names: Vec<String>) -> Option<String> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.get_or_insert_with(MethodTable::new).bind(method, key, names);
        };

        match SegmentKind::parse(segment) {
            SegmentKind::Static => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children
                            .insert(index, Node::new(segment, SegmentKind::Static));
                        index
                    }
                };
                self.static_children[index].insert_segments(remaining, method, key, names)
            }
            kind @ SegmentKind::Param(_) => self
                .param_child
                .get_or_insert_with(|| Box::new(Node::new(segment, kind)))
                .insert_segments(remaining, method, key, names),
            kind @ SegmentKind::Wildcard(_) => self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Node::new(segment, kind)))
                .methods
                .get_or_insert_with(MethodTable::new)
                .bind(method, key, names),
        }
    }

    /// Matches a concrete path against the tree.
    ///
    /// Priority per segment is static, then parameter, then wildcard. The
    /// returned parameters carry the names of the first pattern that created
    /// each node; [`MethodTable::names`] has the names of every binding.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodTable, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments<'a>(&'a self, segments: &[&str], params: &mut Params) -> Option<&'a MethodTable> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, params) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.clone(), *segment);
                if let Some(found) = child.match_segments(remaining, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let SegmentKind::Wildcard(name) = &child.kind {
                params.push(name.clone(), segments.join("/"));
                return child.methods.as_ref();
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

/// Parameter and wildcard names of a pattern, in path order.
fn parameter_names(segments: &[&str]) -> Vec<String> {
    let mut names = Vec::new();
    for segment in segments {
        match SegmentKind::parse(segment) {
            SegmentKind::Static => {}
            SegmentKind::Param(name) => names.push(name),
            SegmentKind::Wildcard(name) => {
                names.push(name);
                break;
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_kinds() {
        assert_eq!(SegmentKind::parse("users"), SegmentKind::Static);
        assert_eq!(SegmentKind::parse("{id}"), SegmentKind::Param("id".to_string()));
        assert_eq!(
            SegmentKind::parse("{rest...}"),
            SegmentKind::Wildcard("rest".to_string())
        );
        assert_eq!(
            SegmentKind::parse("*path"),
            SegmentKind::Wildcard("path".to_string())
        );
    }

    #[test]
    fn test_insert_and_match_static() {
        let mut root = Node::root();
        root.insert("/users", Method::GET, "GET /users");

        let (methods, params) = root.match_path("/users").unwrap();
        assert_eq!(methods.get(&Method::GET), Some("GET /users"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_insert_returns_replaced_key() {
        let mut root = Node::root();
        assert_eq!(root.insert("/a/{id}", Method::GET, "one"), None);
        assert_eq!(
            root.insert("/a/{id}", Method::GET, "two"),
            Some("one".to_string())
        );
    }

    #[test]
    fn test_match_param() {
        let mut root = Node::root();
        root.insert("/hello/{place}", Method::GET, "GET /hello/{place}");

        let (_, params) = root.match_path("/hello/world").unwrap();
        assert_eq!(params.get("place"), Some("world"));
    }

    #[test]
    fn test_match_wildcard() {
        let mut root = Node::root();
        root.insert("/files/{path...}", Method::GET, "files");

        let (methods, params) = root.match_path("/files/images/logo.png").unwrap();
        assert_eq!(methods.get(&Method::GET), Some("files"));
        assert_eq!(params.get("path"), Some("images/logo.png"));
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        root.insert("/users/me", Method::GET, "me");
        root.insert("/users/{id}", Method::GET, "user");

        let (methods, _) = root.match_path("/users/me").unwrap();
        assert_eq!(methods.get(&Method::GET), Some("me"));

        let (methods, params) = root.match_path("/users/7").unwrap();
        assert_eq!(methods.get(&Method::GET), Some("user"));
        assert_eq!(params.get("id"), Some("7"));
    }

    #[test]
    fn test_param_backtracking_drops_stale_params() {
        let mut root = Node::root();
        root.insert("/a/{x}/b", Method::GET, "param-branch");
        root.insert("/a/{x}/{y}/c", Method::GET, "deeper");
        root.insert("/a/*rest", Method::GET, "wild");

        let (methods, params) = root.match_path("/a/1/z").unwrap();
        assert_eq!(methods.get(&Method::GET), Some("wild"));
        assert_eq!(params.get("x"), None);
        assert_eq!(params.get("rest"), Some("1/z"));
    }

    #[test]
    fn test_bindings_keep_their_own_parameter_names() {
        let mut root = Node::root();
        root.insert("/users/{id}", Method::GET, "get");
        root.insert("/users/{name}", Method::DELETE, "delete");

        let (methods, _) = root.match_path("/users/bob").unwrap();
        assert_eq!(methods.names(&Method::GET), Some(&["id".to_string()][..]));
        assert_eq!(methods.names(&Method::DELETE), Some(&["name".to_string()][..]));
    }

    #[test]
    fn test_parameter_names() {
        assert_eq!(parameter_names(&["a", "{x}", "b", "{y}"]), vec!["x", "y"]);
        assert_eq!(parameter_names(&["files", "*rest", "{ignored}"]), vec!["rest"]);
        assert!(parameter_names(&["static"]).is_empty());
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let mut root = Node::root();
        root.insert("/swagger/", Method::GET, "ui");
        assert!(root.match_path("/swagger").is_some());
        assert!(root.match_path("/swagger/").is_some());
    }

    #[test]
    fn test_no_match() {
        let mut root = Node::root();
        root.insert("/users", Method::GET, "users");
        assert!(root.match_path("/posts").is_none());
        assert!(root.match_path("/users/1").is_none());
    }
}
