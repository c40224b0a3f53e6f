//! Node paths inside a workspace tree, rendered as `windows[1].panes[0]`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a node (or a field of a node) in the workspace tree.
///
/// The empty path is the session itself and renders as `session`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<Segment>,
}

impl NodePath {
    /// The session node.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// The window at `index`.
    #[must_use]
    pub fn window(index: usize) -> Self {
        Self::root().key("windows").index(index)
    }

    /// The pane at `pane` inside the window at `window`.
    #[must_use]
    pub fn pane(window: usize, pane: usize) -> Self {
        Self::window(window).key("panes").index(pane)
    }

    /// Child path through a mapping key.
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.to_string()));
        Self { segments }
    }

    /// Child path through a sequence index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    /// Whether this is the session node.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "session");
        }
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if position == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_renders_as_session() {
        assert_eq!(NodePath::root().to_string(), "session");
        assert!(NodePath::root().is_root());
    }

    #[test]
    fn test_pane_path() {
        assert_eq!(NodePath::pane(1, 0).to_string(), "windows[1].panes[0]");
    }

    #[test]
    fn test_field_path() {
        let path = NodePath::window(2).key("options").key("automatic-rename");
        assert_eq!(path.to_string(), "windows[2].options.automatic-rename");
        assert_eq!(
            NodePath::root().key("session_name").to_string(),
            "session_name"
        );
    }
}
