use std::collections::BTreeMap;

/// Handle of a node created by a [`ViewBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// Retained view tree the interpreted renderers drive.
///
/// Property values arrive already encoded for the target (`"#D0BCFF"`, `"12px"`, ...). Names
/// prefixed with `style:` are inline style declarations; `textContent` is element text.
pub trait ViewBackend {
    /// Create a detached node.
    fn create(&mut self, tag: &str) -> NodeId;
    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    /// Set or replace a property.
    fn set_property(&mut self, node: NodeId, name: &str, value: &str);
    /// Remove a property; absent properties are ignored.
    fn remove_property(&mut self, node: NodeId, name: &str);
    /// Detach every child of `node`.
    fn clear_children(&mut self, node: NodeId);
}

/// One node of a [`ViewTree`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewNode {
    /// Native tag or class name.
    pub tag: String,
    /// Properties by name.
    pub properties: BTreeMap<String, String>,
    /// Children in order.
    pub children: Vec<NodeId>,
}

/// In-memory [`ViewBackend`] with markup serialization.
///
/// Detached nodes stay allocated until the tree is dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewTree {
    nodes: Vec<ViewNode>,
}

const HTML_VOID: &[&str] = &["img", "br", "hr", "input", "meta", "link"];

impl ViewTree {
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&ViewNode> {
        self.nodes.get(id.0)
    }

    /// Property of a node.
    pub fn property(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.properties.get(name).map(String::as_str)
    }

    /// Children of a node (empty for unknown ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    /// First node in document order below `root` (inclusive) whose property `name` equals
    /// `value`.
    pub fn find(&self, root: NodeId, name: &str, value: &str) -> Option<NodeId> {
        if self.property(root, name) == Some(value) {
            return Some(root);
        }
        self.children(root)
            .iter()
            .find_map(|c| self.find(*c, name, value))
    }

    /// XML serialization (NativeScript page markup). Text is an attribute.
    pub fn to_xml(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.write_node(root, 0, false, &mut out);
        out
    }

    /// HTML serialization. `style:*` properties merge into `style`, `textContent` becomes the
    /// element body.
    pub fn to_html(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.write_node(root, 0, true, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, depth: usize, html: bool, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        let pad = "  ".repeat(depth);
        out.push_str(&pad);
        out.push('<');
        out.push_str(&node.tag);

        let mut style = Vec::new();
        let mut text = None;
        for (k, v) in &node.properties {
            if let Some(decl) = k.strip_prefix("style:") {
                style.push(format!("{decl}: {v}"));
            } else if html && k == "textContent" {
                text = Some(v.as_str());
            } else if html && v.is_empty() {
                out.push_str(&format!(" {k}"));
            } else {
                out.push_str(&format!(" {k}=\"{}\"", escape(v)));
            }
        }
        if !style.is_empty() {
            out.push_str(&format!(" style=\"{}\"", escape(&style.join("; "))));
        }

        let void = html && HTML_VOID.contains(&node.tag.as_str());
        match (node.children.is_empty(), text) {
            _ if void => out.push_str(">\n"),
            (true, None) if !html => out.push_str(" />\n"),
            (true, None) => out.push_str(&format!("></{}>\n", node.tag)),
            (true, Some(t)) => out.push_str(&format!(">{}</{}>\n", escape(t), node.tag)),
            (false, t) => {
                out.push_str(">\n");
                if let Some(t) = t {
                    out.push_str(&format!("{pad}  {}\n", escape(t)));
                }
                for c in &node.children {
                    self.write_node(*c, depth + 1, html, out);
                }
                out.push_str(&format!("{pad}</{}>\n", node.tag));
            }
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

impl ViewBackend for ViewTree {
    fn create(&mut self, tag: &str) -> NodeId {
        self.nodes.push(ViewNode {
            tag: tag.to_string(),
            ..ViewNode::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(child);
        }
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.properties.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_property(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.properties.remove(name);
        }
    }

    fn clear_children(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.children.clear();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
