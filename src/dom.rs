use std::collections::HashMap;

use crate::selector::parse_selector_list;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
    pub(crate) required: bool,
    pub(crate) files: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let checked = attrs.contains_key("checked");
        let disabled = attrs.contains_key("disabled");
        let readonly = attrs.contains_key("readonly");
        let required = attrs.contains_key("required");
        let element = Element {
            tag_name,
            attrs,
            value,
            checked,
            disabled,
            readonly,
            required,
            files: Vec::new(),
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.insert(id_attr, id);
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn children(&self, node_id: NodeId) -> &[NodeId] {
        &self.nodes[node_id.0].children
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|child| *child == node_id)?;
        siblings[position + 1..]
            .iter()
            .copied()
            .find(|sibling| self.element(*sibling).is_some())
    }

    pub(crate) fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self
                .tag_name(current)
                .is_some_and(|t| t.eq_ignore_ascii_case(tag))
            {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Body element if the fixture has one, otherwise the document root.
    /// Floating UI (tooltip bubbles) is appended here.
    pub(crate) fn body_or_root(&self) -> NodeId {
        self.collect_elements()
            .into_iter()
            .find(|node| {
                self.tag_name(*node)
                    .is_some_and(|t| t.eq_ignore_ascii_case("body"))
            })
            .unwrap_or(self.root)
    }

    pub(crate) fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        self.create_element(parent, tag_name.to_string(), attrs)
    }

    pub(crate) fn detach(&mut self, node_id: NodeId) {
        if let Some(parent) = self.nodes[node_id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node_id);
        }
        if let Some(id_attr) = self.element(node_id).and_then(|e| e.attrs.get("id").cloned()) {
            if self.id_index.get(&id_attr) == Some(&node_id) {
                self.id_index.remove(&id_attr);
            }
        }
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|element| element.attrs.contains_key(name))
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("attribute target is not an element".into()))?;
        element.attrs.insert(name.to_string(), value.to_string());
        if name == "id" {
            self.id_index.insert(value.to_string(), node_id);
        }
        Ok(())
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(Error::Runtime("textContent target is not an element".into()));
        }
        let old_children = std::mem::take(&mut self.nodes[node_id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
        Ok(())
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))?;
        Ok(element.value.clone())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn checked(&self, node_id: NodeId) -> Result<bool> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("checked target is not an element".into()))?;
        Ok(element.checked)
    }

    pub(crate) fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("checked target is not an element".into()))?;
        element.checked = checked;
        Ok(())
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.disabled)
    }

    pub(crate) fn readonly(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.readonly)
    }

    pub(crate) fn required(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.required)
    }

    pub(crate) fn files(&self, node_id: NodeId) -> &[String] {
        self.element(node_id)
            .map(|element| element.files.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn set_files(&mut self, node_id: NodeId, files: Vec<String>) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("files target is not an element".into()))?;
        element.files = files;
        Ok(())
    }

    pub(crate) fn input_type(&self, node_id: NodeId) -> String {
        self.attr(node_id, "type")
            .unwrap_or_else(|| "text".into())
            .to_ascii_lowercase()
    }

    // Class membership lives in the `class` attribute; these helpers keep it
    // tokenized without duplicates.

    pub(crate) fn class_tokens(&self, node_id: NodeId) -> Vec<String> {
        self.attr(node_id, "class")
            .map(|class_attr| {
                class_attr
                    .split_whitespace()
                    .filter(|token| !token.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn has_class(&self, node_id: NodeId, class_name: &str) -> bool {
        self.class_tokens(node_id)
            .iter()
            .any(|token| token == class_name)
    }

    pub(crate) fn add_class(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let mut tokens = self.class_tokens(node_id);
        if !tokens.iter().any(|token| token == class_name) {
            tokens.push(class_name.to_string());
        }
        self.set_attr(node_id, "class", &tokens.join(" "))
    }

    pub(crate) fn remove_class(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let mut tokens = self.class_tokens(node_id);
        tokens.retain(|token| token != class_name);
        self.set_attr(node_id, "class", &tokens.join(" "))
    }

    /// All element nodes reachable from the document root, document order.
    pub(crate) fn collect_elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_from(self.root, &mut out);
        out
    }

    pub(crate) fn collect_elements_from(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node_id.0].children {
            if self.element(*child).is_some() {
                out.push(*child);
            }
            self.collect_elements_from(*child, out);
        }
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_list(selector)?;
        let mut out = Vec::new();
        for node in self.collect_elements() {
            if groups.iter().any(|group| group.matches(self, node)) {
                out.push(node);
            }
        }
        Ok(out)
    }

    /// Opening-tag rendering of an element, used in assertion failures.
    pub(crate) fn snippet(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return format!("node-{}", node_id.0);
        };
        let mut attrs = element
            .attrs
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect::<Vec<_>>();
        attrs.sort();
        let mut out = format!("<{}", element.tag_name);
        for (name, value) in attrs {
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        out.push('>');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    #[test]
    fn id_index_tracks_attribute_updates() -> crate::Result<()> {
        let mut dom = parse_html("<div id='a'></div>")?;
        let node = dom.by_id("a").expect("node by id");
        dom.set_attr(node, "id", "b")?;
        assert_eq!(dom.by_id("b"), Some(node));
        Ok(())
    }

    #[test]
    fn next_element_sibling_skips_text_nodes() -> crate::Result<()> {
        let dom = parse_html("<input id='file'> some text <span id='label'>old</span>")?;
        let input = dom.by_id("file").expect("input");
        let sibling = dom.next_element_sibling(input).expect("sibling");
        assert_eq!(dom.attr(sibling, "id").as_deref(), Some("label"));
        Ok(())
    }

    #[test]
    fn class_helpers_never_duplicate_tokens() -> crate::Result<()> {
        let mut dom = parse_html("<span id='badge' class='status-badge'></span>")?;
        let badge = dom.by_id("badge").expect("badge");
        dom.add_class(badge, "pulse")?;
        dom.add_class(badge, "pulse")?;
        assert_eq!(dom.attr(badge, "class").as_deref(), Some("status-badge pulse"));
        dom.remove_class(badge, "pulse")?;
        assert!(!dom.has_class(badge, "pulse"));
        Ok(())
    }

    #[test]
    fn set_text_content_replaces_children() -> crate::Result<()> {
        let mut dom = parse_html("<p id='p'><b>bold</b> tail</p>")?;
        let p = dom.by_id("p").expect("p");
        dom.set_text_content(p, "fresh")?;
        assert_eq!(dom.text_content(p), "fresh");
        Ok(())
    }

    #[test]
    fn detach_removes_node_from_parent_and_id_index() -> crate::Result<()> {
        let mut dom = parse_html("<div id='host'><span id='gone'></span></div>")?;
        let host = dom.by_id("host").expect("host");
        let gone = dom.by_id("gone").expect("gone");
        dom.detach(gone);
        assert!(dom.by_id("gone").is_none());
        assert!(dom.children(host).is_empty());
        Ok(())
    }
}
