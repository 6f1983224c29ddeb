// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Expandable outline of a dataset, flattened for list rendering.

use crate::file_info::FileInfo;
use crate::model::{DataTree, Variable};
use crate::render::human_bytes;

use super::theme::Tone;

pub(crate) type NodeId = usize;

/// What a row stands for; only variables can be inspected further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Root,
    Section,
    Group { path: String },
    Variable { group: String, name: String },
    Leaf,
}

#[derive(Debug, Clone)]
pub(crate) struct OutlineNode {
    pub(crate) label: Vec<(String, Tone)>,
    pub(crate) kind: NodeKind,
    /// Searchable `/`-joined path, empty for structural rows.
    pub(crate) path: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) expanded: bool,
    pub(crate) depth: usize,
}

impl OutlineNode {
    pub(crate) fn label_text(&self) -> String {
        self.label.iter().map(|(text, _)| text.as_str()).collect()
    }

    pub(crate) fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena of outline rows with a cached list of the currently visible ones.
#[derive(Debug, Clone)]
pub(crate) struct Outline {
    nodes: Vec<OutlineNode>,
    visible: Vec<NodeId>,
}

impl Outline {
    pub(crate) fn build(source: &str, info: &FileInfo, data: &DataTree) -> Self {
        let mut outline = Self { nodes: Vec::new(), visible: Vec::new() };
        let title = vec![(format!("Dataset: {source}"), Tone::Plain)];
        let root = outline.push(None, title, NodeKind::Root, "", true);

        let info_node =
            outline.push(Some(root), plain("File Information"), NodeKind::Section, "", true);
        for (label, value) in info.rows() {
            outline.push(Some(info_node), key_value(label, value), NodeKind::Leaf, label, false);
        }

        outline.push_group(root, data, String::new());
        outline.refresh();
        outline
    }

    fn push(
        &mut self,
        parent: Option<NodeId>,
        label: Vec<(String, Tone)>,
        kind: NodeKind,
        key: &str,
        expanded: bool,
    ) -> NodeId {
        let id = self.nodes.len();
        let (depth, parent_path) = match parent {
            Some(parent) => (self.nodes[parent].depth + 1, self.nodes[parent].path.clone()),
            None => (0, String::new()),
        };
        let path = match (parent_path.is_empty(), key.is_empty()) {
            (_, true) => parent_path,
            (true, false) => key.to_owned(),
            (false, false) => format!("{parent_path}/{key}"),
        };
        self.nodes.push(OutlineNode {
            label,
            kind,
            path,
            parent,
            children: Vec::new(),
            expanded,
            depth,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    fn push_group(&mut self, parent: NodeId, group: &DataTree, path: String) {
        let title =
            if path.is_empty() { "Root".to_owned() } else { format!("Group: {}", group.name()) };
        let label = vec![
            (format!("{title} (Data Variables: "), Tone::Plain),
            (group.data_vars().len().to_string(), Tone::Count),
            (" Coordinates: ".to_owned(), Tone::Plain),
            (group.coords().len().to_string(), Tone::Count),
            (")".to_owned(), Tone::Plain),
        ];
        let key = if path.is_empty() { "" } else { group.name() };
        let node =
            self.push(Some(parent), label, NodeKind::Group { path: path.clone() }, key, true);

        let dims = self.push(Some(node), plain("Dimensions"), NodeKind::Section, "", true);
        for (dim, size) in group.dims() {
            let label = vec![(format!("{dim}: "), Tone::Plain), (size.to_string(), Tone::Count)];
            self.push(Some(dims), label, NodeKind::Leaf, dim, false);
        }

        let sections = [("Coordinates", group.coords()), ("Data Variables", group.data_vars())];
        for (section, vars) in sections {
            let section = self.push(Some(node), plain(section), NodeKind::Section, "", true);
            for var in vars {
                self.push_variable(section, var, &path);
            }
        }

        for child in group.children() {
            let child_path = if path.is_empty() {
                child.name().to_owned()
            } else {
                format!("{path}/{}", child.name())
            };
            self.push_group(node, child, child_path);
        }
    }

    fn push_variable(&mut self, parent: NodeId, var: &Variable, group: &str) {
        let kind = NodeKind::Variable { group: group.to_owned(), name: var.name().to_owned() };
        let node = self.push(Some(parent), variable_label(var), kind, var.name(), false);

        let count = vec![
            ("Attributes (".to_owned(), Tone::Plain),
            (var.attrs().len().to_string(), Tone::Count),
            (")".to_owned(), Tone::Plain),
        ];
        let attrs = self.push(Some(node), count, NodeKind::Section, "", false);
        for (key, value) in var.attrs().iter() {
            self.push(Some(attrs), key_value(key, &value.to_string()), NodeKind::Leaf, key, false);
        }
    }

    fn refresh(&mut self) {
        fn visit(nodes: &[OutlineNode], id: NodeId, out: &mut Vec<NodeId>) {
            out.push(id);
            if nodes[id].expanded {
                for &child in &nodes[id].children {
                    visit(nodes, child, out);
                }
            }
        }

        let mut visible = Vec::with_capacity(self.nodes.len());
        if !self.nodes.is_empty() {
            visit(&self.nodes, 0, &mut visible);
        }
        self.visible = visible;
    }

    pub(crate) fn node(&self, id: NodeId) -> &OutlineNode {
        &self.nodes[id]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn visible(&self) -> &[NodeId] {
        &self.visible
    }

    pub(crate) fn visible_index(&self, id: NodeId) -> Option<usize> {
        self.visible.iter().position(|candidate| *candidate == id)
    }

    pub(crate) fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if self.nodes[id].has_children() && self.nodes[id].expanded != expanded {
            self.nodes[id].expanded = expanded;
            self.refresh();
        }
    }

    pub(crate) fn toggle(&mut self, id: NodeId) {
        let expanded = self.nodes[id].expanded;
        self.set_expanded(id, !expanded);
    }

    pub(crate) fn expand_all(&mut self) {
        for node in &mut self.nodes {
            node.expanded = true;
        }
        self.refresh();
    }

    /// Collapses every row except the root, so the first level stays visible.
    pub(crate) fn collapse_all(&mut self) {
        for node in self.nodes.iter_mut().skip(1) {
            node.expanded = false;
        }
        self.refresh();
    }

    /// Expands every ancestor of `id` so it becomes visible.
    pub(crate) fn reveal(&mut self, id: NodeId) {
        let mut cursor = self.nodes[id].parent;
        while let Some(parent) = cursor {
            self.nodes[parent].expanded = true;
            cursor = self.nodes[parent].parent;
        }
        self.refresh();
    }

    /// Nearest ancestor (or `id` itself) that is currently visible.
    pub(crate) fn visible_ancestor(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while self.visible_index(current).is_none() {
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// `(id, path)` for every row with a searchable path.
    pub(crate) fn searchable(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind != NodeKind::Section && !node.path.is_empty())
            .map(|(id, node)| (id, node.path.as_str()))
    }
}

fn plain(text: &str) -> Vec<(String, Tone)> {
    vec![(text.to_owned(), Tone::Plain)]
}

fn key_value(key: &str, value: &str) -> Vec<(String, Tone)> {
    vec![(key.to_owned(), Tone::Key), (format!(": {value}"), Tone::Plain)]
}

/// `name: (dims) dtype size`
pub(crate) fn variable_label(var: &Variable) -> Vec<(String, Tone)> {
    let dims = var.dims().iter().map(|dim| dim.as_str()).collect::<Vec<_>>().join(", ");
    vec![
        (format!("{}: ", var.name()), Tone::Plain),
        (format!("({dims})"), Tone::Dims),
        (" ".to_owned(), Tone::Plain),
        (var.dtype().to_string(), Tone::DType),
        (" ".to_owned(), Tone::Plain),
        (human_bytes(var.nbytes()), Tone::Count),
    ]
}
