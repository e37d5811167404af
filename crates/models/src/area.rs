use crate::ModuleStub;
use crate::error::{ErrorKind, Result};
use exn::OptionExt;

/// Position of a node inside a [`StudyAreaForest`].
///
/// This is **not** the surrogate ID assigned by the store; it is only
/// meaningful for the forest it came from.
pub type AreaIndex = usize;

/// A study area and the module stubs it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaNode {
    pub title: String,
    pub parent: Option<AreaIndex>,
    pub modules: Vec<ModuleStub>,
}

/// Arena of study areas belonging to one degree program.
///
/// Parents are addressed by index. Nodes can only be pushed beneath a parent
/// that already exists, so the arena order is always a valid root-first
/// (topological) write order and cycles cannot be built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyAreaForest {
    nodes: Vec<AreaNode>,
}
impl StudyAreaForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and adopt nodes that were built elsewhere.
    ///
    /// Rejects dangling parent references and cycles. Nodes may appear in
    /// any order; they are re-ordered so that every parent precedes its
    /// children, keeping the relative order of siblings.
    pub fn from_nodes(nodes: Vec<AreaNode>) -> Result<Self> {
        let len = nodes.len();
        let mut children: Vec<Vec<AreaIndex>> = vec![Vec::new(); len];
        let mut roots = Vec::new();
        for (index, node) in nodes.iter().enumerate() {
            match node.parent {
                None => roots.push(index),
                Some(parent) if parent >= len => {
                    exn::bail!(ErrorKind::InvalidTree(format!("area {index} references missing parent {parent}")));
                },
                Some(parent) if parent == index => {
                    exn::bail!(ErrorKind::InvalidTree(format!("area {index} is its own parent")));
                },
                Some(parent) => children[parent].push(index),
            }
        }
        // Anything unreachable from a root must sit on a cycle.
        let order = preorder(&roots, &children);
        if order.len() != len {
            exn::bail!(ErrorKind::InvalidTree(format!("{} area(s) form a parent cycle", len - order.len())));
        }
        let mut remap = vec![0; len];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }
        let mut slots: Vec<Option<AreaNode>> = nodes.into_iter().map(Some).collect();
        let nodes = order
            .iter()
            .filter_map(|&old| slots[old].take())
            .map(|mut node| {
                node.parent = node.parent.map(|p| remap[p]);
                node
            })
            .collect();
        Ok(Self { nodes })
    }

    /// Add a top-level area.
    pub fn push_root(&mut self, title: impl Into<String>) -> AreaIndex {
        self.nodes.push(AreaNode { title: title.into(), parent: None, modules: Vec::new() });
        self.nodes.len() - 1
    }

    /// Add an area beneath an existing one.
    pub fn push_child(&mut self, parent: AreaIndex, title: impl Into<String>) -> Result<AreaIndex> {
        if parent >= self.nodes.len() {
            exn::bail!(ErrorKind::InvalidTree(format!("parent {parent} does not exist")));
        }
        self.nodes.push(AreaNode { title: title.into(), parent: Some(parent), modules: Vec::new() });
        Ok(self.nodes.len() - 1)
    }

    /// Record a module listed under an area.
    pub fn push_module(&mut self, area: AreaIndex, module: ModuleStub) -> Result<()> {
        let node = self
            .nodes
            .get_mut(area)
            .ok_or_raise(|| ErrorKind::InvalidTree(format!("area {area} does not exist")))?;
        node.modules.push(module);
        Ok(())
    }

    pub fn get(&self, index: AreaIndex) -> Option<&AreaNode> {
        self.nodes.get(index)
    }

    /// Nodes in arena order; parents always precede their children.
    pub fn nodes(&self) -> &[AreaNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of listed stubs, counting a module once per area listing it.
    pub fn module_count(&self) -> usize {
        self.nodes.iter().map(|n| n.modules.len()).sum()
    }

    /// Nesting depth of a node; roots are at depth zero.
    pub fn depth(&self, index: AreaIndex) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(index).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }

    /// Root-first, depth-first walk in document order.
    pub fn walk(&self) -> impl Iterator<Item = (AreaIndex, &AreaNode)> {
        let mut children: Vec<Vec<AreaIndex>> = vec![Vec::new(); self.nodes.len()];
        let mut roots = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            match node.parent {
                Some(parent) => children[parent].push(index),
                None => roots.push(index),
            }
        }
        preorder(&roots, &children).into_iter().map(move |index| (index, &self.nodes[index]))
    }
}

/// Iterative pre-order over an adjacency list.
fn preorder(roots: &[AreaIndex], children: &[Vec<AreaIndex>]) -> Vec<AreaIndex> {
    let mut order = Vec::with_capacity(children.len());
    let mut stack: Vec<AreaIndex> = roots.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        order.push(index);
        stack.extend(children[index].iter().rev());
    }
    order
}
