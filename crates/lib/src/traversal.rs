//! Pull-based preorder traversal over an arbitrary parent/children relation.
//!
//! A [`PreorderWalk`] yields one [`Visit`] per call to `next()`. The
//! relation is supplied by a [`TraversalHandler`], which is also told when the
//! walk descends into a node's children ([`forward`]), when it returns from
//! them ([`back`]) and when a node turns out to have no children ([`leaf`]).
//!
//! Trees whose levels differ in kind use an enum as the handler's `Node` type:
//! each variant carries what its level needs, and the walk's own stack of
//! pending siblings is what resumes a level after its children are done.
//!
//! The walk itself does not detect cycles. A handler guarding a cyclic
//! relation rejects candidates in [`accept`], which sees the chain of
//! ancestors of the candidate.
//!
//! [`forward`]: TraversalHandler::forward
//! [`back`]: TraversalHandler::back
//! [`leaf`]: TraversalHandler::leaf
//! [`accept`]: TraversalHandler::accept

/// Supplies children and receives level-change notifications.
pub trait TraversalHandler {
    type Node: Clone;

    /// The children of `parent`, in visiting order.
    fn children(&mut self, parent: &Self::Node) -> Vec<Self::Node>;

    /// Whether `candidate` should be visited. `ancestors` runs from the root
    /// to the candidate's parent.
    fn accept(&mut self, _ancestors: &[Self::Node], _candidate: &Self::Node) -> bool {
        true
    }

    /// The walk is about to visit the children of `parent`.
    fn forward(&mut self, _parent: &Self::Node) {}

    /// The walk has visited every child of `parent`.
    fn back(&mut self, _parent: &Self::Node) {}

    /// `node` has no accepted children. Called once per such node.
    fn leaf(&mut self, _node: &Self::Node) {}
}

/// One step of a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit<N> {
    /// Distance from the root, which has depth 0.
    pub depth: usize,
    pub node: N,
}

/// Preorder iterator driven by a [`TraversalHandler`].
pub struct PreorderWalk<H: TraversalHandler> {
    handler: H,
    root: Option<H::Node>,
    /// Nodes whose children are being visited, root first.
    ancestors: Vec<H::Node>,
    /// Remaining children per open level, aligned with `ancestors`.
    pending: Vec<std::vec::IntoIter<H::Node>>,
}

impl<H: TraversalHandler> PreorderWalk<H> {
    pub fn new(root: H::Node, handler: H) -> Self {
        Self {
            handler,
            root: Some(root),
            ancestors: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Runs the walk to completion and returns the handler.
    pub fn finish(mut self) -> H {
        while self.next().is_some() {}
        self.handler
    }

    fn expand(&mut self, node: &H::Node) {
        let children = self.handler.children(node);
        self.ancestors.push(node.clone());
        let accepted: Vec<H::Node> = children
            .into_iter()
            .filter(|child| self.handler.accept(&self.ancestors, child))
            .collect();
        if accepted.is_empty() {
            self.ancestors.pop();
            self.handler.leaf(node);
        } else {
            self.handler.forward(node);
            self.pending.push(accepted.into_iter());
        }
    }
}

impl<H: TraversalHandler> Iterator for PreorderWalk<H> {
    type Item = Visit<H::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            self.expand(&root);
            return Some(Visit {
                depth: 0,
                node: root,
            });
        }
        loop {
            let depth = self.pending.len();
            let level = self.pending.last_mut()?;
            if let Some(child) = level.next() {
                self.expand(&child);
                return Some(Visit { depth, node: child });
            }
            self.pending.pop();
            if let Some(parent) = self.ancestors.pop() {
                self.handler.back(&parent);
            }
        }
    }
}
