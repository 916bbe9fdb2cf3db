use std::iter::Iterator;

use super::TreeNode;

/// Depth-first iterator of nodes in a decision tree
///
/// Every node is yielded together with its depth below the root.
pub struct NodeIter<'a> {
    queue: Vec<(usize, &'a TreeNode)>,
}

impl<'a> NodeIter<'a> {
    pub fn new(queue: Vec<(usize, &'a TreeNode)>) -> Self {
        NodeIter { queue }
    }
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop().map(|(depth, node)| {
            node.children()
                .iter()
                .for_each(|child| self.queue.push((depth + 1, child)));

            (depth, node)
        })
    }
}
