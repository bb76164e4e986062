// Aspects: a visitor applied to every node of a construct tree

use crate::ConstructNode;

pub trait Aspect {
    fn visit(&self, node: &mut ConstructNode);
}

/// Visit `root` and every descendant once, parents before children
pub fn walk(root: &mut ConstructNode, aspect: &dyn Aspect) {
    aspect.visit(root);
    for child in root.children_mut() {
        walk(child, aspect);
    }
}
