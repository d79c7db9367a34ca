//! Flat category list to nested tree

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::{Category, CategoryNode};

/// Build the category forest from a flat list.
///
/// Siblings are ordered by `sort_order`, then name. A category whose parent
/// is not in `categories` is returned as a root. Categories caught in a
/// stored parent cycle are unreachable from any root; the first of each
/// cycle (in sibling order) is returned as a root so none go missing.
pub fn build_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let known: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();

    let mut children: HashMap<Option<Uuid>, Vec<&Category>> = HashMap::new();
    for category in categories {
        let parent = category.parent_id.filter(|p| known.contains(p) && *p != category.id);
        children.entry(parent).or_default().push(category);
    }

    let mut visited = HashSet::new();
    let mut roots = attach(None, &children, &mut visited);

    let mut stranded: Vec<&Category> = categories
        .iter()
        .filter(|c| !visited.contains(&c.id))
        .collect();
    sort_siblings(&mut stranded);
    for category in stranded {
        if visited.insert(category.id) {
            roots.push(node(category, &children, &mut visited));
        }
    }

    roots
}

fn sort_siblings(siblings: &mut [&Category]) {
    siblings.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn node(
    category: &Category,
    children: &HashMap<Option<Uuid>, Vec<&Category>>,
    visited: &mut HashSet<Uuid>,
) -> CategoryNode {
    let mut node = CategoryNode::from(category);
    node.children = attach(Some(category.id), children, visited);
    node
}

fn attach(
    parent: Option<Uuid>,
    children: &HashMap<Option<Uuid>, Vec<&Category>>,
    visited: &mut HashSet<Uuid>,
) -> Vec<CategoryNode> {
    let Some(siblings) = children.get(&parent) else {
        return Vec::new();
    };

    let mut siblings = siblings.clone();
    sort_siblings(&mut siblings);

    let mut nodes = Vec::with_capacity(siblings.len());
    for category in siblings {
        if !visited.insert(category.id) {
            continue;
        }
        nodes.push(node(category, children, visited));
    }
    nodes
}
