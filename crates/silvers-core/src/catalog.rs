//! Collections and categories, plus the category hierarchy builder.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    /// Id of the parent category; `None` for top-level categories.
    pub parent_id: Option<String>,
}

/// A category together with its nested subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<CategoryNode>,
}

/// Nests categories under their parents.
///
/// Input order is preserved among siblings. Categories whose parent is
/// unknown become roots, and a category that would close a parent cycle is
/// promoted to a root so every category appears exactly once.
#[must_use]
pub fn build_category_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let known: HashSet<String> = categories.iter().map(|c| c.id.clone()).collect();
    let parent_of: HashMap<String, String> = categories
        .iter()
        .filter_map(|c| {
            c.parent_id
                .as_ref()
                .filter(|p| known.contains(*p) && **p != c.id)
                .map(|p| (c.id.clone(), p.clone()))
        })
        .collect();

    let mut roots = Vec::new();
    let mut children: HashMap<String, Vec<Category>> = HashMap::new();
    for category in categories {
        match effective_parent(&category.id, &parent_of) {
            Some(parent) => children.entry(parent).or_default().push(category),
            None => roots.push(category),
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children))
        .collect()
}

/// Returns the parent to nest `id` under, or `None` if it should be a root.
///
/// Walks the ancestor chain; if the walk returns to `id`, the category sits
/// on a cycle. The cycle member with the smallest id becomes the root so the
/// result is deterministic.
fn effective_parent(id: &str, parent_of: &HashMap<String, String>) -> Option<String> {
    let parent = parent_of.get(id)?;
    let mut seen = HashSet::new();
    let mut cursor = parent.as_str();
    seen.insert(id);
    loop {
        if cursor == id {
            let min = seen.iter().min().copied().unwrap_or(id);
            return if min == id { None } else { Some(parent.clone()) };
        }
        if !seen.insert(cursor) {
            // Joins a cycle that does not include `id`.
            return Some(parent.clone());
        }
        match parent_of.get(cursor) {
            Some(next) => cursor = next,
            None => return Some(parent.clone()),
        }
    }
}

fn attach(category: Category, children: &mut HashMap<String, Vec<Category>>) -> CategoryNode {
    let kids = children.remove(&category.id).unwrap_or_default();
    CategoryNode {
        subcategories: kids.into_iter().map(|c| attach(c, children)).collect(),
        category,
    }
}
