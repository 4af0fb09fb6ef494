//! # Item Sets
//!
//! The collection-shaped snapshot: an ordered set of items (for example the
//! ids of records that belong to a has-many relationship).

use std::collections::BTreeSet;
use std::fmt;

/// Collection snapshot
pub type ItemSet<T> = BTreeSet<T>;

/// Render a set as `{ a, b }` for operation descriptions
pub fn format_items<T: fmt::Display>(items: &ItemSet<T>) -> String {
    let rendered: Vec<String> = items.iter().map(|item| item.to_string()).collect();
    format!("{{ {} }}", rendered.join(", "))
}
