/*!
Breadth-first search below a node.

The tree is live and may change while it is walked. Elements that vanish or
fail to answer mid-search are logged and skipped; the result is a
best-effort snapshot rather than an error.
*/

use std::collections::VecDeque;

use super::node::Node;
use crate::a11y::{is_plural, singular, Value};
use crate::platform::ElementRef;
use crate::types::{AxnavError, AxnavResult};

/// Ordered attribute filters: short name to expected value.
///
/// Names resolve against each candidate's own attributes. Evaluated in
/// insertion order, stopping at the first mismatch.
///
/// ```
/// use axnav::platform::memory::MemoryElement;
/// use axnav::Filters;
///
/// let filters = Filters::<MemoryElement>::new()
///   .with("title", "Save")
///   .with("enabled", true);
/// assert_eq!(filters.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filters<R> {
  pairs: Vec<(String, Value<R>)>,
}

impl<R> Default for Filters<R> {
  fn default() -> Self {
    Self::new()
  }
}

impl<R> Filters<R> {
  /// No filters: every element of the requested type matches.
  pub const fn new() -> Self {
    Self { pairs: Vec::new() }
  }

  /// Add a filter after the existing ones.
  #[must_use]
  pub fn with(mut self, name: impl Into<String>, value: impl Into<Value<R>>) -> Self {
    self.push(name, value);
    self
  }

  /// Append a filter in place.
  pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value<R>>) {
    self.pairs.push((name.into(), value.into()));
  }

  /// Number of filters.
  pub fn len(&self) -> usize {
    self.pairs.len()
  }

  /// Whether there are no filters.
  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }

  /// Filters in evaluation order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<R>)> + '_ {
    self.pairs.iter().map(|(name, value)| (name.as_str(), value))
  }
}

impl<R, K, V> FromIterator<(K, V)> for Filters<R>
where
  K: Into<String>,
  V: Into<Value<R>>,
{
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    let mut filters = Self::new();
    for (name, value) in iter {
      filters.push(name, value);
    }
    filters
  }
}

/// Outcome of a search. The variant follows the requested type name's
/// cardinality, not the number of matches.
#[derive(Debug, Clone)]
pub enum SearchResult<R: ElementRef> {
  /// Singular query: first match in breadth-first order, if any.
  Single(Option<Node<R>>),
  /// Plural query: every match in breadth-first order.
  Plural(Vec<Node<R>>),
}

impl<R: ElementRef> SearchResult<R> {
  /// Number of matches held.
  pub fn len(&self) -> usize {
    match self {
      Self::Single(found) => usize::from(found.is_some()),
      Self::Plural(found) => found.len(),
    }
  }

  /// Whether nothing matched.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Whether the query asked for every match.
  pub const fn is_plural(&self) -> bool {
    matches!(self, Self::Plural(_))
  }

  /// First match in breadth-first order.
  pub fn first(&self) -> Option<&Node<R>> {
    match self {
      Self::Single(found) => found.as_ref(),
      Self::Plural(found) => found.first(),
    }
  }

  /// Take the first match in breadth-first order.
  pub fn into_first(self) -> Option<Node<R>> {
    match self {
      Self::Single(found) => found,
      Self::Plural(found) => found.into_iter().next(),
    }
  }

  /// Take every match in breadth-first order.
  pub fn into_vec(self) -> Vec<Node<R>> {
    match self {
      Self::Single(found) => found.into_iter().collect(),
      Self::Plural(found) => found,
    }
  }
}

pub(crate) fn search<R: ElementRef>(
  root: &Node<R>,
  type_name: &str,
  filters: &Filters<R>,
) -> AxnavResult<SearchResult<R>> {
  let plural = is_plural(type_name);
  let exact_type = root
    .catalog()
    .resolve(singular(type_name))
    .ok_or_else(|| AxnavError::SearchTypeUnresolved(type_name.to_owned()))?
    .to_owned();

  log::trace!("searching {:?} for {exact_type} (plural: {plural})", root.element());

  let mut frontier: VecDeque<Node<R>> = root.children()?.into();
  let mut found = Vec::new();

  while let Some(node) = frontier.pop_front() {
    frontier.extend(expand(&node));

    if !is_type(&node, &exact_type) || !passes(&node, filters) {
      continue;
    }
    if !plural {
      return Ok(SearchResult::Single(Some(node)));
    }
    found.push(node);
  }

  log::debug!("search for {exact_type} found {} match(es)", found.len());
  Ok(if plural {
    SearchResult::Plural(found)
  } else {
    SearchResult::Single(None)
  })
}

/// Children to enqueue. Unreadable elements are treated as leaves.
fn expand<R: ElementRef>(node: &Node<R>) -> Vec<Node<R>> {
  node.children().unwrap_or_else(|err| {
    log::debug!("treating {:?} as a leaf: {err}", node.element());
    Vec::new()
  })
}

fn is_type<R: ElementRef>(node: &Node<R>, exact_type: &str) -> bool {
  match node.node_type() {
    Ok(node_type) => node_type == exact_type,
    Err(err) => {
      log::debug!("skipping {:?}, type unreadable: {err}", node.element());
      false
    }
  }
}

fn passes<R: ElementRef>(node: &Node<R>, filters: &Filters<R>) -> bool {
  filters.iter().all(|(name, expected)| {
    let exact = match node.attribute_names() {
      Ok(names) => names.resolve(name),
      Err(err) => {
        log::debug!("skipping {:?}, attributes unreadable: {err}", node.element());
        return false;
      }
    };
    let Some(exact) = exact else {
      log::trace!("skipping {:?}, no attribute matches {name:?}", node.element());
      return false;
    };
    match node.attribute(exact) {
      Ok(actual) => actual == *expected,
      Err(err) => {
        log::debug!("skipping {:?}, {exact} unreadable: {err}", node.element());
        false
      }
    }
  })
}
