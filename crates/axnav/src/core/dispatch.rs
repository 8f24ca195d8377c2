/*!
Resolution of arbitrary names against a node.

A name is tried as an attribute first, then, on containers, as a search
type. Names that are neither come back as [`Dispatch::Unresolved`] so the
caller can decide what that means.
*/

use super::node::Node;
use super::search::{self, Filters, SearchResult};
use crate::a11y::Value;
use crate::platform::ElementRef;
use crate::types::{AxnavError, AxnavResult};

/// What a dynamically requested name turned out to be.
#[derive(Debug, Clone)]
pub enum Dispatch<R: ElementRef> {
  /// The name resolved to an attribute; this is its value.
  Attribute(Value<R>),
  /// The name was searched for as an element type.
  Search(SearchResult<R>),
  /// Not an attribute, and the node has no children to search.
  Unresolved,
}

impl<R: ElementRef> Dispatch<R> {
  /// Whether neither an attribute nor a search applied.
  pub const fn is_unresolved(&self) -> bool {
    matches!(self, Self::Unresolved)
  }

  /// Turn [`Dispatch::Unresolved`] into [`AxnavError::Unresolved`].
  pub fn into_result(self, node: &Node<R>, name: &str) -> AxnavResult<Self> {
    match self {
      Self::Unresolved => Err(AxnavError::Unresolved {
        name: name.to_owned(),
        element: node.to_string(),
      }),
      resolved @ (Self::Attribute(_) | Self::Search(_)) => Ok(resolved),
    }
  }

  /// The attribute value, if the name resolved to an attribute.
  pub fn into_attribute(self) -> Option<Value<R>> {
    match self {
      Self::Attribute(value) => Some(value),
      Self::Search(_) | Self::Unresolved => None,
    }
  }

  /// The search result, if the name was searched for.
  pub fn into_search(self) -> Option<SearchResult<R>> {
    match self {
      Self::Search(result) => Some(result),
      Self::Attribute(_) | Self::Unresolved => None,
    }
  }
}

pub(crate) fn dispatch<R: ElementRef>(node: &Node<R>, name: &str, filters: &Filters<R>) -> AxnavResult<Dispatch<R>> {
  if let Some(exact) = node.attribute_names()?.resolve(name) {
    log::trace!("{name:?} dispatched to attribute {exact}");
    return Ok(Dispatch::Attribute(node.attribute(exact)?));
  }
  if node.has_children()? {
    log::trace!("{name:?} dispatched to search");
    return search::search(node, name, filters).map(Dispatch::Search);
  }
  log::debug!("{name:?} unresolved on {node}");
  Ok(Dispatch::Unresolved)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::Navigator;
  use crate::platform::memory::{MemoryElement, MemoryTree};

  fn app_with_window() -> (MemoryTree, MemoryElement, MemoryElement) {
    let tree = MemoryTree::new();
    let app = tree.add_root(12, "AXApplication");
    tree.set_attribute(&app, "AXTitle", "Mail");
    let window = tree.add_child(&app, "AXWindow");
    tree.add_child(&window, "AXButton");
    (tree, app, window)
  }

  #[test]
  fn attributes_win_over_searches() {
    let (tree, app, window) = app_with_window();
    tree.set_attribute(&app, "AXFocusedWindow", Value::Element(window.clone()));
    let node = Navigator::new().node(app);

    // "window" is a known type, but it also resolves to AXFocusedWindow.
    let value = node.dispatch("window", &Filters::new()).unwrap().into_attribute().unwrap();
    assert_eq!(value, Value::Element(window));
  }

  #[test]
  fn containers_fall_back_to_search() {
    let (_, app, _) = app_with_window();
    let node = Navigator::new().node(app);

    let result = node.dispatch("buttons", &Filters::new()).unwrap().into_search().unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(
      node.dispatch("title", &Filters::new()).unwrap().into_attribute(),
      Some(Value::from("Mail"))
    );
  }

  #[test]
  fn filters_reach_the_search() {
    let (tree, app, window) = app_with_window();
    tree.set_attribute(&window, "AXTitle", "Inbox");
    let node = Navigator::new().node(app);

    let hit = node.dispatch("window", &Filters::new().with("title", "Inbox")).unwrap();
    assert_eq!(hit.into_search().map(|r| r.len()), Some(1));
    let miss = node.dispatch("window", &Filters::new().with("title", "Outbox")).unwrap();
    assert_eq!(miss.into_search().map(|r| r.len()), Some(0));
  }

  #[test]
  fn leaves_are_unresolved() {
    let tree = MemoryTree::new();
    let text = tree.add_root(1, "AXStaticText");
    let node = Navigator::new().node(text);

    let outcome = node.dispatch("button", &Filters::new()).unwrap();
    assert!(outcome.is_unresolved());
    assert_eq!(
      outcome.into_result(&node, "button").unwrap_err(),
      AxnavError::Unresolved {
        name: "button".to_owned(),
        element: "#<StaticText @attributes=[Role]>".to_owned(),
      }
    );
  }

  #[test]
  fn unknown_types_on_containers_error() {
    let (_, app, _) = app_with_window();
    let node = Navigator::new().node(app);
    assert!(matches!(
      node.dispatch("frobnicator", &Filters::new()),
      Err(AxnavError::SearchTypeUnresolved(_))
    ));
  }

  #[test]
  fn resolved_outcomes_pass_through_into_result() {
    let (_, app, _) = app_with_window();
    let node = Navigator::new().node(app);
    let outcome = node.dispatch("title", &Filters::new()).unwrap();
    assert!(outcome.into_result(&node, "title").is_ok());
  }
}
