/*!
Node - one element of the external tree, addressed by short names.

Name lists, pid and type are read from the platform at most once per node
and never refreshed. A node created later for the same element sees the
tree as it is then.
*/

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;

use super::dispatch::{self, Dispatch};
use super::notify;
use super::search::{self, Filters, SearchResult};
use super::Context;
use crate::a11y::{display_name, NameSet, TypeCatalog, Value};
use crate::platform::ElementRef;
use crate::types::{AxnavError, AxnavResult, ProcessId};

/// Handle to one external element with lazily cached metadata.
#[derive(Clone)]
pub struct Node<R: ElementRef> {
  element: R,
  context: Arc<Context>,
  attribute_names: OnceCell<NameSet>,
  action_names: OnceCell<NameSet>,
  param_attribute_names: OnceCell<NameSet>,
  pid: OnceCell<ProcessId>,
  runtime_type: OnceCell<String>,
}

impl<R: ElementRef> fmt::Debug for Node<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Node")
      .field("element", &self.element)
      .finish_non_exhaustive()
  }
}

/// `#<Button @attributes=[Role, Title, Children]>`, platform prefix stripped.
///
/// Never fails: anything that can't be read prints as `?`.
impl<R: ElementRef> fmt::Display for Node<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let node_type = self
      .node_type()
      .map_or("?", |t| display_name(t, R::NAME_PREFIX));
    write!(f, "#<{node_type} @attributes=[")?;
    match self.attribute_names() {
      Ok(names) => {
        for (i, name) in names.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          f.write_str(display_name(name, R::NAME_PREFIX))?;
        }
      }
      Err(_) => f.write_str("?")?,
    }
    f.write_str("]>")
  }
}

impl<R: ElementRef> Node<R> {
  pub(crate) fn new(element: R, context: Arc<Context>) -> Self {
    Self {
      element,
      context,
      attribute_names: OnceCell::new(),
      action_names: OnceCell::new(),
      param_attribute_names: OnceCell::new(),
      pid: OnceCell::new(),
      runtime_type: OnceCell::new(),
    }
  }

  /// Another node sharing this node's configuration.
  pub(crate) fn sibling(&self, element: R) -> Self {
    Self::new(element, Arc::clone(&self.context))
  }

  pub(crate) fn catalog(&self) -> &TypeCatalog {
    &self.context.catalog
  }

  /// The underlying platform reference.
  pub const fn element(&self) -> &R {
    &self.element
  }

  /// Give up the caches and keep the platform reference.
  pub fn into_element(self) -> R {
    self.element
  }

  // ==========================================================================
  // Cached metadata
  // ==========================================================================

  /// Exact attribute names, read on first use.
  pub fn attribute_names(&self) -> AxnavResult<&NameSet> {
    self
      .attribute_names
      .get_or_try_init(|| Ok(self.element.attribute_names()?.into_iter().collect()))
  }

  /// Exact action names, read on first use.
  pub fn action_names(&self) -> AxnavResult<&NameSet> {
    self
      .action_names
      .get_or_try_init(|| Ok(self.element.action_names()?.into_iter().collect()))
  }

  /// Exact parameterized attribute names, read on first use.
  pub fn param_attribute_names(&self) -> AxnavResult<&NameSet> {
    self
      .param_attribute_names
      .get_or_try_init(|| Ok(self.element.param_attribute_names()?.into_iter().collect()))
  }

  /// Owning process, read on first use.
  pub fn pid(&self) -> AxnavResult<ProcessId> {
    self.pid.get_or_try_init(|| self.element.pid()).copied()
  }

  /// Runtime type: the subrole when it is a non-empty string, else the role.
  ///
  /// Empty when the element has neither.
  pub fn node_type(&self) -> AxnavResult<&str> {
    self
      .runtime_type
      .get_or_try_init(|| {
        let names = self.attribute_names()?;
        if names.contains_exact(R::SUBROLE_ATTRIBUTE) {
          if let Value::String(subrole) = self.attribute(R::SUBROLE_ATTRIBUTE)? {
            if !subrole.is_empty() {
              return Ok(subrole);
            }
          }
        }
        if names.contains_exact(R::ROLE_ATTRIBUTE) {
          if let Value::String(role) = self.attribute(R::ROLE_ATTRIBUTE)? {
            return Ok(role);
          }
        }
        Ok(String::new())
      })
      .map(String::as_str)
  }

  /// Whether the element exposes the children relation.
  pub fn has_children(&self) -> AxnavResult<bool> {
    Ok(self.attribute_names()?.contains_exact(R::CHILDREN_ATTRIBUTE))
  }

  /// Child nodes, empty for leaves.
  pub fn children(&self) -> AxnavResult<Vec<Self>> {
    if !self.has_children()? {
      return Ok(Vec::new());
    }
    Ok(
      self
        .element
        .children()?
        .into_iter()
        .map(|child| self.sibling(child))
        .collect(),
    )
  }

  // ==========================================================================
  // Short-name operations
  // ==========================================================================

  /// Whether `short_name` resolves to an attribute. Searches don't count.
  pub fn responds_to(&self, short_name: &str) -> bool {
    self
      .attribute_names()
      .is_ok_and(|names| names.resolve(short_name).is_some())
  }

  /// Read an attribute by exact name, skipping resolution.
  pub fn attribute(&self, exact_name: &str) -> AxnavResult<Value<R>> {
    self.element.read_attribute(exact_name)
  }

  /// Read an attribute by short name.
  pub fn get_attribute(&self, short_name: &str) -> AxnavResult<Value<R>> {
    let exact = self.resolve_attribute(short_name)?;
    self.attribute(exact)
  }

  /// Write an attribute and return the value that was written.
  ///
  /// The element may be invalid afterwards (a write can close a window).
  pub fn set_attribute(&self, short_name: &str, value: impl Into<Value<R>>) -> AxnavResult<Value<R>> {
    let exact = self.resolve_attribute(short_name)?;
    if !self.element.is_attribute_writable(exact)? {
      return Err(AxnavError::NotWritable {
        attribute: exact.to_owned(),
      });
    }
    let value = value.into();
    self.element.write_attribute(exact, &value)?;
    log::trace!("wrote {exact} on {:?}", self.element);
    Ok(value)
  }

  /// Perform an action. Returns the platform's success flag.
  ///
  /// The element may be invalid afterwards.
  pub fn perform_action(&self, short_name: &str) -> AxnavResult<bool> {
    let exact = self
      .action_names()?
      .resolve(short_name)
      .ok_or_else(|| AxnavError::UnknownAction {
        name: short_name.to_owned(),
        element: self.to_string(),
      })?;
    let outcome = self.element.perform_action(exact)?;
    log::trace!("performed {exact} on {:?}: {outcome}", self.element);
    Ok(outcome)
  }

  /// Read a parameterized attribute by short name.
  pub fn get_param_attribute(&self, short_name: &str, param: impl Into<Value<R>>) -> AxnavResult<Value<R>> {
    let exact = self
      .param_attribute_names()?
      .resolve(short_name)
      .ok_or_else(|| AxnavError::UnknownParamAttribute {
        name: short_name.to_owned(),
        element: self.to_string(),
      })?;
    self.element.read_param_attribute(exact, &param.into())
  }

  fn resolve_attribute(&self, short_name: &str) -> AxnavResult<&str> {
    self
      .attribute_names()?
      .resolve(short_name)
      .ok_or_else(|| AxnavError::UnknownAttribute {
        name: short_name.to_owned(),
        element: self.to_string(),
      })
  }

  // ==========================================================================
  // Search, dispatch, notifications
  // ==========================================================================

  /// Breadth-first search below this node.
  ///
  /// A plural `type_name` (`"buttons"`) collects every match; a singular one
  /// stops at the first.
  pub fn search(&self, type_name: &str, filters: &Filters<R>) -> AxnavResult<SearchResult<R>> {
    search::search(self, type_name, filters)
  }

  /// Resolve `name` as an attribute, else as a search, else unresolved.
  pub fn dispatch(&self, name: &str, filters: &Filters<R>) -> AxnavResult<Dispatch<R>> {
    dispatch::dispatch(self, name, filters)
  }

  /// Block until `notification` fires on this element or `timeout` elapses.
  ///
  /// Returns whether it fired.
  pub fn wait_for_notification(&self, notification: &str, timeout: Duration) -> AxnavResult<bool> {
    notify::wait(self, notification, timeout, |_, _| {})
  }

  /// Like [`wait_for_notification`](Self::wait_for_notification), running
  /// `on_fire` with the element that raised it before returning `true`.
  pub fn wait_for_notification_with<F>(&self, notification: &str, timeout: Duration, on_fire: F) -> AxnavResult<bool>
  where
    F: FnOnce(&Self, &str),
  {
    notify::wait(self, notification, timeout, on_fire)
  }

  /// Wait using the navigator's configured timeout.
  pub fn wait_for_notification_default(&self, notification: &str) -> AxnavResult<bool> {
    self.wait_for_notification(notification, self.context.config.notification_timeout)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::Navigator;
  use crate::platform::memory::{MemoryElement, MemoryTree};

  fn window_tree() -> (MemoryTree, MemoryElement) {
    let tree = MemoryTree::new();
    let app = tree.add_root(99, "AXApplication");
    let window = tree.add_child(&app, "AXWindow");
    tree.set_attribute(&window, "AXTitle", "Inbox");
    tree.set_attribute(&window, "AXTitleUIElement", Value::Element(app));
    (tree, window)
  }

  mod attributes {
    use super::*;

    #[test]
    fn short_names_resolve_to_shortest_match() {
      let (_, window) = window_tree();
      let node = Navigator::new().node(window);
      assert_eq!(node.get_attribute("title").unwrap(), Value::from("Inbox"));
      assert!(matches!(
        node.get_attribute("title_ui_element").unwrap(),
        Value::Element(_)
      ));
    }

    #[test]
    fn unknown_attribute_names_the_element() {
      let (_, window) = window_tree();
      let node = Navigator::new().node(window);
      let err = node.get_attribute("nonsense").unwrap_err();
      assert_eq!(
        err,
        AxnavError::UnknownAttribute {
          name: "nonsense".to_owned(),
          element: "#<Window @attributes=[Role, Title, TitleUIElement]>".to_owned(),
        }
      );
    }

    #[test]
    fn names_are_cached_after_first_use() {
      let (tree, window) = window_tree();
      let node = Navigator::new().node(window.clone());
      node.get_attribute("title").unwrap();
      tree.set_attribute(&window, "AXDescription", "later");

      assert!(node.get_attribute("description").unwrap_err().is_lookup_failure());
      node.get_attribute("title").unwrap();
      assert_eq!(tree.name_queries(&window), 1);

      let fresh = Navigator::new().node(window);
      assert_eq!(fresh.get_attribute("description").unwrap(), Value::from("later"));
    }

    #[test]
    fn set_echoes_the_given_value() {
      let (tree, window) = window_tree();
      tree.set_writable_attribute(&window, "AXMain", false);
      let node = Navigator::new().node(window.clone());

      assert_eq!(node.set_attribute("main", true).unwrap(), Value::from(true));
      assert_eq!(window.read_attribute("AXMain").unwrap(), Value::from(true));
    }

    #[test]
    fn set_refuses_read_only_attributes() {
      let (_, window) = window_tree();
      let node = Navigator::new().node(window);
      assert_eq!(
        node.set_attribute("title", "Outbox").unwrap_err(),
        AxnavError::NotWritable {
          attribute: "AXTitle".to_owned()
        }
      );
    }

    #[test]
    fn responds_to_only_attributes() {
      let (_, window) = window_tree();
      let node = Navigator::new().node(window);
      assert!(node.responds_to("title"));
      assert!(node.responds_to("role?"));
      assert!(!node.responds_to("button"));
    }
  }

  mod actions {
    use super::*;

    #[test]
    fn perform_resolves_and_reports_outcome() {
      let (tree, window) = window_tree();
      tree.add_action(&window, "AXRaise", true);
      tree.add_action(&window, "AXCancel", false);
      let node = Navigator::new().node(window.clone());

      assert!(node.perform_action("raise").unwrap());
      assert!(!node.perform_action("cancel").unwrap());
      assert_eq!(tree.performed_actions(&window), vec!["AXRaise", "AXCancel"]);
    }

    #[test]
    fn unknown_action() {
      let (_, window) = window_tree();
      let node = Navigator::new().node(window);
      assert!(matches!(
        node.perform_action("press"),
        Err(AxnavError::UnknownAction { name, .. }) if name == "press"
      ));
    }

    #[test]
    fn param_attributes_pass_the_param() {
      let (tree, window) = window_tree();
      tree.add_param_attribute(&window, "AXLineForIndex", |param| match param.as_i64() {
        Some(index) => Value::from(index / 10),
        None => Value::Null,
      });
      let node = Navigator::new().node(window);

      assert_eq!(node.get_param_attribute("line_for_index", 42).unwrap(), Value::from(4));
      assert!(matches!(
        node.get_param_attribute("bounds_for_range", 0),
        Err(AxnavError::UnknownParamAttribute { .. })
      ));
    }
  }

  mod metadata {
    use super::*;

    #[test]
    fn node_type_prefers_subrole() {
      let (tree, window) = window_tree();
      tree.set_attribute(&window, "AXSubrole", "AXStandardWindow");
      assert_eq!(Navigator::new().node(window).node_type().unwrap(), "AXStandardWindow");
    }

    #[test]
    fn empty_subrole_falls_back_to_role() {
      let (tree, window) = window_tree();
      tree.set_attribute(&window, "AXSubrole", "");
      assert_eq!(Navigator::new().node(window).node_type().unwrap(), "AXWindow");
    }

    #[test]
    fn children_share_configuration() {
      let tree = MemoryTree::new();
      let app = tree.add_root(5, "AXApplication");
      tree.add_child(&app, "AXWindow");
      tree.add_child(&app, "AXMenuBar");
      let nav = Navigator::builder().known_types(["AXWindow"]).build();
      let node = nav.node(app);

      let children = node.children().unwrap();
      assert_eq!(children.len(), 2);
      assert_eq!(children[1].node_type().unwrap(), "AXMenuBar");
      assert_eq!(children[0].catalog().len(), 1);
      assert_eq!(children[0].pid().unwrap(), ProcessId(5));
    }

    #[test]
    fn leaves_have_no_children() {
      let (_, window) = window_tree();
      let node = Navigator::new().node(window);
      assert!(!node.has_children().unwrap());
      assert!(node.children().unwrap().is_empty());
    }

    #[test]
    fn destroyed_elements_report_platform_errors() {
      let (tree, window) = window_tree();
      let node = Navigator::new().node(window.clone());
      tree.destroy(&window);
      assert!(matches!(node.get_attribute("title"), Err(AxnavError::Platform(_))));
      assert_eq!(node.to_string(), "#<? @attributes=[?]>");
    }

    #[test]
    fn display_strips_prefix() {
      let tree = MemoryTree::new();
      let app = tree.add_root(1, "AXApplication");
      let button = tree.add_child(&app, "AXButton");
      tree.set_attribute(&button, "AXTitle", "OK");
      assert_eq!(
        Navigator::new().node(app).to_string(),
        "#<Application @attributes=[Role, Children]>"
      );
      assert_eq!(
        Navigator::new().node(button).to_string(),
        "#<Button @attributes=[Role, Title]>"
      );
    }
  }
}
