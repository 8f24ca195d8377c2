/*!
In-process accessibility tree.

[`MemoryTree`] holds nodes with ordered attribute, action and parameterized
attribute tables, and implements the platform traits through
[`MemoryElement`] and [`MemoryNotifier`]. It behaves like a live platform
tree: it can be mutated while references to it are held, elements can be
destroyed, and notifications can be posted from any thread.

```
use axnav::platform::memory::MemoryTree;
use axnav::{Filters, Navigator};

let tree = MemoryTree::new();
let app = tree.add_root(42, "AXApplication");
let window = tree.add_child(&app, "AXWindow");
tree.set_attribute(&window, "AXTitle", "Inbox");

let nav = Navigator::new();
let found = nav.node(app).search("window", &Filters::new()).unwrap();
assert_eq!(found.len(), 1);
```
*/

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::traits::{ElementRef, NotificationCallback, NotificationSource};
use crate::a11y::Value;
use crate::types::{AxnavError, AxnavResult, ProcessId};

/// Standard notification names accepted by [`MemoryNotifier::register`].
const STANDARD_NOTIFICATIONS: &[&str] = &[
  "AXUIElementDestroyed",
  "AXValueChanged",
  "AXTitleChanged",
  "AXFocusedUIElementChanged",
  "AXFocusedWindowChanged",
  "AXMainWindowChanged",
  "AXSelectedTextChanged",
  "AXSelectedChildrenChanged",
  "AXSelectedRowsChanged",
  "AXWindowCreated",
  "AXWindowMoved",
  "AXWindowResized",
  "AXWindowMiniaturized",
  "AXWindowDeminiaturized",
  "AXApplicationActivated",
  "AXApplicationDeactivated",
  "AXApplicationHidden",
  "AXApplicationShown",
  "AXMoved",
  "AXResized",
  "AXCreated",
  "AXMenuOpened",
  "AXMenuClosed",
  "AXMenuItemSelected",
  "AXRowCountChanged",
  "AXLayoutChanged",
  "AXSheetCreated",
  "AXDrawerCreated",
  "AXHelpTagCreated",
];

const ROLE_ATTRIBUTE: &str = "AXRole";
const CHILDREN_ATTRIBUTE: &str = "AXChildren";

type NodeId = usize;

type ParamReader = Arc<dyn Fn(&Value<MemoryElement>) -> Value<MemoryElement> + Send + Sync>;

struct Attribute {
  name: String,
  value: Value<NodeId>,
  writable: bool,
}

struct NodeData {
  pid: ProcessId,
  parent: Option<NodeId>,
  children: Vec<NodeId>,
  attributes: Vec<Attribute>,
  actions: Vec<(String, bool)>,
  param_attributes: Vec<(String, ParamReader)>,
  performed: Vec<String>,
  name_queries: usize,
  destroyed: bool,
}

impl NodeData {
  fn new(pid: ProcessId, parent: Option<NodeId>, role: &str) -> Self {
    Self {
      pid,
      parent,
      children: Vec::new(),
      attributes: vec![Attribute {
        name: ROLE_ATTRIBUTE.to_owned(),
        value: Value::from(role),
        writable: false,
      }],
      actions: Vec::new(),
      param_attributes: Vec::new(),
      performed: Vec::new(),
      name_queries: 0,
      destroyed: false,
    }
  }

  fn attribute(&self, name: &str) -> Option<&Attribute> {
    self.attributes.iter().find(|a| a.name == name)
  }

  fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
    self.attributes.iter_mut().find(|a| a.name == name)
  }

  fn ensure_children_attribute(&mut self) {
    if self.attribute(CHILDREN_ATTRIBUTE).is_none() {
      self.attributes.push(Attribute {
        name: CHILDREN_ATTRIBUTE.to_owned(),
        value: Value::Array(Vec::new()),
        writable: false,
      });
    }
  }
}

struct Registration {
  id: u64,
  node: NodeId,
  notification: String,
  callback: Arc<NotificationCallback<MemoryElement>>,
}

#[derive(Default)]
struct TreeState {
  nodes: Vec<NodeData>,
  supported_notifications: Vec<String>,
  /// Processes whose observer creation fails.
  unobservable: Vec<ProcessId>,
}

impl TreeState {
  fn live(&self, id: NodeId) -> AxnavResult<&NodeData> {
    self.nodes.get(id).filter(|n| !n.destroyed).ok_or_else(|| invalid(id))
  }

  fn live_mut(&mut self, id: NodeId) -> AxnavResult<&mut NodeData> {
    self.nodes.get_mut(id).filter(|n| !n.destroyed).ok_or_else(|| invalid(id))
  }

  fn is_self_or_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
    loop {
      if node == ancestor {
        return true;
      }
      match self.nodes.get(node).and_then(|n| n.parent) {
        Some(parent) => node = parent,
        None => return false,
      }
    }
  }
}

fn invalid(id: NodeId) -> AxnavError {
  AxnavError::Platform(format!("element #{id} is no longer valid"))
}

struct Shared {
  state: RwLock<TreeState>,
  registrations: Mutex<Vec<Registration>>,
  next_registration: AtomicU64,
}

/// Shared, mutable in-process tree. Clone is cheap (Arc bump).
#[derive(Clone)]
pub struct MemoryTree {
  shared: Arc<Shared>,
}

impl fmt::Debug for MemoryTree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoryTree")
      .field("nodes", &self.shared.state.read().nodes.len())
      .finish_non_exhaustive()
  }
}

impl Default for MemoryTree {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryTree {
  /// Empty tree accepting the standard notification names.
  pub fn new() -> Self {
    let state = TreeState {
      supported_notifications: STANDARD_NOTIFICATIONS.iter().map(|&n| n.to_owned()).collect(),
      ..TreeState::default()
    };
    Self {
      shared: Arc::new(Shared {
        state: RwLock::new(state),
        registrations: Mutex::new(Vec::new()),
        next_registration: AtomicU64::new(1),
      }),
    }
  }

  fn element(&self, id: NodeId) -> MemoryElement {
    MemoryElement {
      tree: self.clone(),
      id,
    }
  }

  fn owns(&self, element: &MemoryElement) -> bool {
    Arc::ptr_eq(&self.shared, &element.tree.shared)
  }

  /// Add a parentless node (an application) owned by `pid`.
  pub fn add_root(&self, pid: u32, role: &str) -> MemoryElement {
    let mut state = self.shared.state.write();
    state.nodes.push(NodeData::new(ProcessId(pid), None, role));
    let id = state.nodes.len() - 1;
    drop(state);
    self.element(id)
  }

  /// Append a child with the given role. The parent gains a children
  /// attribute if it did not have one.
  pub fn add_child(&self, parent: &MemoryElement, role: &str) -> MemoryElement {
    debug_assert!(self.owns(parent), "element belongs to another tree");
    let mut state = self.shared.state.write();
    let id = state.nodes.len();
    let pid = state.nodes.get(parent.id).map_or(ProcessId(0), |p| p.pid);
    state.nodes.push(NodeData::new(pid, Some(parent.id), role));
    if let Some(parent_node) = state.nodes.get_mut(parent.id) {
      parent_node.ensure_children_attribute();
      parent_node.children.push(id);
    }
    drop(state);
    self.element(id)
  }

  /// Give a node an (initially empty) children relation.
  pub fn make_container(&self, element: &MemoryElement) {
    if let Some(node) = self.shared.state.write().nodes.get_mut(element.id) {
      node.ensure_children_attribute();
    }
  }

  /// Set a read-only attribute, adding it after existing ones if new.
  pub fn set_attribute(&self, element: &MemoryElement, name: &str, value: impl Into<Value<MemoryElement>>) {
    let value = value.into().map_elements(|e| e.id);
    let mut state = self.shared.state.write();
    let Some(node) = state.nodes.get_mut(element.id) else {
      return;
    };
    match node.attribute_mut(name) {
      Some(attr) => attr.value = value,
      None => node.attributes.push(Attribute {
        name: name.to_owned(),
        value,
        writable: false,
      }),
    }
  }

  /// Set an attribute that accepts writes.
  pub fn set_writable_attribute(&self, element: &MemoryElement, name: &str, value: impl Into<Value<MemoryElement>>) {
    self.set_attribute(element, name, value);
    if let Some(attr) = self
      .shared
      .state
      .write()
      .nodes
      .get_mut(element.id)
      .and_then(|n| n.attribute_mut(name))
    {
      attr.writable = true;
    }
  }

  /// Remove an attribute from a node's attribute list.
  pub fn remove_attribute(&self, element: &MemoryElement, name: &str) {
    if let Some(node) = self.shared.state.write().nodes.get_mut(element.id) {
      node.attributes.retain(|a| a.name != name);
    }
  }

  /// Add an action whose invocation reports `outcome`.
  pub fn add_action(&self, element: &MemoryElement, name: &str, outcome: bool) {
    if let Some(node) = self.shared.state.write().nodes.get_mut(element.id) {
      node.actions.push((name.to_owned(), outcome));
    }
  }

  /// Add a parameterized attribute computed by `reader`.
  pub fn add_param_attribute<F>(&self, element: &MemoryElement, name: &str, reader: F)
  where
    F: Fn(&Value<MemoryElement>) -> Value<MemoryElement> + Send + Sync + 'static,
  {
    if let Some(node) = self.shared.state.write().nodes.get_mut(element.id) {
      node.param_attributes.push((name.to_owned(), Arc::new(reader)));
    }
  }

  /// Actions performed on a node so far, in order.
  pub fn performed_actions(&self, element: &MemoryElement) -> Vec<String> {
    self
      .shared
      .state
      .read()
      .nodes
      .get(element.id)
      .map(|n| n.performed.clone())
      .unwrap_or_default()
  }

  /// How many times any name list of a node was requested.
  pub fn name_queries(&self, element: &MemoryElement) -> usize {
    self
      .shared
      .state
      .read()
      .nodes
      .get(element.id)
      .map_or(0, |n| n.name_queries)
  }

  /// Invalidate a node and its subtree. Later operations on them fail.
  pub fn destroy(&self, element: &MemoryElement) {
    let mut state = self.shared.state.write();
    let mut pending = vec![element.id];
    while let Some(id) = pending.pop() {
      if let Some(node) = state.nodes.get_mut(id) {
        node.destroyed = true;
        pending.extend(node.children.iter().copied());
      }
    }
    if let Some(parent) = state.nodes.get(element.id).and_then(|n| n.parent) {
      if let Some(parent_node) = state.nodes.get_mut(parent) {
        parent_node.children.retain(|&c| c != element.id);
      }
    }
  }

  /// Accept registrations for a non-standard notification name.
  pub fn support_notification(&self, name: &str) {
    let mut state = self.shared.state.write();
    if !state.supported_notifications.iter().any(|n| n == name) {
      state.supported_notifications.push(name.to_owned());
    }
  }

  /// Make observer creation fail for every element of `pid`.
  pub fn refuse_observers_for(&self, pid: u32) {
    self.shared.state.write().unobservable.push(ProcessId(pid));
  }

  /// Number of live notification registrations.
  pub fn registration_count(&self) -> usize {
    self.shared.registrations.lock().len()
  }

  /// Live registrations on one node, keyed by notification name.
  pub fn registrations_for(&self, element: &MemoryElement) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for r in self.shared.registrations.lock().iter().filter(|r| r.node == element.id) {
      *counts.entry(r.notification.clone()).or_insert(0) += 1;
    }
    counts
  }

  /// Raise `notification` on `element`.
  ///
  /// Delivered to every registration for that name on the element or one of
  /// its ancestors. Callbacks run on the calling thread, outside all locks.
  /// Returns how many callbacks ran.
  pub fn post(&self, element: &MemoryElement, notification: &str) -> usize {
    let callbacks: Vec<Arc<NotificationCallback<MemoryElement>>> = {
      let state = self.shared.state.read();
      self
        .shared
        .registrations
        .lock()
        .iter()
        .filter(|r| r.notification == notification && state.is_self_or_ancestor(r.node, element.id))
        .map(|r| Arc::clone(&r.callback))
        .collect()
    };
    log::trace!(
      "posting {notification} on #{} to {} registration(s)",
      element.id,
      callbacks.len()
    );
    for callback in &callbacks {
      callback(element.clone(), notification);
    }
    callbacks.len()
  }
}

/// Reference to a node of a [`MemoryTree`].
#[derive(Clone)]
pub struct MemoryElement {
  tree: MemoryTree,
  id: NodeId,
}

impl MemoryElement {
  /// Stable index of this node within its tree.
  pub const fn index(&self) -> usize {
    self.id
  }

  /// The tree this element belongs to.
  pub const fn tree(&self) -> &MemoryTree {
    &self.tree
  }

  fn with_node<T>(&self, f: impl FnOnce(&NodeData) -> AxnavResult<T>) -> AxnavResult<T> {
    let state = self.tree.shared.state.read();
    f(state.live(self.id)?)
  }

  fn list_names(&self, f: impl FnOnce(&NodeData) -> Vec<String>) -> AxnavResult<Vec<String>> {
    let mut state = self.tree.shared.state.write();
    let node = state.live_mut(self.id)?;
    node.name_queries += 1;
    Ok(f(node))
  }
}

impl PartialEq for MemoryElement {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id && self.tree.owns(other)
  }
}

impl Eq for MemoryElement {}

impl fmt::Debug for MemoryElement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "MemoryElement(#{})", self.id)
  }
}

impl ElementRef for MemoryElement {
  type Observer = MemoryNotifier;

  fn attribute_names(&self) -> AxnavResult<Vec<String>> {
    self.list_names(|n| n.attributes.iter().map(|a| a.name.clone()).collect())
  }

  fn action_names(&self) -> AxnavResult<Vec<String>> {
    self.list_names(|n| n.actions.iter().map(|(name, _)| name.clone()).collect())
  }

  fn param_attribute_names(&self) -> AxnavResult<Vec<String>> {
    self.list_names(|n| n.param_attributes.iter().map(|(name, _)| name.clone()).collect())
  }

  fn read_attribute(&self, name: &str) -> AxnavResult<Value<Self>> {
    self.with_node(|node| {
      if name == CHILDREN_ATTRIBUTE && node.attribute(name).is_some() {
        return Ok(Value::Array(
          node
            .children
            .iter()
            .map(|&c| Value::Element(self.tree.element(c)))
            .collect(),
        ));
      }
      let attr = node
        .attribute(name)
        .ok_or_else(|| AxnavError::Platform(format!("attribute {name} unsupported by #{}", self.id)))?;
      Ok(attr.value.clone().map_elements(|id| self.tree.element(id)))
    })
  }

  fn write_attribute(&self, name: &str, value: &Value<Self>) -> AxnavResult<()> {
    let mut state = self.tree.shared.state.write();
    let node = state.live_mut(self.id)?;
    let attr = node
      .attribute_mut(name)
      .ok_or_else(|| AxnavError::Platform(format!("attribute {name} unsupported by #{}", self.id)))?;
    attr.value = value.clone().map_elements(|e| e.id);
    Ok(())
  }

  fn is_attribute_writable(&self, name: &str) -> AxnavResult<bool> {
    self.with_node(|node| Ok(node.attribute(name).is_some_and(|a| a.writable)))
  }

  fn perform_action(&self, name: &str) -> AxnavResult<bool> {
    let mut state = self.tree.shared.state.write();
    let node = state.live_mut(self.id)?;
    let outcome = node
      .actions
      .iter()
      .find(|(action, _)| action == name)
      .map(|&(_, outcome)| outcome)
      .ok_or_else(|| AxnavError::Platform(format!("action {name} unsupported by #{}", self.id)))?;
    node.performed.push(name.to_owned());
    Ok(outcome)
  }

  fn read_param_attribute(&self, name: &str, param: &Value<Self>) -> AxnavResult<Value<Self>> {
    // Clone the reader out so it runs without the tree lock held.
    let reader = self.with_node(|node| {
      node
        .param_attributes
        .iter()
        .find(|(attr, _)| attr == name)
        .map(|(_, reader)| Arc::clone(reader))
        .ok_or_else(|| AxnavError::Platform(format!("parameterized attribute {name} unsupported by #{}", self.id)))
    })?;
    Ok(reader(param))
  }

  fn children(&self) -> AxnavResult<Vec<Self>> {
    self.with_node(|node| Ok(node.children.iter().map(|&c| self.tree.element(c)).collect()))
  }

  fn pid(&self) -> AxnavResult<ProcessId> {
    self.with_node(|node| Ok(node.pid))
  }

  fn observer(&self) -> AxnavResult<MemoryNotifier> {
    let state = self.tree.shared.state.read();
    let pid = state.live(self.id)?.pid;
    if state.unobservable.contains(&pid) {
      return Err(AxnavError::RegistrationFailure {
        notification: String::new(),
        reason: format!("cannot create observer for pid {pid}"),
      });
    }
    Ok(MemoryNotifier {
      tree: self.tree.clone(),
    })
  }
}

/// Notification source for a [`MemoryTree`].
#[derive(Debug, Clone)]
pub struct MemoryNotifier {
  tree: MemoryTree,
}

/// Token for one [`MemoryNotifier`] registration.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MemoryRegistration(u64);

impl NotificationSource for MemoryNotifier {
  type Element = MemoryElement;
  type Registration = MemoryRegistration;

  fn register(
    &self,
    element: &MemoryElement,
    notification: &str,
    callback: NotificationCallback<MemoryElement>,
  ) -> AxnavResult<MemoryRegistration> {
    {
      let state = self.tree.shared.state.read();
      state.live(element.id)?;
      if !state.supported_notifications.iter().any(|n| n == notification) {
        return Err(AxnavError::RegistrationFailure {
          notification: notification.to_owned(),
          reason: "unsupported notification".to_owned(),
        });
      }
    }
    let id = self.tree.shared.next_registration.fetch_add(1, Ordering::Relaxed);
    self.tree.shared.registrations.lock().push(Registration {
      id,
      node: element.id,
      notification: notification.to_owned(),
      callback: Arc::new(callback),
    });
    Ok(MemoryRegistration(id))
  }

  fn deregister(&self, registration: MemoryRegistration) {
    let mut registrations = self.tree.shared.registrations.lock();
    let before = registrations.len();
    registrations.retain(|r| r.id != registration.0);
    if registrations.len() == before {
      log::warn!("deregistering unknown registration {}", registration.0);
    }
  }
}
