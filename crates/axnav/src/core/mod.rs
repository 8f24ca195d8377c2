/*!
Navigator - owns configuration and wraps platform references into nodes.

# Module Structure

- `mod.rs` - Navigator, builder, shared configuration
- `node.rs` - Node: cached name sets, get/set/perform by short name
- `search.rs` - breadth-first search with type and attribute filters
- `dispatch.rs` - attribute-then-search resolution of arbitrary names
- `notify.rs` - bounded wait for a notification on a node

# Example

```
use axnav::platform::memory::MemoryTree;
use axnav::{Filters, Navigator};
use std::time::Duration;

let tree = MemoryTree::new();
let app = tree.add_root(501, "AXApplication");
let window = tree.add_child(&app, "AXWindow");
let ok = tree.add_child(&window, "AXButton");
tree.set_attribute(&ok, "AXTitle", "OK");
tree.add_action(&ok, "AXPress", true);

let nav = Navigator::builder()
  .notification_timeout(Duration::from_secs(2))
  .build();

let app = nav.node(app);
let button = app
  .search("button", &Filters::new().with("title", "OK"))
  .unwrap()
  .into_first()
  .unwrap();
assert!(button.perform_action("press").unwrap());
```
*/

mod dispatch;
mod node;
mod notify;
mod search;

pub use dispatch::Dispatch;
pub use node::Node;
pub use search::{Filters, SearchResult};

use crate::a11y::TypeCatalog;
use crate::platform::ElementRef;
use std::sync::Arc;
use std::time::Duration;

/// Default bound for notification waits.
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Plain configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorConfig {
  /// Timeout used by [`Node::wait_for_notification_default`].
  pub notification_timeout: Duration,
}

impl Default for NavigatorConfig {
  fn default() -> Self {
    Self {
      notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
    }
  }
}

/// State shared by every node a navigator creates.
#[derive(Debug)]
pub(crate) struct Context {
  pub(crate) catalog: TypeCatalog,
  pub(crate) config: NavigatorConfig,
}

/// Builder for configuring a [`Navigator`].
///
/// # Example
///
/// ```
/// use axnav::Navigator;
/// use std::time::Duration;
///
/// let nav = Navigator::builder()
///   .notification_timeout(Duration::from_millis(500))
///   .extend_known_types(["AXCanvas"])
///   .build();
/// assert!(nav.catalog().contains("AXCanvas"));
/// ```
#[derive(Debug, Default, Clone)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct NavigatorBuilder {
  config: NavigatorConfig,
  catalog: TypeCatalog,
}

impl NavigatorBuilder {
  /// Timeout for waits that don't pass one. Default: 10s.
  pub const fn notification_timeout(mut self, timeout: Duration) -> Self {
    self.config.notification_timeout = timeout;
    self
  }

  /// Replace the known element types. Order sets tie-break priority.
  pub fn known_types<I, S>(mut self, types: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.catalog = TypeCatalog::from_types(types);
    self
  }

  /// Add element types after the current ones.
  pub fn extend_known_types<I, S>(mut self, types: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.catalog.extend(types);
    self
  }

  /// Build the navigator with the configured options.
  pub fn build(self) -> Navigator {
    Navigator {
      context: Arc::new(Context {
        catalog: self.catalog,
        config: self.config,
      }),
    }
  }
}

/// Entry point: wraps platform element references into [`Node`]s.
///
/// Clone is cheap (Arc bump); nodes keep the configuration alive.
#[derive(Debug, Clone)]
pub struct Navigator {
  context: Arc<Context>,
}

impl Default for Navigator {
  fn default() -> Self {
    Self::new()
  }
}

impl Navigator {
  /// Navigator with the standard element types and a 10s wait timeout.
  pub fn new() -> Self {
    Self::builder().build()
  }

  /// Create a builder for configuring a new navigator.
  pub fn builder() -> NavigatorBuilder {
    NavigatorBuilder::default()
  }

  /// Wrap a platform reference. Each call returns a node with fresh caches.
  pub fn node<R: ElementRef>(&self, element: R) -> Node<R> {
    Node::new(element, Arc::clone(&self.context))
  }

  /// Element types searches resolve against.
  pub fn catalog(&self) -> &TypeCatalog {
    &self.context.catalog
  }

  /// Plain configuration values.
  pub fn config(&self) -> &NavigatorConfig {
    &self.context.config
  }
}
