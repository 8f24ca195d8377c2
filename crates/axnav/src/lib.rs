/*!
Axnav - short-name navigation of live accessibility trees

Find elements, read and write their attributes, perform actions, and wait
for notifications without spelling out exact platform identifiers:
`"title"` resolves to `AXTitle`, `"close_buttons"` searches for every
`AXCloseButton`.

```
use axnav::platform::memory::MemoryTree;
use axnav::{Dispatch, Filters, Navigator, Value};
use std::time::Duration;

// Any platform binding works the same way; the memory tree is built in.
let tree = MemoryTree::new();
let app = tree.add_root(501, "AXApplication");
let window = tree.add_child(&app, "AXWindow");
tree.set_attribute(&window, "AXTitle", "Inbox");
tree.set_writable_attribute(&window, "AXMain", false);

let nav = Navigator::new();
let app = nav.node(app);

// Search by type name; plural names collect every match.
let window = app.search("window", &Filters::new().with("title", "Inbox"))?
  .into_first()
  .expect("window exists");

// Attributes by short name.
assert_eq!(window.get_attribute("title")?, Value::from("Inbox"));
window.set_attribute("main", true)?;

// Dynamic names: attribute first, then search.
assert!(matches!(app.dispatch("windows", &Filters::new())?, Dispatch::Search(_)));

// Bounded wait for a notification.
let fired = window.wait_for_notification("AXMoved", Duration::from_millis(10))?;
assert!(!fired);
# Ok::<(), axnav::AxnavError>(())
```

Platform bindings implement [`platform::ElementRef`] and
[`platform::NotificationSource`]; everything else is platform independent.
*/

mod core;
mod types;

pub mod a11y;
pub mod platform;

pub use types::*;

pub use crate::a11y::Value;
pub use crate::core::{
  Dispatch, Filters, Navigator, NavigatorBuilder, NavigatorConfig, Node, SearchResult,
  DEFAULT_NOTIFICATION_TIMEOUT,
};
