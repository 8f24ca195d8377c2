/*!
Bounded wait for a notification on one element.

The registration lives exactly as long as the wait: a guard deregisters it
when the wait returns, times out, fails, or unwinds out of `on_fire`.
*/

use std::time::Duration;

use super::node::Node;
use crate::platform::{ElementRef, FireSignal, NotificationSource, RunOutcome};
use crate::types::{AxnavError, AxnavResult};

/// Deregisters on drop.
struct Registered<'a, O: NotificationSource> {
  observer: &'a O,
  registration: Option<O::Registration>,
  notification: &'a str,
}

impl<O: NotificationSource> Drop for Registered<'_, O> {
  fn drop(&mut self) {
    if let Some(registration) = self.registration.take() {
      log::trace!("deregistering {}", self.notification);
      self.observer.deregister(registration);
    }
  }
}

pub(crate) fn wait<R, F>(node: &Node<R>, notification: &str, timeout: Duration, on_fire: F) -> AxnavResult<bool>
where
  R: ElementRef,
  F: FnOnce(&Node<R>, &str),
{
  let observer = node
    .element()
    .observer()
    .map_err(|err| registration_failure(notification, err))?;

  let signal = FireSignal::new();
  let registration = observer
    .register(node.element(), notification, signal.callback())
    .map_err(|err| registration_failure(notification, err))?;
  let _registered = Registered {
    observer: &observer,
    registration: Some(registration),
    notification,
  };

  log::debug!("waiting up to {timeout:?} for {notification} on {:?}", node.element());
  match observer.run_until(timeout, &signal) {
    RunOutcome::Fired(fired) => {
      log::debug!("{} fired on {:?}", fired.notification, fired.element);
      let source = node.sibling(fired.element);
      on_fire(&source, &fired.notification);
      Ok(true)
    }
    RunOutcome::TimedOut => {
      log::debug!("timed out waiting for {notification}");
      Ok(false)
    }
  }
}

/// Name the notification in failures from observer setup.
fn registration_failure(notification: &str, err: AxnavError) -> AxnavError {
  match err {
    AxnavError::RegistrationFailure {
      notification: named,
      reason,
    } => AxnavError::RegistrationFailure {
      notification: if named.is_empty() {
        notification.to_owned()
      } else {
        named
      },
      reason,
    },
    other @ (AxnavError::UnknownAttribute { .. }
    | AxnavError::UnknownAction { .. }
    | AxnavError::UnknownParamAttribute { .. }
    | AxnavError::NotWritable { .. }
    | AxnavError::SearchTypeUnresolved(_)
    | AxnavError::Unresolved { .. }
    | AxnavError::Platform(_)) => AxnavError::RegistrationFailure {
      notification: notification.to_owned(),
      reason: other.to_string(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::Navigator;
  use crate::platform::memory::{MemoryElement, MemoryTree};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::thread;
  use std::time::Instant;

  fn app_with_window() -> (MemoryTree, MemoryElement, MemoryElement) {
    let tree = MemoryTree::new();
    let app = tree.add_root(77, "AXApplication");
    let window = tree.add_child(&app, "AXWindow");
    (tree, app, window)
  }

  /// Post `notification` on `element` once a registration exists.
  fn post_when_registered(tree: &MemoryTree, element: &MemoryElement, notification: &'static str, times: usize) -> thread::JoinHandle<()> {
    let tree = tree.clone();
    let element = element.clone();
    thread::spawn(move || {
      for _ in 0..5000 {
        if tree.registration_count() > 0 {
          for _ in 0..times {
            tree.post(&element, notification);
          }
          return;
        }
        thread::sleep(Duration::from_millis(1));
      }
    })
  }

  mod outcomes {
    use super::*;

    #[test]
    fn timeout_returns_false_and_deregisters() {
      let (tree, app, _) = app_with_window();
      let node = Navigator::new().node(app);
      let started = Instant::now();
      let fired = node
        .wait_for_notification("AXWindowCreated", Duration::from_millis(100))
        .unwrap();
      let elapsed = started.elapsed();
      assert!(!fired);
      assert!(elapsed >= Duration::from_millis(100), "returned early after {elapsed:?}");
      assert!(elapsed < Duration::from_secs(2), "overran the timeout: {elapsed:?}");
      assert_eq!(tree.registration_count(), 0);
    }

    #[test]
    fn fire_runs_callback_once_with_source() {
      let (tree, app, window) = app_with_window();
      let poster = post_when_registered(&tree, &window, "AXWindowCreated", 3);
      let node = Navigator::new().node(app);

      let calls = AtomicUsize::new(0);
      let mut seen = None;
      let fired = node
        .wait_for_notification_with("AXWindowCreated", Duration::from_secs(5), |source, name| {
          calls.fetch_add(1, Ordering::SeqCst);
          seen = Some((source.element().clone(), name.to_owned()));
        })
        .unwrap();
      poster.join().unwrap();

      assert!(fired);
      assert_eq!(calls.load(Ordering::SeqCst), 1);
      assert_eq!(seen, Some((window, "AXWindowCreated".to_owned())));
      assert_eq!(tree.registration_count(), 0);
    }

    #[test]
    fn other_notifications_do_not_fire() {
      let (tree, app, window) = app_with_window();
      let poster = post_when_registered(&tree, &window, "AXTitleChanged", 1);
      let node = Navigator::new().node(app);
      let fired = node
        .wait_for_notification("AXWindowCreated", Duration::from_millis(200))
        .unwrap();
      poster.join().unwrap();
      assert!(!fired);
    }

    #[test]
    fn default_timeout_comes_from_navigator() {
      let (tree, app, window) = app_with_window();
      let poster = post_when_registered(&tree, &window, "AXMoved", 1);
      let nav = Navigator::builder()
        .notification_timeout(Duration::from_secs(5))
        .build();
      assert!(nav.node(app).wait_for_notification_default("AXMoved").unwrap());
      poster.join().unwrap();
    }
  }

  mod cleanup {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn panicking_callback_still_deregisters() {
      let (tree, app, window) = app_with_window();
      let poster = post_when_registered(&tree, &window, "AXResized", 1);
      let node = Navigator::new().node(app);

      let result = panic::catch_unwind(AssertUnwindSafe(|| {
        node.wait_for_notification_with("AXResized", Duration::from_secs(5), |_, _| {
          panic!("callback failed");
        })
      }));
      poster.join().unwrap();

      assert!(result.is_err());
      assert_eq!(tree.registration_count(), 0);
    }

    #[test]
    fn unsupported_notification_fails_to_register() {
      let (tree, app, _) = app_with_window();
      let node = Navigator::new().node(app);
      let err = node
        .wait_for_notification("AXNotARealThing", Duration::from_millis(10))
        .unwrap_err();
      assert!(matches!(
        err,
        AxnavError::RegistrationFailure { ref notification, .. } if notification == "AXNotARealThing"
      ));
      assert_eq!(tree.registration_count(), 0);
    }

    #[test]
    fn observer_failure_names_the_notification() {
      let (tree, app, _) = app_with_window();
      tree.refuse_observers_for(77);
      let node = Navigator::new().node(app);
      let err = node
        .wait_for_notification("AXMoved", Duration::from_millis(10))
        .unwrap_err();
      assert!(matches!(
        err,
        AxnavError::RegistrationFailure { ref notification, .. } if notification == "AXMoved"
      ));
    }

    #[test]
    fn destroyed_element_cannot_be_observed() {
      let (tree, app, _) = app_with_window();
      let node = Navigator::new().node(app.clone());
      tree.destroy(&app);
      assert!(matches!(
        node.wait_for_notification("AXMoved", Duration::from_millis(10)),
        Err(AxnavError::RegistrationFailure { .. })
      ));
    }
  }

  #[test]
  fn platform_errors_become_registration_failures() {
    let err = registration_failure("AXMoved", AxnavError::Platform("gone".to_owned()));
    assert_eq!(
      err,
      AxnavError::RegistrationFailure {
        notification: "AXMoved".to_owned(),
        reason: "platform error: gone".to_owned(),
      }
    );
  }

  #[test]
  fn callbacks_after_teardown_are_harmless() {
    let (tree, app, window) = app_with_window();
    let node = Navigator::new().node(app);
    assert!(!node.wait_for_notification("AXMoved", Duration::from_millis(10)).unwrap());
    assert_eq!(tree.post(&window, "AXMoved"), 0);
  }
}
