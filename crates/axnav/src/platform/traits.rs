/*!
Platform abstraction traits.

These traits are the contract between the resolution/search/wait engine and
a platform binding. A binding implements [`ElementRef`] for its element
reference type and [`NotificationSource`] for its observer type; the engine
never touches platform types directly.

Everything here is a raw, exact-name operation. Fuzzy resolution, caching
and search live in `core` and are built on top.
*/

use std::fmt::Debug;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::a11y::Value;
use crate::types::{AxnavResult, ProcessId};

/// Reference to one node of the external tree. Clone is cheap.
///
/// The reference is not owned: the platform may invalidate it at any time
/// (an element destroyed by a window closing), after which operations fail
/// with a platform error.
pub trait ElementRef: Clone + Debug + PartialEq + Send + Sync + 'static {
  /// Observer type used to wait for notifications on this platform.
  type Observer: NotificationSource<Element = Self>;

  /// Exact name of the children attribute. Its absence marks a leaf.
  const CHILDREN_ATTRIBUTE: &'static str = "AXChildren";
  /// Exact name of the role attribute.
  const ROLE_ATTRIBUTE: &'static str = "AXRole";
  /// Exact name of the subrole attribute.
  const SUBROLE_ATTRIBUTE: &'static str = "AXSubrole";
  /// Prefix shared by platform identifiers, stripped for display.
  const NAME_PREFIX: &'static str = "AX";

  /// Exact attribute names, in platform order.
  fn attribute_names(&self) -> AxnavResult<Vec<String>>;

  /// Exact action names, in platform order.
  fn action_names(&self) -> AxnavResult<Vec<String>>;

  /// Exact parameterized attribute names, in platform order.
  fn param_attribute_names(&self) -> AxnavResult<Vec<String>>;

  /// Read an attribute by exact name.
  fn read_attribute(&self, name: &str) -> AxnavResult<Value<Self>>;

  /// Write an attribute by exact name.
  fn write_attribute(&self, name: &str, value: &Value<Self>) -> AxnavResult<()>;

  /// Whether the platform allows writing this attribute.
  fn is_attribute_writable(&self, name: &str) -> AxnavResult<bool>;

  /// Perform an action by exact name. Returns the platform's success flag.
  fn perform_action(&self, name: &str) -> AxnavResult<bool>;

  /// Read a parameterized attribute by exact name.
  fn read_param_attribute(&self, name: &str, param: &Value<Self>) -> AxnavResult<Value<Self>>;

  /// Child references, in platform order.
  fn children(&self) -> AxnavResult<Vec<Self>> {
    Ok(self.read_attribute(Self::CHILDREN_ATTRIBUTE)?.into_elements())
  }

  /// Owning process.
  fn pid(&self) -> AxnavResult<ProcessId>;

  /// Create a notification observer for this element's process.
  fn observer(&self) -> AxnavResult<Self::Observer>;
}

/// Callback installed by a registration. May be invoked on any thread.
pub type NotificationCallback<E> = Box<dyn Fn(E, &str) + Send + Sync + 'static>;

/// A notification that was delivered to a registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<E> {
  /// Element that raised the notification.
  pub element: E,
  /// Exact notification name.
  pub notification: String,
}

/// Outcome of [`NotificationSource::run_until`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<E> {
  /// The registration's callback ran before the timeout.
  Fired(Fired<E>),
  /// The timeout elapsed first.
  TimedOut,
}

/// One-shot completion signal shared between a registration callback and the
/// waiting thread. Only the first delivery is kept.
#[derive(Debug)]
pub struct FireSignal<E> {
  tx: Sender<Fired<E>>,
  rx: Receiver<Fired<E>>,
}

impl<E: Send + 'static> FireSignal<E> {
  /// Empty signal with room for one delivery.
  pub(crate) fn new() -> Self {
    let (tx, rx) = crossbeam_channel::bounded(1);
    Self { tx, rx }
  }

  /// Callback that completes this signal. Deliveries after the first are dropped.
  pub(crate) fn callback(&self) -> NotificationCallback<E> {
    let tx = self.tx.clone();
    Box::new(move |element, notification| {
      let fired = Fired {
        element,
        notification: notification.to_owned(),
      };
      if tx.try_send(fired).is_err() {
        log::trace!("dropping repeated delivery of {notification}");
      }
    })
  }

  /// Block until the signal completes or `timeout` elapses.
  pub fn wait(&self, timeout: Duration) -> Option<Fired<E>> {
    self.rx.recv_timeout(timeout).ok()
  }

  /// Take the delivery if it has already happened.
  pub fn try_take(&self) -> Option<Fired<E>> {
    self.rx.try_recv().ok()
  }
}

/// Observer for element notifications.
///
/// One registration per wait: [`register`](Self::register) installs the
/// callback, [`run_until`](Self::run_until) lets the platform deliver it,
/// [`deregister`](Self::deregister) removes it. The engine guarantees that
/// every successful `register` is matched by exactly one `deregister`.
pub trait NotificationSource {
  /// Element reference type this observer delivers.
  type Element: ElementRef;
  /// Token identifying one registration.
  type Registration;

  /// Start delivering `notification` for `element` to `callback`.
  ///
  /// Fails with `AxnavError::RegistrationFailure` if the platform rejects it.
  fn register(
    &self,
    element: &Self::Element,
    notification: &str,
    callback: NotificationCallback<Self::Element>,
  ) -> AxnavResult<Self::Registration>;

  /// Stop delivering a registration. Must not fail; problems are logged.
  fn deregister(&self, registration: Self::Registration);

  /// Drive delivery until `signal` completes or `timeout` elapses.
  ///
  /// The default blocks on the signal, which is right for platforms that
  /// deliver callbacks from their own threads. Run-loop based platforms
  /// override this to pump their loop on the calling thread.
  fn run_until(&self, timeout: Duration, signal: &FireSignal<Self::Element>) -> RunOutcome<Self::Element> {
    match signal.wait(timeout) {
      Some(fired) => RunOutcome::Fired(fired),
      None => RunOutcome::TimedOut,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_the_first_delivery_is_kept() {
    let signal = FireSignal::<u32>::new();
    let callback = signal.callback();
    callback(1, "AXMoved");
    callback(2, "AXResized");

    let fired = signal.wait(Duration::from_millis(10));
    assert_eq!(
      fired,
      Some(Fired {
        element: 1,
        notification: "AXMoved".to_owned()
      })
    );
    assert_eq!(signal.try_take(), None);
  }

  #[test]
  fn wait_times_out_without_delivery() {
    let signal = FireSignal::<u32>::new();
    assert_eq!(signal.wait(Duration::from_millis(20)), None);
  }

  #[test]
  fn callbacks_deliver_across_threads() {
    let signal = FireSignal::<u32>::new();
    let callback = signal.callback();
    std::thread::spawn(move || callback(9, "AXValueChanged"))
      .join()
      .unwrap();
    assert_eq!(signal.try_take().map(|f| f.element), Some(9));
  }
}
