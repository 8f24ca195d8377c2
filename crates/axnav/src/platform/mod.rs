/*!
Platform layer.

[`ElementRef`] and [`NotificationSource`] define what a binding must provide;
[`memory`] is an in-process tree implementing them, for tests and headless use.
*/

pub mod memory;
mod traits;

pub use traits::{ElementRef, FireSignal, Fired, NotificationCallback, NotificationSource, RunOutcome};
