/*! Branded ID types. */

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Process ID - branded type to distinguish from other u32 values.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
pub struct ProcessId(pub u32);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn displays_as_bare_number() {
    assert_eq!(ProcessId(4242).to_string(), "4242");
  }

  #[test]
  fn converts_from_and_into_u32() {
    let pid: ProcessId = 17.into();
    let raw: u32 = pid.into();
    assert_eq!(raw, 17);
  }
}
