/*! Error types for axnav operations. */

/// Errors that can occur while resolving names, searching, or waiting.
///
/// Lookup failures carry the requested short name and a description of the
/// element it was looked up on, so the message reads like
/// `"title" was not found for #<Button ...>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AxnavError {
  #[error("attribute {name:?} was not found for {element}")]
  UnknownAttribute { name: String, element: String },

  #[error("action {name:?} was not found for {element}")]
  UnknownAction { name: String, element: String },

  #[error("parameterized attribute {name:?} was not found for {element}")]
  UnknownParamAttribute { name: String, element: String },

  #[error("attribute {attribute:?} is not writable")]
  NotWritable { attribute: String },

  #[error("failed to register for {notification:?}: {reason}")]
  RegistrationFailure {
    notification: String,
    reason: String,
  },

  #[error("no known element type matches {0:?}")]
  SearchTypeUnresolved(String),

  /// Neither an attribute nor a search applies. Only produced on request,
  /// see `Dispatch::into_result`.
  #[error("{name:?} is neither an attribute of nor searchable from {element}")]
  Unresolved { name: String, element: String },

  /// Failure reported by the platform binding, passed through as-is.
  #[error("platform error: {0}")]
  Platform(String),
}

impl AxnavError {
  /// True for the three name-lookup failures.
  pub const fn is_lookup_failure(&self) -> bool {
    matches!(
      self,
      Self::UnknownAttribute { .. } | Self::UnknownAction { .. } | Self::UnknownParamAttribute { .. }
    )
  }
}

/// Result type for axnav operations.
pub type AxnavResult<T> = Result<T, AxnavError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookup_failure_names_the_request_and_element() {
    let err = AxnavError::UnknownAttribute {
      name: "name".into(),
      element: "#<Button @attributes=[Title]>".into(),
    };
    assert_eq!(
      err.to_string(),
      "attribute \"name\" was not found for #<Button @attributes=[Title]>"
    );
    assert!(err.is_lookup_failure());
  }

  #[test]
  fn search_failure_is_not_a_lookup_failure() {
    let err = AxnavError::SearchTypeUnresolved("gizmos".into());
    assert!(!err.is_lookup_failure());
    assert_eq!(err.to_string(), "no known element type matches \"gizmos\"");
  }

  #[test]
  fn registration_failure_carries_reason() {
    let err = AxnavError::RegistrationFailure {
      notification: "AXBogus".into(),
      reason: "unsupported notification".into(),
    };
    assert_eq!(
      err.to_string(),
      "failed to register for \"AXBogus\": unsupported notification"
    );
  }
}
