/*!
Fuzzy name resolution.

Callers refer to attributes, actions and element types by short names
(`title`, `title_ui_element`, `enabled?`, `buttons`). The platform only
understands exact, prefixed identifiers (`AXTitle`, `AXTitleUIElement`,
`AXEnabled`, `AXButton`). Resolution bridges the two:

1. The short name is normalized: underscores and one trailing `?` are
   dropped, the rest is case-folded.
2. Every candidate whose case-folded form *ends with* the normalized name
   matches.
3. The shortest match wins. Matches of equal length resolve to the one seen
   first, so candidate order is part of the contract - see [`NameSet`].

```
use axnav::a11y::resolve;

let names = ["AXTitle", "AXTitleUIElement"];
assert_eq!(resolve("title", names), Some("AXTitle"));
assert_eq!(resolve("title_ui_element", names), Some("AXTitleUIElement"));
assert_eq!(resolve("subtitle", names), None);
```
*/

use std::collections::HashSet;

/// Normalize a short name into the lowercase suffix it must match.
///
/// ```
/// assert_eq!(axnav::a11y::normalize("Enabled?"), "enabled");
/// assert_eq!(axnav::a11y::normalize("title_ui_element"), "titleuielement");
/// ```
pub fn normalize(short_name: &str) -> String {
  let trimmed = short_name.strip_suffix('?').unwrap_or(short_name);
  fold_case(&trimmed.replace('_', ""))
}

/// Lowercase one character at a time. Used on both sides of a match.
fn fold_case(name: &str) -> String {
  name.chars().flat_map(char::to_lowercase).collect()
}

/// Case-insensitive suffix matcher for one normalized short name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
  needle: String,
}

impl Matcher {
  /// Matcher for the normalized form of `short_name`.
  pub fn new(short_name: &str) -> Self {
    Self {
      needle: normalize(short_name),
    }
  }

  /// The normalized suffix this matcher looks for.
  pub fn needle(&self) -> &str {
    &self.needle
  }

  /// Whether `candidate` ends with the needle, ignoring case.
  pub fn matches(&self, candidate: &str) -> bool {
    fold_case(candidate).ends_with(&self.needle)
  }
}

/// Resolve `short_name` against `candidates`.
///
/// Returns the shortest matching candidate; ties go to the earliest one.
pub fn resolve<'a, I>(short_name: &str, candidates: I) -> Option<&'a str>
where
  I: IntoIterator<Item = &'a str>,
{
  let matcher = Matcher::new(short_name);
  let mut best: Option<(&'a str, usize)> = None;

  for candidate in candidates {
    if !matcher.matches(candidate) {
      continue;
    }
    let len = candidate.chars().count();
    // Strictly shorter only: the first of equal-length matches is kept.
    if best.is_none_or(|(_, best_len)| len < best_len) {
      best = Some((candidate, len));
    }
  }

  best.map(|(name, _)| name)
}

/// Whether a search type name asks for every match (`buttons`) rather than
/// the first one (`button`).
pub fn is_plural(type_name: &str) -> bool {
  type_name.ends_with('s')
}

/// Strip the plural marker from a search type name.
pub fn singular(type_name: &str) -> &str {
  type_name.strip_suffix('s').unwrap_or(type_name)
}

/// Whether a name is written as a predicate (`enabled?`).
pub fn is_predicate(name: &str) -> bool {
  name.ends_with('?')
}

/// Human-readable form of an exact name with its platform prefix removed.
///
/// ```
/// assert_eq!(axnav::a11y::display_name("AXTitleUIElement", "AX"), "TitleUIElement");
/// assert_eq!(axnav::a11y::display_name("Custom", "AX"), "Custom");
/// ```
pub fn display_name<'a>(exact_name: &'a str, prefix: &str) -> &'a str {
  exact_name.strip_prefix(prefix).unwrap_or(exact_name)
}

/// Insertion-ordered set of exact names.
///
/// Duplicates collapse onto their first occurrence. Iteration order is the
/// order names were first inserted, which is what makes tie-breaking in
/// [`resolve`] deterministic regardless of how the platform happens to order
/// its name lists between versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet {
  names: Vec<String>,
}

impl NameSet {
  /// Empty set.
  pub const fn new() -> Self {
    Self { names: Vec::new() }
  }

  /// Insert a name. Returns false if it was already present.
  pub fn insert(&mut self, name: impl Into<String>) -> bool {
    let name = name.into();
    if self.contains_exact(&name) {
      return false;
    }
    self.names.push(name);
    true
  }

  /// Number of names.
  pub fn len(&self) -> usize {
    self.names.len()
  }

  /// Whether the set holds no names.
  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  /// Exact, case-sensitive membership.
  pub fn contains_exact(&self, name: &str) -> bool {
    self.names.iter().any(|n| n == name)
  }

  /// Names in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
    self.names.iter().map(String::as_str)
  }

  /// Resolve a short name against this set.
  pub fn resolve(&self, short_name: &str) -> Option<&str> {
    resolve(short_name, self.iter())
  }
}

impl<S: Into<String>> FromIterator<S> for NameSet {
  fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
    let mut seen = HashSet::new();
    let names = iter
      .into_iter()
      .map(Into::into)
      .filter(|name: &String| seen.insert(name.clone()))
      .collect();
    Self { names }
  }
}

impl<S: Into<String>> Extend<S> for NameSet {
  fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
    for name in iter {
      self.insert(name);
    }
  }
}


#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  fn candidate() -> impl Strategy<Value = String> {
    "AX[A-Za-z]{0,12}"
  }

  proptest! {
    /// resolve finds nothing iff no candidate ends with the normalized name
    #[test]
    fn none_iff_no_suffix_match(short in "[A-Za-z_]{1,6}", names in prop::collection::vec(candidate(), 0..8)) {
      let needle = normalize(&short);
      let any_match = names.iter().any(|n| n.to_lowercase().ends_with(&needle));
      let resolved = resolve(&short, names.iter().map(String::as_str));
      prop_assert_eq!(resolved.is_some(), any_match);
    }

    /// The resolved name is the first of the shortest matches
    #[test]
    fn resolved_is_first_shortest(short in "[a-z]{1,3}", names in prop::collection::vec(candidate(), 0..8)) {
      let needle = normalize(&short);
      let matches: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| n.to_lowercase().ends_with(&needle))
        .collect();
      let shortest = matches.iter().map(|n| n.chars().count()).min();
      let expected = shortest.and_then(|len| matches.iter().copied().find(|n| n.chars().count() == len));
      prop_assert_eq!(resolve(&short, names.iter().map(String::as_str)), expected);
    }

    /// Every candidate resolves to itself when asked for by its exact name
    #[test]
    fn exact_name_is_a_match(names in prop::collection::vec(candidate(), 1..8), pick in any::<prop::sample::Index>()) {
      let set: NameSet = names.iter().cloned().collect();
      let target = pick.get(&names);
      let resolved = set.resolve(target);
      prop_assert!(resolved.is_some());
      prop_assert!(resolved.is_some_and(|r| r.chars().count() <= target.chars().count()));
    }
  }
}
