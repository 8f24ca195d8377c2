/*!
Known element types.

Searches name a type (`button`, `application_dock_items`); the catalog is
the fixed universe those names are resolved against. The standard catalog
lists the macOS role identifiers followed by the subrole identifiers, since
an element's runtime type is its subrole when it has one.
*/

use super::names::NameSet;

/// macOS role identifiers (kAX*Role).
const STANDARD_ROLES: &[&str] = &[
  // Structural
  "AXApplication",
  "AXSystemWide",
  "AXWindow",
  "AXSheet",
  "AXDrawer",
  "AXPopover",
  "AXGroup",
  "AXSplitGroup",
  "AXRadioGroup",
  "AXScrollArea",
  "AXToolbar",
  "AXLayoutArea",
  "AXLayoutItem",
  "AXWebArea",
  // Navigation
  "AXMenu",
  "AXMenuBar",
  "AXMenuBarItem",
  "AXMenuItem",
  "AXTabGroup",
  // Collections
  "AXList",
  "AXRow",
  "AXColumn",
  "AXTable",
  "AXCell",
  "AXOutline",
  "AXBrowser",
  "AXGrid",
  // Interactive
  "AXButton",
  "AXMenuButton",
  "AXPopUpButton",
  "AXRadioButton",
  "AXCheckBox",
  "AXDisclosureTriangle",
  "AXLink",
  "AXTextField",
  "AXTextArea",
  "AXComboBox",
  "AXSlider",
  "AXIncrementor",
  "AXColorWell",
  "AXDockItem",
  // Indicators
  "AXProgressIndicator",
  "AXBusyIndicator",
  "AXRelevanceIndicator",
  "AXLevelIndicator",
  "AXValueIndicator",
  // Static content
  "AXStaticText",
  "AXHeading",
  "AXImage",
  "AXSplitter",
  // Chrome
  "AXScrollBar",
  "AXHandle",
  "AXMatte",
  "AXRuler",
  "AXRulerMarker",
  "AXGrowArea",
  "AXHelpTag",
  "AXUnknown",
];

/// macOS subrole identifiers (kAX*Subrole).
const STANDARD_SUBROLES: &[&str] = &[
  // Windows
  "AXStandardWindow",
  "AXDialog",
  "AXSystemDialog",
  "AXFloatingWindow",
  "AXSystemFloatingWindow",
  // Window buttons
  "AXCloseButton",
  "AXMinimizeButton",
  "AXZoomButton",
  "AXFullScreenButton",
  "AXToolbarButton",
  "AXSortButton",
  // Text
  "AXSecureTextField",
  "AXSearchField",
  "AXTextAttachment",
  "AXTextLink",
  // Collections
  "AXOutlineRow",
  "AXTableRow",
  "AXContentList",
  "AXDefinitionList",
  // Controls
  "AXSwitch",
  "AXToggle",
  "AXIncrementArrow",
  "AXDecrementArrow",
  "AXIncrementPage",
  "AXDecrementPage",
  "AXRatingIndicator",
  "AXTimeline",
  // Dock
  "AXApplicationDockItem",
  "AXDocumentDockItem",
  "AXFolderDockItem",
  "AXMinimizedWindowDockItem",
  "AXURLDockItem",
  "AXDockExtraDockItem",
  "AXTrashDockItem",
  "AXSeparatorDockItem",
  "AXProcessSwitcherList",
];

/// Insertion-ordered universe of known element type identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCatalog {
  types: NameSet,
}

impl TypeCatalog {
  /// The macOS roles and subroles.
  pub fn standard() -> Self {
    Self::from_types(STANDARD_ROLES.iter().chain(STANDARD_SUBROLES).copied())
  }

  /// A catalog with exactly the given types, in the given order.
  pub fn from_types<I, S>(types: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      types: types.into_iter().collect(),
    }
  }

  /// Add types after the existing ones (lower tie-break priority).
  pub fn extend<I, S>(&mut self, types: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.types.extend(types);
  }

  /// Resolve the singular form of a search type name.
  pub fn resolve(&self, type_name: &str) -> Option<&str> {
    self.types.resolve(type_name)
  }

  /// Exact membership.
  pub fn contains(&self, exact_type: &str) -> bool {
    self.types.contains_exact(exact_type)
  }

  /// Number of known types.
  pub fn len(&self) -> usize {
    self.types.len()
  }

  /// Whether no types are known.
  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  /// Types in tie-break order.
  pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
    self.types.iter()
  }
}

impl Default for TypeCatalog {
  fn default() -> Self {
    Self::standard()
  }
}
