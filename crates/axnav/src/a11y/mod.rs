/*!
Accessibility vocabulary: name resolution, known element types, and values.

- [`names`] maps short caller names onto exact platform identifiers
- [`TypeCatalog`] is the universe of element types a search may ask for
- [`Value`] is what attribute reads return and filters compare against
*/

mod catalog;
pub mod names;
mod value;

pub use catalog::TypeCatalog;
pub use names::{
  display_name, is_plural, is_predicate, normalize, resolve, singular, Matcher, NameSet,
};
pub use value::{Color, Value, ValueType};
