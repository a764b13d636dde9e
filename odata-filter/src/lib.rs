//! Compiles user supplied filters into OData `$filter` query strings.
//!
//! Two kinds of filters are accepted:
//!
//! - equality filters, a mapping of field to a value or a set of values
//!   (`location: ["Paris", "London"]`), and
//! - extended filters, strings of the form `field operator (field|literal)`
//!   such as `start_date > "2020-08-01"`.
//!
//! Every field is validated against a [`PropertySchema`], renamed to its
//! backend name and rendered according to the field type:
//!
//! ```
//! use entity_schema::{FieldSpec, FieldType, PropertySchema};
//! use odata_filter::{compile, EqualityFilters};
//!
//! let schema = PropertySchema::new(
//!     "notification",
//!     vec![
//!         FieldSpec::new("location", "location"),
//!         FieldSpec::new("priority", "priority").with_type(FieldType::Integer),
//!     ],
//! )
//! .unwrap();
//! let equality = EqualityFilters::new().with("location", vec!["Paris", "London"]);
//! let query = compile(&equality, &["priority >= 2"], &schema).unwrap();
//! assert_eq!(
//!     query.filter_string().unwrap(),
//!     "(location eq 'Paris' or location eq 'London') and priority ge 2"
//! );
//! ```

pub mod compiler;
pub mod compose;
pub mod errors;
pub mod evaluate;
pub mod expression;
mod render;
pub mod value;

pub use compiler::{
    compile, Clause, CompileOptions, CompiledQuery, Condition, FilterCompiler, Rhs, SimpleFilter,
};
pub use compose::{compose_queries, DEFAULT_MAX_FILTER_LENGTH};
pub use entity_schema::{PropertySchema, SchemaProvider};
pub use errors::FilterError;
pub use expression::{CompareOp, ExtendedFilter, Operand};
pub use value::{EqualityFilters, EqualityValue, FilterValue};
