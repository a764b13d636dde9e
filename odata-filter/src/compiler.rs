use crate::compose::DEFAULT_MAX_FILTER_LENGTH;
use crate::errors::FilterError;
use crate::expression::{CompareOp, ExtendedFilter, Operand};
use crate::render::{convert_literal, format_literal};
use crate::value::{EqualityFilters, EqualityValue, FilterValue};
use entity_schema::{FieldSpec, PropertySchema, SchemaProvider};
use log::debug;
use std::fmt;

/// Right-hand side of a compiled condition
#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
    /// A literal converted to the field's type, with its rendered OData form
    Value { value: FilterValue, rendered: String },
    /// Another field, by backend name
    Field(String),
}

/// `backend_field op rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: CompareOp,
    pub rhs: Rhs,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rhs {
            Rhs::Value { rendered, .. } => write!(f, "{} {} {}", self.field, self.op, rendered),
            Rhs::Field(other) => write!(f, "{} {} {}", self.field, self.op, other),
        }
    }
}

/// One AND-ed term of a compiled query
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Condition(Condition),
    /// Conditions joined with `or`, always parenthesised
    AnyOf(Vec<Condition>),
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Condition(condition) => write!(f, "{}", condition),
            Clause::AnyOf(conditions) => {
                let parts: Vec<String> = conditions.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" or "))
            }
        }
    }
}

/// An equality filter with its typed values, for backends that take simple
/// filter parameters separately from the `$filter` string
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleFilter {
    pub field: String,
    pub values: Vec<FilterValue>,
}

/// Result of compiling equality and extended filters for one entity type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    clauses: Vec<Clause>,
    simple_filters: Vec<SimpleFilter>,
}

impl CompiledQuery {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn simple_filters(&self) -> &[SimpleFilter] {
        &self.simple_filters
    }

    /// No clauses: every entity matches and no `$filter` should be sent
    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    /// All clauses joined with `and`, or `None` for a match-all query
    pub fn filter_string(&self) -> Option<String> {
        if self.is_match_all() {
            return None;
        }
        let parts: Vec<String> = self.clauses.iter().map(ToString::to_string).collect();
        Some(parts.join(" and "))
    }

    /// Single conditions, which every split query must repeat
    pub fn unbreakable_filters(&self) -> Vec<String> {
        self.clauses
            .iter()
            .filter_map(|clause| match clause {
                Clause::Condition(condition) => Some(condition.to_string()),
                Clause::AnyOf(_) => None,
            })
            .collect()
    }

    /// OR-groups, which may be spread over several queries
    pub fn breakable_filters(&self) -> Vec<Vec<String>> {
        self.clauses
            .iter()
            .filter_map(|clause| match clause {
                Clause::AnyOf(conditions) => {
                    Some(conditions.iter().map(ToString::to_string).collect())
                }
                Clause::Condition(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filter_string().unwrap_or_default())
    }
}

/// Compile equality filters and extended filter expressions against `schema`.
///
/// Equality clauses come first in key order, followed by extended clauses in
/// list order.
pub fn compile<S: AsRef<str>>(
    equality: &EqualityFilters,
    extended: &[S],
    schema: &PropertySchema,
) -> Result<CompiledQuery, FilterError> {
    let mut query = CompiledQuery::default();

    for (name, value) in equality.iter() {
        let field = resolve(schema, name)?;
        let conditions = value
            .values()
            .iter()
            .map(|v| literal_condition(schema, field, CompareOp::Equal, v))
            .collect::<Result<Vec<_>, _>>()?;

        let clause = match value {
            EqualityValue::One(_) => conditions.into_iter().next().map(Clause::Condition),
            EqualityValue::AnyOf(_) if conditions.is_empty() => {
                return Err(FilterError::EmptyValueSet(name.to_string()))
            }
            EqualityValue::AnyOf(_) => Some(Clause::AnyOf(conditions)),
        };
        query.clauses.extend(clause);
        query.simple_filters.push(SimpleFilter {
            field: field.backend_name().to_string(),
            values: value.values().to_vec(),
        });
    }

    for expression in extended {
        let parsed: ExtendedFilter = expression.as_ref().parse()?;
        let field = resolve(schema, &parsed.field)?;
        let condition = match &parsed.rhs {
            Operand::Literal(value) => literal_condition(schema, field, parsed.op, value)?,
            Operand::Field(other) => Condition {
                field: field.backend_name().to_string(),
                op: parsed.op,
                rhs: Rhs::Field(resolve(schema, other)?.backend_name().to_string()),
            },
        };
        query.clauses.push(Clause::Condition(condition));
    }

    debug!(
        "Compiled {} clause(s) for {} from {} equality and {} extended filter(s)",
        query.clauses.len(),
        schema.entity(),
        equality.len(),
        extended.len()
    );
    Ok(query)
}

fn resolve<'s>(schema: &'s PropertySchema, name: &str) -> Result<&'s FieldSpec, FilterError> {
    let field = schema
        .field(name)
        .ok_or_else(|| FilterError::UnknownField {
            entity: schema.entity().to_string(),
            field: name.to_string(),
            suggestion: schema.suggest(name),
        })?;
    if !field.field_type().is_filterable() {
        return Err(FilterError::NotFilterable {
            entity: schema.entity().to_string(),
            field: name.to_string(),
        });
    }
    Ok(field)
}

fn literal_condition(
    schema: &PropertySchema,
    field: &FieldSpec,
    op: CompareOp,
    value: &FilterValue,
) -> Result<Condition, FilterError> {
    let value = convert_literal(schema.entity(), field, value)?;
    Ok(Condition {
        field: field.backend_name().to_string(),
        op,
        rhs: Rhs::Value {
            rendered: format_literal(field.field_type(), &value),
            value,
        },
    })
}

/// Settings applied when compiling through a [`FilterCompiler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Longest `$filter` string the backend accepts
    pub max_filter_length: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_filter_length: DEFAULT_MAX_FILTER_LENGTH,
        }
    }
}

/// Compiles filters by entity type name, with schemas from a [`SchemaProvider`]
pub struct FilterCompiler<'a, P: SchemaProvider + ?Sized> {
    provider: &'a P,
    options: CompileOptions,
}

impl<'a, P: SchemaProvider + ?Sized> FilterCompiler<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn schema(&self, entity_type: &str) -> Result<&'a PropertySchema, FilterError> {
        self.provider
            .property_schema(entity_type)
            .ok_or_else(|| FilterError::UnknownEntityType(entity_type.to_string()))
    }

    pub fn compile_for<S: AsRef<str>>(
        &self,
        entity_type: &str,
        equality: &EqualityFilters,
        extended: &[S],
    ) -> Result<CompiledQuery, FilterError> {
        compile(equality, extended, self.schema(entity_type)?)
    }

    /// Compile and split into `$filter` strings within the length limit.
    /// An empty result means no filter at all.
    pub fn compile_queries<S: AsRef<str>>(
        &self,
        entity_type: &str,
        equality: &EqualityFilters,
        extended: &[S],
    ) -> Result<Vec<String>, FilterError> {
        self.compile_for(entity_type, equality, extended)?
            .compose_queries(self.options.max_filter_length)
    }
}
