// Declarative filter criteria
use error_common::EmrError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entity::{Entity, Field};
use crate::value::FieldValue;

/// Comparison applied by a [`FilterCriterion`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 11] = [
        FilterOperator::Equal,
        FilterOperator::NotEqual,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEqual,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Equal => "Equal",
            FilterOperator::NotEqual => "NotEqual",
            FilterOperator::GreaterThan => "GreaterThan",
            FilterOperator::GreaterThanOrEqual => "GreaterThanOrEqual",
            FilterOperator::LessThan => "LessThan",
            FilterOperator::LessThanOrEqual => "LessThanOrEqual",
            FilterOperator::Contains => "Contains",
            FilterOperator::StartsWith => "StartsWith",
            FilterOperator::EndsWith => "EndsWith",
            FilterOperator::IsNull => "IsNull",
            FilterOperator::IsNotNull => "IsNotNull",
        }
    }

    /// Substring operators, only valid on text fields
    pub fn is_text_match(self) -> bool {
        matches!(
            self,
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith
        )
    }

    /// Operators that take no operand
    pub fn is_nullary(self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = EmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = crate::entity::normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().to_ascii_lowercase() == wanted)
            .ok_or_else(|| EmrError::validation(format!("Invalid filter operator: {s}")))
    }
}

impl TryFrom<String> for FilterOperator {
    type Error = EmrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One `{PropertyName, Operator, Value}` criterion
///
/// Criteria in a list are ANDed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilterCriterion {
    #[serde(alias = "propertyName", alias = "property_name")]
    pub property_name: String,
    #[serde(alias = "operator")]
    pub operator: FilterOperator,
    #[serde(alias = "value", default, deserialize_with = "value_as_string")]
    pub value: String,
}

impl FilterCriterion {
    pub fn new(property_name: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            value: value.into(),
        }
    }

    /// Parse the JSON array form callers pass in
    pub fn parse_list(json: &str) -> Result<Vec<FilterCriterion>, EmrError> {
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(json)
            .map_err(|e| EmrError::validation(format!("Invalid filter criteria: {e}")))
    }

    /// Resolve the property against `E`'s field table and type the operand
    pub fn compile<E: Entity>(&self) -> Result<CompiledFilter<E>, EmrError> {
        let field = E::field(&self.property_name).ok_or_else(|| {
            EmrError::validation(format!("Invalid filter property: {}", self.property_name))
        })?;

        if self.operator.is_text_match() && !field.kind.is_text() {
            return Err(EmrError::validation(format!(
                "Operator {} is not supported for {}",
                self.operator, self.property_name
            )));
        }

        let operand = if self.operator.is_nullary() {
            FieldValue::Null
        } else {
            field.kind.parse(&self.value).ok_or_else(|| {
                EmrError::validation(format!(
                    "Invalid filter value for {}: {}",
                    self.property_name, self.value
                ))
            })?
        };

        Ok(CompiledFilter {
            field,
            operator: self.operator,
            operand,
        })
    }
}

/// Accept strings, numbers and booleans for `Value`
fn value_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A criterion bound to a concrete field with a typed operand
pub struct CompiledFilter<E: 'static> {
    pub field: &'static Field<E>,
    pub operator: FilterOperator,
    pub operand: FieldValue,
}

impl<E: 'static> CompiledFilter<E> {
    pub fn matches(&self, entity: &E) -> bool {
        let value = self.field.value(entity);
        match self.operator {
            FilterOperator::IsNull => value.is_null(),
            FilterOperator::IsNotNull => !value.is_null(),
            FilterOperator::Equal => value == self.operand,
            FilterOperator::NotEqual => value != self.operand,
            FilterOperator::GreaterThan => value.compare(&self.operand).is_some_and(|o| o.is_gt()),
            FilterOperator::GreaterThanOrEqual => {
                value.compare(&self.operand).is_some_and(|o| o.is_ge())
            }
            FilterOperator::LessThan => value.compare(&self.operand).is_some_and(|o| o.is_lt()),
            FilterOperator::LessThanOrEqual => {
                value.compare(&self.operand).is_some_and(|o| o.is_le())
            }
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
                match (value.as_text(), self.operand.as_text()) {
                    (Some(haystack), Some(needle)) => {
                        let haystack = haystack.to_lowercase();
                        let needle = needle.to_lowercase();
                        match self.operator {
                            FilterOperator::Contains => haystack.contains(&needle),
                            FilterOperator::StartsWith => haystack.starts_with(&needle),
                            _ => haystack.ends_with(&needle),
                        }
                    }
                    _ => false,
                }
            }
        }
    }
}

impl<E: 'static> fmt::Debug for CompiledFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("field", &self.field.name)
            .field("operator", &self.operator)
            .field("operand", &self.operand)
            .finish()
    }
}

impl<E: 'static> Clone for CompiledFilter<E> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            operator: self.operator,
            operand: self.operand.clone(),
        }
    }
}
