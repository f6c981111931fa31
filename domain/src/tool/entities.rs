//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::validation::ValidationError;
use crate::access::Sensitivity;

/// Declared type of a tool parameter or return value.
///
/// This is a closed set: validation converts every raw argument into the
/// matching [`ArgValue`](super::value_objects::ArgValue) variant and rejects
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Whether a JSON value conforms to this type.
    ///
    /// `integer` accepts integral numbers that fit an `i64`; `number`
    /// accepts any number.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }

    /// Types that a length constraint can apply to.
    pub fn has_length(&self) -> bool {
        matches!(self, ParamType::String | ParamType::Array | ParamType::Object)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ParamType::Integer | ParamType::Number)
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Human-readable name for the JSON type of a value.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    #[serde(default)]
    pub description: String,
    /// Declared type
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
    /// Value applied when an optional parameter is omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Sensitivity of values passed in this parameter
    #[serde(default)]
    pub sensitivity: Sensitivity,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, param_type: ParamType, required: bool) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            param_type,
            required,
            default: None,
            sensitivity: Sensitivity::Public,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }
}

/// Declared shape of a tool's successful output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSpec {
    #[serde(rename = "type")]
    pub return_type: ParamType,
    #[serde(default)]
    pub description: String,
}

impl ReturnSpec {
    pub fn new(return_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            return_type,
            description: description.into(),
        }
    }
}

impl From<ParamType> for ReturnSpec {
    fn from(return_type: ParamType) -> Self {
        Self::new(return_type, "")
    }
}

/// Declared pre/post condition on a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// Numeric parameter must lie within `[min, max]` (either bound optional).
    Range {
        parameter: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// String (chars), array (items) or object (keys) size bounds.
    Length {
        parameter: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// Parameter must equal one of the listed values.
    OneOf { parameter: String, values: Vec<Value> },
    /// Post-condition: serialized output must not exceed `max_bytes`.
    OutputSize { max_bytes: usize },
}

impl Constraint {
    /// The parameter this constraint targets, if it is a pre-condition.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Constraint::Range { parameter, .. }
            | Constraint::Length { parameter, .. }
            | Constraint::OneOf { parameter, .. } => Some(parameter),
            Constraint::OutputSize { .. } => None,
        }
    }
}

/// Descriptor of a tool: name, parameters, return shape and constraints.
///
/// Immutable once registered. Replacing a tool requires an explicit
/// unregister followed by a register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique, case-sensitive name (e.g., "file_reader")
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Ordered parameter specifications
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
    /// Declared output shape. Required: there is no implied return type.
    pub returns: ReturnSpec,
    /// Pre/post conditions
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Accept arguments beyond the declared parameters
    #[serde(default)]
    pub allow_extra_parameters: bool,
    /// Sensitivity of the tool itself
    #[serde(default)]
    pub sensitivity: Sensitivity,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        returns: impl Into<ReturnSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            returns: returns.into(),
            constraints: Vec::new(),
            allow_extra_parameters: false,
            sensitivity: Sensitivity::Public,
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn allowing_extra_parameters(mut self) -> Self {
        self.allow_extra_parameters = true;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Check the descriptor is internally consistent before registration.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidDescriptor(
                "tool name cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if param.name.is_empty() {
                return Err(ValidationError::InvalidDescriptor(format!(
                    "tool '{}' declares a parameter with an empty name",
                    self.name
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(ValidationError::InvalidDescriptor(format!(
                    "tool '{}' declares parameter '{}' twice",
                    self.name, param.name
                )));
            }
            if let Some(default) = &param.default
                && !param.param_type.matches(default)
            {
                return Err(ValidationError::InvalidDescriptor(format!(
                    "default for '{}' is {} but the parameter is declared {}",
                    param.name,
                    json_type_name(default),
                    param.param_type
                )));
            }
        }

        for constraint in &self.constraints {
            let Some(target) = constraint.parameter() else {
                continue;
            };
            let param = self.parameter(target).ok_or_else(|| {
                ValidationError::InvalidDescriptor(format!(
                    "constraint references undeclared parameter '{}'",
                    target
                ))
            })?;
            let compatible = match constraint {
                Constraint::Range { .. } => param.param_type.is_numeric(),
                Constraint::Length { .. } => param.param_type.has_length(),
                _ => true,
            };
            if !compatible {
                return Err(ValidationError::InvalidDescriptor(format!(
                    "constraint on '{}' does not apply to type {}",
                    target, param.param_type
                )));
            }
        }

        Ok(())
    }

    /// Highest sensitivity among the tool and the parameters present in a call.
    pub fn effective_sensitivity<'a>(
        &self,
        supplied: impl IntoIterator<Item = &'a str>,
    ) -> Sensitivity {
        supplied
            .into_iter()
            .filter_map(|name| self.parameter(name))
            .map(|p| p.sensitivity)
            .fold(self.sensitivity, Sensitivity::max)
    }
}

/// Predicate for discovery queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sensitivity: Option<Sensitivity>,
}

impl ToolFilter {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: Some(prefix.into()),
            max_sensitivity: None,
        }
    }

    pub fn with_max_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.max_sensitivity = Some(sensitivity);
        self
    }

    pub fn matches(&self, descriptor: &ToolDescriptor) -> bool {
        if let Some(prefix) = &self.name_prefix
            && !descriptor.name.starts_with(prefix.as_str())
        {
            return false;
        }
        if let Some(ceiling) = self.max_sensitivity
            && descriptor.sensitivity > ceiling
        {
            return false;
        }
        true
    }
}
