//! Tool domain traits
//!
//! Contains pure domain logic for validating tool calls against their
//! descriptors. Execution ports live in the application layer.

use serde_json::Value;
use std::collections::HashMap;

use super::entities::{Constraint, ToolDescriptor, json_type_name};
use super::validation::ValidationError;
use super::value_objects::{ArgValue, ValidatedArgs};

/// Validator for tool calls
///
/// This is a pure domain trait that validates tool calls
/// against their descriptors without any I/O operations.
pub trait ToolValidator {
    /// Validate raw arguments, returning typed arguments with defaults applied.
    fn validate(
        &self,
        arguments: &HashMap<String, Value>,
        descriptor: &ToolDescriptor,
    ) -> Result<ValidatedArgs, ValidationError>;

    /// Check a successful output against the declared return shape and
    /// post-conditions.
    fn check_output(&self, output: &Value, descriptor: &ToolDescriptor)
    -> Result<(), ValidationError>;
}

/// Default implementation of ToolValidator
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(
        &self,
        arguments: &HashMap<String, Value>,
        descriptor: &ToolDescriptor,
    ) -> Result<ValidatedArgs, ValidationError> {
        let mut validated = ValidatedArgs::new();

        // Declared parameters: presence, type, defaults
        for param in &descriptor.parameters {
            let raw = match arguments.get(&param.name) {
                Some(value) => value,
                None => match &param.default {
                    Some(default) => default,
                    None if param.required => {
                        return Err(ValidationError::MissingParameter {
                            name: param.name.clone(),
                        });
                    }
                    None => continue,
                },
            };

            let value = ArgValue::coerce(param.param_type, raw).ok_or_else(|| {
                ValidationError::TypeMismatch {
                    name: param.name.clone(),
                    expected: param.param_type,
                    actual: json_type_name(raw),
                }
            })?;
            validated.insert(param.name.clone(), value);
        }

        // Anything beyond the declared set
        let mut extras: Vec<&String> = arguments
            .keys()
            .filter(|name| descriptor.parameter(name).is_none())
            .collect();
        extras.sort();

        for name in extras {
            if !descriptor.allow_extra_parameters {
                return Err(ValidationError::UnknownParameter { name: name.clone() });
            }
            let raw = &arguments[name];
            let value = ArgValue::infer(raw).ok_or_else(|| ValidationError::ConstraintViolated {
                name: name.clone(),
                detail: "extra parameters cannot be null".to_string(),
            })?;
            validated.insert(name.clone(), value);
        }

        for constraint in &descriptor.constraints {
            check_constraint(constraint, &validated)?;
        }

        Ok(validated)
    }

    fn check_output(
        &self,
        output: &Value,
        descriptor: &ToolDescriptor,
    ) -> Result<(), ValidationError> {
        let expected = descriptor.returns.return_type;
        if !expected.matches(output) {
            return Err(ValidationError::OutputMismatch {
                expected,
                actual: json_type_name(output),
            });
        }

        for constraint in &descriptor.constraints {
            if let Constraint::OutputSize { max_bytes } = constraint {
                let actual = serde_json::to_vec(output).map(|b| b.len()).unwrap_or(0);
                if actual > *max_bytes {
                    return Err(ValidationError::OutputTooLarge {
                        actual,
                        max: *max_bytes,
                    });
                }
            }
        }

        Ok(())
    }
}

fn check_constraint(constraint: &Constraint, args: &ValidatedArgs) -> Result<(), ValidationError> {
    let Some(name) = constraint.parameter() else {
        return Ok(());
    };
    // Absent optional parameters have nothing to check
    let Some(value) = args.get(name) else {
        return Ok(());
    };

    let violation = |detail: String| ValidationError::ConstraintViolated {
        name: name.to_string(),
        detail,
    };

    match constraint {
        Constraint::Range { min, max, .. } => {
            let n = value
                .as_f64()
                .ok_or_else(|| violation("range applies to numbers only".to_string()))?;
            if let Some(min) = min
                && n < *min
            {
                return Err(violation(format!("{} is below minimum {}", n, min)));
            }
            if let Some(max) = max
                && n > *max
            {
                return Err(violation(format!("{} is above maximum {}", n, max)));
            }
        }
        Constraint::Length { min, max, .. } => {
            let len = value
                .length()
                .ok_or_else(|| violation("length applies to strings, arrays and objects".to_string()))?;
            if let Some(min) = min
                && len < *min
            {
                return Err(violation(format!("length {} is below minimum {}", len, min)));
            }
            if let Some(max) = max
                && len > *max
            {
                return Err(violation(format!("length {} is above maximum {}", len, max)));
            }
        }
        Constraint::OneOf { values, .. } => {
            let json = value.to_json();
            if !values.iter().any(|allowed| allowed == &json) {
                return Err(violation(format!("{} is not an allowed value", json)));
            }
        }
        Constraint::OutputSize { .. } => {}
    }

    Ok(())
}
