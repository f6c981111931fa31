//! Key and value limits for memory operations

use serde_json::Value;

use crate::core::error::RuntimeError;

pub const DEFAULT_MAX_KEY_LENGTH: usize = 256;
pub const DEFAULT_MAX_VALUE_BYTES: usize = 1024 * 1024;

/// Limits applied to every memory write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLimits {
    pub max_key_length: usize,
    pub max_value_bytes: usize,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

impl MemoryLimits {
    pub fn check_key(&self, key: &str) -> Result<(), RuntimeError> {
        if key.trim().is_empty() {
            return Err(RuntimeError::MemoryValidation(
                "key cannot be empty".to_string(),
            ));
        }
        if key.len() > self.max_key_length {
            return Err(RuntimeError::MemoryValidation(format!(
                "key is {} bytes, limit is {}",
                key.len(),
                self.max_key_length
            )));
        }
        if key.chars().any(char::is_control) {
            return Err(RuntimeError::MemoryValidation(
                "key cannot contain control characters".to_string(),
            ));
        }
        Ok(())
    }

    pub fn check_value(&self, value: &Value) -> Result<(), RuntimeError> {
        let size = serde_json::to_vec(value)
            .map_err(|e| RuntimeError::MemoryValidation(e.to_string()))?
            .len();
        if size > self.max_value_bytes {
            return Err(RuntimeError::MemoryValidation(format!(
                "value is {} bytes, limit is {}",
                size, self.max_value_bytes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_rules() {
        let limits = MemoryLimits {
            max_key_length: 8,
            ..Default::default()
        };
        assert!(limits.check_key("notes").is_ok());
        assert!(limits.check_key("").is_err());
        assert!(limits.check_key("   ").is_err());
        assert!(limits.check_key("way-too-long").is_err());
        assert!(limits.check_key("a\nb").is_err());
    }

    #[test]
    fn test_value_size() {
        let limits = MemoryLimits {
            max_value_bytes: 10,
            ..Default::default()
        };
        assert!(limits.check_value(&json!("short")).is_ok());
        let err = limits.check_value(&json!("this is longer")).unwrap_err();
        assert!(err.to_string().contains("limit is 10"));
    }
}
