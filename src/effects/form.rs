//! Form documents the reactor writes into
//!
//! `YamlForm` stands in for the console's form state: a YAML mapping whose
//! fields are addressed with dot notation. It can live purely in memory or
//! be backed by a file that is rewritten after every change.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use super::{EffectError, FormSink};

/// Errors raised while addressing a form field
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Invalid form field path '{0}'")]
    InvalidPath(String),

    #[error("Form field '{0}' is not a mapping")]
    NotAMapping(String),

    #[error("Failed to read form document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write form document {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid form document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// YAML-backed form state
#[derive(Debug, Clone, Default)]
pub struct YamlForm {
    document: Value,
    path: Option<PathBuf>,
}

impl YamlForm {
    /// Empty, in-memory form
    pub fn new() -> Self {
        Self {
            document: Value::Mapping(Mapping::new()),
            path: None,
        }
    }

    /// Form backed by `path`; a missing file starts out empty
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref().to_path_buf();
        let document = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|source| FormError::Read {
                path: path.clone(),
                source,
            })?;
            match serde_yaml::from_str::<Value>(&contents)? {
                Value::Null => Value::Mapping(Mapping::new()),
                value => value,
            }
        } else {
            Value::Mapping(Mapping::new())
        };

        Ok(Self {
            document,
            path: Some(path),
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, FormError> {
        let document = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Null => Value::Mapping(Mapping::new()),
            value => value,
        };
        Ok(Self {
            document,
            path: None,
        })
    }

    /// Read a string field addressed by dot notation
    pub fn get_field(&self, path: &str) -> Option<&str> {
        let mut current = &self.document;
        for segment in path.split('.') {
            current = current.as_mapping()?.get(segment)?;
        }
        current.as_str()
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn to_yaml(&self) -> Result<String, FormError> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    fn insert(&mut self, path: &str, value: &str) -> Result<(), FormError> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(FormError::InvalidPath(path.to_string()));
        }

        if self.document.is_null() {
            self.document = Value::Mapping(Mapping::new());
        }

        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| FormError::InvalidPath(path.to_string()))?;

        let mut current = &mut self.document;
        let mut walked = String::new();
        for segment in parents {
            if !walked.is_empty() {
                walked.push('.');
            }
            walked.push_str(segment);

            let mapping = current
                .as_mapping_mut()
                .ok_or_else(|| FormError::NotAMapping(walked.clone()))?;
            current = mapping
                .entry(Value::String(segment.to_string()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
        }

        let mapping = current.as_mapping_mut().ok_or_else(|| {
            FormError::NotAMapping(if walked.is_empty() {
                "<root>".to_string()
            } else {
                walked
            })
        })?;
        mapping.insert(
            Value::String(last.to_string()),
            Value::String(value.to_string()),
        );
        Ok(())
    }

    fn save(&self) -> Result<(), FormError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| FormError::Write {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        std::fs::write(path, self.to_yaml()?).map_err(|source| FormError::Write {
            path: path.clone(),
            source,
        })
    }
}

impl FormSink for YamlForm {
    fn set_field(&mut self, path: &str, value: &str) -> Result<(), EffectError> {
        self.insert(path, value)?;
        self.save()?;
        tracing::debug!(field = path, value, "form field updated");
        Ok(())
    }
}

/// Prints `path=value` to stdout so the result can be piped into scripts
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintedForm;

impl FormSink for PrintedForm {
    fn set_field(&mut self, path: &str, value: &str) -> Result<(), EffectError> {
        if path.split('.').any(|s| s.trim().is_empty()) {
            return Err(FormError::InvalidPath(path.to_string()).into());
        }
        println!("{}={}", path, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_nested_field() {
        let mut form = YamlForm::new();
        form.set_field("git.authSecret", "secret-abc").unwrap();
        assert_eq!(form.get_field("git.authSecret"), Some("secret-abc"));
    }

    #[test]
    fn test_set_field_keeps_siblings() {
        let mut form = YamlForm::from_yaml("git:\n  url: https://github.com/org/repo\n").unwrap();
        form.set_field("git.authSecret", "secret-abc").unwrap();
        assert_eq!(
            form.get_field("git.url"),
            Some("https://github.com/org/repo")
        );
        assert_eq!(form.get_field("git.authSecret"), Some("secret-abc"));
    }

    #[test]
    fn test_invalid_path() {
        let mut form = YamlForm::new();
        assert!(matches!(
            form.insert("git..authSecret", "x"),
            Err(FormError::InvalidPath(_))
        ));
        assert!(matches!(form.insert("", "x"), Err(FormError::InvalidPath(_))));
    }

    #[test]
    fn test_scalar_parent_is_rejected() {
        let mut form = YamlForm::from_yaml("git: plain\n").unwrap();
        let err = form.insert("git.authSecret", "x").unwrap_err();
        assert!(matches!(err, FormError::NotAMapping(ref p) if p == "git"));
    }

    #[test]
    fn test_printed_form_rejects_bad_path() {
        assert!(PrintedForm.set_field("git.", "x").is_err());
    }
}
