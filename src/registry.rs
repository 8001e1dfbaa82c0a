//! Token Registry: static token -> hostname mapping, loaded once at startup.
//! Read-only for the rest of the process lifetime, shared via Arc.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

// ========================================
// ERRORS
// ========================================

#[derive(Debug)]
pub enum RegistryError {
    Io(std::io::Error),
    /// A non-comment line did not split into exactly `<token> <hostname>`.
    Malformed { line: usize, content: String },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Io(e) => write!(f, "cannot read token file: {}", e),
            RegistryError::Malformed { line, content } => {
                write!(f, "malformed token file line {}: {:?} (expected '<token> <hostname>')", line, content)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<std::io::Error> for RegistryError {
    fn from(error: std::io::Error) -> Self {
        RegistryError::Io(error)
    }
}

// ========================================
// REGISTRY
// ========================================

#[derive(Debug)]
pub struct TokenRegistry {
    tokens: HashMap<String, String>,
}

impl TokenRegistry {
    /// Load the registry from a token file: one `<token> <hostname>` per line,
    /// blank lines and `#` comments skipped. Any malformed line is fatal so the
    /// process never serves with a partial registry. Duplicate tokens: last wins.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, RegistryError> {
        let mut tokens = HashMap::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(token), Some(hostname), None) => {
                    tokens.insert(token.to_string(), hostname.to_string());
                }
                _ => {
                    return Err(RegistryError::Malformed {
                        line: idx + 1,
                        content: line.to_string(),
                    });
                }
            }
        }
        Ok(Self { tokens })
    }

    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
