// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::fmt;

/// Asset runtime error type
///
/// Every variant owns its data so errors can be moved between the worker
/// thread and the main thread inside job payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetError {
    /// Asset file not found in any root data directory
    NotFound(String),

    /// IO error (file operations, etc.)
    Io(String),

    /// Worker-side decode failed
    Decode { key: String, reason: String },

    /// Main-thread finalize rejected the decoded data
    Finalize { key: String, reason: String },

    /// Resource id no longer refers to a live resource (double release)
    StaleResource,

    /// A second live resource was about to be cached under the same key
    AlreadyCached { type_tag: &'static str, key: String },

    /// Another asset store already serves this type tag
    TypeTagInUse(&'static str),

    /// Invalid runtime configuration
    Config(String),

    /// Job was canceled before its work function ran
    Canceled,
}

impl AssetError {
    /// Shorthand for a decode failure
    pub fn decode(key: impl Into<String>, reason: impl fmt::Display) -> Self {
        AssetError::Decode {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a finalize failure
    pub fn finalize(key: impl Into<String>, reason: impl fmt::Display) -> Self {
        AssetError::Finalize {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound(name) => write!(f, "Asset not found: {name}"),
            AssetError::Io(msg) => write!(f, "IO error: {msg}"),
            AssetError::Decode { key, reason } => write!(f, "Failed to decode {key}: {reason}"),
            AssetError::Finalize { key, reason } => {
                write!(f, "Failed to finalize {key}: {reason}")
            }
            AssetError::StaleResource => write!(f, "Resource id is stale (already released)"),
            AssetError::AlreadyCached { type_tag, key } => {
                write!(f, "A live {type_tag} resource '{key}' is already cached")
            }
            AssetError::TypeTagInUse(tag) => write!(f, "Type tag already registered: {tag}"),
            AssetError::Config(msg) => write!(f, "Config error: {msg}"),
            AssetError::Canceled => write!(f, "Job was canceled"),
        }
    }
}

impl std::error::Error for AssetError {}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(err: serde_json::Error) -> Self {
        AssetError::Config(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AssetError::decode("hero.png", "truncated header");
        assert_eq!(err.to_string(), "Failed to decode hero.png: truncated header");
        assert_eq!(AssetError::NotFound("a.wav".into()).to_string(), "Asset not found: a.wav");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AssetError = io.into();
        assert!(matches!(err, AssetError::Io(_)));
    }
}
