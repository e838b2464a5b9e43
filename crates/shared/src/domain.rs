use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    #[default]
    Resize,
    Compress,
    Convert,
    Analyze,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Resize,
        Operation::Compress,
        Operation::Convert,
        Operation::Analyze,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Resize => "resize",
            Operation::Compress => "compress",
            Operation::Convert => "convert",
            Operation::Analyze => "analyze",
        }
    }
}

/// Declared image format. Used both for the source image type and the
/// conversion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Jpeg,
    Png,
}

impl ImageType {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Jpeg => "jpeg",
            ImageType::Png => "png",
        }
    }

    /// Infers the type from a file extension. Returns `None` for anything that
    /// is not a jpeg or png.
    pub fn from_path(path: &Path) -> Option<Self> {
        let mime = mime_guess::from_path(path).first()?;
        if mime.type_() != mime_guess::mime::IMAGE {
            return None;
        }
        match mime.subtype().as_str() {
            "jpeg" => Some(ImageType::Jpeg),
            "png" => Some(ImageType::Png),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for Operation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                kind: "operation",
                value: s.to_string(),
            })
    }
}

impl FromStr for ImageType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageType::Jpeg),
            "png" => Ok(ImageType::Png),
            _ => Err(ParseEnumError {
                kind: "image type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
