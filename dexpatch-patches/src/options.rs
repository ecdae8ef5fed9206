use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};

/// Which register receives the forced constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterSource {
    /// The call site's result register (`regC` or the range start).
    #[default]
    CallSite,
    /// The destination of the capture instruction itself.
    Capture,
}

/// Tunables for the patch run, loaded from YAML.
///
/// ```yaml
/// lookahead: 16
/// register_source: call_site
/// enabled: [Hide mock location]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchOptions {
    /// Instructions scanned after a call site for its capture.
    pub lookahead: usize,
    pub register_source: RegisterSource,
    /// Patches to run besides those enabled by default.
    pub enabled: Vec<String>,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            lookahead: 16,
            register_source: RegisterSource::CallSite,
            enabled: Vec::new(),
        }
    }
}

impl PatchOptions {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PatchError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let options = PatchOptions::from_yaml("register_source: capture\n").unwrap();
        assert_eq!(options.lookahead, 16);
        assert_eq!(options.register_source, RegisterSource::Capture);
        assert!(options.enabled.is_empty());
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(PatchOptions::from_yaml("register_source: guess\n").is_err());
    }
}
