use crate::formats::TextEncoding;
use crate::scene::{ModelBounds, SceneLoadRequest};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_data_root")]
    pub data_root: PathBuf,
    #[serde(default = "EditorConfig::default_text_encoding")]
    pub text_encoding: String,
    #[serde(default = "EditorConfig::default_fallback_model_extent")]
    pub fallback_model_extent: f32,
    #[serde(default)]
    pub zone: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct EditorConfigOverrides {
    pub data_root: Option<PathBuf>,
    pub text_encoding: Option<String>,
    pub zone: Option<PathBuf>,
}

impl EditorConfig {
    fn default_data_root() -> PathBuf {
        PathBuf::from(".")
    }

    fn default_text_encoding() -> String {
        "euc-kr".to_string()
    }

    const fn default_fallback_model_extent() -> f32 {
        1.0
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &EditorConfigOverrides) {
        if let Some(data_root) = &overrides.data_root {
            self.data_root = data_root.clone();
        }
        if let Some(encoding) = &overrides.text_encoding {
            self.text_encoding = encoding.clone();
        }
        if let Some(zone) = &overrides.zone {
            self.zone = Some(zone.clone());
        }
    }

    pub fn encoding(&self) -> Result<TextEncoding> {
        TextEncoding::for_label(&self.text_encoding)
            .ok_or_else(|| anyhow!("Unknown text encoding '{}'", self.text_encoding))
    }

    pub fn model_bounds(&self) -> ModelBounds {
        ModelBounds::new(self.fallback_model_extent)
    }

    /// Paths are taken relative to `data_root` unless absolute.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.data_root.join(path)
    }

    pub fn scene_request(&self, map_dir: impl AsRef<Path>) -> Result<SceneLoadRequest> {
        let mut request = SceneLoadRequest::new(self.resolve(map_dir)).with_encoding(self.encoding()?);
        if let Some(zone) = &self.zone {
            request = request.with_zone(self.resolve(zone));
        }
        Ok(request)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data_root: Self::default_data_root(),
            text_encoding: Self::default_text_encoding(),
            fallback_model_extent: Self::default_fallback_model_extent(),
            zone: None,
        }
    }
}

impl EditorConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.data_root.is_none() && self.text_encoding.is_none() && self.zone.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.data_root.is_some() {
            fields.push("data_root");
        }
        if self.text_encoding.is_some() {
            fields.push("text_encoding");
        }
        if self.zone.is_some() {
            fields.push("zone");
        }
        fields
    }
}
