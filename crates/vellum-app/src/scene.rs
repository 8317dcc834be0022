//! Scene files: a render config plus a flat list of positioned elements.
//!
//! ```toml
//! [config]
//! asset_root = "assets"
//! canvas_width = 320
//! canvas_height = 200
//!
//! [[element]]
//! tag = "img"
//! x = 10
//! y = 10
//! attrs = { src = "logo.png", width = "64" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use vellum_replaced::{Element, RenderConfig};

/// A parsed scene.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub config: RenderConfig,
    #[serde(default, rename = "element")]
    pub elements: Vec<SceneElement>,
}

/// One element and where its box goes on the canvas.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneElement {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl SceneElement {
    pub fn to_element(&self) -> Element {
        self.attrs
            .iter()
            .fold(Element::new(&self.tag), |el, (name, value)| el.with_attr(name, value))
    }
}

impl Scene {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid scene")
    }

    /// Read a scene file. A relative `asset_root` is anchored at the
    /// scene's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        let mut scene = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            scene.config.anchor_at(dir);
        }
        Ok(scene)
    }
}
