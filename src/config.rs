//! Embed configuration: raw options, validation and defaults

use bevy::math::Vec2;
use serde::Serialize;
use thiserror::Error;

use crate::platform::Platform;

/// Target content width when none is given
pub const DEFAULT_WIDTH: f32 = 800.0;
/// Target content height when none is given
pub const DEFAULT_HEIGHT: f32 = 450.0;
/// Container aspect ratio when none is given
pub const DEFAULT_ASPECT: &str = "16 / 9";

/// Color theme handed to the container styles and the content generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    /// Accent color, also used for the inline border
    pub red: String,
    /// Secondary accent
    pub gold: String,
    /// Dark accent, also used for the inline shadow
    pub navy: String,
    /// Container background
    pub bg: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            red: "#800020".to_string(),
            gold: "#b8860b".to_string(),
            navy: "#002b5c".to_string(),
            bg: "#f9f7f5".to_string(),
        }
    }
}

/// Per-field theme overrides; unset fields keep the default color
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeOverrides {
    /// Replaces [`Theme::red`]
    pub red: Option<String>,
    /// Replaces [`Theme::gold`]
    pub gold: Option<String>,
    /// Replaces [`Theme::navy`]
    pub navy: Option<String>,
    /// Replaces [`Theme::bg`]
    pub bg: Option<String>,
}

impl Theme {
    /// Apply overrides on top of this theme
    pub fn with_overrides(mut self, overrides: &ThemeOverrides) -> Self {
        let fields = [
            (&mut self.red, &overrides.red),
            (&mut self.gold, &overrides.gold),
            (&mut self.navy, &overrides.navy),
            (&mut self.bg, &overrides.bg),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        self
    }
}

/// Context passed to the content generator
///
/// Serializes with the keys a JavaScript generator expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedContext {
    /// Container element identifier
    pub id: String,
    /// Target content width in CSS pixels
    pub width: f32,
    /// Target content height in CSS pixels
    pub height: f32,
    /// Container aspect ratio
    pub aspect: String,
    /// Resolved colors
    pub theme: Theme,
    /// Running on the iOS class
    #[serde(rename = "isIOS")]
    pub is_ios: bool,
    /// Running on a mobile device
    #[serde(rename = "isMobile")]
    pub is_mobile: bool,
}

/// Produces the frame document: `(is_standalone, context) -> html`
pub type ContentGenerator = Box<dyn Fn(bool, &EmbedContext) -> String>;

/// Configuration errors, reported before anything touches the document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No identifier, or an empty one
    #[error("options.id is required")]
    MissingId,
    /// No content generator
    #[error("options.htmlGenerator must be a function")]
    MissingGenerator,
}

/// Raw options as supplied by the embedding page
///
/// Every field is optional here; [`EmbedOptions::validate`] turns them into an
/// immutable [`EmbedConfig`].
#[derive(Default)]
pub struct EmbedOptions {
    /// Id of the container element
    pub id: Option<String>,
    /// Target content width, 800 when unset
    pub width: Option<f32>,
    /// Target content height, 450 when unset
    pub height: Option<f32>,
    /// Container aspect ratio, `16 / 9` when unset
    pub aspect: Option<String>,
    /// Theme colors to replace
    pub theme: ThemeOverrides,
    /// Content generator
    pub generator: Option<ContentGenerator>,
}

impl EmbedOptions {
    /// Options for the container with the given identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Set the target content size
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the container aspect ratio, e.g. `"4 / 3"`
    pub fn with_aspect(mut self, aspect: impl Into<String>) -> Self {
        self.aspect = Some(aspect.into());
        self
    }

    /// Override theme colors
    pub fn with_theme(mut self, theme: ThemeOverrides) -> Self {
        self.theme = theme;
        self
    }

    /// Set the content generator
    pub fn with_generator(
        mut self,
        generator: impl Fn(bool, &EmbedContext) -> String + 'static,
    ) -> Self {
        self.generator = Some(Box::new(generator));
        self
    }

    /// Check required fields and fill in defaults
    pub fn validate(self) -> Result<(EmbedConfig, ContentGenerator), ConfigError> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingId)?;
        let generator = self.generator.ok_or(ConfigError::MissingGenerator)?;

        let config = EmbedConfig {
            width: dimension_or_default(&id, "width", self.width, DEFAULT_WIDTH),
            height: dimension_or_default(&id, "height", self.height, DEFAULT_HEIGHT),
            aspect: self
                .aspect
                .filter(|aspect| !aspect.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ASPECT.to_string()),
            theme: Theme::default().with_overrides(&self.theme),
            id,
        };
        Ok((config, generator))
    }
}

/// Identifier text for a numeric `id` option
///
/// Zero and NaN are falsy on the page and count as no identifier.
pub fn id_from_number(value: f64) -> Option<String> {
    (value != 0.0 && !value.is_nan()).then(|| value.to_string())
}

fn dimension_or_default(id: &str, name: &str, value: Option<f32>, default: f32) -> f32 {
    match value {
        Some(value) if value.is_finite() && value > 0.0 => value,
        Some(value) => {
            log::warn!("[{id}] ignoring {name} {value}, using {default}");
            default
        }
        None => default,
    }
}

/// Validated, immutable embed configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedConfig {
    id: String,
    width: f32,
    height: f32,
    aspect: String,
    theme: Theme,
}

impl EmbedConfig {
    /// Container element identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target content width in CSS pixels
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Target content height in CSS pixels
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Target content size in CSS pixels
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Container aspect ratio
    pub fn aspect(&self) -> &str {
        &self.aspect
    }

    /// Resolved colors
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Generator context for this configuration on the given platform
    pub fn context(&self, platform: Platform) -> EmbedContext {
        EmbedContext {
            id: self.id.clone(),
            width: self.width,
            height: self.height,
            aspect: self.aspect.clone(),
            theme: self.theme.clone(),
            is_ios: platform.is_ios,
            is_mobile: platform.is_mobile,
        }
    }
}
