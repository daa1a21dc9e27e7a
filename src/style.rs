//! CSS presets for the container, the scaling wrapper and the frame

use crate::config::EmbedConfig;

/// Viewport width below which the inline container turns fluid
pub const RESPONSIVE_BREAKPOINT_PX: u32 = 600;

/// Frame `sandbox` attribute
pub const FRAME_SANDBOX: &str =
    "allow-scripts allow-same-origin allow-pointer-lock allow-modals allow-popups";

/// Frame `allow` attribute
pub const FRAME_ALLOW: &str = "fullscreen; clipboard-read; clipboard-write";

/// Frame base style
pub const FRAME_CSS: &str = "width:100%;height:100%;border:none;border-radius:16px;background:#fff";

const FULLSCREEN_CSS: &str = "position:fixed;top:0;left:0;width:100vw;height:100vh;height:100dvh;\
margin:0;border-radius:0;z-index:99999;background:#000;border:none;box-shadow:none;\
display:flex;justify-content:center;align-items:center;overflow:hidden;\
padding:env(safe-area-inset-top) env(safe-area-inset-right) env(safe-area-inset-bottom) env(safe-area-inset-left)";

/// The two mutually exclusive container presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerPreset {
    /// Fixed box with rounded corners and shadow
    Inline,
    /// Pinned to the viewport, no decoration
    Fullscreen,
}

impl ContainerPreset {
    /// Preset for the given state
    pub fn for_fullscreen(fullscreen: bool) -> Self {
        if fullscreen {
            Self::Fullscreen
        } else {
            Self::Inline
        }
    }

    /// Full `cssText` for the container
    pub fn css(self, config: &EmbedConfig) -> String {
        match self {
            Self::Inline => {
                let theme = config.theme();
                format!(
                    "width:{w}px;max-width:100%;height:{h}px;margin:20px auto;display:flex;\
                     justify-content:center;align-items:center;position:relative;border-radius:16px;\
                     border:1px solid {red}26;box-shadow:0 10px 30px {navy}26;overflow:hidden;\
                     background:{bg};aspect-ratio:{aspect}",
                    w = config.width(),
                    h = config.height(),
                    red = theme.red,
                    navy = theme.navy,
                    bg = theme.bg,
                    aspect = config.aspect(),
                )
            }
            Self::Fullscreen => FULLSCREEN_CSS.to_string(),
        }
    }
}

/// Element id of the per-identifier responsive stylesheet
pub fn stylesheet_id(id: &str) -> String {
    format!("style-{id}")
}

/// Stylesheet making the inline container fluid on narrow viewports
pub fn responsive_rule(config: &EmbedConfig) -> String {
    format!(
        "@media (max-width: {RESPONSIVE_BREAKPOINT_PX}px) {{ #{id} {{ width: 100% !important; \
         height: auto !important; aspect-ratio: {aspect}; }} }}",
        id = config.id(),
        aspect = config.aspect(),
    )
}

/// Style of the wrapper that carries the scale transform
pub fn wrapper_css(config: &EmbedConfig) -> String {
    format!(
        "width:{}px;height:{}px;position:relative;transform-origin:center;\
         transition:transform .3s ease;flex-shrink:0",
        config.width(),
        config.height(),
    )
}

/// `transform` value for a scale factor
pub fn scale_transform(scale: f32) -> String {
    format!("scale({scale})")
}

/// CSS pixel length
pub fn px(value: f32) -> String {
    format!("{value}px")
}

/// Frame decoration swapped on every fullscreen transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDecoration {
    /// Frame `box-shadow`
    pub box_shadow: &'static str,
    /// Frame `border-radius`
    pub border_radius: &'static str,
}

impl FrameDecoration {
    /// Decoration for the given state
    pub fn for_fullscreen(fullscreen: bool) -> Self {
        if fullscreen {
            Self {
                box_shadow: "0 0 60px rgba(0,0,0,.4)",
                border_radius: "0",
            }
        } else {
            Self {
                box_shadow: "none",
                border_radius: "16px",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbedContext, EmbedOptions, ThemeOverrides};

    fn config() -> EmbedConfig {
        EmbedOptions::new("demo")
            .with_theme(ThemeOverrides {
                red: Some("#aa0000".to_string()),
                ..Default::default()
            })
            .with_generator(|_: bool, _: &EmbedContext| String::new())
            .validate()
            .unwrap()
            .0
    }

    #[test]
    fn inline_preset_uses_size_theme_and_aspect() {
        let css = ContainerPreset::Inline.css(&config());

        assert!(css.starts_with("width:800px;max-width:100%;height:450px;"));
        assert!(css.contains("border:1px solid #aa000026"));
        assert!(css.contains("box-shadow:0 10px 30px #002b5c26"));
        assert!(css.ends_with("aspect-ratio:16 / 9"));
    }

    #[test]
    fn fullscreen_preset_is_undecorated_and_safe_area_aware() {
        let css = ContainerPreset::Fullscreen.css(&config());

        assert!(css.contains("position:fixed"));
        assert!(css.contains("box-shadow:none"));
        assert!(css.contains("env(safe-area-inset-left)"));
        assert_ne!(css, ContainerPreset::Inline.css(&config()));
    }

    #[test]
    fn responsive_rule_targets_identifier() {
        let rule = responsive_rule(&config());

        assert!(rule.starts_with("@media (max-width: 600px)"));
        assert!(rule.contains("#demo {"));
        assert!(rule.contains("aspect-ratio: 16 / 9;"));
        assert_eq!(stylesheet_id("demo"), "style-demo");
    }

    #[test]
    fn numbers_format_like_css() {
        assert_eq!(scale_transform(1.0), "scale(1)");
        assert_eq!(scale_transform(0.5), "scale(0.5)");
        assert_eq!(px(225.0), "225px");
    }
}
