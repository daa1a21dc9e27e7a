//! Scale computation for the content wrapper

use bevy::math::Vec2;

use crate::platform::DeviceClass;

/// Space kept free below an inline mobile embed
pub const BOTTOM_MARGIN: f32 = 24.0;

/// Host viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// `innerWidth`
    pub width: f32,
    /// `innerHeight`
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Container bounding box, relative to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerRect {
    /// Distance from the top of the viewport
    pub top: f32,
    /// Rendered width, zero when the container is not laid out
    pub width: f32,
}

/// Which rule produced the scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleRegime {
    /// Fit the viewport
    Fullscreen,
    /// Keep the configured size
    Desktop,
    /// Shrink to the container and the space below it
    Mobile,
}

/// Result of one scale computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleOutcome {
    /// Rule that produced the scale
    pub regime: ScaleRegime,
    /// Factor applied to the wrapper transform, always finite and positive
    pub scale: f32,
    /// Height the container is given, in CSS pixels
    pub container_height: f32,
}

/// Compute the wrapper scale for a target content size
///
/// Regimes are evaluated in priority order: fullscreen fits the viewport,
/// desktop inline embeds never scale, mobile inline embeds shrink to the
/// container width and to the vertical space left below the container.
pub fn compute_scale(
    target: Vec2,
    fullscreen: bool,
    device: DeviceClass,
    viewport: Viewport,
    container: ContainerRect,
) -> ScaleOutcome {
    if fullscreen {
        let scale = sanitize((viewport.width / target.x).min(viewport.height / target.y));
        return ScaleOutcome {
            regime: ScaleRegime::Fullscreen,
            scale,
            container_height: viewport.height,
        };
    }

    if device == DeviceClass::Desktop {
        return ScaleOutcome {
            regime: ScaleRegime::Desktop,
            scale: 1.0,
            container_height: target.y,
        };
    }

    let available_width = if container.width > 0.0 {
        container.width
    } else {
        viewport.width
    };
    let available_height = (viewport.height - container.top - BOTTOM_MARGIN).max(0.0);

    let mut scale = if available_width > 0.0 {
        available_width / target.x
    } else {
        1.0
    };
    // No room left below the container: fit the width only.
    if available_height > 0.0 {
        scale = scale.min(available_height / target.y);
    }
    let scale = sanitize(scale.min(1.0));

    ScaleOutcome {
        regime: ScaleRegime::Mobile,
        scale,
        container_height: target.y * scale,
    }
}

fn sanitize(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}
