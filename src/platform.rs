//! Platform capability descriptor injected into the embed app

use bevy::ecs::resource::Resource;

/// Device class used to pick the scaling regime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Phones and tablets: inline embeds shrink to fit
    Mobile,
    /// Everything else: inline embeds keep their configured size
    Desktop,
}

/// What the host platform can do
///
/// The controller never sniffs the environment itself. The host detects the
/// platform once and inserts this resource, which keeps the scaling and
/// fullscreen logic testable without a browser.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Platform {
    /// iOS-like platform: no native fullscreen from inside a frame
    pub is_ios: bool,
    /// Mobile device class
    pub is_mobile: bool,
}

impl Platform {
    /// Desktop browser
    pub const DESKTOP: Self = Self {
        is_ios: false,
        is_mobile: false,
    };

    /// Generic mobile browser (Android and friends)
    pub const MOBILE: Self = Self {
        is_ios: false,
        is_mobile: true,
    };

    /// iOS browser
    pub const IOS: Self = Self {
        is_ios: true,
        is_mobile: true,
    };

    /// Classify a browser user agent string
    pub fn from_user_agent(user_agent: &str) -> Self {
        let is_ios = ["iPad", "iPhone", "iPod"]
            .iter()
            .any(|needle| user_agent.contains(needle));
        let lowered = user_agent.to_ascii_lowercase();
        let is_mobile = is_ios || lowered.contains("mobi") || lowered.contains("android");
        Self { is_ios, is_mobile }
    }

    /// Device class for the scaling regime
    pub fn device_class(&self) -> DeviceClass {
        if self.is_mobile {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    /// Whether the frame may ask the host for fullscreen
    ///
    /// On iOS the embedded content opens its standalone variant in a separate
    /// top-level view instead.
    pub fn supports_in_frame_fullscreen(&self) -> bool {
        !self.is_ios
    }

    /// Whether the standalone-variant resource should be prepared
    pub fn needs_standalone_fallback(&self) -> bool {
        self.is_ios
    }
}
