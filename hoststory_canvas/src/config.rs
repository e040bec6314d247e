// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform configuration, resolved once and passed down.
//!
//! Several parts of the bridge only exist on some hosts: the key consumption
//! fix-up, custom cursor bridging, gesture synthesis and the way a scene's
//! canvas is found. [`BridgeConfig::for_profile`] maps a [`PlatformProfile`]
//! onto those switches; every switch can also be set on its own.

use hoststory_event_state::gesture::GestureConfig;
use hoststory_responder::throttle::RedrawConfig;

/// Operating system family of the host toolkit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostOs {
    /// Linux and other X11/Wayland hosts.
    Linux,
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
    /// Anything else.
    Other,
}

impl HostOs {
    /// The family this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(any(target_os = "linux", target_os = "freebsd")) {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// What the bridge runs on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlatformProfile {
    /// Host operating system.
    pub os: HostOs,
    /// `true` for the older embedding generation, which lacks native gesture
    /// forwarding, custom cursors and the scene → canvas accessor.
    pub legacy_embedding: bool,
}

impl PlatformProfile {
    /// Profile of the compilation target.
    pub fn current(legacy_embedding: bool) -> Self {
        Self {
            os: HostOs::current(),
            legacy_embedding,
        }
    }
}

/// How to find the canvas embedding a scene.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CanvasLookup {
    /// Ask the scene.
    #[default]
    Direct,
    /// Walk scene → stage peer → host widget.
    FieldWalk,
}

/// Every platform switch of the bridge.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BridgeConfig {
    /// Gesture and wheel constants.
    pub gesture: GestureConfig,
    /// Forced repaint settings.
    pub redraw: RedrawConfig,
    /// Route key events through the reconciliation queue and mark scene key
    /// events consumed when the native original was vetoed.
    pub reconcile_key_consumption: bool,
    /// Install custom image cursors natively.
    pub bridge_image_cursors: bool,
    /// Translate native gestures and wheel ticks into scene gestures.
    pub synthesize_gestures: bool,
    /// Scene → canvas lookup strategy.
    pub canvas_lookup: CanvasLookup,
}

impl Default for BridgeConfig {
    /// Current embeddings: the scene handles all of this itself.
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            redraw: RedrawConfig::default(),
            reconcile_key_consumption: false,
            bridge_image_cursors: false,
            synthesize_gestures: false,
            canvas_lookup: CanvasLookup::Direct,
        }
    }
}

impl BridgeConfig {
    /// Resolve the switches for `profile`.
    pub fn for_profile(profile: PlatformProfile) -> Self {
        let legacy = profile.legacy_embedding;
        let legacy_mac = legacy && profile.os == HostOs::MacOs;
        Self {
            gesture: if legacy_mac {
                GestureConfig::legacy()
            } else {
                GestureConfig::default()
            },
            redraw: RedrawConfig {
                flush_after_repaint: profile.os == HostOs::Linux,
                ..RedrawConfig::default()
            },
            reconcile_key_consumption: legacy_mac,
            bridge_image_cursors: legacy,
            synthesize_gestures: legacy,
            canvas_lookup: if legacy {
                CanvasLookup::FieldWalk
            } else {
                CanvasLookup::Direct
            },
        }
    }

    /// Replace the gesture constants.
    #[must_use]
    pub fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    /// Replace the redraw settings.
    #[must_use]
    pub fn with_redraw(mut self, redraw: RedrawConfig) -> Self {
        self.redraw = redraw;
        self
    }

    /// Toggle key consumption reconciliation.
    #[must_use]
    pub fn with_key_reconciliation(mut self, enabled: bool) -> Self {
        self.reconcile_key_consumption = enabled;
        self
    }

    /// Toggle custom cursor bridging.
    #[must_use]
    pub fn with_image_cursors(mut self, enabled: bool) -> Self {
        self.bridge_image_cursors = enabled;
        self
    }

    /// Toggle gesture synthesis.
    #[must_use]
    pub fn with_gesture_synthesis(mut self, enabled: bool) -> Self {
        self.synthesize_gestures = enabled;
        self
    }

    /// Choose the scene → canvas lookup.
    #[must_use]
    pub fn with_canvas_lookup(mut self, lookup: CanvasLookup) -> Self {
        self.canvas_lookup = lookup;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_mac_enables_everything() {
        let config = BridgeConfig::for_profile(PlatformProfile {
            os: HostOs::MacOs,
            legacy_embedding: true,
        });
        assert_eq!(
            config.gesture.pan_scroll_multiplier,
            GestureConfig::LEGACY_PAN_SCROLL_MULTIPLIER
        );
        assert!(config.reconcile_key_consumption);
        assert!(config.bridge_image_cursors);
        assert!(config.synthesize_gestures);
        assert_eq!(config.canvas_lookup, CanvasLookup::FieldWalk);
        assert!(!config.redraw.flush_after_repaint);
    }

    #[test]
    fn legacy_linux_keeps_pan_sign_and_flushes() {
        let config = BridgeConfig::for_profile(PlatformProfile {
            os: HostOs::Linux,
            legacy_embedding: true,
        });
        assert_eq!(config.gesture, GestureConfig::default());
        assert!(!config.reconcile_key_consumption);
        assert!(config.synthesize_gestures);
        assert!(config.redraw.flush_after_repaint);
    }

    #[test]
    fn current_embedding_matches_default_switches() {
        let config = BridgeConfig::for_profile(PlatformProfile {
            os: HostOs::Windows,
            legacy_embedding: false,
        });
        assert_eq!(config, BridgeConfig::default());
        let custom = config
            .with_gesture_synthesis(true)
            .with_canvas_lookup(CanvasLookup::FieldWalk);
        assert!(custom.synthesize_gestures);
        assert_eq!(custom.canvas_lookup, CanvasLookup::FieldWalk);
    }
}
