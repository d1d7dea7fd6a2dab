//! User-tunable settings for the touch client.
//!
//! The TOML layout mirrors the dotted paths the settings store exposes
//! (`cursor.speed`, `scroll.natural`, `connection.port`, ...).  Every field
//! has a default so a partial or missing file still yields a usable
//! configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Speed value that maps to a 1.0 multiplier.
pub const NEUTRAL_SPEED: f64 = 5.0;

/// All client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default)]
    pub cursor: PointerSettings,
    #[serde(default)]
    pub scroll: ScrollSettings,
    #[serde(default)]
    pub haptics: HapticSettings,
}

/// Where the server lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Pointer speed and acceleration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerSettings {
    /// 1–10; 5 is neutral.
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub acceleration: Acceleration,
}

/// Scroll speed, acceleration, inertia, and direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollSettings {
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub acceleration: Acceleration,
    #[serde(default = "default_true")]
    pub inertia: bool,
    /// Content follows the fingers (deltas are negated).
    #[serde(default = "default_true")]
    pub natural: bool,
}

/// Vibration feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HapticSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 1–10; scales the vibration length.
    #[serde(default = "default_haptic_strength")]
    pub strength: u32,
}

/// Acceleration tier; each tier is a fixed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Acceleration {
    Low,
    #[default]
    Medium,
    High,
}

impl Acceleration {
    pub fn factor(&self) -> f64 {
        match self {
            Self::Low => 1.2,
            Self::Medium => 1.5,
            Self::High => 2.0,
        }
    }
}

/// Intensity requested by the trackpad for a feedback pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticStrength {
    Light,
    Medium,
    Heavy,
}

impl HapticStrength {
    /// Vibration length for this intensity at the configured `strength`.
    pub fn duration(&self, strength: u32) -> Duration {
        let per_step = match self {
            Self::Light => 2,
            Self::Medium => 5,
            Self::Heavy => 10,
        };
        Duration::from_millis(u64::from(strength) * per_step)
    }
}

/// Combined multiplier for a speed setting and an acceleration tier.
///
/// A non-finite or non-positive speed falls back to neutral.
pub fn multiplier(speed: f64, acceleration: Acceleration) -> f64 {
    let speed = if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        NEUTRAL_SPEED
    };
    speed / NEUTRAL_SPEED * acceleration.factor()
}

impl PointerSettings {
    pub fn multiplier(&self) -> f64 {
        multiplier(self.speed, self.acceleration)
    }
}

impl ScrollSettings {
    /// Multiplier including the natural-scrolling sign flip.
    pub fn multiplier(&self) -> f64 {
        let sign = if self.natural { -1.0 } else { 1.0 };
        multiplier(self.speed, self.acceleration) * sign
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_speed() -> f64 {
    NEUTRAL_SPEED
}
fn default_true() -> bool {
    true
}
fn default_haptic_strength() -> u32 {
    5
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            acceleration: Acceleration::default(),
        }
    }
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            acceleration: Acceleration::default(),
            inertia: default_true(),
            natural: default_true(),
        }
    }
}

impl Default for HapticSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            strength: default_haptic_strength(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_match_shipped_values() {
        // Arrange / Act
        let s = Settings::default();

        // Assert
        assert_eq!(s.connection.port, 8080);
        assert_eq!(s.cursor.speed, 5.0);
        assert_eq!(s.cursor.acceleration, Acceleration::Medium);
        assert!(s.scroll.inertia);
        assert!(s.scroll.natural);
        assert!(s.haptics.enabled);
    }

    #[test]
    fn test_acceleration_factors() {
        assert_eq!(Acceleration::Low.factor(), 1.2);
        assert_eq!(Acceleration::Medium.factor(), 1.5);
        assert_eq!(Acceleration::High.factor(), 2.0);
    }

    #[test]
    fn test_pointer_multiplier_at_neutral_speed_is_tier_factor() {
        let p = PointerSettings::default();
        assert!((p.multiplier() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_scroll_multiplier_is_negated_when_natural() {
        // Arrange
        let mut s = ScrollSettings {
            speed: 10.0,
            acceleration: Acceleration::High,
            inertia: true,
            natural: true,
        };

        // Act / Assert
        assert!((s.multiplier() + 4.0).abs() < 1e-12);
        s.natural = false;
        assert!((s.multiplier() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_speed_falls_back_to_neutral() {
        assert!((multiplier(f64::NAN, Acceleration::Low) - 1.2).abs() < 1e-12);
        assert!((multiplier(0.0, Acceleration::Low) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_haptic_duration_scales_with_strength() {
        assert_eq!(HapticStrength::Light.duration(5), Duration::from_millis(10));
        assert_eq!(HapticStrength::Medium.duration(5), Duration::from_millis(25));
        assert_eq!(HapticStrength::Heavy.duration(3), Duration::from_millis(30));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let s: Settings = toml::from_str("[scroll]\nnatural = false\n").unwrap();
        assert!(!s.scroll.natural);
        assert!(s.scroll.inertia);
        assert_eq!(s.cursor.acceleration, Acceleration::Medium);
    }
}
