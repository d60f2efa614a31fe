//! Particle background settings
//!
//! Read from LocalStorage on the web so a page can tune the effect
//! without rebuilding.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::FieldConfig;

/// Tunable parameters for the field and its drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    /// Hard cap on particle count
    pub max_particles: usize,
    /// Surface area (px²) per particle
    pub area_per_particle: f32,

    // === Pointer ===
    /// Distance (px) within which the pointer pulls particles
    pub attraction_radius: f32,
    /// Pull applied at zero distance (px per tick)
    pub attraction_strength: f32,
    /// Draw the rings around the pointer
    pub ripple: bool,

    // === Links ===
    /// Absolute limit on link length (px)
    pub link_distance_cap: f32,
    /// Link length limit as a fraction of surface width
    pub link_distance_fraction: f32,
    /// Alpha of the shortest links
    pub link_max_alpha: f32,
    /// Stroke width of links
    pub link_width: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            area_per_particle: AREA_PER_PARTICLE,

            attraction_radius: ATTRACTION_RADIUS,
            attraction_strength: ATTRACTION_STRENGTH,
            ripple: true,

            link_distance_cap: LINK_DISTANCE_CAP,
            link_distance_fraction: LINK_DISTANCE_FRACTION,
            link_max_alpha: LINK_MAX_ALPHA,
            link_width: LINK_WIDTH,
        }
    }
}

impl Settings {
    /// Parse and validate settings; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject values that would break the count law or the link alpha
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    field,
                    reason: "must be a positive finite number",
                })
            }
        }

        if self.max_particles > PARTICLE_CEILING {
            return Err(SettingsError::Invalid {
                field: "max_particles",
                reason: "must not exceed PARTICLE_CEILING",
            });
        }
        positive("area_per_particle", self.area_per_particle)?;
        positive("attraction_radius", self.attraction_radius)?;
        positive("link_distance_cap", self.link_distance_cap)?;
        positive("link_distance_fraction", self.link_distance_fraction)?;
        positive("link_width", self.link_width)?;

        if !(self.attraction_strength.is_finite() && self.attraction_strength >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "attraction_strength",
                reason: "must be a non-negative finite number",
            });
        }
        if !(0.0..=1.0).contains(&self.link_max_alpha) {
            return Err(SettingsError::Invalid {
                field: "link_max_alpha",
                reason: "must be within 0.0..=1.0",
            });
        }
        Ok(())
    }

    /// Parameters the simulation needs
    pub fn field_config(&self) -> FieldConfig {
        FieldConfig {
            max_particles: self.max_particles,
            area_per_particle: self.area_per_particle,
            attraction_radius: self.attraction_radius,
            attraction_strength: self.attraction_strength,
        }
    }

    /// Longest link drawn on a surface of the given width
    pub fn max_link_distance(&self, surface_width: u32) -> f32 {
        self.link_distance_cap
            .min(surface_width as f32 * self.link_distance_fraction)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "particle_field_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_particles, 150);
        assert_eq!(settings.area_per_particle, 6000.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "max_particles": 40, "ripple": false }"#).unwrap();
        assert_eq!(settings.max_particles, 40);
        assert!(!settings.ripple);
        assert_eq!(settings.attraction_radius, ATTRACTION_RADIUS);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_json(r#"{ "area_per_particle": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "area_per_particle",
                ..
            }
        ));

        let err = Settings::from_json(r#"{ "link_max_alpha": 1.5 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "link_max_alpha", .. }));

        assert!(matches!(
            Settings::from_json("not json"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn test_oversized_particle_cap_rejected() {
        let err = Settings::from_json(
            r#"{ "max_particles": 18446744073709551615, "area_per_particle": 1e-30 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "max_particles", .. }));

        let at_ceiling = format!(r#"{{ "max_particles": {} }}"#, PARTICLE_CEILING);
        assert!(Settings::from_json(&at_ceiling).is_ok());
        let above = format!(r#"{{ "max_particles": {} }}"#, PARTICLE_CEILING + 1);
        assert!(Settings::from_json(&above).is_err());
    }

    #[test]
    fn test_max_link_distance() {
        let settings = Settings::default();
        // 15% of 1000 = 150, under the 200 cap
        assert!((settings.max_link_distance(1000) - 150.0).abs() < 1e-4);
        assert_eq!(settings.max_link_distance(1920), 200.0);
        assert_eq!(settings.max_link_distance(0), 0.0);
    }

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let settings = Settings {
            link_width: 2.0,
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
