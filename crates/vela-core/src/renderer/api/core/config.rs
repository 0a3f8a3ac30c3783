// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::backend::BackendType;
use super::{DEFAULT_MAX_FRAMES_IN_FLIGHT, MAX_FRAMES_IN_FLIGHT_LIMIT};
use crate::platform::VelaWindowHandle;
use crate::renderer::api::util::SampleCount;
use crate::renderer::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything needed to construct a graphics facade and its backend.
///
/// All fields except the window handle can be loaded from JSON; missing fields
/// take their [`Default`] values.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// The backend to bind to.
    pub backend_type: BackendType,
    /// Wraps the backend in the validation layer.
    pub enable_validation: bool,
    /// Requires ray tracing support from the selected device.
    pub enable_ray_tracing: bool,
    /// Width of the initial drawable surface, in pixels.
    pub window_width: u32,
    /// Height of the initial drawable surface, in pixels.
    pub window_height: u32,
    /// Synchronizes presentation with the display refresh.
    pub enable_vsync: bool,
    /// Default sample count for the surface; must be a power of two.
    pub sample_count: u32,
    /// Upper bound on submitted-but-not-retired command buffers.
    pub max_frames_in_flight: u32,
    /// The platform window the swap chain presents to, if any.
    #[serde(skip)]
    pub window_handle: Option<VelaWindowHandle>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_type: BackendType::Auto,
            enable_validation: cfg!(debug_assertions),
            enable_ray_tracing: false,
            window_width: 1280,
            window_height: 720,
            enable_vsync: true,
            sample_count: 1,
            max_frames_in_flight: DEFAULT_MAX_FRAMES_IN_FLIGHT,
            window_handle: None,
        }
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("backend_type", &self.backend_type)
            .field("enable_validation", &self.enable_validation)
            .field("enable_ray_tracing", &self.enable_ray_tracing)
            .field("window_width", &self.window_width)
            .field("window_height", &self.window_height)
            .field("enable_vsync", &self.enable_vsync)
            .field("sample_count", &self.sample_count)
            .field("max_frames_in_flight", &self.max_frames_in_flight)
            .field("window_handle", &self.window_handle.is_some())
            .finish()
    }
}

impl BackendConfig {
    /// A configuration for the given backend with every other field defaulted.
    pub fn new(backend_type: BackendType) -> Self {
        Self {
            backend_type,
            ..Self::default()
        }
    }

    /// A windowless configuration, as used by offscreen rendering and tests.
    pub fn headless(backend_type: BackendType, width: u32, height: u32) -> Self {
        Self {
            backend_type,
            window_width: width,
            window_height: height,
            ..Self::default()
        }
    }

    /// Sets the window the swap chain will present to.
    pub fn with_window(mut self, window_handle: VelaWindowHandle) -> Self {
        self.window_handle = Some(window_handle);
        self
    }

    /// Enables or disables the validation layer.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = enabled;
        self
    }

    /// Load a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Save this configuration to a JSON file. The window handle is not saved.
    pub fn to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// The configured sample count as a typed value.
    pub fn sample_count(&self) -> Result<SampleCount, ValidationError> {
        SampleCount::try_from(self.sample_count)
    }

    /// Checks the shape of the configuration before any backend is touched.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window_width == 0 {
            return Err(ValidationError::ZeroSize {
                what: "window width",
            });
        }
        if self.window_height == 0 {
            return Err(ValidationError::ZeroSize {
                what: "window height",
            });
        }
        self.sample_count()?;
        if self.max_frames_in_flight == 0 || self.max_frames_in_flight > MAX_FRAMES_IN_FLIGHT_LIMIT
        {
            return Err(ValidationError::InvalidFramesInFlight(
                self.max_frames_in_flight,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BackendConfig::default();
        assert_eq!(config.backend_type, BackendType::Auto);
        assert_eq!(config.max_frames_in_flight, DEFAULT_MAX_FRAMES_IN_FLIGHT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_window_size_is_rejected() {
        let config = BackendConfig::headless(BackendType::Software, 0, 600);
        assert_eq!(
            config.validate(),
            Err(ValidationError::ZeroSize {
                what: "window width"
            })
        );
    }

    #[test]
    fn non_power_of_two_sample_count_is_rejected() {
        let config = BackendConfig {
            sample_count: 6,
            ..BackendConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidSampleCount(6))
        );
    }

    #[test]
    fn frames_in_flight_must_be_bounded() {
        let config = BackendConfig {
            max_frames_in_flight: 0,
            ..BackendConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidFramesInFlight(0))
        );
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config =
            BackendConfig::from_json(r#"{ "backend_type": "software", "window_width": 64 }"#)
                .unwrap();
        assert_eq!(config.backend_type, BackendType::Software);
        assert_eq!(config.window_width, 64);
        assert_eq!(config.window_height, 720);
        assert!(config.window_handle.is_none());
    }
}
