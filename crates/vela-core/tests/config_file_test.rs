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

use vela_core::renderer::{BackendConfig, BackendType, ValidationError};

fn temp_path(name: &str) -> String {
    let mut path = std::env::temp_dir();
    path.push(format!("vela_{}_{}.json", name, std::process::id()));
    path.to_string_lossy().into_owned()
}

#[test]
fn test_config_survives_a_file_round_trip() {
    // --- 1. ARRANGE ---
    let path = temp_path("round_trip");
    let config = BackendConfig {
        enable_vsync: false,
        sample_count: 4,
        max_frames_in_flight: 3,
        ..BackendConfig::headless(BackendType::Software, 640, 480)
    };

    // --- 2. ACT ---
    config.to_file(&path).expect("config should be written");
    let loaded = BackendConfig::from_file(&path).expect("config should be read back");
    let _ = std::fs::remove_file(&path);

    // --- 3. ASSERT ---
    assert_eq!(loaded.backend_type, BackendType::Software);
    assert_eq!(loaded.window_width, 640);
    assert_eq!(loaded.window_height, 480);
    assert!(!loaded.enable_vsync);
    assert_eq!(loaded.sample_count, 4);
    assert_eq!(loaded.max_frames_in_flight, 3);
    assert!(loaded.window_handle.is_none());
}

#[test]
fn test_loaded_config_is_validated_separately() {
    // A file may hold values the facade will later refuse.
    let config = BackendConfig::from_json(r#"{ "sample_count": 3, "max_frames_in_flight": 9 }"#)
        .expect("shape is valid JSON");
    assert_eq!(config.validate(), Err(ValidationError::InvalidSampleCount(3)));

    let config = BackendConfig {
        sample_count: 1,
        ..config
    };
    assert_eq!(
        config.validate(),
        Err(ValidationError::InvalidFramesInFlight(9))
    );
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(BackendConfig::from_file("/definitely/not/here/vela.json").is_err());
}

#[test]
fn test_unknown_backend_name_is_rejected() {
    assert!(BackendConfig::from_json(r#"{ "backend_type": "glide" }"#).is_err());
}
