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

//! The process-wide registry of backend plugins.
//!
//! A plugin is a [`BackendFactory`]. It is loaded at most once per process, the
//! first time a backend of its type is requested, and stays loaded until it is
//! unloaded explicitly. The software factory is always registered.

use super::software::SoftwareDevice;
use super::validation::ValidationLayer;
use anyhow::Context;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use vela_core::renderer::{BackendConfig, BackendType, GraphicsError, GraphicsResult, RenderBackend};

/// A loadable backend implementation.
pub trait BackendFactory: Send + Sync + 'static {
    /// The backend type this factory produces. Never [`BackendType::Auto`].
    fn backend_type(&self) -> BackendType;

    /// A human-readable name for logs.
    fn name(&self) -> &str;

    /// Prepares the plugin, e.g. by opening the native driver library.
    ///
    /// ## Errors
    ///
    /// Any error marks the backend as unavailable on this machine.
    fn load(&self) -> anyhow::Result<()>;

    /// Releases whatever [`BackendFactory::load`] acquired.
    fn unload(&self) {}

    /// Creates a backend for `config`. Only called on a loaded factory.
    fn create(&self, config: &BackendConfig) -> GraphicsResult<Box<dyn RenderBackend>>;
}

/// The factory of the [`SoftwareDevice`].
#[derive(Debug, Default)]
pub struct SoftwareBackendFactory;

impl BackendFactory for SoftwareBackendFactory {
    fn backend_type(&self) -> BackendType {
        BackendType::Software
    }

    fn name(&self) -> &str {
        "Software"
    }

    fn load(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn create(&self, config: &BackendConfig) -> GraphicsResult<Box<dyn RenderBackend>> {
        Ok(Box::new(SoftwareDevice::new(config)))
    }
}

struct Plugin {
    factory: Box<dyn BackendFactory>,
    loaded: bool,
    load_count: u32,
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.factory.name())
            .field("loaded", &self.loaded)
            .field("load_count", &self.load_count)
            .finish()
    }
}

/// A set of backend plugins keyed by [`BackendType`].
#[derive(Debug, Default)]
pub struct BackendRegistry {
    plugins: HashMap<BackendType, Plugin>,
}

impl BackendRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the software factory.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        // Software is concrete, so registration cannot fail.
        let _ = registry.register(Box::new(SoftwareBackendFactory));
        registry
    }

    /// Registers `factory`, replacing (and unloading) any plugin of the same type.
    ///
    /// ## Errors
    ///
    /// Returns [`GraphicsError::InvalidOperation`] if the factory claims to be
    /// [`BackendType::Auto`].
    pub fn register(&mut self, factory: Box<dyn BackendFactory>) -> GraphicsResult<()> {
        let backend_type = factory.backend_type();
        if backend_type == BackendType::Auto {
            return Err(GraphicsError::invalid_operation(
                "a backend factory must name a concrete backend type",
            ));
        }
        log::debug!(
            "BackendRegistry: registering the {} plugin for {}",
            factory.name(),
            backend_type.name()
        );
        let previous = self.plugins.insert(
            backend_type,
            Plugin {
                factory,
                loaded: false,
                load_count: 0,
            },
        );
        if let Some(previous) = previous.filter(|p| p.loaded) {
            previous.factory.unload();
        }
        Ok(())
    }

    /// Whether a plugin of `backend_type` is registered.
    pub fn is_registered(&self, backend_type: BackendType) -> bool {
        self.plugins.contains_key(&backend_type)
    }

    /// Whether the plugin of `backend_type` is currently loaded.
    pub fn is_loaded(&self, backend_type: BackendType) -> bool {
        self.plugins
            .get(&backend_type)
            .is_some_and(|plugin| plugin.loaded)
    }

    /// How many times the plugin of `backend_type` has been loaded.
    pub fn load_count(&self, backend_type: BackendType) -> u32 {
        self.plugins
            .get(&backend_type)
            .map_or(0, |plugin| plugin.load_count)
    }

    /// Loads the plugin of `backend_type` if it is not loaded yet.
    ///
    /// ## Errors
    ///
    /// Returns [`GraphicsError::BackendNotAvailable`] if no plugin is registered
    /// or its loading fails.
    pub fn acquire(&mut self, backend_type: BackendType) -> GraphicsResult<()> {
        let plugin = self
            .plugins
            .get_mut(&backend_type)
            .ok_or(GraphicsError::BackendNotAvailable(backend_type))?;
        if plugin.loaded {
            return Ok(());
        }

        let name = plugin.factory.name().to_string();
        plugin
            .factory
            .load()
            .with_context(|| format!("failed to load the {name} backend plugin"))
            .map_err(|e| {
                log::warn!("BackendRegistry: {e:#}");
                GraphicsError::BackendNotAvailable(backend_type)
            })?;

        plugin.loaded = true;
        plugin.load_count += 1;
        log::info!("BackendRegistry: loaded the {name} backend plugin");
        Ok(())
    }

    /// Unloads the plugin of `backend_type`. Returns whether it was loaded.
    pub fn unload(&mut self, backend_type: BackendType) -> bool {
        match self.plugins.get_mut(&backend_type) {
            Some(plugin) if plugin.loaded => {
                plugin.factory.unload();
                plugin.loaded = false;
                log::info!(
                    "BackendRegistry: unloaded the {} backend plugin",
                    plugin.factory.name()
                );
                true
            }
            _ => false,
        }
    }

    /// Unloads every loaded plugin.
    pub fn unload_all(&mut self) {
        for backend_type in BackendType::CONCRETE {
            self.unload(backend_type);
        }
    }

    /// Creates the backend requested by `config.backend_type`.
    ///
    /// [`BackendType::Auto`] tries each backend of the platform preference
    /// list in turn and falls back to software.
    ///
    /// ## Errors
    ///
    /// Returns [`GraphicsError::BackendNotAvailable`] for an explicit type that
    /// cannot be loaded, or any creation error of the chosen backend.
    pub fn create(&mut self, config: &BackendConfig) -> GraphicsResult<Box<dyn RenderBackend>> {
        if config.backend_type != BackendType::Auto {
            return self.create_with(config.backend_type, config);
        }

        log::info!("BackendRegistry: starting automatic backend selection...");
        for &candidate in BackendType::platform_preference() {
            log::info!("BackendRegistry: attempting the {} backend...", candidate.name());
            match self.create_with(candidate, config) {
                Ok(backend) => {
                    log::info!("BackendRegistry: selected the {} backend", candidate.name());
                    return Ok(backend);
                }
                Err(e) => log::warn!(
                    "BackendRegistry: the {} backend is unusable: {e}",
                    candidate.name()
                ),
            }
        }

        log::info!("BackendRegistry: falling back to the Software backend");
        self.create_with(BackendType::Software, config)
    }

    fn create_with(
        &mut self,
        backend_type: BackendType,
        config: &BackendConfig,
    ) -> GraphicsResult<Box<dyn RenderBackend>> {
        self.acquire(backend_type)?;
        let plugin = self
            .plugins
            .get(&backend_type)
            .ok_or(GraphicsError::BackendNotAvailable(backend_type))?;
        plugin.factory.create(config)
    }
}

static REGISTRY: Lazy<Mutex<BackendRegistry>> =
    Lazy::new(|| Mutex::new(BackendRegistry::with_defaults()));

fn registry() -> GraphicsResult<MutexGuard<'static, BackendRegistry>> {
    REGISTRY
        .lock()
        .map_err(|_| GraphicsError::InitializationFailed("backend registry lock poisoned".to_string()))
}

/// Registers a plugin with the process-wide registry.
pub fn register_backend(factory: Box<dyn BackendFactory>) -> GraphicsResult<()> {
    registry()?.register(factory)
}

/// Creates a backend through the process-wide registry, wrapped in a
/// [`ValidationLayer`] when `config.enable_validation` is set.
pub fn create_backend(config: &BackendConfig) -> GraphicsResult<Box<dyn RenderBackend>> {
    let backend = registry()?.create(config)?;
    log::info!(
        "Backend ready: {} on '{}'",
        backend.info().backend_type.name(),
        backend.info().device_name
    );
    if config.enable_validation {
        log::info!("Validation layer enabled.");
        return Ok(Box::new(ValidationLayer::new(backend)));
    }
    Ok(backend)
}

/// Whether `backend_type` is registered and loads on this machine.
///
/// [`BackendType::Auto`] is always available since software is the fallback.
pub fn is_backend_available(backend_type: BackendType) -> bool {
    if backend_type == BackendType::Auto {
        return true;
    }
    registry().is_ok_and(|mut registry| registry.acquire(backend_type).is_ok())
}

/// Unloads a plugin of the process-wide registry. Returns whether it was loaded.
pub fn unload_backend(backend_type: BackendType) -> bool {
    registry().is_ok_and(|mut registry| registry.unload(backend_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingFactory {
        loads: Arc<AtomicU32>,
        unloads: Arc<AtomicU32>,
    }

    impl BackendFactory for CountingFactory {
        fn backend_type(&self) -> BackendType {
            BackendType::OpenGl
        }

        fn name(&self) -> &str {
            "Counting"
        }

        fn load(&self) -> anyhow::Result<()> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn unload(&self) {
            self.unloads.fetch_add(1, Ordering::SeqCst);
        }

        fn create(&self, config: &BackendConfig) -> GraphicsResult<Box<dyn RenderBackend>> {
            Ok(Box::new(SoftwareDevice::new(config)))
        }
    }

    struct MissingDriverFactory;

    impl BackendFactory for MissingDriverFactory {
        fn backend_type(&self) -> BackendType {
            BackendType::Vulkan
        }

        fn name(&self) -> &str {
            "Vulkan"
        }

        fn load(&self) -> anyhow::Result<()> {
            anyhow::bail!("no Vulkan loader found")
        }

        fn create(&self, _config: &BackendConfig) -> GraphicsResult<Box<dyn RenderBackend>> {
            Err(GraphicsError::BackendNotAvailable(BackendType::Vulkan))
        }
    }

    #[test]
    fn plugins_load_once_until_unloaded() {
        let factory = CountingFactory::default();
        let loads = Arc::clone(&factory.loads);
        let unloads = Arc::clone(&factory.unloads);
        let mut registry = BackendRegistry::new();
        registry.register(Box::new(factory)).unwrap();

        registry.acquire(BackendType::OpenGl).unwrap();
        registry.acquire(BackendType::OpenGl).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        assert!(registry.unload(BackendType::OpenGl));
        assert!(!registry.unload(BackendType::OpenGl));
        registry.acquire(BackendType::OpenGl).unwrap();

        assert_eq!(registry.load_count(BackendType::OpenGl), 2);
        assert_eq!(unloads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregistered_or_unloadable_backends_are_not_available() {
        let mut registry = BackendRegistry::new();
        assert_eq!(
            registry.acquire(BackendType::Metal),
            Err(GraphicsError::BackendNotAvailable(BackendType::Metal))
        );

        registry.register(Box::new(MissingDriverFactory)).unwrap();
        assert_eq!(
            registry.acquire(BackendType::Vulkan),
            Err(GraphicsError::BackendNotAvailable(BackendType::Vulkan))
        );
        assert!(!registry.is_loaded(BackendType::Vulkan));
    }

    #[test]
    fn auto_falls_back_to_software() {
        let mut registry = BackendRegistry::with_defaults();
        registry.register(Box::new(MissingDriverFactory)).unwrap();

        let backend = registry.create(&BackendConfig::default()).unwrap();

        assert_eq!(backend.info().backend_type, BackendType::Software);
    }

    #[test]
    fn auto_cannot_be_registered() {
        struct AutoFactory;
        impl BackendFactory for AutoFactory {
            fn backend_type(&self) -> BackendType {
                BackendType::Auto
            }
            fn name(&self) -> &str {
                "Auto"
            }
            fn load(&self) -> anyhow::Result<()> {
                Ok(())
            }
            fn create(&self, config: &BackendConfig) -> GraphicsResult<Box<dyn RenderBackend>> {
                Ok(Box::new(SoftwareDevice::new(config)))
            }
        }

        let mut registry = BackendRegistry::new();

        assert!(matches!(
            registry.register(Box::new(AutoFactory)),
            Err(GraphicsError::InvalidOperation(_))
        ));
    }
}
