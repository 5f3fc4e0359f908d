//! The process-wide table of supported models.
//!
//! Each entry pairs a validated [`CapabilityDescriptor`] with the factory
//! that wraps a transport in the right backend. The table is built once,
//! on first use, and never changes afterwards.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use catlink_core::caps::CapabilityDescriptor;
use catlink_core::config::SessionConfig;
use catlink_core::error::Result;
use catlink_core::rig::Rig;
use catlink_core::transport::Transport;
use catlink_core::types::ModelId;

/// Builds a backend for one model around an open transport.
pub type RigFactory =
    fn(Arc<CapabilityDescriptor>, Box<dyn Transport>, SessionConfig) -> Result<Box<dyn Rig>>;

/// One registered model.
#[derive(Clone)]
pub struct RegistryEntry {
    pub descriptor: Arc<CapabilityDescriptor>,
    factory: RigFactory,
}

impl RegistryEntry {
    /// Wrap `transport` in this model's backend. Nothing is sent yet.
    pub fn create(&self, transport: Box<dyn Transport>, config: SessionConfig) -> Result<Box<dyn Rig>> {
        (self.factory)(Arc::clone(&self.descriptor), transport, config)
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("model_id", &self.descriptor.model_id)
            .field("model_name", &self.descriptor.model_name)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<ModelId, RegistryEntry>,
}

impl Registry {
    /// Register `models`, dropping descriptors that fail validation and
    /// ids that are already taken.
    pub fn with_models(models: impl IntoIterator<Item = (CapabilityDescriptor, RigFactory)>) -> Self {
        let mut entries: BTreeMap<ModelId, RegistryEntry> = BTreeMap::new();
        for (descriptor, factory) in models {
            if let Err(e) = descriptor.validate() {
                warn!(model = %descriptor.model_name, error = %e, "skipping invalid model");
                continue;
            }
            let id = descriptor.model_id;
            if let Some(existing) = entries.get(&id) {
                warn!(
                    model_id = %id,
                    model = %descriptor.model_name,
                    registered = %existing.descriptor.model_name,
                    "duplicate model id, skipping"
                );
                continue;
            }
            debug!(model_id = %id, model = %descriptor.model_name, "registered");
            entries.insert(
                id,
                RegistryEntry {
                    descriptor: Arc::new(descriptor),
                    factory,
                },
            );
        }
        Registry { entries }
    }

    pub fn get(&self, id: ModelId) -> Option<&RegistryEntry> {
        self.entries.get(&id)
    }

    /// Look a model up by name, ignoring case and punctuation, so
    /// `"ic7800"` finds the IC-7800.
    pub fn find_by_name(&self, name: &str) -> Option<&RegistryEntry> {
        let wanted = normalize(name);
        self.entries
            .values()
            .find(|e| normalize(e.descriptor.model_name) == wanted)
    }

    /// Entries in model id order.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// The registry of every model compiled in.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Registry::with_models(builtin_models()))
}

/// Descriptors of every registered model, in model id order.
pub fn supported_rigs() -> Vec<Arc<CapabilityDescriptor>> {
    registry().iter().map(|e| Arc::clone(&e.descriptor)).collect()
}

pub fn find_by_name(name: &str) -> Option<&'static RegistryEntry> {
    registry().find_by_name(name)
}

fn builtin_models() -> Vec<(CapabilityDescriptor, RigFactory)> {
    let mut models: Vec<(CapabilityDescriptor, RigFactory)> = Vec::new();

    #[cfg(feature = "yaesu")]
    {
        use catlink_yaesu::models;
        models.push((models::ft_840(), |d, t, c| {
            Ok(Box::new(catlink_yaesu::Ft840::new(d, t, c)))
        }));
        models.push((models::ft_dx101d(), |d, t, c| {
            Ok(Box::new(catlink_yaesu::NewcatRig::new(d, t, c)))
        }));
    }

    #[cfg(feature = "icom")]
    for descriptor in catlink_icom::models::all_models() {
        models.push((descriptor, |d, t, c| {
            Ok(Box::new(catlink_icom::IcomRig::new(d, t, c)?))
        }));
    }

    #[cfg(feature = "kenwood")]
    models.push((catlink_kenwood::models::tm_d710(), |d, t, c| {
        Ok(Box::new(catlink_kenwood::TmD710::new(d, t, c)))
    }));

    #[cfg(feature = "rft")]
    models.push((catlink_rft::models::ekd_500(), |d, t, c| {
        Ok(Box::new(catlink_rft::Ekd500::new(d, t, c)))
    }));

    models
}
