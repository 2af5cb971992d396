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

//! Defines [`GraphicsConfig`], everything an application needs to bring the
//! graphics stack up, loadable from JSON.

use crate::graphics::api::{
    InstanceDesc, LogicalDeviceDesc, PhysicalDeviceOptions, PowerPreference, SwapChainDesc,
};
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::Surface;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// The serializable part of [`PhysicalDeviceOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Adapter class preference.
    pub power_preference: PowerPreference,
    /// Only consider software adapters.
    pub force_fallback_adapter: bool,
}

impl AdapterConfig {
    /// Request options, optionally bound to a surface the adapter must
    /// present to.
    pub fn to_options(&self, compatible_surface: Option<Arc<dyn Surface>>) -> PhysicalDeviceOptions {
        PhysicalDeviceOptions {
            power_preference: self.power_preference,
            force_fallback_adapter: self.force_fallback_adapter,
            compatible_surface,
        }
    }
}

/// Instance, adapter, device and swapchain settings in one place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// Instance creation.
    pub instance: InstanceDesc,
    /// Adapter selection.
    pub adapter: AdapterConfig,
    /// Logical device creation.
    pub device: LogicalDeviceDesc,
    /// The swapchain the application would like.
    pub swapchain: SwapChainDesc,
}

impl GraphicsConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> GraphicsResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            log::error!("GraphicsConfig: failed to parse: {e}");
            GraphicsError::invalid(format!("invalid graphics config: {e}"))
        })
    }

    /// Reads and parses a JSON file.
    pub fn load(path: impl AsRef<Path>) -> GraphicsResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            GraphicsError::invalid(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Renders the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> GraphicsResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GraphicsError::Backend(format!("cannot serialize graphics config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::api::{
        BackendSelection, DeviceFeature, PresentMode, TextureFormat, TextureUsage,
    };

    #[test]
    fn empty_document_yields_defaults() {
        let config = GraphicsConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GraphicsConfig::default());
        assert!(config.instance.enable_validation);
        assert!(!config.instance.allow_software_renderer);
        assert_eq!(config.device.timeout_ms, 5000);
        assert_eq!(config.swapchain.format, TextureFormat::Bgra8Unorm);
        assert_eq!(config.swapchain.usage, TextureUsage::RENDER_ATTACHMENT);
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let config = GraphicsConfig::from_json_str(
            r#"{
                "instance": { "application_name": "Demo", "backends": "Vulkan" },
                "adapter": { "power_preference": "LowPower" },
                "device": { "required_features": ["ShaderF16"], "timeout_ms": 250 },
                "swapchain": { "width": 1280, "height": 720, "present_mode": "Mailbox",
                               "format": "RGBA8UnormSrgb" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.instance.application_name, "Demo");
        assert_eq!(config.instance.backends, BackendSelection::Vulkan);
        assert_eq!(config.adapter.power_preference, PowerPreference::LowPower);
        assert_eq!(config.device.required_features, vec![DeviceFeature::ShaderF16]);
        assert_eq!(config.device.timeout_ms, 250);
        assert_eq!(config.swapchain.present_mode, PresentMode::Mailbox);
        assert_eq!(config.swapchain.format, TextureFormat::Rgba8UnormSrgb);
        assert_eq!(config.swapchain.desired_image_count, 2);

        let options = config.adapter.to_options(None);
        assert_eq!(options.power_preference, PowerPreference::LowPower);
        assert!(options.compatible_surface.is_none());
    }

    #[test]
    fn unknown_format_names_are_rejected() {
        let err = GraphicsConfig::from_json_str(r#"{ "swapchain": { "format": "RGB565" } }"#)
            .unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidArgument(_)));
    }

    #[test]
    fn round_trips_through_json() {
        let mut config = GraphicsConfig::default();
        config.swapchain.width = 1920;
        let json = config.to_json_string().unwrap();
        assert_eq!(GraphicsConfig::from_json_str(&json).unwrap(), config);
    }
}
