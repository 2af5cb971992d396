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

//! Defines [`SwapChainDescBuilder`], which negotiates a swapchain
//! configuration against what a surface reports.

use crate::graphics::api::{
    CompositeAlphaMode, PresentMode, SurfaceCapabilities, SwapChainDesc, TextureFormat,
    TextureUsage,
};
use std::fmt::{self, Display, Write as _};

/// The outcome of a negotiation.
///
/// On success every `negotiated_*` field is set. On failure
/// `failure_reason` names the first check that failed and the categories
/// after it are left unset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NegotiationResult {
    /// The chosen texture format.
    pub negotiated_format: Option<TextureFormat>,
    /// The chosen present mode.
    pub negotiated_present_mode: Option<PresentMode>,
    /// The chosen alpha mode.
    pub negotiated_alpha_mode: Option<CompositeAlphaMode>,
    /// The image count, clamped to the surface's range.
    pub image_count: u32,
    /// Formats the surface offered.
    pub available_formats: Vec<TextureFormat>,
    /// Present modes the surface offered.
    pub available_present_modes: Vec<PresentMode>,
    /// Alpha modes the surface offered.
    pub available_alpha_modes: Vec<CompositeAlphaMode>,
    /// Why negotiation failed, if it did.
    pub failure_reason: Option<String>,
    /// One line per decision, in order.
    pub log: Vec<String>,
}

impl NegotiationResult {
    /// Whether a usable configuration was found.
    pub fn is_success(&self) -> bool {
        self.failure_reason.is_none()
            && self.negotiated_format.is_some()
            && self.negotiated_present_mode.is_some()
            && self.negotiated_alpha_mode.is_some()
    }

    /// Whether the format negotiation succeeded.
    pub fn format_supported(&self) -> bool {
        self.negotiated_format.is_some()
    }

    /// Whether the present mode negotiation succeeded.
    pub fn present_mode_supported(&self) -> bool {
        self.negotiated_present_mode.is_some()
    }

    /// Whether the alpha mode negotiation succeeded.
    pub fn alpha_mode_supported(&self) -> bool {
        self.negotiated_alpha_mode.is_some()
    }

    /// Renders a multi-line diagnostic of the negotiation.
    pub fn report(&self) -> String {
        fn opt<T: Display>(value: Option<T>) -> String {
            value.map_or_else(|| "<none>".to_owned(), |v| v.to_string())
        }

        let mut out = String::new();
        let status = match &self.failure_reason {
            None => "SUCCESS".to_owned(),
            Some(reason) => format!("FAILED ({reason})"),
        };
        let _ = writeln!(out, "SwapChain negotiation: {status}");
        let _ = writeln!(out, "  Format:       {}", opt(self.negotiated_format));
        let _ = writeln!(out, "  Present mode: {}", opt(self.negotiated_present_mode));
        let _ = writeln!(out, "  Alpha mode:   {}", opt(self.negotiated_alpha_mode));
        let _ = writeln!(out, "  Image count:  {}", self.image_count);
        let _ = writeln!(out, "  Available formats: {}", join(&self.available_formats));
        let _ = writeln!(
            out,
            "  Available present modes: {}",
            join(&self.available_present_modes)
        );
        let _ = writeln!(
            out,
            "  Available alpha modes: {}",
            join(&self.available_alpha_modes)
        );
        for line in &self.log {
            let _ = writeln!(out, "  {line}");
        }
        out
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Picks `preferred` if available, else the first available fallback.
fn select<T: Copy + PartialEq>(preferred: T, fallbacks: &[T], available: &[T]) -> Option<T> {
    std::iter::once(&preferred)
        .chain(fallbacks)
        .find(|candidate| available.contains(candidate))
        .copied()
}

/// Logs one category's decision and returns the selected value.
fn negotiate_category<T: Copy + PartialEq + Display>(
    log: &mut Vec<String>,
    category: &str,
    available_noun: &str,
    preferred: T,
    fallbacks: &[T],
    available: &[T],
) -> Option<T> {
    match select(preferred, fallbacks, available) {
        Some(chosen) if chosen == preferred => {
            log.push(format!("[OK] {category}: Using preferred {preferred}"));
            Some(chosen)
        }
        Some(chosen) => {
            log.push(format!(
                "[FALLBACK] {category}: Preferred {preferred} not available, using fallback {chosen}"
            ));
            Some(chosen)
        }
        None => {
            log.push(format!(
                "[FAILED] {category}: Preferred {preferred} not supported. Available {available_noun}: {}",
                join(available)
            ));
            None
        }
    }
}

/// Builds a [`SwapChainDesc`] from preferences with ordered fallbacks.
///
/// ```
/// use pers_core::graphics::swapchain::SwapChainDescBuilder;
/// use pers_core::graphics::{PresentMode, SurfaceCapabilities, TextureFormat};
///
/// let caps = SurfaceCapabilities {
///     formats: vec![TextureFormat::Rgba8Unorm],
///     present_modes: vec![PresentMode::Fifo],
///     alpha_modes: vec![pers_core::graphics::CompositeAlphaMode::Opaque],
///     ..Default::default()
/// };
/// let mut builder = SwapChainDescBuilder::new()
///     .with_dimensions(1280, 720)
///     .with_format(TextureFormat::Bgra8Unorm, vec![TextureFormat::Rgba8Unorm])
///     .with_present_mode(PresentMode::Mailbox, vec![PresentMode::Fifo]);
/// let result = builder.negotiate(&caps);
/// assert!(result.is_success());
/// assert_eq!(builder.build(&result).format, TextureFormat::Rgba8Unorm);
/// ```
#[derive(Debug, Clone)]
pub struct SwapChainDescBuilder {
    width: u32,
    height: u32,
    label: Option<String>,
    usage: TextureUsage,
    desired_image_count: u32,
    preferred_format: TextureFormat,
    format_fallbacks: Vec<TextureFormat>,
    preferred_present_mode: PresentMode,
    present_mode_fallbacks: Vec<PresentMode>,
    preferred_alpha_mode: CompositeAlphaMode,
    alpha_mode_fallbacks: Vec<CompositeAlphaMode>,
    negotiation_log: Vec<String>,
}

impl Default for SwapChainDescBuilder {
    fn default() -> Self {
        let defaults = SwapChainDesc::default();
        Self {
            width: defaults.width,
            height: defaults.height,
            label: None,
            usage: defaults.usage,
            desired_image_count: defaults.desired_image_count,
            preferred_format: defaults.format,
            format_fallbacks: Vec::new(),
            preferred_present_mode: defaults.present_mode,
            present_mode_fallbacks: Vec::new(),
            preferred_alpha_mode: defaults.alpha_mode,
            alpha_mode_fallbacks: Vec::new(),
            negotiation_log: Vec::new(),
        }
    }
}

impl SwapChainDescBuilder {
    /// A builder with the default swapchain preferences.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the surface size.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the preferred format and its ordered fallbacks.
    pub fn with_format(mut self, preferred: TextureFormat, fallbacks: Vec<TextureFormat>) -> Self {
        self.preferred_format = preferred;
        self.format_fallbacks = fallbacks;
        self
    }

    /// Sets the preferred present mode and its ordered fallbacks.
    pub fn with_present_mode(mut self, preferred: PresentMode, fallbacks: Vec<PresentMode>) -> Self {
        self.preferred_present_mode = preferred;
        self.present_mode_fallbacks = fallbacks;
        self
    }

    /// Sets the preferred alpha mode and its ordered fallbacks.
    pub fn with_alpha_mode(
        mut self,
        preferred: CompositeAlphaMode,
        fallbacks: Vec<CompositeAlphaMode>,
    ) -> Self {
        self.preferred_alpha_mode = preferred;
        self.alpha_mode_fallbacks = fallbacks;
        self
    }

    /// Sets the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the image usages.
    pub fn with_usage(mut self, usage: TextureUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Sets how many images the application would like in flight.
    pub fn with_desired_image_count(mut self, count: u32) -> Self {
        self.desired_image_count = count;
        self
    }

    /// Requested width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Requested height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The log lines of the last negotiation.
    pub fn negotiation_log(&self) -> &[String] {
        &self.negotiation_log
    }

    /// Forgets the log of the last negotiation.
    pub fn clear_negotiation_log(&mut self) {
        self.negotiation_log.clear();
    }

    /// Matches the preferences against `capabilities`.
    ///
    /// The result depends only on the builder's preferences and the
    /// capabilities; calling it twice with the same inputs gives the same
    /// answer.
    pub fn negotiate(&mut self, capabilities: &SurfaceCapabilities) -> NegotiationResult {
        let mut result = NegotiationResult {
            available_formats: capabilities.formats.clone(),
            available_present_modes: capabilities.present_modes.clone(),
            available_alpha_modes: capabilities.alpha_modes.clone(),
            image_count: self.desired_image_count.clamp(
                capabilities.min_image_count,
                capabilities.max_image_count.max(capabilities.min_image_count),
            ),
            ..Default::default()
        };
        let mut log = Vec::new();

        if self.width == 0 || self.height == 0 {
            result.failure_reason =
                Some("Invalid dimensions: width and height must be non-zero".to_owned());
            log.push("[FAILED] Dimensions: Invalid - width and height must be non-zero".to_owned());
            return self.finish(result, log);
        }
        if !capabilities.contains_size(self.width, self.height) {
            result.failure_reason = Some("Dimensions out of supported range".to_owned());
            log.push(format!(
                "[FAILED] Dimensions: Requested {}x{} is out of supported range ({}x{} to {}x{})",
                self.width,
                self.height,
                capabilities.min_width,
                capabilities.min_height,
                capabilities.max_width,
                capabilities.max_height
            ));
            return self.finish(result, log);
        }
        log.push(format!("[OK] Dimensions: {}x{}", self.width, self.height));

        result.negotiated_format = negotiate_category(
            &mut log,
            "Format",
            "formats",
            self.preferred_format,
            &self.format_fallbacks,
            &capabilities.formats,
        );
        if result.negotiated_format.is_none() {
            log::warn!("SwapChainDescBuilder: format negotiation failed, no preferred or fallback format is available");
            result.failure_reason = Some("No supported texture format found".to_owned());
            return self.finish(result, log);
        }

        result.negotiated_present_mode = negotiate_category(
            &mut log,
            "PresentMode",
            "modes",
            self.preferred_present_mode,
            &self.present_mode_fallbacks,
            &capabilities.present_modes,
        );
        if result.negotiated_present_mode.is_none() {
            log::warn!("SwapChainDescBuilder: present mode negotiation failed");
            result.failure_reason = Some("No supported present mode found".to_owned());
            return self.finish(result, log);
        }

        result.negotiated_alpha_mode = negotiate_category(
            &mut log,
            "AlphaMode",
            "modes",
            self.preferred_alpha_mode,
            &self.alpha_mode_fallbacks,
            &capabilities.alpha_modes,
        );
        if result.negotiated_alpha_mode.is_none() {
            log::warn!("SwapChainDescBuilder: alpha mode negotiation failed");
            result.failure_reason = Some("No supported alpha mode found".to_owned());
            return self.finish(result, log);
        }

        log.push(format!("[OK] ImageCount: {}", result.image_count));
        log::info!("SwapChainDescBuilder: negotiation successful");
        self.finish(result, log)
    }

    fn finish(&mut self, mut result: NegotiationResult, log: Vec<String>) -> NegotiationResult {
        for line in &log {
            log::debug!("SwapChainDescBuilder: {line}");
        }
        self.negotiation_log = log.clone();
        result.log = log;
        result
    }

    /// Builds the descriptor from a negotiation result. A failed result
    /// yields the default descriptor and logs an error.
    pub fn build(&self, result: &NegotiationResult) -> SwapChainDesc {
        match (
            result.is_success(),
            result.negotiated_format,
            result.negotiated_present_mode,
            result.negotiated_alpha_mode,
        ) {
            (true, Some(format), Some(present_mode), Some(alpha_mode)) => SwapChainDesc {
                label: self.label.clone(),
                width: self.width,
                height: self.height,
                format,
                present_mode,
                alpha_mode,
                usage: self.usage,
                desired_image_count: result.image_count,
            },
            _ => {
                log::error!(
                    "SwapChainDescBuilder: cannot build a SwapChainDesc from a failed negotiation ({})",
                    result.failure_reason.as_deref().unwrap_or("incomplete result")
                );
                SwapChainDesc::default()
            }
        }
    }

    /// Builds the descriptor from the preferred values without negotiating.
    pub fn build_default(&self) -> SwapChainDesc {
        SwapChainDesc {
            label: self.label.clone(),
            width: self.width,
            height: self.height,
            format: self.preferred_format,
            present_mode: self.preferred_present_mode,
            alpha_mode: self.preferred_alpha_mode,
            usage: self.usage,
            desired_image_count: self.desired_image_count,
        }
    }
}

impl Display for NegotiationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}
