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

//! Construction-time checks shared by every framebuffer variant.

use crate::graphics::api::{is_valid_sample_count, MAX_COLOR_ATTACHMENTS};
use crate::graphics::error::{GraphicsError, GraphicsResult};

/// Rejects a zero width or height.
pub fn validate_dimensions(owner: &str, width: u32, height: u32) -> GraphicsResult<()> {
    if width == 0 || height == 0 {
        log::error!("{owner}: invalid dimensions {width}x{height}");
        return Err(GraphicsError::invalid(format!(
            "{owner}: invalid dimensions {width}x{height}"
        )));
    }
    Ok(())
}

/// Rejects a framebuffer with no attachment at all or more than
/// [`MAX_COLOR_ATTACHMENTS`] color attachments.
pub fn validate_attachment_count(owner: &str, color_count: usize, has_depth: bool) -> GraphicsResult<()> {
    if color_count == 0 && !has_depth {
        log::error!("{owner}: at least one attachment is required");
        return Err(GraphicsError::invalid(format!(
            "{owner}: at least one attachment is required"
        )));
    }
    if color_count > MAX_COLOR_ATTACHMENTS {
        log::error!(
            "{owner}: too many color attachments: {color_count}, maximum is {MAX_COLOR_ATTACHMENTS}"
        );
        return Err(GraphicsError::invalid(format!(
            "{owner}: {color_count} color attachments exceed {MAX_COLOR_ATTACHMENTS}"
        )));
    }
    Ok(())
}

/// Returns `count` if it is 1, 2, 4 or 8; otherwise warns and returns 1.
pub fn normalize_sample_count(owner: &str, count: u32) -> u32 {
    if is_valid_sample_count(count) {
        count
    } else {
        log::warn!("{owner}: invalid sample count {count}, defaulting to 1");
        1
    }
}
