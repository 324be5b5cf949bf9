//! Session configuration: page geometry, typography and scheduling
//!
//! Everything here is fixed for the lifetime of an editing session. The
//! defaults describe a US Letter page at 96 DPI with one inch margins, which
//! gives a content height (page capacity) of 864px.

use crate::document::BlockKind;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Screen resolution used to convert inches to pixels
pub const DPI: f32 = 96.0;

/// Physical page geometry in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub width_px: f32,
    pub height_px: f32,
    /// Uniform margin on all four sides
    pub margin_px: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width_px: 8.5 * DPI,  // 816px
            height_px: 11.0 * DPI, // 1056px
            margin_px: DPI,
        }
    }
}

impl PageConfig {
    /// Usable content width per page
    pub fn content_width(&self) -> f32 {
        self.width_px - self.margin_px * 2.0
    }

    /// Usable content height per page: the page capacity
    pub fn content_height(&self) -> f32 {
        self.height_px - self.margin_px * 2.0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("page.widthPx", self.width_px)?;
        positive("page.heightPx", self.height_px)?;
        if !self.margin_px.is_finite() || self.margin_px < 0.0 {
            return Err(ConfigError::InvalidDimension {
                field: "page.marginPx",
                value: self.margin_px,
            });
        }
        if self.content_width() <= 0.0 || self.content_height() <= 0.0 {
            return Err(ConfigError::NoContentArea {
                margin: self.margin_px,
                width: self.width_px,
                height: self.height_px,
            });
        }
        Ok(())
    }
}

/// Typography used by the reference layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    /// Base font size in pixels
    pub font_size: f32,
    /// Line height multiplier for body text
    pub line_height: f32,
    /// Font size multipliers for heading levels 1 to 3
    pub heading_scale: [f32; 3],
    /// Line height multipliers for heading levels 1 to 3
    pub heading_line_height: [f32; 3],
    /// Vertical space after a top-level text block
    pub block_spacing: f32,
    /// Vertical space after a text block nested in a container
    pub nested_spacing: f32,
    /// Horizontal indent applied by list and quote containers
    pub indent: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 1.5,
            heading_scale: [2.0, 1.5, 1.25],
            heading_line_height: [1.2, 1.3, 1.4],
            block_spacing: 16.0,
            nested_spacing: 4.0,
            indent: 24.0,
        }
    }
}

impl Typography {
    /// Font size for a text block of the given kind
    pub fn font_size_for(&self, kind: BlockKind) -> f32 {
        match kind {
            BlockKind::Heading { level } => self.font_size * self.heading_scale[heading_slot(level)],
            _ => self.font_size,
        }
    }

    /// Height of one rendered line for a text block of the given kind
    pub fn line_px_for(&self, kind: BlockKind) -> f32 {
        match kind {
            BlockKind::Heading { level } => {
                self.font_size_for(kind) * self.heading_line_height[heading_slot(level)]
            }
            _ => self.font_size * self.line_height,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("typography.fontSize", self.font_size)?;
        positive("typography.lineHeight", self.line_height)?;
        for value in self.heading_scale.iter().chain(&self.heading_line_height) {
            positive("typography.heading", *value)?;
        }
        Ok(())
    }
}

fn heading_slot(level: u8) -> usize {
    usize::from(level.clamp(1, 3)) - 1
}

/// Timing of deferred recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Quiet period after the last mutation before recomputing
    pub debounce_ms: u64,
    /// Delay of the first recompute after mount
    pub initial_delay_ms: u64,
    /// Retry delay when layout has not settled for the document being measured
    pub settle_retry_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            initial_delay_ms: 300,
            settle_retry_ms: 16,
        }
    }
}

/// Complete configuration of an editing session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub page: PageConfig,
    pub typography: Typography,
    pub scheduler: SchedulerConfig,
}

impl EditorConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the geometry leaves a usable content area
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.page.validate()?;
        self.typography.validate()
    }

    /// Page capacity used by the break calculator
    pub fn capacity(&self) -> f32 {
        self.page.content_height()
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDimension { field, value })
    }
}
