//! Common types shared across printer and scanner implementations.

use serde::{Deserialize, Serialize};

/// Identity reported by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable device name.
    pub name: String,

    /// Device model.
    pub model: String,

    /// Serial number, if the device reports one.
    pub serial_number: Option<String>,

    /// Firmware or SDK version, if the device reports one.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            serial_number: None,
            firmware_version: None,
        }
    }

    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Horizontal placement on the paper roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Text styling for a printed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextFormat {
    /// Glyph size in printer dots.
    pub size: u8,
    pub bold: bool,
    pub monospace: bool,
    pub alignment: Alignment,
}

impl TextFormat {
    pub fn new(size: u8) -> Self {
        Self {
            size,
            bold: false,
            monospace: false,
            alignment: Alignment::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn monospace(mut self) -> Self {
        self.monospace = true;
        self
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl Default for TextFormat {
    fn default() -> Self {
        Self::new(24)
    }
}

/// Barcode symbologies the printer can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Symbology {
    Code128,
}

/// Geometry and styling of a printed barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarcodeSpec {
    pub symbology: Symbology,
    pub width: u32,
    pub height: u32,
    /// Print the encoded data under the bars.
    pub show_text: bool,
    pub alignment: Alignment,
}

/// One element of a print job, in paper order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintElement {
    Text { text: String, format: TextFormat },
    QrCode { data: String, size: u32, alignment: Alignment },
    Barcode { data: String, spec: BarcodeSpec },
}

impl PrintElement {
    pub fn text(text: impl Into<String>, format: TextFormat) -> Self {
        Self::Text {
            text: text.into(),
            format,
        }
    }

    /// Returns the text if this is a text element.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}
