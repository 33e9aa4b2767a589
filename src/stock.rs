//! Film stocks as data: one parameter row per [`FilmStock`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::effects::blend::BlendMode;
use crate::effects::grain::GrainParams;
use crate::effects::tone::{ColorOverlay, ToneParams};
use crate::foundation::core::Rgba8;
use crate::foundation::error::FilmError;

/// The closed set of film stocks a burst can be developed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilmStock {
    /// Warm ISO 400 color negative.
    #[default]
    #[serde(rename = "STOCK_A_400", alias = "color400")]
    Color400,
    /// Punchier, grainier ISO 800 color negative.
    #[serde(rename = "STOCK_A_800", alias = "color800")]
    Color800,
    /// Classic ISO 400 black and white.
    #[serde(rename = "MONO_400", alias = "mono400")]
    Mono400,
    /// High-contrast black and white, no halation.
    #[serde(rename = "MONO_HIGH", alias = "mono_high")]
    MonoHigh,
}

/// Every tunable of one stock.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StockParams {
    /// Human label printed on posters.
    pub label: &'static str,
    /// Global tone adjustment.
    pub tone: ToneParams,
    /// Optional color wash; always `None` for monochrome stocks.
    pub overlay: Option<ColorOverlay>,
    /// Grain strength.
    pub grain: GrainParams,
    /// Glow alpha; `None` skips the pass.
    pub glow: Option<f32>,
    /// Contrast factor `k` of the grayscale stretch; `None` for color stocks.
    pub mono_k: Option<f32>,
}

const STOCK_TABLE: [StockParams; 4] = [
    StockParams {
        label: "Color 400",
        tone: ToneParams {
            contrast: 1.1,
            saturation: 1.15,
            brightness: 1.05,
        },
        overlay: Some(ColorOverlay {
            color: Rgba8::rgb(255, 180, 120),
            blend: BlendMode::Screen,
            opacity: 0.08,
        }),
        grain: GrainParams {
            intensity: 0.35,
            opacity: 0.5,
        },
        glow: Some(0.2),
        mono_k: None,
    },
    StockParams {
        label: "Color 800",
        tone: ToneParams {
            contrast: 1.2,
            saturation: 1.25,
            brightness: 1.0,
        },
        overlay: Some(ColorOverlay {
            color: Rgba8::rgb(255, 140, 90),
            blend: BlendMode::Overlay,
            opacity: 0.12,
        }),
        grain: GrainParams {
            intensity: 0.55,
            opacity: 0.65,
        },
        glow: Some(0.25),
        mono_k: None,
    },
    StockParams {
        label: "Mono 400",
        tone: ToneParams {
            contrast: 1.1,
            saturation: 0.0,
            brightness: 1.05,
        },
        overlay: None,
        grain: GrainParams {
            intensity: 0.45,
            opacity: 0.6,
        },
        glow: Some(0.2),
        mono_k: Some(1.2),
    },
    StockParams {
        label: "Mono High",
        tone: ToneParams {
            contrast: 1.4,
            saturation: 0.0,
            brightness: 1.0,
        },
        overlay: None,
        grain: GrainParams {
            intensity: 0.6,
            opacity: 0.7,
        },
        glow: None,
        mono_k: Some(1.6),
    },
];

impl FilmStock {
    /// All stocks in table order.
    pub const ALL: [FilmStock; 4] = [
        FilmStock::Color400,
        FilmStock::Color800,
        FilmStock::Mono400,
        FilmStock::MonoHigh,
    ];

    /// The parameter row for this stock.
    pub fn params(self) -> &'static StockParams {
        &STOCK_TABLE[self as usize]
    }

    /// Stable wire identifier (`STOCK_A_400`, …).
    pub fn id(self) -> &'static str {
        match self {
            Self::Color400 => "STOCK_A_400",
            Self::Color800 => "STOCK_A_800",
            Self::Mono400 => "MONO_400",
            Self::MonoHigh => "MONO_HIGH",
        }
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        self.params().label
    }

    /// Monochrome stocks get the grayscale pass and single-channel encodes.
    pub fn is_mono(self) -> bool {
        self.params().mono_k.is_some()
    }
}

impl fmt::Display for FilmStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FilmStock {
    type Err = FilmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        match norm.as_str() {
            "stock_a_400" | "color400" | "color_400" => Ok(Self::Color400),
            "stock_a_800" | "color800" | "color_800" => Ok(Self::Color800),
            "mono_400" | "mono400" => Ok(Self::Mono400),
            "mono_high" | "monohigh" => Ok(Self::MonoHigh),
            _ => Err(FilmError::invalid_input(format!("unknown film stock '{s}'"))),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/stock.rs"]
mod tests;
