//! 2×2 grid geometry shared by the stitcher, the developer and any playback overlay.
//!
//! The ratio constants below are the layout contract. Anything that draws a grid and anything
//! that later locates or re-slices it must go through [`GridGeometry`]; nothing else may derive
//! padding or gap sizes on its own.

use serde::{Deserialize, Serialize};

use crate::foundation::core::RectPx;

/// Version of the grid ratio contract. Bump when any ratio below changes.
pub const GRID_CONTRACT_VERSION: u32 = 1;

/// Layout variant of the 2×2 grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridVariant {
    /// Canonical layout: tile : padding : gap = 1 : 0.05 : 0.02, square canvas.
    #[default]
    Simple,
    /// Legacy layout with header/footer text bands: 1 : 0.1 : 0.04, header 0.3, footer 0.4.
    Bannered,
}

/// Ratios of one variant, in thousandths of the tile edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridRatios {
    /// Outer padding.
    pub padding_permille: u32,
    /// Gap between tiles.
    pub gap_permille: u32,
    /// Header band height.
    pub header_permille: u32,
    /// Footer band height.
    pub footer_permille: u32,
}

impl GridRatios {
    /// Canvas width expressed in tile thousandths (`2 + 2·padding + gap`), e.g. 2120 for 2.12.
    pub const fn width_divisor_permille(self) -> u32 {
        2000 + 2 * self.padding_permille + self.gap_permille
    }
}

/// Ratios of [`GridVariant::Simple`].
pub const SIMPLE_RATIOS: GridRatios = GridRatios {
    padding_permille: 50,
    gap_permille: 20,
    header_permille: 0,
    footer_permille: 0,
};

/// Ratios of [`GridVariant::Bannered`].
pub const BANNERED_RATIOS: GridRatios = GridRatios {
    padding_permille: 100,
    gap_permille: 40,
    header_permille: 300,
    footer_permille: 400,
};

impl GridVariant {
    /// Ratio table for this variant.
    pub const fn ratios(self) -> GridRatios {
        match self {
            Self::Simple => SIMPLE_RATIOS,
            Self::Bannered => BANNERED_RATIOS,
        }
    }
}

/// One of the four grid positions, in capture order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// First captured frame.
    TopLeft,
    /// Second captured frame.
    TopRight,
    /// Third captured frame.
    BottomLeft,
    /// Fourth captured frame.
    BottomRight,
}

impl Quadrant {
    /// All quadrants in capture order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Capture-order index (0..4).
    pub fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomLeft => 2,
            Self::BottomRight => 3,
        }
    }

    /// Quadrant for a capture-order index.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

fn permille_floor(tile: u32, permille: u32) -> u32 {
    ((u64::from(tile) * u64::from(permille)) / 1000) as u32
}

/// Integer layout of a 2×2 grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Variant the geometry was computed for.
    pub variant: GridVariant,
    /// Tile edge `S`.
    pub tile: u32,
    /// Outer padding `P`.
    pub padding: u32,
    /// Inter-tile gap `G`.
    pub gap: u32,
    /// Header band height (0 for `Simple`).
    pub header: u32,
    /// Footer band height (0 for `Simple`).
    pub footer: u32,
    /// Quadrant rectangles in capture order.
    pub quadrants: [RectPx; 4],
}

impl GridGeometry {
    /// Geometry for an integer tile edge. All derived sizes floor from the integer tile.
    pub fn from_tile(tile: u32, variant: GridVariant) -> Self {
        let r = variant.ratios();
        let padding = permille_floor(tile, r.padding_permille);
        let gap = permille_floor(tile, r.gap_permille);
        let header = permille_floor(tile, r.header_permille);
        let footer = permille_floor(tile, r.footer_permille);

        let x0 = padding;
        let x1 = padding + tile + gap;
        let y0 = header + padding;
        let y1 = header + padding + tile + gap;
        let quadrants = [
            RectPx::new(x0, y0, tile, tile),
            RectPx::new(x1, y0, tile, tile),
            RectPx::new(x0, y1, tile, tile),
            RectPx::new(x1, y1, tile, tile),
        ];

        Self {
            variant,
            tile,
            padding,
            gap,
            header,
            footer,
            quadrants,
        }
    }

    /// Canvas width `2S + G + 2P`.
    pub fn canvas_width(&self) -> u32 {
        2 * self.tile + self.gap + 2 * self.padding
    }

    /// Canvas height: the square grid plus header and footer bands.
    pub fn canvas_height(&self) -> u32 {
        self.canvas_width() + self.header + self.footer
    }

    /// Rectangle of quadrant `q`.
    pub fn quadrant(&self, q: Quadrant) -> RectPx {
        self.quadrants[q.index()]
    }

    /// Region spanned by the four tiles (without padding).
    pub fn content_rect(&self) -> RectPx {
        let edge = 2 * self.tile + self.gap;
        RectPx::new(self.padding, self.header + self.padding, edge, edge)
    }

    /// Header band (empty for `Simple`).
    pub fn header_rect(&self) -> RectPx {
        RectPx::new(0, 0, self.canvas_width(), self.header)
    }

    /// Footer band (empty for `Simple`).
    pub fn footer_rect(&self) -> RectPx {
        RectPx::new(
            0,
            self.header + self.canvas_width(),
            self.canvas_width(),
            self.footer,
        )
    }

    /// Return `true` when the tile is zero (width too small for any grid).
    pub fn is_degenerate(&self) -> bool {
        self.tile == 0
    }

    /// Return `true` when every quadrant lies inside a `width`×`height` canvas.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_degenerate() && self.canvas_width() <= width && self.canvas_height() <= height
    }
}

/// Geometry for a canvas `width` pixels wide.
///
/// Picks the largest integer tile whose canonical canvas width does not exceed `width`, so the
/// geometry recovered from a stitched sheet is exactly the geometry that drew it:
/// `compute_grid_geometry(g.canvas_width(), g.variant) == g`.
pub fn compute_grid_geometry(width: u32, variant: GridVariant) -> GridGeometry {
    let divisor = variant.ratios().width_divisor_permille();
    let canvas_w = |tile: u32| GridGeometry::from_tile(tile, variant).canvas_width();

    let mut tile = ((u64::from(width) * 1000) / u64::from(divisor)) as u32;
    while tile > 0 && canvas_w(tile) > width {
        tile -= 1;
    }
    while canvas_w(tile + 1) <= width {
        tile += 1;
    }
    GridGeometry::from_tile(tile, variant)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/grid.rs"]
mod tests;
