//! Batch composite figure: a titled grid of the original and its
//! simulated variants.
//!
//! The batch path works on normalized floats: the source is scaled to
//! `[0, 1]`, each condition is applied, and the result is quantized back to
//! 8-bit before being placed in its cell.

use std::collections::BTreeMap;
use std::path::Path;

use image::{Rgb, RgbImage, imageops};
use serde::{Deserialize, Serialize};

use crate::config::SimulatorConfig;
use crate::engine::apply_transform;
use crate::error::{Result, SimError};
use crate::font;
use crate::image::SimImage;
use crate::io;
use crate::preview;
use crate::registry::Condition;

/// Placement of conditions on a fixed grid. Empty cells render as background.
///
/// Invariant: `cells.len() == rows * cols`. Deserialized layouts are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LayoutFields")]
pub struct FigureLayout {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Condition>>,
}

/// Unchecked serialized form of [`FigureLayout`].
#[derive(Deserialize)]
struct LayoutFields {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Condition>>,
}

impl TryFrom<LayoutFields> for FigureLayout {
    type Error = SimError;

    fn try_from(fields: LayoutFields) -> Result<Self> {
        let LayoutFields { rows, cols, cells } = fields;
        if cols == 0 && rows > 0 {
            return Err(SimError::Layout(format!("{rows} rows but no columns")));
        }
        if rows.checked_mul(cols) != Some(cells.len()) {
            return Err(SimError::Layout(format!(
                "{rows}x{cols} grid needs {} cells, got {}",
                rows.saturating_mul(cols),
                cells.len()
            )));
        }
        Ok(Self { rows, cols, cells })
    }
}

impl FigureLayout {
    /// An empty `rows × cols` grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// The classic three-row figure: normal vision and the red family on
    /// the first row, green on the second, blue on the third.
    pub fn standard() -> Self {
        use Condition::*;
        let order = [
            Some(Normal),
            Some(Protanomaly),
            Some(Protanopia),
            Some(Monochrome),
            None,
            Some(Deuteranomaly),
            Some(Deuteranopia),
            None,
            None,
            None,
            Some(Tritanomaly),
            Some(Tritanopia),
            Some(BlueConeMonochromacy),
            None,
            None,
        ];
        Self {
            rows: 3,
            cols: 5,
            cells: order.to_vec(),
        }
    }

    /// Pack `conditions` row-major into rows of `cols` cells.
    pub fn packed(conditions: &[Condition], cols: usize) -> Self {
        let cols = cols.max(1);
        let rows = conditions.len().div_ceil(cols);
        let mut layout = Self::new(rows, cols);
        for (slot, &condition) in layout.cells.iter_mut().zip(conditions) {
            *slot = Some(condition);
        }
        layout
    }

    /// Place `condition` at `(row, col)`. Out-of-range positions are ignored.
    pub fn with_cell(mut self, row: usize, col: usize, condition: Condition) -> Self {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = Some(condition);
        }
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Condition> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    /// Occupied cells as `(row, col, condition)`, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Condition)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.map(|c| (i / cols, i % cols, c)))
    }
}

impl Default for FigureLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// One rendered cell of the figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub condition: Condition,
    pub title: String,
    pub row: usize,
    pub col: usize,
    /// Top-left corner of the image area in figure pixels.
    pub x: u32,
    pub y: u32,
    /// Size of the placed image.
    pub width: u32,
    pub height: u32,
}

/// A rendered composite and the placement of its panels.
#[derive(Debug, Clone)]
pub struct Figure {
    canvas: RgbImage,
    panels: Vec<Panel>,
}

impl Figure {
    pub fn image(&self) -> &RgbImage {
        &self.canvas
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn into_image(self) -> RgbImage {
        self.canvas
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        io::save_rgb(&self.canvas, path)
    }
}

/// Cell geometry derived from the config.
struct Grid {
    cell_w: u32,
    cell_h: u32,
    title_h: u32,
}

impl Grid {
    fn new(config: &SimulatorConfig) -> Self {
        let scale = config.title_scale.max(1);
        let title_h = font::GLYPH_HEIGHT * scale + config.padding;
        Self {
            cell_w: config.cell_size.width + 2 * config.padding,
            cell_h: title_h + config.cell_size.height + 2 * config.padding,
            title_h,
        }
    }
}

/// Render `image` under every condition in `layout`.
#[allow(clippy::cast_possible_truncation)]
pub fn render_figure(
    image: &SimImage<u8>,
    layout: &FigureLayout,
    config: &SimulatorConfig,
) -> Figure {
    let grid = Grid::new(config);
    let mut canvas = RgbImage::from_pixel(
        grid.cell_w * layout.cols() as u32,
        grid.cell_h * layout.rows() as u32,
        Rgb(config.background),
    );
    let normalized = image.to_normalized();
    let scale = config.title_scale.max(1);

    // Monochrome variants share a transform; simulate each condition once.
    let mut rendered: BTreeMap<Condition, SimImage<u8>> = BTreeMap::new();
    let mut panels = Vec::new();

    for (row, col, condition) in layout.occupied() {
        let cell = rendered.entry(condition).or_insert_with(|| {
            let simulated = apply_transform(&normalized, condition.transform()).to_u8();
            preview::fit_to(&simulated, config.cell_size)
        });

        let origin_x = col as u32 * grid.cell_w;
        let origin_y = row as u32 * grid.cell_h;
        let slack_x = config.cell_size.width.saturating_sub(cell.width());
        let slack_y = config.cell_size.height.saturating_sub(cell.height());
        let x = origin_x + config.padding + slack_x / 2;
        let y = origin_y + grid.title_h + config.padding + slack_y / 2;
        imageops::overlay(&mut canvas, &cell.to_rgb_image(), i64::from(x), i64::from(y));

        let title = condition.title();
        let text_w = font::text_width(&title, scale);
        let text_x = i64::from(origin_x) + (i64::from(grid.cell_w) - i64::from(text_w)).max(0) / 2;
        let text_y = i64::from(origin_y + config.padding);
        font::draw_text(&mut canvas, text_x, text_y, &title, scale, Rgb(config.text_color));

        tracing::debug!(%condition, row, col, "placed figure panel");
        panels.push(Panel {
            condition,
            title,
            row,
            col,
            x,
            y,
            width: cell.width(),
            height: cell.height(),
        });
    }

    Figure { canvas, panels }
}

/// Load `input`, render the composite, and write it to `config.output_path`.
///
/// Nothing is written if loading fails.
pub fn write_figure(
    input: &Path,
    layout: &FigureLayout,
    config: &SimulatorConfig,
) -> Result<Figure> {
    let image = io::load_image(input)?;
    let figure = render_figure(&image, layout, config);
    figure.save(&config.output_path)?;
    tracing::info!(
        output = %config.output_path.display(),
        panels = figure.panels().len(),
        "wrote composite figure"
    );
    Ok(figure)
}
