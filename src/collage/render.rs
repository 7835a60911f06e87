use std::{future::Future, io::Cursor};

use askama::Template;
use image::{ImageFormat, Rgba, RgbaImage, imageops};
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use super::{CollageGrid, PLACEHOLDER_COVER};
use crate::utils;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing has been drawn yet")]
    Empty,
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),
}

/// A rendered collage ready to be saved or downloaded.
#[derive(Debug, Clone)]
pub struct Export {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Draws a grid and turns the drawing into a downloadable file.
pub trait Renderer {
    fn draw_grid(&mut self, grid: &CollageGrid) -> impl Future<Output = Result<(), RenderError>> + Send;

    fn export(&self) -> Result<Export, RenderError>;
}

#[derive(Template)]
#[template(path = "collage_grid.html")]
struct GridTemplate<'a> {
    size: u32,
    cells: &'a [String],
}

#[derive(Template)]
#[template(path = "collage_export.html")]
struct ExportTemplate<'a> {
    grid: &'a str,
}

/// Renders the grid as markup: a `div.collage` CSS grid of `img.collage-content`.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    markup: Option<String>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup of the last drawn grid.
    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }
}

impl Renderer for HtmlRenderer {
    async fn draw_grid(&mut self, grid: &CollageGrid) -> Result<(), RenderError> {
        let markup = GridTemplate {
            size: grid.size,
            cells: &grid.cells,
        }
        .render()?;
        self.markup = Some(markup);
        Ok(())
    }

    fn export(&self) -> Result<Export, RenderError> {
        let grid = self.markup.as_deref().ok_or(RenderError::Empty)?;
        let document = ExportTemplate { grid }.render()?;
        Ok(Export {
            file_name: utils::export_file_name("html"),
            content_type: "text/html; charset=utf-8",
            bytes: document.into_bytes(),
        })
    }
}

/// Edge length of one cover in the raster output, in pixels.
pub const TILE_SIZE: u32 = 300;

const PLACEHOLDER_RGBA: Rgba<u8> = Rgba([40, 40, 40, 255]);

/// Composites cover art into a single PNG.
///
/// Covers are downloaded one by one, cropped to a square and scaled to
/// [`TILE_SIZE`]. Placeholder cells and covers that fail to download or
/// decode are drawn as a flat dark tile.
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    client: Client,
    tile: u32,
    canvas: Option<RgbaImage>,
}

impl RasterRenderer {
    pub fn new(client: Client) -> Self {
        Self::with_tile_size(client, TILE_SIZE)
    }

    pub fn with_tile_size(client: Client, tile: u32) -> Self {
        Self {
            client,
            tile: tile.max(1),
            canvas: None,
        }
    }

    pub fn canvas(&self) -> Option<&RgbaImage> {
        self.canvas.as_ref()
    }

    async fn fetch_tile(&self, url: &str) -> Result<RgbaImage, RenderError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let cover = image::load_from_memory(&bytes)?;
        Ok(cover
            .resize_to_fill(self.tile, self.tile, imageops::FilterType::Triangle)
            .to_rgba8())
    }

    fn placeholder_tile(&self) -> RgbaImage {
        RgbaImage::from_pixel(self.tile, self.tile, PLACEHOLDER_RGBA)
    }
}

impl Renderer for RasterRenderer {
    async fn draw_grid(&mut self, grid: &CollageGrid) -> Result<(), RenderError> {
        let size = grid.size.max(1);
        let edge = size * self.tile;
        let mut canvas = RgbaImage::from_pixel(edge, edge, PLACEHOLDER_RGBA);

        for (i, cell) in grid.cells.iter().enumerate() {
            let i = i as u32;
            let x = i64::from((i % size) * self.tile);
            let y = i64::from((i / size) * self.tile);

            let tile = if cell == PLACEHOLDER_COVER {
                self.placeholder_tile()
            } else {
                match self.fetch_tile(cell).await {
                    Ok(tile) => tile,
                    Err(e) => {
                        warn!(error = %e, cell = %cell, "cover unavailable, using placeholder");
                        self.placeholder_tile()
                    }
                }
            };
            imageops::overlay(&mut canvas, &tile, x, y);
        }

        self.canvas = Some(canvas);
        Ok(())
    }

    fn export(&self) -> Result<Export, RenderError> {
        let canvas = self.canvas.as_ref().ok_or(RenderError::Empty)?;
        let mut bytes = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(Export {
            file_name: utils::export_file_name("png"),
            content_type: "image/png",
            bytes,
        })
    }
}
