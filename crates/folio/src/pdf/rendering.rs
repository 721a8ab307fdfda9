use serde::{Deserialize, Serialize};

#[cfg(feature = "pdf")]
use super::backend::PageRasterizer;
#[cfg(feature = "pdf")]
use super::bindings::bind_pdfium;
#[cfg(feature = "pdf")]
use super::error::{PdfError, Result};
#[cfg(feature = "pdf")]
use image::DynamicImage;
#[cfg(feature = "pdf")]
use pdfium_render::prelude::*;

const PDF_POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRenderOptions {
    pub target_dpi: i32,
    pub max_image_dimension: i32,
    pub auto_adjust_dpi: bool,
    pub min_dpi: i32,
    pub max_dpi: i32,
}

impl Default for PageRenderOptions {
    fn default() -> Self {
        Self {
            target_dpi: 300,
            max_image_dimension: 65536,
            auto_adjust_dpi: true,
            min_dpi: 72,
            max_dpi: 600,
        }
    }
}

impl PageRenderOptions {
    /// DPI used for a page of the given size in PDF points.
    pub fn dpi_for(&self, page_width: f64, page_height: f64) -> i32 {
        if self.auto_adjust_dpi {
            calculate_optimal_dpi(
                page_width,
                page_height,
                self.target_dpi,
                self.max_image_dimension,
                self.min_dpi,
                self.max_dpi,
            )
        } else {
            self.target_dpi
        }
    }
}

/// Check an inclusive, 1-indexed page range against a document's page count.
pub(crate) fn validate_page_range(first_page: usize, last_page: usize, page_count: usize) -> super::error::Result<()> {
    if first_page == 0 || last_page < first_page {
        return Err(super::error::PdfError::InvalidPageRange {
            first: first_page,
            last: last_page,
        });
    }
    if last_page > page_count {
        return Err(super::error::PdfError::PageNotFound(last_page));
    }
    Ok(())
}

#[cfg(feature = "pdf")]
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

#[cfg(feature = "pdf")]
impl PdfiumRasterizer {
    pub fn new() -> Result<Self> {
        let binding = bind_pdfium(PdfError::RenderingFailed, "page rendering")?;

        let pdfium = Pdfium::new(binding);
        Ok(Self { pdfium })
    }

    fn render_page(&self, page: &PdfPage<'_>, options: &PageRenderOptions) -> Result<DynamicImage> {
        let width_points = page.width().value;
        let height_points = page.height().value;

        let dpi = options.dpi_for(width_points as f64, height_points as f64);
        let scale = dpi as f64 / PDF_POINTS_PER_INCH;

        let config = PdfRenderConfig::new()
            .set_target_width(((width_points * scale as f32) as i32).max(1))
            .set_target_height(((height_points * scale as f32) as i32).max(1))
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PdfError::RenderingFailed(format!("Failed to render page: {}", e)))?;

        Ok(DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8()))
    }
}

#[cfg(feature = "pdf")]
impl PageRasterizer for PdfiumRasterizer {
    fn render_pages(
        &self,
        pdf_bytes: &[u8],
        first_page: usize,
        last_page: usize,
        options: &PageRenderOptions,
    ) -> Result<Vec<DynamicImage>> {
        let document = super::text::load_document(&self.pdfium, pdf_bytes)?;
        let page_count = document.pages().len() as usize;
        validate_page_range(first_page, last_page, page_count)?;

        let mut images = Vec::with_capacity(last_page - first_page + 1);
        for page_number in first_page..=last_page {
            let page = document
                .pages()
                .get((page_number - 1) as u16)
                .map_err(|_| PdfError::PageNotFound(page_number))?;
            images.push(self.render_page(&page, options)?);
        }

        Ok(images)
    }
}

fn calculate_optimal_dpi(
    page_width: f64,
    page_height: f64,
    target_dpi: i32,
    max_dimension: i32,
    min_dpi: i32,
    max_dpi: i32,
) -> i32 {
    let width_inches = page_width / PDF_POINTS_PER_INCH;
    let height_inches = page_height / PDF_POINTS_PER_INCH;

    let width_at_target = (width_inches * target_dpi as f64) as i32;
    let height_at_target = (height_inches * target_dpi as f64) as i32;

    if width_at_target <= max_dimension && height_at_target <= max_dimension {
        return target_dpi.clamp(min_dpi, max_dpi);
    }

    let width_limited_dpi = (max_dimension as f64 / width_inches) as i32;
    let height_limited_dpi = (max_dimension as f64 / height_inches) as i32;

    width_limited_dpi.min(height_limited_dpi).clamp(min_dpi, max_dpi)
}
