//! PDF rasterisation: turn every page of a PDF into a `DynamicImage`.
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which is not safe
//! to drive from async code, so rendering runs inside
//! `tokio::task::spawn_blocking`.
//!
//! Pages come back strictly in document order. The answer segmenter relies on
//! it: page order decides text order, and text order decides which answer is
//! "question N".

use crate::error::RenderError;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable consulted when no library path is configured.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Turns a PDF file into one image per page, in page order.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, RenderError>;
}

/// [`PageRenderer`] backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRenderer {
    library_path: Option<PathBuf>,
    max_pixels: u32,
    password: Option<String>,
}

impl PdfiumRenderer {
    /// `library_path` may point at the shared library itself or at the
    /// directory that contains it.
    pub fn new(library_path: Option<PathBuf>, max_pixels: u32, password: Option<String>) -> Self {
        Self {
            library_path,
            max_pixels,
            password,
        }
    }
}

#[async_trait]
impl PageRenderer for PdfiumRenderer {
    async fn render(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, RenderError> {
        let path = pdf_path.to_path_buf();
        let library_path = self.library_path.clone();
        let max_pixels = self.max_pixels;
        let password = self.password.clone();

        tokio::task::spawn_blocking(move || {
            render_pages_blocking(&path, library_path.as_deref(), max_pixels, password.as_deref())
        })
        .await
        .map_err(|e| RenderError::Internal(format!("Render task panicked: {e}")))?
    }
}

/// Bind to pdfium: explicit path, then `PDFIUM_LIB_PATH`, then the system library.
fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, RenderError> {
    let configured = library_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from));

    let bindings = match configured {
        Some(p) => {
            let lib = if p.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&p)
            } else {
                p
            };
            debug!("Binding pdfium at {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| RenderError::LibraryUnavailable {
        detail: format!("{e:?}"),
    })?;

    Ok(Pdfium::new(bindings))
}

fn render_pages_blocking(
    pdf_path: &Path,
    library_path: Option<&Path>,
    max_pixels: u32,
    password: Option<&str>,
) -> Result<Vec<DynamicImage>, RenderError> {
    let pdfium = bind_pdfium(library_path)?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                RenderError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                RenderError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            RenderError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages ({})", total_pages, pdf_path.display());

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut images = Vec::with_capacity(total_pages);

    for idx in 0..total_pages {
        let page = pages
            .get(idx as u16)
            .map_err(|e| RenderError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            RenderError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        images.push(image);
    }

    Ok(images)
}
