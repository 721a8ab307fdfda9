//! In-memory collaborators shared by the integration tests.
//!
//! The fakes count every call so tests can assert which parts of the pipeline
//! ran. Rendered page images are `page_number` pixels wide, which lets the fake
//! OCR engine report which page it was handed.

#![allow(dead_code)]

use folio::cache::{MemoryPlaintextStore, PlaintextStore};
use folio::core::config::{ExtractionStrategy, OcrConfig};
use folio::ocr::{ModelHandle, OcrModelSet, OcrPrediction};
use folio::pdf::error::{PdfError, Result as PdfResult};
use folio::pdf::{NativeDocument, PageRasterizer, PageRenderOptions, TextExtractionBackend};
use folio::plugins::{OcrBackend, Plugin};
use folio::{FolioError, OcrFallback, PageExtractor, PdfExtractor, Result};
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Smallest byte string the format sniffer accepts as a PDF.
pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.7\n%folio test document\n".to_vec()
}

/// Write [`pdf_bytes`] to a temporary file.
pub fn pdf_file() -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    std::fs::write(file.path(), pdf_bytes()).unwrap();
    file
}

#[derive(Default)]
pub struct TextCounters {
    pub opens: AtomicUsize,
    pub page_reads: AtomicUsize,
}

/// Text backend serving a fixed list of page texts.
pub struct FakeTextBackend {
    pages: Vec<String>,
    counters: Arc<TextCounters>,
    fail_on_page: Option<usize>,
}

impl FakeTextBackend {
    pub fn new(pages: &[&str]) -> (Self, Arc<TextCounters>) {
        let counters = Arc::new(TextCounters::default());
        let backend = Self {
            pages: pages.iter().map(|page| page.to_string()).collect(),
            counters: Arc::clone(&counters),
            fail_on_page: None,
        };
        (backend, counters)
    }

    pub fn failing_on(mut self, page_index: usize) -> Self {
        self.fail_on_page = Some(page_index);
        self
    }
}

struct FakeDocument<'a> {
    backend: &'a FakeTextBackend,
}

impl TextExtractionBackend for FakeTextBackend {
    fn open<'a>(&'a self, _pdf_bytes: &'a [u8]) -> PdfResult<Box<dyn NativeDocument + 'a>> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDocument { backend: self }))
    }

    fn name(&self) -> &str {
        "fake-text"
    }
}

impl NativeDocument for FakeDocument<'_> {
    fn page_count(&self) -> usize {
        self.backend.pages.len()
    }

    fn page_text(&self, page_index: usize) -> PdfResult<String> {
        self.backend.counters.page_reads.fetch_add(1, Ordering::SeqCst);
        if self.backend.fail_on_page == Some(page_index) {
            return Err(PdfError::TextExtractionFailed(format!("page {} is corrupt", page_index)));
        }
        self.backend
            .pages
            .get(page_index)
            .cloned()
            .ok_or(PdfError::PageNotFound(page_index))
    }
}

/// Rasterizer producing one blank image per requested page.
pub struct FakeRasterizer {
    pub rendered_pages: Arc<Mutex<Vec<usize>>>,
}

impl FakeRasterizer {
    pub fn new() -> (Self, Arc<Mutex<Vec<usize>>>) {
        let rendered_pages = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                rendered_pages: Arc::clone(&rendered_pages),
            },
            rendered_pages,
        )
    }
}

impl PageRasterizer for FakeRasterizer {
    fn render_pages(
        &self,
        _pdf_bytes: &[u8],
        first_page: usize,
        last_page: usize,
        _options: &PageRenderOptions,
    ) -> PdfResult<Vec<DynamicImage>> {
        Ok((first_page..=last_page)
            .map(|page_number| {
                self.rendered_pages.lock().unwrap().push(page_number);
                DynamicImage::ImageRgba8(RgbaImage::new(page_number as u32, 4))
            })
            .collect())
    }
}

/// OCR engine that "recognizes" the page number encoded in the image width.
#[derive(Default)]
pub struct FakeOcrBackend {
    pub detection_loads: AtomicUsize,
    pub recognition_loads: AtomicUsize,
    pub processor_loads: AtomicUsize,
    pub runs: AtomicUsize,
    pub fail: bool,
    pub last_languages: Mutex<Vec<String>>,
    pub detection_path: Mutex<Option<PathBuf>>,
}

impl FakeOcrBackend {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn model_loads(&self) -> usize {
        self.detection_loads.load(Ordering::SeqCst)
    }

    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Plugin for FakeOcrBackend {
    fn name(&self) -> &str {
        "fake-ocr"
    }

    fn version(&self) -> String {
        "0.0.1".to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }
}

impl OcrBackend for FakeOcrBackend {
    fn load_detection_model(&self, path: &Path) -> Result<ModelHandle> {
        self.detection_loads.fetch_add(1, Ordering::SeqCst);
        *self.detection_path.lock().unwrap() = Some(path.to_path_buf());
        Ok(Arc::new("detection"))
    }

    fn load_recognition_model(&self) -> Result<ModelHandle> {
        self.recognition_loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new("recognition"))
    }

    fn load_recognition_processor(&self) -> Result<ModelHandle> {
        self.processor_loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new("processor"))
    }

    fn run_ocr(
        &self,
        images: &[DynamicImage],
        languages: &[String],
        _models: &OcrModelSet,
    ) -> Result<Vec<OcrPrediction>> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        *self.last_languages.lock().unwrap() = languages.to_vec();
        if self.fail {
            return Err(FolioError::ocr("recognizer crashed"));
        }
        Ok(images
            .iter()
            .map(|image| {
                let page_index = image.width() - 1;
                OcrPrediction::from_lines([format!("ocr page {}", page_index), "second line".to_string()])
            })
            .collect())
    }
}

/// Text an OCR'd page gets from [`FakeOcrBackend`].
pub fn ocr_text(page_index: usize) -> String {
    format!("ocr page {}\nsecond line", page_index)
}

/// Plaintext store wrapper that counts loads and saves.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryPlaintextStore,
    pub loads: AtomicUsize,
    pub saves: AtomicUsize,
    pub fail_saves: bool,
}

impl CountingStore {
    pub fn with_entry(key: &str, bytes: &[u8]) -> Self {
        let store = Self::default();
        store.inner.save(key, bytes).unwrap();
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .load(key)
            .ok()
            .map(|bytes| String::from_utf8(bytes).unwrap())
    }
}

impl PlaintextStore for CountingStore {
    fn load(&self, key: &str) -> Result<Vec<u8>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(key)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(FolioError::cache("disk full"));
        }
        self.inner.save(key, bytes)
    }
}

pub fn ocr_config() -> OcrConfig {
    OcrConfig {
        model_dir: Some(PathBuf::from("/models/folio")),
        ..Default::default()
    }
}

pub fn ocr_fallback(backend: Arc<FakeOcrBackend>) -> (OcrFallback, Arc<Mutex<Vec<usize>>>) {
    let (rasterizer, rendered) = FakeRasterizer::new();
    let fallback = OcrFallback::new(
        backend,
        Box::new(rasterizer),
        ocr_config(),
        PageRenderOptions::default(),
    )
    .unwrap();
    (fallback, rendered)
}

/// Everything a pipeline test needs to inspect after a run.
pub struct Pipeline {
    pub extractor: PdfExtractor,
    pub text: Arc<TextCounters>,
    pub ocr: Option<Arc<FakeOcrBackend>>,
    pub rendered: Arc<Mutex<Vec<usize>>>,
}

pub struct PipelineBuilder {
    backend: FakeTextBackend,
    text: Arc<TextCounters>,
    ocr: Option<Arc<FakeOcrBackend>>,
    strategy: ExtractionStrategy,
    store: Option<(Arc<dyn PlaintextStore>, bool)>,
}

impl PipelineBuilder {
    pub fn new(pages: &[&str]) -> Self {
        let (backend, text) = FakeTextBackend::new(pages);
        Self {
            backend,
            text,
            ocr: None,
            strategy: ExtractionStrategy::Standard,
            store: None,
        }
    }

    pub fn failing_on(mut self, page_index: usize) -> Self {
        self.backend = self.backend.failing_on(page_index);
        self
    }

    pub fn ocr(mut self, backend: Arc<FakeOcrBackend>) -> Self {
        self.ocr = Some(backend);
        self
    }

    pub fn strategy(mut self, strategy: ExtractionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn store(mut self, store: Arc<dyn PlaintextStore>, write_back: bool) -> Self {
        self.store = Some((store, write_back));
        self
    }

    pub fn build(self) -> Pipeline {
        let (fallback, rendered) = match &self.ocr {
            Some(backend) => {
                let (fallback, rendered) = ocr_fallback(Arc::clone(backend));
                (Some(Arc::new(fallback)), rendered)
            }
            None => (None, Arc::new(Mutex::new(Vec::new()))),
        };

        let pages = PageExtractor::new(Box::new(self.backend), fallback, self.strategy).unwrap();
        let mut extractor = PdfExtractor::new(pages);
        if let Some((store, write_back)) = self.store {
            extractor = extractor.with_store(store, write_back);
        }

        Pipeline {
            extractor,
            text: self.text,
            ocr: self.ocr,
            rendered,
        }
    }
}

impl Pipeline {
    pub fn opens(&self) -> usize {
        self.text.opens.load(Ordering::SeqCst)
    }

    pub fn page_reads(&self) -> usize {
        self.text.page_reads.load(Ordering::SeqCst)
    }

    pub fn ocr_runs(&self) -> usize {
        self.ocr.as_ref().map_or(0, |ocr| ocr.run_count())
    }

    pub fn rendered_pages(&self) -> Vec<usize> {
        self.rendered.lock().unwrap().clone()
    }
}
