//! Identity and lifecycle of injected collaborators.

use crate::Result;

/// Identity and lifecycle shared by the OCR engines folio can drive.
///
/// Implementations are shared between extractors through `Arc`, so they must
/// be `Send + Sync` and use interior mutability for any state.
pub trait Plugin: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    fn version(&self) -> String;

    /// Called by [`OcrFallback::new`](crate::ocr::OcrFallback::new) before the
    /// engine is used. An error here aborts construction.
    fn initialize(&self) -> Result<()>;
}
