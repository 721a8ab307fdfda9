use super::error::PdfError;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Mutex;

/// Directory holding a pdfium shared library to bind against instead of the
/// system search path.
pub const PDFIUM_DIR_ENV: &str = "FOLIO_PDFIUM_DIR";

/// Cached outcome of the first binding attempt.
enum InitializationState {
    Uninitialized,
    /// Binding succeeded; later bindings are created from the same location.
    Initialized { lib_dir: Option<PathBuf> },
    /// Binding failed; the message is replayed on every later call.
    Failed(String),
}

/// Process-wide pdfium state.
///
/// The state (library location or failure) is cached rather than the bindings
/// themselves, since `Box<dyn PdfiumLibraryBindings>` is not `Clone`. The mutex
/// makes sure only one thread performs the first bind while others wait.
static PDFIUM_STATE: Lazy<Mutex<InitializationState>> = Lazy::new(|| Mutex::new(InitializationState::Uninitialized));

fn configured_lib_dir() -> Option<PathBuf> {
    std::env::var_os(PDFIUM_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn bind_from(lib_dir: Option<&PathBuf>) -> Result<Box<dyn PdfiumLibraryBindings>, String> {
    match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            .map_err(|e| format!("Failed to bind pdfium at '{}': {}", dir.display(), e)),
        None => Pdfium::bind_to_system_library().map_err(|e| format!("Failed to bind system pdfium: {}", e)),
    }
}

/// Get pdfium bindings, initializing the library location on first use.
///
/// `map_err` chooses the `PdfError` variant reported to the caller and
/// `context` names the operation in the error message.
pub(crate) fn bind_pdfium(
    map_err: fn(String) -> PdfError,
    context: &'static str,
) -> Result<Box<dyn PdfiumLibraryBindings>, PdfError> {
    let mut state = PDFIUM_STATE
        .lock()
        .map_err(|e| map_err(format!("Failed to acquire lock on pdfium state ({}): {}", context, e)))?;

    match &*state {
        InitializationState::Uninitialized => {
            let lib_dir = configured_lib_dir();
            match bind_from(lib_dir.as_ref()) {
                Ok(bindings) => {
                    tracing::debug!(lib_dir = ?lib_dir, "pdfium bound");
                    *state = InitializationState::Initialized { lib_dir };
                    Ok(bindings)
                }
                Err(err) => {
                    *state = InitializationState::Failed(err.clone());
                    Err(map_err(format!("Pdfium initialization failed ({}): {}", context, err)))
                }
            }
        }
        InitializationState::Failed(err) => Err(map_err(format!(
            "Pdfium initialization previously failed ({}): {}",
            context, err
        ))),
        InitializationState::Initialized { lib_dir } => bind_from(lib_dir.as_ref())
            .map_err(|e| map_err(format!("Failed to create pdfium bindings ({}): {}", context, e))),
    }
}
