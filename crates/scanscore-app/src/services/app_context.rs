// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application context — owns the configuration and the expensive external
// collaborators (denoise model, OCR engine).
//
// Both collaborators are loaded on first use and then shared: every caller
// gets a clone of the same `Arc`. Loading happens outside the `OnceLock`, so
// two threads racing on first use may both load, but only one result is kept
// and returned to both.

use std::sync::{Arc, OnceLock};

use scanscore_core::AppConfig;
use scanscore_core::error::Result;
use scanscore_document::{Denoiser, PassthroughDenoiser, TextRecognizer};
use tracing::warn;

/// Shared state for processing requests. Construct once at startup and pass
/// by reference.
pub struct AppContext {
    config: AppConfig,
    denoiser: OnceLock<Arc<dyn Denoiser>>,
    recognizer: OnceLock<Arc<dyn TextRecognizer>>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            denoiser: OnceLock::new(),
            recognizer: OnceLock::new(),
        }
    }

    /// A context whose collaborators are already in place. Nothing is
    /// loaded from disk.
    pub fn with_components(
        config: AppConfig,
        denoiser: Arc<dyn Denoiser>,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Self {
        let ctx = Self::new(config);
        let _ = ctx.denoiser.set(denoiser);
        let _ = ctx.recognizer.set(recognizer);
        ctx
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // -- Collaborators --------------------------------------------------------

    /// The denoise model, loading it on first call.
    ///
    /// Without a configured model path the passthrough denoiser is used.
    pub fn denoiser(&self) -> Result<Arc<dyn Denoiser>> {
        if let Some(denoiser) = self.denoiser.get() {
            return Ok(Arc::clone(denoiser));
        }
        let loaded = load_denoiser(&self.config)?;
        Ok(Arc::clone(self.denoiser.get_or_init(|| loaded)))
    }

    /// The OCR engine, initialising it on first call.
    pub fn recognizer(&self) -> Result<Arc<dyn TextRecognizer>> {
        if let Some(recognizer) = self.recognizer.get() {
            return Ok(Arc::clone(recognizer));
        }
        let loaded = load_recognizer(&self.config)?;
        Ok(Arc::clone(self.recognizer.get_or_init(|| loaded)))
    }
}

fn load_denoiser(config: &AppConfig) -> Result<Arc<dyn Denoiser>> {
    match &config.denoise_model_path {
        None => {
            warn!("No denoise model configured; images pass through undenoised");
            Ok(Arc::new(PassthroughDenoiser))
        }
        #[cfg(feature = "denoise")]
        Some(path) => {
            let model = scanscore_document::RtenDenoiser::load(path)?;
            tracing::info!(path = %path.display(), "Denoise model ready");
            Ok(Arc::new(model))
        }
        #[cfg(not(feature = "denoise"))]
        Some(path) => {
            warn!(
                path = %path.display(),
                "Built without the `denoise` feature; ignoring the configured model"
            );
            Ok(Arc::new(PassthroughDenoiser))
        }
    }
}

#[cfg(feature = "ocr")]
fn load_recognizer(config: &AppConfig) -> Result<Arc<dyn TextRecognizer>> {
    use scanscore_document::{OcrConfig, TesseractRecognizer};

    let engine = TesseractRecognizer::new(OcrConfig {
        language: config.ocr_language.clone(),
        datapath: config.tessdata_dir.clone(),
    })?;
    tracing::info!(language = %config.ocr_language, "OCR engine ready");
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "ocr"))]
fn load_recognizer(_config: &AppConfig) -> Result<Arc<dyn TextRecognizer>> {
    warn!("Built without the `ocr` feature; text recognition will fail");
    Ok(Arc::new(scanscore_document::UnavailableRecognizer))
}
