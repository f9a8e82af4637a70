// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR (Optical Character Recognition) — the boundary to the text engine.
//
// An engine returns two things for one page: a plain transcription, and a
// token table with the page / block / paragraph / line each token sits on
// and its confidence. The table arrives in Tesseract's TSV layout:
//
// ```text
// level page_num block_num par_num line_num word_num left top width height conf text
// ```
//
// # Feature Gate
//
// The Tesseract-backed engine is only compiled with the `ocr` feature. It
// needs the Tesseract and Leptonica system libraries plus the traineddata
// for each configured language. Without the feature, [`UnavailableRecognizer`]
// reports every call as a failure.

use std::path::PathBuf;

use image::DynamicImage;
use scanscore_core::error::{Result, ScanScoreError};
use scanscore_core::{Recognition, TokenRecord};

/// An engine that reads text from a page image.
pub trait TextRecognizer: Send + Sync {
    /// Human-readable engine name used in logs.
    fn name(&self) -> &str;

    /// Transcribe `image` and return the per-token table alongside.
    ///
    /// # Errors
    ///
    /// An OCR `ExternalService` error if the engine cannot run.
    fn recognize(&self, image: &DynamicImage) -> Result<Recognition>;
}

/// Settings for constructing a [`TesseractRecognizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Tesseract language code(s), e.g. "eng" or "eng+deu".
    pub language: String,
    /// Directory holding the traineddata files; `None` uses the system default.
    pub datapath: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".into(),
            datapath: None,
        }
    }
}

// -- Token table --------------------------------------------------------------

const TSV_COLUMNS: usize = 12;

/// Parse Tesseract's TSV output into token records.
///
/// The optional header row is skipped, as are blank lines. A row whose text
/// column is missing or empty yields a token with empty text; structural
/// rows (page, block, paragraph, line) carry confidence `-1` and are kept so
/// the caller decides what to drop.
///
/// # Errors
///
/// An OCR `ExternalService` error on a row with too few columns or a
/// non-numeric field.
pub fn parse_tsv(tsv: &str) -> Result<Vec<TokenRecord>> {
    let mut tokens = Vec::new();

    for (index, row) in tsv.lines().enumerate() {
        if row.trim().is_empty() || row.starts_with("level") {
            continue;
        }

        let fields: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
        if fields.len() < TSV_COLUMNS - 1 {
            return Err(ScanScoreError::ocr(format!(
                "malformed TSV row {}: expected {} columns, got {}",
                index + 1,
                TSV_COLUMNS,
                fields.len()
            )));
        }

        let int = |col: usize, name: &str| -> Result<u32> {
            fields[col].trim().parse::<u32>().map_err(|_| {
                ScanScoreError::ocr(format!(
                    "malformed TSV row {}: {} is {:?}",
                    index + 1,
                    name,
                    fields[col]
                ))
            })
        };

        let confidence = fields[10].trim().parse::<f32>().map_err(|_| {
            ScanScoreError::ocr(format!(
                "malformed TSV row {}: conf is {:?}",
                index + 1,
                fields[10]
            ))
        })?;

        tokens.push(TokenRecord {
            page_num: int(1, "page_num")?,
            block_num: int(2, "block_num")?,
            par_num: int(3, "par_num")?,
            line_num: int(4, "line_num")?,
            confidence,
            text: fields.get(11).map(|t| t.trim_end_matches('\r')).unwrap_or("").to_string(),
        });
    }

    Ok(tokens)
}

// -- Engines ------------------------------------------------------------------

/// Stand-in engine for builds without the `ocr` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRecognizer;

impl TextRecognizer for UnavailableRecognizer {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<Recognition> {
        tracing::warn!("TextRecognizer::recognize called without an OCR engine");
        Err(ScanScoreError::ocr(
            "text recognition is not available; rebuild with the `ocr` feature",
        ))
    }
}

#[cfg(feature = "ocr")]
pub use tesseract::TesseractRecognizer;

#[cfg(feature = "ocr")]
mod tesseract {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat};
    use leptess::LepTess;
    use scanscore_core::Recognition;
    use scanscore_core::error::{Result, ScanScoreError};
    use tracing::{debug, info, instrument};

    use super::{OcrConfig, TextRecognizer, parse_tsv};

    /// Tesseract via `leptess`.
    ///
    /// A fresh Tesseract handle is created for each page, so the recognizer
    /// itself holds only its settings and can be shared between threads.
    #[derive(Debug, Clone)]
    pub struct TesseractRecognizer {
        config: OcrConfig,
    }

    impl TesseractRecognizer {
        /// Check that Tesseract initialises with the configured language.
        ///
        /// # Errors
        ///
        /// An OCR `ExternalService` error if the library or the language
        /// data is missing.
        #[instrument(skip_all, fields(language = %config.language))]
        pub fn new(config: OcrConfig) -> Result<Self> {
            let recognizer = Self { config };
            recognizer.engine()?;
            info!("Tesseract initialised");
            Ok(recognizer)
        }

        fn engine(&self) -> Result<LepTess> {
            let datapath = self.config.datapath.as_deref().and_then(|p| p.to_str());
            LepTess::new(datapath, &self.config.language).map_err(|err| {
                ScanScoreError::ocr(format!(
                    "failed to initialise Tesseract with language '{}': {}",
                    self.config.language, err
                ))
            })
        }
    }

    impl TextRecognizer for TesseractRecognizer {
        fn name(&self) -> &str {
            "tesseract"
        }

        #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
        fn recognize(&self, image: &DynamicImage) -> Result<Recognition> {
            let mut engine = self.engine()?;

            // leptess decodes encoded image data, not raw pixels.
            let mut png = Cursor::new(Vec::new());
            image
                .write_to(&mut png, ImageFormat::Png)
                .map_err(|err| ScanScoreError::ocr(format!("failed to encode page as PNG: {err}")))?;
            engine
                .set_image_from_mem(png.get_ref())
                .map_err(|err| ScanScoreError::ocr(format!("failed to load page: {err}")))?;

            let text = engine
                .get_utf8_text()
                .map_err(|err| ScanScoreError::ocr(format!("text recognition failed: {err}")))?;
            let tsv = engine
                .get_tsv_text(0)
                .map_err(|err| ScanScoreError::ocr(format!("token table failed: {err}")))?;
            let tokens = parse_tsv(&tsv)?;

            debug!(chars = text.len(), tokens = tokens.len(), "Page recognised");
            Ok(Recognition { text, tokens })
        }
    }
}
