// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Denoising — the boundary to the learned denoise model.
//
// The model takes a `(1, height, width, 1)` tensor of grayscale samples in
// `[0, 1]` and returns a tensor of the same shape. Any implementation of
// [`Denoiser`] can stand in for it; the `rten`-backed one is compiled only
// with the `denoise` feature.

use rten_tensor::NdTensor;
use scanscore_core::error::Result;

/// A model that maps a normalised grayscale tensor to a cleaner one.
///
/// Implementations are shared across requests behind an `Arc`, so they must
/// be thread-safe and must not mutate state in [`denoise`](Self::denoise).
pub trait Denoiser: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Run the model on one `(1, height, width, 1)` tensor.
    ///
    /// # Errors
    ///
    /// An `ExternalService` error naming the denoiser if inference fails.
    fn denoise(&self, input: &NdTensor<f32, 4>) -> Result<NdTensor<f32, 4>>;
}

/// Returns its input unchanged. Used when no model file is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughDenoiser;

impl Denoiser for PassthroughDenoiser {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn denoise(&self, input: &NdTensor<f32, 4>) -> Result<NdTensor<f32, 4>> {
        tracing::debug!("Passthrough denoiser: returning input unchanged");
        Ok(input.clone())
    }
}

#[cfg(feature = "denoise")]
pub use model::RtenDenoiser;

#[cfg(feature = "denoise")]
mod model {
    use std::path::{Path, PathBuf};

    use rten::Model;
    use rten_tensor::NdTensor;
    use rten_tensor::prelude::*;
    use scanscore_core::error::{Result, ScanScoreError};
    use tracing::{info, instrument};

    use super::Denoiser;

    /// A denoise model executed with `rten`.
    ///
    /// Loading parses the whole model file, so construct one per process and
    /// share it.
    pub struct RtenDenoiser {
        model: Model,
        path: PathBuf,
    }

    impl RtenDenoiser {
        /// Load a `.rten` model from disk.
        ///
        /// # Errors
        ///
        /// A denoiser `ExternalService` error if the file is missing or is
        /// not a valid model.
        #[instrument(skip_all, fields(path = %path.as_ref().display()))]
        pub fn load(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref();
            if !path.exists() {
                return Err(ScanScoreError::denoiser(format!(
                    "model not found at {}",
                    path.display()
                )));
            }

            let model = Model::load_file(path).map_err(|err| {
                ScanScoreError::denoiser(format!(
                    "failed to load model from {}: {}",
                    path.display(),
                    err
                ))
            })?;

            info!("Denoise model loaded");
            Ok(Self {
                model,
                path: path.to_path_buf(),
            })
        }
    }

    impl Denoiser for RtenDenoiser {
        fn name(&self) -> &str {
            "rten"
        }

        #[instrument(skip_all, fields(shape = ?input.shape()))]
        fn denoise(&self, input: &NdTensor<f32, 4>) -> Result<NdTensor<f32, 4>> {
            let output = self
                .model
                .run_one(input.view().into(), None)
                .map_err(|err| {
                    ScanScoreError::denoiser(format!(
                        "inference failed with {}: {err}",
                        self.path.display()
                    ))
                })?;

            let output: NdTensor<f32, 4> = output.try_into().map_err(|err| {
                ScanScoreError::denoiser(format!("unexpected model output: {err:?}"))
            })?;
            Ok(output)
        }
    }
}
