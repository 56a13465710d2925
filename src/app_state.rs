//! Implements a struct that holds the state of the dashboard server.

use std::path::Path;

use axum::extract::FromRef;

use crate::{
    Error,
    sales::{Dataset, load_dataset},
};

/// The state of the dashboard server.
///
/// The dataset is loaded once at startup and never modified afterwards, so
/// cloning the state for each request only bumps a reference count.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The sales records every chart is computed from.
    pub dataset: Dataset,
}

impl AppState {
    /// Create a new [AppState] from an already loaded dataset.
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Create a new [AppState] by loading the sales CSV at `path`.
    ///
    /// # Errors
    /// Returns [Error::Load] if the file cannot be read or any row is invalid.
    pub fn from_csv(path: &Path) -> Result<Self, Error> {
        let dataset = load_dataset(path)?;

        Ok(Self::new(dataset))
    }
}

impl FromRef<AppState> for Dataset {
    fn from_ref(state: &AppState) -> Self {
        state.dataset.clone()
    }
}
