//! An interactive dashboard of historical automobile sales.
//!
//! The dashboard shows either yearly statistics for a selection of years or
//! statistics over recession periods. Every chart is computed from a CSV
//! dataset that is loaded once at startup.
//!
//! This library provides the HTTP server that directly serves the HTML pages,
//! along with the CSV loader and the aggregation functions behind the charts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod aggregation;
mod alert;
mod app_state;
mod charts;
mod dashboard;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
mod sales;
mod view;

#[cfg(test)]
mod test_utils;

pub use aggregation::{
    AggregatePoint, AggregateResult, GroupKey, GroupValue, Reduction, RowFilter, ValueColumn,
    aggregate, group_mean, group_sum,
};
pub use app_state::AppState;
pub use charts::{ChartKind, ChartSpec, recession_charts, yearly_charts};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use sales::{
    Dataset, LoadError, SUPPORTED_YEARS, SalesRecord, load_dataset, parse_dataset,
};
pub use view::{RenderPlan, ReportType, ViewEvent, ViewState, YearSelector};

use crate::{alert::Alert, internal_server_error::InternalServerError};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The sales dataset could not be loaded.
    ///
    /// This only happens at startup, the server does not run without data.
    #[error("could not load the sales dataset: {0}")]
    Load(#[from] LoadError),

    /// The client selected a year that is not in [SUPPORTED_YEARS].
    #[error("{0} is not a supported year")]
    InvalidYear(u16),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidYear(year) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid year",
                    &format!(
                        "{year} is outside the dataset. Choose years between {} and {}.",
                        SUPPORTED_YEARS.start(),
                        SUPPORTED_YEARS.end()
                    ),
                )
                .into_html(),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
