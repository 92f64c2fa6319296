//! Backend API access for the Trendix dashboard.

pub mod client;
pub mod error;
pub mod panel;

pub use client::TrendixClient;
pub use error::BackendError;
pub use panel::{HistoryCharts, HistoryPanel, LoadToken, PanelState};
