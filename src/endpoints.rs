//! The URIs served by the dashboard.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route that re-renders the dashboard for a new selection.
pub const DASHBOARD_CHARTS: &str = "/api/charts";
