//! Alert messages shown when a dashboard update is rejected.
//!
//! Alerts are returned as HTML fragments that htmx swaps into the page's alert
//! container.

use maud::{Markup, html};

/// An error message with optional details.
pub struct Alert<'a> {
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self { message, details }
    }

    pub fn into_html(self) -> Markup {
        html! {
            div role="alert" class="alert alert-error"
            {
                p class="alert-message" { (self.message) }

                @if !self.details.is_empty() {
                    p class="alert-details" { (self.details) }
                }

                button
                    type="button"
                    class="alert-dismiss"
                    onclick="this.parentElement.remove()"
                {
                    "Dismiss"
                }
            }
        }
    }
}
