//! Page layout shared by every view.

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// ECharts renders the chart option documents built by the `charts` module.
pub const ECHARTS_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts@5.6.0/dist/echarts.min.js";
/// htmx swaps the dashboard content when a selector changes.
pub const HTMX_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/htmx.org@2.0.4/dist/htmx.min.js";
/// Lets htmx swap error responses into the alert container.
pub const HTMX_RESPONSE_TARGETS_SCRIPT: &str =
    "https://cdn.jsdelivr.net/npm/htmx-ext-response-targets@2.0.2/response-targets.js";

/// Extra elements to place in the document head.
pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(&'static str),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Automobile Sales Statistics" }
                link href="/static/main.css" rel="stylesheet";

                script src=(HTMX_SCRIPT) {}
                script src=(HTMX_RESPONSE_TARGETS_SCRIPT) {}

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                    }
                }
            }

            body hx-ext="response-targets"
            {
                (content)

                // Alert container for error responses
                div id="alert-container" class="alert-container" {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="error-page"
        {
            h1 class="error-code" { (header) }
            p class="error-description" { (description) }
            p class="error-fix" { (fix) }

            a href="/" class="button" { "Back to Dashboard" }
        }
    );

    base(title, &[], &content)
}
