//! Rendering of the scaling report as a self-contained HTML page.

pub mod html;

pub use html::render_html_report;
