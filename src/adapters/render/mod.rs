//! HTML rendering. Implements PageRenderer.

pub mod html;
pub mod template;

pub use html::HtmlRenderer;
pub use template::PageTemplate;
