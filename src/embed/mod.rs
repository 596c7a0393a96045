//! Embedded resources.
//!
//! The editor page is compiled into the binary so the server needs nothing
//! on disk besides the document itself.

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for index.html.
    pub struct IndexVars<'a> {
        pub title: &'a str,
        pub ws_port: u16,
        pub version: &'a str,
    }

    impl TemplateVars for IndexVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", self.title)
                .replace("__SYNCPAD_WS_PORT__", &self.ws_port.to_string())
                .replace("__VERSION__", self.version)
        }
    }

    /// Editor page: textarea bound to the content API and live channel.
    pub const INDEX_HTML: Template<IndexVars<'static>> =
        Template::new(include_str!("serve/index.html"));
}
