//! Embedded static resources for vellum.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `init` - Project scaffold (vellum.toml, main.lua, the pdf package)
//! - `serve` - Preview page template
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{PREVIEW_HTML, PreviewVars};
//!
//! let html = PREVIEW_HTML.render(&PreviewVars { title: "doc", revision: 3, ..vars });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod init {
    use super::{Template, TemplateVars};

    /// Variables for scaffold templates.
    pub struct ProjectVars<'a> {
        pub name: &'a str,
        pub version: &'a str,
    }

    impl<'a> ProjectVars<'a> {
        pub fn new(name: &'a str) -> Self {
            Self {
                name,
                version: env!("CARGO_PKG_VERSION"),
            }
        }
    }

    impl TemplateVars for ProjectVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__NAME__", self.name)
                .replace("__VERSION__", self.version)
        }
    }

    /// Default configuration written by `vellum init`.
    pub const CONFIG_TOML: Template<ProjectVars<'static>> =
        Template::new(include_str!("init/vellum.toml"));

    /// Starter entry script.
    pub const MAIN_LUA: Template<ProjectVars<'static>> =
        Template::new(include_str!("init/main.lua"));

    /// PDF writer package, installed as `assets/packages/pdf.lua`.
    pub const PDF_LUA: &str = include_str!("init/pdf.lua");
}

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for preview.html.
    pub struct PreviewVars<'a> {
        pub title: &'a str,
        pub state: &'a str,
        pub revision: u64,
        /// Pre-rendered navigation bar (may be empty)
        pub nav: &'a str,
        /// Pre-rendered main content
        pub body: &'a str,
    }

    impl TemplateVars for PreviewVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", self.title)
                .replace("__STATE__", self.state)
                .replace("__REVISION__", &self.revision.to_string())
                .replace("__NAV__", self.nav)
                .replace("__BODY__", self.body)
        }
    }

    /// Preview page template.
    pub const PREVIEW_HTML: Template<PreviewVars<'static>> =
        Template::new(include_str!("serve/preview.html"));
}
