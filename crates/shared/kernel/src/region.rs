//! The single content region the router renders modules into.

use parking_lot::RwLock;
use std::fmt::{self, Debug, Write as _};

/// Action bound to the error panel's retry button.
pub const RETRY_ACTION: &str = "retry";
/// Action bound to the error panel's "go to default module" button.
pub const DEFAULT_ACTION: &str = "default";
/// Prefix of navigation actions (`navigate:sales`).
pub const NAVIGATE_ACTION_PREFIX: &str = "navigate:";

/// One insertion point, fully owned by the active module.
///
/// Replacing the markup discards every listener attached to the previous content.
pub trait ContentRegion: Send + Sync + Debug {
    fn set_markup(&self, markup: String);

    fn markup(&self) -> String;

    /// Binds `action` to the element with `element_id` in the current markup.
    fn attach(&self, element_id: &str, action: &str);

    /// Action bound to `element_id`, if any.
    fn action_for(&self, element_id: &str) -> Option<String>;
}

#[derive(Debug, Default)]
struct RegionInner {
    markup: String,
    listeners: Vec<(String, String)>,
}

/// In-memory region used by the shell and by tests.
#[derive(Debug, Default)]
pub struct MemoryRegion {
    inner: RwLock<RegionInner>,
}

impl MemoryRegion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `(element_id, action)` pairs bound to the current markup.
    #[must_use]
    pub fn listeners(&self) -> Vec<(String, String)> {
        self.inner.read().listeners.clone()
    }
}

impl ContentRegion for MemoryRegion {
    fn set_markup(&self, markup: String) {
        let mut inner = self.inner.write();
        inner.markup = markup;
        inner.listeners.clear();
    }

    fn markup(&self) -> String {
        self.inner.read().markup.clone()
    }

    fn attach(&self, element_id: &str, action: &str) {
        self.inner.write().listeners.push((element_id.to_owned(), action.to_owned()));
    }

    fn action_for(&self, element_id: &str) -> Option<String> {
        self.inner
            .read()
            .listeners
            .iter()
            .find(|(id, _)| id == element_id)
            .map(|(_, action)| action.clone())
    }
}

/// Escapes text for insertion into markup.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `feed-record` becomes `Feed Record`; `_` also separates words.
#[must_use]
pub fn title_case(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Content shown for a module that is not registered.
#[must_use]
pub fn placeholder_markup(name: &str) -> String {
    let title = escape(&title_case(name));
    format!(
        "<div class=\"module-placeholder\"><h2>{title}</h2><p>The {title} module is not available yet.</p></div>"
    )
}

/// Error panel for a module whose initialization failed.
#[must_use]
pub fn error_panel_markup(module: &str, message: &str) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write!(
        out,
        "<div class=\"module-error\" data-module=\"{}\"><h2>Could not load {}</h2><p class=\"error-message\">{}</p>",
        escape(module),
        escape(&title_case(module)),
        escape(message),
    );
    out.push_str("<button id=\"retry-module\">Retry</button>");
    out.push_str("<button id=\"go-default-module\">Back to start</button></div>");
    out
}

/// Renders the error panel into `region` and wires its two actions.
pub fn render_error_panel(region: &dyn ContentRegion, module: &str, message: &str) {
    region.set_markup(error_panel_markup(module, message));
    region.attach("retry-module", RETRY_ACTION);
    region.attach("go-default-module", DEFAULT_ACTION);
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.read().markup)
    }
}
