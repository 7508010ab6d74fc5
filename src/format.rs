//! Text rendering modes understood by the Bot API.

use serde::{Deserialize, Serialize};
use teloxide::types::ParseMode;

/// How the platform should render message text and captions.
///
/// Messages hold an `Option<FormatMode>`; `None` means plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    /// HTML subset (`<b>`, `<i>`, `<a>`, ...)
    #[default]
    Html,
    /// MarkdownV2 syntax
    MarkdownV2,
    /// Legacy Markdown syntax
    Markdown,
}

impl From<FormatMode> for ParseMode {
    #[allow(deprecated)]
    fn from(mode: FormatMode) -> Self {
        match mode {
            FormatMode::Html => Self::Html,
            FormatMode::MarkdownV2 => Self::MarkdownV2,
            FormatMode::Markdown => Self::Markdown,
        }
    }
}
