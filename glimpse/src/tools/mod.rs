//! Built-in tools.
//!
//! - [`WebSearchTool`]: `DuckDuckGo` search returning markdown-formatted results

mod web_search;

pub use web_search::{SearchResult, WebSearchArgs, WebSearchTool};
