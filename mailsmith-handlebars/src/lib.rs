//! Handlebars templating for Mailsmith
//!
//! Templates are compiled from strings at render time; the MJML renderer uses
//! this to merge companion data into markup before compilation.
//!
//! ## Features
//!
//! - Full Handlebars templating support
//! - Built-in helpers for comparison, logic, strings, collections and math
//! - Partials registered by name or loaded from a directory
//! - Strict mode for missing variables
//! - HTML escaping (configurable)
//!
//! ## Example
//!
//! ```
//! use mailsmith_handlebars::{HandlebarsConfig, HandlebarsEngine};
//! use serde_json::json;
//!
//! let engine = HandlebarsEngine::new(HandlebarsConfig::default()).unwrap();
//! let markup = engine
//!     .render_template("<mj-text>Hi {{upper name}}</mj-text>", &json!({"name": "ada"}))
//!     .unwrap();
//! assert_eq!(markup, "<mj-text>Hi ADA</mj-text>");
//! ```
//!
//! ## Built-in Helpers
//!
//! - **Comparison**: `eq`, `ne`, `lt`, `gt`, `lte`, `gte`
//! - **Logic**: `and`, `or`, `not`
//! - **String**: `upper`, `lower`, `capitalize`, `trim`, `replace`, `truncate`,
//!   `append`, `prepend`, `split`, `startsWith`, `endsWith`, `contains`
//! - **Collections**: `len`, `join`, `first`, `last`, `includes`
//! - **Math**: `add`, `subtract`, `multiply`, `divide`
//! - **Utility**: `json`, `default`
//!
//! ## Template Example
//!
//! ```handlebars
//! <mj-text>Hello {{default name "there"}}!</mj-text>
//!
//! {{#if (gt items.length 0)}}
//!   {{#each items}}
//!     <mj-text>{{capitalize this.title}}</mj-text>
//!   {{/each}}
//! {{/if}}
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod helpers;

pub use config::HandlebarsConfig;
pub use engine::HandlebarsEngine;
pub use error::{HandlebarsError, Result};

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new(HandlebarsConfig::default()).expect("Failed to create default HandlebarsEngine")
    }
}
