//! Open Graph metadata for rendered wiki pages.
//!
//! Editors set per-page social sharing metadata with three parser functions:
//!
//! * `{{#metaimage: File:Example.png | echo }}`
//! * `{{#metatitle: Some other title }}`
//! * `{{#metadesc: A short description | echo }}`
//!
//! Each call records its value into the [`ParserOutput`] of the current
//! render. The first call of each kind wins; later calls only affect what is
//! echoed back into the page body. Once parsing is finished, the page output
//! hook reads the recorded values back and adds one
//! `<meta property="og:…" content="…">` head item per populated field.
//!
//! Everything this crate needs from the host (title parsing, file lookup,
//! message transformation, URL expansion, head injection) is available
//! through small interfaces, along with a minimal reference host in
//! [`render`] that runs both phases of a page render.

pub mod common;
pub mod config;
pub mod file;
pub mod head;
pub mod hooks;
pub mod message;
pub mod output;
pub mod parser;
pub mod parser_fns;
pub mod render;
pub mod title;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use hooks::{Hooks, Services};
pub use output::{OutputPage, ParserOutput};
pub use parser::Parser;
pub use render::{RenderOutput, render_page};
pub use title::{Namespace, Title};

use core::fmt;

/// An extension error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// A write to a buffer failed.
    #[error("fmt error: {0}")]
    Fmt(#[from] fmt::Error),

    /// A page title given by the caller was not a valid title.
    #[error("invalid title: {0:?}")]
    InvalidTitle(String),

    /// A file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// The standard result type used by all fallible extension functions.
pub type Result<T = (), E = Error> = core::result::Result<T, E>;

/// Registers the extension with the host hook tables.
///
/// This is the equivalent of the `Hooks` section of an extension manifest:
/// the parser functions are installed whenever a parser is first used, and
/// the head emitter runs once per page output.
pub fn register(hooks: &mut Hooks) {
    hooks.on_parser_first_call_init(parser_fns::on_parser_first_call_init);
    hooks.on_output_page_parser_output(head::on_output_page_parser_output);
}
