//! Parser functions for setting Open Graph metadata from wikitext.
//!
//! Each function writes one slot of the [`ParserOutput`](crate::ParserOutput)
//! of the current render. Only the first call of each function in a render is
//! recorded. What a call returns into the page is independent of whether its
//! value was recorded.

use crate::{
    Result,
    parser::{Arguments, Parser, ParserFn, State},
    title::{Namespace, Title},
};

/// `{{#metaimage: file name | echoback }}`
///
/// Records the DB key of the named file. The name may omit the `File:`
/// prefix. Invalid names are ignored without an error.
pub fn meta_image(out: &mut String, state: &mut State<'_>, arguments: &Arguments<'_>) -> Result {
    let value = arguments.get(0).unwrap_or_default();

    if state.output.meta_image().is_some() {
        log::debug!("#metaimage: already set, ignoring {value:?}");
    } else if let Some(file) = Title::new_from_text(value, Some(Namespace::file())) {
        state.output.set_meta_image(file.db_key());
    } else {
        log::debug!("#metaimage: ignoring invalid title {value:?}");
    }

    if arguments.is_truthy(1) {
        *out += value;
    }

    Ok(())
}

/// `{{#metatitle: title }}`
///
/// Records the title verbatim. Never outputs anything.
pub fn meta_title(_: &mut String, state: &mut State<'_>, arguments: &Arguments<'_>) -> Result {
    let value = arguments.get(0).unwrap_or_default();
    if !state.output.set_meta_title(value.to_string()) {
        log::debug!("#metatitle: already set, ignoring {value:?}");
    }
    Ok(())
}

/// `{{#metadesc: description | echoback }}`
///
/// Records the description after message transformation. The transformation
/// always happens, even when the result is not recorded.
pub fn meta_desc(out: &mut String, state: &mut State<'_>, arguments: &Arguments<'_>) -> Result {
    let services = state.services;
    let value = services.messages.transform(
        arguments.get(0).unwrap_or_default(),
        &services.config.language_code,
        state.title,
    );

    if arguments.is_truthy(1) {
        *out += &value;
    }

    if !state.output.set_meta_desc(value) {
        log::debug!("#metadesc: already set, ignoring");
    }

    Ok(())
}

/// The parser functions provided by this extension.
static PARSER_FUNCTIONS: phf::Map<&'static str, ParserFn> = phf::phf_map! {
    "metaimage" => meta_image,
    "metatitle" => meta_title,
    "metadesc" => meta_desc,
};

/// Registers the parser functions with a parser.
pub fn on_parser_first_call_init(parser: &mut Parser) {
    for (name, callback) in PARSER_FUNCTIONS.entries() {
        parser.set_function_hook(name, *callback);
    }
}
