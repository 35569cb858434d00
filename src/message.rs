//! Interface messages and message text transformation.

use crate::{common::format_raw_message, config::Config, title::Title};
use regex::Regex;
use std::{borrow::Cow, collections::HashMap, sync::LazyLock};

/// The language used when a message is missing from the requested language.
const FALLBACK_LANGUAGE: &str = "en";

/// The i18n dictionaries, by language code.
static MESSAGES: LazyLock<HashMap<&'static str, serde_json::Value>> = LazyLock::new(|| {
    [
        ("en", include_str!("../res/i18n/en.json")),
        ("de", include_str!("../res/i18n/de.json")),
    ]
    .into_iter()
    .map(|(lang, json)| (lang, serde_json::from_str(json).unwrap()))
    .collect()
});

/// Message lookup and transformation services provided by the host.
pub trait Messages {
    /// Expands the brace constructs in `text` the way an interface message
    /// would be expanded, in the context of the page `title`.
    ///
    /// In MediaWiki, this is like `MessageCache::transform`.
    fn transform(&self, text: &str, language: &str, title: &Title) -> String;

    /// Returns the plain text of the message `key`, transformed.
    ///
    /// In MediaWiki, this is like `wfMessage(key)->text()`.
    fn text(&self, key: &str, language: &str, title: &Title) -> String;
}

/// Looks up the raw text of message `key` in `language`, falling back to the
/// default language.
pub fn raw_message(key: &str, language: &str) -> Option<&'static str> {
    let key = key.to_lowercase();
    [language, FALLBACK_LANGUAGE].into_iter().find_map(|language| {
        MESSAGES
            .get(language)?
            .get(&key)
            .and_then(serde_json::Value::as_str)
            .filter(|message| !matches!(*message, "" | "-"))
    })
}

/// Returns the text used in place of a missing message.
fn missing_message(key: &str) -> String {
    format!("⧼{}⧽", html_escape::encode_text(key))
}

/// The built-in message store, which knows about the messages compiled into
/// this crate and a handful of magic words.
#[derive(Clone, Copy, Debug)]
pub struct MessageCache<'a> {
    /// Site configuration, for `{{SITENAME}}`.
    config: &'a Config,
}

impl<'a> MessageCache<'a> {
    /// Creates a new message store for the given site.
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Expands a single brace construct `{{name|args}}`, or returns `None`
    /// if it is not one this store knows.
    fn expand_braces(
        &self,
        name: &str,
        args: Option<&str>,
        language: &str,
        title: &Title,
    ) -> Option<Cow<'a, str>> {
        if let Some((prefix, key)) = name.split_once(':')
            && prefix.trim().eq_ignore_ascii_case("int")
        {
            let key = key.trim();
            let params = args.map_or(vec![], |args| args.split('|').collect::<Vec<_>>());
            let message = raw_message(key, language).map_or_else(
                || missing_message(key),
                |message| {
                    format_raw_message(message, |index| {
                        let index = index.parse::<usize>().ok()?;
                        params.get(index.checked_sub(1)?).map(|p| Cow::Owned(p.to_string()))
                    })
                    .into_owned()
                },
            );
            return Some(Cow::Owned(message));
        }

        match name {
            "SITENAME" => Some(Cow::Borrowed(self.config.sitename.as_str())),
            "PAGENAME" => Some(Cow::Owned(title.text().to_string())),
            "FULLPAGENAME" => Some(Cow::Owned(title.prefixed_text().to_string())),
            _ => None,
        }
    }
}

impl Messages for MessageCache<'_> {
    fn transform(&self, text: &str, language: &str, title: &Title) -> String {
        static BRACES: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\{\{\s*([^{}|]+?)\s*(?:\|([^{}]*))?\}\}").unwrap());

        if !text.contains("{{") {
            return text.to_string();
        }

        BRACES
            .replace_all(text, |captures: &regex::Captures<'_>| {
                let name = &captures[1];
                let args = captures.get(2).map(|args| args.as_str());
                self.expand_braces(name, args, language, title)
                    .map_or_else(|| captures[0].to_string(), Cow::into_owned)
            })
            .into_owned()
    }

    fn text(&self, key: &str, language: &str, title: &Title) -> String {
        match raw_message(key, language) {
            Some(message) => self.transform(message, language, title),
            None => {
                log::warn!("Missing message {key:?}");
                missing_message(key)
            }
        }
    }
}
