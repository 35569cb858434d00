//! Types and functions for parsing and formatting MediaWiki title strings.

use crate::{
    common::{expand_url, url_encode},
    config::Config,
};
use html_escape::decode_html_entities;
use regex::Regex;
use std::{borrow::Cow, fmt::Write as _, sync::LazyLock};

/// The title casing strategy for a namespace.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NamespaceCase {
    /// The first letter of the title is capitalised.
    FirstLetter,
    /// The title is case-sensitive.
    CaseSensitive,
}

/// An article namespace.
#[derive(Debug, Eq)]
pub struct Namespace {
    /// The namespace ID.
    pub id: i32,
    /// The display name of the namespace.
    pub name: &'static str,
    /// The canonical name of the namespace, if it is different from the
    /// display name.
    pub canonical: Option<&'static str>,
    /// The case folding strategy for titles in the namespace.
    pub case: NamespaceCase,
    /// Named aliases for the namespace.
    pub aliases: &'static [&'static str],
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Namespace {
    /// The special namespace ID used for direct links to media files.
    pub const MEDIA: i32 = -2;
    /// The special namespace ID used for dynamic pages.
    pub const SPECIAL: i32 = -1;
    /// The main namespace ID.
    pub const MAIN: i32 = 0;
    /// The talk namespace ID.
    pub const TALK: i32 = 1;
    /// The user namespace ID.
    pub const USER: i32 = 2;
    /// The user talk namespace ID.
    pub const USER_TALK: i32 = 3;
    /// The project namespace ID.
    pub const PROJECT: i32 = 4;
    /// The project talk namespace ID.
    pub const PROJECT_TALK: i32 = 5;
    /// The file namespace ID.
    pub const FILE: i32 = 6;
    /// The file talk namespace ID.
    pub const FILE_TALK: i32 = 7;
    /// The system namespace ID.
    pub const MEDIAWIKI: i32 = 8;
    /// The system talk namespace ID.
    pub const MEDIAWIKI_TALK: i32 = 9;
    /// The template namespace ID.
    pub const TEMPLATE: i32 = 10;
    /// The template talk namespace ID.
    pub const TEMPLATE_TALK: i32 = 11;
    /// The help namespace ID.
    pub const HELP: i32 = 12;
    /// The help talk namespace ID.
    pub const HELP_TALK: i32 = 13;
    /// The category namespace ID.
    pub const CATEGORY: i32 = 14;
    /// The category talk namespace ID.
    pub const CATEGORY_TALK: i32 = 15;

    /// Finds the namespace with the given case-insensitive name. Searches the
    /// name, the canonical name, and all aliases.
    pub fn find_by_name(name: &str) -> Option<&'static Self> {
        let name = normalize(name);
        NAMESPACES.iter().find(|ns| {
            ns.name.eq_ignore_ascii_case(&name)
                || ns
                    .canonical
                    .is_some_and(|canonical| name.eq_ignore_ascii_case(canonical))
                || ns
                    .aliases
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(&name))
        })
    }

    /// Returns the main namespace.
    pub fn main() -> &'static Self {
        &NAMESPACES[2]
    }

    /// Returns the file namespace.
    pub fn file() -> &'static Self {
        &NAMESPACES[8]
    }
}

/// Shorthand for building the namespace table.
macro_rules! ns {
    ($id:expr, $name:literal) => {
        ns!($id, $name, [])
    };
    ($id:expr, $name:literal, [$($alias:literal),*]) => {
        Namespace {
            id: $id,
            name: $name,
            canonical: None,
            case: NamespaceCase::FirstLetter,
            aliases: &[$($alias),*],
        }
    };
}

/// The standard MediaWiki namespaces.
static NAMESPACES: &[Namespace] = &[
    ns!(Namespace::MEDIA, "Media"),
    ns!(Namespace::SPECIAL, "Special"),
    ns!(Namespace::MAIN, ""),
    ns!(Namespace::TALK, "Talk"),
    ns!(Namespace::USER, "User"),
    ns!(Namespace::USER_TALK, "User talk"),
    ns!(Namespace::PROJECT, "Project"),
    ns!(Namespace::PROJECT_TALK, "Project talk"),
    ns!(Namespace::FILE, "File", ["Image"]),
    ns!(Namespace::FILE_TALK, "File talk", ["Image talk"]),
    ns!(Namespace::MEDIAWIKI, "MediaWiki"),
    ns!(Namespace::MEDIAWIKI_TALK, "MediaWiki talk"),
    ns!(Namespace::TEMPLATE, "Template"),
    ns!(Namespace::TEMPLATE_TALK, "Template talk"),
    ns!(Namespace::HELP, "Help"),
    ns!(Namespace::HELP_TALK, "Help talk"),
    ns!(Namespace::CATEGORY, "Category"),
    ns!(Namespace::CATEGORY_TALK, "Category talk"),
];

/// The maximum length of a title key, in bytes.
const MAX_KEY_LEN: usize = 255;

/// A normalised article title.
#[derive(Clone, Debug, Eq)]
pub struct Title {
    /// The location of the fragment delimiter in the title, if one exists.
    ///
    /// ```text
    /// Namespace:Title/Sub/Page#Fragment
    ///                         ^
    /// ```
    fragment_delimiter: Option<usize>,

    /// The namespace of the title.
    namespace: &'static Namespace,

    /// The location of the namespace delimiter in the title, if one exists.
    ///
    /// ```text
    /// Namespace:Title/Sub/Page#Fragment
    ///          ^
    /// ```
    ns_delimiter: Option<usize>,

    /// The full title text.
    text: String,
}

impl PartialEq for Title {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Title {
    /// Creates a title from a known namespace plus text parts.
    ///
    /// The parts are normalised but not validated.
    pub fn from_parts(
        namespace: &'static Namespace,
        title: &str,
        fragment: Option<&str>,
    ) -> Result<Self, core::fmt::Error> {
        let mut text = String::with_capacity(title.len());

        let ns_delimiter = (!namespace.name.is_empty())
            .then(|| {
                let ns_delimiter = namespace.name.len();
                write!(text, "{}:", namespace.name)?;
                Ok(ns_delimiter)
            })
            .transpose()?;

        let title = normalize(title);
        if namespace.case == NamespaceCase::FirstLetter
            && let Some(first) = title.chars().next()
            && first.is_lowercase()
        {
            let rest = &title[first.len_utf8()..];
            write!(text, "{}{rest}", first.to_uppercase())?;
        } else {
            text += &title;
        }

        let fragment_delimiter = fragment
            .map(|fragment| {
                let fragment_delimiter = text.len();
                write!(text, "#{}", normalize(fragment))?;
                Ok(fragment_delimiter)
            })
            .transpose()?;

        Ok(Self {
            fragment_delimiter,
            namespace,
            ns_delimiter,
            text,
        })
    }

    /// Creates a new [`Title`] from a title string and optional default
    /// namespace, or `None` if the text is not a valid title.
    ///
    /// In MediaWiki, this is like `newFromText`.
    pub fn new_from_text(text: &str, ns: Option<&'static Namespace>) -> Option<Self> {
        let text = normalize(text);

        // A leading colon forces the main namespace
        let (ns, text) = if let Some(text) = text.strip_prefix(':') {
            (Namespace::main(), text.trim_start())
        } else {
            text.split_once(':')
                .and_then(|(lhs, rhs)| {
                    Namespace::find_by_name(lhs.trim_end()).map(|ns| (ns, rhs.trim_start()))
                })
                .unwrap_or_else(|| (ns.unwrap_or_else(Namespace::main), &*text))
        };

        let (text, fragment) = text
            .split_once('#')
            .map_or((text, None), |(text, frag)| (text.trim_end(), Some(frag)));

        if !is_valid_text(ns, text) {
            log::trace!("Rejecting invalid title {text:?}");
            return None;
        }

        Self::from_parts(ns, text, fragment).ok()
    }

    /// Creates a new [`Title`] from a namespace-less DB key in the main
    /// namespace, or `None` if the key is not valid.
    ///
    /// Unlike [`Self::new_from_text`], the key is taken literally: colons
    /// never select a namespace and entities are not decoded.
    ///
    /// In MediaWiki, this is like `newFromDBkey`.
    pub fn from_db_key(key: &str) -> Option<Self> {
        let namespace = Namespace::main();
        let text = key.replace('_', " ");
        if !is_valid_text(namespace, &text) || text.contains('#') {
            log::trace!("Rejecting invalid DB key {key:?}");
            return None;
        }

        Some(Self {
            fragment_delimiter: None,
            namespace,
            ns_delimiter: None,
            text,
        })
    }

    /// The local part of the title in DB key form, with underscores instead
    /// of spaces.
    ///
    /// ```text
    /// Namespace:Title/Sub/Page#Fragment
    ///           ^^^^^^^^^^^^^^
    /// ```
    pub fn db_key(&self) -> String {
        self.text().replace(' ', "_")
    }

    /// The page fragment.
    ///
    /// ```text
    /// Namespace:Title/Sub/Page#Fragment
    ///                          ^^^^^^^^
    /// ```
    pub fn fragment(&self) -> &str {
        let start_at = self.fragment_delimiter.map_or(self.text.len(), |d| d + 1);
        &self.text[start_at..]
    }

    /// The full URL of the page, including the server.
    pub fn full_url(&self, config: &Config) -> String {
        let path = config.article_path.replace("$1", &self.partial_url());
        expand_url(config, &path).into_owned()
    }

    /// Returns true if this is the configured main page of the site.
    pub fn is_main_page(&self, config: &Config) -> bool {
        Title::new_from_text(&config.main_page, None)
            .is_some_and(|main_page| main_page.prefixed_text() == self.prefixed_text())
    }

    /// The title’s namespace object.
    pub fn namespace(&self) -> &'static Namespace {
        self.namespace
    }

    /// The namespace and page parts of the title in DB key form, in a URI
    /// component encoded form.
    ///
    /// ```text
    /// Namespace:Title/Sub/Page#Fragment
    /// ^^^^^^^^^^^^^^^^^^^^^^^^
    ///   (Namespace:Title/Sub/Page)
    /// ```
    pub fn partial_url(&self) -> String {
        url_encode(&self.prefixed_text().replace(' ', "_")).to_string()
    }

    /// The namespace and page parts of the title, with spaces.
    ///
    /// ```text
    /// Namespace:Title/Sub/Page#Fragment
    /// ^^^^^^^^^^^^^^^^^^^^^^^^
    /// ```
    pub fn prefixed_text(&self) -> &str {
        let end_at = self.fragment_delimiter.unwrap_or(self.text.len());
        &self.text[..end_at]
    }

    /// The path of the page.
    ///
    /// ```text
    /// Namespace:Title/Sub/Page#Fragment
    ///           ^^^^^^^^^^^^^^
    /// ```
    pub fn text(&self) -> &str {
        let start_at = self.ns_delimiter.map_or(0, |d| d + 1);
        let end_at = self.fragment_delimiter.unwrap_or(self.text.len());
        &self.text[start_at..end_at]
    }
}

impl core::fmt::Display for Title {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.prefixed_text())
    }
}

/// Returns true if `text` is an acceptable page part of a title in
/// namespace `ns`.
fn is_valid_text(ns: &Namespace, text: &str) -> bool {
    static ILLEGAL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"[<>\[\]{}|\x00-\x1f\x7f\u{fffd}]|%[0-9A-Fa-f]{2}|~{3}").unwrap()
    });

    if text.is_empty() || text.starts_with(':') || ILLEGAL.is_match(text) {
        return false;
    }

    if text == "."
        || text == ".."
        || text.starts_with("./")
        || text.starts_with("../")
        || text.contains("/./")
        || text.contains("/../")
        || text.ends_with("/.")
        || text.ends_with("/..")
    {
        return false;
    }

    ns.id == Namespace::SPECIAL || text.len() <= MAX_KEY_LEN
}

/// Returns true if the given character `c` is a bidirectional text control
/// character.
fn bidi(c: char) -> bool {
    ('\u{200e}'..='\u{200f}').contains(&c) || ('\u{202a}'..='\u{202e}').contains(&c)
}

/// Normalises a title text part by decoding HTML entities and converting
/// runs of whitespace + underscore to a single space character.
pub fn normalize(text: &str) -> Cow<'_, str> {
    let decoded = decode_html_entities(text);
    let mut out = String::new();
    let mut flushed = 0;
    let mut iter = decoded.char_indices().peekable();

    while let Some((index, c)) = iter.next() {
        // Peek to avoid switching to owned-mode when encountering a single
        // space
        if trimmable(c) && (c != ' ' || matches!(iter.peek(), Some((_, c)) if trimmable(*c))) {
            // Non-space whitespace + underscores are converted to space and
            // runs of whitespace are collapsed into a single character
            while iter.next_if(|(_, c)| trimmable(*c)).is_some() {}

            // This acts like `trim`, not emitting a space at the start
            // (`index == 0`) or end (`peek().is_none()`) of the text.
            if let Some((next_index, _)) = iter.peek() {
                out += &decoded[flushed..index];
                flushed = *next_index;
                // Bidi markers get stripped because “Sometimes they slip
                // into cut-n-pasted page titles”
                if index != 0 && spacelike(c) {
                    out.push(' ');
                }
            }
        }
    }

    if flushed == 0 {
        match decoded {
            Cow::Borrowed(b) => Cow::Borrowed(b.trim_matches(trimmable)),
            Cow::Owned(o) => Cow::Owned(o.trim_matches(trimmable).to_string()),
        }
    } else {
        out += decoded[flushed..].trim_end_matches(trimmable);
        Cow::Owned(out.to_string())
    }
}

/// Returns true if the character `c` is considered like whitespace in title
/// text.
fn spacelike(c: char) -> bool {
    c == '_' || c.is_whitespace()
}

/// Returns true if the character `c` is trimmable in title text.
fn trimmable(c: char) -> bool {
    bidi(c) || spacelike(c)
}
