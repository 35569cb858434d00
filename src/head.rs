//! Open Graph head items.

use crate::{
    Result,
    common::{expand_url, is_truthy, strip_tags},
    hooks::Services,
    output::{OutputPage, ParserOutput, element},
    title::Title,
};
use indexmap::IndexMap;

/// The XML namespace prefix of Open Graph properties.
pub const OG_PREFIX: &str = "og";

/// The XML namespace URI of Open Graph properties.
pub const OG_NAMESPACE: &str = "http://opengraphprotocol.org/schema/";

/// The bounding box of the Open Graph image thumbnail.
pub const THUMB_SIZE: (u32, u32) = (1200, 630);

/// The message used when a page has no description of its own.
const DEFAULT_DESC_MESSAGE: &str = "ogmetapf-default-desc";

/// The whitespace emitted before each head item.
const INDENT: &str = "       ";

/// Open Graph property values, in emission order.
pub type MetaTags = IndexMap<&'static str, String>;

/// Computes the Open Graph properties for the page `title` from the metadata
/// recorded in `parser_output`.
///
/// Properties are ordered `og:type`, `og:site_name`, `og:title`, `og:image`,
/// `og:description`, `og:url`; `og:site_name` is only present for pages other
/// than the main page. Values may be empty.
pub fn meta_tags(title: &Title, parser_output: &ParserOutput, services: &Services<'_>) -> MetaTags {
    let config = services.config;
    let mut meta = MetaTags::new();

    let image = parser_output
        .meta_image()
        .and_then(Title::from_db_key)
        .and_then(|file| services.files.find_file(&file));

    if title.is_main_page(config) {
        meta.insert("og:type", "website".into());
        meta.insert("og:title", config.sitename.clone());
    } else {
        meta.insert("og:type", "article".into());
        meta.insert("og:site_name", config.sitename.clone());
        meta.insert("og:title", title.prefixed_text().to_string());
    }

    if let Some(meta_title) = parser_output.meta_title() {
        meta.insert("og:title", meta_title.to_string());
    }

    let image = if let Some(image) = image {
        let (width, height) = THUMB_SIZE;
        expand_url(config, &image.create_thumb(width, height)).into_owned()
    } else {
        expand_url(config, &config.logo).into_owned()
    };
    meta.insert("og:image", image);

    let desc = parser_output.meta_desc().map_or_else(
        || {
            services
                .messages
                .text(DEFAULT_DESC_MESSAGE, &config.language_code, title)
        },
        str::to_string,
    );
    let desc = strip_tags(&desc);
    meta.insert(
        "og:description",
        html_escape::encode_quoted_attribute(&desc).into_owned(),
    );

    meta.insert("og:url", title.full_url(config));

    meta
}

/// Adds the Open Graph head items for the rendered page to `out`.
///
/// Properties with falsy values are omitted.
pub fn on_output_page_parser_output(
    out: &mut OutputPage,
    parser_output: &ParserOutput,
    services: &Services<'_>,
) -> Result {
    out.add_xml_namespace(OG_PREFIX, OG_NAMESPACE);

    let meta = meta_tags(out.title(), parser_output, services);
    for (property, content) in &meta {
        if is_truthy(content) {
            let tag = element("meta", &[("property", *property), ("content", content.as_str())])?;
            out.add_head_item(format!("meta:property:{property}"), format!("{INDENT}{tag}\n"));
        } else {
            log::debug!("Omitting empty {property}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        file::{EmptyRepo, File, FileRepo},
        message::MessageCache,
    };

    /// A repository where every file exists.
    struct AnyRepo;

    struct AnyFile(String);

    impl File for AnyFile {
        fn create_thumb(&self, width: u32, height: u32) -> String {
            format!("/thumbs/{width}x{height}/{}", self.0)
        }
    }

    impl FileRepo for AnyRepo {
        fn find_file(&self, title: &Title) -> Option<Box<dyn File + '_>> {
            Some(Box::new(AnyFile(title.db_key())))
        }
    }

    fn config() -> Config {
        Config {
            sitename: "Example Wiki".into(),
            server: "https://wiki.example".into(),
            logo: "/logo.png".into(),
            ..Config::default()
        }
    }

    fn tags(page: &str, parser_output: &ParserOutput, files: &dyn FileRepo) -> MetaTags {
        let config = config();
        let messages = MessageCache::new(&config);
        let services = Services {
            config: &config,
            files,
            messages: &messages,
        };
        meta_tags(&Title::new_from_text(page, None).unwrap(), parser_output, &services)
    }

    #[test]
    fn main_page() {
        let meta = tags("Main Page", &ParserOutput::default(), &EmptyRepo);
        assert_eq!(
            meta.keys().copied().collect::<Vec<_>>(),
            ["og:type", "og:title", "og:image", "og:description", "og:url"]
        );
        assert_eq!(meta["og:type"], "website");
        assert_eq!(meta["og:title"], "Example Wiki");
        assert!(!meta.contains_key("og:site_name"));
    }

    #[test]
    fn article() {
        let meta = tags("Help:Some page", &ParserOutput::default(), &EmptyRepo);
        assert_eq!(
            meta.keys().copied().collect::<Vec<_>>(),
            ["og:type", "og:site_name", "og:title", "og:image", "og:description", "og:url"]
        );
        assert_eq!(meta["og:type"], "article");
        assert_eq!(meta["og:site_name"], "Example Wiki");
        assert_eq!(meta["og:title"], "Help:Some page");
        assert_eq!(meta["og:url"], "https://wiki.example/wiki/Help:Some_page");
    }

    #[test]
    fn title_override() {
        let mut parser_output = ParserOutput::default();
        parser_output.set_meta_title("Custom".into());
        for page in ["Main Page", "Other"] {
            let meta = tags(page, &parser_output, &EmptyRepo);
            assert_eq!(meta["og:title"], "Custom", "override on {page}");
        }

        let meta = tags("Other", &parser_output, &EmptyRepo);
        assert_eq!(
            meta.get_index_of("og:title"),
            Some(2),
            "override should keep the original position"
        );
    }

    #[test]
    fn image() {
        let meta = tags("Other", &ParserOutput::default(), &AnyRepo);
        assert_eq!(meta["og:image"], "https://wiki.example/logo.png", "unset slot");

        let mut parser_output = ParserOutput::default();
        parser_output.set_meta_image("Pic.png".into());
        let meta = tags("Other", &parser_output, &AnyRepo);
        assert_eq!(meta["og:image"], "https://wiki.example/thumbs/1200x630/Pic.png");

        let meta = tags("Other", &parser_output, &EmptyRepo);
        assert_eq!(meta["og:image"], "https://wiki.example/logo.png", "missing file");
    }

    #[test]
    fn description() {
        let meta = tags("Other", &ParserOutput::default(), &EmptyRepo);
        assert_eq!(meta["og:description"], "A page from Example Wiki.");

        let mut parser_output = ParserOutput::default();
        parser_output.set_meta_desc(r#"It's <i class="x">"fine"</i> & good"#.into());
        let meta = tags("Other", &parser_output, &EmptyRepo);
        assert_eq!(
            meta["og:description"],
            "It&#x27;s &quot;fine&quot; &amp; good"
        );
    }

    #[test]
    fn falsy_values_are_omitted() {
        let config = config();
        let messages = MessageCache::new(&config);
        let services = Services {
            config: &config,
            files: &EmptyRepo,
            messages: &messages,
        };
        let mut parser_output = ParserOutput::default();
        parser_output.set_meta_title("0".into());
        parser_output.set_meta_desc("<b></b>".into());

        let mut out = OutputPage::new(Title::new_from_text("Other", None).unwrap());
        on_output_page_parser_output(&mut out, &parser_output, &services).unwrap();

        assert_eq!(out.head_item("meta:property:og:title"), None);
        assert_eq!(out.head_item("meta:property:og:description"), None);
        assert_eq!(
            out.head_item("meta:property:og:type"),
            Some("       <meta property=\"og:type\" content=\"article\">\n")
        );
        assert_eq!(out.xml_namespaces().get("og").map(String::as_str), Some(OG_NAMESPACE));
    }
}
