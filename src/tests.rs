use crate::{
    Config, Hooks, Services, Title, file::LocalRepo, message::MessageCache, render_page,
};
use std::path::Path;

const BASE_DIR: &str = "./src/tests";

macro_rules! run_tests {
    ($($name:ident => $title:literal),* $(,)?) => {
        $(#[test]
        fn $name() {
            run_test(
                stringify!($name),
                $title,
                include_str!(concat!("./tests/", stringify!($name), ".wiki"))
            );
        })*
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

/// Renders `wikitext` as the page `title` with the extension registered,
/// passing the result to `f`.
fn with_render<R>(title: &str, wikitext: &str, f: impl FnOnce(&crate::RenderOutput) -> R) -> R {
    with_render_in(Path::new(&format!("{BASE_DIR}/media")), title, wikitext, f)
}

/// Like [`with_render`], with media files from `media_dir`.
fn with_render_in<R>(
    media_dir: &Path,
    title: &str,
    wikitext: &str,
    f: impl FnOnce(&crate::RenderOutput) -> R,
) -> R {
    let _ = env_logger::try_init();

    let config = config();
    let files = LocalRepo::new(media_dir, "/images");
    let messages = MessageCache::new(&config);
    let services = Services {
        config: &config,
        files: &files,
        messages: &messages,
    };
    let mut hooks = Hooks::default();
    crate::register(&mut hooks);

    let title = Title::new_from_text(title, None).unwrap();
    let result = render_page(&hooks, &services, title, wikitext).unwrap();
    f(&result)
}

#[track_caller]
fn run_test(test_name: &str, title: &str, input: &str) {
    use std::io::Write as _;

    let mut mint = goldenfile::Mint::new(format!("{BASE_DIR}/goldenfiles"));
    let mut file = mint.new_goldenfile(format!("{test_name}.html")).unwrap();
    with_render(title, input, |result| {
        for (prefix, uri) in result.page.xml_namespaces() {
            let _ = writeln!(file, r#"xmlns:{prefix}="{uri}""#);
        }
        let _ = writeln!(file, "----");
        let _ = write!(file, "{}", result.head().unwrap());
        let _ = writeln!(file, "----");
        let _ = write!(file, "{}", result.body);
    });
}

run_tests! {
    article => "Example",
    main_page => "Main Page",
    overrides => "Some page",
}

#[test]
fn description_is_sanitised() {
    let inputs = [
        r#"<script>alert("x")</script> & "quotes" 'too'"#,
        r#""><img src=x onerror=alert(1)>"#,
        "a <b c=\">\">bold</b> &lt;not a tag&gt;",
        "1 < 2 > 0",
    ];

    for input in inputs {
        let wikitext = format!("{{{{#metadesc:{input}}}}}");
        with_render("Some page", &wikitext, |result| {
            let item = result
                .page
                .head_item("meta:property:og:description")
                .unwrap();
            let (_, content) = item.split_once(r#"content=""#).unwrap();
            let (content, _) = content.split_once('"').unwrap();
            let content = html_escape::decode_html_entities(content);
            assert!(
                !content.contains(['<', '>', '"']),
                "content {content:?} from {input:?}"
            );
        });
    }
}

#[test]
fn first_call_wins() {
    let pairs = [
        ("One", "Two"),
        ("Same", "Same"),
        ("", "Later"),
        ("Main Page", "Other"),
    ];

    for (first, second) in pairs {
        let input = format!(
            "{{{{#metatitle:{first}}}}}{{{{#metatitle:{second}}}}}\
             {{{{#metadesc:{first}|yes}}}}{{{{#metadesc:{second}|yes}}}}"
        );
        with_render("Some page", &input, |result| {
            assert_eq!(result.parser_output.meta_title(), Some(first), "title from {input:?}");
            assert_eq!(result.parser_output.meta_desc(), Some(first), "desc from {input:?}");
            assert_eq!(
                result.body,
                format!("{first}{second}"),
                "every call should echo from {input:?}"
            );
        });
    }
}

#[test]
fn description_fallback() {
    // An empty recorded description suppresses the default instead of
    // falling back to it
    with_render("Some page", "{{#metadesc:}}", |result| {
        assert_eq!(result.parser_output.meta_desc(), Some(""));
        assert_eq!(result.page.head_item("meta:property:og:description"), None);
    });

    with_render("Some page", "{{#metadesc:<br>}}", |result| {
        assert_eq!(result.page.head_item("meta:property:og:description"), None);
    });
}

#[test]
fn image_name_with_colon() {
    let media_dir =
        std::env::temp_dir().join(format!("wiki-ogmeta-colon-{}", std::process::id()));
    std::fs::create_dir_all(&media_dir).unwrap();
    std::fs::write(media_dir.join("Help:Pic.png"), b"").unwrap();

    with_render_in(&media_dir, "Some page", "{{#metaimage:File:Help:Pic.png}}", |result| {
        assert_eq!(result.parser_output.meta_image(), Some("Help:Pic.png"));
        assert_eq!(
            result.page.head_item("meta:property:og:image"),
            Some(
                "       <meta property=\"og:image\" \
                 content=\"https://wiki.example/images/thumb/Help:Pic.png/1200px-Help:Pic.png\">\n"
            )
        );
    });

    std::fs::remove_dir_all(&media_dir).unwrap();
}
