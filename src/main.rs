use std::io::Read as _;
use wiki_ogmeta::{
    Config, Error, Hooks, Services, Title,
    file::{EmptyRepo, FileRepo, LocalRepo},
    message::MessageCache,
    render_page,
};

fn usage<T>(err: &'static str) -> anyhow::Result<T> {
    let exe = std::env::args().next().unwrap_or_default();
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Usage: {exe} [options] <page.wiki>\n");
    println!("Reads wikitext from the given file, or from stdin if the file is `-`,");
    println!("and prints the Open Graph head items of the rendered page.\n");
    println!("Options:");
    println!("    --config: Site configuration JSON file");
    println!("    --title: Page title (default: the main page)");
    println!("    --media-dir: Directory of media files, named by DB key");
    println!("    --sitename: Site name, overriding the configuration");
    println!("    --body: Also print the expanded wikitext\n");
    Err(anyhow::Error::msg(err))
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return usage("Help requested");
    }

    let config_path = args.opt_value_from_str::<_, String>("--config")?;
    let title = args.opt_value_from_str::<_, String>("--title")?;
    let media_dir = args.opt_value_from_str::<_, String>("--media-dir")?;
    let sitename = args.opt_value_from_str::<_, String>("--sitename")?;
    let print_body = args.contains("--body");
    let _ = args.contains("--");
    let Some(input_path) = args.opt_free_from_str::<String>()? else {
        return usage("Missing wikitext file argument");
    };

    if !args.finish().is_empty() {
        return usage("Unknown extra arguments passed");
    }

    let mut config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(sitename) = sitename {
        config.sitename = sitename;
    }

    let title_text = title.as_deref().unwrap_or(&config.main_page);
    let title = Title::new_from_text(title_text, None)
        .ok_or_else(|| Error::InvalidTitle(title_text.to_string()))?;

    let wikitext = read_input(&input_path)?;

    let local_repo;
    let files: &dyn FileRepo = match media_dir {
        Some(dir) => {
            local_repo = LocalRepo::new(dir, config.upload_path.clone());
            &local_repo
        }
        None => &EmptyRepo,
    };
    let messages = MessageCache::new(&config);
    let services = Services {
        config: &config,
        files,
        messages: &messages,
    };

    let mut hooks = Hooks::default();
    wiki_ogmeta::register(&mut hooks);

    let result = render_page(&hooks, &services, title, &wikitext)?;

    for (prefix, uri) in result.page.xml_namespaces() {
        println!(r#"xmlns:{prefix}="{uri}""#);
    }
    print!("{}", result.head()?);
    if print_body {
        println!("----");
        print!("{}", result.body);
    }

    Ok(())
}
