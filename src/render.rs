//! A reference page rendering pipeline.
//!
//! Rendering a page happens in two phases. First, the wikitext is expanded
//! with a parser whose functions were registered by the
//! `ParserFirstCallInit` hooks, which records metadata into a fresh
//! [`ParserOutput`]. Then the `OutputPageParserOutput` hooks turn that
//! metadata into head items on an [`OutputPage`].

use crate::{
    Result,
    hooks::{Hooks, Services},
    output::{OutputPage, ParserOutput},
    parser::{Parser, State},
    title::Title,
};
use std::time::Instant;

/// The result of rendering a page.
#[derive(Debug)]
pub struct RenderOutput {
    /// The expanded wikitext of the page body.
    pub body: String,
    /// The page output, including head items.
    pub page: OutputPage,
    /// The metadata recorded while parsing.
    pub parser_output: ParserOutput,
}

impl RenderOutput {
    /// The concatenated head items of the page.
    pub fn head(&self) -> Result<String> {
        let mut head = String::new();
        self.page.write_head(&mut head)?;
        Ok(head)
    }
}

/// Renders the page `title` with source `wikitext`, running all registered
/// hooks.
pub fn render_page(
    hooks: &Hooks,
    services: &Services<'_>,
    title: Title,
    wikitext: &str,
) -> Result<RenderOutput> {
    let time = Instant::now();

    let mut parser = Parser::default();
    hooks.run_parser_first_call_init(&mut parser);

    let mut parser_output = ParserOutput::default();
    let body = {
        let mut state = State {
            services,
            title: &title,
            output: &mut parser_output,
        };
        parser.expand(&mut state, wikitext)?
    };
    log::trace!("Parsed {title} in {:.2?}", time.elapsed());

    let mut page = OutputPage::new(title);
    hooks.run_output_page_parser_output(&mut page, &parser_output, services)?;
    log::debug!("Rendered {} in {:.2?}", page.title(), time.elapsed());

    Ok(RenderOutput {
        body,
        page,
        parser_output,
    })
}
