//! Extension points of the rendering pipeline.

use crate::{
    Result,
    config::Config,
    file::FileRepo,
    message::Messages,
    output::{OutputPage, ParserOutput},
    parser::Parser,
};

/// Host services available to extension code during a render.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    /// Site configuration.
    pub config: &'a Config,
    /// The media file repository.
    pub files: &'a dyn FileRepo,
    /// Interface messages.
    pub messages: &'a dyn Messages,
}

/// Called once when a parser is first used, to register parser functions.
pub type ParserFirstCallInit = fn(&mut Parser);

/// Called once per page output, after parsing has finished, with the
/// metadata recorded by the parser.
pub type OutputPageParserOutput =
    fn(&mut OutputPage, &ParserOutput, &Services<'_>) -> Result;

/// The registered extension hook handlers.
#[derive(Clone, Debug, Default)]
pub struct Hooks {
    /// `ParserFirstCallInit` handlers.
    parser_first_call_init: Vec<ParserFirstCallInit>,
    /// `OutputPageParserOutput` handlers.
    output_page_parser_output: Vec<OutputPageParserOutput>,
}

impl Hooks {
    /// Registers a `ParserFirstCallInit` handler.
    pub fn on_parser_first_call_init(&mut self, handler: ParserFirstCallInit) {
        self.parser_first_call_init.push(handler);
    }

    /// Registers an `OutputPageParserOutput` handler.
    pub fn on_output_page_parser_output(&mut self, handler: OutputPageParserOutput) {
        self.output_page_parser_output.push(handler);
    }

    /// Runs all `ParserFirstCallInit` handlers, in registration order.
    pub fn run_parser_first_call_init(&self, parser: &mut Parser) {
        for handler in &self.parser_first_call_init {
            handler(parser);
        }
    }

    /// Runs all `OutputPageParserOutput` handlers, in registration order.
    pub fn run_output_page_parser_output(
        &self,
        out: &mut OutputPage,
        parser_output: &ParserOutput,
        services: &Services<'_>,
    ) -> Result {
        for handler in &self.output_page_parser_output {
            handler(out, parser_output, services)?;
        }
        Ok(())
    }
}
