//! A minimal wikitext preprocessor that dispatches parser function calls.
//!
//! Only `{{#name: arg | arg | …}}` expressions are understood. Anything else
//! inside double braces is left as-is, although parser function calls nested
//! inside it are still expanded. Arguments are expanded innermost first and
//! then trimmed, which matches how a registered parser function without
//! object arguments sees its input.

use crate::{Result, common::is_truthy, hooks::Services, output::ParserOutput, title::Title};
use std::collections::HashMap;

/// The function signature of a parser function.
pub type ParserFn = fn(&mut String, &mut State<'_>, &Arguments<'_>) -> Result;

/// Parser state that is shared across parser function calls within one
/// render.
pub struct State<'s> {
    /// Host services.
    pub services: &'s Services<'s>,
    /// The title of the page being parsed.
    pub title: &'s Title,
    /// The per-render metadata store.
    pub output: &'s mut ParserOutput,
}

/// The expanded and trimmed arguments of a parser function call.
#[derive(Debug)]
pub struct Arguments<'a> {
    /// The name the function was called with.
    pub callee: &'a str,
    /// The argument values. The first value is the text between the colon and
    /// the first pipe.
    values: Vec<String>,
}

impl<'a> Arguments<'a> {
    /// Creates a new argument list.
    pub fn new(callee: &'a str, values: Vec<String>) -> Self {
        Self { callee, values }
    }

    /// Returns the argument at `index`, if it was given.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Returns true if the argument at `index` is truthy, which means it was
    /// given and it is neither empty nor `"0"`.
    pub fn is_truthy(&self, index: usize) -> bool {
        self.get(index).is_some_and(is_truthy)
    }
}

/// A wikitext parser with a table of registered parser functions.
#[derive(Clone, Debug, Default)]
pub struct Parser {
    /// Registered parser functions, by lowercase name without the `#`.
    function_hooks: HashMap<String, ParserFn>,
}

impl Parser {
    /// Registers a parser function, which will be callable as `{{#name:…}}`.
    /// Returns the previously registered function with the same name, if
    /// any.
    pub fn set_function_hook(&mut self, name: &str, callback: ParserFn) -> Option<ParserFn> {
        let name = name.to_lowercase();
        log::trace!("Registering parser function #{name}");
        self.function_hooks.insert(name, callback)
    }

    /// Returns true if a parser function is registered with the given name.
    pub fn has_function_hook(&self, name: &str) -> bool {
        self.function_hooks.contains_key(&name.to_lowercase())
    }

    /// Expands all parser function calls in `text`.
    pub fn expand(&self, state: &mut State<'_>, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        self.expand_into(&mut out, state, text)?;
        Ok(out)
    }

    /// Expands all parser function calls in `text` into `out`.
    fn expand_into(&self, out: &mut String, state: &mut State<'_>, text: &str) -> Result {
        let mut rest = text;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let body_start = start + "{{".len();
            if let Some(len) = find_close(&rest[body_start..]) {
                let body = &rest[body_start..body_start + len];
                self.call(out, state, body)?;
                rest = &rest[body_start + len + "}}".len()..];
            } else {
                out.push_str("{{");
                rest = &rest[body_start..];
            }
        }
        out.push_str(rest);
        Ok(())
    }

    /// Expands a single brace expression with the given body.
    fn call(&self, out: &mut String, state: &mut State<'_>, body: &str) -> Result {
        let parts = split_args(body);
        let [target, rest @ ..] = parts.as_slice() else {
            return Ok(());
        };

        let callback = target.split_once(':').and_then(|(name, first)| {
            let name = name.trim().strip_prefix('#')?;
            let callback = self.function_hooks.get(&name.to_lowercase())?;
            Some((name, first, callback))
        });

        let Some((name, first, callback)) = callback else {
            // Not a parser function; keep the braces but still expand
            // anything nested inside
            out.push_str("{{");
            self.expand_into(out, state, body)?;
            out.push_str("}}");
            return Ok(());
        };

        let values = core::iter::once(first)
            .chain(rest.iter().copied())
            .map(|value| Ok(self.expand(state, value)?.trim_ascii().to_string()))
            .collect::<Result<Vec<_>>>()?;

        log::trace!("#{name}: {values:?}");
        callback(out, state, &Arguments::new(name, values))
    }
}

/// Returns the length of `text` up to the `}}` which balances an already
/// consumed `{{`.
fn find_close(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1_usize;
    let mut index = 0;
    while index < bytes.len() {
        match &bytes[index..] {
            [b'{', b'{', ..] => {
                depth += 1;
                index += 2;
            }
            [b'}', b'}', ..] => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
                index += 2;
            }
            _ => index += 1,
        }
    }
    None
}

/// Splits the body of a brace expression on pipes which are not nested
/// inside another brace expression or a link.
fn split_args(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut parts = Vec::new();
    let mut braces = 0_usize;
    let mut brackets = 0_usize;
    let mut flushed = 0;
    let mut index = 0;
    while index < bytes.len() {
        match &bytes[index..] {
            [b'{', b'{', ..] => {
                braces += 1;
                index += 2;
            }
            [b'}', b'}', ..] if braces > 0 => {
                braces -= 1;
                index += 2;
            }
            [b'[', b'[', ..] => {
                brackets += 1;
                index += 2;
            }
            [b']', b']', ..] if brackets > 0 => {
                brackets -= 1;
                index += 2;
            }
            [b'|', ..] if braces == 0 && brackets == 0 => {
                parts.push(&body[flushed..index]);
                index += 1;
                flushed = index;
            }
            _ => index += 1,
        }
    }
    parts.push(&body[flushed..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, file::EmptyRepo, message::MessageCache};
    use core::fmt::Write as _;

    fn echo(out: &mut String, _: &mut State<'_>, arguments: &Arguments<'_>) -> Result {
        write!(out, "[{}:", arguments.callee)?;
        for value in (0..).map_while(|index| arguments.get(index)) {
            write!(out, "<{value}>")?;
        }
        out.push(']');
        Ok(())
    }

    fn expand(text: &str) -> String {
        let config = Config::default();
        let messages = MessageCache::new(&config);
        let services = Services {
            config: &config,
            files: &EmptyRepo,
            messages: &messages,
        };
        let title = Title::new_from_text("Test", None).unwrap();
        let mut output = ParserOutput::default();
        let mut state = State {
            services: &services,
            title: &title,
            output: &mut output,
        };
        let mut parser = Parser::default();
        parser.set_function_hook("Echo", echo);
        parser.expand(&mut state, text).unwrap()
    }

    #[test]
    fn calls() {
        assert_eq!(expand("a {{#echo: x | y }} b"), "a [echo:<x><y>] b");
        assert_eq!(expand("{{#ECHO:}}"), "[ECHO:<>]", "names are case-insensitive");
        assert_eq!(
            expand("{{#echo: [[A|B]] | {{#echo:1|2}} }}"),
            "[echo:<[[A|B]]><[echo:<1><2>]>]"
        );
    }

    #[test]
    fn not_calls() {
        assert_eq!(expand("{{echo: x}}"), "{{echo: x}}", "hash is required");
        assert_eq!(expand("{{#other: x}}"), "{{#other: x}}");
        assert_eq!(expand("{{Template|{{#echo:x}}}}"), "{{Template|[echo:<x>]}}");
        assert_eq!(expand("{{ {{#echo:x}}"), "{{ [echo:<x>]");
        assert_eq!(expand("a }} b"), "a }} b");
    }

    #[test]
    fn truthiness() {
        let arguments = Arguments::new("x", vec!["a".into(), String::new(), "0".into()]);
        assert!(arguments.is_truthy(0));
        assert!(!arguments.is_truthy(1));
        assert!(!arguments.is_truthy(2));
        assert!(!arguments.is_truthy(3));
    }
}
