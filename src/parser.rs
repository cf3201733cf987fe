//! Recursive-descent parser for the build DSL.
//!
//! Each statement kind below is a small function that consumes the tokens
//! of one recipe. A function that finds the wrong token at any point
//! pushes that token back and returns `Ok(())` without effect — this is
//! the "abort to SEARCHING, discard the partial statement" behavior the
//! grammar calls for; it is not a parse error. Genuine parse errors are
//! reserved for the handful of things the grammar calls out explicitly
//! (nesting too deep, unexpected end of input mid-recipe).

use crate::error::{Error, ParseErrorKind, Result};
use crate::lexer::{Lexer, Token};
use crate::model::Model;

pub struct Parser {
    lexer: Lexer,
    model: Model,
    pending: Option<Token>,
    /// When set, every token freshly pulled from the lexer (i.e. not a
    /// replayed pushback) is also rendered here. Used by
    /// [`parse_capturing_expansion`] to reconstruct the fully macro-expanded
    /// source text for `-E`, the way the original reruns its whole parser
    /// and then dumps its (in-place expanded) source buffer.
    capture: Option<String>,
}

/// Parse a complete build file into a populated [`Model`].
pub fn parse(source: String) -> Result<Model> {
    let mut parser = Parser::new(source);
    parser.run()?;
    Ok(parser.model)
}

/// Parse a complete build file, also returning the fully macro-expanded
/// source text (words space-joined, logical lines preserved).
pub fn parse_capturing_expansion(source: String) -> Result<(Model, String)> {
    let mut parser = Parser::new(source);
    parser.capture = Some(String::new());
    parser.run()?;
    let mut text = parser.capture.take().unwrap_or_default();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok((parser.model, text))
}

impl Parser {
    fn new(source: String) -> Self {
        Self {
            lexer: Lexer::new(source),
            model: Model::new(),
            pending: None,
            capture: None,
        }
    }

    fn next(&mut self) -> Result<Option<Token>> {
        if let Some(tok) = self.pending.take() {
            return Ok(Some(tok));
        }
        let token = self.lexer.next_token(&self.model)?;
        if let Some(buf) = self.capture.as_mut() {
            render_token(buf, token.as_ref());
        }
        Ok(token)
    }

    fn pushback(&mut self, tok: Option<Token>) {
        if let Some(tok) = tok {
            self.pending = Some(tok);
        }
    }

    fn run(&mut self) -> Result<()> {
        loop {
            match self.next()? {
                None => return Ok(()),
                Some(Token::Word(w)) => match w.as_str() {
                    "build" => self.parse_build()?,
                    "target" => self.parse_target()?,
                    "define" => self.parse_define()?,
                    _ => {}
                },
                Some(_) => {}
            }
        }
    }

    fn parse_build(&mut self) -> Result<()> {
        match self.next()? {
            Some(Token::Word(name)) => self.model.build_root.set(name),
            other => {
                self.pushback(other);
                Ok(())
            }
        }
    }

    fn parse_target(&mut self) -> Result<()> {
        let name = match self.next()? {
            Some(Token::Word(w)) => w,
            other => {
                self.pushback(other);
                return Ok(());
            }
        };
        match self.next()? {
            Some(Token::OpenBrace) => {}
            other => {
                self.pushback(other);
                return Ok(());
            }
        }

        self.model.targets.add_target(&name)?;
        self.model.enter_scope(&name);
        let body_result = self.parse_target_body(&name);
        self.model.exit_scope();
        body_result
    }

    fn parse_target_body(&mut self, target: &str) -> Result<()> {
        loop {
            match self.next()? {
                None => {
                    return Err(Error::Parse {
                        line: self.lexer.line(),
                        kind: ParseErrorKind::UnexpectedEof,
                    });
                }
                Some(Token::CloseBrace) => return Ok(()),
                Some(Token::Word(w)) => match w.as_str() {
                    "depends" => self.parse_depends(target)?,
                    "created" => self.parse_created(target)?,
                    _ => {}
                },
                Some(_) => {}
            }
        }
    }

    fn parse_depends(&mut self, target: &str) -> Result<()> {
        match self.next()? {
            Some(Token::Word(w)) if w == "on" => {}
            other => {
                self.pushback(other);
                return Ok(());
            }
        }
        match self.next()? {
            Some(Token::OpenBrace) => {}
            other => {
                self.pushback(other);
                return Ok(());
            }
        }
        let entries = self.parse_list()?;
        for entry in entries {
            self.model.targets.append_dep(target, entry);
        }
        Ok(())
    }

    fn parse_created(&mut self, target: &str) -> Result<()> {
        match self.next()? {
            Some(Token::Word(w)) if w == "using" => {}
            other => {
                self.pushback(other);
                return Ok(());
            }
        }
        match self.next()? {
            Some(Token::OpenBrace) => {}
            other => {
                self.pushback(other);
                return Ok(());
            }
        }
        let entries = self.parse_list()?;
        for entry in entries {
            self.model.targets.append_command(target, entry);
        }
        Ok(())
    }

    fn parse_define(&mut self) -> Result<()> {
        let name = match self.next()? {
            Some(Token::Word(w)) => w,
            Some(Token::OpenBrace) => self.parse_list()?.join(" "),
            other => {
                self.pushback(other);
                return Ok(());
            }
        };
        match self.next()? {
            Some(Token::Word(w)) if w == "as" => {}
            other => {
                self.pushback(other);
                return Ok(());
            }
        }
        let value = match self.next()? {
            Some(Token::Word(w)) => w,
            other => {
                self.pushback(other);
                return Ok(());
            }
        };
        self.model.symbols.define(name, value);
        Ok(())
    }

    /// Read list entries up to the matching `}`. Words on the same
    /// logical line are joined with single spaces into one entry; a
    /// `Newline` token between words starts a new entry.
    fn parse_list(&mut self) -> Result<Vec<String>> {
        let mut entries = Vec::new();
        let mut current: Option<String> = None;
        loop {
            match self.next()? {
                None => {
                    return Err(Error::Parse {
                        line: self.lexer.line(),
                        kind: ParseErrorKind::UnexpectedEof,
                    });
                }
                Some(Token::CloseBrace) => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    return Ok(entries);
                }
                Some(Token::OpenBrace) => {
                    return Err(Error::Parse {
                        line: self.lexer.line(),
                        kind: ParseErrorKind::NestingTooDeep,
                    });
                }
                Some(Token::Newline) => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
                Some(Token::Word(w)) => match &mut current {
                    Some(s) => {
                        s.push(' ');
                        s.push_str(&w);
                    }
                    None => current = Some(w),
                },
            }
        }
    }
}

fn render_token(buf: &mut String, token: Option<&Token>) {
    match token {
        Some(Token::Word(w)) => {
            if !buf.is_empty() && !buf.ends_with('\n') && !buf.ends_with(' ') {
                buf.push(' ');
            }
            buf.push_str(w);
        }
        Some(Token::OpenBrace) => {
            if !buf.is_empty() && !buf.ends_with('\n') && !buf.ends_with(' ') {
                buf.push(' ');
            }
            buf.push('{');
        }
        Some(Token::CloseBrace) => {
            if !buf.is_empty() && !buf.ends_with('\n') && !buf.ends_with(' ') {
                buf.push(' ');
            }
            buf.push('}');
        }
        Some(Token::Newline) => buf.push('\n'),
        None => {}
    }
}
