//! CSS selector subset used by the page templates
//!
//! Supported: type, `*`, `#id`, `.class`, `[attr]` and `[attr=value]` compounds,
//! joined by descendant (whitespace) or child (`>`) combinators, in
//! comma-separated lists.

use crate::error::{AppError, Result};
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<ComplexSelector>,
}

/// Compounds left to right; each carries its relation to the compound before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ComplexSelector {
    pub(crate) parts: Vec<(Combinator, CompoundSelector)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CompoundSelector {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<AttrMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrMatch {
    Exists(String),
    Equals(String, String),
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let groups = split_groups(source)
            .into_iter()
            .map(|group| parse_complex(group, source))
            .collect::<Result<Vec<_>>>()?;

        if groups.is_empty() {
            return Err(invalid(source));
        }

        Ok(Selector { groups })
    }

    pub(crate) fn groups(&self) -> &[ComplexSelector] {
        &self.groups
    }
}

impl CompoundSelector {
    /// Match against an element's tag name and attributes
    pub(crate) fn matches(&self, tag: &str, attr: impl Fn(&str) -> Option<String>) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(expected) = &self.id {
            if attr("id").as_deref() != Some(expected.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = attr("class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }

        self.attrs.iter().all(|m| match m {
            AttrMatch::Exists(name) => attr(name).is_some(),
            AttrMatch::Equals(name, value) => attr(name).as_deref() == Some(value.as_str()),
        })
    }
}

fn invalid(source: &str) -> AppError {
    AppError::InvalidSelector(source.to_string())
}

// Split on top-level commas, leaving commas inside brackets or quotes alone
fn split_groups(source: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for (idx, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => in_brackets = true,
            (None, ']') => in_brackets = false,
            (None, ',') if !in_brackets => {
                groups.push(&source[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    groups.push(&source[start..]);

    groups
}

fn parse_complex(group: &str, source: &str) -> Result<ComplexSelector> {
    let mut chars = group.chars().peekable();
    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        match chars.peek() {
            None => break,
            Some('>') => {
                if parts.is_empty() || pending.is_some() {
                    return Err(invalid(source));
                }
                chars.next();
                pending = Some(Combinator::Child);
            }
            Some(_) => {
                let compound = parse_compound(&mut chars, source)?;
                let combinator = pending.take().unwrap_or(Combinator::Descendant);
                parts.push((combinator, compound));
            }
        }
    }

    if parts.is_empty() || pending.is_some() {
        return Err(invalid(source));
    }

    Ok(ComplexSelector { parts })
}

fn parse_compound(chars: &mut Peekable<Chars<'_>>, source: &str) -> Result<CompoundSelector> {
    let mut compound = CompoundSelector::default();
    let mut consumed = false;

    while let Some(&ch) = chars.peek() {
        match ch {
            '#' => {
                chars.next();
                compound.id = Some(parse_ident(chars).ok_or_else(|| invalid(source))?);
            }
            '.' => {
                chars.next();
                compound
                    .classes
                    .push(parse_ident(chars).ok_or_else(|| invalid(source))?);
            }
            '[' => {
                chars.next();
                compound.attrs.push(parse_attr(chars, source)?);
            }
            '*' if !consumed => {
                chars.next();
            }
            c if is_ident_char(c) && !consumed => {
                compound.tag = parse_ident(chars);
            }
            c if c.is_whitespace() || c == '>' => break,
            _ => return Err(invalid(source)),
        }
        consumed = true;
    }

    if !consumed {
        return Err(invalid(source));
    }

    Ok(compound)
}

fn parse_attr(chars: &mut Peekable<Chars<'_>>, source: &str) -> Result<AttrMatch> {
    skip_whitespace(chars);
    let name = parse_ident(chars).ok_or_else(|| invalid(source))?;
    skip_whitespace(chars);

    match chars.next() {
        Some(']') => Ok(AttrMatch::Exists(name)),
        Some('=') => {
            skip_whitespace(chars);
            let value = match chars.peek() {
                Some(&q) if q == '"' || q == '\'' => {
                    chars.next();
                    let mut value = String::new();
                    loop {
                        match chars.next() {
                            Some(c) if c == q => break,
                            Some(c) => value.push(c),
                            None => return Err(invalid(source)),
                        }
                    }
                    value
                }
                _ => parse_ident(chars).ok_or_else(|| invalid(source))?,
            };
            skip_whitespace(chars);
            match chars.next() {
                Some(']') => Ok(AttrMatch::Equals(name, value)),
                _ => Err(invalid(source)),
            }
        }
        _ => Err(invalid(source)),
    }
}

fn parse_ident(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    (!ident.is_empty()).then_some(ident)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
