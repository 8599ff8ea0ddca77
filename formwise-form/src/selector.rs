// CSS selector subset used to locate forms, fields, groups and slots
//
// Supported: type and universal selectors, `#id`, `.class`, `[attr]`,
// `[attr=value]`, `:checked`, `:disabled`, `:enabled`, `:not(compound)`,
// descendant and `>` combinators, and comma-separated lists.

use crate::ElementId;
use crate::document::Tree;
use std::fmt;
use std::str::FromStr;

/// Why a selector string was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
    pub position: usize,
    pub reason: String,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.reason, self.position)
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    Checked,
    Disabled,
    Enabled,
    Not(Box<Compound>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
    pseudos: Vec<Pseudo>,
}

impl Compound {
    fn matches(&self, tree: &Tree, id: ElementId) -> bool {
        let Some(element) = tree.element(id) else {
            return false;
        };
        if tree.is_root(id) {
            return false;
        }

        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(wanted) = &self.id {
            if element.id.as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        let attrs_match = self.attrs.iter().all(|test| {
            match (element.attr_value(&test.name), &test.value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual.as_ref() == expected.as_str(),
            }
        });
        if !attrs_match {
            return false;
        }

        self.pseudos.iter().all(|pseudo| match pseudo {
            Pseudo::Checked => element.is_checked(),
            Pseudo::Disabled => element.is_disabled(),
            Pseudo::Enabled => element.kind().is_control() && !element.is_disabled(),
            Pseudo::Not(inner) => !inner.matches(tree, id),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    // left to right; combinators[i] joins parts[i] and parts[i + 1]
    parts: Vec<Compound>,
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches(&self, tree: &Tree, id: ElementId) -> bool {
        self.matches_at(tree, self.parts.len() - 1, id)
    }

    fn matches_at(&self, tree: &Tree, index: usize, id: ElementId) -> bool {
        if !self.parts[index].matches(tree, id) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent(id)
                .is_some_and(|parent| self.matches_at(tree, index - 1, parent)),
            Combinator::Descendant => {
                let mut current = tree.parent(id);
                while let Some(ancestor) = current {
                    if self.matches_at(tree, index - 1, ancestor) {
                        return true;
                    }
                    current = tree.parent(ancestor);
                }
                false
            }
        }
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let alternatives = Parser::new(source).parse_list()?;
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn matches(&self, tree: &Tree, id: ElementId) -> bool {
        self.alternatives.iter().any(|complex| complex.matches(tree, id))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error<T>(&self, reason: impl Into<String>) -> Result<T, SelectorError> {
        Err(SelectorError {
            position: self.pos,
            reason: reason.into(),
        })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Returns whether any whitespace was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return self.error("expected a name");
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            list.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => return Ok(list),
                Some(',') => {
                    self.pos += 1;
                }
                Some(c) => return self.error(format!("unexpected '{}'", c)),
            }
        }
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(c) => return self.error(format!("unexpected '{}'", c)),
            }
            parts.push(self.parse_compound()?);
        }

        Ok(Complex { parts, combinators })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut compound = Compound::default();

        if self.eat('*') {
            // universal, no tag constraint
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.pseudos.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return self.error("expected a selector");
        }
        Ok(compound)
    }

    fn parse_attr(&mut self) -> Result<AttrTest, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let value = if self.eat('=') {
            self.skip_whitespace();
            Some(self.attr_value()?)
        } else {
            None
        };

        self.skip_whitespace();
        if !self.eat(']') {
            return self.error("expected ']'");
        }
        Ok(AttrTest { name, value })
    }

    fn attr_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => return Ok(value),
                        Some(c) => value.push(c),
                        None => return self.error("unterminated string"),
                    }
                }
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c != ']' && !c.is_whitespace())
                {
                    self.pos += 1;
                }
                if self.pos == start {
                    return self.error("expected an attribute value");
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
        }
    }

    fn parse_pseudo(&mut self) -> Result<Pseudo, SelectorError> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "checked" => Ok(Pseudo::Checked),
            "disabled" => Ok(Pseudo::Disabled),
            "enabled" => Ok(Pseudo::Enabled),
            "not" => {
                if !self.eat('(') {
                    return self.error("expected '(' after :not");
                }
                self.skip_whitespace();
                let inner = self.parse_compound()?;
                self.skip_whitespace();
                if !self.eat(')') {
                    return self.error("expected ')'");
                }
                Ok(Pseudo::Not(Box::new(inner)))
            }
            other => self.error(format!("unsupported pseudo-class :{}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_supported_forms() {
        for source in [
            "#sign-in-user",
            ".group",
            "input[name=gender]:checked",
            "[name]:not([disabled])",
            ".sign-up-htm #sign-up-pass",
            "form > .group .message",
            "input[type='checkbox'], select",
            "*",
            "button[type=\"submit\"]",
        ] {
            assert!(Selector::parse(source).is_ok(), "{source} should parse");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for source in ["", "#", "..x", "a[", "[name=]", ":hover", "a,", "a ~ b", ":not(a"] {
            assert!(Selector::parse(source).is_err(), "{source:?} should fail");
        }
    }

    #[test]
    fn test_error_reports_position() {
        let err = Selector::parse("input:hover").unwrap_err();
        assert!(err.reason.contains("hover"));
        assert_eq!(err.position, 11);
    }

    #[test]
    fn test_display_keeps_source() {
        let selector: Selector = " .group  .message ".parse().unwrap();
        assert_eq!(selector.to_string(), ".group  .message");
    }
}
