//! CSS selector engine for the in-memory DOM.
//!
//! Supported:
//!
//! - type, universal, `#id`, `.class`
//! - attributes: `[a]`, `[a=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`, `[a~=v]`, `[a|=v]`
//! - structural pseudo-classes: `:first-child`, `:last-child`, `:only-child`,
//!   `:first-of-type`, `:last-of-type`, `:nth-child(an+b)`, `:empty`
//! - form state: `:checked`, `:disabled`, `:enabled`
//! - negation: `:not(list)`
//! - combinators: descendant, `>`, `+`, `~`, and comma-separated lists
//!
//! Dynamic state the arena does not model (`:hover`, `:focus`, pseudo
//! elements) is rejected as an invalid selector.

use crate::result::{SpecdomError, SpecdomResult};

/// Element access needed to evaluate a selector
pub(crate) trait SelectorSubject {
    /// Node identifier
    type Id: Copy + PartialEq + 'static;

    /// Lower-case tag name
    fn tag(&self, id: Self::Id) -> &str;

    /// Attribute value
    fn attr(&self, id: Self::Id, name: &str) -> Option<&str>;

    /// Class membership
    fn has_class(&self, id: Self::Id, class: &str) -> bool;

    /// Parent element
    fn parent(&self, id: Self::Id) -> Option<Self::Id>;

    /// Previous element sibling
    fn prev_sibling(&self, id: Self::Id) -> Option<Self::Id>;

    /// Next element sibling
    fn next_sibling(&self, id: Self::Id) -> Option<Self::Id>;

    /// Whether the node has any child nodes, text included
    fn has_child_nodes(&self, id: Self::Id) -> bool;

    /// `checked` property
    fn checked_state(&self, id: Self::Id) -> bool;

    /// `disabled` property
    fn disabled_state(&self, id: Self::Id) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
    Prefix(String, String),
    Suffix(String, String),
    Substring(String, String),
    Word(String, String),
    DashPrefix(String, String),
}

impl AttrMatch {
    fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Id) -> bool {
        let (name, expected) = match self {
            Self::Exists(name) => return subject.attr(node, name).is_some(),
            Self::Equals(n, v)
            | Self::Prefix(n, v)
            | Self::Suffix(n, v)
            | Self::Substring(n, v)
            | Self::Word(n, v)
            | Self::DashPrefix(n, v) => (n, v.as_str()),
        };
        let Some(actual) = subject.attr(node, name) else {
            return false;
        };
        match self {
            Self::Exists(_) => true,
            Self::Equals(..) => actual == expected,
            // Empty operands never match for the substring family.
            Self::Prefix(..) => !expected.is_empty() && actual.starts_with(expected),
            Self::Suffix(..) => !expected.is_empty() && actual.ends_with(expected),
            Self::Substring(..) => !expected.is_empty() && actual.contains(expected),
            Self::Word(..) => actual.split_whitespace().any(|w| w == expected),
            Self::DashPrefix(..) => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    NthChild { a: i64, b: i64 },
    Empty,
    Checked,
    Disabled,
    Enabled,
    Not(Selector),
}

impl Pseudo {
    fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Id) -> bool {
        match self {
            Self::FirstChild => subject.prev_sibling(node).is_none(),
            Self::LastChild => subject.next_sibling(node).is_none(),
            Self::OnlyChild => {
                subject.prev_sibling(node).is_none() && subject.next_sibling(node).is_none()
            }
            Self::FirstOfType => !siblings(subject, node, S::prev_sibling)
                .any(|s| subject.tag(s) == subject.tag(node)),
            Self::LastOfType => !siblings(subject, node, S::next_sibling)
                .any(|s| subject.tag(s) == subject.tag(node)),
            Self::NthChild { a, b } => {
                let before = siblings(subject, node, S::prev_sibling).count();
                i64::try_from(before).is_ok_and(|before| nth_matches(*a, *b, before + 1))
            }
            Self::Empty => !subject.has_child_nodes(node),
            Self::Checked => subject.checked_state(node),
            Self::Disabled => subject.disabled_state(node),
            Self::Enabled => !subject.disabled_state(node),
            Self::Not(inner) => !inner.matches(subject, node),
        }
    }
}

fn siblings<'s, S: SelectorSubject + 's>(
    subject: &'s S,
    node: S::Id,
    step: fn(&S, S::Id) -> Option<S::Id>,
) -> impl Iterator<Item = S::Id> + 's {
    std::iter::successors(step(subject, node), move |current| step(subject, *current))
}

/// Whether a 1-based `position` is `a*n + b` for some `n >= 0`
fn nth_matches(a: i64, b: i64, position: i64) -> bool {
    if a == 0 {
        return position == b;
    }
    let offset = position - b;
    offset % a == 0 && offset / a >= 0
}

/// Parse the argument of `:nth-child`
fn parse_nth(argument: &str) -> Option<(i64, i64)> {
    let arg: String = argument
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match arg.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        _ => {}
    }
    let Some(n_at) = arg.find('n') else {
        return arg.parse().ok().map(|b| (0, b));
    };
    let a = match &arg[..n_at] {
        "" | "+" => 1,
        "-" => -1,
        digits => digits.parse().ok()?,
    };
    let b = match &arg[n_at + 1..] {
        "" => 0,
        rest if rest.starts_with('+') || rest.starts_with('-') => rest.parse().ok()?,
        _ => return None,
    };
    Some((a, b))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
    pseudos: Vec<Pseudo>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudos.is_empty()
    }

    fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Id) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !subject.tag(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if subject.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| subject.has_class(node, c))
            && self.attrs.iter().all(|a| a.matches(subject, node))
            && self.pseudos.iter().all(|p| p.matches(subject, node))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    Adjacent,
    Sibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    // combinators[i] joins compounds[i] and compounds[i + 1]
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Id) -> bool {
        self.matches_at(subject, self.compounds.len() - 1, node)
    }

    fn matches_at<S: SelectorSubject>(&self, subject: &S, index: usize, node: S::Id) -> bool {
        if !self.compounds[index].matches(subject, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let next = |candidate: S::Id| self.matches_at(subject, index - 1, candidate);
        match self.combinators[index - 1] {
            Combinator::Child => subject.parent(node).is_some_and(next),
            Combinator::Adjacent => subject.prev_sibling(node).is_some_and(next),
            Combinator::Descendant => siblings(subject, node, S::parent).any(next),
            Combinator::Sibling => siblings(subject, node, S::prev_sibling).any(next),
        }
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(source: &str) -> SpecdomResult<Self> {
        Self::parse_within(source, source)
    }

    fn parse_within(source: &str, list: &str) -> SpecdomResult<Self> {
        let mut alternatives = Vec::new();
        for part in split_top_level(list) {
            alternatives.push(Parser::new(source, part).complex()?);
        }
        Ok(Self { alternatives })
    }

    pub(crate) fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Id) -> bool {
        self.alternatives.iter().any(|c| c.matches(subject, node))
    }
}

fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, part: &'a str) -> Self {
        Self {
            source,
            chars: part.chars().peekable(),
        }
    }

    fn error(&self, message: impl Into<String>) -> SpecdomError {
        SpecdomError::invalid_selector(self.source, message)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn ident(&mut self) -> SpecdomResult<String> {
        let mut out = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !is_ident_char(ch) {
                break;
            }
            out.push(ch);
            self.chars.next();
        }
        if out.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(out)
    }

    fn complex(&mut self) -> SpecdomResult<Complex> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        self.skip_whitespace();
        loop {
            let compound = self.compound()?;
            if compound.is_empty() {
                return Err(self.error("expected selector"));
            }
            compounds.push(compound);

            let spaced = self.skip_whitespace();
            let explicit = match self.chars.peek() {
                None => break,
                Some('>') => Some(Combinator::Child),
                Some('+') => Some(Combinator::Adjacent),
                Some('~') => Some(Combinator::Sibling),
                Some(_) if spaced => None,
                Some(&ch) => return Err(self.error(format!("unexpected '{ch}'"))),
            };
            if let Some(combinator) = explicit {
                self.chars.next();
                self.skip_whitespace();
                combinators.push(combinator);
            } else {
                combinators.push(Combinator::Descendant);
            }
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> SpecdomResult<Compound> {
        let mut compound = Compound::default();
        match self.chars.peek() {
            Some('*') => {
                self.chars.next();
                compound.tag = Some("*".to_string());
            }
            Some(&ch) if is_ident_char(ch) => compound.tag = Some(self.ident()?.to_lowercase()),
            _ => {}
        }
        while let Some(&ch) = self.chars.peek() {
            match ch {
                '#' => {
                    self.chars.next();
                    compound.id = Some(self.ident()?);
                }
                '.' => {
                    self.chars.next();
                    compound.classes.push(self.ident()?);
                }
                '[' => {
                    self.chars.next();
                    compound.attrs.push(self.attribute()?);
                }
                ':' => {
                    self.chars.next();
                    compound.pseudos.push(self.pseudo()?);
                }
                c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => break,
                other => return Err(self.error(format!("unexpected '{other}'"))),
            }
        }
        Ok(compound)
    }

    fn pseudo(&mut self) -> SpecdomResult<Pseudo> {
        let name = self.ident()?.to_ascii_lowercase();
        let pseudo = match name.as_str() {
            "first-child" => Pseudo::FirstChild,
            "last-child" => Pseudo::LastChild,
            "only-child" => Pseudo::OnlyChild,
            "first-of-type" => Pseudo::FirstOfType,
            "last-of-type" => Pseudo::LastOfType,
            "empty" => Pseudo::Empty,
            "checked" => Pseudo::Checked,
            "disabled" => Pseudo::Disabled,
            "enabled" => Pseudo::Enabled,
            "nth-child" => {
                let argument = self.arguments()?;
                let (a, b) = parse_nth(&argument)
                    .ok_or_else(|| self.error(format!("invalid :nth-child({argument})")))?;
                Pseudo::NthChild { a, b }
            }
            "not" => {
                let argument = self.arguments()?;
                Pseudo::Not(Selector::parse_within(self.source, &argument)?)
            }
            other => return Err(self.error(format!("unsupported pseudo-class :{other}"))),
        };
        Ok(pseudo)
    }

    /// Text between balanced parentheses
    fn arguments(&mut self) -> SpecdomResult<String> {
        if self.chars.next() != Some('(') {
            return Err(self.error("expected '('"));
        }
        let mut depth = 1usize;
        let mut out = String::new();
        for ch in self.chars.by_ref() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                }
                _ => {}
            }
            out.push(ch);
        }
        Err(self.error("unterminated '('"))
    }

    fn attribute(&mut self) -> SpecdomResult<AttrMatch> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let operator = match self.chars.next() {
            Some(']') => return Ok(AttrMatch::Exists(name)),
            Some('=') => '=',
            Some(op @ ('^' | '$' | '*' | '~' | '|')) => {
                if self.chars.next() != Some('=') {
                    return Err(self.error("expected '='"));
                }
                op
            }
            _ => return Err(self.error("unterminated attribute selector")),
        };
        self.skip_whitespace();
        let value = match self.chars.peek() {
            Some(&q) if q == '"' || q == '\'' => {
                self.chars.next();
                let mut value = String::new();
                loop {
                    match self.chars.next() {
                        Some(c) if c == q => break,
                        Some(c) => value.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
                value
            }
            _ => self.ident()?,
        };
        self.skip_whitespace();
        if self.chars.next() != Some(']') {
            return Err(self.error("expected ']'"));
        }
        Ok(match operator {
            '^' => AttrMatch::Prefix(name, value),
            '$' => AttrMatch::Suffix(name, value),
            '*' => AttrMatch::Substring(name, value),
            '~' => AttrMatch::Word(name, value),
            '|' => AttrMatch::DashPrefix(name, value),
            _ => AttrMatch::Equals(name, value),
        })
    }
}
