// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [Parameter types][1] usable as `{name}` placeholders in step expressions.
//!
//! [1]: https://github.com/cucumber/cucumber-expressions#parameter-types

use std::{any::Any, collections::HashMap, fmt, rc::Rc, str::FromStr};

use lazy_regex::regex_is_match;
use regex::Regex;
use regex_syntax::ast::{self, Ast};

use crate::error::RegistrationError;

/// Function converting captured text into an argument value.
///
/// Receives the world of the running scenario, so conversions may depend on
/// ambient execution state.
pub type Transformer<W> = Rc<dyn Fn(&W, &str) -> anyhow::Result<Box<dyn Any>>>;

/// Named regex along with a [`Transformer`] converting its match.
pub struct ParameterType<W> {
    /// Name used in `{name}` placeholders.
    name: String,

    /// Regex the placeholder expands into.
    regexp: String,

    /// Conversion of the matched text.
    transformer: Transformer<W>,

    /// Whether this is one of the types every [`ParameterTypes`] starts
    /// with.
    builtin: bool,
}

// Implemented manually to omit redundant `W: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<W> Clone for ParameterType<W> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            regexp: self.regexp.clone(),
            transformer: Rc::clone(&self.transformer),
            builtin: self.builtin,
        }
    }
}

impl<W> fmt::Debug for ParameterType<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterType")
            .field("name", &self.name)
            .field("regexp", &self.regexp)
            .field("transformer", &format!("{:p}", self.transformer))
            .field("builtin", &self.builtin)
            .finish()
    }
}

impl<W> ParameterType<W> {
    /// Creates a new [`ParameterType`] converting matches with the given
    /// `transformer`.
    ///
    /// The `regexp` must not contain capturing groups, use `(?:...)` instead.
    pub fn new<T, E, F>(
        name: impl Into<String>,
        regexp: impl Into<String>,
        transformer: F,
    ) -> Self
    where
        T: Any,
        E: Into<anyhow::Error>,
        F: Fn(&W, &str) -> Result<T, E> + 'static,
    {
        Self {
            name: name.into(),
            regexp: regexp.into(),
            transformer: Rc::new(move |world: &W, text: &str| {
                transformer(world, text)
                    .map(|v| -> Box<dyn Any> { Box::new(v) })
                    .map_err(Into::into)
            }),
            builtin: false,
        }
    }

    /// Creates a new [`ParameterType`] converting matches with [`FromStr`].
    pub fn parsed<T>(name: impl Into<String>, regexp: impl Into<String>) -> Self
    where
        T: FromStr + Any,
        T::Err: Into<anyhow::Error>,
    {
        Self::new(name, regexp, |_: &W, text: &str| text.parse::<T>())
    }

    /// Name of this [`ParameterType`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Regex of this [`ParameterType`].
    #[must_use]
    pub fn regexp(&self) -> &str {
        &self.regexp
    }

    /// Indicates whether this [`ParameterType`] is a built-in one.
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Converts the captured `text` in the context of the given `world`.
    ///
    /// # Errors
    ///
    /// Whatever the [`Transformer`] fails with.
    pub fn transform(&self, world: &W, text: &str) -> anyhow::Result<Box<dyn Any>> {
        (self.transformer)(world, text)
    }

    fn builtin<T, F>(name: &str, regexp: &str, transformer: F) -> Self
    where
        T: Any,
        F: Fn(&str) -> anyhow::Result<T> + 'static,
    {
        Self {
            builtin: true,
            ..Self::new(name, regexp, move |_: &W, text: &str| transformer(text))
        }
    }

    fn validate(&self) -> Result<(), RegistrationError> {
        let invalid = |reason: String| RegistrationError::InvalidParameterType {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name must not be empty".into()));
        }
        if regex_is_match!(r"[\[\]()$.|?*+{}/\\\s]", &self.name) {
            return Err(invalid(
                "name must not contain whitespace or any of `[]()$.|?*+{}/\\`"
                    .into(),
            ));
        }
        let re = Regex::new(&self.regexp)
            .map_err(|e| invalid(format!("invalid regex: {e}")))?;
        if re.captures_len() > 1 {
            return Err(invalid(format!(
                "regex `{}` must not contain capturing groups, use `(?:...)` \
                 instead",
                self.regexp,
            )));
        }
        Ok(())
    }
}

/// Table of [`ParameterType`]s known to a [`Registry`].
///
/// Starts with the built-in types:
///
/// | Placeholder | Value    |
/// |-------------|----------|
/// | `{int}`     | [`i64`]  |
/// | `{float}`   | [`f64`]  |
/// | `{word}`    | [`String`] |
/// | `{string}`  | [`String`] without the surrounding quotes |
/// | `{}`        | [`String`] |
///
/// [`Registry`]: crate::Registry
#[derive(Clone, Debug)]
pub struct ParameterTypes<W> {
    types: Vec<ParameterType<W>>,
}

impl<W> Default for ParameterTypes<W> {
    fn default() -> Self {
        Self {
            types: vec![
                ParameterType::builtin("int", r"-?\d+|\d+", |s| {
                    Ok(s.parse::<i64>()?)
                }),
                ParameterType::builtin(
                    "float",
                    r"[+-]?(?:inf|NaN|(?:\d+|\d+\.\d*|\d*\.\d+)(?:[eE][+-]?\d+)?)",
                    |s| Ok(s.parse::<f64>()?),
                ),
                ParameterType::builtin("word", r"[^\s]+", |s| Ok(s.to_owned())),
                ParameterType::builtin(
                    "string",
                    r#""(?:[^"\\]*(?:\\.[^"\\]*)*)"|'(?:[^'\\]*(?:\\.[^'\\]*)*)'"#,
                    |s| Ok(unquote(s)),
                ),
                ParameterType::builtin("", ".*", |s| Ok(s.to_owned())),
            ],
        }
    }
}

impl<W> ParameterTypes<W> {
    /// Creates a new [`ParameterTypes`] table holding built-in types only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new [`ParameterType`].
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::InvalidParameterType`] if its name or regex is
    ///   malformed.
    /// - [`RegistrationError::DuplicateParameterType`] if the name is taken.
    pub fn define(
        &mut self,
        parameter_type: ParameterType<W>,
    ) -> Result<(), RegistrationError> {
        parameter_type.validate()?;
        if self.get(parameter_type.name()).is_some() {
            return Err(RegistrationError::DuplicateParameterType {
                name: parameter_type.name,
            });
        }
        self.types.push(parameter_type);
        Ok(())
    }

    /// Looks up a [`ParameterType`] by its `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterType<W>> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Looks up a [`ParameterType`] whose regex, or one of its top-level
    /// alternatives, is exactly the given `source`.
    ///
    /// User-defined types take precedence over built-in ones.
    #[must_use]
    pub fn lookup_by_regexp(&self, source: &str) -> Option<&ParameterType<W>> {
        let (custom, builtin): (Vec<_>, Vec<_>) =
            self.types.iter().partition(|t| !t.builtin);
        custom.into_iter().chain(builtin).find(|t| {
            t.regexp == source || alternatives(&t.regexp).contains(&source)
        })
    }

    /// Returns `name → regex` pairs of all the user-defined types.
    pub(crate) fn custom_regexps(&self) -> HashMap<&str, &str> {
        self.types
            .iter()
            .filter(|t| !t.builtin)
            .map(|t| (t.name.as_str(), t.regexp.as_str()))
            .collect()
    }

    /// Iterates over all the [`ParameterType`]s, built-in ones first.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterType<W>> + '_ {
        self.types.iter()
    }
}

/// Splits the given `regexp` into its top-level alternatives.
fn alternatives(regexp: &str) -> Vec<&str> {
    match ast::parse::Parser::new().parse(regexp) {
        Ok(Ast::Alternation(ref alt)) => alt
            .asts
            .iter()
            .map(|a| &regexp[a.span().start.offset..a.span().end.offset])
            .collect(),
        _ => vec![regexp],
    }
}

/// Strips the surrounding quotes of a `{string}` match and unescapes the
/// inner ones.
fn unquote(s: &str) -> String {
    let mut chars = s.chars();
    let (Some(open @ ('"' | '\'')), Some(close)) = (chars.next(), chars.next_back())
    else {
        return s.to_owned();
    };
    if open != close {
        return s.to_owned();
    }
    chars
        .as_str()
        .replace(&format!("\\{open}"), &open.to_string())
}
