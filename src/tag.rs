// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [Tag expressions][1] scoping hooks to scenarios.
//!
//! [1]: https://cucumber.io/docs/cucumber/api#tag-expressions

use gherkin::tagexpr::TagOperation;
use sealed::sealed;

use crate::error::TagExpressionError;

/// Extension of a [`TagOperation`] allowing to evaluate it.
#[sealed]
pub trait Ext {
    /// Evaluates this [`TagOperation`] for the given `tags`.
    ///
    /// Tags are compared ignoring their leading `@`, so both the Gherkin
    /// literal form (`@smoke`) and the stored one (`smoke`) are accepted.
    #[must_use]
    fn eval<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone;
}

#[sealed]
impl Ext for TagOperation {
    fn eval<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        match self {
            Self::And(l, r) => l.eval(tags.clone()) & r.eval(tags),
            Self::Or(l, r) => l.eval(tags.clone()) | r.eval(tags),
            Self::Not(t) => !t.eval(tags),
            Self::Tag(t) => {
                let t = strip_at(t);
                tags.into_iter().any(|tag| strip_at(tag.as_ref()) == t)
            }
        }
    }
}

/// Compiled tag expression deciding whether a hook applies to a scenario.
///
/// An absent or blank expression compiles into a predicate accepting every
/// tag set.
#[derive(Clone, Debug, Default)]
pub struct TagPredicate {
    /// Source text along with its parsed form, if any.
    expr: Option<(String, TagOperation)>,
}

impl TagPredicate {
    /// Returns a [`TagPredicate`] accepting any tag set.
    #[must_use]
    pub const fn always() -> Self {
        Self { expr: None }
    }

    /// Compiles the given tag `expression`.
    ///
    /// # Errors
    ///
    /// If the `expression` is malformed.
    pub fn parse(expression: &str) -> Result<Self, TagExpressionError> {
        if expression.trim().is_empty() {
            return Ok(Self::always());
        }
        let op = expression.parse::<TagOperation>().map_err(|e| {
            TagExpressionError {
                expression: expression.to_owned(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            expr: Some((expression.to_owned(), op)),
        })
    }

    /// Compiles an optional tag `expression`.
    ///
    /// # Errors
    ///
    /// If the `expression` is present and malformed.
    pub fn compile(expression: Option<&str>) -> Result<Self, TagExpressionError> {
        expression.map_or_else(|| Ok(Self::always()), Self::parse)
    }

    /// Evaluates this predicate against the given `tags`.
    #[must_use]
    pub fn evaluate<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        self.expr.as_ref().map_or(true, |(_, op)| op.eval(tags))
    }

    /// Returns the source text this predicate was compiled from.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.expr.as_ref().map(|(src, _)| src.as_str())
    }
}

/// Checks whether the given `tags` satisfy the tag `expression`.
///
/// Handy for conditional logic inside step bodies, where the tags of the
/// running scenario are known.
///
/// # Errors
///
/// If the `expression` is malformed.
pub fn does_feature_match<I, S>(
    expression: &str,
    tags: I,
) -> Result<bool, TagExpressionError>
where
    S: AsRef<str>,
    I: IntoIterator<Item = S> + Clone,
{
    TagPredicate::parse(expression).map(|p| p.evaluate(tags))
}

fn strip_at(tag: &str) -> &str {
    tag.strip_prefix('@').unwrap_or(tag)
}
