// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of resolving step text to a [`StepDefinition`] and binding its
//! arguments.
//!
//! [`StepDefinition`]: crate::StepDefinition

use std::fmt;

use derive_more::with_trait::{Display, Error, From};

use crate::step::Location;

/// No [`StepDefinition`] matches the given step text.
///
/// [`StepDefinition`]: crate::StepDefinition
#[derive(Clone, Debug, Display, Error)]
#[display("Step implementation missing for: {text}")]
pub struct MissingDefinitionError {
    /// Step text nothing matched.
    #[error(not(source))]
    pub text: String,
}

/// More than one [`StepDefinition`] matches the given step text.
///
/// Never resolved by picking one of the candidates: the author has to
/// disambiguate the patterns listed here.
///
/// [`StepDefinition`]: crate::StepDefinition
#[derive(Clone, Debug, Error)]
pub struct MultipleDefinitionsError {
    /// Step text matched by several definitions.
    #[error(not(source))]
    pub text: String,

    /// Patterns of every matching definition (rendered as declared) along with
    /// their declaration [`Location`]s, in registration order.
    pub candidates: Vec<(String, Option<Location>)>,
}

impl MultipleDefinitionsError {
    /// Returns an iterator over the rendered patterns of all the candidates.
    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.candidates.iter().map(|(pattern, _)| pattern.as_str())
    }
}

impl Display for MultipleDefinitionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiple matching step definitions for: {}", self.text)?;
        for (pattern, loc) in &self.candidates {
            write!(f, "\n {pattern}")?;
            if let Some(loc) = loc {
                write!(f, " - {}:{}", loc.path, loc.line)?;
            }
        }
        Ok(())
    }
}

/// Error of preparing a step for invocation in
/// [`Registry::run_step_definition()`].
///
/// [`Registry::run_step_definition()`]: crate::Registry::run_step_definition
#[derive(Debug, Display, Error, From)]
pub enum StepError {
    /// See [`MissingDefinitionError`].
    #[display("{_0}")]
    Missing(MissingDefinitionError),

    /// See [`MultipleDefinitionsError`].
    #[display("{_0}")]
    Multiple(MultipleDefinitionsError),

    /// Transformer of a parameter type failed on the captured text.
    #[display("Failed to transform argument {index} (`{text}`): {cause:#}")]
    #[from(ignore)]
    Argument {
        /// Position of the argument.
        index: usize,

        /// Captured text the transformer received.
        #[error(not(source))]
        text: String,

        /// Error returned by the transformer.
        #[error(not(source))]
        cause: anyhow::Error,
    },
}

impl StepError {
    /// Indicates whether this error means the step is undefined.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    /// Indicates whether this error means the step is ambiguous.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }
}

/// Error of accessing a positional argument inside a step implementation.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum ArgumentError {
    /// No argument at the requested position.
    #[display("No argument at position {index}, only {len} bound")]
    Missing {
        /// Requested position.
        index: usize,

        /// Number of bound arguments.
        len: usize,
    },

    /// Argument was already moved out.
    #[display("Argument at position {index} was already taken")]
    Taken {
        /// Requested position.
        index: usize,
    },

    /// Argument has another type than requested.
    #[display("Argument at position {index} is not a `{expected}`")]
    TypeMismatch {
        /// Requested position.
        index: usize,

        /// Name of the requested type.
        #[error(not(source))]
        expected: &'static str,
    },
}
