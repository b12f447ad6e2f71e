// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`StepDefinition`]s binding step patterns to their implementations.

pub mod arguments;
pub mod data_table;
pub mod location;

use std::{fmt, rc::Rc};

use derive_more::with_trait::From;
use futures::future::LocalBoxFuture;

use crate::{
    expression::{Argument, Expression, StepPattern},
    Id,
};

pub use self::{arguments::Arguments, data_table::DataTable, location::Location};

/// Alias for a step implementation returning a [`LocalBoxFuture`].
pub type StepFn<W> = dyn for<'a> Fn(&'a mut W, Arguments) -> LocalBoxFuture<'a, anyhow::Result<()>>;

/// Structured argument of a Gherkin step, passed to its implementation as the
/// last positional argument.
#[derive(Clone, Debug, Eq, From, PartialEq)]
pub enum StepArgument {
    /// Data table following the step.
    DataTable(DataTable),

    /// Doc string following the step.
    DocString(String),
}

impl StepArgument {
    /// Extracts the [`StepArgument`] of the given [`gherkin::Step`], if it has
    /// any.
    #[must_use]
    pub fn of(step: &gherkin::Step) -> Option<Self> {
        step.table
            .as_ref()
            .map(|t| Self::DataTable(t.into()))
            .or_else(|| step.docstring.clone().map(Self::DocString))
    }

    /// Returns the [`DataTable`], if this is one.
    #[must_use]
    pub const fn as_data_table(&self) -> Option<&DataTable> {
        match self {
            Self::DataTable(t) => Some(t),
            Self::DocString(_) => None,
        }
    }

    /// Returns the doc string, if this is one.
    #[must_use]
    pub fn as_doc_string(&self) -> Option<&str> {
        match self {
            Self::DocString(s) => Some(s),
            Self::DataTable(_) => None,
        }
    }
}

/// Step declared on an open [`Registry`], not compiled yet.
///
/// [`Registry`]: crate::Registry
pub(crate) struct StepDeclaration<W> {
    pub(crate) pattern: StepPattern,
    pub(crate) implementation: Rc<StepFn<W>>,
    pub(crate) position: Option<Location>,
}

/// Finalized step: an identified [`Expression`] along with the implementation
/// it dispatches to.
pub struct StepDefinition<W> {
    /// Unique [`Id`] assigned on finalization.
    pub(crate) id: Id,

    /// Compiled matcher of step text.
    pub(crate) expression: Expression<W>,

    /// Step body.
    pub(crate) implementation: Rc<StepFn<W>>,

    /// [`Location`] of the declaration, if captured.
    pub(crate) position: Option<Location>,
}

impl<W> fmt::Debug for StepDefinition<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("pattern", self.expression.pattern())
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl<W> StepDefinition<W> {
    /// Unique [`Id`] of this [`StepDefinition`].
    #[must_use]
    pub const fn id(&self) -> &Id {
        &self.id
    }

    /// [`StepPattern`] this [`StepDefinition`] was declared with.
    #[must_use]
    pub const fn pattern(&self) -> &StepPattern {
        self.expression.pattern()
    }

    /// Compiled [`Expression`] of this [`StepDefinition`].
    #[must_use]
    pub const fn expression(&self) -> &Expression<W> {
        &self.expression
    }

    /// [`Location`] of the declaration, if captured.
    #[must_use]
    pub const fn position(&self) -> Option<Location> {
        self.position
    }

    /// Matches the given step `text`, returning the argument extractors on
    /// success.
    #[must_use]
    pub fn matches(&self, text: &str) -> Option<Vec<Argument<W>>> {
        self.expression.match_text(text)
    }

    /// Invokes the implementation with the given `world` and `args`.
    pub fn invoke<'w>(
        &self,
        world: &'w mut W,
        args: Arguments,
    ) -> LocalBoxFuture<'w, anyhow::Result<()>> {
        (self.implementation)(world, args)
    }
}
