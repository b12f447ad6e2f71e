// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration errors surfacing while declaring and finalizing a
//! [`Registry`].
//!
//! [`Registry`]: crate::Registry

use derive_more::with_trait::{Display, Error, From};

use crate::Id;

/// Error of a `define_*` call on a [`Registry`].
///
/// [`Registry`]: crate::Registry
#[derive(Clone, Debug, Display, Error, Eq, From, PartialEq)]
pub enum RegistrationError {
    /// Declaration attempted once the [`Registry`] is finalized.
    ///
    /// [`Registry`]: crate::Registry
    #[display("Cannot declare {declaration} after the registry was finalized")]
    #[from(ignore)]
    Finalized {
        /// Kind of the rejected declaration.
        #[error(not(source))]
        declaration: &'static str,
    },

    /// Step pattern is not a valid Cucumber Expression.
    #[display("Invalid step expression `{expression}`: {reason}")]
    #[from(ignore)]
    InvalidExpression {
        /// Rejected expression.
        expression: String,

        /// Parser diagnostic.
        #[error(not(source))]
        reason: String,
    },

    /// Hook tag expression cannot be parsed.
    #[display("{_0}")]
    InvalidTagExpression(TagExpressionError),

    /// Parameter type definition is malformed.
    #[display("Invalid parameter type `{name}`: {reason}")]
    #[from(ignore)]
    InvalidParameterType {
        /// Name of the rejected parameter type.
        name: String,

        /// What is wrong with it.
        #[error(not(source))]
        reason: String,
    },

    /// Parameter type with the same name is already defined.
    #[display("Parameter type `{name}` is already defined")]
    #[from(ignore)]
    DuplicateParameterType {
        /// Name of the rejected parameter type.
        #[error(not(source))]
        name: String,
    },
}

/// Tag expression cannot be parsed.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("Invalid tag expression `{expression}`: {reason}")]
pub struct TagExpressionError {
    /// Rejected tag expression.
    #[error(not(source))]
    pub expression: String,

    /// Parser diagnostic.
    pub reason: String,
}

/// Error of compiling a step pattern into a matcher.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum ExpressionError {
    /// Expression references a parameter type nobody defined.
    #[display("Undefined parameter type `{{{name}}}` in step expression `{expression}`")]
    UnknownParameterType {
        /// Name of the missing parameter type.
        name: String,

        /// Expression referencing it.
        #[error(not(source))]
        expression: String,
    },

    /// Expression failed to expand into a regular expression.
    #[display("Failed to compile step expression `{expression}`: {reason}")]
    Compile {
        /// Rejected expression.
        expression: String,

        /// Underlying diagnostic.
        #[error(not(source))]
        reason: String,
    },
}

/// Error of [`Registry::finalize()`].
///
/// [`Registry::finalize()`]: crate::Registry::finalize
#[derive(Clone, Debug, Display, Error, Eq, From, PartialEq)]
pub enum FinalizeError {
    /// [`Registry`] was finalized already.
    ///
    /// [`Registry`]: crate::Registry
    #[display("Registry is already finalized")]
    #[from(ignore)]
    AlreadyFinalized,

    /// Id generator produced the same [`Id`] twice.
    #[display("Id generator produced a duplicate id `{id}`")]
    #[from(ignore)]
    DuplicateId {
        /// Duplicated [`Id`].
        #[error(not(source))]
        id: Id,
    },

    /// Step pattern failed to compile.
    #[display("{_0}")]
    Expression(ExpressionError),
}
