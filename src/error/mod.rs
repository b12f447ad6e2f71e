// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types of this crate, grouped by the boundary raising them.
//!
//! - [`registry`]: declaring ([`RegistrationError`], [`TagExpressionError`])
//!   and finalizing ([`FinalizeError`], [`ExpressionError`]) a [`Registry`].
//! - [`step`]: resolving step text ([`MissingDefinitionError`],
//!   [`MultipleDefinitionsError`], [`StepError`]) and reading bound
//!   arguments ([`ArgumentError`]).
//! - [`binding`]: the active registry [`Slot`] ([`BindingError`]).
//!
//! None of them is ever retried or swallowed inside this crate: the run
//! driver decides whether an error aborts a step, a scenario or the run.
//!
//! [`Registry`]: crate::Registry
//! [`Slot`]: crate::Slot

pub mod binding;
pub mod registry;
pub mod step;

pub use self::{
    binding::BindingError,
    registry::{
        ExpressionError, FinalizeError, RegistrationError, TagExpressionError,
    },
    step::{
        ArgumentError, MissingDefinitionError, MultipleDefinitionsError,
        StepError,
    },
};
