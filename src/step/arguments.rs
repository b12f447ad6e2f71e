// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Positional [`Arguments`] passed to a step implementation.

use std::any::{self, Any};

use derive_more::with_trait::Debug;

use crate::error::ArgumentError;

use super::StepArgument;

/// Ordered arguments bound from a step text match.
///
/// Each value is produced by the transformer of the corresponding parameter
/// type, so its concrete type is only known to the step author. A trailing
/// [`StepArgument`] (data table or doc string), if any, occupies the last
/// position.
#[derive(Debug, Default)]
#[debug("Arguments({})", values.len())]
pub struct Arguments {
    /// Bound values. [`None`] marks a value already moved out via
    /// [`Arguments::take()`].
    values: Vec<Option<Box<dyn Any>>>,
}

impl Arguments {
    /// Creates new [`Arguments`] out of already bound `values`.
    #[must_use]
    pub fn new(values: Vec<Box<dyn Any>>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// Appends a value as the last positional argument.
    pub fn push<T: Any>(&mut self, value: T) {
        self.values.push(Some(Box::new(value)));
    }

    /// Number of positional arguments, taken ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Indicates whether there are no positional arguments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a reference to the argument at `index`.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::Missing`] if there is no argument at `index`.
    /// - [`ArgumentError::Taken`] if it was moved out already.
    /// - [`ArgumentError::TypeMismatch`] if it is not a `T`.
    pub fn get<T: Any>(&self, index: usize) -> Result<&T, ArgumentError> {
        self.slot(index)?
            .as_ref()
            .ok_or(ArgumentError::Taken { index })?
            .downcast_ref()
            .ok_or(ArgumentError::TypeMismatch {
                index,
                expected: any::type_name::<T>(),
            })
    }

    /// Moves the argument at `index` out of these [`Arguments`].
    ///
    /// On a type mismatch the value stays in place.
    ///
    /// # Errors
    ///
    /// Same as [`Arguments::get()`].
    pub fn take<T: Any>(&mut self, index: usize) -> Result<T, ArgumentError> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(ArgumentError::Missing { index, len })?;
        let value = slot.take().ok_or(ArgumentError::Taken { index })?;
        match value.downcast::<T>() {
            Ok(v) => Ok(*v),
            Err(value) => {
                *slot = Some(value);
                Err(ArgumentError::TypeMismatch {
                    index,
                    expected: any::type_name::<T>(),
                })
            }
        }
    }

    /// Returns the trailing [`StepArgument`], if the last positional argument
    /// is one.
    #[must_use]
    pub fn step_argument(&self) -> Option<&StepArgument> {
        self.values
            .last()?
            .as_ref()?
            .downcast_ref::<StepArgument>()
    }

    fn slot(&self, index: usize) -> Result<&Option<Box<dyn Any>>, ArgumentError> {
        self.values.get(index).ok_or(ArgumentError::Missing {
            index,
            len: self.values.len(),
        })
    }
}
