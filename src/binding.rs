// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Slot`] holding the [`Registry`] of the active run.

use std::fmt;

use tracing::debug;

use crate::{cli::Config, error::BindingError, Registry};

/// Single-place holder of the [`Registry`] a run declares into and resolves
/// from.
///
/// Owned by the run driver: concurrent runs use separate [`Slot`]s, while
/// sequential runs in the same [`Slot`] have to [`unbind()`] before the next
/// [`bind()`].
///
/// [`bind()`]: Slot::bind
/// [`unbind()`]: Slot::unbind
pub struct Slot<W> {
    registry: Option<Registry<W>>,
}

impl<W> fmt::Debug for Slot<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("registry", &self.registry)
            .finish()
    }
}

impl<W> Default for Slot<W> {
    fn default() -> Self {
        Self { registry: None }
    }
}

impl<W> Slot<W> {
    /// Creates a new empty [`Slot`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicates whether a [`Registry`] is bound.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.registry.is_some()
    }

    /// Binds the given `registry`, making it the current one.
    ///
    /// # Errors
    ///
    /// [`BindingError::AlreadyBound`] if another [`Registry`] is bound. The
    /// bound one stays in place, and the rejected `registry` is dropped.
    pub fn bind(&mut self, registry: Registry<W>) -> Result<(), BindingError> {
        if self.registry.is_some() {
            return Err(BindingError::AlreadyBound);
        }
        debug!("registry bound");
        self.registry = Some(registry);
        Ok(())
    }

    /// Clears this [`Slot`], handing back the [`Registry`] bound, if any.
    pub fn unbind(&mut self) -> Option<Registry<W>> {
        let registry = self.registry.take();
        if registry.is_some() {
            debug!("registry unbound");
        }
        registry
    }

    /// Returns the bound [`Registry`].
    ///
    /// # Errors
    ///
    /// [`BindingError::Unbound`] if nothing is bound.
    pub fn current(&self) -> Result<&Registry<W>, BindingError> {
        self.registry.as_ref().ok_or(BindingError::Unbound)
    }

    /// Returns the bound [`Registry`] for declaring into it.
    ///
    /// # Errors
    ///
    /// [`BindingError::Unbound`] if nothing is bound.
    pub fn current_mut(&mut self) -> Result<&mut Registry<W>, BindingError> {
        self.registry.as_mut().ok_or(BindingError::Unbound)
    }

    /// Binds a fresh [`Registry`] configured with `config`, runs `declare`
    /// against it, and unbinds it again, returning the result.
    ///
    /// Errors of `declare` are propagated, leaving this [`Slot`] empty either
    /// way.
    ///
    /// # Errors
    ///
    /// - [`BindingError::AlreadyBound`] (converted into `E`) if this [`Slot`]
    ///   is occupied.
    /// - Whatever `declare` returns.
    /// - [`BindingError::Unbound`] (converted into `E`) if `declare` succeeds
    ///   but unbinds the [`Registry`] itself.
    pub fn with_registry<E, F>(
        &mut self,
        config: Config,
        declare: F,
    ) -> Result<Registry<W>, E>
    where
        E: From<BindingError>,
        F: FnOnce(&mut Self) -> Result<(), E>,
    {
        self.bind(Registry::with_config(config))?;
        let declared = declare(self);
        let registry = self.unbind();
        declared?;
        registry.ok_or_else(|| BindingError::Unbound.into())
    }
}
