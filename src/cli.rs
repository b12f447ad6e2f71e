// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Registry`] configuration and CLI options composing into it.
//!
//! A run driver owning its own CLI may flatten [`Opts`] into it and convert
//! them into a [`Config`]:
//!
//! ```rust
//! use clap::Parser;
//! use cucumber_registry::{cli, Registry};
//!
//! #[derive(Parser)]
//! struct DriverCli {
//!     #[command(flatten)]
//!     registry: cli::Opts,
//! }
//!
//! let opts = DriverCli::parse_from(["driver", "--dry-run"]);
//! let registry = Registry::<()>::with_config(opts.registry.into());
//!
//! assert!(registry.config().dry_run);
//! ```
//!
//! [`Registry`]: crate::Registry

use smart_default::SmartDefault;

pub use clap::Args;

/// Configuration of a [`Registry`].
///
/// [`Registry`]: crate::Registry
#[derive(Clone, Copy, Debug, Eq, PartialEq, SmartDefault)]
pub struct Config {
    /// Whether to record source [`Location`]s of declarations for
    /// diagnostics.
    ///
    /// [`Location`]: crate::step::Location
    #[default(true)]
    pub source_positions: bool,

    /// Whether to resolve steps and bind their arguments without ever
    /// invoking their implementations.
    pub dry_run: bool,
}

/// CLI options of a [`Registry`].
///
/// [`Registry`]: crate::Registry
#[derive(Args, Clone, Copy, Debug, Default, Eq, PartialEq)]
#[group(skip)]
pub struct Opts {
    /// Resolve steps and bind their arguments without running them.
    #[arg(long, short = 'd', global = true)]
    pub dry_run: bool,

    /// Don't record source positions of step and hook declarations.
    #[arg(long, global = true)]
    pub no_source_positions: bool,
}

impl From<Opts> for Config {
    fn from(opts: Opts) -> Self {
        Self {
            source_positions: !opts.no_source_positions,
            dry_run: opts.dry_run,
        }
    }
}
