//! Vim-style editor options with scoped values and change notification.
//!
//! An option is declared once with a [`DeclaredScope`] deciding how its value may vary:
//! globally, per buffer, per window, or as a global value that a buffer or window may
//! override. Values are written at an [`AccessScope`] (`:setglobal`, `:setlocal` or
//! `:set`), and every write notifies exactly the views whose effective value changed.
//!
//! # Architecture
//!
//! - [`scope`] resolves which slot a write lands in and which views it reaches
//! - [`OptionValueStore`] holds the global value and the buffer/window local values
//! - [`OptionRegistry`] maps names to declarations, stores and listeners
//! - [`OptionGroup`] is the handle hosts construct and pass around; it commits writes and
//!   dispatches notifications
//! - [`command`] implements the `:set` family on top of [`OptionGroup`]
//! - [`OptionsConfig`] declares options and initial values from TOML
//!
//! The host describes its open views through [`ViewRegistry`].

pub mod command;
pub mod config;
mod declaration;
mod error;
mod group;
mod listener;
mod notifier;
mod registry;
pub mod scope;
mod store;
pub mod testing;
mod value;
mod view;

pub use command::{parse_set_command, SetCommand, SetCommandError, SetCommandKind};
pub use config::OptionsConfig;
pub use declaration::OptionDeclaration;
pub use error::OptionError;
pub use group::OptionGroup;
pub use listener::{EffectiveValueListener, ListenerId};
pub use registry::OptionRegistry;
pub use scope::{AccessScope, DeclaredScope, LocalUnit, WriteTarget};
pub use store::OptionValueStore;
pub use value::{OptionKind, OptionValue};
pub use view::{BufferId, ViewHandle, ViewRegistry, WindowId};
