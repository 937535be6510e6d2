// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors.

use alloc::string::String;

use understory_dom::{SelectorError, UnknownEventKind};

/// Errors produced while reading props from strings (attributes or named updates).
///
/// Lifecycle decisions never produce errors; vetoes are hook return values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PropsError {
    /// The name does not match any known prop.
    #[error("unknown prop `{0}`")]
    UnknownProp(String),
    /// The value could not be parsed for this prop.
    #[error("invalid value `{value}` for prop `{prop}`")]
    InvalidValue {
        /// Canonical prop name.
        prop: &'static str,
        /// Offending value.
        value: String,
    },
    /// The prop exists but holds a value that cannot be written as a string.
    #[error("prop `{0}` cannot be set from a string")]
    NotNamed(&'static str),
    /// A trigger list contained an unknown event type.
    #[error("invalid trigger: {0}")]
    Trigger(#[from] UnknownEventKind),
    /// The delegation selector did not parse.
    #[error("invalid target selector: {0}")]
    Selector(#[from] SelectorError),
}
