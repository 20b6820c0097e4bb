// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-level error type.

use crate::builder::ConfigurationError;
use crate::conformance::ConformanceError;
#[cfg(feature = "loaders")]
use crate::loader::LoadError;
use crate::property::PropertyError;
use crate::pvdata::TreeError;
use crate::registry::RegistryError;
use crate::type_id::TypeIdError;
use thiserror::Error;

/// Any error raised by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    TypeId(#[from] TypeIdError),
    #[error(transparent)]
    Conformance(#[from] ConformanceError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[cfg(feature = "loaders")]
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Result alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
