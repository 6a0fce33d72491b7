//! gistget-lib: declarative winget package state kept in a GitHub gist
//!
//! This crate provides the reconciliation core of gistget:
//! - `Manifest`: the declared package set and its YAML form
//! - `MutationCoordinator`: single-package changes recorded only on success
//! - `PackageStateReconciler`: three-phase sync of a machine to a manifest
//! - collaborators behind traits: `ManifestStore`, `PackageManager`,
//!   `CredentialStore` and `LoginFlow`

pub mod auth;
pub mod config;
pub mod consts;
pub mod manifest;
pub mod mutate;
pub mod platform;
pub mod resolve;
pub mod store;
pub mod sync;
pub mod transfer;
pub mod util;
pub mod winget;
