// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the LearnFlow backend.
//!
//! Two collaborating pieces: the [`CredentialStore`] owns student identities
//! and password hashes, and the [`SessionManager`] turns a successful
//! credential check into a time-bounded opaque token consulted on every
//! authenticated request.

pub mod credentials;
pub mod password;
pub mod session;

pub use credentials::CredentialStore;
pub use session::SessionManager;
