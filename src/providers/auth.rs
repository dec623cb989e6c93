// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Login outcome for workout catalogs that require one
//!
//! A login that needs a second factor is an ordinary outcome, not an error: the
//! catalog hands back a [`ChallengeState`] and the caller resumes the login by
//! passing that state back together with the user's code. The authenticator
//! keeps no half-finished login of its own.

use std::fmt;

/// Catalog login credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Opaque state of a login waiting for a second factor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeState {
    /// Catalog-specific continuation token
    pub continuation: String,
    /// What to ask the user for, e.g. "Enter the code sent to your email"
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    ChallengeRequired(ChallengeState),
    Failed(String),
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }
}

pub trait CatalogAuthenticator: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> AuthOutcome;

    /// Continue a login that returned [`AuthOutcome::ChallengeRequired`]
    fn resume(&self, challenge: ChallengeState, code: &str) -> AuthOutcome;
}
