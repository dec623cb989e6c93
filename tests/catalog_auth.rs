// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Two-step catalog login driven through explicit challenge state

use runform::providers::{AuthOutcome, CatalogAuthenticator, ChallengeState, Credentials};

/// Catalog that always asks for an emailed code
struct EmailCodeCatalog {
    expected_code: &'static str,
}

impl CatalogAuthenticator for EmailCodeCatalog {
    fn authenticate(&self, credentials: &Credentials) -> AuthOutcome {
        if credentials.secret.is_empty() {
            return AuthOutcome::Failed("missing password".to_string());
        }
        AuthOutcome::ChallengeRequired(ChallengeState {
            continuation: format!("ticket-for-{}", credentials.username),
            prompt: "Enter the code sent to your email".to_string(),
        })
    }

    fn resume(&self, challenge: ChallengeState, code: &str) -> AuthOutcome {
        if !challenge.continuation.starts_with("ticket-for-") {
            return AuthOutcome::Failed("unknown login".to_string());
        }
        if code == self.expected_code {
            AuthOutcome::Authenticated
        } else {
            AuthOutcome::Failed("wrong code".to_string())
        }
    }
}

fn credentials(secret: &str) -> Credentials {
    Credentials {
        username: "runner@example.com".to_string(),
        secret: secret.to_string(),
    }
}

#[test]
fn test_challenge_then_resume() {
    let catalog = EmailCodeCatalog { expected_code: "482913" };

    let AuthOutcome::ChallengeRequired(state) = catalog.authenticate(&credentials("hunter2")) else {
        panic!("expected a challenge");
    };
    assert_eq!(state.continuation, "ticket-for-runner@example.com");

    // The state is plain data, so a second attempt can reuse a copy of it
    let retry = state.clone();
    assert_eq!(
        catalog.resume(state, "000000"),
        AuthOutcome::Failed("wrong code".to_string())
    );
    assert!(catalog.resume(retry, "482913").is_authenticated());
}

#[test]
fn test_failed_login_is_an_outcome() {
    let catalog = EmailCodeCatalog { expected_code: "482913" };
    let outcome = catalog.authenticate(&credentials(""));

    assert!(!outcome.is_authenticated());
    assert_eq!(outcome, AuthOutcome::Failed("missing password".to_string()));
}
