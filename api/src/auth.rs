//! Auth context and role guard
//!
//! The backend issues a JWT at login. The client decodes the payload
//! segment without verifying the signature (verification is the
//! backend's job on every request) purely to learn who is logged in and
//! what they may see. The resulting [`AuthContext`] is an immutable
//! value passed explicitly to whatever needs it; nothing reads ambient
//! storage.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::error::ApiError;

/// Role claimed by a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office administrator
    Admin,
    /// Field technician
    Technician,
    /// Customer
    User,
}

impl Role {
    /// Landing page for this role
    #[must_use]
    pub const fn home(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Technician => "/technician",
            Self::User => "/home",
        }
    }
}

/// Claims the client reads from the token payload
#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    name: String,
}

/// Who is logged in, as one immutable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    token: String,
    user_id: String,
    username: String,
    role: Role,
}

impl AuthContext {
    /// Build a context by decoding a JWT's payload segment
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidToken`] when the token does not have
    /// three segments or the payload is not valid base64url JSON with
    /// `sub`, `role` and `name` claims.
    pub fn from_token(token: impl Into<String>) -> Result<Self, ApiError> {
        let token = token.into();
        let payload = token
            .split('.')
            .nth(1)
            .ok_or(ApiError::InvalidToken)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| ApiError::InvalidToken)?;
        let claims: Claims =
            serde_json::from_slice(&bytes).map_err(|_| ApiError::InvalidToken)?;
        Ok(Self {
            token,
            user_id: claims.sub,
            username: claims.name,
            role: claims.role,
        })
    }

    /// The raw bearer token
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The user id from the `sub` claim
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The display name from the `name` claim
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The claimed role
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

/// Result of a route guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The context may see the route
    Allowed,
    /// The context must be sent elsewhere
    RedirectTo(&'static str),
}

/// Decide whether a context may see a route requiring a role
///
/// One function instead of a redirect check copied into every router:
/// anonymous visitors go to the login page, and a logged-in visitor with
/// the wrong role goes to their own landing page.
#[must_use]
pub fn authorize(context: Option<&AuthContext>, required: Role) -> Access {
    match context {
        None => Access::RedirectTo("/login"),
        Some(ctx) if ctx.role() == required => Access::Allowed,
        Some(ctx) => Access::RedirectTo(ctx.role().home()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{body}.signature")
    }

    #[test]
    fn decodes_claims_from_payload_segment() {
        let token =
            token_with_payload(r#"{"sub":"u42","role":"user","name":"Priya","exp":1735689600}"#);
        let context = AuthContext::from_token(token.clone()).unwrap();
        assert_eq!(context.token(), token);
        assert_eq!(context.user_id(), "u42");
        assert_eq!(context.username(), "Priya");
        assert_eq!(context.role(), Role::User);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(
            AuthContext::from_token("not-a-jwt"),
            Err(ApiError::InvalidToken)
        );
        assert_eq!(
            AuthContext::from_token("a.###.c"),
            Err(ApiError::InvalidToken)
        );
        let token = token_with_payload(r#"{"sub":"u1"}"#);
        assert_eq!(AuthContext::from_token(token), Err(ApiError::InvalidToken));
    }

    #[test]
    fn guard_redirects_anonymous_to_login() {
        assert_eq!(authorize(None, Role::User), Access::RedirectTo("/login"));
    }

    #[test]
    fn guard_redirects_wrong_role_to_their_home() {
        let admin = AuthContext::from_token(token_with_payload(
            r#"{"sub":"a1","role":"admin","name":"Root"}"#,
        ))
        .unwrap();
        assert_eq!(authorize(Some(&admin), Role::Admin), Access::Allowed);
        assert_eq!(
            authorize(Some(&admin), Role::User),
            Access::RedirectTo("/admin")
        );

        let tech = AuthContext::from_token(token_with_payload(
            r#"{"sub":"t1","role":"technician","name":"Ravi"}"#,
        ))
        .unwrap();
        assert_eq!(
            authorize(Some(&tech), Role::Admin),
            Access::RedirectTo("/technician")
        );
    }
}
