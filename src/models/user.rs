use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

/// Identity forwarded by the auth proxy in front of this service.
/// Nothing in this crate issues or validates credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
}

/// Optional request identity, extracted from the forwarded headers
/// `x-user-id` / `x-user-name` / `x-user-email`. Anonymous requests
/// resolve to `MaybeUser(None)` instead of failing extraction.
#[derive(Debug)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn as_ref(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .filter(|value| !value.is_empty())
}

impl FromRequest for MaybeUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = header_value(req, "x-user-id").map(|id| User {
            username: header_value(req, "x-user-name").unwrap_or_else(|| id.clone()),
            email: header_value(req, "x-user-email"),
            id,
        });

        ready(Ok(MaybeUser(user)))
    }
}
