//! A form extractor the broker's ACL requests never fail to parse.
//!
//! The broker calls us on every connection and publish; a malformed or
//! unexpected form body must never turn into a 500 — it must be treated
//! as a deny, identically to a failed credential check. `LenientForm`
//! wraps `axum::Form` and substitutes the type's `Default` on any
//! extraction failure (wrong content-type, unparseable body) instead of
//! rejecting the request.

use axum::extract::{Form, FromRequest, Request};
use serde::de::DeserializeOwned;

pub struct LenientForm<T>(pub T);

impl<T, S> FromRequest<S> for LenientForm<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(LenientForm(value)),
            Err(_) => Ok(LenientForm(T::default())),
        }
    }
}
