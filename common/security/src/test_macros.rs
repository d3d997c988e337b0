//! Shared test helper macro for setting the identity headers the
//! `SecurityCtxExtractor` reads.
//! Usage: test_request_headers!(req, roles="ROLE_TELLER,ROLE_USER", user="abc");
#[macro_export]
macro_rules! test_request_headers {
    ($req:expr, roles=$roles:expr, user=$user:expr) => {{
        let h = $req.headers_mut();
        h.insert("X-User-ID", ::axum::http::HeaderValue::from_str($user).unwrap());
        h.insert("X-Roles", ::axum::http::HeaderValue::from_str($roles).unwrap());
    }};
    ($req:expr, user=$user:expr) => {{
        let h = $req.headers_mut();
        h.insert("X-User-ID", ::axum::http::HeaderValue::from_str($user).unwrap());
    }};
}
