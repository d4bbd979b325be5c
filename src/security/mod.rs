//! Request-level security primitives.
//!
//! The HMAC authenticator lives here rather than in the middleware stack
//! because signature verification needs the raw request body; handlers call
//! into it after buffering the payload.

pub mod hmac;

pub use self::hmac::{
    SignatureParams, VerifyError, VerifyOptions, extract_signature, generate_signature,
    verify_signature,
};
