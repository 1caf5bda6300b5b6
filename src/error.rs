//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//

include!(concat!(env!("OUT_DIR"), "/ua.rs"));

pub(crate) fn sdk_version() -> &'static str {
    SDK_VERSION
}

pub(crate) fn user_agent() -> &'static str {
    USER_AGENT
}

/// Enumeration of all possible errors returned by this library.
#[derive(Debug, Clone)]
pub struct BaasError {
    pub code: BaasErrorCode,
    pub message: String,
}

impl std::error::Error for BaasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::fmt::Display for BaasError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        return write!(f, "code={:?} message=\"{}\"", self.code, self.message);
    }
}

impl BaasError {
    pub fn new(code: BaasErrorCode, msg: &str) -> BaasError {
        BaasError {
            code,
            message: msg.to_string(),
        }
    }

    /// `true` if this error is the distinguished "key does not exist" value
    /// returned by cache read commands.
    ///
    /// This is a normal outcome, not a service or caller failure; callers of
    /// commands such as [`Cache::get()`](crate::Cache::get()) are expected to
    /// test for it explicitly.
    pub fn is_not_found(&self) -> bool {
        self.code == BaasErrorCode::NotFound
    }
}

macro_rules! param_error {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        BaasError {
            code: crate::error::BaasErrorCode::InvalidParam,
            message: format!("{} ({})", m, crate::error::sdk_version()),
        }
    }};
}

pub(crate) use param_error;

macro_rules! param_err {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        Err(BaasError {
            code: crate::error::BaasErrorCode::InvalidParam,
            message: format!("{} ({})", m, crate::error::sdk_version()),
        })
    }};
}

pub(crate) use param_err;

macro_rules! internal_error {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        BaasError {
            code: crate::error::BaasErrorCode::InternalError,
            message: format!("{} ({})", m, crate::error::sdk_version()),
        }
    }};
}

pub(crate) use internal_error;

impl From<reqwest::Error> for BaasError {
    fn from(e: reqwest::Error) -> Self {
        let mut code = BaasErrorCode::InternalError;
        if e.is_timeout() {
            code = BaasErrorCode::RequestTimeout;
        }
        BaasError {
            code: code,
            message: format!(
                "reqwest error: {} ({})",
                e.to_string(),
                crate::error::sdk_version()
            ),
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for BaasError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        param_error!("invalid header value: {}", e.to_string())
    }
}

impl From<url::ParseError> for BaasError {
    fn from(e: url::ParseError) -> Self {
        param_error!("error parsing url: {}", e.to_string())
    }
}

impl From<chrono::ParseError> for BaasError {
    fn from(e: chrono::ParseError) -> Self {
        param_error!("invalid datetime value: {}", e.to_string())
    }
}

// A reply body that does not parse as the service envelope is a protocol
// mismatch, not a caller mistake.
impl From<serde_json::Error> for BaasError {
    fn from(e: serde_json::Error) -> Self {
        BaasError {
            code: BaasErrorCode::BadProtocolMessage,
            message: format!("error decoding reply json: {}", e.to_string()),
        }
    }
}

impl From<base64::DecodeError> for BaasError {
    fn from(e: base64::DecodeError) -> Self {
        BaasError {
            code: BaasErrorCode::BadProtocolMessage,
            message: format!("error decoding reply payload: {}", e.to_string()),
        }
    }
}

/// BaasErrorCode represents the error code.
///
/// Error codes are divided into categories as follows:
///
/// 1. Errors detected locally before any request is issued: illegal
/// arguments, unsupported operator tokens, malformed builder state.
/// These are never retried.
///
/// 2. Errors classified from a service reply status code. The service
/// distinguishes caller/parameter failures from internal/system failures;
/// the classification is performed by [`classify_reply_code()`] and
/// determines which of these codes wraps the failure.
///
/// 3. The distinguished `NotFound` value used only by the cache (key-value)
/// path to report an absent key.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BaasErrorCode {
    /// NoError represents there is no error.
    NoError = 0,

    /// InvalidParam error represents the application provided an illegal
    /// argument for the operation, or the service classified the request
    /// as a caller failure (any nonzero reply code outside the fixed
    /// system-failure set).
    InvalidParam = 1,

    /// InternalError represents a system problem: a reply code in the fixed
    /// internal/auth/rate-limit set, or a transport-level failure.
    InternalError = 2,

    /// NotFound represents an absent key on the cache path. It is reported
    /// as an error value distinct from system and parameter failures; see
    /// [`BaasError::is_not_found()`].
    NotFound = 3,

    /// RequestTimeout error represents the request did not complete before
    /// the deadline supplied by the caller (or the handle default) elapsed.
    RequestTimeout = 4,

    /// BadProtocolMessage error represents a malformed reply payload. This
    /// indicates a protocol mismatch between client and service and is
    /// classified as a system failure.
    BadProtocolMessage = 5,

    /// UnknownError represents an unclassifiable failure.
    UnknownError = 6,
}

// Reply status codes assigned by the resource service. The code is carried
// as a string in the reply envelope; "0" is the only success value.
pub(crate) const REPLY_CODE_SUCCESS: &str = "0";
pub(crate) const REPLY_CODE_INTERNAL_ERROR: &str = "k_ec_000001";
pub(crate) const REPLY_CODE_TOKEN_EXPIRED: &str = "k_ident_013000";
pub(crate) const REPLY_CODE_ILLEGAL_TOKEN: &str = "k_ident_013001";
pub(crate) const REPLY_CODE_MISSING_TOKEN: &str = "k_fs_ec_100001";
pub(crate) const REPLY_CODE_RATE_LIMITED: &str = "k_fs_ec_000004";

/// Classification of a reply status code, shared by the document-store and
/// cache paths.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReplyStatus {
    /// The reply carries a successful result payload.
    Success,
    /// The service failed internally, or the caller's token or rate limit
    /// is the problem; surfaced as an opaque
    /// [`BaasErrorCode::InternalError`].
    SystemFailure,
    /// The service rejected the request; surfaced as a caller-actionable
    /// [`BaasErrorCode::InvalidParam`] with the service message.
    ParameterFailure,
}

/// Classify a reply status code.
///
/// A fixed set of codes (internal error, token expired/illegal/missing,
/// rate limited) classifies as [`ReplyStatus::SystemFailure`]; the
/// distinguished `"0"` code is [`ReplyStatus::Success`]; every other
/// nonzero code is [`ReplyStatus::ParameterFailure`]. Classification
/// depends on the code alone, never on the message or payload.
pub fn classify_reply_code(code: &str) -> ReplyStatus {
    match code {
        REPLY_CODE_SUCCESS => ReplyStatus::Success,
        REPLY_CODE_INTERNAL_ERROR
        | REPLY_CODE_TOKEN_EXPIRED
        | REPLY_CODE_ILLEGAL_TOKEN
        | REPLY_CODE_MISSING_TOKEN
        | REPLY_CODE_RATE_LIMITED => ReplyStatus::SystemFailure,
        _ => ReplyStatus::ParameterFailure,
    }
}

// Build the error for a failed reply, wrapping the operation name and the
// diagnostic log id so the failure can be diagnosed without re-issuing the
// call.
pub(crate) fn reply_error(op: &str, code: &str, msg: &str, log_id: &str) -> BaasError {
    match classify_reply_code(code) {
        ReplyStatus::SystemFailure => BaasError::new(
            BaasErrorCode::InternalError,
            &format!(
                "{}: call remote failed, err: {} ([{}] {})",
                op, msg, code, log_id
            ),
        ),
        _ => BaasError::new(
            BaasErrorCode::InvalidParam,
            &format!(
                "{}: call remote failed, err: {} ([{}] {})",
                op, msg, code, log_id
            ),
        ),
    }
}
