//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Login attempts replenished per second, per client IP.
const LOGIN_PER_SECOND: u64 = 1;

/// Login attempts a client may make in a burst.
const LOGIN_BURST: u32 = 10;

/// Creates the rate limiter for login submissions.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Each login
/// submission may reach the accounting service, so this also caps the load a
/// single client can put on it.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address extracted from the
/// socket peer address.
///
/// # Example
///
/// ```rust,ignore
/// let login = Router::new()
///     .route("/login.html", get(login_page_handler).post(login_submit_handler))
///     .layer(rate_limit::login_layer());
/// ```
pub fn login_layer()
-> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(LOGIN_PER_SECOND)
            .burst_size(LOGIN_BURST)
            .finish()
            .expect("login rate limit settings are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Same limits as [`login_layer`], keyed by the forwarded client IP.
///
/// Reads `X-Forwarded-For`, `X-Real-IP` and `Forwarded` before falling back
/// to the peer address. Use only behind a trusted reverse proxy.
pub fn login_layer_behind_proxy()
-> GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(LOGIN_PER_SECOND)
            .burst_size(LOGIN_BURST)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("login rate limit settings are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
