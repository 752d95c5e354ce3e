//! Mock search API startup for tests that need a localhost listener.
//!
//! Sandboxed runners may forbid binding sockets. Those tests are skipped
//! there unless `HARVESTER_REQUIRE_SOCKET_TESTS` is set, in which case a
//! missing listener is a failure.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_VAR: &str = "HARVESTER_REQUIRE_SOCKET_TESTS";

fn loopback_available() -> bool {
    TcpListener::bind(("127.0.0.1", 0)).is_ok()
}

/// Starts a mock API, or returns `None` when loopback sockets are unavailable.
pub async fn start_mock_api() -> Option<MockServer> {
    if loopback_available() {
        return Some(MockServer::start().await);
    }
    let required = std::env::var(REQUIRE_VAR).is_ok_and(|v| v != "0" && !v.is_empty());
    assert!(!required, "{REQUIRE_VAR} is set but 127.0.0.1 cannot be bound");
    eprintln!("skipping mock API test: cannot bind 127.0.0.1");
    None
}
