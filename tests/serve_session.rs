use std::error::Error;

use tempfile::tempdir;
use tokio::net::TcpListener;

use assetpipe::serve::ServerSession;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn occupied_port_is_a_fatal_bind_error() -> TestResult {
    // Hold a port so the session cannot have it.
    let holder = TcpListener::bind("127.0.0.1:0").await?;
    let port = holder.local_addr()?.port();

    let dir = tempdir()?;
    let result = ServerSession::start(dir.path(), port).await;

    assert!(result.is_err());
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("binding"), "unexpected error: {message}");

    Ok(())
}
