//! Web server command

use anyhow::Result;

/// Start the REST API server
pub async fn cmd_serve(host: &str, port: u16) -> Result<()> {
    sift_server::serve(host, port).await
}
