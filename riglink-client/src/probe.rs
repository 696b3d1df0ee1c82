//! Probe round: race one connection attempt per candidate, first open wins.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::task::JoinSet;

/// Attempt every candidate concurrently. The first attempt to open wins
/// and the rest are aborted; an attempt that neither opens nor fails
/// within `attempt_timeout` counts as failed. Returns `None` when every
/// attempt failed.
pub async fn probe(
    candidates: Vec<SocketAddr>,
    attempt_timeout: Duration,
) -> Option<(SocketAddr, TcpStream)> {
    let mut attempts = JoinSet::new();
    for addr in candidates {
        attempts.spawn(async move {
            match tokio::time::timeout(attempt_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => Some((addr, stream)),
                Ok(Err(_)) | Err(_) => None,
            }
        });
    }

    while let Some(joined) = attempts.join_next().await {
        if let Ok(Some((addr, stream))) = joined {
            attempts.abort_all();
            log::info!("probe won by {addr}");
            return Some((addr, stream));
        }
    }
    None
}
