// Diagnostic feed subscriber: find the service, log every well-known topic.

use std::sync::Arc;

use riglink_client::{topics, ClientState, LinkClient, MessageKind};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for arg in std::env::args().skip(1) {
        if arg == "--version" || arg == "-V" {
            println!("riglink-echo {}", VERSION);
            return Ok(());
        }
    }

    env_logger::init();
    let cfg = riglink_client::config::load();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let client = Arc::new(LinkClient::new(cfg));

        for topic in topics::ALL {
            client.subscribe(
                topic,
                Arc::new(move |payload: String| {
                    log::info!("[{topic}] {} bytes", payload.len());
                }),
            )?;
        }

        let runner = client.clone();
        tokio::spawn(async move { runner.run().await });

        // Greet the service once per connection.
        let greeter = client.clone();
        tokio::spawn(async move {
            let mut greeted = false;
            loop {
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                match greeter.state().await {
                    ClientState::Connected if !greeted => {
                        greeted = greeter
                            .send(MessageKind::Message, "riglink-echo online")
                            .await
                            .is_ok();
                    }
                    ClientState::Connected => {}
                    ClientState::Closed => break,
                    _ => greeted = false,
                }
            }
        });

        shutdown_signal().await?;
        client.shutdown().await;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM (Unix).
async fn shutdown_signal() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}
