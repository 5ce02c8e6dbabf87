//! JSON-lines bridge between a page-side client and the relay.
//!
//! One envelope per line on stdin, one per line on stdout. Logs go to stderr.

use std::sync::Arc;

use runeforge_config::Config;
use runeforge_core::{Debouncer, EnchantCatalog, Envelope, Relay};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{build_pipeline, persist_overrides, service_client};

const CHANNEL_CAPACITY: usize = 64;

/// Strategy for running the relay until stdin closes.
#[derive(Debug, Clone, Copy)]
pub struct RelayStrategy;

impl super::CommandStrategy for RelayStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let client = Arc::new(service_client(&config)?);
        let (shared, pipeline) = build_pipeline(&config, Arc::clone(&client));

        let relay = Relay::new(
            pipeline,
            Arc::new(EnchantCatalog::new(client)),
            Debouncer::new(config.relay.enchant_debounce()),
            config.relay.auto_impact,
        );

        let (in_tx, in_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (out_tx, mut out_rx) = mpsc::channel::<Envelope>(CHANNEL_CAPACITY);

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(envelope) = out_rx.recv().await {
                let frame = match envelope.to_json() {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Dropping unencodable frame: {e}");
                        continue;
                    }
                };
                stdout.write_all(frame.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                match Envelope::from_json(&line) {
                    Ok(envelope) => {
                        if in_tx.send(envelope).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring malformed frame: {e}"),
                }
            }
            Ok::<(), std::io::Error>(())
        });

        info!("Relay listening on stdin");
        relay.run(in_rx, out_tx).await?;
        reader.await??;
        writer.await??;
        info!("Relay stopped");

        persist_overrides(config, &shared).await
    }
}
