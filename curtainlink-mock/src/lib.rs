use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use curtainlink_api::transport::{FrameError, HubLink, Opcode};
use embedded_io_adapters::tokio_1::FromTokio;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, oneshot, watch};

pub mod settings;

#[derive(Default)]
struct Journal {
    received: Vec<Vec<u8>>,
    connections: usize,
    failures: usize,
}

/// RF hub stand-in that records every code it is asked to replay.
pub struct MockHub {
    address: SocketAddr,
    journal: Arc<Mutex<Journal>>,
    kick: watch::Sender<u64>,
    stop: Option<oneshot::Sender<()>>,
}

impl MockHub {
    pub async fn bind(addr: SocketAddr, identity: Vec<u8>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let address = listener.local_addr()?;
        tracing::info!("mock hub listening on {}", address);

        let journal = Arc::new(Mutex::new(Journal::default()));
        let (kick, _) = watch::channel(0);
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let identity = Arc::new(identity);
        let connection_journal = journal.clone();
        let connection_kick = kick.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        tracing::info!("mock hub shutting down");
                        break;
                    },
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, peer)) => {
                                connection_journal.lock().await.connections += 1;
                                tokio::spawn(Self::handle_connection(
                                    stream,
                                    peer,
                                    identity.clone(),
                                    connection_journal.clone(),
                                    connection_kick.subscribe(),
                                ));
                            },
                            Err(e) => {
                                tracing::error!("Failed to accept TCP connection: {}", e);
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            address,
            journal,
            kick,
            stop: Some(stop_tx),
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Codes acknowledged so far, in arrival order.
    pub async fn received(&self) -> Vec<Vec<u8>> {
        self.journal.lock().await.received.clone()
    }

    pub async fn connections(&self) -> usize {
        self.journal.lock().await.connections
    }

    /// Refuses the next `count` transmits with a `Nack`.
    pub async fn fail_next(&self, count: usize) {
        self.journal.lock().await.failures = count;
    }

    /// Closes every open session, as a hub reboot would.
    pub fn drop_connections(&self) {
        self.kick.send_modify(|generation| *generation += 1);
    }

    pub fn shutdown(mut self) {
        self.stop_listener();
    }

    fn stop_listener(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    async fn handle_connection(
        stream: TcpStream,
        peer: SocketAddr,
        identity: Arc<Vec<u8>>,
        journal: Arc<Mutex<Journal>>,
        mut kick: watch::Receiver<u64>,
    ) {
        tracing::debug!("hub client connected from {}", peer);

        let mut link = HubLink::new(FromTokio::new(stream));
        let mut authenticated = false;

        loop {
            let frame = tokio::select! {
                _ = kick.changed() => {
                    tracing::info!("dropping session with {}", peer);
                    break;
                }
                frame = link.receive() => match frame {
                    Ok(frame) => frame,
                    Err(FrameError::UnexpectedEof) => break,
                    Err(e) => {
                        tracing::warn!("bad frame from {}: {}", peer, e);
                        break;
                    }
                }
            };

            let (opcode, payload) = match frame.opcode {
                Opcode::Hello if frame.payload == *identity => {
                    authenticated = true;
                    (Opcode::Welcome, Vec::new())
                }
                Opcode::Hello => (Opcode::Reject, b"unknown identity".to_vec()),
                Opcode::Transmit if !authenticated => (Opcode::Nack, b"not authenticated".to_vec()),
                Opcode::Transmit => {
                    let mut journal = journal.lock().await;
                    if journal.failures > 0 {
                        journal.failures -= 1;
                        (Opcode::Nack, b"injected failure".to_vec())
                    } else {
                        tracing::debug!("replaying code {} for {}", hex::encode(&frame.payload), peer);
                        journal.received.push(frame.payload.clone());
                        (Opcode::Ack, Vec::new())
                    }
                }
                Opcode::Ping => (Opcode::Pong, Vec::new()),
                other => {
                    tracing::warn!("unexpected {} from {}", other.name(), peer);
                    break;
                }
            };

            if let Err(e) = link.reply(opcode, frame.sequence, &payload).await {
                tracing::warn!("failed to answer {}: {}", peer, e);
                break;
            }
            if opcode == Opcode::Reject {
                break;
            }
        }

        tracing::debug!("hub client {} disconnected", peer);
    }
}

impl Drop for MockHub {
    fn drop(&mut self) {
        self.stop_listener();
    }
}
