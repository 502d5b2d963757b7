//! # Gossip Service
//!
//! TCP gossip between sequencer nodes.
//!
//! ## Connection Flow
//!
//! 1. Either side connects (inbound accept or bootstrap dial).
//! 2. Both send `Hello`; the remote peer id must not be our own, must not
//!    already be connected, and must match the `/p2p/` pin if one was given.
//! 3. The peer gets a bounded outbound queue. A reader loop handles
//!    incoming blocks, a writer loop drains the queue.
//!
//! ## Relay
//!
//! A block with a valid origin signature that has not been seen before is
//! forwarded to every other peer and then handed to subscribers.
//!
//! ## Backpressure
//!
//! Each subscriber owns a bounded queue of `inbound_buffer` blocks. The
//! reader awaits room in it, so a slow subscriber stalls the connection
//! (and through TCP, the sending peer) instead of losing blocks.
//!
//! ## Thread Safety
//!
//! Cheap to share: all state lives behind one `Arc`, peers behind a
//! `parking_lot::RwLock`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use seq_types::Block;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::GossipConfig;
use crate::domain::{NodeIdentity, PeerAddr, PeerId, SeenBlockCache};
use crate::errors::GossipError;
use crate::wire::{self, Message};

type Frame = Arc<Vec<u8>>;

struct PeerHandle {
    conn_id: u64,
    addr: SocketAddr,
    outbound: mpsc::Sender<Frame>,
}

struct Inner {
    config: GossipConfig,
    identity: NodeIdentity,
    peers: RwLock<HashMap<PeerId, PeerHandle>>,
    seen: SeenBlockCache,
    subscribers: Mutex<Vec<mpsc::Sender<Block>>>,
    shutdown: watch::Sender<bool>,
    local_addr: watch::Sender<Option<SocketAddr>>,
    next_conn_id: AtomicU64,
    started: AtomicBool,
    closed: AtomicBool,
}

/// Block gossip service. Clones share the same node.
#[derive(Clone)]
pub struct GossipService {
    inner: Arc<Inner>,
}

impl GossipService {
    /// Allocate the service. Nothing is bound until [`GossipService::start`].
    pub fn new(config: GossipConfig, identity: NodeIdentity) -> Result<Self, GossipError> {
        config.validate()?;

        let (shutdown, _) = watch::channel(false);
        let (local_addr, _) = watch::channel(None);

        Ok(Self {
            inner: Arc::new(Inner {
                seen: SeenBlockCache::new(config.seen_cache_size),
                config,
                identity,
                peers: RwLock::new(HashMap::new()),
                subscribers: Mutex::new(Vec::new()),
                shutdown,
                local_addr,
                next_conn_id: AtomicU64::new(0),
                started: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
        })
    }

    pub fn peer_id(&self) -> PeerId {
        self.inner.identity.peer_id()
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.read().len()
    }

    /// Receiver for every new, correctly signed block from the network.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> mpsc::Receiver<Block> {
        let (tx, rx) = mpsc::channel(self.inner.config.inbound_buffer);
        let mut subscribers = self.inner.subscribers.lock();
        subscribers.retain(|s| !s.is_closed());
        subscribers.push(tx);
        rx
    }

    /// Wait until the listener is bound and return its address.
    ///
    /// Returns `None` if the service is dropped first.
    pub async fn listening_addr(&self) -> Option<SocketAddr> {
        let mut rx = self.inner.local_addr.subscribe();
        rx.wait_for(Option::is_some).await.ok().and_then(|addr| *addr)
    }

    /// Sign `block` and queue it for every connected peer without blocking.
    ///
    /// Returns the number of peers it was queued for. Zero connected peers
    /// is not an error.
    pub fn broadcast(&self, block: &Block) -> Result<usize, GossipError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(GossipError::Closed);
        }

        let hash = block.hash();
        self.inner.seen.insert(hash);

        let message = Message::Block {
            origin: self.inner.identity.peer_id(),
            block: block.clone(),
            signature: self.inner.identity.sign(&hash),
        };
        let frame = Arc::new(wire::encode(&message, self.inner.config.max_frame_bytes)?);

        let peers = self.inner.peers.read();
        if peers.is_empty() {
            debug!("[gossip] No peers connected, block {} not sent", block.id());
            return Ok(0);
        }

        let mut queued = 0;
        for (peer_id, peer) in peers.iter() {
            match peer.outbound.try_send(Arc::clone(&frame)) {
                Ok(()) => queued += 1,
                Err(_) => debug!("[gossip] Outbound queue full for peer {}", peer_id),
            }
        }

        if queued == 0 {
            return Err(GossipError::QueueFull { peers: peers.len() });
        }
        Ok(queued)
    }

    /// Bind, dial bootstrap peers and serve until [`GossipService::close`].
    pub async fn start(&self) -> Result<(), GossipError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(GossipError::Closed);
        }
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(GossipError::AlreadyStarted);
        }

        let bind_addr = self.inner.config.bind_addr;
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|source| GossipError::Bind {
                addr: bind_addr,
                source,
            })?;
        let local_addr = listener.local_addr()?;
        self.inner.local_addr.send_replace(Some(local_addr));
        info!(
            "[gossip] Listening on {} as peer {}",
            local_addr,
            self.inner.identity.peer_id()
        );

        let mut tasks = JoinSet::new();
        for peer in self.inner.config.bootstrap.clone() {
            tasks.spawn(dial_loop(Arc::clone(&self.inner), peer));
        }

        let mut shutdown = self.inner.shutdown.subscribe();
        while !*shutdown.borrow_and_update() {
            tokio::select! {
                _ = shutdown.changed() => {}
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        debug!("[gossip] Inbound connection from {}", addr);
                        tasks.spawn(run_connection(Arc::clone(&self.inner), stream, addr, None));
                    }
                    Err(e) => warn!("[gossip] Accept failed: {}", e),
                },
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        tasks.shutdown().await;
        self.inner.peers.write().clear();
        info!("[gossip] Stopped");
        Ok(())
    }

    /// Stop the service and drop every connection.
    ///
    /// Closing twice is an error.
    pub fn close(&self) -> Result<(), GossipError> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Err(GossipError::AlreadyClosed);
        }
        self.inner.shutdown.send_replace(true);
        info!("[gossip] Close requested");
        Ok(())
    }
}

async fn dial_loop(inner: Arc<Inner>, peer: PeerAddr) {
    loop {
        match timeout(inner.config.connect_timeout, TcpStream::connect(peer.socket)).await {
            Ok(Ok(stream)) => {
                info!("[gossip] Connected to bootstrap peer {}", peer);
                run_connection(Arc::clone(&inner), stream, peer.socket, peer.peer_id).await;
            }
            Ok(Err(e)) => debug!("[gossip] Dial {} failed: {}", peer, e),
            Err(_) => debug!("[gossip] Dial {} timed out", peer),
        }
        sleep(inner.config.redial_interval).await;
    }
}

async fn run_connection(inner: Arc<Inner>, stream: TcpStream, addr: SocketAddr, expected: Option<PeerId>) {
    let _ = stream.set_nodelay(true);
    let (mut reader, mut writer) = stream.into_split();

    let (peer_id, outbound_rx, conn_id) =
        match handshake(&inner, &mut reader, &mut writer, addr, expected).await {
            Ok(accepted) => accepted,
            Err(e) => {
                debug!("[gossip] Handshake with {} failed: {}", addr, e);
                return;
            }
        };
    info!("[gossip] Peer {} connected ({})", peer_id, addr);

    let result = tokio::select! {
        r = read_loop(&inner, &mut reader, peer_id) => r,
        r = write_loop(&mut writer, outbound_rx) => r,
    };
    if let Err(e) = result {
        debug!("[gossip] Connection to {} ended: {}", peer_id, e);
    }

    let mut peers = inner.peers.write();
    if peers.get(&peer_id).is_some_and(|p| p.conn_id == conn_id) {
        peers.remove(&peer_id);
    }
    info!("[gossip] Peer {} disconnected", peer_id);
}

async fn handshake(
    inner: &Inner,
    reader: &mut OwnedReadHalf,
    writer: &mut OwnedWriteHalf,
    addr: SocketAddr,
    expected: Option<PeerId>,
) -> Result<(PeerId, mpsc::Receiver<Frame>, u64), GossipError> {
    let own_id = inner.identity.peer_id();
    let listen_port = inner.local_addr.borrow().map_or(0, |a| a.port());
    let hello = Message::Hello {
        peer_id: own_id,
        listen_port,
    };
    wire::write_frame(writer, &wire::encode(&hello, inner.config.max_frame_bytes)?).await?;

    let reply = timeout(
        inner.config.handshake_timeout,
        wire::read_message(reader, inner.config.max_frame_bytes),
    )
    .await
    .map_err(|_| GossipError::Handshake("timed out".into()))??;

    let peer_id = match reply {
        Some(Message::Hello { peer_id, .. }) => peer_id,
        Some(_) => return Err(GossipError::Handshake("expected Hello".into())),
        None => return Err(GossipError::Handshake("closed before Hello".into())),
    };
    if peer_id == own_id {
        return Err(GossipError::Handshake("connected to self".into()));
    }
    if let Some(expected) = expected {
        if expected != peer_id {
            return Err(GossipError::Handshake(format!(
                "{} presented id {}, expected {}",
                addr, peer_id, expected
            )));
        }
    }

    let (outbound, outbound_rx) = mpsc::channel(inner.config.outbound_queue);
    let conn_id = inner.next_conn_id.fetch_add(1, Ordering::Relaxed);
    let mut peers = inner.peers.write();
    if peers.contains_key(&peer_id) {
        return Err(GossipError::Handshake(format!("already connected to {}", peer_id)));
    }
    peers.insert(
        peer_id,
        PeerHandle {
            conn_id,
            addr,
            outbound,
        },
    );
    Ok((peer_id, outbound_rx, conn_id))
}

async fn read_loop(inner: &Inner, reader: &mut OwnedReadHalf, from: PeerId) -> Result<(), GossipError> {
    while let Some(message) = wire::read_message(reader, inner.config.max_frame_bytes).await? {
        match message {
            Message::Block {
                origin,
                block,
                signature,
            } => handle_block(inner, from, origin, block, signature).await,
            Message::Hello { .. } => debug!("[gossip] Ignoring repeated Hello from {}", from),
        }
    }
    Ok(())
}

async fn write_loop(writer: &mut OwnedWriteHalf, mut outbound: mpsc::Receiver<Frame>) -> Result<(), GossipError> {
    while let Some(frame) = outbound.recv().await {
        wire::write_frame(writer, &frame).await?;
    }
    Ok(())
}

async fn handle_block(inner: &Inner, from: PeerId, origin: PeerId, block: Block, signature: Vec<u8>) {
    let hash = block.hash();
    if inner.seen.contains(&hash) {
        return;
    }
    // Invalid signatures are dropped without penalising the relaying peer.
    if !NodeIdentity::verify(&origin, &hash, &signature) {
        debug!("[gossip] Dropping block {} with bad signature from {}", block.id(), from);
        return;
    }
    if !inner.seen.insert(hash) {
        return;
    }

    debug!("[gossip] Received block {} from {} (origin {})", block.id(), from, origin);
    let relay = Message::Block {
        origin,
        block: block.clone(),
        signature,
    };
    let frame = match wire::encode(&relay, inner.config.max_frame_bytes) {
        Ok(frame) => Arc::new(frame),
        Err(e) => {
            warn!("[gossip] Cannot re-encode block for relay: {}", e);
            return;
        }
    };
    {
        let peers = inner.peers.read();
        for (peer_id, peer) in peers.iter() {
            if *peer_id == from || *peer_id == origin {
                continue;
            }
            if peer.outbound.try_send(Arc::clone(&frame)).is_err() {
                debug!("[gossip] Relay to {} ({}) dropped, queue full", peer_id, peer.addr);
            }
        }
    }

    deliver(inner, block).await;
}

/// Hand `block` to every live subscriber, waiting for queue space.
async fn deliver(inner: &Inner, block: Block) {
    let subscribers = inner.subscribers.lock().clone();
    let mut gone = false;
    for subscriber in &subscribers {
        if subscriber.send(block.clone()).await.is_err() {
            gone = true;
        }
    }
    if gone {
        inner.subscribers.lock().retain(|s| !s.is_closed());
    }
}
