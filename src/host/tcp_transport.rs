use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use eprom_core::prelude::Transport;
use log::{info, warn};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Serial-link stand-in: one TCP peer at a time.
///
/// An accept thread hands each connection to a reader thread that pushes
/// incoming bytes onto a channel, so `available` never blocks. Writes go
/// straight to the most recent peer.
pub struct TcpTransport {
    rx: Receiver<u8>,
    peer: Arc<Mutex<Option<TcpStream>>>,
    local_addr: SocketAddr,
}

impl TcpTransport {
    pub fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;
        let (tx, rx) = crossbeam_channel::unbounded();
        let peer = Arc::new(Mutex::new(None));

        let accept_peer = Arc::clone(&peer);
        thread::Builder::new()
            .name("link-accept".into())
            .spawn(move || accept_loop(listener, tx, accept_peer))?;

        info!("Waiting for images on {}", local_addr);
        Ok(Self {
            rx,
            peer,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

fn accept_loop(listener: TcpListener, tx: Sender<u8>, peer: Arc<Mutex<Option<TcpStream>>>) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Accept failed: {}", e);
                continue;
            }
        };
        let who = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".into());
        info!("Sender connected from {}", who);

        let reader = match stream.try_clone() {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Could not split stream from {}: {}", who, e);
                continue;
            }
        };
        if let Ok(mut slot) = peer.lock() {
            *slot = Some(stream);
        }

        let tx = tx.clone();
        let spawned = thread::Builder::new()
            .name("link-read".into())
            .spawn(move || read_loop(reader, tx));
        if let Err(e) = spawned {
            warn!("Could not start reader for {}: {}", who, e);
        }
    }
}

fn read_loop(mut stream: TcpStream, tx: Sender<u8>) {
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                for &b in &buf[..n] {
                    if tx.send(b).is_err() {
                        return;
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Link read failed: {}", e);
                break;
            }
        }
    }
    info!("Sender disconnected");
}

impl Transport for TcpTransport {
    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read_bytes(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.rx.recv_timeout(timeout) {
                Ok(b) => {
                    buf[n] = b;
                    n += 1;
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    if n == 0 {
                        return Err(io::Error::new(
                            io::ErrorKind::BrokenPipe,
                            "link listener has stopped",
                        ));
                    }
                    break;
                }
            }
        }
        Ok(n)
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        let mut slot = self
            .peer
            .lock()
            .map_err(|_| io::Error::other("link peer lock poisoned"))?;
        match slot.as_mut() {
            Some(stream) => stream.write_all(&[byte]),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "no sender connected")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut slot = self
            .peer
            .lock()
            .map_err(|_| io::Error::other("link peer lock poisoned"))?;
        match slot.as_mut() {
            Some(stream) => stream.flush(),
            None => Ok(()),
        }
    }
}
