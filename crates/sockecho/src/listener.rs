use crate::config::Config;
use crate::layers::echo::{EchoRequest, Peer};
use crate::layers::raw::{EchoStream, RawRequest, RawService};
use crate::resolve::resolve;
use eyre::WrapErr;
use flume::{Receiver, Sender};
use sockecho_uri::Address;
use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use tokio::net::{TcpListener, TcpSocket, UdpSocket, UnixListener, UnixSocket};
use tokio::task::JoinHandle;
use tower::{Service, ServiceExt};
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub enum Listener {
    Tcp(TcpListener),
    Udp(UdpSocket),
    Unix {
        listener: UnixListener,
        _file: SocketFile,
    },
}

/// Removes the socket file when dropped.
#[derive(Debug)]
pub struct SocketFile(PathBuf);

pub struct ListenerHandle {
    jh: JoinHandle<eyre::Result<()>>,
    tx: Sender<ListenerMessage>,
}

/// Stops a running listener. Closing twice is harmless.
#[derive(Debug, Clone)]
pub struct Closer(Sender<ListenerMessage>);

#[derive(Debug)]
enum ListenerMessage {
    Close,
}

enum Incoming {
    Stream(RawRequest),
    Datagram { payload: Vec<u8>, from: SocketAddr },
}

impl Listener {
    /// Resolves the host if there is one and opens the socket `config` asks for.
    pub async fn bind(config: &Config) -> eyre::Result<Self> {
        let listener = match &config.address {
            Address::Tcp { host, port } => {
                let addr = resolve(host, *port).await?;
                Self::bind_tcp(addr, config.backlog)
            }
            Address::Udp { host, port } => {
                let addr = resolve(host, *port).await?;
                Self::bind_udp(addr).await
            }
            Address::UnixPath { path } => Self::bind_unix(path, config.backlog),
        }
        .wrap_err_with(|| format!("could not listen on {}", config.address))?;

        info!(address = %config.address, "listening");
        Ok(listener)
    }

    pub fn bind_tcp(addr: SocketAddrV4, backlog: u32) -> io::Result<Self> {
        let socket = TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(addr.into())?;
        debug!(backlog, "tcp socket bound");
        Ok(Listener::Tcp(socket.listen(backlog)?))
    }

    pub async fn bind_udp(addr: SocketAddrV4) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        debug!("udp socket bound");
        Ok(Listener::Udp(socket))
    }

    /// Fails if `path` exists already.
    pub fn bind_unix(path: impl AsRef<Path>, backlog: u32) -> io::Result<Self> {
        let path = path.as_ref();
        let socket = UnixSocket::new_stream()?;
        socket.bind(path)?;
        let file = SocketFile(path.to_path_buf());
        debug!(path = %path.display(), backlog, "unix socket bound");

        Ok(Listener::Unix {
            listener: socket.listen(backlog)?,
            _file: file,
        })
    }

    /// `None` for unix sockets.
    pub fn local_addr(&self) -> io::Result<Option<SocketAddr>> {
        match self {
            Listener::Tcp(listener) => listener.local_addr().map(Some),
            Listener::Udp(socket) => socket.local_addr().map(Some),
            Listener::Unix { .. } => Ok(None),
        }
    }

    async fn next(&self, buf: &mut [u8]) -> io::Result<Incoming> {
        match self {
            Listener::Tcp(listener) => {
                let (stream, peer) = listener.accept().await?;
                Ok(Incoming::Stream(RawRequest {
                    stream: EchoStream::Tcp(stream),
                    peer: Peer::Inet(peer),
                }))
            }
            Listener::Unix { listener, .. } => {
                let (stream, _) = listener.accept().await?;
                Ok(Incoming::Stream(RawRequest {
                    stream: EchoStream::Unix(stream),
                    peer: Peer::Unix,
                }))
            }
            Listener::Udp(socket) => {
                let (n, from) = socket.recv_from(buf).await?;
                Ok(Incoming::Datagram {
                    payload: buf[..n].to_vec(),
                    from,
                })
            }
        }
    }

    async fn reply_to(&self, reply: &[u8], to: SocketAddr) -> io::Result<()> {
        if let Listener::Udp(socket) = self {
            let sent = socket.send_to(reply, to).await?;
            if sent < reply.len() {
                warn!(sent, len = reply.len(), "short reply");
            }
        }
        Ok(())
    }
}

/// Serves `listener` on the current runtime, one request at a time.
pub fn spawn<S>(listener: Listener, echo: S, recv_buffer: usize) -> ListenerHandle
where
    S: Service<EchoRequest, Response = Vec<u8>, Error = io::Error> + Clone + Send + 'static,
    S::Future: Send,
{
    let (tx, rx) = flume::unbounded();
    let jh = tokio::spawn(serve(listener, echo, recv_buffer, rx));
    ListenerHandle { jh, tx }
}

async fn serve<S>(
    listener: Listener,
    mut echo: S,
    recv_buffer: usize,
    rx: Receiver<ListenerMessage>,
) -> eyre::Result<()>
where
    S: Service<EchoRequest, Response = Vec<u8>, Error = io::Error> + Clone + Send + 'static,
    S::Future: Send,
{
    let mut raw = RawService::new(echo.clone(), recv_buffer);
    let mut buf = vec![0; recv_buffer];

    loop {
        let incoming = tokio::select! {
            msg = rx.recv_async() => {
                match msg {
                    Ok(ListenerMessage::Close) => info!("closing listener"),
                    Err(_) => debug!("every handle dropped, closing listener"),
                }
                break;
            }
            incoming = listener.next(&mut buf) => incoming,
        };

        match incoming {
            Ok(Incoming::Stream(req)) => {
                let peer = req.peer;
                if let Err(err) = raw.ready().await?.call(req).await {
                    warn!(%peer, %err, "connection failed");
                }
            }
            Ok(Incoming::Datagram { payload, from }) => {
                let req = EchoRequest {
                    peer: Peer::Inet(from),
                    payload,
                };
                let result = match echo.ready().await?.call(req).await {
                    Ok(reply) => listener.reply_to(&reply, from).await,
                    Err(err) => Err(err),
                };
                if let Err(err) = result {
                    warn!(peer = %from, %err, "datagram failed");
                }
            }
            Err(err) if is_connection_error(&err) => {
                warn!(%err, "connection error, continuing");
            }
            Err(err) => {
                error!(%err, "listener failed");
                return Err(err).wrap_err("could not accept or receive");
            }
        }
    }

    Ok(())
}

/// Errors that concern one peer only. Anything else stops the listener.
pub(crate) fn is_connection_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
    )
}

impl ListenerHandle {
    pub fn closer(&self) -> Closer {
        Closer(self.tx.clone())
    }

    pub async fn close(self) -> eyre::Result<()> {
        self.closer().close();
        self.join().await
    }

    /// Waits until the listener stops, by a [`Closer`] or by a fatal error.
    pub async fn join(self) -> eyre::Result<()> {
        let ListenerHandle { jh, tx } = self;
        let result = jh.await;
        drop(tx);
        result?
    }
}

impl Closer {
    pub fn close(&self) {
        if self.0.send(ListenerMessage::Close).is_err() {
            debug!("listener already stopped");
        }
    }
}

impl Drop for SocketFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => debug!(path = %self.0.display(), "socket file removed"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %self.0.display(), %err, "could not remove socket file"),
        }
    }
}
