use may::coroutine::JoinHandle;
use may_minihttp::HttpService;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How long [`ServerHandle::wait_ready`] waits for the listener.
pub const READY_TIMEOUT: Duration = Duration::from_secs(1);

const READY_POLL: Duration = Duration::from_millis(5);

/// Runs an [`HttpService`] on the may_minihttp accept loop.
pub struct HttpServer<T>(pub T);

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind `addr` and start serving.
    ///
    /// Only the first address `addr` resolves to is used.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let local_addr = first_addr(addr)?;
        let accept_loop = may_minihttp::HttpServer(self.0).start(local_addr)?;
        info!(addr = %local_addr, "Gateway listening");
        Ok(ServerHandle {
            local_addr,
            accept_loop,
        })
    }
}

/// A started server. Dropping it leaves the server running.
pub struct ServerHandle {
    local_addr: SocketAddr,
    accept_loop: JoinHandle<()>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block until the listener accepts connections, up to [`READY_TIMEOUT`].
    pub fn wait_ready(&self) -> io::Result<()> {
        wait_until_accepting(self.local_addr, READY_TIMEOUT)
    }

    /// Cancel the accept loop and wait for it to unwind.
    pub fn stop(self) {
        let addr = self.local_addr;
        cancel(&self.accept_loop);
        if self.accept_loop.join().is_err() {
            warn!(addr = %addr, "Accept loop panicked while stopping");
        }
        info!(addr = %addr, "Gateway stopped");
    }

    /// Block for as long as the server runs.
    pub fn join(self) -> thread::Result<()> {
        self.accept_loop.join()
    }
}

fn cancel(accept_loop: &JoinHandle<()>) {
    // SAFETY: the accept loop holds no state that outlives it; cancellation
    // unwinds it at its next yield point, and `stop` joins it right after.
    unsafe { accept_loop.coroutine().cancel() };
}

fn first_addr<A: ToSocketAddrs>(addr: A) -> io::Result<SocketAddr> {
    addr.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    })
}

/// Poll `addr` with plain TCP connects until one succeeds or `timeout` passes.
pub fn wait_until_accepting(addr: SocketAddr, timeout: Duration) -> io::Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect_timeout(&addr, READY_POLL).is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("nothing accepting on {addr} after {}ms", timeout.as_millis()),
            ));
        }
        thread::sleep(READY_POLL);
    }
}
