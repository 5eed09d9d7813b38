use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::rc::Rc;

use anyhow::Context;
use tracing::info;

use crate::handlers::AsyncRequestHandler;
use crate::http::connection::AsyncHttpConnection;
use crate::net::connection::AsyncConnection;
use crate::net::listener::ListenerPollable;
use crate::net::socket::ConnectionConfig;
use crate::reactor::{Reactor, ReactorConfig};
use crate::server::handler::handle_connection;

/// A listening socket plus the handler every accepted connection is served with.
pub struct AsyncHttpServer {
    listener: Rc<TcpListener>,
    handler: Rc<dyn AsyncRequestHandler>,
    connection_config: ConnectionConfig,
    reactor_config: ReactorConfig,
}

impl AsyncHttpServer {
    /// Binds `addr` and switches the socket to non-blocking mode.
    pub fn bind(
        addr: impl ToSocketAddrs,
        handler: Rc<dyn AsyncRequestHandler>,
        connection_config: ConnectionConfig,
        reactor_config: ReactorConfig,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).context("binding listener failed")?;
        listener
            .set_nonblocking(true)
            .context("making listener non-blocking failed")?;

        Ok(Self {
            listener: Rc::new(listener),
            handler,
            connection_config,
            reactor_config,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener.local_addr().context("listener has no local address")
    }

    /// Registers the accept loop with `reactor`. Driving the reactor is up to
    /// the caller.
    pub fn listen(&self, reactor: &mut Reactor) {
        let handler = self.handler.clone();

        reactor.register(Box::new(ListenerPollable::new(
            self.listener.clone(),
            self.connection_config,
            Box::new(move |conn| {
                let conn: Rc<dyn AsyncConnection> = Rc::new(conn);
                handle_connection(AsyncHttpConnection::new(conn), handler.clone())
            }),
        )));
    }

    /// Serves forever on a fresh reactor. Only returns on a fatal error.
    pub fn serve(self) -> anyhow::Result<()> {
        let mut reactor = Reactor::new(self.reactor_config);
        self.listen(&mut reactor);
        info!(addr = %self.local_addr()?, "Listening");
        reactor.run()
    }
}
