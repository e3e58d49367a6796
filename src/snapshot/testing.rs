//! In-process live instance for tests.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tiny_http::{Response, Server};

/// tiny_http server answering every request through `handler(path)`.
///
/// Records the method of each request it receives. Stops on drop.
pub struct LiveServer {
    server: Arc<Server>,
    addr: SocketAddr,
    methods: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl LiveServer {
    pub fn start<H>(handler: H) -> Self
    where
        H: Fn(&str) -> (u16, String) + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let methods = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let methods = Arc::clone(&methods);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    methods.lock().push(request.method().to_string());
                    let path = request.url().split('?').next().unwrap_or("/").to_string();
                    let (status, body) = handler(&path);
                    let response = Response::from_string(body).with_status_code(status);
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            server,
            addr,
            methods,
            handle: Some(handle),
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().clone()
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A loopback port nothing is listening on.
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
