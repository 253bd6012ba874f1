pub mod hooks;
pub mod http_server;
pub mod middleware;
