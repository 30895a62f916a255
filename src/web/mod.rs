mod server;

pub use server::{ProxyError, ProxyRequest, ProxyResponse, proxy_request, routes, run_server};
