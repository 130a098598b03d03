use std::net::SocketAddr;

// This main function is the entry point when running `cargo run -p web-server`.
// Its only job is to load configuration and call `run_server`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    web_server::run_server(addr, config).await
}
