use helix_mcp_server::config::ServerConfig;
use helix_mcp_server::handlers::ToolContext;
use helix_mcp_server::server::McpServer;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("helix-mcp-server: configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        helix_admin_url = %config.helix.base_url,
        da_admin_url = %config.da.base_url,
        helix_token = if config.helix.token.is_some() { "configured" } else { "not configured" },
        da_token = if config.da.token.is_some() { "configured" } else { "not configured" },
        "starting helix-mcp-server"
    );

    let context = match ToolContext::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("helix-mcp-server: startup error: {e}");
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(context);
    if let Err(e) = server.run().await {
        eprintln!("helix-mcp-server: fatal error: {e}");
        std::process::exit(1);
    }
}
