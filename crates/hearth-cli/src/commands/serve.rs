//! Server command implementation

use anyhow::Result;
use hearth_core::ReportConfig;
use hearth_server::ServerConfig;

pub async fn cmd_serve(config: ReportConfig, host: &str, port: u16) -> Result<()> {
    let server_config = ServerConfig::from_env();

    println!("🚀 Starting Hearth report server...");
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Page size: {} x {} pt",
        config.page.width, config.page.height
    );
    println!(
        "   Body limit: {} bytes (HEARTH_MAX_BODY_BYTES)",
        server_config.max_body_bytes
    );
    if server_config.allowed_origins.is_empty() {
        println!("   CORS: same-origin only");
    } else {
        println!(
            "   CORS: {} (HEARTH_ALLOWED_ORIGINS)",
            server_config.allowed_origins.join(", ")
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    hearth_server::serve(config, host, port, server_config).await?;

    Ok(())
}
