//! Local backend: `pipeline serve`.

use anyhow::Result;

use pipeline::config::PipelineConfig;
use pipeline::server::{ServerConfig, start_server};
use pipeline::session::{SessionStore, SessionTokens};

pub async fn cmd_serve(config: &PipelineConfig, port: u16, dev: bool, auth: bool) -> Result<()> {
    let auth = if auth {
        let token = uuid::Uuid::new_v4().to_string();
        let refresh_token = uuid::Uuid::new_v4().to_string();
        let session_path = config.session_path();
        SessionStore::load(&session_path)?.update(token.clone(), refresh_token.clone())?;
        println!("Session tokens written to {}", session_path.display());
        Some(SessionTokens {
            token: Some(token),
            refresh_token: Some(refresh_token),
        })
    } else {
        None
    };

    start_server(ServerConfig {
        port,
        dev_mode: dev,
        auth,
    })
    .await?;
    Ok(())
}
