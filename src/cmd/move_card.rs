//! Single drag gesture: `pipeline move <ID> <STAGE>`.

use anyhow::{Context, Result};

use pipeline::config::PipelineConfig;

use super::board::load_board;

pub async fn cmd_move(
    config: &PipelineConfig,
    id: &str,
    stage: &str,
    demo: bool,
    json: bool,
) -> Result<()> {
    let board = load_board(config, demo).await?;

    board.drag_start(id);
    let result = board.drag_end(id, Some(stage)).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    } else {
        println!("{}", pipeline::ui::render_result(&result));
    }
    Ok(())
}
