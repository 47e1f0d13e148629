//! Grouped board view: `pipeline board`.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use pipeline::board::demo::demo_opportunities;
use pipeline::board::{
    GroupedOpportunities, KanbanBoard, OpportunityFilter, Selection, Temperature,
};
use pipeline::config::PipelineConfig;
use pipeline::gateway::{CachedGateway, HttpGateway, InMemoryGateway};
use pipeline::session::SessionStore;

use super::super::FilterArgs;

/// Board over the demo records, or over the configured backend after an
/// initial fetch.
pub async fn load_board(config: &PipelineConfig, demo: bool) -> Result<KanbanBoard> {
    if demo {
        return Ok(KanbanBoard::with_opportunities(
            Arc::new(InMemoryGateway::default()),
            demo_opportunities(Utc::now()),
        ));
    }

    let session = SessionStore::from_env_or_file(&config.session_path())?;
    let base_url = config.api_base_url();
    let http = HttpGateway::new(&base_url, config.request_timeout(), Arc::new(session))?;
    let gateway = CachedGateway::new(http, config.cache_stale_time());
    let board = KanbanBoard::new(Arc::new(gateway));
    board
        .reload()
        .await
        .with_context(|| format!("Failed to load opportunities from {}", base_url))?;
    Ok(board)
}

fn build_filter(args: &FilterArgs) -> Result<OpportunityFilter> {
    let temperatures = args
        .interest
        .iter()
        .map(|s| Temperature::from_str(s).map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;
    Ok(OpportunityFilter {
        services: Selection::from_values(args.services.clone()),
        temperatures: Selection::from_values(temperatures),
        max_days_open: args.days_open,
        max_closing_date: args.max_closing_date,
    })
}

pub async fn cmd_board(
    config: &PipelineConfig,
    demo: bool,
    json: bool,
    filters: &FilterArgs,
) -> Result<()> {
    let filter = build_filter(filters)?;
    let board = load_board(config, demo).await?;

    let grouped = board.grouped();
    let grouped = if filter.is_empty() {
        grouped
    } else {
        GroupedOpportunities::group(&filter.apply(&grouped.flatten(), Utc::now()))
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&grouped).context("Failed to serialize board")?
        );
    } else {
        println!();
        print!("{}", pipeline::ui::render_board(&grouped));
        println!();
    }
    Ok(())
}
