use log::info;
use std::env;

use recipe_search::config::load_config;
use recipe_search::server::{self, AppState};
use recipe_search::{search_with_config, SearchError, UiFilterState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config().map_err(SearchError::from)?;
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("serve") => {
            let state = AppState::from_config(&config);
            info!("Providers: {:?}", state.aggregator.provider_names());
            server::serve(state, &config).await?;
        }
        Some("search") => {
            let text = args[2..].join(" ");
            let filters = UiFilterState {
                search: text,
                ..Default::default()
            };
            let response = search_with_config(&config, &filters).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Some(other) => {
            return Err(format!(
                "Unknown command '{}'. Usage: recipe-search [serve | search <text>]",
                other
            )
            .into());
        }
    }

    Ok(())
}
