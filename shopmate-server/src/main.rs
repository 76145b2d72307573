use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use shopmate_core::config::Settings;
use shopmate_model::{ChatClient, ChatConfig};
use shopmate_search::{Indexer, SearchClient};
use shopmate_server::adapter::{ChannelAdapter, ChannelCredentials};
use shopmate_server::dialog::ProductDialog;
use shopmate_server::server::{AppState, ServerConfig, run_server};
use shopmate_server::state::{ConversationState, MemoryStorage, UserState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env().context("failed to load configuration")?;

    if settings.index_refresh_enabled {
        info!("loading and indexing catalog");
        let report = Indexer::new(&settings).run().await.context("catalog indexing failed")?;
        info!(documents = report.documents, created = report.index_created, "catalog indexed");
    }

    let search = Arc::new(SearchClient::new(&settings.search, &settings.openai));
    let chat = Arc::new(
        ChatClient::new(ChatConfig::from(&settings.openai))
            .context("failed to build chat client")?,
    );

    let storage = MemoryStorage::new();
    let conversation_state = ConversationState::new(storage.clone());
    let user_state = UserState::new(storage);

    let dialog = Arc::new(ProductDialog::new(search, chat, conversation_state));
    let adapter = Arc::new(ChannelAdapter::new(ChannelCredentials::from_settings(&settings.channel)));

    let state = AppState { adapter, dialog, user_state };
    let config = ServerConfig { port: settings.port, ..ServerConfig::default() };
    run_server(config, state).await
}
