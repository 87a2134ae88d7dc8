//! Bandobast duty deployment and tracking server.

mod api;
mod config;
mod error;
mod events;
mod main_lib;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    main_lib::start_server().await
}
