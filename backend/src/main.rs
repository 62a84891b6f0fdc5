extern crate chrono;
extern crate forum_feed_backend;
extern crate tokio;

use std::sync::{Arc, Mutex};

use forum_feed_backend::config::ServerConfig;
use forum_feed_backend::connection::{self, HandlerError};
use forum_feed_backend::feeds::Feeds;

#[tokio::main]
async fn main() -> Result<(), HandlerError> {
    forum_feed_backend::init_logger();
    let config = ServerConfig::from_env();
    let feeds = Arc::new(Mutex::new(Feeds::seeded(chrono::Utc::now())));

    connection::establish(config, feeds).await
}
