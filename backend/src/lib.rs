extern crate env_logger;
extern crate forum_feed_frontend;
extern crate log;
extern crate serde;
extern crate serde_json;

pub mod config;
pub mod connection;
pub mod feed_store;
pub mod feeds;

use std::io::Write;

/// Message-only log lines; safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::builder()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .try_init();
}
