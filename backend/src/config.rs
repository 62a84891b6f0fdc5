use log::warn;

pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:5050";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub page_size: usize,
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Reads `.env` if present, then `FEED_BIND_ADDR`, `FEED_PAGE_SIZE` and
    /// `FEED_MAX_PAGE_SIZE`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ServerConfig::default();
        let number = |key: &str, default: usize| match lookup(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => {
                    warn!("ignoring {}={:?}, using {}", key, raw, default);
                    default
                }
            },
        };

        let page_size = number("FEED_PAGE_SIZE", defaults.page_size);
        let max_page_size = number("FEED_MAX_PAGE_SIZE", defaults.max_page_size).max(page_size);

        ServerConfig {
            bind_addr: lookup("FEED_BIND_ADDR").unwrap_or(defaults.bind_addr),
            page_size,
            max_page_size,
        }
    }

    /// Items to serve for a request asking for `first`.
    pub fn page_size_for(&self, first: Option<u32>) -> usize {
        match first {
            None | Some(0) => self.page_size,
            Some(first) => (first as usize).min(self.max_page_size),
        }
    }
}
