use std::sync::Arc;

use anyhow::Result;
use handlebars::Handlebars;

use crate::cache::FeedCache;
use crate::config::Config;
use crate::fetch::FeedClient;
use crate::template;

#[derive(Clone)]
pub struct State {
    pub cfg: Arc<Config>,
    pub feeds: Arc<FeedCache<FeedClient>>,
    pub template: Arc<Handlebars<'static>>,
}

impl State {
    pub fn new(cfg: Config) -> Result<Self> {
        let client = FeedClient::new(&cfg)?;
        let feeds = Arc::new(FeedCache::new(client, cfg.cache_ttl.into()));
        let cfg = Arc::new(cfg);
        let template = Arc::new(template::new()?);

        Ok(State {
            cfg,
            feeds,
            template,
        })
    }
}
