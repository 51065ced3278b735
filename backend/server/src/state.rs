use std::sync::Arc;

use model::{Analyzer, ContactDesk};

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub analyzer: Analyzer,
    pub contact_desk: ContactDesk,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let analyzer = Analyzer::new(config.analysis_delay);
        let contact_desk = ContactDesk::new(config.contact_delay);

        Arc::new(Self {
            config,
            analyzer,
            contact_desk,
        })
    }
}
