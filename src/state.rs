use crate::config::Settings;
use crate::render::Renderer;
use crate::repository::Store;
use std::sync::Arc;

/// Shared by every worker through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub renderer: Arc<dyn Renderer>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, renderer: Arc<dyn Renderer>, settings: Settings) -> Self {
        AppState {
            store,
            renderer,
            settings,
        }
    }
}
