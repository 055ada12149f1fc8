// Template-facing bundle lookup

use crate::rollup::{coordinator::Rollup, error::RollupError};
use std::sync::Arc;

/// Name under which the lookup is registered with template engines
pub const TEMPLATE_GLOBAL_NAME: &str = "jsbundle";

/// Clonable `jsbundle(name)` function for template engines
///
/// Returns the url of the bundle's generated module, or fails if the bundle has
/// never been built so that broken pages are not rendered silently.
#[derive(Debug, Clone)]
pub struct JsBundle {
    rollup: Arc<Rollup>,
}

impl JsBundle {
    pub fn new(rollup: Arc<Rollup>) -> Self {
        Self { rollup }
    }

    pub fn name(&self) -> &'static str {
        TEMPLATE_GLOBAL_NAME
    }

    pub fn call(&self, name: &str) -> Result<String, RollupError> {
        self.rollup.jsbundle(name)
    }
}

impl Rollup {
    /// Template function resolving bundle names to urls
    pub fn template_global(self: &Arc<Self>) -> JsBundle {
        JsBundle::new(Arc::clone(self))
    }
}
