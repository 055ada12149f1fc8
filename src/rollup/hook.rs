// Development autorebuild hook for axum routers

use crate::rollup::coordinator::Rollup;
use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;

impl Rollup {
    /// Install the autorebuild hook on `router`
    ///
    /// Outside production every request is checked before its handler runs: if
    /// the endpoint bound to the matched route names a registered bundle, the
    /// bundle is rebuilt when its inputs changed. In production the router is
    /// returned untouched.
    ///
    /// The hook is a route layer, so routes must be added before calling this.
    pub fn install(self: Arc<Self>, router: Router) -> Router {
        if self.is_production() {
            return router;
        }
        router.route_layer(middleware::from_fn_with_state(self, autobuild))
    }
}

/// Rebuild the bundle of the matched endpoint, then run the handler
pub async fn autobuild(
    State(rollup): State<Arc<Rollup>>,
    request: Request,
    next: Next,
) -> Response {
    let bundle = request
        .extensions()
        .get::<MatchedPath>()
        .and_then(|path| rollup.endpoint_for(path.as_str()))
        .filter(|endpoint| rollup.contains(endpoint))
        .map(str::to_string);

    let Some(name) = bundle else {
        return next.run(request).await;
    };

    let result = {
        let rollup = Arc::clone(&rollup);
        let name = name.clone();
        tokio::task::spawn_blocking(move || rollup.run_rollup(&name)).await
    };

    match result {
        Ok(Ok(_)) => next.run(request).await,
        Ok(Err(e)) => {
            tracing::error!("Rebuilding bundle '{}' failed: {}", name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Rebuilding bundle '{}' failed: {}", name, e),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Rebuild task for bundle '{}' died: {}", name, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
