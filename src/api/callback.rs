use std::sync::Arc;

use axum::{Extension, http::Uri, response::Html};
use url::Url;

use crate::{
    error::Error,
    navigation::CallbackLocation,
    spotify::AuthFlow,
    success, warning,
};

pub struct CallbackState {
    pub flow: Arc<AuthFlow>,
    pub location: Arc<CallbackLocation>,
}

/// Records the return redirect and lets the auth flow pick up the code.
pub async fn callback(
    uri: Uri,
    Extension(state): Extension<Arc<CallbackState>>,
) -> Html<&'static str> {
    let Some(url) = return_url(&state.flow.config().redirect_uri, &uri) else {
        warning!("Callback received with an unparsable redirect URI");
        return Html("<h4>Invalid redirect URI configuration.</h4>");
    };
    state.location.record(url);

    match state.flow.resolve_token().await {
        Ok(_) => {
            success!("Authorization code exchanged.");
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>")
        }
        Err(Error::AuthorizationDenied { .. }) => Html("<h4>Authorization was denied.</h4>"),
        Err(Error::RedirectIssued) => {
            Html("<h4>Login could not be completed, a new authorization was started.</h4>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}

/// The configured redirect URI with the query string of the incoming request.
fn return_url(redirect_uri: &str, uri: &Uri) -> Option<Url> {
    let mut url = Url::parse(redirect_uri).ok()?;
    url.set_query(uri.query());
    Some(url)
}
