use anyhow::Context;
use axum::extract::{Path, RawQuery, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Result};
use serde::Serialize;
use tracing::debug;

use crate::query::{CardOptions, CardParams, DEFAULT_COUNT};
use crate::render;
use crate::server::convert_errors;
use crate::state::State as AppState;
use crate::template::Template;
use crate::theme::{Theme, ThemeColors};

use super::responses::{CardError, MovedToIndex};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    #[derive(Serialize, Debug, Clone)]
    struct ThemeDescription {
        name: &'static str,
        colors: &'static ThemeColors,
    }

    #[derive(Serialize, Debug, Clone)]
    struct Context {
        version: &'static str,
        card_path: String,
        default_count: usize,
        default_theme: &'static str,
        themes: Vec<ThemeDescription>,
    }

    convert_errors(async move {
        let themes = Theme::ALL
            .into_iter()
            .map(|theme| ThemeDescription {
                name: theme.as_str(),
                colors: theme.colors(),
            })
            .collect();
        let ctx = Context {
            version: env!("CARGO_PKG_VERSION"),
            card_path: "/medium/user/<username>?theme=nord&count=3".into(),
            default_count: DEFAULT_COUNT,
            default_theme: state.cfg.default_theme.as_str(),
            themes,
        };
        let html = state
            .template
            .render(Template::Index.as_str(), &ctx)
            .context("could not render the HTML template")?;

        Ok(Html(html))
    })
    .await
}

pub async fn medium_card(
    State(state): State<AppState>,
    Path(username): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, CardError> {
    let params = CardParams::from_query(query.as_deref());
    let options = CardOptions::from_params(&params, state.cfg.default_theme);
    debug!(%username, ?options, "Card requested");

    let feed = match state.feeds.resolve(&username).await {
        Ok(feed) => feed,
        Err(error) => return Err(CardError::Fetch { username, error }),
    };

    let svg = match render::render(&state.template, &feed, &options) {
        Ok(svg) => svg,
        Err(error) => return Err(CardError::Render { username, error }),
    };

    let cache_control = format!("public, max-age={}", state.cfg.cache_ttl.as_secs());

    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_owned()),
            (header::CACHE_CONTROL, cache_control),
        ],
        svg,
    ))
}

pub async fn fallback() -> MovedToIndex {
    MovedToIndex
}
