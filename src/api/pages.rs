//! Server-rendered pages: the landing page and the collage builder.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, info, warn};

use super::{AppState, auth::RequireToken, tracks::ProxyError};
use crate::{
    collage::{
        self, CollageSettings, HtmlRenderer, RenderError, Renderer, SettingKind, SettingsQuery,
        UpstreamTrackSource,
    },
    spotify,
    utils,
    widget::WidgetError,
};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
    #[error("widget error: {0}")]
    Widget(#[from] WidgetError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!(error = %self, "page rendering failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    app_name: &'a str,
}

#[derive(Template)]
#[template(path = "create.html")]
struct CreateTemplate<'a> {
    app_name: &'a str,
    display_name: String,
    widgets: Vec<WidgetView>,
    collage: &'a str,
    export_href: String,
}

#[derive(Template)]
#[template(path = "relogin.html")]
struct ReloginTemplate<'a> {
    app_name: &'a str,
}

struct WidgetView {
    title: &'static str,
    container: String,
    buttons: Vec<ButtonView>,
}

struct ButtonView {
    id: String,
    label: String,
    css: String,
    href: String,
}

/// `GET /` - landing page.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let page = IndexTemplate {
        app_name: &state.config.app_name,
    }
    .render()?;
    Ok(Html(page))
}

/// `GET /create` - collage builder.
///
/// Greets the user by first name, renders the selection widgets from the
/// query string and draws the collage for the current selection.
pub async fn create(
    State(state): State<AppState>,
    RequireToken(token): RequireToken,
    Query(query): Query<SettingsQuery>,
) -> Result<Response, PageError> {
    let profile =
        match spotify::profile::get_profile(&state.http, &state.config.api_url, &token).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "profile fetch failed");
                return Ok(ProxyError::Upstream(e).into_response());
            }
        };

    let settings = CollageSettings::from_query(&query)?;
    let Some(renderer) = draw(&state, &token, &settings).await? else {
        return relogin(&state);
    };

    let page = CreateTemplate {
        app_name: &state.config.app_name,
        display_name: utils::first_name(profile.display_name.as_deref()),
        widgets: widget_views(&settings)?,
        collage: renderer.markup().unwrap_or_default(),
        export_href: format!("/create/export?{}", settings.query_string()),
    }
    .render()?;

    Ok(Html(page).into_response())
}

/// `GET /create/export` - the current collage as a downloadable HTML file.
pub async fn export(
    State(state): State<AppState>,
    RequireToken(token): RequireToken,
    Query(query): Query<SettingsQuery>,
) -> Result<Response, PageError> {
    let settings = CollageSettings::from_query(&query)?;
    let Some(renderer) = draw(&state, &token, &settings).await? else {
        return relogin(&state);
    };

    let export = renderer.export()?;
    info!(file_name = %export.file_name, "collage exported");
    Ok((
        [
            (CONTENT_TYPE, export.content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.bytes,
    )
        .into_response())
}

/// Runs the pipeline for `settings`. `None` means a page could not be
/// fetched and the user has to log in again.
async fn draw(
    state: &AppState,
    token: &str,
    settings: &CollageSettings,
) -> Result<Option<HtmlRenderer>, PageError> {
    let config = settings.config();
    let source = UpstreamTrackSource::new(state.http.clone(), state.config.api_url.as_str(), token);

    let collage = match collage::build_collage(&source, &config).await {
        Ok(collage) => collage,
        Err(e) => {
            warn!(error = %e, "collage generation aborted");
            return Ok(None);
        }
    };
    info!(
        size = config.size,
        sort_by = %config.sort_by,
        tracks = collage.tracks.len(),
        "collage generated"
    );

    let mut renderer = HtmlRenderer::new();
    renderer.draw_grid(&collage.grid).await?;
    Ok(Some(renderer))
}

fn relogin(state: &AppState) -> Result<Response, PageError> {
    let page = ReloginTemplate {
        app_name: &state.config.app_name,
    }
    .render()?;
    Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response())
}

fn widget_views(settings: &CollageSettings) -> Result<Vec<WidgetView>, WidgetError> {
    SettingKind::ALL
        .into_iter()
        .map(|kind| {
            let widget = settings.widget(kind);
            let buttons = widget
                .buttons()
                .iter()
                .map(|button| {
                    let next = settings.toggled(kind, button.index)?;
                    Ok(ButtonView {
                        id: button.id.clone(),
                        label: button.label.clone(),
                        css: widget.button_class(button),
                        href: format!("/create?{}", next.query_string()),
                    })
                })
                .collect::<Result<Vec<_>, WidgetError>>()?;

            Ok(WidgetView {
                title: kind.title(),
                container: widget.container().to_string(),
                buttons,
            })
        })
        .collect()
}
