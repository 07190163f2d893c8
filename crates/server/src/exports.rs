//! Export endpoint: renders the caller's expenses into a downloadable file.

use api_types::export::ExportQuery;
use axum::{
    Extension,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use engine::{ExportFormat, ExportScope};

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
};

pub async fn export(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let format = match query.kind.as_deref() {
        Some(kind) => kind.parse::<ExportFormat>()?,
        None => ExportFormat::default(),
    };
    let scope = match (query.year, query.month) {
        (Some(year), Some(month)) => ExportScope::Month { year, month },
        (None, None) => ExportScope::All {
            generated_on: Utc::now().date_naive(),
        },
        _ => {
            return Err(ServerError::Generic(
                "year and month must be given together".to_string(),
            ));
        }
    };

    let report = state.engine.export_report(user_id, scope).await?;
    let rendered = format.renderer().render(&report)?;
    tracing::debug!(user_id = %user_id, file = %rendered.file_name, "rendered export");

    let disposition = format!("attachment; filename=\"{}\"", rendered.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, rendered.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.bytes,
    ))
}
