use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::AqMapError;
use crate::dashboard::{DashboardController, DisplayState, Selection};
use crate::map::{LayerKind, LayerToggle, LayerToggles};

#[derive(Serialize, Deserialize)]
pub struct ApiCity {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Omitted layer flags keep their default visibility
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub city: String,
    pub satellite: Option<bool>,
    pub stations: Option<bool>,
}

impl DashboardQuery {
    fn toggles(&self) -> LayerToggles {
        let requested: Vec<LayerToggle> = [
            (LayerKind::SatelliteOverlay, self.satellite),
            (LayerKind::GroundStationOverlay, self.stations),
        ]
        .into_iter()
        .filter_map(|(kind, visible)| visible.map(|visible| LayerToggle { kind, visible }))
        .collect();
        LayerToggles::from_toggles(&requested)
    }
}

pub fn router(dashboard: Arc<DashboardController>) -> Router {
    Router::new()
        .route("/cities", get(get_cities))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/current", get(get_current))
        .with_state(dashboard)
}

async fn get_cities(State(dashboard): State<Arc<DashboardController>>) -> Json<Vec<ApiCity>> {
    Json(
        dashboard
            .catalog()
            .cities()
            .iter()
            .map(|city| ApiCity {
                id: city.id.clone(),
                name: city.name.clone(),
                latitude: city.lat,
                longitude: city.lon,
            })
            .collect(),
    )
}

async fn get_dashboard(
    State(dashboard): State<Arc<DashboardController>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DisplayState>, (StatusCode, String)> {
    match dashboard
        .on_selection_changed(&query.city, query.toggles())
        .await
    {
        Ok(Selection::Applied(state)) => Ok(Json(state)),
        Ok(Selection::Superseded) => Err((
            StatusCode::CONFLICT,
            "Superseded by a newer selection".to_string(),
        )),
        Err(e) => Err((status_for(&e), e.user_message())),
    }
}

async fn get_current(State(dashboard): State<Arc<DashboardController>>) -> Response {
    match dashboard.current().await {
        Some(state) => Json(state).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

fn status_for(err: &AqMapError) -> StatusCode {
    match err {
        AqMapError::UnknownCity { .. } => StatusCode::NOT_FOUND,
        AqMapError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
