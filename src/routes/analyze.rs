use actix_web::{http::header, web, HttpResponse, Responder};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::config::Settings;
use crate::core::{
    parse_columns, run_analysis, to_csv_string, AnalysisError, AnalysisReport, AnalysisRequest,
    Collaborators, ExportError, LoggingSink,
};
use crate::models::{AnalyzeRequest, AnalyzeResponse, ErrorResponse, HealthResponse};
use crate::services::{CachedDetails, GooglePlacesClient, HttpProber};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub google: Arc<GooglePlacesClient>,
    pub details: Arc<CachedDetails<Arc<GooglePlacesClient>>>,
    pub prober: Arc<HttpProber>,
    pub settings: Arc<Settings>,
    /// Cancelled when the server shuts down; each run gets a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            geocoder: self.google.as_ref(),
            search: self.google.as_ref(),
            details: self.details.as_ref(),
            prober: self.prober.as_ref(),
        }
    }
}

/// Configure all analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/analyze", web::post().to(analyze))
        .route("/analyze/csv", web::post().to(analyze_csv));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.settings.google.api_key.is_empty() {
        "degraded"
    } else {
        "healthy"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Merge an API request with configured defaults
pub fn build_request(req: &AnalyzeRequest, settings: &Settings) -> Result<AnalysisRequest, AnalysisError> {
    let columns = parse_columns(req.columns.as_deref()).map_err(|e| match e {
        ExportError::NoColumns => AnalysisError::NoColumns,
        other => AnalysisError::InvalidInput(other.to_string()),
    })?;

    let mut request = AnalysisRequest::new(req.location.trim(), req.industry.trim());
    request.max_results = req
        .max_results
        .map(usize::from)
        .unwrap_or(settings.search.default_max_results)
        .min(settings.search.max_results_cap);
    request.grade_threshold = req.grade_threshold.unwrap_or(settings.search.grade_threshold);
    request.weights = req.weights.unwrap_or(settings.scoring.weights);
    request.review_criteria = settings.reviews;
    request.columns = columns;
    request.radius_m = settings.search.radius_m;
    request.max_distance_km = settings.search.max_distance_km;
    request.politeness_delay = settings.pipeline.politeness_delay();

    request.validate()?;
    Ok(request)
}

fn error_response(err: &AnalysisError) -> HttpResponse {
    match err {
        AnalysisError::Geocoding { .. } => HttpResponse::UnprocessableEntity().json(ErrorResponse {
            error: "geocoding_failed".to_string(),
            message: err.to_string(),
            status_code: 422,
        }),
        _ => HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_request".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
    }
}

/// Refuse to run when no Google Maps API key is configured
fn ensure_api_key(settings: &Settings) -> Result<(), HttpResponse> {
    if !settings.google.api_key.trim().is_empty() {
        return Ok(());
    }
    Err(HttpResponse::ServiceUnavailable().json(ErrorResponse {
        error: "missing_api_key".to_string(),
        message: "No Google Maps API key configured; set GOOGLE_MAPS_API_KEY".to_string(),
        status_code: 503,
    }))
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Validate, then run one analysis under a fresh run id
async fn execute(
    state: &AppState,
    req: &AnalyzeRequest,
) -> Result<(String, AnalysisRequest, AnalysisReport), HttpResponse> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for analyze request: field_errors={:?}", errors);
        return Err(validation_failed(errors));
    }

    ensure_api_key(&state.settings)?;

    let request = build_request(req, &state.settings).map_err(|e| {
        tracing::info!("Rejected analyze request: {}", e);
        error_response(&e)
    })?;

    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        "[{}] Analyzing '{}' near '{}' (max {}, threshold {})",
        run_id,
        request.industry,
        request.location,
        request.max_results,
        request.grade_threshold
    );

    let mut sink = LoggingSink::new(run_id.clone());
    let cancel = state.shutdown.child_token();

    match run_analysis(state.collaborators(), &request, &mut sink, &cancel).await {
        Ok(report) => Ok((run_id, request, report)),
        Err(e) => {
            tracing::error!("[{}] Analysis failed: {}", run_id, e);
            Err(error_response(&e))
        }
    }
}

/// Analyze endpoint
///
/// POST /api/v1/analyze
///
/// Request body:
/// ```json
/// {
///   "location": "Sydney, NSW",
///   "industry": "painter",
///   "maxResults": 10,
///   "gradeThreshold": 50,
///   "weights": { "rating": 20 }
/// }
/// ```
async fn analyze(state: web::Data<AppState>, req: web::Json<AnalyzeRequest>) -> impl Responder {
    let (run_id, _, analysis) = match execute(&state, &req).await {
        Ok(done) => done,
        Err(response) => return response,
    };

    let report = analysis.report;
    HttpResponse::Ok().json(AnalyzeResponse {
        run_id,
        base_location: analysis.base_location,
        fetched: analysis.fetched,
        unique: analysis.unique,
        skipped: report.skipped,
        discarded: report.discarded,
        cancelled: report.cancelled,
        businesses: report.rows,
    })
}

/// CSV export endpoint
///
/// POST /api/v1/analyze/csv
///
/// Same body as `/analyze`, plus an optional `columns` list of header labels.
async fn analyze_csv(state: web::Data<AppState>, req: web::Json<AnalyzeRequest>) -> impl Responder {
    let (run_id, request, analysis) = match execute(&state, &req).await {
        Ok(done) => done,
        Err(response) => return response,
    };

    match to_csv_string(&analysis.report.rows, &request.columns) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"businesses.csv\"",
            ))
            .insert_header(("X-Run-Id", run_id))
            .body(body),
        Err(e) => {
            tracing::error!("[{}] CSV export failed: {}", run_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "export_failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
