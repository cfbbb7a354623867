use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use wikiharvest_core::{
    AdvancedSearch, Analysis, AnalyzeKind, MainPage, PageComparison, PageDetails, RelatedPage, RelatedTopic,
    ReportKind, SearchHit, SearchOptions, SortMode, WikiClient, default_report_file_name,
};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, SharedState};

/// Images resolved per `/images` request.
const IMAGE_LIMIT: usize = 50;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/search", post(search))
        .route("/page/{page_id}", get(page))
        .route("/analyze", post(analyze))
        .route("/compare", post(compare))
        .route("/download/{filename}", get(download))
        .route("/categories/{page_id}", get(categories))
        .route("/images/{page_id}", get(images))
        .route("/related/{page_id}", get(related))
        .route("/advanced-search", get(advanced_search))
        .route("/topic-search", get(topic_search))
        .with_state(state)
}

fn check_range(name: &str, value: usize, min: usize, max: usize) -> ApiResult<()> {
    if value < min || value > max {
        return Err(ApiError::unprocessable(format!("{} must be between {} and {}", name, min, max)));
    }
    Ok(())
}

/// Build the report for `hits` and write it to the report directory.
///
/// Nothing is written when there are no hits.
async fn save_report(
    state: &AppState,
    client: &WikiClient,
    term: &str,
    hits: &[SearchHit],
    file_name: String,
) -> ApiResult<Option<String>> {
    if hits.is_empty() {
        return Ok(None);
    }
    let path = state.report_path(&file_name)?;
    client.save_report(term, hits, &path).await?;
    tracing::info!(path = %path.display(), results = hits.len(), "report written");
    Ok(Some(file_name))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Wikipedia API'ye hoş geldiniz!" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub language: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub min_words: usize,
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Report file name inside the report directory
    pub output_file: Option<String>,
}

fn default_search_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub search_term: String,
    pub results_count: usize,
    pub results: Vec<SearchHit>,
    pub output_file: Option<String>,
}

async fn search(
    State(state): State<SharedState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    check_range("limit", request.limit, 1, 50)?;
    let sort: SortMode = request.sort_by.as_deref().unwrap_or("relevance").parse()?;
    let client = state.client_for(request.language.as_deref())?;

    let options = SearchOptions::new(&request.query)
        .limit(request.limit)
        .offset(request.offset)
        .min_word_count(request.min_words)
        .categories(request.categories.unwrap_or_default())
        .sort(sort);
    let results = client.search(&options).await?;

    let file_name =
        request.output_file.unwrap_or_else(|| default_report_file_name(ReportKind::Search, &request.query));
    let output_file = save_report(&state, &client, &request.query, &results, file_name).await?;

    Ok(Json(SearchResponse { search_term: request.query, results_count: results.len(), results, output_file }))
}

async fn page(State(state): State<SharedState>, page_id: Result<Path<u64>, PathRejection>) -> ApiResult<Json<PageDetails>> {
    let Path(page_id) = page_id?;
    match state.client.page(page_id).await {
        Ok(details) => Ok(Json(details)),
        Err(wikiharvest_core::HarvestError::NoContent) => Err(ApiError::not_found("Sayfa bulunamadı")),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub page_id: u64,
    #[serde(default)]
    pub analyze_type: Option<String>,
}

async fn analyze(
    State(state): State<SharedState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<Analysis>> {
    let Json(request) = payload?;
    let kind: AnalyzeKind = request.analyze_type.as_deref().unwrap_or("summary").parse()?;
    let analysis = state.client.analyzer().analyze(request.page_id, kind).await?;
    Ok(Json(analysis))
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub page_id_1: u64,
    pub page_id_2: u64,
}

async fn compare(
    State(state): State<SharedState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult<Json<PageComparison>> {
    let Json(request) = payload?;
    Ok(Json(state.client.analyzer().compare(request.page_id_1, request.page_id_2).await))
}

async fn download(State(state): State<SharedState>, Path(filename): Path<String>) -> ApiResult<impl IntoResponse> {
    let path = state.report_path(&filename).map_err(|_| ApiError::not_found("Dosya bulunamadı"))?;
    let body = tokio::fs::read(&path).await.map_err(|_| ApiError::not_found("Dosya bulunamadı"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    ))
}

async fn categories(State(state): State<SharedState>, page_id: Result<Path<u64>, PathRejection>) -> ApiResult<Json<Vec<String>>> {
    let Path(page_id) = page_id?;
    Ok(Json(state.client.metadata().categories(page_id).await))
}

#[derive(Debug, Serialize)]
pub struct ImageLink {
    pub title: String,
    pub url: String,
}

async fn images(State(state): State<SharedState>, page_id: Result<Path<u64>, PathRejection>) -> ApiResult<Json<Vec<ImageLink>>> {
    let Path(page_id) = page_id?;
    let images = state.client.metadata().images_with_urls(page_id, IMAGE_LIMIT).await;
    Ok(Json(images.into_iter().filter_map(|image| image.url.map(|url| ImageLink { title: image.title, url })).collect()))
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<usize>,
}

async fn related(
    State(state): State<SharedState>,
    page_id: Result<Path<u64>, PathRejection>,
    query: Result<Query<RelatedQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<RelatedPage>>> {
    let Path(page_id) = page_id?;
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(5);
    check_range("limit", limit, 1, 20)?;
    Ok(Json(state.client.explorer().related_pages(page_id, limit).await))
}

#[derive(Debug, Deserialize)]
pub struct AdvancedQuery {
    pub query: String,
    pub language: Option<String>,
    pub exact_phrase: Option<String>,
    pub exclude_words: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub min_words: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AdvancedResponse {
    pub query: String,
    pub original_query: String,
    pub results_count: usize,
    pub results: Vec<SearchHit>,
    pub output_file: Option<String>,
}

async fn advanced_search(
    State(state): State<SharedState>,
    query: Result<Query<AdvancedQuery>, QueryRejection>,
) -> ApiResult<Json<AdvancedResponse>> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(10);
    check_range("limit", limit, 1, 50)?;
    let client = state.client_for(query.language.as_deref())?;

    let params = AdvancedSearch {
        query: query.query,
        exact_phrase: query.exact_phrase,
        exclude_words: query.exclude_words,
        date_start: query.date_start,
        date_end: query.date_end,
        category: query.category,
        min_word_count: query.min_words,
        limit,
    };
    let result = client.explorer().advanced_search(&params).await;

    let file_name = default_report_file_name(ReportKind::Advanced, &result.original_query);
    let output_file = save_report(&state, &client, &result.query, &result.hits, file_name).await?;

    Ok(Json(AdvancedResponse {
        results_count: result.hits.len(),
        query: result.query,
        original_query: result.original_query,
        results: result.hits,
        output_file,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TopicQuery {
    pub topic: String,
    pub depth: Option<u8>,
    pub language: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TopicResponse {
    pub topic: String,
    pub main_pages: Vec<MainPage>,
    pub related_topics: Vec<RelatedTopic>,
    pub output_file: Option<String>,
}

async fn topic_search(
    State(state): State<SharedState>,
    query: Result<Query<TopicQuery>, QueryRejection>,
) -> ApiResult<Json<TopicResponse>> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(5);
    check_range("limit", limit, 1, 10)?;
    let client = state.client_for(query.language.as_deref())?;

    let research = client.explorer().topic_research(&query.topic, query.depth.unwrap_or(2), limit).await?;

    let file_name = default_report_file_name(ReportKind::Topic, &research.topic);
    let output_file = save_report(&state, &client, &research.report_term(), &research.hits, file_name).await?;

    Ok(Json(TopicResponse {
        topic: research.topic,
        main_pages: research.main_pages,
        related_topics: research.related_topics,
        output_file,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wikiharvest_core::testing::MockTransport;
    use wikiharvest_core::{DisabledSummarizer, WikiConfig};

    fn app(transport: MockTransport, dir: &TempDir) -> Router {
        let client = WikiClient::with_parts(
            WikiConfig::builder().content_threshold(1).build().unwrap(),
            Arc::new(transport),
            Arc::new(DisabledSummarizer),
        )
        .unwrap();
        router(AppState::new(client, dir.path().to_path_buf()))
    }

    fn ankara() -> MockTransport {
        MockTransport::new()
            .on(&[("list", "search")], json!({"query": {"search": [{"pageid": 3474, "title": "Ankara", "snippet": "<span>Ankara</span>"}]}}))
            .on(
                &[("prop", "extracts")],
                json!({"query": {"pages": {"3474": {"pageid": 3474, "title": "Ankara", "extract": "Ankara Türkiye'nin başkentidir.\n\nEski bir şehir."}}}}),
            )
            .on(
                &[("prop", "info")],
                json!({"query": {"pages": {"3474": {"pageid": 3474, "title": "Ankara", "fullurl": "https://tr.wikipedia.org/wiki/Ankara"}}}}),
            )
            .on(&[("prop", "categories")], json!({"query": {"pages": {"3474": {"categories": [{"title": "Kategori:Başkentler"}]}}}}))
            .on(&[("prop", "images")], json!({"query": {"pages": {"3474": {"images": [{"title": "Dosya:Anıtkabir.jpg"}, {"title": "Dosya:Yok.svg"}]}}}}))
            .on(
                &[("prop", "imageinfo"), ("titles", "Dosya:Anıtkabir.jpg")],
                json!({"query": {"pages": {"1": {"imageinfo": [{"url": "https://upload.wikimedia.org/a.jpg"}]}}}}),
            )
            .on(&[("prop", "imageinfo")], json!({"query": {"pages": {"-1": {"missing": ""}}}}))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = send(app, Request::get(uri).body(Body::empty()).unwrap()).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(app: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get_json(app(MockTransport::new(), &dir), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("hoş geldiniz"));

        let (status, body) = get_json(app(MockTransport::new(), &dir), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_search_writes_downloadable_report() {
        let dir = TempDir::new().unwrap();

        let (status, body) =
            post_json(app(ankara(), &dir), "/search", json!({"query": "Ankara", "output_file": "ankara.txt"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["search_term"], "Ankara");
        assert_eq!(body["results_count"], 1);
        assert_eq!(body["results"][0]["pageid"], 3474);
        assert_eq!(body["results"][0]["categories"], json!(["Başkentler"]));
        assert_eq!(body["output_file"], "ankara.txt");
        assert!(dir.path().join("ankara.txt").exists());

        let (status, report) =
            send(app(ankara(), &dir), Request::get("/download/ankara.txt").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(report).unwrap().starts_with("ARAMA TERİMİ: Ankara\n"));
    }

    #[tokio::test]
    async fn test_search_without_results_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().on(&[("list", "search")], json!({"query": {"search": []}}));

        let (status, body) = post_json(app(transport, &dir), "/search", json!({"query": "zzzz"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results_count"], 0);
        assert_eq!(body["output_file"], Value::Null);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_search_validation() {
        let dir = TempDir::new().unwrap();

        let (status, body) = post_json(app(ankara(), &dir), "/search", json!({"query": "Ankara", "limit": 0})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("limit"));

        let (status, _) =
            post_json(app(ankara(), &dir), "/search", json!({"query": "Ankara", "sort_by": "random"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = post_json(
            app(ankara(), &dir),
            "/search",
            json!({"query": "Ankara", "output_file": "../escape.txt"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_malformed_input_uses_detail_body() {
        let dir = TempDir::new().unwrap();

        let (status, body) = post_json(app(ankara(), &dir), "/search", json!({"query": "Ankara", "limit": -1})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, body) = post_json(app(ankara(), &dir), "/search", json!({"query": "Ankara", "offset": -5})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, body) = get_json(app(ankara(), &dir), "/page/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let (status, body) = get_json(app(ankara(), &dir), "/topic-search?topic=Ankara&depth=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_page_found_and_missing() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get_json(app(ankara(), &dir), "/page/3474").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Ankara");
        assert_eq!(body["url"], "https://tr.wikipedia.org/wiki/Ankara");
        assert_eq!(body["word_count"], 6);

        let (status, body) = get_json(app(MockTransport::new(), &dir), "/page/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Sayfa bulunamadı"}));
    }

    #[tokio::test]
    async fn test_analyze() {
        let dir = TempDir::new().unwrap();

        let (status, body) =
            post_json(app(ankara(), &dir), "/analyze", json!({"page_id": 3474, "analyze_type": "all"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "Ankara Türkiye'nin başkentidir.");
        assert!(body["keywords"].is_array());

        let (status, _) =
            post_json(app(ankara(), &dir), "/analyze", json!({"page_id": 3474, "analyze_type": "sentiment"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = post_json(app(MockTransport::new(), &dir), "/analyze", json!({"page_id": 1})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "İçerik bulunamadı");
    }

    #[tokio::test]
    async fn test_images_only_with_urls() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get_json(app(ankara(), &dir), "/images/3474").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"title": "Dosya:Anıtkabir.jpg", "url": "https://upload.wikimedia.org/a.jpg"}]));
    }

    #[tokio::test]
    async fn test_categories() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get_json(app(ankara(), &dir), "/categories/3474").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["Başkentler"]));
    }

    #[tokio::test]
    async fn test_related_limit_bounds() {
        let dir = TempDir::new().unwrap();

        let (status, _) = get_json(app(ankara(), &dir), "/related/3474?limit=21").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = get_json(app(ankara(), &dir), "/related/3474?limit=0").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_download_rejects_unknown_and_traversal() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get_json(app(MockTransport::new(), &dir), "/download/missing.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Dosya bulunamadı");

        let (status, _) = get_json(app(MockTransport::new(), &dir), "/download/..%2FCargo.toml").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_topic_search_depth_validation() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get_json(app(ankara(), &dir), "/topic-search?topic=Ankara&depth=4").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("Depth"));
    }

    #[tokio::test]
    async fn test_advanced_search_builds_query() {
        let dir = TempDir::new().unwrap();
        let transport = ankara();

        let (status, body) =
            get_json(app(transport.clone(), &dir), "/advanced-search?query=Ankara&exclude_words=kale&category=ba%C5%9Fkent")
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "Ankara -kale");
        assert_eq!(body["original_query"], "Ankara");
        assert_eq!(body["results_count"], 1);
        assert!(body["output_file"].as_str().unwrap().starts_with("advanced_Ankara_"));
        assert_eq!(transport.calls()[0].param("srsearch"), Some("Ankara -kale"));
    }
}
