use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use rs_phrase_core::io::normalize_folder;
use rs_phrase_core::{EngineConfig, Error, Overrides, PhraseEngine};

mod config;

use config::ServerConfig;

/// Query parameters of `GET /v1/generate` and `GET /v1/count`.
#[derive(Deserialize)]
struct QueryParams {
	query: Option<String>,
}

/// JSON body of `POST /v1/generate`.
#[derive(Deserialize)]
struct GenerateBody {
	query: String,
	#[serde(default)]
	overrides: Overrides,
}

#[derive(Deserialize)]
struct ReloadParams {
	root: Option<String>,
}

/// State shared between workers.
///
/// The engine is replaced wholesale on reload, never edited in place.
struct SharedData {
	engine: PhraseEngine,
	root: PathBuf,
	engine_config: EngineConfig,
}

impl QueryParams {
	fn query(&self) -> Result<&str, HttpResponse> {
		match &self.query {
			Some(q) if !q.trim().is_empty() => Ok(q),
			_ => Err(HttpResponse::BadRequest().body("Missing or empty query")),
		}
	}
}

/// Maps an engine error to an HTTP response.
fn error_response(error: &Error) -> HttpResponse {
	match error {
		Error::Input(_) | Error::BracketResolution { .. } => HttpResponse::BadRequest().body(error.to_string()),
		Error::GrammarLoading { .. } => HttpResponse::UnprocessableEntity().body(error.to_string()),
		Error::Internal(_) => HttpResponse::InternalServerError().body(error.to_string()),
	}
}

fn lock_failed() -> HttpResponse {
	HttpResponse::InternalServerError().body("Engine lock failed")
}

/// HTTP GET endpoint `/v1/generate`
///
/// Expands the `query` parameter and returns the phrase as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, params: web::Query<QueryParams>) -> impl Responder {
	let query = match params.query() {
		Ok(q) => q,
		Err(response) => return response,
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return lock_failed(),
	};

	match shared_data.engine.parse(query) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e) => error_response(&e),
	}
}

/// HTTP POST endpoint `/v1/generate`
///
/// Same as the GET variant, with forced category values in the body.
#[post("/v1/generate")]
async fn post_generated(data: web::Data<Mutex<SharedData>>, body: web::Json<GenerateBody>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return lock_failed(),
	};

	match shared_data.engine.parse_with(&body.query, &body.overrides) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/count")]
async fn get_count(data: web::Data<Mutex<SharedData>>, params: web::Query<QueryParams>) -> impl Responder {
	let query = match params.query() {
		Ok(q) => q,
		Err(response) => return response,
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return lock_failed(),
	};

	match shared_data.engine.count_options(query) {
		Ok(range) => HttpResponse::Ok().json(range),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/validate")]
async fn get_validation(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return lock_failed(),
	};

	let findings: Vec<String> = shared_data.engine.validate().iter().map(ToString::to_string).collect();
	HttpResponse::Ok().json(findings)
}

#[get("/v1/categories")]
async fn get_categories(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return lock_failed(),
	};
	HttpResponse::Ok().body(shared_data.engine.grammar().names().collect::<Vec<_>>().join("\n"))
}

#[get("/v1/grammar")]
async fn get_grammar(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return lock_failed(),
	};
	HttpResponse::Ok().json(shared_data.engine.grammar())
}

/// HTTP PUT endpoint `/v1/reload`
///
/// Builds a new engine from a manifest directory (the `root` parameter,
/// or the configured one) and swaps it in. On failure the current engine
/// stays in place.
#[put("/v1/reload")]
async fn put_reload(data: web::Data<Mutex<SharedData>>, params: web::Query<ReloadParams>) -> impl Responder {
	let (root, engine_config) = match data.lock() {
		Ok(m) => (
			params.root.as_deref().map(normalize_folder).unwrap_or_else(|| m.root.clone()),
			m.engine_config.clone(),
		),
		Err(_) => return lock_failed(),
	};

	let engine = match PhraseEngine::from_manifest(&root, engine_config) {
		Ok(engine) => engine,
		Err(e) => return error_response(&e),
	};
	let categories = engine.grammar().len();

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return lock_failed(),
	};
	shared_data.engine = engine;
	shared_data.root = root;
	log::info!("Reloaded {categories} categories from {}", shared_data.root.display());

	HttpResponse::Ok().body(format!("Loaded {categories} categories"))
}

/// HTTP PUT endpoint `/v1/grammar`
///
/// Replaces the grammar with the JSON mapping in the body.
#[put("/v1/grammar")]
async fn put_grammar(data: web::Data<Mutex<SharedData>>, body: web::Json<HashMap<String, Vec<String>>>) -> impl Responder {
	let engine_config = match data.lock() {
		Ok(m) => m.engine_config.clone(),
		Err(_) => return lock_failed(),
	};

	let mut engine = PhraseEngine::with_config(engine_config);
	if let Err(e) = engine.load_mapping(body.into_inner()) {
		return error_response(&e);
	}
	let categories = engine.grammar().len();

	match data.lock() {
		Ok(mut m) => m.engine = engine,
		Err(_) => return lock_failed(),
	}

	HttpResponse::Ok().body(format!("Loaded {categories} categories"))
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(post_generated)
		.service(get_count)
		.service(get_validation)
		.service(get_categories)
		.service(get_grammar)
		.service(put_reload)
		.service(put_grammar);
}

/// Main entry point for the server.
///
/// Loads the grammar directory, wraps the engine in a `Mutex` and starts
/// an Actix-web HTTP server.
///
/// # Notes
/// - Settings come from `RS_PHRASE_*` environment variables (see `ServerConfig`).
/// - A grammar that fails to load is reported and the server starts empty;
///   `PUT /v1/reload` can then be used once the files are fixed.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = ServerConfig::from_env()
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

	let engine = match PhraseEngine::from_manifest(&config.root, config.engine.clone()) {
		Ok(engine) => {
			log::info!("Loaded {} categories from {}", engine.grammar().len(), config.root.display());
			engine
		}
		Err(e) => {
			log::error!("{e}");
			PhraseEngine::with_config(config.engine.clone())
		}
	};

	let shared_data = web::Data::new(Mutex::new(SharedData {
		engine,
		root: config.root.clone(),
		engine_config: config.engine.clone(),
	}));

	log::info!("Listening on {} with {} workers", config.bind, config.workers);
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(routes)
	})
		.workers(config.workers)
		.bind(config.bind.as_str())?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;
	use serde::Serialize;

	#[derive(Serialize)]
	struct GenerateRequest<'a> {
		query: &'a str,
		overrides: HashMap<&'a str, &'a str>,
	}

	fn shared(text: &str) -> web::Data<Mutex<SharedData>> {
		let mut engine = PhraseEngine::with_seed(1);
		engine.load_text(text, None).unwrap();
		web::Data::new(Mutex::new(SharedData {
			engine,
			root: PathBuf::from("./data"),
			engine_config: EngineConfig::default(),
		}))
	}

	#[actix_web::test]
	async fn generate_expands_query() {
		let app = test::init_service(App::new().app_data(shared("*animal\nowl")).configure(routes)).await;
		let req = test::TestRequest::get().uri("/v1/generate?query=%5Ba%5D%20%5Banimal%5D").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "an owl");
	}

	#[actix_web::test]
	async fn generate_rejects_unknown_terms() {
		let app = test::init_service(App::new().app_data(shared("*animal\nowl")).configure(routes)).await;
		let req = test::TestRequest::get().uri("/v1/generate?query=%5Bpony%5D").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn runaway_grammar_is_a_bad_request() {
		let app = test::init_service(
			App::new().app_data(shared("*recursion\n[recursion] and [recursion]")).configure(routes),
		)
		.await;
		let req = test::TestRequest::get().uri("/v1/generate?query=%5Brecursion%5D").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn generate_requires_a_query() {
		let app = test::init_service(App::new().app_data(shared("*animal\nowl")).configure(routes)).await;
		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn post_generate_uses_overrides() {
		let app = test::init_service(App::new().app_data(shared("*animal\nowl\ncat")).configure(routes)).await;
		let req = test::TestRequest::post()
			.uri("/v1/generate")
			.set_json(GenerateRequest {
				query: "the [animal]",
				overrides: HashMap::from([("animal", "eagle")]),
			})
			.to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "the eagle");
	}

	#[actix_web::test]
	async fn count_returns_bounds() {
		let app = test::init_service(App::new().app_data(shared("*animal\nowl\ncat\ndog")).configure(routes)).await;
		let req = test::TestRequest::get().uri("/v1/count?query=%5Banimal%5D%20%5Bbig%2Fsmall%5D").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, r#"{"lower_bound":3,"upper_bound":6}"#);
	}

	#[actix_web::test]
	async fn validate_lists_findings() {
		let app = test::init_service(App::new().app_data(shared("*phrase\n[nope]")).configure(routes)).await;
		let req = test::TestRequest::get().uri("/v1/validate").to_request();
		let findings: Vec<String> = test::call_and_read_body_json(&app, req).await;
		assert_eq!(findings.len(), 1);
		assert!(findings[0].contains("[nope]"));
	}

	#[actix_web::test]
	async fn put_grammar_swaps_engine() {
		let data = shared("*animal\nowl");
		let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;
		let req = test::TestRequest::put()
			.uri("/v1/grammar")
			.set_json(HashMap::from([("fruit".to_owned(), vec!["apple".to_owned()])]))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/v1/categories").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "fruit");
	}

	#[actix_web::test]
	async fn failed_reload_keeps_current_engine() {
		let data = shared("*animal\nowl");
		let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;
		let req = test::TestRequest::put().uri("/v1/reload?root=%2Fdefinitely%2Fnot%2Fhere").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

		let req = test::TestRequest::get().uri("/v1/categories").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "animal");
	}
}
