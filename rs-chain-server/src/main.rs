use std::env;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use rs_chain_core::ChainError;
use rs_chain_core::io::list_files;
use rs_chain_core::model::generation_input::GenerationInput;
use rs_chain_core::model::generator::Generator;

/// Extension of the corpus files served from the data directory
const CORPUS_EXTENSION: &str = "txt";

/// Server settings, read from the environment.
///
/// - `CHAIN_BIND` (default `127.0.0.1`)
/// - `CHAIN_PORT` (default `5000`)
/// - `CHAIN_DATA_DIR` (default `./data`)
/// - `CHAIN_PREFIX_LENGTH` (default `2`), used when a load request has none
/// - `CHAIN_MAX_WORDS` (default `1000`), largest `max_words` a request may ask for
#[derive(Debug, Clone, PartialEq)]
struct ServerConfig {
	bind: String,
	port: u16,
	data_dir: PathBuf,
	prefix_length: usize,
	max_words: usize,
}

/// Words generated when a request gives no `max_words`
const DEFAULT_MAX_WORDS: usize = 50;

impl ServerConfig {
	fn from_env() -> Result<Self, String> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, String> {
		let port = match lookup("CHAIN_PORT") {
			Some(v) => v.parse().map_err(|_| format!("CHAIN_PORT must be a port number, got '{v}'"))?,
			None => 5000,
		};
		let prefix_length = match lookup("CHAIN_PREFIX_LENGTH") {
			Some(v) => match v.parse::<usize>() {
				Ok(n) if n >= 1 => n,
				_ => return Err(format!("CHAIN_PREFIX_LENGTH must be >= 1, got '{v}'")),
			},
			None => 2,
		};
		let max_words = match lookup("CHAIN_MAX_WORDS") {
			Some(v) => match v.parse::<usize>() {
				Ok(n) if n >= 1 => n,
				_ => return Err(format!("CHAIN_MAX_WORDS must be >= 1, got '{v}'")),
			},
			None => 1000,
		};
		Ok(Self {
			bind: lookup("CHAIN_BIND").unwrap_or_else(|| "127.0.0.1".to_owned()),
			port,
			data_dir: PathBuf::from(lookup("CHAIN_DATA_DIR").unwrap_or_else(|| "./data".to_owned())),
			prefix_length,
			max_words,
		})
	}
}

/// Query parameters of `/v1/generate`
#[derive(Deserialize)]
struct GenerateParams {
	max_words: Option<usize>,
	seed: Option<u64>,
	start: Option<String>,
	attempts: Option<usize>,
}

/// Query parameters of `/v1/load_corpora`
#[derive(Deserialize)]
struct LoadQuery {
	names: Option<String>,
	prefix_length: Option<usize>,
}

struct SharedData {
	config: ServerConfig,
	generator: Option<Generator>,
}

impl GenerateParams {
	/// Turns the query into generation parameters.
	///
	/// `max_words` above `limit` is rejected: a looping chain would otherwise
	/// walk for as long as asked while holding the model lock.
	fn generation_input(&self, limit: usize) -> Result<GenerationInput, String> {
		let max_words = self.max_words.unwrap_or(DEFAULT_MAX_WORDS.min(limit));
		if max_words > limit {
			return Err(format!("max_words must be <= {limit}, got {max_words}"));
		}
		let mut input = GenerationInput::new(max_words);
		if let Some(start) = &self.start {
			input.set_custom_seed(start).map_err(|e| e.to_string())?;
		}
		if let Some(attempts) = self.attempts {
			input.set_seed_attempts(attempts).map_err(|e| e.to_string())?;
		}
		Ok(input)
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Walks the loaded chain and returns the text as the response body.
/// A `seed` parameter makes the output reproducible.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let input = match query.generation_input(shared_data.config.max_words) {
		Ok(input) => input,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let Some(generator) = &shared_data.generator else {
		return HttpResponse::Conflict().body("No corpus loaded");
	};

	let result = match query.seed {
		Some(seed) => generator.generate(&mut StdRng::seed_from_u64(seed), &input),
		None => generator.generate(&mut rand::rng(), &input),
	};

	match result {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(e @ ChainError::NoSeed { .. }) => HttpResponse::NotFound().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.config.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match list_files(&data_dir, CORPUS_EXTENSION) {
		Ok(files) => {
			let suffix = format!(".{CORPUS_EXTENSION}");
			let names: Vec<&str> = files.iter().map(|f| f.strip_suffix(&suffix).unwrap_or(f.as_str())).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(e) => {
			error!("failed to list corpora in {}: {e}", data_dir.display());
			HttpResponse::InternalServerError().body("Failed to list corpora")
		}
	}
}

#[get("/v1/loaded_corpora")]
async fn get_loaded_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let names = shared_data
		.generator
		.as_ref()
		.map(|g| g.corpus_names().join("\n"))
		.unwrap_or_default();
	HttpResponse::Ok().body(names)
}

#[put("/v1/load_corpora")]
async fn put_corpora(data: web::Data<Mutex<SharedData>>, query: web::Query<LoadQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let mut paths = Vec::new();
	for name in query_names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
		if name.contains(['/', '\\']) || name.starts_with('.') {
			return HttpResponse::BadRequest().body(format!("Invalid corpus name: {name}"));
		}
		paths.push(shared_data.config.data_dir.join(format!("{name}.{CORPUS_EXTENSION}")));
	}

	let prefix_length = query.prefix_length.unwrap_or(shared_data.config.prefix_length);
	match Generator::from_files(&paths, prefix_length) {
		Ok(generator) => {
			shared_data.generator = Some(generator);
			HttpResponse::Ok().body("Corpora loaded successfully")
		}
		Err(e @ (ChainError::InvalidPrefixLength(_) | ChainError::NoCorpus(_))) => {
			HttpResponse::BadRequest().body(e.to_string())
		}
		Err(ChainError::Io(e)) if e.kind() == ErrorKind::NotFound => {
			HttpResponse::NotFound().body(format!("Unknown corpus: {e}"))
		}
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to load corpora: {e}")),
	}
}

fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_corpora)
		.service(put_corpora)
		.service(get_loaded_corpora);
}

/// Main entry point for the server.
///
/// Starts with no corpus loaded; clients pick corpora with
/// `PUT /v1/load_corpora`. The generator is shared behind a `Mutex`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = ServerConfig::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	info!("serving corpora from {} on {}:{}", config.data_dir.display(), config.bind, config.port);

	let address = (config.bind.clone(), config.port);
	let shared_data = web::Data::new(Mutex::new(SharedData { config, generator: None }));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(configure)
	})
		.bind(address)?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;
	use std::collections::HashMap;
	use std::fs;

	fn shared(dir: &std::path::Path) -> web::Data<Mutex<SharedData>> {
		let config = ServerConfig {
			bind: "127.0.0.1".to_owned(),
			port: 0,
			data_dir: dir.to_path_buf(),
			prefix_length: 2,
			max_words: 100,
		};
		web::Data::new(Mutex::new(SharedData { config, generator: None }))
	}

	fn data_dir() -> tempfile::TempDir {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("alice.txt"), "Alice was beginning to get very tired.").unwrap();
		fs::write(dir.path().join("lower.txt"), "nothing starts with a capital here.").unwrap();
		dir
	}

	#[::core::prelude::v1::test]
	fn config_defaults_and_overrides() {
		let config = ServerConfig::from_lookup(|_| None).unwrap();
		assert_eq!(config.port, 5000);
		assert_eq!(config.prefix_length, 2);
		assert_eq!(config.data_dir, PathBuf::from("./data"));
		assert_eq!(config.max_words, 1000);

		let vars: HashMap<&str, &str> =
			[("CHAIN_PORT", "8080"), ("CHAIN_PREFIX_LENGTH", "3"), ("CHAIN_MAX_WORDS", "200")].into();
		let config = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
		assert_eq!(config.port, 8080);
		assert_eq!(config.prefix_length, 3);
		assert_eq!(config.max_words, 200);

		assert!(ServerConfig::from_lookup(|k| (k == "CHAIN_MAX_WORDS").then(|| "0".to_owned())).is_err());

		assert!(ServerConfig::from_lookup(|k| (k == "CHAIN_PREFIX_LENGTH").then(|| "0".to_owned())).is_err());
		assert!(ServerConfig::from_lookup(|k| (k == "CHAIN_PORT").then(|| "port".to_owned())).is_err());
	}

	#[actix_web::test]
	async fn generate_before_load_is_a_conflict() {
		let dir = data_dir();
		let app = test::init_service(App::new().app_data(shared(dir.path())).configure(configure)).await;
		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::CONFLICT);
	}

	#[actix_web::test]
	async fn load_then_generate() {
		let dir = data_dir();
		let app = test::init_service(App::new().app_data(shared(dir.path())).configure(configure)).await;

		let req = test::TestRequest::put().uri("/v1/load_corpora?names=alice&prefix_length=3").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/v1/loaded_corpora").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, "alice");

		let req = test::TestRequest::get()
			.uri("/v1/generate?max_words=10&seed=4&start=Alice%20was%20beginning")
			.to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, "Alice was beginning to get very tired.");
	}

	#[actix_web::test]
	async fn seeded_requests_repeat() {
		let dir = data_dir();
		let app = test::init_service(App::new().app_data(shared(dir.path())).configure(configure)).await;
		let req = test::TestRequest::put().uri("/v1/load_corpora?names=alice").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let uri = "/v1/generate?max_words=20&seed=17";
		let first = test::call_and_read_body(&app, test::TestRequest::get().uri(uri).to_request()).await;
		let second = test::call_and_read_body(&app, test::TestRequest::get().uri(uri).to_request()).await;
		assert!(!first.is_empty());
		assert_eq!(first, second);
	}

	#[actix_web::test]
	async fn no_seed_is_not_found() {
		let dir = data_dir();
		let app = test::init_service(App::new().app_data(shared(dir.path())).configure(configure)).await;
		let req = test::TestRequest::put().uri("/v1/load_corpora?names=lower").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
	}

	#[actix_web::test]
	async fn bad_requests_are_rejected() {
		let dir = data_dir();
		let app = test::init_service(App::new().app_data(shared(dir.path())).configure(configure)).await;

		for uri in [
			"/v1/load_corpora",
			"/v1/load_corpora?names=../secret",
			"/v1/load_corpora?names=alice&prefix_length=0",
		] {
			let req = test::TestRequest::put().uri(uri).to_request();
			assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{uri}");
		}

		let req = test::TestRequest::put().uri("/v1/load_corpora?names=missing").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::get().uri("/v1/generate?attempts=0").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn word_budget_above_limit_is_rejected() {
		let dir = data_dir();
		let app = test::init_service(App::new().app_data(shared(dir.path())).configure(configure)).await;
		let req = test::TestRequest::put().uri("/v1/load_corpora?names=alice").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		for uri in ["/v1/generate?max_words=101", "/v1/generate?max_words=18446744073709551615"] {
			let req = test::TestRequest::get().uri(uri).to_request();
			assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{uri}");
		}

		let req = test::TestRequest::get().uri("/v1/generate?max_words=100&seed=1").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
	}

	#[actix_web::test]
	async fn lists_available_corpora() {
		let dir = data_dir();
		let app = test::init_service(App::new().app_data(shared(dir.path())).configure(configure)).await;
		let req = test::TestRequest::get().uri("/v1/corpora").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, "alice\nlower");
	}
}
