use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::Router;
use clap::Parser;
use tower_http::services::ServeDir;

mod classifier;
mod handlers;
mod state;

use crate::classifier::HttpClassifier;
use crate::handlers::predict_handler;
use crate::state::AppState;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long)]
    public_dir: Option<PathBuf>,
    /// Classifier endpoint that receives forwarded `/predict` requests.
    #[arg(long, default_value = "http://127.0.0.1:5002/predict")]
    classifier_url: String,
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let classifier = match HttpClassifier::new(
        args.classifier_url,
        Duration::from_secs(args.timeout_secs),
    ) {
        Ok(classifier) => classifier,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };
    eprintln!("Forwarding predictions to {}", classifier.url());
    let state = AppState {
        classifier: Arc::new(classifier),
    };

    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));

    let app = Router::new()
        .route("/predict", post(predict_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .with_state(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("ShapeSketch running at http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server");
    axum::serve(listener, app).await.expect("Server crashed");
}
