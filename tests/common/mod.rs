use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    Json, Router,
};
use serde_json::Value;

/// Requests seen by a fake maps provider.
#[derive(Default)]
pub struct Recorder {
    requests: Mutex<Vec<(String, HashMap<String, String>)>>,
}

impl Recorder {
    pub fn requests(&self) -> Vec<(String, HashMap<String, String>)> {
        self.requests.lock().unwrap().clone()
    }
}

struct Provider {
    recorder: Arc<Recorder>,
    responses: HashMap<&'static str, (StatusCode, Value)>,
}

async fn respond(
    State(provider): State<Arc<Provider>>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let path = uri.path().to_string();
    provider
        .recorder
        .requests
        .lock()
        .unwrap()
        .push((path.clone(), params));

    match provider.responses.get(path.as_str()) {
        Some((status, body)) => (*status, Json(body.clone())),
        None => (StatusCode::NOT_FOUND, Json(Value::Null)),
    }
}

/// Serve canned responses keyed by path on an ephemeral port.
/// Returns the base URL to hand to `MapsClient::new`.
pub async fn spawn_provider(
    responses: Vec<(&'static str, StatusCode, Value)>,
) -> (String, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let provider = Arc::new(Provider {
        recorder: recorder.clone(),
        responses: responses
            .into_iter()
            .map(|(path, status, body)| (path, (status, body)))
            .collect(),
    });

    let app = Router::new().fallback(respond).with_state(provider);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorder)
}
