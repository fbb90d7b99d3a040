#[cfg(test)]
pub mod helpers {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use crate::client::ApiError;
    use crate::config::Settings;
    use crate::models::{Curso, Docente, OfertaCurso};
    use crate::resource::{ListParams, Resource, ResourceApi, WritePolicy};

    pub fn init_tracing() {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .try_init()
            .ok();
    }

    /// Settings pointing at `api_url`, independent of the environment
    pub fn test_settings(api_url: &str) -> Settings {
        Settings {
            app_name: "FUNED Academia".to_string(),
            version: "test".to_string(),
            log_format: "text".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_timeout_ms: 5000,
            courses_path: "/cursos".to_string(),
            write_policy: WritePolicy::Optimistic,
            session_secret: "test-secret".to_string(),
            session_ttl_hours: 1,
            admin_roles: vec!["admin".to_string(), "administrador".to_string()],
        }
    }

    pub fn curso(id: i64, nombre: &str, tipo: &str) -> Curso {
        Curso {
            id,
            nombre_curso: nombre.to_string(),
            duracion: 40,
            temario: format!("Temario de {}", nombre),
            tipo_curso: tipo.to_string(),
        }
    }

    pub fn docente(id: i64, id_persona: i64, especialidad: &str) -> Docente {
        Docente {
            id,
            id_persona,
            especialidad: especialidad.to_string(),
            fecha_contratacion: "2024-02-01".to_string(),
            fecha_terminacion: None,
        }
    }

    pub fn oferta(id: i64, codigo: &str) -> OfertaCurso {
        OfertaCurso {
            id,
            codigo_curso: codigo.to_string(),
            id_curso: 1,
            id_docente: 12,
            fecha_inicio_curso: "2025-03-01".to_string(),
            fecha_fin_curso: "2025-06-30".to_string(),
            horario: "Lunes 8-12".to_string(),
            cupos: 20,
        }
    }

    // Fake REST backend

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: String,
        pub path: String,
        pub query: Option<String>,
        pub authorization: Option<String>,
        pub body: Option<Value>,
    }

    #[derive(Default)]
    struct BackendState {
        collections: HashMap<String, Vec<Value>>,
        fixtures: HashMap<(String, String), (u16, Value)>,
        failures: VecDeque<(u16, String)>,
        requests: Vec<RecordedRequest>,
        next_id: i64,
    }

    /// In-process REST backend on an ephemeral port. Any path is a
    /// collection; a trailing numeric segment addresses one record.
    pub struct FakeBackend {
        pub base_url: String,
        state: Arc<Mutex<BackendState>>,
    }

    impl FakeBackend {
        pub fn seed(&self, path: &str, records: Vec<Value>) {
            self.state
                .lock()
                .collections
                .insert(path.to_string(), records);
        }

        pub fn collection(&self, path: &str) -> Vec<Value> {
            self.state
                .lock()
                .collections
                .get(path)
                .cloned()
                .unwrap_or_default()
        }

        /// Answer `method path` with a fixed response
        pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
            self.state
                .lock()
                .fixtures
                .insert((method.to_string(), path.to_string()), (status, body));
        }

        /// Fail the next request with `status` and `{"message": message}`
        pub fn fail_next(&self, status: u16, message: &str) {
            self.state
                .lock()
                .failures
                .push_back((status, message.to_string()));
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.state.lock().requests.clone()
        }
    }

    pub async fn spawn_backend() -> FakeBackend {
        let state = Arc::new(Mutex::new(BackendState {
            next_id: 100,
            ..Default::default()
        }));

        let app = Router::new()
            .fallback(handle_backend)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeBackend {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Accepts connections and never answers them
    pub async fn spawn_silent_backend() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind silent backend");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        format!("http://{}", addr)
    }

    fn not_found() -> Response {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No encontrado" })),
        )
            .into_response()
    }

    fn record_id(record: &Value) -> Option<i64> {
        record
            .get("id")
            .or_else(|| record.get("idDocente"))
            .and_then(Value::as_i64)
    }

    async fn handle_backend(
        State(state): State<Arc<Mutex<BackendState>>>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let path = uri.path().to_string();
        let body: Option<Value> = serde_json::from_slice(&body).ok();

        let mut state = state.lock();
        state.requests.push(RecordedRequest {
            method: method.to_string(),
            path: path.clone(),
            query: uri.query().map(str::to_string),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: body.clone(),
        });

        if let Some((status, message)) = state.failures.pop_front() {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, Json(json!({ "message": message }))).into_response();
        }

        if let Some((status, fixture)) = state
            .fixtures
            .get(&(method.to_string(), path.clone()))
            .cloned()
        {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
            return (status, Json(fixture)).into_response();
        }

        let (collection, id) = match path.rsplit_once('/') {
            Some((prefix, last)) if !prefix.is_empty() => match last.parse::<i64>() {
                Ok(id) => (prefix.to_string(), Some(id)),
                Err(_) => (path.clone(), None),
            },
            _ => (path.clone(), None),
        };

        match (method, id) {
            (Method::GET, None) => {
                let records = state.collections.get(&collection).cloned().unwrap_or_default();
                Json(Value::Array(records)).into_response()
            }
            (Method::POST, None) => {
                state.next_id += 1;
                let mut record = body.unwrap_or_else(|| json!({}));
                record["id"] = json!(state.next_id);
                state
                    .collections
                    .entry(collection)
                    .or_default()
                    .push(record.clone());
                (StatusCode::CREATED, Json(record)).into_response()
            }
            (Method::GET, Some(id)) => state
                .collections
                .get(&collection)
                .and_then(|records| records.iter().find(|r| record_id(r) == Some(id)))
                .map(|record| Json(record.clone()).into_response())
                .unwrap_or_else(not_found),
            (Method::PUT, Some(id)) => {
                let records = state.collections.entry(collection).or_default();
                match records.iter_mut().find(|r| record_id(r) == Some(id)) {
                    Some(slot) => {
                        let mut record = body.unwrap_or_else(|| json!({}));
                        record["id"] = json!(id);
                        *slot = record.clone();
                        Json(record).into_response()
                    }
                    None => not_found(),
                }
            }
            (Method::DELETE, Some(id)) => {
                let records = state.collections.entry(collection).or_default();
                match records.iter().position(|r| record_id(r) == Some(id)) {
                    Some(index) => {
                        records.remove(index);
                        StatusCode::NO_CONTENT.into_response()
                    }
                    None => not_found(),
                }
            }
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    }

    // In-memory ResourceApi

    /// `ResourceApi` double that keeps records in memory and logs calls
    pub struct MockApi<R> {
        records: Mutex<Vec<R>>,
        calls: Mutex<Vec<String>>,
        failure: Mutex<Option<ApiError>>,
        next_id: AtomicI64,
    }

    impl<R: Resource> MockApi<R> {
        pub fn new() -> Self {
            Self::with_items(Vec::new())
        }

        pub fn with_items(items: Vec<R>) -> Self {
            MockApi {
                records: Mutex::new(items),
                calls: Mutex::new(Vec::new()),
                failure: Mutex::new(None),
                next_id: AtomicI64::new(101),
            }
        }

        pub fn fail_next(&self, err: ApiError) {
            *self.failure.lock() = Some(err);
        }

        /// Drop a record on the "server" only, as another admin would
        pub fn forget(&self, id: i64) {
            self.records.lock().retain(|r| r.id() != id);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        pub fn snapshot(&self) -> Vec<R> {
            self.records.lock().clone()
        }

        fn enter(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().push(call);
            match self.failure.lock().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn missing() -> ApiError {
            ApiError::Status {
                status: 404,
                message: Some("No encontrado".to_string()),
            }
        }

        fn materialize(id: i64, payload: &R::Payload) -> R {
            let mut value = serde_json::to_value(payload).expect("payload serializes");
            value["id"] = json!(id);
            serde_json::from_value(value).expect("payload maps back onto the record")
        }
    }

    impl<R: Resource> ResourceApi<R> for MockApi<R> {
        async fn list(&self, _params: &ListParams) -> Result<Vec<R>, ApiError> {
            self.enter("list".to_string())?;
            Ok(self.snapshot())
        }

        async fn get_by_id(&self, id: i64) -> Result<R, ApiError> {
            self.enter(format!("get {}", id))?;
            self.records
                .lock()
                .iter()
                .find(|r| r.id() == id)
                .cloned()
                .ok_or_else(Self::missing)
        }

        async fn create(&self, payload: &R::Payload) -> Result<R, ApiError> {
            self.enter("create".to_string())?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let record = Self::materialize(id, payload);
            self.records.lock().push(record.clone());
            Ok(record)
        }

        async fn update(&self, id: i64, payload: &R::Payload) -> Result<R, ApiError> {
            self.enter(format!("update {}", id))?;
            let mut records = self.records.lock();
            let slot = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(Self::missing)?;
            *slot = Self::materialize(id, payload);
            Ok(slot.clone())
        }

        async fn remove(&self, id: i64) -> Result<(), ApiError> {
            self.enter(format!("remove {}", id))?;
            let mut records = self.records.lock();
            let index = records
                .iter()
                .position(|r| r.id() == id)
                .ok_or_else(Self::missing)?;
            records.remove(index);
            Ok(())
        }
    }
}
