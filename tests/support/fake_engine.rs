// ABOUTME: Minimal in-process Docker Engine HTTP API for integration tests.
// ABOUTME: Keeps images and containers in memory and enforces name and removal rules.

use parking_lot::Mutex;
use redis_engine::config::{EndpointTemplate, PoolConfig};
use redis_engine::{EngineGateway, TransportPool};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use tokio::net::{TcpListener, TcpStream};

/// Address the fake listens on; use it as the host address.
pub const HOST: &str = "127.0.0.1";

/// Image present before any pull. Tagged twice on purpose.
pub const SEEDED_IMAGE_ID: &str = "sha256:7a1f0c0ffee";

#[derive(Debug, Clone)]
struct FakeImage {
    id: String,
    repo_tags: Vec<String>,
}

#[derive(Debug, Clone)]
struct FakeContainer {
    id: String,
    name: String,
    image: String,
    cmd: Vec<String>,
    network_mode: Option<String>,
    binds: Vec<String>,
    status: &'static str,
}

#[derive(Debug, Default)]
struct EngineState {
    images: Vec<FakeImage>,
    containers: Vec<FakeContainer>,
    next_id: u64,
    fail_next_start: bool,
    requests: Vec<String>,
}

struct Reply {
    status: u16,
    body: Option<String>,
}

impl Reply {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body.to_string()),
        }
    }

    fn raw(status: u16, body: String) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "message": message.into() }))
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }
}

/// Fake engine bound to an ephemeral port on localhost.
pub struct FakeEngine {
    addr: SocketAddr,
    state: Arc<Mutex<EngineState>>,
}

impl FakeEngine {
    pub async fn start() -> Self {
        let listener = TcpListener::bind((HOST, 0))
            .await
            .expect("bind fake engine");
        let addr = listener.local_addr().expect("local addr");

        let state = Arc::new(Mutex::new(EngineState {
            images: vec![
                FakeImage {
                    id: SEEDED_IMAGE_ID.to_string(),
                    repo_tags: vec!["redis:7.2".to_string(), "redis:latest".to_string()],
                },
                FakeImage {
                    id: "sha256:dangling".to_string(),
                    repo_tags: vec!["<none>:<none>".to_string()],
                },
            ],
            ..Default::default()
        }));

        let accept_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve_connection(stream, Arc::clone(&accept_state)));
            }
        });

        Self { addr, state }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Template that points every host address at this fake's port.
    pub fn endpoint(&self) -> EndpointTemplate {
        EndpointTemplate::parse(&format!("http://{{host}}:{}", self.port())).unwrap()
    }

    pub fn gateway(&self) -> EngineGateway {
        EngineGateway::new(self.endpoint(), Arc::new(TransportPool::new(test_pool())))
    }

    /// Make the next start request fail with a 500.
    pub fn fail_next_start(&self) {
        self.state.lock().fail_next_start = true;
    }

    pub fn container_count(&self) -> usize {
        self.state.lock().containers.len()
    }

    pub fn image_count(&self) -> usize {
        self.state
            .lock()
            .images
            .iter()
            .filter(|i| i.repo_tags.iter().any(|t| t != "<none>:<none>"))
            .count()
    }

    /// Requests seen so far as `METHOD /path` without the API version prefix.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }
}

pub fn test_pool() -> PoolConfig {
    PoolConfig {
        max_total_connections: 16,
        max_per_route_connections: 4,
        connect_timeout: Duration::from_secs(2),
        read_timeout: Duration::from_secs(5),
    }
}

async fn serve_connection(stream: TcpStream, state: Arc<Mutex<EngineState>>) {
    let service = service_fn(move |req: Request<Incoming>| {
        let state = Arc::clone(&state);
        async move {
            let method = req.method().to_string();
            let target = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_default();
            let body = match req.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(_) => Bytes::new(),
            };

            let reply = state.lock().handle(&method, &target, &body);
            Ok::<_, Infallible>(reply.into_response())
        }
    });

    if let Err(e) = http1::Builder::new()
        .serve_connection(TokioIo::new(stream), service)
        .await
    {
        tracing::debug!("fake engine connection error: {}", e);
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(&value.replace('+', " ")).ok()?.into_owned();
            Some((key.to_string(), value))
        })
        .collect()
}

/// Docker-style reference matching: without a tag, any tag of the repository.
fn reference_matches(filter: &str, repo_tag: &str) -> bool {
    if repo_tag == "<none>:<none>" {
        return false;
    }
    let has_tag = filter
        .rsplit_once(':')
        .is_some_and(|(_, tag)| !tag.contains('/'));
    if has_tag {
        filter == repo_tag
    } else {
        repo_tag
            .rsplit_once(':')
            .is_some_and(|(repo, _)| repo == filter)
    }
}

impl EngineState {
    fn handle(&mut self, method: &str, target: &str, body: &[u8]) -> Reply {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let query = parse_query(query);

        let mut segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if segments
            .first()
            .is_some_and(|s| s.starts_with('v') && s[1..].starts_with(|c: char| c.is_ascii_digit()))
        {
            segments.remove(0);
        }
        self.requests
            .push(format!("{} /{}", method, segments.join("/")));

        match (method, segments.as_slice()) {
            ("GET", ["_ping"]) | ("HEAD", ["_ping"]) => Reply::raw(200, "OK".to_string()),
            ("GET", ["info"]) => self.info(),
            ("GET", ["images", "search"]) => self.search(&query),
            ("GET", ["images", "json"]) => self.list_images(&query),
            ("POST", ["images", "create"]) => self.pull(&query),
            ("POST", ["containers", "create"]) => self.create(&query, body),
            ("POST", ["containers", id, "start"]) => self.start(id),
            ("POST", ["containers", id, "restart"]) => self.restart(id),
            ("POST", ["containers", id, "stop"]) => self.stop(id),
            ("DELETE", ["containers", id]) => self.remove(id),
            ("GET", ["containers", id, "json"]) => self.inspect(id),
            _ => Reply::error(404, format!("page not found: {} {}", method, path)),
        }
    }

    fn info(&self) -> Reply {
        let running = self
            .containers
            .iter()
            .filter(|c| c.status == "running")
            .count();
        Reply::json(
            200,
            json!({
                "ID": "FAKE:ENGINE",
                "Name": "redis-host-01",
                "ServerVersion": "27.3.1",
                "OperatingSystem": "Fake Linux",
                "Architecture": "x86_64",
                "NCPU": 8,
                "MemTotal": 17179869184i64,
                "Containers": self.containers.len(),
                "ContainersRunning": running,
                "ContainersPaused": 0,
                "ContainersStopped": self.containers.len() - running,
                "Images": self.images.len(),
            }),
        )
    }

    fn search(&self, query: &HashMap<String, String>) -> Reply {
        let term = query.get("term").cloned().unwrap_or_default();
        let catalog = ["redis", "bitnami/redis", "redis/redis-stack", "nginx"];
        let items: Vec<Value> = catalog
            .iter()
            .filter(|name| !term.is_empty() && name.contains(term.as_str()))
            .map(|name| {
                json!({
                    "name": name,
                    "description": "",
                    "star_count": 1,
                    "is_official": *name == "redis",
                    "is_automated": false,
                })
            })
            .collect();
        Reply::json(200, Value::Array(items))
    }

    fn list_images(&self, query: &HashMap<String, String>) -> Reply {
        let references: Vec<String> = query
            .get("filters")
            .and_then(|f| serde_json::from_str::<HashMap<String, Vec<String>>>(f).ok())
            .and_then(|mut f| f.remove("reference"))
            .unwrap_or_default();

        let images: Vec<Value> = self
            .images
            .iter()
            .filter(|image| {
                references.is_empty()
                    || image
                        .repo_tags
                        .iter()
                        .any(|tag| references.iter().any(|r| reference_matches(r, tag)))
            })
            .map(|image| {
                json!({
                    "Id": image.id,
                    "ParentId": "",
                    "RepoTags": image.repo_tags,
                    "RepoDigests": [],
                    "Created": 1700000000,
                    "Size": 1024,
                    "SharedSize": -1,
                    "VirtualSize": 1024,
                    "Labels": {},
                    "Containers": -1,
                })
            })
            .collect();
        Reply::json(200, Value::Array(images))
    }

    fn pull(&mut self, query: &HashMap<String, String>) -> Reply {
        let repository = query.get("fromImage").cloned().unwrap_or_default();
        if repository.is_empty() || repository.starts_with("does-not-exist") {
            return Reply::error(
                404,
                format!("pull access denied for {}, repository does not exist", repository),
            );
        }
        let tag = query
            .get("tag")
            .filter(|t| !t.is_empty())
            .cloned()
            .unwrap_or_else(|| "latest".to_string());
        let reference = format!("{}:{}", repository, tag);

        if !self.images.iter().any(|i| i.repo_tags.contains(&reference)) {
            self.next_id += 1;
            self.images.push(FakeImage {
                id: format!("sha256:pulled{:04}", self.next_id),
                repo_tags: vec![reference.clone()],
            });
        }

        let progress = [
            json!({ "status": format!("Pulling from library/{}", repository), "id": tag }),
            json!({ "status": "Pull complete", "id": "layer0" }),
            json!({ "status": format!("Status: Downloaded newer image for {}", reference) }),
        ];
        let body: String = progress.iter().map(|p| format!("{}\r\n", p)).collect();
        Reply::raw(200, body)
    }

    fn create(&mut self, query: &HashMap<String, String>, body: &[u8]) -> Reply {
        let Ok(config) = serde_json::from_slice::<Value>(body) else {
            return Reply::error(400, "invalid JSON body");
        };
        let name = query.get("name").cloned().unwrap_or_default();
        let image = config["Image"].as_str().unwrap_or_default().to_string();

        if let Some(existing) = self.containers.iter().find(|c| c.name == name) {
            return Reply::error(
                409,
                format!(
                    "Conflict. The container name \"/{}\" is already in use by container \"{}\".",
                    name, existing.id
                ),
            );
        }
        if !self
            .images
            .iter()
            .any(|i| i.repo_tags.iter().any(|t| reference_matches(&image, t)))
        {
            return Reply::error(404, format!("No such image: {}", image));
        }

        let strings = |v: &Value| -> Vec<String> {
            v.as_array()
                .map(|a| {
                    a.iter()
                        .filter_map(|s| s.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        };

        self.next_id += 1;
        let id = format!("{:064x}", self.next_id);
        self.containers.push(FakeContainer {
            id: id.clone(),
            name,
            image,
            cmd: strings(&config["Cmd"]),
            network_mode: config["HostConfig"]["NetworkMode"]
                .as_str()
                .map(str::to_string),
            binds: strings(&config["HostConfig"]["Binds"]),
            status: "created",
        });

        Reply::json(201, json!({ "Id": id, "Warnings": [] }))
    }

    fn find(&mut self, id: &str) -> Option<&mut FakeContainer> {
        self.containers
            .iter_mut()
            .find(|c| c.id == id || c.name == id || (id.len() >= 12 && c.id.starts_with(id)))
    }

    fn start(&mut self, id: &str) -> Reply {
        let fail = std::mem::take(&mut self.fail_next_start);
        let Some(container) = self.find(id) else {
            return Reply::error(404, format!("No such container: {}", id));
        };
        if fail {
            return Reply::error(500, "driver failed programming external connectivity");
        }
        if container.status == "running" {
            return Reply::no_content_with(304);
        }
        container.status = "running";
        Reply::no_content()
    }

    fn restart(&mut self, id: &str) -> Reply {
        let Some(container) = self.find(id) else {
            return Reply::error(404, format!("No such container: {}", id));
        };
        container.status = "running";
        Reply::no_content()
    }

    fn stop(&mut self, id: &str) -> Reply {
        let Some(container) = self.find(id) else {
            return Reply::error(404, format!("No such container: {}", id));
        };
        if container.status != "running" {
            return Reply::no_content_with(304);
        }
        container.status = "exited";
        Reply::no_content()
    }

    fn remove(&mut self, id: &str) -> Reply {
        let Some(container) = self.find(id) else {
            return Reply::error(404, format!("No such container: {}", id));
        };
        if container.status == "running" {
            return Reply::error(
                409,
                format!(
                    "You cannot remove a running container {}. Stop the container before attempting removal or force remove",
                    container.id
                ),
            );
        }
        let full_id = container.id.clone();
        self.containers.retain(|c| c.id != full_id);
        Reply::no_content()
    }

    fn inspect(&mut self, id: &str) -> Reply {
        let Some(container) = self.find(id) else {
            return Reply::error(404, format!("No such container: {}", id));
        };
        Reply::json(
            200,
            json!({
                "Id": container.id,
                "Name": format!("/{}", container.name),
                "State": {
                    "Status": container.status,
                    "Running": container.status == "running",
                },
                "Config": {
                    "Image": container.image,
                    "Cmd": container.cmd,
                },
                "HostConfig": {
                    "NetworkMode": container.network_mode,
                    "Binds": container.binds,
                },
            }),
        )
    }
}

impl Reply {
    fn no_content_with(status: u16) -> Self {
        Self { status, body: None }
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let mut builder = Response::builder().status(self.status);
        if self.body.is_some() {
            builder = builder.header("Content-Type", "application/json");
        }
        builder
            .body(Full::new(Bytes::from(self.body.unwrap_or_default())))
            .expect("valid response")
    }
}
