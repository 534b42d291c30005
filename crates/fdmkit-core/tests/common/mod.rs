//! In-memory stand-in for an FDM appliance.
//!
//! Serves list/create/get/edit/delete for any registered collection URL,
//! reproduces the appliance's 422 bodies for duplicate names and unknown
//! ids, and records every call so tests can count round trips.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use fdmkit_core::{
    ApiRequest, ConfigObject, DUPLICATE_NAME_MARKER, HttpMethod, INVALID_UUID_MARKER,
    ReconcileError, Result, TokenRefresher, Transport,
};
use serde_json::{Value, json};

pub const NETWORKS: &str = "/object/networks";
pub const RADIUS: &str = "/object/radiusidentitysources";
pub const SI_POLICIES: &str = "/policy/securityintelligencenetworkpolicies";

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, Vec<ConfigObject>>,
    next_id: u64,
    calls: Vec<(HttpMethod, String)>,
}

#[derive(Debug, Default)]
pub struct FakeAppliance {
    state: Mutex<State>,
    token_expired: AtomicBool,
    refreshes: AtomicU32,
    failures: Mutex<HashMap<HttpMethod, (u16, Value)>>,
}

impl FakeAppliance {
    pub fn new() -> Self {
        Self::with_collections(&[NETWORKS, RADIUS, SI_POLICIES])
    }

    pub fn with_collections(urls: &[&str]) -> Self {
        let appliance = Self::default();
        {
            let mut state = appliance.state.lock().unwrap();
            for url in urls {
                state.collections.insert((*url).to_string(), Vec::new());
            }
        }
        appliance
    }

    /// Stores an object directly, assigning id and version. Returns the id.
    pub fn seed(&self, url: &str, obj: Value) -> String {
        let mut state = self.state.lock().unwrap();
        let stored = state.assign_identity(obj.as_object().unwrap().clone());
        let id = stored["id"].as_str().unwrap().to_string();
        state.collections.get_mut(url).unwrap().push(stored);
        id
    }

    /// Seeds `count` objects named `prefix0`, `prefix1`, ...
    pub fn seed_many(&self, url: &str, prefix: &str, count: usize) {
        for i in 0..count {
            let name = format!("{prefix}{i}");
            let address = format!("10.0.{}.{}", i / 250, i % 250 + 1);
            self.seed(url, Value::Object(host(&name, &address)));
        }
    }

    pub fn objects(&self, url: &str) -> Vec<ConfigObject> {
        self.state.lock().unwrap().collections[url].clone()
    }

    pub fn object_named(&self, url: &str, name: &str) -> Option<ConfigObject> {
        self.objects(url)
            .into_iter()
            .find(|obj| obj.get("name").and_then(Value::as_str) == Some(name))
    }

    pub fn calls(&self) -> Vec<(HttpMethod, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutating_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|(method, _)| method.is_mutating())
            .count()
    }

    pub fn calls_with(&self, method: HttpMethod) -> usize {
        self.calls().iter().filter(|(m, _)| *m == method).count()
    }

    /// Makes the next request fail with an expired-token 401.
    pub fn expire_token(&self) {
        self.token_expired.store(true, Ordering::SeqCst);
    }

    pub fn refreshes(&self) -> u32 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Makes every request with `method` fail with `status` and `body`.
    pub fn fail(&self, method: HttpMethod, status: u16, body: Value) {
        self.failures.lock().unwrap().insert(method, (status, body));
    }

    fn record(&self, request: &ApiRequest) {
        self.state
            .lock()
            .unwrap()
            .calls
            .push((request.method, request.url_path.clone()));
    }

    fn handle(&self, request: &ApiRequest) -> Result<Value> {
        let path = request.rendered_path()?;
        let mut state = self.state.lock().unwrap();
        state.calls.push((request.method, path.clone()));

        if let Some(collection) = state.collections.get(&path).map(|_| path.clone()) {
            return match request.method {
                HttpMethod::Get => Ok(state.list(&collection, &request.query_params)),
                HttpMethod::Post => state.create(&collection, body(request)?),
                _ => Err(not_found(&path)),
            };
        }

        let (collection, id) = path
            .rsplit_once('/')
            .filter(|(collection, _)| state.collections.contains_key(*collection))
            .map(|(collection, id)| (collection.to_string(), id.to_string()))
            .ok_or_else(|| not_found(&path))?;

        match request.method {
            HttpMethod::Get => state.get(&collection, &id),
            HttpMethod::Put => state.replace(&collection, &id, body(request)?),
            HttpMethod::Delete => state.remove(&collection, &id),
            HttpMethod::Post => Err(not_found(&path)),
        }
    }
}

impl State {
    fn assign_identity(&mut self, mut obj: ConfigObject) -> ConfigObject {
        self.next_id += 1;
        obj.insert("id".into(), json!(format!("00000000-0000-0000-0000-{:012}", self.next_id)));
        obj.insert("version".into(), json!("v1"));
        obj
    }

    fn list(&self, url: &str, query: &BTreeMap<String, String>) -> Value {
        let name_filter = query
            .get("filter")
            .and_then(|filter| filter.strip_prefix("name:"));
        let matching: Vec<&ConfigObject> = self.collections[url]
            .iter()
            .filter(|obj| match name_filter {
                Some(wanted) => obj
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.contains(wanted)),
                None => true,
            })
            .collect();

        let offset = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
        let limit = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10);
        let items: Vec<&ConfigObject> = matching.iter().skip(offset).take(limit).copied().collect();

        json!({
            "items": items,
            "paging": {
                "offset": offset,
                "limit": limit,
                "count": matching.len(),
                "prev": [],
                "next": []
            }
        })
    }

    fn create(&mut self, url: &str, obj: ConfigObject) -> Result<Value> {
        let name = obj.get("name").cloned();
        if self.collections[url]
            .iter()
            .any(|existing| existing.get("name") == name.as_ref())
        {
            return Err(unprocessable(DUPLICATE_NAME_MARKER));
        }
        let stored = self.assign_identity(obj);
        self.collections
            .get_mut(url)
            .unwrap()
            .push(stored.clone());
        Ok(Value::Object(stored))
    }

    fn position(&self, url: &str, id: &str) -> Result<usize> {
        self.collections[url]
            .iter()
            .position(|obj| obj.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| unprocessable(INVALID_UUID_MARKER))
    }

    fn get(&self, url: &str, id: &str) -> Result<Value> {
        let index = self.position(url, id)?;
        Ok(Value::Object(self.collections[url][index].clone()))
    }

    fn replace(&mut self, url: &str, id: &str, mut obj: ConfigObject) -> Result<Value> {
        let index = self.position(url, id)?;
        let current = &mut self.collections.get_mut(url).unwrap()[index];
        let version = current["version"]
            .as_str()
            .and_then(|v| v.trim_start_matches('v').parse::<u32>().ok())
            .unwrap_or(1);
        obj.insert("id".into(), json!(id));
        obj.insert("version".into(), json!(format!("v{}", version + 1)));
        *current = obj.clone();
        Ok(Value::Object(obj))
    }

    fn remove(&mut self, url: &str, id: &str) -> Result<Value> {
        let index = self.position(url, id)?;
        self.collections.get_mut(url).unwrap().remove(index);
        Ok(json!({}))
    }
}

fn body(request: &ApiRequest) -> Result<ConfigObject> {
    match &request.body {
        Some(Value::Object(obj)) => Ok(obj.clone()),
        _ => Err(ReconcileError::api(400, json!("request body required"))),
    }
}

fn unprocessable(description: &str) -> ReconcileError {
    ReconcileError::api(
        422,
        json!({
            "error": {
                "severity": "ERROR",
                "key": "Validation",
                "messages": [{
                    "description": description,
                    "code": "validationFailed",
                    "location": ""
                }]
            }
        }),
    )
}

fn not_found(path: &str) -> ReconcileError {
    ReconcileError::api(404, json!({"message": format!("no resource at {path}")}))
}

#[async_trait]
impl Transport for FakeAppliance {
    async fn send_request(&self, request: &ApiRequest) -> Result<Value> {
        if self.token_expired.load(Ordering::SeqCst) {
            self.record(request);
            return Err(ReconcileError::api(
                401,
                json!({"message": "Access token is invalid or has expired"}),
            ));
        }
        let failure = self.failures.lock().unwrap().get(&request.method).cloned();
        if let Some((status, body)) = failure {
            self.record(request);
            return Err(ReconcileError::api(status, body));
        }
        self.handle(request)
    }
}

#[async_trait]
impl TokenRefresher for FakeAppliance {
    async fn refresh_access_token(&self) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.token_expired.store(false, Ordering::SeqCst);
        Ok(())
    }
}

pub fn object(value: Value) -> ConfigObject {
    value.as_object().unwrap().clone()
}

pub fn host(name: &str, value: &str) -> ConfigObject {
    object(json!({
        "name": name,
        "subType": "HOST",
        "value": value,
        "type": "networkobject"
    }))
}
