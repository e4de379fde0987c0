use async_trait::async_trait;
use cosmic_api::{Command, CosmicError, ParamValue, Transport};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// A canned reply for one request
#[allow(dead_code)]
pub enum Reply {
    /// 2xx with this (already wrapped) JSON body
    Ok(Value),
    /// Non-2xx with this status and raw body
    Status(u16, String),
    /// Answer only after a delay
    Delayed(Duration, Value),
}

/// In-memory transport answering from per-route scripts.
///
/// Requests are routed by command name; job queries are routed by
/// `queryAsyncJobResult:<jobid>` so concurrent jobs keep separate scripts.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    sent: Mutex<Vec<Command>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, route: &str, reply: Reply) {
        self.scripts
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queue a successful response for `command`
    pub fn respond(&self, command: &str, body: Value) {
        self.push(command, Reply::Ok(wrap(command, body)));
    }

    /// Queue a job status response for `job_id`
    pub fn job(&self, job_id: &str, body: Value) {
        self.push(
            &job_route(job_id),
            Reply::Ok(wrap("queryAsyncJobResult", body)),
        );
    }

    pub fn sent(&self) -> Vec<Command> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self, command: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name() == command)
            .count()
    }

    /// Replies still queued for `route`
    pub fn remaining(&self, route: &str) -> usize {
        self.scripts
            .lock()
            .unwrap()
            .get(route)
            .map(|q| q.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, command: &Command) -> Result<Vec<u8>, CosmicError> {
        self.sent.lock().unwrap().push(command.clone());

        let route = match command.get("jobid") {
            Some(ParamValue::Str(job_id)) => job_route(job_id),
            _ => command.name().to_string(),
        };

        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(|q| q.pop_front());

        match reply {
            Some(Reply::Ok(body)) => Ok(serde_json::to_vec(&body).unwrap()),
            Some(Reply::Status(status, body)) => Err(CosmicError::Transport {
                status: Some(status),
                error_code: serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v.as_object()
                            .and_then(|m| m.values().next().cloned())
                            .and_then(|inner| inner.get("errorcode").and_then(Value::as_i64))
                    }),
                message: body,
            }),
            Some(Reply::Delayed(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(serde_json::to_vec(&body).unwrap())
            }
            None => Err(CosmicError::Transport {
                status: None,
                error_code: None,
                message: format!("no scripted reply for {}", route),
            }),
        }
    }
}

pub fn job_route(job_id: &str) -> String {
    format!("queryAsyncJobResult:{}", job_id)
}

/// Wrap `body` the way the API does: `{"<command>response": body}`
pub fn wrap(command: &str, body: Value) -> Value {
    let mut map = Map::new();
    map.insert(format!("{}response", command.to_lowercase()), body);
    Value::Object(map)
}

#[allow(dead_code)]
pub fn pending(job_id: &str) -> Value {
    json!({"jobid": job_id, "jobstatus": 0})
}

#[allow(dead_code)]
pub fn succeeded(job_id: &str, result: Value) -> Value {
    json!({"jobid": job_id, "jobstatus": 1, "jobresultcode": 0, "jobresulttype": "object", "jobresult": result})
}

#[allow(dead_code)]
pub fn failed(job_id: &str, message: &str) -> Value {
    json!({"jobid": job_id, "jobstatus": 2, "jobresultcode": 530, "jobresulttype": "object", "jobresult": {"errorcode": 530, "errortext": message}})
}

/// `n` firewall rule entities with ids `r<start>..`
#[allow(dead_code)]
pub fn rules(start: usize, n: usize) -> Vec<Value> {
    (start..start + n)
        .map(|i| json!({"id": format!("r{}", i), "protocol": "tcp", "startport": format!("{}", 1000 + i)}))
        .collect()
}
