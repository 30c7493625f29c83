//! Scripted api and host doubles for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::api::DashboardApi;
use crate::dom::Host;
use crate::error::ApiError;
use crate::rules::{ActionReply, EventType, RuleList, SilenceRule, SubmitReply, ToggleReply};

pub const TOKEN: &str = "0123456789abcdef0123456789abcdef";

pub fn rule(id: u64, key_pattern: &str, event_type: EventType, is_active: bool) -> SilenceRule {
    SilenceRule {
        id,
        key_pattern: key_pattern.to_string(),
        event_type,
        host_pattern: "*".to_string(),
        is_active,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    ListRules,
    SubmitRule {
        action: String,
        fields: Vec<(String, String)>,
        csrf_token: Option<String>,
    },
    DeleteRule {
        rule_id: u64,
        csrf_token: String,
    },
    ToggleRule {
        rule_id: u64,
        csrf_token: String,
    },
    DeleteDevice {
        device_id: u64,
        csrf_token: String,
    },
}

/// Answers from per-endpoint queues. An empty list queue falls back to the
/// current server-side rules; any other empty queue is a transport error.
#[derive(Default)]
pub struct FakeApi {
    server_rules: Mutex<Vec<SilenceRule>>,
    lists: Mutex<VecDeque<Result<RuleList, ApiError>>>,
    submits: Mutex<VecDeque<Result<SubmitReply, ApiError>>>,
    deletes: Mutex<VecDeque<Result<ActionReply, ApiError>>>,
    toggles: Mutex<VecDeque<Result<ToggleReply, ApiError>>>,
    device_deletes: Mutex<VecDeque<Result<ActionReply, ApiError>>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl FakeApi {
    pub fn with_rules(rules: Vec<SilenceRule>) -> Self {
        let api = Self::default();
        *api.server_rules.lock().unwrap() = rules;
        api
    }

    pub fn set_rules(&self, rules: Vec<SilenceRule>) {
        *self.server_rules.lock().unwrap() = rules;
    }

    pub fn push_list(&self, reply: Result<RuleList, ApiError>) {
        self.lists.lock().unwrap().push_back(reply);
    }

    pub fn push_submit(&self, reply: Result<SubmitReply, ApiError>) {
        self.submits.lock().unwrap().push_back(reply);
    }

    pub fn push_delete(&self, reply: Result<ActionReply, ApiError>) {
        self.deletes.lock().unwrap().push_back(reply);
    }

    pub fn push_toggle(&self, reply: Result<ToggleReply, ApiError>) {
        self.toggles.lock().unwrap().push_back(reply);
    }

    pub fn push_device_delete(&self, reply: Result<ActionReply, ApiError>) {
        self.device_deletes.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>) -> Result<T, ApiError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".into())))
}

impl DashboardApi for FakeApi {
    async fn list_rules(&self) -> Result<RuleList, ApiError> {
        self.record(ApiCall::ListRules);
        let scripted = self.lists.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(RuleList {
                rules: self.server_rules.lock().unwrap().clone(),
            })
        })
    }

    async fn submit_rule(
        &self,
        action: &str,
        fields: &[(String, String)],
        csrf_token: Option<&str>,
    ) -> Result<SubmitReply, ApiError> {
        self.record(ApiCall::SubmitRule {
            action: action.to_string(),
            fields: fields.to_vec(),
            csrf_token: csrf_token.map(str::to_string),
        });
        next(&self.submits)
    }

    async fn delete_rule(&self, rule_id: u64, csrf_token: &str) -> Result<ActionReply, ApiError> {
        self.record(ApiCall::DeleteRule {
            rule_id,
            csrf_token: csrf_token.to_string(),
        });
        next(&self.deletes)
    }

    async fn toggle_rule(&self, rule_id: u64, csrf_token: &str) -> Result<ToggleReply, ApiError> {
        self.record(ApiCall::ToggleRule {
            rule_id,
            csrf_token: csrf_token.to_string(),
        });
        next(&self.toggles)
    }

    async fn delete_device(
        &self,
        device_id: u64,
        csrf_token: &str,
    ) -> Result<ActionReply, ApiError> {
        self.record(ApiCall::DeleteDevice {
            device_id,
            csrf_token: csrf_token.to_string(),
        });
        next(&self.device_deletes)
    }
}

#[derive(Debug)]
pub struct RecordingHost {
    pub alerts: Vec<String>,
    pub confirms: Vec<String>,
    pub confirm_answer: bool,
    pub reloads: usize,
    pub navigations: Vec<String>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            alerts: Vec::new(),
            confirms: Vec::new(),
            confirm_answer: true,
            reloads: 0,
            navigations: Vec::new(),
        }
    }
}

impl Host for RecordingHost {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.confirm_answer
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }
}
