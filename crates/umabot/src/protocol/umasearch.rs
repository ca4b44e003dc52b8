use std::time::Duration;

use anyhow::{Result, anyhow};
use log::warn;
use reqwest::blocking::Client;
use serde_json::Value;
use umacore::{
    event::{EventMatch, EventQuery, EventSource},
    gamedata::EventConfig
};

/// 超时下限，避免配置为0时不设超时
const MIN_TIMEOUT_SECS: f64 = 0.1;

/// 在线事件数据库
pub struct HttpEventSource {
    client: Client,
    api_base: String
}

impl HttpEventSource {
    pub fn new(config: &EventConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout_secs.max(MIN_TIMEOUT_SECS)))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.clone()
        })
    }

    /// 命中时返回事件，没有匹配时返回 None
    fn request(&self, query: &EventQuery) -> Result<Option<EventMatch>> {
        let resp = self.client.get(&self.api_base).query(&query.to_params()).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP {status}"));
        }
        let body: Value = resp.json()?;
        match body.get("match") {
            Some(found @ Value::Object(map)) if map.contains_key("data") => {
                Ok(Some(serde_json::from_value(found.clone())?))
            }
            _ => Ok(None)
        }
    }
}

impl EventSource for HttpEventSource {
    fn fetch(&self, query: &EventQuery) -> Option<EventMatch> {
        if query.event_name.trim().is_empty() {
            return None;
        }
        self.request(query)
            .inspect_err(|e| warn!("查询事件 '{}' 失败: {e}", query.event_name))
            .ok()
            .flatten()
    }
}
