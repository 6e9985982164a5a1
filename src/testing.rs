//! Fakes shared by the unit tests.

use crate::error::{FeedError, Result};
use crate::feeds::{FeedClient, RawEntities, RawItem, RawMention, RawUser};
use crate::repl::Console;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;

pub fn raw(id: u64, text: &str) -> RawItem {
    RawItem {
        id,
        created_at: "Wed Oct 10 20:19:24 +0000 2018".to_string(),
        user: RawUser {
            name: format!("User {}", id),
            screen_name: format!("user{}", id),
        },
        text: Some(text.to_string()),
        ..Default::default()
    }
}

pub fn raw_at(id: u64, text: &str, created_at: &str) -> RawItem {
    RawItem {
        created_at: created_at.to_string(),
        ..raw(id, text)
    }
}

pub fn by(mut item: RawItem, handle: &str) -> RawItem {
    item.user = RawUser {
        name: capitalize(handle),
        screen_name: handle.to_string(),
    };
    item
}

pub fn mentioning(mut item: RawItem, handles: &[&str]) -> RawItem {
    item.entities = RawEntities {
        user_mentions: handles
            .iter()
            .map(|h| RawMention {
                screen_name: h.to_string(),
            })
            .collect(),
    };
    item
}

pub fn replying_to(mut item: RawItem, parent: u64) -> RawItem {
    item.in_reply_to_status_id = Some(parent);
    item
}

pub fn shared(id: u64, sharer: &str, original: RawItem) -> RawItem {
    let mut item = by(raw(id, &format!("RT: {}", original.body())), sharer);
    item.retweeted_status = Some(Box::new(original));
    item
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Timeline(Option<u64>),
    Item(u64),
    Post(String, Option<u64>),
    Favorite(u64),
    Repost(u64),
}

/// Scripted remote feed. Timeline responses are served in push order; an
/// exhausted queue yields an empty batch.
#[derive(Default)]
pub struct FakeClient {
    timelines: Mutex<VecDeque<Result<Vec<RawItem>>>>,
    items: Mutex<HashMap<u64, RawItem>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_timeline(&self, response: Result<Vec<RawItem>>) {
        self.timelines.lock().unwrap().push_back(response);
    }

    pub fn add_item(&self, item: RawItem) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FeedClient for FakeClient {
    async fn home_timeline(&self, since_id: Option<u64>) -> Result<Vec<RawItem>> {
        self.record(Call::Timeline(since_id));
        self.timelines
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn item(&self, id: u64) -> Result<RawItem> {
        self.record(Call::Item(id));
        self.items
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(FeedError::RemoteNotFound(id))
    }

    async fn post(&self, text: &str, in_reply_to: Option<u64>) -> Result<RawItem> {
        self.record(Call::Post(text.to_string(), in_reply_to));
        Ok(raw(u64::MAX, text))
    }

    async fn favorite(&self, id: u64) -> Result<()> {
        self.record(Call::Favorite(id));
        Ok(())
    }

    async fn repost(&self, id: u64) -> Result<()> {
        self.record(Call::Repost(id));
        Ok(())
    }
}

/// Console fed from a fixed list of input lines, capturing all output.
#[derive(Default)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    pub output: Vec<String>,
    pub prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            input: lines.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn text(&self) -> String {
        self.output.join("\n")
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.input.pop_front())
    }

    fn write_line(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}
