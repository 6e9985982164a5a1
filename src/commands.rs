//! Command table and the handlers behind it.
//!
//! Every command is registered explicitly in [`COMMANDS`] with its aliases
//! and help text; the alias lookup table is built from that list once.

use crate::conversation::ConversationResolver;
use crate::error::{CommandError, ValidationError};
use crate::feeds::snapshot::SnapshotStore;
use crate::feeds::FeedClient;
use crate::format::Formatter;
use crate::repl::Console;
use crate::store::{Item, ItemStore, LocalId};
use crate::sync::{BatchSource, TimelineSync};
use std::collections::HashMap;
use std::sync::Arc;

pub const MAX_POST_LEN: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Show,
    Tweet,
    Reply,
    Favorite,
    Retweet,
    Conv,
    Help,
}

#[derive(Debug)]
pub struct Command {
    pub action: Action,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub help: &'static str,
}

pub const COMMANDS: &[Command] = &[
    Command {
        action: Action::Show,
        aliases: &["show", "s", "t", "timeline"],
        usage: "",
        help: "Fetch the timeline and print items not shown yet",
    },
    Command {
        action: Action::Tweet,
        aliases: &["tweet", "tw", "post"],
        usage: "<text>",
        help: "Post a new item",
    },
    Command {
        action: Action::Reply,
        aliases: &["reply", "r", "re"],
        usage: "<id> [text]",
        help: "Reply to an item, addressing its author and mentions",
    },
    Command {
        action: Action::Favorite,
        aliases: &["favorite", "fav", "f", "like"],
        usage: "<id>",
        help: "Favorite an item",
    },
    Command {
        action: Action::Retweet,
        aliases: &["retweet", "rt"],
        usage: "<id>",
        help: "Repost an item",
    },
    Command {
        action: Action::Conv,
        aliases: &["conv", "c", "thread"],
        usage: "<id>",
        help: "Show the chain of items an item replies to",
    },
    Command {
        action: Action::Help,
        aliases: &["help", "h", "?"],
        usage: "",
        help: "List commands",
    },
];

pub struct CommandTable {
    commands: &'static [Command],
    by_alias: HashMap<&'static str, &'static Command>,
}

impl CommandTable {
    pub fn new(commands: &'static [Command]) -> Self {
        let by_alias = commands
            .iter()
            .flat_map(|command| command.aliases.iter().map(move |alias| (*alias, command)))
            .collect();
        Self { commands, by_alias }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static Command> {
        self.by_alias.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Command> {
        self.commands.iter()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new(COMMANDS)
    }
}

/// Splits off the first whitespace-delimited word. The remainder is kept
/// verbatim apart from the separating whitespace.
pub fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

pub fn validate_post(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = text.chars().count();
    if len > MAX_POST_LEN {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_POST_LEN,
        });
    }
    Ok(())
}

/// `@handle ` tokens for everyone a reply to `item` should address: the
/// author of the content, the reposter for a share, then every mention.
pub fn addressees(item: &Item) -> String {
    let content = item.content();
    let mut handles = vec![content.handle()];
    if item.is_shared() {
        handles.push(item.payload().handle());
    }
    handles.extend(content.mentions());

    handles
        .into_iter()
        .filter(|handle| !handle.is_empty())
        .map(|handle| format!("@{} ", handle))
        .collect()
}

fn parse_local_id(token: &str) -> Result<LocalId, CommandError> {
    let token = token.trim();
    token.parse().map_err(|_| {
        CommandError::NotFound(if token.is_empty() {
            "(none given)".to_string()
        } else {
            token.to_string()
        })
    })
}

/// Everything one interactive session owns.
pub struct Session {
    store: ItemStore,
    client: Arc<dyn FeedClient>,
    sync: TimelineSync,
    resolver: ConversationResolver,
    formatter: Formatter,
    commands: CommandTable,
}

impl Session {
    pub fn new(
        client: Arc<dyn FeedClient>,
        snapshots: Option<Box<dyn SnapshotStore>>,
        formatter: Formatter,
    ) -> Self {
        Self {
            store: ItemStore::new(),
            sync: TimelineSync::new(client.clone(), snapshots),
            resolver: ConversationResolver::new(client.clone()),
            client,
            formatter,
            commands: CommandTable::default(),
        }
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Runs one command and reports any failure on the console.
    pub async fn execute(&mut self, action: Action, args: &str, console: &mut dyn Console) {
        if let Err(e) = self.dispatch(action, args, console).await {
            tracing::debug!(?action, error = %e, "command failed");
            console.write_line(&e.to_string());
        }
    }

    pub async fn dispatch(
        &mut self,
        action: Action,
        args: &str,
        console: &mut dyn Console,
    ) -> Result<(), CommandError> {
        match action {
            Action::Show => self.show(console).await,
            Action::Tweet => self.post(args, None, console).await,
            Action::Reply => self.reply(args, console).await,
            Action::Favorite => self.favorite(args, console).await,
            Action::Retweet => self.retweet(args, console).await,
            Action::Conv => self.conv(args, console).await,
            Action::Help => {
                self.help(console);
                Ok(())
            }
        }
    }

    async fn show(&mut self, console: &mut dyn Console) -> Result<(), CommandError> {
        let report = self.sync.fetch(&mut self.store).await?;
        match report.source {
            BatchSource::Remote => {}
            BatchSource::Snapshot => {
                console.write_line("Rate limited; showing the last saved timeline")
            }
            BatchSource::Throttled => console.write_line("Rate limited; try again later"),
        }

        if report.ingested == 0 {
            console.write_line("No new items");
            return Ok(());
        }

        console.write_line(&format!("Found {} new items", report.ingested));
        for item in self.store.unshown_items_mut() {
            console.write_line(&self.formatter.format(item));
            item.mark_shown();
        }
        Ok(())
    }

    async fn post(
        &self,
        text: &str,
        in_reply_to: Option<u64>,
        console: &mut dyn Console,
    ) -> Result<(), CommandError> {
        validate_post(text)?;
        self.client.post(text, in_reply_to).await?;
        console.write_line(if in_reply_to.is_some() {
            "Reply posted"
        } else {
            "Posted"
        });
        Ok(())
    }

    async fn reply(&mut self, args: &str, console: &mut dyn Console) -> Result<(), CommandError> {
        let (id, text) = split_word(args);
        let local_id = parse_local_id(id)?;
        let item = self
            .store
            .get(local_id)
            .ok_or_else(|| CommandError::missing(local_id))?;
        let prefix = addressees(item);
        let in_reply_to = item.content().id;

        let text = if text.trim().is_empty() {
            console
                .read_line(&format!("Reply to #{}: {}", local_id, prefix))
                .ok()
                .flatten()
                .unwrap_or_default()
        } else {
            text.to_string()
        };
        if text.trim().is_empty() {
            return Err(ValidationError::Empty.into());
        }

        self.post(&format!("{}{}", prefix, text), Some(in_reply_to), console)
            .await
    }

    async fn favorite(&mut self, args: &str, console: &mut dyn Console) -> Result<(), CommandError> {
        let local_id = parse_local_id(args)?;
        let item = self
            .store
            .get(local_id)
            .ok_or_else(|| CommandError::missing(local_id))?;
        if item.payload().favorited {
            return Err(CommandError::AlreadyActioned("favorited"));
        }

        self.client.favorite(item.content().id).await?;
        if let Some(item) = self.store.get_mut(local_id) {
            item.set_favorited();
        }
        console.write_line(&format!("Favorited #{}", local_id));
        Ok(())
    }

    async fn retweet(&mut self, args: &str, console: &mut dyn Console) -> Result<(), CommandError> {
        let local_id = parse_local_id(args)?;
        let item = self
            .store
            .get(local_id)
            .ok_or_else(|| CommandError::missing(local_id))?;
        if item.payload().retweeted {
            return Err(CommandError::AlreadyActioned("reposted"));
        }

        self.client.repost(item.content().id).await?;
        if let Some(item) = self.store.get_mut(local_id) {
            item.set_reposted();
        }
        console.write_line(&format!("Reposted #{}", local_id));
        Ok(())
    }

    async fn conv(&mut self, args: &str, console: &mut dyn Console) -> Result<(), CommandError> {
        let local_id = parse_local_id(args)?;
        let chain = self.resolver.resolve(&mut self.store, local_id).await?;
        for id in chain {
            if let Some(item) = self.store.get_mut(id) {
                console.write_line(&self.formatter.format(item));
                item.mark_shown();
            }
        }
        Ok(())
    }

    fn help(&self, console: &mut dyn Console) {
        for command in self.commands.iter() {
            let names = command.aliases.join(", ");
            let usage = if command.usage.is_empty() {
                names
            } else {
                format!("{} {}", names, command.usage)
            };
            console.write_line(&format!("  {:<32} {}", usage, command.help));
        }
        console.write_line(&format!("  {:<32} {}", "q", "Quit"));
    }
}
