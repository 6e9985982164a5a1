use crate::config::DisplayConfig;
use crate::store::Item;
use chrono::Local;
use crossterm::style::{Color, Stylize};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Renders items as text. Never touches the `shown` flag; the caller marks
/// an item shown once it has actually been written out.
#[derive(Debug, Clone)]
pub struct Formatter {
    margin: String,
    color: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

impl Formatter {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            margin: " ".repeat(config.indent),
            color: config.color,
        }
    }

    pub fn plain(indent: usize) -> Self {
        Self {
            margin: " ".repeat(indent),
            color: false,
        }
    }

    pub fn format(&self, item: &Item) -> String {
        let content = item.content();
        let date = item
            .created_at()
            .map(|at| at.with_timezone(&Local).format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "unknown date".to_string());

        let mut header = format!(
            "{} {}  {}  {}",
            self.paint(content.author(), Color::Magenta),
            self.paint(&format!("@{}", content.handle()), Color::Cyan),
            self.paint(&date, Color::DarkGrey),
            self.paint(&format!("#{}", item.local_id()), Color::Yellow),
        );
        if item.is_shared() {
            let sharer = item.payload();
            header.push_str(&self.paint(
                &format!("  (reposted by {} @{})", sharer.author(), sharer.handle()),
                Color::Green,
            ));
        }

        let body = textwrap::indent(&content.body(), &self.margin);
        format!("{}\n{}", header, self.paint(body.trim_end_matches('\n'), Color::Blue))
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ItemStore;
    use crate::testing::{by, raw, shared};

    fn render(raw_item: crate::feeds::RawItem) -> String {
        let mut store = ItemStore::new();
        let item = &store.ingest(vec![raw_item])[0];
        Formatter::plain(4).format(item)
    }

    #[test]
    fn test_plain_item_header_and_body() {
        let out = render(by(raw(1, "hello\nworld"), "alice"));
        let mut lines = out.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Alice @alice  "));
        assert!(header.ends_with("#1"));
        assert_eq!(lines.next(), Some("    hello"));
        assert_eq!(lines.next(), Some("    world"));
        assert!(!out.contains("reposted by"));
    }

    #[test]
    fn test_shared_item_names_both_authors() {
        let out = render(shared(2, "carol", by(raw(1, "original text"), "alice")));
        let header = out.lines().next().unwrap();
        assert!(header.starts_with("Alice @alice"));
        assert!(header.contains("reposted by Carol @carol"));
        assert!(out.ends_with("    original text"));
        assert!(!out.contains("RT:"));
    }

    #[test]
    fn test_missing_timestamp() {
        let mut item = raw(1, "x");
        item.created_at.clear();
        assert!(render(item).contains("unknown date"));
    }

    #[test]
    fn test_format_does_not_mark_shown() {
        let mut store = ItemStore::new();
        store.ingest(vec![raw(1, "x")]);
        let item = store.iter().next().unwrap();
        Formatter::default().format(item);
        assert!(!item.shown());
    }

    #[test]
    fn test_plain_output_has_no_escapes() {
        let mut store = ItemStore::new();
        let item = &store.ingest(vec![raw(1, "x")])[0];
        assert!(!Formatter::plain(2).format(item).contains('\u{1b}'));
    }
}
