//! Plain-text checklist import/export.
//!
//! Reads markdown task lists (`- [ ] item`, `* [x] item`) into a [`Document`] and renders a
//! document back as one. Lines that are not task items become unchecked items in a to-do
//! document and plain blocks in a notes document. Blank lines are skipped.

use crate::block::{Block, Variant};
use crate::document::Document;
use regex::Regex;

/// Markdown task-list codec.
#[derive(Debug, Clone)]
pub struct ChecklistCodec {
    task: Regex,
}

impl ChecklistCodec {
    /// Compile the task-item pattern.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            task: Regex::new(r"^\s*[-*+]\s+\[([ xX])\]\s*(.*)$")?,
        })
    }

    /// Parse `text` into a document of `variant`. Input without content yields one empty block.
    pub fn parse(&self, text: &str, variant: Variant) -> Document {
        let blocks: Vec<Block> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.parse_line(line, variant))
            .collect();

        // Fresh ids cannot collide; an empty list falls back to a seeded document.
        Document::from_blocks(blocks).unwrap_or_else(|_| Document::seeded(variant))
    }

    fn parse_line(&self, line: &str, variant: Variant) -> Block {
        let (text, checked) = match self.task.captures(line) {
            Some(caps) => {
                let checked = caps.get(1).is_some_and(|m| m.as_str() != " ");
                let text = caps.get(2).map_or("", |m| m.as_str());
                (text.trim_end(), checked)
            }
            None => (line.trim(), false),
        };

        match variant {
            Variant::Todo => Block::todo(text, checked),
            Variant::Notes => Block::new(text),
        }
    }

    /// Render `document`: blocks with a checked flag as task items, others as plain lines.
    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        for block in document.blocks() {
            match block.checked {
                Some(true) => out.push_str("- [x] "),
                Some(false) => out.push_str("- [ ] "),
                None => {}
            }
            out.push_str(&block.text);
            out.push('\n');
        }
        out
    }
}
