//! Clipboard sinks for the copied deck summary.
//!
//! A terminal has no clipboard API of its own, so the default sink asks the terminal
//! emulator to set it with an OSC 52 escape sequence.

use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

impl<C: Clipboard + ?Sized> Clipboard for Box<C> {
    fn write_text(&mut self, text: &str) -> Result<()> {
        (**self).write_text(text)
    }
}

pub struct Osc52<W: Write> {
    out: W,
}

impl<W: Write> Osc52<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Clipboard for Osc52<W> {
    fn write_text(&mut self, text: &str) -> Result<()> {
        write!(self.out, "\x1b]52;c;{}\x07", STANDARD.encode(text)).map_err(Error::Clipboard)?;
        self.out.flush().map_err(Error::Clipboard)
    }
}

/// Prints the text instead, for terminals that ignore OSC 52.
pub struct PlainText<W: Write> {
    out: W,
}

impl<W: Write> PlainText<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Clipboard for PlainText<W> {
    fn write_text(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}").map_err(Error::Clipboard)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClipboardMode {
    #[default]
    Osc52,
    Stdout,
}

impl ClipboardMode {
    pub fn open(self) -> Box<dyn Clipboard> {
        match self {
            ClipboardMode::Osc52 => Box::new(Osc52::new(io::stdout())),
            ClipboardMode::Stdout => Box::new(PlainText::new(io::stdout())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_wraps_base64_payload() {
        let mut clip = Osc52::new(Vec::new());
        clip.write_text("Deck: My Deck").unwrap();
        let bytes = clip.into_inner();
        assert_eq!(bytes, b"\x1b]52;c;RGVjazogTXkgRGVjaw==\x07");
    }

    #[test]
    fn plain_text_prints_summary_as_is() {
        let mut out = Vec::new();
        PlainText::new(&mut out).write_text("Deck: My Deck\nAvg Elixir: 2.3").unwrap();
        assert_eq!(out, b"Deck: My Deck\nAvg Elixir: 2.3\n");
    }

    #[test]
    fn memory_keeps_last_text() {
        let mut clip = MemoryClipboard::default();
        assert_eq!(clip.contents(), None);
        clip.write_text("first").unwrap();
        clip.write_text("second").unwrap();
        assert_eq!(clip.contents(), Some("second"));
    }

    #[test]
    fn boxed_clipboard_delegates() {
        let mut clip: Box<MemoryClipboard> = Box::default();
        clip.write_text("boxed").unwrap();
        assert_eq!(clip.contents(), Some("boxed"));
    }
}
