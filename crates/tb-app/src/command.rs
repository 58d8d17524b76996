// ABOUTME: Line commands understood by the layout driver.
// ABOUTME: Parses script lines such as `split 0 v` or `place notes 1.0`.

use anyhow::{bail, Context, Result};
use tb_layout::{Address, Axis};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a buffer, showing it in the first empty window
    Buffer { name: String, domain: String },
    Place { name: String, address: Address },
    /// Put the placeholder back in a window
    Clear(Address),
    Split { address: Address, axis: Axis },
    Wrap(Address),
    Remove(Address),
    Activate(Address),
    /// Simulate the toolkit moving input focus to a window
    Focus(Address),
    Next,
    Tree,
    Json,
}

fn parse_axis(word: &str) -> Result<Axis> {
    match word {
        "h" | "horizontal" => Ok(Axis::Horizontal),
        "v" | "vertical" => Ok(Axis::Vertical),
        other => bail!("unknown axis {:?} (expected h or v)", other),
    }
}

fn parse_address(word: &str) -> Result<Address> {
    word.parse()
        .with_context(|| format!("bad address {:?}", word))
}

impl Command {
    /// Parse one script line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            return Ok(None);
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["buffer", name, domain] => Command::Buffer {
                name: name.to_string(),
                domain: domain.to_string(),
            },
            ["place", name, address] => Command::Place {
                name: name.to_string(),
                address: parse_address(address)?,
            },
            ["clear", address] => Command::Clear(parse_address(address)?),
            ["split", address, axis] => Command::Split {
                address: parse_address(address)?,
                axis: parse_axis(axis)?,
            },
            ["wrap", address] => Command::Wrap(parse_address(address)?),
            ["remove", address] => Command::Remove(parse_address(address)?),
            ["activate", address] => Command::Activate(parse_address(address)?),
            ["focus", address] => Command::Focus(parse_address(address)?),
            ["next"] => Command::Next,
            ["tree"] => Command::Tree,
            ["json"] => Command::Json,
            [verb, ..] => bail!("unknown or malformed command {:?}", verb),
            [] => return Ok(None),
        };
        Ok(Some(command))
    }
}
