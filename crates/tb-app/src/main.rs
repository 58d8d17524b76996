// ABOUTME: Main application entry point.
// ABOUTME: Replays layout commands from a script or stdin against a headless host.

mod command;
mod host;

use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tb_core::Config;
use tb_layout::{BufferStack, Domain, Focus, LayoutSnapshot, NodeSnapshot, Pane};
use tracing_subscriber::EnvFilter;

use command::Command;
use host::{format_modeline, AppHost, TextView};

struct App {
    stack: BufferStack<AppHost>,
    config: Config,
}

impl App {
    fn new(config: Config) -> Self {
        let host = AppHost::new(config.modeline.clone());
        Self {
            stack: BufferStack::new(host, &config),
            config,
        }
    }

    /// Run one command, returning any text it prints
    fn execute(&mut self, command: Command) -> Result<Option<String>> {
        match command {
            Command::Buffer { name, domain } => {
                let view = Box::new(TextView::new(name.clone()));
                self.stack
                    .add_buffer(Pane::new(name, Domain::new(domain), view))?;
            }
            Command::Place { name, address } => {
                let id = self
                    .stack
                    .buffer_id(&name)
                    .with_context(|| format!("no buffer named {:?}", name))?;
                self.stack.place_buffer(Some(id), &address)?;
            }
            Command::Clear(address) => {
                self.stack.place_buffer(None, &address)?;
            }
            Command::Split { address, axis } => {
                let max = self.config.layout.max_windows;
                if self.stack.window_count() >= max {
                    tracing::warn!("Maximum window limit ({}) reached", max);
                    return Ok(None);
                }
                let window = self.stack.split_at(&address, axis)?;
                tracing::info!(
                    "Split {} {:?}, total windows: {}",
                    address,
                    axis,
                    self.stack.window_count()
                );
                self.stack.activate(window)?;
            }
            Command::Wrap(address) => {
                let node = self.stack.tree().resolve(&address)?;
                self.stack.wrap(node)?;
            }
            Command::Remove(address) => {
                let window = self.stack.tree().resolve_window(&address)?;
                self.stack.remove_window(window)?;
                if let Some(first) = self.stack.windows().next() {
                    self.stack.activate(first)?;
                }
            }
            Command::Activate(address) => {
                self.stack.activate_window(&address)?;
            }
            Command::Focus(address) => {
                let window = self.stack.tree().resolve_window(&address)?;
                let focus = match self.stack.tree().leaf(window)?.buffer() {
                    Some(buffer) => Focus::Buffer(buffer),
                    None => Focus::Placeholder(window),
                };
                self.stack.focus_changed(Some(focus));
            }
            Command::Next => {
                if self.stack.next_buffer()?.is_none() {
                    tracing::warn!("No current window or no buffers to cycle");
                }
            }
            Command::Tree => {
                let snapshot = self.stack.snapshot()?;
                return Ok(Some(self.render_tree(&snapshot)));
            }
            Command::Json => {
                let snapshot = self.stack.snapshot()?;
                return Ok(Some(serde_json::to_string_pretty(&snapshot)?));
            }
        }
        Ok(None)
    }

    fn render_tree(&self, snapshot: &LayoutSnapshot) -> String {
        let host = self.stack.host();
        let mut out = format!(
            "domain: {}  buffer: {}\n",
            host.domain().map(Domain::as_str).unwrap_or("-"),
            host.status_text().unwrap_or("-"),
        );
        render_node(&self.config, &snapshot.root, 0, &mut out);
        for buffer in snapshot.buffers.iter().filter(|b| b.window.is_none()) {
            out.push_str(&format!("hidden: {} ({})\n", buffer.name, buffer.domain));
        }
        out
    }

    fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut failures = 0;
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let result = Command::parse(&line).and_then(|command| match command {
                Some(command) => self.execute(command),
                None => Ok(None),
            });
            match result {
                Ok(Some(text)) => println!("{}", text.trim_end()),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("line {}: {:#}", index + 1, e);
                    failures += 1;
                }
            }
        }
        if failures > 0 {
            bail!("{} command(s) failed", failures);
        }
        Ok(())
    }
}

fn render_node(config: &Config, node: &NodeSnapshot, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        NodeSnapshot::Window(status) => {
            let text = match &status.buffer {
                Some(_) => format_modeline(&config.modeline, status),
                None => format!(
                    "{} {}",
                    format_modeline(&config.modeline, status),
                    config.placeholder_text
                ),
            };
            out.push_str(&format!("{}{}\n", indent, text));
        }
        NodeSnapshot::Container {
            address,
            axis,
            children,
        } => {
            out.push_str(&format!("{}{:?} @{}\n", indent, axis, address));
            for child in children {
                render_node(config, child, depth + 1, out);
            }
        }
    }
}

struct Args {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        script: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                eprintln!("Usage: tilebuf [--config PATH] [SCRIPT]");
                eprintln!("Reads layout commands from SCRIPT, or stdin when omitted.");
                std::process::exit(0);
            }
            other if args.script.is_none() => args.script = Some(PathBuf::from(other)),
            other => bail!("unexpected argument {:?}", other),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting tilebuf");

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_or_default(),
    };
    tracing::info!(
        "Loaded config: initial_windows={}, max_windows={}",
        config.layout.initial_windows,
        config.layout.max_windows
    );

    let mut app = App::new(config);
    match &args.script {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            app.run(BufReader::new(file))
        }
        None => app.run(std::io::stdin().lock()),
    }
}
