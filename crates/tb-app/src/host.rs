// ABOUTME: Headless host for the layout: text modelines and logged domain changes.
// ABOUTME: Stands in for the GUI toolkit when replaying layout scripts.

use tb_core::ModelineSettings;
use tb_layout::{BufferView, Domain, Host, Modeline, WindowStatus};

/// Render a status line the way the settings ask for
pub fn format_modeline(settings: &ModelineSettings, status: &WindowStatus) -> String {
    let mut line = String::new();
    if settings.show_window_id {
        line.push_str(&format!("[{}] ", status.win_id));
    }
    line.push_str(status.buffer.as_deref().unwrap_or("-"));
    if settings.show_address {
        line.push_str(&format!(" @{}", status.address));
    }
    if status.active {
        line.push_str(" *");
    }
    line
}

pub struct TextModeline {
    settings: ModelineSettings,
    text: String,
}

impl Modeline for TextModeline {
    fn update(&mut self, status: &WindowStatus) {
        self.text = format_modeline(&self.settings, status);
        tracing::debug!("modeline: {}", self.text);
    }

    fn release(&mut self) {
        tracing::debug!("modeline released: {}", self.text);
    }
}

/// Content view with nothing to draw
pub struct TextView {
    name: String,
}

impl TextView {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl BufferView for TextView {
    fn focus(&mut self) {
        tracing::debug!("{} has focus", self.name);
    }

    fn set_visible(&mut self, visible: bool) {
        tracing::debug!("{} visible: {}", self.name, visible);
    }
}

pub struct AppHost {
    modeline: ModelineSettings,
    domain: Option<Domain>,
    status_text: Option<String>,
}

impl AppHost {
    pub fn new(modeline: ModelineSettings) -> Self {
        Self {
            modeline,
            domain: None,
            status_text: None,
        }
    }

    pub fn domain(&self) -> Option<&Domain> {
        self.domain.as_ref()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }
}

impl Host for AppHost {
    fn change_domain(&mut self, domain: &Domain) {
        if self.domain.as_ref() != Some(domain) {
            tracing::info!("Domain changed to {}", domain);
        }
        self.domain = Some(domain.clone());
    }

    fn active_buffer_name_changed(&mut self, name: Option<&str>) {
        self.status_text = name.map(str::to_string);
    }

    fn new_modeline(&mut self) -> Box<dyn Modeline> {
        Box::new(TextModeline {
            settings: self.modeline.clone(),
            text: String::new(),
        })
    }
}
