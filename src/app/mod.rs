//! Chat controller: turns prompts into backend requests, backend replies into
//! transcript lines and viewer loads, and keeps downloads and the session in
//! step with the conversation.
//!
//! Network calls are split into [`App::begin_prompt`] and
//! [`App::complete_prompt`] so a front end can run the request and decode
//! the model elsewhere (the window does both in a tokio task, see
//! [`prepare_reply`]) and hand the outcome back later.
//! [`App::send_message`] does everything in one await for the terminal loop.

pub mod command;

use std::collections::VecDeque;
use std::fmt;

use log::{debug, error, info, warn};

use crate::api::{
    BackendClient, Downloader, ExportFormat, GenerateRequest, GenerationResult, HealthStatus,
    ModelParams, SavedFile, Storage,
};
use crate::error::{Error, Result};
use crate::viewer::surface::RenderSurface;
use crate::viewer::{ModelPreparer, PreparedModel, Viewer};
use command::{Command, HELP};

pub const WELCOME: &str = "Hi! Describe a 3D object and I'll build it. \
Once it's on screen, describe changes to refine it.";
pub const BACKEND_DOWN: &str = "Backend not connected. Please check if the server is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        write!(f, "{}: {}", name, self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Info,
}

/// Transient status message (the toast of a graphical front end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Success => "ok",
            Level::Error => "error",
            Level::Info => "info",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

/// Payloads of the most recent successful generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub glb: String,
    pub obj: String,
    pub params: ModelParams,
}

/// A request handed out by [`App::begin_prompt`], to be returned with its
/// outcome to [`App::finish_prompt`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPrompt {
    pub request: GenerateRequest,
    chat: u64,
}

/// What a front end still has to do after [`App::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Handled,
    Send(PendingPrompt),
    CheckHealth,
    Quit,
}

pub struct App<S: RenderSurface, St: Storage> {
    client: BackendClient<St>,
    viewer: Option<Viewer<S>>,
    downloader: Downloader,
    transcript: Vec<ChatMessage>,
    printed: usize,
    notifications: VecDeque<Notification>,
    model_data: Option<ModelData>,
    has_generated_model: bool,
    downloads_enabled: bool,
    in_flight: bool,
    chat: u64,
}

impl<S: RenderSurface, St: Storage> App<S, St> {
    pub fn new(client: BackendClient<St>, downloader: Downloader) -> Self {
        Self {
            client,
            viewer: None,
            downloader,
            transcript: vec![ChatMessage::assistant(WELCOME)],
            printed: 0,
            notifications: VecDeque::new(),
            model_data: None,
            has_generated_model: false,
            downloads_enabled: false,
            in_flight: false,
            chat: 0,
        }
    }

    /// Hands the viewer to the controller once its surface exists.
    pub fn attach_viewer(&mut self, viewer: Viewer<S>) {
        self.viewer = Some(viewer);
    }

    pub fn viewer(&self) -> Option<&Viewer<S>> {
        self.viewer.as_ref()
    }

    pub fn viewer_mut(&mut self) -> Option<&mut Viewer<S>> {
        self.viewer.as_mut()
    }

    pub fn client(&self) -> &BackendClient<St> {
        &self.client
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Transcript lines added since the previous call.
    pub fn take_new_messages(&mut self) -> Vec<ChatMessage> {
        let start = self.printed.min(self.transcript.len());
        self.printed = self.transcript.len();
        self.transcript[start..].to_vec()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    /// New transcript lines followed by pending notifications, formatted
    /// for a terminal.
    pub fn drain_output(&mut self) -> Vec<String> {
        let mut lines: Vec<String> = self.take_new_messages().iter().map(ToString::to_string).collect();
        lines.extend(self.take_notifications().iter().map(ToString::to_string));
        lines
    }

    pub fn model_data(&self) -> Option<&ModelData> {
        self.model_data.as_ref()
    }

    pub fn has_generated_model(&self) -> bool {
        self.has_generated_model
    }

    pub fn downloads_enabled(&self) -> bool {
        self.downloads_enabled
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Runs the synchronous part of `command`.
    pub fn dispatch(&mut self, command: Command) -> Dispatch {
        match command {
            Command::Prompt(text) => match self.begin_prompt(&text) {
                Some(pending) => Dispatch::Send(pending),
                None => Dispatch::Handled,
            },
            Command::NewChat => {
                self.start_new_chat();
                Dispatch::Handled
            }
            Command::ToggleWireframe => {
                if let Some(on) = self.viewer.as_mut().map(Viewer::toggle_wireframe) {
                    self.notify(Level::Info, format!("Wireframe {}", on_off(on)));
                }
                Dispatch::Handled
            }
            Command::ToggleGrid => {
                if let Some(on) = self.viewer.as_mut().map(Viewer::toggle_grid) {
                    self.notify(Level::Info, format!("Grid {}", on_off(on)));
                }
                Dispatch::Handled
            }
            Command::ToggleAutoRotate => {
                if let Some(on) = self.viewer.as_mut().map(Viewer::toggle_auto_rotate) {
                    self.notify(Level::Info, format!("Auto-rotate {}", on_off(on)));
                }
                Dispatch::Handled
            }
            Command::RotateSpeed(level) => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.set_rotate_speed(level);
                    self.notify(Level::Info, format!("Rotation speed {}", level));
                }
                Dispatch::Handled
            }
            Command::ResetCamera => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.reset_camera();
                }
                Dispatch::Handled
            }
            Command::Download(format) => {
                // Failures are reported as notifications.
                let _ = self.download(format);
                Dispatch::Handled
            }
            Command::Health => Dispatch::CheckHealth,
            Command::Help => {
                self.notify(Level::Info, HELP);
                Dispatch::Handled
            }
            Command::Quit => Dispatch::Quit,
        }
    }

    /// Records the user's prompt and builds its request.
    ///
    /// Returns `None` for blank prompts and while another request is still
    /// outstanding. The first prompt of a chat generates; later ones refine.
    pub fn begin_prompt(&mut self, text: &str) -> Option<PendingPrompt> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.in_flight {
            self.notify(Level::Info, "Still working on the previous request");
            return None;
        }

        self.transcript.push(ChatMessage::user(text));
        self.in_flight = true;
        let request = self.client.build_request(text, self.has_generated_model);
        debug!("Sending prompt to {}", request.endpoint());
        Some(PendingPrompt {
            request,
            chat: self.chat,
        })
    }

    /// Applies the backend's answer to `pending`, decoding its model first.
    pub async fn finish_prompt(&mut self, pending: PendingPrompt, outcome: Result<GenerationResult>) {
        let prepared = match self.viewer.as_ref().map(Viewer::preparer) {
            Some(preparer) if pending.chat == self.chat => prepare_reply(&preparer, &outcome).await,
            _ => None,
        };
        self.complete_prompt(pending, outcome, prepared);
    }

    /// Applies the backend's answer to `pending` together with the model
    /// [`prepare_reply`] built from it.
    ///
    /// Answers that arrive after a new chat was started are dropped.
    /// Downloads are enabled only once the reply's model is on screen, or
    /// straight away when there is no viewer.
    pub fn complete_prompt(
        &mut self,
        pending: PendingPrompt,
        outcome: Result<GenerationResult>,
        prepared: Option<Result<PreparedModel>>,
    ) {
        if pending.chat != self.chat {
            debug!("Dropping reply for a previous chat");
            return;
        }
        self.in_flight = false;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                error!("Generation failed: {}", e);
                self.report_failure(&e.to_string());
                return;
            }
        };

        if !result.success {
            self.transcript.push(ChatMessage::assistant(format!(
                "Sorry, I couldn't generate that model. {}",
                result.message
            )));
            return;
        }

        self.transcript.push(ChatMessage::assistant(summarize(&result)));
        let has_glb = !result.model_glb.is_empty();
        self.model_data = Some(ModelData {
            glb: result.model_glb,
            obj: result.model_obj,
            params: result.model_params,
        });
        self.has_generated_model = true;

        let Some(viewer) = self.viewer.as_mut() else {
            self.downloads_enabled = true;
            return;
        };
        let displayed = match prepared {
            Some(Ok(prepared)) => {
                viewer.attach_prepared(prepared);
                Ok(true)
            }
            Some(Err(e)) => Err(e),
            None if has_glb => Err(Error::Load("model was not prepared for display".to_string())),
            None => Ok(false),
        };

        match displayed {
            Ok(on_screen) => self.downloads_enabled = on_screen,
            Err(e) => {
                warn!("Model could not be displayed: {}", e);
                viewer.clear_model();
                self.downloads_enabled = false;
                self.report_failure(&e.to_string());
            }
        }
    }

    /// Sends `text` and waits for the reply.
    pub async fn send_message(&mut self, text: &str) {
        let Some(pending) = self.begin_prompt(text) else {
            return;
        };
        let outcome = self.client.transport().generate(&pending.request).await;
        self.finish_prompt(pending, outcome).await;
    }

    pub async fn check_backend(&mut self) {
        let outcome = self.client.check_health().await;
        self.report_health(outcome);
    }

    /// Health failures only produce a notification.
    pub fn report_health(&mut self, outcome: Result<HealthStatus>) {
        match outcome {
            Ok(_) => info!("Backend reachable at {}", self.client.transport().base_url()),
            Err(e) => {
                error!("Backend not available: {}", e);
                self.notify(Level::Error, BACKEND_DOWN);
            }
        }
    }

    /// Saves the current model in `format`.
    pub fn download(&mut self, format: ExportFormat) -> Option<SavedFile> {
        let Some(data) = self.model_data.as_ref().filter(|_| self.downloads_enabled) else {
            self.notify(Level::Error, "No model to download");
            return None;
        };
        let payload = match format {
            ExportFormat::Glb => &data.glb,
            ExportFormat::Obj => &data.obj,
        };
        if payload.is_empty() {
            self.notify(Level::Error, format!("No {} data for this model", format.label()));
            return None;
        }

        match self.downloader.export(payload, format) {
            Ok(saved) => {
                self.notify(Level::Success, format!("{} file downloaded!", format.label()));
                Some(saved)
            }
            Err(e) => {
                self.notify(Level::Error, format!("Download failed: {}", e));
                None
            }
        }
    }

    /// Back to a blank conversation with a fresh session.
    pub fn start_new_chat(&mut self) {
        self.transcript.truncate(1);
        self.printed = self.printed.min(1);
        self.has_generated_model = false;
        self.model_data = None;
        self.in_flight = false;
        self.chat += 1;

        if let Some(viewer) = self.viewer.as_mut() {
            viewer.clear_model();
        }
        self.downloads_enabled = false;

        let session = self.client.reset_session();
        debug!("New chat uses session {}", session);
        self.notify(Level::Success, "Started new chat");
    }

    fn report_failure(&mut self, message: &str) {
        self.transcript.push(ChatMessage::assistant(format!(
            "Oops! Something went wrong: {}",
            message
        )));
        self.notify(Level::Error, "Failed to generate model");
    }

    fn notify(&mut self, level: Level, message: impl Into<String>) {
        self.notifications.push_back(Notification {
            level,
            message: message.into(),
        });
    }
}

/// Decodes and normalizes the model carried by a successful reply.
///
/// `None` when the reply has no model to show.
pub async fn prepare_reply(
    preparer: &ModelPreparer,
    outcome: &Result<GenerationResult>,
) -> Option<Result<PreparedModel>> {
    match outcome {
        Ok(result) if result.success && !result.model_glb.is_empty() => {
            Some(preparer.prepare(&result.model_glb).await)
        }
        _ => None,
    }
}

/// Assistant reply for a successful generation.
pub fn summarize(result: &GenerationResult) -> String {
    let objects = &result.model_params.objects;
    let count = objects.len().max(1);
    let shapes = objects
        .iter()
        .map(|o| o.kind.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let shapes = if shapes.is_empty() { "model" } else { shapes.as_str() };
    let interpretation = if result.interpretation.is_empty() {
        "Model generated successfully"
    } else {
        result.interpretation.as_str()
    };

    format!(
        "I've created your 3D model!\nObjects: {} ({})\n{}",
        count, shapes, interpretation
    )
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}
