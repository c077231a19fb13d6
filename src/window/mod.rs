//! Windowed front end: a winit event loop hosting the viewer, fed by
//! terminal input and backend replies through user events.

pub mod input;
pub mod surface;

use std::sync::Arc;

use log::{debug, error, warn};
use tokio::runtime::Handle;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::api::{GenerationResult, HealthStatus, Storage};
use crate::app::command::Command;
use crate::app::{prepare_reply, App, Dispatch, PendingPrompt};
use crate::config::Config;
use crate::error::Result;
use crate::viewer::{PreparedModel, Viewer};
use input::{InputAction, PointerInput};
use surface::WindowSurface;

const WINDOW_TITLE: &str = "prompt3d";

/// Events delivered to the window thread from elsewhere.
#[derive(Debug)]
pub enum UserEvent {
    /// A line typed on the terminal.
    Input(String),
    InputClosed,
    /// A backend reply, with its model already decoded off this thread.
    Generated(PendingPrompt, Result<GenerationResult>, Option<Result<PreparedModel>>),
    Health(Result<HealthStatus>),
}

pub struct ViewerWindow<St: Storage> {
    app: App<WindowSurface, St>,
    config: Config,
    runtime: Handle,
    proxy: EventLoopProxy<UserEvent>,
    window: Option<Arc<Window>>,
    pointer: PointerInput,
}

impl<St: Storage> ViewerWindow<St> {
    pub fn new(
        app: App<WindowSurface, St>,
        config: Config,
        runtime: Handle,
        proxy: EventLoopProxy<UserEvent>,
    ) -> Self {
        Self {
            app,
            config,
            runtime,
            proxy,
            window: None,
            pointer: PointerInput::new(),
        }
    }

    /// Starts the background health check.
    pub fn check_backend(&self) {
        let transport = self.app.client().transport().clone();
        let proxy = self.proxy.clone();
        self.runtime.spawn(async move {
            let outcome = transport.health().await;
            let _ = proxy.send_event(UserEvent::Health(outcome));
        });
    }

    /// Runs the request and the model decode on the runtime; the window
    /// keeps drawing the current model until the reply is posted back.
    fn send(&self, pending: PendingPrompt) {
        let transport = self.app.client().transport().clone();
        let preparer = self.app.viewer().map(Viewer::preparer);
        let proxy = self.proxy.clone();
        self.runtime.spawn(async move {
            let outcome = transport.generate(&pending.request).await;
            let prepared = match &preparer {
                Some(preparer) => prepare_reply(preparer, &outcome).await,
                None => None,
            };
            let _ = proxy.send_event(UserEvent::Generated(pending, outcome, prepared));
        });
    }

    fn run_command(&mut self, event_loop: &ActiveEventLoop, command: Command) {
        match self.app.dispatch(command) {
            Dispatch::Handled => {}
            Dispatch::Send(pending) => self.send(pending),
            Dispatch::CheckHealth => self.check_backend(),
            Dispatch::Quit => event_loop.exit(),
        }
        self.print_updates();
    }

    fn print_updates(&mut self) {
        for line in self.app.drain_output() {
            println!("{}", line);
        }
    }

    fn open_viewer(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                return;
            }
        };

        let surface = WindowSurface::new(window.clone())
            .map_err(|e| error!("Failed to create window surface: {}", e))
            .ok();
        match Viewer::init_with(surface, self.config.normalize) {
            Ok(viewer) => self.app.attach_viewer(viewer),
            Err(e) => error!("Viewer unavailable, continuing in chat-only mode: {}", e),
        }
        self.window = Some(window);
    }
}

impl<St: Storage> ApplicationHandler<UserEvent> for ViewerWindow<St> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            self.open_viewer(event_loop);
            self.print_updates();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(viewer) = self.app.viewer_mut() {
                    if let Err(e) = viewer.on_resize() {
                        warn!("Resize failed: {}", e);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(viewer) = self.app.viewer_mut() {
                    if let Err(e) = viewer.render_frame() {
                        error!("Render error: {}", e);
                    }
                }
            }
            other => match self.pointer.process_event(&other) {
                Some(InputAction::Orbit { dx, dy }) => {
                    if let Some(viewer) = self.app.viewer_mut() {
                        viewer.camera_mut().rotate(dx, dy);
                    }
                }
                Some(InputAction::Zoom(steps)) => {
                    if let Some(viewer) = self.app.viewer_mut() {
                        viewer.camera_mut().zoom(steps);
                    }
                }
                Some(InputAction::Command(command)) => self.run_command(event_loop, command),
                None => {}
            },
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Input(line) => match Command::parse(&line) {
                Ok(Some(command)) => self.run_command(event_loop, command),
                Ok(None) => {}
                Err(message) => println!("{}", message),
            },
            UserEvent::InputClosed => debug!("Terminal input closed"),
            UserEvent::Generated(pending, outcome, prepared) => {
                self.app.complete_prompt(pending, outcome, prepared);
                self.print_updates();
            }
            UserEvent::Health(outcome) => {
                self.app.report_health(outcome);
                self.print_updates();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
