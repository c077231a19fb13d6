use std::io::{self, BufRead};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;
use winit::event_loop::{EventLoop, EventLoopProxy};

use prompt3d::api::{FileStorage, Storage};
use prompt3d::app::command::Command;
use prompt3d::app::{App, Dispatch};
use prompt3d::cli::Cli;
use prompt3d::config::Config;
use prompt3d::viewer::surface::RenderSurface;
use prompt3d::viewer::{OffscreenSurface, Viewer};
use prompt3d::window::surface::WindowSurface;
use prompt3d::window::{UserEvent, ViewerWindow};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli);

    let runtime = Runtime::new().context("Failed to start async runtime")?;
    let client = config.client().context("Failed to create backend client")?;
    let downloader = config.downloader();

    println!(
        "prompt3d - backend {}, exports go to {}",
        config.base_url,
        config.download_dir.display()
    );
    println!("Describe a model to generate it, or type /help");

    if config.headless {
        let mut app = App::new(client, downloader);
        let surface = OffscreenSurface::new(config.width, config.height);
        let viewer = Viewer::init_with(Some(surface), config.normalize)
            .context("Failed to initialize offscreen viewer")?;
        app.attach_viewer(viewer);
        runtime.block_on(run_headless(app))
    } else {
        run_windowed(runtime, App::new(client, downloader), config)
    }
}

async fn run_headless(mut app: App<OffscreenSurface, FileStorage>) -> Result<()> {
    app.check_backend().await;
    print_updates(&mut app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read terminal input")?
    {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match app.dispatch(command) {
            Dispatch::Handled => {}
            Dispatch::Send(pending) => {
                let outcome = app.client().transport().generate(&pending.request).await;
                app.finish_prompt(pending, outcome).await;
            }
            Dispatch::CheckHealth => app.check_backend().await,
            Dispatch::Quit => break,
        }

        render_snapshot(&mut app);
        print_updates(&mut app);
    }

    Ok(())
}

fn run_windowed(runtime: Runtime, app: App<WindowSurface, FileStorage>, config: Config) -> Result<()> {
    let _guard = runtime.enter();

    let event_loop = EventLoop::<UserEvent>::with_user_event()
        .build()
        .context("Failed to create event loop")?;
    let proxy = event_loop.create_proxy();
    spawn_terminal_reader(proxy.clone());

    let mut window = ViewerWindow::new(app, config, runtime.handle().clone(), proxy);
    window.check_backend();

    println!("Viewer controls: drag to orbit, wheel to zoom, W wireframe, G grid, R auto-rotate, C reset camera, 1-0 speed, Escape to quit");
    event_loop.run_app(&mut window).context("Event loop failed")?;

    Ok(())
}

/// Forwards terminal lines to the event loop until input closes.
fn spawn_terminal_reader(proxy: EventLoopProxy<UserEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if proxy.send_event(UserEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("Terminal input error: {}", e);
                    break;
                }
            }
        }
        let _ = proxy.send_event(UserEvent::InputClosed);
    });
}

/// Draws one offscreen frame so the headless viewer reflects the latest state.
fn render_snapshot<S: RenderSurface, St: Storage>(app: &mut App<S, St>) {
    let Some(viewer) = app.viewer_mut() else {
        return;
    };
    if let Err(e) = viewer.render_frame() {
        warn!("Offscreen render failed: {}", e);
        return;
    }
    if let Some(model) = viewer.model() {
        info!(
            "Frame {}: {} triangles, bounds {:?}",
            viewer.frames_rendered(),
            model.triangle_count(),
            model.world_bounds().size()
        );
    }
}

fn print_updates<S: RenderSurface, St: Storage>(app: &mut App<S, St>) {
    for line in app.drain_output() {
        println!("{}", line);
    }
}
