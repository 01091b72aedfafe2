use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, ensure, Context, Result};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use gallery::Gallery;
use playback::{FrameTicket, Playback, SurfaceSize};
use renderer::CanvasRenderer;

use crate::cli::{parse_size, RunArgs};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn list(args: &RunArgs) -> Result<()> {
    let gallery = load_gallery(args)?;
    if let Some(title) = gallery.title() {
        println!("{title}");
    }
    println!("Gallery entries:");
    for entry in gallery.entries() {
        println!(
            "  {:<20} {:<28} tags={}",
            entry.slug,
            entry.title,
            entry.tags.join(",")
        );
    }
    Ok(())
}

/// Opens the viewer window and drives the `winit` event loop.
///
/// The loop owns a [`Playback`] wrapping the canvas renderer; keyboard input
/// maps onto the core's two input properties (space toggles the playing
/// flag, the arrow keys switch the fragment source) and redraw scheduling
/// follows the playback machine's continuations: a pending ticket means
/// "request another redraw once winit is about to wait", which paces the
/// animation to the display's refresh.
pub fn run(args: RunArgs) -> Result<()> {
    let gallery = load_gallery(&args)?;
    ensure!(
        !gallery.is_empty(),
        "gallery at {} has no entries",
        args.gallery.display()
    );

    let mut selected = match &args.shader {
        Some(slug) => gallery
            .position(slug)
            .ok_or_else(|| anyhow!("gallery has no entry '{slug}' (try `shaderdeck list`)"))?,
        None => 0,
    };
    let (width, height) = parse_size(&args.size)?;

    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window = WindowBuilder::new()
        .with_title("shaderdeck")
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .context("failed to create viewer window")?;
    let window = Arc::new(window);

    let surface_size = SurfaceSize::new(width, height);
    let renderer = CanvasRenderer::new(window.as_ref(), surface_size)
        .context("failed to acquire a graphics context for the viewer window")?;

    let mut playback = Playback::new(renderer, surface_size);
    let mut is_playing = !args.paused;
    playback.set_playing(is_playing, Instant::now());
    let mut pending = mount_entry(&mut playback, &gallery, selected, &window);

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            elwt.exit();
                        }
                        WindowEvent::Resized(new_size) => {
                            playback.resize(SurfaceSize::new(new_size.width, new_size.height));
                        }
                        WindowEvent::KeyboardInput { event: key, .. } => {
                            if key.state != ElementState::Pressed || key.repeat {
                                return;
                            }
                            match key.logical_key {
                                Key::Named(NamedKey::Space) => {
                                    is_playing = !is_playing;
                                    // Pausing yields no ticket, which also stops
                                    // the AboutToWait redraw requests.
                                    pending =
                                        playback.set_playing(is_playing, Instant::now()).ticket();
                                }
                                Key::Named(NamedKey::ArrowRight) => {
                                    selected = (selected + 1) % gallery.len();
                                    pending = mount_entry(&mut playback, &gallery, selected, &window);
                                }
                                Key::Named(NamedKey::ArrowLeft) => {
                                    selected = (selected + gallery.len() - 1) % gallery.len();
                                    pending = mount_entry(&mut playback, &gallery, selected, &window);
                                }
                                Key::Named(NamedKey::Escape) => {
                                    elwt.exit();
                                }
                                _ => {}
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            let inner = window.inner_size();
                            let size = SurfaceSize::new(inner.width, inner.height);
                            match pending.take() {
                                Some(ticket) => {
                                    pending = playback.on_frame(ticket, Instant::now(), size).ticket();
                                }
                                // Expose events while paused redraw the frozen frame.
                                None => playback.refresh(Instant::now()),
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    if pending.is_some() {
                        window.request_redraw();
                    }
                }
                Event::LoopExiting => {
                    playback.shutdown();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

fn load_gallery(args: &RunArgs) -> Result<Gallery> {
    Gallery::load(&args.gallery)
        .with_context(|| format!("failed to load gallery at {}", args.gallery.display()))
}

/// Switches the canvas to the gallery entry at `index`.
///
/// A failing shader leaves the canvas stopped on its last presented frame;
/// the diagnostic has already been logged by the playback machine, so only a
/// short note is added here and browsing continues.
fn mount_entry(
    playback: &mut Playback<CanvasRenderer>,
    gallery: &Gallery,
    index: usize,
    window: &Window,
) -> Option<FrameTicket> {
    let entry = &gallery.entries()[index];
    window.set_title(&format!("shaderdeck: {}", entry.title));
    let continuation = playback.set_source(entry.fragment_source(), Instant::now());
    if playback.last_failure().is_some() {
        tracing::warn!(slug = %entry.slug, "entry failed to build; canvas keeps its last frame");
    }
    continuation.ticket()
}
