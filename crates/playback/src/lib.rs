//! Play/pause state machine and frame scheduling for a shader canvas.
//!
//! The crate owns everything about *when* a frame is drawn and at what shader
//! time; *how* a frame is drawn lives behind the [`FrameRenderer`] trait. The
//! embedding event loop feeds the two input properties (fragment source text
//! and the playing flag) plus frame/resize notifications into [`Playback`],
//! which reacts by disposing and rebuilding renderer state, starting or
//! freezing the [`RenderClock`], and handing back [`Continuation`] values that
//! say whether another frame should be scheduled.
//!
//! ```text
//!   set_source ──▶ dispose old ──▶ initialize new ──▶ Playing / Paused
//!   set_playing ──▶ clock pause/resume ──▶ one frozen frame / Schedule
//!   on_frame(ticket) ──▶ liveness check ──▶ draw_frame ──▶ Schedule
//! ```
//!
//! Scheduling is cooperative: a [`FrameTicket`] carries the generation it was
//! issued for, and a ticket from a dead generation (the source changed, the
//! animation paused, the canvas unmounted) is a no-op instead of a draw
//! against disposed resources.

mod clock;

pub use clock::RenderClock;

use std::time::Instant;

use tracing::{debug, error};

/// Drawable surface extent in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Renderer seam the playback machine drives.
///
/// The wgpu renderer implements this for real surfaces; tests substitute a
/// resource-counting fake. `initialize` turns fragment source text into an
/// owned handle, `draw_frame` presents one frame at the given shader time,
/// and `dispose` consumes the handle, releasing whatever it owns. Playback
/// guarantees `dispose` runs for the old handle before the next `initialize`
/// begins and that no `draw_frame` happens after `dispose`.
pub trait FrameRenderer {
    type Handle;
    type Error: std::error::Error;

    fn initialize(&mut self, fragment_source: &str) -> Result<Self::Handle, Self::Error>;
    fn draw_frame(&mut self, handle: &mut Self::Handle, shader_time: f32, size: SurfaceSize);
    fn dispose(&mut self, handle: Self::Handle);
}

/// Observable playback states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    /// No live program; the initial state and where initialize failures land.
    Stopped,
    /// Continuous animation; a frame is in flight or scheduled.
    Playing,
    /// Frozen at the pause-instant shader time; redraws reuse that value.
    Paused,
}

/// Proof that a scheduled frame belongs to the current generation.
///
/// Issued by [`Playback`] whenever it wants another frame; the embedding
/// passes it back on delivery. Source changes, pauses, and shutdown bump the
/// generation, so a stale ticket fails the liveness check inside
/// [`Playback::on_frame`] rather than touching disposed GPU state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

/// What the embedding should do after an event was absorbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// Request a redraw for the next display refresh and return the ticket.
    Schedule(FrameTicket),
    /// Nothing to schedule; the loop stays idle until the next notification.
    Idle,
}

impl Continuation {
    pub fn ticket(self) -> Option<FrameTicket> {
        match self {
            Continuation::Schedule(ticket) => Some(ticket),
            Continuation::Idle => None,
        }
    }
}

/// Owns the play/pause state machine, the clock, and the renderer handle.
pub struct Playback<R: FrameRenderer> {
    renderer: R,
    handle: Option<R::Handle>,
    state: PlayState,
    clock: RenderClock,
    generation: u64,
    is_playing: bool,
    size: SurfaceSize,
    last_failure: Option<R::Error>,
}

impl<R: FrameRenderer> Playback<R> {
    /// Creates a stopped machine for the given surface extent.
    pub fn new(renderer: R, size: SurfaceSize) -> Self {
        Self {
            renderer,
            handle: None,
            state: PlayState::Stopped,
            clock: RenderClock::started(Instant::now()),
            generation: 0,
            is_playing: false,
            size,
            last_failure: None,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    /// The failure that left the machine stopped, if the last initialize failed.
    pub fn last_failure(&self) -> Option<&R::Error> {
        self.last_failure.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Replaces the fragment source, rebuilding renderer state.
    ///
    /// The previous handle is fully disposed before the new initialize
    /// begins; the machine never holds two live programs. On success the
    /// clock restarts at zero and the machine enters `Playing` or `Paused`
    /// according to the current playing flag (a paused mount still draws one
    /// frame so the surface is not blank). On failure the diagnostic is
    /// logged, the failure is retained for [`Self::last_failure`], and the
    /// machine stays `Stopped`; retrying would fail identically until the
    /// source changes again.
    pub fn set_source(&mut self, fragment_source: &str, now: Instant) -> Continuation {
        self.stop_internal();
        match self.renderer.initialize(fragment_source) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.last_failure = None;
                self.clock = RenderClock::started(now);
                if self.is_playing {
                    self.state = PlayState::Playing;
                    self.schedule()
                } else {
                    self.state = PlayState::Paused;
                    self.draw_frozen_frame();
                    Continuation::Idle
                }
            }
            Err(err) => {
                error!(error = %err, "shader initialize failed; canvas stays stopped");
                self.last_failure = Some(err);
                Continuation::Idle
            }
        }
    }

    /// Applies a change of the playing flag.
    ///
    /// `Playing -> Paused` freezes the clock at the transition instant,
    /// cancels the scheduled frame, and draws one more frame at the frozen
    /// time so the displayed image reflects the pause instant. `Paused ->
    /// Playing` rebases the clock so shader time continues smoothly. In
    /// `Stopped` only the desired flag is recorded for the next initialize.
    pub fn set_playing(&mut self, playing: bool, now: Instant) -> Continuation {
        if playing == self.is_playing {
            return Continuation::Idle;
        }
        self.is_playing = playing;
        match (self.state, playing) {
            (PlayState::Playing, false) => {
                self.clock.pause(now);
                self.generation = self.generation.wrapping_add(1);
                self.state = PlayState::Paused;
                self.draw_frozen_frame();
                Continuation::Idle
            }
            (PlayState::Paused, true) => {
                self.clock.resume(now);
                self.state = PlayState::Playing;
                self.schedule()
            }
            _ => Continuation::Idle,
        }
    }

    /// Delivers a scheduled frame.
    ///
    /// A ticket from a dead generation is dropped without touching the
    /// renderer. While playing, the clock advances, one frame is drawn at
    /// the surface's current size, and the next frame is scheduled.
    pub fn on_frame(&mut self, ticket: FrameTicket, now: Instant, size: SurfaceSize) -> Continuation {
        if ticket.generation != self.generation {
            debug!("dropping frame scheduled for a canceled generation");
            return Continuation::Idle;
        }
        if self.state != PlayState::Playing {
            return Continuation::Idle;
        }
        self.size = size;
        let shader_time = self.clock.sample(now);
        if let Some(handle) = self.handle.as_mut() {
            self.renderer.draw_frame(handle, shader_time, size);
        }
        self.schedule()
    }

    /// Notes a new surface extent.
    ///
    /// While paused this redraws immediately with the frozen shader time;
    /// while playing the next scheduled frame picks the size up, and the
    /// renderer resynchronizes its backing store at the top of `draw_frame`
    /// in either case. A resize never recompiles the shader.
    pub fn resize(&mut self, size: SurfaceSize) {
        if size == self.size {
            return;
        }
        self.size = size;
        if self.state == PlayState::Paused {
            self.draw_frozen_frame();
        }
    }

    /// Redraws after an externally-triggered expose without changing state.
    pub fn refresh(&mut self, now: Instant) {
        match self.state {
            PlayState::Playing => {
                let shader_time = self.clock.sample(now);
                if let Some(handle) = self.handle.as_mut() {
                    self.renderer.draw_frame(handle, shader_time, self.size);
                }
            }
            PlayState::Paused => self.draw_frozen_frame(),
            PlayState::Stopped => {}
        }
    }

    /// Stops the animation and disposes the live program, if any.
    pub fn shutdown(&mut self) {
        self.stop_internal();
    }

    fn stop_internal(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            self.renderer.dispose(handle);
        }
        self.state = PlayState::Stopped;
    }

    fn draw_frozen_frame(&mut self) {
        let shader_time = self.clock.frozen_seconds();
        if let Some(handle) = self.handle.as_mut() {
            self.renderer.draw_frame(handle, shader_time, self.size);
        }
    }

    fn schedule(&mut self) -> Continuation {
        Continuation::Schedule(FrameTicket {
            generation: self.generation,
        })
    }
}

impl<R: FrameRenderer> Drop for Playback<R> {
    fn drop(&mut self) {
        self.stop_internal();
    }
}
