use std::collections::HashSet;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use gridcaster::player::Movement;
use gridcaster::renderer::render_frame;
use gridcaster::scaler::{ScaleLut, blit_nearest, build_scale_lut};
use gridcaster::texture::TextureTable;
use gridcaster::{Config, Controls, Game};

#[derive(Parser, Debug)]
#[command(name = "gridcaster", about = "Grid raycaster with billboard enemies")]
struct Cli {
    /// TOML scene/config file; the built-in demo scene is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    game: Game,
    textures: TextureTable,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal framebuffer at the configured screen size
    fb: Vec<u32>,
    fb_w: usize,
    fb_h: usize,

    scale_lut: ScaleLut,

    // Input
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>, // pressed since the last tick, no repeats
    last_tick: Instant,
}

impl App {
    fn new(game: Game) -> Self {
        let (fb_w, fb_h) = game.screen_size();
        Self {
            window: None,
            surface: None,
            game,
            textures: TextureTable::procedural(),
            frame_counter: 0,
            last_fps_print: Instant::now(),
            fb: vec![0; fb_w * fb_h],
            fb_w,
            fb_h,
            scale_lut: ScaleLut::empty(),
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            last_tick: Instant::now(),
        }
    }

    fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        let mut v = 0.0;
        if self.keys_down.contains(&negative) {
            v -= 1.0;
        }
        if self.keys_down.contains(&positive) {
            v += 1.0;
        }
        v
    }

    fn controls(&mut self) -> Controls {
        let controls = Controls {
            movement: Movement {
                forward: self.axis(KeyCode::KeyS, KeyCode::KeyW),
                strafe: self.axis(KeyCode::KeyA, KeyCode::KeyD),
                turn: self.axis(KeyCode::KeyJ, KeyCode::KeyL),
            },
            light_turn: self.axis(KeyCode::ArrowRight, KeyCode::ArrowLeft),
            fire: self.keys_down.contains(&KeyCode::Space),
            toggle_fisheye: self.keys_pressed.contains(&KeyCode::KeyF),
            toggle_overlay: self.keys_pressed.contains(&KeyCode::KeyU),
        };
        self.keys_pressed.clear();
        controls
    }

    fn tick(&mut self) {
        // Compute dt with cap to avoid huge jumps if the app was paused
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).min(Duration::from_millis(100));
        self.last_tick = now;

        let controls = self.controls();
        let start = Instant::now();
        let outcome = self.game.update(&controls, dt.as_secs_f32());
        tracing::trace!(elapsed_us = start.elapsed().as_micros() as u64, ?outcome, "frame updated");
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("gridcaster")
            .with_inner_size(LogicalSize::new(self.fb_w as f64, self.fb_h as f64));

        let window = match event_loop.create_window(attributes) {
            Ok(w) => Rc::new(w),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        match surface {
            Ok(s) => self.surface = Some(s),
            Err(e) => {
                tracing::error!("failed to create surface: {e}");
                event_loop.exit();
                return;
            }
        }

        let size = window.inner_size();
        self.scale_lut = build_scale_lut(size.width as usize, size.height as usize, self.fb_w, self.fb_h);

        self.last_tick = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => {
                    if code == KeyCode::Escape {
                        event_loop.exit();
                        return;
                    }
                    if !repeat {
                        self.keys_pressed.insert(code);
                    }
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.tick();

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
                    return; // Minimized window, skip drawing
                };
                let dw_px = dw.get() as usize;

                if let Err(e) = surface.resize(dw, dh) {
                    tracing::error!("surface resize failed: {e}");
                    return;
                }

                render_frame(&mut self.fb, self.fb_w, self.fb_h, &self.game, &self.textures);

                let mut buf = match surface.buffer_mut() {
                    Ok(b) => b,
                    Err(e) => {
                        tracing::error!("surface buffer unavailable: {e}");
                        return;
                    }
                };
                blit_nearest(&mut buf, dw_px, &self.fb, self.fb_w, &self.scale_lut);
                if let Err(e) = buf.present() {
                    tracing::error!("present failed: {e}");
                }

                self.frame_counter += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
                if elapsed >= 1.0 {
                    tracing::info!(
                        fps = self.frame_counter as f32 / elapsed,
                        enemies = self.game.enemies.len(),
                        fisheye = self.game.fisheye_correction,
                        angle = self.game.player.angle,
                        "frame stats"
                    );
                    self.frame_counter = 0;
                    self.last_fps_print = now;
                }

                window.request_redraw();
            }

            WindowEvent::Resized(new_size) => {
                self.scale_lut =
                    build_scale_lut(new_size.width as usize, new_size.height as usize, self.fb_w, self.fb_h);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("loading config from {}", path.display());
            Config::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Config::default(),
    };
    let game = Game::from_config(&config).context("building scene")?;

    tracing::info!("gridcaster starting");
    tracing::info!("WASD move, J/L turn, Space fire, F fisheye, U overlay, arrows rotate light");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(game);
    event_loop.run_app(&mut app)?;

    Ok(())
}
