use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::info;
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, Event, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::Window;

use camera_debugger::{
    Camera, DemoApp, DemoScene, MouseButton, PointerState, RecordingContext, Renderer,
    TargetCamera, WgpuContext, FRUSTUM_EDGE_COUNT,
};

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;
/// Pixels of trackpad scrolling counted as one wheel step.
const PIXELS_PER_WHEEL_STEP: f32 = 100.0;
/// Degrees added to or removed from the target fov per arrow key press.
const FOV_STEP: f32 = 5.0;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    if options.summary_only {
        return run_headless(&options);
    }
    match run_interactive(&options) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                run_headless(&options)
            } else {
                Err(err)
            }
        }
    }
}

fn run_headless(options: &CliOptions) -> Result<()> {
    let scene = options.scene(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    let mut ctx = RecordingContext::new();
    let mut app = DemoApp::with_scene(&mut ctx, scene, DEFAULT_WIDTH, DEFAULT_HEIGHT)?;

    let camera = app.scene().camera();
    println!(
        "Target camera: fov={:.1} near={:.1} far={:.1} aspect={:.3}",
        camera.fov(),
        camera.near(),
        camera.far(),
        camera.aspect()
    );

    for frame in 0..options.frames {
        app.frame(&mut ctx)
            .with_context(|| format!("failed to render frame {frame}"))?;
    }

    println!("Frustum vertices:");
    for (index, vertex) in app.overlay().frustum_mesh().vertices.iter().enumerate() {
        println!(
            " - v{index} ({:.2}, {:.2}, {:.2})",
            vertex.x, vertex.y, vertex.z
        );
    }
    println!("Frustum edges: {FRUSTUM_EDGE_COUNT}");

    let position = app.scene().camera().position();
    println!(
        "Target position: ({:.2}, {:.2}, {:.2})",
        position.x, position.y, position.z
    );
    println!(
        "Recorded {} draw call(s) in {} frame(s)",
        ctx.draws().len(),
        options.frames
    );
    Ok(())
}

fn run_interactive(options: &CliOptions) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;

    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("Camera Debugger")
                    .with_inner_size(LogicalSize::new(
                        DEFAULT_WIDTH as f64,
                        DEFAULT_HEIGHT as f64,
                    )),
            )
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let mut renderer = block_on(Renderer::new(Arc::clone(&window)))?;
    let size = renderer.size();
    let scene = options.scene(size.width, size.height);
    let demo = DemoApp::with_scene(renderer.context(), scene, size.width, size.height)?;

    let mut app = AppState {
        renderer,
        demo,
        pointer: PointerState::new(),
        last_error: None,
    };

    #[allow(deprecated)]
    event_loop
        .run(|event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);
            if let Err(err) = app.process_event(&event, elwt) {
                app.last_error = Some(err);
                elwt.exit();
            }
        })
        .context("event loop failed")?;

    if let Some(err) = app.last_error {
        return Err(err);
    }

    Ok(())
}

struct AppState {
    renderer: Renderer,
    demo: DemoApp<WgpuContext>,
    pointer: PointerState,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, elwt: &ActiveEventLoop) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                        self.demo.resize(size.width, size.height)?;
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = self.renderer.window().inner_size();
                        self.renderer.resize(size);
                        self.demo.resize(size.width, size.height)?;
                    }
                    WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(event)?,
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button)
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let pos = Vec2::new(position.x as f32, position.y as f32);
                        self.pointer.set_position(pos);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let steps = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(position) => {
                                position.y as f32 / PIXELS_PER_WHEEL_STEP
                            }
                        };
                        self.pointer.add_wheel(steps);
                    }
                    WindowEvent::RedrawRequested => {
                        let input = self.pointer.take_orbit_input();
                        self.demo.handle_orbit_input(&input);
                        self.demo.frame(self.renderer.context())?;
                        if !self.renderer.present_or_recover() {
                            return Err(anyhow!("GPU is out of memory"));
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, event: &KeyEvent) -> Result<()> {
        if event.state != ElementState::Pressed || event.repeat {
            return Ok(());
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => {
                self.demo.toggle_pause();
            }
            Key::Character(text) if text.eq_ignore_ascii_case("d") => {
                let enabled = self.demo.toggle_debug_view();
                info!("camera debugger {}", if enabled { "shown" } else { "hidden" });
            }
            Key::Named(NamedKey::ArrowUp) => {
                let fov = self.demo.adjust_fov(FOV_STEP)?;
                info!("target fov {fov:.0}");
            }
            Key::Named(NamedKey::ArrowDown) => {
                let fov = self.demo.adjust_fov(-FOV_STEP)?;
                info!("target fov {fov:.0}");
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: WinitMouseButton) {
        let index = match button {
            WinitMouseButton::Left => 0,
            WinitMouseButton::Right => 1,
            WinitMouseButton::Middle => 2,
            WinitMouseButton::Back => 3,
            WinitMouseButton::Forward => 4,
            WinitMouseButton::Other(value) => value.min(u8::MAX as u16) as u8,
        };
        let button = MouseButton::new(index);
        match state {
            ElementState::Pressed => self.pointer.set_button_down(button),
            ElementState::Released => self.pointer.set_button_up(button),
        }
    }
}

struct CliOptions {
    summary_only: bool,
    frames: u32,
    fov: Option<f32>,
    near: Option<f32>,
    far: Option<f32>,
}

impl CliOptions {
    const USAGE: &'static str =
        "Usage: camera-debugger [--summary-only] [--frames N] [--fov DEG] [--near N] [--far N]";

    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            summary_only: false,
            frames: 1,
            fov: None,
            near: None,
            far: None,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--frames" => options.frames = parse_value(&arg, args.next())?,
                "--fov" => options.fov = Some(parse_value(&arg, args.next())?),
                "--near" => options.near = Some(parse_value(&arg, args.next())?),
                "--far" => options.far = Some(parse_value(&arg, args.next())?),
                "--help" | "-h" => return Err(anyhow!(Self::USAGE)),
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {}", Self::USAGE));
                }
            }
        }

        let near = options.near.unwrap_or(500.0);
        let far = options.far.unwrap_or(2000.0);
        if near <= 0.0 || far <= near {
            return Err(anyhow!(
                "Invalid clip planes: near={near} far={far} (expected 0 < near < far)"
            ));
        }
        if let Some(fov) = options.fov {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(anyhow!("Invalid fov: {fov} (expected 0 < fov < 180)"));
            }
        }
        Ok(options)
    }

    fn scene(&self, width: u32, height: u32) -> DemoScene {
        DemoScene::with_lens(
            width as f32,
            height as f32,
            self.fov.unwrap_or(60.0),
            self.near.unwrap_or(500.0),
            self.far.unwrap_or(2000.0),
        )
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T> {
    let value = value.ok_or_else(|| anyhow!("{flag} expects a value"))?;
    value
        .parse()
        .map_err(|_| anyhow!("Invalid value for {flag}: {value}"))
}
