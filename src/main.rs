mod camera;
mod components;
mod engine;
mod renderer;
mod scene;
mod systems;

use camera::Camera;
use clap::Parser;
use engine::input::InputState;
use engine::time::FrameTimer;
use engine::window::DemoWindow;
use glam::Vec3;
use hecs::World;
use renderer::{Renderer, ShadowSettings};
use scene::test_scene::load_shadow_scene;
use sdl2::keyboard::Scancode;
use systems::{sun_orbit_system, toggle_sun_orbit, transform_propagation_system};
use tracing_subscriber::EnvFilter;
use umbra::csm::uniforms::MAX_CASCADES;
use umbra::csm::{FitSettings, DEFAULT_SPLIT_LAMBDA};
use umbra::CsmConfig;

const LAMBDA_STEP: f32 = 0.1;

#[derive(Parser)]
#[command(name = "umbra", about = "Cascaded shadow map demo")]
struct Args {
    /// Number of shadow cascades
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=MAX_CASCADES as i64))]
    cascades: u8,
    /// Width and height of each cascade's shadow map
    #[arg(long, default_value_t = 2048)]
    shadow_size: u32,
    /// Width and height of the spot and tube light shadow maps
    #[arg(long, default_value_t = 1024)]
    perspective_shadow_size: u32,
    /// Blend between uniform (0) and logarithmic (1) cascade splits
    #[arg(long, default_value_t = DEFAULT_SPLIT_LAMBDA)]
    lambda: f32,
    /// PCF taps per shadow lookup
    #[arg(long, default_value_t = 16)]
    pcf_samples: u32,
    /// Blocker search taps per cascade lookup
    #[arg(long, default_value_t = 16)]
    blocker_samples: u32,
    /// Camera far plane, also the end of the last cascade
    #[arg(long, default_value_t = 100.0)]
    far: f32,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Disable vsync
    #[arg(long)]
    no_vsync: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let sdl = sdl2::init().expect("Failed to init SDL2");
    let mut window = DemoWindow::new(&sdl, "umbra", args.width, args.height, !args.no_vsync)
        .expect("Failed to create window");

    let camera_near = 0.1;
    let mut camera = Camera::new(Vec3::new(0.0, 4.0, 12.0), camera_near, args.far.max(camera_near + 1.0));

    let settings = ShadowSettings {
        csm: CsmConfig {
            near: camera.near,
            far: camera.far,
            cascade_count: args.cascades as usize,
            lambda: args.lambda.clamp(0.0, 1.0),
            shadow_map_width: args.shadow_size,
            shadow_map_height: args.shadow_size,
            fit: FitSettings::default(),
        },
        perspective_size: args.perspective_shadow_size,
        blocker_search_samples: args.blocker_samples,
        pcf_samples: args.pcf_samples,
        shadow_multiplier: 0.85,
        tube_fov: 120.0_f32.to_radians(),
    };
    let mut renderer = Renderer::init(settings).expect("Failed to initialise renderer");

    let mut world = World::new();
    let meshes = load_shadow_scene(&mut world);

    sdl.mouse().set_relative_mouse_mode(true);

    let mut event_pump = sdl.event_pump().expect("Failed to get event pump");
    let mut input = InputState::new();
    let mut timer = FrameTimer::new();

    tracing::info!("WASD/Space/Ctrl fly, P pauses the sun, C tints cascades, Up/Down change split lambda");

    loop {
        timer.tick();
        input.update(&mut event_pump);

        if input.quit {
            break;
        }

        if input.was_pressed(Scancode::P) {
            toggle_sun_orbit(&mut world);
        }
        if input.was_pressed(Scancode::C) {
            renderer.show_cascades = !renderer.show_cascades;
        }
        if input.was_pressed(Scancode::Up) {
            renderer.set_split_lambda(renderer.split_lambda() + LAMBDA_STEP);
        }
        if input.was_pressed(Scancode::Down) {
            renderer.set_split_lambda(renderer.split_lambda() - LAMBDA_STEP);
        }

        camera.look(input.mouse_dx, input.mouse_dy);
        camera.fly(&input, timer.dt);

        sun_orbit_system(&mut world, timer.dt);
        transform_propagation_system(&mut world);

        renderer.draw_scene(&world, &meshes, &camera, window.size());
        window.swap();

        if let Some(fps) = timer.fps() {
            window.set_title(&format!("umbra | {fps:.0} fps | lambda {:.1}", renderer.split_lambda()));
        }
    }
}
