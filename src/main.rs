// Goalkeeper-3D: an interactive goal-and-goalkeeper scene
//
// Keys: o orbit, w wireframe, 1/2 ball spin about X/Y, 3 shrink goal,
// Up/Down spin speed, a/d move the goalkeeper.

// Module declarations
mod camera;
mod input;
mod math;
mod mesh;
mod renderer;
mod scene;

use winit::event_loop::EventLoop;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Create event loop
    let event_loop = EventLoop::new().expect("Failed to create event loop");

    // Create renderer
    let renderer = renderer::Renderer::new(&event_loop).await;

    // Run the renderer
    renderer.run(event_loop);
}
