//! Smallest possible end-to-end run: one cube, one light, five frames.

use anyhow::Result;
use tattie::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let camera = RenderCamera::new(5.0, 0.4, 0.2, Vector3::zero(), (320, 240));
    let mut scene = Scene::new(camera);
    scene.add_material_rgb("red", 0.9, 0.1, 0.1);
    scene.add_object(Object::cube("cube").with_material("red"));
    scene.add_light(Light::new("lamp", 10.0));

    let config = RandomizationConfig::new()
        .with_seed(42)
        .with_object(ObjectRule::new("cube").with_location([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]));

    let pipeline =
        tattie::default_pipeline(scene, config, "output/quickstart", RunOptions::new(5))?;
    let summary = pipeline.run()?;
    println!("wrote {} samples", summary.written.len());
    Ok(())
}
