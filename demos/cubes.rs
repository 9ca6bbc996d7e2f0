//! Two cubes on a plane under a randomized light.
//!
//! Mirrors a typical tabletop capture setup: the cubes jitter around the
//! middle of the plane with a free spin about Z, the light wanders and
//! changes power, and every object draws its material from a shared pool.

use anyhow::Result;
use tattie::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let camera = RenderCamera::new(1.2, 0.9, 0.6, Vector3::zero(), (640, 480));
    let mut scene = Scene::new(camera);

    scene.add_material_rgb("RedMaterial", 0.8, 0.1, 0.1);
    scene.add_material_rgb("GreenMaterial", 0.1, 0.8, 0.1);
    scene.add_material("Concrete", [0.55, 0.55, 0.5, 1.0], 0.0, 0.9);

    scene.add_object(
        Object::cube("cube1")
            .with_class("cube")
            .with_scale(Vector3::new(0.1, 0.1, 0.1)),
    );
    scene.add_object(
        Object::cube("cube2")
            .with_class("cube")
            .with_scale(Vector3::new(0.1, 0.1, 0.1)),
    );
    scene.add_object(
        Object::cube("plane")
            .with_class("plane")
            .with_scale(Vector3::new(1.0, 1.0, 0.01)),
    );
    scene.add_light(Light::new("light", 10.0).at(Vector3::new(0.0, 0.0, 1.0)));

    let materials = ["RedMaterial", "GreenMaterial", "Concrete"];
    let config = RandomizationConfig::new()
        .with_seed(1)
        .with_light(
            LightRule::new("light")
                .with_power(5.0, 15.0)
                .with_color([0.8, 0.8, 0.8], [1.0, 1.0, 1.0])
                .with_location([-1.0, -1.0, 0.5], [1.0, 1.0, 1.5]),
        )
        .with_object(
            ObjectRule::new("cube1")
                .with_location([-0.10, -0.10, 0.05], [0.10, 0.10, 0.15])
                .with_rotation([-0.05, -0.05, -3.15], [0.05, 0.05, 3.15])
                .with_materials(&materials),
        )
        .with_object(
            ObjectRule::new("cube2")
                .with_location([-0.10, -0.10, 0.05], [0.10, 0.10, 0.15])
                .with_rotation([-0.05, -0.05, -3.15], [0.05, 0.05, 3.15])
                .with_materials(&materials),
        )
        .with_object(ObjectRule::new("plane").with_materials(&materials));

    let pipeline = tattie::default_pipeline(scene, config, "output/cubes", RunOptions::new(20))?;
    let summary = pipeline.run()?;

    println!(
        "wrote {} samples, skipped {}, manifest at {:?}",
        summary.written.len(),
        summary.skipped.len(),
        summary.manifest
    );
    Ok(())
}
