//! `vellum-render`: draw a scene of replaced elements to a PNG.
//!
//! Usage: `vellum-render <scene.toml> <out.png>`

mod scene;
mod sizing;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use vellum_replaced::{Canvas, Rect, Registry, ResolveContext};

use scene::Scene;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let (Some(scene_path), Some(out_path)) = (args.next(), args.next()) else {
        bail!("usage: vellum-render <scene.toml> <out.png>");
    };
    let scene_path = PathBuf::from(scene_path);
    let out_path = PathBuf::from(out_path);

    let scene = Scene::load(&scene_path)?;
    let canvas = render(&scene)?;
    canvas
        .save_png(&out_path)
        .with_context(|| format!("writing {}", out_path.display()))?;
    log::info!(
        "rendered {} element(s) from {} to {}",
        scene.elements.len(),
        scene_path.display(),
        out_path.display()
    );
    Ok(())
}

/// Resolve, size and draw every element of `scene` onto a fresh canvas.
fn render(scene: &Scene) -> Result<Canvas> {
    let config = &scene.config;
    let background = config.background_color()?;
    let base = config.base()?;
    let decoder = config.build_decoder();
    let registry = Registry::with_builtin_probes();

    let mut cx = ResolveContext::new(&decoder);
    if let Some(base) = &base {
        cx = cx.with_base_url(base);
    }

    let mut canvas = Canvas::new(config.canvas_width, config.canvas_height, background);
    for item in &scene.elements {
        let element = item.to_element();
        let Some(replacement) = registry.resolve(&element, &cx) else {
            log::info!("<{}> is not a replaced element; skipped", element.tag());
            continue;
        };
        let size = sizing::used_size(&element, replacement.as_ref());
        let target = Rect::new(item.x, item.y, size.width, size.height);
        log::debug!("drawing <{}> at {target:?}", element.tag());
        replacement.draw(&mut canvas, target);
    }
    log::debug!("raster cache holds {} image(s)", decoder.len());
    Ok(canvas)
}
