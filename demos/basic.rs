//! Render a small bar chart to `output.png`.
//!
//! Requires `phantomjs` on `PATH` (or `DOMSHOT_PHANTOMJS_PATH` in `app.env`).
//!
//! ```text
//! RUST_LOG=debug cargo run --example basic
//! ```

use domshot::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut shot = DomShot::from_env()?;
    shot.load_files(["demos/assets/style.css", "demos/assets/app.js"])?;
    shot.load_html("<body><h1>ohai, world</h1></body>");
    shot.set_var("values", NdArray::vector(vec![40.0, 120.0, 75.0, 160.0, 95.0]))?;
    shot.load_js("drawBars(values);");

    shot.render_to("output.png")?;
    log::info!("Wrote output.png");
    Ok(())
}
