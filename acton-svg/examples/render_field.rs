//! Renders an image field holding a hostile SVG, a PNG and a missing file
//!
//! Run with:
//! ```bash
//! RUST_LOG=debug cargo run --example render_field
//! ```

use acton_svg::observability;
use acton_svg::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init()?;

    let storage = MemoryFileStorage::new().with_public_url("https://cdn.example.com");
    storage.insert(
        "public://logo.svg",
        "image/svg+xml",
        br#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10" onload="alert(1)">
  <script>alert(document.cookie)</script>
  <circle cx="5" cy="5" r="4" fill="teal"/>
</svg>"#
            .to_vec(),
    );
    storage.insert(
        "public://photo.png",
        "image/png",
        vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
    );

    let items = vec![
        FieldItem::new(0, FileItem::new("1", "public://logo.svg", "logo.svg", "image/svg+xml"))
            .with_alt("Company logo"),
        FieldItem::new(1, FileItem::new("2", "public://photo.png", "photo.png", "image/png"))
            .with_alt("Team photo"),
        FieldItem::new(2, FileItem::new("3", "public://gone.svg", "gone.svg", "image/svg+xml")),
    ];

    let settings = RenderSettings {
        render_as_image: false,
        alt_as_title: true,
        svg_attributes: SvgAttributes::new("64", "64"),
        ..RenderSettings::default()
    };
    settings.validate()?;

    println!("Settings:");
    for line in settings.summary() {
        println!("  {line}");
    }

    let formatter = SvgImageFormatter::new(FileGateway::new(storage));
    for element in formatter.render(&items, &settings).await {
        println!("\n[{}] {}", element.delta, element.to_html());
        println!("    cache tags: {:?}", element.cache.tags);
    }

    Ok(())
}
