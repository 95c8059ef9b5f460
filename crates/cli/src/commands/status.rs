use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use imagepress_core::domain::{Capabilities, CatalogStats};
use imagepress_core::Pipeline;

/// One row of the codec table.
#[derive(Debug, PartialEq)]
pub(crate) struct CapabilityRow {
    pub(crate) name: &'static str,
    pub(crate) available: bool,
    pub(crate) required: bool,
}

pub(crate) fn capability_rows(caps: &Capabilities) -> Vec<CapabilityRow> {
    vec![
        CapabilityRow {
            name: "Decode/encode (JPEG, PNG, WebP)",
            available: caps.decode,
            required: true,
        },
        CapabilityRow {
            name: "Lossy WebP encoder",
            available: caps.webp,
            required: true,
        },
        CapabilityRow {
            name: "EXIF orientation reader",
            available: caps.exif,
            required: false,
        },
    ]
}

/// Share of catalog records already processed, as a whole percentage.
pub(crate) fn percent_processed(stats: &CatalogStats) -> u32 {
    if stats.total == 0 {
        return 100;
    }
    (stats.processed as f64 * 100.0 / stats.total as f64).floor() as u32
}

pub fn run(pipeline: &Pipeline) -> Result<()> {
    let stats = pipeline.status()?;
    let caps = pipeline.capabilities();
    let config = pipeline.config();

    println!();
    println!("  ImagePress Status");
    println!("  =================");
    println!();
    println!("  Catalog");
    println!("  -------");
    println!(
        "   Images:     {:>8}        Content root: {}",
        stats.total,
        config.content_root.display()
    );
    println!(
        "   Processed:  {:>8}        Lock file:    {}",
        stats.processed,
        config.lock_path.display()
    );
    println!(
        "   Pending:    {:>8}        Complete:     {:>7}%",
        stats.pending,
        percent_processed(&stats)
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Capability"),
        Cell::new("Required"),
        Cell::new("Available"),
    ]);
    for row in capability_rows(&caps) {
        let available = match (row.available, row.required) {
            (true, _) => Cell::new("yes").fg(Color::Green),
            (false, true) => Cell::new("MISSING").fg(Color::Red),
            (false, false) => Cell::new("no").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(row.name),
            Cell::new(if row.required { "yes" } else { "no" }),
            available,
        ]);
    }

    println!();
    println!("  Codecs");
    println!("  ------");
    println!("{table}");

    if stats.pending > 0 {
        println!();
        println!("  Run 'imagepress process' to generate the pending renditions.");
    }
    println!();

    Ok(())
}
