use comfy_table::{CellAlignment, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use gemm_adaptor::backends::common::kernel::gemm::{KernelRegistry, TileTraversal};

pub fn handle_list() -> Result<(), Box<dyn std::error::Error>> {
    let registry = KernelRegistry::with_default_variants()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Kernel", "DType", "Family", "Variant", "Tile", "Threads", "Stages", "Traversal", "Shared, B"]);

    for info in registry.variants() {
        let tile = info.tile;
        let traversal = match tile.traversal {
            TileTraversal::Identity {
                log_tile,
            } => format!("identity<{}>", 1u32 << log_tile),
            TileTraversal::Horizontal => "horizontal".to_string(),
        };
        table.add_row(vec![
            info.name,
            info.data_type.to_string(),
            info.family.to_string(),
            info.variant.to_string(),
            format!("{}x{}x{}", tile.tile_m, tile.tile_n, tile.tile_k),
            tile.thread_count.to_string(),
            tile.stages.to_string(),
            traversal,
            info.shared_memory_bytes.to_string(),
        ]);
    }
    for index in [5, 6, 8] {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    println!("{table}");

    Ok(())
}
