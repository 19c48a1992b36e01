//! End-to-end persistence: build from a file, save, load into a fresh
//! instance, and check that every lookup agrees with the original.

use std::io::Write;
use std::path::PathBuf;

use dictcol_ingest::{build, BuildOptions};
use dictcol_query::{find_prefix_scalar, find_prefix_simd, find_scalar, find_simd};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("dictcol_test_image_round_trip");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn lookups_agree_after_reload() {
    let statuses = ["active", "pending", "completed", "failed", "archived"];
    let mut rng = SmallRng::seed_from_u64(1234);
    let lines: Vec<String> = (0..2_000)
        .map(|i| {
            if rng.gen_bool(0.6) {
                statuses[rng.gen_range(0..statuses.len())].to_string()
            } else {
                format!("order_{}", i % 250)
            }
        })
        .collect();

    let input = temp_dir().join("input.txt");
    let mut f = std::fs::File::create(&input).unwrap();
    f.write_all((lines.join("\n") + "\n").as_bytes()).unwrap();

    let opts = BuildOptions {
        workers: 4,
        ..BuildOptions::default()
    };
    let original = build(&input, &opts).unwrap();

    let image = temp_dir().join("column.bin");
    dictcol_store::save(&original, &image).unwrap();
    let reloaded = dictcol_store::load(&image).unwrap();

    assert_eq!(reloaded.dictionary_size(), original.dictionary_size());
    assert_eq!(reloaded.encoded(), original.encoded());
    assert!(reloaded.compression_ratio() > 0.0);
    assert_eq!(
        reloaded.compression_ratio(),
        original.compression_ratio()
    );

    for value in ["active", "order_0", "order_249", "missing"] {
        assert_eq!(find_scalar(&reloaded, value), find_scalar(&original, value));
        assert_eq!(find_simd(&reloaded, value), find_simd(&original, value));
    }
    for prefix in ["a", "order_1", "pend", "zzz"] {
        assert_eq!(
            find_prefix_scalar(&reloaded, prefix),
            find_prefix_scalar(&original, prefix)
        );
        assert_eq!(
            find_prefix_simd(&reloaded, prefix),
            find_prefix_simd(&original, prefix)
        );
    }
}
