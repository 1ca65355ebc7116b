use std::hint::black_box;
use std::time::Instant;

use isocity_common::GridCoord;
use isocity_kernel::{BuildingKind, City};

fn make_city(size: u32, occupancy: u32) -> City {
    let mut city = City::with_seed(size, 42);
    let kinds = BuildingKind::ALL;
    for x in 0..size {
        for y in 0..size {
            if (x + y) % occupancy == 0 {
                let kind = kinds[((x * 7 + y) % kinds.len() as u32) as usize];
                city.set_building(GridCoord::new(x, y), Some(kind));
            }
        }
    }
    city.take_diff();
    city
}

fn bench_tick(size: u32, occupancy: u32, iterations: usize) {
    let mut city = make_city(size, occupancy);

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(&mut city).tick();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  tick ({size}x{size}, 1/{occupancy} occupied, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_tick_and_drain(size: u32, iterations: usize) {
    let mut city = make_city(size, 1);

    let start = Instant::now();
    let mut drained = 0usize;
    for _ in 0..iterations {
        city.tick();
        drained += black_box(city.take_diff()).len();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  tick + take_diff ({size}x{size}, {iterations} iters): {per_iter:?}/iter, {drained} diffs drained"
    );
}

fn main() {
    println!("=== City Tick Benchmarks ===\n");

    println!("Tick:");
    bench_tick(20, 3, 10000);
    bench_tick(100, 3, 1000);
    bench_tick(500, 2, 50);

    println!("\nTick with diff drain:");
    bench_tick_and_drain(20, 10000);
    bench_tick_and_drain(200, 100);

    println!("\n=== Done ===");
}
