// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Temperature Batch Upload Example
//!
//! Accumulates simulated sensor readings into a batch and prints the
//! request an HTTP client would send.
//!
//! ## Usage
//!
//! ```sh
//! cargo run -p fluxline --example temperature_upload --features std
//! ```

use fluxline::{Batch, InfluxDbConfig, Result, StringPoint};

fn main() -> Result<()> {
    println!("fluxline - Temperature Batch Upload");
    println!("===================================\n");

    // Small capacities so the batch fills visibly: 8 points, 5 fields
    // and 1 tag per point, 1 KiB body ceiling
    let mut batch: Batch<8, 5, 1, 1024> = Batch::new(&InfluxDbConfig {
        url: "https://influx.example.com:8086",
        token: "dev-token",
        org: "workshop",
        bucket: "telemetry",
        sensor_name: "BOX1",
    })?;

    batch.endpoint_mut().set_content_type("text/plain; charset=utf-8")?;

    // Simulated readings
    for i in 0..5 {
        let timestamp = format!("{}", 1_700_000_000 + i * 60);
        batch.add_point_with_timestamp("engine", "rpm", 1450.0 + i as f32 * 10.0, &timestamp)?;
        batch.add_tag("bank", "port")?;
        batch.add_field("oil_temp", 85.0 + i as f32 * 0.5)?;

        println!(
            "[OK] Point #{}: {} points batched, body {} bytes",
            i + 1,
            batch.point_count(),
            batch.body_len()
        );
    }

    // What the HTTP collaborator would send
    let endpoint = batch.endpoint().clone();
    println!("\nPOST {}{}", endpoint.host(), endpoint.path());
    for header in endpoint.headers().iter().filter(|h| h.is_set()) {
        println!("{}: {}", header.key, header.value);
    }
    println!("\n{}\n", batch.body()?);

    if batch.overflowed(true) {
        println!("[!] Batch overflowed, some readings were dropped");
    }
    batch.clear_points();
    println!("[OK] Batch cleared ({} points)", batch.point_count());

    // String-valued readings bypass the batch and go out line by line
    let mut status: StringPoint<5> = StringPoint::new("status", "BOX1", "")?;
    status.add_field("state", "running")?;
    status.add_field("mode", "auto")?;

    let line: heapless::String<256> = status.to_line()?;
    print!("String-mode line: {}", line);

    Ok(())
}
