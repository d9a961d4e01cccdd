//! Example: Reading and writing PLC devices over MC
//!
//! Run with: cargo run --example read_write -- 192.168.1.10:6000 [ascii]
//!
//! This example demonstrates:
//! - Reading words and relays
//! - Writing words, relays and typed values
//! - Staging values in a ScratchBuffer before writing them in one request

use melsec_mc::utils::format_frame;
use melsec_mc::{ClientConfig, FrameFormat, MelsecMcClient, ScratchBuffer};

fn main() -> melsec_mc::Result<()> {
    let mut args = std::env::args().skip(1);
    let addr = args
        .next()
        .unwrap_or_else(|| "192.168.1.10:6000".to_string())
        .parse()
        .map_err(|e| melsec_mc::McError::invalid_parameter("address", format!("{e}")))?;
    let format = match args.next().as_deref() {
        Some("ascii") => FrameFormat::Ascii,
        _ => FrameFormat::Binary,
    };

    let config = ClientConfig::new(addr).with_format(format);
    let client = MelsecMcClient::connect(config)?;
    println!("Connected ({format}), CPU: {}", client.read_plc_type()?);

    // Words
    let data = client.read("D100", 4)?;
    println!("D100-D103: {}", format_frame(&data));

    // Relays
    let bits = client.read_bool("M0", 8)?;
    println!("M0-M7: {:?}", bits);
    client.write_bits("M0", &[true, false, true])?;

    // Typed values
    client.write_f32("D200", 21.5)?;
    client.write_i32("D202", -1000)?;
    println!("D200 = {}", client.read_f32("D200")?);
    println!("D202 = {}", client.read_i32("D202")?);

    // Stage a block locally, then write it in one request
    let staging = ScratchBuffer::new(8);
    staging.set_u16(0, 1);
    staging.set_u16(2, 2);
    staging.set_f32(4, 3.25);
    client.write("D300", &staging.to_vec())?;

    client.write_string("D400", "LINE-1")?;
    println!("D400 = {}", client.read_string("D400", 3)?);

    Ok(())
}
