// Simple tool to display LAV program information
use gvm_rs::ProgramImage;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <program.lav>", args[0]);
        std::process::exit(1);
    }

    let path = &args[1];
    println!("Loading program: {}", path);
    println!();

    let mut image = ProgramImage::from_file(path)?;

    let summary = serde_json::json!({
        "size": image.size(),
        "body_offset": image.position(),
        "body_size": image.remaining(),
        "header": image.header(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!();

    print!("First body bytes:");
    for _ in 0..image.remaining().min(16) {
        print!(" {:02X}", image.read_byte()?);
    }
    println!();

    Ok(())
}
