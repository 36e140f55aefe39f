fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure().compile(&["proto/lines.proto"], &["proto"])?;
    println!("cargo:rerun-if-changed=proto/lines.proto");
    Ok(())
}
