use looker_mcp_server::openapi;

fn main() -> anyhow::Result<()> {
    let schema = openapi::generate_schema()?;
    println!("{}", schema);
    Ok(())
}
