pub mod assemble;
pub mod patch;
pub mod version;

use rimpatch_core::xml::DECLARATION;
use rimpatch_core::XmlNode;
use std::path::Path;

/// Render a document with the XML declaration
pub fn render(node: &XmlNode, pretty: bool) -> String {
    let body = if pretty {
        node.to_pretty_string()
    } else {
        node.to_compact_string()
    };
    format!("{}\n{}\n", DECLARATION, body.trim_end())
}

/// Write `text` to `output`, or to stdout when no path is given
pub fn emit(text: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
