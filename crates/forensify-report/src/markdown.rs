//! Markdown renderer for the block document

use crate::block::Block;

pub fn render(blocks: &[Block]) -> String {
    let mut out = String::new();

    for block in blocks {
        match block {
            Block::Title(text) => {
                out.push_str("# ");
                out.push_str(text);
                out.push('\n');
            }
            Block::Heading(text) => {
                out.push_str("## ");
                out.push_str(text);
                out.push('\n');
            }
            Block::Paragraph(text) => {
                // Keep each logical line on its own rendered line
                for line in text.lines() {
                    out.push_str(line);
                    out.push_str("  \n");
                }
            }
            Block::Image { alt, path } => {
                out.push_str(&format!("![{}]({})\n", alt, path.display()));
            }
            Block::Spacer => out.push('\n'),
        }
    }

    out
}
