//! Visual reading order for embedded PDF text.
//!
//! Text segments come back in content-stream order, which is whatever order
//! the producer drew them in. Lines are rebuilt top to bottom and left to
//! right from the segment positions.

/// Segments whose vertical centers differ by at most this many points always
/// share a line.
const LINE_TOLERANCE: f32 = 2.0;

/// A piece of text at a page position (PDF user space, origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// Left edge.
    pub x: f32,
    /// Vertical center.
    pub y: f32,
    /// Glyph box height; zero when unknown.
    pub height: f32,
    pub text: String,
}

impl TextFragment {
    pub fn new(x: f32, y: f32, height: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            height,
            text: text.into(),
        }
    }

    fn shares_line_with(&self, line_y: f32, line_height: f32) -> bool {
        let tolerance = LINE_TOLERANCE.max(0.5 * self.height.min(line_height));
        (line_y - self.y).abs() <= tolerance
    }
}

/// Arrange fragments into lines: top to bottom, then left to right.
pub fn arrange(mut fragments: Vec<TextFragment>) -> String {
    fragments.retain(|f| !f.text.trim().is_empty());
    fragments.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut lines: Vec<(f32, f32, Vec<TextFragment>)> = Vec::new();
    for fragment in fragments {
        match lines.last_mut() {
            Some((line_y, line_height, members)) if fragment.shares_line_with(*line_y, *line_height) => {
                members.push(fragment);
            }
            _ => lines.push((fragment.y, fragment.height, vec![fragment])),
        }
    }

    lines
        .into_iter()
        .map(|(_, _, mut members)| {
            members.sort_by(|a, b| a.x.total_cmp(&b.x));
            members
                .iter()
                .map(|f| f.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
