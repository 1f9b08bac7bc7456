//! Frame markup for the fixed gated-branch responses.
//!
//! A frame travels as an HTML document whose meta tags carry the image,
//! buttons, and optional text input. Only the two gated outcomes are
//! rendered here, once at startup; everything else comes pre-rendered from
//! the resolver.

use std::fmt::Write;

/// Declarative description of a frame to render.
#[derive(Debug, Clone, Default)]
pub struct FrameSpec {
    pub image: String,
    /// Button labels, in display order (protocol indices them from 1).
    pub buttons: Vec<String>,
    /// Placeholder for a free-text input field, if the frame has one.
    pub input_text: Option<String>,
    /// Where button presses on this frame should POST back to.
    pub post_url: Option<String>,
    /// e.g. "1:1" or "1.91:1".
    pub aspect_ratio: Option<String>,
}

/// Render the meta-tag document for a frame.
pub fn render_frame(spec: &FrameSpec) -> String {
    let mut tags = String::new();
    tags.push_str("<meta property=\"fc:frame\" content=\"vNext\" />");
    let _ = write!(
        tags,
        "<meta property=\"og:image\" content=\"{img}\" /><meta property=\"fc:frame:image\" content=\"{img}\" />",
        img = escape(&spec.image)
    );
    if let Some(ratio) = &spec.aspect_ratio {
        let _ = write!(
            tags,
            "<meta property=\"fc:frame:image:aspect_ratio\" content=\"{}\" />",
            escape(ratio)
        );
    }
    for (i, label) in spec.buttons.iter().enumerate() {
        let _ = write!(
            tags,
            "<meta property=\"fc:frame:button:{}\" content=\"{}\" />",
            i + 1,
            escape(label)
        );
    }
    if let Some(placeholder) = &spec.input_text {
        let _ = write!(
            tags,
            "<meta property=\"fc:frame:input:text\" content=\"{}\" />",
            escape(placeholder)
        );
    }
    if let Some(url) = &spec.post_url {
        let _ = write!(
            tags,
            "<meta property=\"fc:frame:post_url\" content=\"{}\" />",
            escape(url)
        );
    }

    format!("<!DOCTYPE html><html><head>{tags}</head><body></body></html>")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
