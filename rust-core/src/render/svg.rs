use std::fmt::Write;

use crate::render::scene::{Frame, Layer, Shape, Style};

pub const ARROW_MARKER_ID: &str = "arrow-head";

impl Frame {
    /// Standalone SVG document for the frame, one `<g>` per layer in paint order.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100%" height="100%" viewBox="0 0 {} {}">"#,
            fmt_num(self.width),
            fmt_num(self.height)
        );
        svg.push_str(&format!(
            r#"<defs><marker id="{}" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z"/></marker></defs>"#,
            ARROW_MARKER_ID
        ));

        for layer in Layer::ALL {
            let _ = write!(svg, r#"<g class="{}">"#, layer.class_name());
            for (key, shape) in &self.elements {
                if key.layer == layer {
                    write_shape(&mut svg, shape);
                }
            }
            svg.push_str("</g>");
        }

        svg.push_str("</svg>");
        svg
    }
}

fn write_shape(out: &mut String, shape: &Shape) {
    match shape {
        Shape::Circle { center, radius, style } => {
            let _ = write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}"{}/>"#,
                fmt_num(center.x),
                fmt_num(center.y),
                fmt_num(radius.max(0.0)),
                style_attrs(style)
            );
        }
        Shape::Line { from, to, style, arrow } => {
            let marker = if *arrow {
                format!(r#" marker-end="url(#{})""#, ARROW_MARKER_ID)
            } else {
                String::new()
            };
            let _ = write!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}{}/>"#,
                fmt_num(from.x),
                fmt_num(from.y),
                fmt_num(to.x),
                fmt_num(to.y),
                style_attrs(style),
                marker
            );
        }
        Shape::Polygon { points, style } => {
            let pts: Vec<String> = points
                .iter()
                .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
                .collect();
            let _ = write!(
                out,
                r#"<polygon points="{}"{}/>"#,
                pts.join(" "),
                style_attrs(style)
            );
        }
        Shape::Text { anchor, content, font_size, fill, opacity } => {
            let _ = write!(
                out,
                r#"<text x="{}" y="{}" font-size="{}" fill="{}" opacity="{}">{}</text>"#,
                fmt_num(anchor.x),
                fmt_num(anchor.y),
                fmt_num(*font_size),
                fill.to_css(),
                fmt_num(*opacity),
                escape_xml(content)
            );
        }
    }
}

fn style_attrs(style: &Style) -> String {
    let mut attrs = String::new();
    match style.fill {
        Some(fill) => {
            let _ = write!(attrs, r#" fill="{}""#, fill.to_css());
        }
        None => attrs.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = style.stroke {
        let _ = write!(
            attrs,
            r#" stroke="{}" stroke-width="{}""#,
            stroke.to_css(),
            fmt_num(style.stroke_width)
        );
    }
    if let Some([on, off]) = style.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{},{}""#, fmt_num(on), fmt_num(off));
    }
    if style.opacity < 1.0 {
        let _ = write!(attrs, r#" opacity="{}""#, fmt_num(style.opacity));
    }
    attrs
}

/// Two decimals, trailing zeros trimmed.
fn fmt_num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
